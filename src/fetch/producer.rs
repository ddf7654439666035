//! Producer abstraction.

use std::future::Future;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;

use crate::error::BoxError;

/// Caller-supplied asynchronous source of values.
///
/// Every call starts a fresh, independent retrieval. Closures returning a
/// future implement this automatically:
///
/// ```
/// use resilient_fetch::Producer;
///
/// fn assert_producer<P: Producer<u32>>(_: P) {}
/// assert_producer(|| async { Ok::<_, std::io::Error>(42u32) });
/// ```
pub trait Producer<T>: Send + Sync + 'static {
    fn produce(&self) -> BoxFuture<'static, Result<T, BoxError>>;
}

impl<T, F, Fut, E> Producer<T> for F
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    E: Into<BoxError>,
    T: Send + 'static,
{
    fn produce(&self) -> BoxFuture<'static, Result<T, BoxError>> {
        (self)().map(|result| result.map_err(Into::into)).boxed()
    }
}
