//! Disposal traits for object disposables.

use crate::error::BoxError;

/// Trait for synchronous resource disposal.
///
/// Implement this trait for resources whose teardown is a plain function call
/// (flushing a buffer, dropping a cache). Wrap the resource with
/// [`Disposable::sync_object`](crate::Disposable::sync_object) to add it to a group.
///
/// # Examples
///
/// ```
/// use disposal_groups::{BoxError, Disposable, Dispose, Disposables};
/// use std::sync::Arc;
///
/// struct Cache {
///     name: String,
/// }
///
/// impl Dispose for Cache {
///     fn dispose(&self) -> Result<(), BoxError> {
///         println!("Flushing cache: {}", self.name);
///         Ok(())
///     }
/// }
///
/// let disposables = Disposables::new();
/// let cache = Arc::new(Cache { name: "user_cache".to_string() });
/// disposables.add(Disposable::sync_object(cache), "default").unwrap();
/// ```
pub trait Dispose: Send + Sync + 'static {
    /// Perform synchronous cleanup of resources.
    fn dispose(&self) -> Result<(), BoxError>;
}

/// Trait for asynchronous resource disposal.
///
/// Implement this trait for resources that require async teardown (graceful
/// connection shutdown, draining a queue). Each call runs under the timeout of
/// the entry it was added with.
///
/// # Examples
///
/// ```
/// use disposal_groups::{AddOptions, AsyncDispose, BoxError, Disposable, Disposables};
/// use async_trait::async_trait;
/// use std::sync::Arc;
///
/// struct DatabaseClient {
///     connection_id: String,
/// }
///
/// #[async_trait]
/// impl AsyncDispose for DatabaseClient {
///     async fn dispose(&self) -> Result<(), BoxError> {
///         println!("Closing database connection: {}", self.connection_id);
///         Ok(())
///     }
/// }
///
/// let disposables = Disposables::new();
/// let client = Arc::new(DatabaseClient { connection_id: "conn_123".to_string() });
/// disposables
///     .add(Disposable::object(client), AddOptions::named("database"))
///     .unwrap();
/// ```
#[async_trait::async_trait]
pub trait AsyncDispose: Send + Sync + 'static {
    /// Perform asynchronous cleanup of resources.
    async fn dispose(&self) -> Result<(), BoxError>;
}
