use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    AppVersion, Comment, CommentFilter, Device, LikedMeFilter, ListQuerySpec, Post, PostFilter,
    PostLike, PostLikeFilter, Product, ProductFilter, UnknownCode, User, UserFilter, UserId,
    VisitFilter, Visitor,
};

/// Errors raised by a record store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    SqlxError(sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Corrupt record: {0}")]
    Corrupt(#[from] UnknownCode),

    #[error("Unsupported query: {0}")]
    Unsupported(String),

    /// The backend could not be reached at all
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        let unreachable = matches!(
            err,
            sqlx::Error::PoolTimedOut
                | sqlx::Error::PoolClosed
                | sqlx::Error::WorkerCrashed
                | sqlx::Error::Io(_)
                | sqlx::Error::Tls(_)
        );

        if unreachable {
            StoreError::Unavailable(err.to_string())
        } else {
            StoreError::SqlxError(err)
        }
    }
}

/// Filtered, ordered, offset/limit query execution over the app's collections
///
/// Implementations apply the query's filter, order and page window exactly;
/// the returned vector is already the page. Every call is handed the store
/// explicitly, there is no process-wide handle.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError>;

    async fn query_users(&self, spec: &ListQuerySpec<UserFilter>) -> Result<Vec<User>, StoreError>;

    /// Users who liked `spec.filter.destination`
    async fn query_liked_me(
        &self,
        spec: &ListQuerySpec<LikedMeFilter>,
    ) -> Result<Vec<User>, StoreError>;

    async fn query_visitors(
        &self,
        spec: &ListQuerySpec<VisitFilter>,
    ) -> Result<Vec<Visitor>, StoreError>;

    async fn query_posts(&self, spec: &ListQuerySpec<PostFilter>) -> Result<Vec<Post>, StoreError>;

    async fn query_comments(
        &self,
        spec: &ListQuerySpec<CommentFilter>,
    ) -> Result<Vec<Comment>, StoreError>;

    async fn query_post_likes(
        &self,
        spec: &ListQuerySpec<PostLikeFilter>,
    ) -> Result<Vec<PostLike>, StoreError>;

    async fn query_products(
        &self,
        spec: &ListQuerySpec<ProductFilter>,
    ) -> Result<Vec<Product>, StoreError>;

    /// Most recently published release for `device`
    async fn latest_app_version(&self, device: Device) -> Result<Option<AppVersion>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_failures_are_unavailable() {
        assert!(matches!(
            StoreError::from(sqlx::Error::PoolTimedOut),
            StoreError::Unavailable(_)
        ));

        let refused = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        assert!(matches!(
            StoreError::from(sqlx::Error::Io(refused)),
            StoreError::Unavailable(_)
        ));
    }

    #[test]
    fn test_query_errors_stay_sqlx() {
        assert!(matches!(
            StoreError::from(sqlx::Error::RowNotFound),
            StoreError::SqlxError(_)
        ));
    }
}
