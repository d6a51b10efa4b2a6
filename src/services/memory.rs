use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::core::filters::{
    comment_matches, liker_matches, post_like_matches, post_matches, product_matches,
    sort_records, user_matches, visitor_matches, SortFields,
};
use crate::models::{
    AppVersion, Comment, CommentFilter, Device, LikedMeFilter, ListQuerySpec, Post, PostFilter,
    PostLike, PostLikeFilter, PostLikeStatus, Product, ProductFilter, User, UserFilter, UserId,
    UserLike, VisitFilter, VisitRecord, Visitor,
};

use super::store::{RecordStore, StoreError};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
    user_likes: Vec<UserLike>,
    visits: Vec<VisitRecord>,
    post_likes: Vec<PostLike>,
    products: Vec<Product>,
    app_versions: Vec<AppVersion>,
}

/// Record store held entirely in memory
///
/// Applies the same filter and ordering rules as the SQL store, which makes it
/// the fixture store for tests and local tooling.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a user by id
    pub async fn insert_user(&self, user: User) {
        self.tables.write().await.users.insert(user.id, user);
    }

    pub async fn insert_post(&self, post: Post) {
        self.tables.write().await.posts.push(post);
    }

    pub async fn insert_comment(&self, comment: Comment) {
        self.tables.write().await.comments.push(comment);
    }

    pub async fn insert_user_like(&self, like: UserLike) {
        self.tables.write().await.user_likes.push(like);
    }

    pub async fn insert_visit(&self, visit: VisitRecord) {
        self.tables.write().await.visits.push(visit);
    }

    pub async fn insert_post_like(&self, like: PostLike) {
        self.tables.write().await.post_likes.push(like);
    }

    pub async fn insert_product(&self, product: Product) {
        self.tables.write().await.products.push(product);
    }

    pub async fn insert_app_version(&self, version: AppVersion) {
        self.tables.write().await.app_versions.push(version);
    }
}

/// Sort and cut the requested page
fn paginate<T: SortFields, F>(mut items: Vec<T>, spec: &ListQuerySpec<F>) -> Vec<T> {
    sort_records(&mut items, spec.order);
    match spec.page {
        Some(page) => page.window(items),
        None => items,
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn query_users(&self, spec: &ListQuerySpec<UserFilter>) -> Result<Vec<User>, StoreError> {
        let tables = self.tables.read().await;
        let matched: Vec<User> = tables
            .users
            .values()
            .filter(|user| user_matches(user, &spec.filter))
            .cloned()
            .collect();

        Ok(paginate(matched, spec))
    }

    async fn query_liked_me(
        &self,
        spec: &ListQuerySpec<LikedMeFilter>,
    ) -> Result<Vec<User>, StoreError> {
        let tables = self.tables.read().await;
        let matched: Vec<User> = tables
            .user_likes
            .iter()
            .filter_map(|like| {
                let liker = tables.users.get(&like.source_user_id)?;
                liker_matches(like, liker, &spec.filter).then(|| liker.clone())
            })
            .collect();

        Ok(paginate(matched, spec))
    }

    async fn query_visitors(
        &self,
        spec: &ListQuerySpec<VisitFilter>,
    ) -> Result<Vec<Visitor>, StoreError> {
        let tables = self.tables.read().await;
        let matched: Vec<Visitor> = tables
            .visits
            .iter()
            .filter_map(|visit| {
                let visitor = tables.users.get(&visit.source_user_id)?;
                visitor_matches(visit, visitor, &spec.filter).then(|| Visitor {
                    user: visitor.clone(),
                    visit_times: visit.visit_times,
                    visited_at: visit.updated_at,
                })
            })
            .collect();

        Ok(paginate(matched, spec))
    }

    async fn query_posts(&self, spec: &ListQuerySpec<PostFilter>) -> Result<Vec<Post>, StoreError> {
        let tables = self.tables.read().await;
        let matched: Vec<Post> = tables
            .posts
            .iter()
            .filter(|post| {
                let author = tables.users.get(&post.user_id);
                let has_live_like = tables
                    .post_likes
                    .iter()
                    .any(|like| like.post_id == post.id && like.status == PostLikeStatus::Liked);
                post_matches(post, author, has_live_like, &spec.filter)
            })
            .cloned()
            .collect();

        Ok(paginate(matched, spec))
    }

    async fn query_comments(
        &self,
        spec: &ListQuerySpec<CommentFilter>,
    ) -> Result<Vec<Comment>, StoreError> {
        let tables = self.tables.read().await;
        let matched: Vec<Comment> = tables
            .comments
            .iter()
            .filter(|comment| comment_matches(comment, &spec.filter))
            .cloned()
            .collect();

        Ok(paginate(matched, spec))
    }

    async fn query_post_likes(
        &self,
        spec: &ListQuerySpec<PostLikeFilter>,
    ) -> Result<Vec<PostLike>, StoreError> {
        let tables = self.tables.read().await;
        let matched: Vec<PostLike> = tables
            .post_likes
            .iter()
            .filter(|like| post_like_matches(like, &spec.filter))
            .cloned()
            .collect();

        Ok(paginate(matched, spec))
    }

    async fn query_products(
        &self,
        spec: &ListQuerySpec<ProductFilter>,
    ) -> Result<Vec<Product>, StoreError> {
        let tables = self.tables.read().await;
        let matched: Vec<Product> = tables
            .products
            .iter()
            .filter(|product| product_matches(product, &spec.filter))
            .cloned()
            .collect();

        Ok(paginate(matched, spec))
    }

    async fn latest_app_version(&self, device: Device) -> Result<Option<AppVersion>, StoreError> {
        let tables = self.tables.read().await;
        let latest = tables
            .app_versions
            .iter()
            .filter(|version| version.device == device)
            .max_by_key(|version| (version.created_at, version.id))
            .cloned();

        Ok(latest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pagination::PageRequest;
    use chrono::{Duration, TimeZone, Utc};

    fn product(id: i64, price_cents: i64, device: Device) -> Product {
        Product {
            id,
            name: format!("pack-{}", id),
            price_cents,
            original_price_cents: None,
            description: None,
            iap_identifier: None,
            device,
        }
    }

    #[tokio::test]
    async fn test_products_by_price_ascending() {
        let store = InMemoryStore::new();
        store.insert_product(product(1, 3000, Device::Ios)).await;
        store.insert_product(product(2, 600, Device::Ios)).await;
        store.insert_product(product(3, 100, Device::Android)).await;

        let found = store
            .query_products(&ListQuerySpec::products(Device::Ios))
            .await
            .unwrap();

        let ids: Vec<i64> = found.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    fn app_version(id: i64, version: &str, device: Device, minutes: i64) -> AppVersion {
        let published =
            Utc.with_ymd_and_hms(2021, 3, 1, 0, 0, 0).unwrap() + Duration::minutes(minutes);
        AppVersion {
            id,
            version: version.to_string(),
            device,
            update_content: None,
            created_at: published,
            updated_at: published,
        }
    }

    #[tokio::test]
    async fn test_latest_app_version_per_device() {
        let store = InMemoryStore::new();
        store.insert_app_version(app_version(1, "1.0.0", Device::Ios, 0)).await;
        store.insert_app_version(app_version(2, "1.2.0", Device::Ios, 60)).await;
        store.insert_app_version(app_version(3, "1.1.0", Device::Ios, 30)).await;
        store.insert_app_version(app_version(4, "2.0.0", Device::Android, 90)).await;

        let ios = store.latest_app_version(Device::Ios).await.unwrap().unwrap();
        assert_eq!(ios.version, "1.2.0");

        let android = store.latest_app_version(Device::Android).await.unwrap().unwrap();
        assert_eq!(android.id, 4);

        assert!(store.latest_app_version(Device::Other).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_latest_app_version_tie_breaks_on_id() {
        let store = InMemoryStore::new();
        store.insert_app_version(app_version(7, "3.0.0", Device::Ios, 10)).await;
        store.insert_app_version(app_version(8, "3.0.1", Device::Ios, 10)).await;

        let latest = store.latest_app_version(Device::Ios).await.unwrap().unwrap();
        assert_eq!(latest.id, 8);
    }

    #[tokio::test]
    async fn test_empty_store_gives_empty_page() {
        let store = InMemoryStore::new();
        let spec = ListQuerySpec::vip_users(PageRequest::new(0, 20));
        assert!(store.query_users(&spec).await.unwrap().is_empty());
        assert!(store.find_user(1).await.unwrap().is_none());
    }
}
