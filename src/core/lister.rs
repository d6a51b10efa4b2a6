use rand::Rng;
use std::future::Future;

use crate::config::ListingSettings;
use crate::core::error::ListError;
use crate::core::pagination::{PageParams, PageRequest};
use crate::models::{
    AppVersion, Comment, CommentFilter, Device, GenderFilter, GeoListQuerySpec, LikedMeFilter, ListQuerySpec,
    NearbyPost, NearbyUser, Post, PostFilter, PostId, PostLike, PostLikeFilter, Product,
    ProductFilter, QueryFilter, Requester, ResultPage, User, UserFilter, UserId, VisitFilter,
    Visitor,
};
use crate::services::{RecordStore, StoreError};

/// List-query orchestrator
///
/// Every operation builds a `ListQuerySpec` for its shape, runs it against the
/// store it is handed, and returns one page. Shapes marked randomized shuffle
/// the fetched page only, never the full filtered set, so a record's page is
/// decided by the deterministic order and only its position within the page
/// is random.
#[derive(Debug, Clone)]
pub struct Lister {
    settings: ListingSettings,
}

impl Lister {
    pub fn new(settings: ListingSettings) -> Self {
        Self { settings }
    }

    pub fn with_default_settings() -> Self {
        Self {
            settings: ListingSettings::default(),
        }
    }

    pub fn settings(&self) -> &ListingSettings {
        &self.settings
    }

    /// Validate caller paging parameters against the configured page sizes
    pub fn page(&self, params: PageParams) -> Result<PageRequest, ListError> {
        PageRequest::from_params(
            params,
            self.settings.default_page_size,
            self.settings.max_page_size,
        )
    }

    /// Load the requester's record and location
    pub async fn load_requester(
        &self,
        store: &dyn RecordStore,
        id: UserId,
    ) -> Result<Requester, ListError> {
        let user = store
            .find_user(id)
            .await?
            .ok_or_else(|| ListError::NotFound(format!("user {}", id)))?;

        Ok(Requester::from(&user))
    }

    pub async fn fetch_users(
        &self,
        store: &dyn RecordStore,
        spec: &ListQuerySpec<UserFilter>,
    ) -> Result<ResultPage<User>, ListError> {
        fetch_with(spec, || store.query_users(spec)).await
    }

    pub async fn fetch_liked_me(
        &self,
        store: &dyn RecordStore,
        spec: &ListQuerySpec<LikedMeFilter>,
    ) -> Result<ResultPage<User>, ListError> {
        fetch_with(spec, || store.query_liked_me(spec)).await
    }

    pub async fn fetch_visitors(
        &self,
        store: &dyn RecordStore,
        spec: &ListQuerySpec<VisitFilter>,
    ) -> Result<ResultPage<Visitor>, ListError> {
        fetch_with(spec, || store.query_visitors(spec)).await
    }

    pub async fn fetch_posts(
        &self,
        store: &dyn RecordStore,
        spec: &ListQuerySpec<PostFilter>,
    ) -> Result<ResultPage<Post>, ListError> {
        fetch_with(spec, || store.query_posts(spec)).await
    }

    pub async fn fetch_comments(
        &self,
        store: &dyn RecordStore,
        spec: &ListQuerySpec<CommentFilter>,
    ) -> Result<ResultPage<Comment>, ListError> {
        fetch_with(spec, || store.query_comments(spec)).await
    }

    pub async fn fetch_post_likes(
        &self,
        store: &dyn RecordStore,
        spec: &ListQuerySpec<PostLikeFilter>,
    ) -> Result<ResultPage<PostLike>, ListError> {
        fetch_with(spec, || store.query_post_likes(spec)).await
    }

    pub async fn fetch_products(
        &self,
        store: &dyn RecordStore,
        spec: &ListQuerySpec<ProductFilter>,
    ) -> Result<ResultPage<Product>, ListError> {
        fetch_with(spec, || store.query_products(spec)).await
    }

    /// Users who liked the requester, most recently updated first
    pub async fn liked_me(
        &self,
        store: &dyn RecordStore,
        requester: UserId,
        params: PageParams,
    ) -> Result<ResultPage<User>, ListError> {
        let spec = ListQuerySpec::liked_me(requester, self.page(params)?);
        self.fetch_liked_me(store, &spec).await
    }

    /// Visitors of the requester's profile, most recent visit first
    pub async fn visitors(
        &self,
        store: &dyn RecordStore,
        requester: UserId,
        params: PageParams,
    ) -> Result<ResultPage<Visitor>, ListError> {
        let spec = ListQuerySpec::visitors(requester, self.page(params)?);
        self.fetch_visitors(store, &spec).await
    }

    /// Paying female members, page shuffled
    pub async fn vip_users<R: Rng + ?Sized>(
        &self,
        store: &dyn RecordStore,
        params: PageParams,
        rng: &mut R,
    ) -> Result<ResultPage<User>, ListError> {
        let spec = ListQuerySpec::vip_users(self.page(params)?);
        Ok(self.fetch_users(store, &spec).await?.shuffled(rng))
    }

    /// Newest registrations, page shuffled
    pub async fn new_users<R: Rng + ?Sized>(
        &self,
        store: &dyn RecordStore,
        gender: GenderFilter,
        params: PageParams,
        rng: &mut R,
    ) -> Result<ResultPage<User>, ListError> {
        let spec = ListQuerySpec::new_users(gender, self.page(params)?);
        Ok(self.fetch_users(store, &spec).await?.shuffled(rng))
    }

    /// Active users in the requester's province and city, page shuffled
    ///
    /// Fails with `MissingLocation` when the requester has no coordinate.
    pub async fn nearby_users<R: Rng + ?Sized>(
        &self,
        store: &dyn RecordStore,
        requester: &Requester,
        gender: GenderFilter,
        params: PageParams,
        rng: &mut R,
    ) -> Result<ResultPage<NearbyUser>, ListError> {
        let page = self.page(params)?;
        if requester.coordinate.is_none() {
            return Err(ListError::MissingLocation(requester.id));
        }
        let Some(region) = requester.region.clone() else {
            tracing::debug!("Requester {} has no region, nearby users empty", requester.id);
            return Ok(ResultPage::empty(Some(page)));
        };

        let geo = GeoListQuerySpec::new(
            requester,
            ListQuerySpec::nearby_users(requester.id, region, gender, page),
        )?;

        let origin = geo.origin;
        let users = self.fetch_users(store, &geo.spec).await?;

        Ok(users
            .map(|user| NearbyUser {
                distance_km: user.coordinate().map(|c| origin.distance_to(&c)),
                user,
            })
            .shuffled(rng))
    }

    /// Live feed posts, newest first, page shuffled
    pub async fn new_posts<R: Rng + ?Sized>(
        &self,
        store: &dyn RecordStore,
        gender: GenderFilter,
        params: PageParams,
        rng: &mut R,
    ) -> Result<ResultPage<Post>, ListError> {
        let spec = ListQuerySpec::new_posts(gender, self.page(params)?);
        Ok(self.fetch_posts(store, &spec).await?.shuffled(rng))
    }

    /// Live feed posts that have collected at least one like, page shuffled
    pub async fn recommended_posts<R: Rng + ?Sized>(
        &self,
        store: &dyn RecordStore,
        gender: GenderFilter,
        params: PageParams,
        rng: &mut R,
    ) -> Result<ResultPage<Post>, ListError> {
        let spec = ListQuerySpec::recommended_posts(gender, self.page(params)?);
        Ok(self.fetch_posts(store, &spec).await?.shuffled(rng))
    }

    /// Other users' posts from the requester's province and city, page shuffled
    pub async fn nearby_posts<R: Rng + ?Sized>(
        &self,
        store: &dyn RecordStore,
        requester: &Requester,
        gender: GenderFilter,
        params: PageParams,
        rng: &mut R,
    ) -> Result<ResultPage<NearbyPost>, ListError> {
        let page = self.page(params)?;
        if requester.coordinate.is_none() {
            return Err(ListError::MissingLocation(requester.id));
        }
        let Some(region) = requester.region.clone() else {
            tracing::debug!("Requester {} has no region, nearby posts empty", requester.id);
            return Ok(ResultPage::empty(Some(page)));
        };

        let geo = GeoListQuerySpec::new(
            requester,
            ListQuerySpec::nearby_posts(requester.id, region, gender, page),
        )?;

        let origin = geo.origin;
        let posts = self.fetch_posts(store, &geo.spec).await?;

        Ok(posts
            .map(|post| NearbyPost {
                distance_km: post.coordinate().map(|c| origin.distance_to(&c)),
                post,
            })
            .shuffled(rng))
    }

    /// Posts on a profile; the owner also sees posts pending review
    pub async fn profile_posts(
        &self,
        store: &dyn RecordStore,
        owner: UserId,
        viewer: UserId,
        params: PageParams,
    ) -> Result<ResultPage<Post>, ListError> {
        let spec = ListQuerySpec::profile_posts(owner, viewer, self.page(params)?);
        self.fetch_posts(store, &spec).await
    }

    /// Comments on a post, newest first, rejected ones hidden
    ///
    /// Parameters are always validated; they only cut the list when
    /// `listing.paginate_comments` is on.
    pub async fn post_comments(
        &self,
        store: &dyn RecordStore,
        post: PostId,
        params: PageParams,
    ) -> Result<ResultPage<Comment>, ListError> {
        let page = self.page(params)?;
        let page = self.settings.paginate_comments.then_some(page);

        let spec = ListQuerySpec::post_comments(post, page);
        self.fetch_comments(store, &spec).await
    }

    /// Comments addressed to the user
    pub async fn comment_inbox(
        &self,
        store: &dyn RecordStore,
        recipient: UserId,
        params: PageParams,
    ) -> Result<ResultPage<Comment>, ListError> {
        let spec = ListQuerySpec::comment_inbox(recipient, self.page(params)?);
        self.fetch_comments(store, &spec).await
    }

    /// Live likes on the user's posts
    pub async fn praise_inbox(
        &self,
        store: &dyn RecordStore,
        post_owner: UserId,
        params: PageParams,
    ) -> Result<ResultPage<PostLike>, ListError> {
        let spec = ListQuerySpec::praise_inbox(post_owner, self.page(params)?);
        self.fetch_post_likes(store, &spec).await
    }

    /// Purchasable products for a device, cheapest first
    pub async fn products(
        &self,
        store: &dyn RecordStore,
        device: Device,
    ) -> Result<ResultPage<Product>, ListError> {
        self.fetch_products(store, &ListQuerySpec::products(device))
            .await
    }

    /// Newest published release for a device; `None` until one exists
    pub async fn latest_app_version(
        &self,
        store: &dyn RecordStore,
        device: Device,
    ) -> Result<Option<AppVersion>, ListError> {
        let latest = store.latest_app_version(device).await?;
        tracing::debug!(
            "Latest {:?} release: {:?}",
            device,
            latest.as_ref().map(|v| v.version.as_str())
        );
        Ok(latest)
    }
}

impl Default for Lister {
    fn default() -> Self {
        Self::with_default_settings()
    }
}

/// Run one store query for `spec`, short-circuiting zero-size pages
async fn fetch_with<F, T, Q, Fut>(
    spec: &ListQuerySpec<F>,
    query: Q,
) -> Result<ResultPage<T>, ListError>
where
    F: QueryFilter,
    Q: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<T>, StoreError>>,
{
    if spec.page.is_some_and(|page| page.is_empty()) {
        tracing::debug!("Zero-size page requested for {}, skipping store", spec.entity());
        return Ok(ResultPage::empty(spec.page));
    }

    let items = query().await.map_err(|e| {
        tracing::error!("Failed to query {}: {}", spec.entity(), e);
        ListError::from(e)
    })?;

    if let Some(page) = spec.page {
        debug_assert!(items.len() <= page.size as usize);
        tracing::debug!(
            "Fetched {} {} (page {}, size {})",
            items.len(),
            spec.entity(),
            page.index,
            page.size
        );
    }

    Ok(ResultPage::new(items, spec.page))
}
