use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use std::time::Duration;

use crate::config::DatabaseSettings;
use crate::models::{
    AppVersion, Comment, CommentFilter, CommentStatus, Device, EntityKind, GenderFilter, LikedMeFilter, ListQuerySpec,
    OrderBy, Post, PostFilter, PostLike, PostLikeFilter, PostLikeStatus, PostStatus, Product,
    ProductFilter, QueryFilter, SortDirection, SortKey, User, UserFilter, UserId, UserStatus,
    VipLevel, VisitFilter, Visitor,
};

use super::store::{RecordStore, StoreError};

const USER_COLUMNS: &str = "u.id, u.nickname, u.status, u.gender, u.avatar, u.vip_level, \
    u.vip_expire_at, u.whats_up, u.constellation, u.tag, u.province, u.city, u.area, \
    u.latitude, u.longitude, u.profile_photo_urls, u.created_at, u.updated_at, u.last_login_at";

const POST_COLUMNS: &str = "p.id, p.user_id, p.kind, p.title, p.content, p.cover_url, \
    p.media_urls, p.status, p.province, p.city, p.area, p.latitude, p.longitude, \
    p.created_at, p.updated_at";

const COMMENT_COLUMNS: &str = "c.id, c.post_id, c.user_id, c.content, c.kind, \
    c.source_comment_id, c.to_user_id, c.status, c.created_at, c.updated_at";

const POST_LIKE_COLUMNS: &str =
    "pl.id, pl.post_id, pl.post_user_id, pl.user_id, pl.status, pl.created_at, pl.updated_at";

const PRODUCT_COLUMNS: &str = "pr.id, pr.name, pr.price_cents, pr.original_price_cents, \
    pr.description, pr.iap_identifier, pr.device";

const APP_VERSION_COLUMNS: &str =
    "av.id, av.version, av.device, av.update_content, av.created_at, av.updated_at";

/// PostgreSQL-backed record store
///
/// Builds one parameterized statement per list query. Filters map onto
/// `= ANY($n)` over the stored status codes, ordering always ends with the
/// primary key so offset pages stay stable.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new store from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new store from settings
    pub async fn from_settings(settings: &DatabaseSettings) -> Result<Self, StoreError> {
        tracing::info!(
            "Connecting to PostgreSQL (max {} connections)",
            settings.max_connections.unwrap_or(10)
        );

        Self::new(
            &settings.url,
            settings.max_connections.unwrap_or(10),
            settings.min_connections.unwrap_or(1),
            Duration::from_secs(settings.acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(settings.idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    /// Wrap an existing pool; migrations are the caller's business
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }

    async fn fetch<F: QueryFilter>(
        &self,
        mut builder: QueryBuilder<'_, Postgres>,
        spec: &ListQuerySpec<F>,
    ) -> Result<Vec<PgRow>, StoreError> {
        push_order(&mut builder, spec.entity(), spec.order)?;

        if let Some(page) = spec.page {
            builder
                .push(" LIMIT ")
                .push_bind(i64::try_from(page.limit()).unwrap_or(i64::MAX))
                .push(" OFFSET ")
                .push_bind(i64::try_from(page.offset()).unwrap_or(i64::MAX));
        }

        let rows = builder.build().fetch_all(&self.pool).await?;

        tracing::debug!("Fetched {} {} rows", rows.len(), spec.entity());

        Ok(rows)
    }
}

/// Column a sort key refers to for each collection
fn order_column(entity: EntityKind, key: SortKey) -> Option<(&'static str, &'static str)> {
    match (entity, key) {
        (EntityKind::Users, SortKey::LastLogin) => Some(("u.last_login_at", "u.id")),
        (EntityKind::Users, SortKey::CreatedAt) => Some(("u.created_at", "u.id")),
        (EntityKind::Users | EntityKind::Likes, SortKey::UpdatedAt) => Some(("u.updated_at", "u.id")),
        (EntityKind::Likes, SortKey::LastLogin) => Some(("u.last_login_at", "u.id")),
        (EntityKind::Likes, SortKey::CreatedAt) => Some(("u.created_at", "u.id")),
        (EntityKind::Visits, SortKey::UpdatedAt) => Some(("v.updated_at", "u.id")),
        (EntityKind::Visits, SortKey::LastLogin) => Some(("u.last_login_at", "u.id")),
        (EntityKind::Visits, SortKey::CreatedAt) => Some(("u.created_at", "u.id")),
        (EntityKind::Posts, SortKey::CreatedAt) => Some(("p.created_at", "p.id")),
        (EntityKind::Posts, SortKey::UpdatedAt) => Some(("p.updated_at", "p.id")),
        (EntityKind::Comments, SortKey::CreatedAt) => Some(("c.created_at", "c.id")),
        (EntityKind::Comments, SortKey::UpdatedAt) => Some(("c.updated_at", "c.id")),
        (EntityKind::PostLikes, SortKey::CreatedAt) => Some(("pl.created_at", "pl.id")),
        (EntityKind::PostLikes, SortKey::UpdatedAt) => Some(("pl.updated_at", "pl.id")),
        (EntityKind::Products, SortKey::Price) => Some(("pr.price_cents", "pr.id")),
        _ => None,
    }
}

fn push_order(
    builder: &mut QueryBuilder<'_, Postgres>,
    entity: EntityKind,
    order: OrderBy,
) -> Result<(), StoreError> {
    let (column, tie) = order_column(entity, order.key).ok_or_else(|| {
        StoreError::Unsupported(format!("cannot order {} by {:?}", entity, order.key))
    })?;
    let direction = match order.direction {
        SortDirection::Asc => "ASC",
        SortDirection::Desc => "DESC",
    };

    builder.push(format!(
        " ORDER BY {column} {direction} NULLS LAST, {tie} {direction}"
    ));
    Ok(())
}

fn codes<T: Copy>(values: &[T], code: impl Fn(T) -> i16) -> Vec<i16> {
    values.iter().map(|v| code(*v)).collect()
}

/// Codes of the non-terminal statuses in `statuses`
fn user_status_codes(statuses: &[UserStatus]) -> Vec<i16> {
    statuses
        .iter()
        .filter(|s| !s.is_terminal())
        .map(|s| s.code())
        .collect()
}

fn post_status_codes(statuses: &[PostStatus]) -> Vec<i16> {
    statuses
        .iter()
        .filter(|s| !s.is_terminal())
        .map(|s| s.code())
        .collect()
}

fn comment_status_codes(statuses: &[CommentStatus]) -> Vec<i16> {
    statuses
        .iter()
        .filter(|s| !s.is_terminal())
        .map(|s| s.code())
        .collect()
}

fn user_from_row(row: &PgRow) -> Result<User, StoreError> {
    Ok(User {
        id: row.try_get("id")?,
        nickname: row.try_get("nickname")?,
        status: row.try_get::<i16, _>("status")?.try_into()?,
        gender: row.try_get::<i16, _>("gender")?.try_into()?,
        avatar: row.try_get("avatar")?,
        vip_level: row.try_get::<i16, _>("vip_level")?.try_into()?,
        vip_expire_at: row.try_get("vip_expire_at")?,
        whats_up: row.try_get("whats_up")?,
        constellation: row.try_get("constellation")?,
        tag: row.try_get("tag")?,
        province: row.try_get("province")?,
        city: row.try_get("city")?,
        area: row.try_get("area")?,
        latitude: row.try_get("latitude")?,
        longitude: row.try_get("longitude")?,
        profile_photo_urls: row.try_get("profile_photo_urls")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        last_login_at: row.try_get("last_login_at")?,
    })
}

fn post_from_row(row: &PgRow) -> Result<Post, StoreError> {
    Ok(Post {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        kind: row.try_get::<i16, _>("kind")?.try_into()?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        cover_url: row.try_get("cover_url")?,
        media_urls: row.try_get("media_urls")?,
        status: row.try_get::<i16, _>("status")?.try_into()?,
        province: row.try_get("province")?,
        city: row.try_get("city")?,
        area: row.try_get("area")?,
        latitude: row.try_get("latitude")?,
        longitude: row.try_get("longitude")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn comment_from_row(row: &PgRow) -> Result<Comment, StoreError> {
    Ok(Comment {
        id: row.try_get("id")?,
        post_id: row.try_get("post_id")?,
        user_id: row.try_get("user_id")?,
        content: row.try_get("content")?,
        kind: row.try_get::<i16, _>("kind")?.try_into()?,
        source_comment_id: row.try_get("source_comment_id")?,
        to_user_id: row.try_get("to_user_id")?,
        status: row.try_get::<i16, _>("status")?.try_into()?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn post_like_from_row(row: &PgRow) -> Result<PostLike, StoreError> {
    Ok(PostLike {
        id: row.try_get("id")?,
        post_id: row.try_get("post_id")?,
        post_user_id: row.try_get("post_user_id")?,
        user_id: row.try_get("user_id")?,
        status: row.try_get::<i16, _>("status")?.try_into()?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn product_from_row(row: &PgRow) -> Result<Product, StoreError> {
    Ok(Product {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        price_cents: row.try_get("price_cents")?,
        original_price_cents: row.try_get("original_price_cents")?,
        description: row.try_get("description")?,
        iap_identifier: row.try_get("iap_identifier")?,
        device: row.try_get::<i16, _>("device")?.try_into()?,
    })
}

fn app_version_from_row(row: &PgRow) -> Result<AppVersion, StoreError> {
    Ok(AppVersion {
        id: row.try_get("id")?,
        version: row.try_get("version")?,
        device: row.try_get::<i16, _>("device")?.try_into()?,
        update_content: row.try_get("update_content")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl RecordStore for PostgresStore {
    async fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users u WHERE u.id = $1");

        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn query_users(&self, spec: &ListQuerySpec<UserFilter>) -> Result<Vec<User>, StoreError> {
        let filter = &spec.filter;
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {USER_COLUMNS} FROM users u WHERE u.status = ANY("
        ));
        builder
            .push_bind(user_status_codes(&filter.statuses))
            .push(")");

        if filter.paid_vip_only {
            builder
                .push(" AND u.vip_level <> ")
                .push_bind(VipLevel::Free.code());
        }
        if let GenderFilter::Only(gender) = filter.gender {
            builder.push(" AND u.gender = ").push_bind(gender.code());
        }
        if let Some(region) = &filter.region {
            builder
                .push(" AND u.province = ")
                .push_bind(region.province.clone())
                .push(" AND u.city = ")
                .push_bind(region.city.clone());
        }
        if let Some(exclude) = filter.exclude {
            builder.push(" AND u.id <> ").push_bind(exclude);
        }

        let rows = self.fetch(builder, spec).await?;
        rows.iter().map(user_from_row).collect()
    }

    async fn query_liked_me(
        &self,
        spec: &ListQuerySpec<LikedMeFilter>,
    ) -> Result<Vec<User>, StoreError> {
        let filter = &spec.filter;
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {USER_COLUMNS} FROM users u \
             JOIN user_likes l ON l.source_user_id = u.id \
             WHERE l.destination_user_id = "
        ));
        builder
            .push_bind(filter.destination)
            .push(" AND l.kind = ANY(")
            .push_bind(codes(&filter.kinds, |k| k.code()))
            .push(") AND u.status = ANY(")
            .push_bind(user_status_codes(&filter.liker_statuses))
            .push(")");

        let rows = self.fetch(builder, spec).await?;
        rows.iter().map(user_from_row).collect()
    }

    async fn query_visitors(
        &self,
        spec: &ListQuerySpec<VisitFilter>,
    ) -> Result<Vec<Visitor>, StoreError> {
        let filter = &spec.filter;
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {USER_COLUMNS}, v.visit_times, v.updated_at AS visited_at FROM users u \
             JOIN visit_records v ON v.source_user_id = u.id \
             WHERE v.destination_user_id = "
        ));
        builder
            .push_bind(filter.destination)
            .push(" AND u.status = ANY(")
            .push_bind(user_status_codes(&filter.visitor_statuses))
            .push(")");

        let rows = self.fetch(builder, spec).await?;
        rows.iter()
            .map(|row| {
                Ok(Visitor {
                    user: user_from_row(row)?,
                    visit_times: row.try_get("visit_times")?,
                    visited_at: row.try_get("visited_at")?,
                })
            })
            .collect()
    }

    async fn query_posts(&self, spec: &ListQuerySpec<PostFilter>) -> Result<Vec<Post>, StoreError> {
        let filter = &spec.filter;
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {POST_COLUMNS} FROM posts p LEFT JOIN users u ON u.id = p.user_id \
             WHERE p.status = ANY("
        ));
        builder
            .push_bind(post_status_codes(&filter.statuses))
            .push(")");

        if let Some(owner) = filter.owner {
            builder.push(" AND p.user_id = ").push_bind(owner);
        }
        if let Some(exclude) = filter.exclude_owner {
            builder.push(" AND p.user_id <> ").push_bind(exclude);
        }
        if let GenderFilter::Only(gender) = filter.author_gender {
            builder.push(" AND u.gender = ").push_bind(gender.code());
        }
        if let Some(region) = &filter.region {
            builder
                .push(" AND p.province = ")
                .push_bind(region.province.clone())
                .push(" AND p.city = ")
                .push_bind(region.city.clone());
        }
        if filter.liked_only {
            builder
                .push(" AND EXISTS (SELECT 1 FROM post_likes pl \
                       WHERE pl.post_id = p.id AND pl.status = ")
                .push_bind(PostLikeStatus::Liked.code())
                .push(")");
        }

        let rows = self.fetch(builder, spec).await?;
        rows.iter().map(post_from_row).collect()
    }

    async fn query_comments(
        &self,
        spec: &ListQuerySpec<CommentFilter>,
    ) -> Result<Vec<Comment>, StoreError> {
        let filter = &spec.filter;
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {COMMENT_COLUMNS} FROM comments c WHERE c.status = ANY("
        ));
        builder
            .push_bind(comment_status_codes(&filter.statuses))
            .push(")");

        if let Some(post) = filter.post {
            builder.push(" AND c.post_id = ").push_bind(post);
        }
        if let Some(recipient) = filter.recipient {
            builder.push(" AND c.to_user_id = ").push_bind(recipient);
        }

        let rows = self.fetch(builder, spec).await?;
        rows.iter().map(comment_from_row).collect()
    }

    async fn query_post_likes(
        &self,
        spec: &ListQuerySpec<PostLikeFilter>,
    ) -> Result<Vec<PostLike>, StoreError> {
        let filter = &spec.filter;
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {POST_LIKE_COLUMNS} FROM post_likes pl WHERE pl.post_user_id = "
        ));
        builder
            .push_bind(filter.post_owner)
            .push(" AND pl.status = ANY(")
            .push_bind(codes(&filter.statuses, |s| s.code()))
            .push(")");

        let rows = self.fetch(builder, spec).await?;
        rows.iter().map(post_like_from_row).collect()
    }

    async fn query_products(
        &self,
        spec: &ListQuerySpec<ProductFilter>,
    ) -> Result<Vec<Product>, StoreError> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {PRODUCT_COLUMNS} FROM products pr WHERE pr.device = "
        ));
        builder.push_bind(spec.filter.device.code());

        let rows = self.fetch(builder, spec).await?;
        rows.iter().map(product_from_row).collect()
    }

    async fn latest_app_version(&self, device: Device) -> Result<Option<AppVersion>, StoreError> {
        let query = format!(
            "SELECT {APP_VERSION_COLUMNS} FROM app_versions av WHERE av.device = $1 \
             ORDER BY av.created_at DESC, av.id DESC LIMIT 1"
        );

        let row = sqlx::query(&query)
            .bind(device.code())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(app_version_from_row).transpose()
    }
}
