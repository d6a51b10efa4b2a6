use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::error::ListError;
use crate::core::pagination::PageRequest;
use crate::models::domain::{
    CommentStatus, Coordinate, Device, Gender, LikeKind, PostId, PostLikeStatus, PostStatus,
    Region, User, UserId, UserStatus,
};

/// Collection a list query runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Users,
    Likes,
    Visits,
    Posts,
    Comments,
    PostLikes,
    Products,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Users => "users",
            EntityKind::Likes => "likes",
            EntityKind::Visits => "visits",
            EntityKind::Posts => "posts",
            EntityKind::Comments => "comments",
            EntityKind::PostLikes => "post_likes",
            EntityKind::Products => "products",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Ordering key, interpreted against the primary record of each collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    LastLogin,
    CreatedAt,
    UpdatedAt,
    Price,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl OrderBy {
    pub const fn desc(key: SortKey) -> Self {
        Self {
            key,
            direction: SortDirection::Desc,
        }
    }

    pub const fn asc(key: SortKey) -> Self {
        Self {
            key,
            direction: SortDirection::Asc,
        }
    }
}

/// Optional gender restriction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenderFilter {
    #[default]
    Any,
    Only(Gender),
}

impl GenderFilter {
    #[inline]
    pub fn admits(self, gender: Gender) -> bool {
        match self {
            GenderFilter::Any => true,
            GenderFilter::Only(wanted) => wanted == gender,
        }
    }
}

impl From<Option<Gender>> for GenderFilter {
    fn from(value: Option<Gender>) -> Self {
        value.map_or(GenderFilter::Any, GenderFilter::Only)
    }
}

/// Ties a filter type to the collection it selects from
pub trait QueryFilter {
    const ENTITY: EntityKind;
}

/// Filter over user profiles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserFilter {
    pub statuses: Vec<UserStatus>,
    pub paid_vip_only: bool,
    pub gender: GenderFilter,
    pub region: Option<Region>,
    pub exclude: Option<UserId>,
}

/// Users holding a like of one of `kinds` towards `destination`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LikedMeFilter {
    pub destination: UserId,
    pub kinds: Vec<LikeKind>,
    pub liker_statuses: Vec<UserStatus>,
}

/// Visitors of `destination`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitFilter {
    pub destination: UserId,
    pub visitor_statuses: Vec<UserStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostFilter {
    pub statuses: Vec<PostStatus>,
    pub owner: Option<UserId>,
    pub exclude_owner: Option<UserId>,
    pub author_gender: GenderFilter,
    pub region: Option<Region>,
    /// Only posts with at least one live like
    pub liked_only: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentFilter {
    pub post: Option<PostId>,
    pub recipient: Option<UserId>,
    pub statuses: Vec<CommentStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostLikeFilter {
    pub post_owner: UserId,
    pub statuses: Vec<PostLikeStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductFilter {
    pub device: Device,
}

impl QueryFilter for UserFilter {
    const ENTITY: EntityKind = EntityKind::Users;
}

impl QueryFilter for LikedMeFilter {
    const ENTITY: EntityKind = EntityKind::Likes;
}

impl QueryFilter for VisitFilter {
    const ENTITY: EntityKind = EntityKind::Visits;
}

impl QueryFilter for PostFilter {
    const ENTITY: EntityKind = EntityKind::Posts;
}

impl QueryFilter for CommentFilter {
    const ENTITY: EntityKind = EntityKind::Comments;
}

impl QueryFilter for PostLikeFilter {
    const ENTITY: EntityKind = EntityKind::PostLikes;
}

impl QueryFilter for ProductFilter {
    const ENTITY: EntityKind = EntityKind::Products;
}

/// One paginated fetch: what to select, how to order it, which window to return
///
/// `page: None` returns the full filtered set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListQuerySpec<F> {
    pub filter: F,
    pub order: OrderBy,
    pub page: Option<PageRequest>,
}

impl<F: QueryFilter> ListQuerySpec<F> {
    pub fn new(filter: F, order: OrderBy, page: Option<PageRequest>) -> Self {
        Self {
            filter,
            order,
            page,
        }
    }

    pub fn entity(&self) -> EntityKind {
        F::ENTITY
    }
}

/// Statuses a listed user may have when no stricter rule applies
pub const LISTABLE_USER_STATUSES: [UserStatus; 3] =
    [UserStatus::Incomplete, UserStatus::Active, UserStatus::Muted];

/// Post statuses shown in public feeds
pub const FEED_POST_STATUSES: [PostStatus; 2] = [PostStatus::Published, PostStatus::PendingReview];

impl ListQuerySpec<LikedMeFilter> {
    pub fn liked_me(requester: UserId, page: PageRequest) -> Self {
        Self::new(
            LikedMeFilter {
                destination: requester,
                kinds: vec![LikeKind::Liked],
                liker_statuses: LISTABLE_USER_STATUSES.to_vec(),
            },
            OrderBy::desc(SortKey::UpdatedAt),
            Some(page),
        )
    }
}

impl ListQuerySpec<VisitFilter> {
    pub fn visitors(requester: UserId, page: PageRequest) -> Self {
        Self::new(
            VisitFilter {
                destination: requester,
                visitor_statuses: LISTABLE_USER_STATUSES.to_vec(),
            },
            OrderBy::desc(SortKey::UpdatedAt),
            Some(page),
        )
    }
}

impl ListQuerySpec<UserFilter> {
    pub fn vip_users(page: PageRequest) -> Self {
        Self::new(
            UserFilter {
                statuses: vec![UserStatus::Active],
                paid_vip_only: true,
                gender: GenderFilter::Only(Gender::Female),
                region: None,
                exclude: None,
            },
            OrderBy::desc(SortKey::LastLogin),
            Some(page),
        )
    }

    pub fn new_users(gender: GenderFilter, page: PageRequest) -> Self {
        Self::new(
            UserFilter {
                statuses: vec![UserStatus::Active],
                paid_vip_only: false,
                gender,
                region: None,
                exclude: None,
            },
            OrderBy::desc(SortKey::CreatedAt),
            Some(page),
        )
    }

    pub fn nearby_users(
        requester: UserId,
        region: Region,
        gender: GenderFilter,
        page: PageRequest,
    ) -> Self {
        Self::new(
            UserFilter {
                statuses: vec![UserStatus::Active],
                paid_vip_only: false,
                gender,
                region: Some(region),
                exclude: Some(requester),
            },
            OrderBy::desc(SortKey::LastLogin),
            Some(page),
        )
    }
}

impl ListQuerySpec<PostFilter> {
    pub fn new_posts(gender: GenderFilter, page: PageRequest) -> Self {
        Self::new(
            PostFilter {
                statuses: FEED_POST_STATUSES.to_vec(),
                owner: None,
                exclude_owner: None,
                author_gender: gender,
                region: None,
                liked_only: false,
            },
            OrderBy::desc(SortKey::CreatedAt),
            Some(page),
        )
    }

    pub fn recommended_posts(gender: GenderFilter, page: PageRequest) -> Self {
        let mut spec = Self::new_posts(gender, page);
        spec.filter.liked_only = true;
        spec
    }

    pub fn nearby_posts(
        requester: UserId,
        region: Region,
        gender: GenderFilter,
        page: PageRequest,
    ) -> Self {
        let mut spec = Self::new_posts(gender, page);
        spec.filter.region = Some(region);
        spec.filter.exclude_owner = Some(requester);
        spec
    }

    /// Posts on `owner`'s profile; the owner also sees posts still under review
    pub fn profile_posts(owner: UserId, viewer: UserId, page: PageRequest) -> Self {
        let statuses = if viewer == owner {
            vec![PostStatus::Published, PostStatus::PendingReview]
        } else {
            vec![PostStatus::Published]
        };

        Self::new(
            PostFilter {
                statuses,
                owner: Some(owner),
                exclude_owner: None,
                author_gender: GenderFilter::Any,
                region: None,
                liked_only: false,
            },
            OrderBy::desc(SortKey::CreatedAt),
            Some(page),
        )
    }
}

impl ListQuerySpec<CommentFilter> {
    pub fn post_comments(post: PostId, page: Option<PageRequest>) -> Self {
        Self::new(
            CommentFilter {
                post: Some(post),
                recipient: None,
                statuses: vec![CommentStatus::Normal, CommentStatus::PendingReview],
            },
            OrderBy::desc(SortKey::CreatedAt),
            page,
        )
    }

    pub fn comment_inbox(recipient: UserId, page: PageRequest) -> Self {
        Self::new(
            CommentFilter {
                post: None,
                recipient: Some(recipient),
                statuses: vec![CommentStatus::Normal],
            },
            OrderBy::desc(SortKey::CreatedAt),
            Some(page),
        )
    }
}

impl ListQuerySpec<PostLikeFilter> {
    pub fn praise_inbox(post_owner: UserId, page: PageRequest) -> Self {
        Self::new(
            PostLikeFilter {
                post_owner,
                statuses: vec![PostLikeStatus::Liked],
            },
            OrderBy::desc(SortKey::CreatedAt),
            Some(page),
        )
    }
}

impl ListQuerySpec<ProductFilter> {
    pub fn products(device: Device) -> Self {
        Self::new(ProductFilter { device }, OrderBy::asc(SortKey::Price), None)
    }
}

/// The already-resolved identity a list is fetched for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requester {
    pub id: UserId,
    pub coordinate: Option<Coordinate>,
    pub region: Option<Region>,
}

impl Requester {
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            coordinate: None,
            region: None,
        }
    }

    pub fn with_location(mut self, coordinate: Coordinate, region: Region) -> Self {
        self.coordinate = Some(coordinate);
        self.region = Some(region);
        self
    }
}

impl From<&User> for Requester {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            coordinate: user.coordinate(),
            region: user.region(),
        }
    }
}

/// A list query anchored at the requester's location
#[derive(Debug, Clone, PartialEq)]
pub struct GeoListQuerySpec<F> {
    pub requester: UserId,
    pub origin: Coordinate,
    pub spec: ListQuerySpec<F>,
}

impl<F: QueryFilter> GeoListQuerySpec<F> {
    /// Fails with `MissingLocation` when the requester has no coordinate
    pub fn new(requester: &Requester, spec: ListQuerySpec<F>) -> Result<Self, ListError> {
        let origin = requester
            .coordinate
            .ok_or(ListError::MissingLocation(requester.id))?;

        Ok(Self {
            requester: requester.id,
            origin,
            spec,
        })
    }
}
