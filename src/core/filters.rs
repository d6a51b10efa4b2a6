use std::cmp::Ordering;

use crate::models::{
    Comment, CommentFilter, GenderFilter, LikedMeFilter, OrderBy, Post, PostFilter, PostLike,
    PostLikeFilter, Product, ProductFilter, SortDirection, SortKey, User, UserFilter, UserLike,
    VisitFilter, VisitRecord, Visitor,
};

/// Check if a user passes a user-list filter
///
/// Status is checked first, so a terminal account is rejected regardless of
/// the other constraints, even when the filter lists its status.
#[inline]
pub fn user_matches(user: &User, filter: &UserFilter) -> bool {
    if user.status.is_terminal() || !filter.statuses.contains(&user.status) {
        return false;
    }

    if filter.exclude == Some(user.id) {
        return false;
    }

    if filter.paid_vip_only && !user.is_vip() {
        return false;
    }

    if !filter.gender.admits(user.gender) {
        return false;
    }

    match &filter.region {
        Some(region) => user.region().as_ref() == Some(region),
        None => true,
    }
}

/// Check a like record and the liking user against a liked-me filter
#[inline]
pub fn liker_matches(like: &UserLike, liker: &User, filter: &LikedMeFilter) -> bool {
    like.destination_user_id == filter.destination
        && like.source_user_id == liker.id
        && filter.kinds.contains(&like.kind)
        && !liker.status.is_terminal()
        && filter.liker_statuses.contains(&liker.status)
}

#[inline]
pub fn visitor_matches(visit: &VisitRecord, visitor: &User, filter: &VisitFilter) -> bool {
    visit.destination_user_id == filter.destination
        && visit.source_user_id == visitor.id
        && !visitor.status.is_terminal()
        && filter.visitor_statuses.contains(&visitor.status)
}

/// Check if a post passes a post-list filter
///
/// `author` is the post owner's profile, `has_live_like` whether any like on
/// the post is currently active.
#[inline]
pub fn post_matches(
    post: &Post,
    author: Option<&User>,
    has_live_like: bool,
    filter: &PostFilter,
) -> bool {
    if post.status.is_terminal() || !filter.statuses.contains(&post.status) {
        return false;
    }

    if let Some(owner) = filter.owner {
        if post.user_id != owner {
            return false;
        }
    }

    if filter.exclude_owner == Some(post.user_id) {
        return false;
    }

    if filter.liked_only && !has_live_like {
        return false;
    }

    if let Some(region) = &filter.region {
        if post.region().as_ref() != Some(region) {
            return false;
        }
    }

    match author {
        Some(user) => filter.author_gender.admits(user.gender),
        None => filter.author_gender == GenderFilter::Any,
    }
}

#[inline]
pub fn comment_matches(comment: &Comment, filter: &CommentFilter) -> bool {
    !comment.status.is_terminal()
        && filter.statuses.contains(&comment.status)
        && filter.post.map_or(true, |post| comment.post_id == post)
        && filter
            .recipient
            .map_or(true, |recipient| comment.to_user_id == recipient)
}

#[inline]
pub fn post_like_matches(like: &PostLike, filter: &PostLikeFilter) -> bool {
    like.post_user_id == filter.post_owner && filter.statuses.contains(&like.status)
}

#[inline]
pub fn product_matches(product: &Product, filter: &ProductFilter) -> bool {
    product.device == filter.device
}

/// Values a record exposes for ordering
///
/// Timestamps are reported in microseconds. A missing value sorts last in
/// both directions, matching `NULLS LAST` on the SQL side.
pub trait SortFields {
    fn sort_field(&self, key: SortKey) -> Option<i64>;

    /// Secondary key keeping pages stable when the primary key ties
    fn tie_breaker(&self) -> i64;
}

impl SortFields for User {
    fn sort_field(&self, key: SortKey) -> Option<i64> {
        match key {
            SortKey::LastLogin => self.last_login_at.map(|t| t.timestamp_micros()),
            SortKey::CreatedAt => Some(self.created_at.timestamp_micros()),
            SortKey::UpdatedAt => Some(self.updated_at.timestamp_micros()),
            SortKey::Price => None,
        }
    }

    fn tie_breaker(&self) -> i64 {
        self.id
    }
}

impl SortFields for Visitor {
    fn sort_field(&self, key: SortKey) -> Option<i64> {
        match key {
            SortKey::UpdatedAt => Some(self.visited_at.timestamp_micros()),
            other => self.user.sort_field(other),
        }
    }

    fn tie_breaker(&self) -> i64 {
        self.user.id
    }
}

impl SortFields for Post {
    fn sort_field(&self, key: SortKey) -> Option<i64> {
        match key {
            SortKey::CreatedAt => Some(self.created_at.timestamp_micros()),
            SortKey::UpdatedAt => Some(self.updated_at.timestamp_micros()),
            SortKey::LastLogin | SortKey::Price => None,
        }
    }

    fn tie_breaker(&self) -> i64 {
        self.id
    }
}

impl SortFields for Comment {
    fn sort_field(&self, key: SortKey) -> Option<i64> {
        match key {
            SortKey::CreatedAt => Some(self.created_at.timestamp_micros()),
            SortKey::UpdatedAt => Some(self.updated_at.timestamp_micros()),
            SortKey::LastLogin | SortKey::Price => None,
        }
    }

    fn tie_breaker(&self) -> i64 {
        self.id
    }
}

impl SortFields for PostLike {
    fn sort_field(&self, key: SortKey) -> Option<i64> {
        match key {
            SortKey::CreatedAt => Some(self.created_at.timestamp_micros()),
            SortKey::UpdatedAt => Some(self.updated_at.timestamp_micros()),
            SortKey::LastLogin | SortKey::Price => None,
        }
    }

    fn tie_breaker(&self) -> i64 {
        self.id
    }
}

impl SortFields for Product {
    fn sort_field(&self, key: SortKey) -> Option<i64> {
        match key {
            SortKey::Price => Some(self.price_cents),
            _ => None,
        }
    }

    fn tie_breaker(&self) -> i64 {
        self.id
    }
}

/// Compare two records under `order`
pub fn compare_records<T: SortFields>(a: &T, b: &T, order: OrderBy) -> Ordering {
    let directed = |ord: Ordering| match order.direction {
        SortDirection::Asc => ord,
        SortDirection::Desc => ord.reverse(),
    };

    let primary = match (a.sort_field(order.key), b.sort_field(order.key)) {
        (Some(x), Some(y)) => directed(x.cmp(&y)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };

    primary.then_with(|| directed(a.tie_breaker().cmp(&b.tie_breaker())))
}

/// Sort records in place under `order`
pub fn sort_records<T: SortFields>(items: &mut [T], order: OrderBy) {
    items.sort_by(|a, b| compare_records(a, b, order));
}
