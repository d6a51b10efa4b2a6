// Model exports
pub mod domain;
pub mod page;
pub mod query;

pub use domain::{
    AppVersion, Comment, CommentId, CommentKind, CommentStatus, Coordinate, Device, Gender, InvalidCoordinate,
    LikeKind, MediaKind, Post, PostId, PostLike, PostLikeStatus, PostStatus, Product, Region,
    UnknownCode, User, UserId, UserLike, UserStatus, VipLevel, VisitRecord,
};
pub use page::{NearbyPost, NearbyUser, ResultPage, Visitor};
pub use query::{
    CommentFilter, EntityKind, GenderFilter, GeoListQuerySpec, LikedMeFilter, ListQuerySpec,
    OrderBy, PostFilter, PostLikeFilter, ProductFilter, QueryFilter, Requester, SortDirection,
    SortKey, UserFilter, VisitFilter,
};
