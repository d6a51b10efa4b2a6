use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type UserId = i64;
pub type PostId = i64;
pub type CommentId = i64;

/// A stored status/type code that does not map to any known variant
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} code: {code}")]
pub struct UnknownCode {
    pub kind: &'static str,
    pub code: i16,
}

/// Declares a small-integer storage enum with `code()` and `TryFrom<i16>`.
macro_rules! storage_codes {
    ($(#[$meta:meta])* $name:ident as $label:literal { $($variant:ident = $code:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Storage code of this variant
            pub const fn code(self) -> i16 {
                match self {
                    $(Self::$variant => $code),+
                }
            }
        }

        impl TryFrom<i16> for $name {
            type Error = UnknownCode;

            fn try_from(code: i16) -> Result<Self, Self::Error> {
                match code {
                    $($code => Ok(Self::$variant),)+
                    _ => Err(UnknownCode { kind: $label, code }),
                }
            }
        }
    };
}

storage_codes! {
    /// Account lifecycle state
    UserStatus as "user status" {
        Incomplete = 1,
        Active = 2,
        Muted = 3,
        Banned = 4,
        Deactivated = 5,
    }
}

storage_codes! {
    Gender as "gender" { Male = 1, Female = 2 }
}

storage_codes! {
    VipLevel as "vip level" { Free = 1, Vip = 2, Svip = 3 }
}

storage_codes! {
    /// Moderation state of a post
    PostStatus as "post status" {
        Published = 0,
        PendingReview = 1,
        Rejected = 2,
        Deleted = 3,
    }
}

storage_codes! {
    MediaKind as "media kind" { Image = 0, Video = 1 }
}

storage_codes! {
    /// Moderation state of a comment
    CommentStatus as "comment status" {
        Normal = 0,
        PendingReview = 1,
        Rejected = 2,
    }
}

storage_codes! {
    /// Position of a comment in a thread
    CommentKind as "comment kind" {
        OnPost = 0,
        Reply = 1,
        ReplyToReply = 2,
    }
}

storage_codes! {
    /// Kind of a user-to-user like record
    LikeKind as "like kind" { Liked = 0, Disliked = 1, SuperLiked = 2 }
}

storage_codes! {
    PostLikeStatus as "post like status" { Withdrawn = 0, Liked = 1 }
}

storage_codes! {
    Device as "device" { Ios = 1, Android = 2, Other = 3 }
}

impl UserStatus {
    /// Banned and deactivated accounts never show up in any listing
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Banned | Self::Deactivated)
    }
}

impl PostStatus {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Rejected | Self::Deleted)
    }
}

impl CommentStatus {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Rejected)
    }
}

/// Coordinate out of range or not finite
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("invalid coordinate ({latitude}, {longitude})")]
pub struct InvalidCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// Latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Build a coordinate without range checks
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Build a coordinate, rejecting values outside [-90, 90] / [-180, 180]
    pub fn validated(latitude: f64, longitude: f64) -> Result<Self, InvalidCoordinate> {
        if (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude) {
            Ok(Self::new(latitude, longitude))
        } else {
            Err(InvalidCoordinate { latitude, longitude })
        }
    }

    /// Both parts present, or nothing
    pub fn from_parts(latitude: Option<f64>, longitude: Option<f64>) -> Option<Self> {
        match (latitude, longitude) {
            (Some(lat), Some(lon)) => Some(Self::new(lat, lon)),
            _ => None,
        }
    }
}

/// Administrative region used by the nearby lists
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    pub province: String,
    pub city: String,
}

impl Region {
    pub fn new(province: impl Into<String>, city: impl Into<String>) -> Self {
        Self {
            province: province.into(),
            city: city.into(),
        }
    }

    pub fn from_parts(province: Option<&str>, city: Option<&str>) -> Option<Self> {
        match (province, city) {
            (Some(p), Some(c)) => Some(Self::new(p, c)),
            _ => None,
        }
    }
}

/// User profile record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub nickname: String,
    pub status: UserStatus,
    pub gender: Gender,
    pub avatar: String,
    pub vip_level: VipLevel,
    #[serde(default)]
    pub vip_expire_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub whats_up: Option<String>,
    pub constellation: String,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub province: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub profile_photo_urls: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub last_login_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn coordinate(&self) -> Option<Coordinate> {
        Coordinate::from_parts(self.latitude, self.longitude)
    }

    pub fn region(&self) -> Option<Region> {
        Region::from_parts(self.province.as_deref(), self.city.as_deref())
    }

    pub fn is_vip(&self) -> bool {
        self.vip_level != VipLevel::Free
    }
}

/// Post ("moment") record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub user_id: UserId,
    pub kind: MediaKind,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    pub cover_url: String,
    pub media_urls: String,
    pub status: PostStatus,
    #[serde(default)]
    pub province: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn coordinate(&self) -> Option<Coordinate> {
        Coordinate::from_parts(self.latitude, self.longitude)
    }

    pub fn region(&self) -> Option<Region> {
        Region::from_parts(self.province.as_deref(), self.city.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    pub user_id: UserId,
    pub content: String,
    pub kind: CommentKind,
    /// Set for replies
    #[serde(default)]
    pub source_comment_id: Option<CommentId>,
    /// Owner of the post (top-level) or of the comment being replied to
    pub to_user_id: UserId,
    pub status: CommentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One user's like/dislike of another
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserLike {
    pub id: i64,
    pub source_user_id: UserId,
    pub destination_user_id: UserId,
    pub kind: LikeKind,
    pub updated_at: DateTime<Utc>,
}

/// Profile visit counter, one row per (visitor, visited) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitRecord {
    pub id: i64,
    pub source_user_id: UserId,
    pub destination_user_id: UserId,
    pub visit_times: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostLike {
    pub id: i64,
    pub post_id: PostId,
    pub post_user_id: UserId,
    pub user_id: UserId,
    pub status: PostLikeStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// In-app purchase product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price_cents: i64,
    #[serde(default)]
    pub original_price_cents: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub iap_identifier: Option<String>,
    pub device: Device,
}

/// Published client release for one device platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppVersion {
    pub id: i64,
    pub version: String,
    pub device: Device,
    #[serde(default)]
    pub update_content: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_round_trip_through_storage() {
        assert_eq!(UserStatus::try_from(2), Ok(UserStatus::Active));
        assert_eq!(PostStatus::PendingReview.code(), 1);
        assert_eq!(
            CommentStatus::try_from(9),
            Err(UnknownCode { kind: "comment status", code: 9 })
        );
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(UserStatus::Banned.is_terminal());
        assert!(UserStatus::Deactivated.is_terminal());
        assert!(!UserStatus::Muted.is_terminal());
        assert!(PostStatus::Deleted.is_terminal());
        assert!(!PostStatus::PendingReview.is_terminal());
        assert!(CommentStatus::Rejected.is_terminal());
    }

    #[test]
    fn test_coordinate_validation() {
        assert!(Coordinate::validated(39.9042, 116.4074).is_ok());
        assert!(Coordinate::validated(91.0, 0.0).is_err());
        assert!(Coordinate::validated(0.0, -180.5).is_err());
        assert!(Coordinate::validated(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_partial_location_is_no_location() {
        assert_eq!(Coordinate::from_parts(Some(1.0), None), None);
        assert_eq!(Region::from_parts(Some("Guangdong"), None), None);
    }
}
