//! Lianjie Feed - listing core for the Lianjie dating app
//!
//! Great-circle distance between users, and the filtered, ordered, paginated
//! list queries behind the app's screens: who liked me, visitors, VIP and new
//! members, nearby people, the post feeds, comments and the purchasable
//! product catalog.

pub mod config;
pub mod core;
pub mod models;
pub mod services;
pub mod telemetry;

// Re-export commonly used types
pub use crate::core::{distance, EARTH_RADIUS_KM, ListError, Lister, PageParams, PageRequest};
pub use crate::models::{Coordinate, GenderFilter, ListQuerySpec, Requester, ResultPage};
pub use crate::services::{InMemoryStore, PostgresStore, RecordStore, StoreError};
