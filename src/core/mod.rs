// Core listing exports
pub mod distance;
pub mod error;
pub mod filters;
pub mod lister;
pub mod pagination;

pub use distance::{distance, EARTH_RADIUS_KM};
pub use error::ListError;
pub use filters::{compare_records, sort_records, SortFields};
pub use lister::Lister;
pub use pagination::{PageParams, PageRequest};
