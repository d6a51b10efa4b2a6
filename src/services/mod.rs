// Service exports
pub mod identity;
pub mod memory;
pub mod postgres;
pub mod store;

pub use identity::{session_key, CachedIdentityResolver, IdentityError, IdentityResolver};
pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use store::{RecordStore, StoreError};
