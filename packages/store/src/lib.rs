pub mod identity;
pub mod models;

mod memory;
pub use memory::MemoryStore;

pub use identity::{IdentityStore, StoreError};
pub use models::{NewUser, User, UserId, UserInfo};
