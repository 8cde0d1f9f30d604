//! # Database module: PostgreSQL identity store and schema management
//!
//! - [`connect`] opens the connection pool. The pool is created once in `main` and
//!   handed to whatever needs it; nothing here is process-global.
//! - [`PgIdentityStore`] implements [`store::IdentityStore`] over the `users` table.
//! - [`migrate`], [`reset`] and [`seed`] manage the schema and the demo data behind
//!   the `database.reset` switch.

mod pool;
mod schema;
mod users;

pub use pool::connect;
pub use schema::{migrate, reset, seed, DEMO_USERS};
pub use users::PgIdentityStore;
