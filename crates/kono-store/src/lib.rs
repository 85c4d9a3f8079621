//! SQLite-backed user persistence for the kono bot.
//!
//! ## Modules
//!
//! - [`sqlite_pool`] – pool wrapper, creates the DB file if missing
//! - [`user_repo`] – `SqliteUserStore`, the `UserStore` port over SQLite

mod sqlite_pool;
mod user_repo;


pub use sqlite_pool::SqlitePoolManager;
pub use user_repo::SqliteUserStore;
