//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repositories are thin translators between Diesel rows and domain types.
//! Row structs (`models.rs`) and table definitions (`schema.rs`) stay
//! private to this module, and every database failure is mapped into the
//! owning port's error type.
//!
//! # Example
//!
//! ```ignore
//! use textbook_api::outbound::persistence::{DbPool, DieselTextbookRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/textbooks")).await?;
//! let repo = DieselTextbookRepository::new(pool);
//! ```

mod diesel_basic_error_mapping;
mod diesel_textbook_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_textbook_repository::DieselTextbookRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
