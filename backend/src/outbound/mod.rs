//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL repositories using Diesel ORM
//! - **cache**: Redis-backed content cache, SMS codes and captcha answers
//! - **token**: HMAC-signed JWT access tokens
//! - **password**: Argon2id password hashing
//! - **sms**: SMS delivery
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business logic.

pub mod cache;
pub mod password;
pub mod persistence;
pub mod sms;
pub mod token;
