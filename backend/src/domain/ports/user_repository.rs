//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{NewUser, PhoneNumber, User, UserAccount, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}"
            as service_unavailable("user store unavailable"),
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}"
            as internal,
        /// Phone or username already taken.
        Duplicate { field: String } => "user with this {field} already exists"
            as invalid_request,
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user and return the stored record.
    async fn insert(&self, user: &NewUser) -> Result<User, UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user together with the stored password hash.
    async fn find_account_by_phone(
        &self,
        phone: &PhoneNumber,
    ) -> Result<Option<UserAccount>, UserPersistenceError>;
}
