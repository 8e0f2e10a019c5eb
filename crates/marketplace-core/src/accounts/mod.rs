//! Account lifecycle: registration, login, and staff management under the role hierarchy.

pub mod domain;
mod password;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    ActorRecord, Credentials, LoginGrant, MemberDraft, OwnershipTransfer, Registration,
};
pub use password::{HashedPassword, PasswordError};
pub use repository::ActorRepository;
pub use router::account_router;
pub use service::{AccountError, AccountService};
