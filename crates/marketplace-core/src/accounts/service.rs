use std::sync::Arc;

use tracing::info;

use crate::access::{can_manage, has_permission, hierarchy_of, Actor, ActorId, PermissionFlag, Role};
use crate::auth::{TokenCodec, TokenError};
use crate::clock::Clock;
use crate::store::RepositoryError;
use crate::validation::{require_email, require_text, ValidationError};

use super::domain::{
    ActorRecord, Credentials, LoginGrant, MemberDraft, OwnershipTransfer, Registration,
};
use super::password::{HashedPassword, PasswordError};
use super::repository::ActorRepository;

const MAX_NAME_LEN: usize = 120;

/// Error raised by the account service.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("forbidden: {0}")]
    Forbidden(&'static str),
    #[error("account not found")]
    NotFound,
    #[error("an account with this email already exists")]
    EmailTaken,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("account is deactivated")]
    Deactivated,
    #[error(transparent)]
    Password(PasswordError),
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for AccountError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::NotFound => Self::NotFound,
            RepositoryError::Conflict => Self::EmailTaken,
            other => Self::Repository(other),
        }
    }
}

impl From<PasswordError> for AccountError {
    fn from(value: PasswordError) -> Self {
        match value {
            PasswordError::Length => Self::Validation(ValidationError::new(
                "password",
                PasswordError::Length.to_string(),
            )),
            other => Self::Password(other),
        }
    }
}

/// Registration, login, and the staff-management operations over accounts.
pub struct AccountService<R> {
    repository: Arc<R>,
    codec: TokenCodec,
    clock: Arc<dyn Clock>,
}

impl<R> AccountService<R>
where
    R: ActorRepository + 'static,
{
    pub fn new(repository: Arc<R>, codec: TokenCodec, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            codec,
            clock,
        }
    }

    /// Self-service sign-up. Always yields a plain `user` with no permissions.
    pub fn register(&self, registration: Registration) -> Result<Actor, AccountError> {
        let email = require_email(&registration.email)?;
        require_text("name", &registration.name, MAX_NAME_LEN)?;
        let password = HashedPassword::from_plain(&registration.password)?;

        let record = self.insert_new(email, registration.name, password, Role::User)?;
        info!(actor_id = %record.id, "account registered");
        Ok(record.to_actor())
    }

    pub fn login(&self, credentials: Credentials) -> Result<LoginGrant, AccountError> {
        let email = require_email(&credentials.email)?;
        let record = self
            .repository
            .find_actor_by_email(&email)?
            .ok_or(AccountError::InvalidCredentials)?;

        if !record.password.verify(&credentials.password)? {
            return Err(AccountError::InvalidCredentials);
        }
        if !record.is_active {
            return Err(AccountError::Deactivated);
        }

        let (token, expires_at) = self.codec.issue(&record.id, self.clock.now())?;
        Ok(LoginGrant {
            token,
            token_type: "Bearer",
            expires_at,
            actor: record.to_actor(),
        })
    }

    /// Staff creation: the requested role may not outrank the creator.
    pub fn create_member(&self, creator: &Actor, draft: MemberDraft) -> Result<Actor, AccountError> {
        let email = require_email(&draft.email)?;
        require_text("name", &draft.name, MAX_NAME_LEN)?;
        HashedPassword::check_policy(&draft.password)?;

        require_user_manager(creator)?;
        if draft.role.hierarchy() < hierarchy_of(Some(creator)) {
            return Err(AccountError::Forbidden(
                "cannot create an account above your own rank",
            ));
        }

        let password = HashedPassword::from_plain(&draft.password)?;

        let record = self.insert_new(email, draft.name, password, draft.role)?;
        info!(
            actor_id = %record.id,
            created_by = %creator.id,
            role = %record.role,
            "staff account created"
        );
        Ok(record.to_actor())
    }

    /// Reassign a role, recomputing rank and permission snapshot.
    pub fn change_role(
        &self,
        manager: &Actor,
        target_id: &ActorId,
        role: Role,
    ) -> Result<Actor, AccountError> {
        if manager.id == *target_id {
            return Err(AccountError::Forbidden("cannot change your own role"));
        }
        require_user_manager(manager)?;
        if role.hierarchy() < hierarchy_of(Some(manager)) {
            return Err(AccountError::Forbidden(
                "cannot assign a role above your own rank",
            ));
        }

        let mut record = self.managed_record(manager, target_id)?;
        let previous = record.role;
        record.assign_role(role, self.clock.now());
        self.repository.update_actor(record.clone())?;

        info!(
            actor_id = %record.id,
            changed_by = %manager.id,
            from = %previous,
            to = %role,
            "role reassigned"
        );
        Ok(record.to_actor())
    }

    pub fn set_active(
        &self,
        manager: &Actor,
        target_id: &ActorId,
        active: bool,
    ) -> Result<Actor, AccountError> {
        if manager.id == *target_id {
            return Err(AccountError::Forbidden(
                "cannot change activation of your own account",
            ));
        }
        require_user_manager(manager)?;

        let mut record = self.managed_record(manager, target_id)?;
        record.is_active = active;
        record.updated_at = self.clock.now();
        self.repository.update_actor(record.clone())?;

        info!(actor_id = %record.id, changed_by = %manager.id, active, "activation toggled");
        Ok(record.to_actor())
    }

    /// Delete an account, handing everything it owns to `manager` in one atomic step. Callers
    /// go through [`Marketplace::delete_member`](crate::Marketplace::delete_member), which also
    /// drops listing views that still name the deleted account.
    pub(crate) fn delete_member(
        &self,
        manager: &Actor,
        target_id: &ActorId,
    ) -> Result<OwnershipTransfer, AccountError> {
        if manager.id == *target_id {
            return Err(AccountError::Forbidden("cannot delete your own account"));
        }
        require_user_manager(manager)?;
        self.managed_record(manager, target_id)?;

        let transfer = self
            .repository
            .delete_actor_transferring(target_id, &manager.id)?;

        info!(
            actor_id = %target_id,
            deleted_by = %manager.id,
            properties = transfer.properties_reassigned,
            approvals = transfer.approvals_reassigned,
            inquiries = transfer.inquiries_unassigned,
            "account deleted with ownership transfer"
        );
        Ok(transfer)
    }

    /// Re-derive a stored snapshot from the registry without changing the role.
    pub fn refresh_permissions(
        &self,
        manager: &Actor,
        target_id: &ActorId,
    ) -> Result<Actor, AccountError> {
        require_user_manager(manager)?;
        let mut record = self.managed_record(manager, target_id)?;
        if !record.snapshot_is_current() {
            record.recompute_snapshot(self.clock.now());
            self.repository.update_actor(record.clone())?;
            info!(actor_id = %record.id, "permission snapshot refreshed");
        }
        Ok(record.to_actor())
    }

    pub fn get(&self, id: &ActorId) -> Result<Actor, AccountError> {
        self.repository
            .fetch_actor(id)?
            .map(|record| record.to_actor())
            .ok_or(AccountError::NotFound)
    }

    /// Bootstrap path used by the binary to guarantee an administrator exists.
    pub fn ensure_admin(&self, email: &str, password: &str) -> Result<Actor, AccountError> {
        let email = require_email(email)?;
        if let Some(existing) = self.repository.find_actor_by_email(&email)? {
            return Ok(existing.to_actor());
        }

        let password = HashedPassword::from_plain(password)?;
        let record = self.insert_new(email, "Administrator".to_string(), password, Role::Admin)?;
        info!(actor_id = %record.id, "bootstrap administrator created");
        Ok(record.to_actor())
    }

    fn insert_new(
        &self,
        email: String,
        name: String,
        password: HashedPassword,
        role: Role,
    ) -> Result<ActorRecord, AccountError> {
        if self.repository.find_actor_by_email(&email)?.is_some() {
            return Err(AccountError::EmailTaken);
        }
        let record = ActorRecord::new(
            email,
            name.trim().to_string(),
            password,
            role,
            self.clock.now(),
        );
        Ok(self.repository.insert_actor(record)?)
    }

    fn managed_record(
        &self,
        manager: &Actor,
        target_id: &ActorId,
    ) -> Result<ActorRecord, AccountError> {
        let record = self
            .repository
            .fetch_actor(target_id)?
            .ok_or(AccountError::NotFound)?;

        if !can_manage(Some(manager), Some(&record.to_actor())) {
            return Err(AccountError::Forbidden(
                "cannot manage an account with more authority",
            ));
        }
        Ok(record)
    }
}

fn require_user_manager(actor: &Actor) -> Result<(), AccountError> {
    if has_permission(Some(actor), PermissionFlag::ManageUsers) {
        Ok(())
    } else {
        Err(AccountError::Forbidden("requires user management permission"))
    }
}
