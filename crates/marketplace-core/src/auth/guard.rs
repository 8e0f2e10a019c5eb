use std::sync::Arc;

use tracing::debug;

use crate::access::Actor;
use crate::accounts::ActorRepository;
use crate::store::RepositoryError;

use super::token::{TokenCodec, TokenError};

const BEARER_PREFIX: &str = "Bearer ";

/// Why a credential did not resolve to an active actor.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("authentication required")]
    MissingCredential,
    #[error("authorization header must use the Bearer scheme")]
    MalformedCredential,
    #[error(transparent)]
    InvalidCredential(#[from] TokenError),
    #[error("account no longer exists")]
    UnknownActor,
    #[error("account is deactivated")]
    Deactivated,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl AuthError {
    /// Store failures are server-side; everything else means "not authenticated".
    pub fn is_unauthenticated(&self) -> bool {
        !matches!(self, AuthError::Repository(_))
    }
}

/// Resolves `Authorization` header values into active actors. Read-only.
pub struct AuthGuard<R> {
    repository: Arc<R>,
    codec: TokenCodec,
}

impl<R> AuthGuard<R>
where
    R: ActorRepository + 'static,
{
    pub fn new(repository: Arc<R>, codec: TokenCodec) -> Self {
        Self { repository, codec }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Resolve the raw header value (`Bearer <token>`) into the acting account.
    pub fn authenticate(&self, authorization: Option<&str>) -> Result<Actor, AuthError> {
        let token = bearer_token(authorization)?;
        let claims = self.codec.verify(token)?;
        let actor_id = claims.actor_id()?;

        let record = self
            .repository
            .fetch_actor(&actor_id)?
            .ok_or(AuthError::UnknownActor)?;

        if !record.is_active {
            return Err(AuthError::Deactivated);
        }

        Ok(record.to_actor())
    }

    /// Same resolution, but any failure yields an anonymous caller.
    pub fn authenticate_optional(&self, authorization: Option<&str>) -> Option<Actor> {
        match self.authenticate(authorization) {
            Ok(actor) => Some(actor),
            Err(AuthError::MissingCredential) => None,
            Err(err) => {
                debug!(error = %err, "treating caller as anonymous");
                None
            }
        }
    }
}

fn bearer_token(authorization: Option<&str>) -> Result<&str, AuthError> {
    let header = authorization
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(AuthError::MissingCredential)?;

    let token = header
        .strip_prefix(BEARER_PREFIX)
        .or_else(|| header.strip_prefix("bearer "))
        .map(str::trim)
        .ok_or(AuthError::MalformedCredential)?;

    if token.is_empty() || token.contains(char::is_whitespace) {
        return Err(AuthError::MalformedCredential);
    }
    Ok(token)
}
