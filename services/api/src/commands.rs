use chrono::Utc;
use clap::Args;
use marketplace_core::access::{ActorId, PermissionFlag, Role};
use marketplace_core::auth::{TokenCodec, TokenError};
use marketplace_core::config::{AppConfig, MAX_DURATION_SECS};
use marketplace_core::error::AppError;

#[derive(Args, Debug, Default)]
pub(crate) struct TokenArgs {
    /// Actor id to place in the token subject; a fresh id is generated when omitted
    #[arg(long)]
    pub(crate) actor: Option<ActorId>,
    /// Lifetime in seconds, overriding APP_TOKEN_TTL_SECS
    #[arg(long, value_parser = clap::value_parser!(i64).range(1..=MAX_DURATION_SECS as i64))]
    pub(crate) ttl_secs: Option<i64>,
}

pub(crate) fn run_roles() {
    println!("Role registry (rank 1 is the most authoritative)");
    for line in role_lines() {
        println!("{line}");
    }
}

pub(crate) fn run_token(args: TokenArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let ttl = match args.ttl_secs {
        Some(secs) => token_lifetime(secs)?,
        None => config.auth.token_ttl(),
    };
    let actor = args.actor.unwrap_or_default();

    let codec = TokenCodec::new(&config.auth.jwt_secret, ttl);
    let (token, expires_at) = codec.issue(&actor, Utc::now())?;

    println!("Subject:    {actor}");
    println!("Expires at: {}", expires_at.to_rfc3339());
    println!("Bearer {token}");
    Ok(())
}

fn token_lifetime(secs: i64) -> Result<chrono::Duration, TokenError> {
    chrono::Duration::try_seconds(secs).ok_or(TokenError::Lifetime)
}

fn role_lines() -> Vec<String> {
    Role::ALL
        .into_iter()
        .map(|role| {
            let granted: Vec<&str> = role
                .permissions()
                .granted()
                .into_iter()
                .map(PermissionFlag::field)
                .collect();
            let granted = if granted.is_empty() {
                "(none)".to_string()
            } else {
                granted.join(", ")
            };
            format!(
                "  {rank}. {name:<18} {label:<18} {granted}",
                rank = role.hierarchy(),
                name = role.as_str(),
                label = role.label(),
            )
        })
        .collect()
}
