//! Bearer-credential resolution.

mod guard;
mod token;

pub use guard::{AuthError, AuthGuard};
pub use token::{Claims, TokenCodec, TokenError};
