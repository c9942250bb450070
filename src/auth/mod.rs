//! Bearer-token authentication.
//!
//! The [`authenticate`] middleware resolves the identity behind an
//! `Authorization: Bearer` access token and attaches it to the request.
//! Handlers read it with the [`Auth`] and [`MaybeAuth`] extractors.

mod bearer;
mod errors;
mod extractors;
mod middleware;
mod password;
mod state;
mod types;

pub use bearer::get_bearer_token;
pub use errors::{ApiAuthError, AuthErrorKind};
pub use extractors::{Auth, MaybeAuth};
pub use middleware::{Resolution, authenticate, resolve_identity};
pub use password::{hash_password, verify_password, verify_password_unknown_user};
pub use state::HasAuthBackend;
pub use types::{AuthContext, AuthUnavailable, Authority, authorities_of};
