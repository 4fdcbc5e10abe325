/// Password verification and acceptance of externally authenticated
/// identities.
mod identity;
/// The session lifecycle: login, refresh, logout and the federation handoff.
mod session;
/// Signing and verification of access and refresh tokens.
mod token;

pub use self::{identity::*, session::*, token::*};
