//! Services that talk to the outside world on behalf of the handlers.

pub mod cookies;
pub mod identity;

pub use cookies::SessionCookie;
pub use identity::GoogleIdentityProvider;
