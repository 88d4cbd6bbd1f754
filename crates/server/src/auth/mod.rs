//! Trust-the-host authentication.
//!
//! The chat platform authenticates users before proxying requests and names
//! the user in a header. Requests without it are rejected; nothing else is
//! verified here.

pub mod identity;
pub mod middleware;

pub use identity::UserId;
pub use middleware::UserHeaderLayer;
