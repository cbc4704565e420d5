//! Session credentials, the persisted session model, and bearer-token expiry inspection.

pub mod expiry;
pub mod secret;
pub mod session;

pub use expiry::*;
pub use secret::*;
pub use session::*;
