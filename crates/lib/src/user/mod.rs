//! User registration, credential verification, and administrative state
//!
//! The [`UserManager`] is the single entry point the service layers call;
//! it owns the registration algorithm and credential checks, and delegates
//! persistence to the injected [`UserStore`](crate::store::UserStore).
//!
//! Record lifecycle: created (enabled) by registration, toggled between
//! enabled and disabled by administrators, and removed by username. A
//! removed record admits no further transitions; the store guarantees this
//! by key absence.

mod errors;
mod manager;
mod types;

pub use errors::UserError;
pub use manager::UserManager;
pub use types::{RegisteredUser, RegistrationRequest};
