//! Authentication and authorization: the password policy, the persisted
//! single-session lifecycle, and the role guard.

pub mod guard;
pub mod password;
pub(crate) mod session;

pub use guard::Policy;
