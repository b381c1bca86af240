pub mod factory;
pub mod propagate;
#[cfg(test)]
pub mod testing;
mod types;
pub mod verifier;

pub use factory::build_verifier;
pub use propagate::propagate;
pub use types::VerifiedIdentity;
pub use verifier::{IdentityVerifier, bearer_token};
