//! Pre-solve checks on a model and the impulse problem posed to it.
pub mod error;
pub mod rules;
pub mod validator;

pub use error::{ValidationError, ValidationErrorType};
pub use validator::Validator;
