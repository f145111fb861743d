//! Sign-up screen: form state, validation and submission.

pub mod controller;
pub mod dto;
pub mod error;
pub mod form;
pub mod schema;

pub use controller::{Phase, SignUpController, SubmitOutcome};
pub use dto::{Alert, Credentials, Field, Route};
pub use error::{SignUpError, SignUpFailure};
pub use form::FormState;
pub use schema::{FieldErrors, Rule, ValidationSchema};
