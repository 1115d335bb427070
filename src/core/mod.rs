pub mod challenge;
pub mod client;
pub mod form;
pub mod results;
pub mod tokens;

pub use crate::domain::model::{
    FormTokens, LicenseNumber, LicenseRecord, SessionHandle, VerificationOutcome,
};
pub use crate::domain::ports::{LicenseVerifier, RecordLookup};
pub use crate::utils::error::Result;
