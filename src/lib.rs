pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::VerifierConfig;

pub use adapters::memory::InMemoryRecordLookup;
pub use app::license_check::{CheckOutcome, LicenseCheckService};
pub use crate::core::client::VerificationClient;
pub use domain::model::{LicenseNumber, LicenseRecord, VerificationOutcome};
pub use utils::error::{Result, VerifyError};
