use crate::domain::model::{LicenseNumber, LicenseRecord, VerificationOutcome};
use crate::domain::ports::{LicenseVerifier, RecordLookup};
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const NOT_FOUND_MESSAGE: &str = "No license matching that number was found in the registry.";
pub const CONFLICT_MESSAGE: &str = "This license number is already associated with an account.";
pub const UNAVAILABLE_MESSAGE: &str =
    "License verification is temporarily unavailable. Please try again later.";

/// 註冊 API 要回給前端的結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    Verified(LicenseRecord),
    AlreadyRegistered,
    NotFound,
    /// 上游或儲存層失敗；細節只記錄在伺服器端
    Unavailable,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<LicenseRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub checked_at: DateTime<Utc>,
}

impl CheckOutcome {
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Verified(_) => 200,
            Self::AlreadyRegistered => 409,
            Self::NotFound => 404,
            Self::Unavailable => 503,
        }
    }

    pub fn message(&self) -> Option<&'static str> {
        match self {
            Self::Verified(_) => None,
            Self::AlreadyRegistered => Some(CONFLICT_MESSAGE),
            Self::NotFound => Some(NOT_FOUND_MESSAGE),
            Self::Unavailable => Some(UNAVAILABLE_MESSAGE),
        }
    }

    pub fn to_response(&self, checked_at: DateTime<Utc>) -> CheckResponse {
        let status = match self {
            Self::Verified(_) => "verified",
            Self::AlreadyRegistered => "conflict",
            Self::NotFound => "not_found",
            Self::Unavailable => "unavailable",
        };
        let record = match self {
            Self::Verified(record) => Some(record.clone()),
            _ => None,
        };

        CheckResponse {
            status,
            record,
            message: self.message(),
            checked_at,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!(self.to_response(Utc::now()))
    }
}

impl From<VerificationOutcome> for CheckOutcome {
    fn from(outcome: VerificationOutcome) -> Self {
        match outcome {
            VerificationOutcome::Matched(record) => Self::Verified(record),
            VerificationOutcome::NoMatch => Self::NotFound,
        }
    }
}

/// 註冊時的執照檢查：先查登錄網站，再擋下已被帳號使用的號碼
pub struct LicenseCheckService<V: LicenseVerifier, L: RecordLookup> {
    verifier: V,
    lookup: L,
}

impl<V: LicenseVerifier, L: RecordLookup> LicenseCheckService<V, L> {
    pub fn new(verifier: V, lookup: L) -> Self {
        Self { verifier, lookup }
    }

    pub async fn check(&self, license: &LicenseNumber) -> CheckOutcome {
        let record = match self.verifier.verify(license).await {
            Ok(VerificationOutcome::Matched(record)) => record,
            Ok(outcome) => return outcome.into(),
            Err(e) => {
                tracing::error!(
                    license = %license,
                    category = ?e.category(),
                    "License verification failed: {}",
                    e
                );
                tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
                return CheckOutcome::Unavailable;
            }
        };

        match self.lookup.find_by_license_number(license).await {
            Ok(Some(account)) => {
                tracing::info!(
                    license = %license,
                    account = %account.account_id,
                    "License already registered"
                );
                CheckOutcome::AlreadyRegistered
            }
            Ok(None) => CheckOutcome::Verified(record),
            Err(e) => {
                tracing::error!(license = %license, "Account lookup failed: {}", e);
                CheckOutcome::Unavailable
            }
        }
    }
}
