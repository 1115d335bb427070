use crate::domain::model::{LicenseNumber, RegisteredAccount, VerificationOutcome};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 向登錄網站查詢一個號碼，每次呼叫都是獨立的完整流程
#[async_trait]
pub trait LicenseVerifier: Send + Sync {
    async fn verify(&self, license: &LicenseNumber) -> Result<VerificationOutcome>;
}

/// 依執照號碼查詢已註冊帳號
#[async_trait]
pub trait RecordLookup: Send + Sync {
    async fn find_by_license_number(
        &self,
        license: &LicenseNumber,
    ) -> Result<Option<RegisteredAccount>>;
}
