use crate::domain::model::{LicenseNumber, RegisteredAccount};
use crate::domain::ports::RecordLookup;
use crate::utils::error::{Result, VerifyError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// 記憶體內的帳號查詢，供 CLI 與測試使用
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecordLookup {
    accounts: Arc<RwLock<HashMap<LicenseNumber, RegisteredAccount>>>,
}

impl InMemoryRecordLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, account: RegisteredAccount) -> Result<()> {
        let mut accounts = self.accounts.write().map_err(|_| VerifyError::StorageError {
            message: "account index lock poisoned".to_string(),
        })?;
        accounts.insert(account.license_number.clone(), account);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.accounts.read().map(|a| a.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RecordLookup for InMemoryRecordLookup {
    async fn find_by_license_number(
        &self,
        license: &LicenseNumber,
    ) -> Result<Option<RegisteredAccount>> {
        self.accounts
            .read()
            .map(|accounts| accounts.get(license).cloned())
            .map_err(|_| VerifyError::StorageError {
                message: "account index lock poisoned".to_string(),
            })
    }
}
