use serde::{Deserialize, Serialize};
use std::fmt;

/// 使用者輸入的執照號碼，格式由登錄網站決定，這裡不驗證
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LicenseNumber(String);

impl LicenseNumber {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LicenseNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LicenseNumber {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for LicenseNumber {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// 由第一次回應的 Set-Cookie 取得的 session cookie，只在單次驗證內有效
#[derive(Clone, PartialEq, Eq)]
pub struct SessionHandle {
    pub name: String,
    pub value: String,
}

impl SessionHandle {
    /// 取 `Set-Cookie` 的 `name=value`，捨棄 `;` 之後的屬性
    pub fn from_set_cookie(header: &str) -> Option<Self> {
        let pair = header.split(';').next()?;
        let (name, value) = pair.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        Some(Self {
            name: name.to_string(),
            value: value.trim().to_string(),
        })
    }

    /// Value for the outbound `Cookie` request header.
    pub fn cookie_header(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

// 不在日誌中輸出 cookie 值
impl fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionHandle")
            .field("name", &self.name)
            .field("value", &"<redacted>")
            .finish()
    }
}

/// 從搜尋頁取得的隱藏欄位，postback 時原樣送回
#[derive(Clone, PartialEq, Eq)]
pub struct FormTokens {
    pub view_state: String,
    pub event_validation: String,
}

impl fmt::Debug for FormTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormTokens")
            .field("view_state_len", &self.view_state.len())
            .field("event_validation_len", &self.event_validation.len())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseRecord {
    pub name: String,
    pub license_type: String,
    pub status: String,
    pub license_number: String,
}

/// 單次查詢的結果；`NoMatch` 是正常回答，不是錯誤
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    Matched(LicenseRecord),
    NoMatch,
}

impl VerificationOutcome {
    pub fn record(&self) -> Option<&LicenseRecord> {
        match self {
            Self::Matched(record) => Some(record),
            Self::NoMatch => None,
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, Self::Matched(_))
    }
}

/// An account already on file, as returned by the storage collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredAccount {
    pub account_id: String,
    pub license_number: LicenseNumber,
}
