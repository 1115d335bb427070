use std::fmt;
use thiserror::Error;

/// 驗證流程的各個階段，用於錯誤分類與日誌
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    SessionAcquire,
    TokenExtract,
    SearchSubmit,
    ResultParse,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::SessionAcquire => "session_acquire",
            Phase::TokenExtract => "token_extract",
            Phase::SearchSubmit => "search_submit",
            Phase::ResultParse => "result_parse",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("Upstream unavailable during {phase}: {reason}")]
    UpstreamUnavailable { phase: Phase, reason: String },

    #[error("Malformed page during {phase}: {reason}")]
    MalformedPage { phase: Phase, reason: String },

    #[error("Anti-bot challenge during {phase} (marker '{marker}')")]
    ChallengeDetected { phase: Phase, marker: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Storage error: {message}")]
    StorageError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// 上游網站暫時無法使用，可重試
    Upstream,
    /// 上游頁面結構改變，整合需要維護
    Integration,
    /// 上游要求人機驗證 (CAPTCHA)，不會自動處理
    Blocked,
    Configuration,
    System,
}

impl VerifyError {
    pub fn upstream(phase: Phase, reason: impl Into<String>) -> Self {
        Self::UpstreamUnavailable {
            phase,
            reason: reason.into(),
        }
    }

    pub fn malformed(phase: Phase, reason: impl Into<String>) -> Self {
        Self::MalformedPage {
            phase,
            reason: reason.into(),
        }
    }

    pub fn challenge(phase: Phase, marker: impl Into<String>) -> Self {
        Self::ChallengeDetected {
            phase,
            marker: marker.into(),
        }
    }

    /// 連線、逾時、讀取失敗一律視為上游無法使用
    pub fn from_transport(phase: Phase, err: reqwest::Error) -> Self {
        let reason = if err.is_timeout() {
            format!("request timed out: {}", err)
        } else if err.is_connect() {
            format!("connection failed: {}", err)
        } else {
            err.to_string()
        };
        Self::upstream(phase, reason)
    }

    pub fn phase(&self) -> Option<Phase> {
        match self {
            Self::UpstreamUnavailable { phase, .. }
            | Self::MalformedPage { phase, .. }
            | Self::ChallengeDetected { phase, .. } => Some(*phase),
            _ => None,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::UpstreamUnavailable { .. })
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UpstreamUnavailable { .. } => ErrorCategory::Upstream,
            Self::MalformedPage { .. } => ErrorCategory::Integration,
            Self::ChallengeDetected { .. } => ErrorCategory::Blocked,
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::IoError(_) | Self::SerializationError(_) | Self::StorageError { .. } => {
                ErrorCategory::System
            }
        }
    }

    /// 給終端使用者的訊息，不洩漏上游細節
    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Upstream | ErrorCategory::Integration | ErrorCategory::Blocked => {
                "License verification is temporarily unavailable. Please try again later."
                    .to_string()
            }
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::System => format!("Internal error: {}", self),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Upstream => "The registry site did not answer; retry the lookup later",
            ErrorCategory::Integration => {
                "The registry page layout changed; the form field names or result pattern need updating"
            }
            ErrorCategory::Blocked => {
                "The registry is serving an anti-bot challenge; complete the lookup manually or wait before retrying"
            }
            ErrorCategory::Configuration => "Check the configuration file and command-line flags",
            ErrorCategory::System => "Check file permissions and available disk space",
        }
    }
}

pub type Result<T> = std::result::Result<T, VerifyError>;
