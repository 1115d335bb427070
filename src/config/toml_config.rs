use crate::utils::error::{Result, VerifyError};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 15;
pub const DEFAULT_CONNECT_TIMEOUT_SECONDS: u64 = 5;

pub const DEFAULT_VIEW_STATE_FIELD: &str = "__VIEWSTATE";
pub const DEFAULT_EVENT_VALIDATION_FIELD: &str = "__EVENTVALIDATION";
pub const DEFAULT_LICENSE_FIELD: &str = "txtLicenseNumber";
pub const DEFAULT_SUBMIT_FIELD: &str = "btnSearch";
pub const DEFAULT_SUBMIT_VALUE: &str = "Search";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifierConfig {
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub form: FormConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    pub search_url: String,
    pub user_agent: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub connect_timeout_seconds: Option<u64>,
    /// 指定 session cookie 名稱；未設定時取第一個 Set-Cookie
    pub session_cookie: Option<String>,
}

/// WebForms 表單欄位名稱，上游改版時只需調整設定
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormConfig {
    pub license_field: Option<String>,
    pub view_state_field: Option<String>,
    pub event_validation_field: Option<String>,
    pub submit_field: Option<String>,
    pub submit_value: Option<String>,
}

impl FormConfig {
    pub fn license_field(&self) -> &str {
        self.license_field.as_deref().unwrap_or(DEFAULT_LICENSE_FIELD)
    }

    pub fn view_state_field(&self) -> &str {
        self.view_state_field
            .as_deref()
            .unwrap_or(DEFAULT_VIEW_STATE_FIELD)
    }

    pub fn event_validation_field(&self) -> &str {
        self.event_validation_field
            .as_deref()
            .unwrap_or(DEFAULT_EVENT_VALIDATION_FIELD)
    }

    pub fn submit_field(&self) -> &str {
        self.submit_field.as_deref().unwrap_or(DEFAULT_SUBMIT_FIELD)
    }

    pub fn submit_value(&self) -> &str {
        self.submit_value.as_deref().unwrap_or(DEFAULT_SUBMIT_VALUE)
    }
}

impl VerifierConfig {
    /// 以預設欄位名稱建立設定
    pub fn new(search_url: impl Into<String>) -> Self {
        Self {
            upstream: UpstreamConfig {
                search_url: search_url.into(),
                user_agent: None,
                timeout_seconds: None,
                connect_timeout_seconds: None,
                session_cookie: None,
            },
            form: FormConfig::default(),
        }
    }

    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(VerifyError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| VerifyError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${REGISTRY_URL})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| VerifyError::ConfigError {
            message: format!("env substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn search_url(&self) -> &str {
        &self.upstream.search_url
    }

    pub fn user_agent(&self) -> &str {
        self.upstream
            .user_agent
            .as_deref()
            .unwrap_or(DEFAULT_USER_AGENT)
    }

    pub fn session_cookie(&self) -> Option<&str> {
        self.upstream.session_cookie.as_deref()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(
            self.upstream
                .timeout_seconds
                .unwrap_or(DEFAULT_TIMEOUT_SECONDS),
        )
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(
            self.upstream
                .connect_timeout_seconds
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECONDS),
        )
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("upstream.search_url", &self.upstream.search_url)?;
        validation::validate_non_empty_string("upstream.user_agent", self.user_agent())?;

        if let Some(name) = self.session_cookie() {
            validation::validate_non_empty_string("upstream.session_cookie", name)?;
        }
        if let Some(timeout) = self.upstream.timeout_seconds {
            validation::validate_positive_number("upstream.timeout_seconds", timeout, 1)?;
        }
        if let Some(timeout) = self.upstream.connect_timeout_seconds {
            validation::validate_positive_number("upstream.connect_timeout_seconds", timeout, 1)?;
        }

        let fields = [
            ("form.license_field", self.form.license_field()),
            ("form.view_state_field", self.form.view_state_field()),
            ("form.event_validation_field", self.form.event_validation_field()),
            ("form.submit_field", self.form.submit_field()),
        ];
        for (name, value) in fields {
            validation::validate_non_empty_string(name, value)?;
        }

        if self.form.view_state_field() == self.form.event_validation_field() {
            return Err(VerifyError::InvalidConfigValueError {
                field: "form.event_validation_field".to_string(),
                value: self.form.event_validation_field().to_string(),
                reason: "must differ from form.view_state_field".to_string(),
            });
        }

        Ok(())
    }
}

impl Validate for VerifierConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
