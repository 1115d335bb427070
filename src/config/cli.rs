use crate::config::toml_config::VerifierConfig;
use crate::utils::error::{Result, VerifyError};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "license-verify")]
#[command(about = "Verify an EMS/medical license number against the state registry")]
pub struct CliConfig {
    #[arg(long, help = "License number to look up")]
    pub license: String,

    #[arg(long, help = "TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Registry search page URL (overrides the config file)")]
    pub search_url: Option<String>,

    #[arg(long, help = "Per-request timeout in seconds")]
    pub timeout: Option<u64>,

    #[arg(long, help = "Print the outcome as JSON")]
    pub json: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    /// 合併設定檔與命令列參數，命令列優先
    pub fn resolve(&self) -> Result<VerifierConfig> {
        let mut config = match (&self.config, &self.search_url) {
            (Some(path), _) => VerifierConfig::from_file(path)?,
            (None, Some(url)) => VerifierConfig::new(url.clone()),
            (None, None) => {
                return Err(VerifyError::MissingConfigError {
                    field: "--config or --search-url".to_string(),
                })
            }
        };

        if let Some(url) = &self.search_url {
            config.upstream.search_url = url.clone();
        }
        if let Some(timeout) = self.timeout {
            config.upstream.timeout_seconds = Some(timeout);
        }

        Ok(config)
    }
}
