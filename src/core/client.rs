use crate::config::VerifierConfig;
use crate::core::challenge::detect_challenge;
use crate::core::form::{SearchForm, FORM_CONTENT_TYPE};
use crate::core::results::parse_result_document;
use crate::core::tokens::extract_tokens_from;
use crate::domain::model::{FormTokens, LicenseNumber, SessionHandle, VerificationOutcome};
use crate::domain::ports::LicenseVerifier;
use crate::utils::error::{Phase, Result, VerifyError};
use crate::utils::validation::Validate;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, Response};
use scraper::Html;
use tracing::Instrument;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

/// 模擬瀏覽器查詢執照登錄網站；每次查詢各自取得 session 與 token
#[derive(Debug, Clone)]
pub struct VerificationClient {
    http: Client,
    config: VerifierConfig,
}

impl VerificationClient {
    pub fn new(config: VerifierConfig) -> Result<Self> {
        config.validate()?;

        let mut default_headers = HeaderMap::new();
        default_headers.insert(header::ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        default_headers.insert(
            header::ACCEPT_LANGUAGE,
            HeaderValue::from_static(ACCEPT_LANGUAGE),
        );

        let http = Client::builder()
            .user_agent(config.user_agent())
            .default_headers(default_headers)
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| VerifyError::ConfigError {
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Runs one full lookup: session, tokens, postback, parse.
    pub async fn verify_license(&self, license: &LicenseNumber) -> Result<VerificationOutcome> {
        let span = tracing::info_span!("verify_license", license = %license);

        async {
            let result = self.run_protocol(license).await;
            match &result {
                Ok(VerificationOutcome::Matched(_)) => {
                    tracing::info!("Registry lookup matched");
                }
                Ok(VerificationOutcome::NoMatch) => {
                    tracing::info!("Registry lookup found no record");
                }
                Err(e) => {
                    tracing::warn!(
                        phase = ?e.phase(),
                        category = ?e.category(),
                        "Registry lookup failed: {}",
                        e
                    );
                }
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn run_protocol(&self, license: &LicenseNumber) -> Result<VerificationOutcome> {
        let idle = Idle {
            client: self,
            license,
        };
        let acquired = idle.acquire_session().await?;
        let extracted = acquired.extract_tokens()?;
        let submitted = extracted.submit_search().await?;
        submitted.parse()
    }

    fn select_session(&self, response: &Response) -> Option<SessionHandle> {
        let mut cookies = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .filter_map(SessionHandle::from_set_cookie);

        match self.config.session_cookie() {
            Some(name) => cookies.find(|cookie| cookie.name == name),
            None => cookies.next(),
        }
    }
}

#[async_trait::async_trait]
impl LicenseVerifier for VerificationClient {
    async fn verify(&self, license: &LicenseNumber) -> Result<VerificationOutcome> {
        self.verify_license(license).await
    }
}

// 每個狀態只能往下一個狀態前進，不能跳過或重複使用

struct Idle<'a> {
    client: &'a VerificationClient,
    license: &'a LicenseNumber,
}

struct SessionAcquired<'a> {
    client: &'a VerificationClient,
    license: &'a LicenseNumber,
    session: SessionHandle,
    page: String,
}

struct TokensExtracted<'a> {
    client: &'a VerificationClient,
    license: &'a LicenseNumber,
    session: SessionHandle,
    tokens: FormTokens,
}

struct SearchSubmitted<'a> {
    client: &'a VerificationClient,
    page: String,
}

impl<'a> Idle<'a> {
    async fn acquire_session(self) -> Result<SessionAcquired<'a>> {
        let phase = Phase::SessionAcquire;
        let url = self.client.config.search_url();

        tracing::debug!(url, "GET search page");
        let response = self
            .client
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| VerifyError::from_transport(phase, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(VerifyError::upstream(
                phase,
                format!("search page returned HTTP {}", status),
            ));
        }

        // 沒有 session 就不可能送出有效的 postback，直接失敗
        let session = self.client.select_session(&response).ok_or_else(|| {
            VerifyError::upstream(phase, "search page did not set a session cookie")
        })?;

        let page = response
            .text()
            .await
            .map_err(|e| VerifyError::from_transport(phase, e))?;

        tracing::debug!(cookie = %session.name, bytes = page.len(), "Session acquired");
        Ok(SessionAcquired {
            client: self.client,
            license: self.license,
            session,
            page,
        })
    }
}

impl<'a> SessionAcquired<'a> {
    fn extract_tokens(self) -> Result<TokensExtracted<'a>> {
        let form = &self.client.config.form;
        let document = Html::parse_document(&self.page);

        let tokens = extract_tokens_from(&document, form).map_err(|err| {
            match detect_challenge(&document) {
                Some(marker) => VerifyError::challenge(Phase::TokenExtract, marker),
                None => err,
            }
        })?;

        tracing::debug!("Tokens extracted");
        Ok(TokensExtracted {
            client: self.client,
            license: self.license,
            session: self.session,
            tokens,
        })
    }
}

impl<'a> TokensExtracted<'a> {
    async fn submit_search(self) -> Result<SearchSubmitted<'a>> {
        let phase = Phase::SearchSubmit;
        let url = self.client.config.search_url();
        let form = SearchForm::build(self.license, &self.tokens, &self.client.config.form);

        tracing::debug!(url, "POST search form");
        let response = self
            .client
            .http
            .post(url)
            .header(header::COOKIE, self.session.cookie_header())
            .header(header::CONTENT_TYPE, FORM_CONTENT_TYPE)
            .header(header::REFERER, url)
            .body(form.encode())
            .send()
            .await
            .map_err(|e| VerifyError::from_transport(phase, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(VerifyError::upstream(
                phase,
                format!("search postback returned HTTP {}", status),
            ));
        }

        let page = response
            .text()
            .await
            .map_err(|e| VerifyError::from_transport(phase, e))?;

        tracing::debug!(bytes = page.len(), "Search submitted");
        Ok(SearchSubmitted {
            client: self.client,
            page,
        })
    }
}

impl SearchSubmitted<'_> {
    fn parse(self) -> Result<VerificationOutcome> {
        let document = Html::parse_document(&self.page);
        parse_result_document(&document, &self.client.config.form)
    }
}
