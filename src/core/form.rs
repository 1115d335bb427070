use crate::config::FormConfig;
use crate::domain::model::{FormTokens, LicenseNumber};
use url::form_urlencoded;

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// 查詢 postback 的表單內容：執照號碼、兩個 token 與送出按鈕欄位
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchForm {
    fields: Vec<(String, String)>,
}

impl SearchForm {
    pub fn build(license: &LicenseNumber, tokens: &FormTokens, form: &FormConfig) -> Self {
        let fields = vec![
            (form.license_field().to_string(), license.as_str().to_string()),
            (form.view_state_field().to_string(), tokens.view_state.clone()),
            (
                form.event_validation_field().to_string(),
                tokens.event_validation.clone(),
            ),
            (form.submit_field().to_string(), form.submit_value().to_string()),
        ];
        Self { fields }
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// `application/x-www-form-urlencoded` body.
    pub fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.fields.iter())
            .finish()
    }
}
