use crate::config::FormConfig;
use crate::domain::model::FormTokens;
use crate::utils::error::{Phase, Result, VerifyError};
use scraper::{ElementRef, Html, Selector};

/// 依欄位 name（其次 id）找出隱藏欄位，原樣讀取 value
pub fn extract_tokens(html: &str, form: &FormConfig) -> Result<FormTokens> {
    let document = Html::parse_document(html);
    extract_tokens_from(&document, form)
}

pub fn extract_tokens_from(document: &Html, form: &FormConfig) -> Result<FormTokens> {
    let view_state = hidden_field_value(document, form.view_state_field())?;
    let event_validation = hidden_field_value(document, form.event_validation_field())?;

    Ok(FormTokens {
        view_state,
        event_validation,
    })
}

/// 頁面是否仍帶有指定 input（用來辨識 postback 頁面）
pub fn has_input_named(document: &Html, field: &str) -> bool {
    find_input(document, field).is_some()
}

fn hidden_field_value(document: &Html, field: &str) -> Result<String> {
    let input = find_input(document, field).ok_or_else(|| {
        VerifyError::malformed(
            Phase::TokenExtract,
            format!("hidden field '{}' not found", field),
        )
    })?;

    input
        .value()
        .attr("value")
        .map(str::to_string)
        .ok_or_else(|| {
            VerifyError::malformed(
                Phase::TokenExtract,
                format!("hidden field '{}' has no value attribute", field),
            )
        })
}

fn find_input<'a>(document: &'a Html, field: &str) -> Option<ElementRef<'a>> {
    let input_sel = Selector::parse("input").expect("input selector is valid");

    // name 優先，id 作為備援
    document
        .select(&input_sel)
        .find(|el| el.value().attr("name") == Some(field))
        .or_else(|| {
            document
                .select(&input_sel)
                .find(|el| el.value().attr("id") == Some(field))
        })
}
