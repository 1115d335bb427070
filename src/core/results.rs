use crate::config::FormConfig;
use crate::core::challenge::detect_challenge;
use crate::core::tokens::has_input_named;
use crate::domain::model::{LicenseRecord, VerificationOutcome};
use crate::utils::error::{Phase, Result, VerifyError};
use scraper::{ElementRef, Html, Node, Selector};

/// 解析查詢結果頁：`<a>` 後接三個 `<span>` 為一列，文字原樣保留
pub fn parse_result(html: &str, form: &FormConfig) -> Result<VerificationOutcome> {
    let document = Html::parse_document(html);
    parse_result_document(&document, form)
}

pub fn parse_result_document(document: &Html, form: &FormConfig) -> Result<VerificationOutcome> {
    let mut rows = result_rows(document);

    if rows.is_empty() {
        // 仍是 postback 頁面就是查無資料，即使頁面上掛著 CAPTCHA 元件
        if has_input_named(document, form.view_state_field()) {
            return Ok(VerificationOutcome::NoMatch);
        }
        if let Some(marker) = detect_challenge(document) {
            return Err(VerifyError::challenge(Phase::ResultParse, marker));
        }
        return Err(VerifyError::malformed(
            Phase::ResultParse,
            "response is neither a results page nor an empty search page",
        ));
    }

    if rows.len() > 1 {
        tracing::warn!(
            rows = rows.len(),
            "Registry returned multiple result rows, using the first"
        );
    }

    Ok(VerificationOutcome::Matched(rows.swap_remove(0)))
}

/// All result rows in document order.
pub fn result_rows(document: &Html) -> Vec<LicenseRecord> {
    let anchor_sel = Selector::parse("a").expect("anchor selector is valid");

    document
        .select(&anchor_sel)
        .filter_map(row_from_anchor)
        .collect()
}

fn row_from_anchor(anchor: ElementRef<'_>) -> Option<LicenseRecord> {
    let mut spans = Vec::with_capacity(3);

    for sibling in anchor.next_siblings() {
        if spans.len() == 3 {
            break;
        }
        match sibling.value() {
            Node::Text(text) if text.trim().is_empty() => continue,
            Node::Comment(_) => continue,
            Node::Element(element) if element.name() == "span" => {
                let span = ElementRef::wrap(sibling)?;
                spans.push(element_text(&span));
            }
            // 其他元素或文字打斷了結構，不算一列
            _ => return None,
        }
    }

    if spans.len() < 3 {
        return None;
    }

    let mut spans = spans.into_iter();
    Some(LicenseRecord {
        name: element_text(&anchor),
        license_type: spans.next()?,
        status: spans.next()?,
        license_number: spans.next()?,
    })
}

fn element_text(el: &ElementRef<'_>) -> String {
    el.text().collect()
}
