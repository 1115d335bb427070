use scraper::{Html, Selector};

// 人機驗證元件的 class / id 完整 token
const WIDGET_MARKERS: &[&str] = &[
    "g-recaptcha",
    "h-captcha",
    "cf-turnstile",
    "cf-challenge",
    "challenge-form",
];

// 人機驗證服務載入腳本或 iframe 的網址片段
const SOURCE_MARKERS: &[&str] = &[
    "challenges.cloudflare.com",
    "cdn-cgi/challenge-platform",
    "hcaptcha.com",
    "google.com/recaptcha",
    "recaptcha.net",
];

/// 偵測 CAPTCHA 或反機器人頁面，回傳命中的標記
pub fn detect_challenge(document: &Html) -> Option<&'static str> {
    let widget_sel = Selector::parse("[id], [class]").expect("widget selector is valid");
    let source_sel = Selector::parse("iframe[src], script[src], form[action]")
        .expect("source selector is valid");

    for element in document.select(&widget_sel) {
        let el = element.value();
        let id = el.attr("id").map(str::to_ascii_lowercase);
        let classes = el.attr("class").unwrap_or_default().to_ascii_lowercase();

        let tokens = id.iter().map(String::as_str).chain(classes.split_whitespace());
        for token in tokens {
            if let Some(marker) = WIDGET_MARKERS.iter().copied().find(|m| *m == token) {
                return Some(marker);
            }
        }
    }

    for element in document.select(&source_sel) {
        let el = element.value();
        let Some(value) = el.attr("src").or_else(|| el.attr("action")) else {
            continue;
        };
        let value = value.to_ascii_lowercase();
        if let Some(marker) = SOURCE_MARKERS.iter().copied().find(|m| value.contains(m)) {
            return Some(marker);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_recaptcha_widget() {
        let document = Html::parse_document(
            r#"<form><div class="form-row g-recaptcha" data-sitekey="abc"></div></form>"#,
        );
        assert_eq!(detect_challenge(&document), Some("g-recaptcha"));
    }

    #[test]
    fn test_detects_hcaptcha_widget() {
        let document = Html::parse_document(r#"<div class="h-captcha" data-sitekey="k"></div>"#);
        assert_eq!(detect_challenge(&document), Some("h-captcha"));
    }

    #[test]
    fn test_detects_cloudflare_challenge_form() {
        let document = Html::parse_document(
            r#"<form id="challenge-form" action="/cdn-cgi/challenge-platform/h/b/orchestrate" method="POST"></form>"#,
        );
        assert_eq!(detect_challenge(&document), Some("challenge-form"));
    }

    #[test]
    fn test_detects_challenge_iframe_source() {
        let document = Html::parse_document(
            r#"<iframe src="https://challenges.cloudflare.com/turnstile/v0/frame"></iframe>"#,
        );
        assert_eq!(
            detect_challenge(&document),
            Some("challenges.cloudflare.com")
        );
    }

    #[test]
    fn test_ids_merely_mentioning_captcha_are_not_challenges() {
        let document = Html::parse_document(
            r#"<form><p id="lblCaptchaHelp" class="help captcha-note">Having trouble?</p></form>"#,
        );
        assert_eq!(detect_challenge(&document), None);
    }

    #[test]
    fn test_plain_pages_are_not_challenges() {
        let document = Html::parse_document(
            r#"<html><body><div id="results" class="grid"><a href="x">Jane</a></div></body></html>"#,
        );
        assert_eq!(detect_challenge(&document), None);
    }
}
