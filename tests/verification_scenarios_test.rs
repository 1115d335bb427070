use anyhow::Result;
use httpmock::prelude::*;
use license_verify::utils::error::Phase;
use license_verify::{
    LicenseNumber, LicenseRecord, VerificationClient, VerificationOutcome, VerifierConfig,
    VerifyError,
};
use std::time::Duration;

const SEARCH_PATH: &str = "/Verification/Search.aspx";

fn search_page(view_state: &str, event_validation: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html><head><title>License Lookup</title></head>
<body>
<form method="post" action="./Search.aspx" id="form1">
  <div class="aspNetHidden">
    <input type="hidden" name="__VIEWSTATE" id="__VIEWSTATE" value="{}" />
    <input type="hidden" name="__VIEWSTATEGENERATOR" id="__VIEWSTATEGENERATOR" value="C2EE9ABB" />
    <input type="hidden" name="__EVENTVALIDATION" id="__EVENTVALIDATION" value="{}" />
  </div>
  <label for="txtLicenseNumber">License #</label>
  <input name="txtLicenseNumber" type="text" id="txtLicenseNumber" />
  <input type="submit" name="btnSearch" value="Search" id="btnSearch" />
  <div id="pnlResults">{{ROWS}}</div>
</form>
</body></html>"#,
        view_state, event_validation
    )
}

fn results_page(rows: &str) -> String {
    search_page("EF56", "GH78").replace("{ROWS}", rows)
}

fn empty_search_page() -> String {
    search_page("AB12", "CD34").replace("{ROWS}", "")
}

fn jane_row() -> &'static str {
    r#"<div class="result"><a href="Detail.aspx?id=4411">Jane Doe</a>
        <span>EMT-P</span>
        <span>Active</span>
        <span>12345</span></div>"#
}

fn client_for(server: &MockServer) -> VerificationClient {
    VerificationClient::new(VerifierConfig::new(server.url(SEARCH_PATH)))
        .expect("valid client config")
}

/// 情境 A：取得 session 與 token 後送出查詢，回傳一筆符合的資料
#[tokio::test]
async fn test_scenario_a_matching_license() -> Result<()> {
    let server = MockServer::start();

    let get_mock = server.mock(|when, then| {
        when.method(GET).path(SEARCH_PATH);
        then.status(200)
            .header("Content-Type", "text/html; charset=utf-8")
            .header("Set-Cookie", "ASP.NET_SessionId=xyz; path=/; HttpOnly; SameSite=Lax")
            .body(empty_search_page());
    });

    let post_mock = server.mock(|when, then| {
        when.method(POST)
            .path(SEARCH_PATH)
            .header("cookie", "ASP.NET_SessionId=xyz")
            .header("content-type", "application/x-www-form-urlencoded")
            .body_contains("txtLicenseNumber=12345")
            .body_contains("__VIEWSTATE=AB12")
            .body_contains("__EVENTVALIDATION=CD34")
            .body_contains("btnSearch=Search");
        then.status(200)
            .header("Content-Type", "text/html; charset=utf-8")
            .body(results_page(jane_row()));
    });

    let outcome = client_for(&server)
        .verify_license(&LicenseNumber::new("12345"))
        .await?;

    get_mock.assert();
    post_mock.assert();
    assert_eq!(
        outcome,
        VerificationOutcome::Matched(LicenseRecord {
            name: "Jane Doe".to_string(),
            license_type: "EMT-P".to_string(),
            status: "Active".to_string(),
            license_number: "12345".to_string(),
        })
    );

    Ok(())
}

/// 情境 B：查詢結果頁沒有任何資料列
#[tokio::test]
async fn test_scenario_b_no_match() -> Result<()> {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path(SEARCH_PATH);
        then.status(200)
            .header("Set-Cookie", "ASP.NET_SessionId=xyz; path=/")
            .body(empty_search_page());
    });
    let post_mock = server.mock(|when, then| {
        when.method(POST)
            .path(SEARCH_PATH)
            .body_contains("txtLicenseNumber=00000");
        then.status(200).body(results_page(
            r#"<span class="message">No records match your search.</span>"#,
        ));
    });

    let outcome = client_for(&server)
        .verify_license(&LicenseNumber::new("00000"))
        .await?;

    post_mock.assert();
    assert_eq!(outcome, VerificationOutcome::NoMatch);

    Ok(())
}

/// 情境 C：第一個回應沒有 Set-Cookie，不可送出 POST
#[tokio::test]
async fn test_scenario_c_missing_session_cookie() -> Result<()> {
    let server = MockServer::start();

    let get_mock = server.mock(|when, then| {
        when.method(GET).path(SEARCH_PATH);
        then.status(200).body(empty_search_page());
    });
    let post_mock = server.mock(|when, then| {
        when.method(POST).path(SEARCH_PATH);
        then.status(200).body(results_page(jane_row()));
    });

    let err = client_for(&server)
        .verify_license(&LicenseNumber::new("12345"))
        .await
        .unwrap_err();

    get_mock.assert();
    post_mock.assert_hits(0);
    assert!(matches!(
        err,
        VerifyError::UpstreamUnavailable {
            phase: Phase::SessionAcquire,
            ..
        }
    ));

    Ok(())
}

/// 情境 D：搜尋頁缺少 __EVENTVALIDATION
#[tokio::test]
async fn test_scenario_d_missing_event_validation() -> Result<()> {
    let server = MockServer::start();

    let page = empty_search_page().replace(
        r#"<input type="hidden" name="__EVENTVALIDATION" id="__EVENTVALIDATION" value="CD34" />"#,
        "",
    );
    server.mock(|when, then| {
        when.method(GET).path(SEARCH_PATH);
        then.status(200)
            .header("Set-Cookie", "ASP.NET_SessionId=xyz; path=/")
            .body(page);
    });
    let post_mock = server.mock(|when, then| {
        when.method(POST).path(SEARCH_PATH);
        then.status(200);
    });

    let err = client_for(&server)
        .verify_license(&LicenseNumber::new("12345"))
        .await
        .unwrap_err();

    post_mock.assert_hits(0);
    assert!(matches!(
        err,
        VerifyError::MalformedPage {
            phase: Phase::TokenExtract,
            ..
        }
    ));
    assert!(!err.is_retryable());

    Ok(())
}

#[tokio::test]
async fn test_postback_server_error_is_upstream_unavailable() -> Result<()> {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path(SEARCH_PATH);
        then.status(200)
            .header("Set-Cookie", "ASP.NET_SessionId=xyz; path=/")
            .body(empty_search_page());
    });
    server.mock(|when, then| {
        when.method(POST).path(SEARCH_PATH);
        then.status(500).body("<h1>Server Error in '/' Application.</h1>");
    });

    let err = client_for(&server)
        .verify_license(&LicenseNumber::new("12345"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        VerifyError::UpstreamUnavailable {
            phase: Phase::SearchSubmit,
            ..
        }
    ));
    assert!(err.is_retryable());

    Ok(())
}

#[tokio::test]
async fn test_unrelated_results_page_is_malformed() -> Result<()> {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path(SEARCH_PATH);
        then.status(200)
            .header("Set-Cookie", "ASP.NET_SessionId=xyz; path=/")
            .body(empty_search_page());
    });
    server.mock(|when, then| {
        when.method(POST).path(SEARCH_PATH);
        then.status(200)
            .body("<html><body><h2>Your session has expired.</h2><a href=\"/\">Return home</a></body></html>");
    });

    let err = client_for(&server)
        .verify_license(&LicenseNumber::new("12345"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        VerifyError::MalformedPage {
            phase: Phase::ResultParse,
            ..
        }
    ));

    Ok(())
}

/// 送出查詢後被導到反機器人頁面
#[tokio::test]
async fn test_challenge_page_after_postback_is_blocked() -> Result<()> {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path(SEARCH_PATH);
        then.status(200)
            .header("Set-Cookie", "ASP.NET_SessionId=xyz; path=/")
            .body(empty_search_page());
    });
    let post_mock = server.mock(|when, then| {
        when.method(POST).path(SEARCH_PATH);
        then.status(200).body(
            r#"<html><body><h1>Checking your browser</h1>
<form id="challenge-form" action="/cdn-cgi/challenge-platform/h/b/orchestrate" method="post"></form>
</body></html>"#,
        );
    });

    let err = client_for(&server)
        .verify_license(&LicenseNumber::new("12345"))
        .await
        .unwrap_err();

    post_mock.assert();
    assert!(matches!(
        err,
        VerifyError::ChallengeDetected {
            phase: Phase::ResultParse,
            ..
        }
    ));
    assert!(!err.is_retryable());

    Ok(())
}

/// 空的 postback 頁面上掛著隱形 CAPTCHA 元件，仍視為查無資料
#[tokio::test]
async fn test_empty_postback_with_idle_widget_is_no_match() -> Result<()> {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path(SEARCH_PATH);
        then.status(200)
            .header("Set-Cookie", "ASP.NET_SessionId=xyz; path=/")
            .body(empty_search_page());
    });
    server.mock(|when, then| {
        when.method(POST).path(SEARCH_PATH);
        then.status(200).body(results_page(
            r#"<div class="g-recaptcha" data-size="invisible" data-sitekey="k"></div>
<span class="message">No records match your search.</span>"#,
        ));
    });

    let outcome = client_for(&server)
        .verify_license(&LicenseNumber::new("00000"))
        .await?;

    assert_eq!(outcome, VerificationOutcome::NoMatch);

    Ok(())
}

#[tokio::test]
async fn test_hung_upstream_times_out() -> Result<()> {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path(SEARCH_PATH);
        then.status(200)
            .header("Set-Cookie", "ASP.NET_SessionId=xyz; path=/")
            .delay(Duration::from_secs(3))
            .body(empty_search_page());
    });

    let mut config = VerifierConfig::new(server.url(SEARCH_PATH));
    config.upstream.timeout_seconds = Some(1);
    let client = VerificationClient::new(config)?;

    let err = client
        .verify_license(&LicenseNumber::new("12345"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        VerifyError::UpstreamUnavailable {
            phase: Phase::SessionAcquire,
            ..
        }
    ));
    assert!(err.to_string().contains("timed out"));

    Ok(())
}

#[tokio::test]
async fn test_unreachable_upstream_is_unavailable() -> Result<()> {
    let client = VerificationClient::new(VerifierConfig::new("http://127.0.0.1:1/Search.aspx"))?;

    let err = client
        .verify_license(&LicenseNumber::new("12345"))
        .await
        .unwrap_err();

    assert!(err.is_retryable());

    Ok(())
}

/// 同一個 client 同時處理多筆查詢，各自的結果互不影響
#[tokio::test]
async fn test_concurrent_lookups_are_independent() -> Result<()> {
    let server = MockServer::start();

    let get_mock = server.mock(|when, then| {
        when.method(GET).path(SEARCH_PATH);
        then.status(200)
            .header("Set-Cookie", "ASP.NET_SessionId=xyz; path=/")
            .body(empty_search_page());
    });
    server.mock(|when, then| {
        when.method(POST)
            .path(SEARCH_PATH)
            .body_contains("txtLicenseNumber=12345");
        then.status(200).body(results_page(jane_row()));
    });
    server.mock(|when, then| {
        when.method(POST)
            .path(SEARCH_PATH)
            .body_contains("txtLicenseNumber=67890");
        then.status(200).body(results_page(
            r#"<a href="Detail.aspx?id=17">John Roe</a><span>EMT-B</span><span>Expired</span><span>67890</span>"#,
        ));
    });

    let client = client_for(&server);
    let jane = LicenseNumber::new("12345");
    let john = LicenseNumber::new("67890");
    let (first, second) = tokio::join!(client.verify_license(&jane), client.verify_license(&john));

    get_mock.assert_hits(2);
    assert_eq!(first?.record().map(|r| r.name.as_str()), Some("Jane Doe"));

    let second = second?;
    let john_record = second.record().expect("second lookup matched");
    assert_eq!(john_record.status, "Expired");
    assert_eq!(john_record.license_number, "67890");

    Ok(())
}
