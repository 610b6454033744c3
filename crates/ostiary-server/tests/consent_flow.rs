//! End-to-end consent flows against a mock protocol engine.

mod common;

use anyhow::Result;
use ostiary_engine::mock::{MOCK_FAIL_LOCATION, MOCK_ISSUE_LOCATION, interaction};
use ostiary_engine::{AuthorizationAction, AuthorizationResponse, EngineCall, FailReason, Prompt};
use serde_json::Value;

fn location(resp: &reqwest::Response) -> Option<&str> {
    resp.headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

fn last_issue(server: &common::TestServer) -> ostiary_engine::IssueRequest {
    match server.engine.last_call() {
        Some(EngineCall::Issue(issue)) => issue,
        other => panic!("expected an issue call, got {:?}", other),
    }
}

#[tokio::test]
async fn test_login_and_consent() -> Result<()> {
    let mut verdict = interaction("t-1");
    verdict.claims = vec!["name".into(), "email".into()];
    verdict.login_hint = Some("john".into());
    let server = common::TestServer::start(vec![verdict]).await?;
    let mut browser = server.browser();

    let resp = browser.authorize("response_type=code&client_id=1").await?;
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(resp.headers()["cache-control"], "no-store");
    let page: Value = resp.json().await?;
    assert_eq!(page["loginRequired"], true);
    assert_eq!(page["loginId"], "john");
    assert!(browser.has_cookie());

    let resp = browser
        .decide(&[("loginId", "john"), ("password", "john"), ("authorized", "Authorize")])
        .await?;
    assert_eq!(resp.status().as_u16(), 302);
    assert_eq!(location(&resp), Some(MOCK_ISSUE_LOCATION));

    let issue = last_issue(&server);
    assert_eq!(issue.ticket, "t-1");
    assert_eq!(issue.subject, "1001");
    assert!(issue.auth_time > 0);
    let claims: Value = serde_json::from_str(issue.claims.as_deref().unwrap())?;
    assert_eq!(claims["name"], "John Smith");
    assert_eq!(claims["email"], "john@example.com");

    Ok(())
}

#[tokio::test]
async fn test_second_request_skips_login() -> Result<()> {
    let server = common::TestServer::start(vec![interaction("t-1"), interaction("t-2")]).await?;
    let mut browser = server.browser();

    browser.authorize("client_id=1").await?;
    browser
        .decide(&[("loginId", "jane"), ("password", "jane"), ("authorized", "yes")])
        .await?;

    let page: Value = browser.authorize("client_id=1").await?.json().await?;
    assert_eq!(page["loginRequired"], false);
    assert_eq!(page["displayName"], "Jane");

    let resp = browser.decide(&[("authorized", "yes")]).await?;
    assert_eq!(location(&resp), Some(MOCK_ISSUE_LOCATION));
    let issue = last_issue(&server);
    assert_eq!(issue.ticket, "t-2");
    assert_eq!(issue.subject, "1002");

    Ok(())
}

#[tokio::test]
async fn test_login_retires_pre_login_cookie() -> Result<()> {
    let server = common::TestServer::start(vec![
        interaction("t-1"),
        interaction("t-2"),
        interaction("t-3"),
    ])
    .await?;
    let mut browser = server.browser();

    browser.authorize("client_id=1").await?;
    let before_login = browser.cookie();
    browser
        .decide(&[("loginId", "john"), ("password", "john"), ("authorized", "yes")])
        .await?;
    let after_login = browser.cookie();
    assert_ne!(before_login, after_login);

    browser.set_cookie(before_login);
    let page: Value = browser.authorize("client_id=1").await?.json().await?;
    assert_eq!(page["loginRequired"], true);

    browser.set_cookie(after_login);
    let page: Value = browser.authorize("client_id=1").await?.json().await?;
    assert_eq!(page["loginRequired"], false);

    Ok(())
}

#[tokio::test]
async fn test_denial() -> Result<()> {
    let server = common::TestServer::start(vec![interaction("t-1")]).await?;
    let mut browser = server.browser();

    browser.authorize("client_id=1").await?;
    let resp = browser
        .decide(&[("loginId", "john"), ("password", "john")])
        .await?;

    assert_eq!(resp.status().as_u16(), 302);
    assert_eq!(
        location(&resp).map(str::to_string),
        Some(format!("{}denied", MOCK_FAIL_LOCATION))
    );
    assert_eq!(
        server.engine.last_call(),
        Some(EngineCall::Fail {
            ticket: "t-1".into(),
            reason: FailReason::Denied
        })
    );

    Ok(())
}

#[tokio::test]
async fn test_wrong_password_is_not_authenticated() -> Result<()> {
    let server = common::TestServer::start(vec![interaction("t-1")]).await?;
    let mut browser = server.browser();

    browser.authorize("client_id=1").await?;
    browser
        .decide(&[("loginId", "john"), ("password", "nope"), ("authorized", "yes")])
        .await?;

    assert_eq!(
        server.engine.last_call(),
        Some(EngineCall::Fail {
            ticket: "t-1".into(),
            reason: FailReason::NotAuthenticated
        })
    );

    Ok(())
}

#[tokio::test]
async fn test_prompt_login_forces_reauthentication() -> Result<()> {
    let mut forced = interaction("t-2");
    forced.prompts = vec![Prompt::Login];
    let server = common::TestServer::start(vec![interaction("t-1"), forced]).await?;
    let mut browser = server.browser();

    browser.authorize("client_id=1").await?;
    browser
        .decide(&[("loginId", "john"), ("password", "john"), ("authorized", "yes")])
        .await?;

    let page: Value = browser.authorize("client_id=1&prompt=login").await?.json().await?;
    assert_eq!(page["loginRequired"], true);

    // Signed out by the previous step, so credentials are needed again.
    browser.decide(&[("authorized", "yes")]).await?;
    assert_eq!(
        server.engine.last_call(),
        Some(EngineCall::Fail {
            ticket: "t-2".into(),
            reason: FailReason::NotAuthenticated
        })
    );

    Ok(())
}

#[tokio::test]
async fn test_unknown_subject_fails_without_page() -> Result<()> {
    let mut verdict = interaction("t-1");
    verdict.subject = Some("4242".into());
    let server = common::TestServer::start(vec![verdict]).await?;
    let mut browser = server.browser();

    let resp = browser.authorize("client_id=1").await?;

    assert_eq!(resp.status().as_u16(), 302);
    assert_eq!(
        server.engine.last_call(),
        Some(EngineCall::Fail {
            ticket: "t-1".into(),
            reason: FailReason::NotAuthenticated
        })
    );

    Ok(())
}

#[tokio::test]
async fn test_prompt_none_without_session() -> Result<()> {
    let verdict = AuthorizationResponse::new(AuthorizationAction::NoInteraction, "t-1");
    let server = common::TestServer::start(vec![verdict]).await?;
    let mut browser = server.browser();

    let resp = browser.authorize("client_id=1&prompt=none").await?;

    assert_eq!(
        location(&resp).map(str::to_string),
        Some(format!("{}not_logged_in", MOCK_FAIL_LOCATION))
    );
    assert!(!browser.has_cookie());

    Ok(())
}

#[tokio::test]
async fn test_prompt_none_with_session_issues() -> Result<()> {
    let silent = AuthorizationResponse::new(AuthorizationAction::NoInteraction, "t-2");
    let server = common::TestServer::start(vec![interaction("t-1"), silent]).await?;
    let mut browser = server.browser();

    browser.authorize("client_id=1").await?;
    browser
        .decide(&[("loginId", "john"), ("password", "john"), ("authorized", "yes")])
        .await?;

    let resp = browser.authorize("client_id=1&prompt=none").await?;
    assert_eq!(location(&resp), Some(MOCK_ISSUE_LOCATION));
    assert_eq!(last_issue(&server).ticket, "t-2");

    Ok(())
}

#[tokio::test]
async fn test_tampered_cookie_starts_fresh_session() -> Result<()> {
    let server = common::TestServer::start(vec![interaction("t-1")]).await?;

    let resp = server
        .client
        .get(format!("{}/api/authorization?client_id=1", server.base_url()))
        .header("cookie", "AuthorizationServerSession=not-encrypted")
        .send()
        .await?;

    assert_eq!(resp.status().as_u16(), 200);
    let page: Value = resp.json().await?;
    assert_eq!(page["loginRequired"], true);

    Ok(())
}

#[tokio::test]
async fn test_health_returns_version() -> Result<()> {
    let server = common::TestServer::start(vec![]).await?;

    let body: Value = server
        .client
        .get(format!("{}/health", server.base_url()))
        .send()
        .await?
        .json()
        .await?;

    assert_eq!(body["status"], "ok");
    assert!(body.get("version").is_some());
    assert_eq!(body["engine"], "mock");
    assert_eq!(body["sessions"]["size"], 0);

    Ok(())
}
