//! HTTP client tests against a local warp server

use prefs_core::{
    CompanyDetails, CompanyPayload, ComplianceRequest, PasswordRequest, RemoteError,
    RemoteSettingsClient, SaveResponse, SettingsConfig, SettingsSession, SubmitError,
};
use prefs_remote::{HttpSettingsClient, RemoteConfig};
use serde_json::{json, Value};
use std::net::{SocketAddr, TcpListener};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use warp::http::StatusCode;
use warp::Filter;

macro_rules! serve {
    ($routes:expr) => {{
        let (addr, server) = warp::serve($routes).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);
        addr
    }};
}

fn client_for(addr: SocketAddr) -> HttpSettingsClient {
    HttpSettingsClient::new(RemoteConfig::new(format!("http://{addr}")).with_timeout_secs(1))
        .unwrap()
}

fn compliance_request() -> ComplianceRequest {
    ComplianceRequest {
        gdpr: true,
        company: CompanyPayload::Detailed(CompanyDetails {
            name: "Acme".into(),
            email: "ops@acme.test".into(),
            location: "Berlin".into(),
        }),
        session_time: Some(12),
        engagement: Some(75),
        location: Some("Berlin".into()),
    }
}

/// Server that records compliance bodies and accepts one fixed password
fn recording_routes(
    seen: Arc<Mutex<Vec<Value>>>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone + Send + Sync + 'static
{
    let gdpr = warp::post()
        .and(warp::path!("manage" / "settings" / "general" / "save-gdpr"))
        .and(warp::body::json())
        .map(move |body: Value| {
            seen.lock().unwrap().push(body);
            warp::reply::json(&json!({"success": true}))
        });

    let password = warp::post()
        .and(warp::path!("manage" / "settings" / "general" / "save-strong-password"))
        .and(warp::body::json())
        .map(|body: Value| {
            if body["password"] == "Abcdefg1" {
                warp::reply::json(&json!({"success": true}))
            } else {
                warp::reply::json(&json!({"success": false, "error": "password rejected"}))
            }
        });

    gdpr.or(password)
}

#[tokio::test]
async fn test_compliance_body_matches_wire_contract() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let addr = serve!(recording_routes(seen.clone()));
    let client = client_for(addr);

    let response = client.save_compliance(&compliance_request()).await.unwrap();

    assert_eq!(response, SaveResponse::ok());
    let bodies = seen.lock().unwrap().clone();
    assert_eq!(
        bodies,
        vec![json!({
            "gdpr": true,
            "company": {"name": "Acme", "email": "ops@acme.test", "location": "Berlin"},
            "sessionTime": 12,
            "engagement": 75,
            "location": "Berlin",
        })]
    );
}

#[tokio::test]
async fn test_success_false_body_is_returned_as_is() {
    let addr = serve!(recording_routes(Arc::new(Mutex::new(Vec::new()))));
    let client = client_for(addr);

    let response = client
        .save_password(&PasswordRequest::new("wrong"))
        .await
        .unwrap();

    assert_eq!(response, SaveResponse::rejected("password rejected"));
}

#[tokio::test]
async fn test_error_status_becomes_rejection() {
    let routes = warp::post().and(warp::body::json()).map(|_body: Value| {
        warp::reply::with_status(
            warp::reply::json(&json!({"success": false, "error": "quota exceeded"})),
            StatusCode::UNPROCESSABLE_ENTITY,
        )
    });
    let client = client_for(serve!(routes));

    let err = client.save_compliance(&compliance_request()).await.unwrap_err();

    assert_eq!(err, RemoteError::rejected("quota exceeded"));
}

#[tokio::test]
async fn test_error_status_without_body_message() {
    let routes = warp::post().map(|| {
        warp::reply::with_status("internal error", StatusCode::INTERNAL_SERVER_ERROR)
    });
    let client = client_for(serve!(routes));

    let err = client
        .save_password(&PasswordRequest::new("Abcdefg1"))
        .await
        .unwrap_err();

    assert_eq!(err, RemoteError::Rejected { message: None });
}

#[tokio::test]
async fn test_refused_connection_is_no_response() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let client = client_for(addr);

    let err = client
        .save_password(&PasswordRequest::new("Abcdefg1"))
        .await
        .unwrap_err();

    assert_eq!(err, RemoteError::NoResponse);
}

#[tokio::test]
async fn test_slow_server_times_out_as_no_response() {
    let routes = warp::post().and_then(|| async {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok::<_, warp::Rejection>(warp::reply::json(&json!({"success": true})))
    });
    let client = client_for(serve!(routes));

    let err = client.save_compliance(&compliance_request()).await.unwrap_err();

    assert_eq!(err, RemoteError::NoResponse);
}

#[tokio::test]
async fn test_session_over_http() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let addr = serve!(recording_routes(seen.clone()));
    let client = Arc::new(client_for(addr));

    let config = SettingsConfig::new().with_initial_company_name("Acme");
    let session = SettingsSession::start(config, client).unwrap();
    session.edit(|form| {
        form.set_password_first("Abcdefg1");
        form.set_password_second("Abcdefg1");
        form.activate_gdpr();
    });

    assert!(session.submit().await.is_success());
    assert_eq!(seen.lock().unwrap()[0]["company"]["name"], "Acme");

    session.edit(|form| {
        form.set_password_first("Xyzwvut9");
        form.set_password_second("Xyzwvut9");
    });
    let outcome = session.submit().await;
    assert_eq!(
        outcome.error().map(SubmitError::user_message).as_deref(),
        Some("password rejected")
    );
}
