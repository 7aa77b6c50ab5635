//! End-to-end OIDC exchange against the mock IdP: authorize form,
//! login-callback redirect, single-use code exchange, and RS256 verification
//! of the issued ID token against the published JWKS.

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use serde_json::Value;
use tower::ServiceExt;
use url::Url;

use jwt_experience::app::{build_router, build_state};
use jwt_experience::config::Config;
use jwt_experience::state::AppState;

const BASE_URL: &str = "http://app.test";
const REDIRECT_URI: &str = "http://client.test/cb";

fn test_state() -> AppState {
    build_state(Config::for_testing(BASE_URL)).unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Drive login-callback and return the authorization code from the redirect.
async fn obtain_code(app: &axum::Router, mode: &str, fields: &[(&str, &str)]) -> String {
    let body = serde_urlencoded::to_string(fields).unwrap();
    let response = app
        .clone()
        .oneshot(
            Request::post(format!("/idp/{mode}/oidc/login-callback"))
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let location = response.headers()[header::LOCATION].to_str().unwrap();
    let url = Url::parse(location).unwrap();
    assert!(location.starts_with(REDIRECT_URI));
    assert_eq!(
        url.query_pairs().find(|(k, _)| k == "state").unwrap().1,
        "xyz-1"
    );

    url.query_pairs()
        .find(|(k, _)| k == "code")
        .unwrap()
        .1
        .into_owned()
}

async fn exchange_code(app: &axum::Router, mode: &str, code: &str) -> axum::response::Response {
    let body = serde_urlencoded::to_string([("code", code)]).unwrap();
    app.clone()
        .oneshot(
            Request::post(format!("/idp/{mode}/oidc/token"))
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn jwks_decoding_key(app: &axum::Router) -> DecodingKey {
    let response = app
        .clone()
        .oneshot(Request::get("/idp/jwks").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let jwks = body_json(response).await;
    let jwk = &jwks["keys"][0];
    assert_eq!(jwk["kid"], "mock-idp-key-id");
    assert!(jwk.get("d").is_none(), "private key must not be published");

    DecodingKey::from_rsa_components(jwk["n"].as_str().unwrap(), jwk["e"].as_str().unwrap())
        .unwrap()
}

#[tokio::test]
async fn discovery_document_is_mode_scoped() {
    let app = build_router(test_state());

    let response = app
        .oneshot(
            Request::get("/idp/persona/.well-known/openid-configuration")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let doc = body_json(response).await;
    assert_eq!(doc["issuer"], format!("{BASE_URL}/idp/persona/oidc"));
    assert_eq!(
        doc["authorization_endpoint"],
        format!("{BASE_URL}/idp/persona/oidc/authorize")
    );
    assert_eq!(doc["token_endpoint"], format!("{BASE_URL}/idp/persona/oidc/token"));
    assert_eq!(doc["jwks_uri"], format!("{BASE_URL}/idp/jwks"));
}

#[tokio::test]
async fn authorize_renders_the_right_form_per_mode() {
    let app = build_router(test_state());

    let response = app
        .clone()
        .oneshot(
            Request::get(format!(
                "/idp/persona/oidc/authorize?redirect_uri={REDIRECT_URI}&state=s1"
            ))
            .body(Body::empty())
            .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("persona_choice"));
    assert!(body.contains("admin"));

    let response = app
        .clone()
        .oneshot(
            Request::get(format!(
                "/idp/expert/oidc/authorize?redirect_uri={REDIRECT_URI}&state=s1"
            ))
            .body(Body::empty())
            .unwrap(),
        )
        .await
        .unwrap();
    let body = body_string(response).await;
    assert!(body.contains("custom_claims"));
    assert!(body.contains("user-001"));

    // Required query parameters are enforced by extraction.
    let response = app
        .oneshot(Request::get("/idp/persona/oidc/authorize").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn full_persona_flow_issues_a_verifiable_id_token() {
    let app = build_router(test_state());

    let code = obtain_code(
        &app,
        "persona",
        &[
            ("persona_choice", "admin"),
            ("redirect_uri", REDIRECT_URI),
            ("state", "xyz-1"),
            ("nonce", "n-42"),
        ],
    )
    .await;

    let response = exchange_code(&app, "persona", &code).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;

    assert_eq!(body["access_token"], "mock-access-token");
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], 3600);

    let id_token = body["id_token"].as_str().unwrap();
    let token_header = decode_header(id_token).unwrap();
    assert_eq!(token_header.alg, Algorithm::RS256);
    assert_eq!(token_header.kid.as_deref(), Some("mock-idp-key-id"));

    let key = jwks_decoding_key(&app).await;
    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_audience(&["my-keycloak-client"]);
    let claims = decode::<Value>(id_token, &key, &validation).unwrap().claims;

    assert_eq!(claims["iss"], format!("{BASE_URL}/idp/persona/oidc"));
    assert_eq!(claims["sub"], "admin-999");
    assert_eq!(claims["nonce"], "n-42");
    assert_eq!(claims["is_internal"], true);
    let roles: Vec<&str> = claims["roles"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert_eq!(roles, ["admin", "editor", "viewer"]);
}

#[tokio::test]
async fn authorization_codes_are_single_use() {
    let app = build_router(test_state());

    let code = obtain_code(
        &app,
        "persona",
        &[
            ("persona_choice", "default"),
            ("redirect_uri", REDIRECT_URI),
            ("state", "xyz-1"),
        ],
    )
    .await;

    let first = exchange_code(&app, "persona", &code).await;
    assert_eq!(first.status(), StatusCode::OK);

    let second = exchange_code(&app, "persona", &code).await;
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(second).await["error"], "invalid_grant");
}

#[tokio::test]
async fn unknown_code_is_invalid_grant() {
    let app = build_router(test_state());
    let response = exchange_code(&app, "persona", "no-such-code").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "invalid_grant");
}

#[tokio::test]
async fn concurrent_redemptions_have_exactly_one_winner() {
    let app = build_router(test_state());

    let code = obtain_code(
        &app,
        "persona",
        &[
            ("persona_choice", "default"),
            ("redirect_uri", REDIRECT_URI),
            ("state", "xyz-1"),
        ],
    )
    .await;

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let app = app.clone();
        let code = code.clone();
        tasks.push(tokio::spawn(async move {
            exchange_code(&app, "persona", &code).await.status()
        }));
    }

    let mut winners = 0;
    for task in tasks {
        match task.await.unwrap() {
            StatusCode::OK => winners += 1,
            StatusCode::BAD_REQUEST => {}
            other => panic!("unexpected status {other}"),
        }
    }
    assert_eq!(winners, 1);
}

#[tokio::test]
async fn expert_mode_signs_operator_claims_with_defaults() {
    let app = build_router(test_state());

    let code = obtain_code(
        &app,
        "expert",
        &[
            ("custom_claims", r#"{"email":"op@example.com","tier":"gold"}"#),
            ("redirect_uri", REDIRECT_URI),
            ("state", "xyz-1"),
        ],
    )
    .await;

    let response = exchange_code(&app, "expert", &code).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;

    let key = jwks_decoding_key(&app).await;
    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_audience(&["my-keycloak-client"]);
    let claims = decode::<Value>(body["id_token"].as_str().unwrap(), &key, &validation)
        .unwrap()
        .claims;

    // No sub supplied: the envelope default applies.
    assert_eq!(claims["sub"], "user-default");
    assert_eq!(claims["tier"], "gold");
    assert_eq!(claims["iss"], format!("{BASE_URL}/idp/expert/oidc"));
}

#[tokio::test]
async fn malformed_expert_claims_are_rejected() {
    let app = build_router(test_state());

    for bad in ["not json at all", r#"["a","list"]"#, ""] {
        let body = serde_urlencoded::to_string([
            ("custom_claims", bad),
            ("redirect_uri", REDIRECT_URI),
            ("state", "xyz-1"),
        ])
        .unwrap();

        let response = app
            .clone()
            .oneshot(
                Request::post("/idp/expert/oidc/login-callback")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "input {bad:?}");
    }
}

#[tokio::test]
async fn preview_shares_the_code_namespace_with_token_endpoint() {
    let app = build_router(test_state());

    let code = obtain_code(
        &app,
        "persona",
        &[
            ("persona_choice", "default"),
            ("redirect_uri", REDIRECT_URI),
            ("state", "xyz-1"),
        ],
    )
    .await;

    let response = app
        .clone()
        .oneshot(
            Request::get(format!(
                "/idp/persona/oidc/callback-preview?code={code}&state=xyz-1"
            ))
            .body(Body::empty())
            .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("Handshake Preview"));
    assert!(body.contains("user-001"));

    // The preview consumed the code; the real exchange loses.
    let response = exchange_code(&app, "persona", &code).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn persona_template_returns_pretty_json() {
    let app = build_router(test_state());

    let response = app
        .clone()
        .oneshot(
            Request::get("/idp/persona-template?persona=admin")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("admin-999"));

    // Unknown personas fall back to the default template.
    let response = app
        .oneshot(
            Request::get("/idp/persona-template?persona=nobody")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_string(response).await;
    assert!(body.contains("user-001"));
}

#[tokio::test]
async fn dashboard_links_into_both_modes() {
    let app = build_router(test_state());

    let response = app
        .oneshot(Request::get("/idp").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("/idp/persona/oidc/authorize"));
    assert!(body.contains("/idp/expert/oidc/authorize"));
    assert!(body.contains("callback-preview"));
}

/// A symmetric session token must never verify against the IdP's RSA key.
#[tokio::test]
async fn session_token_does_not_verify_against_jwks() {
    use jwt_experience::services::token_codec::SessionClaims;

    let state = test_state();
    let app = build_router(state.clone());

    let claims = SessionClaims::new("u-1", "tester@example.com", &["read_loggedIn".to_string()]);
    let session_token = state.codec.issue(&claims, chrono::Duration::minutes(5)).unwrap();

    let key = jwks_decoding_key(&app).await;
    let mut validation = Validation::new(Algorithm::RS256);
    validation.validate_aud = false;
    assert!(decode::<Value>(&session_token, &key, &validation).is_err());
}

/// An RS256 ID token from the IdP domain must never be accepted as an HS*
/// session token, even though both are JWTs.
#[tokio::test]
async fn idp_token_is_rejected_as_a_session_cookie() {
    let state = test_state();
    let app = build_router(state.clone());

    let code = obtain_code(
        &app,
        "persona",
        &[
            ("persona_choice", "admin"),
            ("redirect_uri", REDIRECT_URI),
            ("state", "xyz-1"),
        ],
    )
    .await;
    let body = body_json(exchange_code(&app, "persona", &code).await).await;
    let id_token = body["id_token"].as_str().unwrap();

    assert!(state.codec.decode(id_token).is_err());

    let response = app
        .oneshot(
            Request::get("/logged-in")
                .header(header::COOKIE, format!("auth_token={id_token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
