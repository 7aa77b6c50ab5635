/*
 * Responsibility
 * - Mock IdP HTTP surface: discovery, authorize form, login-callback,
 *   token exchange, JWKS, callback preview, persona template, dashboard
 */
use axum::{
    Form, Json,
    extract::{Path, Query, State},
    response::{Html, Redirect},
};
use serde::Deserialize;
use serde_json::{Value, json};
use url::Url;

use crate::error::AppError;
use crate::idp::{ACCESS_TOKEN, ID_TOKEN_TTL_SECS, personas, views};
use crate::state::AppState;

fn mode_issuer(base: &str, mode: &str) -> String {
    format!("{base}/idp/{mode}/oidc")
}

pub async fn dashboard(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let base = &state.config.public_base_url;

    let mut links = Vec::with_capacity(2);
    for mode in ["persona", "expert"] {
        let mut url = Url::parse(&format!("{base}/idp/{mode}/oidc/authorize"))
            .map_err(|e| AppError::Configuration(format!("bad public base url: {e}")))?;
        url.query_pairs_mut()
            .append_pair(
                "redirect_uri",
                &format!("{base}/idp/{mode}/oidc/callback-preview"),
            )
            .append_pair("state", "test-123")
            .append_pair("nonce", "12345");
        links.push(url.to_string());
    }

    Ok(Html(views::dashboard_page(&links[0], &links[1])))
}

pub async fn discovery(
    State(state): State<AppState>,
    Path(mode): Path<String>,
) -> Json<Value> {
    let base = &state.config.public_base_url;
    let issuer = mode_issuer(base, &mode);

    Json(json!({
        "issuer": issuer,
        "authorization_endpoint": format!("{issuer}/authorize"),
        "token_endpoint": format!("{issuer}/token"),
        "jwks_uri": format!("{base}/idp/jwks"),
        "response_types_supported": ["code"],
        "subject_types_supported": ["public"],
        "id_token_signing_alg_values_supported": ["RS256"],
    }))
}

#[derive(Debug, Deserialize)]
pub struct AuthorizeQuery {
    redirect_uri: String,
    state: String,
    nonce: Option<String>,
}

pub async fn authorize(
    Path(mode): Path<String>,
    Query(query): Query<AuthorizeQuery>,
) -> Result<Html<String>, AppError> {
    let default_json =
        serde_json::to_string_pretty(&Value::Object(personas::template(personas::DEFAULT_PERSONA)))
            .map_err(|e| AppError::Configuration(format!("persona serialization: {e}")))?;

    Ok(Html(views::authorize_page(
        &mode,
        &query.redirect_uri,
        &query.state,
        query.nonce.as_deref(),
        &personas::names(),
        &default_json,
    )))
}

#[derive(Debug, Deserialize)]
pub struct LoginCallbackForm {
    persona_choice: Option<String>,
    custom_claims: Option<String>,
    redirect_uri: String,
    state: String,
    nonce: Option<String>,
}

pub async fn login_callback(
    State(state): State<AppState>,
    Path(mode): Path<String>,
    Form(form): Form<LoginCallbackForm>,
) -> Result<Redirect, AppError> {
    let mut claims = if mode == "persona" {
        personas::template(form.persona_choice.as_deref().unwrap_or(personas::DEFAULT_PERSONA))
    } else {
        let raw = form.custom_claims.unwrap_or_default();
        let value: Value =
            serde_json::from_str(&raw).map_err(|e| AppError::MalformedClaims(e.to_string()))?;
        match value {
            Value::Object(map) => map,
            _ => {
                return Err(AppError::MalformedClaims(
                    "claims must be a JSON object".to_string(),
                ));
            }
        }
    };

    if let Some(nonce) = form.nonce.filter(|n| !n.is_empty()) {
        claims.insert("nonce".to_string(), json!(nonce));
    }

    let code = state
        .idp
        .codes()
        .issue(claims)
        .await
        .map_err(|_| AppError::Internal)?;

    let mut url = Url::parse(&form.redirect_uri)
        .map_err(|_| AppError::MalformedClaims("redirect_uri is not a valid URL".to_string()))?;
    url.query_pairs_mut()
        .append_pair("state", &form.state)
        .append_pair("code", &code);

    // 303: the client must follow with GET even though it POSTed here.
    Ok(Redirect::to(url.as_str()))
}

#[derive(Debug, Deserialize)]
pub struct TokenForm {
    code: String,
}

pub async fn token(
    State(state): State<AppState>,
    Path(mode): Path<String>,
    Form(form): Form<TokenForm>,
) -> Result<Json<Value>, AppError> {
    let stored = state
        .idp
        .codes()
        .pop(&form.code)
        .await
        .ok_or(AppError::InvalidGrant)?;

    let issuer = mode_issuer(&state.config.public_base_url, &mode);
    let (id_token, _) = state.idp.sign_id_token(&issuer, &stored)?;

    Ok(Json(json!({
        "access_token": ACCESS_TOKEN,
        "id_token": id_token,
        "token_type": "Bearer",
        "expires_in": ID_TOKEN_TTL_SECS,
    })))
}

pub async fn jwks(State(state): State<AppState>) -> Json<Value> {
    Json(state.idp.jwks())
}

#[derive(Debug, Deserialize)]
pub struct PreviewQuery {
    code: String,
    #[allow(dead_code)]
    state: String,
}

/// Diagnostic rendering of the exchange the relying party would perform.
/// Shares the code namespace with the token endpoint, so whichever consumer
/// runs first wins the code.
pub async fn callback_preview(
    State(state): State<AppState>,
    Path(mode): Path<String>,
    Query(query): Query<PreviewQuery>,
) -> Result<Html<String>, AppError> {
    let stored = state
        .idp
        .codes()
        .pop(&query.code)
        .await
        .ok_or(AppError::InvalidGrant)?;

    let issuer = mode_issuer(&state.config.public_base_url, &mode);
    let (token, payload) = state.idp.sign_id_token(&issuer, &stored)?;
    let payload_json = serde_json::to_string_pretty(&Value::Object(payload))
        .map_err(|e| AppError::Configuration(format!("payload serialization: {e}")))?;

    Ok(Html(views::preview_page(&token, &payload_json, &query.code)))
}

#[derive(Debug, Deserialize)]
pub struct PersonaTemplateQuery {
    persona: Option<String>,
}

pub async fn persona_template(
    Query(query): Query<PersonaTemplateQuery>,
) -> Result<String, AppError> {
    let template =
        personas::template(query.persona.as_deref().unwrap_or(personas::DEFAULT_PERSONA));
    serde_json::to_string_pretty(&Value::Object(template))
        .map_err(|e| AppError::Configuration(format!("persona serialization: {e}")))
}
