//! OAuth2 installed-app flow against Google's endpoints.
//!
//! The flow is the classic copy/paste one: the user opens the consent URL,
//! grants read-only access and pastes the returned code back into the
//! terminal, which is then exchanged for an access/refresh token pair.

use crate::credentials::{Credentials, Token};
use crate::error::{AppError, Result};
use log::{debug, info};
use reqwest::Url;
use serde::Deserialize;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Read-only access to the user's YouTube account.
pub const SCOPE: &str = "https://www.googleapis.com/auth/youtube.readonly";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenError {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Current time in milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Build the consent page URL the user has to visit.
pub fn authorization_url(credentials: &Credentials) -> Result<Url> {
    let app = &credentials.installed;
    Url::parse_with_params(
        &app.auth_uri,
        &[
            ("client_id", app.client_id.as_str()),
            ("redirect_uri", credentials.redirect_uri()),
            ("response_type", "code"),
            ("scope", SCOPE),
            ("access_type", "offline"),
        ],
    )
    .map_err(|e| AppError::Config(format!("Invalid auth_uri '{}': {}", app.auth_uri, e)))
}

fn http_client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?)
}

async fn request_token(token_uri: &str, form: &[(&str, &str)]) -> Result<TokenResponse> {
    let resp = http_client()?.post(token_uri).form(form).send().await?;
    let status = resp.status();
    let body = resp.text().await?;

    if !status.is_success() {
        let detail = match serde_json::from_str::<TokenError>(&body) {
            Ok(err) => match err.error_description {
                Some(desc) => format!("{}: {}", err.error, desc),
                None => err.error,
            },
            Err(_) => format!("HTTP {}", status),
        };
        return Err(AppError::Auth(detail));
    }

    serde_json::from_str(&body)
        .map_err(|e| AppError::Parse(format!("Unexpected token response: {}", e)))
}

/// Turn a token endpoint response into a storable token.
///
/// `previous_refresh` is kept when the response does not carry a new
/// refresh token, which is the normal case for refresh grants.
fn into_token(resp: TokenResponse, previous_refresh: Option<&str>, now: u64) -> Result<Token> {
    let refresh_token = resp
        .refresh_token
        .or_else(|| previous_refresh.map(str::to_string))
        .ok_or_else(|| {
            AppError::Auth(
                "No refresh token returned; revoke the app's access and authorize again"
                    .to_string(),
            )
        })?;

    Ok(Token {
        access_token: resp.access_token,
        refresh_token,
        scope: resp.scope.unwrap_or_else(|| SCOPE.to_string()),
        token_type: resp.token_type.unwrap_or_else(|| "Bearer".to_string()),
        expiry_date: now + resp.expires_in.unwrap_or(3600) * 1000,
    })
}

/// Exchange an authorization code for a token.
pub async fn exchange_code(credentials: &Credentials, code: &str) -> Result<Token> {
    let app = &credentials.installed;
    debug!("Exchanging authorization code at {}", app.token_uri);

    let resp = request_token(
        &app.token_uri,
        &[
            ("grant_type", "authorization_code"),
            ("code", code.trim()),
            ("client_id", app.client_id.as_str()),
            ("client_secret", app.client_secret.as_str()),
            ("redirect_uri", credentials.redirect_uri()),
        ],
    )
    .await?;

    into_token(resp, None, now_ms())
}

/// Obtain a fresh access token using the stored refresh token.
pub async fn refresh(credentials: &Credentials, token: &Token) -> Result<Token> {
    let app = &credentials.installed;
    info!("Access token expired, refreshing");

    let resp = request_token(
        &app.token_uri,
        &[
            ("grant_type", "refresh_token"),
            ("refresh_token", token.refresh_token.as_str()),
            ("client_id", app.client_id.as_str()),
            ("client_secret", app.client_secret.as_str()),
        ],
    )
    .await?;

    into_token(resp, Some(&token.refresh_token), now_ms())
}
