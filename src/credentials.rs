//! OAuth client credentials and token files.
//!
//! Both files are plain JSON in the layout the Google Cloud console and the
//! token endpoint produce, so they can be shared with other tools.

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Contents of the OAuth client file downloaded from the cloud console.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Credentials {
    pub installed: InstalledApp,
}

/// The `installed` application section of the client file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InstalledApp {
    pub client_id: String,
    pub client_secret: String,
    pub auth_uri: String,
    pub token_uri: String,
    pub auth_provider_x509_cert_url: String,
    pub project_id: String,
    pub redirect_uris: Vec<String>,
}

impl Credentials {
    /// The redirect URI used for the consent flow.
    pub fn redirect_uri(&self) -> &str {
        // validated non-empty on read
        self.installed
            .redirect_uris
            .first()
            .map(String::as_str)
            .unwrap_or_default()
    }
}

/// A stored OAuth token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: String,
    pub scope: String,
    pub token_type: String,
    /// Expiry as milliseconds since the Unix epoch.
    pub expiry_date: u64,
}

/// Margin before the real expiry at which a token counts as expired.
const EXPIRY_SKEW_MS: u64 = 60_000;

impl Token {
    /// Whether the access token is expired (or about to be) at `now_ms`.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms + EXPIRY_SKEW_MS >= self.expiry_date
    }
}

/// Read and validate the OAuth client file.
pub fn read_credentials(path: &Path) -> Result<Credentials> {
    let content = fs::read_to_string(path).map_err(|e| {
        AppError::Config(format!(
            "Failed to read credentials file {}: {}",
            path.display(),
            e
        ))
    })?;

    let credentials: Credentials = serde_json::from_str(&content).map_err(|e| {
        AppError::Config(format!(
            "Invalid credentials file {}: {}",
            path.display(),
            e
        ))
    })?;

    if credentials.installed.redirect_uris.is_empty() {
        return Err(AppError::Config(format!(
            "Invalid credentials file {}: redirect_uris is empty",
            path.display()
        )));
    }

    Ok(credentials)
}

/// Read and validate a stored token.
pub fn read_token(path: &Path) -> Result<Token> {
    let content = fs::read_to_string(path).map_err(|e| {
        AppError::Config(format!("Failed to read token file {}: {}", path.display(), e))
    })?;

    serde_json::from_str(&content).map_err(|e| {
        AppError::Config(format!("Invalid token file {}: {}", path.display(), e))
    })
}

/// Write a token, creating parent directories as needed.
pub fn write_token(path: &Path, token: &Token) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let content = serde_json::to_string_pretty(token)?;
    fs::write(path, content).map_err(|e| {
        AppError::Config(format!("Failed to write token file {}: {}", path.display(), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn credentials_json(redirects: serde_json::Value) -> String {
        json!({
            "installed": {
                "client_id": "id.apps.googleusercontent.com",
                "client_secret": "secret",
                "auth_uri": "https://accounts.google.com/o/oauth2/auth",
                "token_uri": "https://oauth2.googleapis.com/token",
                "auth_provider_x509_cert_url": "https://www.googleapis.com/oauth2/v1/certs",
                "project_id": "demo",
                "redirect_uris": redirects
            }
        })
        .to_string()
    }

    fn sample_token() -> Token {
        Token {
            access_token: "ya29.a0".to_string(),
            refresh_token: "1//0g".to_string(),
            scope: "https://www.googleapis.com/auth/youtube.readonly".to_string(),
            token_type: "Bearer".to_string(),
            expiry_date: 1_700_000_000_000,
        }
    }

    #[test]
    fn test_read_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("oauth.json");
        fs::write(&path, credentials_json(json!(["http://localhost"]))).unwrap();

        let creds = read_credentials(&path).unwrap();
        assert_eq!(creds.installed.project_id, "demo");
        assert_eq!(creds.redirect_uri(), "http://localhost");
    }

    #[test]
    fn test_read_credentials_empty_redirects() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("oauth.json");
        fs::write(&path, credentials_json(json!([]))).unwrap();

        let err = read_credentials(&path).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert!(err.to_string().contains("redirect_uris"));
    }

    #[test]
    fn test_read_credentials_missing_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("oauth.json");
        fs::write(&path, r#"{"installed": {"client_id": "x"}}"#).unwrap();

        let err = read_credentials(&path).unwrap_err();
        assert!(err.to_string().contains("client_secret"));
    }

    #[test]
    fn test_read_credentials_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_credentials(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_token_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("token.json");

        write_token(&path, &sample_token()).unwrap();
        assert_eq!(read_token(&path).unwrap(), sample_token());
    }

    #[test]
    fn test_read_token_rejects_missing_refresh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        fs::write(
            &path,
            r#"{"access_token":"a","scope":"s","token_type":"Bearer","expiry_date":1}"#,
        )
        .unwrap();

        assert!(read_token(&path).is_err());
    }

    #[test]
    fn test_token_expiry() {
        let token = sample_token();
        assert!(!token.is_expired(token.expiry_date - 120_000));
        assert!(token.is_expired(token.expiry_date - 30_000));
        assert!(token.is_expired(token.expiry_date + 1));
    }
}
