use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::config::{SecurityConfig, MAX_JWT_EXPIRY_HOURS};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub special_message: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    /// Lifetimes beyond [`MAX_JWT_EXPIRY_HOURS`] are capped.
    pub fn new(user: &UserRecord, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let hours = i64::try_from(expiry_hours.min(MAX_JWT_EXPIRY_HOURS)).unwrap_or(0);
        let exp = (now + Duration::hours(hours)).timestamp();

        Self {
            sub: user.username.clone(),
            role: user.role.clone(),
            special_message: user.special_message.clone(),
            exp,
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("JWT secret is not configured")]
    MissingSecret,

    #[error("JWT generation error: {0}")]
    TokenGeneration(#[from] jsonwebtoken::errors::Error),

    #[error("Cannot read users file {path}: {source}")]
    UsersFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed users file: {0}")]
    UsersFormat(#[from] serde_yaml::Error),
}

/// One entry of the YAML user directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub username: String,
    /// Lowercase hex SHA-256 of the password
    pub password_sha256: String,
    pub role: String,
    #[serde(default)]
    pub special_message: Option<String>,
}

impl UserRecord {
    pub fn new(username: &str, password: &str, role: &str) -> Self {
        Self {
            username: username.to_string(),
            password_sha256: password_digest(password),
            role: role.to_string(),
            special_message: None,
        }
    }

    fn default_admin() -> Self {
        Self {
            special_message: Some("Welcome to the administration panel".to_string()),
            ..Self::new("admin", "admin", "admin")
        }
    }
}

/// The public part of a user returned by login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub username: String,
    pub role: String,
    pub special_message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginSuccess {
    pub message: String,
    pub user: UserProfile,
    pub token: String,
}

pub fn password_digest(password: &str) -> String {
    format!("{:x}", Sha256::digest(password.as_bytes()))
}

/// Checks credentials against the user directory and issues HS256 tokens.
#[derive(Debug, Clone)]
pub struct Authenticator {
    users: Arc<HashMap<String, UserRecord>>,
    jwt_secret: String,
    expiry_hours: u64,
}

impl Authenticator {
    pub fn new(users: Vec<UserRecord>, jwt_secret: impl Into<String>, expiry_hours: u64) -> Self {
        let users = users.into_iter().map(|u| (u.username.clone(), u)).collect();
        Self {
            users: Arc::new(users),
            jwt_secret: jwt_secret.into(),
            expiry_hours,
        }
    }

    /// Users come from `users_file` when set, else the development admin when allowed.
    pub fn from_config(security: &SecurityConfig) -> Result<Self, AuthError> {
        let users = match &security.users_file {
            Some(path) => load_users(path)?,
            None if security.allow_default_user => {
                tracing::warn!("No users file configured; using the default admin login");
                vec![UserRecord::default_admin()]
            }
            None => Vec::new(),
        };
        tracing::info!(users = users.len(), "user directory loaded");
        Ok(Self::new(users, security.jwt_secret.clone(), security.jwt_expiry_hours))
    }

    pub fn login(&self, username: &str, password: &str) -> Result<LoginSuccess, AuthError> {
        let user = self
            .users
            .get(username)
            .filter(|u| u.password_sha256.eq_ignore_ascii_case(&password_digest(password)))
            .ok_or_else(|| {
                tracing::warn!(username, "login rejected");
                AuthError::InvalidCredentials
            })?;

        let token = self.issue_token(user)?;
        tracing::info!(username, role = %user.role, "login succeeded");
        Ok(LoginSuccess {
            message: "Login successful".to_string(),
            user: UserProfile {
                username: user.username.clone(),
                role: user.role.clone(),
                special_message: user.special_message.clone(),
            },
            token,
        })
    }

    pub fn issue_token(&self, user: &UserRecord) -> Result<String, AuthError> {
        if self.jwt_secret.is_empty() {
            return Err(AuthError::MissingSecret);
        }

        let claims = Claims::new(user, self.expiry_hours);
        let encoding_key = EncodingKey::from_secret(self.jwt_secret.as_bytes());
        Ok(encode(&Header::default(), &claims, &encoding_key)?)
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let decoding_key = DecodingKey::from_secret(self.jwt_secret.as_bytes());
        decode::<Claims>(token, &decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }
}

pub fn load_users(path: &Path) -> Result<Vec<UserRecord>, AuthError> {
    let raw = std::fs::read_to_string(path).map_err(|source| AuthError::UsersFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_yaml::from_str(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn default_admin_logs_in_during_development() {
        let auth = Authenticator::from_config(&AppConfig::development().security).unwrap();
        let success = auth.login("admin", "admin").unwrap();
        assert_eq!(success.user.role, "admin");

        let claims = auth.verify_token(&success.token).unwrap();
        assert_eq!(claims.sub, "admin");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn oversized_expiry_is_capped() {
        let user = UserRecord::new("ana", "pw", "user");
        let claims = Claims::new(&user, u64::MAX);
        assert_eq!(claims.exp - claims.iat, MAX_JWT_EXPIRY_HOURS as i64 * 3600);

        let auth = Authenticator::new(vec![user], "k", u64::MAX);
        let success = auth.login("ana", "pw").unwrap();
        assert!(auth.verify_token(&success.token).is_ok());
    }

    #[test]
    fn wrong_password_is_rejected() {
        let auth = Authenticator::new(vec![UserRecord::new("ana", "s3cret", "user")], "k", 1);
        assert!(matches!(auth.login("ana", "nope"), Err(AuthError::InvalidCredentials)));
        assert!(matches!(auth.login("bob", "s3cret"), Err(AuthError::InvalidCredentials)));
        assert!(auth.login("ana", "s3cret").is_ok());
    }

    #[test]
    fn empty_secret_cannot_sign() {
        let auth = Authenticator::new(vec![UserRecord::new("ana", "pw", "user")], "", 1);
        assert!(matches!(auth.login("ana", "pw"), Err(AuthError::MissingSecret)));
    }

    #[test]
    fn users_file_is_yaml_list() {
        let yaml = format!(
            "- username: ana\n  password_sha256: {}\n  role: editor\n  special_message: hola\n",
            password_digest("pw")
        );
        let users: Vec<UserRecord> = serde_yaml::from_str(&yaml).unwrap();
        let auth = Authenticator::new(users, "k", 2);
        let success = auth.login("ana", "pw").unwrap();
        assert_eq!(success.user.special_message.as_deref(), Some("hola"));
    }

    #[test]
    fn digest_is_lowercase_hex() {
        assert_eq!(
            password_digest("admin"),
            "8c6976e5b5410415bde908bd4dee15dfb167a9c873fc4bb8a81f6f2ab448a918"
        );
    }
}
