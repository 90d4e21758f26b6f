// src/auth.rs
use anyhow::{Context, Result};
use argon2::{
    password_hash::{
        Error as PasswordHashError, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Algorithm as Argon2Algorithm, Argon2, Params, Version,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand_core::OsRng;
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome};
use rocket::{Request, State};
use serde::{Deserialize, Serialize};

use crate::app_log;
use crate::core::config_manager::{AuthSettings, MAX_TOKEN_TTL_HOURS};
use crate::domain::DomainError;
use crate::repository::{User, UserRepository};
use crate::web::AppState;

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // User ID
    pub email: String,
    pub exp: i64,
    pub iat: i64,
}

/// Issues and verifies the HS256 session tokens handed out at login.
pub struct AuthConfig {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl: Duration,
}

impl AuthConfig {
    pub fn new(settings: &AuthSettings) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(settings.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(settings.jwt_secret.as_bytes()),
            token_ttl: Duration::hours(settings.token_ttl_hours.clamp(1, MAX_TOKEN_TTL_HOURS)),
        }
    }

    pub fn issue_token(&self, user: &User) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            exp: (now + self.token_ttl).timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .context("Failed to sign session token")
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(token, &self.decoding_key, &validation)
            .context("Invalid session token")?;
        Ok(data.claims)
    }
}

pub async fn hash_password(password: &str) -> Result<String> {
    let password = password.to_string();

    tokio::task::spawn_blocking(move || {
        let params = Params::new(4 * 1024, 3, 1, None)
            .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {}", e))?;
        let argon2 = Argon2::new(Argon2Algorithm::Argon2id, Version::V0x13, params);
        let salt = SaltString::generate(&mut OsRng);

        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| anyhow::anyhow!("Password hashing failed: {}", e))
    })
    .await
    .context("Password hashing task failed")?
}

pub async fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let password = password.to_string();
    let hash = hash.to_string();

    tokio::task::spawn_blocking(move || {
        let parsed = PasswordHash::new(&hash)
            .map_err(|e| anyhow::anyhow!("Stored password hash is malformed: {}", e))?;

        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(PasswordHashError::Password) => Ok(false),
            Err(e) => Err(anyhow::anyhow!("Password verification failed: {}", e)),
        }
    })
    .await
    .context("Password verification task failed")?
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::MissingField("name"));
        }
        if self.email.trim().is_empty() {
            return Err(DomainError::MissingField("email"));
        }
        if self.password.is_empty() {
            return Err(DomainError::MissingField("password"));
        }
        if !self.email.contains('@') {
            return Err(DomainError::InvalidEmail);
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(DomainError::PasswordTooShort(MIN_PASSWORD_LEN));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// The caller behind a valid bearer token.
pub struct AuthenticatedUser {
    pub user: User,
}

impl AuthenticatedUser {
    pub fn id(&self) -> &str {
        &self.user.id
    }

    pub fn email(&self) -> &str {
        &self.user.email
    }

    pub fn name(&self) -> &str {
        &self.user.name
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthenticatedUser {
    type Error = AuthError;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let state = match req.guard::<&State<AppState>>().await {
            Outcome::Success(state) => state,
            Outcome::Error((status, _)) => {
                return Outcome::Error((status, AuthError::DatabaseError))
            }
            Outcome::Forward(f) => return Outcome::Forward(f),
        };

        let token = match req.headers().get_one("Authorization") {
            Some(header) => match header.strip_prefix("Bearer ") {
                Some(token) => token.trim(),
                None => {
                    app_log!(warn, "Invalid Authorization header format");
                    return Outcome::Error((Status::Unauthorized, AuthError::InvalidToken));
                }
            },
            None => {
                app_log!(debug, "Missing Authorization header");
                return Outcome::Error((Status::Unauthorized, AuthError::MissingToken));
            }
        };

        let claims = match state.auth.verify_token(token) {
            Ok(claims) => claims,
            Err(e) => {
                app_log!(warn, "Token verification failed: {:#}", e);
                return Outcome::Error((Status::Unauthorized, AuthError::TokenVerificationFailed));
            }
        };

        let users = UserRepository::new(state.db.pool());
        match users.find_by_id(&claims.sub).await {
            Ok(Some(user)) => {
                app_log!(debug, "User {} authenticated", user.email);
                Outcome::Success(AuthenticatedUser { user })
            }
            Ok(None) => {
                app_log!(warn, "Token for unknown user {}", claims.sub);
                Outcome::Error((Status::Unauthorized, AuthError::UnknownUser))
            }
            Err(e) => {
                app_log!(error, "Failed to load user {}: {}", claims.sub, e);
                Outcome::Error((Status::InternalServerError, AuthError::DatabaseError))
            }
        }
    }
}

#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    TokenVerificationFailed,
    UnknownUser,
    DatabaseError,
}

impl AuthError {
    pub fn message(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "Authorization token required",
            AuthError::InvalidToken => "Invalid authorization token format",
            AuthError::TokenVerificationFailed => "Token verification failed",
            AuthError::UnknownUser => "User no longer exists",
            AuthError::DatabaseError => "Database error occurred",
        }
    }
}

// Optional auth guard that doesn't fail if no auth is provided
pub struct OptionalAuth {
    pub user: Option<AuthenticatedUser>,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for OptionalAuth {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        match AuthenticatedUser::from_request(req).await {
            Outcome::Success(auth) => Outcome::Success(OptionalAuth { user: Some(auth) }),
            _ => Outcome::Success(OptionalAuth { user: None }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> AuthSettings {
        AuthSettings {
            jwt_secret: "test-secret".to_string(),
            token_ttl_hours: 1,
        }
    }

    fn user() -> User {
        User {
            id: "user-1".to_string(),
            email: "ana@example.com".to_string(),
            name: "Ana".to_string(),
            password_hash: String::new(),
            email_verified: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_token_ttl_is_clamped() {
        let auth = AuthConfig::new(&AuthSettings {
            jwt_secret: "test-secret".to_string(),
            token_ttl_hours: -48,
        });
        let claims = auth.verify_token(&auth.issue_token(&user()).unwrap()).unwrap();
        assert_eq!(claims.exp - claims.iat, 3600);

        let auth = AuthConfig::new(&AuthSettings {
            jwt_secret: "test-secret".to_string(),
            token_ttl_hours: i64::MAX,
        });
        let claims = auth.verify_token(&auth.issue_token(&user()).unwrap()).unwrap();
        assert_eq!(claims.exp - claims.iat, MAX_TOKEN_TTL_HOURS * 3600);
    }

    #[test]
    fn test_token_roundtrip_and_tamper() {
        let auth = AuthConfig::new(&settings());
        let token = auth.issue_token(&user()).unwrap();

        let claims = auth.verify_token(&token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.email, "ana@example.com");

        let other = AuthConfig::new(&AuthSettings {
            jwt_secret: "another-secret".to_string(),
            token_ttl_hours: 1,
        });
        assert!(other.verify_token(&token).is_err());
        assert!(auth.verify_token("not-a-token").is_err());
    }

    #[tokio::test]
    async fn test_password_hash_and_verify() {
        let hash = hash_password("correct horse").await.unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &hash).await.unwrap());
        assert!(!verify_password("wrong horse", &hash).await.unwrap());
        assert!(verify_password("anything", "garbage").await.is_err());
    }

    #[test]
    fn test_register_validation() {
        let request = |email: &str, name: &str, password: &str| RegisterRequest {
            email: email.to_string(),
            name: name.to_string(),
            password: password.to_string(),
        };

        assert!(request("ana@example.com", "Ana", "12345678").validate().is_ok());
        assert_eq!(
            request("ana@example.com", " ", "12345678").validate(),
            Err(DomainError::MissingField("name"))
        );
        assert_eq!(
            request("ana.example.com", "Ana", "12345678").validate(),
            Err(DomainError::InvalidEmail)
        );
        assert_eq!(
            request("ana@example.com", "Ana", "1234567").validate(),
            Err(DomainError::PasswordTooShort(MIN_PASSWORD_LEN))
        );
    }
}
