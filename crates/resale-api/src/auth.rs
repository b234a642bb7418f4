use std::sync::{Arc, OnceLock};

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{
    Form, Json,
    extract::{State, rejection::FormRejection},
    response::IntoResponse,
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::{info, warn};

use resale_db::Database;
use resale_types::api::{Claims, LoginRequest, TokenResponse};

use crate::error::ApiError;
use crate::uploads::UploadStore;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    pub token_ttl: chrono::Duration,
    pub uploads: UploadStore,
}

/// Same message for unknown user and wrong password.
const BAD_CREDENTIALS: &str = "Incorrect username or password";

static DUMMY_HASH: OnceLock<String> = OnceLock::new();

/// Real Argon2id hash of a throwaway password. Checked against on the
/// unknown-user path so it costs the same as a wrong password.
fn dummy_hash() -> &'static str {
    DUMMY_HASH.get_or_init(|| hash_password("resale-unknown-admin").unwrap_or_default())
}

/// POST /admin/login: form-encoded `username` and `password`.
pub async fn login(
    State(state): State<AppState>,
    form: Result<Form<LoginRequest>, FormRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Form(req) = form?;

    let username = req.username.clone();
    let admin = crate::db_call(&state, move |db| db.get_admin_by_username(&username)).await?;

    let Some(admin) = admin else {
        let password = req.password;
        let _ = tokio::task::spawn_blocking(move || verify_password(&password, dummy_hash())).await;
        warn!("Login attempt for unknown admin '{}'", req.username);
        return Err(ApiError::unauthorized(BAD_CREDENTIALS));
    };

    let password = req.password;
    let stored_hash = admin.hashed_password.clone();
    let valid = tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
        .await
        .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))?;

    if !valid {
        warn!("Failed login for admin '{}'", admin.username);
        return Err(ApiError::unauthorized(BAD_CREDENTIALS));
    }

    let access_token = issue_token(&state.jwt_secret, &admin.username, state.token_ttl)?;
    info!("Admin '{}' logged in", admin.username);

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}

/// Hash a password with Argon2id and a random salt, as a PHC string.
pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Password hashing failed: {}", e))?
        .to_string();
    Ok(hash)
}

/// False for a wrong password and for a stored hash that does not parse.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        warn!("Stored admin password hash is not a valid PHC string");
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

pub fn issue_token(secret: &str, username: &str, ttl: chrono::Duration) -> anyhow::Result<String> {
    let exp = (chrono::Utc::now() + ttl).timestamp().max(0) as usize;
    let claims = Claims {
        sub: username.to_string(),
        exp,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// Check signature and expiry. No leeway: a token is dead the second it expires.
pub fn verify_token(secret: &str, token: &str) -> Result<Claims, ApiError> {
    let mut validation = Validation::default();
    validation.leeway = 0;

    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            warn!("Rejected bearer token: {}", e);
            ApiError::unauthorized("Could not validate credentials")
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret";

    #[test]
    fn fresh_token_verifies() {
        let token = issue_token(SECRET, "admin", chrono::Duration::minutes(30)).unwrap();
        let claims = verify_token(SECRET, &token).unwrap();
        assert_eq!(claims.sub, "admin");
    }

    #[test]
    fn expired_token_fails_closed() {
        let token = issue_token(SECRET, "admin", chrono::Duration::seconds(-5)).unwrap();
        let err = verify_token(SECRET, &token).unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let token = issue_token("someone-else", "admin", chrono::Duration::minutes(5)).unwrap();
        assert!(verify_token(SECRET, &token).is_err());
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(verify_token(SECRET, "not.a.jwt").is_err());
        assert!(verify_token(SECRET, "").is_err());
    }

    #[test]
    fn unknown_user_check_runs_a_real_argon2_verify() {
        let hash = dummy_hash();
        assert!(hash.starts_with("$argon2id$"));
        assert!(PasswordHash::new(hash).is_ok());
        assert!(!verify_password("hunter2", hash));
        assert!(!verify_password("", hash));
    }

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("battery staple", &hash));
        assert!(!verify_password("correct horse", "not-a-hash"));
    }
}
