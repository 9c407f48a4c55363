use crate::errors::AppError;
use crate::models::{
    LoginRequest, LoginResponse, PublicUser, RegisterRequest, RegisterResponse, User,
    VerifyResponse,
};
use crate::password;
use crate::state::AppState;
use crate::storage::persist_users;
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use chrono::Utc;
use rand::RngCore;

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let name = payload.name.trim();
    let email = payload.email.trim().to_lowercase();

    if name.is_empty() || email.is_empty() || payload.password.is_empty() {
        return Err(AppError::bad_request("all fields are required"));
    }
    if payload.password.chars().count() < 6 {
        return Err(AppError::bad_request("password must be at least 6 characters"));
    }
    if !looks_like_email(&email) {
        return Err(AppError::bad_request("invalid e-mail address"));
    }

    let mut users = state.users.lock().await;
    if users.iter().any(|u| u.email.eq_ignore_ascii_case(&email)) {
        return Err(AppError::bad_request("this e-mail is already registered"));
    }

    let password_hash = password::hash_password(&payload.password)?;
    let user = User {
        id: uuid::Uuid::new_v4().to_string(),
        name: name.to_string(),
        email,
        password_hash,
        created_at: Utc::now().to_rfc3339(),
    };

    users.push(user.clone());
    persist_users(&state.users_path, &users).await?;
    tracing::info!(email = %user.email, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "account created".into(),
            user: PublicUser::from(&user),
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let email = payload.email.trim().to_lowercase();
    if email.is_empty() || payload.password.is_empty() {
        return Err(AppError::bad_request("e-mail and password are required"));
    }

    let users = state.users.lock().await;
    // One message for both misses, so the response doesn't leak which
    // e-mails exist.
    let denied = || AppError::unauthorized("incorrect e-mail or password");
    let user = users
        .iter()
        .find(|u| u.email.eq_ignore_ascii_case(&email))
        .ok_or_else(denied)?;

    if !password::verify_password(&payload.password, &user.password_hash)? {
        return Err(denied());
    }

    Ok(Json(LoginResponse {
        message: "login successful".into(),
        token: generate_token(),
        user: PublicUser::from(user),
    }))
}

pub async fn verify(headers: HeaderMap) -> Result<Json<VerifyResponse>, AppError> {
    let token = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    match token {
        Some(token) if !token.is_empty() => Ok(Json(VerifyResponse { valid: true })),
        _ => Err(AppError::unauthorized("token not provided")),
    }
}

/// 32 random bytes, hex-encoded. Issued per login, never stored.
fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Matches the shape `local@domain.tld` with no whitespace: the same
/// acceptance set as the single pattern the web client applies.
fn looks_like_email(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = s.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    if local.is_empty() {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shape_check() {
        assert!(looks_like_email("ana@example.com"));
        assert!(looks_like_email("a.b+c@mail.example.org"));
        assert!(!looks_like_email("anaexample.com"));
        assert!(!looks_like_email("ana@example"));
        assert!(!looks_like_email("@example.com"));
        assert!(!looks_like_email("ana@.com"));
        assert!(!looks_like_email("ana@example."));
        assert!(!looks_like_email("ana maria@example.com"));
        assert!(!looks_like_email("ana@ex@ample.com"));
    }

    #[test]
    fn tokens_are_64_hex_chars_and_unique() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }
}
