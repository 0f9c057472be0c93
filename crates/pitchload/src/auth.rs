use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum::{
    Extension, Json, RequestPartsExt,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    database::Database,
    errors::AppError,
    extract::ApiJson,
    models::{ProfileStats, User},
};

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Signing material for bearer tokens, shared with handlers as an extension.
#[derive(Clone)]
pub struct AuthKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl AuthKeys {
    pub fn new(secret: &[u8], ttl_days: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl: Duration::seconds(ttl_days.saturating_mul(SECONDS_PER_DAY)),
        }
    }

    pub fn create_token(&self, user: &User) -> Result<String, AppError> {
        let now = OffsetDateTime::now_utc();
        let expires = now.checked_add(self.ttl).ok_or_else(|| {
            tracing::error!("Token lifetime overflows the calendar");
            AppError::Internal
        })?;
        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            exp: expires.unix_timestamp(),
            iat: now.unix_timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding).map_err(|e| {
            tracing::error!("Failed to sign token: {e}");
            AppError::Internal
        })
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, AppError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(|_| AppError::Unauthorized)?;
        Ok(data.claims)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid, // user id
    pub email: String,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(
        min = 1,
        max = 100,
        message = "Name must be between 1 and 100 characters"
    ))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Name must be between 1 and 100 characters"
    ))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

/// The caller's account together with what they own.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub stats: ProfileStats,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
        }
    }
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| {
            tracing::error!("Failed to hash password: {e}");
            AppError::Internal
        })?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|e| {
        tracing::error!("Stored password hash is malformed: {e}");
        AppError::Internal
    })?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Extractor for the authenticated user.
pub struct AuthUser(pub Claims);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let keys = parts
            .extensions
            .get::<AuthKeys>()
            .cloned()
            .ok_or(AppError::Internal)?;

        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| AppError::Unauthorized)?;

        let claims = keys.verify_token(bearer.token())?;
        Ok(AuthUser(claims))
    }
}

#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid input or email taken")
    )
)]
pub async fn register(
    Extension(db): Extension<Database>,
    Extension(keys): Extension<AuthKeys>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    req.validate()?;

    let email = req.email.trim().to_lowercase();
    if db.get_user_by_email(&email).await?.is_some() {
        return Err(AppError::InvalidInput(
            "Email already registered".to_string(),
        ));
    }

    let password_hash = hash_password(&req.password)?;
    let user = User::new(email, req.name.trim().to_string());
    db.create_user(&user, &password_hash).await?;

    tracing::info!(user_id = %user.id, "Registered user");

    let token = keys.create_token(&user)?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: user.into(),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 401, description = "Wrong email or password")
    )
)]
pub async fn login(
    Extension(db): Extension<Database>,
    Extension(keys): Extension<AuthKeys>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    req.validate()?;

    let account = db
        .get_user_with_password(&req.email.trim().to_lowercase())
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !verify_password(&req.password, &account.password_hash)? {
        return Err(AppError::Unauthorized);
    }

    let token = keys.create_token(&account.user)?;
    Ok(Json(AuthResponse {
        token,
        user: account.user.into(),
    }))
}

#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer" = []))
)]
pub async fn me(
    Extension(db): Extension<Database>,
    AuthUser(claims): AuthUser,
) -> Result<Json<UserResponse>, AppError> {
    let user = db
        .get_user(claims.sub)
        .await?
        .ok_or(AppError::Unauthorized)?;

    Ok(Json(user.into()))
}

#[utoipa::path(
    get,
    path = "/auth/profile",
    tag = "auth",
    responses(
        (status = 200, description = "Current user with owned record counts", body = ProfileResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer" = []))
)]
pub async fn get_profile(
    Extension(db): Extension<Database>,
    AuthUser(claims): AuthUser,
) -> Result<Json<ProfileResponse>, AppError> {
    let user = db
        .get_user(claims.sub)
        .await?
        .ok_or(AppError::Unauthorized)?;
    let stats = db.profile_stats(user.id).await?;

    Ok(Json(ProfileResponse {
        user: user.into(),
        stats,
    }))
}

/// Updates name and email. A fresh token is issued since the email is a claim.
#[utoipa::path(
    put,
    path = "/auth/profile",
    tag = "auth",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = AuthResponse),
        (status = 400, description = "Invalid input or email taken"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer" = []))
)]
pub async fn update_profile(
    Extension(db): Extension<Database>,
    Extension(keys): Extension<AuthKeys>,
    AuthUser(claims): AuthUser,
    ApiJson(req): ApiJson<UpdateProfileRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    req.validate()?;

    let email = req.email.trim().to_lowercase();
    let user = db
        .update_user_profile(claims.sub, req.name.trim(), &email)
        .await?
        .ok_or(AppError::Unauthorized)?;

    tracing::info!(user_id = %user.id, "Updated profile");

    let token = keys.create_token(&user)?;
    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

#[utoipa::path(
    put,
    path = "/auth/password",
    tag = "auth",
    request_body = ChangePasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Current password is wrong")
    ),
    security(("bearer" = []))
)]
pub async fn change_password(
    Extension(db): Extension<Database>,
    AuthUser(claims): AuthUser,
    ApiJson(req): ApiJson<ChangePasswordRequest>,
) -> Result<StatusCode, AppError> {
    req.validate()?;

    let current_hash = db
        .get_password_hash(claims.sub)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !verify_password(&req.current_password, &current_hash)? {
        return Err(AppError::Unauthorized);
    }

    let password_hash = hash_password(&req.new_password)?;
    db.update_password(claims.sub, &password_hash).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User::new("coach@example.com".to_string(), "Coach".to_string())
    }

    #[test]
    fn test_token_round_trip() {
        let keys = AuthKeys::new(b"test-secret", 7);
        let user = user();
        let token = keys.create_token(&user).unwrap();

        let claims = keys.verify_token(&token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, "coach@example.com");
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 60 * 60);
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let token = AuthKeys::new(b"one", 7).create_token(&user()).unwrap();
        assert!(matches!(
            AuthKeys::new(b"two", 7).verify_token(&token),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn test_unrepresentable_expiry_is_an_error() {
        let keys = AuthKeys::new(b"test-secret", i64::MAX);
        assert!(matches!(
            keys.create_token(&user()),
            Err(AppError::Internal)
        ));

        let keys = AuthKeys::new(b"test-secret", 100_000_000);
        assert!(matches!(
            keys.create_token(&user()),
            Err(AppError::Internal)
        ));
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        let keys = AuthKeys::new(b"test-secret", 7);
        assert!(matches!(
            keys.verify_token("not.a.token"),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn test_password_hashing() {
        let hash = hash_password("correct horse").unwrap();
        assert_ne!(hash, "correct horse");
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("battery staple", &hash).unwrap());
    }

    #[test]
    fn test_register_validation() {
        let req = RegisterRequest {
            email: "not-an-email".to_string(),
            password: "short".to_string(),
            name: "Coach".to_string(),
        };
        let err: AppError = req.validate().unwrap_err().into();
        match err {
            AppError::InvalidInput(msg) => {
                assert!(msg.contains("Invalid email address"));
                assert!(msg.contains("at least 8 characters"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_profile_update_validation() {
        let req = UpdateProfileRequest {
            name: String::new(),
            email: "coach@example.com".to_string(),
        };
        let err: AppError = req.validate().unwrap_err().into();
        assert!(matches!(err, AppError::InvalidInput(msg) if msg.contains("Name must be")));

        let req = UpdateProfileRequest {
            name: "Coach".to_string(),
            email: "coach-at-example".to_string(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_profile_response_flattens_user() {
        let user = user();
        let id = user.id;
        let profile = ProfileResponse {
            user: user.into(),
            stats: ProfileStats {
                team_count: 2,
                player_count: 30,
                activity_count: 412,
            },
        };
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["id"], serde_json::json!(id));
        assert_eq!(json["email"], "coach@example.com");
        assert_eq!(json["stats"]["team_count"], 2);
        assert_eq!(json["stats"]["activity_count"], 412);
    }
}
