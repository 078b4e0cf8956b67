use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, Method, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use models::user::ROLE_ADMIN;
use service::auth::{
    domain::{Claims, LoginInput, RegisterInput},
    errors::AuthError,
    repo::seaorm::SeaOrmAuthRepository,
    service::{AuthConfig, AuthService},
};

use crate::errors::JsonApiError;

#[derive(Clone)]
pub struct ServerAuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub auth: ServerAuthConfig,
}

impl ServerState {
    fn auth_service(&self) -> AuthService<SeaOrmAuthRepository> {
        let repo = Arc::new(SeaOrmAuthRepository { db: self.db.clone() });
        AuthService::new(
            repo,
            AuthConfig {
                jwt_secret: Some(self.auth.jwt_secret.clone()),
                token_ttl_hours: self.auth.token_ttl_hours,
                password_algorithm: "argon2".into(),
            },
        )
    }
}

#[derive(Serialize)]
pub struct RegisterOutput {
    pub user_id: Uuid,
}

#[derive(Serialize)]
pub struct LoginOutput {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub role: String,
    pub token: String,
}

fn map_auth_error(e: AuthError) -> JsonApiError {
    warn!(code = e.code(), error = %e, "auth request failed");
    match e {
        AuthError::Validation(_) => JsonApiError::new(StatusCode::BAD_REQUEST, e.to_string(), None),
        AuthError::Conflict => JsonApiError::new(StatusCode::CONFLICT, e.to_string(), None),
        AuthError::NotFound | AuthError::Unauthorized => {
            JsonApiError::new(StatusCode::UNAUTHORIZED, "invalid credentials", None)
        }
        AuthError::HashError(_) | AuthError::TokenError(_) | AuthError::Repository(_) => {
            JsonApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "unexpected error",
                Some(e.to_string()),
            )
        }
    }
}

pub async fn register(
    State(state): State<ServerState>,
    Json(input): Json<RegisterInput>,
) -> Result<Json<RegisterOutput>, JsonApiError> {
    models::user::validate_email(&input.email)
        .map_err(|e| JsonApiError::new(StatusCode::BAD_REQUEST, e.to_string(), None))?;
    models::user::validate_name(&input.name)
        .map_err(|e| JsonApiError::new(StatusCode::BAD_REQUEST, e.to_string(), None))?;

    let created = state.auth_service().register(input).await.map_err(map_auth_error)?;
    Ok(Json(RegisterOutput { user_id: created.id }))
}

pub async fn login(
    State(state): State<ServerState>,
    jar: CookieJar,
    Json(input): Json<LoginInput>,
) -> Result<(CookieJar, Json<LoginOutput>), JsonApiError> {
    let session = state.auth_service().login(input).await.map_err(map_auth_error)?;
    let user = session.user;
    let Some(token) = session.token else {
        return Err(JsonApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "token generation failed",
            None,
        ));
    };

    let mut cookie = Cookie::new("auth_token", token.clone());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(false);
    cookie.set_same_site(SameSite::Lax);
    let jar = jar.add(cookie);

    let out = LoginOutput { user_id: user.id, email: user.email, name: user.name, role: user.role, token };
    Ok((jar, Json(out)))
}

pub async fn logout(jar: CookieJar) -> (CookieJar, StatusCode) {
    let jar = jar.remove(Cookie::from("auth_token"));
    (jar, StatusCode::NO_CONTENT)
}

fn bearer_token(req: &Request, jar: &CookieJar) -> Option<String> {
    let from_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string);
    from_header.or_else(|| jar.get("auth_token").map(|c| c.value().to_string()))
}

/// Route-layer gate for the company management surface: requires a valid
/// token (Authorization header or `auth_token` cookie) with the ADMIN role.
pub async fn require_admin(
    State(state): State<ServerState>,
    jar: CookieJar,
    req: Request,
    next: Next,
) -> Result<Response, JsonApiError> {
    // CORS preflight never carries credentials
    if req.method() == Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let path = req.uri().path().to_string();
    let Some(token) = bearer_token(&req, &jar) else {
        warn!(%path, "missing auth token");
        return Err(JsonApiError::new(StatusCode::UNAUTHORIZED, "authentication required", None));
    };

    let decoded = decode::<Claims>(
        &token,
        &DecodingKey::from_secret(state.auth.jwt_secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|e| {
        warn!(%path, error = %e, "invalid auth token");
        JsonApiError::new(StatusCode::UNAUTHORIZED, "invalid or expired token", None)
    })?;

    if decoded.claims.role != ROLE_ADMIN {
        warn!(%path, role = %decoded.claims.role, "insufficient role");
        return Err(JsonApiError::new(StatusCode::FORBIDDEN, "ADMIN role required", None));
    }

    let mut req = req;
    req.extensions_mut().insert(decoded.claims);
    Ok(next.run(req).await)
}
