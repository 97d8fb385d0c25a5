use clinassist_client::{ApiClient, ApiRequest, ClientError};
use clinassist_core::api_paths;
use clinassist_core::models::therapeute::Therapeute;
use clinassist_core::models::user::{AuthResponse, LoginRequest};
use tracing::info;

use crate::error::AuthError;

/// Exchange credentials for tokens via `POST /auth/login`.
///
/// Any failure of the call (rejected credentials, unreachable backend,
/// malformed answer) is reported as [`AuthError::Authentication`].
pub async fn login(api: &ApiClient, credentials: &LoginRequest) -> Result<AuthResponse, AuthError> {
    info!(username = %credentials.username_or_email, "logging in");

    let request = ApiRequest::post(api_paths::AUTH_LOGIN).json(credentials)?;
    api.send_json(request).await.map_err(|e| match e {
        ClientError::Unauthorized { .. } | ClientError::NotFound { .. } => {
            AuthError::Authentication("invalid credentials".to_string())
        }
        other => AuthError::Authentication(other.to_string()),
    })
}

/// Rotate tokens via `POST /auth/refresh`, passing the refresh token in
/// the `X-Refresh-Token` header.
pub async fn refresh(api: &ApiClient, refresh_token: &str) -> Result<AuthResponse, AuthError> {
    info!("refreshing access token");

    let request = ApiRequest::post(api_paths::AUTH_REFRESH)
        .header("X-Refresh-Token", refresh_token);
    Ok(api.send_json(request).await?)
}

/// Resolve the therapist record of a THERAPEUTE user.
pub async fn lookup_therapeute(api: &ApiClient, user_id: i64) -> Result<Therapeute, ClientError> {
    api.get(api_paths::therapeute_by_user(user_id), &[]).await
}
