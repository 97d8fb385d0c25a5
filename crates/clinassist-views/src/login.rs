use clinassist_auth::{AuthError, Session};
use clinassist_core::models::user::LoginRequest;
use clinassist_services::Services;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("Veuillez remplir tous les champs")]
    MissingFields,

    #[error("Identifiants invalides")]
    InvalidCredentials,

    #[error("Connexion au serveur impossible")]
    Unavailable(#[source] AuthError),
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub username_or_email: String,
    pub password: String,
}

impl LoginForm {
    /// Sign in through the services, which clears caches left by any
    /// previous identity, mapping failures to the messages shown under the
    /// form.
    pub async fn submit(&self, services: &Services) -> Result<Session, LoginError> {
        let username = self.username_or_email.trim();
        if username.is_empty() || self.password.is_empty() {
            return Err(LoginError::MissingFields);
        }

        let request = LoginRequest {
            username_or_email: username.to_string(),
            password: self.password.clone(),
        };
        services.login(&request).await.map_err(|e| match e {
            AuthError::Authentication(_) => LoginError::InvalidCredentials,
            other => LoginError::Unavailable(other),
        })
    }
}
