use std::sync::{Arc, RwLock};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::ClientError;
use crate::transport::{ApiRequest, ApiResponse, Transport};

/// Typed backend client shared by every service.
///
/// Holds the bearer token installed by the session store; every request
/// sent through [`ApiClient::execute`] carries it when present. Cloning is
/// cheap and clones share the token.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    token: Arc<RwLock<Option<String>>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("has_token", &self.token().is_some())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            token: Arc::new(RwLock::new(None)),
        }
    }

    pub fn set_token(&self, token: Option<String>) {
        match self.token.write() {
            Ok(mut guard) => *guard = token,
            Err(poisoned) => *poisoned.into_inner() = token,
        }
    }

    pub fn clear_token(&self) {
        self.set_token(None);
    }

    pub fn token(&self) -> Option<String> {
        match self.token.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Send `request`, attaching the bearer token and classifying the
    /// status. Only 2xx responses are returned.
    pub async fn execute(&self, mut request: ApiRequest) -> Result<ApiResponse, ClientError> {
        if request.bearer.is_none() {
            request.bearer = self.token();
        }
        let method = request.method;
        let path = request.path.clone();

        let response = self.transport.send(request).await?;
        if response.is_success() {
            return Ok(response);
        }

        let message = error_message(&response.body);
        tracing::debug!(%method, path = %path, status = response.status, "request rejected");

        Err(match response.status {
            404 => ClientError::NotFound { path },
            401 | 403 => ClientError::Unauthorized {
                status: response.status,
                message,
            },
            status => ClientError::Http { status, message },
        })
    }

    /// Send `request` and decode the JSON body.
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> Result<T, ClientError> {
        let path = request.path.clone();
        let response = self.execute(request).await?;
        serde_json::from_slice(&response.body).map_err(|e| {
            tracing::warn!(path = %path, error = %e, "failed to decode response body");
            ClientError::Decode(format!("{path}: {e}"))
        })
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: impl Into<String>,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let mut request = ApiRequest::get(path);
        for (key, value) in query {
            request = request.query(key, value);
        }
        self.send_json(request).await
    }

    pub async fn post<B, T>(&self, path: impl Into<String>, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(ApiRequest::post(path).json(body)?).await
    }

    pub async fn put<B, T>(&self, path: impl Into<String>, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(ApiRequest::put(path).json(body)?).await
    }

    /// PATCH with query parameters and no body, the shape of every status
    /// style update on the backend.
    pub async fn patch<T: DeserializeOwned>(
        &self,
        path: impl Into<String>,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let mut request = ApiRequest::patch(path);
        for (key, value) in query {
            request = request.query(key, value);
        }
        self.send_json(request).await
    }

    pub async fn patch_json<B, T>(&self, path: impl Into<String>, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(ApiRequest::patch(path).json(body)?).await
    }

    /// DELETE, ignoring any response body.
    pub async fn delete(&self, path: impl Into<String>) -> Result<(), ClientError> {
        self.execute(ApiRequest::delete(path)).await?;
        Ok(())
    }
}

/// Best-effort human message from an error body: `message` or `error`
/// from a JSON object, else the raw text.
fn error_message(body: &[u8]) -> String {
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_slice(body) {
        for key in ["message", "error"] {
            if let Some(serde_json::Value::String(message)) = map.get(key) {
                return message.clone();
            }
        }
    }
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.chars().count() > 200 {
        format!("{}...", text.chars().take(200).collect::<String>())
    } else {
        text.to_string()
    }
}
