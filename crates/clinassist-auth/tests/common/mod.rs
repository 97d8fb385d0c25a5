#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use clinassist_client::{
    ApiClient, ApiRequest, ApiResponse, BoxFuture, ClientError, Method, Transport,
};
use serde_json::{Value, json};

/// Canned backend: one response per `(method, path)`, every request logged.
#[derive(Default)]
pub struct CannedBackend {
    routes: Mutex<HashMap<(Method, String), (u16, Value)>>,
    pub requests: Mutex<Vec<ApiRequest>>,
}

impl CannedBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn route(&self, method: Method, path: &str, status: u16, body: Value) {
        self.routes
            .lock()
            .unwrap()
            .insert((method, path.to_string()), (status, body));
    }

    pub fn requests_to(&self, path: &str) -> Vec<ApiRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.path == path)
            .cloned()
            .collect()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Transport for CannedBackend {
    fn send(&self, request: ApiRequest) -> BoxFuture<'_, Result<ApiResponse, ClientError>> {
        let key = (request.method, request.path.clone());
        self.requests.lock().unwrap().push(request);
        let (status, body) = self
            .routes
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .unwrap_or((404, json!({"message": "no route"})));
        Box::pin(async move {
            Ok(ApiResponse {
                status,
                body: serde_json::to_vec(&body).unwrap(),
            })
        })
    }
}

pub fn api(backend: &Arc<CannedBackend>) -> ApiClient {
    ApiClient::new(backend.clone())
}

pub fn user_json(id: i64, role: &str) -> Value {
    json!({
        "id": id,
        "username": format!("user{id}"),
        "email": format!("user{id}@clinassist.test"),
        "firstName": "Claire",
        "lastName": "Martin",
        "role": role,
    })
}

pub fn auth_json(access: &str, refresh: &str, user: Value) -> Value {
    json!({"accessToken": access, "refreshToken": refresh, "user": user})
}

pub fn therapeute_json(id: i64, user_id: i64) -> Value {
    json!({
        "id": id,
        "userId": user_id,
        "firstName": "Claire",
        "lastName": "Martin",
        "specialization": "TCC",
        "available": true,
    })
}
