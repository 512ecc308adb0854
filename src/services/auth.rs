use crate::api::{ApiClient, ApiError};
use crate::models::{LoginCredentials, LoginResponse, RegisterPayload, RegisterResponse};

#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
}

impl AuthService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// POST login
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<LoginResponse, ApiError> {
        self.api.post("login", credentials).await
    }

    /// POST register
    pub async fn register(&self, payload: &RegisterPayload) -> Result<RegisterResponse, ApiError> {
        self.api.post("register", payload).await
    }
}
