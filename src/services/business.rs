use crate::api::{segment, ApiClient, ApiError};
use crate::models::{
    Business, BusinessHours, BusinessResponse, CreateBusinessPayload, CreateBusinessResponse,
    MenuResponse,
};

#[derive(Clone)]
pub struct BusinessService {
    api: ApiClient,
}

impl BusinessService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Business owned by the logged-in user. A 404 means they have none yet.
    pub async fn get_my_business(&self) -> Result<Business, ApiError> {
        self.api.get("business/me").await
    }

    pub async fn create(
        &self,
        payload: &CreateBusinessPayload,
    ) -> Result<CreateBusinessResponse, ApiError> {
        self.api.post("business/create", payload).await
    }

    /// Replace the whole weekly schedule. Returns the updated business.
    pub async fn update_schedule(
        &self,
        business_id: &str,
        schedule: &[BusinessHours],
    ) -> Result<BusinessResponse, ApiError> {
        let path = format!("business/{}/schedule", segment(business_id));
        self.api.patch(&path, schedule).await
    }

    /// Business document with dishes and drinks populated.
    pub async fn get_menu(&self, business_id: &str) -> Result<MenuResponse, ApiError> {
        let path = format!("{}/menu", segment(business_id));
        self.api.get(&path).await
    }
}
