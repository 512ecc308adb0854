use crate::api::{segment, ApiClient, ApiError};
use crate::models::{CreateOrderPayload, EditOrderPayload, OrderResponse, OrdersResponse};

#[derive(Clone)]
pub struct OrderService {
    api: ApiClient,
}

impl OrderService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    fn collection(business_id: &str) -> String {
        format!("business/{}/orders", segment(business_id))
    }

    pub async fn create(
        &self,
        business_id: &str,
        payload: &CreateOrderPayload,
    ) -> Result<OrderResponse, ApiError> {
        self.api.post(&Self::collection(business_id), payload).await
    }

    /// Partial update: status alone, or any customer/line fields.
    pub async fn update(
        &self,
        business_id: &str,
        order_id: &str,
        payload: &EditOrderPayload,
    ) -> Result<OrderResponse, ApiError> {
        let path = format!("{}/{}", Self::collection(business_id), segment(order_id));
        self.api.patch(&path, payload).await
    }

    pub async fn get_all(&self, business_id: &str) -> Result<OrdersResponse, ApiError> {
        self.api.get(&Self::collection(business_id)).await
    }
}
