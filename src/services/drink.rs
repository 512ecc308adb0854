use crate::api::{segment, ApiClient, ApiError};
use crate::models::{CreateDrinkPayload, DeleteDrinkResponse, DrinkResponse, UpdateDrinkPayload};

#[derive(Clone)]
pub struct DrinkService {
    api: ApiClient,
}

impl DrinkService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    fn collection(business_id: &str) -> String {
        format!("business/{}/drinks", segment(business_id))
    }

    pub async fn create(
        &self,
        business_id: &str,
        payload: &CreateDrinkPayload,
    ) -> Result<DrinkResponse, ApiError> {
        self.api.post(&Self::collection(business_id), payload).await
    }

    pub async fn update(
        &self,
        business_id: &str,
        drink_id: &str,
        payload: &UpdateDrinkPayload,
    ) -> Result<DrinkResponse, ApiError> {
        let path = format!("{}/{}", Self::collection(business_id), segment(drink_id));
        self.api.patch(&path, payload).await
    }

    pub async fn remove(
        &self,
        business_id: &str,
        drink_id: &str,
    ) -> Result<DeleteDrinkResponse, ApiError> {
        let path = format!("{}/{}", Self::collection(business_id), segment(drink_id));
        self.api.delete(&path).await
    }
}
