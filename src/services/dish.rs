use crate::api::{segment, ApiClient, ApiError};
use crate::models::{CreateDishPayload, DeleteDishResponse, DishResponse, UpdateDishPayload};

#[derive(Clone)]
pub struct DishService {
    api: ApiClient,
}

impl DishService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    fn collection(business_id: &str) -> String {
        format!("business/{}/dishes", segment(business_id))
    }

    pub async fn create(
        &self,
        business_id: &str,
        payload: &CreateDishPayload,
    ) -> Result<DishResponse, ApiError> {
        self.api.post(&Self::collection(business_id), payload).await
    }

    pub async fn update(
        &self,
        business_id: &str,
        dish_id: &str,
        payload: &UpdateDishPayload,
    ) -> Result<DishResponse, ApiError> {
        let path = format!("{}/{}", Self::collection(business_id), segment(dish_id));
        self.api.patch(&path, payload).await
    }

    pub async fn remove(
        &self,
        business_id: &str,
        dish_id: &str,
    ) -> Result<DeleteDishResponse, ApiError> {
        let path = format!("{}/{}", Self::collection(business_id), segment(dish_id));
        self.api.delete(&path).await
    }
}
