//! Request payloads and response envelopes for the REST backend.

use serde::{Deserialize, Serialize};

use super::{
    Business, BusinessHours, DeliveryType, Dish, DishCategory, Drink, DrinkCategory, ItemKind,
    ObjectId, Order, OrderStatus, PaymentMethod, SalesChannel, User,
};

// =============================================================================
// Auth
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub message: String,
    pub token: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPayload {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct RegisterResponse {
    #[serde(default)]
    pub message: String,
    pub user: User,
}

// =============================================================================
// Business
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CreateBusinessPayload {
    pub name: String,
    pub description: String,
    pub address: String,
    pub phone: String,
}

/// The create endpoint acknowledges without returning a usable document.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct CreateBusinessResponse {
    #[serde(default)]
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct BusinessResponse {
    #[serde(default)]
    pub message: String,
    pub business: Business,
}

pub type UpdateSchedulePayload = Vec<BusinessHours>;

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct MenuResponse {
    #[serde(default)]
    pub message: String,
    pub menu: Business,
}

// =============================================================================
// Dishes & drinks
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDishPayload {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: DishCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDishPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<DishCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct DishResponse {
    #[serde(default)]
    pub message: String,
    pub dish: Dish,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteDishResponse {
    #[serde(default)]
    pub message: String,
    pub deleted_dish_id: ObjectId,
    #[serde(default)]
    pub dish_deleted: Option<Dish>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDrinkPayload {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: DrinkCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDrinkPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<DrinkCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct DrinkResponse {
    #[serde(default)]
    pub message: String,
    pub drink: Drink,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteDrinkResponse {
    #[serde(default)]
    pub message: String,
    pub deleted_drink_id: ObjectId,
    #[serde(default)]
    pub drink_deleted: Option<Drink>,
}

// =============================================================================
// Orders
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemPayload {
    pub item_id: ObjectId,
    pub item_type: ItemKind,
    pub quantity: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderPayload {
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub items: Vec<OrderItemPayload>,
    pub payment_method: PaymentMethod,
    pub sales_channel: SalesChannel,
    pub delivery_type: DeliveryType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

/// Partial order edit; only the fields that are set are sent.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditOrderPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<OrderItemPayload>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sales_channel: Option<SalesChannel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_type: Option<DeliveryType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
}

impl EditOrderPayload {
    pub fn status(status: OrderStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct OrderResponse {
    #[serde(default)]
    pub message: String,
    pub order: Order,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct OrdersResponse {
    #[serde(default)]
    pub message: String,
    pub orders: Vec<Order>,
}
