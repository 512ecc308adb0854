//! Domain records mirroring the backend documents.
//!
//! Field names follow the backend's camelCase JSON; identifiers travel as `_id`.
//! Enum variants carry the exact wire strings the backend stores.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

pub mod payloads;

pub use payloads::*;

/// Backend document identifier (a Mongo ObjectId rendered as hex).
pub type ObjectId = String;

// =============================================================================
// Users
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Client,
    Owner,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Minimal identity read from the session token's claims.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: ObjectId,
    pub email: String,
    pub role: Role,
}

// =============================================================================
// Business & schedule
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Weekday {
    #[serde(rename = "Lunes")]
    Monday,
    #[serde(rename = "Martes")]
    Tuesday,
    #[serde(rename = "Miércoles")]
    Wednesday,
    #[serde(rename = "Jueves")]
    Thursday,
    #[serde(rename = "Viernes")]
    Friday,
    #[serde(rename = "Sábado")]
    Saturday,
    #[serde(rename = "Domingo")]
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessHours {
    pub day: Weekday,
    /// Opening time as `HH:MM`
    pub open: String,
    /// Closing time as `HH:MM`
    pub close: String,
    pub is_open: bool,
}

impl BusinessHours {
    pub fn closed(day: Weekday) -> Self {
        Self {
            day,
            open: "09:00".to_string(),
            close: "17:00".to_string(),
            is_open: false,
        }
    }
}

/// A full week with every day closed, the starting point of the schedule editor.
pub fn default_week() -> Vec<BusinessHours> {
    Weekday::ALL.into_iter().map(BusinessHours::closed).collect()
}

/// Reject schedules that list the same weekday twice.
pub fn validate_schedule(schedule: &[BusinessHours]) -> Result<(), Weekday> {
    let mut seen = std::collections::BTreeSet::new();
    for entry in schedule {
        if !seen.insert(entry.day) {
            return Err(entry.day);
        }
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Business {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub description: String,
    pub address: String,
    pub phone: String,
    pub owner: ObjectId,
    #[serde(default)]
    pub schedule: Vec<BusinessHours>,
    /// Empty unless the backend populated the references
    #[serde(default, deserialize_with = "populated_only")]
    pub dishes: Vec<Dish>,
    #[serde(default, deserialize_with = "populated_only")]
    pub drinks: Vec<Drink>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// `business/me` returns menu references as bare ids; only `:id/menu`
/// populates them. Keep the populated documents and skip the ids.
fn populated_only<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Vec::<serde_json::Value>::deserialize(deserializer)?
        .into_iter()
        .filter(serde_json::Value::is_object)
        .map(|v| serde_json::from_value(v).map_err(serde::de::Error::custom))
        .collect()
}

// =============================================================================
// Menu
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DishCategory {
    #[serde(rename = "Entrante")]
    Starter,
    #[serde(rename = "Plato Fuerte")]
    MainCourse,
    #[serde(rename = "Postre")]
    Dessert,
    #[serde(rename = "Sopa")]
    Soup,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrinkCategory {
    #[serde(rename = "Gaseosa")]
    Soda,
    #[serde(rename = "Jugo Natural")]
    NaturalJuice,
    #[serde(rename = "Bebida Energética")]
    EnergyDrink,
    #[serde(rename = "Licor")]
    Liquor,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dish {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: DishCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub business: ObjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Drink {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: DrinkCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub business: ObjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Orders
// =============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Preparing,
    Delivered,
    Cancelled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "Efectivo")]
    Cash,
    #[serde(rename = "Transferencia")]
    Transfer,
    #[serde(rename = "Tarjeta")]
    Card,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SalesChannel {
    WhatsApp,
    Instagram,
    #[serde(rename = "Presencial")]
    InPerson,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryType {
    Pickup,
    Delivery,
}

/// Which menu collection an order line points into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    Dish,
    Drink,
}

/// An order line's menu entry: populated by the backend, or just its id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OrderedItem {
    Id(ObjectId),
    Populated(OrderedEntry),
}

impl OrderedItem {
    pub fn id(&self) -> &str {
        match self {
            OrderedItem::Id(id) => id,
            OrderedItem::Populated(entry) => &entry.id,
        }
    }
}

/// The fields dishes and drinks share; category and size are not needed on an order line.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderedEntry {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub item: OrderedItem,
    pub on_model: ItemKind,
    pub quantity: u32,
    /// Price frozen when the order was placed
    pub price_at_order: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub business: ObjectId,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub items: Vec<OrderItem>,
    pub total_amount: f64,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub sales_channel: SalesChannel,
    pub delivery_type: DeliveryType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Sum of frozen line prices; should agree with `total_amount`.
    pub fn computed_total(&self) -> f64 {
        self.items
            .iter()
            .map(|line| line.price_at_order * f64::from(line.quantity))
            .sum()
    }
}
