//! Mock REST backend for console integration testing
//!
//! Serves the endpoints the console calls under `/api`, keeps every document
//! in memory, and checks the bearer token on everything but login/register.

#![allow(dead_code)]

use axum::{
    extract::{Path, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    routing::{get, patch, post},
    Json, Router,
};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

type Reply = (StatusCode, Json<Value>);

/// Account known to the mock backend
#[derive(Debug, Clone)]
pub struct MockUser {
    pub id: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

/// One request as the backend saw it
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub bearer: Option<String>,
}

#[derive(Default)]
struct MockState {
    users: HashMap<String, MockUser>,
    tokens: HashMap<String, String>,
    business: Option<Value>,
    dishes: Vec<Value>,
    drinks: Vec<Value>,
    orders: Vec<Value>,
    /// Rejection message for the next dish creation
    reject_next_dish: Option<String>,
    /// Hand out tokens whose payload is not JSON
    issue_garbage_tokens: bool,
    /// Delay before the menu endpoint answers
    menu_delay: Option<Duration>,
    /// Status and message returned by the order list
    fail_orders: Option<(StatusCode, String)>,
    next_id: u32,
    requests: Vec<RecordedRequest>,
}

impl MockState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}{:04}", self.next_id)
    }

    fn record(&mut self, method: Method, uri: &Uri, headers: &HeaderMap) {
        self.requests.push(RecordedRequest {
            method,
            path: uri.path().to_string(),
            bearer: bearer(headers),
        });
    }

    fn authorize(&self, headers: &HeaderMap) -> Result<MockUser, Reply> {
        bearer(headers)
            .and_then(|token| self.tokens.get(&token))
            .and_then(|email| self.users.get(email))
            .cloned()
            .ok_or_else(|| reply(StatusCode::UNAUTHORIZED, json!({ "message": "Token inválido" })))
    }

    fn business_matches(&self, business_id: &str) -> Result<(), Reply> {
        match &self.business {
            Some(b) if b["_id"] == business_id => Ok(()),
            _ => Err(reply(
                StatusCode::NOT_FOUND,
                json!({ "message": "Negocio no encontrado" }),
            )),
        }
    }

    /// Business as `business/me` returns it: menu references are bare ids
    fn business_with_refs(&self) -> Option<Value> {
        let mut business = self.business.clone()?;
        business["dishes"] = self.dishes.iter().map(|d| d["_id"].clone()).collect();
        business["drinks"] = self.drinks.iter().map(|d| d["_id"].clone()).collect();
        Some(business)
    }

    fn business_populated(&self) -> Option<Value> {
        let mut business = self.business.clone()?;
        business["dishes"] = Value::Array(self.dishes.clone());
        business["drinks"] = Value::Array(self.drinks.clone());
        Some(business)
    }

    fn menu_price(&self, kind: &str, id: &str) -> Option<f64> {
        let items = if kind == "Dish" { &self.dishes } else { &self.drinks };
        items
            .iter()
            .find(|i| i["_id"] == id)
            .and_then(|i| i["price"].as_f64())
    }
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

fn reply(status: StatusCode, body: Value) -> Reply {
    (status, Json(body))
}

/// Build a JWT-shaped token carrying the identity claims
pub fn make_token(id: &str, email: &str, role: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let claims = json!({ "id": id, "email": email, "role": role, "iat": 1717000000 });
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.mock-signature")
}

/// Mock REST backend
pub struct MockBackend {
    addr: SocketAddr,
    state: Arc<RwLock<MockState>>,
    handle: JoinHandle<()>,
}

impl MockBackend {
    /// Start the mock backend on a random port
    pub async fn start() -> Self {
        let state = Arc::new(RwLock::new(MockState::default()));

        let app = Router::new()
            .route("/api/login", post(login))
            .route("/api/register", post(register))
            .route("/api/business/me", get(my_business))
            .route("/api/business/create", post(create_business))
            .route("/api/business/{business_id}/schedule", patch(update_schedule))
            .route("/api/{business_id}/menu", get(menu))
            .route("/api/business/{business_id}/dishes", post(create_dish))
            .route(
                "/api/business/{business_id}/dishes/{dish_id}",
                patch(update_dish).delete(delete_dish),
            )
            .route("/api/business/{business_id}/drinks", post(create_drink))
            .route(
                "/api/business/{business_id}/drinks/{drink_id}",
                patch(update_drink).delete(delete_drink),
            )
            .route(
                "/api/business/{business_id}/orders",
                get(list_orders).post(create_order),
            )
            .route(
                "/api/business/{business_id}/orders/{order_id}",
                patch(update_order),
            )
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// API root to hand to the console
    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Register an account that can log in
    pub async fn add_user(&self, id: &str, email: &str, password: &str, role: &str) {
        let mut state = self.state.write().await;
        state.users.insert(
            email.to_string(),
            MockUser {
                id: id.to_string(),
                email: email.to_string(),
                password: password.to_string(),
                role: role.to_string(),
            },
        );
    }

    /// Accept `token` as the session of the user with `email`
    pub async fn accept_token(&self, token: &str, email: &str) {
        let mut state = self.state.write().await;
        state.tokens.insert(token.to_string(), email.to_string());
    }

    /// Seed a business owned by `owner` with an empty menu
    pub async fn seed_business(&self, business_id: &str, owner: &str, name: &str) {
        let mut state = self.state.write().await;
        state.business = Some(json!({
            "_id": business_id,
            "name": name,
            "description": "Cocina casera",
            "address": "Calle 10 #5-20",
            "phone": "3001234567",
            "owner": owner,
            "schedule": [],
            "dishes": [],
            "drinks": [],
        }));
    }

    pub async fn seed_dish(&self, id: &str, name: &str, price: f64) {
        let mut state = self.state.write().await;
        let business = state.business.as_ref().map(|b| b["_id"].clone());
        state.dishes.push(json!({
            "_id": id,
            "name": name,
            "description": "",
            "price": price,
            "category": "Plato Fuerte",
            "business": business,
        }));
    }

    pub async fn seed_drink(&self, id: &str, name: &str, price: f64) {
        let mut state = self.state.write().await;
        let business = state.business.as_ref().map(|b| b["_id"].clone());
        state.drinks.push(json!({
            "_id": id,
            "name": name,
            "description": "",
            "price": price,
            "category": "Jugo Natural",
            "size": "400ml",
            "business": business,
        }));
    }

    /// Make the next dish creation fail with a 400 and this message
    pub async fn reject_next_dish(&self, message: &str) {
        self.state.write().await.reject_next_dish = Some(message.to_string());
    }

    /// Issue tokens whose payload segment does not decode
    pub async fn issue_garbage_tokens(&self) {
        self.state.write().await.issue_garbage_tokens = true;
    }

    /// Hold every menu response for `delay`
    pub async fn slow_menu(&self, delay: Duration) {
        self.state.write().await.menu_delay = Some(delay);
    }

    /// Make the order list fail with this status and message
    pub async fn fail_orders(&self, status: StatusCode, message: &str) {
        self.state.write().await.fail_orders = Some((status, message.to_string()));
    }

    pub async fn dish_count(&self) -> usize {
        self.state.read().await.dishes.len()
    }

    pub async fn schedule(&self) -> Option<Value> {
        self.state
            .read()
            .await
            .business
            .as_ref()
            .map(|b| b["schedule"].clone())
    }

    /// Requests received so far, oldest first
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.state.read().await.requests.clone()
    }

    /// Stop the mock backend
    pub async fn stop(self) {
        self.handle.abort();
    }
}

// =============================================================================
// Auth
// =============================================================================

async fn login(
    State(state): State<Arc<RwLock<MockState>>>,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    let mut state = state.write().await;
    state.record(Method::POST, &uri, &headers);

    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    let Some(user) = state
        .users
        .get(email)
        .filter(|u| u.password == password)
        .cloned()
    else {
        return reply(
            StatusCode::UNAUTHORIZED,
            json!({ "message": "Credenciales inválidas" }),
        );
    };

    let token = if state.issue_garbage_tokens {
        "header.bm90LWpzb24.signature".to_string()
    } else {
        make_token(&user.id, &user.email, &user.role)
    };
    state.tokens.insert(token.clone(), user.email.clone());
    reply(
        StatusCode::OK,
        json!({ "message": "Inicio de sesión exitoso", "token": token }),
    )
}

async fn register(
    State(state): State<Arc<RwLock<MockState>>>,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    let mut state = state.write().await;
    state.record(Method::POST, &uri, &headers);

    let email = body["email"].as_str().unwrap_or_default().to_string();
    if state.users.contains_key(&email) {
        return reply(
            StatusCode::BAD_REQUEST,
            json!({ "message": "El correo ya está registrado" }),
        );
    }

    let id = state.next_id("u");
    let user = MockUser {
        id: id.clone(),
        email: email.clone(),
        password: body["password"].as_str().unwrap_or_default().to_string(),
        role: "owner".to_string(),
    };
    state.users.insert(email.clone(), user);

    reply(
        StatusCode::CREATED,
        json!({
            "message": "Usuario registrado",
            "user": {
                "_id": id,
                "firstName": body["firstName"],
                "lastName": body["lastName"],
                "email": email,
                "role": "owner",
            }
        }),
    )
}

// =============================================================================
// Business
// =============================================================================

async fn my_business(
    State(state): State<Arc<RwLock<MockState>>>,
    uri: Uri,
    headers: HeaderMap,
) -> Reply {
    let mut state = state.write().await;
    state.record(Method::GET, &uri, &headers);
    if let Err(denied) = state.authorize(&headers) {
        return denied;
    }

    match state.business_with_refs() {
        Some(business) => reply(StatusCode::OK, business),
        None => reply(
            StatusCode::NOT_FOUND,
            json!({ "message": "No tienes un negocio registrado" }),
        ),
    }
}

async fn create_business(
    State(state): State<Arc<RwLock<MockState>>>,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    let mut state = state.write().await;
    state.record(Method::POST, &uri, &headers);
    let user = match state.authorize(&headers) {
        Ok(user) => user,
        Err(denied) => return denied,
    };

    let id = state.next_id("b");
    state.business = Some(json!({
        "_id": id,
        "name": body["name"],
        "description": body["description"],
        "address": body["address"],
        "phone": body["phone"],
        "owner": user.id,
        "schedule": [],
        "dishes": [],
        "drinks": [],
    }));
    reply(StatusCode::CREATED, json!({ "message": "Negocio creado" }))
}

async fn update_schedule(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(business_id): Path<String>,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    let mut state = state.write().await;
    state.record(Method::PATCH, &uri, &headers);
    if let Err(denied) = state
        .authorize(&headers)
        .and_then(|_| state.business_matches(&business_id))
    {
        return denied;
    }

    if let Some(business) = state.business.as_mut() {
        business["schedule"] = body;
    }
    let business = state.business_with_refs();
    reply(
        StatusCode::OK,
        json!({ "message": "Horario actualizado", "business": business }),
    )
}

async fn menu(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(business_id): Path<String>,
    uri: Uri,
    headers: HeaderMap,
) -> Reply {
    let delay = {
        let mut state = state.write().await;
        state.record(Method::GET, &uri, &headers);
        state.menu_delay
    };
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let state = state.read().await;
    if let Err(denied) = state.business_matches(&business_id) {
        return denied;
    }

    let menu = state.business_populated();
    reply(StatusCode::OK, json!({ "message": "Menú", "menu": menu }))
}

// =============================================================================
// Dishes & drinks
// =============================================================================

fn merge(target: &mut Value, patch: &Value) {
    if let (Some(target), Some(patch)) = (target.as_object_mut(), patch.as_object()) {
        for (key, value) in patch {
            target.insert(key.clone(), value.clone());
        }
    }
}

async fn create_dish(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(business_id): Path<String>,
    uri: Uri,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Reply {
    let mut state = state.write().await;
    state.record(Method::POST, &uri, &headers);
    if let Err(denied) = state
        .authorize(&headers)
        .and_then(|_| state.business_matches(&business_id))
    {
        return denied;
    }
    if let Some(message) = state.reject_next_dish.take() {
        return reply(StatusCode::BAD_REQUEST, json!({ "message": message }));
    }

    body["_id"] = json!(state.next_id("d"));
    body["business"] = json!(business_id);
    state.dishes.push(body.clone());
    reply(
        StatusCode::CREATED,
        json!({ "message": "Plato creado", "dish": body }),
    )
}

async fn update_dish(
    State(state): State<Arc<RwLock<MockState>>>,
    Path((business_id, dish_id)): Path<(String, String)>,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    let mut state = state.write().await;
    state.record(Method::PATCH, &uri, &headers);
    if let Err(denied) = state
        .authorize(&headers)
        .and_then(|_| state.business_matches(&business_id))
    {
        return denied;
    }

    match state.dishes.iter_mut().find(|d| d["_id"] == dish_id.as_str()) {
        Some(dish) => {
            merge(dish, &body);
            let dish = dish.clone();
            reply(
                StatusCode::OK,
                json!({ "message": "Plato actualizado", "dish": dish }),
            )
        }
        None => reply(
            StatusCode::NOT_FOUND,
            json!({ "message": "Plato no encontrado" }),
        ),
    }
}

async fn delete_dish(
    State(state): State<Arc<RwLock<MockState>>>,
    Path((business_id, dish_id)): Path<(String, String)>,
    uri: Uri,
    headers: HeaderMap,
) -> Reply {
    let mut state = state.write().await;
    state.record(Method::DELETE, &uri, &headers);
    if let Err(denied) = state
        .authorize(&headers)
        .and_then(|_| state.business_matches(&business_id))
    {
        return denied;
    }

    match state.dishes.iter().position(|d| d["_id"] == dish_id.as_str()) {
        Some(index) => {
            let dish = state.dishes.remove(index);
            reply(
                StatusCode::OK,
                json!({
                    "message": "Plato eliminado",
                    "deletedDishId": dish_id,
                    "dishDeleted": dish,
                }),
            )
        }
        None => reply(
            StatusCode::NOT_FOUND,
            json!({ "message": "Plato no encontrado" }),
        ),
    }
}

async fn create_drink(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(business_id): Path<String>,
    uri: Uri,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Reply {
    let mut state = state.write().await;
    state.record(Method::POST, &uri, &headers);
    if let Err(denied) = state
        .authorize(&headers)
        .and_then(|_| state.business_matches(&business_id))
    {
        return denied;
    }

    body["_id"] = json!(state.next_id("k"));
    body["business"] = json!(business_id);
    state.drinks.push(body.clone());
    reply(
        StatusCode::CREATED,
        json!({ "message": "Bebida creada", "drink": body }),
    )
}

async fn update_drink(
    State(state): State<Arc<RwLock<MockState>>>,
    Path((business_id, drink_id)): Path<(String, String)>,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    let mut state = state.write().await;
    state.record(Method::PATCH, &uri, &headers);
    if let Err(denied) = state
        .authorize(&headers)
        .and_then(|_| state.business_matches(&business_id))
    {
        return denied;
    }

    match state.drinks.iter_mut().find(|d| d["_id"] == drink_id.as_str()) {
        Some(drink) => {
            merge(drink, &body);
            let drink = drink.clone();
            reply(
                StatusCode::OK,
                json!({ "message": "Bebida actualizada", "drink": drink }),
            )
        }
        None => reply(
            StatusCode::NOT_FOUND,
            json!({ "message": "Bebida no encontrada" }),
        ),
    }
}

async fn delete_drink(
    State(state): State<Arc<RwLock<MockState>>>,
    Path((business_id, drink_id)): Path<(String, String)>,
    uri: Uri,
    headers: HeaderMap,
) -> Reply {
    let mut state = state.write().await;
    state.record(Method::DELETE, &uri, &headers);
    if let Err(denied) = state
        .authorize(&headers)
        .and_then(|_| state.business_matches(&business_id))
    {
        return denied;
    }

    match state.drinks.iter().position(|d| d["_id"] == drink_id.as_str()) {
        Some(index) => {
            let drink = state.drinks.remove(index);
            reply(
                StatusCode::OK,
                json!({
                    "message": "Bebida eliminada",
                    "deletedDrinkId": drink_id,
                    "drinkDeleted": drink,
                }),
            )
        }
        None => reply(
            StatusCode::NOT_FOUND,
            json!({ "message": "Bebida no encontrada" }),
        ),
    }
}

// =============================================================================
// Orders
// =============================================================================

async fn list_orders(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(business_id): Path<String>,
    uri: Uri,
    headers: HeaderMap,
) -> Reply {
    let mut state = state.write().await;
    state.record(Method::GET, &uri, &headers);
    if let Err(denied) = state
        .authorize(&headers)
        .and_then(|_| state.business_matches(&business_id))
    {
        return denied;
    }

    if let Some((status, message)) = &state.fail_orders {
        return reply(*status, json!({ "message": message }));
    }

    // Newest first
    let orders: Vec<Value> = state.orders.iter().rev().cloned().collect();
    reply(
        StatusCode::OK,
        json!({ "message": "Pedidos", "orders": orders }),
    )
}

async fn create_order(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(business_id): Path<String>,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    let mut state = state.write().await;
    state.record(Method::POST, &uri, &headers);
    if let Err(denied) = state
        .authorize(&headers)
        .and_then(|_| state.business_matches(&business_id))
    {
        return denied;
    }

    let mut items = Vec::new();
    let mut total = 0.0;
    for line in body["items"].as_array().cloned().unwrap_or_default() {
        let kind = line["itemType"].as_str().unwrap_or_default();
        let id = line["itemId"].as_str().unwrap_or_default();
        let quantity = line["quantity"].as_u64().unwrap_or(1);
        let Some(price) = state.menu_price(kind, id) else {
            return reply(
                StatusCode::BAD_REQUEST,
                json!({ "message": format!("Producto {id} no existe") }),
            );
        };
        total += price * quantity as f64;
        items.push(json!({
            "item": id,
            "onModel": kind,
            "quantity": quantity,
            "priceAtOrder": price,
        }));
    }

    let order = json!({
        "_id": state.next_id("o"),
        "business": business_id,
        "customerName": body["customerName"],
        "customerPhone": body["customerPhone"],
        "customerAddress": body["customerAddress"],
        "items": items,
        "totalAmount": total,
        "status": "pending",
        "paymentMethod": body["paymentMethod"],
        "salesChannel": body["salesChannel"],
        "deliveryType": body["deliveryType"],
    });
    state.orders.push(order.clone());
    reply(
        StatusCode::CREATED,
        json!({ "message": "Pedido creado", "order": order }),
    )
}

async fn update_order(
    State(state): State<Arc<RwLock<MockState>>>,
    Path((business_id, order_id)): Path<(String, String)>,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    let mut state = state.write().await;
    state.record(Method::PATCH, &uri, &headers);
    if let Err(denied) = state
        .authorize(&headers)
        .and_then(|_| state.business_matches(&business_id))
    {
        return denied;
    }

    match state.orders.iter_mut().find(|o| o["_id"] == order_id.as_str()) {
        Some(order) => {
            merge(order, &body);
            let order = order.clone();
            reply(
                StatusCode::OK,
                json!({ "message": "Pedido actualizado", "order": order }),
            )
        }
        None => reply(
            StatusCode::NOT_FOUND,
            json!({ "message": "Pedido no encontrado" }),
        ),
    }
}
