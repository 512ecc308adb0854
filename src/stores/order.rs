use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::bus::{BusEvent, SharedBus};
use crate::models::{CreateOrderPayload, EditOrderPayload, Order, OrderStatus};
use crate::services::OrderService;
use crate::stores::{replace_by_key, run_action, ErrorText, StoreStatus, Tracked};
use crate::Error;

const FETCH_FAILED: &str = "Could not load the orders.";
const CREATE_FAILED: &str = "Could not create the order.";
const UPDATE_FAILED: &str = "Could not update the order.";

#[derive(Clone, Debug, Default, PartialEq)]
pub struct OrderState {
    /// Newest first
    pub orders: Vec<Order>,
    pub status: StoreStatus,
}

impl OrderState {
    pub fn orders_with_status(&self, status: OrderStatus) -> Vec<&Order> {
        self.orders.iter().filter(|o| o.status == status).collect()
    }

    pub fn pending_count(&self) -> usize {
        self.orders
            .iter()
            .filter(|o| o.status == OrderStatus::Pending)
            .count()
    }
}

impl Tracked for OrderState {
    fn status_mut(&mut self) -> &mut StoreStatus {
        &mut self.status
    }
}

#[derive(Clone)]
pub struct OrderStore {
    state: Arc<RwLock<OrderState>>,
    service: OrderService,
    bus: SharedBus,
}

impl OrderStore {
    pub fn new(service: OrderService, bus: SharedBus) -> Self {
        Self {
            state: Arc::new(RwLock::new(OrderState::default())),
            service,
            bus,
        }
    }

    pub async fn snapshot(&self) -> OrderState {
        self.state.read().await.clone()
    }

    pub async fn orders(&self) -> Vec<Order> {
        self.state.read().await.orders.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.status.is_loading
    }

    pub async fn error(&self) -> Option<String> {
        self.state.read().await.status.error.clone()
    }

    pub async fn reset(&self) {
        *self.state.write().await = OrderState::default();
    }

    /// Replace the local list with the server's
    pub async fn fetch_orders(&self, business_id: &str) -> Result<(), Error> {
        let action = async { Ok::<_, Error>(self.service.get_all(business_id).await?.orders) };
        run_action(
            &self.state,
            ErrorText::PreferServer(FETCH_FAILED),
            action,
            |state, orders: Vec<Order>| state.orders = orders,
        )
        .await
    }

    /// Create an order; it is placed at the front of the list.
    pub async fn create_order(
        &self,
        business_id: &str,
        payload: &CreateOrderPayload,
    ) -> Result<Order, Error> {
        let action = async { Ok::<_, Error>(self.service.create(business_id, payload).await?.order) };
        let order = run_action(
            &self.state,
            ErrorText::PreferServer(CREATE_FAILED),
            action,
            |state, order: Order| {
                state.orders.insert(0, order.clone());
                order
            },
        )
        .await?;

        info!(order_id = %order.id, total = order.total_amount, "Order created");
        self.bus.publish(BusEvent::OrderCreated {
            order_id: order.id.clone(),
        });
        Ok(order)
    }

    /// Move an order to any status; transitions are not restricted.
    pub async fn update_order_status(
        &self,
        business_id: &str,
        order_id: &str,
        status: OrderStatus,
    ) -> Result<Order, Error> {
        self.edit_order(business_id, order_id, &EditOrderPayload::status(status))
            .await
    }

    /// Partially update an order and patch it in place by id.
    pub async fn edit_order(
        &self,
        business_id: &str,
        order_id: &str,
        payload: &EditOrderPayload,
    ) -> Result<Order, Error> {
        let action = async {
            Ok::<_, Error>(self.service.update(business_id, order_id, payload).await?.order)
        };
        let result = run_action(
            &self.state,
            ErrorText::PreferServer(UPDATE_FAILED),
            action,
            |state, order: Order| {
                replace_by_key(&mut state.orders, order.clone(), |o| o.id.as_str());
                order
            },
        )
        .await;

        match result {
            Ok(order) => {
                self.bus.publish(BusEvent::OrderUpdated {
                    order_id: order.id.clone(),
                });
                Ok(order)
            }
            Err(e) => {
                warn!(order_id, "Failed to update order: {}", e);
                Err(e)
            }
        }
    }
}
