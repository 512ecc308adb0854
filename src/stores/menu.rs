use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::bus::{BusEvent, SharedBus};
use crate::models::{
    CreateDishPayload, CreateDrinkPayload, Dish, Drink, UpdateDishPayload, UpdateDrinkPayload,
};
use crate::services::{BusinessService, DishService, DrinkService};
use crate::stores::{replace_by_key, run_action, ErrorText, StoreStatus, Tracked};
use crate::Error;

const ADD_DISH_FAILED: &str = "Could not add the dish.";
const UPDATE_DISH_FAILED: &str = "Could not update the dish.";
const DELETE_DISH_FAILED: &str = "Could not delete the dish.";
const ADD_DRINK_FAILED: &str = "Could not add the drink.";
const UPDATE_DRINK_FAILED: &str = "Could not update the drink.";
const DELETE_DRINK_FAILED: &str = "Could not delete the drink.";
const FETCH_MENU_FAILED: &str = "Could not load the menu.";

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MenuState {
    pub dishes: Vec<Dish>,
    pub drinks: Vec<Drink>,
    pub status: StoreStatus,
}

impl MenuState {
    pub fn is_menu_empty(&self) -> bool {
        self.dishes.is_empty() && self.drinks.is_empty()
    }
}

impl Tracked for MenuState {
    fn status_mut(&mut self) -> &mut StoreStatus {
        &mut self.status
    }
}

/// Dishes and drinks of one business.
///
/// Every successful mutation publishes [`BusEvent::MenuUpdated`].
#[derive(Clone)]
pub struct MenuStore {
    state: Arc<RwLock<MenuState>>,
    businesses: BusinessService,
    dishes: DishService,
    drinks: DrinkService,
    bus: SharedBus,
}

impl MenuStore {
    pub fn new(
        businesses: BusinessService,
        dishes: DishService,
        drinks: DrinkService,
        bus: SharedBus,
    ) -> Self {
        Self {
            state: Arc::new(RwLock::new(MenuState::default())),
            businesses,
            dishes,
            drinks,
            bus,
        }
    }

    pub async fn snapshot(&self) -> MenuState {
        self.state.read().await.clone()
    }

    pub async fn dishes(&self) -> Vec<Dish> {
        self.state.read().await.dishes.clone()
    }

    pub async fn drinks(&self) -> Vec<Drink> {
        self.state.read().await.drinks.clone()
    }

    pub async fn is_menu_empty(&self) -> bool {
        self.state.read().await.is_menu_empty()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.status.is_loading
    }

    pub async fn error(&self) -> Option<String> {
        self.state.read().await.status.error.clone()
    }

    pub async fn reset(&self) {
        *self.state.write().await = MenuState::default();
    }

    /// Replace both lists wholesale
    pub async fn set_menu(&self, dishes: Vec<Dish>, drinks: Vec<Drink>) {
        let mut state = self.state.write().await;
        state.dishes = dishes;
        state.drinks = drinks;
    }

    fn announce(&self, business_id: &str) {
        self.bus.publish(BusEvent::MenuUpdated {
            business_id: business_id.to_string(),
        });
    }

    pub async fn fetch_menu(&self, business_id: &str) -> Result<(), Error> {
        let action = async { Ok::<_, Error>(self.businesses.get_menu(business_id).await?.menu) };
        run_action(
            &self.state,
            ErrorText::Fixed(FETCH_MENU_FAILED),
            action,
            |state, menu| {
                debug!(
                    dishes = menu.dishes.len(),
                    drinks = menu.drinks.len(),
                    "Menu loaded"
                );
                state.dishes = menu.dishes;
                state.drinks = menu.drinks;
            },
        )
        .await
    }

    // =========================================================================
    // Dishes
    // =========================================================================

    pub async fn add_dish(&self, business_id: &str, payload: &CreateDishPayload) -> Result<Dish, Error> {
        let action = async { Ok::<_, Error>(self.dishes.create(business_id, payload).await?.dish) };
        let dish = run_action(
            &self.state,
            ErrorText::PreferServer(ADD_DISH_FAILED),
            action,
            |state, dish: Dish| {
                state.dishes.push(dish.clone());
                dish
            },
        )
        .await?;

        self.announce(business_id);
        Ok(dish)
    }

    pub async fn update_dish(
        &self,
        business_id: &str,
        dish_id: &str,
        payload: &UpdateDishPayload,
    ) -> Result<Dish, Error> {
        let action = async {
            Ok::<_, Error>(self.dishes.update(business_id, dish_id, payload).await?.dish)
        };
        let dish = run_action(
            &self.state,
            ErrorText::PreferServer(UPDATE_DISH_FAILED),
            action,
            |state, dish: Dish| {
                replace_by_key(&mut state.dishes, dish.clone(), |d| d.id.as_str());
                dish
            },
        )
        .await?;

        self.announce(business_id);
        Ok(dish)
    }

    pub async fn delete_dish(&self, business_id: &str, dish_id: &str) -> Result<(), Error> {
        let action = async { Ok::<_, Error>(self.dishes.remove(business_id, dish_id).await?) };
        run_action(
            &self.state,
            ErrorText::Fixed(DELETE_DISH_FAILED),
            action,
            |state, _| state.dishes.retain(|d| d.id != dish_id),
        )
        .await?;

        self.announce(business_id);
        Ok(())
    }

    // =========================================================================
    // Drinks
    // =========================================================================

    pub async fn add_drink(&self, business_id: &str, payload: &CreateDrinkPayload) -> Result<Drink, Error> {
        let action = async { Ok::<_, Error>(self.drinks.create(business_id, payload).await?.drink) };
        let drink = run_action(
            &self.state,
            ErrorText::PreferServer(ADD_DRINK_FAILED),
            action,
            |state, drink: Drink| {
                state.drinks.push(drink.clone());
                drink
            },
        )
        .await?;

        self.announce(business_id);
        Ok(drink)
    }

    pub async fn update_drink(
        &self,
        business_id: &str,
        drink_id: &str,
        payload: &UpdateDrinkPayload,
    ) -> Result<Drink, Error> {
        let action = async {
            Ok::<_, Error>(self.drinks.update(business_id, drink_id, payload).await?.drink)
        };
        let drink = run_action(
            &self.state,
            ErrorText::PreferServer(UPDATE_DRINK_FAILED),
            action,
            |state, drink: Drink| {
                replace_by_key(&mut state.drinks, drink.clone(), |d| d.id.as_str());
                drink
            },
        )
        .await?;

        self.announce(business_id);
        Ok(drink)
    }

    pub async fn delete_drink(&self, business_id: &str, drink_id: &str) -> Result<(), Error> {
        let action = async { Ok::<_, Error>(self.drinks.remove(business_id, drink_id).await?) };
        run_action(
            &self.state,
            ErrorText::Fixed(DELETE_DRINK_FAILED),
            action,
            |state, _| state.drinks.retain(|d| d.id != drink_id),
        )
        .await?;

        self.announce(business_id);
        Ok(())
    }
}
