use crate::domain::model::{
    EntityId, FindQuery, MenuItem, NewMenuItem, NewRestaurant, Restaurant, User,
};
use crate::domain::ports::BackendClient;
use crate::utils::error::{AppError, Result};
use crate::utils::validation::{require_form_field, validate_price};
use std::collections::HashMap;
use std::sync::Arc;

pub const LOAD_RESTAURANTS_FAILED: &str = "Could not load restaurants.";
pub const LOAD_MENU_FAILED: &str = "Could not load menu items.";
pub const CREATE_RESTAURANT_FAILED: &str = "Could not create restaurant.";
pub const CREATE_MENU_ITEM_FAILED: &str = "Could not create menu item.";

/// 餐廳擁有者的儀表板資料。
///
/// 所有資料都是後端的暫存副本：`load` 每次都重新抓取完整狀態，
/// 失敗時保留原本的資料並留下提示訊息。
pub struct Dashboard<B: BackendClient> {
    backend: Arc<B>,
    owner: User,
    restaurants: Vec<Restaurant>,
    menu_items: HashMap<EntityId, Vec<MenuItem>>,
    selected: Option<EntityId>,
    notice: Option<String>,
}

impl<B: BackendClient> Dashboard<B> {
    pub fn new(backend: Arc<B>, owner: User) -> Self {
        Self {
            backend,
            owner,
            restaurants: Vec::new(),
            menu_items: HashMap::new(),
            selected: None,
            notice: None,
        }
    }

    /// 載入擁有者的餐廳，並選取第一間、載入其菜單
    pub async fn load(&mut self) -> Result<usize> {
        let query = FindQuery::new()
            .filter("owner", &self.owner.id)
            .include("owner");

        let page = match self.backend.find::<Restaurant>(&query).await {
            Ok(page) => page,
            Err(e) => return self.fail(LOAD_RESTAURANTS_FAILED, e),
        };

        self.restaurants = page.data;
        self.notice = None;
        tracing::info!(
            "🍽️ Loaded {} restaurant(s) for {}",
            self.restaurants.len(),
            self.owner.email
        );

        if let Some(first) = self.restaurants.first().map(|r| r.id.clone()) {
            self.selected = Some(first.clone());
            // 菜單載入失敗只影響右側區塊，不影響餐廳清單
            if let Err(e) = self.load_menu(&first).await {
                tracing::warn!("⚠️ Menu for restaurant {} unavailable: {}", first, e);
            }
        } else {
            self.selected = None;
        }

        Ok(self.restaurants.len())
    }

    pub async fn load_menu(&mut self, restaurant_id: &EntityId) -> Result<usize> {
        let query = FindQuery::new().filter("restaurant", restaurant_id);

        match self.backend.find::<MenuItem>(&query).await {
            Ok(page) => {
                let count = page.data.len();
                tracing::debug!("Loaded {} menu item(s) for restaurant {}", count, restaurant_id);
                self.menu_items.insert(restaurant_id.clone(), page.data);
                self.notice = None;
                Ok(count)
            }
            Err(e) => self.fail(LOAD_MENU_FAILED, e),
        }
    }

    /// 選取餐廳；菜單尚未快取時才向後端載入
    pub async fn select_restaurant(&mut self, restaurant_id: &EntityId) -> Result<()> {
        if !self.restaurants.iter().any(|r| &r.id == restaurant_id) {
            return Err(AppError::ValidationError {
                field: "restaurant".to_string(),
                message: format!("Unknown restaurant {}", restaurant_id),
            });
        }

        self.selected = Some(restaurant_id.clone());
        if !self.menu_items.contains_key(restaurant_id) {
            self.load_menu(restaurant_id).await?;
        }
        Ok(())
    }

    pub async fn create_restaurant(&mut self, form: NewRestaurant) -> Result<&Restaurant> {
        if let Err(e) = require_form_field("name", &form.name) {
            return self.fail(CREATE_RESTAURANT_FAILED, e);
        }

        let payload = NewRestaurant {
            owner_id: Some(self.owner.id.clone()),
            ..form
        };

        match self.backend.create::<Restaurant>(&payload).await {
            Ok(created) => {
                tracing::info!("✅ Created restaurant '{}' ({})", created.name, created.id);
                self.notice = None;
                self.restaurants.insert(0, created);
                Ok(&self.restaurants[0])
            }
            Err(e) => self.fail(CREATE_RESTAURANT_FAILED, e),
        }
    }

    /// 新增菜單項目到目前選取的餐廳
    pub async fn create_menu_item(&mut self, form: NewMenuItem) -> Result<&MenuItem> {
        let Some(restaurant_id) = self.selected.clone() else {
            return self.fail(
                CREATE_MENU_ITEM_FAILED,
                AppError::ValidationError {
                    field: "restaurant".to_string(),
                    message: "Select a restaurant first".to_string(),
                },
            );
        };

        if let Err(e) = require_form_field("name", &form.name)
            .and_then(|_| validate_price("price", form.price))
        {
            return self.fail(CREATE_MENU_ITEM_FAILED, e);
        }

        let payload = NewMenuItem {
            restaurant_id: Some(restaurant_id.clone()),
            ..form
        };

        match self.backend.create::<MenuItem>(&payload).await {
            Ok(created) => {
                tracing::info!(
                    "✅ Created menu item '{}' for restaurant {}",
                    created.name,
                    restaurant_id
                );
                self.notice = None;
                let menu = self.menu_items.entry(restaurant_id).or_default();
                menu.push(created);
                Ok(&menu[menu.len() - 1])
            }
            Err(e) => self.fail(CREATE_MENU_ITEM_FAILED, e),
        }
    }

    fn fail<T>(&mut self, notice: &str, error: AppError) -> Result<T> {
        tracing::error!(
            "❌ {} {} (Category: {:?}, Retryable: {})",
            notice,
            error,
            error.category(),
            error.is_retryable()
        );
        self.notice = Some(notice.to_string());
        Err(error)
    }

    pub fn owner(&self) -> &User {
        &self.owner
    }

    pub fn restaurants(&self) -> &[Restaurant] {
        &self.restaurants
    }

    pub fn selected_restaurant(&self) -> Option<&Restaurant> {
        let selected = self.selected.as_ref()?;
        self.restaurants.iter().find(|r| &r.id == selected)
    }

    pub fn menu_for(&self, restaurant_id: &EntityId) -> Option<&[MenuItem]> {
        self.menu_items.get(restaurant_id).map(Vec::as_slice)
    }

    pub fn selected_menu(&self) -> &[MenuItem] {
        self.selected
            .as_ref()
            .and_then(|id| self.menu_for(id))
            .unwrap_or(&[])
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }
}
