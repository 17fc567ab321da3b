use crate::domain::ports::Entity;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Connectivity probe
// ---------------------------------------------------------------------------

/// 單次探測失敗的原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptFailure {
    Timeout,
    Network(String),
    HttpStatus(u16),
    Unhealthy(String),
    InvalidBody(String),
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptFailure::Timeout => write!(f, "health check timed out"),
            AttemptFailure::Network(msg) => write!(f, "network error: {}", msg),
            AttemptFailure::HttpStatus(code) => write!(f, "health check returned HTTP {}", code),
            AttemptFailure::Unhealthy(status) => {
                write!(f, "backend reported status '{}'", status)
            }
            AttemptFailure::InvalidBody(msg) => write!(f, "invalid health response: {}", msg),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    Failure(AttemptFailure),
}

impl AttemptOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, AttemptOutcome::Success)
    }
}

/// 探測過程中的單次嘗試紀錄（不持久化）
#[derive(Debug, Clone)]
pub struct ProbeAttempt {
    pub index: u32,
    pub timestamp: DateTime<Utc>,
    pub outcome: AttemptOutcome,
    pub latency: Duration,
}

/// 一次探測的最終結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeResult {
    pub success: bool,
    pub attempts: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProbeResult {
    pub fn succeeded(attempts: u32) -> Self {
        Self {
            success: true,
            attempts,
            error: None,
        }
    }

    pub fn exhausted(attempts: u32, last_error: Option<String>) -> Self {
        Self {
            success: false,
            attempts,
            error: last_error,
        }
    }
}

// ---------------------------------------------------------------------------
// Health endpoint
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendLink {
    Connected,
    Disconnected,
}

/// 記憶體用量，單位為 bytes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryUsage {
    pub rss: u64,
    #[serde(rename = "virtual")]
    pub virtual_memory: u64,
    pub system_total: u64,
    pub system_used: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformInfo {
    pub node: String,
    pub arch: String,
    pub platform: String,
}

impl PlatformInfo {
    pub fn current() -> Self {
        Self {
            node: format!("rust/{}", env!("CARGO_PKG_VERSION")),
            arch: std::env::consts::ARCH.to_string(),
            platform: std::env::consts::OS.to_string(),
        }
    }
}

/// `/health` 的回應內容
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: HealthStatus,
    pub timestamp: String,
    pub app_id: String,
    pub manifest: BackendLink,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uptime: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<MemoryUsage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<PlatformInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthReport {
    pub fn ok(
        timestamp: DateTime<Utc>,
        app_id: String,
        version: String,
        environment: String,
        uptime: Duration,
        memory: MemoryUsage,
    ) -> Self {
        Self {
            status: HealthStatus::Ok,
            timestamp: iso_timestamp(timestamp),
            app_id,
            manifest: BackendLink::Connected,
            version: Some(version),
            environment: Some(environment),
            uptime: Some(uptime.as_secs_f64()),
            memory: Some(memory),
            platform: Some(PlatformInfo::current()),
            error: None,
        }
    }

    pub fn error(timestamp: DateTime<Utc>, app_id: String, error: String) -> Self {
        // error 欄位不可為空
        let error = if error.trim().is_empty() {
            "unknown error".to_string()
        } else {
            error
        };

        Self {
            status: HealthStatus::Error,
            timestamp: iso_timestamp(timestamp),
            app_id,
            manifest: BackendLink::Disconnected,
            version: None,
            environment: None,
            uptime: None,
            memory: None,
            platform: None,
            error: Some(error),
        }
    }
}

/// ISO-8601，UTC，毫秒精度，以 `Z` 結尾
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

// ---------------------------------------------------------------------------
// Backend entities
// ---------------------------------------------------------------------------

/// 後端產生的識別碼，可能是數字或字串
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Number(u64),
    Text(String),
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Number(n) => write!(f, "{}", n),
            EntityId::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for EntityId {
    fn from(value: u64) -> Self {
        EntityId::Number(value)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        EntityId::Text(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: EntityId,
    #[serde(default)]
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub owner: Option<User>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MenuCategory {
    Appetizer,
    #[default]
    Main,
    Dessert,
    Beverage,
}

impl fmt::Display for MenuCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MenuCategory::Appetizer => "Appetizer",
            MenuCategory::Main => "Main",
            MenuCategory::Dessert => "Dessert",
            MenuCategory::Beverage => "Beverage",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub category: MenuCategory,
    #[serde(default)]
    pub restaurant: Option<Restaurant>,
}

/// 新增餐廳表單
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewRestaurant {
    pub name: String,
    pub description: String,
    pub address: String,
    #[serde(rename = "ownerId", skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<EntityId>,
}

/// 新增菜單項目表單
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewMenuItem {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: MenuCategory,
    #[serde(rename = "restaurantId", skip_serializing_if = "Option::is_none")]
    pub restaurant_id: Option<EntityId>,
}

impl Entity for User {
    const NAME: &'static str = "User";
    const SLUG: &'static str = "users";
    type Payload = serde_json::Value;
}

impl Entity for Restaurant {
    const NAME: &'static str = "Restaurant";
    const SLUG: &'static str = "restaurants";
    type Payload = NewRestaurant;
}

impl Entity for MenuItem {
    const NAME: &'static str = "MenuItem";
    const SLUG: &'static str = "menu-items";
    type Payload = NewMenuItem;
}

/// 分頁查詢結果
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub current_page: Option<u64>,
    #[serde(default)]
    pub last_page: Option<u64>,
    #[serde(default)]
    pub from: Option<u64>,
    #[serde(default)]
    pub to: Option<u64>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub per_page: Option<u64>,
}

/// 集合查詢條件：等值過濾與關聯載入
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindQuery {
    filters: Vec<(String, String)>,
    include: Vec<String>,
}

impl FindQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, field: &str, value: impl fmt::Display) -> Self {
        self.filters.push((field.to_string(), value.to_string()));
        self
    }

    pub fn include(mut self, relation: &str) -> Self {
        self.include.push(relation.to_string());
        self
    }

    /// 轉成查詢參數，例如 `owner_eq=1&relations=owner`
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = self
            .filters
            .iter()
            .map(|(field, value)| (format!("{}_eq", field), value.clone()))
            .collect();

        if !self.include.is_empty() {
            pairs.push(("relations".to_string(), self.include.join(",")));
        }

        pairs
    }
}

#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_iso_timestamp_format() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        assert_eq!(iso_timestamp(at), "2024-05-01T12:30:00.000Z");
    }

    #[test]
    fn test_health_report_ok_serialization() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let report = HealthReport::ok(
            at,
            "web-1".to_string(),
            "1.2.3".to_string(),
            "production".to_string(),
            Duration::from_millis(1500),
            MemoryUsage {
                rss: 1024,
                virtual_memory: 2048,
                system_total: 8192,
                system_used: 4096,
            },
        );

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["appId"], "web-1");
        assert_eq!(json["manifest"], "connected");
        assert_eq!(json["uptime"], 1.5);
        assert_eq!(json["memory"]["virtual"], 2048);
        assert_eq!(json["memory"]["systemTotal"], 8192);
        assert!(json["platform"]["node"].as_str().unwrap().starts_with("rust/"));
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_health_report_error_never_has_empty_message() {
        let report = HealthReport::error(Utc::now(), "Unknown".to_string(), "  ".to_string());
        assert_eq!(report.status, HealthStatus::Error);
        assert_eq!(report.manifest, BackendLink::Disconnected);
        assert_eq!(report.error.as_deref(), Some("unknown error"));
    }

    #[test]
    fn test_entity_id_accepts_numbers_and_strings() {
        let numeric: EntityId = serde_json::from_str("42").unwrap();
        let text: EntityId = serde_json::from_str("\"a1b2\"").unwrap();
        assert_eq!(numeric, EntityId::Number(42));
        assert_eq!(text.to_string(), "a1b2");
    }

    #[test]
    fn test_menu_item_defaults() {
        let item: MenuItem =
            serde_json::from_value(serde_json::json!({"id": 7, "name": "Soup", "price": 4.5}))
                .unwrap();
        assert_eq!(item.category, MenuCategory::Main);
        assert!(item.description.is_none());
        assert!(item.restaurant.is_none());
    }

    #[test]
    fn test_new_menu_item_payload_uses_relation_key() {
        let payload = NewMenuItem {
            name: "Tiramisu".to_string(),
            description: String::new(),
            price: 6.0,
            category: MenuCategory::Dessert,
            restaurant_id: Some(EntityId::Number(3)),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["restaurantId"], 3);
        assert_eq!(json["category"], "Dessert");
    }

    #[test]
    fn test_find_query_pairs() {
        let query = FindQuery::new().filter("owner", 5).include("owner");
        assert_eq!(
            query.to_query_pairs(),
            vec![
                ("owner_eq".to_string(), "5".to_string()),
                ("relations".to_string(), "owner".to_string()),
            ]
        );
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let creds = Credentials::new("owner@foodieapp.com", "password123");
        let printed = format!("{:?}", creds);
        assert!(printed.contains("owner@foodieapp.com"));
        assert!(!printed.contains("password123"));
    }
}
