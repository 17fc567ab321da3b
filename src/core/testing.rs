use crate::domain::model::{Credentials, FindQuery, Paginated, User};
use crate::domain::ports::{BackendClient, Entity};
use crate::utils::error::{AppError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

/// 測試用的記憶體後端
pub(crate) struct InMemoryBackend {
    accounts: Vec<(Credentials, User)>,
    current: Mutex<Option<User>>,
    collections: Mutex<HashMap<&'static str, Vec<serde_json::Value>>>,
    next_id: AtomicU64,
    pub(crate) fail_reads: AtomicBool,
    pub(crate) fail_writes: AtomicBool,
    pub(crate) fail_logout: AtomicBool,
    calls: Mutex<Vec<String>>,
}

impl InMemoryBackend {
    pub(crate) fn new() -> Self {
        Self {
            accounts: Vec::new(),
            current: Mutex::new(None),
            collections: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(100),
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            fail_logout: AtomicBool::new(false),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_account(mut self, email: &str, password: &str, user: User) -> Self {
        self.accounts.push((Credentials::new(email, password), user));
        self
    }

    /// 模擬已登入的狀態
    pub(crate) fn signed_in_as(self, user: User) -> Self {
        *self.current.lock().unwrap() = Some(user);
        self
    }

    pub(crate) fn seed<E: Entity>(&self, record: serde_json::Value) {
        self.collections
            .lock()
            .unwrap()
            .entry(E::SLUG)
            .or_default()
            .push(record);
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record_call(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

fn field_as_string(record: &serde_json::Value, field: &str) -> Option<String> {
    let value = record
        .get(field)
        .or_else(|| record.get(format!("{}Id", field)))?;
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Object(obj) => obj.get("id").map(|id| id.to_string()),
        other => Some(other.to_string()),
    }
}

fn unavailable() -> AppError {
    AppError::BackendError {
        status: 503,
        message: "Service Unavailable".to_string(),
    }
}

#[async_trait]
impl BackendClient for InMemoryBackend {
    async fn login(&self, credentials: &Credentials) -> Result<()> {
        self.record_call(format!("login:{}", credentials.email));
        let user = self
            .accounts
            .iter()
            .find(|(known, _)| known == credentials)
            .map(|(_, user)| user.clone())
            .ok_or_else(|| AppError::AuthenticationError {
                message: "Invalid credentials".to_string(),
            })?;
        *self.current.lock().unwrap() = Some(user);
        Ok(())
    }

    async fn logout(&self) -> Result<()> {
        self.record_call("logout".to_string());
        if self.fail_logout.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        *self.current.lock().unwrap() = None;
        Ok(())
    }

    async fn me(&self) -> Result<User> {
        self.record_call("me".to_string());
        self.current
            .lock()
            .unwrap()
            .clone()
            .ok_or(AppError::NotAuthenticated)
    }

    async fn find<E: Entity>(&self, query: &FindQuery) -> Result<Paginated<E>> {
        self.record_call(format!("find:{}", E::SLUG));
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(unavailable());
        }

        let filters: Vec<(String, String)> = query
            .to_query_pairs()
            .into_iter()
            .filter_map(|(key, value)| key.strip_suffix("_eq").map(|f| (f.to_string(), value)))
            .collect();

        let records: Vec<serde_json::Value> = self
            .collections
            .lock()
            .unwrap()
            .get(E::SLUG)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|record| {
                filters
                    .iter()
                    .all(|(field, value)| field_as_string(record, field).as_deref() == Some(value))
            })
            .collect();

        let data = records
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<E>, _>>()?;

        Ok(Paginated {
            total: Some(data.len() as u64),
            data,
            current_page: Some(1),
            last_page: Some(1),
            from: None,
            to: None,
            per_page: None,
        })
    }

    async fn create<E: Entity>(&self, payload: &E::Payload) -> Result<E> {
        self.record_call(format!("create:{}", E::SLUG));
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(unavailable());
        }

        let mut record = serde_json::to_value(payload)?;
        if let serde_json::Value::Object(obj) = &mut record {
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            obj.insert("id".to_string(), serde_json::Value::from(id));
        }
        self.seed::<E>(record.clone());

        Ok(serde_json::from_value(record)?)
    }
}
