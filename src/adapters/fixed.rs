//! In-memory collaborators: fixed answers loaded from config or local JSON files.

use crate::domain::model::{CheckoutLinkTable, EntitlementRecord};
use crate::domain::ports::{CheckoutLinkSource, EntitlementSource, Placeholders, SessionStatus};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::Path;

fn read_json_file<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    let content = std::fs::read_to_string(&path)?;
    let value = serde_json::from_str(&content)?;
    tracing::debug!("Loaded JSON fixture from {}", path.as_ref().display());
    Ok(value)
}

/// 以設定檔中的字典取代 placeholder
#[derive(Debug, Clone, Default)]
pub struct StaticPlaceholders {
    values: HashMap<String, String>,
}

impl StaticPlaceholders {
    pub fn new(values: HashMap<String, String>) -> Self {
        Self { values }
    }
}

#[async_trait]
impl Placeholders for StaticPlaceholders {
    async fn replace_key(&self, key: &str) -> String {
        match self.values.get(key) {
            Some(value) => value.clone(),
            None => key.replace('-', " "),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StaticSession(pub bool);

#[async_trait]
impl SessionStatus for StaticSession {
    async fn is_signed_in(&self) -> Result<bool> {
        Ok(self.0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct StaticEntitlements {
    records: Option<Vec<EntitlementRecord>>,
}

impl StaticEntitlements {
    pub fn new(records: Option<Vec<EntitlementRecord>>) -> Self {
        Self { records }
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(Some(read_json_file(path)?)))
    }
}

#[async_trait]
impl EntitlementSource for StaticEntitlements {
    async fn fetch_entitlements(&self) -> Result<Option<Vec<EntitlementRecord>>> {
        Ok(self.records.clone())
    }
}

#[derive(Debug, Clone, Default)]
pub struct StaticCheckoutLinks {
    table: CheckoutLinkTable,
}

impl StaticCheckoutLinks {
    pub fn new(table: CheckoutLinkTable) -> Self {
        Self { table }
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(read_json_file(path)?))
    }
}

#[async_trait]
impl CheckoutLinkSource for StaticCheckoutLinks {
    async fn fetch_checkout_links(&self) -> Result<CheckoutLinkTable> {
        Ok(self.table.clone())
    }
}
