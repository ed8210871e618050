use crate::domain::model::{CheckoutLinkTable, EntitlementRecord};
use crate::domain::ports::{CheckoutLinkSource, EntitlementSource};
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

pub fn build_http_client(timeout_seconds: u64) -> Result<Client> {
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .build()?;
    Ok(client)
}

/// Fetches the checkout-link mapping table from a JSON endpoint.
#[derive(Debug, Clone)]
pub struct HttpCheckoutLinkSource {
    client: Client,
    url: String,
}

impl HttpCheckoutLinkSource {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl CheckoutLinkSource for HttpCheckoutLinkSource {
    async fn fetch_checkout_links(&self) -> Result<CheckoutLinkTable> {
        tracing::debug!("Making checkout link request to: {}", self.url);
        let response = self.client.get(&self.url).send().await?;
        tracing::debug!("Checkout link response status: {}", response.status());

        let table = response.error_for_status()?.json::<CheckoutLinkTable>().await?;
        Ok(table)
    }
}

/// 取得已登入使用者的 entitlements (含 product arrangement family)
#[derive(Debug, Clone)]
pub struct HttpEntitlementSource {
    client: Client,
    endpoint: String,
    access_token: Option<String>,
}

impl HttpEntitlementSource {
    pub fn new(client: Client, endpoint: impl Into<String>, access_token: Option<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            access_token,
        }
    }
}

#[async_trait]
impl EntitlementSource for HttpEntitlementSource {
    async fn fetch_entitlements(&self) -> Result<Option<Vec<EntitlementRecord>>> {
        let mut request = self
            .client
            .get(&self.endpoint)
            .query(&[("include", "OFFER.PRODUCT_ARRANGEMENT"), ("format", "raw")]);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        tracing::debug!("Making entitlement request to: {}", self.endpoint);
        let response = request.send().await?;
        if !response.status().is_success() {
            tracing::warn!("Entitlement request returned {}", response.status());
            return Ok(None);
        }

        let records = response.json::<Vec<EntitlementRecord>>().await?;
        Ok(Some(records))
    }
}
