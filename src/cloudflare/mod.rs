pub mod config;
pub mod envelope;
pub mod error;
pub mod fetcher;
pub mod payload;
pub mod reconciler;
pub mod transport;

use std::sync::Arc;

use serde_json::{json, Value};

pub use config::CloudflareConfig;
pub use error::CfError;
pub use fetcher::{Collection, FetchOpts};
pub use reconciler::Reconciler;
pub use transport::{HttpTransport, Transport};

/// Email-routing resources of one account/zone pair.
#[derive(Clone)]
pub struct EmailRouting {
    transport: Arc<dyn Transport>,
    cfg: CloudflareConfig,
}

impl EmailRouting {
    pub fn new(transport: Arc<dyn Transport>, cfg: CloudflareConfig) -> Self {
        Self { transport, cfg }
    }

    pub fn from_config(cfg: CloudflareConfig) -> Result<Self, CfError> {
        cfg.validate()?;
        let transport = HttpTransport::new(&cfg)?;
        Ok(Self::new(Arc::new(transport), cfg))
    }

    pub fn config(&self) -> &CloudflareConfig {
        &self.cfg
    }

    pub fn rules_path(&self) -> String {
        format!("/zones/{}/email/routing/rules", self.cfg.zone_id())
    }

    pub fn addresses_path(&self) -> String {
        format!("/accounts/{}/email/routing/addresses", self.cfg.account_id())
    }

    pub fn dns_path(&self) -> String {
        format!("/zones/{}/email/routing/dns", self.cfg.zone_id())
    }

    fn fetch_opts(&self, per_page: Option<u32>) -> FetchOpts {
        FetchOpts::per_page(per_page.filter(|n| *n > 0).unwrap_or(self.cfg.per_page))
    }

    pub async fn list_rules(&self, per_page: Option<u32>) -> Result<Collection, CfError> {
        fetcher::fetch_all(&*self.transport, &self.rules_path(), &self.fetch_opts(per_page)).await
    }

    pub async fn list_addresses(&self, per_page: Option<u32>) -> Result<Collection, CfError> {
        fetcher::fetch_all(&*self.transport, &self.addresses_path(), &self.fetch_opts(per_page)).await
    }

    pub async fn set_rule_enabled(&self, id: &str, enabled: bool) -> Result<Value, CfError> {
        Reconciler::new(&*self.transport, self.rules_path(), self.fetch_opts(None))
            .set_enabled(id, enabled)
            .await
    }

    pub async fn create_rule(&self, body: Value) -> Result<Value, CfError> {
        self.transport.post(&self.rules_path(), Some(body)).await
    }

    pub async fn delete_rule(&self, id: &str) -> Result<Value, CfError> {
        let path = reconciler::item_path(&self.rules_path(), id);
        self.transport.delete(&path).await
    }

    pub async fn create_address(&self, email: &str) -> Result<Value, CfError> {
        self.transport
            .post(&self.addresses_path(), Some(json!({ "email": email })))
            .await
    }

    pub async fn delete_address(&self, id: &str) -> Result<Value, CfError> {
        let path = reconciler::item_path(&self.addresses_path(), id);
        self.transport.delete(&path).await
    }

    pub async fn enable_dns(&self) -> Result<Value, CfError> {
        self.transport.post(&self.dns_path(), None).await
    }
}
