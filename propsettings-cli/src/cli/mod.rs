//! CLI subcommands for managing a remote PropSettings server
//!
//! Provides commands for:
//! - Listing properties by set
//! - Changing a single property through the same change-tracking store the UI uses
//! - Checking whether saved changes await a restart

use async_trait::async_trait;
use clap::Subcommand;
use reqwest::{Client, Response};
use std::time::Duration;

use propsettings_shared::{
    PropertiesError, PropertiesResource, PropertyModel, PropertySet, PropertyStore, RestartStatus,
};

/// `PropertiesResource` over reqwest
#[derive(Debug, Clone)]
pub struct HttpPropertiesResource {
    client: Client,
    base_url: String,
}

impl HttpPropertiesResource {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn properties_url(&self) -> String {
        format!("{}/properties", self.base_url)
    }
}

async fn decode_properties(response: Response) -> Result<Vec<PropertyModel>, PropertiesError> {
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(PropertiesError::Status {
            status: status.as_u16(),
            message,
        });
    }
    response
        .json()
        .await
        .map_err(|e| PropertiesError::Decode(e.to_string()))
}

#[async_trait(?Send)]
impl PropertiesResource for HttpPropertiesResource {
    async fn query(&self, set: PropertySet) -> Result<Vec<PropertyModel>, PropertiesError> {
        let response = self
            .client
            .get(self.properties_url())
            .query(&[("whichPropertySet", set.as_str())])
            .send()
            .await
            .map_err(|e| PropertiesError::Transport(e.to_string()))?;
        decode_properties(response).await
    }

    async fn update(
        &self,
        properties: &[PropertyModel],
    ) -> Result<Vec<PropertyModel>, PropertiesError> {
        let response = self
            .client
            .put(self.properties_url())
            .json(properties)
            .send()
            .await
            .map_err(|e| PropertiesError::Transport(e.to_string()))?;
        decode_properties(response).await
    }
}

/// CLI client for the PropSettings API
pub struct CliClient {
    client: Client,
    base_url: String,
}

impl CliClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn store(&self) -> PropertyStore<HttpPropertiesResource> {
        PropertyStore::new(HttpPropertiesResource::new(self.client.clone(), &self.base_url))
    }

    pub async fn restart_status(&self) -> anyhow::Result<RestartStatus> {
        let url = format!("{}/properties/restart-required", self.base_url);
        let resp = self.client.get(&url).send().await?.error_for_status()?;
        Ok(resp.json().await?)
    }
}

// =============================================================================
// Property Commands
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum PropertyCommands {
    /// List system properties
    List {
        /// Property set to list (all, mutable, immutable)
        #[arg(short, long, default_value = "all")]
        set: PropertySet,
        /// Output format (json, table)
        #[arg(short, long, default_value = "table")]
        format: String,
    },
    /// Change the value of a property
    Set {
        /// Property key
        key: String,
        /// New value
        value: String,
    },
    /// Show whether saved changes are waiting for a restart
    RestartStatus,
}

impl PropertyCommands {
    pub async fn execute(&self, client: &CliClient) -> anyhow::Result<()> {
        match self {
            PropertyCommands::List { set, format } => {
                let tracked = client.store().query(*set).await?;
                if format == "json" {
                    println!("{}", serde_json::to_string_pretty(tracked.properties())?);
                } else {
                    print_table(tracked.properties());
                }
            }
            PropertyCommands::Set { key, value } => {
                let store = client.store();
                let mut tracked = store.query_all().await?;
                if !tracked.set_value(key, value.clone()) {
                    anyhow::bail!("Unknown property: {}", key);
                }
                if !store.has_unsaved_properties(&tracked) {
                    println!("{} is already {:?}", key, value);
                    return Ok(());
                }

                for prop in store.update(&mut tracked).await? {
                    println!("Saved {} = {:?}", prop.key, prop.value);
                    if prop.needs_restart {
                        println!("  (takes effect after a restart)");
                    }
                }
            }
            PropertyCommands::RestartStatus => {
                let status = client.restart_status().await?;
                if status.restart_required {
                    println!("Restart required to apply saved property changes");
                } else {
                    println!("No restart required");
                }
            }
        }
        Ok(())
    }
}

fn print_table(properties: &[PropertyModel]) {
    if properties.is_empty() {
        println!("No properties found");
        return;
    }

    let width = properties.iter().map(|p| p.key.len()).max().unwrap_or(3).max(3);
    println!("{:<width$}  {:<8}  VALUE", "KEY", "RESTART", width = width);
    for prop in properties {
        let restart = if prop.needs_restart {
            "pending"
        } else if prop.needs_restart_if_changed {
            "yes"
        } else {
            "no"
        };
        println!("{:<width$}  {:<8}  {}", prop.key, restart, prop.value, width = width);
    }
}
