use async_trait::async_trait;
use gloo_net::http::{Request, Response};
use serde::de::DeserializeOwned;

use propsettings_shared::{
    PropertiesError, PropertiesResource, PropertyModel, PropertySet, RestartStatus, RoleInfo,
};

/// `PropertiesResource` backed by the browser fetch API
#[derive(Debug, Clone)]
pub struct HttpPropertiesResource {
    base_url: String,
}

impl HttpPropertiesResource {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn properties_url(&self) -> String {
        format!("{}/properties", self.base_url)
    }
}

#[async_trait(?Send)]
impl PropertiesResource for HttpPropertiesResource {
    async fn query(&self, set: PropertySet) -> Result<Vec<PropertyModel>, PropertiesError> {
        let response = Request::get(&self.properties_url())
            .query([("whichPropertySet", set.as_str())])
            .send()
            .await
            .map_err(|e| PropertiesError::Transport(e.to_string()))?;
        decode(response).await
    }

    async fn update(
        &self,
        properties: &[PropertyModel],
    ) -> Result<Vec<PropertyModel>, PropertiesError> {
        let response = Request::put(&self.properties_url())
            .header("Content-Type", "application/json")
            .json(&properties)
            .map_err(|e| PropertiesError::Transport(format!("Serialize error: {}", e)))?
            .send()
            .await
            .map_err(|e| PropertiesError::Transport(e.to_string()))?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, PropertiesError> {
    if !response.ok() {
        let status = response.status();
        let message = match response.text().await {
            Ok(text) if !text.is_empty() => text,
            _ => response.status_text(),
        };
        return Err(PropertiesError::Status { status, message });
    }
    response
        .json::<T>()
        .await
        .map_err(|e| PropertiesError::Decode(e.to_string()))
}

/// Fetch the current user's role
pub async fn fetch_role_info(base_url: &str) -> Result<RoleInfo, PropertiesError> {
    let url = format!("{}/role-info", base_url.trim_end_matches('/'));
    let response = Request::get(&url)
        .send()
        .await
        .map_err(|e| PropertiesError::Transport(e.to_string()))?;
    decode(response).await
}

/// Whether saved changes are waiting for a server restart
pub async fn fetch_restart_status(base_url: &str) -> Result<RestartStatus, PropertiesError> {
    let url = format!("{}/properties/restart-required", base_url.trim_end_matches('/'));
    let response = Request::get(&url)
        .send()
        .await
        .map_err(|e| PropertiesError::Transport(e.to_string()))?;
    decode(response).await
}
