//! DigitalOcean droplet client
//!
//! Creates one droplet per request through `POST /droplets`.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

use super::error::CloudError;
use super::provision::{ApiToken, CloudProvider, InstanceId, InstanceRequest};

/// Request body for `POST /droplets`
#[derive(Debug, Serialize)]
struct CreateDropletBody<'a> {
    name: &'a str,
    region: &'a str,
    size: &'a str,
    image: &'a str,
    ssh_keys: &'a [String],
    backups: bool,
    ipv6: bool,
    user_data: Option<&'a str>,
    private_networking: Option<bool>,
}

impl<'a> From<&'a InstanceRequest> for CreateDropletBody<'a> {
    fn from(request: &'a InstanceRequest) -> Self {
        Self {
            name: &request.name,
            region: &request.region,
            size: &request.size,
            image: &request.image,
            ssh_keys: &request.ssh_keys,
            backups: false,
            ipv6: false,
            user_data: None,
            private_networking: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CreateDropletResponse {
    droplet: Droplet,
}

#[derive(Debug, Deserialize)]
struct Droplet {
    id: u64,
}

/// Error body returned by the API on failure
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// DigitalOcean API v2 client
pub struct DigitalOceanClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl DigitalOceanClient {
    /// Create a client for `base_url` (e.g. `https://api.digitalocean.com/v2`)
    pub fn new(token: &ApiToken, base_url: impl Into<String>) -> Result<Self, CloudError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.expose().to_string(),
        })
    }

    async fn create_droplet(&self, request: &InstanceRequest) -> Result<InstanceId, CloudError> {
        request.validate()?;

        let url = format!("{}/droplets", self.base_url);
        let body = CreateDropletBody::from(request);

        tracing::debug!(
            "Attempting to create: {}",
            serde_json::to_string(&body).unwrap_or_default()
        );

        let response = match self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                if e.is_connect() {
                    return Err(CloudError::Connection(e.to_string()));
                }
                if e.is_timeout() {
                    return Err(CloudError::Timeout);
                }
                return Err(CloudError::Request(e));
            }
        };

        let status = response.status().as_u16();
        let text = response.text().await?;
        parse_create_response(status, &text)
    }
}

impl CloudProvider for DigitalOceanClient {
    fn create_instance(
        &self,
        request: &InstanceRequest,
    ) -> impl Future<Output = Result<InstanceId, CloudError>> {
        self.create_droplet(request)
    }
}

/// Interpret the status and body of a droplet creation response
///
/// Only 202 Accepted counts as success.
fn parse_create_response(status: u16, body: &str) -> Result<InstanceId, CloudError> {
    if status != 202 {
        let message = serde_json::from_str::<ApiErrorBody>(body)
            .map(|e| e.message)
            .unwrap_or_else(|_| body.trim().to_string());
        return Err(CloudError::UnexpectedStatus { status, message });
    }

    let parsed: CreateDropletResponse =
        serde_json::from_str(body).map_err(|e| CloudError::InvalidResponse(e.to_string()))?;

    Ok(InstanceId(parsed.droplet.id))
}
