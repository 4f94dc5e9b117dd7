use async_trait::async_trait;
use autoreply_core::{CoreError, GraphApiError, GraphConfig, PageProfile, ProfileLookup};
use reqwest::{Client, Method, Response};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use url::Url;

const PROFILE_FIELDS: &str = "id,name,instagram_business_account";

#[derive(Debug, Clone)]
pub struct GraphApiClient {
    http_client: Client,
    api_base: Url,
}

impl GraphApiClient {
    pub fn new(config: &GraphConfig) -> Result<Self, CoreError> {
        let api_base = Url::parse(config.api_base.trim_end_matches('/')).map_err(|e| {
            CoreError::InvalidInput {
                message: format!("Invalid Graph API base URL {}: {}", config.api_base, e),
            }
        })?;

        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http_client,
            api_base,
        })
    }

    pub fn api_base(&self) -> &Url {
        &self.api_base
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.api_base.as_str().trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    /// Sends a request authenticated through the `access_token` query parameter.
    pub async fn make_request(
        &self,
        method: Method,
        endpoint: &str,
        access_token: &str,
        query_params: Option<&[(&str, &str)]>,
    ) -> Result<Response, CoreError> {
        let url = self.endpoint_url(endpoint);
        let start_time = Instant::now();

        let mut request_builder = self
            .http_client
            .request(method.clone(), &url)
            .query(&[("access_token", access_token)]);

        if let Some(params) = query_params {
            request_builder = request_builder.query(params);
        }

        info!("Making Graph API request: {} {}", method, endpoint);
        let response = match request_builder.send().await {
            Ok(response) => response,
            Err(e) => {
                error!("Network error for {} {}: {}", method, endpoint, e);
                if e.is_timeout() {
                    return Err(CoreError::GraphApi(GraphApiError::RequestTimeout));
                }
                return Err(CoreError::Network(e));
            }
        };

        let status = response.status();
        debug!(
            "Graph API responded {} for {} in {:?}",
            status,
            endpoint,
            start_time.elapsed()
        );

        if status.is_success() {
            return Ok(response);
        }

        error!("Request failed with status: {} for {}", status, endpoint);
        let err = match status.as_u16() {
            401 => GraphApiError::InvalidToken,
            403 => GraphApiError::Forbidden {
                resource: endpoint.to_string(),
            },
            429 => {
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(60);
                warn!("Rate limited, retry after {} seconds", retry_after);
                GraphApiError::RateLimitExceeded { retry_after }
            }
            code if status.is_server_error() => GraphApiError::ServerError { status_code: code },
            code => GraphApiError::InvalidResponse {
                details: format!("Unexpected status {} from {}", code, endpoint),
            },
        };
        Err(CoreError::GraphApi(err))
    }

    pub async fn get_page_profile(&self, access_token: &str) -> Result<PageProfile, CoreError> {
        let response = self
            .make_request(
                Method::GET,
                "/me",
                access_token,
                Some(&[("fields", PROFILE_FIELDS)]),
            )
            .await?;

        let profile: PageProfile = response.json().await.map_err(|e| {
            error!("Failed to parse page profile: {}", e);
            CoreError::GraphApi(GraphApiError::InvalidResponse {
                details: "Failed to parse page profile".to_string(),
            })
        })?;

        debug!("Retrieved page profile {}", profile.id);
        Ok(profile)
    }
}

#[async_trait]
impl ProfileLookup for GraphApiClient {
    async fn page_profile(&self, access_token: &str) -> Result<PageProfile, CoreError> {
        self.get_page_profile(access_token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(api_base: &str) -> GraphConfig {
        GraphConfig {
            api_base: api_base.to_string(),
            timeout_secs: 5,
        }
    }

    #[test]
    fn test_client_creation() {
        let client = GraphApiClient::new(&config("https://graph.facebook.com/v18.0/")).unwrap();
        assert_eq!(
            client.endpoint_url("/me"),
            "https://graph.facebook.com/v18.0/me"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let result = GraphApiClient::new(&config("::not-a-url"));
        assert!(matches!(result, Err(CoreError::InvalidInput { .. })));
    }
}
