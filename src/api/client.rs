//! REST API Client
//!
//! HTTP client for the products and invoices collections.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, Url};

use super::error::{ApiError, ApiResult};
use super::ResourceApi;
use crate::config::ApiConfig;
use crate::resources::{Resource, ResourceId};

/// REST client bound to one API base URL
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a client from configuration
    pub fn new(config: &ApiConfig) -> ApiResult<Self> {
        let base_url = Url::parse(config.base_url.trim())
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(config.base_url.clone()));
        }

        let mut builder = Client::builder().default_headers({
            let mut headers = reqwest::header::HeaderMap::new();
            headers.insert(
                reqwest::header::CONTENT_TYPE,
                reqwest::header::HeaderValue::from_static("application/json"),
            );
            headers
        });
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(std::time::Duration::from_secs(secs));
        }
        let client = builder.build().map_err(ApiError::Request)?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `<base>/<collection>/`
    pub fn collection_url(&self, collection: &str) -> ApiResult<Url> {
        self.build_url(&[collection, ""])
    }

    /// `<base>/<collection>/<id>/`
    pub fn item_url(&self, collection: &str, id: &ResourceId) -> ApiResult<Url> {
        self.build_url(&[collection, &id.to_string(), ""])
    }

    fn build_url(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// `GET /<collection>/`
    pub async fn list<R: Resource>(&self) -> ApiResult<Vec<R>> {
        let url = self.collection_url(R::COLLECTION)?;
        let response = self.execute(self.client.get(url.clone()), &url).await?;

        let body = response
            .text()
            .await
            .map_err(|e| ApiError::from_transport(e, url.as_str()))?;
        let items: Vec<R> =
            serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))?;

        tracing::debug!(collection = R::COLLECTION, count = items.len(), "Fetched list");
        Ok(items)
    }

    /// `POST /<collection>/`
    pub async fn create<R: Resource>(&self, input: &R::Input) -> ApiResult<()> {
        let url = self.collection_url(R::COLLECTION)?;
        self.execute(self.client.post(url.clone()).json(input), &url)
            .await?;
        tracing::info!(collection = R::COLLECTION, "Created resource");
        Ok(())
    }

    /// `PUT /<collection>/<id>/`
    pub async fn update<R: Resource>(&self, id: &ResourceId, input: &R::Input) -> ApiResult<()> {
        let url = self.item_url(R::COLLECTION, id)?;
        self.execute(self.client.put(url.clone()).json(input), &url)
            .await?;
        tracing::info!(collection = R::COLLECTION, id = %id, "Updated resource");
        Ok(())
    }

    /// `DELETE /<collection>/<id>/`
    pub async fn delete<R: Resource>(&self, id: &ResourceId) -> ApiResult<()> {
        let url = self.item_url(R::COLLECTION, id)?;
        self.execute(self.client.request(Method::DELETE, url.clone()), &url)
            .await?;
        tracing::info!(collection = R::COLLECTION, id = %id, "Deleted resource");
        Ok(())
    }

    /// Send a request and treat any non-2xx status as an error
    async fn execute(&self, request: RequestBuilder, url: &Url) -> ApiResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::from_transport(e, url.as_str()))?;

        let status = response.status();
        tracing::debug!(url = %url, status = status.as_u16(), "API response");

        if status.is_success() {
            Ok(response)
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(ApiError::Status {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait]
impl<R: Resource> ResourceApi<R> for ApiClient {
    async fn list(&self) -> ApiResult<Vec<R>> {
        ApiClient::list::<R>(self).await
    }

    async fn create(&self, input: &R::Input) -> ApiResult<()> {
        ApiClient::create::<R>(self, input).await
    }

    async fn update(&self, id: &ResourceId, input: &R::Input) -> ApiResult<()> {
        ApiClient::update::<R>(self, id, input).await
    }

    async fn delete(&self, id: &ResourceId) -> ApiResult<()> {
        ApiClient::delete::<R>(self, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(&ApiConfig {
            base_url: base.to_string(),
            request_timeout_secs: Some(5),
        })
        .unwrap()
    }

    #[test]
    fn test_collection_url() {
        let api = client("http://localhost:8000");
        assert_eq!(
            api.collection_url("products").unwrap().as_str(),
            "http://localhost:8000/products/"
        );
    }

    #[test]
    fn test_collection_url_with_prefix() {
        let api = client("http://localhost:8000/api/");
        assert_eq!(
            api.collection_url("invoices").unwrap().as_str(),
            "http://localhost:8000/api/invoices/"
        );

        let api = client("http://localhost:8000/api");
        assert_eq!(
            api.collection_url("invoices").unwrap().as_str(),
            "http://localhost:8000/api/invoices/"
        );
    }

    #[test]
    fn test_item_url() {
        let api = client("http://localhost:8000");
        assert_eq!(
            api.item_url("invoices", &ResourceId::Number(12))
                .unwrap()
                .as_str(),
            "http://localhost:8000/invoices/12/"
        );
        assert_eq!(
            api.item_url("products", &ResourceId::from("a b"))
                .unwrap()
                .as_str(),
            "http://localhost:8000/products/a%20b/"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let result = ApiClient::new(&ApiConfig {
            base_url: "not a url".to_string(),
            request_timeout_secs: None,
        });
        assert!(matches!(result, Err(ApiError::InvalidUrl(_))));

        let result = ApiClient::new(&ApiConfig {
            base_url: "mailto:ops@example.com".to_string(),
            request_timeout_secs: None,
        });
        assert!(matches!(result, Err(ApiError::InvalidUrl(_))));
    }
}
