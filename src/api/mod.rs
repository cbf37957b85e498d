//! REST client for the listing-manager backend.
//!
//! One thin wrapper over reqwest covering every backend capability: stores,
//! products, templates, generation, status, upload, export and the health
//! probe that gates mutating commands.

use crate::model::{
    ClientConfig, GenerateRequest, GenerateStoreRequest, NewProduct, NewStore, NewTemplate,
    Product, StatusEntry, StatusReport, Store, Template, TemplateKind, UploadedImage,
};
use bytes::Bytes;
use reqwest::{multipart, Client, Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{action}: {source}")]
    Request {
        action: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{action}: backend returned HTTP {status}")]
    Backend { action: &'static str, status: u16 },
    #[error("{action}: {source}")]
    Io {
        action: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Target of a backend-delegated export.
#[derive(Debug, Clone, Copy)]
pub enum ExportScope<'a> {
    Product(&'a str),
    Store(&'a str),
    All,
}

impl ExportScope<'_> {
    fn path(&self) -> String {
        match self {
            ExportScope::Product(id) => format!("/api/export/product/{}", id),
            ExportScope::Store(id) => format!("/api/export/store/{}", id),
            ExportScope::All => "/api/export/all".to_string(),
        }
    }
}

pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(cfg: &ClientConfig) -> Result<Self, ApiError> {
        let http = Client::builder()
            .user_agent(cfg.user_agent.clone())
            .build()
            .map_err(|source| ApiError::Request {
                action: "build http client",
                source,
            })?;
        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn check(action: &'static str, res: Response) -> Result<Response, ApiError> {
        if res.status().is_success() {
            Ok(res)
        } else {
            Err(ApiError::Backend {
                action,
                status: res.status().as_u16(),
            })
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        action: &'static str,
        path: &str,
    ) -> Result<T, ApiError> {
        let res = self
            .http
            .get(self.url(path))
            .send()
            .await
            .map_err(|source| ApiError::Request { action, source })?;
        Self::check(action, res)?
            .json()
            .await
            .map_err(|source| ApiError::Request { action, source })
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        action: &'static str,
        method: Method,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, ApiError> {
        let res = self
            .http
            .request(method, self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|source| ApiError::Request { action, source })?;
        Self::check(action, res)?
            .json()
            .await
            .map_err(|source| ApiError::Request { action, source })
    }

    async fn delete(&self, action: &'static str, path: &str) -> Result<(), ApiError> {
        let res = self
            .http
            .delete(self.url(path))
            .send()
            .await
            .map_err(|source| ApiError::Request { action, source })?;
        Self::check(action, res).map(|_| ())
    }

    /// Backend reachability probe. Absence of a 2xx means offline; every
    /// mutating command is gated on this.
    pub async fn health(&self) -> bool {
        match self.http.get(self.url("/api/stores")).send().await {
            Ok(res) => res.status().is_success(),
            Err(_) => false,
        }
    }

    // Stores

    pub async fn list_stores(&self) -> Result<Vec<Store>, ApiError> {
        self.get_json("fetch stores", "/api/stores").await
    }

    pub async fn create_store(&self, store: &NewStore) -> Result<Store, ApiError> {
        self.send_json("create store", Method::POST, "/api/stores", store)
            .await
    }

    pub async fn update_store(
        &self,
        id: &str,
        patch: &serde_json::Value,
    ) -> Result<Store, ApiError> {
        self.send_json(
            "update store",
            Method::PATCH,
            &format!("/api/stores/{}", id),
            patch,
        )
        .await
    }

    pub async fn delete_store(&self, id: &str) -> Result<(), ApiError> {
        self.delete("delete store", &format!("/api/stores/{}", id))
            .await
    }

    // Products

    pub async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        self.get_json("fetch products", "/api/products").await
    }

    pub async fn get_product(&self, id: &str) -> Result<Product, ApiError> {
        self.get_json("fetch product", &format!("/api/products/{}", id))
            .await
    }

    pub async fn create_product(&self, product: &NewProduct) -> Result<Product, ApiError> {
        self.send_json("create product", Method::POST, "/api/products", product)
            .await
    }

    pub async fn update_product(
        &self,
        id: &str,
        patch: &serde_json::Value,
    ) -> Result<Product, ApiError> {
        self.send_json(
            "update product",
            Method::PATCH,
            &format!("/api/products/{}", id),
            patch,
        )
        .await
    }

    pub async fn delete_product(&self, id: &str) -> Result<(), ApiError> {
        self.delete("delete product", &format!("/api/products/{}", id))
            .await
    }

    // Templates

    pub async fn list_templates(
        &self,
        kind: Option<TemplateKind>,
    ) -> Result<Vec<Template>, ApiError> {
        let path = match kind {
            Some(kind) => format!("/api/templates?type={}", kind.as_str()),
            None => "/api/templates".to_string(),
        };
        self.get_json("fetch templates", &path).await
    }

    pub async fn create_template(&self, template: &NewTemplate) -> Result<Template, ApiError> {
        self.send_json("create template", Method::POST, "/api/templates", template)
            .await
    }

    pub async fn update_template(
        &self,
        id: &str,
        patch: &serde_json::Value,
    ) -> Result<Template, ApiError> {
        self.send_json(
            "update template",
            Method::PATCH,
            &format!("/api/templates/{}", id),
            patch,
        )
        .await
    }

    pub async fn delete_template(&self, id: &str) -> Result<(), ApiError> {
        self.delete("delete template", &format!("/api/templates/{}", id))
            .await
    }

    // Generation

    pub async fn generate_all(&self, req: &GenerateRequest) -> Result<(), ApiError> {
        let action = "start generation";
        let res = self
            .http
            .post(self.url("/api/generate/all"))
            .json(req)
            .send()
            .await
            .map_err(|source| ApiError::Request { action, source })?;
        Self::check(action, res).map(|_| ())
    }

    pub async fn generate_for_store(&self, req: &GenerateStoreRequest) -> Result<(), ApiError> {
        let action = "start store generation";
        let res = self
            .http
            .post(self.url("/api/generate/store"))
            .json(req)
            .send()
            .await
            .map_err(|source| ApiError::Request { action, source })?;
        Self::check(action, res).map(|_| ())
    }

    /// One status probe for a product. The per-request timeout keeps a hung
    /// backend from stalling the poll loop.
    pub async fn generation_status(
        &self,
        product_id: &str,
        timeout_ms: u64,
    ) -> Result<Vec<StatusEntry>, ApiError> {
        let action = "fetch generation status";
        let res = self
            .http
            .get(self.url(&format!("/api/generate/status/{}", product_id)))
            .timeout(Duration::from_millis(timeout_ms))
            .send()
            .await
            .map_err(|source| ApiError::Request { action, source })?;
        let report: StatusReport = Self::check(action, res)?
            .json()
            .await
            .map_err(|source| ApiError::Request { action, source })?;
        Ok(report.into_entries())
    }

    // Upload

    pub async fn upload(&self, path: &Path) -> Result<UploadedImage, ApiError> {
        let action = "upload image";
        let data = tokio::fs::read(path)
            .await
            .map_err(|source| ApiError::Io { action, source })?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload.bin")
            .to_string();
        let form =
            multipart::Form::new().part("file", multipart::Part::bytes(data).file_name(file_name));
        let res = self
            .http
            .post(self.url("/api/upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|source| ApiError::Request { action, source })?;
        Self::check(action, res)?
            .json()
            .await
            .map_err(|source| ApiError::Request { action, source })
    }

    // Export

    pub async fn export(
        &self,
        scope: ExportScope<'_>,
        format: crate::model::ExportFormat,
    ) -> Result<Bytes, ApiError> {
        let action = "export";
        let res = self
            .http
            .get(self.url(&scope.path()))
            .query(&[("format", format.as_str())])
            .send()
            .await
            .map_err(|source| ApiError::Request { action, source })?;
        Self::check(action, res)?
            .bytes()
            .await
            .map_err(|source| ApiError::Request { action, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ExportFormat;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: String) -> ClientConfig {
        ClientConfig {
            base_url,
            session_id: "test".into(),
            poll_interval: Duration::from_millis(10),
            watch_timeout: None,
            status_timeout_ms: 1_000,
            user_agent: "multilister-cli/test".into(),
        }
    }

    #[tokio::test]
    async fn lists_stores() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/stores"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": "s1", "name": "Minimal Mugs", "concept": "minimal", "imageCount": 3}
            ])))
            .mount(&server)
            .await;

        let client = ApiClient::new(&test_config(server.uri())).unwrap();
        let stores = client.list_stores().await.unwrap();
        assert_eq!(stores.len(), 1);
        assert_eq!(stores[0].name, "Minimal Mugs");
        assert_eq!(stores[0].image_count, 3);
    }

    #[tokio::test]
    async fn non_success_maps_to_backend_error_with_action() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/products/p1"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = ApiClient::new(&test_config(server.uri())).unwrap();
        let err = client.get_product("p1").await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::Backend {
                action: "fetch product",
                status: 500
            }
        ));
    }

    #[tokio::test]
    async fn status_endpoint_tolerates_both_wire_shapes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/generate/status/p1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{"storeId": "s1", "status": "GENERATING"}])),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/generate/status/p2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                json!({"stores": [{"storeId": "s1", "status": "COMPLETED"}]}),
            ))
            .mount(&server)
            .await;

        let client = ApiClient::new(&test_config(server.uri())).unwrap();
        let bare = client.generation_status("p1", 1_000).await.unwrap();
        let nested = client.generation_status("p2", 1_000).await.unwrap();
        assert_eq!(bare[0].status, crate::model::StoreStatus::Generating);
        assert_eq!(nested[0].status, crate::model::StoreStatus::Completed);
    }

    #[tokio::test]
    async fn health_is_false_when_unreachable() {
        let config = test_config("http://127.0.0.1:1".into());
        let client = ApiClient::new(&config).unwrap();
        assert!(!client.health().await);
    }

    #[tokio::test]
    async fn export_passes_format_and_returns_blob() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/export/store/s1"))
            .and(query_param("format", "csv"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Title,Description\n"))
            .mount(&server)
            .await;

        let client = ApiClient::new(&test_config(server.uri())).unwrap();
        let blob = client
            .export(ExportScope::Store("s1"), ExportFormat::Csv)
            .await
            .unwrap();
        assert_eq!(&blob[..], b"Title,Description\n");
    }
}
