//! Workspace lifecycle controller.
//!
//! Owns the product-being-composed state and drives the generation lifecycle:
//! image persistence, precondition checks, job start, status reconciliation
//! and reset.

use crate::api::{ApiClient, ApiError};
use crate::model::{
    ClientConfig, GenerateRequest, GenerateStoreRequest, NewProduct, Product, StatusEntry, Store,
    StoreContent, StoreStatus, WatchOutcome, WorkspaceEvent,
};
use crate::workspace::poller::{watch_generation, WatchParams};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("no product image set; upload one first")]
    NoImage,
    #[error("backend is offline; start it and retry")]
    BackendOffline,
    #[error("no stores configured; add a store first")]
    NoStores,
    #[error("no active product in the workspace")]
    NoProduct,
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// The single product being composed in this session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Workspace {
    pub product_id: Option<String>,
    pub main_image: Option<String>,
    pub description: String,
    /// Per-store generation results keyed by store id.
    pub results: HashMap<String, StoreContent>,
    /// Latest per-store statuses from the live poll.
    #[serde(default)]
    pub statuses: HashMap<String, StoreStatus>,
    pub generating: bool,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the workspace image and persist it on the product record,
    /// creating the record on first use. A failed write is logged and the
    /// local state kept as-is; the next successful write converges.
    pub async fn set_main_image(&mut self, api: &ApiClient, url: Option<String>) {
        self.main_image = url.clone();
        let Some(url) = url else { return };

        let outcome = match &self.product_id {
            Some(id) => api
                .update_product(id, &json!({ "mainImageUrl": url }))
                .await,
            None => {
                api.create_product(&NewProduct {
                    main_image_url: Some(url),
                    description: None,
                    infographic_count: 0,
                })
                .await
            }
        };
        match outcome {
            Ok(product) => self.product_id = Some(product.id),
            Err(e) => tracing::error!(error = %e, "failed to persist product image"),
        }
    }

    pub fn set_description(&mut self, description: String) {
        self.description = description;
    }

    /// Start generation for every configured store.
    ///
    /// Preconditions are checked in order and abort before any mutating call:
    /// an image must be set, the backend must be reachable, and at least one
    /// store must exist. On success the generating flag is raised; completion
    /// is observed only by the watch loop.
    pub async fn start_generation(
        &mut self,
        api: &ApiClient,
        stores: &[Store],
    ) -> Result<(), WorkspaceError> {
        let image = self.main_image.clone().ok_or(WorkspaceError::NoImage)?;
        if !api.health().await {
            return Err(WorkspaceError::BackendOffline);
        }
        if stores.is_empty() {
            return Err(WorkspaceError::NoStores);
        }

        let product_id = self.ensure_product(api, &image).await?;
        api.generate_all(&GenerateRequest {
            product_id,
            main_image_url: Some(image),
            product_description: self.description_payload(),
        })
        .await?;
        self.generating = true;
        Ok(())
    }

    /// Start generation for a single store. Same preconditions as the
    /// all-stores variant.
    pub async fn start_generation_for_store(
        &mut self,
        api: &ApiClient,
        store: &Store,
    ) -> Result<(), WorkspaceError> {
        let image = self.main_image.clone().ok_or(WorkspaceError::NoImage)?;
        if !api.health().await {
            return Err(WorkspaceError::BackendOffline);
        }

        let product_id = self.ensure_product(api, &image).await?;
        api.generate_for_store(&GenerateStoreRequest {
            store_id: store.id.clone(),
            product_id,
            main_image_url: Some(image),
            product_description: self.description_payload(),
        })
        .await?;
        self.generating = true;
        Ok(())
    }

    async fn ensure_product(
        &mut self,
        api: &ApiClient,
        image: &str,
    ) -> Result<String, WorkspaceError> {
        if let Some(id) = &self.product_id {
            return Ok(id.clone());
        }
        let product = api
            .create_product(&NewProduct {
                main_image_url: Some(image.to_string()),
                description: self.description_payload(),
                infographic_count: 0,
            })
            .await?;
        self.product_id = Some(product.id.clone());
        Ok(product.id)
    }

    fn description_payload(&self) -> Option<String> {
        let trimmed = self.description.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    /// Watch the in-flight job until every store is terminal, then fetch the
    /// finalized product exactly once and reconcile local results.
    ///
    /// A cancelled watch mutates nothing; a timed-out watch keeps the
    /// generating flag raised since the job may still finish server-side.
    pub async fn watch_until_complete(
        &mut self,
        api: &ApiClient,
        cfg: &ClientConfig,
        event_tx: &mpsc::UnboundedSender<WorkspaceEvent>,
        cancel: Arc<AtomicBool>,
    ) -> Result<WatchOutcome, WorkspaceError> {
        let product_id = self.product_id.clone().ok_or(WorkspaceError::NoProduct)?;
        let outcome = watch_generation(WatchParams {
            client: api,
            product_id: &product_id,
            interval: cfg.poll_interval,
            max_duration: cfg.watch_timeout,
            status_timeout_ms: cfg.status_timeout_ms,
            event_tx,
            cancel,
        })
        .await;

        if !outcome.completed && !outcome.timed_out {
            // Cancelled: discard the result, leave state untouched.
            return Ok(outcome);
        }

        self.apply_statuses(&outcome.statuses);
        if outcome.completed {
            self.generating = false;
            let product = api.get_product(&product_id).await?;
            self.apply_product(&product);
            let _ = event_tx.send(WorkspaceEvent::GenerationFinished {
                product_id: product_id.clone(),
            });
        }
        Ok(outcome)
    }

    /// Replace local per-store results with the ones on a fetched product.
    pub fn apply_product(&mut self, product: &Product) {
        self.product_id = Some(product.id.clone());
        if product.main_image_url.is_some() {
            self.main_image = product.main_image_url.clone();
        }
        self.results = product
            .stores
            .iter()
            .filter(|sp| !sp.resolved_store_id().is_empty())
            .map(|sp| (sp.resolved_store_id().to_string(), sp.content.clone()))
            .collect();
    }

    /// Replace the live status map with the latest poll entries.
    pub fn apply_statuses(&mut self, entries: &[StatusEntry]) {
        self.statuses = entries
            .iter()
            .map(|e| (e.store_id.clone(), e.status))
            .collect();
    }

    /// Clear all local state to start a new product. Remote records are kept.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Status shown for a store: the live poll entry wins; otherwise ready
    /// content counts as completed and anything else is pending.
    pub fn store_status(&self, store_id: &str) -> StoreStatus {
        if let Some(status) = self.statuses.get(store_id) {
            return *status;
        }
        if self.is_ready(store_id) {
            StoreStatus::Completed
        } else {
            StoreStatus::Pending
        }
    }

    pub fn is_ready(&self, store_id: &str) -> bool {
        self.results
            .get(store_id)
            .map(StoreContent::is_ready)
            .unwrap_or(false)
    }

    pub fn ready_count(&self, stores: &[Store]) -> usize {
        stores.iter().filter(|s| self.is_ready(&s.id)).count()
    }

    pub fn image_count(&self) -> usize {
        self.results.values().map(|c| c.images.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: String) -> ClientConfig {
        ClientConfig {
            base_url,
            session_id: "test".into(),
            poll_interval: Duration::from_millis(10),
            watch_timeout: Some(Duration::from_secs(5)),
            status_timeout_ms: 1_000,
            user_agent: "multilister-cli/test".into(),
        }
    }

    fn test_store(id: &str) -> Store {
        Store {
            id: id.into(),
            name: format!("Store {}", id),
            concept: String::new(),
            image_count: 3,
            has_infographic: false,
            has_video: false,
            title_template: String::new(),
            description_template: String::new(),
            tags_template: String::new(),
            about_template: String::new(),
            shipping_template: String::new(),
            return_template: String::new(),
            created_at: None,
            updated_at: None,
        }
    }

    fn ready_content() -> StoreContent {
        StoreContent {
            title: "Ceramic mug".into(),
            description: "Hand-thrown".into(),
            tags: vec!["mug".into()],
            images: vec!["https://cdn.example/a.jpg".into()],
        }
    }

    #[tokio::test]
    async fn missing_image_aborts_before_any_network_call() {
        let server = MockServer::start().await;
        let api = ApiClient::new(&test_config(server.uri())).unwrap();

        let mut ws = Workspace::new();
        let err = ws
            .start_generation(&api, &[test_store("s1")])
            .await
            .unwrap_err();
        assert!(matches!(err, WorkspaceError::NoImage));
        assert!(!ws.generating);
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn no_stores_aborts_before_any_mutating_call() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/stores"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;
        let api = ApiClient::new(&test_config(server.uri())).unwrap();

        let mut ws = Workspace::new();
        ws.main_image = Some("https://cdn.example/p.jpg".into());
        let err = ws.start_generation(&api, &[]).await.unwrap_err();
        assert!(matches!(err, WorkspaceError::NoStores));

        // Only the health probe went out.
        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url.path(), "/api/stores");
    }

    #[tokio::test]
    async fn start_generation_creates_the_product_once_and_posts_the_job() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/stores"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/products"))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(json!({"id": "p1", "stores": []})),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/generate/all"))
            .and(body_partial_json(json!({"productId": "p1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"started": true})))
            .expect(1)
            .mount(&server)
            .await;

        let api = ApiClient::new(&test_config(server.uri())).unwrap();
        let mut ws = Workspace::new();
        ws.main_image = Some("https://cdn.example/p.jpg".into());
        ws.set_description("Blue ceramic mug".into());

        ws.start_generation(&api, &[test_store("s1")])
            .await
            .unwrap();
        assert!(ws.generating);
        assert_eq!(ws.product_id.as_deref(), Some("p1"));
    }

    #[tokio::test]
    async fn completed_watch_fetches_the_product_exactly_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/generate/status/p1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{"storeId": "s1", "status": "GENERATING"}])),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/generate/status/p1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{"storeId": "s1", "status": "COMPLETED"}])),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/products/p1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "p1",
                "mainImageUrl": "https://cdn.example/p.jpg",
                "storeProducts": [
                    {"storeId": "s1", "title": "Mug", "description": "d", "tags": ["a"], "images": ["https://cdn.example/a.jpg"]}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let cfg = test_config(server.uri());
        let api = ApiClient::new(&cfg).unwrap();
        let mut ws = Workspace::new();
        ws.product_id = Some("p1".into());
        ws.generating = true;

        let (tx, _rx) = mpsc::unbounded_channel();
        let outcome = ws
            .watch_until_complete(&api, &cfg, &tx, Arc::new(AtomicBool::new(false)))
            .await
            .unwrap();

        assert!(outcome.completed);
        assert!(!ws.generating);
        assert!(ws.is_ready("s1"));
        assert_eq!(ws.store_status("s1"), StoreStatus::Completed);
    }

    #[test]
    fn reset_is_idempotent() {
        let mut ws = Workspace::new();
        ws.product_id = Some("p1".into());
        ws.main_image = Some("https://cdn.example/p.jpg".into());
        ws.description = "text".into();
        ws.results.insert("s1".into(), ready_content());
        ws.generating = true;

        ws.reset();
        let after_one = ws.clone();
        ws.reset();

        assert!(ws.product_id.is_none());
        assert!(ws.main_image.is_none());
        assert!(ws.description.is_empty());
        assert!(ws.results.is_empty());
        assert!(!ws.generating);
        assert_eq!(serde_json::to_value(&ws).unwrap(), serde_json::to_value(&after_one).unwrap());
    }

    #[test]
    fn unknown_store_without_content_is_pending() {
        let mut ws = Workspace::new();
        ws.apply_statuses(&[StatusEntry {
            store_id: "s1".into(),
            status: StoreStatus::Generating,
        }]);

        // s2 is absent from the status response and has no content.
        assert_eq!(ws.store_status("s2"), StoreStatus::Pending);
        assert_eq!(ws.store_status("s1"), StoreStatus::Generating);
    }

    #[test]
    fn ready_content_counts_as_completed_without_a_live_status() {
        let mut ws = Workspace::new();
        ws.results.insert("s1".into(), ready_content());
        assert_eq!(ws.store_status("s1"), StoreStatus::Completed);
        assert_eq!(ws.ready_count(&[test_store("s1"), test_store("s2")]), 1);
        assert_eq!(ws.image_count(), 1);
    }

    #[test]
    fn live_status_wins_over_derived_readiness() {
        let mut ws = Workspace::new();
        ws.results.insert("s1".into(), ready_content());
        ws.apply_statuses(&[StatusEntry {
            store_id: "s1".into(),
            status: StoreStatus::Generating,
        }]);
        assert_eq!(ws.store_status("s1"), StoreStatus::Generating);
    }
}
