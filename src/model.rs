use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub base_url: String,
    pub session_id: String,
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
    #[serde(default, with = "humantime_serde")]
    pub watch_timeout: Option<Duration>,
    pub status_timeout_ms: u64,
    pub user_agent: String,
}

/// A configured destination shop with its own templates and image-count target.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub concept: String,
    #[serde(default)]
    pub image_count: u32,
    #[serde(default)]
    pub has_infographic: bool,
    #[serde(default)]
    pub has_video: bool,
    #[serde(default)]
    pub title_template: String,
    #[serde(default)]
    pub description_template: String,
    #[serde(default)]
    pub tags_template: String,
    #[serde(default)]
    pub about_template: String,
    #[serde(default)]
    pub shipping_template: String,
    #[serde(default)]
    pub return_template: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Payload for creating a store.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStore {
    pub name: String,
    pub concept: String,
    pub image_count: u32,
    pub has_infographic: bool,
    pub has_video: bool,
    pub title_template: String,
    pub description_template: String,
    pub tags_template: String,
    pub about_template: String,
    pub shipping_template: String,
    pub return_template: String,
}

/// Generated output for one (product, store) pair.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreContent {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

impl StoreContent {
    /// Content is usable once it carries a title and at least one image.
    pub fn is_ready(&self) -> bool {
        !self.title.trim().is_empty() && !self.images.is_empty()
    }
}

/// A per-store result as nested inside a product payload. Depending on the
/// backend variant the store reference is either a flat `storeId` or a nested
/// `store.id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreResult {
    #[serde(default)]
    pub store_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<StoreRef>,
    #[serde(flatten)]
    pub content: StoreContent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreRef {
    pub id: String,
}

impl StoreResult {
    pub fn resolved_store_id(&self) -> &str {
        if !self.store_id.is_empty() {
            &self.store_id
        } else {
            self.store.as_ref().map(|s| s.id.as_str()).unwrap_or("")
        }
    }
}

/// One uploaded item for which content is generated across all stores.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub infographic_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    // The backend nests per-store results under `storeProducts`.
    #[serde(default, alias = "storeProducts")]
    pub stores: Vec<StoreResult>,
}

/// Payload for creating a product.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub infographic_count: u32,
}

/// Per-store generation state as reported by the status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StoreStatus {
    Pending,
    // Older backend variant spells this PROCESSING.
    #[serde(alias = "PROCESSING")]
    Generating,
    Completed,
    Failed,
}

impl StoreStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, StoreStatus::Completed | StoreStatus::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StoreStatus::Pending => "PENDING",
            StoreStatus::Generating => "GENERATING",
            StoreStatus::Completed => "COMPLETED",
            StoreStatus::Failed => "FAILED",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEntry {
    pub store_id: String,
    pub status: StoreStatus,
}

/// The status endpoint has two wire shapes: a bare array of entries, or the
/// same array nested under a `stores` key.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StatusReport {
    Entries(Vec<StatusEntry>),
    Nested { stores: Vec<StatusEntry> },
}

impl StatusReport {
    pub fn into_entries(self) -> Vec<StatusEntry> {
        match self {
            StatusReport::Entries(entries) => entries,
            StatusReport::Nested { stores } => stores,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    Description,
    Shipping,
    Return,
    About,
    Other,
}

impl TemplateKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TemplateKind::Description => "description",
            TemplateKind::Shipping => "shipping",
            TemplateKind::Return => "return",
            TemplateKind::About => "about",
            TemplateKind::Other => "other",
        }
    }
}

impl std::fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reusable content block applied to a set of stores.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub content: String,
    #[serde(rename = "type")]
    pub kind: TemplateKind,
    #[serde(default)]
    pub stores: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Payload for creating a template.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTemplate {
    pub name: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: TemplateKind,
    pub stores: Vec<String>,
}

/// Response of the upload endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedImage {
    pub url: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub mimetype: String,
    #[serde(default)]
    pub size: u64,
}

/// Body of the generate-all-stores request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub product_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_description: Option<String>,
}

/// Body of the single-store generate request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateStoreRequest {
    pub store_id: String,
    pub product_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    pub fn extension(self) -> &'static str {
        self.as_str()
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final state of a watch loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchOutcome {
    pub product_id: String,
    pub ticks: u64,
    /// All per-store jobs reached a terminal state.
    pub completed: bool,
    /// The optional watch cap expired before completion.
    pub timed_out: bool,
    /// Last status collection observed before the loop ended.
    pub statuses: Vec<StatusEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum WorkspaceEvent {
    WatchStarted {
        product_id: String,
    },
    StatusTick {
        tick: u64,
        entries: Vec<StatusEntry>,
    },
    GenerationFinished {
        product_id: String,
    },
    Info(InfoEvent),
}

/// Structured info events emitted by the poller and consumed by the CLI layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum InfoEvent {
    Message(String),
    StatusFetchFailed { tick: u64, error: String },
}

impl InfoEvent {
    /// Render a human-readable message for the CLI layer.
    pub fn to_message(&self) -> String {
        match self {
            InfoEvent::Message(msg) => msg.clone(),
            InfoEvent::StatusFetchFailed { tick, error } => {
                format!("Status fetch failed on tick {} ({}), retrying", tick, error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_report_accepts_bare_array() {
        let entries = serde_json::from_str::<StatusReport>(
            r#"[{"storeId":"s1","status":"GENERATING"},{"storeId":"s2","status":"COMPLETED"}]"#,
        )
        .unwrap()
        .into_entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].status, StoreStatus::Generating);
        assert_eq!(entries[1].store_id, "s2");
    }

    #[test]
    fn status_report_accepts_nested_shape() {
        let entries = serde_json::from_str::<StatusReport>(
            r#"{"stores":[{"storeId":"s1","status":"PENDING"}]}"#,
        )
        .unwrap()
        .into_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].status, StoreStatus::Pending);
    }

    #[test]
    fn processing_is_an_alias_for_generating() {
        let entry: StatusEntry =
            serde_json::from_str(r#"{"storeId":"s1","status":"PROCESSING"}"#).unwrap();
        assert_eq!(entry.status, StoreStatus::Generating);
        assert!(!entry.status.is_terminal());
    }

    #[test]
    fn product_accepts_store_products_alias() {
        let product: Product = serde_json::from_str(
            r#"{
                "id": "p1",
                "mainImageUrl": "https://cdn.example/p1.jpg",
                "storeProducts": [
                    {"storeId": "s1", "title": "Mug", "tags": ["mug"], "images": ["https://cdn.example/a.jpg"]},
                    {"store": {"id": "s2"}, "title": "", "images": []}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(product.stores.len(), 2);
        assert_eq!(product.stores[0].resolved_store_id(), "s1");
        assert_eq!(product.stores[1].resolved_store_id(), "s2");
        assert!(product.stores[0].content.is_ready());
        assert!(!product.stores[1].content.is_ready());
    }

    #[test]
    fn readiness_needs_title_and_image() {
        let mut content = StoreContent {
            title: "Handmade mug".into(),
            description: String::new(),
            tags: vec![],
            images: vec!["https://cdn.example/a.jpg".into()],
        };
        assert!(content.is_ready());

        content.images.clear();
        assert!(!content.is_ready());

        content.images.push("https://cdn.example/a.jpg".into());
        content.title = "   ".into();
        assert!(!content.is_ready());
    }
}
