//! Text summary builder for CLI output.
//!
//! Formats the workspace and its per-store results as human-readable lines.

use crate::model::{Store, StoreStatus};
use crate::workspace::Workspace;

/// Pre-formatted lines for text output.
pub(crate) struct TextSummary {
    pub lines: Vec<String>,
}

pub(crate) fn build_workspace_summary(workspace: &Workspace, stores: &[Store]) -> TextSummary {
    let mut lines = Vec::new();

    match workspace.product_id.as_deref() {
        Some(id) => lines.push(format!("Product: {}", id)),
        None => lines.push("Product: (none)".to_string()),
    }
    if let Some(image) = workspace.main_image.as_deref() {
        lines.push(format!("Image: {}", image));
    }
    if !workspace.description.trim().is_empty() {
        lines.push(format!("Description: {}", workspace.description.trim()));
    }

    for store in stores {
        let status = workspace.store_status(&store.id);
        let mut line = format!("{} [{}]: {}", store.name, store.id, status.as_str());
        if let Some(content) = workspace.results.get(&store.id) {
            if status == StoreStatus::Completed && !content.title.is_empty() {
                line.push_str(&format!(
                    " - {} ({} tags, {} images)",
                    content.title,
                    content.tags.len(),
                    content.images.len()
                ));
            }
        }
        lines.push(line);
    }

    lines.push(format!(
        "Stores: {}  Ready: {}  Images: {}",
        stores.len(),
        workspace.ready_count(stores),
        workspace.image_count()
    ));

    TextSummary { lines }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StoreContent;

    fn store(id: &str, name: &str) -> Store {
        Store {
            id: id.into(),
            name: name.into(),
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

    #[test]
    fn summary_reports_per_store_status_and_totals() {
        let mut ws = Workspace::new();
        ws.product_id = Some("p1".into());
        ws.main_image = Some("https://cdn.example/p.jpg".into());
        ws.results.insert(
            "s1".into(),
            StoreContent {
                title: "Ceramic mug".into(),
                description: "d".into(),
                tags: vec!["mug".into(), "gift".into()],
                images: vec!["u1".into(), "u2".into()],
            },
        );

        let summary =
            build_workspace_summary(&ws, &[store("s1", "Minimal Mugs"), store("s2", "Boho Bags")]);
        let text = summary.lines.join("\n");
        assert!(text.contains("Product: p1"));
        assert!(text.contains("Minimal Mugs [s1]: COMPLETED - Ceramic mug (2 tags, 2 images)"));
        assert!(text.contains("Boho Bags [s2]: PENDING"));
        assert!(text.contains("Stores: 2  Ready: 1  Images: 2"));
    }
}
