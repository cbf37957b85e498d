//! Client-side CSV encoding and export file handling.
//!
//! The backend can produce export blobs itself; this module covers the
//! client-side variant that encodes already-fetched store content, plus the
//! shared file naming and writing used by both paths.

use crate::model::StoreContent;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

const HEADER: &str = "Title,Description,Tags,Image URL,Primary";

/// Quote a CSV field, doubling embedded double quotes.
fn quote(field: &str) -> String {
    let mut out = String::with_capacity(field.len() + 2);
    out.push('"');
    for ch in field.chars() {
        if ch == '"' {
            out.push('"');
        }
        out.push(ch);
    }
    out.push('"');
    out
}

/// One row per image: title, description, comma-joined tags, the image URL,
/// and a primary flag that is "1" on the first image only.
fn content_rows(content: &StoreContent, rows: &mut Vec<String>) {
    let tags = content.tags.join(", ");
    for (idx, url) in content.images.iter().enumerate() {
        let primary = if idx == 0 { "1" } else { "0" };
        rows.push(
            [
                content.title.as_str(),
                content.description.as_str(),
                tags.as_str(),
                url.as_str(),
                primary,
            ]
            .map(quote)
            .join(","),
        );
    }
}

/// Encode one store's content. `None` when there is nothing to export.
pub fn encode_store_csv(content: &StoreContent) -> Option<String> {
    encode_product_csv([content])
}

/// Encode a product's content across stores, in the given store order.
/// Stores without images contribute no rows; `None` when no store does.
pub fn encode_product_csv<'a>(
    contents: impl IntoIterator<Item = &'a StoreContent>,
) -> Option<String> {
    let mut rows = Vec::new();
    for content in contents {
        content_rows(content, &mut rows);
    }
    if rows.is_empty() {
        return None;
    }
    let mut lines = vec![HEADER.to_string()];
    lines.extend(rows);
    Some(lines.join("\n"))
}

/// Default export path in the current directory, named after the target and
/// the moment of export.
pub fn export_path(prefix: &str, id: &str, extension: &str) -> Result<PathBuf> {
    let timestamp = time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "now".into())
        .replace(':', "-")
        .replace('T', "_");
    let name = format!("{}-{}-{}.{}", prefix, id, timestamp, extension);
    let current_dir = std::env::current_dir().context("get current directory")?;
    Ok(current_dir.join(name))
}

pub fn write_export(path: &Path, data: &[u8]) -> Result<()> {
    std::fs::write(path, data).with_context(|| format!("write export to {}", path.display()))
}
