use crate::api::{ApiClient, ExportScope};
use crate::model::{
    ClientConfig, ExportFormat, NewStore, NewTemplate, StoreStatus, TemplateKind, WorkspaceEvent,
};
use crate::notify::{StoreChange, StoreDirectory, StoreEvents};
use crate::workspace::{Workspace, WorkspaceError};
use crate::{export, storage, summary};
use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use rand::RngCore;
use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Output line routing for the stdout/stderr writer.
enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Spawn a blocking writer so async tasks never block on terminal output.
fn spawn_output_writer() -> (
    mpsc::UnboundedSender<OutputLine>,
    tokio::task::JoinHandle<()>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel::<OutputLine>();
    let handle = tokio::task::spawn_blocking(move || {
        let stdout = std::io::stdout();
        let stderr = std::io::stderr();
        let mut out = std::io::LineWriter::new(stdout.lock());
        let mut err = std::io::LineWriter::new(stderr.lock());
        while let Some(line) = rx.blocking_recv() {
            let _ = match line {
                OutputLine::Stdout(msg) => writeln!(out, "{}", msg),
                OutputLine::Stderr(msg) => writeln!(err, "{}", msg),
            };
        }
        let _ = out.flush();
        let _ = err.flush();
    });
    (tx, handle)
}

#[derive(Debug, Parser)]
#[command(
    name = "multilister",
    version,
    about = "Multi-store listing manager frontend"
)]
pub struct Cli {
    /// Base URL of the listing-manager backend
    #[arg(
        long,
        global = true,
        env = "MULTILISTER_API_URL",
        default_value = "http://localhost:8000"
    )]
    pub base_url: String,

    /// Generation status poll interval
    #[arg(long, global = true, default_value = "3s")]
    pub poll_interval: humantime::Duration,

    /// Give up watching after this long (unset: wait indefinitely)
    #[arg(long, global = true)]
    pub watch_timeout: Option<humantime::Duration>,

    /// Timeout for a single status request in milliseconds
    #[arg(long, global = true, default_value_t = 10_000)]
    pub status_timeout_ms: u64,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress progress output on stderr
    #[arg(long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage destination stores
    Stores {
        #[command(subcommand)]
        action: StoreAction,
    },
    /// Manage content templates
    Templates {
        #[command(subcommand)]
        action: TemplateAction,
    },
    /// Upload a product photo and set it as the workspace image
    Upload {
        #[arg(required_unless_present = "clear")]
        path: Option<PathBuf>,
        /// Remove the workspace image instead of uploading one
        #[arg(long, conflicts_with = "path")]
        clear: bool,
    },
    /// Start content generation for the workspace product
    Generate {
        /// Generate for a single store instead of all stores
        #[arg(long)]
        store: Option<String>,
        /// Free-text product description passed to the generator
        #[arg(long)]
        description: Option<String>,
        /// Start the job without waiting for completion
        #[arg(long)]
        no_watch: bool,
    },
    /// Watch an in-flight generation job until it finishes
    Watch,
    /// Fetch the current generation status once
    Status,
    /// Show the workspace product with its per-store results
    Show,
    /// List recent products
    History {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Delete a product from history
    Delete { id: String },
    /// Export generated content as CSV or JSON
    Export {
        #[command(subcommand)]
        target: ExportCmd,
    },
    /// Clear the local workspace and start a new product
    Reset,
}

#[derive(Debug, Subcommand)]
pub enum StoreAction {
    /// List configured stores
    List,
    /// Add a store
    Add {
        name: String,
        #[arg(long, default_value = "")]
        concept: String,
        #[arg(long, default_value_t = 3)]
        image_count: u32,
        #[arg(long)]
        has_infographic: bool,
        #[arg(long)]
        has_video: bool,
    },
    /// Update a store
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        concept: Option<String>,
        #[arg(long)]
        image_count: Option<u32>,
        #[arg(long)]
        has_infographic: Option<bool>,
        #[arg(long)]
        has_video: Option<bool>,
    },
    /// Remove a store
    Remove { id: String },
}

#[derive(Debug, Subcommand)]
pub enum TemplateAction {
    /// List templates, optionally filtered by kind
    List {
        #[arg(long, value_enum)]
        kind: Option<TemplateKind>,
    },
    /// Add a template
    Add {
        name: String,
        /// Template text (or use --file)
        #[arg(long)]
        content: Option<String>,
        /// Read the template text from a file
        #[arg(long, conflicts_with = "content")]
        file: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = TemplateKind::Other)]
        kind: TemplateKind,
        /// Store ids this template applies to (repeatable)
        #[arg(long = "store")]
        stores: Vec<String>,
    },
    /// Update a template
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long, value_enum)]
        kind: Option<TemplateKind>,
    },
    /// Remove a template
    Remove { id: String },
}

#[derive(Debug, Subcommand)]
pub enum ExportCmd {
    /// Export the workspace product across all its stores
    Product {
        /// Encode locally from fetched content instead of asking the backend
        #[arg(long)]
        local: bool,
        #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Export one store's content for the workspace product
    Store {
        id: String,
        #[arg(long)]
        local: bool,
        #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Export every store via the backend
    All {
        #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Generate a random id identifying this CLI session.
fn gen_session_id() -> String {
    let mut b = [0u8; 8];
    rand::thread_rng().fill_bytes(&mut b);
    u64::from_le_bytes(b).to_string()
}

/// Build a `ClientConfig` from CLI arguments.
pub fn build_config(args: &Cli) -> ClientConfig {
    ClientConfig {
        base_url: args.base_url.clone(),
        session_id: gen_session_id(),
        poll_interval: Duration::from(args.poll_interval),
        watch_timeout: args.watch_timeout.map(Duration::from),
        status_timeout_ms: args.status_timeout_ms,
        user_agent: format!("multilister-cli/{}", env!("CARGO_PKG_VERSION")),
    }
}

pub async fn run(args: Cli) -> Result<()> {
    let cfg = build_config(&args);
    let api = ApiClient::new(&cfg)?;
    let events = StoreEvents::new();
    let json = args.json;
    let quiet = args.quiet;

    match args.command {
        Command::Stores { action } => run_stores(&api, &events, action, json).await,
        Command::Templates { action } => run_templates(&api, action, json).await,
        Command::Upload { path, clear } => run_upload(&api, path, clear).await,
        Command::Generate {
            store,
            description,
            no_watch,
        } => run_generate(&api, &cfg, &events, store, description, no_watch, json, quiet).await,
        Command::Watch => run_watch(&api, &cfg, &events, json, quiet).await,
        Command::Status => run_status(&api, &cfg, json).await,
        Command::Show => run_show(&api, &events, json).await,
        Command::History { limit } => run_history(&api, limit, json).await,
        Command::Delete { id } => run_delete(&api, &id).await,
        Command::Export { target } => run_export(&api, &cfg, target).await,
        Command::Reset => run_reset(),
    }
}

/// Mutating commands are gated on backend reachability.
async fn ensure_online(api: &ApiClient) -> Result<()> {
    if api.health().await {
        Ok(())
    } else {
        Err(WorkspaceError::BackendOffline.into())
    }
}

fn print_store_lines(directory: &StoreDirectory) {
    for store in directory.stores() {
        let mut extras = vec![format!("{} images", store.image_count)];
        if store.has_infographic {
            extras.push("infographic".into());
        }
        if store.has_video {
            extras.push("video".into());
        }
        let concept = if store.concept.is_empty() {
            "no concept"
        } else {
            store.concept.as_str()
        };
        println!("{} [{}]: {} ({})", store.name, store.id, concept, extras.join(", "));
    }
}

async fn run_stores(
    api: &ApiClient,
    events: &StoreEvents,
    action: StoreAction,
    json: bool,
) -> Result<()> {
    match action {
        StoreAction::List => {
            let directory = StoreDirectory::load(api, events).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(directory.stores())?);
            } else if directory.stores().is_empty() {
                println!("No stores configured.");
            } else {
                print_store_lines(&directory);
            }
        }
        StoreAction::Add {
            name,
            concept,
            image_count,
            has_infographic,
            has_video,
        } => {
            ensure_online(api).await?;
            let mut directory = StoreDirectory::load(api, events).await?;
            let store = api
                .create_store(&NewStore {
                    name,
                    concept,
                    image_count,
                    has_infographic,
                    has_video,
                    ..NewStore::default()
                })
                .await?;
            events.publish(StoreChange::Created);
            directory.refresh_if_notified(api).await?;
            eprintln!("Added store {} [{}]", store.name, store.id);
            print_store_lines(&directory);
        }
        StoreAction::Update {
            id,
            name,
            concept,
            image_count,
            has_infographic,
            has_video,
        } => {
            ensure_online(api).await?;
            let mut patch = serde_json::Map::new();
            if let Some(name) = name {
                patch.insert("name".into(), name.into());
            }
            if let Some(concept) = concept {
                patch.insert("concept".into(), concept.into());
            }
            if let Some(n) = image_count {
                patch.insert("imageCount".into(), n.into());
            }
            if let Some(v) = has_infographic {
                patch.insert("hasInfographic".into(), v.into());
            }
            if let Some(v) = has_video {
                patch.insert("hasVideo".into(), v.into());
            }
            if patch.is_empty() {
                bail!("nothing to update; pass at least one field flag");
            }
            let store = api.update_store(&id, &patch.into()).await?;
            events.publish(StoreChange::Updated);
            eprintln!("Updated store {} [{}]", store.name, store.id);
        }
        StoreAction::Remove { id } => {
            ensure_online(api).await?;
            api.delete_store(&id).await?;
            events.publish(StoreChange::Removed);
            eprintln!("Removed store {}", id);
        }
    }
    Ok(())
}

async fn run_templates(api: &ApiClient, action: TemplateAction, json: bool) -> Result<()> {
    match action {
        TemplateAction::List { kind } => {
            let templates = api.list_templates(kind).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&templates)?);
            } else if templates.is_empty() {
                println!("No templates.");
            } else {
                for t in templates {
                    println!(
                        "{} [{}]: {} ({} stores)",
                        t.name,
                        t.id,
                        t.kind.as_str(),
                        t.stores.len()
                    );
                }
            }
        }
        TemplateAction::Add {
            name,
            content,
            file,
            kind,
            stores,
        } => {
            ensure_online(api).await?;
            let content = match (content, file) {
                (Some(text), None) => text,
                (None, Some(path)) => tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("read template from {}", path.display()))?,
                _ => bail!("template text required; pass --content or --file"),
            };
            let template = api
                .create_template(&NewTemplate {
                    name,
                    content,
                    kind,
                    stores,
                })
                .await?;
            eprintln!("Added template {} [{}]", template.name, template.id);
        }
        TemplateAction::Update {
            id,
            name,
            content,
            kind,
        } => {
            ensure_online(api).await?;
            let mut patch = serde_json::Map::new();
            if let Some(name) = name {
                patch.insert("name".into(), name.into());
            }
            if let Some(content) = content {
                patch.insert("content".into(), content.into());
            }
            if let Some(kind) = kind {
                patch.insert("type".into(), kind.as_str().into());
            }
            if patch.is_empty() {
                bail!("nothing to update; pass at least one field flag");
            }
            let template = api.update_template(&id, &patch.into()).await?;
            eprintln!("Updated template {} [{}]", template.name, template.id);
        }
        TemplateAction::Remove { id } => {
            ensure_online(api).await?;
            api.delete_template(&id).await?;
            eprintln!("Removed template {}", id);
        }
    }
    Ok(())
}

async fn run_upload(api: &ApiClient, path: Option<PathBuf>, clear: bool) -> Result<()> {
    let mut workspace = storage::load_workspace()?;
    if clear {
        workspace.set_main_image(api, None).await;
        storage::save_workspace(&workspace)?;
        println!("Workspace image cleared.");
        return Ok(());
    }

    let path = path.ok_or_else(|| anyhow!("a file path is required"))?;
    ensure_online(api).await?;
    let uploaded = api.upload(&path).await?;
    workspace.set_main_image(api, Some(uploaded.url.clone())).await;
    storage::save_workspace(&workspace)?;
    println!("{}", uploaded.url);
    if let Some(id) = &workspace.product_id {
        eprintln!("Image set on product {}", id);
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn run_generate(
    api: &ApiClient,
    cfg: &ClientConfig,
    events: &StoreEvents,
    store: Option<String>,
    description: Option<String>,
    no_watch: bool,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let mut workspace = storage::load_workspace()?;
    if let Some(description) = description {
        workspace.set_description(description);
    }
    // The image precondition comes first so it aborts before any network
    // traffic, including the store fetch below.
    if workspace.main_image.is_none() {
        return Err(WorkspaceError::NoImage.into());
    }

    let directory = StoreDirectory::load(api, events).await?;
    match &store {
        Some(id) => {
            let store = directory
                .find(id)
                .ok_or_else(|| anyhow!("unknown store: {}", id))?;
            workspace.start_generation_for_store(api, store).await?;
        }
        None => {
            workspace
                .start_generation(api, directory.stores())
                .await?;
        }
    }
    storage::save_workspace(&workspace)?;

    let product_id = workspace
        .product_id
        .clone()
        .unwrap_or_else(|| "(unknown)".into());
    if no_watch {
        eprintln!(
            "Generation started for product {}; run `multilister watch` to follow it.",
            product_id
        );
        return Ok(());
    }
    watch_and_report(api, cfg, &mut workspace, &directory, json, quiet).await
}

async fn run_watch(
    api: &ApiClient,
    cfg: &ClientConfig,
    events: &StoreEvents,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let mut workspace = storage::load_workspace()?;
    if workspace.product_id.is_none() {
        return Err(WorkspaceError::NoProduct.into());
    }
    if !workspace.generating {
        eprintln!("No generation in progress for the current workspace.");
        return Ok(());
    }
    let directory = StoreDirectory::load(api, events).await?;
    watch_and_report(api, cfg, &mut workspace, &directory, json, quiet).await
}

/// Drive the watch loop, rendering progress events as they arrive, then
/// report the outcome.
async fn watch_and_report(
    api: &ApiClient,
    cfg: &ClientConfig,
    workspace: &mut Workspace,
    directory: &StoreDirectory,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let (out_tx, out_handle) = spawn_output_writer();
    let (evt_tx, evt_rx) = mpsc::unbounded_channel::<WorkspaceEvent>();

    // The signal task only flips the flag; holding a sender here would keep
    // the event channel open after the watch ends.
    let cancel = Arc::new(AtomicBool::new(false));
    let flag = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            flag.store(true, Ordering::Relaxed);
        }
    });

    // Run the watch loop and the event renderer concurrently; the renderer
    // drains until the watch side drops its sender.
    let watch = async {
        let outcome = workspace
            .watch_until_complete(api, cfg, &evt_tx, cancel)
            .await;
        drop(evt_tx);
        outcome
    };
    let (outcome, ()) = futures::join!(watch, render_events(evt_rx, out_tx.clone(), quiet));
    let outcome = outcome?;

    storage::save_workspace(workspace)?;

    if json {
        let _ = out_tx.send(OutputLine::Stdout(serde_json::to_string_pretty(&outcome)?));
    } else if outcome.completed {
        for line in summary::build_workspace_summary(workspace, directory.stores()).lines {
            let _ = out_tx.send(OutputLine::Stdout(line));
        }
    } else if outcome.timed_out {
        let _ = out_tx.send(OutputLine::Stderr(
            "Watch timed out; the job may still be running. Re-run `multilister watch`.".into(),
        ));
    } else {
        let _ = out_tx.send(OutputLine::Stderr("Watch cancelled.".into()));
    }

    drop(out_tx);
    let _ = out_handle.await;
    Ok(())
}

/// Render workspace events on stderr, reporting each store's status once per
/// transition.
async fn render_events(
    mut rx: mpsc::UnboundedReceiver<WorkspaceEvent>,
    out_tx: mpsc::UnboundedSender<OutputLine>,
    quiet: bool,
) {
    let mut last: HashMap<String, StoreStatus> = HashMap::new();
    while let Some(ev) = rx.recv().await {
        if quiet {
            continue;
        }
        match ev {
            WorkspaceEvent::WatchStarted { product_id } => {
                let _ = out_tx.send(OutputLine::Stderr(format!(
                    "Watching generation for product {}",
                    product_id
                )));
            }
            WorkspaceEvent::StatusTick { entries, .. } => {
                for entry in entries {
                    if last.get(&entry.store_id) != Some(&entry.status) {
                        let _ = out_tx.send(OutputLine::Stderr(format!(
                            "{}: {}",
                            entry.store_id,
                            entry.status.as_str()
                        )));
                        last.insert(entry.store_id, entry.status);
                    }
                }
            }
            WorkspaceEvent::GenerationFinished { .. } => {
                let _ = out_tx.send(OutputLine::Stderr(
                    "All stores reached a terminal state".into(),
                ));
            }
            WorkspaceEvent::Info(info) => {
                let _ = out_tx.send(OutputLine::Stderr(info.to_message()));
            }
        }
    }
}

async fn run_status(api: &ApiClient, cfg: &ClientConfig, json: bool) -> Result<()> {
    let workspace = storage::load_workspace()?;
    let product_id = workspace.product_id.ok_or(WorkspaceError::NoProduct)?;
    let entries = api
        .generation_status(&product_id, cfg.status_timeout_ms)
        .await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else if entries.is_empty() {
        println!("No status entries yet for product {}", product_id);
    } else {
        let terminal = entries.iter().filter(|e| e.status.is_terminal()).count();
        for entry in &entries {
            println!("{}: {}", entry.store_id, entry.status.as_str());
        }
        println!("{}/{} stores terminal", terminal, entries.len());
    }
    Ok(())
}

async fn run_show(api: &ApiClient, events: &StoreEvents, json: bool) -> Result<()> {
    let mut workspace = storage::load_workspace()?;
    let product_id = workspace
        .product_id
        .clone()
        .ok_or(WorkspaceError::NoProduct)?;
    let product = api.get_product(&product_id).await?;
    workspace.apply_product(&product);
    storage::save_workspace(&workspace)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&product)?);
        return Ok(());
    }
    let directory = StoreDirectory::load(api, events).await?;
    for line in summary::build_workspace_summary(&workspace, directory.stores()).lines {
        println!("{}", line);
    }
    Ok(())
}

async fn run_history(api: &ApiClient, limit: usize, json: bool) -> Result<()> {
    let mut products = api.list_products().await?;
    products.truncate(limit);
    if json {
        println!("{}", serde_json::to_string_pretty(&products)?);
        return Ok(());
    }
    if products.is_empty() {
        println!("No products yet.");
        return Ok(());
    }
    for product in &products {
        let images: usize = product.stores.iter().map(|s| s.content.images.len()).sum();
        let ready = product
            .stores
            .iter()
            .filter(|s| s.content.is_ready())
            .count();
        println!(
            "{}  {}  {} stores, {} ready, {} images",
            product.id,
            product.created_at.as_deref().unwrap_or("-"),
            product.stores.len(),
            ready,
            images
        );
    }
    Ok(())
}

/// Delete a remote product. The local workspace is cleared too when it was
/// pointing at the deleted record.
async fn run_delete(api: &ApiClient, id: &str) -> Result<()> {
    ensure_online(api).await?;
    api.delete_product(id).await?;
    let mut workspace = storage::load_workspace()?;
    if workspace.product_id.as_deref() == Some(id) {
        workspace.reset();
        storage::save_workspace(&workspace)?;
    }
    eprintln!("Deleted product {}", id);
    Ok(())
}

async fn run_export(api: &ApiClient, cfg: &ClientConfig, target: ExportCmd) -> Result<()> {
    match target {
        ExportCmd::Product { local, format, out } => {
            let workspace = storage::load_workspace()?;
            let product_id = workspace
                .product_id
                .clone()
                .ok_or(WorkspaceError::NoProduct)?;
            if local {
                if format != ExportFormat::Csv {
                    bail!("local export only produces CSV");
                }
                // Encode from the content already in the workspace, in store
                // id order; stores without a single image contribute nothing.
                let mut contents: Vec<_> = workspace.results.iter().collect();
                contents.sort_by(|a, b| a.0.cmp(b.0));
                let Some(csv) =
                    export::encode_product_csv(contents.into_iter().map(|(_, c)| c))
                else {
                    eprintln!("Nothing to export yet for product {}", product_id);
                    return Ok(());
                };
                let path = match out {
                    Some(path) => path,
                    None => export::export_path("product", &product_id, "csv")?,
                };
                export::write_export(&path, csv.as_bytes())?;
                println!("{}", path.display());
            } else {
                let blob = api.export(ExportScope::Product(&product_id), format).await?;
                let path = match out {
                    Some(path) => path,
                    None => export::export_path("product", &product_id, format.extension())?,
                };
                export::write_export(&path, &blob)?;
                println!("{}", path.display());
            }
        }
        ExportCmd::Store {
            id,
            local,
            format,
            out,
        } => {
            if local {
                if format != ExportFormat::Csv {
                    bail!("local export only produces CSV");
                }
                let workspace = storage::load_workspace()?;
                let Some(csv) = workspace.results.get(&id).and_then(export::encode_store_csv)
                else {
                    eprintln!("Nothing to export yet for store {}", id);
                    return Ok(());
                };
                let path = match out {
                    Some(path) => path,
                    None => export::export_path("store", &id, "csv")?,
                };
                export::write_export(&path, csv.as_bytes())?;
                println!("{}", path.display());
            } else {
                let blob = api.export(ExportScope::Store(&id), format).await?;
                let path = match out {
                    Some(path) => path,
                    None => export::export_path("store", &id, format.extension())?,
                };
                export::write_export(&path, &blob)?;
                println!("{}", path.display());
            }
        }
        ExportCmd::All { format, out } => {
            let blob = api.export(ExportScope::All, format).await?;
            let path = match out {
                Some(path) => path,
                None => export::export_path("all", &cfg.session_id, format.extension())?,
            };
            export::write_export(&path, &blob)?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

fn run_reset() -> Result<()> {
    let mut workspace = storage::load_workspace()?;
    workspace.reset();
    storage::save_workspace(&workspace)?;
    println!("Workspace cleared.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn build_config_carries_durations_through() {
        let args = Cli::parse_from([
            "multilister",
            "--poll-interval",
            "500ms",
            "--watch-timeout",
            "2m",
            "status",
        ]);
        let cfg = build_config(&args);
        assert_eq!(cfg.poll_interval, Duration::from_millis(500));
        assert_eq!(cfg.watch_timeout, Some(Duration::from_secs(120)));
        assert!(cfg.user_agent.starts_with("multilister-cli/"));
    }

    #[test]
    fn session_ids_are_distinct() {
        assert_ne!(gen_session_id(), gen_session_id());
    }
}
