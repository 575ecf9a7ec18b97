pub mod app;
pub mod cli;
pub mod config;
pub mod decode;
pub mod editor;
pub mod entitlement;
pub mod error;
pub mod export;
pub mod geometry;
pub mod input;
pub mod logging;
pub mod render;
pub mod seed;
pub mod state;
pub mod storage;
pub use error::{AppError, AppResult};

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::app::EditorSession;
use crate::cli::Cli;
use crate::decode::DecodeSource;
use crate::entitlement::{EntitlementProvider, StaticEntitlements};
use crate::geometry::CanvasPoint;
use crate::seed::DirectoryRecordSource;
use crate::storage::{DownloadSink, DownloadStorage};

const CLI_TEXT_ORIGIN: CanvasPoint = CanvasPoint::new(100.0, 100.0);
const CLI_TEXT_STEP: f64 = 60.0;

/// Entrypoint used by the CLI binding: seeds one scene, waits for decodes and writes the export.
pub fn run(cli: Cli) -> AppResult<PathBuf> {
    logging::init();
    tracing::info!(preset = %cli.preset, "starting postercraft");

    if let Some(path) = cli.entitlements.as_deref() {
        ensure_entitled(&StaticEntitlements::load(path)?)?;
    }

    let editor_config = config::load_app_config().editor_config(cli.variant);
    let mut session = EditorSession::new(editor_config, cli.preset.size);

    if let Some(root) = cli.records.as_deref() {
        let source = DirectoryRecordSource::new(root);
        session.seed_from(&source, cli.template.as_deref(), cli.profile.as_deref());
    }
    if let Some(path) = cli.background.clone() {
        session.request_background(DecodeSource::File(path));
    }
    for path in &cli.images {
        session.request_image(DecodeSource::File(path.clone()))?;
    }
    let mut y = CLI_TEXT_ORIGIN.y;
    for content in &cli.texts {
        let index = session.add_text()?;
        session.set_text_content(index, content)?;
        session.set_object_position(index, CanvasPoint::new(CLI_TEXT_ORIGIN.x, y))?;
        y += CLI_TEXT_STEP;
    }

    session.wait_for_decodes(Duration::from_secs(cli.decode_timeout));
    let bitmap = session.export(cli.format)?;
    let written = write_output(&cli.out, &bitmap.bytes)?;

    tracing::info!(
        path = %written.display(),
        width = bitmap.width,
        height = bitmap.height,
        objects = session.scene().len(),
        "export complete"
    );
    Ok(written)
}

/// The editor is unreachable without a subscription that ends after today.
pub fn ensure_entitled(provider: &dyn EntitlementProvider) -> AppResult<()> {
    let today = chrono::Local::now().date_naive();
    if provider.has_active(today) {
        Ok(())
    } else {
        tracing::warn!(%today, "no active subscription");
        Err(AppError::NotEntitled)
    }
}

fn write_output(out: &Path, bytes: &[u8]) -> AppResult<PathBuf> {
    let directory = out
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = out
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    let sink = DownloadStorage::with_dir(directory.to_path_buf());
    Ok(sink.save_download(file_name, bytes)?)
}
