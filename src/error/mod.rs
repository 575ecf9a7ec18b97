use crate::config::ConfigError;
use crate::decode::DecodeError;
use crate::editor::scene::{PresetParseError, SceneError};
use crate::editor::InteractionError;
use crate::entitlement::EntitlementError;
use crate::export::{ExportError, ShareError};
use crate::render::RenderError;
use crate::seed::RecordError;
use crate::state::StateError;
use crate::storage::StorageError;
use thiserror::Error;

pub type AppResult<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error(transparent)]
    Interaction(#[from] InteractionError),
    #[error(transparent)]
    Preset(#[from] PresetParseError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Share(#[from] ShareError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Record(#[from] RecordError),
    #[error(transparent)]
    Entitlement(#[from] EntitlementError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("no active subscription; the editor is locked")]
    NotEntitled,
}
