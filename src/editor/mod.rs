//! Canvas editing engine: scene model, geometry, hit testing and pointer interaction.

pub mod geometry;
pub mod hit_test;
pub mod interaction;
pub mod scene;
pub mod selection;
pub mod text_edit;
pub mod viewport;

pub use interaction::{
    InteractionController, InteractionError, InteractionOutcome, InteractionResult,
    InteractionSettings,
};
pub use scene::{Scene, SceneError, SceneObject};
pub use selection::{SelectionState, SelectionTarget};
pub use text_edit::{TextEditClose, TextEditDraft};
pub use viewport::{CoordinateMapper, PointerInput, ScreenPoint};
