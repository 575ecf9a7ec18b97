use std::path::PathBuf;

use clap::Parser;

use crate::config::EditorVariant;
use crate::editor::scene::{ScenePreset, DEFAULT_PRESET};
use crate::export::ExportFormat;

/// Compose a poster from records and uploads, then export it as a bitmap.
#[derive(Debug, Parser)]
#[command(name = "postercraft", version, about)]
pub struct Cli {
    /// Scene size preset, as `WIDTHxHEIGHT` or a preset label.
    #[arg(long, default_value_t = DEFAULT_PRESET)]
    pub preset: ScenePreset,

    /// Editor variant whose decoration and enabled kinds apply.
    #[arg(long, value_enum)]
    pub variant: Option<EditorVariant>,

    /// Directory holding `templates/<id>.json`, `profiles/<id>.json` and images.
    #[arg(long, value_name = "DIR")]
    pub records: Option<PathBuf>,

    #[arg(long, requires = "records")]
    pub template: Option<String>,

    #[arg(long, requires = "records")]
    pub profile: Option<String>,

    /// JSON array of `{ "endDate": ... }` subscriptions; without it the editor is unlocked.
    #[arg(long, value_name = "FILE")]
    pub entitlements: Option<PathBuf>,

    /// Adds a text object with this content. Repeatable.
    #[arg(long = "text", value_name = "TEXT")]
    pub texts: Vec<String>,

    #[arg(long, value_name = "FILE")]
    pub background: Option<PathBuf>,

    /// Adds an uploaded image. Repeatable.
    #[arg(long = "image", value_name = "FILE")]
    pub images: Vec<PathBuf>,

    /// Output path; the encoded bitmap is written here.
    #[arg(long, value_name = "FILE")]
    pub out: PathBuf,

    #[arg(long, value_enum, default_value_t = ExportFormat::Png)]
    pub format: ExportFormat,

    /// Seconds to wait for pending image decodes before exporting.
    #[arg(long, default_value_t = 30)]
    pub decode_timeout: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::SceneSize;

    #[test]
    fn parses_repeatable_uploads_and_preset() {
        let cli = Cli::try_parse_from([
            "postercraft",
            "--preset",
            "1080x1350",
            "--variant",
            "single-template",
            "--text",
            "Grand Opening",
            "--text",
            "Saturday",
            "--image",
            "a.png",
            "--image",
            "b.png",
            "--out",
            "poster.jpg",
            "--format",
            "jpeg",
        ])
        .expect("valid arguments");

        assert_eq!(cli.preset.size, SceneSize::new(1080, 1350));
        assert_eq!(cli.variant, Some(EditorVariant::SingleTemplate));
        assert_eq!(cli.texts, vec!["Grand Opening", "Saturday"]);
        assert_eq!(cli.images.len(), 2);
        assert_eq!(cli.format, ExportFormat::Jpeg);
    }

    #[test]
    fn rejects_unlisted_preset_and_orphan_template() {
        let unlisted = ["postercraft", "--preset", "999x999", "--out", "o.png"];
        assert!(Cli::try_parse_from(unlisted).is_err());
        let orphan = ["postercraft", "--template", "t1", "--out", "o.png"];
        assert!(Cli::try_parse_from(orphan).is_err());
    }

    #[test]
    fn defaults_to_first_preset_and_png() {
        let cli =
            Cli::try_parse_from(["postercraft", "--out", "o.png"]).expect("minimal arguments");
        assert_eq!(cli.preset, DEFAULT_PRESET);
        assert_eq!(cli.format, ExportFormat::Png);
        assert!(cli.variant.is_none());
    }
}
