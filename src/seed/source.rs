use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;

use super::record::{ProfileRecord, TemplateRecord};

const TEMPLATES_DIR: &str = "templates";
const PROFILES_DIR: &str = "profiles";
const FILE_URL_PREFIX: &str = "file://";

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("record id is empty or not a plain name: {0:?}")]
    InvalidId(String),
    #[error("failed to read record {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse record {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("unsupported image location: {0}")]
    UnsupportedUrl(String),
}

pub type RecordResult<T> = std::result::Result<T, RecordError>;

/// Read-only access to template/profile records and the images they reference.
pub trait RecordSource {
    fn template(&self, id: &str) -> RecordResult<TemplateRecord>;
    fn profile(&self, id: &str) -> RecordResult<ProfileRecord>;
    fn image_bytes(&self, url: &str) -> RecordResult<Vec<u8>>;
}

/// Records laid out as `<root>/templates/<id>.json` and `<root>/profiles/<id>.json`.
#[derive(Debug, Clone)]
pub struct DirectoryRecordSource {
    root: PathBuf,
}

impl DirectoryRecordSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, dir: &str, id: &str) -> RecordResult<PathBuf> {
        if id.is_empty() || id.contains(['/', '\\']) || id.starts_with('.') {
            return Err(RecordError::InvalidId(id.to_string()));
        }
        Ok(self.root.join(dir).join(format!("{id}.json")))
    }

    fn resolve_image_path(&self, url: &str) -> RecordResult<PathBuf> {
        let location = url.strip_prefix(FILE_URL_PREFIX).unwrap_or(url);
        if location.contains("://") {
            return Err(RecordError::UnsupportedUrl(url.to_string()));
        }
        let path = Path::new(location);
        Ok(if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        })
    }
}

fn read_json<T: DeserializeOwned>(path: PathBuf) -> RecordResult<T> {
    let contents = std::fs::read_to_string(&path).map_err(|source| RecordError::Read {
        path: path.clone(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| RecordError::Parse { path, source })
}

impl RecordSource for DirectoryRecordSource {
    fn template(&self, id: &str) -> RecordResult<TemplateRecord> {
        read_json(self.record_path(TEMPLATES_DIR, id)?)
    }

    fn profile(&self, id: &str) -> RecordResult<ProfileRecord> {
        read_json(self.record_path(PROFILES_DIR, id)?)
    }

    fn image_bytes(&self, url: &str) -> RecordResult<Vec<u8>> {
        let path = self.resolve_image_path(url)?;
        std::fs::read(&path).map_err(|source| RecordError::Read { path, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_root(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("postercraft-records-{name}-{}", std::process::id()))
    }

    #[test]
    fn reads_records_and_relative_images_from_root() {
        let root = scratch_root("read");
        std::fs::create_dir_all(root.join(TEMPLATES_DIR)).expect("templates dir");
        std::fs::create_dir_all(root.join(PROFILES_DIR)).expect("profiles dir");
        std::fs::write(
            root.join(TEMPLATES_DIR).join("t1.json"),
            r#"{"title":"Launch","designData":{}}"#,
        )
        .expect("write template");
        std::fs::write(
            root.join(PROFILES_DIR).join("u1.json"),
            r#"{"name":"Asha","profileImage":"file://avatar.bin"}"#,
        )
        .expect("write profile");
        std::fs::write(root.join("avatar.bin"), [7_u8, 8, 9]).expect("write image");

        let source = DirectoryRecordSource::new(&root);
        let template = source.template("t1").expect("template");
        let profile = source.profile("u1").expect("profile");
        let bytes = source
            .image_bytes(profile.profile_image.as_deref().unwrap_or_default())
            .expect("image bytes");

        assert_eq!(template.title.as_deref(), Some("Launch"));
        assert_eq!(profile.name.as_deref(), Some("Asha"));
        assert_eq!(bytes, vec![7, 8, 9]);
        let _ = std::fs::remove_dir_all(root);
    }

    #[test]
    fn rejects_traversal_ids_and_remote_urls() {
        let source = DirectoryRecordSource::new("/tmp");
        assert!(matches!(
            source.template("../secrets"),
            Err(RecordError::InvalidId(_))
        ));
        assert!(matches!(
            source.image_bytes("https://example.com/a.png"),
            Err(RecordError::UnsupportedUrl(_))
        ));
        assert!(matches!(
            source.profile("missing"),
            Err(RecordError::Read { .. })
        ));
    }
}
