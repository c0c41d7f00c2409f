use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use walkdir::WalkDir;

/// Filesystem layout for detection data, one folder per video URI.
///
/// All writes are whole-document replace; the folder tree is the sole
/// durable store. Concurrent invocations against the same root are
/// unsupported and may race.
#[derive(Debug, Clone)]
pub struct DataStore {
    root: PathBuf,
}

impl DataStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Folder for a given video URI, derived by escaping the locator.
    pub fn folder_for(&self, uri: &str) -> PathBuf {
        self.root.join(escape_uri(uri))
    }

    pub async fn ensure_folder(&self, uri: &str) -> Result<PathBuf> {
        let folder = self.folder_for(uri);
        fs::create_dir_all(&folder)
            .await
            .with_context(|| format!("failed to create data folder {}", folder.display()))?;
        Ok(folder)
    }

    /// All persisted shot-list files under the URI folder whose name
    /// starts with `prefix` (`original_` or `corrected_`), sorted.
    pub fn find_lists(&self, uri: &str, prefix: &str) -> Vec<PathBuf> {
        let folder = self.folder_for(uri);
        let mut files: Vec<PathBuf> = WalkDir::new(&folder)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| {
                model_stem(path, prefix).is_some()
                    && path.extension().map_or(false, |ext| ext == "json")
            })
            .collect();
        files.sort();
        files
    }

    pub fn original_path(&self, uri: &str, model: &str) -> PathBuf {
        self.folder_for(uri)
            .join(format!("original_{}.json", escape_model(model)))
    }

    pub fn overlay_path(&self, uri: &str, model_escaped: &str) -> PathBuf {
        self.folder_for(uri)
            .join(format!("OVERLAY_{}.txt", model_escaped))
    }

    pub fn corrected_path(&self, uri: &str, model_escaped: &str) -> PathBuf {
        self.folder_for(uri)
            .join(format!("corrected_{}.json", model_escaped))
    }

    pub fn preview_path(&self, uri: &str, model_escaped: &str) -> PathBuf {
        self.folder_for(uri)
            .join(format!("preview_{}.ass", model_escaped))
    }

    pub fn export_path(&self, uri: &str) -> PathBuf {
        self.folder_for(uri).join("buckets.csv")
    }
}

/// `gs://bucket/path/video.mp4` → `gs--bucket--path--video.mp4`
pub fn escape_uri(uri: &str) -> String {
    uri.replace("gs://", "gs--").replace('/', "--")
}

/// Model names carry `/`; escaped with `-` for use in file names.
pub fn escape_model(model: &str) -> String {
    model.replace('/', "-")
}

/// Lossy inverse of [`escape_model`], for display only.
pub fn unescape_model(escaped: &str) -> String {
    escaped.replace('-', "/")
}

/// Extract the escaped model name from a persisted file name, e.g.
/// `original_builtin-stable.json` with prefix `original_` yields
/// `builtin-stable`.
pub fn model_stem(path: &Path, prefix: &str) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    stem.strip_prefix(prefix).map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_uri() {
        assert_eq!(
            escape_uri("gs://bucket/videos/clip.mp4"),
            "gs--bucket--videos--clip.mp4"
        );
        assert_eq!(escape_uri("plain.mp4"), "plain.mp4");
    }

    #[test]
    fn test_model_escaping() {
        assert_eq!(escape_model("builtin/stable"), "builtin-stable");
        assert_eq!(unescape_model("builtin-stable"), "builtin/stable");
    }

    #[test]
    fn test_model_stem() {
        let path = Path::new("/data/x/original_builtin-stable.json");
        assert_eq!(
            model_stem(path, "original_").as_deref(),
            Some("builtin-stable")
        );
        assert_eq!(model_stem(path, "corrected_"), None);
    }

    #[test]
    fn test_paths_share_folder() {
        let store = DataStore::new(PathBuf::from("./data"));
        let uri = "gs://bucket/clip.mp4";

        let original = store.original_path(uri, "builtin/stable");
        assert!(original.ends_with("gs--bucket--clip.mp4/original_builtin-stable.json"));

        let overlay = store.overlay_path(uri, "builtin-stable");
        assert!(overlay.ends_with("gs--bucket--clip.mp4/OVERLAY_builtin-stable.txt"));
    }
}
