use anyhow::{bail, Context, Result};
use glob::{glob, Pattern};
use image::ImageFormat;
use std::path::{Path, PathBuf};

/// A local image and the object key it is uploaded to.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalImage {
    pub path: PathBuf,
    pub key: String,
    pub content_type: &'static str,
}

/// Lists the image files directly inside `dir`, keyed under `prefix`.
/// Files whose extension is not a known image format are skipped.
pub fn local_images(dir: &Path, prefix: &str) -> Result<Vec<LocalImage>> {
    if !dir.is_dir() {
        bail!("error reading directory {}: not a directory", dir.display());
    }
    let dir_str = dir
        .to_str()
        .with_context(|| format!("non utf-8 path {}", dir.display()))?;
    let pattern = format!("{}/*", Pattern::escape(dir_str));

    let mut images = Vec::new();
    for path in glob(&pattern)?.filter_map(Result::ok) {
        if !path.is_file() {
            continue;
        }
        let Ok(format) = ImageFormat::from_path(&path) else {
            tracing::debug!(path = %path.display(), "skipping non image file");
            continue;
        };
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        images.push(LocalImage {
            key: object_key(prefix, name),
            content_type: format.to_mime_type(),
            path,
        });
    }
    Ok(images)
}

pub fn object_key(prefix: &str, name: &str) -> String {
    format!("{}/{}", prefix.trim_end_matches('/'), name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_only_images() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("alice_1.jpg"), b"x").unwrap();
        std::fs::write(dir.path().join("bob_1.png"), b"x").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        std::fs::create_dir(dir.path().join("nested.jpg")).unwrap();

        let mut images = local_images(dir.path(), "reference").unwrap();
        images.sort_by(|a, b| a.key.cmp(&b.key));

        let keys: Vec<_> = images.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(keys, ["reference/alice_1.jpg", "reference/bob_1.png"]);
        assert_eq!(images[0].content_type, "image/jpeg");
        assert_eq!(images[1].content_type, "image/png");
    }

    #[test]
    fn missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(local_images(&dir.path().join("absent"), "input").is_err());
    }

    #[test]
    fn key_has_single_separator() {
        assert_eq!(object_key("input/", "group.jpg"), "input/group.jpg");
        assert_eq!(object_key("input", "group.jpg"), "input/group.jpg");
    }
}
