use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A picked file: enough to show a preview row and to build the upload part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub path: PathBuf,
    pub name: String,
    pub content_type: Option<String>,
    pub size: u64,
}

impl ImageFile {
    /// Stats `path`; the contents are not read until the file is submitted.
    pub fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let meta = fs::metadata(path)?;
        if !meta.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a regular file: {}", path.display()),
            ));
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        let content_type = mime_guess::from_path(path)
            .first()
            .map(|mime| mime.essence_str().to_string());

        Ok(Self {
            path: path.to_path_buf(),
            name,
            content_type,
            size: meta.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::ImageFile;
    use tempfile::TempDir;

    #[test]
    fn guesses_content_type_from_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("photo.png");
        std::fs::write(&path, [1u8, 2, 3]).unwrap();

        let file = ImageFile::from_path(&path).unwrap();
        assert_eq!(file.name, "photo.png");
        assert_eq!(file.content_type.as_deref(), Some("image/png"));
        assert_eq!(file.size, 3);
    }

    #[test]
    fn unknown_extension_has_no_content_type() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("blob.zzqx");
        std::fs::write(&path, b"data").unwrap();

        let file = ImageFile::from_path(&path).unwrap();
        assert_eq!(file.content_type, None);
    }

    #[test]
    fn directories_and_missing_files_are_rejected() {
        let dir = TempDir::new().unwrap();
        assert!(ImageFile::from_path(dir.path()).is_err());
        assert!(ImageFile::from_path(dir.path().join("missing.jpg")).is_err());
    }
}
