use std::path::PathBuf;

use crate::text::{ImageSource, Texture};

/// Loads `<channel>.png` from a configured directory.
pub struct FileImageSource {
    dir: PathBuf,
}

impl FileImageSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ImageSource for FileImageSource {
    fn fetch(&self, name: &str) -> Result<Texture, String> {
        if name.contains('/') || name.contains('\\') || name.contains("..") {
            return Err(format!("Invalid image name '{name}'."));
        }
        let path = self.dir.join(format!("{name}.png"));
        let image = image::open(&path)
            .map_err(|e| format!("Failed to load image '{}': {e}", path.display()))?
            .to_rgba8();
        let (width, height) = image.dimensions();
        Ok(Texture::from_rgba(
            width as usize,
            height as usize,
            image.into_raw(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::FileImageSource;
    use crate::text::ImageSource;

    #[test]
    fn missing_file_is_an_error() {
        let source = FileImageSource::new("/nonexistent-dir");
        assert!(source.fetch("camera1").is_err());
    }

    #[test]
    fn path_escapes_are_rejected() {
        let source = FileImageSource::new("/tmp");
        assert!(source.fetch("../etc/passwd").is_err());
        assert!(source.fetch("a/b").is_err());
    }
}
