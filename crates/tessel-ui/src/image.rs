//! Named images referenced by widget content.

use std::path::{Path, PathBuf};

use tessel_core::alloc::HashMap;

/// File extensions picked up by [`ImageCatalog::scan`].
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "svg", "tga"];

/// A named image resource. Pixel data is the renderer's concern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Image {
    name: String,
    path: Option<PathBuf>,
}

impl Image {
    pub fn new(name: impl Into<String>) -> Self {
        Image {
            name: name.into(),
            path: None,
        }
    }

    pub fn with_path(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Image {
            name: name.into(),
            path: Some(path.into()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

/// Resolves image names for icon content.
pub trait ImageSource {
    fn find_image(&self, name: &str) -> Option<Image>;
}

/// In-memory image registry keyed by lowercase name.
#[derive(Debug, Default, Clone)]
pub struct ImageCatalog {
    images: HashMap<String, Image>,
}

impl ImageCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, image: Image) {
        self.images.insert(image.name().to_lowercase(), image);
    }

    /// Register every image file directly inside `dir` under its lowercase
    /// file stem. Returns the number of images added.
    pub fn scan(&mut self, dir: impl AsRef<Path>) -> std::io::Result<usize> {
        let dir = dir.as_ref();
        let mut added = 0;

        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }

            let is_image = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()));
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };

            if is_image {
                let name = stem.to_lowercase();
                self.images.insert(name.clone(), Image::with_path(name, path.clone()));
                added += 1;
            }
        }

        tracing::debug!("found {} images in {}", added, dir.display());
        Ok(added)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl ImageSource for ImageCatalog {
    fn find_image(&self, name: &str) -> Option<Image> {
        self.images.get(name).cloned()
    }
}
