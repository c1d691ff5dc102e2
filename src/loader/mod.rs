//! Загрузчики файлов карт высот
//!
//! Формат файла определяется по расширению через [`LoaderRegistry`]. Реестр
//! является обычным значением, передаваемым в [`crate::tools::TerrainTools`], поэтому в
//! одном процессе могут жить несколько независимых сеток со своими наборами
//! загрузчиков.
//!
//! | Расширение | Загрузчик | Размеры |
//! |---|---|---|
//! | `raw` | [`LlRawLoader`] | выводятся из длины файла (13 байт на отсчёт) |
//! | `r32`, `f32` | [`Raw32Loader`] | выводятся из длины файла (4 байта на отсчёт) |
//! | `png`, `bmp`, `gif`, `tif`, `tiff` | [`ImageLoader`] | из заголовка изображения |

pub mod bitmap;
pub mod llraw;
pub mod raw32;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::error::{Result, TerrainError};
use crate::heightmap::Heightmap;

pub use bitmap::ImageLoader;
pub use llraw::LlRawLoader;
pub use raw32::Raw32Loader;

/// Чтение и запись карт высот одного формата
pub trait TerrainLoader: Send + Sync {
    /// Размер файла в регионах `(width, height)`
    fn tiling(&self, path: &Path) -> Result<(u32, u32)>;

    /// Загружает карту высот.
    ///
    /// `tiles`: размер в регионах; форматы без заголовка читают ровно столько
    /// отсчётов, форматы с заголовком его игнорируют.
    fn load(&self, path: &Path, tiles: (u32, u32)) -> Result<Heightmap>;

    fn save(&self, path: &Path, heightmap: &Heightmap) -> Result<()>;
}

/// Расширение файла в нижнем регистре, без точки
#[must_use]
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// Соответствие расширение → загрузчик
#[derive(Clone, Default)]
pub struct LoaderRegistry {
    loaders: HashMap<String, Arc<dyn TerrainLoader>>,
}

impl LoaderRegistry {
    /// Пустой реестр
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Реестр со всеми встроенными форматами
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        let raw32: Arc<dyn TerrainLoader> = Arc::new(Raw32Loader);
        registry.register_shared("r32", Arc::clone(&raw32));
        registry.register_shared("f32", raw32);
        registry.register("raw", LlRawLoader);

        let image: Arc<dyn TerrainLoader> = Arc::new(ImageLoader);
        for ext in ["png", "bmp", "gif", "tif", "tiff"] {
            registry.register_shared(ext, Arc::clone(&image));
        }

        registry
    }

    pub fn register(&mut self, extension: &str, loader: impl TerrainLoader + 'static) {
        self.register_shared(extension, Arc::new(loader));
    }

    pub fn register_shared(&mut self, extension: &str, loader: Arc<dyn TerrainLoader>) {
        let key = extension.trim_start_matches('.').to_lowercase();
        self.loaders.insert(key, loader);
    }

    #[must_use]
    pub fn is_registered(&self, path: &Path) -> bool {
        self.loaders.contains_key(&extension_of(path))
    }

    pub fn loader_for(&self, path: &Path) -> Result<&dyn TerrainLoader> {
        let ext = extension_of(path);
        self.loaders
            .get(&ext)
            .map(|loader| &**loader)
            .ok_or(TerrainError::UnknownFormat(ext))
    }

    /// Зарегистрированные расширения, по алфавиту
    #[must_use]
    pub fn extensions(&self) -> Vec<&str> {
        let mut exts: Vec<&str> = self.loaders.keys().map(String::as_str).collect();
        exts.sort_unstable();
        exts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_registry_dispatch() {
        let registry = LoaderRegistry::with_defaults();
        for name in ["a.raw", "a.r32", "a.F32", "a.png", "a.TIFF", "dir.v2/a.bmp"] {
            assert!(registry.is_registered(Path::new(name)), "{name}");
        }
        assert_eq!(
            registry.extensions(),
            vec!["bmp", "f32", "gif", "png", "r32", "raw", "tif", "tiff"]
        );
    }

    #[test]
    fn test_unknown_extension() {
        let registry = LoaderRegistry::with_defaults();
        let path = PathBuf::from("terrain.ter");
        assert!(!registry.is_registered(&path));
        assert!(matches!(
            registry.loader_for(&path),
            Err(TerrainError::UnknownFormat(ext)) if ext == "ter"
        ));
        assert!(matches!(
            registry.loader_for(Path::new("no_extension")),
            Err(TerrainError::UnknownFormat(ext)) if ext.is_empty()
        ));
    }

    #[test]
    fn test_registries_are_independent() {
        let mut custom = LoaderRegistry::new();
        custom.register(".ter", Raw32Loader);
        assert!(custom.is_registered(Path::new("x.ter")));
        assert!(!custom.is_registered(Path::new("x.png")));
        assert!(!LoaderRegistry::with_defaults().is_registered(Path::new("x.ter")));
    }
}
