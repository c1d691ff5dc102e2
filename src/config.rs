// src/config.rs
//! Конфигурация мира для хоста командной строки
//!
//! Описывает набор регионов и каталог, где хранятся их карты высот. Загружается
//! из TOML-файла.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::region::RegionCoord;

/// Один регион сетки
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegionConfig {
    /// Отображаемое имя; также имя файла карты высот в `terrain_dir`
    pub name: String,
    pub x: u32,
    pub y: u32,
}

impl RegionConfig {
    #[must_use]
    pub fn coord(&self) -> RegionCoord {
        RegionCoord::new(self.x, self.y)
    }
}

/// Конфигурация мира
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Каталог с картами высот регионов (`<name>.r32`).
    /// Относительный путь отсчитывается от каталога конфигурационного файла.
    #[serde(default = "default_terrain_dir")]
    pub terrain_dir: PathBuf,

    /// Начальная высота регионов без файла карты
    #[serde(default = "default_elevation")]
    pub default_elevation: f32,

    #[serde(default)]
    pub regions: Vec<RegionConfig>,
}

fn default_terrain_dir() -> PathBuf {
    PathBuf::from("terrain")
}
fn default_elevation() -> f32 {
    21.0
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            terrain_dir: default_terrain_dir(),
            default_elevation: default_elevation(),
            regions: Vec::new(),
        }
    }
}

impl WorldConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Загружает конфигурацию из TOML-файла
    ///
    /// # Пример
    /// ```toml
    /// # world.toml
    /// terrain_dir = "terrain"
    /// default_elevation = 21.0
    ///
    /// [[regions]]
    /// name = "Alpha"
    /// x = 1000
    /// y = 1000
    /// ```
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&contents)?;
        if config.terrain_dir.is_relative() {
            if let Some(base) = path.parent() {
                config.terrain_dir = base.join(&config.terrain_dir);
            }
        }
        Ok(config)
    }
}
