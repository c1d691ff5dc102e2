//! Хранилище карт высот регионов на диске
//!
//! Каждый регион хранится в `<terrain_dir>/<name>.r32`. Хранилище строит
//! сетку при запуске и служит получателем уведомлений: изменённые регионы
//! записываются обратно. Запись выполняется по возможности, ошибки только
//! логируются.

use std::path::PathBuf;

use log::{debug, warn};

use crate::config::WorldConfig;
use crate::error::Result;
use crate::heightmap::Heightmap;
use crate::loader::{Raw32Loader, TerrainLoader};
use crate::region::{Region, RegionCoord, RegionGrid};
use crate::tools::ChangeSink;

#[derive(Debug, Clone)]
pub struct RegionStore {
    terrain_dir: PathBuf,
    default_elevation: f32,
}

impl RegionStore {
    #[must_use]
    pub fn new(config: &WorldConfig) -> Self {
        Self {
            terrain_dir: config.terrain_dir.clone(),
            default_elevation: config.default_elevation,
        }
    }

    #[must_use]
    pub fn region_path(&self, name: &str) -> PathBuf {
        self.terrain_dir.join(format!("{name}.r32"))
    }

    /// Строит сетку из конфигурации: карта читается из файла, если он есть,
    /// иначе регион заполняется высотой по умолчанию.
    pub fn load_grid(&self, config: &WorldConfig) -> Result<RegionGrid> {
        let mut grid = RegionGrid::new();
        for entry in &config.regions {
            let path = self.region_path(&entry.name);
            let heightmap = if path.is_file() {
                debug!("Reading region {} from {}", entry.name, path.display());
                Raw32Loader.load(&path, (1, 1))?
            } else {
                Heightmap::region(self.default_elevation)
            };
            grid.add_region(Region::new(entry.coord(), entry.name.clone(), heightmap))?;
        }
        Ok(grid)
    }

    fn persist(&self, region: &Region) -> Result<()> {
        std::fs::create_dir_all(&self.terrain_dir)?;
        Raw32Loader.save(&self.region_path(&region.name), &region.heightmap)
    }
}

impl ChangeSink for RegionStore {
    fn terrain_changed(&mut self, grid: &RegionGrid, changed: &[RegionCoord]) {
        for coord in changed {
            let Some(region) = grid.get(*coord) else {
                continue;
            };
            match self.persist(region) {
                Ok(()) => debug!("Persisted region {} at {coord}", region.name),
                Err(e) => warn!("Failed to persist region {}: {e}", region.name),
            }
        }
    }
}
