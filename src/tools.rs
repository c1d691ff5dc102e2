//! Операции над сеткой регионов: загрузка, сохранение, разбиение, сшивка,
//! конвертация, проверка файла и масштабирование высот.
//!
//! Каждая операция сначала проверяет все предусловия (файл, формат, окно,
//! полноту сетки) и только потом меняет регионы. После изменения отправляется
//! одно пакетное уведомление в [`ChangeSink`]. Отката нет: сбой посреди
//! записи может оставить часть регионов обновлёнными.

use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::combine;
use crate::error::{Result, TerrainError};
use crate::loader::LoaderRegistry;
use crate::region::{Region, RegionCoord, RegionGrid, TileWindow};
use crate::rescale;
use crate::stitch;

/// Получатель уведомлений об изменённом рельефе.
///
/// Уведомление не атомарно с изменением: сбой между ними считается допустимым разрывом.
pub trait ChangeSink {
    fn terrain_changed(&mut self, grid: &RegionGrid, changed: &[RegionCoord]);
}

/// Только пишет в лог
#[derive(Debug, Default)]
pub struct LogSink;

impl ChangeSink for LogSink {
    fn terrain_changed(&mut self, grid: &RegionGrid, changed: &[RegionCoord]) {
        for coord in changed {
            if let Some(region) = grid.get(*coord) {
                debug!("Terrain changed in region {} at {coord}", region.name);
            }
        }
        info!("{} regions changed", changed.len());
    }
}

/// Сетка регионов вместе с реестром загрузчиков и получателем уведомлений.
///
/// Все изменяющие операции берут `&mut self`, так что структурные изменения
/// сетки не могут выполняться во время прохода сборки или сшивки.
pub struct TerrainTools<S: ChangeSink = LogSink> {
    grid: RegionGrid,
    loaders: LoaderRegistry,
    sink: S,
}

impl TerrainTools<LogSink> {
    #[must_use]
    pub fn new(grid: RegionGrid, loaders: LoaderRegistry) -> Self {
        Self::with_sink(grid, loaders, LogSink)
    }
}

impl<S: ChangeSink> TerrainTools<S> {
    #[must_use]
    pub fn with_sink(grid: RegionGrid, loaders: LoaderRegistry, sink: S) -> Self {
        Self {
            grid,
            loaders,
            sink,
        }
    }

    #[must_use]
    pub fn grid(&self) -> &RegionGrid {
        &self.grid
    }

    #[must_use]
    pub fn loaders(&self) -> &LoaderRegistry {
        &self.loaders
    }

    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn add_region(&mut self, region: Region) -> Result<()> {
        self.grid.add_region(region)
    }

    /// Загружает файл на всю сетку. Сетка должна быть полным прямоугольником
    /// того же размера, что и файл.
    pub fn load_all(&mut self, path: &Path) -> Result<TileWindow> {
        check_readable(path)?;
        let loader = self.loaders.loader_for(path)?;
        let bounds = self.grid.bounds()?;
        if !self.grid.window_complete(bounds) {
            return Err(TerrainError::NonRectangularRegionSet(bounds));
        }

        let (num_x, num_y) = loader.tiling(path)?;
        if !self.grid.dimensions_match(num_x, num_y)? {
            return Err(TerrainError::InvalidDimensions(format!(
                "file tiles {num_x}x{num_y} regions but the grid is {}x{}, consider load-part",
                bounds.num_x, bounds.num_y
            )));
        }

        let combined = loader.load(path, (num_x, num_y))?;
        let touched = combine::scatter(&mut self.grid, &combined, bounds, |x, y| {
            bounds.covers_sample(x, y)
        })?;
        info!("Loaded {} into {bounds}", path.display());
        self.notify(&touched);
        Ok(bounds)
    }

    /// Загружает файл в окно. Форматы без заголовка читаются ровно по размеру
    /// окна; из большего изображения берётся только часть окна.
    pub fn load_part(&mut self, path: &Path, window: TileWindow) -> Result<TileWindow> {
        self.check_window(window, true)?;
        check_readable(path)?;
        let loader = self.loaders.loader_for(path)?;

        let combined = loader.load(path, (window.num_x, window.num_y))?;
        let touched = combine::scatter(&mut self.grid, &combined, window, |x, y| {
            window.covers_sample(x, y)
        })?;
        info!("Loaded {} into {window}", path.display());
        self.notify(&touched);
        Ok(window)
    }

    pub fn save_all(&self, path: &Path) -> Result<TileWindow> {
        let bounds = self.grid.bounds()?;
        if !self.grid.window_complete(bounds) {
            return Err(TerrainError::NonRectangularRegionSet(bounds));
        }
        self.save_window(path, bounds)
    }

    pub fn save_part(&self, path: &Path, window: TileWindow) -> Result<TileWindow> {
        self.check_window(window, true)?;
        self.save_window(path, window)
    }

    fn save_window(&self, path: &Path, window: TileWindow) -> Result<TileWindow> {
        check_writable(path)?;
        let loader = self.loaders.loader_for(path)?;
        let combined = combine::build(&self.grid, window)?;
        loader.save(path, &combined)?;
        info!("Saved {window} to {}", path.display());
        Ok(window)
    }

    /// Сохраняет каждый регион сетки в отдельный файл `<stem>-<x>-<y>.<ext>`
    pub fn split_all(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let bounds = self.grid.bounds()?;
        self.split_window(path, bounds)
    }

    pub fn split_part(&self, path: &Path, window: TileWindow) -> Result<Vec<PathBuf>> {
        self.check_window(window, false)?;
        self.split_window(path, window)
    }

    fn split_window(&self, path: &Path, window: TileWindow) -> Result<Vec<PathBuf>> {
        check_writable(path)?;
        let loader = self.loaders.loader_for(path)?;

        let mut written = Vec::new();
        // Разбиение не требует непрерывности: отсутствующие ячейки пропускаются
        for region in self.grid.slice(window).present() {
            let target = split_path(path, region.coord);
            debug!("Writing region {} to {}", region.name, target.display());
            loader.save(&target, &region.heightmap)?;
            written.push(target);
        }
        Ok(written)
    }

    pub fn stitch_all(&mut self, width: u32) -> Result<usize> {
        let bounds = self.grid.bounds()?;
        self.stitch_window(width, bounds)
    }

    pub fn stitch_part(&mut self, width: u32, window: TileWindow) -> Result<usize> {
        self.check_window(window, false)?;
        self.stitch_window(width, window)
    }

    fn stitch_window(&mut self, width: u32, window: TileWindow) -> Result<usize> {
        let touched = stitch::stitch(&mut self.grid, window, width)?;
        self.notify(&touched);
        Ok(touched.len())
    }

    /// Переводит файл в другой формат. Сетка не меняется.
    pub fn convert(&self, from: &Path, to: &Path) -> Result<(u32, u32)> {
        check_readable(from)?;
        check_writable(to)?;
        let from_loader = self.loaders.loader_for(from)?;
        let to_loader = self.loaders.loader_for(to)?;

        let tiles = from_loader.tiling(from)?;
        let heightmap = from_loader.load(from, tiles)?;
        to_loader.save(to, &heightmap)?;
        info!("Converted {} to {}", from.display(), to.display());
        Ok(tiles)
    }

    /// Проверяет, что файл читается и покрывает целое число регионов.
    /// Возвращает его размер в регионах. Сетка не меняется.
    pub fn test_file(&self, path: &Path) -> Result<(u32, u32)> {
        check_readable(path)?;
        let loader = self.loaders.loader_for(path)?;
        let tiles = loader.tiling(path)?;
        loader.load(path, tiles)?;
        Ok(tiles)
    }

    pub fn rescale_all(&mut self, desired_min: f32, desired_max: f32) -> Result<usize> {
        let bounds = self.grid.bounds()?;
        if !self.grid.window_complete(bounds) {
            return Err(TerrainError::NonRectangularRegionSet(bounds));
        }
        self.rescale_window(bounds, desired_min, desired_max)
    }

    pub fn rescale_part(
        &mut self,
        window: TileWindow,
        desired_min: f32,
        desired_max: f32,
    ) -> Result<usize> {
        self.check_window(window, true)?;
        self.rescale_window(window, desired_min, desired_max)
    }

    fn rescale_window(
        &mut self,
        window: TileWindow,
        desired_min: f32,
        desired_max: f32,
    ) -> Result<usize> {
        let touched = rescale::rescale(&mut self.grid, window, desired_min, desired_max)?;
        self.notify(&touched);
        Ok(touched.len())
    }

    /// Окно должно лежать внутри сетки; при `complete` ещё и не иметь пустых ячеек
    fn check_window(&self, window: TileWindow, complete: bool) -> Result<()> {
        if !self.grid.window_within_bounds(window) {
            return Err(TerrainError::InvalidDimensions(format!(
                "{window} exceeds the bounds of the known regions"
            )));
        }
        if complete && !self.grid.window_complete(window) {
            return Err(TerrainError::NonRectangularRegionSet(window));
        }
        Ok(())
    }

    fn notify(&mut self, touched: &[RegionCoord]) {
        if !touched.is_empty() {
            self.sink.terrain_changed(&self.grid, touched);
        }
    }
}

/// `<dir>/<stem>.<ext>` → `<dir>/<stem>-<x>-<y>.<ext>`
#[must_use]
pub fn split_path(path: &Path, coord: RegionCoord) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}-{}-{}.{}", coord.x, coord.y, ext.to_string_lossy()),
        None => format!("{stem}-{}-{}", coord.x, coord.y),
    };
    path.with_file_name(name)
}

fn check_readable(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(TerrainError::FileNotFound(path.to_path_buf()))
    }
}

fn check_writable(path: &Path) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let readonly = std::fs::metadata(path).is_ok_and(|m| m.permissions().readonly());
    if parent.is_dir() && !path.is_dir() && !readonly {
        Ok(())
    } else {
        Err(TerrainError::CannotWrite(path.to_path_buf()))
    }
}
