//! Объединённая карта высот окна регионов
//!
//! `build` собирает одну большую карту из регионов окна, `scatter` раскладывает
//! большую карту обратно по регионам. Глобальный отсчёт `(x, y)` принадлежит
//! региону `(x / REGION_SIZE, y / REGION_SIZE)` со смещением
//! `(x % REGION_SIZE, y % REGION_SIZE)`.

use crate::error::{Result, TerrainError};
use crate::heightmap::{Heightmap, REGION_SIZE};
use crate::region::{RegionCoord, RegionGrid, TileWindow};

/// Собирает объединённую карту `num_x·REGION_SIZE × num_y·REGION_SIZE`.
///
/// Окно должно быть полным: отсутствующая ячейка даёт `ResolvedRegionMissing`,
/// а не заполнение нулями.
pub fn build(grid: &RegionGrid, window: TileWindow) -> Result<Heightmap> {
    let (width, height) = window.sample_extent()?;
    let slice = grid.slice(window);
    if let Some(missing) = slice.first_missing() {
        return Err(TerrainError::ResolvedRegionMissing(missing));
    }

    let mut combined = Heightmap::new(width, height);

    for dy in 0..window.num_y {
        for dx in 0..window.num_x {
            let region = slice
                .get(dx, dy)
                .ok_or(TerrainError::ResolvedRegionMissing(RegionCoord::new(
                    window.start_x + dx,
                    window.start_y + dy,
                )))?;
            combined.copy_block(
                &region.heightmap,
                0,
                0,
                dx * REGION_SIZE,
                dy * REGION_SIZE,
                REGION_SIZE,
                REGION_SIZE,
            );
        }
    }

    Ok(combined)
}

/// Записывает отсчёты `combined` обратно в регионы окна там, где `predicate(x, y)` истинно.
///
/// Объединённая карта может быть больше окна: записываются только отсчёты
/// регионов окна, остальные игнорируются. Все ячейки окна и размер карты
/// проверяются до первой записи. Возвращает координаты изменённых регионов.
pub fn scatter<F>(
    grid: &mut RegionGrid,
    combined: &Heightmap,
    window: TileWindow,
    predicate: F,
) -> Result<Vec<RegionCoord>>
where
    F: Fn(u32, u32) -> bool,
{
    let (width, height) = window.sample_extent()?;
    if combined.width < width || combined.height < height {
        return Err(TerrainError::InvalidDimensions(format!(
            "heightmap is {}x{} samples, too small to cover {window}",
            combined.width, combined.height
        )));
    }
    if let Some(missing) = grid.slice(window).first_missing() {
        return Err(TerrainError::ResolvedRegionMissing(missing));
    }

    let mut touched = Vec::with_capacity(window.num_x as usize * window.num_y as usize);
    for dy in 0..window.num_y {
        for dx in 0..window.num_x {
            let coord = RegionCoord::new(window.start_x + dx, window.start_y + dy);
            let region = grid
                .get_mut(coord)
                .ok_or(TerrainError::ResolvedRegionMissing(coord))?;

            let mut changed = false;
            for ly in 0..REGION_SIZE {
                let gy = dy * REGION_SIZE + ly;
                for lx in 0..REGION_SIZE {
                    let gx = dx * REGION_SIZE + lx;
                    if predicate(gx, gy) {
                        region.heightmap.set(lx, ly, combined.get(gx, gy));
                        changed = true;
                    }
                }
            }

            if changed {
                touched.push(coord);
            }
        }
    }

    Ok(touched)
}
