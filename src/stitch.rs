//! Сшивка швов между соседними регионами
//!
//! Соседние регионы, отредактированные независимо, дают видимый разрыв на общей
//! границе. Для каждой пары строится временная карта из двух половин, ближайших
//! к границе, полоса вокруг шва сглаживается заливкой, и половины записываются
//! обратно.

use log::debug;

use crate::error::{Result, TerrainError};
use crate::heightmap::{HALF_REGION_SIZE, Heightmap, REGION_SIZE};
use crate::region::{RegionCoord, RegionGrid, TileWindow};

/// Сила заливочного сглаживания шва
const STITCH_STRENGTH: f32 = 1.0;

/// Ось шва
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeamAxis {
    /// Граница между западным (первым) и восточным (вторым) регионами
    WestEast,
    /// Граница между южным (первым) и северным (вторым) регионами
    SouthNorth,
}

/// Маска полосы шва: истина строго между `center - width` и `center + width` вдоль оси шва
#[must_use]
pub fn seam_mask(axis: SeamAxis, width: u32) -> Vec<bool> {
    let center = i64::from(HALF_REGION_SIZE);
    let width = i64::from(width);
    let size = REGION_SIZE as usize;

    (0..size * size)
        .map(|i| {
            let pos = match axis {
                SeamAxis::WestEast => (i % size) as i64,
                SeamAxis::SouthNorth => (i / size) as i64,
            };
            pos > center - width && pos < center + width
        })
        .collect()
}

/// Сглаживает шов между `first` и `second` на глубину `width` отсчётов от границы.
///
/// Возвращает новые карты для обоих регионов; исходные не меняются.
#[must_use]
pub fn stitch_heightmaps(
    first: &Heightmap,
    second: &Heightmap,
    axis: SeamAxis,
    width: u32,
) -> (Heightmap, Heightmap) {
    let half = HALF_REGION_SIZE;
    let size = REGION_SIZE;
    let mut temp = Heightmap::region(0.0);

    match axis {
        SeamAxis::WestEast => {
            temp.copy_block(first, half, 0, 0, 0, half, size);
            temp.copy_block(second, 0, 0, half, 0, half, size);
        }
        SeamAxis::SouthNorth => {
            temp.copy_block(first, 0, half, 0, 0, size, half);
            temp.copy_block(second, 0, 0, 0, half, size, half);
        }
    }

    temp.flood_smooth(&seam_mask(axis, width), STITCH_STRENGTH);

    let mut first = first.clone();
    let mut second = second.clone();
    match axis {
        SeamAxis::WestEast => {
            first.copy_block(&temp, 0, 0, half, 0, half, size);
            second.copy_block(&temp, half, 0, 0, 0, half, size);
        }
        SeamAxis::SouthNorth => {
            first.copy_block(&temp, 0, 0, 0, half, size, half);
            second.copy_block(&temp, 0, half, 0, 0, size, half);
        }
    }

    (first, second)
}

/// Пары соседних присутствующих регионов окна: сначала все швы запад-восток, затем юг-север.
///
/// Пары с отсутствующей стороной пропускаются: окно не обязано быть непрерывным.
#[must_use]
pub fn seam_pairs(grid: &RegionGrid, window: TileWindow) -> Vec<(RegionCoord, RegionCoord, SeamAxis)> {
    let slice = grid.slice(window);
    let window = window.clipped();
    let mut pairs = Vec::new();

    for dy in 0..window.num_y {
        for dx in 1..window.num_x {
            if let (Some(west), Some(east)) = (slice.get(dx - 1, dy), slice.get(dx, dy)) {
                pairs.push((west.coord, east.coord, SeamAxis::WestEast));
            }
        }
    }

    for dx in 0..window.num_x {
        for dy in 1..window.num_y {
            if let (Some(south), Some(north)) = (slice.get(dx, dy - 1), slice.get(dx, dy)) {
                pairs.push((south.coord, north.coord, SeamAxis::SouthNorth));
            }
        }
    }

    pairs
}

/// Сшивает все соседние пары окна. Возвращает координаты изменённых регионов (без повторов).
pub fn stitch(grid: &mut RegionGrid, window: TileWindow, width: u32) -> Result<Vec<RegionCoord>> {
    let mut touched = Vec::new();

    for (first_coord, second_coord, axis) in seam_pairs(grid, window) {
        let first = grid
            .get(first_coord)
            .ok_or(TerrainError::ResolvedRegionMissing(first_coord))?;
        let second = grid
            .get(second_coord)
            .ok_or(TerrainError::ResolvedRegionMissing(second_coord))?;

        debug!(
            "Stitching regions {} and {} ({axis:?}, width {width})",
            first.name, second.name
        );
        let (first_map, second_map) =
            stitch_heightmaps(&first.heightmap, &second.heightmap, axis, width);

        for (coord, heightmap) in [(first_coord, first_map), (second_coord, second_map)] {
            if let Some(region) = grid.get_mut(coord) {
                region.heightmap = heightmap;
            }
            if !touched.contains(&coord) {
                touched.push(coord);
            }
        }
    }

    Ok(touched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combine::tests::random_grid;
    use crate::region::Region;

    fn step_pair() -> (Heightmap, Heightmap) {
        (Heightmap::region(10.0), Heightmap::region(50.0))
    }

    #[test]
    fn test_mask_width_zero_is_empty() {
        assert!(seam_mask(SeamAxis::WestEast, 0).iter().all(|&m| !m));
        assert!(seam_mask(SeamAxis::SouthNorth, 0).iter().all(|&m| !m));
    }

    #[test]
    fn test_mask_band_is_strict() {
        let mask = seam_mask(SeamAxis::WestEast, 2);
        let size = REGION_SIZE as usize;
        let half = HALF_REGION_SIZE as usize;
        let row: Vec<usize> = (0..size).filter(|&x| mask[x]).collect();
        assert_eq!(row, vec![half - 1, half, half + 1]);

        let mask = seam_mask(SeamAxis::SouthNorth, 1);
        let rows: Vec<usize> = (0..size).filter(|&y| mask[y * size]).collect();
        assert_eq!(rows, vec![half]);
    }

    #[test]
    fn test_width_zero_is_noop() {
        let mut grid = random_grid(11, &[(0, 0), (1, 0), (0, 1), (1, 1)]);
        let before: Vec<Heightmap> = grid.regions().map(|r| r.heightmap.clone()).collect();
        let coords: Vec<RegionCoord> = grid.regions().map(|r| r.coord).collect();

        stitch(&mut grid, TileWindow::new(0, 0, 2, 2), 0).unwrap();

        for (coord, original) in coords.iter().zip(&before) {
            assert_eq!(&grid.get(*coord).unwrap().heightmap, original);
        }
    }

    #[test]
    fn test_flat_equal_regions_stay_flat() {
        let flat = Heightmap::region(33.0);
        for axis in [SeamAxis::WestEast, SeamAxis::SouthNorth] {
            let (a, b) = stitch_heightmaps(&flat, &flat, axis, 16);
            assert!(a.data.iter().chain(&b.data).all(|&h| (h - 33.0).abs() < 1e-4));
        }
    }

    #[test]
    fn test_stitch_softens_step_only_near_border() {
        let (west, east) = step_pair();
        let width = 8;
        let (west_out, east_out) = stitch_heightmaps(&west, &east, SeamAxis::WestEast, width);

        let last = REGION_SIZE - 1;
        // The step at the border is reduced
        let gap_before = east.get(0, 100) - west.get(last, 100);
        let gap_after = east_out.get(0, 100) - west_out.get(last, 100);
        assert!(gap_after < gap_before);
        assert!(west_out.get(last, 100) > 10.0);
        assert!(east_out.get(0, 100) < 50.0);

        // Two widths away the terrain is untouched
        assert_eq!(west_out.get(last - 2 * width, 100), 10.0);
        assert_eq!(east_out.get(2 * width, 100), 50.0);
        // The far halves are never touched
        assert_eq!(west_out.get(0, 0), 10.0);
        assert_eq!(east_out.get(last, last), 50.0);
    }

    #[test]
    fn test_stitch_south_north_axis() {
        let (south, north) = step_pair();
        let (south_out, north_out) = stitch_heightmaps(&south, &north, SeamAxis::SouthNorth, 4);
        let last = REGION_SIZE - 1;
        assert!(south_out.get(7, last) > 10.0);
        assert!(north_out.get(7, 0) < 50.0);
        assert_eq!(south_out.get(7, 0), 10.0);
        assert_eq!(north_out.get(7, last), 50.0);
    }

    #[test]
    fn test_seam_pairs_skip_absent_neighbours() {
        // Missing (1, 1): the L-shape has one west-east and one south-north seam
        let grid = random_grid(12, &[(0, 0), (1, 0), (0, 1)]);
        let pairs = seam_pairs(&grid, TileWindow::new(0, 0, 2, 2));
        assert_eq!(
            pairs,
            vec![
                (RegionCoord::new(0, 0), RegionCoord::new(1, 0), SeamAxis::WestEast),
                (RegionCoord::new(0, 0), RegionCoord::new(0, 1), SeamAxis::SouthNorth),
            ]
        );
    }

    #[test]
    fn test_stitch_grid_reports_each_region_once() {
        let mut grid = RegionGrid::new();
        for (x, h) in [(0, 0.0), (1, 40.0), (2, 80.0)] {
            grid.add_region(Region::new(RegionCoord::new(x, 0), format!("r{x}"), Heightmap::region(h)))
                .unwrap();
        }

        let touched = stitch(&mut grid, TileWindow::new(0, 0, 3, 1), 6).unwrap();
        assert_eq!(touched.len(), 3);

        let middle = &grid.get(RegionCoord::new(1, 0)).unwrap().heightmap;
        assert!(middle.get(0, 50) < 40.0);
        assert!(middle.get(REGION_SIZE - 1, 50) > 40.0);
        assert_eq!(middle.get(HALF_REGION_SIZE, 50), 40.0);
    }

    #[test]
    fn test_seam_pairs_at_coordinate_edge() {
        let grid = random_grid(47, &[(u32::MAX - 1, 0), (u32::MAX, 0)]);
        let pairs = seam_pairs(&grid, TileWindow::new(u32::MAX - 1, 0, 3, 1));
        assert_eq!(
            pairs,
            vec![(
                RegionCoord::new(u32::MAX - 1, 0),
                RegionCoord::new(u32::MAX, 0),
                SeamAxis::WestEast
            )]
        );
    }
}
