//! Линейное масштабирование диапазона высот в окне регионов

use log::info;

use crate::combine;
use crate::error::{Result, TerrainError};
use crate::region::{RegionCoord, RegionGrid, TileWindow};

/// Переводит текущий диапазон высот окна в `[desired_min, desired_max]`.
///
/// - `desired_min == desired_max`: все отсчёты окна выравниваются до этого значения
/// - плоское окно при ненулевом желаемом диапазоне: `DegenerateRescale`, до любой записи
/// - `NaN` или бесконечность в границах: `NonFiniteRange`
pub fn rescale(
    grid: &mut RegionGrid,
    window: TileWindow,
    desired_min: f32,
    desired_max: f32,
) -> Result<Vec<RegionCoord>> {
    if !desired_min.is_finite() || !desired_max.is_finite() {
        return Err(TerrainError::NonFiniteRange {
            min: desired_min,
            max: desired_max,
        });
    }
    if desired_max < desired_min {
        return Err(TerrainError::InvalidRange {
            min: desired_min,
            max: desired_max,
        });
    }

    let mut combined = combine::build(grid, window)?;
    let desired_range = desired_max - desired_min;
    info!("Desired {desired_min}, {desired_max} = {desired_range}");

    if desired_range == 0.0 {
        combined.data.fill(desired_max);
    } else {
        let (current_min, current_max) = combined.min_max().ok_or(TerrainError::EmptyGrid)?;
        let current_range = current_max - current_min;
        if current_range == 0.0 {
            return Err(TerrainError::DegenerateRescale(current_min));
        }

        let scale = desired_range / current_range;
        info!("Current {current_min}, {current_max} = {current_range}, scale = {scale}");

        for h in &mut combined.data {
            *h = desired_min + (*h - current_min) * scale;
        }
    }

    combine::scatter(grid, &combined, window, |x, y| window.covers_sample(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combine::tests::random_grid;
    use crate::heightmap::Heightmap;
    use crate::region::Region;

    const WINDOW: TileWindow = TileWindow {
        start_x: 0,
        start_y: 0,
        num_x: 2,
        num_y: 1,
    };

    fn window_values(grid: &RegionGrid) -> Vec<f32> {
        WINDOW
            .cells()
            .flat_map(|c| grid.get(c).unwrap().heightmap.data.clone())
            .collect()
    }

    #[test]
    fn test_zero_range_flattens() {
        let mut grid = random_grid(21, &[(0, 0), (1, 0)]);
        let touched = rescale(&mut grid, WINDOW, 0.0, 0.0).unwrap();
        assert_eq!(touched.len(), 2);
        assert!(window_values(&grid).iter().all(|&h| h == 0.0));
    }

    #[test]
    fn test_rescale_hits_desired_range() {
        let mut grid = random_grid(22, &[(0, 0), (1, 0)]);
        rescale(&mut grid, WINDOW, 20.0, 60.0).unwrap();

        let values = window_values(&grid);
        let min = values.iter().copied().fold(f32::INFINITY, f32::min);
        let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        assert!((min - 20.0).abs() < 1e-3);
        assert!((max - 60.0).abs() < 1e-3);
    }

    #[test]
    fn test_rescale_round_trip_restores_values() {
        let mut grid = random_grid(23, &[(0, 0), (1, 0)]);
        let original = window_values(&grid);
        let min = original.iter().copied().fold(f32::INFINITY, f32::min);
        let max = original.iter().copied().fold(f32::NEG_INFINITY, f32::max);

        rescale(&mut grid, WINDOW, -5.0, 300.0).unwrap();
        rescale(&mut grid, WINDOW, min, max).unwrap();

        for (restored, expected) in window_values(&grid).iter().zip(&original) {
            assert!((restored - expected).abs() < 1e-2, "{restored} != {expected}");
        }
    }

    #[test]
    fn test_flat_window_is_degenerate() {
        let mut grid = RegionGrid::new();
        for x in 0..2 {
            grid.add_region(Region::new(RegionCoord::new(x, 0), "flat", Heightmap::region(12.0)))
                .unwrap();
        }
        let result = rescale(&mut grid, WINDOW, 0.0, 10.0);
        assert!(matches!(result, Err(TerrainError::DegenerateRescale(h)) if h == 12.0));
        assert!(window_values(&grid).iter().all(|&h| h == 12.0));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let mut grid = random_grid(24, &[(0, 0), (1, 0)]);
        let before = window_values(&grid);
        let result = rescale(&mut grid, WINDOW, 10.0, 5.0);
        assert!(matches!(result, Err(TerrainError::InvalidRange { .. })));
        assert_eq!(window_values(&grid), before);
    }

    #[test]
    fn test_non_finite_bounds_rejected() {
        let mut grid = random_grid(26, &[(0, 0), (1, 0)]);
        let before = window_values(&grid);
        for (min, max) in [
            (0.0, f32::NAN),
            (f32::NAN, 10.0),
            (0.0, f32::INFINITY),
            (f32::NEG_INFINITY, 10.0),
            (f32::NEG_INFINITY, f32::INFINITY),
        ] {
            let result = rescale(&mut grid, WINDOW, min, max);
            assert!(
                matches!(result, Err(TerrainError::NonFiniteRange { .. })),
                "{min}, {max}: {result:?}"
            );
        }
        assert_eq!(window_values(&grid), before);
    }

    #[test]
    fn test_only_window_is_rescaled() {
        let mut grid = random_grid(25, &[(0, 0), (1, 0), (2, 0)]);
        let outside = grid.get(RegionCoord::new(2, 0)).unwrap().heightmap.clone();
        rescale(&mut grid, WINDOW, 0.0, 1.0).unwrap();
        assert_eq!(grid.get(RegionCoord::new(2, 0)).unwrap().heightmap, outside);
    }
}
