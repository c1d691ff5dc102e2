#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::{Result, TerrainError};

/// Длина стороны карты высот одного региона, в отсчётах
pub const REGION_SIZE: u32 = 256;

/// Половина региона: граница шва во временной карте сшивки
pub const HALF_REGION_SIZE: u32 = REGION_SIZE / 2;

/// Двумерная карта высот, хранимая построчно (`y * width + x`)
#[derive(Debug, Clone, PartialEq)]
pub struct Heightmap {
    pub width: u32,
    pub height: u32,
    pub data: Vec<f32>,
}

impl Heightmap {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, 0.0)
    }

    #[must_use]
    pub fn filled(width: u32, height: u32, value: f32) -> Self {
        Self {
            width,
            height,
            data: vec![value; width as usize * height as usize],
        }
    }

    /// Карта высот одного региона `REGION_SIZE × REGION_SIZE`
    #[must_use]
    pub fn region(value: f32) -> Self {
        Self::filled(REGION_SIZE, REGION_SIZE, value)
    }

    /// Нулевая карта на `num_x × num_y` регионов.
    ///
    /// Ширина в отсчётах должна помещаться в `u32`, иначе `InvalidDimensions`.
    pub fn tiles(num_x: u32, num_y: u32) -> Result<Self> {
        match (num_x.checked_mul(REGION_SIZE), num_y.checked_mul(REGION_SIZE)) {
            (Some(width), Some(height)) => Ok(Self::new(width, height)),
            _ => Err(TerrainError::InvalidDimensions(format!(
                "{num_x}x{num_y} regions exceed the addressable sample range"
            ))),
        }
    }

    #[must_use]
    pub fn from_data(width: u32, height: u32, data: Vec<f32>) -> Option<Self> {
        (data.len() == width as usize * height as usize).then_some(Self {
            width,
            height,
            data,
        })
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.data[self.index(x, y)]
    }

    pub fn set(&mut self, x: u32, y: u32, value: f32) {
        let i = self.index(x, y);
        self.data[i] = value;
    }

    #[must_use]
    pub fn is_region_sized(&self) -> bool {
        self.width == REGION_SIZE && self.height == REGION_SIZE
    }

    /// Копирует прямоугольник `width × height` из `source` построчно
    #[allow(clippy::too_many_arguments)]
    pub fn copy_block(
        &mut self,
        source: &Heightmap,
        src_x: u32,
        src_y: u32,
        dst_x: u32,
        dst_y: u32,
        width: u32,
        height: u32,
    ) {
        let w = width as usize;
        for row in 0..height {
            let src = source.index(src_x, src_y + row);
            let dst = self.index(dst_x, dst_y + row);
            self.data[dst..dst + w].copy_from_slice(&source.data[src..src + w]);
        }
    }

    /// Минимум и максимум высот. Два независимых сравнения на каждый отсчёт.
    #[must_use]
    pub fn min_max(&self) -> Option<(f32, f32)> {
        if self.data.is_empty() {
            return None;
        }
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        for &h in &self.data {
            if h < min {
                min = h;
            }
            if h > max {
                max = h;
            }
        }
        Some((min, max))
    }

    /// Билинейная интерполяция высоты в дробной точке.
    ///
    /// Координаты прижимаются к `[0, size - 2]`, чтобы соседний отсчёт `+1`
    /// всегда существовал.
    #[must_use]
    pub fn bilinear(&self, x: f32, y: f32) -> f32 {
        let x = x.clamp(0.0, (self.width.saturating_sub(2)) as f32);
        let y = y.clamp(0.0, (self.height.saturating_sub(2)) as f32);

        let x0 = x as u32;
        let y0 = y as u32;
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);

        let h00 = self.get(x0, y0);
        let h10 = self.get(x1, y0);
        let h01 = self.get(x0, y1);
        let h11 = self.get(x1, y1);

        let fx = x - x0 as f32;
        let fy = y - y0 as f32;

        h00 + (h10 - h00) * fx + (h01 - h00) * fy + (h00 - h10 - h01 + h11) * fx * fy
    }

    /// Среднее билинейных отсчётов на сетке смещений `[-strength, strength)` с шагом `strength / 4`
    fn area_average(&self, x: u32, y: u32, strength: f32) -> f32 {
        const STEPS: u32 = 8;
        let step = strength / 4.0;
        let mut total = 0.0;

        for i in 0..STEPS {
            let dx = -strength + i as f32 * step;
            for j in 0..STEPS {
                let dy = -strength + j as f32 * step;
                total += self.bilinear(x as f32 + dx, y as f32 + dy);
            }
        }

        total / (STEPS * STEPS) as f32
    }

    /// Заливочное сглаживание: усредняет только отсчёты, отмеченные в `mask`.
    ///
    /// Все средние считаются по исходной карте, затем записываются разом, так что
    /// результат не зависит от порядка обхода. Немаскированные отсчёты не меняются.
    pub fn flood_smooth(&mut self, mask: &[bool], strength: f32) {
        debug_assert_eq!(mask.len(), self.data.len());
        let width = self.width as usize;
        let source = &*self;

        let sample = |i: usize| {
            if mask[i] {
                source.area_average((i % width) as u32, (i / width) as u32, strength)
            } else {
                source.data[i]
            }
        };

        #[cfg(feature = "parallel")]
        let smoothed: Vec<f32> = (0..source.data.len()).into_par_iter().map(sample).collect();
        #[cfg(not(feature = "parallel"))]
        let smoothed: Vec<f32> = (0..source.data.len()).map(sample).collect();

        self.data = smoothed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_max_updates_both_ends_independently() {
        // Descending start: every new sample is a new minimum, the first one must still be the max.
        let map = Heightmap::from_data(4, 1, vec![3.0, 2.0, 1.0, 0.5]).unwrap();
        assert_eq!(map.min_max(), Some((0.5, 3.0)));
    }

    #[test]
    fn test_bilinear_midpoint_and_clamp() {
        let map = Heightmap::from_data(2, 2, vec![0.0, 2.0, 4.0, 6.0]).unwrap();
        assert!((map.bilinear(0.5, 0.5) - 3.0).abs() < 1e-6);
        // Clamped to [0, size - 2] on both axes
        assert!((map.bilinear(-3.0, 10.0) - 0.0).abs() < 1e-6);
    }

    #[test]
    fn test_flood_smooth_respects_mask() {
        let mut map = Heightmap::new(8, 8);
        map.set(4, 4, 64.0);
        let before = map.clone();

        let mut mask = vec![false; 64];
        mask[4 * 8 + 4] = true;
        map.flood_smooth(&mask, 1.0);

        for i in 0..64 {
            if i != 4 * 8 + 4 {
                assert_eq!(map.data[i], before.data[i]);
            }
        }
        assert!(map.get(4, 4) < 64.0);
        assert!(map.get(4, 4) > 0.0);
    }

    #[test]
    fn test_flood_smooth_flat_is_stable() {
        let mut map = Heightmap::filled(16, 16, 21.5);
        let mask = vec![true; 256];
        map.flood_smooth(&mask, 1.0);
        assert!(map.data.iter().all(|&h| (h - 21.5).abs() < 1e-4));
    }

    #[test]
    fn test_tiles_sizes_and_overflow() {
        let map = Heightmap::tiles(2, 1).unwrap();
        assert_eq!((map.width, map.height), (2 * REGION_SIZE, REGION_SIZE));
        assert!(matches!(
            Heightmap::tiles(u32::MAX / REGION_SIZE + 1, 1),
            Err(TerrainError::InvalidDimensions(_))
        ));
        assert!(matches!(
            Heightmap::tiles(1, u32::MAX),
            Err(TerrainError::InvalidDimensions(_))
        ));
    }

    #[test]
    fn test_copy_block() {
        let source = Heightmap::from_data(3, 2, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let mut target = Heightmap::new(4, 4);
        target.copy_block(&source, 1, 0, 2, 1, 2, 2);
        assert_eq!(target.get(2, 1), 2.0);
        assert_eq!(target.get(3, 1), 3.0);
        assert_eq!(target.get(2, 2), 5.0);
        assert_eq!(target.get(3, 2), 6.0);
        assert_eq!(target.get(0, 0), 0.0);
    }
}
