//! Определение размеров файла без заголовка
//!
//! Форматы без заголовка (LLRAW, RAW32) не хранят ширину и высоту. Число
//! регионов выводится из длины файла, а раскладка считается квадратной:
//! неквадратные раскладки явно не поддерживаются.

use crate::error::{Result, TerrainError};
use crate::heightmap::REGION_SIZE;

/// Байт на отсчёт в устаревшем формате LLRAW
pub const LLRAW_BYTES_PER_SAMPLE: u64 = 13;

/// Байт на отсчёт в формате RAW32 (`f32`)
pub const RAW32_BYTES_PER_SAMPLE: u64 = 4;

/// Выводит квадратную раскладку `(width, height)` в регионах по длине файла.
///
/// # Ошибки
/// - `NotTileable`: длина не кратна размеру одного региона (или файл пуст)
/// - `NotSquare`: число регионов не является точным квадратом
pub fn infer_square_tiling(len: u64, bytes_per_sample: u64) -> Result<(u32, u32)> {
    let region_bytes = u64::from(REGION_SIZE) * u64::from(REGION_SIZE) * bytes_per_sample;
    if len == 0 || region_bytes == 0 || len % region_bytes != 0 {
        return Err(TerrainError::NotTileable {
            len,
            bytes_per_sample,
        });
    }

    let num_regions = len / region_bytes;
    let side = integer_sqrt(num_regions);
    if side * side != num_regions {
        return Err(TerrainError::NotSquare(num_regions));
    }

    let side = u32::try_from(side).map_err(|_| TerrainError::NotSquare(num_regions))?;
    Ok((side, side))
}

fn integer_sqrt(n: u64) -> u64 {
    let mut root = (n as f64).sqrt() as u64;
    // Поправка на погрешность f64 для больших n
    while root.checked_mul(root).is_none_or(|sq| sq > n) {
        root -= 1;
    }
    while (root + 1).checked_mul(root + 1).is_some_and(|sq| sq <= n) {
        root += 1;
    }
    root
}

#[cfg(test)]
mod tests {
    use super::*;

    const REGION_SAMPLES: u64 = (REGION_SIZE as u64) * (REGION_SIZE as u64);

    #[test]
    fn test_four_float_regions_tile_two_by_two() {
        let len = 4 * REGION_SAMPLES * RAW32_BYTES_PER_SAMPLE;
        assert_eq!(infer_square_tiling(len, RAW32_BYTES_PER_SAMPLE).unwrap(), (2, 2));
    }

    #[test]
    fn test_three_regions_are_not_square() {
        let len = 3 * REGION_SAMPLES * LLRAW_BYTES_PER_SAMPLE;
        assert!(matches!(
            infer_square_tiling(len, LLRAW_BYTES_PER_SAMPLE),
            Err(TerrainError::NotSquare(3))
        ));
    }

    #[test]
    fn test_partial_region_not_tileable() {
        let len = REGION_SAMPLES * LLRAW_BYTES_PER_SAMPLE + 1;
        assert!(matches!(
            infer_square_tiling(len, LLRAW_BYTES_PER_SAMPLE),
            Err(TerrainError::NotTileable { .. })
        ));
        assert!(matches!(
            infer_square_tiling(0, RAW32_BYTES_PER_SAMPLE),
            Err(TerrainError::NotTileable { .. })
        ));
    }

    #[test]
    fn test_single_and_large_squares() {
        assert_eq!(
            infer_square_tiling(REGION_SAMPLES * LLRAW_BYTES_PER_SAMPLE, LLRAW_BYTES_PER_SAMPLE).unwrap(),
            (1, 1)
        );
        let len = 64 * REGION_SAMPLES * RAW32_BYTES_PER_SAMPLE;
        assert_eq!(infer_square_tiling(len, RAW32_BYTES_PER_SAMPLE).unwrap(), (8, 8));
    }

    #[test]
    fn test_integer_sqrt() {
        assert_eq!(integer_sqrt(0), 0);
        assert_eq!(integer_sqrt(15), 3);
        assert_eq!(integer_sqrt(16), 4);
        assert_eq!(integer_sqrt(u64::from(u32::MAX) * u64::from(u32::MAX)), u64::from(u32::MAX));
    }
}
