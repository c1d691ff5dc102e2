//! Карты высот в растровых изображениях (PNG, BMP, GIF, TIFF)
//!
//! Яркость пикселя переводится в высоту: `высота = luma / 255 × 128`.
//! Строка 0 изображения соответствует самой северной строка карты, поэтому ось Y
//! переворачивается при чтении и записи. Размеры берутся из заголовка.

use std::path::Path;

use image::{DynamicImage, GrayImage, Luma};

use crate::error::{Result, TerrainError};
use crate::heightmap::{Heightmap, REGION_SIZE};
use crate::loader::TerrainLoader;

/// Высота, соответствующая белому пикселю
pub const IMAGE_MAX_HEIGHT: f32 = 128.0;

#[must_use]
pub fn luma_to_height(luma: u8) -> f32 {
    f32::from(luma) / 255.0 * IMAGE_MAX_HEIGHT
}

#[must_use]
pub fn height_to_luma(h: f32) -> u8 {
    (h / IMAGE_MAX_HEIGHT * 255.0).round().clamp(0.0, 255.0) as u8
}

#[must_use]
pub fn heightmap_from_image(image: &GrayImage) -> Heightmap {
    let (width, height) = image.dimensions();
    let mut heightmap = Heightmap::new(width, height);
    for (x, row, pixel) in image.enumerate_pixels() {
        heightmap.set(x, height - 1 - row, luma_to_height(pixel[0]));
    }
    heightmap
}

#[must_use]
pub fn heightmap_to_image(heightmap: &Heightmap) -> GrayImage {
    let height = heightmap.height;
    GrayImage::from_fn(heightmap.width, height, |x, row| {
        Luma([height_to_luma(heightmap.get(x, height - 1 - row))])
    })
}

/// Загрузчик изображений; формат определяется по расширению
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageLoader;

impl TerrainLoader for ImageLoader {
    fn tiling(&self, path: &Path) -> Result<(u32, u32)> {
        let (width, height) = image::image_dimensions(path)?;
        if width == 0 || height == 0 || width % REGION_SIZE != 0 || height % REGION_SIZE != 0 {
            return Err(TerrainError::NotWholeRegions { width, height });
        }
        Ok((width / REGION_SIZE, height / REGION_SIZE))
    }

    fn load(&self, path: &Path, _tiles: (u32, u32)) -> Result<Heightmap> {
        let image = image::open(path)?.to_luma8();
        Ok(heightmap_from_image(&image))
    }

    fn save(&self, path: &Path, heightmap: &Heightmap) -> Result<()> {
        // GIF не кодирует оттенки серого напрямую, RGB поддерживают все форматы
        let rgb = DynamicImage::ImageLuma8(heightmap_to_image(heightmap)).to_rgb8();
        rgb.save(path)?;
        Ok(())
    }
}
