//! Устаревший формат LLRAW
//!
//! Каждый отсчёт занимает запись из 13 байт: байт 0 хранит основу высоты,
//! байт 1 масштаб, байты 2..=12 не используются. `высота = byte0 × (byte1 / 128)`.
//! Размеры в файле не хранятся и выводятся из его длины.

use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;

use crate::error::{Result, TerrainError};
use crate::heightmap::Heightmap;
use crate::loader::TerrainLoader;
use crate::tiling::{LLRAW_BYTES_PER_SAMPLE, infer_square_tiling};

const RECORD_LEN: usize = LLRAW_BYTES_PER_SAMPLE as usize;

/// Наибольшая высота, представимая парой байт
pub const LLRAW_MAX_HEIGHT: f32 = 255.0 * 255.0 / 128.0;

#[must_use]
pub fn decode_sample(base: u8, scale: u8) -> f32 {
    f32::from(base) * (f32::from(scale) / 128.0)
}

/// Подбирает пару `(base, scale)`, декодирующуюся ближе всего к `h`.
///
/// Сравниваются два кандидата: масштаб 128 с округлённой основой и
/// основа `ceil(h)` с подобранным масштабом.
#[must_use]
pub fn encode_sample(h: f32) -> (u8, u8) {
    let h = if h.is_nan() { 0.0 } else { h.clamp(0.0, LLRAW_MAX_HEIGHT) };

    let unit = if h <= 255.0 {
        (h.round() as u8, 128)
    } else {
        (255, (h * 128.0 / 255.0).round().min(255.0) as u8)
    };

    let base = h.ceil().clamp(1.0, 255.0);
    let fine = (base as u8, (h * 128.0 / base).round().min(255.0) as u8);

    let error = |(b, s): (u8, u8)| (decode_sample(b, s) - h).abs();
    if error(fine) < error(unit) { fine } else { unit }
}

/// Читает ровно `width × height` регионов отсчётов из потока
pub fn read_llraw<R: Read>(mut reader: R, width: u32, height: u32) -> Result<Heightmap> {
    let mut heightmap = Heightmap::tiles(width, height)?;
    let expected = heightmap.data.len();
    let mut record = [0u8; RECORD_LEN];

    for (read, sample) in heightmap.data.iter_mut().enumerate() {
        match reader.read_exact(&mut record) {
            Ok(()) => *sample = decode_sample(record[0], record[1]),
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                return Err(TerrainError::TruncatedFile { read, expected });
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(heightmap)
}

pub fn write_llraw<W: Write>(mut writer: W, heightmap: &Heightmap) -> Result<()> {
    let mut record = [0u8; RECORD_LEN];
    for &h in &heightmap.data {
        let (base, scale) = encode_sample(h);
        record[0] = base;
        record[1] = scale;
        writer.write_all(&record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Загрузчик `.raw`
#[derive(Debug, Clone, Copy, Default)]
pub struct LlRawLoader;

impl TerrainLoader for LlRawLoader {
    fn tiling(&self, path: &Path) -> Result<(u32, u32)> {
        let len = std::fs::metadata(path)?.len();
        infer_square_tiling(len, LLRAW_BYTES_PER_SAMPLE)
    }

    fn load(&self, path: &Path, tiles: (u32, u32)) -> Result<Heightmap> {
        let file = File::open(path)?;
        read_llraw(BufReader::new(file), tiles.0, tiles.1)
    }

    fn save(&self, path: &Path, heightmap: &Heightmap) -> Result<()> {
        let file = File::create(path)?;
        write_llraw(BufWriter::new(file), heightmap)
    }
}
