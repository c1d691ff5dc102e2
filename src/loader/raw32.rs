//! RAW32: массив `f32` little-endian, построчно, без заголовка

use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;

use crate::error::{Result, TerrainError};
use crate::heightmap::Heightmap;
use crate::loader::TerrainLoader;
use crate::tiling::{RAW32_BYTES_PER_SAMPLE, infer_square_tiling};

pub fn read_raw32<R: Read>(mut reader: R, width: u32, height: u32) -> Result<Heightmap> {
    let mut heightmap = Heightmap::tiles(width, height)?;
    let expected = heightmap.data.len();
    let mut bytes = [0u8; RAW32_BYTES_PER_SAMPLE as usize];

    for (read, sample) in heightmap.data.iter_mut().enumerate() {
        match reader.read_exact(&mut bytes) {
            Ok(()) => *sample = f32::from_le_bytes(bytes),
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                return Err(TerrainError::TruncatedFile { read, expected });
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(heightmap)
}

pub fn write_raw32<W: Write>(mut writer: W, heightmap: &Heightmap) -> Result<()> {
    for &h in &heightmap.data {
        writer.write_all(&h.to_le_bytes())?;
    }
    writer.flush()?;
    Ok(())
}

/// Загрузчик `.r32` / `.f32`
#[derive(Debug, Clone, Copy, Default)]
pub struct Raw32Loader;

impl TerrainLoader for Raw32Loader {
    fn tiling(&self, path: &Path) -> Result<(u32, u32)> {
        let len = std::fs::metadata(path)?.len();
        infer_square_tiling(len, RAW32_BYTES_PER_SAMPLE)
    }

    fn load(&self, path: &Path, tiles: (u32, u32)) -> Result<Heightmap> {
        let file = File::open(path)?;
        read_raw32(BufReader::new(file), tiles.0, tiles.1)
    }

    fn save(&self, path: &Path, heightmap: &Heightmap) -> Result<()> {
        let file = File::create(path)?;
        write_raw32(BufWriter::new(file), heightmap)
    }
}
