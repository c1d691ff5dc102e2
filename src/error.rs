//! Ошибки инструментов работы с рельефом
//!
//! Все операции возвращают [`TerrainError`]. Проверки выполняются до любых
//! изменений сетки, поэтому отклонённая команда не оставляет частичного состояния.

use std::path::PathBuf;
use thiserror::Error;

use crate::region::{RegionCoord, TileWindow};

/// Errors produced by grid, loader and command operations.
#[derive(Error, Debug)]
pub enum TerrainError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("No regions are registered")]
    EmptyGrid,

    #[error("Region at {0} is already registered")]
    DuplicateRegion(RegionCoord),

    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),

    #[error("No loader is registered for files of type '{0}'")]
    UnknownFormat(String),

    #[error("File size {len} is not a multiple of the region size ({bytes_per_sample} bytes per sample)")]
    NotTileable { len: u64, bytes_per_sample: u64 },

    #[error("File holds {0} regions, which is not a square - currently unhandled")]
    NotSquare(u64),

    #[error("File is {width}x{height} samples, which does not tile a whole number of regions")]
    NotWholeRegions { width: u32, height: u32 },

    #[error("File ended after {read} of {expected} samples")]
    TruncatedFile { read: usize, expected: usize },

    #[error("Regions in {0} do not form a contiguous, rectangular shape")]
    NonRectangularRegionSet(TileWindow),

    #[error("Region at {0} was expected inside the window but is missing")]
    ResolvedRegionMissing(RegionCoord),

    #[error("Cannot rescale: current elevation range is flat at {0}")]
    DegenerateRescale(f32),

    #[error("Invalid range: max ({max}) is less than min ({min})")]
    InvalidRange { min: f32, max: f32 },

    #[error("Invalid range: min ({min}) and max ({max}) must be finite numbers")]
    NonFiniteRange { min: f32, max: f32 },

    #[error("File does not exist: {0}")]
    FileNotFound(PathBuf),

    #[error("Cannot write to {0}")]
    CannotWrite(PathBuf),
}

pub type Result<T> = std::result::Result<T, TerrainError>;
