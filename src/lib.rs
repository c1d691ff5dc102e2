pub mod combine;
pub mod command;
pub mod config;
pub mod error;
pub mod heightmap;
pub mod loader;
pub mod region;
pub mod rescale;
pub mod stitch;
pub mod store;
pub mod tiling;
pub mod tools;

pub use command::{Command, execute};
pub use config::{RegionConfig, WorldConfig};
pub use error::{Result, TerrainError};
pub use heightmap::{HALF_REGION_SIZE, Heightmap, REGION_SIZE};
pub use loader::{LoaderRegistry, TerrainLoader};
pub use region::{Region, RegionCoord, RegionGrid, TileWindow};
pub use store::RegionStore;
pub use tools::{ChangeSink, LogSink, TerrainTools};
