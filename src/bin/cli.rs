use clap::{Args, Parser, Subcommand};
use regiontiler::{
    Command, LoaderRegistry, RegionStore, TerrainTools, TileWindow, WorldConfig, execute,
};
use std::path::PathBuf;
use std::process::ExitCode;

/// Инструменты рельефа для сетки регионов: склейка, разбиение, сшивка и масштабирование
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Путь к конфигурационному файлу мира в формате TOML
    #[arg(short, long, default_value = "world.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Окно регионов: `<num X> <num Y> <X start> <Y start>`
#[derive(Args, Debug)]
struct WindowArgs {
    num_x: u32,
    num_y: u32,
    start_x: u32,
    start_y: u32,
}

impl From<WindowArgs> for TileWindow {
    fn from(args: WindowArgs) -> Self {
        TileWindow::new(args.start_x, args.start_y, args.num_x, args.num_y)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tiles all the regions from the passed in file
    Load { file: PathBuf },
    /// Loads a terrain from a section of a larger file
    LoadPart {
        file: PathBuf,
        #[command(flatten)]
        window: WindowArgs,
    },
    /// Saves the heightmap for all the regions as a single file
    Save { file: PathBuf },
    /// Saves a number of regions' terrains to a single file
    SavePart {
        file: PathBuf,
        #[command(flatten)]
        window: WindowArgs,
    },
    /// Saves the heightmaps of all regions as individual files
    Split { file: PathBuf },
    /// Saves the heightmaps in the area specified as individual files
    SplitPart {
        file: PathBuf,
        #[command(flatten)]
        window: WindowArgs,
    },
    /// Smooths the edges of the heightmaps between all the regions
    Stitch { depth: u32 },
    /// Smooths the edges of a number of regions
    StitchPart {
        depth: u32,
        #[command(flatten)]
        window: WindowArgs,
    },
    /// Converts a terrain file to a different file type
    Convert { from: PathBuf, to: PathBuf },
    /// Checks if a terrain file is valid
    Test { file: PathBuf },
    /// Rescales the heightmap of all regions
    Rescale {
        #[arg(allow_negative_numbers = true)]
        min: f32,
        #[arg(allow_negative_numbers = true)]
        max: f32,
    },
    /// Rescales the heightmap of a number of regions
    RescalePart {
        #[arg(allow_negative_numbers = true)]
        min: f32,
        #[arg(allow_negative_numbers = true)]
        max: f32,
        #[command(flatten)]
        window: WindowArgs,
    },
}

impl From<Commands> for Command {
    fn from(command: Commands) -> Self {
        match command {
            Commands::Load { file } => Command::Load { file },
            Commands::LoadPart { file, window } => Command::LoadPart {
                file,
                window: window.into(),
            },
            Commands::Save { file } => Command::Save { file },
            Commands::SavePart { file, window } => Command::SavePart {
                file,
                window: window.into(),
            },
            Commands::Split { file } => Command::Split { file },
            Commands::SplitPart { file, window } => Command::SplitPart {
                file,
                window: window.into(),
            },
            Commands::Stitch { depth } => Command::Stitch { width: depth },
            Commands::StitchPart { depth, window } => Command::StitchPart {
                width: depth,
                window: window.into(),
            },
            Commands::Convert { from, to } => Command::Convert { from, to },
            Commands::Test { file } => Command::Test { file },
            Commands::Rescale { min, max } => Command::Rescale { min, max },
            Commands::RescalePart { min, max, window } => Command::RescalePart {
                min,
                max,
                window: window.into(),
            },
        }
    }
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    log::info!("Loading world configuration from {}", cli.config.display());
    let config = WorldConfig::from_toml_file(&cli.config)?;
    let store = RegionStore::new(&config);
    let grid = store.load_grid(&config)?;
    log::info!("{} regions registered", grid.len());

    let mut tools = TerrainTools::with_sink(grid, LoaderRegistry::with_defaults(), store);

    match execute(&mut tools, &cli.command.into()) {
        Ok(reply) => {
            println!("{reply}");
            Ok(ExitCode::SUCCESS)
        }
        Err(reply) => {
            eprintln!("{reply}");
            Ok(ExitCode::FAILURE)
        }
    }
}
