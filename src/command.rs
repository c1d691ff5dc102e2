//! Командный интерфейс для встраивающего хоста
//!
//! Каждая команда выполняется целиком и отвечает одной строкой: `Ok` при
//! успехе, `Err` с описанием ошибки. Типы ошибок за пределы этого слоя не выходят.

use std::path::PathBuf;

use crate::error::TerrainError;
use crate::region::TileWindow;
use crate::tools::{ChangeSink, TerrainTools};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Загрузить файл на все регионы
    Load { file: PathBuf },
    /// Загрузить файл в окно регионов
    LoadPart { file: PathBuf, window: TileWindow },
    /// Сохранить все регионы в один файл
    Save { file: PathBuf },
    /// Сохранить окно регионов в один файл
    SavePart { file: PathBuf, window: TileWindow },
    /// Сохранить каждый регион в отдельный файл
    Split { file: PathBuf },
    /// Сохранить каждый регион окна в отдельный файл
    SplitPart { file: PathBuf, window: TileWindow },
    /// Сгладить швы между всеми регионами
    Stitch { width: u32 },
    /// Сгладить швы внутри окна
    StitchPart { width: u32, window: TileWindow },
    /// Перевести файл в другой формат
    Convert { from: PathBuf, to: PathBuf },
    /// Проверить, что файл можно загрузить
    Test { file: PathBuf },
    /// Масштабировать высоты всех регионов
    Rescale { min: f32, max: f32 },
    /// Масштабировать высоты окна
    RescalePart { min: f32, max: f32, window: TileWindow },
}

/// Выполняет команду и возвращает ответ одной строкой
pub fn execute<S: ChangeSink>(
    tools: &mut TerrainTools<S>,
    command: &Command,
) -> Result<String, String> {
    run(tools, command).map_err(|e| describe_error(command, &e))
}

fn run<S: ChangeSink>(
    tools: &mut TerrainTools<S>,
    command: &Command,
) -> Result<String, TerrainError> {
    let message = match command {
        Command::Load { file } => {
            let window = tools.load_all(file)?;
            format!("Loaded {} into {window}", file.display())
        }
        Command::LoadPart { file, window } => {
            tools.load_part(file, *window)?;
            format!("Loaded {} into {window}", file.display())
        }
        Command::Save { file } => {
            let window = tools.save_all(file)?;
            format!("Saved {window} to {}", file.display())
        }
        Command::SavePart { file, window } => {
            tools.save_part(file, *window)?;
            format!("Saved {window} to {}", file.display())
        }
        Command::Split { file } => {
            let written = tools.split_all(file)?;
            format!("Split {} regions into individual files", written.len())
        }
        Command::SplitPart { file, window } => {
            let written = tools.split_part(file, *window)?;
            format!("Split {} regions of {window} into individual files", written.len())
        }
        Command::Stitch { width } => {
            let count = tools.stitch_all(*width)?;
            format!("Stitched {count} regions with depth {width}")
        }
        Command::StitchPart { width, window } => {
            let count = tools.stitch_part(*width, *window)?;
            format!("Stitched {count} regions of {window} with depth {width}")
        }
        Command::Convert { from, to } => {
            let (w, h) = tools.convert(from, to)?;
            format!(
                "Converted {} to {} ({w}x{h} regions)",
                from.display(),
                to.display()
            )
        }
        Command::Test { file } => {
            let (w, h) = tools.test_file(file)?;
            format!(
                "File {} can be loaded. It will tile W={w}, H={h} regions",
                file.display()
            )
        }
        Command::Rescale { min, max } => {
            let count = tools.rescale_all(*min, *max)?;
            format!("Rescaled {count} regions to [{min}, {max}]")
        }
        Command::RescalePart { min, max, window } => {
            let count = tools.rescale_part(*window, *min, *max)?;
            format!("Rescaled {count} regions of {window} to [{min}, {max}]")
        }
    };
    Ok(message)
}

fn describe_error(command: &Command, error: &TerrainError) -> String {
    let hint = match (command, error) {
        (Command::Load { .. }, TerrainError::NonRectangularRegionSet(_) | TerrainError::InvalidDimensions(_)) => {
            ", consider using the 'load-part' command instead"
        }
        (Command::Save { .. }, TerrainError::NonRectangularRegionSet(_)) => {
            ", consider using the 'save-part' command instead"
        }
        _ => "",
    };
    format!("{error}{hint}")
}
