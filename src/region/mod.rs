//! Сетка регионов
//!
//! Регионы хранятся в разреженной мапе по координате сетки. Для операций над
//! прямоугольным окном строится плотное представление [`TileSlice`], в котором
//! отсутствующие ячейки явно равны `None`.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TerrainError};
use crate::heightmap::{Heightmap, REGION_SIZE};

/// Координата региона в сетке
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegionCoord {
    pub x: u32,
    pub y: u32,
}

impl RegionCoord {
    #[must_use]
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for RegionCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Clone)]
pub struct Region {
    pub coord: RegionCoord,
    pub name: String,
    pub heightmap: Heightmap,
}

impl Region {
    #[must_use]
    pub fn new(coord: RegionCoord, name: impl Into<String>, heightmap: Heightmap) -> Self {
        Self {
            coord,
            name: name.into(),
            heightmap,
        }
    }
}

/// Прямоугольное окно над координатами сетки: `num_x × num_y` ячеек начиная с `(start_x, start_y)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileWindow {
    pub start_x: u32,
    pub start_y: u32,
    pub num_x: u32,
    pub num_y: u32,
}

impl TileWindow {
    #[must_use]
    pub fn new(start_x: u32, start_y: u32, num_x: u32, num_y: u32) -> Self {
        Self {
            start_x,
            start_y,
            num_x,
            num_y,
        }
    }

    /// Координаты за последней ячейкой по обеим осям, без переполнения
    fn end(&self) -> (u64, u64) {
        (
            u64::from(self.start_x) + u64::from(self.num_x),
            u64::from(self.start_y) + u64::from(self.num_y),
        )
    }

    /// Все ячейки окна представимы координатами `u32`
    #[must_use]
    pub fn is_addressable(&self) -> bool {
        let limit = u64::from(u32::MAX) + 1;
        let (end_x, end_y) = self.end();
        end_x <= limit && end_y <= limit
    }

    /// Представимая часть окна: ячейки за `u32::MAX` отбрасываются
    #[must_use]
    pub fn clipped(&self) -> TileWindow {
        let room = |start: u32| u64::from(u32::MAX) - u64::from(start) + 1;
        let clip = |start: u32, num: u32| u64::from(num).min(room(start)) as u32;
        TileWindow {
            num_x: clip(self.start_x, self.num_x),
            num_y: clip(self.start_y, self.num_y),
            ..*self
        }
    }

    /// Ширина и высота объединённой карты окна в отсчётах.
    ///
    /// `InvalidDimensions`, если окно выходит за диапазон координат или карта
    /// не помещается в `u32` отсчётов по одной из осей.
    pub fn sample_extent(&self) -> Result<(u32, u32)> {
        let extent = (
            self.num_x.checked_mul(REGION_SIZE),
            self.num_y.checked_mul(REGION_SIZE),
        );
        match extent {
            (Some(width), Some(height)) if self.is_addressable() => Ok((width, height)),
            _ => Err(TerrainError::InvalidDimensions(format!(
                "{self} exceeds the addressable coordinate range"
            ))),
        }
    }

    #[must_use]
    pub fn contains(&self, coord: RegionCoord) -> bool {
        coord.x >= self.start_x
            && coord.y >= self.start_y
            && coord.x - self.start_x < self.num_x
            && coord.y - self.start_y < self.num_y
    }

    /// Лежит ли окно целиком внутри `outer`
    #[must_use]
    pub fn within(&self, outer: &TileWindow) -> bool {
        let (end_x, end_y) = self.end();
        let (outer_end_x, outer_end_y) = outer.end();
        self.start_x >= outer.start_x
            && self.start_y >= outer.start_y
            && end_x <= outer_end_x
            && end_y <= outer_end_y
    }

    /// Попадает ли глобальный отсчёт объединённой карты в один из регионов окна.
    ///
    /// Объединённая карта может быть больше окна (например, загруженный файл);
    /// отсчёты за пределами `num_x × num_y` регионов не записываются.
    #[must_use]
    pub fn covers_sample(&self, x: u32, y: u32) -> bool {
        x / REGION_SIZE < self.num_x && y / REGION_SIZE < self.num_y
    }

    /// Координаты всех представимых ячеек окна, построчно
    pub fn cells(&self) -> impl Iterator<Item = RegionCoord> + '_ {
        let window = self.clipped();
        (0..window.num_y).flat_map(move |dy| {
            (0..window.num_x)
                .map(move |dx| RegionCoord::new(window.start_x + dx, window.start_y + dy))
        })
    }
}

impl fmt::Display for TileWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} regions at ({}, {})",
            self.num_x, self.num_y, self.start_x, self.start_y
        )
    }
}

/// Плотное представление окна: `num_x × num_y` ячеек, `None` там, где региона нет.
///
/// Ячейки за `u32::MAX` не хранятся; окно с такими ячейками неполное.
pub struct TileSlice<'a> {
    pub window: TileWindow,
    cells: Vec<Option<&'a Region>>,
}

impl<'a> TileSlice<'a> {
    /// Регион по смещению внутри окна
    #[must_use]
    pub fn get(&self, dx: u32, dy: u32) -> Option<&'a Region> {
        let stored = self.window.clipped();
        if dx >= stored.num_x || dy >= stored.num_y {
            return None;
        }
        self.cells[dy as usize * stored.num_x as usize + dx as usize]
    }

    pub fn present(&self) -> impl Iterator<Item = &'a Region> + '_ {
        self.cells.iter().filter_map(|cell| *cell)
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.window.is_addressable() && self.cells.iter().all(Option::is_some)
    }

    /// Первая отсутствующая представимая ячейка, если есть
    #[must_use]
    pub fn first_missing(&self) -> Option<RegionCoord> {
        self.window
            .cells()
            .zip(&self.cells)
            .find(|(_, cell)| cell.is_none())
            .map(|(coord, _)| coord)
    }
}

/// Все известные регионы, адресуемые по координате
#[derive(Debug, Default)]
pub struct RegionGrid {
    regions: HashMap<RegionCoord, Region>,
}

impl RegionGrid {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Регистрирует регион. Повторная координата отклоняется.
    pub fn add_region(&mut self, region: Region) -> Result<()> {
        if !region.heightmap.is_region_sized() {
            return Err(TerrainError::InvalidDimensions(format!(
                "region '{}' heightmap is {}x{}, expected {REGION_SIZE}x{REGION_SIZE}",
                region.name, region.heightmap.width, region.heightmap.height
            )));
        }
        if self.regions.contains_key(&region.coord) {
            return Err(TerrainError::DuplicateRegion(region.coord));
        }
        self.regions.insert(region.coord, region);
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    #[must_use]
    pub fn get(&self, coord: RegionCoord) -> Option<&Region> {
        self.regions.get(&coord)
    }

    pub fn get_mut(&mut self, coord: RegionCoord) -> Option<&mut Region> {
        self.regions.get_mut(&coord)
    }

    pub fn regions(&self) -> impl Iterator<Item = &Region> {
        self.regions.values()
    }

    /// Минимальный прямоугольник, покрывающий все зарегистрированные координаты.
    ///
    /// Размах от `0` до `u32::MAX` не помещается в `num_x`/`num_y` и даёт `InvalidDimensions`.
    pub fn bounds(&self) -> Result<TileWindow> {
        let mut coords = self.regions.keys();
        let first = coords.next().ok_or(TerrainError::EmptyGrid)?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);

        for coord in coords {
            min_x = min_x.min(coord.x);
            min_y = min_y.min(coord.y);
            max_x = max_x.max(coord.x);
            max_y = max_y.max(coord.y);
        }

        let span = |min: u32, max: u32| {
            (max - min).checked_add(1).ok_or_else(|| {
                TerrainError::InvalidDimensions(format!(
                    "regions span the whole coordinate range from {min} to {max}"
                ))
            })
        };

        Ok(TileWindow::new(
            min_x,
            min_y,
            span(min_x, max_x)?,
            span(min_y, max_y)?,
        ))
    }

    /// Плотное представление окна; непрерывность не требуется
    #[must_use]
    pub fn slice(&self, window: TileWindow) -> TileSlice<'_> {
        let cells = window.cells().map(|coord| self.regions.get(&coord)).collect();
        TileSlice { window, cells }
    }

    /// Координаты уникальны и лежат внутри `bounds`, так что полнота равна
    /// совпадению числа регионов с площадью прямоугольника
    #[must_use]
    pub fn is_rectangular_complete(&self) -> bool {
        self.bounds().is_ok_and(|bounds| {
            u64::from(bounds.num_x) * u64::from(bounds.num_y) == self.regions.len() as u64
        })
    }

    #[must_use]
    pub fn window_complete(&self, window: TileWindow) -> bool {
        window.is_addressable() && window.cells().all(|coord| self.regions.contains_key(&coord))
    }

    #[must_use]
    pub fn window_within_bounds(&self, window: TileWindow) -> bool {
        window.num_x > 0
            && window.num_y > 0
            && self.bounds().is_ok_and(|bounds| window.within(&bounds))
    }

    /// Совпадают ли размеры файла в регионах с размерами сетки
    pub fn dimensions_match(&self, num_x: u32, num_y: u32) -> Result<bool> {
        let bounds = self.bounds()?;
        Ok(bounds.num_x == num_x && bounds.num_y == num_y)
    }
}
