//! Grid Slot Allocator - lays a flat item list onto the honeycomb grid.
//!
//! Slots are numbered from 1 in row-major order. Some positions are
//! reserved for decorative images ([`DecorMap`]); every other position is a
//! data slot, filled with items in arrival order. The grid grows a whole
//! row at a time until every item has a slot, and the last row is padded
//! with empty data slots.
//!
//! ```
//! use kkultip_sync::grid::{allocate, DecorMap, DecorSlot, GridConfig};
//!
//! let mut decor = DecorMap::new();
//! decor.insert(2, DecorSlot::image("/img/1bee.png"));
//!
//! let grid = allocate(vec!["a", "b", "c"], &decor, &GridConfig::new(3, 3)).unwrap();
//! assert_eq!(grid.total_slots(), 6);
//! assert_eq!(grid.data_count(), 3);
//! ```

pub mod presets;

use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Decorative image placed in a reserved slot. Size and offset values are
/// opaque style tokens handed through to the renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DecorSlot {
    pub src: Option<String>,
    pub width: String,
    pub height: String,
    pub top: String,
    pub left: Option<String>,
    pub rotate: Option<String>,
    pub transform: Option<String>,
    pub z: Option<i32>,
}

const DEFAULT_DECOR_Z: i32 = 5;

impl DecorSlot {
    pub fn image(src: impl Into<String>) -> Self {
        DecorSlot {
            src: Some(src.into()),
            ..Self::default()
        }
    }

    /// A reserved slot that renders as a transparent hexagon.
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn z_order(&self) -> i32 {
        self.z.unwrap_or(DEFAULT_DECOR_Z)
    }

    pub fn has_image(&self) -> bool {
        self.src.as_deref().is_some_and(|s| !s.is_empty())
    }
}

/// Decorative slots keyed by 1-based linear index.
pub type DecorMap = BTreeMap<usize, DecorSlot>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GridConfig {
    pub columns: usize,
    /// Minimum number of slots, before growth.
    pub min_slots: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig {
            columns: 5,
            min_slots: 30,
        }
    }
}

impl GridConfig {
    pub fn new(columns: usize, min_slots: usize) -> Self {
        GridConfig { columns, min_slots }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridError {
    ZeroColumns,
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::ZeroColumns => write!(f, "grid needs at least one column"),
        }
    }
}

impl std::error::Error for GridError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot<'a, T> {
    Decor { index: usize, slot: &'a DecorSlot },
    Data { index: usize, item: Option<T> },
}

impl<T> Slot<'_, T> {
    /// 1-based linear index.
    pub fn index(&self) -> usize {
        match self {
            Slot::Decor { index, .. } | Slot::Data { index, .. } => *index,
        }
    }

    pub fn item(&self) -> Option<&T> {
        match self {
            Slot::Data { item, .. } => item.as_ref(),
            Slot::Decor { .. } => None,
        }
    }

    pub fn is_decor(&self) -> bool {
        matches!(self, Slot::Decor { .. })
    }
}

/// Allocated grid, stored in linear order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid<'a, T> {
    columns: usize,
    slots: Vec<Slot<'a, T>>,
}

impl<'a, T> Grid<'a, T> {
    pub fn total_slots(&self) -> usize {
        self.slots.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.slots.len() / self.columns
    }

    pub fn slots(&self) -> &[Slot<'a, T>] {
        &self.slots
    }

    /// Slot at 1-based linear `index`.
    pub fn slot(&self, index: usize) -> Option<&Slot<'a, T>> {
        index.checked_sub(1).and_then(|i| self.slots.get(i))
    }

    pub fn data_count(&self) -> usize {
        self.slots.iter().filter(|s| s.item().is_some()).count()
    }

    /// Column-major view: column `j`, row `i` is linear slot `i * columns + j`.
    pub fn columns(&self) -> Vec<Vec<&Slot<'a, T>>> {
        (0..self.columns)
            .map(|j| {
                (0..self.rows())
                    .filter_map(|i| self.slots.get(i * self.columns + j))
                    .collect()
            })
            .collect()
    }

    /// Whether column `j` is pushed down for the honeycomb offset.
    pub fn is_shifted(&self, column: usize) -> bool {
        column % 2 == 0
    }
}

/// Number of slots needed for `items` data items around `decor`.
pub fn total_slots(items: usize, decor: &DecorMap, config: &GridConfig) -> Result<usize, GridError> {
    let columns = config.columns;
    if columns == 0 {
        return Err(GridError::ZeroColumns);
    }
    let max_decor = decor.keys().next_back().copied().unwrap_or(0);
    let mut total = config.min_slots.max(max_decor);
    while total - decor.range(1..=total).count() < items {
        total += columns;
    }
    Ok(total.div_ceil(columns) * columns)
}

/// Lay `items` out around the decorative slots in `decor`.
pub fn allocate<'a, T>(
    items: impl IntoIterator<Item = T>,
    decor: &'a DecorMap,
    config: &GridConfig,
) -> Result<Grid<'a, T>, GridError> {
    let mut queue: VecDeque<T> = items.into_iter().collect();
    let total = total_slots(queue.len(), decor, config)?;

    let slots = (1..=total)
        .map(|index| match decor.get(&index) {
            Some(slot) => Slot::Decor { index, slot },
            None => Slot::Data {
                index,
                item: queue.pop_front(),
            },
        })
        .collect();

    Ok(Grid {
        columns: config.columns,
        slots,
    })
}
