//! Discretization of world space into square navigation cells.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// World-space origin used when no map backdrop bounds are available.
pub const FALLBACK_ORIGIN: Vec2 = Vec2::new(-10.0, -7.5);

/// World-space extent covered when no map backdrop bounds are available.
pub const FALLBACK_EXTENT: Vec2 = Vec2::new(20.0, 15.0);

const DEFAULT_CELL_SIZE: f32 = 0.5;

/// Location of a single navigation cell.
///
/// `y` grows in the same direction as world-space `y`, so `(0, 0)` is the
/// lower-left cell of the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoord {
    x: u32,
    y: u32,
}

impl GridCoord {
    /// Creates a new cell coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Zero-based column of the cell.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based row of the cell, counted upward from the grid origin.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: GridCoord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Row-major offset of the cell inside a `width` by `height` raster.
    ///
    /// Returns `None` when the cell lies outside the raster.
    #[must_use]
    pub fn raster_index(self, width: u32, height: u32) -> Option<usize> {
        if self.x >= width || self.y >= height {
            return None;
        }
        let width = usize::try_from(width).ok()?;
        let x = usize::try_from(self.x).ok()?;
        let y = usize::try_from(self.y).ok()?;
        y.checked_mul(width)?.checked_add(x)
    }
}

/// Cardinal step between two neighbouring cells, or no step at all.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridDelta {
    dx: i8,
    dy: i8,
}

impl GridDelta {
    /// No movement.
    pub const ZERO: Self = Self { dx: 0, dy: 0 };
    /// Step toward increasing `y`.
    pub const UP: Self = Self { dx: 0, dy: 1 };
    /// Step toward decreasing `y`.
    pub const DOWN: Self = Self { dx: 0, dy: -1 };
    /// Step toward increasing `x`.
    pub const RIGHT: Self = Self { dx: 1, dy: 0 };
    /// Step toward decreasing `x`.
    pub const LEFT: Self = Self { dx: -1, dy: 0 };

    /// The four cardinal steps in the order neighbours are visited.
    ///
    /// Field derivation resolves ties in favour of the earliest entry.
    pub const CARDINALS: [Self; 4] = [Self::UP, Self::DOWN, Self::RIGHT, Self::LEFT];

    /// Horizontal component of the step.
    #[must_use]
    pub const fn dx(&self) -> i8 {
        self.dx
    }

    /// Vertical component of the step.
    #[must_use]
    pub const fn dy(&self) -> i8 {
        self.dy
    }

    /// Reports whether the delta describes no movement.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.dx == 0 && self.dy == 0
    }

    /// World-space unit vector matching the step, or zero.
    #[must_use]
    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(f32::from(self.dx), f32::from(self.dy))
    }
}

/// World-space rectangle covered by the map backdrop.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapBounds {
    min: Vec2,
    max: Vec2,
}

impl MapBounds {
    /// Creates bounds from two opposite corners in any order.
    #[must_use]
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Lower-left corner.
    #[must_use]
    pub const fn min(&self) -> Vec2 {
        self.min
    }

    /// Upper-right corner.
    #[must_use]
    pub const fn max(&self) -> Vec2 {
        self.max
    }

    /// Width and height of the bounds.
    #[must_use]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }
}

/// Tunables that control how map bounds are discretized.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    cell_size: f32,
    center_in_bounds: bool,
    margin: f32,
}

impl GridSettings {
    /// Creates validated grid settings.
    ///
    /// `cell_size` must be finite and positive. `margin` is the fraction of
    /// the map extent left uncovered and must lie in `[0, 1)`.
    pub fn new(
        cell_size: f32,
        center_in_bounds: bool,
        margin: f32,
    ) -> Result<Self, GridSettingsError> {
        let settings = Self {
            cell_size,
            center_in_bounds,
            margin,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Checks the invariants documented on [`GridSettings::new`].
    ///
    /// Deserialized settings bypass the constructor, so loaders call this
    /// before handing them to the world.
    pub fn validate(&self) -> Result<(), GridSettingsError> {
        if !self.cell_size.is_finite() || self.cell_size <= 0.0 {
            return Err(GridSettingsError::InvalidCellSize(self.cell_size));
        }
        if !(0.0..1.0).contains(&self.margin) {
            return Err(GridSettingsError::MarginOutOfRange(self.margin));
        }
        Ok(())
    }

    /// Side length of a single cell in world units.
    #[must_use]
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Whether the grid is centered within the bounds rather than anchored at their minimum.
    #[must_use]
    pub const fn center_in_bounds(&self) -> bool {
        self.center_in_bounds
    }

    /// Fraction of the map extent excluded from the grid.
    #[must_use]
    pub const fn margin(&self) -> f32 {
        self.margin
    }
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            center_in_bounds: true,
            margin: 0.0,
        }
    }
}

/// Reasons grid settings can be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum GridSettingsError {
    /// The cell size was zero, negative, or not finite.
    #[error("cell size must be a positive finite number, got {0}")]
    InvalidCellSize(f32),
    /// The margin fell outside `[0, 1)`.
    #[error("grid margin must lie in [0, 1), got {0}")]
    MarginOutOfRange(f32),
}

/// Mapping between world space and integer cell coordinates.
///
/// A grid is a plain value: re-initialization builds a new one and replaces
/// the old value wholesale.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    origin: Vec2,
    cell_size: f32,
    width: u32,
    height: u32,
}

impl Grid {
    /// Creates a grid with explicit parameters.
    ///
    /// `cell_size` is expected to be positive; use [`GridSettings`] when the
    /// value comes from untrusted input.
    #[must_use]
    pub const fn new(origin: Vec2, cell_size: f32, width: u32, height: u32) -> Self {
        Self {
            origin,
            cell_size,
            width,
            height,
        }
    }

    /// Discretizes the map backdrop bounds, or the fallback extent when absent.
    #[must_use]
    pub fn from_bounds(bounds: Option<MapBounds>, settings: &GridSettings) -> Self {
        let cell_size = settings.cell_size();
        let Some(bounds) = bounds else {
            return Self::fallback(cell_size);
        };

        let extent = bounds.size() * (1.0 - settings.margin());
        let width = cells_along(extent.x, cell_size);
        let height = cells_along(extent.y, cell_size);

        let origin = if settings.center_in_bounds() {
            let covered = Vec2::new(width as f32, height as f32) * cell_size;
            bounds.min() + (extent - covered) * 0.5
        } else {
            bounds.min()
        };

        Self::new(origin, cell_size, width, height)
    }

    /// Grid covering [`FALLBACK_EXTENT`] anchored at [`FALLBACK_ORIGIN`].
    #[must_use]
    pub fn fallback(cell_size: f32) -> Self {
        Self::new(
            FALLBACK_ORIGIN,
            cell_size,
            cells_along(FALLBACK_EXTENT.x, cell_size),
            cells_along(FALLBACK_EXTENT.y, cell_size),
        )
    }

    /// World-space position of the grid's lower-left corner.
    #[must_use]
    pub const fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Side length of a cell in world units.
    #[must_use]
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Number of cell columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of cell rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Total number of cells.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        let width = usize::try_from(self.width).unwrap_or(0);
        let height = usize::try_from(self.height).unwrap_or(0);
        width.checked_mul(height).unwrap_or(0)
    }

    /// Converts a world position into the cell containing it.
    ///
    /// Positions outside the grid are clamped onto the nearest edge cell.
    #[must_use]
    pub fn world_to_grid(&self, position: Vec2) -> GridCoord {
        let local = (position - self.origin) / self.cell_size;
        GridCoord::new(
            clamp_axis(local.x, self.width),
            clamp_axis(local.y, self.height),
        )
    }

    /// World-space center of the provided cell.
    #[must_use]
    pub fn grid_to_world(&self, coord: GridCoord) -> Vec2 {
        let cell = Vec2::new(coord.x() as f32, coord.y() as f32);
        self.origin + (cell + Vec2::splat(0.5)) * self.cell_size
    }

    /// Moves a world position onto the center of its cell.
    #[must_use]
    pub fn snap_to_grid(&self, position: Vec2) -> Vec2 {
        self.grid_to_world(self.world_to_grid(position))
    }

    /// Reports whether the coordinate lies inside the grid.
    #[must_use]
    pub const fn is_valid(&self, coord: GridCoord) -> bool {
        coord.x() < self.width && coord.y() < self.height
    }

    /// Applies a cardinal step, returning `None` when it leaves the grid.
    #[must_use]
    pub fn offset(&self, coord: GridCoord, delta: GridDelta) -> Option<GridCoord> {
        let x = coord.x().checked_add_signed(i32::from(delta.dx()))?;
        let y = coord.y().checked_add_signed(i32::from(delta.dy()))?;
        let next = GridCoord::new(x, y);
        self.is_valid(next).then_some(next)
    }

    /// Cardinal neighbours inside the grid, in up, down, right, left order.
    pub fn neighbors4(&self, coord: GridCoord) -> impl Iterator<Item = GridCoord> {
        let mut candidates = [None; 4];
        for (slot, delta) in candidates.iter_mut().zip(GridDelta::CARDINALS) {
            *slot = self.offset(coord, delta);
        }
        candidates.into_iter().flatten()
    }

    /// Reports whether any obstacle position maps onto the provided cell.
    ///
    /// Each obstacle occupies exactly the cell its position falls into.
    /// Coordinates outside the grid are always blocked.
    #[must_use]
    pub fn is_blocked<I>(&self, coord: GridCoord, obstacles: I) -> bool
    where
        I: IntoIterator<Item = Vec2>,
    {
        if !self.is_valid(coord) {
            return true;
        }

        obstacles
            .into_iter()
            .any(|position| self.world_to_grid(position) == coord)
    }

    /// Row-major offset of a valid coordinate.
    #[must_use]
    pub fn index(&self, coord: GridCoord) -> Option<usize> {
        coord.raster_index(self.width, self.height)
    }

    /// Every cell in raster order: rows bottom to top, columns left to right.
    pub fn coords(&self) -> impl Iterator<Item = GridCoord> {
        let width = self.width;
        (0..self.height).flat_map(move |y| (0..width).map(move |x| GridCoord::new(x, y)))
    }
}

fn cells_along(length: f32, cell_size: f32) -> u32 {
    if !(length > 0.0) || !(cell_size > 0.0) {
        return 0;
    }
    (length / cell_size).floor() as u32
}

fn clamp_axis(value: f32, cells: u32) -> u32 {
    let last = cells.saturating_sub(1);
    let floored = value.floor();
    if !(floored > 0.0) {
        return 0;
    }
    if floored >= last as f32 {
        last
    } else {
        floored as u32
    }
}
