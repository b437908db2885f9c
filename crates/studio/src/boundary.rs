//! Boundary polygon -> ground grid.
//!
//! The polygon is in geographic degrees. Cells are squares of
//! `unit_m` metres laid out from the north-west corner of the polygon's
//! bounding rectangle: `x` grows east, `z` grows south. Metres are converted
//! to degrees with an equirectangular approximation, which is accurate
//! enough for boundaries a few kilometres across.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use plotstack_engine::world::position::ColumnPos;
use serde::{Deserialize, Serialize};

/// Metres per degree of latitude.
const METRES_PER_DEGREE: f64 = 111_320.0;

/// Refuse to generate grids larger than this many candidate cells.
pub const MAX_GRID_CELLS: usize = 4_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoRect {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boundary {
    pub polygon: Vec<LatLng>,
}

impl Boundary {
    pub fn new(polygon: Vec<LatLng>) -> Self {
        Self { polygon }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading boundary {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("parsing boundary {}", path.display()))
    }

    /// Fewer than three vertices enclose nothing.
    pub fn is_degenerate(&self) -> bool {
        self.polygon.len() < 3
    }

    pub fn bounding_rect(&self) -> Option<GeoRect> {
        let first = self.polygon.first()?;
        let init = GeoRect {
            south: first.lat,
            west: first.lng,
            north: first.lat,
            east: first.lng,
        };
        Some(self.polygon.iter().fold(init, |r, p| GeoRect {
            south: r.south.min(p.lat),
            west: r.west.min(p.lng),
            north: r.north.max(p.lat),
            east: r.east.max(p.lng),
        }))
    }

    /// Even-odd ray cast along +lng.
    pub fn contains(&self, point: LatLng) -> bool {
        let mut inside = false;
        let n = self.polygon.len();
        for i in 0..n {
            let a = self.polygon[i];
            let b = self.polygon[(i + n - 1) % n];
            if (a.lat > point.lat) != (b.lat > point.lat) {
                let cross = a.lng + (point.lat - a.lat) / (b.lat - a.lat) * (b.lng - a.lng);
                if point.lng < cross {
                    inside = !inside;
                }
            }
        }
        inside
    }
}

/// Conversion between grid cells and geographic coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridProjection {
    pub origin: GeoRect,
    /// Cell size in degrees of latitude.
    pub cell_lat: f64,
    /// Cell size in degrees of longitude at the rectangle's mid-latitude.
    pub cell_lng: f64,
}

impl GridProjection {
    pub fn new(origin: GeoRect, unit_m: f64) -> Self {
        let mid_lat = (origin.south + origin.north) / 2.0;
        let cell_lat = unit_m / METRES_PER_DEGREE;
        let cell_lng = unit_m / (METRES_PER_DEGREE * mid_lat.to_radians().cos().max(1e-6));
        Self {
            origin,
            cell_lat,
            cell_lng,
        }
    }

    /// Geographic centre of a cell.
    pub fn cell_center(&self, column: ColumnPos) -> LatLng {
        LatLng {
            lat: self.origin.north - (column.z as f64 + 0.5) * self.cell_lat,
            lng: self.origin.west + (column.x as f64 + 0.5) * self.cell_lng,
        }
    }

    /// The cell containing `point`.
    pub fn cell_at(&self, point: LatLng) -> ColumnPos {
        ColumnPos::new(
            ((point.lng - self.origin.west) / self.cell_lng).floor() as i32,
            ((self.origin.north - point.lat) / self.cell_lat).floor() as i32,
        )
    }

    /// Columns (x) and rows (z) needed to cover the rectangle.
    pub fn dimensions(&self) -> (usize, usize) {
        let cols = ((self.origin.east - self.origin.west) / self.cell_lng).ceil().max(1.0);
        let rows = ((self.origin.north - self.origin.south) / self.cell_lat).ceil().max(1.0);
        (cols as usize, rows as usize)
    }
}

/// A generated grid: the projection it was laid out with plus the cells
/// whose centres fall inside the boundary, in row-major order.
#[derive(Debug, Clone)]
pub struct GeneratedGrid {
    pub projection: GridProjection,
    pub cells: Vec<ColumnPos>,
}

pub fn generate_grid(boundary: &Boundary, unit_m: f64) -> Result<Option<GeneratedGrid>> {
    if unit_m.is_nan() || unit_m <= 0.0 {
        bail!("grid unit must be positive, got {}", unit_m);
    }
    if boundary.is_degenerate() {
        return Ok(None);
    }
    let Some(rect) = boundary.bounding_rect() else {
        return Ok(None);
    };

    let projection = GridProjection::new(rect, unit_m);
    let (cols, rows) = projection.dimensions();
    if cols.saturating_mul(rows) > MAX_GRID_CELLS {
        bail!(
            "boundary spans {}x{} cells of {} m, more than the {} cell limit",
            cols,
            rows,
            unit_m,
            MAX_GRID_CELLS
        );
    }

    let mut cells = Vec::new();
    for z in 0..rows as i32 {
        for x in 0..cols as i32 {
            let column = ColumnPos::new(x, z);
            if boundary.contains(projection.cell_center(column)) {
                cells.push(column);
            }
        }
    }

    tracing::info!(
        "Generated grid: {} of {}x{} cells inside the boundary",
        cells.len(),
        cols,
        rows
    );
    Ok(Some(GeneratedGrid { projection, cells }))
}
