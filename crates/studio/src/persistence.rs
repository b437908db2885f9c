//! Export and import of placed blocks as JSON.
//!
//! The export carries each block's cell, height, colour and world position,
//! plus its geographic centre when the session has a grid projection.
//! Import restores the records verbatim: no validation and no cascade.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use plotstack_engine::change::BlockChange;
use plotstack_engine::world::block::{Block, BlockColor, WorldPos};
use plotstack_engine::world::layout::ColumnLayout;
use plotstack_engine::world::position::CellPos;
use plotstack_engine::world::OccupancyStore;
use serde::{Deserialize, Serialize};

use crate::boundary::{GeoRect, GridProjection};

/// Format version written into every export.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub version: u32,
    pub unit_size_m: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<GeoRect>,
    pub blocks: Vec<BlockRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockRecord {
    pub x: i32,
    pub level: i32,
    pub z: i32,
    pub height: f32,
    pub color: u32,
    pub world: [f32; 3],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
}

impl BlockRecord {
    fn from_block(block: &Block, projection: Option<&GridProjection>) -> Self {
        let center = projection.map(|p| p.cell_center(block.cell.column()));
        Self {
            x: block.cell.x,
            level: block.cell.level,
            z: block.cell.z,
            height: block.height,
            color: block.color.rgb(),
            world: [block.world.x, block.world.y, block.world.z],
            lat: center.map(|c| c.lat),
            lng: center.map(|c| c.lng),
        }
    }

    fn to_block(&self) -> Block {
        let mut block = Block::new(
            CellPos::new(self.x, self.level, self.z),
            self.height,
            BlockColor::new(self.color),
        );
        block.world = WorldPos {
            x: self.world[0],
            y: self.world[1],
            z: self.world[2],
        };
        block
    }
}

/// Snapshot the store into an export document, ordered by (x, z, level).
pub fn snapshot(
    store: &OccupancyStore,
    projection: Option<&GridProjection>,
    unit_size_m: f64,
) -> ExportDocument {
    let mut blocks = store.all();
    blocks.sort_by_key(|b| (b.cell.x, b.cell.z, b.cell.level));
    ExportDocument {
        version: FORMAT_VERSION,
        unit_size_m,
        origin: projection.map(|p| p.origin),
        blocks: blocks
            .iter()
            .map(|b| BlockRecord::from_block(b, projection))
            .collect(),
    }
}

/// Write every placed block to `path`. Returns the number of blocks written.
pub fn export(
    store: &OccupancyStore,
    projection: Option<&GridProjection>,
    unit_size_m: f64,
    path: &Path,
) -> Result<usize> {
    let start = Instant::now();
    let doc = snapshot(store, projection, unit_size_m);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating export directory {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(&doc).context("serializing export")?;
    fs::write(path, json).with_context(|| format!("writing export {}", path.display()))?;

    // The store is now saved; forget which columns changed.
    store.take_dirty_columns();

    tracing::info!(
        "Exported {} blocks to {} in {:.1?}",
        doc.blocks.len(),
        path.display(),
        start.elapsed()
    );
    Ok(doc.blocks.len())
}

pub fn load(path: &Path) -> Result<ExportDocument> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading export {}", path.display()))?;
    let doc: ExportDocument = serde_json::from_str(&text)
        .with_context(|| format!("parsing export {}", path.display()))?;
    if doc.version != FORMAT_VERSION {
        bail!(
            "unsupported export version {} in {} (expected {})",
            doc.version,
            path.display(),
            FORMAT_VERSION
        );
    }
    Ok(doc)
}

/// Insert every record of `doc` into `store`, overwriting occupied cells,
/// then recompute world positions with `layout`. Returns the created blocks
/// as changes for the render layer.
pub fn restore_into(
    store: &OccupancyStore,
    doc: &ExportDocument,
    layout: &ColumnLayout,
) -> Vec<BlockChange> {
    let mut columns = BTreeSet::new();
    for record in &doc.blocks {
        let block = record.to_block();
        columns.insert(block.cell.column());
        store.put(block);
    }
    for column in columns {
        layout.relayout_column(store, column);
    }
    doc.blocks
        .iter()
        .filter_map(|r| store.get(CellPos::new(r.x, r.level, r.z)))
        .map(BlockChange::Created)
        .collect()
}
