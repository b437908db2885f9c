//! Studio configuration: a JSON file with every field defaulted, overridden
//! by command-line flags.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use plotstack_engine::physics::PhysicsConfig;
use plotstack_engine::world::block::BlockColor;
use plotstack_engine::world::layout::ColumnLayout;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    pub physics_enabled: bool,
    /// Real-world metres covered by one grid unit.
    pub block_unit_size_m: f64,
    pub land_base: f32,
    pub thin_base_height: f32,
    pub support_search_limit: usize,
    pub parallel_cascade: bool,
    pub default_color: u32,
    /// `0` disables the dashboard.
    pub dashboard_port: u16,
    /// Polygon to generate the ground grid from.
    pub boundary: Option<PathBuf>,
    /// Blocks to load at startup.
    pub import: Option<PathBuf>,
    /// Where placed blocks are written on autosave and on exit.
    pub export: Option<PathBuf>,
    pub autosave_secs: u64,
}

impl Default for StudioConfig {
    fn default() -> Self {
        let physics = PhysicsConfig::default();
        Self {
            physics_enabled: physics.enabled,
            block_unit_size_m: 3.0,
            land_base: physics.layout.land_base,
            thin_base_height: physics.layout.thin_base_height,
            support_search_limit: physics.support_search_limit,
            parallel_cascade: physics.parallel_cascade,
            default_color: 0x8B5A2B,
            dashboard_port: 8000,
            boundary: None,
            import: None,
            export: None,
            autosave_secs: 300,
        }
    }
}

impl StudioConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Build the configuration from `args`: `--config` picks the base file,
    /// the remaining flags override individual fields.
    pub fn from_args(args: &[String]) -> Result<Self> {
        let mut config = match flag_value(args, "--config") {
            Some(path) => Self::load(Path::new(path))?,
            None => Self::default(),
        };

        if let Some(port) = flag_value(args, "--dashboard-port") {
            config.dashboard_port = port
                .parse()
                .with_context(|| format!("invalid --dashboard-port {:?}", port))?;
        }
        if let Some(path) = flag_value(args, "--boundary") {
            config.boundary = Some(path.into());
        }
        if let Some(path) = flag_value(args, "--import") {
            config.import = Some(path.into());
        }
        if let Some(path) = flag_value(args, "--export") {
            config.export = Some(path.into());
        }
        if args.iter().any(|a| a == "--no-physics") {
            config.physics_enabled = false;
        }
        Ok(config)
    }

    /// The engine-side subset.
    pub fn physics(&self) -> PhysicsConfig {
        PhysicsConfig {
            enabled: self.physics_enabled,
            support_search_limit: self.support_search_limit,
            parallel_cascade: self.parallel_cascade,
            layout: ColumnLayout {
                land_base: self.land_base,
                thin_base_height: self.thin_base_height,
            },
        }
    }

    pub fn color(&self) -> BlockColor {
        BlockColor::new(self.default_color)
    }

    pub fn autosave_interval(&self) -> Duration {
        Duration::from_secs(self.autosave_secs.max(1))
    }
}

/// The argument following `flag`, if both are present.
fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .skip_while(|a| *a != flag)
        .nth(1)
        .map(String::as_str)
}
