//! Line-oriented command console standing in for the interactive front end.
//!
//! Each line is one command; coordinates are grid cells.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use plotstack_engine::change::BlockChange;
use plotstack_engine::placement::Direction;
use plotstack_engine::world::block::BlockColor;
use plotstack_engine::world::position::{CellPos, ColumnPos, COORD_LIMIT};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::intent::{Hit, Intent};
use crate::persistence;
use crate::session::{Outcome, SharedSession};

pub const HELP: &str = "\
commands:
  place <x> <z>                        place at the lowest free level of a grid cell
  alt <x> <z>                          fill the first gap below the top of a column
  click <x> <level> <z> [face]         click a block; face = up|down|north|south|east|west
  below <x> <level> <z>                place below a block
  remove <x> <level> <z>               remove a block (unsupported blocks collapse)
  physics on|off                       toggle support enforcement
  color <rrggbb>                       colour for new blocks
  clear | count | export [path] | help | quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Intent(Intent),
    Physics(bool),
    Color(BlockColor),
    Clear,
    Count,
    Export(Option<PathBuf>),
    Help,
    Quit,
}

/// Parse one console line. Blank lines parse to `None`.
pub fn parse(line: &str) -> Result<Option<Command>> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let Some((&name, args)) = words.split_first() else {
        return Ok(None);
    };

    let command = match name {
        "place" => Command::Intent(Intent::click_grid(column(args)?)),
        "alt" => Command::Intent(Intent::click_grid(column(args)?).with_alt()),
        "click" => {
            let hit = match args.get(3) {
                Some(face) => Hit::Face(face_normal(face)?),
                None => Hit::None,
            };
            Command::Intent(Intent::click_block(cell(args)?, hit))
        }
        "below" => Command::Intent(Intent::click_block(cell(args)?, Hit::None).with_alt()),
        "remove" => Command::Intent(Intent::click_block(cell(args)?, Hit::None).with_shift()),
        "physics" => match args.first().copied() {
            Some("on") => Command::Physics(true),
            Some("off") => Command::Physics(false),
            _ => bail!("usage: physics on|off"),
        },
        "color" => {
            let hex = args.first().ok_or_else(|| anyhow!("usage: color <rrggbb>"))?;
            let rgb = u32::from_str_radix(hex.trim_start_matches('#'), 16)
                .with_context(|| format!("invalid colour {:?}", hex))?;
            Command::Color(BlockColor::new(rgb))
        }
        "clear" => Command::Clear,
        "count" => Command::Count,
        "export" => Command::Export(args.first().map(PathBuf::from)),
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => bail!("unknown command {:?} (try `help`)", other),
    };
    Ok(Some(command))
}

fn int(args: &[&str], index: usize) -> Result<i32> {
    let raw = args
        .get(index)
        .ok_or_else(|| anyhow!("missing coordinate #{}", index + 1))?;
    let value: i32 = raw
        .parse()
        .with_context(|| format!("invalid coordinate {:?}", raw))?;
    if !(-COORD_LIMIT..=COORD_LIMIT).contains(&value) {
        bail!("coordinate {} is outside ±{}", value, COORD_LIMIT);
    }
    Ok(value)
}

fn column(args: &[&str]) -> Result<ColumnPos> {
    Ok(ColumnPos::new(int(args, 0)?, int(args, 1)?))
}

fn cell(args: &[&str]) -> Result<CellPos> {
    Ok(CellPos::new(int(args, 0)?, int(args, 1)?, int(args, 2)?))
}

fn face_normal(face: &str) -> Result<[f32; 3]> {
    match face {
        "up" => Ok([0.0, 1.0, 0.0]),
        "down" => Ok([0.0, -1.0, 0.0]),
        other => {
            let direction =
                Direction::parse(other).ok_or_else(|| anyhow!("unknown face {:?}", other))?;
            let (dx, dz) = direction.offset();
            Ok([dx as f32, 0.0, dz as f32])
        }
    }
}

/// Execute one command against the session and describe the result.
///
/// The session lock is held for the whole command.
pub fn execute(session: &SharedSession, command: Command, default_export: Option<&Path>) -> Result<String> {
    let mut session = session
        .lock()
        .map_err(|_| anyhow!("session lock poisoned"))?;

    let reply = match command {
        Command::Intent(intent) => match session.apply(&intent) {
            Outcome::Changed(changes) => {
                let summary: Vec<String> = changes
                    .iter()
                    .filter(|c| !matches!(c, BlockChange::Updated(_)))
                    .map(|c| format!("{} {}", kind(c), c.cell()))
                    .collect();
                format!("{} ({} blocks)", summary.join(", "), session.block_count())
            }
            Outcome::Unchanged => "nothing to do".to_string(),
            Outcome::Rejected(err) => format!("rejected: {}", err),
        },
        Command::Physics(enabled) => {
            let fell = session.set_physics(enabled).iter().filter(|c| c.is_removal()).count();
            format!("physics {} ({} blocks collapsed)", if enabled { "on" } else { "off" }, fell)
        }
        Command::Color(color) => {
            session.set_color(color);
            format!("colour #{:06x}", color.rgb())
        }
        Command::Clear => format!("removed {} blocks", session.clear()),
        Command::Count => format!("{} blocks", session.block_count()),
        Command::Export(path) => {
            let path = path
                .as_deref()
                .or(default_export)
                .ok_or_else(|| anyhow!("no export path given and none configured"))?;
            let written = persistence::export(
                session.store(),
                session.projection(),
                session.unit_size_m(),
                path,
            )?;
            format!("exported {} blocks to {}", written, path.display())
        }
        Command::Help => HELP.to_string(),
        Command::Quit => "bye".to_string(),
    };
    Ok(reply)
}

fn kind(change: &BlockChange) -> &'static str {
    match change {
        BlockChange::Created(_) => "placed",
        BlockChange::Updated(_) => "updated",
        BlockChange::Removed(_) => "removed",
        BlockChange::Collapsed(_) => "collapsed",
    }
}

/// Read commands from stdin until `quit` or end of input.
pub async fn run(session: SharedSession, default_export: Option<PathBuf>) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        let command = match parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("error: {:#}", e);
                continue;
            }
        };
        let quit = command == Command::Quit;
        match execute(&session, command, default_export.as_deref()) {
            Ok(reply) => println!("{}", reply),
            Err(e) => println!("error: {:#}", e),
        }
        if quit {
            break;
        }
    }
    Ok(())
}
