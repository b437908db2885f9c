use std::path::Path;
use std::sync::Arc;

use plotstack_engine::world::position::{CellPos, ColumnPos};
use plotstack_studio::boundary::{self, Boundary};
use plotstack_studio::config::StudioConfig;
use plotstack_studio::dashboard::{self, DashboardState, Metrics};
use plotstack_studio::event_bus::{self, StudioEvent};
use plotstack_studio::intent::{Hit, Intent};
use plotstack_studio::persistence;
use plotstack_studio::session::{Session, SharedSession};
use tokio::sync::broadcast;

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().collect();
    let demo_mode = args.iter().any(|a| a == "--demo");

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = match StudioConfig::from_args(&args) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {:#}", e);
            std::process::exit(2);
        }
    };

    let (bus_tx, _) = broadcast::channel::<StudioEvent>(event_bus::BUS_CAPACITY);
    let metrics = Arc::new(Metrics::new());

    if demo_mode {
        run_demo(&config, metrics, bus_tx);
        return;
    }

    tracing::info!("plotstack -- block placement studio");

    let mut session = Session::new(&config, Arc::clone(&metrics), bus_tx.clone());

    // ── Ground grid from the boundary polygon ────────────────────────────
    if let Some(path) = &config.boundary {
        match Boundary::load(path)
            .and_then(|b| boundary::generate_grid(&b, config.block_unit_size_m))
        {
            Ok(Some(grid)) => {
                session.replace_grid(grid);
            }
            Ok(None) => tracing::warn!("Boundary {} encloses no area", path.display()),
            Err(e) => tracing::error!("Failed to build grid: {:#}", e),
        }
    } else {
        tracing::warn!("No boundary configured; every placement needs a block beneath it");
    }

    // ── Previously exported blocks ───────────────────────────────────────
    if let Some(path) = &config.import {
        match persistence::load(path) {
            Ok(doc) => {
                let created =
                    persistence::restore_into(session.store(), &doc, &session.physics().layout);
                tracing::info!("Imported {} blocks from {}", created.len(), path.display());
                session.announce(created);
            }
            Err(e) => tracing::error!("Failed to import blocks: {:#}", e),
        }
    }

    let session = session.shared();

    // Stats dashboard (non-blocking, runs on its own tasks).
    if config.dashboard_port != 0 {
        let dash = Arc::new(DashboardState::new(Arc::clone(&metrics), bus_tx.clone()));
        let port = config.dashboard_port;
        tokio::spawn(async move {
            dashboard::server::start(dash, port).await;
        });
    }

    // ── Periodic autosave ────────────────────────────────────────────────
    if let Some(path) = config.export.clone() {
        let autosave_session = Arc::clone(&session);
        let interval_len = config.autosave_interval();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(interval_len);
            interval.tick().await; // first tick is immediate, skip it
            loop {
                interval.tick().await;
                if let Err(e) = save_if_dirty(&autosave_session, &path) {
                    tracing::error!("Autosave failed: {:#}", e);
                }
            }
        });
    }

    // ── Console until quit, end of input, or Ctrl+C ──────────────────────
    println!("{}", plotstack_studio::console::HELP);
    tokio::select! {
        result = plotstack_studio::console::run(Arc::clone(&session), config.export.clone()) => {
            if let Err(e) = result {
                tracing::error!("Console error: {:#}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Ctrl+C received, shutting down...");
        }
    }

    // ── Save on shutdown ─────────────────────────────────────────────────
    if let Some(path) = &config.export {
        tracing::info!("Saving blocks before exit...");
        if let Err(e) = save_if_dirty(&session, path) {
            tracing::error!("Shutdown save failed: {:#}", e);
        }
    }
}

/// Export the session's blocks if anything changed since the last export.
fn save_if_dirty(session: &SharedSession, path: &Path) -> anyhow::Result<()> {
    let session = session
        .lock()
        .map_err(|_| anyhow::anyhow!("session lock poisoned"))?;
    if session.store().dirty_count() == 0 {
        tracing::debug!("Nothing to save (no changed columns)");
        return Ok(());
    }
    persistence::export(
        session.store(),
        session.projection(),
        session.unit_size_m(),
        path,
    )?;
    Ok(())
}

/// Two-column collapse walkthrough for checking the engine end to end.
fn run_demo(config: &StudioConfig, metrics: Arc<Metrics>, bus: broadcast::Sender<StudioEvent>) {
    tracing::info!("plotstack -- collapse demo");

    let mut session = Session::new(config, Arc::clone(&metrics), bus);
    session.replace_grid_cells([ColumnPos::new(0, 0), ColumnPos::new(1, 0)]);

    let steps = [
        Intent::click_grid(ColumnPos::new(0, 0)),
        Intent::click_grid(ColumnPos::new(1, 0)),
        Intent::click_block(CellPos::new(0, 0, 0), Hit::Face([0.0, 1.0, 0.0])),
        Intent::click_block(CellPos::new(1, 0, 0), Hit::Face([0.0, 1.0, 0.0])),
        Intent::click_block(CellPos::new(0, 1, 0), Hit::Face([0.0, 0.0, 1.0])),
        Intent::click_block(CellPos::new(0, 0, 0), Hit::None).with_shift(),
        Intent::click_block(CellPos::new(1, 0, 0), Hit::None).with_shift(),
    ];

    for intent in &steps {
        let outcome = session.apply(intent);
        tracing::info!(
            "{:?} -> {} changes, {} blocks",
            intent.target,
            outcome.changes().len(),
            session.block_count()
        );
    }

    if session.block_count() == 0 {
        tracing::info!("Everything above the removed ground collapsed.");
    } else {
        tracing::warn!("{} blocks still standing -- something is off.", session.block_count());
    }
    tracing::info!("Metrics: {:?}", metrics.snapshot());
}
