//! WaysForge headless simulator
//!
//! Usage:
//!   wf-sim --spins 1000 --seed 42          - Random outcomes, reproducible
//!   wf-sim --cheat --spins 10              - Guaranteed-win mode
//!   wf-sim --config slot.yaml --json       - Custom config, JSON summary

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Context, Result, bail};
use clap::Parser;
use serde::Serialize;

use wf_core::Symbol;
use wf_event::EventBus;
use wf_slot_lab::{
    GameFlowState, GameSignal, InstantFeedback, OutcomeMode, SlotConfig, SlotGame,
    StaggeredPresenter, topics,
};

#[derive(Parser)]
#[command(name = "wf-sim", about = "Run slot spins on a virtual clock")]
struct Cli {
    /// Number of spins to run
    #[arg(short, long, default_value_t = 100)]
    spins: u64,

    /// RNG seed (overrides the config)
    #[arg(long)]
    seed: Option<u64>,

    /// Guaranteed-win mode
    #[arg(long)]
    cheat: bool,

    /// Use turbo timing instead of the configured timing
    #[arg(long)]
    turbo: bool,

    /// Config file (.json, .yaml or .yml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Virtual frame step (ms)
    #[arg(long, default_value_t = 16.0)]
    frame_ms: f64,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct Summary {
    spins: u64,
    winning_spins: u64,
    hit_rate_pct: f64,
    guaranteed_spins: u64,
    total_ways: u64,
    symbol_wins: BTreeMap<Symbol, u64>,
    state_changes: u64,
    virtual_time_ms: f64,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if !(cli.frame_ms.is_finite() && cli.frame_ms > 0.0) {
        bail!("--frame-ms must be a positive number, got {}", cli.frame_ms);
    }

    let mut config = match &cli.config {
        Some(path) => SlotConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SlotConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }
    if cli.turbo {
        config.timing = wf_slot_lab::SpinTiming::turbo();
    }

    let summary = run(config, &cli)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn run(config: SlotConfig, cli: &Cli) -> Result<Summary> {
    // generous per-spin budget: full spin plus one reveal per cell, doubled
    let cells = config.grid.total_positions() as f64;
    let spin_budget_ms = 2.0
        * (config.timing.total_spin_duration(config.grid.columns)
            + cells * config.presentation.cell_reveal_delay_ms)
        + 10.0 * cli.frame_ms;

    let bus = Arc::new(EventBus::<GameSignal>::new());
    let state_changes = Arc::new(AtomicU64::new(0));
    let counter = state_changes.clone();
    bus.subscribe(topics::STATE_CHANGED, move |_| {
        counter.fetch_add(1, Ordering::Relaxed);
    });

    let presenter = StaggeredPresenter::new(InstantFeedback::default(), config.presentation.clone());
    let mut game = SlotGame::new(config, bus, Box::new(presenter)).context("Failed to build game")?;

    if cli.cheat {
        game.toggle_cheat();
        game.tick(0.0);
    }
    log::info!(
        "Running {} spin(s) in {:?} mode",
        cli.spins,
        game.flow().lock().outcome_mode()
    );

    let mut virtual_time_ms = 0.0;
    for spin in 0..cli.spins {
        if game.press_spin() == 0 {
            bail!("spin {} could not be started: game is not idle", spin + 1);
        }

        let mut spent = 0.0;
        loop {
            game.tick(cli.frame_ms);
            spent += cli.frame_ms;
            let flow = game.flow().lock();
            if flow.state() == GameFlowState::Idle && flow.spins_completed() > spin {
                break;
            }
            if spent > spin_budget_ms {
                bail!("spin {} stuck in {} after {:.0} ms", spin + 1, flow.state(), spent);
            }
        }
        virtual_time_ms += spent;

        let recent = game.flow().lock().recent_result();
        if let Some(result) = recent {
            for win in result.wins.values() {
                let anchor = game.layout().reward_anchor(win)?;
                log::debug!(
                    "Spin {}: {} x{} ways, reward at ({:.0}, {:.0})",
                    spin + 1,
                    win.symbol,
                    result.total_ways(win.symbol),
                    anchor.x,
                    anchor.y
                );
            }
        }
    }

    let flow = game.flow().lock();
    let stats = flow.stats();
    if flow.outcome_mode() == OutcomeMode::GuaranteedWin && stats.winning_spins != stats.total_spins {
        log::warn!("Guaranteed-win mode produced losing spins, check the win catalog");
    }

    Ok(Summary {
        spins: stats.total_spins,
        winning_spins: stats.winning_spins,
        hit_rate_pct: stats.hit_rate(),
        guaranteed_spins: stats.guaranteed_spins,
        total_ways: stats.total_ways,
        symbol_wins: stats.symbol_wins.clone(),
        state_changes: state_changes.load(Ordering::Relaxed),
        virtual_time_ms,
    })
}

fn print_summary(summary: &Summary) {
    println!("Spins:          {}", summary.spins);
    println!("Winning spins:  {}", summary.winning_spins);
    println!("Hit rate:       {:.2}%", summary.hit_rate_pct);
    println!("Guaranteed:     {}", summary.guaranteed_spins);
    println!("Total ways:     {}", summary.total_ways);
    println!("Virtual time:   {:.1} s", summary.virtual_time_ms / 1000.0);
    println!("State changes:  {}", summary.state_changes);
    if !summary.symbol_wins.is_empty() {
        println!("Wins by symbol:");
        for (symbol, count) in &summary.symbol_wins {
            println!("  {:<6} {}", symbol.as_str(), count);
        }
    }
}
