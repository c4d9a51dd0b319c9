// src/main.rs
mod config;
mod sensors;
mod telemetry;
use std::fs;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use anyhow::Context;
use log::{error, info, warn};
use crate::config::DashboardConfig;
use crate::telemetry::{
    render_group_png, GroupSnapshot, PlotStyle, ResetController, Sampler, TelemetryStore,
};
/// Operator input read from stdin.
enum Command {
    Reset,
    Quit,
}
fn load_config() -> anyhow::Result<DashboardConfig> {
    match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => DashboardConfig::load(&path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => {
            info!("no config file given, using built-in Enviro+ layout");
            Ok(DashboardConfig::default())
        }
    }
}
/// File name for a group's outputs, e.g. "Particulate matters" -> "particulate_matters".
fn slug(title: &str) -> String {
    title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect()
}
fn publish(snapshot: &GroupSnapshot, dir: &Path) -> anyhow::Result<()> {
    let base = dir.join(slug(&snapshot.title));
    fs::write(base.with_extension("json"), snapshot.to_json()?)?;
    let png = render_group_png(snapshot, PlotStyle::default())?;
    fs::write(base.with_extension("png"), png)?;
    Ok(())
}
/// Renders every chart from its own snapshot and logs the newest readings.
fn publish_all(store: &TelemetryStore, dir: &Path) {
    let mut newest = None;
    for spec in store.specs() {
        let Some(snapshot) = store.export_group(&spec.title) else {
            continue;
        };
        if let Err(err) = publish(&snapshot, dir) {
            error!("failed to publish `{}`: {err:#}", snapshot.title);
        }
        if snapshot.is_empty() {
            continue;
        }
        let readings: Vec<String> = snapshot
            .latest_readings()
            .into_iter()
            .map(|(name, value)| match value {
                Some(v) => format!("{name}={v}"),
                None => format!("{name}=-"),
            })
            .collect();
        info!("{} [{}]: {}", snapshot.title, snapshot.unit, readings.join(" "));
        newest = newest.max(snapshot.latest_tick().map(|tick| (tick, snapshot.len())));
    }
    if let Some((tick, held)) = newest {
        info!("most recent update: tick #{} ({held} ticks held)", tick.seq);
    }
}
fn spawn_stdin_reader(tx: mpsc::Sender<Command>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            let command = match line.trim() {
                "reset" => Command::Reset,
                "quit" | "exit" => Command::Quit,
                "" => continue,
                other => {
                    warn!("unknown command `{other}` (try `reset` or `quit`)");
                    continue;
                }
            };
            if tx.send(command).is_err() {
                return;
            }
        }
        info!("stdin closed, no more operator commands");
    });
}
fn main() -> anyhow::Result<()> {
    env_logger::init();
    let config = load_config()?;
    fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("creating {}", config.output_dir.display()))?;
    let store = Arc::new(TelemetryStore::new(config.capacity, &config.channel_set)?);
    let bindings = sensors::simulated_bindings(&config)?;
    let sampler = Sampler::new(Arc::clone(&store), bindings, config.read_timeout())?;
    let interval = config.tick_interval();
    let handle = sampler.spawn(interval)?;
    let resetter = ResetController::new(Arc::clone(&store));
    info!(
        "sampling {} groups every {:?}, keeping {} ticks; writing to {}",
        store.specs().len(),
        interval,
        store.capacity(),
        config.output_dir.display()
    );
    // Keep one sender here so a closed stdin does not end the render loop.
    let (tx, rx) = mpsc::channel();
    spawn_stdin_reader(tx.clone());
    // Render loop: pull snapshots on our own schedule, independent of the sampler.
    loop {
        match rx.recv_timeout(interval) {
            Ok(Command::Reset) => resetter.reset(),
            Ok(Command::Quit) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => publish_all(&store, &config.output_dir),
        }
    }
    handle.shutdown();
    info!("shut down");
    Ok(())
}
