use std::path::PathBuf;

use anyhow::Context;
use intellidock::animation::Tweener;
use intellidock::config::{MemorySettings, SettingsStore};
use intellidock::shell::{shared, Shared};
use intellidock::sim::{play, Scenario, SimulatedShell};
use intellidock::{DockRuntime, DockSession};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Ok(env_filter) = tracing_subscriber::EnvFilter::try_from_default_env() {
        tracing_subscriber::fmt()
            .compact()
            .with_env_filter(env_filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("info")
            .compact()
            .init();
    }

    let Some(path) = std::env::args().nth(1).map(PathBuf::from) else {
        println!("USAGE: intellidock <scenario.toml>");
        println!();
        println!("Replays a scripted session against a simulated shell and logs");
        println!("every dock transition. Settings are read from the usual");
        println!("intellidock config.toml locations.");
        return Ok(());
    };

    let scenario = Scenario::load(&path)
        .with_context(|| format!("loading scenario {}", path.display()))?;
    tracing::info!(
        "Playing {} ({} steps, {:?})",
        if scenario.name.is_empty() {
            path.display().to_string()
        } else {
            scenario.name.clone()
        },
        scenario.steps.len(),
        scenario.duration()
    );

    let shell = SimulatedShell::new(scenario.monitor);
    let store: Shared<dyn SettingsStore> = shared(MemorySettings::load());
    let session = DockSession::new(
        shell.collaborators(shared(Tweener::new()), Some(store.clone())),
        scenario.dock_width,
    );

    let (tx, rx) = mpsc::channel(64);
    let player = tokio::spawn(play(scenario, shell, tx));
    let summary = DockRuntime::new(session, Some(store), rx).run().await;
    player.await.context("scenario player panicked")?;

    tracing::info!(
        "Finished in phase {:?} after {} events and {} frames",
        summary.final_phase,
        summary.events,
        summary.frames
    );
    Ok(())
}
