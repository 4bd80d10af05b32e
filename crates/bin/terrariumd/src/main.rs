//! # terrariumd: terrarium controller daemon
//!
//! Composition root that wires all adapters together and runs the controller.
//!
//! ## Responsibilities
//! - Parse configuration (env vars, config file) and initialise logging
//! - Load the settings snapshot, writing factory defaults on first start
//! - Build the controller: wear counters, first sensor sample, timer resume,
//!   rule authority, trace start
//! - Run the control loop and the command link until SIGINT
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod config;

use std::sync::Arc;

use terrarium_adapter_link::LinkListener;
use terrarium_adapter_storage_fs::{LifecycleFile, SettingsFile, TraceDirectory};
use terrarium_adapter_virtual::{VirtualPins, VirtualProbes};
use terrarium_app::command::CommandService;
use terrarium_app::control_loop::ControlLoop;
use terrarium_app::controller::Controller;
use terrarium_app::ports::{LifecycleRepository, SensorPort, SettingsRepository};
use terrarium_app::shared::SharedController;
use terrarium_domain::error::TerrariumError;
use terrarium_domain::settings::Settings;
use terrarium_domain::time;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.logging.filter)?)
        .init();

    // Storage
    let settings_repo = Arc::new(SettingsFile::new(&config.storage.settings_path));
    let lifecycle_repo = Arc::new(LifecycleFile::new(&config.storage.lifecycle_path));
    let traces = Arc::new(TraceDirectory::new(&config.storage.trace_dir));
    let settings = load_settings(&settings_repo)?;

    // Hardware
    let pins = Arc::new(VirtualPins::default());
    let probes = Arc::new(VirtualProbes::new(
        config.simulation.room_temperature,
        config.simulation.terrarium_temperature,
    ));

    // Controller
    let now = time::now();
    let mut controller = Controller::new(settings, pins, Arc::clone(&traces));
    controller.apply_lifecycle_counters(&lifecycle_repo.load()?);
    match probes.read() {
        Ok(readings) => controller.update_sensors(readings),
        Err(err) => tracing::warn!(error = %err, "initial sensor read failed"),
    }
    controller.start(now);
    let controller = SharedController::new(controller);

    // Control loop
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let control = ControlLoop::new(
        controller.clone(),
        Arc::clone(&probes),
        Arc::clone(&lifecycle_repo),
        now,
    );
    let control_task = tokio::spawn(control.run(config.poll_interval(), shutdown_rx.clone()));

    // Command link
    let service = Arc::new(CommandService::new(
        controller.clone(),
        probes,
        settings_repo,
        Arc::clone(&lifecycle_repo),
        traces,
    ));
    let listener = LinkListener::bind(&config.bind_addr()).await?;
    tracing::info!(addr = %config.bind_addr(), "terrariumd started");
    let link_task = tokio::spawn(listener.serve(service, shutdown_rx));

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown requested");
    shutdown_tx.send(true)?;
    control_task.await?;
    link_task.await?;

    controller.persist(
        |c| Ok(c.lifecycle_counters()),
        |counters| lifecycle_repo.save(counters),
    )?;
    tracing::info!("terrariumd stopped");
    Ok(())
}

/// The persisted settings, or factory defaults written on first start.
fn load_settings(repo: &impl SettingsRepository) -> Result<Settings, TerrariumError> {
    if let Some(settings) = repo.load()? {
        settings.validate()?;
        return Ok(settings);
    }
    let settings = Settings::default();
    repo.save(&settings)?;
    tracing::info!("factory settings written");
    Ok(settings)
}
