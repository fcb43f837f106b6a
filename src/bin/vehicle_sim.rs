use clap::Parser;
use rust_vsim::simulation::config::{CommandLineArgs, Config};
use rust_vsim::simulation::logging::init_logging;
use rust_vsim::simulation::messaging::transport::ConsoleTransport;
use rust_vsim::simulation::route::Route;
use rust_vsim::simulation::session::Session;
use rust_vsim::simulation::vehicle::Vehicle;
use std::path::PathBuf;
use std::sync::Arc;
use std::fs;
use tracing::{info, warn};

fn main() {
    let args = CommandLineArgs::parse();
    let config = Config::from(args);
    let _guards = init_logging(&config);
    info!("Started with config: {:?}", config);

    let route_path = config
        .route
        .clone()
        .or_else(|| discover_route(&config.waypoint_dir))
        .unwrap_or_else(|| {
            panic!(
                "No route file given and no .itn file found in {:?}",
                config.waypoint_dir
            )
        });

    info!("Loading route from {:?}", route_path);
    let parsed = Route::from_file(&route_path)
        .unwrap_or_else(|e| panic!("Failed to read route file {:?}: {}", route_path, e));
    for skipped in &parsed.skipped {
        warn!(
            "Skipping line {} of {:?}: {}",
            skipped.line_no, route_path, skipped.reason
        );
    }
    info!("Route has {} waypoints", parsed.route.len());

    let vehicle = Vehicle::new(config.vehicle_id.clone(), parsed.route, config.speed);
    let transport = Arc::new(ConsoleTransport::new());
    info!(
        "Connecting to broker {} as client {}",
        config.broker,
        config.client_id()
    );

    let session =
        Session::start(vehicle, transport, &config).expect("Failed to start vehicle session");

    wait_for_shutdown_signal();

    session.stop().expect("Failed to stop vehicle session");
}

/// Falls back to the first `.itn` file in the waypoint directory when no
/// route was configured. The files are visited in name order so the pick
/// is deterministic.
fn discover_route(waypoint_dir: &PathBuf) -> Option<PathBuf> {
    let mut candidates: Vec<PathBuf> = fs::read_dir(waypoint_dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("itn"))
        })
        .collect();
    candidates.sort();

    for candidate in &candidates {
        info!("Found route file {:?}", candidate);
    }
    candidates.into_iter().next()
}

/// Blocks the foreground until the operator requests a stop.
fn wait_for_shutdown_signal() {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_io()
        .build()
        .expect("Failed to build signal runtime");
    rt.block_on(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for ctrl-c, stopping immediately: {}", e);
        }
    });
    info!("Stop requested");
}
