use crate::simulation::config::Config;
use crate::simulation::messaging::transport::{Transport, TransportError};
use crate::simulation::messaging::{telemetry_topic, StatusMessage};
use crate::simulation::telemetry::{unix_time_ms, SensorSample};
use crate::simulation::vehicle::Vehicle;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),
    #[error("telemetry thread panicked")]
    TelemetryThreadPanicked,
}

/// Owns one vehicle's publish cadence and status protocol.
///
/// `start` wires the session up in a fixed order: last will first, then
/// connect, then the VEHICLE_READY announcement, then the periodic
/// telemetry thread. Any failure up to the announcement aborts the start,
/// a session that cannot say "ready" is not worth running. Once the thread
/// ticks, publish failures are logged and swallowed.
pub struct Session {
    vehicle: Arc<Mutex<Vehicle>>,
    transport: Arc<dyn Transport>,
    shutdown_sender: watch::Sender<bool>,
    handle: JoinHandle<()>,
    final_status: StatusMessage,
    status_topic: String,
    qos: u8,
    retain: bool,
}

impl Session {
    pub fn start(
        mut vehicle: Vehicle,
        transport: Arc<dyn Transport>,
        config: &Config,
    ) -> Result<Self, SessionError> {
        // Built once, registered as the last will and republished on
        // graceful stop. Brokers drop the registered will on a clean
        // disconnect, so without the explicit republish a graceful session
        // would end silently.
        let final_status = StatusMessage::connection_lost(vehicle.id());
        transport.register_last_will(
            &config.status_topic,
            &final_status.to_payload(),
            config.qos,
            config.retain,
        )?;
        transport.connect()?;

        let ready = StatusMessage::vehicle_ready(vehicle.id());
        transport.publish(
            &config.status_topic,
            &ready.to_payload(),
            config.qos,
            config.retain,
        )?;
        info!("Vehicle {} is ready", vehicle.id());

        vehicle.start();
        let topic = telemetry_topic(&config.status_topic, vehicle.id());
        let thread_name = format!("telemetry-{}", vehicle.id());
        let vehicle = Arc::new(Mutex::new(vehicle));

        let (shutdown_sender, shutdown_receiver) = watch::channel(false);
        let loop_args = TickLoopArgs {
            vehicle: vehicle.clone(),
            transport: transport.clone(),
            topic,
            period: Duration::from_millis(config.publish_interval_ms),
            qos: config.qos,
            retain: config.retain,
            shutdown: shutdown_receiver,
        };
        let handle = thread::Builder::new()
            .name(thread_name)
            .spawn(move || run_tick_loop(loop_args))
            .expect("Failed to spawn telemetry thread");

        Ok(Session {
            vehicle,
            transport,
            shutdown_sender,
            handle,
            final_status,
            status_topic: config.status_topic.clone(),
            qos: config.qos,
            retain: config.retain,
        })
    }

    /// The vehicle stays queryable from the foreground, e.g. for reporting
    /// the last position after a stop. All access goes through the same
    /// mutex the tick loop holds while advancing.
    pub fn vehicle(&self) -> Arc<Mutex<Vehicle>> {
        self.vehicle.clone()
    }

    /// Halts the cadence and runs the teardown protocol. Joining the
    /// telemetry thread before anything else guarantees that no sample is
    /// published after the final status message.
    pub fn stop(self) -> Result<(), SessionError> {
        // The receiver may already be gone if the thread panicked, the
        // join below surfaces that.
        let _ = self.shutdown_sender.send(true);
        self.handle
            .join()
            .map_err(|_| SessionError::TelemetryThreadPanicked)?;

        self.vehicle.lock().unwrap().stop();

        self.transport.publish(
            &self.status_topic,
            &self.final_status.to_payload(),
            self.qos,
            self.retain,
        )?;
        self.transport.disconnect()?;
        info!("Session for vehicle {} ended", self.final_status.vehicle_id);
        Ok(())
    }
}

struct TickLoopArgs {
    vehicle: Arc<Mutex<Vehicle>>,
    transport: Arc<dyn Transport>,
    topic: String,
    period: Duration,
    qos: u8,
    retain: bool,
    shutdown: watch::Receiver<bool>,
}

/// The periodic publish activity. Runs on its own thread with its own
/// single-threaded tokio runtime, selecting between the ticker and the
/// shutdown channel. Advancing the vehicle and taking the sample happen
/// under one lock acquisition so no consumer can observe a torn position.
fn run_tick_loop(args: TickLoopArgs) {
    let TickLoopArgs {
        vehicle,
        transport,
        topic,
        period,
        qos,
        retain,
        mut shutdown,
    } = args;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .expect("Failed to build telemetry runtime");

    rt.block_on(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let elapsed = period.as_secs_f64();

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("Shutdown signal received, exiting telemetry loop.");
                        break;
                    }
                }
                _ = ticker.tick() => {
                    let sample = {
                        let mut vehicle = vehicle.lock().unwrap();
                        vehicle.advance(elapsed);
                        SensorSample::from_vehicle(&vehicle, unix_time_ms())
                    };
                    let payload = serde_json::to_vec(&sample)
                        .expect("Failed to serialize sensor sample");
                    // A missed telemetry publish is not fatal, the
                    // simulation keeps ticking.
                    if let Err(e) = transport.publish(&topic, &payload, qos, retain) {
                        warn!("Failed to publish sample for vehicle {}: {}", sample.vehicle_id, e);
                    }
                }
            }
        }
    });
}
