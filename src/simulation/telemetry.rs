use crate::simulation::route::Coordinate;
use crate::simulation::vehicle::{Vehicle, VehicleMode};
use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

/// One telemetry snapshot, taken fresh on every publish tick and never
/// mutated afterwards. Serialized as JSON onto the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorSample {
    pub vehicle_id: String,
    pub position: Coordinate,
    /// Degrees per second, 0.0 unless the vehicle is actually moving.
    pub speed: f64,
    /// Degrees clockwise from north.
    pub heading: f64,
    /// Total distance travelled in degrees.
    pub odometer: f64,
    pub timestamp_ms: u64,
}

impl SensorSample {
    /// Pure and infallible. A stopped or finished vehicle yields its last
    /// known position and heading with speed 0.0.
    pub fn from_vehicle(vehicle: &Vehicle, timestamp_ms: u64) -> Self {
        let speed = if vehicle.mode() == VehicleMode::Running {
            vehicle.speed()
        } else {
            0.
        };

        SensorSample {
            vehicle_id: vehicle.id().to_string(),
            position: vehicle.position(),
            speed,
            heading: vehicle.heading(),
            odometer: vehicle.odometer(),
            timestamp_ms,
        }
    }
}

pub fn unix_time_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::route::Route;

    fn vehicle() -> Vehicle {
        let route = Route::from(vec![Coordinate::new(49., 8.), Coordinate::new(49., 8.1)]);
        Vehicle::new("postauto", route, 0.01)
    }

    #[test]
    fn sample_of_running_vehicle_reports_cruising_speed() {
        let mut vehicle = vehicle();
        vehicle.start();
        vehicle.advance(1.);

        let sample = SensorSample::from_vehicle(&vehicle, 42);
        assert_eq!(sample.vehicle_id, "postauto");
        assert_eq!(sample.speed, 0.01);
        assert_eq!(sample.heading, 90.);
        assert_eq!(sample.timestamp_ms, 42);
    }

    #[test]
    fn sample_of_stopped_vehicle_reports_zero_speed() {
        let mut vehicle = vehicle();
        vehicle.start();
        vehicle.advance(1.);
        let position = vehicle.position();
        vehicle.stop();

        let sample = SensorSample::from_vehicle(&vehicle, 43);
        assert_eq!(sample.speed, 0.);
        assert_eq!(sample.position, position);
    }

    #[test]
    fn sample_serializes_to_json() {
        let mut vehicle = vehicle();
        vehicle.start();
        vehicle.advance(1.);

        let sample = SensorSample::from_vehicle(&vehicle, 44);
        let json = serde_json::to_string(&sample).unwrap();
        assert!(json.contains("\"vehicle_id\":\"postauto\""));
        assert!(json.contains("\"timestamp_ms\":44"));
    }
}
