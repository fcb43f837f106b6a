use crate::simulation::route::{Coordinate, Route};

/// Lifecycle of the motion engine. `Complete` is terminal: a vehicle that
/// has reached its final waypoint cannot be resumed, a new [`Vehicle`] has
/// to be constructed instead. `Stopped` is different from `Complete`: a
/// stopped-but-not-finished vehicle is still queryable for its last
/// position and heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleMode {
    Idle,
    Running,
    Complete,
    Stopped,
}

/// One simulated vehicle: its identity, the route it follows, and where on
/// that route it currently is. All motion state is owned here exclusively
/// and only mutated through [`Vehicle::advance`].
#[derive(Debug)]
pub struct Vehicle {
    id: String,
    route: Route,
    /// Index of the route leg currently being traversed.
    segment: usize,
    /// Fractional distance along the current leg, in [0, 1].
    segment_progress: f64,
    /// Cruising speed in degrees per second. The ITN format carries no
    /// speed, so the unit is our choice; degree space keeps it consistent
    /// with the planar interpolation.
    speed: f64,
    /// Total distance travelled in degrees.
    odometer: f64,
    mode: VehicleMode,
}

impl Vehicle {
    pub fn new(id: impl Into<String>, route: Route, speed: f64) -> Self {
        Vehicle {
            id: id.into(),
            route,
            segment: 0,
            segment_progress: 0.,
            speed,
            odometer: 0.,
            mode: VehicleMode::Idle,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn mode(&self) -> VehicleMode {
        self.mode
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn odometer(&self) -> f64 {
        self.odometer
    }

    pub fn start(&mut self) {
        assert_eq!(
            self.mode,
            VehicleMode::Idle,
            "vehicle '{}' was started twice",
            self.id
        );
        self.mode = VehicleMode::Running;
    }

    pub fn stop(&mut self) {
        self.mode = VehicleMode::Stopped;
    }

    /// Moves the vehicle forward by `speed * elapsed_seconds` degrees,
    /// crossing as many waypoints as that distance covers. Reaching the
    /// final waypoint puts the vehicle into `Complete`. Calling this on a
    /// vehicle that was never started is a lifecycle bug and fails loudly.
    pub fn advance(&mut self, elapsed_seconds: f64) {
        match self.mode {
            VehicleMode::Idle => panic!("advance called on vehicle '{}' before start", self.id),
            VehicleMode::Complete | VehicleMode::Stopped => return,
            VehicleMode::Running => {}
        }

        // A route without a single leg leaves nothing to traverse. The
        // vehicle stays put at its sole waypoint (or the origin) and is done.
        if self.route.len() < 2 {
            self.mode = VehicleMode::Complete;
            return;
        }

        let mut remaining = self.speed * elapsed_seconds;
        while remaining > 0. {
            let from = self.route.get(self.segment).unwrap();
            let to = self.route.get(self.segment + 1).unwrap();
            let leg_length = from.distance_to(to);
            let left_on_leg = leg_length * (1. - self.segment_progress);

            if remaining < left_on_leg {
                self.segment_progress += remaining / leg_length;
                self.odometer += remaining;
                return;
            }

            remaining -= left_on_leg;
            self.odometer += left_on_leg;

            if self.segment + 1 >= self.route.len() - 1 {
                self.segment_progress = 1.;
                self.mode = VehicleMode::Complete;
                return;
            }
            self.segment += 1;
            self.segment_progress = 0.;
        }
    }

    /// Current position, interpolated linearly along the current leg. Both
    /// axes are interpolated independently, which is a planar approximation
    /// and fine at the scale the routes cover.
    pub fn position(&self) -> Coordinate {
        if self.route.is_empty() {
            return Coordinate::origin();
        }
        if self.route.len() < 2 {
            return *self.route.first().unwrap();
        }
        if self.mode == VehicleMode::Complete {
            return *self.route.last().unwrap();
        }

        let from = self.route.get(self.segment).unwrap();
        let to = self.route.get(self.segment + 1).unwrap();
        let t = self.segment_progress;
        Coordinate::new(
            from.latitude + (to.latitude - from.latitude) * t,
            from.longitude + (to.longitude - from.longitude) * t,
        )
    }

    /// Bearing of the current leg in degrees clockwise from north, in
    /// [0, 360). Defined as 0.0 once the route is complete and for routes
    /// without a leg.
    pub fn heading(&self) -> f64 {
        if self.route.len() < 2 || self.mode == VehicleMode::Complete {
            return 0.;
        }

        let from = self.route.get(self.segment).unwrap();
        let to = self.route.get(self.segment + 1).unwrap();
        let d_lat = to.latitude - from.latitude;
        let d_lon = to.longitude - from.longitude;
        let bearing = d_lon.atan2(d_lat).to_degrees();
        (bearing + 360.) % 360.
    }
}
