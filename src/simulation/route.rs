use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

/// Raw ITN fields are integers carrying five decimal places.
pub const COORDINATE_SCALE: f64 = 100_000.0;

/// A WGS84 point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Coordinate {
            latitude,
            longitude,
        }
    }

    pub fn origin() -> Self {
        Coordinate::new(0., 0.)
    }

    fn in_range(&self) -> bool {
        (-90. ..=90.).contains(&self.latitude) && (-180. ..=180.).contains(&self.longitude)
    }

    /// Planar distance in degree space. Good enough at the scale the routes
    /// cover, not great-circle accurate.
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        (other.latitude - self.latitude).hypot(other.longitude - self.longitude)
    }
}

/// An ordered list of waypoints. Insertion order is traversal order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Route {
    waypoints: Vec<Coordinate>,
}

impl From<Vec<Coordinate>> for Route {
    fn from(waypoints: Vec<Coordinate>) -> Self {
        Route { waypoints }
    }
}

impl Route {
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Coordinate> {
        self.waypoints.get(index)
    }

    pub fn first(&self) -> Option<&Coordinate> {
        self.waypoints.first()
    }

    pub fn last(&self) -> Option<&Coordinate> {
        self.waypoints.last()
    }

    /// Consecutive waypoint pairs, i.e. the legs of the route.
    pub fn segments(&self) -> impl Iterator<Item = (&Coordinate, &Coordinate)> {
        self.waypoints.iter().tuple_windows()
    }

    /// Reads an ITN file. A missing or unreadable file is fatal, malformed
    /// lines within it are not.
    pub fn from_file(path: &Path) -> std::io::Result<ParsedRoute> {
        let file = File::open(path)?;
        let lines: Vec<String> = BufReader::new(file).lines().collect::<Result<_, _>>()?;
        Ok(parse_itn(lines.iter().map(String::as_str)))
    }
}

/// Why a line was dropped during parsing.
#[derive(Debug, Error, PartialEq)]
pub enum FormatError {
    #[error("expected at least 2 '|' separated fields, found {0}")]
    TooFewFields(usize),
    #[error("field '{0}' is not an integer")]
    NotANumber(String),
    #[error("coordinate ({latitude}, {longitude}) is outside the WGS84 range")]
    OutOfRange { latitude: f64, longitude: f64 },
}

#[derive(Debug, PartialEq)]
pub struct SkippedLine {
    /// 1-based, as an operator would count lines in the file.
    pub line_no: usize,
    pub reason: FormatError,
}

/// Result of tolerant parsing: the surviving waypoints plus one diagnostic
/// per dropped line. Callers decide whether and how to log the diagnostics.
#[derive(Debug, Default)]
pub struct ParsedRoute {
    pub route: Route,
    pub skipped: Vec<SkippedLine>,
}

/// Parses ITN waypoint lines. Each line holds `|`-separated fields, the
/// first field being longitude and the second latitude, both scaled by
/// 100 000. Additional fields are ignored. A malformed line is skipped and
/// reported, it never aborts the parse. Empty input yields an empty route.
pub fn parse_itn<'a>(lines: impl Iterator<Item = &'a str>) -> ParsedRoute {
    let mut parsed = ParsedRoute::default();

    for (i, line) in lines.enumerate() {
        match parse_line(line) {
            Ok(coord) => parsed.route.waypoints.push(coord),
            Err(reason) => parsed.skipped.push(SkippedLine {
                line_no: i + 1,
                reason,
            }),
        }
    }
    parsed
}

fn parse_line(line: &str) -> Result<Coordinate, FormatError> {
    let fields: Vec<&str> = line.split('|').collect();
    if fields.len() < 2 {
        return Err(FormatError::TooFewFields(fields.len()));
    }

    let longitude = parse_scaled(fields[0])?;
    let latitude = parse_scaled(fields[1])?;

    let coord = Coordinate::new(latitude, longitude);
    if !coord.in_range() {
        return Err(FormatError::OutOfRange {
            latitude,
            longitude,
        });
    }
    Ok(coord)
}

fn parse_scaled(field: &str) -> Result<f64, FormatError> {
    let raw: i64 = field
        .trim()
        .parse()
        .map_err(|_| FormatError::NotANumber(field.to_string()))?;
    Ok(raw as f64 / COORDINATE_SCALE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn parse_scales_by_100_000() {
        let parsed = parse_itn(["0845453|4902352|Point 1 |0|"].into_iter());

        assert!(parsed.skipped.is_empty());
        assert_eq!(parsed.route.len(), 1);
        let coord = parsed.route.get(0).unwrap();
        assert_approx_eq!(coord.longitude, 8.45453);
        assert_approx_eq!(coord.latitude, 49.02352);
    }

    #[test]
    fn parse_skips_malformed_lines_and_keeps_order() {
        let lines = [
            "0845453|4902352|Point 1 |0|",
            "no separators at all",
            "0848501|4900249|Point 2 |0|",
            "eight|4900249|broken number|0|",
            "0849295|4899460|Point 3 |0|",
        ];
        let parsed = parse_itn(lines.into_iter());

        assert_eq!(parsed.route.len(), 3);
        assert_approx_eq!(parsed.route.get(0).unwrap().longitude, 8.45453);
        assert_approx_eq!(parsed.route.get(1).unwrap().longitude, 8.48501);
        assert_approx_eq!(parsed.route.get(2).unwrap().longitude, 8.49295);

        assert_eq!(parsed.skipped.len(), 2);
        assert_eq!(parsed.skipped[0].line_no, 2);
        assert_eq!(parsed.skipped[0].reason, FormatError::TooFewFields(1));
        assert_eq!(parsed.skipped[1].line_no, 4);
        assert_eq!(
            parsed.skipped[1].reason,
            FormatError::NotANumber("eight".to_string())
        );
    }

    #[test]
    fn parse_rejects_out_of_range_coordinates() {
        // 100 degrees latitude does not exist on the globe
        let parsed = parse_itn(["0845453|10000001|too far north|0|"].into_iter());

        assert!(parsed.route.is_empty());
        assert_eq!(parsed.skipped.len(), 1);
        assert!(matches!(
            parsed.skipped[0].reason,
            FormatError::OutOfRange { .. }
        ));
    }

    #[test]
    fn parse_empty_input_yields_empty_route() {
        let parsed = parse_itn(std::iter::empty());
        assert!(parsed.route.is_empty());
        assert!(parsed.skipped.is_empty());
    }

    #[test]
    fn parse_negative_coordinates() {
        let parsed = parse_itn(["-0845453|-4902352|southern hemisphere|0|"].into_iter());

        assert_eq!(parsed.route.len(), 1);
        let coord = parsed.route.get(0).unwrap();
        assert_approx_eq!(coord.longitude, -8.45453);
        assert_approx_eq!(coord.latitude, -49.02352);
    }

    #[test]
    fn segments_are_consecutive_pairs() {
        let route = Route::from(vec![
            Coordinate::new(49., 8.),
            Coordinate::new(49.5, 8.5),
            Coordinate::new(50., 9.),
        ]);
        let segments: Vec<_> = route.segments().collect();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].1, segments[1].0);
    }
}
