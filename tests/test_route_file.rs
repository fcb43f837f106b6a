use assert_approx_eq::assert_approx_eq;
use rust_vsim::simulation::route::Route;
use std::io::Write;
use std::path::Path;

#[test]
fn read_route_file_with_malformed_lines() {
    let parsed = Route::from_file(Path::new("tests/resources/routes/bus_route.itn")).unwrap();

    // 4 valid waypoints survive, 2 lines are reported
    assert_eq!(parsed.route.len(), 4);
    assert_eq!(parsed.skipped.len(), 2);
    assert_eq!(parsed.skipped[0].line_no, 3);
    assert_eq!(parsed.skipped[1].line_no, 5);

    let first = parsed.route.first().unwrap();
    assert_approx_eq!(first.longitude, 8.45453);
    assert_approx_eq!(first.latitude, 49.02352);
    let last = parsed.route.last().unwrap();
    assert_approx_eq!(last.longitude, 8.49796);
    assert_approx_eq!(last.latitude, 48.97723);
}

#[test]
fn read_missing_route_file_fails() {
    let result = Route::from_file(Path::new("tests/resources/routes/no_such_file.itn"));
    assert!(result.is_err());
}

#[test]
fn read_empty_route_file_yields_empty_route() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.flush().unwrap();

    let parsed = Route::from_file(file.path()).unwrap();
    assert!(parsed.route.is_empty());
    assert!(parsed.skipped.is_empty());
}
