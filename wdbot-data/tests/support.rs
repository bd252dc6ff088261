//! Fixture helpers shared by the ingestion behaviour tests.

use camino::{Utf8Path, Utf8PathBuf};
use std::{fs, io::Write, path::PathBuf};
use tempfile::{Builder, TempPath};
use zip::{ZipWriter, write::SimpleFileOptions};

/// Tolerance for coordinate comparisons, in degrees.
const DEGREE_EPSILON: f64 = 2.0e-2;

/// Directory containing the plain-text fixtures.
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn read_fixture(name: &str) -> Vec<u8> {
    let path = fixtures_dir().join(name);
    fs::read(&path).unwrap_or_else(|err| panic!("failed to read fixture {path:?}: {err}"))
}

/// Zip the named fixture files into a temporary archive.
///
/// Each entry is `(member name, fixture file name)`.
pub fn zip_fixtures(stem: &str, members: &[(&str, &str)]) -> TempPath {
    let file = Builder::new()
        .prefix(stem)
        .suffix(".zip")
        .tempfile()
        .unwrap_or_else(|err| panic!("failed to create temporary archive for {stem}: {err}"));
    let mut zip = ZipWriter::new(file);
    for (member, fixture) in members {
        zip.start_file(*member, SimpleFileOptions::default())
            .unwrap_or_else(|err| panic!("failed to start member {member}: {err}"));
        zip.write_all(&read_fixture(fixture))
            .unwrap_or_else(|err| panic!("failed to write member {member}: {err}"));
    }
    zip.finish()
        .unwrap_or_else(|err| panic!("failed to finish archive for {stem}: {err}"))
        .into_temp_path()
}

/// Sample GTFS feed holding `routes.txt` and `route_stops.txt`.
pub fn gtfs_feed() -> TempPath {
    zip_fixtures(
        "gtfs",
        &[("routes.txt", "routes.txt"), ("route_stops.txt", "route_stops.txt")],
    )
}

/// Sample RÚIAN dump zipped as a single member.
pub fn ruian_dump() -> TempPath {
    zip_fixtures("ruian", &[("20231031_ST_UKSG.xml", "ruian.xml")])
}

/// Path of the sample stop list.
pub fn stops_list() -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(fixtures_dir().join("stops.json"))
        .unwrap_or_else(|path| panic!("fixture path {path:?} is not UTF-8"))
}

/// View a temporary path as UTF-8.
pub fn utf8(path: &TempPath) -> &Utf8Path {
    Utf8Path::from_path(path).unwrap_or_else(|| panic!("temporary path {path:?} is not UTF-8"))
}

/// Compare angles within a small tolerance.
pub fn assert_near(actual: f32, expected: f64) {
    let delta = (f64::from(actual) - expected).abs();
    assert!(
        delta <= DEGREE_EPSILON,
        "expected {expected}, got {actual} (|Δ| = {delta})"
    );
}
