//! Test helpers writing stop lists, GTFS feeds and RÚIAN dumps to disk.

use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use tempfile::TempDir;
use wdbot_data::test_support::{
    ruian_area, ruian_document, stops_document, tram_group, write_archive,
};

const ROUTES: &str = "\
route_id,agency_id,route_short_name,route_long_name,route_type
L22,99,22,Bílá Hora - Nádraží Strašnice,0
L136,99,136,Sídliště Čakovice - Jižní Město,3
";

const ROUTE_STOPS: &str = "\
route_id,direction_id,stop_id,stop_sequence
L22,0,U1Z1,1
L22,0,U2Z1,2
L22,0,U3Z1,3
L136,0,U3Z1,1
L136,0,U1Z1,2
";

/// Input files for one CLI invocation, removed on drop.
#[derive(Debug)]
pub(super) struct DatasetFiles {
    _dir: TempDir,
    root: Utf8PathBuf,
    stops: Utf8PathBuf,
    gtfs: Utf8PathBuf,
    dump: Utf8PathBuf,
}

impl DatasetFiles {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root =
            Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        let stops = root.join("stops.json");
        let gtfs = root.join("PID_GTFS.zip");
        let dump = root.join("20231031_ST_UKSG.xml.zip");

        let document = stops_document(&[
            tram_group("Anděl", &["U1Z1"]),
            tram_group("Újezd", &["U2Z1"]),
            tram_group("Národní divadlo", &["U3Z1"]),
        ]);
        fs::write(&stops, document).expect("write stop list");
        write_archive(
            gtfs.as_std_path(),
            &[("routes.txt", ROUTES), ("route_stops.txt", ROUTE_STOPS)],
        );
        let area = ruian_area("727181", -743_000.0, -1_043_000.0);
        let xml = ruian_document(&[area.as_str()]);
        write_archive(dump.as_std_path(), &[("20231031_ST_UKSG.xml", xml.as_str())]);

        Self {
            _dir: dir,
            root,
            stops,
            gtfs,
            dump,
        }
    }

    pub(super) fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub(super) fn stops(&self) -> &Utf8Path {
        &self.stops
    }

    pub(super) fn gtfs(&self) -> &Utf8Path {
        &self.gtfs
    }

    pub(super) fn dump(&self) -> &Utf8Path {
        &self.dump
    }
}

/// Parse captured command output as JSON.
pub(super) fn output_json(output: &[u8]) -> serde_json::Value {
    serde_json::from_slice(output).expect("command output is JSON")
}
