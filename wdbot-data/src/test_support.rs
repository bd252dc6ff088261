//! Fixture builders for GTFS archives, stop lists and RÚIAN documents.
//!
//! Helpers panic on I/O failure; they are meant for tests only.

use std::io::{Cursor, Write};
use std::path::Path;

use zip::{DateTime, ZipWriter, write::SimpleFileOptions};

use crate::gtfs::{ROUTE_STOPS_MEMBER, ROUTES_MEMBER};

/// Zip `members` (name, contents) into `writer`.
fn write_members<W>(writer: W, members: &[(&str, &str)]) -> W
where
    W: Write + std::io::Seek,
{
    write_members_with(writer, members, SimpleFileOptions::default())
}

fn write_members_with<W>(writer: W, members: &[(&str, &str)], options: SimpleFileOptions) -> W
where
    W: Write + std::io::Seek,
{
    let mut zip = ZipWriter::new(writer);
    for (name, contents) in members {
        zip.start_file(*name, options.clone())
            .unwrap_or_else(|err| panic!("failed to start member {name}: {err}"));
        zip.write_all(contents.as_bytes())
            .unwrap_or_else(|err| panic!("failed to write member {name}: {err}"));
    }
    zip.finish()
        .unwrap_or_else(|err| panic!("failed to finish archive: {err}"))
}

/// In-memory zip archive holding `members`.
#[must_use]
pub fn zip_archive(members: &[(&str, &str)]) -> Cursor<Vec<u8>> {
    let mut cursor = write_members(Cursor::new(Vec::new()), members);
    cursor.set_position(0);
    cursor
}

/// In-memory GTFS archive with the given `routes.txt` and `route_stops.txt`.
#[must_use]
pub fn gtfs_archive(routes: &str, route_stops: &str) -> Cursor<Vec<u8>> {
    zip_archive(&[(ROUTES_MEMBER, routes), (ROUTE_STOPS_MEMBER, route_stops)])
}

/// In-memory GTFS archive whose members were last modified on `date`
/// (year, month, day).
#[must_use]
pub fn dated_gtfs_archive(routes: &str, route_stops: &str, date: (u16, u8, u8)) -> Cursor<Vec<u8>> {
    let (year, month, day) = date;
    let stamp = DateTime::from_date_and_time(year, month, day, 0, 0, 0)
        .unwrap_or_else(|err| panic!("invalid archive date {year}-{month}-{day}: {err:?}"));
    let options = SimpleFileOptions::default().last_modified_time(stamp);
    let mut cursor = write_members_with(
        Cursor::new(Vec::new()),
        &[(ROUTES_MEMBER, routes), (ROUTE_STOPS_MEMBER, route_stops)],
        options,
    );
    cursor.set_position(0);
    cursor
}

/// Write a zip archive holding `members` to `path`.
pub fn write_archive(path: &Path, members: &[(&str, &str)]) {
    let file = std::fs::File::create(path)
        .unwrap_or_else(|err| panic!("failed to create archive {}: {err}", path.display()));
    write_members(file, members);
}

/// RÚIAN exchange-format document dated 2023-10-31 wrapping `areas`.
#[must_use]
pub fn ruian_document(areas: &[&str]) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<vf:VymennyFormat xmlns:vf="urn:cz:isvs:ruian:schemas:VymennyFormatTypy:v1"
    xmlns:kui="urn:cz:isvs:ruian:schemas:KatUzIntTypy:v1"
    xmlns:gml="http://www.opengis.net/gml/3.2">
  <vf:Hlavicka>
    <vf:VerzeVFR>3.0</vf:VerzeVFR>
    <vf:Datum>2023-10-31T00:00:00</vf:Datum>
  </vf:Hlavicka>
  <vf:Data>
    <vf:KatastralniUzemi>
{}
    </vf:KatastralniUzemi>
  </vf:Data>
</vf:VymennyFormat>"#,
        areas.concat()
    )
}

/// RÚIAN cadastral-area element with a single definition point.
#[must_use]
pub fn ruian_area(code: &str, y: f64, x: f64) -> String {
    format!(
        r"<vf:KatastralniUzemi>
      <kui:Kod>{code}</kui:Kod>
      <kui:Geometrie><kui:DefinicniBod><gml:MultiPoint><gml:pointMembers>
        <gml:Point><gml:pos>{y:.2} {x:.2}</gml:pos></gml:Point>
      </gml:pointMembers></gml:MultiPoint></kui:DefinicniBod></kui:Geometrie>
    </vf:KatastralniUzemi>"
    )
}

/// Version 3 stop list generated on 2023-12-15 holding `groups`.
#[must_use]
pub fn stops_document(groups: &[String]) -> String {
    format!(
        r#"{{"generatedAt": "2023-12-15T03:00:11+01:00", "dataFormatVersion": "3", "stopGroups": [{}]}}"#,
        groups.join(",")
    )
}

/// Prague stop group with one tram platform per GTFS id.
#[must_use]
pub fn tram_group(name: &str, gtfs_ids: &[&str]) -> String {
    let platforms: Vec<String> = gtfs_ids
        .iter()
        .map(|id| {
            format!(
                r#"{{"lat": 50.08, "lon": 14.42, "gtfsIds": ["{id}"],
                    "lines": [{{"id": 22, "name": "22", "type": "tram", "direction": "Bílá Hora"}}]}}"#
            )
        })
        .collect();
    format!(
        r#"{{"name": "{name}", "districtCode": "AB", "idosName": "{name}", "fullName": "Praha, {name}",
            "uniqueName": "{name}", "node": 1040, "cis": 58791, "municipality": "Praha",
            "stops": [{}]}}"#,
        platforms.join(",")
    )
}
