//! Route sequences from a zipped GTFS feed.
//!
//! Only two members of the archive are read: `routes.txt`, to pick the route
//! ids of the wanted vehicle type, and `route_stops.txt`, which lists every
//! route direction as a block of consecutive rows ordered by `stop_sequence`.
//! The last-modified date of `route_stops.txt` is reported as the feed's
//! publish date.

use std::{
    collections::BTreeSet,
    fs::File,
    io::{self, Read, Seek},
};

use camino::{Utf8Path, Utf8PathBuf};
use chrono::NaiveDate;
use log::{debug, warn};
use serde::Deserialize;
use thiserror::Error;
use wdbot_core::{RouteError, StopNameLookup, TransitRoute};
use zip::{ZipArchive, result::ZipError};

/// Archive member listing routes and their vehicle types.
pub const ROUTES_MEMBER: &str = "routes.txt";
/// Archive member listing the ordered stops of each route direction.
pub const ROUTE_STOPS_MEMBER: &str = "route_stops.txt";

/// GTFS `route_type` values whose routes are kept.
///
/// # Examples
/// ```
/// use wdbot_data::RouteTypeFilter;
///
/// let trams = RouteTypeFilter::default();
/// assert!(trams.accepts("0"));
/// assert!(!trams.accepts("3"));
///
/// let trams_and_metro = RouteTypeFilter::new(["0", "1"]);
/// assert!(trams_and_metro.accepts("1"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTypeFilter {
    route_types: BTreeSet<String>,
}

impl RouteTypeFilter {
    /// GTFS `route_type` of trams, streetcars and light rail.
    pub const TRAM: &'static str = "0";

    /// Keep routes whose type is one of `route_types`.
    pub fn new<I, S>(route_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            route_types: route_types.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether routes of `route_type` are kept.
    #[must_use]
    pub fn accepts(&self, route_type: &str) -> bool {
        self.route_types.contains(route_type)
    }
}

impl Default for RouteTypeFilter {
    fn default() -> Self {
        Self::new([Self::TRAM])
    }
}

/// Route directions read from one feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GtfsRoutes {
    /// Last-modified date of `route_stops.txt`, when the archive records one.
    pub published: Option<NaiveDate>,
    /// Kept route directions in file order.
    pub routes: Vec<TransitRoute>,
}

/// Errors raised while reading GTFS routes.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GtfsError {
    /// The feed file could not be opened.
    #[error("failed to open GTFS feed at {path}")]
    Open {
        /// Location of the feed.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The feed is not a readable zip archive.
    #[error("failed to read GTFS archive")]
    Archive {
        /// Underlying zip error.
        #[source]
        source: ZipError,
    },
    /// A required member is absent from the archive.
    #[error("GTFS archive has no {member}")]
    MissingMember {
        /// Name of the missing member.
        member: &'static str,
    },
    /// A member could not be parsed as CSV.
    #[error("malformed row in {member}")]
    Csv {
        /// Name of the member being parsed.
        member: &'static str,
        /// Underlying CSV error.
        #[source]
        source: csv::Error,
    },
    /// A `stop_sequence` value did not match the row's position in its block.
    #[error(
        "unexpected stop_sequence {sequence} at position {position} of route {route_id} direction {direction_id}"
    )]
    UnexpectedSequence {
        /// Route of the offending row.
        route_id: String,
        /// Direction of the offending row.
        direction_id: String,
        /// Sequence number found in the row.
        sequence: u32,
        /// One-based position of the row within its block.
        position: usize,
    },
    /// A route row could not form a route.
    #[error("invalid route in route_stops.txt")]
    Route {
        /// Validation error from the route constructor.
        #[source]
        source: RouteError,
    },
}

#[derive(Debug, Deserialize)]
struct RouteRecord {
    route_id: String,
    route_type: String,
}

#[derive(Debug, Deserialize)]
struct RouteStopRecord {
    route_id: String,
    direction_id: String,
    stop_id: String,
    stop_sequence: u32,
}

/// Rows of one route direction collected so far.
#[derive(Debug)]
struct Block {
    route_id: String,
    direction_id: String,
    stops: Vec<String>,
    unknown_stop: Option<String>,
}

impl Block {
    fn start(record: &RouteStopRecord) -> Self {
        Self {
            route_id: record.route_id.clone(),
            direction_id: record.direction_id.clone(),
            stops: Vec::new(),
            unknown_stop: None,
        }
    }

    fn continues(&self, record: &RouteStopRecord) -> bool {
        self.route_id == record.route_id && self.direction_id == record.direction_id
    }

    fn push<L>(&mut self, record: RouteStopRecord, known_stops: &L) -> Result<(), GtfsError>
    where
        L: StopNameLookup + ?Sized,
    {
        if self.unknown_stop.is_none() && !known_stops.contains(&record.stop_id) {
            self.unknown_stop = Some(record.stop_id.clone());
        }
        self.stops.push(record.stop_id);
        let position = self.stops.len();
        if usize::try_from(record.stop_sequence).ok() != Some(position) {
            return Err(GtfsError::UnexpectedSequence {
                route_id: record.route_id,
                direction_id: record.direction_id,
                sequence: record.stop_sequence,
                position,
            });
        }
        Ok(())
    }

    fn finish(self) -> Result<Option<TransitRoute>, GtfsError> {
        if let Some(stop_id) = self.unknown_stop {
            warn!(
                "Dropped route {} direction {}: stop {} is not a known stop",
                self.route_id, self.direction_id, stop_id
            );
            return Ok(None);
        }
        TransitRoute::new(self.route_id, self.direction_id, self.stops)
            .map(Some)
            .map_err(|source| GtfsError::Route { source })
    }
}

/// Read tram route directions from a GTFS archive.
///
/// Equivalent to [`read_routes`] with the default [`RouteTypeFilter`].
///
/// # Errors
/// See [`read_routes`].
pub fn read_tram_routes<R, L>(reader: R, known_stops: &L) -> Result<GtfsRoutes, GtfsError>
where
    R: Read + Seek,
    L: StopNameLookup + ?Sized,
{
    read_routes(reader, &RouteTypeFilter::default(), known_stops)
}

/// Open the GTFS archive at `path` and read its tram route directions.
///
/// # Errors
/// Returns [`GtfsError::Open`] when the file cannot be opened, otherwise see
/// [`read_routes`].
pub fn open_tram_routes<L>(path: &Utf8Path, known_stops: &L) -> Result<GtfsRoutes, GtfsError>
where
    L: StopNameLookup + ?Sized,
{
    open_routes(path, &RouteTypeFilter::default(), known_stops)
}

/// Open the GTFS archive at `path` and read route directions passing `filter`.
///
/// # Errors
/// Returns [`GtfsError::Open`] when the file cannot be opened, otherwise see
/// [`read_routes`].
pub fn open_routes<L>(
    path: &Utf8Path,
    filter: &RouteTypeFilter,
    known_stops: &L,
) -> Result<GtfsRoutes, GtfsError>
where
    L: StopNameLookup + ?Sized,
{
    let file = File::open(path).map_err(|source| GtfsError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    read_routes(file, filter, known_stops)
}

/// Read route directions of the types accepted by `filter`.
///
/// Directions referencing a stop id unknown to `known_stops` are dropped with
/// a warning; the remaining directions are returned in file order together
/// with the publish date of the feed.
///
/// # Errors
/// - [`GtfsError::Archive`] when the input is not a zip archive.
/// - [`GtfsError::MissingMember`] when `routes.txt` or `route_stops.txt` is
///   absent.
/// - [`GtfsError::Csv`] when a row cannot be parsed.
/// - [`GtfsError::UnexpectedSequence`] when a direction's `stop_sequence`
///   values are not `1, 2, 3, ...`.
///
/// # Examples
/// ```no_run
/// use std::collections::HashMap;
/// use std::fs::File;
/// use wdbot_data::read_tram_routes;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let known: HashMap<String, String> = HashMap::new();
/// let feed = read_tram_routes(File::open("PID_GTFS.zip")?, &known)?;
/// println!("{} tram route directions", feed.routes.len());
/// if let Some(date) = feed.published {
///     println!("published {date}");
/// }
/// # Ok(())
/// # }
/// ```
pub fn read_routes<R, L>(
    reader: R,
    filter: &RouteTypeFilter,
    known_stops: &L,
) -> Result<GtfsRoutes, GtfsError>
where
    R: Read + Seek,
    L: StopNameLookup + ?Sized,
{
    let mut archive = ZipArchive::new(reader).map_err(|source| GtfsError::Archive { source })?;
    let (_, routes_member) = open_member(&mut archive, ROUTES_MEMBER)?;
    let route_ids = selected_route_ids(routes_member, filter)?;
    debug!("Selected {} routes from {ROUTES_MEMBER}", route_ids.len());
    let (published, route_stops_member) = open_member(&mut archive, ROUTE_STOPS_MEMBER)?;
    if published.is_none() {
        debug!("{ROUTE_STOPS_MEMBER} carries no usable modification date");
    }
    let routes = collect_routes(route_stops_member, &route_ids, known_stops)?;
    Ok(GtfsRoutes { published, routes })
}

/// Open `member` along with its last-modified date.
fn open_member<'a, R>(
    archive: &'a mut ZipArchive<R>,
    member: &'static str,
) -> Result<(Option<NaiveDate>, impl Read + 'a), GtfsError>
where
    R: Read + Seek,
{
    let file = archive.by_name(member).map_err(|source| match source {
        ZipError::FileNotFound => GtfsError::MissingMember { member },
        other => GtfsError::Archive { source: other },
    })?;
    let modified = file.last_modified().and_then(|stamp| {
        NaiveDate::from_ymd_opt(stamp.year().into(), stamp.month().into(), stamp.day().into())
    });
    Ok((modified, file))
}

fn selected_route_ids(
    member: impl Read,
    filter: &RouteTypeFilter,
) -> Result<BTreeSet<String>, GtfsError> {
    let mut selected = BTreeSet::new();
    for row in csv::Reader::from_reader(member).deserialize::<RouteRecord>() {
        let record = row.map_err(|source| GtfsError::Csv {
            member: ROUTES_MEMBER,
            source,
        })?;
        if filter.accepts(&record.route_type) {
            selected.insert(record.route_id);
        }
    }
    Ok(selected)
}

fn collect_routes<L>(
    member: impl Read,
    route_ids: &BTreeSet<String>,
    known_stops: &L,
) -> Result<Vec<TransitRoute>, GtfsError>
where
    L: StopNameLookup + ?Sized,
{
    let mut routes = Vec::new();
    let mut current: Option<Block> = None;
    for row in csv::Reader::from_reader(member).deserialize::<RouteStopRecord>() {
        let record = row.map_err(|source| GtfsError::Csv {
            member: ROUTE_STOPS_MEMBER,
            source,
        })?;
        if !route_ids.contains(&record.route_id) {
            continue;
        }
        let mut block = match current.take() {
            Some(block) if block.continues(&record) => block,
            finished => {
                flush(finished, &mut routes)?;
                Block::start(&record)
            }
        };
        block.push(record, known_stops)?;
        current = Some(block);
    }
    flush(current, &mut routes)?;
    Ok(routes)
}

fn flush(block: Option<Block>, routes: &mut Vec<TransitRoute>) -> Result<(), GtfsError> {
    if let Some(route) = block.map(Block::finish).transpose()?.flatten() {
        routes.push(route);
    }
    Ok(())
}
