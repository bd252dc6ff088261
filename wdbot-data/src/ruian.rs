//! Cadastral-area definition points from a RÚIAN exchange-format dump.
//!
//! The dump is a single XML document, usually shipped as a one-member zip
//! archive. Each cadastral area carries a code and a definition point in
//! S-JTSK; points are converted to WGS-84 as they are read.

use std::{
    collections::BTreeMap,
    fs::File,
    io::{self, Read},
};

use camino::{Utf8Path, Utf8PathBuf};
use chrono::NaiveDate;
use log::{debug, warn};
use roxmltree::{Document, Node};
use thiserror::Error;
use wdbot_core::{GeodeticPoint, convert_to_wgs84};
use zip::{ZipArchive, result::ZipError};

/// Namespace of the exchange-format envelope.
pub const VF_NAMESPACE: &str = "urn:cz:isvs:ruian:schemas:VymennyFormatTypy:v1";
/// Namespace of cadastral-area elements.
pub const KUI_NAMESPACE: &str = "urn:cz:isvs:ruian:schemas:KatUzIntTypy:v1";
/// GML namespace used for geometries.
pub const GML_NAMESPACE: &str = "http://www.opengis.net/gml/3.2";

/// Height, in metres, assumed for definition points.
pub const DEFAULT_HEIGHT: f64 = 200.0;

/// Errors raised while reading a RÚIAN dump.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RuianError {
    /// The dump could not be opened.
    #[error("failed to open RÚIAN dump at {path}")]
    Open {
        /// Location of the dump.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The dump is not a readable zip archive.
    #[error("failed to read RÚIAN archive")]
    Archive {
        /// Underlying zip error.
        #[source]
        source: ZipError,
    },
    /// The archive did not hold exactly one member.
    #[error("RÚIAN archive holds {count} members, expected one")]
    UnexpectedMembers {
        /// Number of members found.
        count: usize,
    },
    /// Reading the XML text failed.
    #[error("failed to read RÚIAN XML")]
    Read {
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The XML is not well formed.
    #[error("malformed RÚIAN XML")]
    Xml {
        /// Underlying parser error.
        #[source]
        source: roxmltree::Error,
    },
    /// The header date is not a calendar date.
    #[error("invalid header date {value}")]
    InvalidDate {
        /// Raw header date.
        value: String,
        /// Underlying parse error.
        #[source]
        source: chrono::ParseError,
    },
    /// The document holds no cadastral-area list.
    #[error("RÚIAN XML has no KatastralniUzemi list")]
    MissingAreas,
    /// A cadastral area lacks its code or definition point.
    #[error("cadastral area {code} has no {field}")]
    MissingField {
        /// Code of the area, or `?` when the code itself is missing.
        code: String,
        /// Name of the missing element.
        field: &'static str,
    },
    /// Two cadastral areas share a code.
    #[error("cadastral area {code} appears twice")]
    DuplicateCode {
        /// Duplicated code.
        code: String,
    },
    /// A definition point is not a pair of negative decimals.
    #[error("cadastral area {code} has invalid position {position:?}")]
    InvalidPosition {
        /// Code of the area.
        code: String,
        /// Raw `gml:pos` text.
        position: String,
    },
}

/// Converted definition points keyed by cadastral-area code.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CadastralPoints {
    /// Date from the dump header, when present.
    pub date: Option<NaiveDate>,
    /// WGS-84 definition point of each area.
    pub points: BTreeMap<String, GeodeticPoint>,
}

/// Read definition points from RÚIAN XML, converting each at `height` metres.
///
/// Areas whose point fails to convert are logged and skipped.
///
/// # Errors
/// - [`RuianError::Read`] or [`RuianError::Xml`] when the document cannot be
///   read or parsed.
/// - [`RuianError::InvalidDate`] when the header date is malformed.
/// - [`RuianError::MissingAreas`] when there is no cadastral-area list.
/// - [`RuianError::MissingField`], [`RuianError::DuplicateCode`] and
///   [`RuianError::InvalidPosition`] for malformed areas.
///
/// # Examples
/// ```
/// use wdbot_data::{DEFAULT_HEIGHT, read_cadastral_points};
///
/// # fn main() -> Result<(), wdbot_data::RuianError> {
/// let xml = r#"<vf:VymennyFormat
///     xmlns:vf="urn:cz:isvs:ruian:schemas:VymennyFormatTypy:v1"
///     xmlns:kui="urn:cz:isvs:ruian:schemas:KatUzIntTypy:v1"
///     xmlns:gml="http://www.opengis.net/gml/3.2">
///   <vf:Hlavicka><vf:Datum>2023-10-31T00:00:00</vf:Datum></vf:Hlavicka>
///   <vf:Data><vf:KatastralniUzemi>
///     <vf:KatastralniUzemi>
///       <kui:Kod>727181</kui:Kod>
///       <kui:Geometrie><kui:DefinicniBod><gml:MultiPoint><gml:pointMembers>
///         <gml:Point><gml:pos>-743000.00 -1043000.00</gml:pos></gml:Point>
///       </gml:pointMembers></gml:MultiPoint></kui:DefinicniBod></kui:Geometrie>
///     </vf:KatastralniUzemi>
///   </vf:KatastralniUzemi></vf:Data>
/// </vf:VymennyFormat>"#;
/// let parsed = read_cadastral_points(xml.as_bytes(), DEFAULT_HEIGHT)?;
/// assert_eq!(parsed.points.len(), 1);
/// # Ok(())
/// # }
/// ```
pub fn read_cadastral_points(
    mut reader: impl Read,
    height: f64,
) -> Result<CadastralPoints, RuianError> {
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .map_err(|source| RuianError::Read { source })?;
    let document = Document::parse(&text).map_err(|source| RuianError::Xml { source })?;
    let root = document.root_element();

    let date = child(root, VF_NAMESPACE, "Hlavicka")
        .and_then(|header| child(header, VF_NAMESPACE, "Datum"))
        .and_then(|datum| datum.text())
        .map(parse_date)
        .transpose()?;

    // The first `vf:KatastralniUzemi` is the list; its children are the areas.
    let list = root
        .descendants()
        .find(|node| is_element(*node, VF_NAMESPACE, "KatastralniUzemi"))
        .ok_or(RuianError::MissingAreas)?;
    let mut points = BTreeMap::new();
    let areas = list
        .children()
        .filter(|node| is_element(*node, VF_NAMESPACE, "KatastralniUzemi"));
    for area in areas {
        let parsed = parse_area(area)?;
        if points.contains_key(&parsed.code) {
            return Err(RuianError::DuplicateCode { code: parsed.code });
        }
        match convert_to_wgs84(parsed.y, parsed.x, height) {
            Ok(point) => {
                points.insert(parsed.code, point);
            }
            Err(err) => warn!("Skipped cadastral area {}: {err}", parsed.code),
        }
    }
    debug!("Converted {} cadastral definition points", points.len());
    Ok(CadastralPoints { date, points })
}

/// Open a zipped RÚIAN dump and read its definition points.
///
/// # Errors
/// - [`RuianError::Open`] when the file cannot be opened.
/// - [`RuianError::Archive`] or [`RuianError::UnexpectedMembers`] when it is
///   not a single-member zip archive.
/// - Otherwise see [`read_cadastral_points`].
pub fn open_cadastral_points(path: &Utf8Path, height: f64) -> Result<CadastralPoints, RuianError> {
    let file = File::open(path).map_err(|source| RuianError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mut archive = ZipArchive::new(file).map_err(|source| RuianError::Archive { source })?;
    if archive.len() != 1 {
        return Err(RuianError::UnexpectedMembers {
            count: archive.len(),
        });
    }
    let member = archive
        .by_index(0)
        .map_err(|source| RuianError::Archive { source })?;
    read_cadastral_points(member, height)
}

struct ParsedArea {
    code: String,
    y: f64,
    x: f64,
}

fn parse_area(area: Node<'_, '_>) -> Result<ParsedArea, RuianError> {
    let code = child(area, KUI_NAMESPACE, "Kod")
        .and_then(|node| node.text())
        .map(str::trim)
        .ok_or_else(|| RuianError::MissingField {
            code: "?".to_owned(),
            field: "Kod",
        })?
        .to_owned();

    let mut positions = child(area, KUI_NAMESPACE, "Geometrie")
        .and_then(|node| child(node, KUI_NAMESPACE, "DefinicniBod"))
        .and_then(|node| child(node, GML_NAMESPACE, "MultiPoint"))
        .and_then(|node| child(node, GML_NAMESPACE, "pointMembers"))
        .into_iter()
        .flat_map(|members| {
            members
                .children()
                .filter(|node| is_element(*node, GML_NAMESPACE, "Point"))
        })
        .filter_map(|point| child(point, GML_NAMESPACE, "pos"));
    let Some(position) = positions.next() else {
        return Err(RuianError::MissingField {
            code,
            field: "DefinicniBod",
        });
    };
    if positions.next().is_some() {
        warn!("Cadastral area {code} has several definition points; using the first");
    }

    let raw = position.text().unwrap_or_default();
    let Some((y, x)) = parse_position(raw) else {
        return Err(RuianError::InvalidPosition {
            code,
            position: raw.to_owned(),
        });
    };
    Ok(ParsedArea { code, y, x })
}

/// Parse `"<y> <x>"` where both values are negative decimals.
fn parse_position(raw: &str) -> Option<(f64, f64)> {
    let mut parts = raw.split_whitespace();
    let (Some(y), Some(x), None) = (parts.next(), parts.next(), parts.next()) else {
        return None;
    };
    let negative = |value: &str| {
        value
            .starts_with('-')
            .then(|| value.parse::<f64>().ok())
            .flatten()
            .filter(|parsed| parsed.is_finite() && *parsed < 0.0)
    };
    Some((negative(y)?, negative(x)?))
}

fn parse_date(raw: &str) -> Result<NaiveDate, RuianError> {
    let trimmed = raw.trim();
    NaiveDate::parse_and_remainder(trimmed, "%Y-%m-%d")
        .map(|(date, _)| date)
        .map_err(|source| RuianError::InvalidDate {
            value: trimmed.to_owned(),
            source,
        })
}

fn is_element(node: Node<'_, '_>, namespace: &str, name: &str) -> bool {
    node.is_element()
        && node.tag_name().name() == name
        && node.tag_name().namespace() == Some(namespace)
}

fn child<'a, 'input>(
    node: Node<'a, 'input>,
    namespace: &str,
    name: &str,
) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|candidate| is_element(*candidate, namespace, name))
}
