//! Parse location and file metadata out of the header lines of a weather file.
//!
//! Two incompatible header layouts are in circulation. Format 1 packs all of
//! the metadata into the first line, delimited into four parts:
//!
//! ```text
//! LOCATION,... | Morphed:TAS,RHS,DWPT,PS | File Version: 2.1 | Creation Date: 2020-06-23
//! ```
//!
//! Format 2 keeps the location on the first line and spreads the rest across
//! prefixed comment lines, the scenario and the creation date each on their
//! own line:
//!
//! ```text
//! LOCATION,...
//! COMMENTS 1, Future-shifted ... using projections from the RCP8.5 scenario.
//! COMMENTS 2, Future-shifted variables:..., File Version: 3.0, Creation Date: 2020-06-23
//! ```
//!
//! Only a bounded number of header lines is examined before the parser gives
//! up on a format-2 file.

use crate::{
    errors::WxCatalogErr,
    files::{time_period_bounds, time_period_centre, WxFileDefaults, WxFileMeta},
    location::Location,
    parse::filename::parse_file_name,
    scenario::Scenario,
};
use chrono::NaiveDate;
use regex::Regex;
use std::{io::BufRead, sync::LazyLock};
use tracing::{info, warn};

// The location pattern is gated on the data-source token so that arbitrary
// comma-delimited lines are not mistaken for a location. Any 4-digit-year
// variant of the token is accepted.
static LOCATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"LOCATION,(?P<city>[^,]+),(?P<province>[^,]+),(?P<country>[^,]+),CWEC\d{4},(?P<code>\w+),(?P<latitude>-?\d+\.\d+),(?P<longitude>-?\d+\.\d+),(?P<tz>-?\d+\.\d+),(?P<elevation>-?\d+\.\d+)",
    )
    .unwrap()
});

static CREATION_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Creation Date:\s*(?P<date>\d{4}-\d{2}-\d{2})").unwrap());

/// Configuration for the header parser.
#[derive(Debug, Clone)]
pub(crate) struct HeaderConfig {
    /// Delimiter between the parts of a format-1 header line.
    pub delimiter: String,
    /// Prefix identifying the scenario line of a format-2 header.
    pub scenario_marker: String,
    /// Prefix identifying the creation-date line of a format-2 header.
    pub creation_marker: String,
    /// Total number of header lines examined before giving up on a format-2 file.
    pub max_scan_lines: usize,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        HeaderConfig {
            delimiter: " | ".to_owned(),
            scenario_marker: "COMMENTS 1".to_owned(),
            creation_marker: "COMMENTS 2".to_owned(),
            max_scan_lines: 8,
        }
    }
}

/// The two independently parsed halves of a weather file's metadata.
///
/// Either half may be absent; a file whose name cannot be parsed can still
/// yield valid location information, and vice versa.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ParsedHeader {
    pub location: Option<Location>,
    pub wx_file: Option<WxFileMeta>,
}

impl ParsedHeader {
    fn none() -> Self {
        ParsedHeader {
            location: None,
            wx_file: None,
        }
    }
}

/// Parse the header of a weather file open at `reader`, combining it with
/// information from the file's name.
///
/// Malformed content yields absent halves, logged, never an error; `Err` is
/// reserved for I/O failures reading the stream.
pub(crate) fn parse_header(
    reader: &mut dyn BufRead,
    file_name: &str,
    config: &HeaderConfig,
    defaults: &WxFileDefaults,
) -> Result<ParsedHeader, WxCatalogErr> {
    let mut first = String::new();
    reader.read_line(&mut first)?;
    let first = first.trim_end();

    let (location_part, scenario_part, creation_part) = if first
        .contains(config.delimiter.as_str())
    {
        // Format 1: one line, exactly four delimited parts - location, morph
        // descriptor, file version, creation date.
        let parts: Vec<&str> = first.split(config.delimiter.as_str()).collect();
        if parts.len() != 4 {
            warn!(
                "header line has {} delimited parts where 4 were expected: {:?}",
                parts.len(),
                first
            );
            return Ok(ParsedHeader::none());
        }

        (parts[0].to_owned(), parts[1].to_owned(), parts[3].to_owned())
    } else {
        // Format 2: the first line is the location part, the scenario and
        // creation date are on their own marker-prefixed lines further down.
        let mut scenario_line: Option<String> = None;
        let mut creation_line: Option<String> = None;

        let mut line = String::new();
        let mut lines_examined = 1;
        while lines_examined < config.max_scan_lines
            && (scenario_line.is_none() || creation_line.is_none())
        {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                break;
            }
            lines_examined += 1;

            if line.starts_with(config.scenario_marker.as_str()) {
                scenario_line = Some(line.trim_end().to_owned());
            } else if line.starts_with(config.creation_marker.as_str()) {
                creation_line = Some(line.trim_end().to_owned());
            }
        }

        match (scenario_line, creation_line) {
            (Some(s_line), Some(c_line)) => (first.to_owned(), s_line, c_line),
            _ => {
                warn!(
                    "scenario and creation-date lines not found within {} header lines",
                    config.max_scan_lines
                );
                return Ok(ParsedHeader::none());
            }
        }
    };

    let location = parse_location_part(&location_part);

    let scenario = match Scenario::scan(&scenario_part) {
        Some(scenario) => scenario,
        None => {
            info!(
                "no scenario code found in {:?}, defaulting to {}",
                scenario_part, defaults.scenario
            );
            defaults.scenario
        }
    };

    let wx_file = assemble_wx_file(file_name, &creation_part, scenario, defaults);

    Ok(ParsedHeader { location, wx_file })
}

/// Parse the location part of a header into a `Location`.
fn parse_location_part(part: &str) -> Option<Location> {
    let caps = match LOCATION_RE.captures(part) {
        Some(caps) => caps,
        None => {
            warn!("could not parse location part: {:?}", part);
            return None;
        }
    };

    let latitude = parse_float(&caps["latitude"])?;
    let longitude = parse_float(&caps["longitude"])?;
    let elevation = parse_float(&caps["elevation"])?;

    Some(Location {
        city: caps["city"].to_owned(),
        province: caps["province"].to_owned(),
        country: caps["country"].to_owned(),
        code: caps["code"].to_owned(),
        longitude,
        latitude,
        elevation: Some(elevation),
    })
}

fn parse_float(text: &str) -> Option<f64> {
    match text.parse() {
        Ok(val) => Some(val),
        Err(_) => {
            warn!("malformed numeric field in header: {:?}", text);
            None
        }
    }
}

/// Combine filename-derived fields, the creation date, and the scenario into
/// the full metadata record for a weather file. The time period window is
/// derived from the centre year of the filename's time-period tag.
fn assemble_wx_file(
    file_name: &str,
    creation_part: &str,
    scenario: Scenario,
    defaults: &WxFileDefaults,
) -> Option<WxFileMeta> {
    let name_info = match parse_file_name(file_name) {
        Some(info) => info,
        None => {
            warn!("file name matches neither naming convention: {:?}", file_name);
            return None;
        }
    };

    let creation_date = match parse_creation_date_part(creation_part) {
        Some(date) => date,
        None => {
            warn!("could not parse creation date part: {:?}", creation_part);
            return None;
        }
    };

    let centre_year = match time_period_centre(&name_info.time_period) {
        Some(year) => year,
        None => {
            warn!("malformed time period tag: {:?}", name_info.time_period);
            return None;
        }
    };
    let (time_period_start, time_period_end) = time_period_bounds(centre_year);

    Some(WxFileMeta {
        creation_date,
        data_source: name_info.data_source,
        design_data_type: defaults.design_data_type,
        scenario,
        time_period_start,
        time_period_end,
        ensemble_statistic: defaults.ensemble_statistic,
        variables: defaults.variables.clone(),
        anomaly: defaults.anomaly,
        smoothing: defaults.smoothing,
    })
}

/// Parse an embedded ISO-like date (YYYY-MM-DD) out of the creation date part.
fn parse_creation_date_part(part: &str) -> Option<chrono::NaiveDateTime> {
    let caps = CREATION_DATE_RE.captures(part)?;
    NaiveDate::parse_from_str(&caps["date"], "%Y-%m-%d")
        .ok()
        .map(|date| date.and_hms(0, 0, 0))
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
