//! Parse location and provenance tokens out of a weather file name.
//!
//! Two naming conventions are in use. Older (CMIP5 generation) names embed a
//! numeric station code between the city and the data source:
//!
//! ```text
//! 2050s_CAN_BC_Creston.717700_CWEC2016.epw
//! ```
//!
//! Newer (CMIP6 generation) names carry an emissions scenario token instead of
//! a station code, with leading tokens before the time period:
//!
//! ```text
//! MORPHED_RCP85_2050s_CAN_BC_Creston_CWEC2016.epw
//! ```
//!
//! The presence of a scenario token anywhere in the name selects the
//! convention. City names may contain dots, dashes, and spaces, so the city
//! capture is greedy and the code/data-source suffix is pinned by trailing
//! anchoring rather than by splitting on a separator count.

use crate::scenario::Scenario;
use regex::Regex;
use std::sync::LazyLock;

/// Station code assigned to files whose naming convention carries no code.
pub(crate) const PLACEHOLDER_CODE: &str = "000000";

// Regex patterns (compiled once via LazyLock)

static CODED_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?P<timePeriod>\d{4}s)_(?P<country>\w+)_(?P<province>\w+)_(?P<city>.+)\.(?P<code>\d+)_(?P<dataSource>\w+)\.[eE][pP][wW]$",
    )
    .unwrap()
});

static UNCODED_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?P<timePeriod>\d{4}s)_(?P<country>\w+)_(?P<province>\w+)_(?P<city>.+)_(?P<dataSource>\w+)\.[eE][pP][wW]$",
    )
    .unwrap()
});

/// Fields parsed out of a weather file name.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FilenameInfo {
    pub time_period: String,
    pub country: String,
    pub province: String,
    pub city: String,
    pub code: String,
    pub data_source: String,
}

/// Parse a weather file name. Returns `None` when the name matches neither
/// convention; that is a recoverable condition for the caller, not an error.
pub(crate) fn parse_file_name(name: &str) -> Option<FilenameInfo> {
    if let Some((_, token_range)) = Scenario::find(name) {
        // Scenario-token convention: no station code in the name. Everything up
        // to and including the first underscore after the token is prefix.
        let after_token = &name[token_range.end..];
        let tail_start = token_range.end + after_token.find('_')? + 1;

        let caps = UNCODED_NAME_RE.captures(&name[tail_start..])?;

        Some(FilenameInfo {
            time_period: caps["timePeriod"].to_owned(),
            country: caps["country"].to_owned(),
            province: caps["province"].to_owned(),
            city: caps["city"].to_owned(),
            code: PLACEHOLDER_CODE.to_owned(),
            data_source: caps["dataSource"].to_owned(),
        })
    } else {
        let caps = CODED_NAME_RE.captures(name)?;

        Some(FilenameInfo {
            time_period: caps["timePeriod"].to_owned(),
            country: caps["country"].to_owned(),
            province: caps["province"].to_owned(),
            city: caps["city"].to_owned(),
            code: caps["code"].to_owned(),
            data_source: caps["dataSource"].to_owned(),
        })
    }
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
