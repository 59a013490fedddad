//! Emissions scenarios attached to cataloged files.

use regex::Regex;
use std::{fmt, ops::Range, sync::LazyLock};

/// Emissions scenarios a weather file may be derived from.
///
/// The canonical representation is the compact code (e.g. "RCP85"). Source data
/// spells scenarios several ways ("RCP8.5", "RCP 8.5", "SSP5-8.5"); all variants
/// are normalized to the compact code at the parse boundary by [`Scenario::scan`].
#[derive(Clone, Copy, PartialEq, Eq, Debug, EnumString, EnumIter, Hash)]
pub enum Scenario {
    /// Representative concentration pathway 2.6
    #[strum(to_string = "RCP26", serialize = "RCP2.6", serialize = "rcp26")]
    Rcp26,
    /// Representative concentration pathway 4.5
    #[strum(to_string = "RCP45", serialize = "RCP4.5", serialize = "rcp45")]
    Rcp45,
    /// Representative concentration pathway 8.5
    #[strum(to_string = "RCP85", serialize = "RCP8.5", serialize = "rcp85")]
    Rcp85,
    /// Shared socioeconomic pathway 1-2.6
    #[strum(to_string = "SSP126", serialize = "SSP1-2.6", serialize = "ssp126")]
    Ssp126,
    /// Shared socioeconomic pathway 2-4.5
    #[strum(to_string = "SSP245", serialize = "SSP2-4.5", serialize = "ssp245")]
    Ssp245,
    /// Shared socioeconomic pathway 5-8.5
    #[strum(to_string = "SSP585", serialize = "SSP5-8.5", serialize = "ssp585")]
    Ssp585,
    /// Sentinel for a summary file whose sibling weather files disagree.
    #[strum(to_string = "multiple", serialize = "MULTIPLE")]
    Multiple,
}

// Every spelling variant of the scanable vocabulary. The sentinel is derived,
// never parsed, so it is not in this pattern.
static SCENARIO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)RCP[\s-]?2\.?6|RCP[\s-]?4\.?5|RCP[\s-]?8\.?5|SSP1-?2\.?6|SSP2-?4\.?5|SSP5-?8\.?5")
        .unwrap()
});

impl Scenario {
    /// Canonical compact code for this scenario.
    pub fn as_static_str(self) -> &'static str {
        match self {
            Scenario::Rcp26 => "RCP26",
            Scenario::Rcp45 => "RCP45",
            Scenario::Rcp85 => "RCP85",
            Scenario::Ssp126 => "SSP126",
            Scenario::Ssp245 => "SSP245",
            Scenario::Ssp585 => "SSP585",
            Scenario::Multiple => "multiple",
        }
    }

    /// Scan free text for the first occurrence of any scenario code, in any of
    /// its spelling variants, and return it normalized.
    pub fn scan(text: &str) -> Option<Scenario> {
        Scenario::find(text).map(|(scenario, _)| scenario)
    }

    /// As `scan`, but also return the byte range of the matched token.
    pub(crate) fn find(text: &str) -> Option<(Scenario, Range<usize>)> {
        let mtch = SCENARIO_RE.find(text)?;

        let compact: String = mtch
            .as_str()
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .collect::<String>()
            .to_uppercase();

        use std::str::FromStr;
        Scenario::from_str(&compact)
            .ok()
            .map(|scenario| (scenario, mtch.range()))
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_static_str())
    }
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
