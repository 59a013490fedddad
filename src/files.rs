//! Metadata for cataloged weather and summary files.

use crate::scenario::Scenario;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::path::PathBuf;

/// Discriminator for the two kinds of cataloged files.
#[derive(Clone, Copy, PartialEq, Eq, Debug, EnumString, Hash)]
pub enum FileType {
    /// A building-energy weather file (.epw).
    #[strum(to_string = "weather")]
    Weather,
    /// A companion spreadsheet summarizing a location's weather files.
    #[strum(to_string = "summary")]
    Summary,
}

impl FileType {
    /// The string form stored in the database.
    pub fn as_static_str(self) -> &'static str {
        match self {
            FileType::Weather => "weather",
            FileType::Summary => "summary",
        }
    }
}

/// The kind of design data a weather file contains.
#[allow(missing_docs)]
#[derive(Clone, Copy, PartialEq, Eq, Debug, EnumString, Hash)]
pub enum DesignDataType {
    #[strum(to_string = "TMY")]
    Tmy,
    #[strum(to_string = "XMY")]
    Xmy,
    #[strum(to_string = "TSY")]
    Tsy,
    #[strum(to_string = "AMY")]
    Amy,
    #[strum(to_string = "design day")]
    DesignDay,
}

impl DesignDataType {
    /// The string form stored in the database.
    pub fn as_static_str(self) -> &'static str {
        match self {
            DesignDataType::Tmy => "TMY",
            DesignDataType::Xmy => "XMY",
            DesignDataType::Tsy => "TSY",
            DesignDataType::Amy => "AMY",
            DesignDataType::DesignDay => "design day",
        }
    }
}

/// Which statistic of the model ensemble a weather file represents.
#[allow(missing_docs)]
#[derive(Clone, Copy, PartialEq, Eq, Debug, EnumString, Hash)]
pub enum EnsembleStatistic {
    #[strum(to_string = "average")]
    Average,
    #[strum(to_string = "median")]
    Median,
    #[strum(to_string = "10th percentile")]
    Percentile10,
    #[strum(to_string = "90th percentile")]
    Percentile90,
}

impl EnsembleStatistic {
    /// The string form stored in the database.
    pub fn as_static_str(self) -> &'static str {
        match self {
            EnsembleStatistic::Average => "average",
            EnsembleStatistic::Median => "median",
            EnsembleStatistic::Percentile10 => "10th percentile",
            EnsembleStatistic::Percentile90 => "90th percentile",
        }
    }
}

/// The time scale of the anomalies applied when morphing a weather file.
#[allow(missing_docs)]
#[derive(Clone, Copy, PartialEq, Eq, Debug, EnumString, Hash)]
pub enum Anomaly {
    #[strum(to_string = "daily")]
    Daily,
    #[strum(to_string = "seasonal")]
    Seasonal,
    #[strum(to_string = "annual")]
    Annual,
}

impl Anomaly {
    /// The string form stored in the database.
    pub fn as_static_str(self) -> &'static str {
        match self {
            Anomaly::Daily => "daily",
            Anomaly::Seasonal => "seasonal",
            Anomaly::Annual => "annual",
        }
    }
}

/// Metadata parsed and derived for a single weather file.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq)]
pub struct WxFileMeta {
    pub creation_date: NaiveDateTime,
    pub data_source: String,
    pub design_data_type: DesignDataType,
    pub scenario: Scenario,
    pub time_period_start: NaiveDateTime,
    pub time_period_end: NaiveDateTime,
    pub ensemble_statistic: EnsembleStatistic,
    pub variables: String,
    pub anomaly: Anomaly,
    pub smoothing: Option<i32>,
}

/// Attribute values fixed for the currently supported weather file family.
///
/// These are configuration points, not facts about all weather files: a future
/// file family with different design data or ensemble handling supplies its own
/// values here. The `scenario` field is the fallback used when neither header
/// nor filename carries a scenario code; applying it is logged.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq)]
pub struct WxFileDefaults {
    pub design_data_type: DesignDataType,
    pub ensemble_statistic: EnsembleStatistic,
    pub variables: String,
    pub anomaly: Anomaly,
    pub smoothing: Option<i32>,
    pub scenario: Scenario,
}

impl Default for WxFileDefaults {
    fn default() -> Self {
        WxFileDefaults {
            design_data_type: DesignDataType::Tmy,
            ensemble_statistic: EnsembleStatistic::Average,
            variables: "all thermodynamic".to_owned(),
            anomaly: Anomaly::Daily,
            smoothing: Some(21),
            scenario: Scenario::Rcp85,
        }
    }
}

/// The type-specific half of a cataloged file.
#[derive(Debug, Clone, PartialEq)]
pub enum FileKind {
    /// A weather file with its full parsed metadata.
    Weather(WxFileMeta),
    /// A summary file. Its scenario is derived from its sibling weather files.
    Summary {
        /// Scenario shared by the sibling weather files, or the `multiple` sentinel.
        scenario: Scenario,
    },
}

/// A cataloged file row.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq)]
pub struct FileRecord {
    pub id: i64,
    pub path: PathBuf,
    pub location_id: i64,
    pub version_id: i64,
    pub kind: FileKind,
}

impl FileRecord {
    /// The file type discriminator for this record.
    pub fn file_type(&self) -> FileType {
        match self.kind {
            FileKind::Weather(_) => FileType::Weather,
            FileKind::Summary { .. } => FileType::Summary,
        }
    }

    /// The emissions scenario for this record.
    pub fn scenario(&self) -> Scenario {
        match &self.kind {
            FileKind::Weather(meta) => meta.scenario,
            FileKind::Summary { scenario } => *scenario,
        }
    }
}

/// Return the centre year of a time period tag of the form `<year>s`, where
/// `<year>` is a 4-digit year multiple of 10 (e.g. "2050s" has centre 2055).
pub fn time_period_centre(time_period: &str) -> Option<i32> {
    if time_period.len() != 5 {
        return None;
    }

    let year: i32 = time_period.strip_suffix('s')?.parse().ok()?;
    Some(year + 5)
}

/// Nominal start and end of the 30-year window centred on `centre_year`.
///
/// The window is half-open at the year level; the end is represented as one
/// second before the start of the period 30 years after the window opens.
pub fn time_period_bounds(centre_year: i32) -> (NaiveDateTime, NaiveDateTime) {
    let start = NaiveDate::from_ymd(centre_year - 15, 1, 1).and_hms(0, 0, 0);
    let end = NaiveDate::from_ymd(centre_year + 15, 1, 1).and_hms(0, 0, 0) - Duration::seconds(1);

    (start, end)
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
#[cfg(test)]
mod unit {
    use super::*;

    #[test]
    fn test_time_period_centre() {
        assert_eq!(time_period_centre("2020s"), Some(2025));
        assert_eq!(time_period_centre("2050s"), Some(2055));
        assert_eq!(time_period_centre("2080s"), Some(2085));
    }

    #[test]
    fn test_time_period_centre_rejects_malformed_tags() {
        assert_eq!(time_period_centre("2050"), None);
        assert_eq!(time_period_centre("s2050"), None);
        assert_eq!(time_period_centre("20x0s"), None);
        assert_eq!(time_period_centre("20500s"), None);
        assert_eq!(time_period_centre(""), None);
    }

    #[test]
    fn test_time_period_bounds() {
        let (start, end) = time_period_bounds(2055);

        assert_eq!(start, NaiveDate::from_ymd(2040, 1, 1).and_hms(0, 0, 0));
        assert_eq!(end, NaiveDate::from_ymd(2069, 12, 31).and_hms(23, 59, 59));
    }

    #[test]
    fn test_time_period_round_trip() {
        for &(tag, start_year, end_year) in
            &[("2020s", 2010, 2039), ("2050s", 2040, 2069), ("2080s", 2070, 2099)]
        {
            let centre = time_period_centre(tag).unwrap();
            let (start, end) = time_period_bounds(centre);

            assert_eq!(start, NaiveDate::from_ymd(start_year, 1, 1).and_hms(0, 0, 0));
            assert_eq!(end, NaiveDate::from_ymd(end_year, 12, 31).and_hms(23, 59, 59));
        }
    }
}
