//! A catalog of climate-model derived weather files.

use std::path::PathBuf;

/// The catalog.
///
/// Wraps the sqlite index database. Indexing assumes a single writing process
/// at a time; the find-or-insert reconciliation is not safe against concurrent
/// indexing runs over the same collection.
#[derive(Debug)]
pub struct Catalog {
    root: PathBuf,                 // The root directory.
    db_conn: rusqlite::Connection, // An sqlite connection.
    file_match: FileMatchPolicy,   // Identity policy for file rows.
}

mod index;
mod query;
mod reconcile;
mod root;

pub use self::reconcile::FileMatchPolicy;

#[cfg(test)]
mod unit {
    use super::*;
    use crate::{
        errors::WxCatalogErr,
        files::{Anomaly, DesignDataType, EnsembleStatistic, FileKind, FileType},
        scenario::Scenario,
        version::Version,
    };

    use std::path::{Path, PathBuf};

    use chrono::NaiveDate;
    use tempdir::TempDir;

    // struct to hold temporary data for tests.
    struct TestCatalog {
        tmp: TempDir,
        cat: Catalog,
    }

    // Function to create a new catalog to test.
    fn create_test_catalog() -> Result<TestCatalog, WxCatalogErr> {
        let tmp = TempDir::new("wx-catalog-test")?;
        let cat = Catalog::create(&tmp.path())?;

        Ok(TestCatalog { tmp, cat })
    }

    // Write a fixture weather file into `dir` and return its path.
    //
    // Format 1 packs the metadata into a single delimited header line and uses
    // the station-coded naming convention; format 2 spreads the metadata over
    // comment lines and uses the scenario-token naming convention. This
    // mirrors the two file families found in real collections.
    fn write_wx_file(
        dir: &Path,
        year: i32,
        city: &str,
        code: &str,
        lon: f64,
        lat: f64,
        elev: f64,
        scenario: &str,
        format: u8,
    ) -> PathBuf {
        std::fs::create_dir_all(dir).expect("Error creating location directory.");

        let (name, content) = match format {
            1 => (
                format!("{}s_CAN_BC_{}.{}_CWEC2016.epw", year, city, code),
                format!(
                    "LOCATION,{},BC,CAN,CWEC2016,{},{:.5},{:.4},-8.0,{:.1} | Morphed:TAS,RHS,DWPT,PS | File Version: 2.1 | Creation Date: 2020-06-23\nOTHER STUFF\n",
                    city, code, lat, lon, elev
                ),
            ),
            2 => (
                format!("MORPHED_{}_{}s_CAN_BC_{}_CWEC2016.epw", scenario, year, city),
                format!(
                    "LOCATION,{},BC,CAN,CWEC2016,{},{:.5},{:.4},-8.0,{:.1}\n\
                     COMMENTS 1, Future-shifted CWEC2020 EPW file for the {}s using projections from the {} scenario.\n\
                     COMMENTS 2, Future-shifted variables:TAS,RHS,DWPT,PS, File Version: 3.0, Creation Date: 2020-06-23\n\
                     OTHER STUFF\n",
                    city, code, lat, lon, elev, year, scenario
                ),
            ),
            _ => panic!("Unprepared for this fixture format!"),
        };

        let path = dir.join(name);
        std::fs::write(&path, content).expect("Error writing fixture weather file.");
        path
    }

    fn write_summary_file(dir: &Path, name: &str) -> PathBuf {
        std::fs::create_dir_all(dir).expect("Error creating location directory.");
        let path = dir.join(name);
        std::fs::write(&path, "summary spreadsheet bytes\n")
            .expect("Error writing fixture summary file.");
        path
    }

    // Fill a location directory with the standard three-period fixture.
    fn fill_creston_dir(dir: &Path, scenario: &str) -> Vec<PathBuf> {
        [2020, 2050, 2080]
            .iter()
            .map(|&year| {
                write_wx_file(
                    dir, year, "Creston", "717700", -116.5007, 49.0817, 640.7, scenario, 2,
                )
            })
            .collect()
    }

    fn count_rows(cat: &Catalog, table: &str) -> i64 {
        cat.db_conn
            .query_row(
                &format!("SELECT COUNT(*) FROM {}", table),
                rusqlite::NO_PARAMS,
                |row| row.get(0),
            )
            .expect("Error counting rows.")
    }

    #[test]
    fn test_catalog_create_new() {
        assert!(create_test_catalog().is_ok());
    }

    #[test]
    fn test_catalog_connect() {
        let TestCatalog { tmp, cat } = create_test_catalog().expect("Failed to create catalog.");
        drop(cat);

        assert!(Catalog::connect(&tmp.path()).is_ok());
        assert!(Catalog::connect(&"unlikely_directory_in_my_project").is_err());
    }

    #[test]
    fn test_get_root() {
        let TestCatalog { tmp, cat } = create_test_catalog().expect("Failed to create catalog.");

        let root = cat.root();
        assert_eq!(root, tmp.path());
    }

    #[test]
    fn test_index_one_wx_file() {
        let TestCatalog { tmp, cat } = create_test_catalog().expect("Failed to create catalog.");

        let dir = tmp.path().join("collection").join("creston");
        write_wx_file(
            &dir, 2050, "Creston", "717700", -116.5007, 49.0817, 640.7, "RCP85", 1,
        );

        let report = cat
            .index_location_dir(&Version::new("CMIP5"), &dir)
            .expect("Error indexing location directory.");

        assert_eq!(report.files.len(), 1);
        assert!(report.skipped.is_empty());

        let locations = cat.locations().expect("Error retrieving locations.");
        assert_eq!(locations.len(), 1);
        let location = &locations[0].location;
        assert_eq!(location.city, "Creston");
        assert_eq!(location.province, "BC");
        assert_eq!(location.country, "CAN");
        assert_eq!(location.code, "717700");
        assert_eq!(location.longitude, -116.5007);
        assert_eq!(location.latitude, 49.0817);
        assert_eq!(location.elevation, Some(640.7));

        let record = &report.files[0];
        match &record.kind {
            FileKind::Weather(meta) => {
                assert_eq!(
                    meta.creation_date,
                    NaiveDate::from_ymd(2020, 6, 23).and_hms(0, 0, 0)
                );
                assert_eq!(meta.data_source, "CWEC2016");
                assert_eq!(meta.design_data_type, DesignDataType::Tmy);
                assert_eq!(meta.scenario, Scenario::Rcp85);
                assert_eq!(
                    meta.time_period_start,
                    NaiveDate::from_ymd(2040, 1, 1).and_hms(0, 0, 0)
                );
                assert_eq!(
                    meta.time_period_end,
                    NaiveDate::from_ymd(2069, 12, 31).and_hms(23, 59, 59)
                );
                assert_eq!(meta.ensemble_statistic, EnsembleStatistic::Average);
                assert_eq!(meta.variables, "all thermodynamic");
                assert_eq!(meta.anomaly, Anomaly::Daily);
                assert_eq!(meta.smoothing, Some(21));
            }
            FileKind::Summary { .. } => panic!("Weather file indexed as a summary file."),
        }

        let versions = cat.versions().expect("Error retrieving versions.");
        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].version.label, "CMIP5");
    }

    #[test]
    fn test_reindexing_is_idempotent() {
        let TestCatalog { tmp, cat } = create_test_catalog().expect("Failed to create catalog.");

        let dir = tmp.path().join("collection").join("creston");
        fill_creston_dir(&dir, "RCP85");
        write_summary_file(&dir, "creston_summary.xlsx");

        let version = Version::new("CMIP6");

        cat.index_location_dir(&version, &dir)
            .expect("Error indexing location directory.");

        let locations_after_first = count_rows(&cat, "locations");
        let files_after_first = count_rows(&cat, "files");
        let versions_after_first = count_rows(&cat, "versions");

        let report = cat
            .index_location_dir(&version, &dir)
            .expect("Error re-indexing location directory.");

        assert_eq!(count_rows(&cat, "locations"), locations_after_first);
        assert_eq!(count_rows(&cat, "files"), files_after_first);
        assert_eq!(count_rows(&cat, "versions"), versions_after_first);

        // The second run still reports every file it reconciled.
        assert_eq!(report.files.len(), 4);
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn test_index_many_wx_files_one_location() {
        let TestCatalog { tmp, cat } = create_test_catalog().expect("Failed to create catalog.");

        let dir = tmp.path().join("collection").join("creston");
        fill_creston_dir(&dir, "RCP85");

        let report = cat
            .index_location_dir(&Version::new("CMIP6"), &dir)
            .expect("Error indexing location directory.");

        assert_eq!(report.files.len(), 3);
        assert_eq!(count_rows(&cat, "locations"), 1);
        assert_eq!(count_rows(&cat, "files"), 3);
    }

    #[test]
    fn test_end_to_end_with_summary() {
        let TestCatalog { tmp, cat } = create_test_catalog().expect("Failed to create catalog.");

        let dir = tmp.path().join("collection").join("creston");
        fill_creston_dir(&dir, "RCP85");
        write_summary_file(&dir, "creston_summary.xlsx");

        let report = cat
            .index_location_dir(&Version::new("CMIP6"), &dir)
            .expect("Error indexing location directory.");

        assert_eq!(count_rows(&cat, "locations"), 1);
        assert_eq!(count_rows(&cat, "files"), 4);
        assert_eq!(report.files.len(), 4);

        let weather_count = report
            .files
            .iter()
            .filter(|record| match record.kind {
                FileKind::Weather(_) => true,
                _ => false,
            })
            .count();
        assert_eq!(weather_count, 3);

        let summary = report
            .files
            .iter()
            .find(|record| match record.kind {
                FileKind::Summary { .. } => true,
                _ => false,
            })
            .expect("No summary file indexed.");
        assert_eq!(summary.scenario(), Scenario::Rcp85);
        assert_eq!(summary.location_id, report.files[0].location_id);
    }

    #[test]
    fn test_summary_scenario_reduces_to_multiple() {
        let TestCatalog { tmp, cat } = create_test_catalog().expect("Failed to create catalog.");

        let dir = tmp.path().join("collection").join("creston");
        write_wx_file(
            &dir, 2050, "Creston", "717700", -116.5007, 49.0817, 640.7, "RCP85", 2,
        );
        write_wx_file(
            &dir, 2050, "Creston", "717700", -116.5007, 49.0817, 640.7, "SSP585", 2,
        );
        write_summary_file(&dir, "creston_summary.xlsx");

        let report = cat
            .index_location_dir(&Version::new("CMIP6"), &dir)
            .expect("Error indexing location directory.");

        let summary = report
            .files
            .iter()
            .find(|record| record.file_type() == FileType::Summary)
            .expect("No summary file indexed.");
        assert_eq!(summary.scenario(), Scenario::Multiple);
    }

    #[test]
    fn test_skips_malformed_and_continues() {
        let TestCatalog { tmp, cat } = create_test_catalog().expect("Failed to create catalog.");

        let dir = tmp.path().join("collection").join("creston");
        write_wx_file(
            &dir, 2050, "Creston", "717700", -116.5007, 49.0817, 640.7, "RCP85", 2,
        );

        let bad = dir.join("MORPHED_RCP85_2020s_CAN_BC_Creston_CWEC2016.epw");
        std::fs::write(&bad, "THIS IS NOT A WEATHER FILE HEADER\n")
            .expect("Error writing fixture file.");

        std::fs::write(dir.join("notes.txt"), "not a catalog file\n")
            .expect("Error writing fixture file.");

        let report = cat
            .index_location_dir(&Version::new("CMIP6"), &dir)
            .expect("Error indexing location directory.");

        assert_eq!(report.files.len(), 1);
        assert_eq!(report.skipped, vec![bad]);
        assert_eq!(count_rows(&cat, "files"), 1);
    }

    #[test]
    fn test_empty_directory() {
        let TestCatalog { tmp, cat } = create_test_catalog().expect("Failed to create catalog.");

        let dir = tmp.path().join("collection").join("empty");
        std::fs::create_dir_all(&dir).expect("Error creating location directory.");

        let report = cat
            .index_location_dir(&Version::new("CMIP6"), &dir)
            .expect("Error indexing location directory.");

        assert!(report.is_empty());
        assert_eq!(count_rows(&cat, "locations"), 0);
        assert_eq!(count_rows(&cat, "files"), 0);
    }

    #[test]
    fn test_summary_without_weather_files_is_skipped() {
        let TestCatalog { tmp, cat } = create_test_catalog().expect("Failed to create catalog.");

        let dir = tmp.path().join("collection").join("creston");
        let summary = write_summary_file(&dir, "creston_summary.xlsx");

        let report = cat
            .index_location_dir(&Version::new("CMIP6"), &dir)
            .expect("Error indexing location directory.");

        assert!(report.files.is_empty());
        assert_eq!(report.skipped, vec![summary]);
    }

    #[test]
    fn test_wrong_extension_is_fatal_for_the_call() {
        let TestCatalog { tmp, cat } = create_test_catalog().expect("Failed to create catalog.");

        let dir = tmp.path().join("collection").join("creston");
        let summary = write_summary_file(&dir, "creston_summary.xlsx");
        let wx = write_wx_file(
            &dir, 2050, "Creston", "717700", -116.5007, 49.0817, 640.7, "RCP85", 2,
        );

        let version = Version::new("CMIP6");

        match cat.index_wx_file(&version, &summary) {
            Err(WxCatalogErr::WrongFileType(_)) => {}
            Err(_) => panic!("Wrong error type returned."),
            Ok(_) => panic!("Indexing a spreadsheet as a weather file should fail."),
        }

        match cat.index_summary_file(&version, 1, Scenario::Rcp85, &wx) {
            Err(WxCatalogErr::WrongFileType(_)) => {}
            Err(_) => panic!("Wrong error type returned."),
            Ok(_) => panic!("Indexing a weather file as a summary file should fail."),
        }
    }

    #[test]
    fn test_file_match_policy() {
        let TestCatalog { tmp, mut cat } =
            create_test_catalog().expect("Failed to create catalog.");

        let dir_a = tmp.path().join("collection").join("creston");
        let dir_b = tmp.path().join("elsewhere").join("creston");
        let path_a = write_wx_file(
            &dir_a, 2050, "Creston", "717700", -116.5007, 49.0817, 640.7, "RCP85", 1,
        );
        let path_b = write_wx_file(
            &dir_b, 2050, "Creston", "717700", -116.5007, 49.0817, 640.7, "RCP85", 1,
        );

        let version = Version::new("CMIP5");

        let first = cat
            .index_wx_file(&version, &path_a)
            .expect("Error indexing weather file.")
            .expect("Fixture file failed to parse.");

        // Same metadata at a new path reuses the existing row by default, and
        // the new path is dropped.
        let second = cat
            .index_wx_file(&version, &path_b)
            .expect("Error indexing weather file.")
            .expect("Fixture file failed to parse.");

        assert_eq!(count_rows(&cat, "files"), 1);
        assert_eq!(second.id, first.id);
        assert_eq!(second.path, path_a);

        // With the path in the identity, the copy gets its own row.
        cat.set_file_match_policy(FileMatchPolicy::MetadataAndPath);

        let third = cat
            .index_wx_file(&version, &path_b)
            .expect("Error indexing weather file.")
            .expect("Fixture file failed to parse.");

        assert_eq!(count_rows(&cat, "files"), 2);
        assert_ne!(third.id, first.id);
        assert_eq!(third.path, path_b);
    }

    #[test]
    fn test_collection_walk() {
        let TestCatalog { tmp, cat } = create_test_catalog().expect("Failed to create catalog.");

        let root = tmp.path().join("collection");
        let creston = root.join("creston");
        let burns_lake = root.join("burns_lake");

        fill_creston_dir(&creston, "RCP85");
        write_summary_file(&creston, "creston_summary.xlsx");
        write_wx_file(
            &burns_lake, 2050, "Burns Lake AP", "719520", -125.9587, 54.3832, 713.2, "RCP85", 2,
        );

        // A stray file at the collection root is not a location directory.
        std::fs::write(root.join("README"), "stray file\n").expect("Error writing fixture file.");

        let report = cat
            .index_collection(&Version::new("CMIP6"), &root)
            .expect("Error indexing collection.");

        assert_eq!(report.files.len(), 5);
        assert_eq!(count_rows(&cat, "locations"), 2);
        assert_eq!(count_rows(&cat, "files"), 5);
        assert_eq!(count_rows(&cat, "versions"), 1);
    }

    #[test]
    fn test_location_disagreement_keeps_first() {
        let TestCatalog { tmp, cat } = create_test_catalog().expect("Failed to create catalog.");

        // A mislabeled directory holding files from two different stations.
        let dir = tmp.path().join("collection").join("mixed");
        write_wx_file(
            &dir, 2020, "Creston", "717700", -116.5007, 49.0817, 640.7, "RCP85", 2,
        );
        write_wx_file(
            &dir, 2050, "Elsewhere", "111110", -125.2, 51.1, 1000.0, "RCP85", 2,
        );
        write_summary_file(&dir, "mixed_summary.xlsx");

        let report = cat
            .index_location_dir(&Version::new("CMIP6"), &dir)
            .expect("Error indexing location directory.");

        // Both weather files index, each against its own location.
        assert_eq!(count_rows(&cat, "locations"), 2);
        assert_eq!(report.files.len(), 3);

        // The summary file is attributed to the first indexed file's location.
        let summary = report
            .files
            .iter()
            .find(|record| record.file_type() == FileType::Summary)
            .expect("No summary file indexed.");
        assert_eq!(summary.location_id, report.files[0].location_id);
    }

    #[test]
    fn test_files_round_trip() {
        let TestCatalog { tmp, cat } = create_test_catalog().expect("Failed to create catalog.");

        let dir = tmp.path().join("collection").join("creston");
        fill_creston_dir(&dir, "RCP85");
        write_summary_file(&dir, "creston_summary.xlsx");

        let report = cat
            .index_location_dir(&Version::new("CMIP6"), &dir)
            .expect("Error indexing location directory.");

        for record in &report.files {
            let retrieved = cat.file(record.id).expect("Failure to load.");
            assert_eq!(&retrieved, record);
        }

        let location_id = report.files[0].location_id;
        let for_location = cat
            .files_for_location(location_id)
            .expect("Error retrieving files for location.");
        assert_eq!(for_location.len(), 4);

        let all = cat.files().expect("Error retrieving files.");
        assert_eq!(all.len(), 4);
    }

    #[test]
    fn test_file_not_in_index() {
        let TestCatalog { tmp: _tmp, cat } =
            create_test_catalog().expect("Failed to create catalog.");

        match cat.file(9999) {
            Err(WxCatalogErr::NotInIndex) => {}
            Err(_) => panic!("Wrong error type returned."),
            Ok(_) => panic!("This should not exist in the database."),
        }
    }

    #[test]
    fn test_version_description_is_insert_only() {
        let TestCatalog { tmp: _tmp, cat } =
            create_test_catalog().expect("Failed to create catalog.");

        let with_description = Version {
            label: "CMIP6".to_owned(),
            description: Some("Sixth coupled model intercomparison project".to_owned()),
        };

        let first_id = cat
            .find_or_insert_version(&with_description)
            .expect("Error inserting version.");

        // A later encounter with the bare label reuses the same row unchanged.
        let second_id = cat
            .find_or_insert_version(&Version::new("CMIP6"))
            .expect("Error reconciling version.");
        assert_eq!(first_id, second_id);

        let versions = cat.versions().expect("Error retrieving versions.");
        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].version, with_description);
    }

    #[test]
    fn test_location_query() {
        let TestCatalog { tmp, cat } = create_test_catalog().expect("Failed to create catalog.");

        let dir = tmp.path().join("collection").join("creston");
        write_wx_file(
            &dir, 2050, "Creston", "717700", -116.5007, 49.0817, 640.7, "RCP85", 2,
        );

        cat.index_location_dir(&Version::new("CMIP6"), &dir)
            .expect("Error indexing location directory.");

        let locations = cat.locations().expect("Error retrieving locations.");
        assert_eq!(locations.len(), 1);

        let by_id = cat.location(locations[0].id).expect("Error retrieving location.");
        assert_eq!(by_id, locations[0]);

        assert!(cat.location(9999).is_none());
    }
}
