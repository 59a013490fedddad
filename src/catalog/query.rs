//! Read queries over the catalog, the surface consumed by an API layer.

use std::str::FromStr;

use super::Catalog;

use crate::{
    errors::WxCatalogErr,
    files::{FileKind, FileRecord, FileType, WxFileMeta},
    location::{Location, LocationRecord},
    scenario::Scenario,
    version::{Version, VersionRecord},
};

const FILE_COLUMNS: &str = "file_id, file_type, file_path, scenario, location_id, version_id,
     creation_date, data_source, design_data_type, time_period_start, time_period_end,
     ensemble_statistic, variables, anomaly, smoothing";

impl Catalog {
    /// Retrieve all locations in the catalog, ordered by id.
    pub fn locations(&self) -> Result<Vec<LocationRecord>, WxCatalogErr> {
        let mut stmt = self.db_conn.prepare(
            "SELECT location_id, city, province, country, code, longitude, latitude, elevation
                  FROM locations
                  ORDER BY location_id",
        )?;

        let vals: Result<Vec<LocationRecord>, WxCatalogErr> = stmt
            .query_and_then(rusqlite::NO_PARAMS, Self::parse_row_to_location)?
            .collect();

        vals
    }

    /// Retrieve a single location by id.
    pub fn location(&self, location_id: i64) -> Option<LocationRecord> {
        self.db_conn
            .query_row_and_then(
                "SELECT location_id, city, province, country, code, longitude, latitude, elevation
                      FROM locations
                      WHERE location_id = ?1",
                &[&location_id],
                Self::parse_row_to_location,
            )
            .ok()
    }

    /// Retrieve all versions in the catalog, ordered by id.
    pub fn versions(&self) -> Result<Vec<VersionRecord>, WxCatalogErr> {
        let mut stmt = self
            .db_conn
            .prepare("SELECT version_id, label, description FROM versions ORDER BY version_id")?;

        let vals: Result<Vec<VersionRecord>, WxCatalogErr> = stmt
            .query_map(rusqlite::NO_PARAMS, |row| {
                Ok(VersionRecord {
                    id: row.get(0)?,
                    version: Version {
                        label: row.get(1)?,
                        description: row.get(2)?,
                    },
                })
            })?
            .map(|res| res.map_err(WxCatalogErr::Database))
            .collect();

        vals
    }

    /// Retrieve all files in the catalog, ordered by id.
    pub fn files(&self) -> Result<Vec<FileRecord>, WxCatalogErr> {
        let mut stmt = self
            .db_conn
            .prepare(&format!("SELECT {} FROM files ORDER BY file_id", FILE_COLUMNS))?;

        let vals: Result<Vec<FileRecord>, WxCatalogErr> = stmt
            .query_and_then(rusqlite::NO_PARAMS, Self::parse_row_to_file)?
            .collect();

        vals
    }

    /// Retrieve all files for one location, ordered by id.
    pub fn files_for_location(&self, location_id: i64) -> Result<Vec<FileRecord>, WxCatalogErr> {
        let mut stmt = self.db_conn.prepare(&format!(
            "SELECT {} FROM files WHERE location_id = ?1 ORDER BY file_id",
            FILE_COLUMNS
        ))?;

        let vals: Result<Vec<FileRecord>, WxCatalogErr> = stmt
            .query_and_then(&[&location_id], Self::parse_row_to_file)?
            .collect();

        vals
    }

    /// Retrieve a single file record by id.
    pub fn file(&self, file_id: i64) -> Result<FileRecord, WxCatalogErr> {
        let found = self.db_conn.query_row_and_then(
            &format!("SELECT {} FROM files WHERE file_id = ?1", FILE_COLUMNS),
            &[&file_id],
            Self::parse_row_to_file,
        );

        match found {
            Ok(record) => Ok(record),
            Err(WxCatalogErr::Database(rusqlite::Error::QueryReturnedNoRows)) => {
                Err(WxCatalogErr::NotInIndex)
            }
            Err(err) => Err(err),
        }
    }

    fn parse_row_to_location(row: &rusqlite::Row) -> Result<LocationRecord, WxCatalogErr> {
        Ok(LocationRecord {
            id: row.get(0)?,
            location: Location {
                city: row.get(1)?,
                province: row.get(2)?,
                country: row.get(3)?,
                code: row.get(4)?,
                longitude: row.get(5)?,
                latitude: row.get(6)?,
                elevation: row.get(7)?,
            },
        })
    }

    fn parse_row_to_file(row: &rusqlite::Row) -> Result<FileRecord, WxCatalogErr> {
        let id: i64 = row.get(0)?;
        let file_type: String = row.get(1)?;
        let file_type = FileType::from_str(&file_type)?;
        let path: String = row.get(2)?;
        let scenario: String = row.get(3)?;
        let scenario = Scenario::from_str(&scenario)?;
        let location_id: i64 = row.get(4)?;
        let version_id: i64 = row.get(5)?;

        let kind = match file_type {
            FileType::Summary => FileKind::Summary { scenario },
            FileType::Weather => {
                let data_source: String = row.get(7)?;
                let design_data_type: String = row.get(8)?;
                let ensemble_statistic: String = row.get(11)?;
                let anomaly: String = row.get(13)?;

                FileKind::Weather(WxFileMeta {
                    creation_date: row.get(6)?,
                    data_source,
                    design_data_type: FromStr::from_str(&design_data_type)?,
                    scenario,
                    time_period_start: row.get(9)?,
                    time_period_end: row.get(10)?,
                    ensemble_statistic: FromStr::from_str(&ensemble_statistic)?,
                    variables: row.get(12)?,
                    anomaly: FromStr::from_str(&anomaly)?,
                    smoothing: row.get(14)?,
                })
            }
        };

        Ok(FileRecord {
            id,
            path: path.into(),
            location_id,
            version_id,
            kind,
        })
    }
}
