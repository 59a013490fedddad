//! Find-or-insert reconciliation between parsed metadata and catalog rows.
//!
//! Every operation queries for an existing row whose identifying fields all
//! match, returns it unchanged if found, and otherwise inserts a new row with
//! the insert-only fields attached. Re-indexing is therefore idempotent for
//! every field in the match key. The find-then-insert pair is not atomic: the
//! catalog assumes a single indexing process runs at a time.

use std::path::Path;

use super::Catalog;

use crate::{
    errors::WxCatalogErr,
    files::{FileKind, FileRecord, WxFileMeta},
    location::Location,
    scenario::Scenario,
    version::Version,
};

/// Which fields identify a file row for find-or-insert.
///
/// The parsed and derived metadata always participate. Whether the filesystem
/// path does is a policy choice: excluding it means a copy of a file at a new
/// path reuses the existing row (and the new path is dropped), including it
/// means each distinct path gets its own row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileMatchPolicy {
    /// Match on metadata only; the path is attached on insert and never compared.
    MetadataOnly,
    /// Match on metadata and the filesystem path.
    MetadataAndPath,
}

impl Catalog {
    /// Set the file identity policy used when reconciling file rows.
    pub fn set_file_match_policy(&mut self, policy: FileMatchPolicy) {
        self.file_match = policy;
    }

    /// Find the location row matching this location's identity fields, or
    /// insert one. Coordinates and elevation are attached only on insert.
    pub(crate) fn find_or_insert_location(&self, location: &Location) -> Result<i64, WxCatalogErr> {
        let found: Result<i64, _> = self.db_conn.query_row(
            "SELECT location_id FROM locations WHERE city = ?1 AND province = ?2 AND country = ?3 AND code = ?4",
            &[
                &location.city as &dyn rusqlite::types::ToSql,
                &location.province,
                &location.country,
                &location.code,
            ],
            |row| row.get(0),
        );

        match found {
            Ok(id) => Ok(id),
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                self.db_conn.execute(
                    "INSERT INTO locations (city, province, country, code, longitude, latitude, elevation)
                          VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    &[
                        &location.city as &dyn rusqlite::types::ToSql,
                        &location.province,
                        &location.country,
                        &location.code,
                        &location.longitude,
                        &location.latitude,
                        &location.elevation,
                    ],
                )?;
                Ok(self.db_conn.last_insert_rowid())
            }
            Err(err) => Err(WxCatalogErr::Database(err)),
        }
    }

    /// Find the version row with this label, or insert one. The description is
    /// attached only on insert.
    pub(crate) fn find_or_insert_version(&self, version: &Version) -> Result<i64, WxCatalogErr> {
        let found: Result<i64, _> = self.db_conn.query_row(
            "SELECT version_id FROM versions WHERE label = ?1",
            &[&version.label],
            |row| row.get(0),
        );

        match found {
            Ok(id) => Ok(id),
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                self.db_conn.execute(
                    "INSERT INTO versions (label, description) VALUES (?1, ?2)",
                    &[
                        &version.label as &dyn rusqlite::types::ToSql,
                        &version.description,
                    ],
                )?;
                Ok(self.db_conn.last_insert_rowid())
            }
            Err(err) => Err(WxCatalogErr::Database(err)),
        }
    }

    /// Find the weather file row matching this metadata, or insert one.
    pub(crate) fn find_or_insert_wx_file(
        &self,
        location_id: i64,
        version_id: i64,
        meta: &WxFileMeta,
        path: &Path,
    ) -> Result<FileRecord, WxCatalogErr> {
        let path_text = path.to_string_lossy().to_string();
        let scenario = meta.scenario.as_static_str();
        let design_data_type = meta.design_data_type.as_static_str();
        let ensemble_statistic = meta.ensemble_statistic.as_static_str();
        let anomaly = meta.anomaly.as_static_str();

        let mut find_sql = String::from(
            "SELECT file_id, file_path FROM files
                  WHERE file_type = 'weather'
                    AND location_id = ?1 AND version_id = ?2 AND scenario = ?3
                    AND creation_date = ?4 AND data_source = ?5 AND design_data_type = ?6
                    AND time_period_start = ?7 AND time_period_end = ?8
                    AND ensemble_statistic = ?9 AND variables = ?10 AND anomaly = ?11
                    AND smoothing IS ?12",
        );
        let mut find_params: Vec<&dyn rusqlite::types::ToSql> = vec![
            &location_id,
            &version_id,
            &scenario,
            &meta.creation_date,
            &meta.data_source,
            &design_data_type,
            &meta.time_period_start,
            &meta.time_period_end,
            &ensemble_statistic,
            &meta.variables,
            &anomaly,
            &meta.smoothing,
        ];
        if self.file_match == FileMatchPolicy::MetadataAndPath {
            find_sql.push_str(" AND file_path = ?13");
            find_params.push(&path_text);
        }

        let found: Result<(i64, String), _> =
            self.db_conn.query_row(&find_sql, &find_params, |row| {
                Ok((row.get(0)?, row.get(1)?))
            });

        let (id, stored_path) = match found {
            Ok(pair) => pair,
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                self.db_conn.execute(
                    "INSERT INTO files (file_type, file_path, scenario, location_id, version_id,
                                        creation_date, data_source, design_data_type,
                                        time_period_start, time_period_end, ensemble_statistic,
                                        variables, anomaly, smoothing)
                          VALUES ('weather', ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                    &[
                        &path_text as &dyn rusqlite::types::ToSql,
                        &scenario,
                        &location_id,
                        &version_id,
                        &meta.creation_date,
                        &meta.data_source,
                        &design_data_type,
                        &meta.time_period_start,
                        &meta.time_period_end,
                        &ensemble_statistic,
                        &meta.variables,
                        &anomaly,
                        &meta.smoothing,
                    ],
                )?;
                (self.db_conn.last_insert_rowid(), path_text)
            }
            Err(err) => return Err(WxCatalogErr::Database(err)),
        };

        Ok(FileRecord {
            id,
            path: stored_path.into(),
            location_id,
            version_id,
            kind: FileKind::Weather(meta.clone()),
        })
    }

    /// Find the summary file row for this location, version, and scenario, or
    /// insert one.
    pub(crate) fn find_or_insert_summary_file(
        &self,
        location_id: i64,
        version_id: i64,
        scenario: Scenario,
        path: &Path,
    ) -> Result<FileRecord, WxCatalogErr> {
        let path_text = path.to_string_lossy().to_string();
        let scenario_text = scenario.as_static_str();

        let mut find_sql = String::from(
            "SELECT file_id, file_path FROM files
                  WHERE file_type = 'summary'
                    AND location_id = ?1 AND version_id = ?2 AND scenario = ?3",
        );
        let mut find_params: Vec<&dyn rusqlite::types::ToSql> =
            vec![&location_id, &version_id, &scenario_text];
        if self.file_match == FileMatchPolicy::MetadataAndPath {
            find_sql.push_str(" AND file_path = ?4");
            find_params.push(&path_text);
        }

        let found: Result<(i64, String), _> =
            self.db_conn.query_row(&find_sql, &find_params, |row| {
                Ok((row.get(0)?, row.get(1)?))
            });

        let (id, stored_path) = match found {
            Ok(pair) => pair,
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                self.db_conn.execute(
                    "INSERT INTO files (file_type, file_path, scenario, location_id, version_id)
                          VALUES ('summary', ?1, ?2, ?3, ?4)",
                    &[
                        &path_text as &dyn rusqlite::types::ToSql,
                        &scenario_text,
                        &location_id,
                        &version_id,
                    ],
                )?;
                (self.db_conn.last_insert_rowid(), path_text)
            }
            Err(err) => return Err(WxCatalogErr::Database(err)),
        };

        Ok(FileRecord {
            id,
            path: stored_path.into(),
            location_id,
            version_id,
            kind: FileKind::Summary { scenario },
        })
    }
}
