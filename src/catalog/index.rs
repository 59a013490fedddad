//! Directory walking and per-file indexing operations.
//!
//! One location directory is fully processed before the next begins; there is
//! no internal parallelism. Each weather file is opened, its header lines
//! read, and the handle released before the next file, whatever the parse
//! outcome.

use std::{
    ffi::OsStr,
    io::BufReader,
    path::{Path, PathBuf},
};

use super::Catalog;

use crate::{
    errors::WxCatalogErr,
    files::{FileRecord, WxFileDefaults},
    parse::header::{parse_header, HeaderConfig},
    report::IndexReport,
    scenario::Scenario,
    version::Version,
};

use tracing::{debug, info, warn};

const WX_FILE_EXT: &str = "epw";
// The source collections are inconsistent about the spreadsheet extension, so
// both spellings are recognized.
const SUMMARY_FILE_EXTS: &[&str] = &["xlsx", "xslx"];

impl Catalog {
    /// Index a collection of location subdirectories under `root`.
    ///
    /// The walk is one level deep: each subdirectory of `root` is treated as a
    /// location directory, never searched recursively. A failure in one
    /// subdirectory is logged and does not abort the rest of the collection.
    pub fn index_collection(
        &self,
        version: &Version,
        root: &Path,
    ) -> Result<IndexReport, WxCatalogErr> {
        info!("indexing location collection at {}", root.display());

        let version_id = self.find_or_insert_version(version)?;

        let mut report = IndexReport::default();
        for entry in std::fs::read_dir(root)? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!("unreadable directory entry under {}: {}", root.display(), err);
                    continue;
                }
            };

            if !entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false) {
                continue;
            }

            match self.index_location_dir_impl(version_id, &entry.path()) {
                Ok(dir_report) => report.merge(dir_report),
                Err(err) => {
                    warn!(
                        "skipping location directory {}: {}",
                        entry.path().display(),
                        err
                    );
                }
            }
        }

        Ok(report)
    }

    /// Index a single location directory.
    ///
    /// Weather files are indexed first, then the directory's location and
    /// scenario are aggregated from them, and finally any summary file is
    /// indexed against that aggregate. A directory with no recognized files
    /// yields an empty report.
    pub fn index_location_dir(
        &self,
        version: &Version,
        dir: &Path,
    ) -> Result<IndexReport, WxCatalogErr> {
        let version_id = self.find_or_insert_version(version)?;
        self.index_location_dir_impl(version_id, dir)
    }

    fn index_location_dir_impl(
        &self,
        version_id: i64,
        dir: &Path,
    ) -> Result<IndexReport, WxCatalogErr> {
        info!("indexing location directory {}", dir.display());

        // SCAN: classify directory entries by extension.
        let mut wx_paths: Vec<PathBuf> = vec![];
        let mut summary_path: Option<PathBuf> = None;
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            if !entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
                continue;
            }

            let path = entry.path();
            match lowercase_extension(&path) {
                Some(ref ext) if ext == WX_FILE_EXT => {
                    debug!("found weather file {}", path.display());
                    wx_paths.push(path);
                }
                Some(ref ext) if SUMMARY_FILE_EXTS.contains(&ext.as_str()) => {
                    debug!("found summary file {}", path.display());
                    summary_path = Some(path);
                }
                _ => {}
            }
        }
        wx_paths.sort();

        // INDEX-WEATHER: one bad file never aborts the directory.
        let mut report = IndexReport::default();
        let mut wx_records: Vec<FileRecord> = vec![];
        for path in wx_paths {
            match self.index_wx_file_impl(version_id, &path) {
                Ok(Some(record)) => wx_records.push(record),
                Ok(None) => report.skipped.push(path),
                Err(err) => {
                    warn!("failed to index weather file {}: {}", path.display(), err);
                    report.skipped.push(path);
                }
            }
        }

        if wx_records.is_empty() {
            info!("no weather files indexed in {}", dir.display());
            if let Some(path) = summary_path {
                warn!(
                    "summary file {} has no sibling weather files to derive a location from",
                    path.display()
                );
                report.skipped.push(path);
            }
            return Ok(report);
        }

        // AGGREGATE: the first successfully indexed file's location wins, and
        // the scenario reduces to a single shared value or the sentinel.
        let location_id = wx_records[0].location_id;
        if wx_records.iter().any(|record| record.location_id != location_id) {
            warn!(
                "weather files in {} disagree on location, keeping the first",
                dir.display()
            );
        }

        let scenario = wx_records
            .iter()
            .skip(1)
            .fold(wx_records[0].scenario(), |acc, record| {
                if acc == record.scenario() {
                    acc
                } else {
                    Scenario::Multiple
                }
            });

        // INDEX-SUMMARY
        if let Some(path) = summary_path {
            match self.index_summary_file_impl(version_id, location_id, scenario, &path) {
                Ok(record) => wx_records.push(record),
                Err(err) => {
                    warn!("failed to index summary file {}: {}", path.display(), err);
                    report.skipped.push(path);
                }
            }
        }

        report.files.extend(wx_records);
        Ok(report)
    }

    /// Index a single weather file.
    ///
    /// Returns `Ok(None)` when the file's name or header could not be parsed;
    /// that is a recoverable per-file condition, logged, and the caller should
    /// skip the file. A non-`.epw` path is a caller bug and an error.
    pub fn index_wx_file(
        &self,
        version: &Version,
        path: &Path,
    ) -> Result<Option<FileRecord>, WxCatalogErr> {
        let version_id = self.find_or_insert_version(version)?;
        self.index_wx_file_impl(version_id, path)
    }

    fn index_wx_file_impl(
        &self,
        version_id: i64,
        path: &Path,
    ) -> Result<Option<FileRecord>, WxCatalogErr> {
        info!("indexing weather file {}", path.display());
        check_extension(path, &[WX_FILE_EXT])?;

        let file_name = match path.file_name().and_then(OsStr::to_str) {
            Some(name) => name,
            None => {
                return Err(WxCatalogErr::WrongFileType(format!(
                    "{} has no usable file name",
                    path.display()
                )));
            }
        };

        let parsed = {
            // Scoped so the handle is released before any database work.
            let file = std::fs::File::open(path)?;
            let mut reader = BufReader::new(file);
            parse_header(
                &mut reader,
                file_name,
                &HeaderConfig::default(),
                &WxFileDefaults::default(),
            )?
        };

        let (location, meta) = match (parsed.location, parsed.wx_file) {
            (Some(location), Some(meta)) => (location, meta),
            _ => {
                warn!("could not parse metadata for {}, skipping", path.display());
                return Ok(None);
            }
        };

        let location_id = self.find_or_insert_location(&location)?;
        let record = self.find_or_insert_wx_file(location_id, version_id, &meta, path)?;

        Ok(Some(record))
    }

    /// Index a single summary file against an externally determined location
    /// and scenario.
    ///
    /// A summary file does not carry enough metadata to determine its own
    /// location; the directory walker supplies both from the sibling weather
    /// files. A non-spreadsheet path is a caller bug and an error.
    pub fn index_summary_file(
        &self,
        version: &Version,
        location_id: i64,
        scenario: Scenario,
        path: &Path,
    ) -> Result<FileRecord, WxCatalogErr> {
        let version_id = self.find_or_insert_version(version)?;
        self.index_summary_file_impl(version_id, location_id, scenario, path)
    }

    fn index_summary_file_impl(
        &self,
        version_id: i64,
        location_id: i64,
        scenario: Scenario,
        path: &Path,
    ) -> Result<FileRecord, WxCatalogErr> {
        info!("indexing summary file {}", path.display());
        check_extension(path, SUMMARY_FILE_EXTS)?;

        self.find_or_insert_summary_file(location_id, version_id, scenario, path)
    }
}

fn lowercase_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(OsStr::to_str)
        .map(str::to_lowercase)
}

/// Return an error if `path` does not have one of the allowed extensions.
fn check_extension(path: &Path, allowed: &[&str]) -> Result<(), WxCatalogErr> {
    match lowercase_extension(path) {
        Some(ref ext) if allowed.contains(&ext.as_str()) => Ok(()),
        _ => Err(WxCatalogErr::WrongFileType(format!(
            "{} does not have extension {:?}",
            path.display(),
            allowed
        ))),
    }
}
