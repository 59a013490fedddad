#![deny(missing_docs)]
//! Package to index and interface with a catalog of climate-model derived weather files.
//!
//! The catalog is an sqlite database of locations, data versions, and file metadata
//! scraped from the names and header lines of building-energy weather files (.epw)
//! and their companion summary spreadsheets. Indexing is idempotent: re-running it
//! over an unchanged directory tree adds no new rows.

//
// Public API
//
pub use crate::{
    catalog::{Catalog, FileMatchPolicy},
    errors::WxCatalogErr,
    files::{
        time_period_bounds, time_period_centre, Anomaly, DesignDataType, EnsembleStatistic,
        FileKind, FileRecord, FileType, WxFileDefaults, WxFileMeta,
    },
    location::{Location, LocationRecord},
    report::IndexReport,
    scenario::Scenario,
    version::{Version, VersionRecord},
};

//
// Implementation only
//
#[macro_use]
extern crate strum_macros;

mod catalog;
mod errors;
mod files;
mod location;
mod parse;
mod report;
mod scenario;
mod version;

#[cfg(test)]
extern crate tempdir;
