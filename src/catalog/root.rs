use std::path::Path;

use super::Catalog;

use crate::{catalog::FileMatchPolicy, errors::WxCatalogErr};

impl Catalog {
    const DB_FILE: &'static str = "index.db";

    /// Initialize a new catalog.
    pub fn create(root: &dyn AsRef<Path>) -> Result<Self, WxCatalogErr> {
        let db_file = root.as_ref().join(Catalog::DB_FILE);
        let root = root.as_ref().to_path_buf();

        std::fs::create_dir_all(&root)?;

        // Create and set up the catalog
        let db_conn = rusqlite::Connection::open_with_flags(
            db_file,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE | rusqlite::OpenFlags::SQLITE_OPEN_CREATE,
        )?;

        db_conn.execute_batch(include_str!("root/create_index.sql"))?;

        Ok(Catalog {
            root,
            db_conn,
            file_match: FileMatchPolicy::MetadataOnly,
        })
    }

    /// Open an existing catalog.
    pub fn connect(root: &dyn AsRef<Path>) -> Result<Self, WxCatalogErr> {
        let db_file = root.as_ref().join(Catalog::DB_FILE);
        let root = root.as_ref().to_path_buf();

        let db_conn = rusqlite::Connection::open_with_flags(
            db_file,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE,
        )?;

        Self::validate_db_structure(&db_conn)?;

        Ok(Catalog {
            root,
            db_conn,
            file_match: FileMatchPolicy::MetadataOnly,
        })
    }

    /// Retrieve a path to the root directory of the catalog.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Validate the database structure is correct.
    fn validate_db_structure(db_conn: &rusqlite::Connection) -> Result<(), WxCatalogErr> {
        // Check the number of tables
        let num_tables: i64 = db_conn.query_row(
            "SELECT COUNT(name) FROM sqlite_master WHERE type='table' ORDER BY name",
            rusqlite::NO_PARAMS,
            |row| row.get(0),
        )?;

        if num_tables != 3 {
            return Err(WxCatalogErr::InvalidSchema);
        }

        // Check the table names.
        let mut stmt =
            db_conn.prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")?;

        let iter = stmt.query_map(rusqlite::NO_PARAMS, |row: &rusqlite::Row| {
            let name: String = row.get(0)?;

            if name == "files" || name == "locations" || name == "versions" {
                Ok(true)
            } else {
                Ok(false)
            }
        })?;

        for valid in iter {
            match valid {
                Ok(true) => {}
                Ok(false) => return Err(WxCatalogErr::InvalidSchema),
                Err(err) => return Err(err.into()),
            }
        }

        Ok(())
    }
}
