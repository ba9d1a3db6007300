use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::domain::entities::dataset::{DatasetMeta, ImportResult};
use crate::infra::import::spreadsheet::SpreadsheetSource;
use crate::infra::sqlite::repo::SqliteSource;

pub struct ImportService {
    db_path: PathBuf,
}

impl ImportService {
    pub fn new(db_path: PathBuf) -> Self {
        Self { db_path }
    }

    pub fn import_directory(&self, dir: &Path) -> Result<Vec<ImportResult>> {
        SqliteSource::new(&self.db_path).import_from(&SpreadsheetSource::new(dir))
    }

    pub fn datasets(&self) -> Result<Vec<DatasetMeta>> {
        SqliteSource::new(&self.db_path).datasets()
    }
}
