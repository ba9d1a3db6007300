use std::path::PathBuf;

use anyhow::Result;
use tracing::{info, warn};

use crate::domain::entities::dataset::{DatasetMeta, ImportResult};
use crate::domain::entities::table::RawTable;
use crate::infra::import::spreadsheet::{read_table, sheet_spec, SpreadsheetSource};
use crate::infra::sqlite::queries::{latest_dataset_id, list_datasets, load_table, replace_dataset};
use crate::infra::sqlite::schema::{init_db, open_connection};
use crate::usecase::ports::source::{SalesSource, SourceError, TableKind};

/// Relational variant: each table kind is the newest dataset stored under its name.
#[derive(Debug, Clone)]
pub struct SqliteSource {
    pub db_path: PathBuf,
}

impl SqliteSource {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    fn load(&self, kind: TableKind) -> Result<Option<RawTable>> {
        init_db(&self.db_path)?;
        let conn = open_connection(&self.db_path)?;
        match latest_dataset_id(&conn, kind.dataset_name())? {
            Some(dataset_id) => Ok(Some(load_table(&conn, dataset_id)?)),
            None => Ok(None),
        }
    }

    fn load_required(&self, kind: TableKind) -> Result<RawTable, SourceError> {
        self.load(kind)?
            .ok_or(SourceError::MissingDataset { kind })
    }

    pub fn datasets(&self) -> Result<Vec<DatasetMeta>> {
        list_datasets(&self.db_path)
    }

    /// Mirrors every export found in `spreadsheets` into the database.
    /// Kinds without a file are left untouched.
    pub fn import_from(&self, spreadsheets: &SpreadsheetSource) -> Result<Vec<ImportResult>> {
        let mut imported = Vec::new();
        for kind in TableKind::ALL {
            let Some(path) = spreadsheets.locate(kind)? else {
                if kind.is_required() {
                    warn!(%kind, dir = %spreadsheets.dir.display(), "no file to import");
                }
                continue;
            };
            let table = read_table(&path, &sheet_spec(kind))?;
            let result = replace_dataset(
                &self.db_path,
                kind.dataset_name(),
                &path.to_string_lossy(),
                &table,
            )?;
            info!(
                dataset = %result.name,
                rows = result.row_count,
                file = %path.display(),
                "imported spreadsheet"
            );
            imported.push(result);
        }
        Ok(imported)
    }
}

impl SalesSource for SqliteSource {
    fn describe(&self) -> String {
        format!("sqlite database {}", self.db_path.display())
    }

    fn marketplace_orders(&self) -> Result<RawTable, SourceError> {
        self.load_required(TableKind::MarketplaceOrders)
    }

    fn reseller_orders(&self) -> Result<RawTable, SourceError> {
        self.load_required(TableKind::ResellerOrders)
    }

    fn cost_reference(&self) -> Result<Option<RawTable>, SourceError> {
        Ok(self.load(TableKind::CostReference)?)
    }

    fn campaigns(&self) -> Result<Option<RawTable>, SourceError> {
        Ok(self.load(TableKind::Campaigns)?)
    }
}
