use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::domain::entities::table::{locate_header_row, RawTable};
use crate::infra::import::csv::read_csv_grid;
use crate::infra::import::xlsx::{read_xlsx_grid, SheetSelector};
use crate::usecase::ports::source::{SalesSource, SourceError, TableKind};

const EXTENSIONS: [&str; 2] = ["xlsx", "csv"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilePattern {
    Contains(&'static str),
    StartsWith(&'static str),
    Exact(&'static str),
}

impl FilePattern {
    pub fn matches(self, file_name: &str) -> bool {
        let Some((stem, ext)) = file_name.rsplit_once('.') else {
            return false;
        };
        if !EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)) {
            return false;
        }
        match self {
            FilePattern::Contains(token) => stem.contains(token),
            FilePattern::StartsWith(prefix) => stem.starts_with(prefix),
            FilePattern::Exact(name) => stem == name,
        }
    }

    pub fn expected(self) -> String {
        match self {
            FilePattern::Contains(token) => format!("'*{token}*.xlsx'"),
            FilePattern::StartsWith(prefix) => format!("'{prefix}*.xlsx'"),
            FilePattern::Exact(name) => format!("'{name}.xlsx'"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderRow {
    Fixed(usize),
    /// First row (of the first few) containing this column name.
    Anchor(&'static str),
}

/// Where a table lives in an export folder and how to read it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetSpec {
    pub kind: TableKind,
    pub pattern: FilePattern,
    pub sheet: SheetSelector,
    pub header: HeaderRow,
}

pub fn sheet_spec(kind: TableKind) -> SheetSpec {
    match kind {
        TableKind::MarketplaceOrders => SheetSpec {
            kind,
            pattern: FilePattern::Contains("Vendas_BR_Mercado_Libre"),
            sheet: SheetSelector::Named("Vendas BR"),
            header: HeaderRow::Anchor("Data da venda"),
        },
        TableKind::ResellerOrders => SheetSpec {
            kind,
            pattern: FilePattern::StartsWith("Planilha-"),
            sheet: SheetSelector::First,
            header: HeaderRow::Fixed(0),
        },
        TableKind::CostReference => SheetSpec {
            kind,
            pattern: FilePattern::Exact("estoque_omie"),
            sheet: SheetSelector::First,
            header: HeaderRow::Fixed(0),
        },
        TableKind::Campaigns => SheetSpec {
            kind,
            pattern: FilePattern::StartsWith("Relatorio_campanhas_"),
            sheet: SheetSelector::Named("Relatório de campanha"),
            header: HeaderRow::Fixed(1),
        },
    }
}

/// Lexicographically greatest matching file name, so dated exports pick the newest.
pub fn find_latest(dir: &Path, pattern: FilePattern) -> Result<Option<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to list data dir: {}", dir.display()))?;

    let mut best: Option<(String, PathBuf)> = None;
    for entry in entries {
        let entry = entry.context("failed to read data dir entry")?;
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        // "~$" files are office lock files
        if name.starts_with("~$") || !pattern.matches(&name) || !entry.path().is_file() {
            continue;
        }
        if best.as_ref().map_or(true, |(current, _)| name > *current) {
            best = Some((name, entry.path()));
        }
    }
    Ok(best.map(|(_, path)| path))
}

pub fn read_table(path: &Path, spec: &SheetSpec) -> Result<RawTable> {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
    let grid = if is_csv {
        read_csv_grid(path)?
    } else {
        read_xlsx_grid(path, spec.sheet)?
    };

    let header_row = match spec.header {
        HeaderRow::Fixed(row) => row,
        HeaderRow::Anchor(anchor) => locate_header_row(&grid, anchor),
    };
    Ok(RawTable::from_grid(grid, header_row))
}

/// Spreadsheet exports dropped in one folder.
#[derive(Debug, Clone)]
pub struct SpreadsheetSource {
    pub dir: PathBuf,
}

impl SpreadsheetSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn locate(&self, kind: TableKind) -> Result<Option<PathBuf>> {
        find_latest(&self.dir, sheet_spec(kind).pattern)
    }

    fn load_optional(&self, kind: TableKind) -> Result<Option<RawTable>, SourceError> {
        let spec = sheet_spec(kind);
        let Some(path) = find_latest(&self.dir, spec.pattern)? else {
            return Ok(None);
        };
        info!(file = %path.display(), %kind, "reading spreadsheet");
        Ok(Some(read_table(&path, &spec)?))
    }

    fn load_required(&self, kind: TableKind) -> Result<RawTable, SourceError> {
        self.load_optional(kind)?
            .ok_or_else(|| SourceError::MissingFile {
                kind,
                expected: sheet_spec(kind).pattern.expected(),
            })
    }
}

impl SalesSource for SpreadsheetSource {
    fn describe(&self) -> String {
        format!("spreadsheets in {}", self.dir.display())
    }

    fn marketplace_orders(&self) -> Result<RawTable, SourceError> {
        self.load_required(TableKind::MarketplaceOrders)
    }

    fn reseller_orders(&self) -> Result<RawTable, SourceError> {
        self.load_required(TableKind::ResellerOrders)
    }

    fn cost_reference(&self) -> Result<Option<RawTable>, SourceError> {
        self.load_optional(TableKind::CostReference)
    }

    fn campaigns(&self) -> Result<Option<RawTable>, SourceError> {
        self.load_optional(TableKind::Campaigns)
    }
}
