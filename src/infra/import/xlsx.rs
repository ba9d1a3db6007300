use std::path::Path;

use anyhow::{anyhow, Context, Result};
use calamine::{open_workbook_auto, Data, Reader};

use crate::domain::dates::{from_excel_serial, parse_datetime_text};
use crate::domain::entities::table::Cell;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetSelector {
    Named(&'static str),
    First,
}

pub fn data_to_cell(data: &Data) -> Cell {
    match data {
        Data::String(v) => Cell::Text(v.to_string()),
        Data::Float(v) => Cell::Number(*v),
        Data::Int(v) => Cell::Number(*v as f64),
        Data::Bool(v) => Cell::Text(v.to_string()),
        Data::DateTime(v) => from_excel_serial(v.as_f64())
            .map(Cell::DateTime)
            .unwrap_or(Cell::Empty),
        Data::DateTimeIso(v) => parse_datetime_text(v)
            .map(Cell::DateTime)
            .unwrap_or_else(|| Cell::Text(v.to_string())),
        Data::DurationIso(v) => Cell::Text(v.to_string()),
        Data::Error(_) => Cell::Empty,
        Data::Empty => Cell::Empty,
    }
}

/// Every row of the selected sheet, header rows included.
pub fn read_xlsx_grid(xlsx_path: &Path, sheet: SheetSelector) -> Result<Vec<Vec<Cell>>> {
    let mut workbook = open_workbook_auto(xlsx_path)
        .with_context(|| format!("failed to open xlsx: {}", xlsx_path.display()))?;

    let sheet_name = match sheet {
        SheetSelector::Named(name) => name.to_string(),
        SheetSelector::First => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| anyhow!("workbook has no sheets: {}", xlsx_path.display()))?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("failed to read sheet: {sheet_name}"))?;

    Ok(range
        .rows()
        .map(|row| row.iter().map(data_to_cell).collect())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_cells_map_to_typed_cells() {
        assert_eq!(data_to_cell(&Data::Int(3)), Cell::Number(3.0));
        assert_eq!(
            data_to_cell(&Data::String("Braavo".to_string())),
            Cell::Text("Braavo".to_string())
        );
        assert_eq!(data_to_cell(&Data::Empty), Cell::Empty);
        assert!(matches!(
            data_to_cell(&Data::DateTimeIso("2024-01-15T10:30:00".to_string())),
            Cell::DateTime(_)
        ));
    }
}
