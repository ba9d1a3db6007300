use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Transaction};

use crate::domain::entities::dataset::{DatasetId, DatasetMeta, ImportResult};
use crate::domain::entities::table::{Cell, RawTable};
use crate::infra::sqlite::schema::{init_db, open_connection};

pub fn insert_header_names(
    tx: &Transaction<'_>,
    dataset_id: i64,
    headers: &[String],
) -> Result<()> {
    let mut insert_header = tx
        .prepare("INSERT INTO column_name(dataset_id, col_idx, name) VALUES (?1, ?2, ?3)")
        .context("failed to prepare header insert")?;

    for (col_idx, name) in headers.iter().enumerate() {
        insert_header
            .execute(params![dataset_id, col_idx as i64, name])
            .context("failed to insert header")?;
    }

    Ok(())
}

fn purge_dataset_tx(tx: &Transaction<'_>, dataset_id: i64) -> Result<()> {
    tx.execute(
        "DELETE FROM cell WHERE dataset_id = ?1",
        params![dataset_id],
    )
    .with_context(|| format!("failed to delete cells for dataset #{dataset_id}"))?;
    tx.execute(
        "DELETE FROM column_name WHERE dataset_id = ?1",
        params![dataset_id],
    )
    .with_context(|| format!("failed to delete columns for dataset #{dataset_id}"))?;
    tx.execute("DELETE FROM dataset WHERE id = ?1", params![dataset_id])
        .with_context(|| format!("failed to delete dataset #{dataset_id}"))?;
    Ok(())
}

const KIND_TEXT: &str = "text";
const KIND_NUMBER: &str = "number";
const KIND_DATETIME: &str = "datetime";
const DATETIME_STORE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Missing cells are not stored; they read back as `Cell::Empty`.
/// Numbers keep their full precision and datetimes their fractional seconds.
fn encode_cell(cell: &Cell) -> Option<(&'static str, String)> {
    if cell.is_missing() {
        return None;
    }
    match cell {
        Cell::Empty => None,
        Cell::Text(text) => Some((KIND_TEXT, text.clone())),
        Cell::Number(value) => Some((KIND_NUMBER, format!("{value}"))),
        Cell::DateTime(value) => Some((
            KIND_DATETIME,
            value.format(DATETIME_STORE_FORMAT).to_string(),
        )),
    }
}

fn decode_cell(kind: &str, value: String) -> Cell {
    match kind {
        KIND_NUMBER => match value.parse::<f64>() {
            Ok(number) => Cell::Number(number),
            Err(_) => Cell::Text(value),
        },
        KIND_DATETIME => match NaiveDateTime::parse_from_str(&value, DATETIME_STORE_FORMAT) {
            Ok(datetime) => Cell::DateTime(datetime),
            Err(_) => Cell::Text(value),
        },
        _ => Cell::Text(value),
    }
}

/// Stores `table` under `name`, replacing any earlier dataset of that name.
pub fn replace_dataset(
    db_path: &Path,
    name: &str,
    source_path: &str,
    table: &RawTable,
) -> Result<ImportResult> {
    init_db(db_path)?;
    let mut conn = open_connection(db_path)?;
    let tx = conn
        .transaction()
        .context("failed to start dataset import transaction")?;

    let previous: Vec<i64> = {
        let mut stmt = tx
            .prepare("SELECT id FROM dataset WHERE name = ?1")
            .context("failed to prepare previous dataset query")?;
        let ids = stmt
            .query_map([name], |row| row.get::<_, i64>(0))
            .context("failed to query previous datasets")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("failed to collect previous datasets")?;
        ids
    };
    for dataset_id in previous {
        purge_dataset_tx(&tx, dataset_id)?;
    }

    tx.execute(
        "INSERT INTO dataset(name, source_path, row_count) VALUES (?1, ?2, ?3)",
        params![name, source_path, table.len() as i64],
    )
    .with_context(|| format!("failed to insert dataset: {name}"))?;
    let dataset_id = tx.last_insert_rowid();

    insert_header_names(&tx, dataset_id, table.headers())?;

    let mut insert_cell = tx
        .prepare(
            "INSERT INTO cell(dataset_id, row_idx, col_idx, kind, value) VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .context("failed to prepare cell insert")?;
    for (row_idx, row) in table.rows().iter().enumerate() {
        for (col_idx, cell) in row.iter().enumerate() {
            let Some((kind, value)) = encode_cell(cell) else {
                continue;
            };
            insert_cell
                .execute(params![dataset_id, row_idx as i64, col_idx as i64, kind, value])
                .context("failed to insert dataset cell")?;
        }
    }
    drop(insert_cell);

    tx.commit().context("failed to commit dataset import")?;
    Ok(ImportResult {
        dataset_id: DatasetId(dataset_id),
        name: name.to_string(),
        row_count: table.len() as i64,
    })
}

pub fn latest_dataset_id(conn: &Connection, name: &str) -> Result<Option<i64>> {
    conn.query_row(
        "SELECT id FROM dataset WHERE name = ?1 ORDER BY id DESC LIMIT 1",
        [name],
        |row| row.get(0),
    )
    .optional()
    .with_context(|| format!("failed to look up dataset: {name}"))
}

pub fn load_table(conn: &Connection, dataset_id: i64) -> Result<RawTable> {
    let mut header_stmt = conn
        .prepare("SELECT name FROM column_name WHERE dataset_id = ?1 ORDER BY col_idx ASC")
        .context("failed to prepare columns query")?;
    let headers = header_stmt
        .query_map([dataset_id], |row| row.get::<_, String>(0))
        .context("failed to query columns")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to collect columns")?;

    let row_count: i64 = conn
        .query_row(
            "SELECT row_count FROM dataset WHERE id = ?1",
            [dataset_id],
            |row| row.get(0),
        )
        .with_context(|| format!("failed to read row count for dataset #{dataset_id}"))?;

    let width = headers.len();
    let mut rows = vec![vec![Cell::Empty; width]; row_count.max(0) as usize];

    let mut cell_stmt = conn
        .prepare("SELECT row_idx, col_idx, kind, value FROM cell WHERE dataset_id = ?1")
        .context("failed to prepare cells query")?;
    let cells = cell_stmt
        .query_map([dataset_id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })
        .context("failed to query cells")?;
    for item in cells {
        let (row_idx, col_idx, kind, value) = item.context("failed to read cell row")?;
        if let Some(slot) = rows
            .get_mut(row_idx as usize)
            .and_then(|row| row.get_mut(col_idx as usize))
        {
            *slot = decode_cell(&kind, value);
        }
    }

    Ok(RawTable::from_parts(headers, rows))
}

pub fn list_datasets(db_path: &Path) -> Result<Vec<DatasetMeta>> {
    init_db(db_path)?;
    let conn = open_connection(db_path)?;
    let mut stmt = conn
        .prepare(
            "SELECT id, name, row_count, source_path, imported_at
             FROM dataset
             ORDER BY id DESC",
        )
        .context("failed to prepare datasets query")?;

    let datasets = stmt
        .query_map([], |row| {
            Ok(DatasetMeta {
                id: DatasetId(row.get(0)?),
                name: row.get(1)?,
                row_count: row.get(2)?,
                source_path: row.get(3)?,
                imported_at: row.get(4)?,
            })
        })
        .context("failed to query datasets")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to collect datasets")?;

    Ok(datasets)
}
