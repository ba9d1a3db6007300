use std::collections::HashMap;

use chrono::NaiveDateTime;

const HEADER_SCAN_ROWS: usize = 10;
// integers up to here round-trip through i64 without saturating
const EXACT_INTEGER_LIMIT: f64 = 9.0e15;

static EMPTY_CELL: Cell = Cell::Empty;

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    DateTime(NaiveDateTime),
}

impl Cell {
    pub fn is_missing(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(text) => text.trim().is_empty(),
            Cell::Number(value) => value.is_nan(),
            Cell::DateTime(_) => false,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(value) if value.is_finite() => Some(*value),
            Cell::Text(text) => parse_number(text),
            _ => None,
        }
    }

    /// Text form of the cell; `None` when missing.
    pub fn as_text(&self) -> Option<String> {
        if self.is_missing() {
            return None;
        }
        Some(match self {
            Cell::Text(text) => text.trim().to_string(),
            Cell::Number(value) => format_number(*value),
            Cell::DateTime(value) => value.format("%Y-%m-%d %H:%M:%S").to_string(),
            Cell::Empty => String::new(),
        })
    }

    pub fn text_or(&self, fallback: &str) -> String {
        self.as_text().unwrap_or_else(|| fallback.to_string())
    }

    pub fn f64_or(&self, fallback: f64) -> f64 {
        self.as_f64().unwrap_or(fallback)
    }
}

pub fn parse_number(text: &str) -> Option<f64> {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|value| value.is_finite())
}

pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return String::new();
    }
    if value.fract().abs() < f64::EPSILON {
        if value.abs() < EXACT_INTEGER_LIMIT {
            format!("{}", value as i64)
        } else {
            format!("{value}")
        }
    } else {
        let mut text = format!("{value:.6}");
        while text.ends_with('0') {
            text.pop();
        }
        if text.ends_with('.') {
            text.pop();
        }
        text
    }
}

pub fn clean_header(name: &str) -> String {
    name.replace(['\r', '\n'], " ").trim().to_string()
}

/// Repeated names get `.1`, `.2`, ... in order of appearance.
pub fn dedupe_headers(names: &[String]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut out = Vec::with_capacity(names.len());
    for name in names {
        let count = seen.entry(name.clone()).or_insert(0);
        if *count == 0 {
            out.push(name.clone());
        } else {
            out.push(format!("{name}.{count}"));
        }
        *count += 1;
    }
    out
}

pub fn locate_header_row(rows: &[Vec<Cell>], anchor: &str) -> usize {
    rows.iter()
        .take(HEADER_SCAN_ROWS)
        .position(|row| {
            row.iter()
                .any(|cell| matches!(cell, Cell::Text(text) if clean_header(text) == anchor))
        })
        .unwrap_or(0)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    headers: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<Cell>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        // suffixes follow the raw names, cleanup comes after
        let headers: Vec<String> = dedupe_headers(&headers)
            .iter()
            .map(|h| clean_header(h))
            .collect();
        Self::from_parts(headers, rows)
    }

    /// Headers that already went through `new`, taken as they are.
    pub fn from_parts(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let index = headers
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.clone(), idx))
            .collect();
        Self {
            headers,
            index,
            rows,
        }
    }

    /// Takes the header from `header_row` and everything below it as data.
    pub fn from_grid(mut grid: Vec<Vec<Cell>>, header_row: usize) -> Self {
        if header_row >= grid.len() {
            return Self::default();
        }
        let rows = grid.split_off(header_row + 1);
        let header_cells = grid.pop().unwrap_or_default();
        let headers = header_cells
            .iter()
            .map(|cell| cell.as_text().unwrap_or_default())
            .collect();
        let rows = rows
            .into_iter()
            .filter(|row| !row.iter().all(Cell::is_missing))
            .collect();
        Self::new(headers, rows)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn records(&self) -> impl Iterator<Item = Record<'_>> {
        self.rows.iter().map(move |cells| Record { table: self, cells })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    table: &'a RawTable,
    cells: &'a [Cell],
}

impl<'a> Record<'a> {
    pub fn get(&self, column: &str) -> &'a Cell {
        self.table
            .column(column)
            .and_then(|idx| self.cells.get(idx))
            .unwrap_or(&EMPTY_CELL)
    }
}
