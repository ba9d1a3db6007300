pub mod csv;
pub mod spreadsheet;
pub mod xlsx;
