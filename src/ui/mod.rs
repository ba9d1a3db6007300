pub mod format;
pub mod state;
pub mod terminal;
