pub mod ads;
pub mod dataset;
pub mod filter;
pub mod order;
pub mod table;
