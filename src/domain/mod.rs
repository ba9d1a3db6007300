pub mod costing;
pub mod dates;
pub mod economics;
pub mod entities;
