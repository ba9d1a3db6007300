pub mod dashboard;
pub mod import_service;
pub mod pipeline;
pub mod report;
