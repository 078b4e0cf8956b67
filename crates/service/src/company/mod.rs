pub mod query;
pub mod report;
pub mod service;
