pub mod datasets;
pub mod downloads;
pub mod service;
