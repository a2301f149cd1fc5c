pub mod config;
pub mod plan;
pub mod region_scan;
