// Adapters layer: concrete implementations for the outside world (files, terminal, charts).

#[cfg(feature = "charts")]
pub mod chart;
pub mod csv_store;
pub mod report;
