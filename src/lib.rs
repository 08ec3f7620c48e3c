pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::adapters::csv_store::CsvForecastStore;
pub use crate::config::{toml_config::TomlConfig, ForecastSettings};
pub use crate::core::metrics::{derive_cagr, derive_percentages, derive_sub_type_revenue};
pub use crate::core::product_mix::validate;
pub use crate::core::rebalancer::rebalance;
pub use crate::core::session::ForecastSession;
pub use crate::domain::model::{
    Cagr, Deviation, EditedFields, Kpis, ProductMixEntry, RevenueField, RevenueRow, RowEdit,
    RowPercentages, SubTypeRevenue,
};
pub use crate::domain::ports::{ForecastStore, WarningSink};
pub use crate::utils::error::{ForecastError, Result};
