pub mod metrics;
pub mod product_mix;
pub mod rebalancer;
pub mod seed;
pub mod session;

pub use crate::domain::model::{
    Cagr, Deviation, EditedFields, Kpis, ProductMixEntry, RevenueField, RevenueRow, RowEdit,
    RowPercentages, SubTypeRevenue,
};
pub use crate::domain::ports::{ForecastStore, WarningSink};
pub use crate::utils::error::Result;
