use crate::domain::model::{Deviation, ProductMixEntry, RevenueRow};
use crate::utils::error::Result;

/// Persistence of the two forecast tables.
///
/// `Ok(None)` from a load means the table has never been saved; the session
/// then falls back to the built-in seed data.
pub trait ForecastStore {
    fn load_main(&self) -> Result<Option<Vec<RevenueRow>>>;
    fn load_product_mix(&self) -> Result<Option<Vec<ProductMixEntry>>>;
    fn save_main(&self, rows: &[RevenueRow]) -> Result<()>;
    fn save_product_mix(&self, entries: &[ProductMixEntry]) -> Result<()>;
}

/// Receives advisory warnings such as product-mix deviations.
pub trait WarningSink {
    fn warn(&mut self, deviation: &Deviation);
}
