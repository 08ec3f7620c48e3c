use crate::core::metrics::{derive_cagr, derive_percentages, derive_sub_type_revenue};
use crate::core::product_mix::{mix_years, out_of_range, validate};
use crate::core::rebalancer;
use crate::core::seed;
use crate::domain::model::{
    Deviation, Kpis, ProductMixEntry, RevenueField, RevenueRow, RowEdit, RowPercentages, SubTypeRevenue,
};
use crate::domain::ports::{ForecastStore, WarningSink};
use crate::utils::error::{ForecastError, Result};
use std::collections::HashSet;

/// Where a table came from when the session was opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableSource {
    Stored,
    Seed,
}

/// The two forecast tables of one editing session.
///
/// Rows are kept ordered by year and their count never changes after
/// construction. Product-mix entries may be added and removed freely but
/// their names stay unique.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSession {
    rows: Vec<RevenueRow>,
    product_mix: Vec<ProductMixEntry>,
}

impl ForecastSession {
    pub fn new(mut rows: Vec<RevenueRow>, product_mix: Vec<ProductMixEntry>) -> Result<Self> {
        rows.sort_by_key(|row| row.year());
        if let Some(pair) = rows.windows(2).find(|pair| pair[0].year() == pair[1].year()) {
            return Err(ForecastError::InvalidTableError {
                file: "main table".to_string(),
                message: format!("year {} appears more than once", pair[0].year()),
            });
        }

        let mut seen = HashSet::new();
        for entry in &product_mix {
            if !seen.insert(entry.product_type.as_str()) {
                return Err(ForecastError::DuplicateProductTypeError {
                    product_type: entry.product_type.clone(),
                });
            }
        }

        Ok(Self { rows, product_mix })
    }

    pub fn seeded() -> Self {
        Self {
            rows: seed::default_rows(),
            product_mix: seed::default_product_mix(),
        }
    }

    /// Opens both tables from `store`, using the seed for any table that has
    /// not been saved yet.
    pub fn load<S: ForecastStore>(store: &S) -> Result<(Self, TableSource, TableSource)> {
        let (rows, main_source) = match store.load_main()? {
            Some(rows) => {
                tracing::info!("📂 Loaded {} forecast rows from storage", rows.len());
                (rows, TableSource::Stored)
            }
            None => {
                tracing::info!("Main table not saved yet, using built-in seed data");
                (seed::default_rows(), TableSource::Seed)
            }
        };

        let (product_mix, mix_source) = match store.load_product_mix()? {
            Some(entries) => {
                tracing::info!("📂 Loaded {} product mix entries from storage", entries.len());
                (entries, TableSource::Stored)
            }
            None => {
                tracing::info!("Product mix not saved yet, using built-in seed data");
                (seed::default_product_mix(), TableSource::Seed)
            }
        };

        let unbalanced: Vec<i32> = rows
            .iter()
            .filter(|row| !row.is_balanced())
            .map(RevenueRow::year)
            .collect();
        if !unbalanced.is_empty() {
            tracing::warn!("Stored rows are not balanced for years {:?}", unbalanced);
        }
        for (product_type, year, percent) in out_of_range(&product_mix) {
            tracing::warn!(
                "Stored share for '{}' in {} is {}%, outside 0-100",
                product_type,
                year,
                percent
            );
        }

        Ok((Self::new(rows, product_mix)?, main_source, mix_source))
    }

    pub fn save<S: ForecastStore>(&self, store: &S) -> Result<()> {
        store.save_main(&self.rows)?;
        store.save_product_mix(&self.product_mix)?;
        tracing::info!("✅ Forecast saved");
        Ok(())
    }

    pub fn rows(&self) -> &[RevenueRow] {
        &self.rows
    }

    pub fn product_mix(&self) -> &[ProductMixEntry] {
        &self.product_mix
    }

    pub fn years(&self) -> Vec<i32> {
        self.rows.iter().map(RevenueRow::year).collect()
    }

    pub fn row(&self, year: i32) -> Option<&RevenueRow> {
        self.rows.iter().find(|row| row.year() == year)
    }

    /// Builds the edit of the row for `year` without applying it.
    pub fn edit_for<I>(&self, year: i32, changes: I) -> Result<RowEdit>
    where
        I: IntoIterator<Item = (RevenueField, f64)>,
    {
        let previous = *self.row(year).ok_or(ForecastError::UnknownYearError { year })?;
        Ok(RowEdit::from_changes(previous, changes))
    }

    /// Applies the user's `changes` to the row for `year`, rebalances it and
    /// stores the corrected row.
    pub fn apply_edit<I>(&mut self, year: i32, changes: I) -> Result<RevenueRow>
    where
        I: IntoIterator<Item = (RevenueField, f64)>,
    {
        let edit = self.edit_for(year, changes)?;
        self.apply_row_edit(&edit)
    }

    pub fn apply_row_edit(&mut self, edit: &RowEdit) -> Result<RevenueRow> {
        let year = edit.year();
        if let Some(&field) = edit
            .edited
            .iter()
            .find(|&&field| !edit.proposed.get(field).is_finite())
        {
            return Err(ForecastError::NonFiniteValueError {
                field: field.to_string(),
                value: edit.proposed.get(field),
            });
        }
        let slot = self
            .rows
            .iter_mut()
            .find(|row| row.year() == year)
            .ok_or(ForecastError::UnknownYearError { year })?;

        let corrected = rebalancer::apply(edit);
        tracing::debug!(
            "Rebalanced {} after editing {:?}: {:?} -> {:?}",
            year,
            edit.edited,
            edit.previous,
            corrected
        );
        *slot = corrected;
        Ok(corrected)
    }

    /// Years the product mix is checked for: every forecast year plus any
    /// extra year column present in the mix.
    pub fn mix_check_years(&self) -> Vec<i32> {
        let mut years = self.years();
        years.extend(mix_years(&self.product_mix));
        years.sort_unstable();
        years.dedup();
        years
    }

    pub fn mix_deviations(&self) -> Vec<Deviation> {
        let years = self.mix_check_years();
        validate(&self.product_mix, &years).collect()
    }

    /// Sends every product-mix deviation to `sink` and returns how many there were.
    pub fn validate_mix<W: WarningSink + ?Sized>(&self, sink: &mut W) -> usize {
        let years = self.mix_check_years();
        let mut count = 0;
        for deviation in validate(&self.product_mix, &years) {
            sink.warn(&deviation);
            count += 1;
        }
        count
    }

    pub fn add_mix_entry(&mut self, product_type: &str) -> Result<&ProductMixEntry> {
        let product_type = product_type.trim();
        if self.mix_index(product_type).is_some() {
            return Err(ForecastError::DuplicateProductTypeError {
                product_type: product_type.to_string(),
            });
        }

        let entry = self
            .mix_check_years()
            .into_iter()
            .fold(ProductMixEntry::new(product_type), |entry, year| entry.with_percent(year, 0.0));
        self.product_mix.push(entry);
        tracing::debug!("Added product type '{}'", product_type);
        Ok(&self.product_mix[self.product_mix.len() - 1])
    }

    pub fn remove_mix_entry(&mut self, product_type: &str) -> Result<ProductMixEntry> {
        let index = self
            .mix_index(product_type)
            .ok_or_else(|| ForecastError::UnknownProductTypeError {
                product_type: product_type.to_string(),
            })?;
        tracing::debug!("Removed product type '{}'", product_type);
        Ok(self.product_mix.remove(index))
    }

    pub fn set_mix_percent(&mut self, product_type: &str, year: i32, percent: f64) -> Result<()> {
        if !(0.0..=100.0).contains(&percent) {
            return Err(ForecastError::PercentOutOfRangeError { percent });
        }
        if self.row(year).is_none() {
            return Err(ForecastError::UnknownYearError { year });
        }
        let index = self
            .mix_index(product_type)
            .ok_or_else(|| ForecastError::UnknownProductTypeError {
                product_type: product_type.to_string(),
            })?;

        self.product_mix[index].percent_by_year.insert(year, percent);
        Ok(())
    }

    pub fn percentages(&self) -> Vec<RowPercentages> {
        derive_percentages(&self.rows)
    }

    pub fn sub_type_revenue(&self) -> Vec<SubTypeRevenue> {
        derive_sub_type_revenue(&self.product_mix, &self.rows)
    }

    /// `None` only when the session has no rows at all.
    pub fn kpis(&self) -> Option<Kpis> {
        let start = self.rows.first()?;
        let end = self.rows.last()?;
        Some(Kpis {
            start_year: start.year(),
            start_revenue: start.total,
            end_year: end.year(),
            end_revenue: end.total,
            cagr: derive_cagr(&self.rows),
        })
    }

    fn mix_index(&self, product_type: &str) -> Option<usize> {
        self.product_mix
            .iter()
            .position(|entry| entry.product_type == product_type)
    }
}
