use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Tolerance for the two revenue sum invariants.
pub const SUM_EPSILON: f64 = 1e-6;

/// Allowed distance between a year's product-mix sum and 100%.
pub const MIX_TOLERANCE: f64 = 0.1;

/// One forecast year of revenue, in M USD.
///
/// A balanced row satisfies `crm + new_products == total` and
/// `mnc + domestic == total` within [`SUM_EPSILON`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RevenueRow {
    year: i32,
    pub total: f64,
    pub crm: f64,
    pub new_products: f64,
    pub mnc: f64,
    pub domestic: f64,
}

impl RevenueRow {
    pub fn new(year: i32, total: f64, crm: f64, new_products: f64, mnc: f64, domestic: f64) -> Self {
        Self {
            year,
            total,
            crm,
            new_products,
            mnc,
            domestic,
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn get(&self, field: RevenueField) -> f64 {
        match field {
            RevenueField::Total => self.total,
            RevenueField::Crm => self.crm,
            RevenueField::NewProducts => self.new_products,
            RevenueField::Mnc => self.mnc,
            RevenueField::Domestic => self.domestic,
        }
    }

    pub fn set(&mut self, field: RevenueField, value: f64) {
        match field {
            RevenueField::Total => self.total = value,
            RevenueField::Crm => self.crm = value,
            RevenueField::NewProducts => self.new_products = value,
            RevenueField::Mnc => self.mnc = value,
            RevenueField::Domestic => self.domestic = value,
        }
    }

    pub fn is_balanced(&self) -> bool {
        (self.crm + self.new_products - self.total).abs() <= SUM_EPSILON
            && (self.mnc + self.domestic - self.total).abs() <= SUM_EPSILON
    }
}

/// The five editable columns of the main revenue table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevenueField {
    Total,
    Crm,
    NewProducts,
    Mnc,
    Domestic,
}

impl RevenueField {
    pub const ALL: [RevenueField; 5] = [
        RevenueField::Total,
        RevenueField::Crm,
        RevenueField::NewProducts,
        RevenueField::Mnc,
        RevenueField::Domestic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RevenueField::Total => "total",
            RevenueField::Crm => "crm",
            RevenueField::NewProducts => "new_products",
            RevenueField::Mnc => "mnc",
            RevenueField::Domestic => "domestic",
        }
    }

    /// Column header used in the persisted main table.
    pub fn column_name(&self) -> &'static str {
        match self {
            RevenueField::Total => "Total Impl. Team Service Revenue (M USD)",
            RevenueField::Crm => "CRM Project Revenue (M USD)",
            RevenueField::NewProducts => "New Products Project Revenue (M USD)",
            RevenueField::Mnc => "MNC Project Revenue (M USD)",
            RevenueField::Domestic => "Domestic Project Revenue (M USD)",
        }
    }
}

impl fmt::Display for RevenueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RevenueField {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "total" => Ok(RevenueField::Total),
            "crm" => Ok(RevenueField::Crm),
            "new_products" | "newproducts" => Ok(RevenueField::NewProducts),
            "mnc" => Ok(RevenueField::Mnc),
            "domestic" => Ok(RevenueField::Domestic),
            other => Err(format!(
                "unknown field '{}', expected one of: total, crm, new_products, mnc, domestic",
                other
            )),
        }
    }
}

pub type EditedFields = BTreeSet<RevenueField>;

/// One user edit of a single row: the snapshot before the edit, the raw
/// post-edit values and the fields the user touched directly.
#[derive(Debug, Clone, PartialEq)]
pub struct RowEdit {
    pub previous: RevenueRow,
    pub proposed: RevenueRow,
    pub edited: EditedFields,
}

impl RowEdit {
    /// Builds an edit by writing `changes` over a copy of `previous`.
    pub fn from_changes<I>(previous: RevenueRow, changes: I) -> Self
    where
        I: IntoIterator<Item = (RevenueField, f64)>,
    {
        let mut proposed = previous;
        let mut edited = EditedFields::new();
        for (field, value) in changes {
            proposed.set(field, value);
            edited.insert(field);
        }
        Self {
            previous,
            proposed,
            edited,
        }
    }

    pub fn year(&self) -> i32 {
        self.previous.year()
    }
}

/// One product sub-type of new-product revenue with its share per year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductMixEntry {
    pub product_type: String,
    pub percent_by_year: BTreeMap<i32, f64>,
}

impl ProductMixEntry {
    pub fn new(product_type: impl Into<String>) -> Self {
        Self {
            product_type: product_type.into(),
            percent_by_year: BTreeMap::new(),
        }
    }

    pub fn with_percent(mut self, year: i32, percent: f64) -> Self {
        self.percent_by_year.insert(year, percent);
        self
    }

    /// Share for `year`; a missing year counts as 0.
    pub fn percent(&self, year: i32) -> f64 {
        self.percent_by_year.get(&year).copied().unwrap_or(0.0)
    }
}

/// A year whose product-mix percentages do not add up to 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Deviation {
    pub year: i32,
    pub observed_sum: f64,
}

impl fmt::Display for Deviation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "product mix for {} sums to {:.1}%, not 100%",
            self.year, self.observed_sum
        )
    }
}

/// Display shares of a row's total. All zero when the total is zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RowPercentages {
    pub year: i32,
    pub crm_pct: f64,
    pub new_products_pct: f64,
    pub mnc_pct: f64,
    pub domestic_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Cagr {
    pub start_year: i32,
    pub end_year: i32,
    pub start_revenue: f64,
    pub end_revenue: f64,
    pub percent: f64,
}

/// Headline figures: first and last year's total revenue and the growth
/// between them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Kpis {
    pub start_year: i32,
    pub start_revenue: f64,
    pub end_year: i32,
    pub end_revenue: f64,
    pub cagr: Option<Cagr>,
}

/// New-product revenue attributed to one product sub-type, by year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubTypeRevenue {
    pub product_type: String,
    pub revenue_by_year: BTreeMap<i32, f64>,
}
