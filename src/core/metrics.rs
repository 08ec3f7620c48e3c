//! Read-only display metrics derived from a balanced forecast.

use crate::core::rebalancer::round_to;
use crate::domain::model::{Cagr, ProductMixEntry, RevenueRow, RowPercentages, SubTypeRevenue};
use std::collections::BTreeMap;

fn share(part: f64, total: f64) -> f64 {
    if total != 0.0 {
        round_to(part / total * 100.0, 2)
    } else {
        0.0
    }
}

pub fn row_percentages(row: &RevenueRow) -> RowPercentages {
    RowPercentages {
        year: row.year(),
        crm_pct: share(row.crm, row.total),
        new_products_pct: share(row.new_products, row.total),
        mnc_pct: share(row.mnc, row.total),
        domestic_pct: share(row.domestic, row.total),
    }
}

pub fn derive_percentages(rows: &[RevenueRow]) -> Vec<RowPercentages> {
    rows.iter().map(row_percentages).collect()
}

/// Growth of `total` between the earliest and latest year.
///
/// `None` when there are no rows, a single year, or a zero starting revenue.
pub fn derive_cagr(rows: &[RevenueRow]) -> Option<Cagr> {
    let start = rows.iter().min_by_key(|row| row.year())?;
    let end = rows.iter().max_by_key(|row| row.year())?;
    let num_years = end.year() - start.year();

    if start.total == 0.0 || num_years <= 0 {
        return None;
    }

    let percent = ((end.total / start.total).powf(1.0 / num_years as f64) - 1.0) * 100.0;
    // a negative end over a positive start has no real root
    if !percent.is_finite() {
        return None;
    }

    Some(Cagr {
        start_year: start.year(),
        end_year: end.year(),
        start_revenue: start.total,
        end_revenue: end.total,
        percent,
    })
}

/// Splits each year's new-product revenue across the mix entries, keeping
/// the entry order as the stacking order.
pub fn derive_sub_type_revenue(entries: &[ProductMixEntry], rows: &[RevenueRow]) -> Vec<SubTypeRevenue> {
    entries
        .iter()
        .map(|entry| SubTypeRevenue {
            product_type: entry.product_type.clone(),
            revenue_by_year: rows
                .iter()
                .map(|row| (row.year(), entry.percent(row.year()) / 100.0 * row.new_products))
                .collect::<BTreeMap<_, _>>(),
        })
        .collect()
}
