//! Restores the two revenue sums of a row after a user edit.
//!
//! The edited side of the table is taken as given and the other side is
//! scaled from its pre-edit values by `new_total / previous_total`, so the
//! relative split of the untouched pair survives the edit.

use crate::domain::model::{EditedFields, RevenueField, RevenueRow, RowEdit, SUM_EPSILON};

/// Which invariant drives a correction. Priority follows declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceCase {
    /// Total changed: every component scales with it.
    Total,
    /// CRM or new products changed: total follows them, MNC/domestic scale.
    CrmSplit,
    /// MNC or domestic changed: total follows them, CRM/new products scale.
    CustomerSplit,
}

impl BalanceCase {
    pub fn select(edited: &EditedFields) -> Option<Self> {
        if edited.contains(&RevenueField::Total) {
            Some(BalanceCase::Total)
        } else if edited.contains(&RevenueField::Crm) || edited.contains(&RevenueField::NewProducts) {
            Some(BalanceCase::CrmSplit)
        } else if edited.contains(&RevenueField::Mnc) || edited.contains(&RevenueField::Domestic) {
            Some(BalanceCase::CustomerSplit)
        } else {
            None
        }
    }
}

/// Returns `proposed` corrected so that both sums hold again.
///
/// `previous` must be the balanced row before this edit and `edited` the
/// fields the user changed directly. With an empty `edited` set the proposed
/// values are returned untouched. The result keeps `previous.year()` and is
/// rounded to cents.
pub fn rebalance(previous: &RevenueRow, edited: &EditedFields, proposed: &RevenueRow) -> RevenueRow {
    let year = previous.year();

    let Some(case) = BalanceCase::select(edited) else {
        return RevenueRow::new(
            year,
            proposed.total,
            proposed.crm,
            proposed.new_products,
            proposed.mnc,
            proposed.domestic,
        );
    };

    let mut row = match case {
        BalanceCase::Total => {
            let factor = scale_factor(proposed.total, previous.total);
            RevenueRow::new(
                year,
                proposed.total,
                previous.crm * factor,
                previous.new_products * factor,
                previous.mnc * factor,
                previous.domestic * factor,
            )
        }
        BalanceCase::CrmSplit => {
            let total = proposed.crm + proposed.new_products;
            let factor = scale_factor(total, previous.total);
            RevenueRow::new(
                year,
                total,
                proposed.crm,
                proposed.new_products,
                previous.mnc * factor,
                previous.domestic * factor,
            )
        }
        BalanceCase::CustomerSplit => {
            let total = proposed.mnc + proposed.domestic;
            let factor = scale_factor(total, previous.total);
            RevenueRow::new(
                year,
                total,
                previous.crm * factor,
                previous.new_products * factor,
                proposed.mnc,
                proposed.domestic,
            )
        }
    };

    repair(&mut row);
    round_row(&row)
}

/// Rebalances the row described by `edit`.
pub fn apply(edit: &RowEdit) -> RevenueRow {
    rebalance(&edit.previous, &edit.edited, &edit.proposed)
}

/// Forces both sums, treating total, crm and mnc as ground truth.
pub fn repair(row: &mut RevenueRow) {
    if (row.crm + row.new_products - row.total).abs() > SUM_EPSILON {
        row.new_products = row.total - row.crm;
    }
    if (row.mnc + row.domestic - row.total).abs() > SUM_EPSILON {
        row.domestic = row.total - row.mnc;
    }
}

pub fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10_f64.powi(digits);
    (value * factor).round() / factor
}

fn scale_factor(new_total: f64, previous_total: f64) -> f64 {
    if previous_total != 0.0 {
        new_total / previous_total
    } else {
        1.0
    }
}

// new_products and domestic are re-derived after rounding so the cent
// rounding of three independent values cannot break a sum.
fn round_row(row: &RevenueRow) -> RevenueRow {
    let total = round_to(row.total, 2);
    let crm = round_to(row.crm, 2);
    let mnc = round_to(row.mnc, 2);
    RevenueRow::new(
        row.year(),
        total,
        crm,
        round_to(total - crm, 2),
        mnc,
        round_to(total - mnc, 2),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(list: &[RevenueField]) -> EditedFields {
        list.iter().copied().collect()
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    fn base() -> RevenueRow {
        RevenueRow::new(2025, 10.0, 6.0, 4.0, 7.0, 3.0)
    }

    #[test]
    fn test_total_edit_scales_every_component() {
        let previous = base();
        let mut proposed = previous;
        proposed.total = 20.0;

        let row = rebalance(&previous, &fields(&[RevenueField::Total]), &proposed);

        assert_close(row.total, 20.0);
        assert_close(row.crm, 12.0);
        assert_close(row.new_products, 8.0);
        assert_close(row.mnc, 14.0);
        assert_close(row.domestic, 6.0);
    }

    #[test]
    fn test_total_edit_scales_from_previous_not_proposed_components() {
        let previous = base();
        let mut proposed = previous;
        proposed.total = 20.0;
        proposed.crm = 100.0;

        let row = rebalance(
            &previous,
            &fields(&[RevenueField::Total, RevenueField::Crm]),
            &proposed,
        );

        assert_close(row.crm, 12.0);
        assert!(row.is_balanced());
    }

    #[test]
    fn test_crm_edit_moves_total_and_scales_customer_split() {
        let previous = base();
        let mut proposed = previous;
        proposed.crm = 9.0;

        let row = rebalance(&previous, &fields(&[RevenueField::Crm]), &proposed);

        assert_close(row.total, 13.0);
        assert_close(row.crm, 9.0);
        assert_close(row.new_products, 4.0);
        assert_close(row.mnc, 9.1);
        assert_close(row.domestic, 3.9);
    }

    #[test]
    fn test_domestic_edit_moves_total_and_scales_crm_split() {
        let previous = base();
        let mut proposed = previous;
        proposed.domestic = 8.0;

        let row = rebalance(&previous, &fields(&[RevenueField::Domestic]), &proposed);

        assert_close(row.total, 15.0);
        assert_close(row.mnc, 7.0);
        assert_close(row.domestic, 8.0);
        assert_close(row.crm, 9.0);
        assert_close(row.new_products, 6.0);
    }

    #[test]
    fn test_zero_previous_total_uses_unit_factor_then_repairs() {
        let previous = RevenueRow::new(2025, 0.0, 0.0, 0.0, 0.0, 0.0);
        let mut proposed = previous;
        proposed.total = 5.0;

        let row = rebalance(&previous, &fields(&[RevenueField::Total]), &proposed);

        assert_close(row.total, 5.0);
        assert_close(row.crm, 0.0);
        assert_close(row.new_products, 5.0);
        assert_close(row.mnc, 0.0);
        assert_close(row.domestic, 5.0);
    }

    #[test]
    fn test_zero_previous_total_on_component_edit() {
        let previous = RevenueRow::new(2025, 0.0, 0.0, 0.0, 0.0, 0.0);
        let mut proposed = previous;
        proposed.mnc = 2.0;

        let row = rebalance(&previous, &fields(&[RevenueField::Mnc]), &proposed);

        assert_close(row.total, 2.0);
        assert_close(row.crm, 0.0);
        assert_close(row.new_products, 2.0);
        assert_close(row.mnc, 2.0);
        assert_close(row.domestic, 0.0);
    }

    #[test]
    fn test_crm_split_wins_over_customer_split_in_one_batch() {
        let previous = base();
        let mut proposed = previous;
        proposed.new_products = 6.0;
        proposed.mnc = 1.0;

        let row = rebalance(
            &previous,
            &fields(&[RevenueField::NewProducts, RevenueField::Mnc]),
            &proposed,
        );

        assert_close(row.total, 12.0);
        assert_close(row.mnc, 8.4);
        assert_close(row.domestic, 3.6);
    }

    #[test]
    fn test_negative_values_are_accepted() {
        let previous = base();
        let mut proposed = previous;
        proposed.crm = -2.0;

        let row = rebalance(&previous, &fields(&[RevenueField::Crm]), &proposed);

        assert_close(row.total, 2.0);
        assert_close(row.crm, -2.0);
        assert!(row.is_balanced());
    }

    #[test]
    fn test_empty_edit_passes_through() {
        let row = RevenueRow::new(2026, 4.05, 3.24, 0.81, 3.65, 0.40);
        assert_eq!(rebalance(&row, &EditedFields::new(), &row), row);
    }

    #[test]
    fn test_select_priority() {
        assert_eq!(
            BalanceCase::select(&fields(&[RevenueField::Domestic, RevenueField::Total])),
            Some(BalanceCase::Total)
        );
        assert_eq!(
            BalanceCase::select(&fields(&[RevenueField::Mnc, RevenueField::Crm])),
            Some(BalanceCase::CrmSplit)
        );
        assert_eq!(BalanceCase::select(&EditedFields::new()), None);
    }

    #[test]
    fn test_rounding_keeps_sums() {
        let previous = RevenueRow::new(2025, 3.0, 1.0, 2.0, 1.0, 2.0);
        let mut proposed = previous;
        proposed.total = 10.0;

        let row = rebalance(&previous, &fields(&[RevenueField::Total]), &proposed);

        assert_close(row.crm, 3.33);
        assert_close(row.new_products, 6.67);
        assert!(row.is_balanced());
    }
}
