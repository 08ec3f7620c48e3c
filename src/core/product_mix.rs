use crate::domain::model::{Deviation, ProductMixEntry, MIX_TOLERANCE};

/// Yields one [`Deviation`] per year whose percentages miss 100 by more than
/// [`MIX_TOLERANCE`].
///
/// The iterator is lazy and borrows both slices; clone it, or call again, to
/// walk the check a second time. Entries are never modified.
pub fn validate<'a>(
    entries: &'a [ProductMixEntry],
    years: &'a [i32],
) -> impl Iterator<Item = Deviation> + Clone + 'a {
    years.iter().filter_map(move |&year| {
        let observed_sum = year_sum(entries, year);
        if (observed_sum - 100.0).abs() > MIX_TOLERANCE {
            Some(Deviation { year, observed_sum })
        } else {
            None
        }
    })
}

pub fn year_sum(entries: &[ProductMixEntry], year: i32) -> f64 {
    entries.iter().map(|entry| entry.percent(year)).sum()
}

/// Shares outside 0-100, as `(product type, year, percent)`.
pub fn out_of_range(entries: &[ProductMixEntry]) -> impl Iterator<Item = (&str, i32, f64)> + '_ {
    entries.iter().flat_map(|entry| {
        entry
            .percent_by_year
            .iter()
            .filter(|(_, percent)| !(0.0..=100.0).contains(*percent))
            .map(move |(&year, &percent)| (entry.product_type.as_str(), year, percent))
    })
}

/// Every year that appears in at least one entry, ascending.
pub fn mix_years(entries: &[ProductMixEntry]) -> Vec<i32> {
    let mut years: Vec<i32> = entries
        .iter()
        .flat_map(|entry| entry.percent_by_year.keys().copied())
        .collect();
    years.sort_unstable();
    years.dedup();
    years
}
