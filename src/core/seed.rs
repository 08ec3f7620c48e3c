use crate::domain::model::{ProductMixEntry, RevenueRow};

/// Main table used when nothing has been saved yet.
pub fn default_rows() -> Vec<RevenueRow> {
    vec![
        RevenueRow::new(2025, 5.50, 4.95, 0.55, 5.44, 0.06),
        RevenueRow::new(2026, 4.05, 3.24, 0.81, 3.65, 0.40),
        RevenueRow::new(2027, 4.08, 2.86, 1.22, 3.26, 0.82),
    ]
}

/// Product mix used when nothing has been saved yet.
pub fn default_product_mix() -> Vec<ProductMixEntry> {
    vec![
        ProductMixEntry::new("China CRM")
            .with_percent(2025, 95.0)
            .with_percent(2026, 90.0)
            .with_percent(2027, 80.0),
        ProductMixEntry::new("Network")
            .with_percent(2025, 5.0)
            .with_percent(2026, 5.0)
            .with_percent(2027, 5.0),
        ProductMixEntry::new("AI/Vault")
            .with_percent(2025, 0.0)
            .with_percent(2026, 5.0)
            .with_percent(2027, 15.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::product_mix::{mix_years, validate};

    #[test]
    fn test_seed_rows_are_balanced() {
        assert!(default_rows().iter().all(RevenueRow::is_balanced));
    }

    #[test]
    fn test_seed_mix_is_valid() {
        let mix = default_product_mix();
        let years = mix_years(&mix);
        assert_eq!(years, vec![2025, 2026, 2027]);
        assert_eq!(validate(&mix, &years).count(), 0);
    }
}
