use crate::core::session::ForecastSession;
use crate::core::{Deviation, Kpis, ProductMixEntry, RevenueRow, RowPercentages, SubTypeRevenue};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write;

/// Everything the dashboard shows, in one serializable snapshot.
#[derive(Debug, Serialize)]
pub struct ForecastReport {
    pub generated_at: DateTime<Utc>,
    pub rows: Vec<RevenueRow>,
    pub percentages: Vec<RowPercentages>,
    pub kpis: Option<Kpis>,
    pub product_mix: Vec<ProductMixEntry>,
    pub mix_deviations: Vec<Deviation>,
    pub sub_type_revenue: Vec<SubTypeRevenue>,
}

impl ForecastReport {
    pub fn from_session(session: &ForecastSession) -> Self {
        Self {
            generated_at: Utc::now(),
            rows: session.rows().to_vec(),
            percentages: session.percentages(),
            kpis: session.kpis(),
            product_mix: session.product_mix().to_vec(),
            mix_deviations: session.mix_deviations(),
            sub_type_revenue: session.sub_type_revenue(),
        }
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_text(&self, years: &[i32]) -> String {
        let mut out = String::new();
        out.push_str(&render_main_table(&self.rows));
        out.push('\n');
        out.push_str(&render_percentages(&self.percentages));
        out.push('\n');
        out.push_str(&render_kpis(self.kpis.as_ref()));
        out.push('\n');
        out.push_str(&render_product_mix(&self.product_mix, years));
        out.push('\n');
        out.push_str(&render_sub_type_revenue(&self.sub_type_revenue, years));
        out
    }
}

pub fn render_main_table(rows: &[RevenueRow]) -> String {
    let mut out = String::from("📊 Revenue forecast (M USD)\n");
    let _ = writeln!(
        out,
        "  {:<6} {:>9} {:>9} {:>13} {:>9} {:>9}",
        "Year", "Total", "CRM", "New Products", "MNC", "Domestic"
    );
    for row in rows {
        let _ = writeln!(
            out,
            "  {:<6} {:>9.2} {:>9.2} {:>13.2} {:>9.2} {:>9.2}",
            row.year(),
            row.total,
            row.crm,
            row.new_products,
            row.mnc,
            row.domestic
        );
    }
    out
}

pub fn render_percentages(percentages: &[RowPercentages]) -> String {
    let mut out = String::from("📈 Revenue composition (%)\n");
    let _ = writeln!(
        out,
        "  {:<6} {:>8} {:>13} {:>8} {:>9}",
        "Year", "CRM", "New Products", "MNC", "Domestic"
    );
    for pct in percentages {
        let _ = writeln!(
            out,
            "  {:<6} {:>7.2}% {:>12.2}% {:>7.2}% {:>8.2}%",
            pct.year, pct.crm_pct, pct.new_products_pct, pct.mnc_pct, pct.domestic_pct
        );
    }
    out
}

pub fn render_kpis(kpis: Option<&Kpis>) -> String {
    let mut out = String::from("🎯 Key figures\n");
    let Some(kpis) = kpis else {
        out.push_str("  No forecast rows\n");
        return out;
    };

    let _ = writeln!(
        out,
        "  Start year revenue ({}): {:.2}M USD",
        kpis.start_year, kpis.start_revenue
    );
    let _ = writeln!(
        out,
        "  End year revenue ({}): {:.2}M USD",
        kpis.end_year, kpis.end_revenue
    );
    match &kpis.cagr {
        Some(cagr) => {
            let _ = writeln!(
                out,
                "  {}-{} CAGR: {:.1}%",
                cagr.start_year, cagr.end_year, cagr.percent
            );
        }
        None => out.push_str("  CAGR: N/A\n"),
    }
    out
}

pub fn render_product_mix(entries: &[ProductMixEntry], years: &[i32]) -> String {
    let mut out = String::from("🧩 New product mix (%)\n");
    let _ = write!(out, "  {:<20}", "Product Type");
    for year in years {
        let _ = write!(out, " {:>8}", format!("{} %", year));
    }
    out.push('\n');

    for entry in entries {
        let _ = write!(out, "  {:<20}", entry.product_type);
        for year in years {
            let _ = write!(out, " {:>8.1}", entry.percent(*year));
        }
        out.push('\n');
    }
    out
}

pub fn render_sub_type_revenue(revenue: &[SubTypeRevenue], years: &[i32]) -> String {
    let mut out = String::from("💰 New product revenue by type (M USD)\n");
    let _ = write!(out, "  {:<20}", "Product Type");
    for year in years {
        let _ = write!(out, " {:>8}", year);
    }
    out.push('\n');

    for sub_type in revenue {
        let _ = write!(out, "  {:<20}", sub_type.product_type);
        for year in years {
            let value = sub_type.revenue_by_year.get(year).copied().unwrap_or(0.0);
            let _ = write!(out, " {:>8.3}", value);
        }
        out.push('\n');
    }
    out
}
