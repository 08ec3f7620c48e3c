//! SVG charts of the forecast: revenue trend, the two composition splits and
//! the stacked new-product revenue by sub-type.

use crate::core::session::ForecastSession;
use crate::core::{RowPercentages, SubTypeRevenue};
use crate::utils::error::{ForecastError, Result};
use plotters::prelude::*;
use std::path::{Path, PathBuf};

const BAR_HALF_WIDTH: f64 = 0.3;

#[derive(Debug, Clone)]
pub struct ChartOptions {
    pub output_dir: PathBuf,
    pub width: u32,
    pub height: u32,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./charts"),
            width: 1000,
            height: 500,
        }
    }
}

/// One bar piece: `(year, bottom, top)`.
pub type Segment = (i32, f64, f64);

fn chart_error<E: std::fmt::Display>(e: E) -> ForecastError {
    ForecastError::ChartError {
        message: e.to_string(),
    }
}

fn year_label(x: &f64) -> String {
    if x.fract().abs() < 1e-9 {
        format!("{:.0}", x)
    } else {
        String::new()
    }
}

fn year_range(years: &[i32]) -> std::ops::Range<f64> {
    let min = years.iter().min().copied().unwrap_or(0) as f64;
    let max = years.iter().max().copied().unwrap_or(0) as f64;
    (min - 0.5)..(max + 0.5)
}

/// Stacks `layers` on top of each other per year, in the given order.
pub fn stack_segments(years: &[i32], layers: &[Vec<f64>]) -> Vec<Vec<Segment>> {
    let mut bottoms = vec![0.0; years.len()];
    layers
        .iter()
        .map(|values| {
            years
                .iter()
                .enumerate()
                .map(|(i, &year)| {
                    let value = values.get(i).copied().unwrap_or(0.0);
                    let segment = (year, bottoms[i], bottoms[i] + value);
                    bottoms[i] += value;
                    segment
                })
                .collect()
        })
        .collect()
}

fn upper_bound(values: impl Iterator<Item = f64>) -> f64 {
    let max = values.fold(0.0_f64, f64::max);
    if max > 0.0 {
        max * 1.2
    } else {
        1.0
    }
}

pub fn render_all(session: &ForecastSession, options: &ChartOptions) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(&options.output_dir)?;

    let years = session.years();
    let percentages = session.percentages();
    let mut written = Vec::new();

    let path = options.output_dir.join("revenue_trend.svg");
    let totals: Vec<(i32, f64)> = session.rows().iter().map(|row| (row.year(), row.total)).collect();
    render_trend(&path, options, &totals)?;
    written.push(path);

    let path = options.output_dir.join("crm_vs_new_products.svg");
    render_split(
        &path,
        options,
        "CRM vs New Products (%)",
        &years,
        &percentages,
        [("CRM", RGBColor(144, 238, 144)), ("New Products", RGBColor(255, 165, 0))],
        |pct| [pct.crm_pct, pct.new_products_pct],
    )?;
    written.push(path);

    let path = options.output_dir.join("mnc_vs_domestic.svg");
    render_split(
        &path,
        options,
        "MNC vs Domestic (%)",
        &years,
        &percentages,
        [("MNC", RGBColor(128, 0, 128)), ("Domestic", RGBColor(255, 215, 0))],
        |pct| [pct.mnc_pct, pct.domestic_pct],
    )?;
    written.push(path);

    let path = options.output_dir.join("new_product_revenue.svg");
    render_sub_types(&path, options, &years, &session.sub_type_revenue())?;
    written.push(path);

    for path in &written {
        tracing::debug!("Chart written to {}", path.display());
    }
    Ok(written)
}

fn render_trend(path: &Path, options: &ChartOptions, totals: &[(i32, f64)]) -> Result<()> {
    let years: Vec<i32> = totals.iter().map(|(year, _)| *year).collect();
    let root = SVGBackend::new(path, (options.width, options.height)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_error)?;

    let min = totals.iter().map(|(_, total)| *total).fold(0.0_f64, f64::min);
    let mut chart = ChartBuilder::on(&root)
        .caption("Implementation Team Revenue Trend", ("sans-serif", 24))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(year_range(&years), min..upper_bound(totals.iter().map(|(_, t)| *t)))
        .map_err(chart_error)?;

    chart
        .configure_mesh()
        .x_desc("Year")
        .y_desc("Revenue (M USD)")
        .x_label_formatter(&year_label)
        .draw()
        .map_err(chart_error)?;

    let points: Vec<(f64, f64)> = totals.iter().map(|(year, total)| (*year as f64, *total)).collect();
    chart
        .draw_series(LineSeries::new(points.iter().copied(), BLUE.stroke_width(2)))
        .map_err(chart_error)?;
    chart
        .draw_series(points.iter().map(|&point| Circle::new(point, 4, BLUE.filled())))
        .map_err(chart_error)?;

    root.present().map_err(chart_error)?;
    Ok(())
}

fn render_split<F>(
    path: &Path,
    options: &ChartOptions,
    title: &str,
    years: &[i32],
    percentages: &[RowPercentages],
    series: [(&str, RGBColor); 2],
    values: F,
) -> Result<()>
where
    F: Fn(&RowPercentages) -> [f64; 2],
{
    let root = SVGBackend::new(path, (options.width, options.height)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_error)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(year_range(years), 0.0..100.0)
        .map_err(chart_error)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Year")
        .y_desc("Percentage (%)")
        .x_label_formatter(&year_label)
        .y_label_formatter(&|y: &f64| format!("{:.0}%", y))
        .draw()
        .map_err(chart_error)?;

    let layers: Vec<Vec<f64>> = (0..2)
        .map(|i| percentages.iter().map(|pct| values(pct)[i]).collect())
        .collect();
    let stacked = stack_segments(years, &layers);

    for ((label, color), segments) in series.into_iter().zip(stacked) {
        chart
            .draw_series(segments.into_iter().map(|(year, bottom, top)| {
                let x = year as f64;
                Rectangle::new([(x - BAR_HALF_WIDTH, bottom), (x + BAR_HALF_WIDTH, top)], color.filled())
            }))
            .map_err(chart_error)?
            .label(label)
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::LowerRight)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(chart_error)?;

    root.present().map_err(chart_error)?;
    Ok(())
}

fn render_sub_types(
    path: &Path,
    options: &ChartOptions,
    years: &[i32],
    revenue: &[SubTypeRevenue],
) -> Result<()> {
    let layers: Vec<Vec<f64>> = revenue
        .iter()
        .map(|sub_type| {
            years
                .iter()
                .map(|year| sub_type.revenue_by_year.get(year).copied().unwrap_or(0.0))
                .collect()
        })
        .collect();
    let stacked = stack_segments(years, &layers);
    let top = upper_bound(stacked.iter().flatten().map(|(_, _, top)| *top));

    let root = SVGBackend::new(path, (options.width, options.height)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_error)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("New Product Revenue by Type (M USD)", ("sans-serif", 24))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(year_range(years), 0.0..top)
        .map_err(chart_error)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Year")
        .y_desc("Revenue (M USD)")
        .x_label_formatter(&year_label)
        .draw()
        .map_err(chart_error)?;

    for (index, (sub_type, segments)) in revenue.iter().zip(stacked).enumerate() {
        let color = Palette99::pick(index).to_rgba();
        chart
            .draw_series(segments.into_iter().map(|(year, bottom, top)| {
                let x = year as f64;
                Rectangle::new([(x - BAR_HALF_WIDTH, bottom), (x + BAR_HALF_WIDTH, top)], color.filled())
            }))
            .map_err(chart_error)?
            .label(sub_type.product_type.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(chart_error)?;

    root.present().map_err(chart_error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stack_segments_accumulates_in_layer_order() {
        let years = [2025, 2026];
        let layers = vec![vec![95.0, 90.0], vec![5.0, 10.0]];

        let stacked = stack_segments(&years, &layers);

        assert_eq!(stacked[0], vec![(2025, 0.0, 95.0), (2026, 0.0, 90.0)]);
        assert_eq!(stacked[1], vec![(2025, 95.0, 100.0), (2026, 90.0, 100.0)]);
    }

    #[test]
    fn test_short_layer_counts_as_zero() {
        let stacked = stack_segments(&[2025, 2026], &[vec![1.0]]);
        assert_eq!(stacked[0][1], (2026, 0.0, 0.0));
    }

    #[test]
    fn test_year_labels_only_on_whole_years() {
        assert_eq!(year_label(&2025.0), "2025");
        assert_eq!(year_label(&2025.5), "");
    }

    #[test]
    fn test_upper_bound_has_headroom() {
        assert!((upper_bound([5.0, 10.0].into_iter()) - 12.0).abs() < 1e-9);
        assert_eq!(upper_bound(std::iter::empty()), 1.0);
    }
}
