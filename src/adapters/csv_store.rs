use crate::core::{ForecastStore, ProductMixEntry, RevenueRow};
use crate::utils::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_MAIN_FILE: &str = "forecast_main.csv";
pub const DEFAULT_PRODUCT_MIX_FILE: &str = "forecast_product_mix.csv";

const PRODUCT_TYPE_COLUMN: &str = "Product Type";

#[derive(Debug, Serialize, Deserialize)]
struct MainTableRecord {
    #[serde(rename = "Year")]
    year: i32,
    #[serde(rename = "Total Impl. Team Service Revenue (M USD)")]
    total: f64,
    #[serde(rename = "CRM Project Revenue (M USD)")]
    crm: f64,
    #[serde(rename = "New Products Project Revenue (M USD)")]
    new_products: f64,
    #[serde(rename = "MNC Project Revenue (M USD)")]
    mnc: f64,
    #[serde(rename = "Domestic Project Revenue (M USD)")]
    domestic: f64,
}

impl From<&RevenueRow> for MainTableRecord {
    fn from(row: &RevenueRow) -> Self {
        Self {
            year: row.year(),
            total: row.total,
            crm: row.crm,
            new_products: row.new_products,
            mnc: row.mnc,
            domestic: row.domestic,
        }
    }
}

impl From<MainTableRecord> for RevenueRow {
    fn from(record: MainTableRecord) -> Self {
        RevenueRow::new(
            record.year,
            record.total,
            record.crm,
            record.new_products,
            record.mnc,
            record.domestic,
        )
    }
}

/// Keeps both forecast tables as CSV files in one directory.
#[derive(Debug, Clone)]
pub struct CsvForecastStore {
    base_path: PathBuf,
    main_file: String,
    product_mix_file: String,
}

impl CsvForecastStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            main_file: DEFAULT_MAIN_FILE.to_string(),
            product_mix_file: DEFAULT_PRODUCT_MIX_FILE.to_string(),
        }
    }

    pub fn with_file_names(mut self, main_file: &str, product_mix_file: &str) -> Self {
        self.main_file = main_file.to_string();
        self.product_mix_file = product_mix_file.to_string();
        self
    }

    pub fn main_path(&self) -> PathBuf {
        self.base_path.join(&self.main_file)
    }

    pub fn product_mix_path(&self) -> PathBuf {
        self.base_path.join(&self.product_mix_file)
    }
}

fn reader_for(path: &Path) -> Result<csv::Reader<fs::File>> {
    Ok(csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?)
}

// Writes next to the target and renames so a failed save leaves the last
// good file in place.
fn write_replacing(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, data)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn invalid_table(path: &Path, message: impl Into<String>) -> ForecastError {
    ForecastError::InvalidTableError {
        file: path.display().to_string(),
        message: message.into(),
    }
}

fn parse_year_column(header: &str) -> Option<i32> {
    header.trim().strip_suffix('%')?.trim().parse().ok()
}

pub fn read_main_table(path: &Path) -> Result<Vec<RevenueRow>> {
    let mut reader = reader_for(path)?;
    let mut rows = Vec::new();
    for record in reader.deserialize::<MainTableRecord>() {
        rows.push(RevenueRow::from(record?));
    }
    Ok(rows)
}

pub fn write_main_table(rows: &[RevenueRow]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(MainTableRecord::from(row))?;
    }
    writer
        .into_inner()
        .map_err(|e| ForecastError::IoError(e.into_error()))
}

pub fn read_product_mix(path: &Path) -> Result<Vec<ProductMixEntry>> {
    let mut reader = reader_for(path)?;
    let headers = reader.headers()?.clone();

    let type_index = headers
        .iter()
        .position(|header| header == PRODUCT_TYPE_COLUMN)
        .ok_or_else(|| invalid_table(path, format!("missing '{}' column", PRODUCT_TYPE_COLUMN)))?;

    let year_columns: Vec<(usize, i32)> = headers
        .iter()
        .enumerate()
        .filter_map(|(index, header)| parse_year_column(header).map(|year| (index, year)))
        .collect();

    let mut entries = Vec::new();
    for record in reader.records() {
        let record = record?;
        let product_type = record.get(type_index).unwrap_or_default();
        let mut entry = ProductMixEntry::new(product_type);

        for &(index, year) in &year_columns {
            let cell = record.get(index).unwrap_or_default();
            if cell.is_empty() {
                continue;
            }
            let percent = cell
                .parse::<f64>()
                .ok()
                .filter(|percent| percent.is_finite())
                .ok_or_else(|| {
                    invalid_table(
                        path,
                        format!("'{}' for {} in {} is not a number", cell, product_type, year),
                    )
                })?;
            entry.percent_by_year.insert(year, percent);
        }
        entries.push(entry);
    }

    tracing::debug!(
        "Read {} product mix entries with {} year columns from {}",
        entries.len(),
        year_columns.len(),
        path.display()
    );
    Ok(entries)
}

pub fn write_product_mix(entries: &[ProductMixEntry]) -> Result<Vec<u8>> {
    let years = crate::core::product_mix::mix_years(entries);

    let mut writer = csv::Writer::from_writer(Vec::new());
    let mut header = vec![PRODUCT_TYPE_COLUMN.to_string()];
    header.extend(years.iter().map(|year| format!("{} %", year)));
    writer.write_record(&header)?;

    for entry in entries {
        let mut record = vec![entry.product_type.clone()];
        record.extend(years.iter().map(|year| {
            entry
                .percent_by_year
                .get(year)
                .map(|percent| percent.to_string())
                .unwrap_or_default()
        }));
        writer.write_record(&record)?;
    }

    writer
        .into_inner()
        .map_err(|e| ForecastError::IoError(e.into_error()))
}

impl ForecastStore for CsvForecastStore {
    fn load_main(&self) -> Result<Option<Vec<RevenueRow>>> {
        let path = self.main_path();
        if !path.exists() {
            return Ok(None);
        }
        tracing::debug!("Reading main table from {}", path.display());
        read_main_table(&path).map(Some)
    }

    fn load_product_mix(&self) -> Result<Option<Vec<ProductMixEntry>>> {
        let path = self.product_mix_path();
        if !path.exists() {
            return Ok(None);
        }
        tracing::debug!("Reading product mix from {}", path.display());
        read_product_mix(&path).map(Some)
    }

    fn save_main(&self, rows: &[RevenueRow]) -> Result<()> {
        let path = self.main_path();
        let data = write_main_table(rows)?;
        tracing::debug!("Writing {} bytes to {}", data.len(), path.display());
        write_replacing(&path, &data)
    }

    fn save_product_mix(&self, entries: &[ProductMixEntry]) -> Result<()> {
        let path = self.product_mix_path();
        let data = write_product_mix(entries)?;
        tracing::debug!("Writing {} bytes to {}", data.len(), path.display());
        write_replacing(&path, &data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RevenueField;
    use tempfile::TempDir;

    #[test]
    fn test_main_table_headers() {
        let rows = vec![RevenueRow::new(2025, 5.5, 4.95, 0.55, 5.44, 0.06)];
        let csv = String::from_utf8(write_main_table(&rows).unwrap()).unwrap();
        let header = csv.lines().next().unwrap();

        let mut expected = vec!["Year"];
        expected.extend(RevenueField::ALL.iter().map(RevenueField::column_name));
        assert_eq!(header, expected.join(","));
        assert!(csv.contains("2025,5.5,4.95,0.55,5.44,0.06"));
    }

    #[test]
    fn test_missing_files_load_as_none() {
        let dir = TempDir::new().unwrap();
        let store = CsvForecastStore::new(dir.path());

        assert!(store.load_main().unwrap().is_none());
        assert!(store.load_product_mix().unwrap().is_none());
    }

    #[test]
    fn test_read_product_mix_written_by_hand() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mix.csv");
        fs::write(
            &path,
            "Product Type,2025 %,2026 %\nChina CRM,95,90\nNetwork, 5 ,\n",
        )
        .unwrap();

        let entries = read_product_mix(&path).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].percent(2026), 90.0);
        assert_eq!(entries[1].percent(2025), 5.0);
        assert!(!entries[1].percent_by_year.contains_key(&2026));
    }

    #[test]
    fn test_product_mix_without_type_column_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mix.csv");
        fs::write(&path, "Name,2025 %\nChina CRM,95\n").unwrap();

        assert!(matches!(
            read_product_mix(&path),
            Err(ForecastError::InvalidTableError { .. })
        ));
    }

    #[test]
    fn test_non_numeric_percent_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mix.csv");
        fs::write(&path, "Product Type,2025 %\nChina CRM,lots\n").unwrap();
        assert!(read_product_mix(&path).is_err());

        fs::write(&path, "Product Type,2025 %\nChina CRM,NaN\n").unwrap();
        assert!(matches!(
            read_product_mix(&path),
            Err(ForecastError::InvalidTableError { .. })
        ));
    }

    #[test]
    fn test_save_creates_directories() {
        let dir = TempDir::new().unwrap();
        let store = CsvForecastStore::new(dir.path().join("nested").join("data"))
            .with_file_names("main.csv", "mix.csv");

        store
            .save_main(&[RevenueRow::new(2025, 1.0, 1.0, 0.0, 1.0, 0.0)])
            .unwrap();

        assert!(store.main_path().exists());
        assert!(store.main_path().ends_with("nested/data/main.csv"));
        assert_eq!(store.load_main().unwrap().unwrap().len(), 1);
    }
}
