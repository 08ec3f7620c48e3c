#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;

use crate::adapters::csv_store::CsvForecastStore;
use std::path::PathBuf;
use toml_config::TomlConfig;

/// Effective settings after command-line overrides are applied to the file.
#[derive(Debug, Clone)]
pub struct ForecastSettings {
    pub data_dir: PathBuf,
    pub main_file: String,
    pub product_mix_file: String,
    pub chart_output_dir: PathBuf,
    pub chart_width: u32,
    pub chart_height: u32,
    pub log_level: Option<String>,
}

impl ForecastSettings {
    pub fn resolve(file: TomlConfig, data_dir: Option<&str>, chart_output_dir: Option<&str>) -> Self {
        Self {
            data_dir: PathBuf::from(data_dir.unwrap_or(&file.storage.data_dir)),
            main_file: file.storage.main_file,
            product_mix_file: file.storage.product_mix_file,
            chart_output_dir: PathBuf::from(chart_output_dir.unwrap_or(&file.charts.output_dir)),
            chart_width: file.charts.width,
            chart_height: file.charts.height,
            log_level: file.logging.level,
        }
    }

    pub fn store(&self) -> CsvForecastStore {
        CsvForecastStore::new(&self.data_dir).with_file_names(&self.main_file, &self.product_mix_file)
    }

    #[cfg(feature = "charts")]
    pub fn chart_options(&self) -> crate::adapters::chart::ChartOptions {
        crate::adapters::chart::ChartOptions {
            output_dir: self.chart_output_dir.clone(),
            width: self.chart_width,
            height: self.chart_height,
        }
    }
}
