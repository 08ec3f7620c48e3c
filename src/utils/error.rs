use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}': {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Malformed table '{file}': {message}")]
    InvalidTableError { file: String, message: String },

    #[error("No forecast row for year {year}")]
    UnknownYearError { year: i32 },

    #[error("No product type named '{product_type}'")]
    UnknownProductTypeError { product_type: String },

    #[error("Product type '{product_type}' already exists")]
    DuplicateProductTypeError { product_type: String },

    #[error("Value for '{field}' must be a finite number, got {value}")]
    NonFiniteValueError { field: String, value: f64 },

    #[error("Percentage {percent} is outside 0-100")]
    PercentOutOfRangeError { percent: f64 },

    #[error("Chart rendering failed: {message}")]
    ChartError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Storage,
    Configuration,
    UserInput,
    Rendering,
}

impl ForecastError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ForecastError::CsvError(_)
            | ForecastError::IoError(_)
            | ForecastError::SerializationError(_)
            | ForecastError::InvalidTableError { .. } => ErrorCategory::Storage,
            ForecastError::ConfigError { .. } | ForecastError::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            ForecastError::UnknownYearError { .. }
            | ForecastError::UnknownProductTypeError { .. }
            | ForecastError::DuplicateProductTypeError { .. }
            | ForecastError::NonFiniteValueError { .. }
            | ForecastError::PercentOutOfRangeError { .. } => ErrorCategory::UserInput,
            ForecastError::ChartError { .. } => ErrorCategory::Rendering,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Storage => format!("Could not read or write forecast data: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::UserInput => self.to_string(),
            ErrorCategory::Rendering => format!("Could not draw charts: {}", self),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ForecastError::InvalidTableError { .. } | ForecastError::CsvError(_) => {
                "Fix the CSV headers/values, or delete the file to fall back to the built-in seed data"
            }
            ForecastError::IoError(_) => "Check that the data directory exists and is writable",
            ForecastError::SerializationError(_) => "Retry without --json",
            ForecastError::ConfigError { .. } | ForecastError::InvalidConfigValueError { .. } => {
                "Check the TOML configuration file and command-line flags"
            }
            ForecastError::UnknownYearError { .. } => "Run `show` to list the forecast years",
            ForecastError::UnknownProductTypeError { .. } => {
                "Run `mix list` to see the product types, or add it with `mix add`"
            }
            ForecastError::DuplicateProductTypeError { .. } => "Pick a different product type name",
            ForecastError::NonFiniteValueError { .. } => "Enter a plain number such as 4.05",
            ForecastError::PercentOutOfRangeError { .. } => "Enter a share between 0 and 100",
            ForecastError::ChartError { .. } => "Check the chart output directory",
        }
    }
}

pub type Result<T> = std::result::Result<T, ForecastError>;
