use crate::core::RevenueField;
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "revenue-forecast")]
#[command(about = "Edit and inspect a three-year revenue forecast")]
pub struct CliConfig {
    /// Directory holding the forecast CSV files
    #[arg(long, global = true)]
    pub data_dir: Option<String>,

    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print machine-readable JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Show tables, composition, key figures and product mix
    Show,

    /// Edit one year's revenue figures and rebalance the row
    Edit {
        #[arg(long)]
        year: i32,

        /// Field assignment such as `crm=9.5`; repeat to edit several fields at once
        #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_assignment, required = true)]
        changes: Vec<(RevenueField, f64)>,

        /// Print the corrected row without saving it
        #[arg(long)]
        dry_run: bool,
    },

    /// Check that every year's product mix adds up to 100%
    Validate,

    /// Inspect or change the new product mix
    Mix {
        #[command(subcommand)]
        action: MixAction,
    },

    /// Render SVG charts
    Chart {
        /// Output directory (overrides the configuration file)
        #[arg(long)]
        out: Option<String>,
    },

    /// Write the built-in seed data to the data directory
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum MixAction {
    /// List product types and their shares
    List,

    /// Add a product type with 0% in every year
    Add { product_type: String },

    /// Remove a product type
    Remove { product_type: String },

    /// Set one product type's share for one year
    Set {
        product_type: String,

        #[arg(long)]
        year: i32,

        #[arg(long)]
        percent: f64,
    },
}

pub fn parse_assignment(s: &str) -> Result<(RevenueField, f64), String> {
    let (field, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{}'", s))?;
    let field: RevenueField = field.parse()?;
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", value.trim()))?;
    if !value.is_finite() {
        return Err(format!("'{}' is not a finite number", value));
    }
    Ok((field, value))
}
