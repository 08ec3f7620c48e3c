use anyhow::Context;
use clap::Parser;
use revenue_forecast::adapters::report::{self, ForecastReport};
use revenue_forecast::config::cli::{Command, MixAction};
use revenue_forecast::utils::error::ErrorCategory;
use revenue_forecast::utils::{logger, validation::Validate};
use revenue_forecast::{
    CliConfig, CsvForecastStore, Deviation, ForecastSession, ForecastSettings,
    TomlConfig, WarningSink,
};

/// Prints product-mix warnings for the user and logs them.
struct ConsoleWarningSink;

impl WarningSink for ConsoleWarningSink {
    fn warn(&mut self, deviation: &Deviation) {
        tracing::warn!("⚠️ {}", deviation);
        eprintln!("⚠️ Warning: {}. Please adjust.", deviation);
    }
}

fn main() {
    let cli = CliConfig::parse();

    let settings = match load_settings(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("❌ {:#}", e);
            eprintln!("💡 Check the TOML configuration file and command-line flags");
            std::process::exit(1);
        }
    };

    if cli.json {
        logger::init_json_logger(cli.verbose, settings.log_level.as_deref());
    } else {
        logger::init_cli_logger(cli.verbose, settings.log_level.as_deref());
    }
    tracing::debug!("Settings: {:?}", settings);

    if let Err(e) = run(&cli, &settings) {
        tracing::error!("❌ {} (Category: {:?})", e, e.category());
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

        let exit_code = match e.category() {
            ErrorCategory::UserInput => 2,
            ErrorCategory::Configuration => 1,
            ErrorCategory::Storage | ErrorCategory::Rendering => 3,
        };
        std::process::exit(exit_code);
    }
}

fn load_settings(cli: &CliConfig) -> anyhow::Result<ForecastSettings> {
    let file = match &cli.config {
        Some(path) => TomlConfig::from_file(path)
            .with_context(|| format!("Failed to load config file '{}'", path))?,
        None => TomlConfig::default(),
    };
    file.validate().context("Configuration validation failed")?;

    let chart_out = match &cli.command {
        Command::Chart { out } => out.as_deref(),
        _ => None,
    };
    Ok(ForecastSettings::resolve(file, cli.data_dir.as_deref(), chart_out))
}

fn run(cli: &CliConfig, settings: &ForecastSettings) -> revenue_forecast::Result<()> {
    let store = settings.store();

    if let Command::Init { force } = cli.command {
        return init(&store, force);
    }

    let (mut session, main_source, mix_source) = ForecastSession::load(&store)?;
    tracing::debug!("Main table: {:?}, product mix: {:?}", main_source, mix_source);

    match &cli.command {
        Command::Show => {
            let report = ForecastReport::from_session(&session);
            if cli.json {
                println!("{}", report.to_json()?);
            } else {
                session.validate_mix(&mut ConsoleWarningSink);
                print!("{}", report.to_text(&session.mix_check_years()));
            }
        }
        Command::Edit {
            year,
            changes,
            dry_run,
        } => {
            let edit = session.edit_for(*year, changes.iter().copied())?;
            let corrected = session.apply_row_edit(&edit)?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&corrected)?);
            } else {
                println!("Before:");
                print!("{}", report::render_main_table(&[edit.previous]));
                println!("After:");
                print!("{}", report::render_main_table(&[corrected]));
            }

            if *dry_run {
                tracing::info!("🔍 Dry run, nothing saved");
            } else {
                session.save(&store)?;
            }
        }
        Command::Validate => {
            let deviations = session.mix_deviations();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&deviations)?);
            } else if session.validate_mix(&mut ConsoleWarningSink) == 0 {
                println!("✅ Product mix adds up to 100% in every year");
            }
        }
        Command::Mix { action } => {
            match action {
                MixAction::List => {}
                MixAction::Add { product_type } => {
                    session.add_mix_entry(product_type)?;
                }
                MixAction::Remove { product_type } => {
                    session.remove_mix_entry(product_type)?;
                }
                MixAction::Set {
                    product_type,
                    year,
                    percent,
                } => {
                    session.set_mix_percent(product_type, *year, *percent)?;
                }
            }

            if cli.json {
                println!("{}", serde_json::to_string_pretty(session.product_mix())?);
            } else {
                session.validate_mix(&mut ConsoleWarningSink);
                print!(
                    "{}",
                    report::render_product_mix(session.product_mix(), &session.mix_check_years())
                );
            }

            if !matches!(action, MixAction::List) {
                // mix warnings never block saving
                session.save(&store)?;
            }
        }
        Command::Chart { .. } => chart(&session, settings)?,
        Command::Init { .. } => {}
    }

    Ok(())
}

#[cfg(feature = "charts")]
fn chart(session: &ForecastSession, settings: &ForecastSettings) -> revenue_forecast::Result<()> {
    let written = revenue_forecast::adapters::chart::render_all(session, &settings.chart_options())?;
    for path in written {
        println!("📁 {}", path.display());
    }
    Ok(())
}

#[cfg(not(feature = "charts"))]
fn chart(_session: &ForecastSession, _settings: &ForecastSettings) -> revenue_forecast::Result<()> {
    Err(revenue_forecast::ForecastError::ChartError {
        message: "built without the `charts` feature".to_string(),
    })
}

fn init(store: &CsvForecastStore, force: bool) -> revenue_forecast::Result<()> {
    let exists = store.main_path().exists() || store.product_mix_path().exists();
    if exists && !force {
        println!("Forecast data already exists in place, use --force to overwrite");
        return Ok(());
    }

    ForecastSession::seeded().save(store)?;
    println!("✅ Seed data written to {}", store.main_path().display());
    println!("✅ Seed data written to {}", store.product_mix_path().display());
    Ok(())
}
