use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dataset::prepare::RATES_YEAR;
use explorer::FilterState;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Salary survey explorer: summaries and data preparation")]
struct Args {
    /// Presentation config (JSON); missing keys keep their defaults
    #[arg(long, global = true, env = "SALARY_ATLAS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the derived map state for one filter and selection as JSON
    Summary {
        /// Dataset file (.csv, or .json record array)
        data: PathBuf,

        /// Age group, or "All"
        #[arg(long, default_value = "All")]
        age: String,

        /// Profession, or "All"
        #[arg(long, default_value = "All")]
        profession: String,

        /// Country to add to the comparison set (repeatable)
        #[arg(long = "select")]
        select: Vec<String>,
    },

    /// Print the age and profession filter options
    Options {
        /// Dataset file (.csv, or .json record array)
        data: PathBuf,
    },

    /// Convert raw survey responses into monthly EUR rows
    Prepare {
        /// Raw survey CSV
        survey: PathBuf,

        /// Output CSV
        out: PathBuf,

        /// Exchange rates: Eurostat ert_bil_eur_a .tsv, or JSON {"CODE": units per EUR, ...}
        #[arg(long)]
        rates: Option<PathBuf>,

        /// Year column used from a Eurostat rates table
        #[arg(long, default_value_t = RATES_YEAR)]
        rates_year: u16,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), String> {
    let args = Args::parse();

    match args.command {
        Command::Summary {
            data,
            age,
            profession,
            select,
        } => {
            let config = tools::load_config(args.config.as_deref())?;
            let filter = FilterState::new(age, profession);
            println!("{}", tools::cmd_summary(&data, &config, filter, &select)?);
        }
        Command::Options { data } => {
            println!("{}", tools::cmd_options(&data)?);
        }
        Command::Prepare {
            survey,
            out,
            rates,
            rates_year,
        } => {
            let written = tools::cmd_prepare(&survey, &out, rates.as_deref(), rates_year)?;
            eprintln!("wrote {written} rows to {}", out.display());
        }
    }
    Ok(())
}
