#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for BEPS compliance projections.
//!
//! Inputs come from a TOML run file (`--config`), individual flags, or
//! both; flags win. Run with no subcommand for an interactive prompt.
//!
//! `principals` and `related-companies` work on building owners rather
//! than projections: the first queries the business registry, the second
//! groups its output by shared principals.

mod interactive;
mod run;

use std::path::PathBuf;

use beps_district::DEFAULT_DISTRICT_PROPERTY;
use beps_ingest_models::{OutputConfig, RunConfig};
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "beps", about = "Building emissions performance standard projections")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Project every building's emissions, targets, compliance and fees
    Project {
        #[command(flatten)]
        inputs: InputArgs,
    },
    /// Project and write per-year totals instead of per-building rows
    Summary {
        #[command(flatten)]
        inputs: InputArgs,
    },
    /// Assign buildings to council districts by coordinates
    Districts {
        /// TOML run file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Building benchmarking CSV
        #[arg(long)]
        buildings: Option<PathBuf>,
        /// District boundary `GeoJSON` (`FeatureCollection`)
        #[arg(long)]
        districts: Option<PathBuf>,
        /// Feature property holding the district code
        #[arg(long, default_value = DEFAULT_DISTRICT_PROPERTY)]
        property: String,
        /// Output file (stdout if omitted)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Output format: csv or json (default: from extension, else csv)
        #[arg(long)]
        format: Option<String>,
    },
    /// Look up registered principals for a list of owner businesses
    Principals {
        /// CSV with `BusinessId`, `BusinessName` and `SearchTerm` columns
        #[arg(long)]
        businesses: PathBuf,
        /// Registry API host (defaults to the state filing service)
        #[arg(long)]
        base_url: Option<String>,
        /// Milliseconds to wait between registry requests
        #[arg(long)]
        delay_ms: Option<u64>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Group owner businesses that share a principal for review
    RelatedCompanies {
        /// Principal table written by `principals`
        #[arg(long)]
        principals: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
}

/// Output destination for commands that take no run file.
#[derive(Args)]
struct OutputArgs {
    /// Output file (stdout if omitted)
    #[arg(long)]
    output: Option<PathBuf>,
    /// Output format: csv or json (default: from extension, else csv)
    #[arg(long)]
    format: Option<String>,
}

impl From<OutputArgs> for OutputConfig {
    fn from(value: OutputArgs) -> Self {
        Self {
            path: value.output,
            format: value.format,
        }
    }
}

/// Projection inputs shared by `project` and `summary`.
#[derive(Args)]
struct InputArgs {
    /// TOML run file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Emission factor CSV
    #[arg(long)]
    emissions: Option<PathBuf>,
    /// GHGI policy timeline CSV
    #[arg(long)]
    timeline: Option<PathBuf>,
    /// Building benchmarking CSV
    #[arg(long)]
    buildings: Option<PathBuf>,
    /// First projected year
    #[arg(long)]
    start_year: Option<i32>,
    /// Last projected year (inclusive)
    #[arg(long)]
    end_year: Option<i32>,
    /// Comma-separated years in which fees are assessed (e.g. "2030,2035")
    #[arg(long)]
    fine_years: Option<String>,
    /// Flat fee per square foot
    #[arg(long)]
    fine_per_sqft: Option<f64>,
    /// Output file (stdout if omitted)
    #[arg(long)]
    output: Option<PathBuf>,
    /// Output format: csv or json (default: from extension, else csv)
    #[arg(long)]
    format: Option<String>,
}

impl InputArgs {
    /// Loads the run file, if any, and layers the flags over it.
    fn into_config(self) -> Result<RunConfig, Box<dyn std::error::Error>> {
        let mut config = run::base_config(self.config.as_deref())?;

        if self.emissions.is_some() {
            config.inputs.emissions = self.emissions;
        }
        if self.timeline.is_some() {
            config.inputs.timeline = self.timeline;
        }
        if self.buildings.is_some() {
            config.inputs.buildings = self.buildings;
        }
        if self.start_year.is_some() {
            config.horizon.start_year = self.start_year;
        }
        if self.end_year.is_some() {
            config.horizon.end_year = self.end_year;
        }
        if let Some(years) = self.fine_years {
            config.policy.fine_years = run::parse_fine_years(&years)?;
        }
        if let Some(rate) = self.fine_per_sqft {
            config.policy.fine_per_sqft = rate;
        }
        if self.output.is_some() {
            config.output.path = self.output;
        }
        if self.format.is_some() {
            config.output.format = self.format;
        }

        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        return interactive::run();
    };

    match command {
        Commands::Project { inputs } => run::project(&inputs.into_config()?)?,
        Commands::Summary { inputs } => run::summary(&inputs.into_config()?)?,
        Commands::Districts {
            config,
            buildings,
            districts,
            property,
            output,
            format,
        } => {
            let mut config = run::base_config(config.as_deref())?;
            if buildings.is_some() {
                config.inputs.buildings = buildings;
            }
            if districts.is_some() {
                config.inputs.districts = districts;
            }
            if output.is_some() {
                config.output.path = output;
            }
            if format.is_some() {
                config.output.format = format;
            }
            run::districts(&config, &property)?;
        }
        Commands::Principals {
            businesses,
            base_url,
            delay_ms,
            output,
        } => {
            let registry = run::RegistryOptions { base_url, delay_ms };
            run::principals(&businesses, &registry, &output.into()).await?;
        }
        Commands::RelatedCompanies { principals, output } => {
            run::related_companies(&principals, &output.into())?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use beps_export::ExportFormat;

    use super::*;

    #[test]
    fn flags_populate_an_empty_config() {
        let cli = Cli::try_parse_from([
            "beps",
            "project",
            "--emissions",
            "e.csv",
            "--timeline",
            "t.csv",
            "--buildings",
            "b.csv",
            "--start-year",
            "2027",
            "--end-year",
            "2050",
            "--fine-years",
            "2030, 2035,2040",
            "--fine-per-sqft",
            "2.5",
            "--format",
            "json",
        ])
        .unwrap();

        let Some(Commands::Project { inputs }) = cli.command else {
            panic!("expected project subcommand");
        };
        let config = inputs.into_config().unwrap();

        assert_eq!(config.inputs.timeline.as_deref(), Some(Path::new("t.csv")));
        assert_eq!(config.horizon.start_year, Some(2027));
        assert_eq!(config.policy.fine_years, vec![2030, 2035, 2040]);
        assert_eq!(config.output.format.as_deref(), Some("json"));
        assert_eq!(run::output_format(&config.output).unwrap(), ExportFormat::Json);
    }

    #[test]
    fn districts_defaults_to_council_property() {
        let cli = Cli::try_parse_from(["beps", "districts", "--districts", "d.geojson"]).unwrap();
        let Some(Commands::Districts { property, .. }) = cli.command else {
            panic!("expected districts subcommand");
        };
        assert_eq!(property, "C_DISTRICT");
    }

    #[test]
    fn unknown_format_is_rejected_before_running() {
        let cli = Cli::try_parse_from(["beps", "summary", "--format", "xlsx"]).unwrap();
        let Some(Commands::Summary { inputs }) = cli.command else {
            panic!("expected summary subcommand");
        };
        let config = inputs.into_config().unwrap();
        assert!(run::output_format(&config.output).is_err());
    }

    #[test]
    fn districts_format_flag_overrides_extension() {
        let cli = Cli::try_parse_from([
            "beps",
            "districts",
            "--output",
            "out/districts.csv",
            "--format",
            "JSON",
        ])
        .unwrap();
        let Some(Commands::Districts { output, format, .. }) = cli.command else {
            panic!("expected districts subcommand");
        };
        let output = OutputConfig {
            path: output,
            format,
        };
        assert_eq!(run::output_format(&output).unwrap(), ExportFormat::Json);
    }

    #[test]
    fn related_companies_takes_output_flags() {
        let cli = Cli::try_parse_from([
            "beps",
            "related-companies",
            "--principals",
            "principals.csv",
            "--output",
            "related.json",
        ])
        .unwrap();
        let Some(Commands::RelatedCompanies { principals, output }) = cli.command else {
            panic!("expected related-companies subcommand");
        };
        assert_eq!(principals, PathBuf::from("principals.csv"));
        let output = OutputConfig::from(output);
        assert_eq!(run::output_format(&output).unwrap(), ExportFormat::Json);
    }

    #[test]
    fn principals_requires_a_business_list() {
        assert!(Cli::try_parse_from(["beps", "principals"]).is_err());
        let cli = Cli::try_parse_from([
            "beps",
            "principals",
            "--businesses",
            "matches.csv",
            "--delay-ms",
            "250",
        ])
        .unwrap();
        let Some(Commands::Principals { delay_ms, .. }) = cli.command else {
            panic!("expected principals subcommand");
        };
        assert_eq!(delay_ms, Some(250));
    }

    #[test]
    fn bad_fine_years_are_rejected() {
        assert!(run::parse_fine_years("2030,soon").is_err());
        assert_eq!(run::parse_fine_years(" ").unwrap(), Vec::<i32>::new());
    }

    #[test]
    fn output_format_falls_back_to_extension_then_csv() {
        let mut output = OutputConfig {
            path: Some(PathBuf::from("rows.JSON")),
            format: None,
        };
        assert_eq!(run::output_format(&output).unwrap(), ExportFormat::Json);
        output.path = None;
        assert_eq!(run::output_format(&output).unwrap(), ExportFormat::Csv);
        output.format = Some("parquet".to_string());
        assert!(run::output_format(&output).is_err());
    }
}
