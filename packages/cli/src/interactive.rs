#![allow(clippy::module_name_repetitions)]

//! Interactive prompts for the projection tool.
//!
//! Provides a menu-driven interface using `dialoguer` for running
//! projections without memorizing CLI flags. Values from an optional run
//! file are offered as defaults.

use std::path::PathBuf;

use beps_district::DEFAULT_DISTRICT_PROPERTY;
use beps_ingest_models::RunConfig;
use dialoguer::{Input, Select};

/// Top-level actions available in the interactive menu.
enum Action {
    Project,
    Summary,
    Districts,
}

impl Action {
    const ALL: &[Self] = &[Self::Project, Self::Summary, Self::Districts];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Project => "Project buildings year by year",
            Self::Summary => "Summarize compliance by year",
            Self::Districts => "Assign buildings to council districts",
        }
    }
}

/// Runs the interactive menu, prompting for an action and its inputs.
///
/// # Errors
///
/// Returns an error if a prompt fails or the selected command fails.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    let config_path = prompt_optional_path("Run file (empty for none)", None)?;
    let mut config = crate::run::base_config(config_path.as_deref())?;

    match Action::ALL[idx] {
        Action::Project => {
            prompt_projection_inputs(&mut config)?;
            prompt_output(&mut config)?;
            crate::run::project(&config)?;
        }
        Action::Summary => {
            prompt_projection_inputs(&mut config)?;
            prompt_output(&mut config)?;
            crate::run::summary(&config)?;
        }
        Action::Districts => {
            config.inputs.buildings = prompt_required_path(
                "Building benchmarking CSV",
                config.inputs.buildings.take(),
            )?;
            config.inputs.districts =
                prompt_required_path("District boundary GeoJSON", config.inputs.districts.take())?;
            let property: String = Input::new()
                .with_prompt("District code property")
                .default(DEFAULT_DISTRICT_PROPERTY.to_string())
                .interact_text()?;
            prompt_output(&mut config)?;
            crate::run::districts(&config, &property)?;
        }
    }

    Ok(())
}

fn prompt_projection_inputs(config: &mut RunConfig) -> Result<(), Box<dyn std::error::Error>> {
    config.inputs.emissions =
        prompt_required_path("Emission factor CSV", config.inputs.emissions.take())?;
    config.inputs.timeline =
        prompt_required_path("GHGI policy timeline CSV", config.inputs.timeline.take())?;
    config.inputs.buildings =
        prompt_required_path("Building benchmarking CSV", config.inputs.buildings.take())?;

    config.horizon.start_year = Some(prompt_year("First year", config.horizon.start_year)?);
    config.horizon.end_year = Some(prompt_year("Last year", config.horizon.end_year)?);

    let current = config
        .policy
        .fine_years
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",");
    let fine_years: String = Input::new()
        .with_prompt("Comma-separated fine years (empty for none)")
        .default(current)
        .allow_empty(true)
        .interact_text()?;
    config.policy.fine_years = crate::run::parse_fine_years(&fine_years)?;

    let rate: String = Input::new()
        .with_prompt("Fee per square foot")
        .default(config.policy.fine_per_sqft.to_string())
        .interact_text()?;
    config.policy.fine_per_sqft = rate.trim().parse()?;

    Ok(())
}

fn prompt_output(config: &mut RunConfig) -> Result<(), Box<dyn std::error::Error>> {
    config.output.path = prompt_optional_path(
        "Output file, .csv or .json (empty for stdout)",
        config.output.path.take(),
    )?;
    Ok(())
}

fn prompt_year(prompt: &str, current: Option<i32>) -> Result<i32, Box<dyn std::error::Error>> {
    let mut input = Input::<String>::new().with_prompt(prompt);
    if let Some(year) = current {
        input = input.default(year.to_string());
    }
    Ok(input.interact_text()?.trim().parse()?)
}

fn prompt_required_path(
    prompt: &str,
    current: Option<PathBuf>,
) -> Result<Option<PathBuf>, Box<dyn std::error::Error>> {
    let mut input = Input::<String>::new().with_prompt(prompt);
    if let Some(path) = current {
        input = input.default(path.display().to_string());
    }
    let value = input.interact_text()?;
    Ok(Some(PathBuf::from(value.trim())))
}

fn prompt_optional_path(
    prompt: &str,
    current: Option<PathBuf>,
) -> Result<Option<PathBuf>, Box<dyn std::error::Error>> {
    let mut input = Input::<String>::new().with_prompt(prompt).allow_empty(true);
    if let Some(path) = current {
        input = input.default(path.display().to_string());
    }
    let value = input.interact_text()?;

    if value.trim().is_empty() {
        Ok(None)
    } else {
        Ok(Some(PathBuf::from(value.trim())))
    }
}
