//! TOML run configuration loading.

use std::path::{Path, PathBuf};

use beps_ingest_models::RunConfig;
use beps_projection::{BaselineProjector, ProjectionConfig};

use crate::{IngestError, load_buildings, load_emission_factors, load_timeline};

/// Parses a run configuration from TOML text. Paths are left as written.
///
/// # Errors
///
/// Returns [`IngestError::Toml`] if the text is not a valid run file.
pub fn parse_run_config(toml_str: &str) -> Result<RunConfig, IngestError> {
    Ok(toml::de::from_str(toml_str)?)
}

/// Reads a run file and resolves its relative paths against the file's
/// directory.
///
/// # Errors
///
/// Returns [`IngestError::Io`] if the file cannot be read, or
/// [`IngestError::Toml`] if it does not parse.
pub fn load_run_config(path: &Path) -> Result<RunConfig, IngestError> {
    let text = std::fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut config = parse_run_config(&text)?;

    let base = path.parent().unwrap_or_else(|| Path::new(""));
    resolve_paths(&mut config, base);

    log::debug!("Loaded run configuration from {}", path.display());

    Ok(config)
}

fn resolve_paths(config: &mut RunConfig, base: &Path) {
    let resolve = |p: &mut Option<PathBuf>| {
        if let Some(path) = p
            && path.is_relative()
        {
            *path = base.join(&*path);
        }
    };

    resolve(&mut config.inputs.emissions);
    resolve(&mut config.inputs.timeline);
    resolve(&mut config.inputs.buildings);
    resolve(&mut config.inputs.districts);
    resolve(&mut config.output.path);
}

/// Fee parameters from the `[policy]` section.
#[must_use]
pub fn projection_config(config: &RunConfig) -> ProjectionConfig {
    ProjectionConfig::new(
        config.policy.fine_years.iter().copied(),
        config.policy.fine_per_sqft,
    )
}

/// Loads the three input tables named in `config` and builds a projector.
///
/// # Errors
///
/// * [`IngestError::MissingInput`] if an input path is not configured
/// * any error from the table loaders
pub fn load_projector(config: &RunConfig) -> Result<BaselineProjector, IngestError> {
    let inputs = &config.inputs;
    let emissions = inputs
        .emissions
        .as_deref()
        .ok_or(IngestError::MissingInput { name: "emissions" })?;
    let timeline = inputs
        .timeline
        .as_deref()
        .ok_or(IngestError::MissingInput { name: "timeline" })?;
    let buildings = inputs
        .buildings
        .as_deref()
        .ok_or(IngestError::MissingInput { name: "buildings" })?;

    Ok(BaselineProjector::new(
        load_emission_factors(emissions)?,
        load_timeline(timeline)?,
        load_buildings(buildings)?,
        projection_config(config),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RUN: &str = r#"
[inputs]
emissions = "data/emissions.csv"
timeline = "/srv/beps/timeline.csv"
buildings = "data/buildings.csv"

[policy]
fine_years = [2030, 2035, 2040, 2045, 2050]
fine_per_sqft = 2.5

[horizon]
start_year = 2027
end_year = 2050

[output]
path = "out/projection.json"
"#;

    #[test]
    fn parses_all_sections() {
        let config = parse_run_config(RUN).unwrap();
        assert_eq!(config.horizon.start_year, Some(2027));
        assert_eq!(config.horizon.end_year, Some(2050));
        assert_eq!(config.output.format, None);

        let fees = projection_config(&config);
        assert!(fees.is_fine_year(2045));
        assert!(!fees.is_fine_year(2046));
        assert!((fees.fine_per_sqft - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn relative_paths_resolve_against_config_dir() {
        let mut config = parse_run_config(RUN).unwrap();
        resolve_paths(&mut config, Path::new("/etc/beps"));

        assert_eq!(
            config.inputs.emissions.as_deref(),
            Some(Path::new("/etc/beps/data/emissions.csv"))
        );
        assert_eq!(
            config.inputs.timeline.as_deref(),
            Some(Path::new("/srv/beps/timeline.csv"))
        );
        assert_eq!(config.inputs.districts, None);
        assert_eq!(
            config.output.path.as_deref(),
            Some(Path::new("/etc/beps/out/projection.json"))
        );
    }

    #[test]
    fn rejects_wrong_types() {
        let err = parse_run_config("[horizon]\nstart_year = \"soon\"\n").unwrap_err();
        assert!(matches!(err, IngestError::Toml(_)));
    }

    #[test]
    fn projector_requires_every_input() {
        let config = parse_run_config("[inputs]\nemissions = \"e.csv\"\n").unwrap();
        assert!(matches!(
            load_projector(&config),
            Err(IngestError::MissingInput { name: "timeline" })
        ));
    }
}
