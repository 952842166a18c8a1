//! Command implementations shared by the subcommands and the interactive
//! menu. Each takes a fully resolved [`RunConfig`].

use std::io::Write as _;
use std::path::Path;

use beps_district::DistrictIndex;
use beps_export::ExportFormat;
use beps_ingest::{load_buildings, load_projector};
use beps_ingest_models::{OutputConfig, RunConfig};
use beps_owners::{
    RegistryClient, group_companies_by_principals, read_business_refs, read_principal_rows,
};
use beps_projection::summarize_by_year;
use serde::Serialize;

/// Parses a comma-separated list of years, ignoring blanks.
///
/// # Errors
///
/// Returns an error if any entry is not an integer.
pub fn parse_fine_years(input: &str) -> Result<Vec<i32>, std::num::ParseIntError> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect()
}

/// The projection horizon, which must be fully specified.
fn horizon(config: &RunConfig) -> Result<(i32, i32), Box<dyn std::error::Error>> {
    let start = config
        .horizon
        .start_year
        .ok_or("No start year configured (use --start-year or [horizon] start_year)")?;
    let end = config
        .horizon
        .end_year
        .ok_or("No end year configured (use --end-year or [horizon] end_year)")?;
    Ok((start, end))
}

/// Explicit format, else the output path's extension, else CSV.
///
/// # Errors
///
/// Returns an error if an explicit format is not recognized.
pub fn output_format(output: &OutputConfig) -> Result<ExportFormat, Box<dyn std::error::Error>> {
    if let Some(format) = &output.format {
        return format
            .parse::<ExportFormat>()
            .map_err(|_| format!("Unknown output format: {format}").into());
    }

    Ok(output
        .path
        .as_deref()
        .and_then(ExportFormat::from_path)
        .unwrap_or_default())
}

fn write_rows<T: Serialize>(
    rows: &[T],
    output: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let format = output_format(output)?;

    match output.path.as_deref() {
        Some(path) => format.write_file(rows, path)?,
        None => {
            let mut stdout = std::io::stdout().lock();
            format.write(rows, &mut stdout)?;
            stdout.flush()?;
        }
    }

    Ok(())
}

/// Runs the baseline projection and writes one row per building per year.
///
/// # Errors
///
/// Returns an error if inputs are missing or invalid, the projection fails,
/// or the output cannot be written.
pub fn project(config: &RunConfig) -> Result<(), Box<dyn std::error::Error>> {
    let (start, end) = horizon(config)?;
    let projector = load_projector(config)?;
    let rows = projector.project(start, end)?;
    write_rows(&rows, &config.output)
}

/// Runs the baseline projection and writes one summary row per year.
///
/// # Errors
///
/// Same as [`project`].
pub fn summary(config: &RunConfig) -> Result<(), Box<dyn std::error::Error>> {
    let (start, end) = horizon(config)?;
    let projector = load_projector(config)?;
    let rows = projector.project(start, end)?;
    let summaries = summarize_by_year(&rows);

    for s in &summaries {
        log::info!(
            "{}: {} compliant, {} non-compliant, {} not due, fees {:.2}",
            s.year,
            s.compliant,
            s.non_compliant,
            s.not_due_yet,
            s.total_fees
        );
    }

    write_rows(&summaries, &config.output)
}

/// Assigns every building to a council district and writes the result.
///
/// # Errors
///
/// Returns an error if the building or boundary inputs are missing or
/// invalid, or the output cannot be written.
pub fn districts(config: &RunConfig, property: &str) -> Result<(), Box<dyn std::error::Error>> {
    let buildings_path = config
        .inputs
        .buildings
        .as_deref()
        .ok_or("No buildings input configured")?;
    let districts_path = config
        .inputs
        .districts
        .as_deref()
        .ok_or("No districts input configured")?;

    let buildings = load_buildings(buildings_path)?;
    let index = DistrictIndex::from_path(districts_path, property)?.with_known_overrides();
    let assignments = index.assign_all(&buildings);

    let unplaced = assignments.iter().filter(|a| a.district.is_none()).count();
    log::info!(
        "Assigned {} of {} buildings to districts",
        assignments.len() - unplaced,
        assignments.len()
    );

    write_rows(&assignments, &config.output)
}

/// Options for registry lookups.
#[derive(Debug, Clone, Default)]
pub struct RegistryOptions {
    /// Alternative registry host.
    pub base_url: Option<String>,
    /// Pause between requests, in milliseconds.
    pub delay_ms: Option<u64>,
}

/// Looks up the registered principals of every business listed in
/// `businesses` and writes one row per (business, principal).
///
/// # Errors
///
/// Returns an error if the business list cannot be read, a registry lookup
/// fails, or the output cannot be written.
pub async fn principals(
    businesses: &Path,
    registry: &RegistryOptions,
    output: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let refs = read_business_refs(businesses)?;

    let mut client = RegistryClient::new()?;
    if let Some(url) = &registry.base_url {
        client = client.with_base_url(url);
    }
    if let Some(ms) = registry.delay_ms {
        client = client.with_delay_ms(ms);
    }

    let rows = client.principals_for(&refs).await?;
    write_rows(&rows, output)
}

/// Groups the businesses in a principal table by shared principals and
/// writes the related-company review sheet.
///
/// # Errors
///
/// Returns an error if the principal table cannot be read or the output
/// cannot be written.
pub fn related_companies(
    principals: &Path,
    output: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let rows = read_principal_rows(principals)?;
    let related = group_companies_by_principals(&rows);
    write_rows(&related, output)
}

/// Reads a run file if one is given, otherwise starts from an empty
/// configuration.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn base_config(path: Option<&Path>) -> Result<RunConfig, beps_ingest::IngestError> {
    path.map_or_else(|| Ok(RunConfig::default()), beps_ingest::load_run_config)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    const EMISSIONS: &str = "\
Year,Electricity emission factor (kgCO2e/kBtu),Steam emission factor (kgCO2e/kBtu),Gas emission factor (kgCO2e/kBtu)
2029,0.0005,0.066,0.053
2030,0.0005,0.066,0.053
";

    const TIMELINE: &str = "\
year,sq_ft_classification,building_type,ghgi
2029,\"20,001-50,000\",Office,
2030,\"20,001-50,000\",Office,0.0002
";

    const BUILDINGS: &str = "\
OSEBuildingID,BuildingName,Total_sqft,sq_ft_classification,Electricity(kBtu),Steam(kBtu),NaturalGas(kBtu),LargestPropertyUseType OSE,SecondLargestPropertyUseType OSE,ThirdLargestPropertyUseType OSE,percent_sqft_1st,percent_sqft_2nd,percent_sqft_3rd,Latitude,Longitude
1,Pike Office,40000,\"20,001-50,000\",500,,0,Office,,,1.0,,,0.5,0.5
2,Pine Office,30000,\"20,001-50,000\",100,,0,Office,,,1.0,,,5.0,5.0
";

    const DISTRICTS: &str = r#"{
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": { "C_DISTRICT": 7 },
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]]
            }
        }]
    }"#;

    const RUN: &str = r#"
[inputs]
emissions = "emissions.csv"
timeline = "timeline.csv"
buildings = "buildings.csv"
districts = "districts.geojson"

[policy]
fine_years = [2030]
fine_per_sqft = 1.5

[horizon]
start_year = 2029
end_year = 2030
"#;

    /// Writes the input tables and a run file into a fresh directory.
    fn workspace(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("beps_cli_{name}_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("emissions.csv"), EMISSIONS).unwrap();
        std::fs::write(dir.join("timeline.csv"), TIMELINE).unwrap();
        std::fs::write(dir.join("buildings.csv"), BUILDINGS).unwrap();
        std::fs::write(dir.join("districts.geojson"), DISTRICTS).unwrap();
        std::fs::write(dir.join("run.toml"), RUN).unwrap();
        dir
    }

    fn config_with_output(dir: &Path, output: &str) -> RunConfig {
        let mut config = base_config(Some(&dir.join("run.toml"))).unwrap();
        config.output.path = Some(dir.join(output));
        config
    }

    #[test]
    fn project_writes_one_row_per_building_per_year() {
        let dir = workspace("project");
        let config = config_with_output(&dir, "out/rows.csv");

        project(&config).unwrap();

        let out = std::fs::read_to_string(dir.join("out/rows.csv")).unwrap();
        let mut lines = out.lines();
        assert_eq!(
            lines.next(),
            Some(
                "building_id,building_name,total_sqft,size_class,year,expected_baseline_emissions,\
expected_baseline_ghgi,city_ghgi_target,compliant_ghgi,compliant_emissions,compliance_status,\
compliance_fees"
            )
        );
        let rows: Vec<&str> = lines.collect();
        assert_eq!(rows.len(), 4);
        assert!(rows[0].starts_with("1,Pike Office,"));
        assert!(rows[0].contains("Not due yet"));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn project_honors_json_extension() {
        let dir = workspace("project_json");
        let config = config_with_output(&dir, "rows.json");

        project(&config).unwrap();

        let out = std::fs::read_to_string(dir.join("rows.json")).unwrap();
        let rows: Vec<serde_json::Value> = serde_json::from_str(&out).unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[3]["year"], 2030);
        assert_eq!(rows[3]["building_id"], "2");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn summary_writes_one_row_per_year() {
        let dir = workspace("summary");
        let config = config_with_output(&dir, "summary.csv");

        summary(&config).unwrap();

        let out = std::fs::read_to_string(dir.join("summary.csv")).unwrap();
        let mut lines = out.lines();
        assert!(
            lines
                .next()
                .unwrap()
                .starts_with("year,buildings,compliant,non_compliant,not_due_yet,")
        );
        let rows: Vec<&str> = lines.collect();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].starts_with("2029,2,0,0,2,"));
        assert!(rows[1].starts_with("2030,2,"));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_horizon_is_reported_before_loading() {
        let dir = workspace("horizon");
        let mut config = config_with_output(&dir, "rows.csv");
        config.horizon.end_year = None;

        let err = project(&config).unwrap_err();
        assert!(err.to_string().contains("end year"));
        assert!(!dir.join("rows.csv").exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_emission_factor_year_fails_the_run() {
        let dir = workspace("uncovered");
        let mut config = config_with_output(&dir, "rows.csv");
        config.horizon.end_year = Some(2031);

        assert!(project(&config).is_err());
        assert!(!dir.join("rows.csv").exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn districts_assigns_by_coordinates() {
        let dir = workspace("districts");
        let config = config_with_output(&dir, "districts.csv");

        districts(&config, beps_district::DEFAULT_DISTRICT_PROPERTY).unwrap();

        let out = std::fs::read_to_string(dir.join("districts.csv")).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "building_id,building_name,district");
        assert_eq!(lines[1], "1,Pike Office,7");
        assert_eq!(lines[2], "2,Pine Office,");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn related_companies_reads_principal_table() {
        let dir = workspace("related");
        std::fs::write(
            dir.join("principals.csv"),
            "\
SearchTerm,UBINumber,BusinessId,BusinessName,Agent,EntityType,PrincipalID,PrincipalName,Address,Status
HARBOR,601,1,HARBOR PROPERTIES LLC,,Individual,9,JANE DOE,,ACTIVE
,602,2,PIER 9 LLC,,Individual,9,JANE DOE,,ACTIVE
",
        )
        .unwrap();
        let output = OutputConfig {
            path: Some(dir.join("related.csv")),
            format: None,
        };

        related_companies(&dir.join("principals.csv"), &output).unwrap();

        let out = std::fs::read_to_string(dir.join("related.csv")).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].starts_with("SearchTerm,BusinessName,PotentialRelatedCompany,UBINumber"));
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().any(|l| l.starts_with("HARBOR,HARBOR PROPERTIES LLC,PIER 9 LLC,602")));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
