use crate::cli::AnnealArgs;
use crate::error::{CliError, Result};
use cellforge::engine::monte_carlo::{ExternalEnergyModel, McConfig};
use cellforge::workflows::anneal::AnnealSpec;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct AnnealFile {
    pub template: PathBuf,
    #[serde(rename = "pool-species")]
    pub pool_species: String,
    pub assignments: Vec<FileAssignment>,
    #[serde(rename = "monte-carlo")]
    pub monte_carlo: FileMcConfig,
    /// Independent chains per session; one output file each.
    #[serde(default = "default_runs")]
    pub runs: usize,
    pub seed: Option<u64>,
    pub calculator: FileCalculator,
    pub output: PathBuf,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileAssignment {
    pub species: String,
    pub count: usize,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileMcConfig {
    #[serde(rename = "temperature-k")]
    pub temperature_k: f64,
    pub steps: usize,
    #[serde(rename = "initial-energy")]
    pub initial_energy: f64,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileCalculator {
    pub program: PathBuf,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default = "default_workdir")]
    pub workdir: PathBuf,
    #[serde(rename = "input-path")]
    pub input_path: PathBuf,
    #[serde(rename = "output-path")]
    pub output_path: PathBuf,
    #[serde(rename = "energy-marker")]
    pub energy_marker: String,
    #[serde(rename = "energy-field")]
    pub energy_field: usize,
}

fn default_workdir() -> PathBuf {
    PathBuf::from(".")
}

fn default_runs() -> usize {
    1
}

impl AnnealFile {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CliError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let parsed: AnnealFile = toml::from_str(&content).map_err(|e| CliError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        debug!(?parsed, "annealing configuration loaded");
        Ok(parsed)
    }

    /// Builds the final spec, letting CLI arguments override the file.
    pub fn into_spec(self, args: &AnnealArgs) -> AnnealSpec {
        AnnealSpec {
            template: self.template,
            pool_species: self.pool_species,
            assignments: self
                .assignments
                .into_iter()
                .map(|a| (a.species, a.count))
                .collect(),
            monte_carlo: McConfig {
                temperature_k: args.temperature.unwrap_or(self.monte_carlo.temperature_k),
                steps: args.steps.unwrap_or(self.monte_carlo.steps),
                initial_energy: self.monte_carlo.initial_energy,
            },
            runs: args.runs.unwrap_or(self.runs),
            seed: args.seed.or(self.seed),
            calculator: ExternalEnergyModel {
                program: self.calculator.program,
                args: self.calculator.args,
                workdir: self.calculator.workdir,
                input_path: self.calculator.input_path,
                output_path: self.calculator.output_path,
                energy_marker: self.calculator.energy_marker,
                energy_field: self.calculator.energy_field,
            },
            output: self.output,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
template = "pristine.vasp"
pool-species = "Li"
output = "annealed.vasp"
seed = 42

[[assignments]]
species = "Li"
count = 14

[[assignments]]
species = "Mn"
count = 2

[monte-carlo]
temperature-k = 300.0
steps = 5000
initial-energy = -90.0

[calculator]
program = "gulp-wrapper"
args = ["--qeq"]
input-path = "candidate.vasp"
output-path = "calc.out"
energy-marker = "Total lattice energy"
energy-field = 4
"#;

    fn no_overrides() -> AnnealArgs {
        AnnealArgs {
            config: PathBuf::from("unused.toml"),
            steps: None,
            runs: None,
            temperature: None,
            seed: None,
        }
    }

    #[test]
    fn parses_a_complete_config() {
        let parsed: AnnealFile = toml::from_str(SAMPLE).unwrap();
        let spec = parsed.into_spec(&no_overrides());
        assert_eq!(spec.pool_species, "Li");
        assert_eq!(
            spec.assignments,
            vec![("Li".to_string(), 14), ("Mn".to_string(), 2)]
        );
        assert_eq!(spec.monte_carlo.steps, 5000);
        // `runs` is optional and defaults to a single chain.
        assert_eq!(spec.runs, 1);
        assert_eq!(spec.seed, Some(42));
        assert_eq!(spec.calculator.energy_field, 4);
        // workdir falls back to the current directory marker
        assert_eq!(spec.calculator.workdir, PathBuf::from("."));
    }

    #[test]
    fn cli_arguments_override_the_file() {
        let parsed: AnnealFile = toml::from_str(SAMPLE).unwrap();
        let mut args = no_overrides();
        args.steps = Some(10);
        args.runs = Some(20);
        args.temperature = Some(600.0);
        args.seed = Some(7);
        let spec = parsed.into_spec(&args);
        assert_eq!(spec.monte_carlo.steps, 10);
        assert_eq!(spec.runs, 20);
        assert_eq!(spec.monte_carlo.temperature_k, 600.0);
        assert_eq!(spec.seed, Some(7));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let text = format!("{SAMPLE}\nunexpected = true\n");
        assert!(toml::from_str::<AnnealFile>(&text).is_err());
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = AnnealFile::from_file(Path::new("/does/not/exist.toml")).unwrap_err();
        assert!(matches!(err, CliError::Config { .. }));
    }
}
