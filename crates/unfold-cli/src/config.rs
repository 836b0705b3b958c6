use crate::cli::{BuildArgs, ReconstructArgs};
use crate::error::{CliError, Result};
use molunfold::engine::config as core_config;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

const DEFAULT_M: usize = 1;
const DEFAULT_D: usize = 8;
const DEFAULT_A: f64 = 300.0;
const DEFAULT_HQ: f64 = 200.0;

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialBuildConfig {
    m: Option<Vec<usize>>,
    d: Option<Vec<usize>>,
    a: Option<Vec<f64>>,
    hq: Option<Vec<f64>>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialReconstructionConfig {
    max_candidates: Option<usize>,
    check_clashes: Option<bool>,
    clash_scale: Option<f64>,
}

/// The TOML configuration file, every section optional.
///
/// ```toml
/// [build]
/// m = [1, 2]
/// d = [8]
/// a = [300.0]
/// hq = [200.0]
///
/// [reconstruction]
/// max-candidates = 100
/// check-clashes = true
/// clash-scale = 1.0
/// ```
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialConfig {
    build: Option<PartialBuildConfig>,
    reconstruction: Option<PartialReconstructionConfig>,
}

impl PartialConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::parsing(path, e))
    }

    /// Loads `path` when given, otherwise starts from an empty configuration.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::from_file)
    }

    /// Resolves the parameter grid: CLI values win over `-S` values, which win
    /// over the file, which wins over the defaults.
    pub fn merge_build(mut self, args: &BuildArgs) -> Result<core_config::BuildConfig> {
        self.apply_set_values(&args.set_values)?;
        let file = self.build.take().unwrap_or_default();

        let pick = |cli: &Vec<usize>, file: Option<Vec<usize>>, default: usize| {
            if cli.is_empty() {
                file.unwrap_or_else(|| vec![default])
            } else {
                cli.clone()
            }
        };
        let pick_f64 = |cli: &Vec<f64>, file: Option<Vec<f64>>, default: f64| {
            if cli.is_empty() {
                file.unwrap_or_else(|| vec![default])
            } else {
                cli.clone()
            }
        };

        core_config::BuildConfigBuilder::new()
            .m_values(pick(&args.m_values, file.m, DEFAULT_M))
            .d_values(pick(&args.d_values, file.d, DEFAULT_D))
            .a_values(pick_f64(&args.a_values, file.a, DEFAULT_A))
            .hq_values(pick_f64(&args.hq_values, file.hq, DEFAULT_HQ))
            .build()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    pub fn merge_reconstruction(
        mut self,
        args: &ReconstructArgs,
    ) -> Result<core_config::ReconstructionConfig> {
        self.apply_set_values(&args.set_values)?;
        let file = self.reconstruction.take().unwrap_or_default();

        let mut builder = core_config::ReconstructionConfigBuilder::new();
        if let Some(n) = args.max_candidates.or(file.max_candidates) {
            builder = builder.max_candidates(n);
        }
        if args.no_clash_check {
            builder = builder.check_clashes(false);
        } else if let Some(enabled) = file.check_clashes {
            builder = builder.check_clashes(enabled);
        }
        if let Some(scale) = args.clash_scale.or(file.clash_scale) {
            builder = builder.clash_scale(scale);
        }
        builder.build().map_err(|e| CliError::Config(e.to_string()))
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };

            match key {
                "build.m" => self.build_section().m = Some(parse_list(key, value_str)?),
                "build.d" => self.build_section().d = Some(parse_list(key, value_str)?),
                "build.a" => self.build_section().a = Some(parse_list(key, value_str)?),
                "build.hq" => self.build_section().hq = Some(parse_list(key, value_str)?),
                "reconstruction.max-candidates" => {
                    self.reconstruction_section().max_candidates = Some(parse_value(key, value_str)?)
                }
                "reconstruction.check-clashes" => {
                    self.reconstruction_section().check_clashes = Some(parse_value(key, value_str)?)
                }
                "reconstruction.clash-scale" => {
                    self.reconstruction_section().clash_scale = Some(parse_value(key, value_str)?)
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }

    fn build_section(&mut self) -> &mut PartialBuildConfig {
        self.build.get_or_insert_with(Default::default)
    }

    fn reconstruction_section(&mut self) -> &mut PartialReconstructionConfig {
        self.reconstruction.get_or_insert_with(Default::default)
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        CliError::Config(format!("Invalid value for {}: {}", key, value))
    })
}

fn parse_list<T: FromStr>(key: &str, value: &str) -> Result<Vec<T>> {
    value.split(',').map(|item| parse_value(key, item)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn build_args(extra: &[&str]) -> BuildArgs {
        let mut args = vec!["unfold", "build", "-i", "mol.mol2", "-o", "out"];
        args.extend_from_slice(extra);
        match Cli::parse_from(args).command {
            Commands::Build(args) => args,
            _ => panic!("Expected 'build' subcommand"),
        }
    }

    fn reconstruct_args(extra: &[&str]) -> ReconstructArgs {
        let mut args = vec![
            "unfold", "reconstruct", "-i", "mol.mol2", "--model", "m.json", "-s", "s.csv", "-o",
            "out.mol2",
        ];
        args.extend_from_slice(extra);
        match Cli::parse_from(args).command {
            Commands::Reconstruct(args) => args,
            _ => panic!("Expected 'reconstruct' subcommand"),
        }
    }

    fn write_config(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join("unfold.toml");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn defaults_apply_without_a_config_file() {
        let config = PartialConfig::default().merge_build(&build_args(&[])).unwrap();
        assert_eq!(config.m_values, vec![1]);
        assert_eq!(config.d_values, vec![8]);
        assert_eq!(config.a_values, vec![300.0]);
        assert_eq!(config.hq_values, vec![200.0]);
    }

    #[test]
    fn file_values_are_overridden_by_set_and_cli() {
        let dir = tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"
            [build]
            m = [1, 2]
            d = [4]
            hq = [150.0]
            "#,
        );

        let partial = PartialConfig::from_file(&path).unwrap();
        let config = partial
            .merge_build(&build_args(&["-d", "6", "-S", "build.m=3,4"]))
            .unwrap();

        assert_eq!(config.m_values, vec![3, 4]);
        assert_eq!(config.d_values, vec![6]);
        assert_eq!(config.a_values, vec![300.0]);
        assert_eq!(config.hq_values, vec![150.0]);
    }

    #[test]
    fn unknown_file_keys_are_rejected() {
        let dir = tempdir().unwrap();
        let path = write_config(dir.path(), "[build]\nsteps = [8]\n");
        assert!(matches!(
            PartialConfig::from_file(&path),
            Err(CliError::FileParsing { .. })
        ));
    }

    #[test]
    fn invalid_grid_values_are_config_errors() {
        let result = PartialConfig::default().merge_build(&build_args(&["-d", "0"]));
        assert!(matches!(result, Err(CliError::Config(_))));

        let result = PartialConfig::default().merge_build(&build_args(&["-S", "build.a=abc"]));
        assert!(matches!(result, Err(CliError::Config(_))));

        let result = PartialConfig::default().merge_build(&build_args(&["-S", "build.x=1"]));
        assert!(matches!(result, Err(CliError::Config(msg)) if msg.contains("build.x")));
    }

    #[test]
    fn reconstruction_options_merge_in_order() {
        let dir = tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"
            [reconstruction]
            max-candidates = 20
            check-clashes = true
            clash-scale = 0.8
            "#,
        );

        let partial = PartialConfig::from_file(&path).unwrap();
        let config = partial
            .merge_reconstruction(&reconstruct_args(&[
                "--no-clash-check",
                "-S",
                "reconstruction.clash-scale=0.5",
            ]))
            .unwrap();

        assert_eq!(config.max_candidates, 20);
        assert!(!config.check_clashes);
        assert_eq!(config.clash_scale, 0.5);
    }

    #[test]
    fn reconstruction_defaults_without_overrides() {
        let config = PartialConfig::default()
            .merge_reconstruction(&reconstruct_args(&[]))
            .unwrap();
        assert_eq!(config, core_config::ReconstructionConfig::default());
    }
}
