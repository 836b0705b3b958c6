use itertools::iproduct;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

fn invalid(name: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidParameter {
        name,
        reason: reason.into(),
    }
}

/// Parameters of one energy model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelParams {
    /// Target complexity: the number of top-ranked rotatable bonds considered.
    pub m: usize,
    /// Number of discretised angles per bond.
    pub d: usize,
    /// One-hot constraint strength.
    pub a: f64,
    /// Quadratization penalty strength.
    pub hq: f64,
}

impl ModelParams {
    pub fn new(m: usize, d: usize, a: f64, hq: f64) -> Self {
        Self { m, d, a, hq }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.m == 0 {
            return Err(invalid("m", "must be at least 1"));
        }
        if self.d == 0 {
            return Err(invalid("d", "must be at least 1"));
        }
        if !(self.a.is_finite() && self.a > 0.0) {
            return Err(invalid("a", format!("must be a positive number, got {}", self.a)));
        }
        if !(self.hq.is_finite() && self.hq > 0.0) {
            return Err(invalid("hq", format!("must be a positive number, got {}", self.hq)));
        }
        Ok(())
    }

    /// The same parameters with `m` replaced, used once `m` has been clamped.
    pub fn with_m(self, m: usize) -> Self {
        Self { m, ..self }
    }

    pub fn key(&self) -> ModelKey {
        ModelKey {
            m: self.m,
            d: self.d,
            a_bits: self.a.to_bits(),
            hq_bits: self.hq.to_bits(),
        }
    }
}

impl fmt::Display for ModelParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "M={}, D={}, A={}, HQ={}", self.m, self.d, self.a, self.hq)
    }
}

/// Identity of a model in the cache.
///
/// Floating-point parameters are compared by bit pattern, so `300.0` and
/// `300.0000001` are different models and no string formatting is involved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelKey {
    m: usize,
    d: usize,
    a_bits: u64,
    hq_bits: u64,
}

impl ModelKey {
    pub fn params(&self) -> ModelParams {
        ModelParams {
            m: self.m,
            d: self.d,
            a: f64::from_bits(self.a_bits),
            hq: f64::from_bits(self.hq_bits),
        }
    }
}

impl fmt::Display for ModelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.params().fmt(f)
    }
}

/// A grid of model parameters; one model is built per combination.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildConfig {
    pub m_values: Vec<usize>,
    pub d_values: Vec<usize>,
    pub a_values: Vec<f64>,
    pub hq_values: Vec<f64>,
}

impl BuildConfig {
    /// All parameter combinations, M-major, in the order the values were given.
    pub fn param_grid(&self) -> Vec<ModelParams> {
        iproduct!(
            self.m_values.iter(),
            self.d_values.iter(),
            self.a_values.iter(),
            self.hq_values.iter()
        )
        .map(|(&m, &d, &a, &hq)| ModelParams::new(m, d, a, hq))
        .collect()
    }

    pub fn max_m(&self) -> usize {
        self.m_values.iter().copied().max().unwrap_or(0)
    }
}

#[derive(Default)]
pub struct BuildConfigBuilder {
    m_values: Option<Vec<usize>>,
    d_values: Option<Vec<usize>>,
    a_values: Option<Vec<f64>>,
    hq_values: Option<Vec<f64>>,
}

impl BuildConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn m_values(mut self, values: Vec<usize>) -> Self {
        self.m_values = Some(values);
        self
    }
    pub fn d_values(mut self, values: Vec<usize>) -> Self {
        self.d_values = Some(values);
        self
    }
    pub fn a_values(mut self, values: Vec<f64>) -> Self {
        self.a_values = Some(values);
        self
    }
    pub fn hq_values(mut self, values: Vec<f64>) -> Self {
        self.hq_values = Some(values);
        self
    }

    pub fn build(self) -> Result<BuildConfig, ConfigError> {
        let config = BuildConfig {
            m_values: self
                .m_values
                .ok_or(ConfigError::MissingParameter("m_values"))?,
            d_values: self
                .d_values
                .ok_or(ConfigError::MissingParameter("d_values"))?,
            a_values: self
                .a_values
                .ok_or(ConfigError::MissingParameter("a_values"))?,
            hq_values: self
                .hq_values
                .ok_or(ConfigError::MissingParameter("hq_values"))?,
        };

        for (name, empty) in [
            ("m_values", config.m_values.is_empty()),
            ("d_values", config.d_values.is_empty()),
            ("a_values", config.a_values.is_empty()),
            ("hq_values", config.hq_values.is_empty()),
        ] {
            if empty {
                return Err(invalid(name, "at least one value is required"));
            }
        }
        for params in config.param_grid() {
            params.validate()?;
        }
        Ok(config)
    }
}

/// Options for turning solver samples back into a conformation.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconstructionConfig {
    /// How many of the lowest-energy samples are inspected.
    pub max_candidates: usize,
    /// Whether candidates with steric clashes are rejected.
    pub check_clashes: bool,
    /// Atoms clash when closer than `clash_scale * (r_i + r_j)`.
    pub clash_scale: f64,
}

impl Default for ReconstructionConfig {
    fn default() -> Self {
        Self {
            max_candidates: 100,
            check_clashes: true,
            clash_scale: 1.0,
        }
    }
}

#[derive(Default)]
pub struct ReconstructionConfigBuilder {
    max_candidates: Option<usize>,
    check_clashes: Option<bool>,
    clash_scale: Option<f64>,
}

impl ReconstructionConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_candidates(mut self, n: usize) -> Self {
        self.max_candidates = Some(n);
        self
    }
    pub fn check_clashes(mut self, enabled: bool) -> Self {
        self.check_clashes = Some(enabled);
        self
    }
    pub fn clash_scale(mut self, scale: f64) -> Self {
        self.clash_scale = Some(scale);
        self
    }

    /// Builds the configuration; unset options take their defaults.
    pub fn build(self) -> Result<ReconstructionConfig, ConfigError> {
        let defaults = ReconstructionConfig::default();
        let config = ReconstructionConfig {
            max_candidates: self.max_candidates.unwrap_or(defaults.max_candidates),
            check_clashes: self.check_clashes.unwrap_or(defaults.check_clashes),
            clash_scale: self.clash_scale.unwrap_or(defaults.clash_scale),
        };
        if config.max_candidates == 0 {
            return Err(invalid("max_candidates", "must be at least 1"));
        }
        if !(config.clash_scale.is_finite() && config.clash_scale >= 0.0) {
            return Err(invalid(
                "clash_scale",
                format!("must be a non-negative number, got {}", config.clash_scale),
            ));
        }
        Ok(config)
    }
}
