use std::fmt;
use std::str::FromStr;

use serde_derive::Serialize;

use crate::error::{PlsaError, Result};

pub const DEFAULT_CONVERGENCE_THRESHOLD: f64 = 0.1;
pub const DEFAULT_TOP_N_WORDS: usize = 10;

/// Scalar tracked between iterations to decide when fitting stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConvergenceMetric {
    /// `sum(C .* (WT x TD))`: counts weighted by the predicted word-document
    /// mass. Not a likelihood.
    WeightedAgreement,
    /// `sum(C .* ln(WT x TD))`.
    LogLikelihood,
}

impl Default for ConvergenceMetric {
    fn default() -> Self {
        ConvergenceMetric::WeightedAgreement
    }
}

impl FromStr for ConvergenceMetric {
    type Err = ParseMetricError;

    fn from_str(s: &str) -> std::result::Result<ConvergenceMetric, ParseMetricError> {
        match s {
            "weighted-agreement" => Ok(ConvergenceMetric::WeightedAgreement),
            "log-likelihood"     => Ok(ConvergenceMetric::LogLikelihood),
            _                    => Err(ParseMetricError(s.to_owned())),
        }
    }
}

impl fmt::Display for ConvergenceMetric {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ConvergenceMetric::WeightedAgreement => "weighted-agreement".fmt(f),
            ConvergenceMetric::LogLikelihood     => "log-likelihood".fmt(f),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseMetricError(String);

impl fmt::Display for ParseMetricError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "`{}` is not `weighted-agreement` or `log-likelihood`", self.0)
    }
}

impl std::error::Error for ParseMetricError {}

/// Fitting parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlsaConfig {
    /// Number of latent topics (K).
    pub topics_count: usize,
    /// Fitting stops once `|metric delta|` is at or below this value.
    pub convergence_threshold: f64,
    /// `None` keeps iterating until the threshold is met.
    pub max_iterations: Option<usize>,
    pub metric: ConvergenceMetric,
    /// Seed for the initialization draws; `None` seeds from entropy.
    pub seed: Option<u64>,
    /// Words per topic returned by `FittedModel::topics`.
    pub top_n_words: usize,
}

impl Default for PlsaConfig {
    fn default() -> Self {
        Self {
            topics_count: 2,
            convergence_threshold: DEFAULT_CONVERGENCE_THRESHOLD,
            max_iterations: None,
            metric: ConvergenceMetric::default(),
            seed: None,
            top_n_words: DEFAULT_TOP_N_WORDS,
        }
    }
}

impl PlsaConfig {
    pub fn new(topics_count: usize) -> Self {
        Self {
            topics_count,
            ..Default::default()
        }
    }

    pub fn convergence_threshold(mut self, threshold: f64) -> Self {
        self.convergence_threshold = threshold;
        self
    }

    pub fn max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = Some(n);
        self
    }

    pub fn metric(mut self, metric: ConvergenceMetric) -> Self {
        self.metric = metric;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn top_n_words(mut self, n: usize) -> Self {
        self.top_n_words = n;
        self
    }

    /// Checks the parameters that do not depend on the corpus.
    pub fn validate(&self) -> Result<()> {
        if self.topics_count == 0 {
            return Err(PlsaError::invalid("number of topics must be positive"));
        }
        if !self.convergence_threshold.is_finite() || self.convergence_threshold < 0.0 {
            return Err(PlsaError::invalid(format!(
                "convergence threshold must be a finite non-negative number, got {}",
                self.convergence_threshold
            )));
        }
        if self.max_iterations == Some(0) {
            return Err(PlsaError::invalid("maximum number of iterations must be positive"));
        }
        Ok(())
    }
}
