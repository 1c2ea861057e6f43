//! Expectation-maximization fitting of the pLSA model.
//!
//! The model factors the word-document count matrix `C` (V x D) through two
//! column-stochastic matrices: `WT` (V x K), holding P(word | topic), and
//! `TD` (K x D), holding P(topic | document).

use ndarray::{Array2, Axis, Zip};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::config::{ConvergenceMetric, PlsaConfig};
use crate::corpus::Corpus;
use crate::error::{PlsaError, Result};
use crate::matrix::{all_finite, normalize_columns, random_column_stochastic};
use crate::report::{self, Topic};
use crate::vocabulary::Vocabulary;

/// Receives progress notifications while a model is being fitted.
pub trait FitObserver {
    fn on_start(&mut self, _metric: f64) {}
    fn on_iteration(&mut self, _iteration: usize, _metric: f64, _delta: f64) {}
    fn on_finish(&mut self, _iterations: usize, _metric: f64) {}
}

/// Observer that ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl FitObserver for Silent {}

/// An initialized model that has not converged yet.
#[derive(Debug)]
pub struct EmEngine<'c> {
    vocabulary: &'c Vocabulary,
    config: PlsaConfig,
    counts: Array2<f64>,
    word_topic: Array2<f64>,
    topic_document: Array2<f64>,
    iterations: usize,
}

impl<'c> EmEngine<'c> {
    /// Validates the configuration against the corpus and draws the initial
    /// probability matrices from `rng`. Nothing is allocated if validation
    /// fails.
    pub fn new<R: Rng>(corpus: &'c Corpus, config: PlsaConfig, rng: &mut R) -> Result<EmEngine<'c>> {
        validate(corpus, &config)?;
        let num_topics = config.topics_count;
        let vocab_size = corpus.vocabulary().len();
        let num_docs = corpus.documents_count();
        info!(
            topics = num_topics,
            vocabulary = vocab_size,
            documents = num_docs,
            dense_cells = vocab_size * num_docs + vocab_size * num_topics + num_topics * num_docs,
            "Initializing pLSA model"
        );

        let counts = corpus.count_matrix();
        let word_topic = random_column_stochastic(vocab_size, num_topics, "word-topic", rng)?;
        let topic_document = random_column_stochastic(num_topics, num_docs, "topic-document", rng)?;

        Ok(EmEngine {
            vocabulary: corpus.vocabulary(),
            config: config,
            counts: counts,
            word_topic: word_topic,
            topic_document: topic_document,
            iterations: 0,
        })
    }

    pub fn config(&self) -> &PlsaConfig {
        &self.config
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    // WT: VxK matrix
    pub fn word_topic(&self) -> &Array2<f64> {
        &self.word_topic
    }

    // TD: KxD matrix
    pub fn topic_document(&self) -> &Array2<f64> {
        &self.topic_document
    }

    // VxD matrix
    fn predicted(&self) -> Result<Array2<f64>> {
        let predicted = self.word_topic.dot(&self.topic_document);
        if !all_finite(&predicted) {
            return Err(self.instability("predicted"));
        }
        Ok(predicted)
    }

    fn instability(&self, stage: &'static str) -> PlsaError {
        PlsaError::NumericalInstability {
            stage: stage,
            iteration: self.iterations,
        }
    }

    /// Evaluates the configured convergence metric for the current parameters.
    pub fn metric(&self) -> Result<f64> {
        let predicted = self.predicted()?;
        let cells = self.counts.iter().zip(predicted.iter());
        let metric = match self.config.metric {
            ConvergenceMetric::WeightedAgreement => {
                cells.map(|(&c, &p)| c * p).sum::<f64>()
            }
            ConvergenceMetric::LogLikelihood => {
                cells.filter(|&(&c, _)| c > 0.0).map(|(&c, &p)| c * f64::ln(p)).sum::<f64>()
            }
        };
        if !metric.is_finite() {
            return Err(self.instability("metric"));
        }
        Ok(metric)
    }

    /// Runs one E-step and M-step.
    ///
    /// Both updated matrices are computed from the current ones before
    /// either is replaced.
    pub fn step(&mut self) -> Result<()> {
        let predicted = self.predicted()?;

        // ratio[w,d] = C[w,d] / predicted[w,d]; cells without counts contribute nothing
        let mut ratio = Array2::<f64>::zeros(predicted.dim());
        Zip::from(&mut ratio)
            .and(&self.counts)
            .and(&predicted)
            .for_each(|r, &c, &p| {
                if c > 0.0 {
                    *r = c / p;
                }
            });
        if !all_finite(&ratio) {
            return Err(self.instability("predicted"));
        }

        // Expected counts per (word, topic): WT[w,k] * sum_d ratio[w,d] * TD[k,d]
        let word_topic_means = &self.word_topic * &ratio.dot(&self.topic_document.t());
        // Expected counts per (topic, document): TD[k,d] * sum_w WT[w,k] * ratio[w,d]
        let topic_document_means = &self.topic_document * &self.word_topic.t().dot(&ratio);

        let word_topic = normalize_columns(word_topic_means);
        if !all_finite(&word_topic) {
            return Err(self.instability("word-topic"));
        }
        let topic_document = normalize_columns(topic_document_means);
        if !all_finite(&topic_document) {
            return Err(self.instability("topic-document"));
        }

        self.word_topic = word_topic;
        self.topic_document = topic_document;
        self.iterations += 1;
        Ok(())
    }

    /// Iterates until the metric changes by no more than the convergence
    /// threshold between two iterations.
    ///
    /// At least one iteration always runs. With `max_iterations` set, reaching
    /// the bound first yields `PlsaError::NonConvergence`. Without it the loop
    /// has no upper bound, and the metric history kept for the fitted model
    /// grows by one value per iteration.
    pub fn fit<O: FitObserver + ?Sized>(mut self, observer: &mut O) -> Result<FittedModel<'c>> {
        let threshold = self.config.convergence_threshold;
        let mut old_metric = self.metric()?;
        info!(metric = old_metric, kind = %self.config.metric, "Fitting pLSA model");
        observer.on_start(old_metric);

        let mut history = vec![old_metric];
        loop {
            self.step()?;
            let new_metric = self.metric()?;
            let delta = new_metric - old_metric;
            old_metric = new_metric;
            history.push(new_metric);

            debug!(iteration = self.iterations, metric = new_metric, delta = delta, "EM iteration");
            observer.on_iteration(self.iterations, new_metric, delta);

            if delta.abs() <= threshold {
                break;
            }
            if let Some(max) = self.config.max_iterations {
                if self.iterations >= max {
                    warn!(iterations = self.iterations, delta = delta, "pLSA fitting did not converge");
                    return Err(PlsaError::NonConvergence {
                        iterations: self.iterations,
                        last_delta: delta,
                    });
                }
            }
        }

        info!(iterations = self.iterations, metric = old_metric, "pLSA model converged");
        observer.on_finish(self.iterations, old_metric);

        Ok(FittedModel {
            vocabulary: self.vocabulary,
            word_topic: self.word_topic,
            topic_document: self.topic_document,
            iterations: self.iterations,
            metric_history: history,
            top_n_words: self.config.top_n_words,
        })
    }
}

fn validate(corpus: &Corpus, config: &PlsaConfig) -> Result<()> {
    config.validate()?;
    if corpus.documents_count() == 0 {
        return Err(PlsaError::invalid("corpus has no documents"));
    }
    let vocab_size = corpus.vocabulary().len();
    if vocab_size == 0 {
        return Err(PlsaError::invalid("corpus vocabulary is empty"));
    }
    if config.topics_count > vocab_size {
        return Err(PlsaError::invalid(format!(
            "{} topics requested but the vocabulary has only {} words",
            config.topics_count, vocab_size
        )));
    }
    if let Some(d) = (0..corpus.documents_count()).find(|&d| corpus.document_length(d) == 0) {
        return Err(PlsaError::invalid(format!("document {} has no tokens", d)));
    }
    Ok(())
}

/// A converged model. Its matrices are no longer modified.
#[derive(Debug, Clone)]
pub struct FittedModel<'c> {
    vocabulary: &'c Vocabulary,
    word_topic: Array2<f64>,
    topic_document: Array2<f64>,
    iterations: usize,
    metric_history: Vec<f64>,
    top_n_words: usize,
}

impl<'c> FittedModel<'c> {
    // WT: VxK matrix
    pub fn word_topic(&self) -> &Array2<f64> {
        &self.word_topic
    }

    // TD: KxD matrix
    pub fn topic_document(&self) -> &Array2<f64> {
        &self.topic_document
    }

    pub fn topics_count(&self) -> usize {
        self.word_topic.ncols()
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Metric value before the first iteration followed by one value per
    /// iteration. Its length is `iterations() + 1`.
    pub fn metric_history(&self) -> &[f64] {
        &self.metric_history
    }

    pub fn metric(&self) -> f64 {
        self.metric_history.last().cloned().unwrap_or(f64::NAN)
    }

    pub fn top_words(&self, n: usize) -> Vec<Vec<String>> {
        report::top_words(&self.word_topic, self.vocabulary, n)
    }

    /// Ranked words with probabilities, `top_n_words` per topic.
    pub fn topics(&self) -> Vec<Topic> {
        report::ranked_topics(&self.word_topic, self.vocabulary, self.top_n_words)
    }

    /// Most probable topic of each document; ties resolve to the lower topic.
    pub fn dominant_topics(&self) -> Vec<usize> {
        self.topic_document
            .axis_iter(Axis(1))
            .map(|column| {
                column.iter().enumerate().fold(0, |best, (k, &p)| {
                    if p > column[best] { k } else { best }
                })
            })
            .collect()
    }
}

/// Fits a model with a generator seeded from `config.seed` (or from entropy).
pub fn fit<'c, O: FitObserver + ?Sized>(corpus: &'c Corpus, config: PlsaConfig, observer: &mut O)
    -> Result<FittedModel<'c>>
{
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None       => StdRng::from_entropy(),
    };
    EmEngine::new(corpus, config, &mut rng)?.fit(observer)
}
