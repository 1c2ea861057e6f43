//! Probabilistic latent semantic analysis (pLSA) fitted by
//! expectation-maximization.
//!
//! ```no_run
//! use plsa::{Corpus, PlsaConfig, Silent};
//!
//! let corpus = Corpus::from_documents(vec![
//!     vec!["cat", "dog"],
//!     vec!["dog", "dog", "fish"],
//!     vec!["cat", "fish"],
//! ]);
//! let model = plsa::fit(&corpus, PlsaConfig::new(2).seed(42), &mut Silent)?;
//! for (k, words) in model.top_words(2).iter().enumerate() {
//!     println!("Topic {}: {}", k, words.join(" "));
//! }
//! # Ok::<(), plsa::PlsaError>(())
//! ```

pub mod config;
pub mod corpus;
pub mod em;
pub mod error;
pub mod matrix;
pub mod report;
pub mod vocabulary;

pub use config::{ConvergenceMetric, PlsaConfig};
pub use corpus::{Corpus, CorpusBuilder};
pub use em::{fit, EmEngine, FitObserver, FittedModel, Silent};
pub use error::PlsaError;
pub use report::{top_words, RankedWord, Topic};
pub use vocabulary::Vocabulary;
