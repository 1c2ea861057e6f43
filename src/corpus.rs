use std::collections::HashMap;

use ndarray::Array2;
use tracing::{debug, info};

use crate::vocabulary::Vocabulary;

/// Sparse word counts of a single document, keyed by word index.
/// Words absent from the document have no entry.
pub type Bag = HashMap<usize, usize>;

/// Immutable vocabulary plus word-document occurrence counts.
#[derive(Debug, Clone)]
pub struct Corpus {
    vocabulary: Vocabulary,
    bags: Vec<Bag>,
}

impl Corpus {
    /// Builds a corpus from already-normalized token sequences.
    pub fn from_documents<D, W>(documents: D) -> Corpus
        where D: IntoIterator<Item = W>, W: IntoIterator, W::Item: AsRef<str>
    {
        let mut builder = CorpusBuilder::new();
        for document in documents {
            builder.add_document(document);
        }
        builder.build()
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn documents_count(&self) -> usize {
        self.bags.len()
    }

    pub fn bags(&self) -> &[Bag] {
        &self.bags
    }

    /// Occurrences of word `word` in document `doc`, 0 if never observed.
    pub fn count(&self, word: usize, doc: usize) -> usize {
        self.bags.get(doc)
            .and_then(|bag| bag.get(&word))
            .cloned()
            .unwrap_or(0)
    }

    /// Number of tokens in document `doc`.
    pub fn document_length(&self, doc: usize) -> usize {
        self.bags.get(doc).map_or(0, |bag| bag.values().sum())
    }

    /// Number of stored (word, document) pairs.
    pub fn non_zero_count(&self) -> usize {
        self.bags.iter().map(|bag| bag.len()).sum()
    }

    pub fn total_tokens(&self) -> usize {
        self.bags.iter().map(|bag| bag.values().sum::<usize>()).sum()
    }

    // V x D
    pub fn count_matrix(&self) -> Array2<f64> {
        let mut counts = Array2::zeros((self.vocabulary.len(), self.bags.len()));
        for (d, bag) in self.bags.iter().enumerate() {
            for (&v, &count) in bag {
                counts[[v, d]] = count as f64;
            }
        }
        counts
    }
}

/// Accumulates documents into a `Corpus`.
///
/// Documents receive sequential indices in the order they are added.
#[derive(Debug, Default)]
pub struct CorpusBuilder {
    vocabulary: Vocabulary,
    bags: Vec<Bag>,
}

impl CorpusBuilder {
    pub fn new() -> CorpusBuilder {
        CorpusBuilder::default()
    }

    /// Adds one document and returns its index.
    pub fn add_document<W>(&mut self, words: W) -> usize
        where W: IntoIterator, W::Item: AsRef<str>
    {
        let mut bag = Bag::new();
        for word in words {
            let v = self.vocabulary.register_or_get_index(word.as_ref());
            *bag.entry(v).or_insert(0) += 1;
        }
        let doc = self.bags.len();
        debug!(document = doc, distinct_words = bag.len(), "Added document");
        self.bags.push(bag);
        doc
    }

    pub fn build(self) -> Corpus {
        let corpus = Corpus {
            vocabulary: self.vocabulary,
            bags: self.bags,
        };
        info!(
            documents = corpus.documents_count(),
            vocabulary = corpus.vocabulary.len(),
            tokens = corpus.total_tokens(),
            "Built corpus"
        );
        corpus
    }
}
