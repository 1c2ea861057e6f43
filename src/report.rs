use ndarray::{Array2, Axis};
use serde_derive::Serialize;

use crate::vocabulary::Vocabulary;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedWord {
    pub word: String,
    pub probability: f64,
}

/// Most probable words of one topic, best first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Topic {
    pub index: usize,
    pub words: Vec<RankedWord>,
}

// word_topic: VxK matrix
/// Word indices of every topic column ranked by descending probability.
///
/// Equal probabilities keep ascending word index order, since the sort is
/// stable over an index-ordered input.
pub fn top_word_indices(word_topic: &Array2<f64>, n: usize) -> Vec<Vec<(usize, f64)>> {
    word_topic
        .axis_iter(Axis(1))
        .map(|column| {
            let mut ranked: Vec<(usize, f64)> = column.iter().cloned().enumerate().collect();
            ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
            ranked.truncate(n);
            ranked
        })
        .collect()
}

// word_topic: VxK matrix
pub fn top_words(word_topic: &Array2<f64>, vocabulary: &Vocabulary, n: usize) -> Vec<Vec<String>> {
    ranked_topics(word_topic, vocabulary, n)
        .into_iter()
        .map(|topic| topic.words.into_iter().map(|w| w.word).collect())
        .collect()
}

// word_topic: VxK matrix
pub fn ranked_topics(word_topic: &Array2<f64>, vocabulary: &Vocabulary, n: usize) -> Vec<Topic> {
    top_word_indices(word_topic, n)
        .into_iter()
        .enumerate()
        .map(|(k, ranked)| Topic {
            index: k,
            words: ranked
                .into_iter()
                .filter_map(|(v, probability)| {
                    vocabulary.reverse_lookup(v).map(|word| RankedWord {
                        word: word.to_owned(),
                        probability: probability,
                    })
                })
                .collect(),
        })
        .collect()
}
