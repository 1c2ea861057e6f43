use std::collections::HashMap;

/// Bidirectional word <-> index mapping.
///
/// Indices are handed out in first-occurrence order starting at 0 and are
/// never reassigned, so `words[i]` is always the word registered as `i`.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    indices: HashMap<String, usize>,
    words: Vec<String>,
}

impl Vocabulary {
    pub fn new() -> Vocabulary {
        Vocabulary::default()
    }

    /// Returns the index of `word`, registering it first if it is unseen.
    pub fn register_or_get_index(&mut self, word: &str) -> usize {
        if let Some(&index) = self.indices.get(word) {
            return index;
        }
        let index = self.words.len();
        self.words.push(word.to_owned());
        self.indices.insert(word.to_owned(), index);
        index
    }

    pub fn index_of(&self, word: &str) -> Option<usize> {
        self.indices.get(word).cloned()
    }

    pub fn reverse_lookup(&self, index: usize) -> Option<&str> {
        self.words.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Words in index order.
    pub fn words(&self) -> &[String] {
        &self.words
    }
}
