use std::collections::{HashMap, HashSet};

use super::tokenize;

/// Inverse document frequency weights fitted once over a caption corpus.
///
/// `idf(t) = ln((N + 1) / (df(t) + 1))`; tokens never seen in the corpus
/// get `ln(N + 1)`.
#[derive(Debug, Clone, PartialEq)]
pub struct IdfTable {
    weights: HashMap<String, f64>,
    unseen: f64,
    documents: usize,
}

impl IdfTable {
    pub fn fit<I, S>(corpus: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut document_frequency: HashMap<String, usize> = HashMap::new();
        let mut documents = 0usize;

        for document in corpus {
            documents += 1;
            let unique: HashSet<String> = tokenize(document.as_ref()).collect();
            for token in unique {
                *document_frequency.entry(token).or_default() += 1;
            }
        }

        let total = documents as f64 + 1.0;
        let weights = document_frequency
            .into_iter()
            .map(|(token, df)| (token, (total / (df as f64 + 1.0)).ln()))
            .collect();

        Self {
            weights,
            unseen: total.ln(),
            documents,
        }
    }

    pub fn weight(&self, token: &str) -> f64 {
        self.weights.get(token).copied().unwrap_or(self.unseen)
    }

    pub fn documents(&self) -> usize {
        self.documents
    }

    pub fn vocabulary_size(&self) -> usize {
        self.weights.len()
    }
}
