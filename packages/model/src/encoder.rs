//! One-hot encoding for the single categorical feature column.

use serde::{Deserialize, Serialize};

/// A fitted one-hot encoder over a single categorical column.
///
/// Categories are learned at fit time from the training split. Encoding a
/// value unseen at fit time never fails: it produces the all-zero vector,
/// matching how the model should degrade on unknown locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    categories: Vec<String>,
}

impl OneHotEncoder {
    /// Learns the sorted, deduplicated category set from training values.
    pub fn fit<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut categories: Vec<String> = values.into_iter().map(String::from).collect();
        categories.sort();
        categories.dedup();
        Self { categories }
    }

    /// Encodes a value as a one-hot vector. Unknown values encode as all
    /// zeros.
    #[must_use]
    pub fn encode(&self, value: &str) -> Vec<f64> {
        let mut encoded = vec![0.0; self.categories.len()];
        if let Some(idx) = self.categories.iter().position(|c| c == value) {
            encoded[idx] = 1.0;
        }
        encoded
    }

    /// Number of columns the encoded vector occupies.
    #[must_use]
    pub fn width(&self) -> usize {
        self.categories.len()
    }

    /// The learned categories, sorted.
    #[must_use]
    pub fn categories(&self) -> &[String] {
        &self.categories
    }
}
