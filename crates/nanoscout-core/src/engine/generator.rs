use crate::core::models::composition::Composition;
use crate::core::vocabulary::ElementVocabulary;
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, instrument, warn};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error(
        "Vocabulary of {vocabulary} element(s) offers only {available} distinct composition(s) of the requested sizes, but {requested} were requested"
    )]
    InsufficientVocabulary {
        vocabulary: usize,
        requested: usize,
        available: u128,
    },
    #[error("Invalid maximum composition size {0}; compositions need at least 2 elements")]
    InvalidSize(usize),
    #[error("Gave up after {attempts} draws with only {found} of {requested} unique compositions")]
    Exhausted {
        attempts: usize,
        found: usize,
        requested: usize,
    },
}

/// Upper bound on up-front allocation; larger requests grow on demand.
const PREALLOCATION_LIMIT: usize = 1024;

fn initial_capacity(count: usize) -> usize {
    count.min(PREALLOCATION_LIMIT)
}

/// Number of ways to choose `k` of `n` items, saturating at `u128::MAX`.
fn binomial(n: usize, k: usize) -> u128 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    (0..k).fold(1u128, |acc, i| {
        acc.saturating_mul((n - i) as u128) / (i as u128 + 1)
    })
}

/// Draws unique random element subsets from a vocabulary.
#[derive(Debug, Clone)]
pub struct CompositionGenerator<'a> {
    vocabulary: &'a ElementVocabulary,
    excluded: HashSet<Composition>,
    max_attempts_per_composition: usize,
}

impl<'a> CompositionGenerator<'a> {
    pub fn new(vocabulary: &'a ElementVocabulary) -> Self {
        Self {
            vocabulary,
            excluded: HashSet::new(),
            max_attempts_per_composition: 1000,
        }
    }

    /// Compositions that must never be returned, e.g. those already in the dataset.
    pub fn excluding<I>(mut self, compositions: I) -> Self
    where
        I: IntoIterator<Item = Composition>,
    {
        self.excluded.extend(compositions);
        self
    }

    pub fn max_attempts_per_composition(mut self, attempts: usize) -> Self {
        self.max_attempts_per_composition = attempts.max(1);
        self
    }

    /// Distinct compositions with sizes in `2..=max_size` that are still available.
    pub fn capacity(&self, max_size: usize) -> u128 {
        let total = (2..=max_size).fold(0u128, |acc, size| {
            acc.saturating_add(binomial(self.vocabulary.len(), size))
        });
        let excluded = self
            .excluded
            .iter()
            .filter(|c| (2..=max_size).contains(&c.len()))
            .filter(|c| c.elements().iter().all(|e| self.vocabulary.contains(e)))
            .count() as u128;
        total.saturating_sub(excluded)
    }

    /// Generates exactly `count` distinct compositions.
    ///
    /// Each composition's size is drawn uniformly from `2..=max_elements` (capped at the
    /// vocabulary size) and its elements are drawn without replacement. Uniqueness is
    /// judged on the canonical sorted element list.
    ///
    /// # Errors
    ///
    /// - [`GenerationError::InvalidSize`] when `max_elements < 2`.
    /// - [`GenerationError::InsufficientVocabulary`] when fewer than `count` distinct
    ///   compositions exist, including any vocabulary with fewer than two elements.
    /// - [`GenerationError::Exhausted`] when the retry budget runs out.
    #[instrument(level = "debug", skip(self, rng))]
    pub fn generate(
        &self,
        count: usize,
        max_elements: usize,
        rng: &mut impl Rng,
    ) -> Result<Vec<Composition>, GenerationError> {
        if max_elements < 2 {
            return Err(GenerationError::InvalidSize(max_elements));
        }
        let max_size = max_elements.min(self.vocabulary.len());
        let available = if self.vocabulary.len() < 2 {
            0
        } else {
            self.capacity(max_size)
        };
        if self.vocabulary.len() < 2 || available < count as u128 {
            return Err(GenerationError::InsufficientVocabulary {
                vocabulary: self.vocabulary.len(),
                requested: count,
                available,
            });
        }
        if max_size < max_elements {
            debug!(
                "Capping composition size at the vocabulary size of {}.",
                max_size
            );
        }

        let budget = count.saturating_mul(self.max_attempts_per_composition);
        let mut seen = HashSet::with_capacity(initial_capacity(count));
        let mut compositions = Vec::with_capacity(initial_capacity(count));
        let mut attempts = 0usize;
        while compositions.len() < count {
            if attempts >= budget {
                warn!(
                    "Composition generation exhausted its budget of {} draws.",
                    budget
                );
                return Err(GenerationError::Exhausted {
                    attempts,
                    found: compositions.len(),
                    requested: count,
                });
            }
            attempts += 1;

            let size = rng.gen_range(2..=max_size);
            let candidate = Composition::from_elements(
                self.vocabulary
                    .elements()
                    .choose_multiple(rng, size)
                    .cloned(),
            );
            if self.excluded.contains(&candidate) || !seen.insert(candidate.clone()) {
                continue;
            }
            compositions.push(candidate);
        }

        debug!(
            "Generated {} composition(s) in {} draw(s).",
            compositions.len(),
            attempts
        );
        Ok(compositions)
    }
}
