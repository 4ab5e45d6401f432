//! Splitting pending candidates into worker batches and token-bounded questions.

use crate::core::data::{ExtractRecord, FileRecord};
use crate::core::translate::TokenCounter;

/// Below this many pending candidates every candidate becomes its own batch.
pub const PARALLEL_THRESHOLD: usize = 20;

/// Number of candidates per batch for `total` candidates and `workers` workers.
pub fn batch_size(total: usize, workers: usize) -> usize {
    if total < PARALLEL_THRESHOLD {
        1
    } else {
        total.div_ceil(workers.max(1))
    }
}

/// Split candidates into batches of [`batch_size`], keeping their order.
pub fn partition<T>(items: Vec<T>, workers: usize) -> Vec<Vec<T>> {
    let size = batch_size(items.len(), workers);
    let mut batches = Vec::with_capacity(items.len().div_ceil(size.max(1)));
    let mut current = Vec::with_capacity(size);
    for item in items {
        current.push(item);
        if current.len() == size {
            batches.push(std::mem::replace(&mut current, Vec::with_capacity(size)));
        }
    }
    if !current.is_empty() {
        batches.push(current);
    }
    batches
}

/// Group a batch by file, keeping first-seen file order.
pub fn group_by_file(
    batch: Vec<(FileRecord, ExtractRecord)>,
) -> Vec<(FileRecord, Vec<ExtractRecord>)> {
    let mut groups: Vec<(FileRecord, Vec<ExtractRecord>)> = Vec::new();
    for (file, record) in batch {
        match groups.iter_mut().find(|(f, _)| *f == file) {
            Some((_, records)) => records.push(record),
            None => groups.push((file, vec![record])),
        }
    }
    groups
}

/// One distinct source text of a file and every path carrying it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phrase {
    pub value: String,
    pub paths: Vec<String>,
}

impl Phrase {
    /// Key under which the backend answers this phrase.
    pub fn answer_key(&self) -> &str {
        &self.paths[0]
    }
}

/// Group records by identical value, in first-seen order.
pub fn group_phrases(records: &[ExtractRecord]) -> Vec<Phrase> {
    let mut phrases: Vec<Phrase> = Vec::new();
    for record in records {
        match phrases.iter_mut().find(|p| p.value == record.value) {
            Some(phrase) => {
                if !phrase.paths.contains(&record.path) {
                    phrase.paths.push(record.path.clone());
                }
            }
            None => phrases.push(Phrase {
                value: record.value.clone(),
                paths: vec![record.path.clone()],
            }),
        }
    }
    phrases
}

/// Phrases sent together in one backend request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Question {
    pub phrases: Vec<Phrase>,
}

impl Question {
    pub fn phrase_for(&self, answer_key: &str) -> Option<&Phrase> {
        self.phrases.iter().find(|p| p.answer_key() == answer_key)
    }
}

/// Estimated cost of one phrase inside a question.
pub fn phrase_cost(counter: &dyn TokenCounter, phrase: &Phrase) -> usize {
    counter.count(&format!("\n'{}' => '{}'", phrase.answer_key(), phrase.value))
}

/// Pack phrases into questions whose estimated cost stays within `budget`.
///
/// A phrase that alone exceeds the budget still gets a question of its own.
pub fn build_questions(
    phrases: Vec<Phrase>,
    counter: &dyn TokenCounter,
    budget: usize,
) -> Vec<Question> {
    let mut questions = Vec::new();
    let mut current = Question::default();
    let mut cost = 0;

    for phrase in phrases {
        let entry_cost = phrase_cost(counter, &phrase);
        if !current.phrases.is_empty() && cost + entry_cost > budget {
            questions.push(std::mem::take(&mut current));
            cost = 0;
        }
        cost += entry_cost;
        current.phrases.push(phrase);
    }

    if !current.phrases.is_empty() {
        questions.push(current);
    }
    questions
}
