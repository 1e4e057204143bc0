//! Harvest candidate correction terms from matched product documents.

use std::collections::HashSet;

use crate::models::{CandidateTerm, ProductDocument, TermSource};
use crate::suggest::similarity;

/// Candidate terms must be shorter than this (in chars).
pub const MAX_TERM_CHARS: usize = 45;
const MIN_TERM_CHARS: usize = 2;
const MIN_WORD_CHARS: usize = 4;
const MAX_WORD_CHARS: usize = 24;
const MAX_VENDOR_CHARS: usize = 30;

/// Extract candidate terms from `documents`, each scored against `query`.
///
/// Per document, in order: the full title, its first two and three words,
/// every significant single word, and the vendor. Terms are deduplicated
/// case-insensitively across all documents; the first occurrence wins.
pub fn extract_terms(documents: &[ProductDocument], query: &str) -> Vec<CandidateTerm> {
    let mut collector = TermCollector::new(query);

    for doc in documents {
        let title = doc.title.trim();

        if char_len(title) < MAX_TERM_CHARS {
            collector.add(title, TermSource::FullTitle);
        }

        if let Some(prefix) = title_prefix(title, 2) {
            collector.add(&prefix, TermSource::TitleStart);
        }
        if let Some(prefix) = title_prefix(title, 3) {
            collector.add(&prefix, TermSource::TitleStart);
        }

        for word in title.split_whitespace() {
            let cleaned: String = word.chars().filter(|c| c.is_alphanumeric()).collect();
            let len = char_len(&cleaned);
            let starts_with_letter = cleaned.chars().next().is_some_and(char::is_alphabetic);
            if (MIN_WORD_CHARS..=MAX_WORD_CHARS).contains(&len) && starts_with_letter {
                collector.add(&cleaned, TermSource::Word);
            }
        }

        if let Some(vendor) = doc.vendor.as_deref().map(str::trim) {
            if char_len(vendor) < MAX_VENDOR_CHARS {
                collector.add(vendor, TermSource::Vendor);
            }
        }
    }

    collector.terms
}

/// First `words` whitespace-separated words of `title`, or None if the title
/// is shorter than that.
pub fn title_prefix(title: &str, words: usize) -> Option<String> {
    let parts: Vec<&str> = title.split_whitespace().take(words).collect();
    if parts.len() < words {
        return None;
    }
    Some(parts.join(" "))
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

struct TermCollector<'q> {
    query: &'q str,
    seen: HashSet<String>,
    terms: Vec<CandidateTerm>,
}

impl<'q> TermCollector<'q> {
    fn new(query: &'q str) -> Self {
        Self {
            query,
            seen: HashSet::new(),
            terms: Vec::new(),
        }
    }

    fn add(&mut self, term: &str, source: TermSource) {
        let len = char_len(term);
        if !(MIN_TERM_CHARS..MAX_TERM_CHARS).contains(&len) {
            return;
        }
        if !self.seen.insert(term.to_lowercase()) {
            return;
        }
        self.terms.push(CandidateTerm {
            term: term.to_string(),
            source,
            score: similarity::score(term, self.query),
        });
    }
}
