//! Context selection for content chat.
//!
//! The normalized text is cut into sentence-aligned chunks and each chunk is scored
//! against the question with TF-IDF. The best chunks are packed into a fixed character
//! budget and put back in document order so the model reads them as continuous text.
//! When nothing in the question matches, the leading chunks are used, which is the
//! same context a plain truncation would give.

use crate::text_processing::chunk_text;
use std::collections::{HashMap, HashSet};

pub const CHUNK_CHARS: usize = 500;
pub const CONTEXT_BUDGET_CHARS: usize = 2000;

const STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "all", "am", "an", "and", "any", "are", "as", "at",
    "be", "because", "been", "before", "being", "below", "between", "both", "but", "by", "can",
    "could", "did", "do", "does", "doing", "down", "during", "each", "explain", "few", "for",
    "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers", "him", "his",
    "how", "i", "if", "in", "into", "is", "it", "its", "itself", "just", "me", "more", "most",
    "my", "no", "nor", "not", "now", "of", "off", "on", "once", "only", "or", "other", "our",
    "out", "over", "own", "please", "same", "she", "should", "so", "some", "such", "tell",
    "than", "that", "the", "their", "them", "then", "there", "these", "they", "this", "those",
    "through", "to", "too", "under", "until", "up", "very", "was", "we", "were", "what", "when",
    "where", "which", "while", "who", "whom", "why", "will", "with", "would", "you", "your",
];

/// Lowercase alphanumeric terms with stopwords removed.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|term| !term.is_empty())
        .map(str::to_lowercase)
        .filter(|term| !STOPWORDS.contains(&term.as_str()))
        .collect()
}

/// TF-IDF score of every chunk against the question terms.
fn score_chunks(chunks: &[String], question: &str) -> Vec<f64> {
    let query_terms: HashSet<String> = tokenize(question).into_iter().collect();
    if query_terms.is_empty() {
        return vec![0.0; chunks.len()];
    }

    let term_counts: Vec<HashMap<String, usize>> = chunks
        .iter()
        .map(|chunk| {
            let mut counts = HashMap::new();
            for term in tokenize(chunk) {
                *counts.entry(term).or_insert(0) += 1;
            }
            counts
        })
        .collect();

    let chunk_count = chunks.len() as f64;
    let idf: HashMap<&str, f64> = query_terms
        .iter()
        .map(|term| {
            let df = term_counts.iter().filter(|c| c.contains_key(term)).count() as f64;
            (term.as_str(), (1.0 + chunk_count / (1.0 + df)).ln())
        })
        .collect();

    term_counts
        .iter()
        .map(|counts| {
            let total: usize = counts.values().sum();
            if total == 0 {
                return 0.0;
            }
            query_terms
                .iter()
                .map(|term| {
                    let tf = *counts.get(term).unwrap_or(&0) as f64 / total as f64;
                    tf * idf.get(term.as_str()).copied().unwrap_or(0.0)
                })
                .sum()
        })
        .collect()
}

/// Builds the chat context for `question` out of `text`.
pub fn select_context(text: &str, question: &str) -> String {
    select_context_with(text, question, CHUNK_CHARS, CONTEXT_BUDGET_CHARS)
}

pub fn select_context_with(
    text: &str,
    question: &str,
    chunk_chars: usize,
    budget_chars: usize,
) -> String {
    let chunks = chunk_text(text, chunk_chars);
    if chunks.is_empty() {
        return String::new();
    }

    let scores = score_chunks(&chunks, question);
    let mut ranked: Vec<usize> = (0..chunks.len()).collect();
    // Stable sort, so equal scores keep document order
    ranked.sort_by(|a, b| scores[*b].total_cmp(&scores[*a]));

    let mut selected = Vec::new();
    let mut used = 0;
    for idx in ranked {
        let len = chunks[idx].chars().count();
        let needed = if selected.is_empty() { len } else { len + 1 };
        if used + needed > budget_chars {
            break;
        }
        used += needed;
        selected.push(idx);
    }

    selected.sort_unstable();
    selected
        .into_iter()
        .map(|idx| chunks[idx].as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const GEOLOGY: &str = "Volcanoes erupt when magma rises. Glaciers carve deep valleys slowly. \
        Deserts receive very little rain. Basalt forms when volcanoes cool.";

    #[test]
    fn tokenize_lowercases_and_drops_stopwords() {
        assert_eq!(
            tokenize("What is the Krebs-cycle, and why does it matter?"),
            vec!["krebs", "cycle", "matter"]
        );
    }

    #[test]
    fn empty_text_gives_empty_context() {
        assert_eq!(select_context("", "anything"), "");
        assert_eq!(select_context("   ", ""), "");
    }

    #[test]
    fn short_text_is_returned_whole() {
        let text = "Mitochondria produce ATP. Ribosomes build proteins.";
        assert_eq!(select_context(text, "ribosomes"), text);
    }

    #[test]
    fn matching_chunks_are_preferred_and_kept_in_document_order() {
        let context = select_context_with(GEOLOGY, "How do volcanoes form basalt?", 40, 70);

        assert_eq!(
            context,
            "Volcanoes erupt when magma rises. Basalt forms when volcanoes cool."
        );
    }

    #[test]
    fn unmatched_questions_fall_back_to_leading_chunks() {
        let context = select_context_with(GEOLOGY, "the of and", 40, 70);

        assert_eq!(
            context,
            "Volcanoes erupt when magma rises. Glaciers carve deep valleys slowly."
        );
    }

    #[test]
    fn context_never_exceeds_the_budget() {
        let text = "Cells divide by mitosis. ".repeat(500);
        let context = select_context(&text, "mitosis");

        assert!(!context.is_empty());
        assert!(context.chars().count() <= CONTEXT_BUDGET_CHARS);
    }
}
