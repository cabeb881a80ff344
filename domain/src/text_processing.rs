//! Plain-text helpers shared by the generators: whitespace cleanup, sentence
//! chunking and the heuristic study aids used when an LLM answer cannot be parsed.

use crate::flashcards::Flashcard;
use crate::quiz::QuizQuestion;

const HISTORY_PREVIEW_CHARS: usize = 200;

/// Collapses every whitespace run to a single space and trims the ends.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Splits after `.`, `!` or `?` when followed by whitespace. The punctuation stays
/// with its sentence and the whitespace between sentences is dropped.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        if !matches!(ch, '.' | '!' | '?') {
            continue;
        }
        let Some(&(next_idx, next)) = chars.peek() else {
            break;
        };
        if !next.is_whitespace() {
            continue;
        }

        let end = idx + ch.len_utf8();
        if end > start {
            sentences.push(&text[start..end]);
        }
        start = next_idx;
        while let Some(&(ws_idx, ws)) = chars.peek() {
            if !ws.is_whitespace() {
                start = ws_idx;
                break;
            }
            chars.next();
            start = ws_idx + ws.len_utf8();
        }
    }

    if start < text.len() && !text[start..].trim().is_empty() {
        sentences.push(&text[start..]);
    }
    sentences
}

/// Groups consecutive sentences into chunks of at most `max_chars` characters.
/// A sentence longer than `max_chars` is cut into pieces so the bound always holds.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for sentence in split_sentences(text) {
        for piece in hard_wrap(sentence, max_chars) {
            let piece_len = piece.chars().count();
            let joined_len = if current.is_empty() {
                piece_len
            } else {
                current_len + 1 + piece_len
            };

            if joined_len > max_chars && !current.is_empty() {
                chunks.push(current.trim().to_string());
                current = piece.to_string();
                current_len = piece_len;
            } else {
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(piece);
                current_len = joined_len;
            }
        }
    }

    if !current.trim().is_empty() {
        chunks.push(current.trim().to_string());
    }
    chunks
}

fn hard_wrap(sentence: &str, max_chars: usize) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut rest = sentence;
    while rest.chars().count() > max_chars {
        let split_at = rest
            .char_indices()
            .nth(max_chars)
            .map(|(idx, _)| idx)
            .unwrap_or(rest.len());
        pieces.push(&rest[..split_at]);
        rest = &rest[split_at..];
    }
    if !rest.is_empty() {
        pieces.push(rest);
    }
    pieces
}

/// The first `max_chars` characters of `text`, never splitting a character.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Short excerpt shown in the content history list.
pub fn preview(text: &str) -> String {
    if text.chars().count() > HISTORY_PREVIEW_CHARS {
        format!("{}...", truncate_chars(text, HISTORY_PREVIEW_CHARS))
    } else {
        text.to_string()
    }
}

fn period_sentences(text: &str) -> Vec<&str> {
    text.split('.')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Picks up to 8 sentences longer than 20 characters. When fewer than 5 qualify
/// but the text has at least 5 sentences, the first 5 sentences are used instead.
pub fn extract_key_points(text: &str) -> Vec<String> {
    let sentences = period_sentences(text);

    let mut key_points: Vec<&str> = sentences
        .iter()
        .copied()
        .filter(|s| s.chars().count() > 20)
        .take(8)
        .collect();

    if key_points.len() < 5 && sentences.len() >= 5 {
        key_points = sentences[..5].to_vec();
    }

    key_points.into_iter().map(str::to_string).collect()
}

fn leading_words(words: &[&str], count: usize) -> String {
    words
        .iter()
        .take(count)
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn summary_sentences(summary: &str) -> Vec<&str> {
    period_sentences(summary)
        .into_iter()
        .filter(|s| s.chars().count() > 20)
        .collect()
}

/// Template flashcards built without an LLM. At most 10 cards.
pub fn heuristic_flashcards(summary: &str, key_points: &[String]) -> Vec<Flashcard> {
    let mut cards = Vec::new();

    for sentence in summary_sentences(summary).into_iter().take(5) {
        let words: Vec<&str> = sentence.split_whitespace().collect();
        if words.len() > 5 {
            cards.push(Flashcard {
                question: format!("What is mentioned about {}", leading_words(&words, 3)),
                answer: sentence.to_string(),
            });
        }
    }

    for point in key_points.iter().take(5) {
        let words: Vec<&str> = point.split_whitespace().collect();
        if point.chars().count() > 15 && words.len() > 3 {
            cards.push(Flashcard {
                question: format!("Explain the concept of {}", leading_words(&words, 3)),
                answer: point.clone(),
            });
        }
    }

    cards.truncate(10);
    cards
}

/// Template multiple-choice questions built without an LLM. At most 8 questions,
/// numbered from 1.
pub fn heuristic_quiz(summary: &str, key_points: &[String]) -> Vec<QuizQuestion> {
    let mut questions = Vec::new();

    for sentence in summary_sentences(summary).into_iter().take(4) {
        let words: Vec<&str> = sentence.split_whitespace().collect();
        if words.len() > 5 {
            questions.push((
                format!("What is the main idea about {}", leading_words(&words, 3)),
                sentence.to_string(),
                [
                    format!("This is not related to {}", leading_words(&words, 2)),
                    format!("Incorrect statement about {}", words[0].to_lowercase()),
                    format!("This does not describe {}", words[1].to_lowercase()),
                ],
            ));
        }
    }

    for point in key_points.iter().take(4) {
        let words: Vec<&str> = point.split_whitespace().collect();
        if point.chars().count() > 15 && words.len() > 3 {
            questions.push((
                format!("Which statement describes {}", leading_words(&words, 2)),
                point.clone(),
                [
                    format!("Opposite of {}", words[0].to_lowercase()),
                    format!("Unrelated to {}", words[1].to_lowercase()),
                    format!("Different concept than {}", words[2].to_lowercase()),
                ],
            ));
        }
    }

    questions
        .into_iter()
        .take(8)
        .enumerate()
        .map(|(idx, (question, correct, [wrong1, wrong2, wrong3]))| QuizQuestion {
            id: idx as u32 + 1,
            question,
            options: vec![correct.clone(), wrong1, wrong2, wrong3],
            correct_answer: correct,
            explanation: String::new(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PHOTOSYNTHESIS: &str = "Photosynthesis converts light energy into chemical energy. \
        It happens inside the chloroplasts of plant cells. \
        Chlorophyll absorbs mostly red and blue light. \
        The process releases oxygen as a by-product. \
        Glucose made during photosynthesis fuels the plant.";

    #[test]
    fn clean_text_collapses_whitespace() {
        assert_eq!(clean_text("  a\n\n b\t\tc  "), "a b c");
        assert_eq!(clean_text(" \n "), "");
    }

    #[test]
    fn split_sentences_keeps_punctuation_and_skips_abbreviation_like_dots() {
        assert_eq!(
            split_sentences("One. Two!  Three? v1.2 stays"),
            vec!["One.", "Two!", "Three?", "v1.2 stays"]
        );
        assert!(split_sentences("").is_empty());
    }

    #[test]
    fn chunk_text_respects_the_limit() {
        let chunks = chunk_text(PHOTOSYNTHESIS, 120);

        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.chars().count() <= 120));
        assert_eq!(chunks.join(" "), clean_text(PHOTOSYNTHESIS));
    }

    #[test]
    fn chunk_text_cuts_sentences_longer_than_the_limit() {
        let long = "x".repeat(1100);
        let chunks = chunk_text(&long, 500);

        assert_eq!(
            chunks.iter().map(|c| c.len()).collect::<Vec<_>>(),
            vec![500, 500, 100]
        );
    }

    #[test]
    fn preview_appends_ellipsis_only_when_truncated() {
        assert_eq!(preview("short"), "short");

        let long = "é".repeat(250);
        let p = preview(&long);
        assert_eq!(p.chars().count(), 203);
        assert!(p.ends_with("..."));
    }

    #[test]
    fn key_points_keep_long_sentences() {
        let points = extract_key_points(PHOTOSYNTHESIS);

        assert_eq!(points.len(), 5);
        assert_eq!(
            points[0],
            "Photosynthesis converts light energy into chemical energy"
        );
    }

    #[test]
    fn key_points_fall_back_to_the_first_five_sentences() {
        let points = extract_key_points("A. B. C. D. E. F.");
        assert_eq!(points, vec!["A", "B", "C", "D", "E"]);
    }

    #[test]
    fn heuristic_flashcards_use_templates() {
        let key_points = extract_key_points(PHOTOSYNTHESIS);
        let cards = heuristic_flashcards(PHOTOSYNTHESIS, &key_points);

        assert_eq!(cards.len(), 10);
        assert_eq!(
            cards[0].question,
            "What is mentioned about photosynthesis converts light"
        );
        assert!(cards
            .iter()
            .any(|c| c.question.starts_with("Explain the concept of")));
    }

    #[test]
    fn heuristic_quiz_has_four_options_and_numbered_ids() {
        let key_points = extract_key_points(PHOTOSYNTHESIS);
        let quiz = heuristic_quiz(PHOTOSYNTHESIS, &key_points);

        assert_eq!(quiz.len(), 8);
        assert_eq!(quiz[0].id, 1);
        assert_eq!(quiz[7].id, 8);
        for question in &quiz {
            assert_eq!(question.options.len(), 4);
            assert_eq!(question.options[0], question.correct_answer);
        }
    }

    #[test]
    fn heuristics_tolerate_empty_input() {
        assert!(heuristic_flashcards("", &[]).is_empty());
        assert!(heuristic_quiz("", &[]).is_empty());
        assert!(extract_key_points("").is_empty());
    }
}
