//! Text helpers shared by the analyzers

use std::collections::HashSet;

use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use unicode_segmentation::UnicodeSegmentation;

/// Lowercased word tokens
pub fn tokenize(text: &str) -> Vec<String> {
    text.unicode_words().map(|w| w.to_lowercase()).collect()
}

/// Non-empty trimmed sentences
pub fn sentences(text: &str) -> Vec<&str> {
    text.unicode_sentences()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Tokens that carry meaning (no stopwords, no very short words)
pub fn content_words(text: &str) -> Vec<String> {
    tokenize(text)
        .into_iter()
        .filter(|w| w.chars().count() > 2 && !STOPWORDS.contains(w.as_str()))
        .collect()
}

/// First `max_chars` characters of `text`, never splitting a character
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

/// Slice from the first `{` to the last `}`
pub fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;

    if start < end {
        Some(&text[start..=end])
    } else {
        None
    }
}

/// Parse the JSON object embedded in a model response
pub fn parse_json_response<T: DeserializeOwned>(response: &str) -> Result<T, String> {
    let json = extract_json(response).ok_or_else(|| "no JSON object in response".to_string())?;
    serde_json::from_str(json).map_err(|e| e.to_string())
}

static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "the", "and", "for", "are", "but", "not", "you", "all", "any", "can", "had", "her",
        "was", "one", "our", "out", "has", "him", "his", "how", "its", "may", "new", "now",
        "old", "see", "two", "way", "who", "did", "get", "got", "let", "put", "say", "she",
        "too", "use", "that", "with", "have", "this", "will", "your", "from", "they", "been",
        "were", "said", "each", "which", "their", "there", "what", "about", "would", "these",
        "other", "into", "than", "then", "them", "some", "could", "also", "after", "more",
        "most", "such", "only", "over", "very", "just", "when", "where", "while", "being",
        "because", "those", "should", "does", "doing", "during", "before", "between",
        "through", "under", "again", "further", "once", "here", "both", "same", "own",
    ]
    .into_iter()
    .collect()
});
