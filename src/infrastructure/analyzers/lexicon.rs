//! Word lists behind the local heuristics

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;

pub static POSITIVE_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "good", "great", "excellent", "amazing", "awesome", "love", "loved", "loves", "like",
        "best", "better", "breakthrough", "success", "successful", "win", "wins", "won",
        "gain", "gains", "growth", "grow", "grows", "improve", "improved", "improvement",
        "positive", "strong", "stronger", "record", "boost", "boosted", "surge", "surged",
        "rally", "rallied", "profit", "profitable", "innovative", "innovation", "happy",
        "optimistic", "celebrate", "celebrated", "praise", "praised", "benefit", "benefits",
        "recover", "recovery", "robust", "thrive", "thriving", "impressive", "remarkable",
        "exciting", "excited", "wonderful", "fantastic", "promising", "hope", "hopeful",
        "safe", "secure", "stable", "efficient", "advance", "advances", "achievement",
    ]
    .into_iter()
    .collect()
});

pub static NEGATIVE_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "bad", "terrible", "awful", "horrible", "hate", "hated", "worst", "worse", "poor",
        "fail", "failed", "failure", "fails", "loss", "losses", "lose", "lost", "decline",
        "declined", "drop", "dropped", "fall", "fell", "crash", "crashed", "crisis", "risk",
        "risks", "threat", "threatens", "concern", "concerns", "worried", "worry", "fear",
        "fears", "negative", "weak", "weaker", "slump", "plunge", "plunged", "scandal",
        "fraud", "lawsuit", "sued", "layoffs", "layoff", "cut", "cuts", "recession",
        "inflation", "danger", "dangerous", "attack", "attacks", "war", "death", "deaths",
        "killed", "disaster", "outage", "breach", "collapse", "collapsed", "bankrupt",
        "bankruptcy", "controversy", "criticism", "criticized", "warning", "volatile",
    ]
    .into_iter()
    .collect()
});

/// Words that flip the polarity of the following sentiment word
pub static NEGATORS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "not", "no", "never", "neither", "nor", "none", "nobody", "nothing", "without",
        "hardly", "barely", "isn't", "wasn't", "aren't", "weren't", "don't", "doesn't",
        "didn't", "won't", "can't", "cannot", "couldn't", "shouldn't",
    ]
    .into_iter()
    .collect()
});

/// Multipliers applied to the following sentiment word
pub static INTENSIFIERS: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    [
        ("very", 1.5),
        ("extremely", 2.0),
        ("incredibly", 2.0),
        ("really", 1.3),
        ("highly", 1.5),
        ("truly", 1.3),
        ("deeply", 1.5),
        ("so", 1.3),
        ("slightly", 0.5),
        ("somewhat", 0.6),
    ]
    .into_iter()
    .collect()
});

/// Topic categories and their indicative keywords, in tie-break order
pub static TOPIC_CATEGORIES: &[(&str, &[&str])] = &[
    (
        "technology",
        &[
            "ai", "artificial", "intelligence", "software", "hardware", "computer", "chip",
            "chips", "semiconductor", "app", "apps", "internet", "cloud", "data", "algorithm",
            "robot", "robotics", "startup", "tech", "technology", "digital", "cyber",
            "smartphone", "google", "apple", "microsoft", "openai", "model", "models",
            "machine", "learning", "quantum", "blockchain", "crypto",
        ],
    ),
    (
        "business",
        &[
            "market", "markets", "stock", "stocks", "shares", "investor", "investors",
            "revenue", "profit", "earnings", "company", "companies", "economy", "economic",
            "bank", "banks", "trade", "merger", "acquisition", "ceo", "finance", "financial",
            "inflation", "interest", "rates", "price", "prices", "sales", "retail",
        ],
    ),
    (
        "politics",
        &[
            "election", "elections", "government", "president", "minister", "parliament",
            "congress", "senate", "vote", "voters", "policy", "law", "bill", "campaign",
            "party", "democrat", "republican", "political", "politics", "legislation",
            "court", "supreme", "governor",
        ],
    ),
    (
        "science",
        &[
            "research", "researchers", "scientists", "study", "discovery", "physics",
            "chemistry", "biology", "space", "nasa", "telescope", "planet", "experiment",
            "laboratory", "genome", "species", "astronomy", "particle",
        ],
    ),
    (
        "health",
        &[
            "health", "hospital", "doctor", "doctors", "patients", "disease", "vaccine",
            "virus", "medical", "medicine", "drug", "treatment", "cancer", "clinical",
            "pandemic", "mental", "fda", "therapy",
        ],
    ),
    (
        "sports",
        &[
            "game", "match", "team", "season", "league", "championship", "coach", "player",
            "players", "goal", "score", "tournament", "olympic", "olympics", "football",
            "soccer", "basketball", "tennis", "baseball", "cup",
        ],
    ),
    (
        "entertainment",
        &[
            "film", "movie", "music", "album", "concert", "actor", "actress", "celebrity",
            "tv", "television", "series", "streaming", "netflix", "hollywood", "festival",
            "award", "awards", "show",
        ],
    ),
    (
        "environment",
        &[
            "climate", "environment", "environmental", "emissions", "carbon", "pollution",
            "renewable", "solar", "wind", "energy", "wildlife", "forest", "drought",
            "flood", "warming", "sustainability", "biodiversity",
        ],
    ),
];

/// Category reported when no keyword matches
pub const GENERAL_TOPIC: &str = "general";

/// Trust scores for well-known publishers, matched by substring
pub static SOURCE_TRUST: &[(&str, f64)] = &[
    ("reuters", 0.95),
    ("apnews", 0.95),
    ("associated press", 0.95),
    ("bbc", 0.9),
    ("nature.com", 0.9),
    ("npr", 0.85),
    ("nytimes", 0.85),
    ("wsj", 0.85),
    ("ft.com", 0.85),
    ("bloomberg", 0.85),
    ("economist", 0.85),
    ("theguardian", 0.8),
    ("washingtonpost", 0.8),
    ("techcrunch", 0.7),
    ("theverge", 0.7),
    ("wired", 0.7),
    ("arstechnica", 0.7),
    ("medium.com", 0.4),
    ("blogspot", 0.3),
];

/// Trust assumed for missing or unknown sources
pub const NEUTRAL_TRUST: f64 = 0.5;

/// Interest terms used when the caller gives no keywords
pub static DEFAULT_INTEREST_TERMS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "ai", "breakthrough", "launch", "announced", "announces", "new", "first",
        "research", "report", "study", "exclusive", "breaking", "update", "major",
    ]
    .into_iter()
    .collect()
});

/// Keywords of a category
pub fn category_keywords(category: &str) -> Option<&'static [&'static str]> {
    TOPIC_CATEGORIES
        .iter()
        .find(|(name, _)| *name == category)
        .map(|(_, keywords)| *keywords)
}

/// Whether a category name is known
pub fn is_known_category(category: &str) -> bool {
    category == GENERAL_TOPIC || category_keywords(category).is_some()
}

/// Trust score for a source name or URL
pub fn source_trust(source: Option<&str>) -> f64 {
    let source = match source {
        Some(s) if !s.trim().is_empty() => s.to_lowercase(),
        _ => return NEUTRAL_TRUST,
    };

    SOURCE_TRUST
        .iter()
        .find(|(pattern, _)| source.contains(*pattern))
        .map(|(_, trust)| *trust)
        .unwrap_or(NEUTRAL_TRUST)
}
