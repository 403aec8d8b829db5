use serde::{Deserialize, Serialize};

/// The four annotation kinds produced for every article
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyzerKind {
    Sentiment,
    Topic,
    Summary,
    Relevance,
}

impl AnalyzerKind {
    pub const ALL: [AnalyzerKind; 4] = [
        AnalyzerKind::Sentiment,
        AnalyzerKind::Topic,
        AnalyzerKind::Summary,
        AnalyzerKind::Relevance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sentiment => "sentiment",
            Self::Topic => "topic",
            Self::Summary => "summary",
            Self::Relevance => "relevance",
        }
    }
}

impl std::fmt::Display for AnalyzerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AnalyzerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sentiment" => Ok(Self::Sentiment),
            "topic" => Ok(Self::Topic),
            "summary" => Ok(Self::Summary),
            "relevance" => Ok(Self::Relevance),
            other => Err(format!("Unknown analyzer kind: {}", other)),
        }
    }
}
