//! Lexicon-based sentiment scoring.
//!
//! Each known word carries a polarity in `[-1, 1]` and a subjectivity in
//! `[0, 1]`. A text scores the mean over the known words it contains. An
//! intensifier ("very") scales the next scored word and a negation ("not")
//! flips and halves its polarity.

use std::collections::HashMap;
use std::sync::Arc;

use tidings_core::models::SentimentScore;
use tidings_core::traits::SentimentScorer;

/// (word, polarity, subjectivity)
const LEXICON: &[(&str, f64, f64)] = &[
    ("amazing", 0.6, 0.9),
    ("awful", -1.0, 1.0),
    ("bad", -0.7, 0.67),
    ("beautiful", 0.85, 1.0),
    ("best", 1.0, 0.3),
    ("better", 0.5, 0.5),
    ("boring", -1.0, 1.0),
    ("brilliant", 0.9, 1.0),
    ("calm", 0.3, 0.75),
    ("crisis", -0.3, 0.6),
    ("dangerous", -0.6, 0.9),
    ("dead", -0.2, 0.4),
    ("deadly", -0.4, 0.6),
    ("disappointing", -0.6, 0.7),
    ("disaster", -0.8, 0.8),
    ("easy", 0.43, 0.83),
    ("excellent", 1.0, 1.0),
    ("fail", -0.5, 0.3),
    ("failed", -0.5, 0.3),
    ("fantastic", 0.4, 0.9),
    ("fine", 0.42, 0.5),
    ("good", 0.7, 0.6),
    ("great", 0.8, 0.75),
    ("happy", 0.8, 1.0),
    ("hard", -0.29, 0.54),
    ("hate", -0.8, 0.9),
    ("helpful", 0.5, 0.5),
    ("hope", 0.3, 0.6),
    ("horrible", -1.0, 1.0),
    ("important", 0.4, 1.0),
    ("interesting", 0.5, 0.5),
    ("love", 0.5, 0.6),
    ("lovely", 0.5, 0.75),
    ("nice", 0.6, 1.0),
    ("perfect", 1.0, 1.0),
    ("pleased", 0.5, 0.75),
    ("poor", -0.4, 0.6),
    ("positive", 0.23, 0.55),
    ("negative", -0.3, 0.4),
    ("proud", 0.8, 1.0),
    ("sad", -0.5, 1.0),
    ("safe", 0.5, 0.5),
    ("scary", -0.5, 1.0),
    ("serious", -0.33, 0.67),
    ("strong", 0.43, 0.73),
    ("success", 0.3, 0.4),
    ("successful", 0.75, 0.95),
    ("terrible", -1.0, 1.0),
    ("threat", -0.3, 0.5),
    ("tragic", -0.75, 0.75),
    ("ugly", -0.7, 1.0),
    ("unfortunately", -0.5, 1.0),
    ("violent", -0.8, 0.9),
    ("weak", -0.38, 0.63),
    ("welcome", 0.8, 0.9),
    ("win", 0.8, 0.4),
    ("wonderful", 1.0, 1.0),
    ("worried", -0.3, 0.8),
    ("worse", -0.4, 0.6),
    ("worst", -1.0, 1.0),
    ("wrong", -0.5, 0.9),
];

const INTENSIFIERS: &[(&str, f64)] = &[
    ("very", 1.3),
    ("really", 1.3),
    ("extremely", 1.5),
    ("incredibly", 1.5),
    ("so", 1.2),
    ("quite", 1.1),
];

const NEGATIONS: &[&str] = &["not", "never", "no", "n't", "without"];

/// Polarity multiplier for a negated word.
const NEGATION_FACTOR: f64 = -0.5;

#[derive(Clone)]
pub struct LexiconScorer {
    words: Arc<HashMap<&'static str, (f64, f64)>>,
}

impl LexiconScorer {
    pub fn new() -> Self {
        let words = LEXICON.iter().map(|&(w, p, s)| (w, (p, s))).collect();
        Self {
            words: Arc::new(words),
        }
    }
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self::new()
    }
}

fn tokens(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    for raw in text
        .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .filter(|t| !t.is_empty())
    {
        let lower = raw.to_lowercase();
        match lower.strip_suffix("n't") {
            Some(stem) if !stem.is_empty() => {
                out.push(stem.to_string());
                out.push("n't".to_string());
            }
            _ => out.push(lower.trim_matches('\'').to_string()),
        }
    }
    out
}

impl SentimentScorer for LexiconScorer {
    fn score(&self, text: &str) -> SentimentScore {
        let mut polarity_sum = 0.0;
        let mut subjectivity_sum = 0.0;
        let mut assessed = 0usize;

        let mut intensity = 1.0;
        let mut negated = false;

        for token in tokens(text) {
            if NEGATIONS.contains(&token.as_str()) {
                negated = true;
                continue;
            }
            if let Some(&(_, factor)) = INTENSIFIERS.iter().find(|(w, _)| *w == token) {
                intensity *= factor;
                continue;
            }
            let Some(&(polarity, subjectivity)) = self.words.get(token.as_str()) else {
                continue;
            };

            let mut p = polarity * intensity;
            if negated {
                p *= NEGATION_FACTOR;
            }
            polarity_sum += p.clamp(-1.0, 1.0);
            subjectivity_sum += (subjectivity * intensity).clamp(0.0, 1.0);
            assessed += 1;

            intensity = 1.0;
            negated = false;
        }

        if assessed == 0 {
            return SentimentScore {
                polarity: 0.0,
                subjectivity: 0.0,
            };
        }

        SentimentScore {
            polarity: polarity_sum / assessed as f64,
            subjectivity: subjectivity_sum / assessed as f64,
        }
    }
}
