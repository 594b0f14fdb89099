//! Rule-based polarity scorer in the VADER family: a valence lexicon with
//! negation, boosters, capitalisation emphasis, contrastive "but" and
//! exclamation amplification, normalised into [-1, 1].

use mood_domain::repositories::scorer::SentimentScorer;
use std::collections::HashMap;

const NEGATION_SCALAR: f64 = -0.74;
const BOOSTER_INCREMENT: f64 = 0.293;
const CAPS_INCREMENT: f64 = 0.733;
const EXCLAMATION_INCREMENT: f64 = 0.292;
const MAX_EXCLAMATIONS: usize = 4;
const NORMALIZATION_ALPHA: f64 = 15.0;
const LOOKBACK: usize = 3;

const VALENCES: &[(&str, f64)] = &[
    // general
    ("good", 1.9),
    ("great", 3.1),
    ("excellent", 2.7),
    ("amazing", 2.8),
    ("awesome", 3.1),
    ("love", 3.2),
    ("like", 1.5),
    ("happy", 2.7),
    ("nice", 1.8),
    ("best", 3.2),
    ("win", 2.8),
    ("winning", 2.4),
    ("profit", 1.9),
    ("profits", 1.9),
    ("gain", 2.0),
    ("gains", 2.0),
    ("strong", 2.3),
    ("safe", 1.9),
    ("hope", 1.9),
    ("optimistic", 1.3),
    ("confident", 2.2),
    ("bad", -2.5),
    ("terrible", -2.1),
    ("awful", -2.0),
    ("horrible", -2.5),
    ("worst", -3.1),
    ("hate", -2.7),
    ("sad", -2.1),
    ("fear", -2.2),
    ("scared", -1.9),
    ("panic", -2.3),
    ("loss", -1.3),
    ("losses", -1.7),
    ("lose", -1.7),
    ("losing", -1.6),
    ("lost", -1.3),
    ("weak", -1.9),
    ("risk", -1.1),
    ("risky", -1.4),
    ("worried", -1.2),
    ("scam", -2.7),
    ("fraud", -2.8),
    ("crash", -1.7),
    ("crashed", -1.7),
    ("crashing", -1.7),
    ("dead", -3.3),
    ("broke", -1.8),
    ("rekt", -2.4),
    ("ugly", -2.3),
    ("stupid", -2.4),
    // market slang
    ("bullish", 2.0),
    ("bull", 1.2),
    ("moon", 1.6),
    ("mooning", 2.2),
    ("pump", 1.2),
    ("pumping", 1.6),
    ("rally", 1.8),
    ("hodl", 0.8),
    ("ath", 1.5),
    ("bearish", -2.0),
    ("bear", -1.2),
    ("dump", -1.5),
    ("dumping", -1.8),
    ("rugpull", -2.9),
    ("rug", -1.5),
    ("bleeding", -2.0),
    ("fud", -1.5),
    ("bagholder", -1.2),
    ("selloff", -1.6),
    // emoji
    ("🚀", 1.8),
    ("📈", 1.5),
    ("📉", -1.5),
    ("💎", 1.2),
    ("🔥", 1.3),
    ("😭", -1.8),
    ("💀", -1.4),
];

const BOOSTERS_UP: &[&str] = &[
    "absolutely",
    "completely",
    "extremely",
    "hugely",
    "incredibly",
    "really",
    "so",
    "totally",
    "very",
    "super",
    "most",
    "more",
];

const BOOSTERS_DOWN: &[&str] = &[
    "barely",
    "hardly",
    "kinda",
    "slightly",
    "somewhat",
    "little",
    "less",
    "marginally",
];

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "none", "nothing", "neither", "nor", "nobody", "without", "cannot",
    "dont", "don't", "doesnt", "doesn't", "isnt", "isn't", "wasnt", "wasn't", "wont", "won't",
    "cant", "can't", "aint", "ain't", "shouldnt", "shouldn't", "wouldnt", "wouldn't",
];

#[derive(Debug, Clone)]
pub struct LexiconScorer {
    valences: HashMap<String, f64>,
    boosters: HashMap<String, f64>,
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
struct Token<'a> {
    raw: &'a str,
    lower: String,
}

impl Token<'_> {
    fn is_shouting(&self) -> bool {
        self.raw.chars().any(|c| c.is_alphabetic())
            && self.raw.chars().all(|c| !c.is_lowercase())
            && self.raw.chars().filter(|c| c.is_alphabetic()).count() > 1
    }
}

impl LexiconScorer {
    pub fn new() -> Self {
        let valences = VALENCES
            .iter()
            .map(|(word, value)| ((*word).to_string(), *value))
            .collect();
        let boosters = BOOSTERS_UP
            .iter()
            .map(|word| ((*word).to_string(), BOOSTER_INCREMENT))
            .chain(
                BOOSTERS_DOWN
                    .iter()
                    .map(|word| ((*word).to_string(), -BOOSTER_INCREMENT)),
            )
            .collect();
        Self { valences, boosters }
    }

    /// Adds or overrides entries; values are on the -4..=4 valence scale.
    pub fn with_entries<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        for (word, value) in entries {
            self.valences.insert(word.into().to_lowercase(), value);
        }
        self
    }

    fn tokenize(text: &str) -> Vec<Token<'_>> {
        text.split_whitespace()
            .filter_map(|piece| {
                let raw = piece.trim_matches(|c: char| {
                    c.is_ascii_punctuation() && c != '\'' && c != '$'
                });
                let raw = raw.trim_start_matches('$');
                if raw.is_empty() {
                    None
                } else {
                    Some(Token {
                        raw,
                        lower: raw.to_lowercase(),
                    })
                }
            })
            .collect()
    }

    fn is_negation(token: &Token<'_>) -> bool {
        NEGATIONS.contains(&token.lower.as_str()) || token.lower.ends_with("n't")
    }

    fn valence_at(&self, tokens: &[Token<'_>], index: usize, caps_differential: bool) -> f64 {
        let token = &tokens[index];
        let Some(base) = self.valences.get(&token.lower).copied() else {
            return 0.0;
        };

        let mut valence = base;
        if caps_differential && token.is_shouting() {
            valence += CAPS_INCREMENT * valence.signum();
        }

        for distance in 1..=LOOKBACK.min(index) {
            let previous = &tokens[index - distance];
            if self.valences.contains_key(&previous.lower) {
                continue;
            }
            if let Some(boost) = self.boosters.get(&previous.lower) {
                let mut scalar = *boost * valence.signum();
                if caps_differential && previous.is_shouting() {
                    scalar += CAPS_INCREMENT * valence.signum();
                }
                valence += scalar * (1.0 - 0.05 * (distance as f64 - 1.0));
            }
        }

        if (1..=LOOKBACK.min(index)).any(|distance| Self::is_negation(&tokens[index - distance])) {
            valence *= NEGATION_SCALAR;
        }
        valence
    }

    fn exclamation_emphasis(text: &str) -> f64 {
        text.chars().filter(|c| *c == '!').count().min(MAX_EXCLAMATIONS) as f64
            * EXCLAMATION_INCREMENT
    }

    fn normalize(sum: f64) -> f64 {
        let score = sum / (sum * sum + NORMALIZATION_ALPHA).sqrt();
        score.clamp(-1.0, 1.0)
    }
}

impl SentimentScorer for LexiconScorer {
    fn polarity(&self, text: &str) -> f64 {
        let tokens = Self::tokenize(text);
        if tokens.is_empty() {
            return 0.0;
        }

        let shouting = tokens.iter().filter(|token| token.is_shouting()).count();
        let caps_differential = shouting > 0 && shouting < tokens.len();

        let mut valences: Vec<f64> = (0..tokens.len())
            .map(|index| self.valence_at(&tokens, index, caps_differential))
            .collect();

        if let Some(pivot) = tokens.iter().position(|token| token.lower == "but") {
            for (index, valence) in valences.iter_mut().enumerate() {
                if index < pivot {
                    *valence *= 0.5;
                } else if index > pivot {
                    *valence *= 1.5;
                }
            }
        }

        let mut sum: f64 = valences.iter().sum();
        if sum == 0.0 {
            return 0.0;
        }
        let emphasis = Self::exclamation_emphasis(text);
        sum += emphasis * sum.signum();
        Self::normalize(sum)
    }
}
