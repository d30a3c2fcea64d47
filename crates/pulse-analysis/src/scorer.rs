//! Rule-based lexicon scorer producing a compound polarity in `[-1.0, 1.0]`.
//!
//! Word valences sit on a `[-4.0, 4.0]` scale. Each hit is adjusted for
//! preceding boosters and negations, capitalised emphasis and a contrastive
//! "but", then the sum is squashed with `s / sqrt(s² + 15)`.

/// Word valences. Keys are lowercase single words.
const LEXICON: &[(&str, f64)] = &[
    // Positive signals
    ("amazing", 2.8),
    ("awesome", 3.1),
    ("beautiful", 2.9),
    ("best", 3.2),
    ("better", 1.9),
    ("brilliant", 2.8),
    ("celebrate", 2.7),
    ("champion", 2.9),
    ("congrats", 2.4),
    ("congratulations", 2.9),
    ("excellent", 2.7),
    ("excited", 1.4),
    ("exciting", 2.2),
    ("fantastic", 2.6),
    ("glad", 2.0),
    ("good", 1.9),
    ("great", 3.1),
    ("happy", 2.7),
    ("hope", 1.9),
    ("inspiring", 2.2),
    ("like", 1.5),
    ("love", 3.2),
    ("loved", 2.9),
    ("nice", 1.8),
    ("perfect", 2.7),
    ("positive", 2.6),
    ("promising", 1.7),
    ("proud", 2.1),
    ("strong", 2.3),
    ("success", 2.7),
    ("successful", 2.8),
    ("support", 1.7),
    ("thank", 1.5),
    ("thanks", 1.9),
    ("trust", 2.3),
    ("victory", 2.8),
    ("welcome", 2.0),
    ("win", 2.8),
    ("winning", 2.4),
    ("wonderful", 2.7),
    ("yes", 1.7),
    // Negative signals
    ("angry", -2.3),
    ("awful", -2.0),
    ("bad", -2.5),
    ("boring", -1.3),
    ("chaos", -2.5),
    ("corrupt", -3.0),
    ("corruption", -3.0),
    ("crisis", -3.1),
    ("disappointed", -1.9),
    ("disappointing", -2.2),
    ("disaster", -3.1),
    ("fail", -2.5),
    ("failed", -2.3),
    ("failure", -2.3),
    ("fake", -2.1),
    ("fear", -2.2),
    ("hate", -2.7),
    ("horrible", -2.5),
    ("liar", -3.1),
    ("lie", -1.6),
    ("lies", -1.8),
    ("lose", -1.7),
    ("loss", -1.3),
    ("mess", -1.5),
    ("no", -1.2),
    ("poor", -2.1),
    ("problem", -1.7),
    ("protest", -1.0),
    ("sad", -2.1),
    ("scam", -2.7),
    ("shame", -2.1),
    ("stupid", -2.4),
    ("terrible", -2.5),
    ("threat", -2.4),
    ("ugly", -2.3),
    ("violence", -3.1),
    ("waste", -1.8),
    ("weak", -1.9),
    ("worse", -2.1),
    ("worst", -3.1),
    ("wrong", -2.1),
];

const NEGATIONS: &[&str] = &[
    "aint", "arent", "cannot", "cant", "couldnt", "didnt", "doesnt", "dont", "hadnt", "hasnt",
    "havent", "isnt", "neither", "never", "none", "nope", "nor", "not", "nothing", "nowhere",
    "shouldnt", "wasnt", "werent", "without", "wont", "wouldnt",
];

const BOOSTERS: &[(&str, f64)] = &[
    ("absolutely", BOOST_INCR),
    ("completely", BOOST_INCR),
    ("deeply", BOOST_INCR),
    ("especially", BOOST_INCR),
    ("extremely", BOOST_INCR),
    ("highly", BOOST_INCR),
    ("hugely", BOOST_INCR),
    ("incredibly", BOOST_INCR),
    ("really", BOOST_INCR),
    ("so", BOOST_INCR),
    ("super", BOOST_INCR),
    ("totally", BOOST_INCR),
    ("truly", BOOST_INCR),
    ("very", BOOST_INCR),
    ("barely", BOOST_DECR),
    ("hardly", BOOST_DECR),
    ("kinda", BOOST_DECR),
    ("marginally", BOOST_DECR),
    ("slightly", BOOST_DECR),
    ("somewhat", BOOST_DECR),
];

const BOOST_INCR: f64 = 0.293;
const BOOST_DECR: f64 = -0.293;
const CAPS_INCR: f64 = 0.733;
const NEGATION_SCALAR: f64 = -0.74;
const EXCLAMATION_INCR: f64 = 0.292;
const MAX_EXCLAMATIONS: usize = 4;
const QUESTION_INCR: f64 = 0.18;
const QUESTION_CAP: f64 = 0.96;
const NORMALIZATION_ALPHA: f64 = 15.0;

struct Token<'a> {
    raw: &'a str,
    lower: String,
}

fn tokenize(text: &str) -> Vec<Token<'_>> {
    text.split_whitespace()
        .filter_map(|word| {
            let raw = word.trim_matches(|c: char| !c.is_alphanumeric());
            if raw.is_empty() {
                return None;
            }
            Some(Token {
                raw,
                lower: raw.to_lowercase(),
            })
        })
        .collect()
}

fn valence(word: &str) -> Option<f64> {
    LEXICON
        .iter()
        .find(|(lex_word, _)| *lex_word == word)
        .map(|&(_, weight)| weight)
}

fn booster(word: &str) -> Option<f64> {
    BOOSTERS
        .iter()
        .find(|(b, _)| *b == word)
        .map(|&(_, scalar)| scalar)
}

fn is_negation(word: &str) -> bool {
    NEGATIONS.contains(&word)
}

fn is_shouting(word: &str) -> bool {
    word.chars().any(char::is_alphabetic)
        && word
            .chars()
            .filter(|c| c.is_alphabetic())
            .all(char::is_uppercase)
}

/// Score `text` and return the compound polarity.
///
/// Returns `0.0` for empty text, text with no lexicon hits, and any input
/// that produces a non-finite intermediate score.
#[must_use]
pub fn compound_score(text: &str) -> f64 {
    let tokens = tokenize(text);
    if tokens.is_empty() {
        return 0.0;
    }

    let shouting = tokens.iter().filter(|t| is_shouting(t.raw)).count();
    let mixed_case = shouting > 0 && shouting < tokens.len();

    let mut valences: Vec<f64> = Vec::with_capacity(tokens.len());
    for (i, token) in tokens.iter().enumerate() {
        let Some(mut v) = valence(&token.lower) else {
            valences.push(0.0);
            continue;
        };

        if mixed_case && is_shouting(token.raw) {
            v += CAPS_INCR.copysign(v);
        }

        for distance in 1..=3 {
            let Some(prev_idx) = i.checked_sub(distance) else {
                break;
            };
            let prev = &tokens[prev_idx].lower;
            if let Some(scalar) = booster(prev) {
                let damp = match distance {
                    1 => 1.0,
                    2 => 0.95,
                    _ => 0.9,
                };
                v += scalar * v.signum() * damp;
            }
            if is_negation(prev) {
                v *= NEGATION_SCALAR;
            }
        }

        valences.push(v);
    }

    if let Some(but_idx) = tokens.iter().position(|t| t.lower == "but") {
        for (i, v) in valences.iter_mut().enumerate() {
            if i < but_idx {
                *v *= 0.5;
            } else if i > but_idx {
                *v *= 1.5;
            }
        }
    }

    let mut sum: f64 = valences.iter().sum();
    if sum.abs() > f64::EPSILON {
        let emphasis = punctuation_emphasis(text);
        sum += emphasis.copysign(sum);
    }

    let compound = normalize(sum);
    if compound.is_finite() {
        compound.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

fn punctuation_emphasis(text: &str) -> f64 {
    let exclamations = text.matches('!').count().min(MAX_EXCLAMATIONS);
    let questions = text.matches('?').count();
    #[allow(clippy::cast_precision_loss)]
    let ep = exclamations as f64 * EXCLAMATION_INCR;
    #[allow(clippy::cast_precision_loss)]
    let qm = match questions {
        0 | 1 => 0.0,
        2 | 3 => questions as f64 * QUESTION_INCR,
        _ => QUESTION_CAP,
    };
    ep + qm
}

fn normalize(score: f64) -> f64 {
    score / (score * score + NORMALIZATION_ALPHA).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_returns_zero() {
        assert!(compound_score("").abs() < f64::EPSILON);
    }

    #[test]
    fn whitespace_only_returns_zero() {
        assert!(compound_score("   ").abs() < f64::EPSILON);
    }

    #[test]
    fn unknown_text_returns_zero() {
        assert!(compound_score("it was okay today").abs() < f64::EPSILON);
    }

    #[test]
    fn positive_keyword_returns_positive() {
        let score = compound_score("Great rally today!");
        assert!(score > 0.05, "expected positive score, got {score}");
    }

    #[test]
    fn negative_keyword_returns_negative() {
        let score = compound_score("Terrible event");
        assert!(score < -0.05, "expected negative score, got {score}");
    }

    #[test]
    fn negation_flips_polarity() {
        let plain = compound_score("this is good");
        let negated = compound_score("this is not good");
        assert!(plain > 0.0);
        assert!(negated < 0.0, "expected negated score, got {negated}");
    }

    #[test]
    fn booster_increases_magnitude() {
        assert!(compound_score("very good") > compound_score("good"));
        assert!(compound_score("slightly good") < compound_score("good"));
    }

    #[test]
    fn dampener_moves_either_polarity_toward_neutral() {
        let good = compound_score("good");
        let slightly_good = compound_score("slightly good");
        assert!(slightly_good > 0.0 && slightly_good < good);

        let bad = compound_score("bad");
        let barely_bad = compound_score("barely bad");
        assert!(barely_bad < 0.0 && barely_bad > bad, "got {barely_bad} vs {bad}");
    }

    #[test]
    fn booster_strengthens_negative_words() {
        assert!(compound_score("very bad") < compound_score("bad"));
    }

    #[test]
    fn exclamations_increase_magnitude() {
        assert!(compound_score("good!!!") > compound_score("good"));
        assert!(compound_score("bad!!!") < compound_score("bad"));
    }

    #[test]
    fn caps_emphasis_applies_only_to_mixed_case() {
        assert!(compound_score("this is GREAT") > compound_score("this is great"));
    }

    #[test]
    fn clause_after_but_dominates() {
        let score = compound_score("the speech was good but the crowd was terrible");
        assert!(score < 0.0, "expected negative score, got {score}");
    }

    #[test]
    fn score_stays_within_bounds() {
        let text = "great excellent best love awesome amazing wonderful perfect victory win!!!!";
        let score = compound_score(text);
        assert!(score > 0.9 && score <= 1.0, "got {score}");
        let text = "worst terrible disaster crisis violence corrupt liar hate awful!!!!";
        let score = compound_score(text);
        assert!((-1.0..-0.9).contains(&score), "got {score}");
    }

    #[test]
    fn punctuation_stripped_from_words() {
        let score = compound_score("great!");
        assert!(score > 0.0, "expected positive score for 'great!', got {score}");
    }
}
