//! 可读性评分：德语调校的 Flesch-Reading-Ease
//!
//! 句子数 = `[.!?]+` 序列数（至少 1），词数 = `\b\w+\b`，音节用元音组近似；
//! `flesch = 180 - 平均句长 - 58.5 * 平均音节数`，裁剪到 0-100 后分五档。

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use super::round1;

fn sentence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[.!?]+").unwrap())
}

fn word_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b\w+\b").unwrap())
}

fn vowel_group_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[aeiouäöü]+").unwrap())
}

/// Flesch-Score 对应的难度档位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadabilityLevel {
    SehrLeicht,
    Leicht,
    Mittel,
    Schwer,
    SehrSchwer,
    /// 文本过短或无有效内容
    InsufficientText,
}

impl ReadabilityLevel {
    fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Self::SehrLeicht
        } else if score >= 70.0 {
            Self::Leicht
        } else if score >= 60.0 {
            Self::Mittel
        } else if score >= 50.0 {
            Self::Schwer
        } else {
            Self::SehrSchwer
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReadabilityReport {
    pub score: f64,
    pub level: ReadabilityLevel,
    pub sentences: usize,
    pub words: usize,
    pub syllables: usize,
    pub avg_sentence_length: f64,
    pub avg_syllables_per_word: f64,
}

impl ReadabilityReport {
    pub(crate) fn insufficient(text: &str) -> Self {
        Self {
            score: 0.0,
            level: ReadabilityLevel::InsufficientText,
            sentences: 0,
            words: count_words(text),
            syllables: 0,
            avg_sentence_length: 0.0,
            avg_syllables_per_word: 0.0,
        }
    }
}

pub(crate) fn count_words(text: &str) -> usize {
    word_re().find_iter(text).count()
}

fn count_sentences(text: &str) -> usize {
    sentence_re().find_iter(text).count().max(1)
}

/// 元音组启发式：每个词至少算 1 个音节
fn count_syllables(text: &str) -> usize {
    let lower = text.to_lowercase();
    word_re()
        .find_iter(&lower)
        .map(|w| vowel_group_re().find_iter(w.as_str()).count().max(1))
        .sum()
}

pub fn score(text: &str) -> ReadabilityReport {
    let sentences = count_sentences(text);
    let words = count_words(text);
    if words == 0 {
        return ReadabilityReport::insufficient(text);
    }
    let syllables = count_syllables(text);

    let avg_sentence_length = words as f64 / sentences as f64;
    let avg_syllables_per_word = syllables as f64 / words as f64;

    let flesch = 180.0 - avg_sentence_length - avg_syllables_per_word * 58.5;
    let flesch = flesch.clamp(0.0, 100.0);

    ReadabilityReport {
        score: round1(flesch),
        level: ReadabilityLevel::from_score(flesch),
        sentences,
        words,
        syllables,
        avg_sentence_length: round1(avg_sentence_length),
        avg_syllables_per_word: round1(avg_syllables_per_word),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        assert_eq!(count_sentences("Eins. Zwei! Drei?"), 3);
        assert_eq!(count_sentences("kein satzende"), 1);
        assert_eq!(count_words("Python ist eine Sprache"), 4);
    }

    #[test]
    fn test_syllables_have_minimum_one_per_word() {
        // "Pfrt" 没有元音，仍计 1 音节
        assert_eq!(count_syllables("Pfrt"), 1);
        assert_eq!(count_syllables("Auto"), 2);
    }

    #[test]
    fn test_short_sentences_score_high() {
        let easy =
            score("Das ist gut. Das ist klar. Wir üben das. Es geht schnell. Alle machen mit.");
        let hard = score(
            "Die außerordentlich umfangreiche Berücksichtigung sämtlicher wissenschaftstheoretischer \
             Rahmenbedingungen verunmöglicht selbstverständlich eine unmittelbare Operationalisierung.",
        );
        assert!(easy.score > hard.score);
    }

    #[test]
    fn test_score_is_clamped() {
        let r = score("a. a. a. a. a. a.");
        assert!(r.score >= 0.0 && r.score <= 100.0);
    }
}
