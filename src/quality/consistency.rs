//! 一致性评分：术语统一（0-40）+ 写作风格（0-30）+ 逻辑连贯（0-30）
//!
//! 三个子项各有下限（20/15/15），避免单一问题把维度打到零。

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use super::readability::count_words;
use super::round1;

fn term_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b[A-ZÄÖÜ][a-zäöüß]+(?:[A-ZÄÖÜ][a-zäöüß]*)*\b").unwrap())
}

fn du_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(du|dich|dir|dein)\b").unwrap())
}

fn sie_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bsie\b").unwrap())
}

fn present_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(ist|sind|haben|werden)\b").unwrap())
}

fn past_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(war|waren|hatten|wurden)\b").unwrap())
}

fn transition_res() -> &'static Vec<Regex> {
    static RES: OnceLock<Vec<Regex>> = OnceLock::new();
    RES.get_or_init(|| {
        [
            "jedoch",
            "aber",
            "dennoch",
            "trotzdem",
            "außerdem",
            "darüber hinaus",
            "zusätzlich",
            "deshalb",
            "daher",
            "folglich",
            "zunächst",
            "danach",
            "schließlich",
        ]
        .iter()
        .map(|w| Regex::new(&format!(r"(?i)\b{w}\b")).unwrap())
        .collect()
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct ConsistencyReport {
    /// 三个子项之和，0-100
    pub score: f64,
    pub terminology: f64,
    pub style: f64,
    pub coherence: f64,
    pub issues: Vec<String>,
}

impl ConsistencyReport {
    pub(crate) fn empty() -> Self {
        Self {
            score: 0.0,
            terminology: 0.0,
            style: 0.0,
            coherence: 0.0,
            issues: Vec::new(),
        }
    }
}

/// 大写开头词的唯一比率越高说明术语越分散
fn check_terminology(content: &str) -> f64 {
    let terms: Vec<&str> = term_re().find_iter(content).map(|m| m.as_str()).collect();
    if terms.is_empty() {
        return 40.0;
    }
    let unique: std::collections::HashSet<&&str> = terms.iter().collect();
    let ratio = unique.len() as f64 / terms.len() as f64;
    (40.0 * (1.0 - ratio.min(0.5))).max(20.0)
}

fn check_style(content: &str) -> f64 {
    let mut score: f64 = 30.0;

    let du = du_re().find_iter(content).count();
    let sie = sie_re().find_iter(content).count();
    if du > 0 && sie > 0 {
        score -= 10.0;
    }

    let present = present_re().find_iter(content).count();
    let past = past_re().find_iter(content).count();
    if present > 0 && past as f64 > present as f64 * 0.3 {
        score -= 5.0;
    }

    score.max(15.0)
}

/// 过渡词密度：每 100 词期望至少 0.5 个衔接词
fn check_coherence(content: &str) -> f64 {
    let transitions: usize = transition_res()
        .iter()
        .map(|re| re.find_iter(content).count())
        .sum();
    let expected = count_words(content) as f64 / 100.0;
    if expected <= 0.0 || transitions as f64 >= expected * 0.5 {
        return 30.0;
    }
    (transitions as f64 / expected * 30.0).max(15.0)
}

pub fn score(content: &str) -> ConsistencyReport {
    let terminology = check_terminology(content);
    let style = check_style(content);
    let coherence = check_coherence(content);

    let mut issues = Vec::new();
    if terminology < 25.0 {
        issues.push("Inkonsistente Verwendung von Fachbegriffen entdeckt".to_string());
    }
    if style < 20.0 {
        issues.push("Uneinheitlicher Schreibstil (Du/Sie, Zeitformen)".to_string());
    }
    if coherence < 20.0 {
        issues.push("Logischer Aufbau könnte verbessert werden".to_string());
    }

    ConsistencyReport {
        score: round1(terminology + style + coherence),
        terminology,
        style,
        coherence,
        issues,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_capitalized_terms_scores_full() {
        assert_eq!(check_terminology("nur kleingeschriebene wörter hier"), 40.0);
    }

    #[test]
    fn test_mixed_address_forms_are_penalized() {
        let mixed = check_style("Du lernst viel. Sie lernen auch viel.");
        let pure = check_style("Sie lernen viel. Sie üben auch viel.");
        assert!(mixed < pure);
    }

    #[test]
    fn test_transition_density_caps_at_full_score() {
        let dense =
            "Zunächst üben wir. Danach vertiefen wir. Deshalb klappt es. Schließlich feiern wir.";
        assert_eq!(check_coherence(dense), 30.0);
    }

    #[test]
    fn test_style_floor_holds_under_both_penalties() {
        // Du/Sie 混用 + 过去时占比过高，两项扣分叠加后仍停在下限
        let worst = "Du warst da. Sie waren auch da. Wir hatten nichts, es wurden Fehler gemacht. \
                     Dein Heft war leer, dir war das egal. Es ist selten, dass etwas ist.";
        assert_eq!(check_style(worst), 15.0);
    }

    #[test]
    fn test_sub_scores_respect_floors_and_caps() {
        let texts = [
            "Du und Sie. Es war so, sie waren da, wir hatten nichts, es wurden Fehler gemacht. Es ist heute anders.",
            "Begriff Wort Sache Ding Thema Aspekt Punkt Element Faktor Bereich Feld Ebene",
            "ohne großbuchstaben und ohne übergänge aber mit sehr vielen wörtern die einfach so weiterlaufen und laufen und laufen",
        ];
        for t in texts {
            let r = score(t);
            assert!(r.terminology >= 20.0 && r.terminology <= 40.0, "{t}");
            assert!(r.style >= 15.0 && r.style <= 30.0, "{t}");
            assert!(r.coherence >= 15.0 && r.coherence <= 30.0, "{t}");
            assert!(r.score <= 100.0);
        }
    }
}
