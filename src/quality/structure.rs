//! 结构评分：四个独立封顶的子项（学习目标 / 示例 / 层级结构 / 总结），各 0-25 分
//!
//! 子项低于 15 分时给出对应的德语改进建议。

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

const SUB_CAP: f64 = 25.0;
/// 子项建议触发线
const GOOD_SUB_SCORE: f64 = 15.0;

fn learning_objective_res() -> &'static Vec<Regex> {
    static RES: OnceLock<Vec<Regex>> = OnceLock::new();
    RES.get_or_init(|| {
        [
            r"nach dieser (lektion|einheit|kapitel)",
            r"sie (werden|können|lernen)",
            r"lernziel",
            r"am ende (dieser|dieses)",
            r"ziel dieser",
        ]
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
    })
}

fn example_res() -> &'static Vec<Regex> {
    static RES: OnceLock<Vec<Regex>> = OnceLock::new();
    RES.get_or_init(|| {
        [
            r"beispiel",
            r"zum beispiel",
            r"z\.b\.",
            r"stellen sie sich vor",
            r"wie wenn",
            r"ähnlich wie",
            r"vergleichbar mit",
        ]
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
    })
}

fn summary_res() -> &'static Vec<Regex> {
    static RES: OnceLock<Vec<Regex>> = OnceLock::new();
    RES.get_or_init(|| {
        [
            r"zusammenfassung",
            r"fazit",
            r"key takeaways",
            r"wichtigste punkte",
            r"merken sie sich",
            r"in dieser lektion haben",
        ]
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
    })
}

fn heading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^#{1,3}\s+.+$").unwrap())
}

fn bullet_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^\s*[-*+]\s+").unwrap())
}

fn numbered_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^\s*\d+\.\s+").unwrap())
}

#[derive(Debug, Clone, Serialize)]
pub struct StructureReport {
    /// 四个子项之和，0-100
    pub score: f64,
    pub learning_objectives: f64,
    pub examples: f64,
    pub outline: f64,
    pub summary: f64,
    pub recommendations: Vec<String>,
}

impl StructureReport {
    pub(crate) fn empty() -> Self {
        Self {
            score: 0.0,
            learning_objectives: 0.0,
            examples: 0.0,
            outline: 0.0,
            summary: 0.0,
            recommendations: Vec::new(),
        }
    }
}

fn check_learning_objectives(lower: &str) -> f64 {
    let hits = learning_objective_res()
        .iter()
        .filter(|re| re.is_match(lower))
        .count();
    ((hits * 5) as f64).min(SUB_CAP)
}

fn check_examples(lower: &str) -> f64 {
    let mut score = 0.0;
    for re in example_res() {
        let matches = re.find_iter(lower).count();
        if matches > 0 {
            score += ((matches * 2) as f64).min(5.0);
        }
    }
    score.min(SUB_CAP)
}

fn check_outline(content: &str) -> f64 {
    let mut score = 0.0;
    score += ((heading_re().find_iter(content).count() * 2) as f64).min(10.0);
    score += (bullet_re().find_iter(content).count() as f64).min(5.0);
    score += (numbered_re().find_iter(content).count() as f64).min(5.0);
    if content.split("\n\n").count() >= 3 {
        score += 5.0;
    }
    score.min(SUB_CAP)
}

fn check_summary(lower: &str) -> f64 {
    let hits = summary_res().iter().filter(|re| re.is_match(lower)).count();
    ((hits * 8) as f64).min(SUB_CAP)
}

pub fn score(content: &str) -> StructureReport {
    let lower = content.to_lowercase();
    let mut recommendations = Vec::new();

    let learning_objectives = check_learning_objectives(&lower);
    if learning_objectives < GOOD_SUB_SCORE {
        recommendations.push(
            "Füge klare Lernziele hinzu (z.B. 'Nach dieser Lektion können Sie...')".to_string(),
        );
    }

    let examples = check_examples(&lower);
    if examples < GOOD_SUB_SCORE {
        recommendations.push("Integriere mehr praktische Beispiele oder Analogien".to_string());
    }

    let outline = check_outline(content);
    if outline < GOOD_SUB_SCORE {
        recommendations.push("Verbessere die logische Gliederung mit Überschriften".to_string());
    }

    let summary = check_summary(&lower);
    if summary < GOOD_SUB_SCORE {
        recommendations.push("Füge eine Zusammenfassung oder Key Takeaways hinzu".to_string());
    }

    StructureReport {
        score: learning_objectives + examples + outline + summary,
        learning_objectives,
        examples,
        outline,
        summary,
        recommendations,
    }
}
