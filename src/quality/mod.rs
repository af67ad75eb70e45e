//! 质量评分引擎：对课程文本做确定性的规则评估
//!
//! 三个维度（可读性 / 结构 / 一致性）各 0-100 分，按 0.3/0.4/0.3 加权合成总分，
//! 与阈值比较得到 Quality Gate 结果。纯函数，无网络调用，同一输入永远同一输出。
//!
//! 统一口径：全部分数都在 0-100 刻度上，阈值默认 70.0；对外展示时不再做 0-10 换算。

pub mod consistency;
pub mod readability;
pub mod structure;

use serde::Serialize;

pub use consistency::ConsistencyReport;
pub use readability::{ReadabilityLevel, ReadabilityReport};
pub use structure::StructureReport;

/// 维度权重（之和必须为 1.0）
pub const WEIGHT_READABILITY: f64 = 0.3;
pub const WEIGHT_STRUCTURE: f64 = 0.4;
pub const WEIGHT_CONSISTENCY: f64 = 0.3;

/// 低于该长度（去除首尾空白后）的文本不做启发式分析
pub const MIN_TEXT_LEN: usize = 50;

/// 默认 Quality Gate 阈值（0-100 刻度）
pub const DEFAULT_THRESHOLD: f64 = 70.0;

/// 总体质量等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityLevel {
    Excellent,
    Good,
    Acceptable,
    NeedsImprovement,
    Poor,
    /// 文本过短，无法评估
    Unassessable,
}

impl QualityLevel {
    fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            Self::Excellent
        } else if score >= 80.0 {
            Self::Good
        } else if score >= 70.0 {
            Self::Acceptable
        } else if score >= 60.0 {
            Self::NeedsImprovement
        } else {
            Self::Poor
        }
    }
}

/// 完整质量报告：维度明细 + 加权总分 + Gate 结果 + 改进优先级
#[derive(Debug, Clone, Serialize)]
pub struct QualityReport {
    pub overall_score: f64,
    pub quality_level: QualityLevel,
    pub readability: ReadabilityReport,
    pub structure: StructureReport,
    pub consistency: ConsistencyReport,
    /// overall_score >= threshold
    pub passed: bool,
    pub threshold: f64,
    /// 按维度分数升序排列的改进建议，最多 3 条
    pub improvement_priority: Vec<String>,
}

/// 质量评分器：持有阈值，评估逻辑全部为纯函数
#[derive(Debug, Clone)]
pub struct QualityScorer {
    threshold: f64,
}

impl Default for QualityScorer {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl QualityScorer {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// 评估一段课程文本；过短文本直接返回零分报告而非错误
    pub fn assess(&self, text: &str) -> QualityReport {
        if text.trim().len() < MIN_TEXT_LEN {
            return self.insufficient(text);
        }

        let readability = readability::score(text);
        let structure = structure::score(text);
        let consistency = consistency::score(text);

        let overall = readability.score * WEIGHT_READABILITY
            + structure.score * WEIGHT_STRUCTURE
            + consistency.score * WEIGHT_CONSISTENCY;

        let improvement_priority =
            improvement_priorities(readability.score, structure.score, consistency.score);

        QualityReport {
            overall_score: round1(overall),
            quality_level: QualityLevel::from_score(overall),
            readability,
            structure,
            consistency,
            passed: overall >= self.threshold,
            threshold: self.threshold,
            improvement_priority,
        }
    }

    fn insufficient(&self, text: &str) -> QualityReport {
        QualityReport {
            overall_score: 0.0,
            quality_level: QualityLevel::Unassessable,
            readability: ReadabilityReport::insufficient(text),
            structure: StructureReport::empty(),
            consistency: ConsistencyReport::empty(),
            passed: false,
            threshold: self.threshold,
            improvement_priority: Vec::new(),
        }
    }
}

/// 维度分数低于 70 时给出对应的改进建议，按分数升序最多 3 条
fn improvement_priorities(readability: f64, structure: f64, consistency: f64) -> Vec<String> {
    let mut dims = [
        (readability, "Vereinfache Sprache und Satzstruktur"),
        (structure, "Verbessere Gliederung und füge mehr Beispiele hinzu"),
        (consistency, "Achte auf einheitliche Terminologie und Stil"),
    ];
    dims.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    dims.iter()
        .filter(|(score, _)| *score < 70.0)
        .take(3)
        .map(|(_, hint)| hint.to_string())
        .collect()
}

pub(crate) fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
