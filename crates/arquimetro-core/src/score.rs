//! # Score Aggregator
//!
//! Turns selected responses into a category score, a maturity level and
//! deficiency tallies.
//!
//! ## Maturity Levels
//!
//! | Level | Name | Average score (inclusive upper bound) |
//! |-------|------|---------------------------------------|
//! | 1 | Não estabelecido | 1.0 |
//! | 2 | Em desenvolvimento | 2.0 |
//! | 3 | Essencial | 3.0 |
//! | 4 | Consolidado | 4.0 |
//! | 5 | Avançado | 5.0 |
//!
//! The level is read from the average *after* rounding to one decimal, so a
//! displayed `4.0` is always Consolidado.
//!
//! All arithmetic is integer: weights are hundredths, scores are tenths.

use crate::outline::CategoryOutline;
use crate::primitives::SCORE_DECIMALS;
use crate::types::{
    ConfigurationGap, DeficiencySet, DeficiencyType, QuestionId, ResponseOptionId, Weight,
    deserialize_fixed, format_fixed, serialize_fixed,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// SCORE
// =============================================================================

/// An average score on the 0–5 scale, in tenths (`4.0` is `40`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Score(u32);

impl Score {
    #[must_use]
    pub const fn from_tenths(tenths: u32) -> Self {
        Self(tenths)
    }

    #[must_use]
    pub const fn tenths(self) -> u32 {
        self.0
    }

    /// Half-up rounded mean of the given weights, `None` when empty.
    #[must_use]
    pub fn average(weights: &[Weight]) -> Option<Self> {
        let sum: u64 = weights.iter().map(|w| w.hundredths() as u64).sum();
        let count = weights.len() as u64;
        if count == 0 {
            return None;
        }
        // round(sum / count), hundredths to tenths
        let tenths = (sum.saturating_mul(2) + count.saturating_mul(10)) / count.saturating_mul(20);
        Some(Self(u32::try_from(tenths).unwrap_or(u32::MAX)))
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_fixed(self.0, SCORE_DECIMALS))
    }
}

impl Serialize for Score {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_fixed(self.0, SCORE_DECIMALS, serializer)
    }
}

impl<'de> Deserialize<'de> for Score {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_fixed(deserializer, SCORE_DECIMALS, "score").map(Self)
    }
}

// =============================================================================
// MATURITY LEVEL
// =============================================================================

/// Maturity level of a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaturityLevel {
    NaoEstabelecido,
    EmDesenvolvimento,
    Essencial,
    Consolidado,
    Avancado,
}

impl MaturityLevel {
    /// All levels in ascending order.
    pub const ALL: [MaturityLevel; 5] = [
        MaturityLevel::NaoEstabelecido,
        MaturityLevel::EmDesenvolvimento,
        MaturityLevel::Essencial,
        MaturityLevel::Consolidado,
        MaturityLevel::Avancado,
    ];

    /// Map a rounded score onto its level.
    ///
    /// Total over every `Score`; anything above 4.0 is Avançado.
    #[must_use]
    pub fn from_score(score: Score) -> Self {
        match score.tenths() {
            0..=10 => MaturityLevel::NaoEstabelecido,
            11..=20 => MaturityLevel::EmDesenvolvimento,
            21..=30 => MaturityLevel::Essencial,
            31..=40 => MaturityLevel::Consolidado,
            _ => MaturityLevel::Avancado,
        }
    }

    /// Get the level name.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            MaturityLevel::NaoEstabelecido => "Não estabelecido",
            MaturityLevel::EmDesenvolvimento => "Em desenvolvimento",
            MaturityLevel::Essencial => "Essencial",
            MaturityLevel::Consolidado => "Consolidado",
            MaturityLevel::Avancado => "Avançado",
        }
    }

    /// 1-based rank of the level.
    #[must_use]
    pub fn rank(&self) -> u8 {
        match self {
            MaturityLevel::NaoEstabelecido => 1,
            MaturityLevel::EmDesenvolvimento => 2,
            MaturityLevel::Essencial => 3,
            MaturityLevel::Consolidado => 4,
            MaturityLevel::Avancado => 5,
        }
    }

    /// Inclusive upper bound of the level's score range.
    #[must_use]
    pub fn upper_bound(&self) -> Score {
        Score::from_tenths(u32::from(self.rank()) * 10)
    }

}

impl fmt::Display for MaturityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// DEFICIENCY TALLY
// =============================================================================

/// Count of deficiency tags over the selected options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeficiencyTally {
    pub tecnica: u32,
    pub comportamental: u32,
    pub ferramental: u32,
}

impl DeficiencyTally {
    /// Add one to every tag in the set.
    pub fn add(&mut self, tags: &DeficiencySet) {
        for tag in tags.iter() {
            let slot = match tag {
                DeficiencyType::Tecnica => &mut self.tecnica,
                DeficiencyType::Comportamental => &mut self.comportamental,
                DeficiencyType::Ferramental => &mut self.ferramental,
            };
            *slot = slot.saturating_add(1);
        }
    }

    #[must_use]
    pub fn get(&self, tag: DeficiencyType) -> u32 {
        match tag {
            DeficiencyType::Tecnica => self.tecnica,
            DeficiencyType::Comportamental => self.comportamental,
            DeficiencyType::Ferramental => self.ferramental,
        }
    }

    /// Sum of the three tallies.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.tecnica
            .saturating_add(self.comportamental)
            .saturating_add(self.ferramental)
    }
}

// =============================================================================
// CATEGORY SCORE
// =============================================================================

/// Derived score of a category with at least one answered question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub average_score: Score,
    pub maturity_level: MaturityLevel,
    pub answered_questions: u32,
    pub total_questions: u32,
    pub deficiencies: DeficiencyTally,
}

impl CategoryScore {
    /// Every answerable question has been answered.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.total_questions > 0 && self.answered_questions == self.total_questions
    }
}

/// Outcome of assessing one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CategoryAssessment {
    /// Nothing answerable yet ("em configuração").
    InConfiguration { gap: ConfigurationGap },
    /// Answerable questions exist but none is answered.
    Pending { total_questions: u32 },
    /// At least one question is answered.
    Scored { score: CategoryScore },
}

impl CategoryAssessment {
    #[must_use]
    pub fn score(&self) -> Option<&CategoryScore> {
        match self {
            CategoryAssessment::Scored { score } => Some(score),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_in_configuration(&self) -> bool {
        matches!(self, CategoryAssessment::InConfiguration { .. })
    }
}

// =============================================================================
// SCORE AGGREGATOR
// =============================================================================

/// Score Aggregator - Pure function from responses to an assessment.
pub struct ScoreAggregator;

impl ScoreAggregator {
    /// Assess one category.
    ///
    /// Only answerable questions of the outline count. A response whose
    /// option does not belong to its question is ignored.
    #[must_use]
    pub fn assess(
        outline: &CategoryOutline,
        responses: &BTreeMap<QuestionId, ResponseOptionId>,
    ) -> CategoryAssessment {
        if let Some(gap) = outline.gap() {
            return CategoryAssessment::InConfiguration { gap };
        }

        let mut weights = Vec::new();
        let mut deficiencies = DeficiencyTally::default();

        for question in outline.answerable() {
            let Some(option) = responses
                .get(&question.id())
                .and_then(|id| question.option(*id))
            else {
                continue;
            };
            weights.push(option.weight);
            deficiencies.add(&option.deficiency_types);
        }

        let total_questions = outline.answerable_count() as u32;
        let Some(average_score) = Score::average(&weights) else {
            return CategoryAssessment::Pending { total_questions };
        };

        CategoryAssessment::Scored {
            score: CategoryScore {
                average_score,
                maturity_level: MaturityLevel::from_score(average_score),
                answered_questions: weights.len() as u32,
                total_questions,
                deficiencies,
            },
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
