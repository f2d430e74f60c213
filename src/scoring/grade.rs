//! Letter grades for session scores.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum GradeError {
    #[error("score {0} is outside 0-100")]
    OutOfRange(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LetterGrade {
    #[serde(rename = "A+")]
    APlus,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A−")]
    AMinus,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "B−")]
    BMinus,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "C−")]
    CMinus,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "F")]
    F,
}

/// Inclusive minimum score for each grade, checked top-down
const THRESHOLDS: [(f64, LetterGrade); 10] = [
    (97.0, LetterGrade::APlus),
    (93.0, LetterGrade::A),
    (90.0, LetterGrade::AMinus),
    (87.0, LetterGrade::BPlus),
    (83.0, LetterGrade::B),
    (80.0, LetterGrade::BMinus),
    (77.0, LetterGrade::CPlus),
    (73.0, LetterGrade::C),
    (70.0, LetterGrade::CMinus),
    (60.0, LetterGrade::D),
];

/// Grade a 0-100 score.
pub fn grade(score: f64) -> Result<LetterGrade, GradeError> {
    if !(0.0..=100.0).contains(&score) {
        return Err(GradeError::OutOfRange(score));
    }
    Ok(
        THRESHOLDS
            .iter()
            .find(|(min, _)| score >= *min)
            .map(|(_, g)| *g)
            .unwrap_or(LetterGrade::F),
    )
}

impl LetterGrade {
    /// Display form; minus grades use U+2212
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::APlus => "A+",
            Self::A => "A",
            Self::AMinus => "A−",
            Self::BPlus => "B+",
            Self::B => "B",
            Self::BMinus => "B−",
            Self::CPlus => "C+",
            Self::C => "C",
            Self::CMinus => "C−",
            Self::D => "D",
            Self::F => "F",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "A+" => Some(Self::APlus),
            "A" => Some(Self::A),
            "A−" => Some(Self::AMinus),
            "B+" => Some(Self::BPlus),
            "B" => Some(Self::B),
            "B−" => Some(Self::BMinus),
            "C+" => Some(Self::CPlus),
            "C" => Some(Self::C),
            "C−" => Some(Self::CMinus),
            "D" => Some(Self::D),
            "F" => Some(Self::F),
            _ => None,
        }
    }

    /// Colour family for badges on the report page
    pub fn tone(&self) -> &'static str {
        match self {
            Self::APlus | Self::A | Self::AMinus => "success",
            Self::BPlus | Self::B | Self::BMinus => "primary",
            Self::CPlus | Self::C | Self::CMinus => "warning",
            Self::D | Self::F => "danger",
        }
    }
}

impl std::fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
