//! Password strength estimation.
//!
//! [`assess`] is a pure function of its input. The percentage is built
//! from three parts:
//!
//! ```text
//! percentage = clamp(length_points + class_points - penalties, 0, 100)
//!
//! length_points = 2.5 per character, counted up to 20 characters   (max 50)
//! class_points  = 12.5 per character class present                 (max 50)
//! penalties     = repeated run 10, sequential run 10, common word 12
//! ```
//!
//! Each penalty applies at most once. `COMMON_PENALTY` must stay below
//! `CLASS_POINTS`: appending a character of a new class can complete a
//! common word (`trustno` + `1`) but can never start a repeated or
//! sequential run, so the class bonus always outweighs what it triggers.
//!
//! Feedback is computed from the same observations but never feeds
//! back into the percentage.

pub mod crack_time;
pub mod patterns;

use serde::{Deserialize, Serialize};

pub use crack_time::{CrackTime, GUESSES_PER_SECOND};

const LENGTH_POINTS_PER_CHAR: f64 = 2.5;
const LENGTH_CAP: usize = 20;
const CLASS_POINTS: f64 = 12.5;
const REPEAT_PENALTY: f64 = 10.0;
const SEQUENCE_PENALTY: f64 = 10.0;
const COMMON_PENALTY: f64 = 12.0;

/// Recommended minimum length; shorter passwords get feedback.
pub const RECOMMENDED_MIN_LENGTH: usize = 8;

/// Length from which no "use a longer password" feedback is given.
const COMFORTABLE_LENGTH: usize = 12;

// Pool sizes used for the keyspace estimate.
const UPPER_POOL: u32 = 26;
const LOWER_POOL: u32 = 26;
const DIGIT_POOL: u32 = 10;
const SYMBOL_POOL: u32 = 33;

/// Five ordered strength tiers, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StrengthTier {
    #[serde(rename = "Very Weak")]
    VeryWeak,
    #[serde(rename = "Weak")]
    Weak,
    #[serde(rename = "Fair")]
    Fair,
    #[serde(rename = "Good")]
    Good,
    #[serde(rename = "Strong")]
    Strong,
}

impl StrengthTier {
    /// Map a percentage to its tier.
    ///
    /// Bands are half-open and cover `[0, 100]` with no gaps:
    /// `[0,25) [25,45) [45,65) [65,85) [85,100]`.
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 85.0 {
            Self::Strong
        } else if percentage >= 65.0 {
            Self::Good
        } else if percentage >= 45.0 {
            Self::Fair
        } else if percentage >= 25.0 {
            Self::Weak
        } else {
            Self::VeryWeak
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::VeryWeak => "Very Weak",
            Self::Weak => "Weak",
            Self::Fair => "Fair",
            Self::Good => "Good",
            Self::Strong => "Strong",
        }
    }

    pub fn color(&self) -> StrengthColor {
        match self {
            Self::VeryWeak => StrengthColor::Red,
            Self::Weak => StrengthColor::Orange,
            Self::Fair => StrengthColor::Yellow,
            Self::Good => StrengthColor::Lime,
            Self::Strong => StrengthColor::Green,
        }
    }
}

/// Color band shown next to the strength meter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrengthColor {
    Red,
    Orange,
    Yellow,
    Lime,
    Green,
}

/// Result of [`assess`]. Serializes to the wire shape
/// `{strength, percentage, color, feedback, crack_time?: {time}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrengthAssessment {
    #[serde(rename = "strength")]
    pub tier: StrengthTier,
    pub percentage: f64,
    pub color: StrengthColor,
    pub feedback: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crack_time: Option<CrackTime>,
}

/// Character classes found in a password.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassProfile {
    pub upper: bool,
    pub lower: bool,
    pub digit: bool,
    pub symbol: bool,
}

impl ClassProfile {
    pub fn of(password: &str) -> Self {
        let mut profile = Self::default();
        for c in password.chars() {
            if c.is_ascii_digit() {
                profile.digit = true;
            } else if c.is_uppercase() {
                profile.upper = true;
            } else if c.is_lowercase() {
                profile.lower = true;
            } else {
                profile.symbol = true;
            }
        }
        profile
    }

    pub fn count(&self) -> usize {
        [self.upper, self.lower, self.digit, self.symbol]
            .iter()
            .filter(|present| **present)
            .count()
    }

    fn pool_size(&self) -> u32 {
        let mut pool = 0;
        if self.upper {
            pool += UPPER_POOL;
        }
        if self.lower {
            pool += LOWER_POOL;
        }
        if self.digit {
            pool += DIGIT_POOL;
        }
        if self.symbol {
            pool += SYMBOL_POOL;
        }
        pool
    }
}

/// Everything the score and the feedback are computed from.
struct Observations {
    length: usize,
    classes: ClassProfile,
    repeated: bool,
    sequential: bool,
    common: bool,
}

impl Observations {
    fn of(password: &str) -> Self {
        Self {
            length: password.chars().count(),
            classes: ClassProfile::of(password),
            repeated: patterns::has_repeated_run(password),
            sequential: patterns::has_sequential_run(password),
            common: patterns::has_common_substring(password),
        }
    }

    fn percentage(&self) -> f64 {
        let length_points = self.length.min(LENGTH_CAP) as f64 * LENGTH_POINTS_PER_CHAR;
        let class_points = self.classes.count() as f64 * CLASS_POINTS;

        let mut penalties = 0.0;
        if self.repeated {
            penalties += REPEAT_PENALTY;
        }
        if self.sequential {
            penalties += SEQUENCE_PENALTY;
        }
        if self.common {
            penalties += COMMON_PENALTY;
        }

        (length_points + class_points - penalties).clamp(0.0, 100.0)
    }

    fn feedback(&self) -> Vec<String> {
        let mut feedback = Vec::new();

        if self.length < RECOMMENDED_MIN_LENGTH {
            feedback.push("Password should be at least 8 characters long".to_string());
        } else if self.length < COMFORTABLE_LENGTH {
            feedback.push("Use 12 or more characters for a stronger password".to_string());
        }
        if !self.classes.upper {
            feedback.push("Add uppercase letters (A-Z)".to_string());
        }
        if !self.classes.lower {
            feedback.push("Add lowercase letters (a-z)".to_string());
        }
        if !self.classes.digit {
            feedback.push("Add numbers (0-9)".to_string());
        }
        if !self.classes.symbol {
            feedback.push("Add special characters (!@#$%^&*)".to_string());
        }
        if self.repeated {
            feedback.push("Avoid repeating characters".to_string());
        }
        if self.sequential {
            feedback.push("Avoid sequences like abc or 123".to_string());
        }
        if self.common {
            feedback.push("Avoid common passwords and keyboard patterns".to_string());
        }

        feedback
    }
}

/// log10 of the effective keyspace an attacker has to search.
fn log10_keyspace(password: &str, obs: &Observations) -> f64 {
    if patterns::is_common_password(password) {
        return (patterns::COMMON_PASSWORDS.len() as f64).log10();
    }
    let pool = obs.classes.pool_size();
    if pool == 0 {
        return 0.0;
    }
    obs.length as f64 * f64::from(pool).log10()
}

/// Score `password`. Never fails; the empty string is `VeryWeak`.
pub fn assess(password: &str) -> StrengthAssessment {
    let obs = Observations::of(password);
    let percentage = obs.percentage();
    let tier = StrengthTier::from_percentage(percentage);

    StrengthAssessment {
        tier,
        percentage,
        color: tier.color(),
        feedback: obs.feedback(),
        crack_time: Some(crack_time::estimate(log10_keyspace(password, &obs))),
    }
}

/// Outcome of checking a password against the minimum acceptance rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordValidation {
    pub is_valid: bool,
    pub issues: Vec<String>,
}

/// Check a password against the minimum acceptance rules: at least 8
/// characters, not a well-known password, and every character class
/// present.
pub fn validate(password: &str) -> PasswordValidation {
    let classes = ClassProfile::of(password);
    let mut issues = Vec::new();

    if password.chars().count() < RECOMMENDED_MIN_LENGTH {
        issues.push("Password must be at least 8 characters long".to_string());
    }
    if patterns::is_common_password(password) {
        issues.push("This password is too common".to_string());
    }
    if !classes.upper {
        issues.push("Password must contain uppercase letters".to_string());
    }
    if !classes.lower {
        issues.push("Password must contain lowercase letters".to_string());
    }
    if !classes.digit {
        issues.push("Password must contain numbers".to_string());
    }
    if !classes.symbol {
        issues.push("Password must contain special characters".to_string());
    }

    PasswordValidation {
        is_valid: issues.is_empty(),
        issues,
    }
}
