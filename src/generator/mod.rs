//! Random password generation under a character-class policy.
//!
//! Every character is drawn from the thread-local CSPRNG (`rand::rng()`,
//! a ChaCha12 generator seeded from the OS). One character from each
//! enabled class is guaranteed; those guaranteed characters are mixed
//! with the independently drawn remainder by a uniform shuffle, so no
//! class is tied to a fixed slot.

use rand::seq::{IndexedRandom, SliceRandom};
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::{Result, VaultError};

/// Shortest password the generator will produce.
pub const MIN_LENGTH: usize = 8;

/// Longest password the generator will produce.
pub const MAX_LENGTH: usize = 128;

/// Characters removed from every class when `exclude_ambiguous` is set.
pub const AMBIGUOUS: &[char] = &['i', 'l', '1', 'I', 'L', 'O', '0', 'o'];

const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
const DIGITS: &str = "0123456789";
const SPECIAL: &str = "!@#$%^&*-_=+[]{}|;:,.<>?";

/// One of the four selectable character classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    Uppercase,
    Lowercase,
    Digits,
    Special,
}

impl CharClass {
    pub const ALL: [CharClass; 4] = [
        CharClass::Uppercase,
        CharClass::Lowercase,
        CharClass::Digits,
        CharClass::Special,
    ];

    /// The full alphabet of this class, before any exclusion.
    pub fn alphabet(&self) -> &'static str {
        match self {
            Self::Uppercase => UPPERCASE,
            Self::Lowercase => LOWERCASE,
            Self::Digits => DIGITS,
            Self::Special => SPECIAL,
        }
    }
}

fn default_length() -> usize {
    16
}

/// Accepts any JSON number for `length`. Negative or fractional values
/// become 0 so [`GenerationPolicy::resolve`] reports them as a policy error.
fn any_number_length<'de, D>(deserializer: D) -> std::result::Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    if raw.is_finite() && raw >= 0.0 && raw.fract() == 0.0 {
        Ok(raw as usize)
    } else {
        Ok(0)
    }
}

fn default_true() -> bool {
    true
}

/// Input to [`generate`]. Field names match the wire request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationPolicy {
    #[serde(default = "default_length", deserialize_with = "any_number_length")]
    pub length: usize,
    #[serde(default = "default_true")]
    pub use_uppercase: bool,
    #[serde(default = "default_true")]
    pub use_lowercase: bool,
    #[serde(default = "default_true")]
    pub use_digits: bool,
    #[serde(default = "default_true")]
    pub use_special: bool,
    #[serde(default)]
    pub exclude_ambiguous: bool,
}

impl Default for GenerationPolicy {
    fn default() -> Self {
        Self {
            length: default_length(),
            use_uppercase: true,
            use_lowercase: true,
            use_digits: true,
            use_special: true,
            exclude_ambiguous: false,
        }
    }
}

impl GenerationPolicy {
    /// Enabled classes in canonical order.
    pub fn enabled_classes(&self) -> Vec<CharClass> {
        CharClass::ALL
            .into_iter()
            .filter(|class| match class {
                CharClass::Uppercase => self.use_uppercase,
                CharClass::Lowercase => self.use_lowercase,
                CharClass::Digits => self.use_digits,
                CharClass::Special => self.use_special,
            })
            .collect()
    }

    /// Characters of `class` that survive ambiguous-character exclusion.
    fn class_charset(&self, class: CharClass) -> Vec<char> {
        class
            .alphabet()
            .chars()
            .filter(|c| !(self.exclude_ambiguous && AMBIGUOUS.contains(c)))
            .collect()
    }

    /// Per-class character sets after exclusion, validating the policy.
    fn resolve(&self) -> Result<Vec<Vec<char>>> {
        if !(MIN_LENGTH..=MAX_LENGTH).contains(&self.length) {
            return Err(VaultError::InvalidPolicy(format!(
                "length must be between {MIN_LENGTH} and {MAX_LENGTH} (got {})",
                self.length
            )));
        }

        let classes = self.enabled_classes();
        if classes.is_empty() {
            return Err(VaultError::InvalidPolicy(
                "at least one character class must be enabled".into(),
            ));
        }

        let sets: Vec<Vec<char>> = classes
            .into_iter()
            .map(|class| self.class_charset(class))
            .filter(|set| !set.is_empty())
            .collect();

        if sets.is_empty() {
            return Err(VaultError::InvalidPolicy(
                "no characters left after excluding ambiguous characters".into(),
            ));
        }

        Ok(sets)
    }

    /// The effective character set: union of enabled classes minus
    /// excluded ambiguous characters.
    pub fn effective_charset(&self) -> Result<Vec<char>> {
        Ok(self.resolve()?.into_iter().flatten().collect())
    }
}

/// Generate a password satisfying `policy`.
pub fn generate(policy: &GenerationPolicy) -> Result<String> {
    let sets = policy.resolve()?;
    let charset: Vec<char> = sets.iter().flatten().copied().collect();
    let mut rng = rand::rng();

    let mut chars: Vec<char> = Vec::with_capacity(policy.length);

    // One guaranteed character per enabled class. MIN_LENGTH (8) is
    // larger than the number of classes (4), so there is always room.
    for set in &sets {
        if let Some(c) = set.choose(&mut rng) {
            chars.push(*c);
        }
    }

    while chars.len() < policy.length {
        if let Some(c) = charset.choose(&mut rng) {
            chars.push(*c);
        }
    }

    chars.shuffle(&mut rng);
    Ok(chars.into_iter().collect())
}
