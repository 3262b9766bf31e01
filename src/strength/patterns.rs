//! Weakness pattern detection.
//!
//! Three independent checks, each a yes/no answer about the whole
//! password:
//! - repeated runs: three or more identical characters in a row
//! - sequential runs: three or more ASCII letters (same case) or digits
//!   stepping by +1 or -1 (`abc`, `CBA`, `789`)
//! - common substrings: keyboard walks and well-known passwords, checked
//!   case-insensitively and with common digit/symbol substitutions undone

use std::sync::OnceLock;

use regex::Regex;

/// Well-known passwords. Matched as substrings after normalisation.
pub const COMMON_PASSWORDS: &[&str] = &[
    "password", "123456", "12345678", "qwerty", "abc123", "monkey", "letmein", "trustno1",
    "dragon", "baseball", "iloveyou", "master", "sunshine", "ashley", "bailey", "passw0rd",
    "shadow", "superman", "qazwsx", "michael", "football", "welcome", "jesus", "ninja",
    "mustang", "password123", "123123", "1234567890", "admin",
];

fn keyboard_walk() -> &'static Regex {
    static WALK: OnceLock<Regex> = OnceLock::new();
    WALK.get_or_init(|| {
        Regex::new(r"qwerty|asdfgh|zxcvbn|qazwsx|azerty|1qaz2wsx|123456|654321|abcdef")
            .unwrap_or_else(|_| unreachable!("static keyboard walk pattern is valid"))
    })
}

/// Undo the usual character substitutions (`p@ssw0rd` -> `password`).
fn unleet(lowered: &str) -> String {
    lowered
        .chars()
        .map(|c| match c {
            '0' => 'o',
            '1' | '!' => 'i',
            '3' => 'e',
            '4' | '@' => 'a',
            '5' | '$' => 's',
            '7' => 't',
            other => other,
        })
        .collect()
}

/// True if some character appears three or more times in a row.
pub fn has_repeated_run(password: &str) -> bool {
    let chars: Vec<char> = password.chars().collect();
    chars.windows(3).any(|w| w[0] == w[1] && w[1] == w[2])
}

fn same_sequence_class(a: char, b: char) -> bool {
    (a.is_ascii_lowercase() && b.is_ascii_lowercase())
        || (a.is_ascii_uppercase() && b.is_ascii_uppercase())
        || (a.is_ascii_digit() && b.is_ascii_digit())
}

/// True if the password contains an ascending or descending run of
/// three letters or digits, such as `abc` or `987`.
pub fn has_sequential_run(password: &str) -> bool {
    let chars: Vec<char> = password.chars().collect();
    chars.windows(3).any(|w| {
        if !(same_sequence_class(w[0], w[1]) && same_sequence_class(w[1], w[2])) {
            return false;
        }
        let d1 = w[1] as i32 - w[0] as i32;
        let d2 = w[2] as i32 - w[1] as i32;
        d1 == d2 && d1.abs() == 1
    })
}

/// True if the password contains a keyboard walk or a well-known password.
pub fn has_common_substring(password: &str) -> bool {
    let lowered = password.to_lowercase();
    if keyboard_walk().is_match(&lowered) {
        return true;
    }
    let unleeted = unleet(&lowered);
    COMMON_PASSWORDS
        .iter()
        .any(|word| lowered.contains(word) || unleeted.contains(word))
}

/// True if the whole password is a well-known password.
pub fn is_common_password(password: &str) -> bool {
    let lowered = password.to_lowercase();
    COMMON_PASSWORDS.contains(&lowered.as_str())
}
