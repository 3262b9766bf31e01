//! Property tests for the password generator.

use credvault::errors::VaultError;
use credvault::generator::{generate, GenerationPolicy, AMBIGUOUS, MAX_LENGTH, MIN_LENGTH};
use proptest::prelude::*;

fn policy_strategy() -> impl Strategy<Value = GenerationPolicy> {
    (
        MIN_LENGTH..=MAX_LENGTH,
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_filter("at least one class", |(_, u, l, d, s, _)| *u || *l || *d || *s)
        .prop_map(|(length, u, l, d, s, exclude_ambiguous)| GenerationPolicy {
            length,
            use_uppercase: u,
            use_lowercase: l,
            use_digits: d,
            use_special: s,
            exclude_ambiguous,
        })
}

proptest! {
    #[test]
    fn output_has_requested_length_and_only_allowed_chars(policy in policy_strategy()) {
        let password = generate(&policy).unwrap();
        let charset = policy.effective_charset().unwrap();

        prop_assert_eq!(password.chars().count(), policy.length);
        prop_assert!(password.chars().all(|c| charset.contains(&c)));
        if policy.exclude_ambiguous {
            prop_assert!(password.chars().all(|c| !AMBIGUOUS.contains(&c)));
        }
    }

    #[test]
    fn every_enabled_class_is_represented(policy in policy_strategy()) {
        let password = generate(&policy).unwrap();

        if policy.use_uppercase {
            prop_assert!(password.chars().any(|c| c.is_ascii_uppercase()));
        }
        if policy.use_lowercase {
            prop_assert!(password.chars().any(|c| c.is_ascii_lowercase()));
        }
        if policy.use_digits {
            prop_assert!(password.chars().any(|c| c.is_ascii_digit()));
        }
        if policy.use_special {
            prop_assert!(password.chars().any(|c| !c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn out_of_range_lengths_are_rejected(length in prop_oneof![0usize..MIN_LENGTH, (MAX_LENGTH + 1)..1_000]) {
        let policy = GenerationPolicy { length, ..GenerationPolicy::default() };
        prop_assert!(matches!(generate(&policy), Err(VaultError::InvalidPolicy(_))));
    }
}

#[test]
fn sixteen_chars_without_special_or_ambiguous() {
    let policy = GenerationPolicy {
        length: 16,
        use_special: false,
        exclude_ambiguous: true,
        ..GenerationPolicy::default()
    };
    let password = generate(&policy).unwrap();

    assert_eq!(password.len(), 16);
    assert!(password.chars().all(|c| c.is_ascii_alphanumeric()));
    assert!(password.chars().all(|c| !AMBIGUOUS.contains(&c)));
}

#[test]
fn no_classes_is_an_invalid_policy() {
    let policy = GenerationPolicy {
        use_uppercase: false,
        use_lowercase: false,
        use_digits: false,
        use_special: false,
        ..GenerationPolicy::default()
    };
    assert!(matches!(generate(&policy), Err(VaultError::InvalidPolicy(_))));
}

#[test]
fn default_policy_matches_request_defaults() {
    let from_wire: GenerationPolicy = serde_json::from_str("{}").unwrap();
    assert_eq!(from_wire, GenerationPolicy::default());
    assert_eq!(from_wire.length, 16);
    assert!(!from_wire.exclude_ambiguous);
}

#[test]
fn negative_or_fractional_length_is_an_invalid_policy() {
    for body in [r#"{"length": -1}"#, r#"{"length": 12.5}"#] {
        let policy: GenerationPolicy = serde_json::from_str(body).unwrap();
        assert!(
            matches!(generate(&policy), Err(VaultError::InvalidPolicy(_))),
            "{body}"
        );
    }
    let whole: GenerationPolicy = serde_json::from_str(r#"{"length": 24.0}"#).unwrap();
    assert_eq!(whole.length, 24);
}

#[test]
fn successive_passwords_differ() {
    let policy = GenerationPolicy::default();
    let a = generate(&policy).unwrap();
    let b = generate(&policy).unwrap();
    assert_ne!(a, b);
}
