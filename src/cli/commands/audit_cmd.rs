//! `credvault audit`: display the audit trail.
//!
//! Usage:
//!   credvault audit               # show last 50 entries
//!   credvault audit --last 20     # show last 20
//!   credvault audit --since 7d    # entries from last 7 days

use chrono::Utc;

use crate::config::Settings;
use crate::errors::{Result, VaultError};

/// Execute the `audit` command.
#[cfg(feature = "sqlite")]
pub fn execute(settings: &Settings, last: usize, since: Option<&str>) -> Result<()> {
    use crate::audit::AuditLog;
    use crate::cli::output;

    let since_dt = since.map(parse_duration).transpose()?;
    let path = settings.audit_path.as_ref().ok_or_else(|| {
        VaultError::CommandFailed("audit trail is not configured (set audit_path)".into())
    })?;
    if !path.exists() {
        output::info("No audit entries found.");
        return Ok(());
    }
    let audit = AuditLog::open(path)?;
    let entries = audit.query(last, since_dt)?;

    if entries.is_empty() {
        output::info("No audit entries found.");
        return Ok(());
    }

    print_audit_table(&entries);

    Ok(())
}

#[cfg(not(feature = "sqlite"))]
pub fn execute(_settings: &Settings, _last: usize, since: Option<&str>) -> Result<()> {
    since.map(parse_duration).transpose()?;
    Err(VaultError::CommandFailed(
        "audit trail requires the `sqlite` feature".into(),
    ))
}

/// Turn `7d`, `24h` or `30m` into the instant that long ago.
fn parse_duration(input: &str) -> Result<chrono::DateTime<Utc>> {
    let input = input.trim();
    let invalid = || {
        VaultError::CommandFailed(format!(
            "invalid duration '{input}': use a format like 7d, 24h, or 30m"
        ))
    };

    let split = input.char_indices().last().map(|(i, _)| i).ok_or_else(invalid)?;
    let (amount, unit) = input.split_at(split);
    let amount: i64 = amount
        .parse()
        .ok()
        .filter(|n| *n >= 0)
        .ok_or_else(invalid)?;

    let span = match unit {
        "d" => chrono::Duration::try_days(amount),
        "h" => chrono::Duration::try_hours(amount),
        "m" => chrono::Duration::try_minutes(amount),
        _ => None,
    }
    .ok_or_else(invalid)?;

    Utc::now().checked_sub_signed(span).ok_or_else(|| {
        VaultError::CommandFailed(format!("invalid duration '{input}': too far in the past"))
    })
}

/// Print audit entries in a formatted table.
#[cfg(feature = "sqlite")]
fn print_audit_table(entries: &[crate::audit::AuditEntry]) {
    use comfy_table::{ContentArrangement, Table};
    use console::style;

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Time", "Operation", "Owner", "Credential", "Outcome"]);

    for entry in entries {
        table.add_row(vec![
            entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            colorize_operation(&entry.operation),
            entry.owner.clone(),
            entry.credential_id.clone().unwrap_or_else(|| "-".into()),
            colorize_outcome(&entry.outcome),
        ]);
    }

    println!(
        "{}",
        style(format!("{} audit entries:", entries.len())).bold()
    );
    println!("{table}");
}

#[cfg(feature = "sqlite")]
fn colorize_operation(op: &str) -> String {
    use console::style;

    match op {
        "create" => style(op).green().to_string(),
        "update" => style(op).blue().to_string(),
        "delete" => style(op).red().to_string(),
        "reveal" => style(op).yellow().to_string(),
        _ => op.to_string(),
    }
}

#[cfg(feature = "sqlite")]
fn colorize_outcome(outcome: &str) -> String {
    use console::style;

    match outcome {
        "success" => style(outcome).green().to_string(),
        "decryption_failed" | "error" => style(outcome).red().bold().to_string(),
        _ => style(outcome).dim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration_days() {
        let dt = parse_duration("7d").unwrap();
        let diff = Utc::now() - dt;
        // Roughly 7 days (within a few seconds).
        assert!((diff.num_days() - 7).abs() <= 1);
    }

    #[test]
    fn parse_duration_hours() {
        let dt = parse_duration("24h").unwrap();
        let diff = Utc::now() - dt;
        assert!((diff.num_hours() - 24).abs() <= 1);
    }

    #[test]
    fn parse_duration_minutes() {
        let dt = parse_duration("30m").unwrap();
        let diff = Utc::now() - dt;
        assert!((diff.num_minutes() - 30).abs() <= 1);
    }

    #[test]
    fn parse_duration_rejects_garbage() {
        assert!(parse_duration("7w").is_err());
        assert!(parse_duration("xd").is_err());
        assert!(parse_duration("-3h").is_err());
        assert!(parse_duration("").is_err());
    }

    #[test]
    fn parse_duration_rejects_spans_beyond_the_calendar() {
        let err = parse_duration("100000000d").unwrap_err();
        assert!(err.to_string().contains("too far in the past"));
    }
}
