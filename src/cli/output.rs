//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::{style, StyledObject};

use crate::strength::{StrengthAssessment, StrengthColor};

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

fn tier_style(assessment: &StrengthAssessment) -> StyledObject<&'static str> {
    let label = style(assessment.tier.label()).bold();
    match assessment.color {
        StrengthColor::Red => label.red(),
        StrengthColor::Orange => label.color256(208),
        StrengthColor::Yellow => label.yellow(),
        StrengthColor::Lime => label.color256(154),
        StrengthColor::Green => label.green(),
    }
}

/// Print a strength assessment as a two-column table plus feedback lines.
pub fn print_strength(assessment: &StrengthAssessment) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Strength", "Score", "Crack time"]);
    table.add_row(vec![
        tier_style(assessment).to_string(),
        format!("{:.1}%", assessment.percentage),
        assessment
            .crack_time
            .as_ref()
            .map_or_else(|| "-".to_string(), |c| c.time.clone()),
    ]);
    println!("{table}");

    for line in &assessment.feedback {
        tip(line);
    }
}
