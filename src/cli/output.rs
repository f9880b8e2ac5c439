//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use colored::{ColoredString, Colorize};

use crate::application::services::CellBand;
use crate::domain::{DeltaBand, LinkKind, PriceBand, Segment};

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print warning (yellow "Warning:" prefix) to stderr
pub fn warning(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "Warning".yellow(), msg);
}

/// Print section header (cyan bold)
pub fn header(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

/// Print indented detail (no color)
pub fn detail(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {}", msg);
}

/// Print plain output (no color, for data)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}

/// Color a cross-reference by what it points to.
pub fn link(kind: LinkKind, text: &str) -> ColoredString {
    match kind {
        LinkKind::Procedure => text.cyan(),
        LinkKind::Diagnosis => text.yellow(),
        LinkKind::GhmRoot => text.green(),
        LinkKind::Node => text.magenta(),
    }
}

/// Render label segments on one line, links colored.
pub fn segments(label: &[Segment]) -> String {
    label
        .iter()
        .map(|segment| match segment {
            Segment::Text(text) => text.replace('\n', " | "),
            Segment::Link { kind, text, .. } => link(*kind, text).to_string(),
        })
        .collect()
}

/// Color an amount by tariff band.
pub fn amount(text: &str, band: CellBand) -> ColoredString {
    match band {
        CellBand::Price(PriceBand::Base) => text.normal(),
        CellBand::Price(PriceBand::ExB) => text.blue(),
        CellBand::Price(PriceBand::ExH) => text.magenta(),
        CellBand::Delta(DeltaBand::Added) | CellBand::Delta(DeltaBand::Higher) => text.green(),
        CellBand::Delta(DeltaBand::Removed) | CellBand::Delta(DeltaBand::Lower) => text.red(),
        CellBand::Delta(DeltaBand::Neutral) => text.dimmed(),
    }
}
