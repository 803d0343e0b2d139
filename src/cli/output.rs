//! Terminal output for edit results, rendered trees and config listings
//!
//! Data (JSON, TOML, rendered trees) goes to stdout uncoloured; colour honours
//! NO_COLOR, CLICOLOR and CLICOLOR_FORCE.

use std::fmt::Display;

use colored::Colorize;

/// Width the edit verbs are right-aligned to, as in `  Created one (1)`.
const VERB_WIDTH: usize = 9;

pub fn error(msg: &(impl Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

pub fn warning(msg: &(impl Display + ?Sized)) {
    eprintln!("{}: {}", "warning".yellow().bold(), msg);
}

/// One line per applied edit: `Created`, `Removed`, `Moved`, `Renamed`.
pub fn edited(verb: &str, msg: &(impl Display + ?Sized)) {
    println!("{}", status_line(verb, msg));
}

fn status_line(verb: &str, msg: &(impl Display + ?Sized)) -> String {
    format!("{} {}", format!("{verb:>width$}", width = VERB_WIDTH).green().bold(), msg)
}

/// Shown instead of a tree when there is nothing to render.
pub fn empty_tree(placeholder: &str) {
    println!("{}", placeholder.dimmed().italic());
}

pub fn header(msg: &(impl Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

pub fn detail(msg: &(impl Display + ?Sized)) {
    println!("  {}", msg);
}

/// Machine-readable payload, never coloured.
pub fn data(msg: &(impl Display + ?Sized)) {
    println!("{}", msg);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_short_verb_when_formatted_then_right_aligned() {
        colored::control::set_override(false);

        assert_eq!(status_line("Moved", "two (2) to root"), "    Moved two (2) to root");
        assert_eq!(status_line("Renamed", "x (1)"), "  Renamed x (1)");
    }
}
