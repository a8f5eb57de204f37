//! Colored terminal output for command results
//!
//! `colored` honors NO_COLOR, CLICOLOR and CLICOLOR_FORCE.

use std::fmt::Display;
use std::path::Path;

use colored::Colorize;

/// `error: <msg>` on stderr
pub fn error(msg: &(impl Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// `warning: <msg>` on stderr
pub fn warning(msg: &(impl Display + ?Sized)) {
    eprintln!("{}: {}", "warning".yellow(), msg);
}

/// Check mark or cross followed by `msg`
pub fn status(ok: bool, msg: &(impl Display + ?Sized)) {
    let mark = if ok { "✓".green() } else { "✗".red() };
    println!("{mark} {msg}");
}

/// Element path in bold with its classification dimmed
pub fn entry_header(path: &str, kind: &(impl Display + ?Sized)) {
    let path = if path.is_empty() { "(model root)" } else { path };
    println!("{} {}", path.cyan().bold(), format!("<{kind}>").dimmed());
}

/// One indented `name: value` line
pub fn field(name: &(impl Display + ?Sized), value: &(impl Display + ?Sized)) {
    println!("  {}: {}", name.to_string().green(), value);
}

/// Labelled file location, flagged when absent
pub fn location(label: &str, path: &Path) {
    let missing = if path.exists() { "" } else { " (not found)" };
    println!("{}: {}{}", label.green(), path.display(), missing.dimmed());
}

/// Uncolored data (field values, trees, packed notes)
pub fn data(msg: &(impl Display + ?Sized)) {
    println!("{msg}");
}
