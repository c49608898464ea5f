//! Colored terminal output helpers.
//!
//! Status messages go to stderr so stdout carries only the values a
//! command produces, ready for piping.

use console::style;

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    eprintln!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a labelled value on stdout: "label: value"
pub fn value(label: &str, value: &str) {
    println!("{}: {}", style(label).dim(), value);
}

/// Print a bare value on stdout.
pub fn raw(value: &str) {
    println!("{value}");
}
