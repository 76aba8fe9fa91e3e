//! Labeled, colored status lines for the terminal.
//!
//! Color is only applied when the target stream is a TTY. Every printer has a
//! `*_to_with_tty` variant that writes to an arbitrary sink so the build flow
//! can route its output and tests can inspect it.

use console::{Color, Term, style};
use std::io::{self, Write};

fn stderr_is_tty() -> bool {
    Term::stderr().is_term()
}

fn stdout_is_tty() -> bool {
    Term::stdout().is_term()
}

fn format_label(label: &str, color: Color, is_tty: bool) -> String {
    if is_tty {
        style(label).bold().fg(color).to_string()
    } else {
        label.to_string()
    }
}

fn write_labeled(
    label: &str,
    color: Color,
    msg: &str,
    w: &mut dyn Write,
    is_tty: bool,
) -> io::Result<()> {
    let label = format_label(label, color, is_tty);
    if msg.is_empty() {
        writeln!(w, "{label}")
    } else {
        writeln!(w, "{label} {msg}")
    }
}

pub fn action_to_with_tty(w: &mut dyn Write, label: &str, msg: &str, is_tty: bool) {
    let _ = write_labeled(label, Color::Cyan, msg, w, is_tty);
}

pub fn success_to_with_tty(w: &mut dyn Write, label: &str, msg: &str, is_tty: bool) {
    let _ = write_labeled(label, Color::Green, msg, w, is_tty);
}

pub fn warn_to_with_tty(w: &mut dyn Write, msg: &str, is_tty: bool) {
    let _ = write_labeled("Warning", Color::Yellow, msg, w, is_tty);
}

pub fn fail_to_with_tty(w: &mut dyn Write, label: &str, msg: &str, is_tty: bool) {
    let _ = write_labeled(label, Color::Red, msg, w, is_tty);
}

pub fn detail_to_with_tty(w: &mut dyn Write, msg: &str, is_tty: bool) {
    let line = if is_tty {
        style(format!("  {msg}")).dim().to_string()
    } else {
        format!("  {msg}")
    };
    let _ = writeln!(w, "{line}");
}

pub fn warn(msg: &str) {
    warn_to_with_tty(&mut io::stderr(), msg, stderr_is_tty());
}

pub fn fail(label: &str, msg: &str) {
    fail_to_with_tty(&mut io::stderr(), label, msg, stderr_is_tty());
}

pub fn is_stdout_tty() -> bool {
    stdout_is_tty()
}

pub fn is_stderr_tty() -> bool {
    stderr_is_tty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(f: impl FnOnce(&mut Vec<u8>)) -> String {
        let mut buf = Vec::new();
        f(&mut buf);
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn plain_label_and_message_without_tty() {
        let out = render(|w| action_to_with_tty(w, "Starting", "osx build", false));
        assert_eq!(out, "Starting osx build\n");
    }

    #[test]
    fn empty_message_prints_label_only() {
        let out = render(|w| success_to_with_tty(w, "Finished", "", false));
        assert_eq!(out, "Finished\n");
    }

    #[test]
    fn warning_uses_fixed_label() {
        let out = render(|w| warn_to_with_tty(w, "skipping platform 'freebsd'", false));
        assert_eq!(out, "Warning skipping platform 'freebsd'\n");
    }

    #[test]
    fn detail_is_indented() {
        let out = render(|w| detail_to_with_tty(w, "docker run --rm", false));
        assert_eq!(out, "  docker run --rm\n");
    }

    #[test]
    fn tty_output_keeps_message_text() {
        let out = render(|w| fail_to_with_tty(w, "Error", "boom", true));
        assert!(out.contains("Error"));
        assert!(out.ends_with(" boom\n"));
    }
}
