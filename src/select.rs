//! Interactive tag selection.
//!
//! Prints a numbered menu and reads choices line by line until one is valid.
//! Input and output are passed in so the loop can be driven from tests.

use anyhow::{Context, Result, bail};
use std::io::{BufRead, Write};

/// Show `tags` as a 1-based menu on `output` and return the chosen tag.
///
/// Invalid entries are answered with an error line and a fresh prompt. With
/// `max_attempts` unset the loop only ends on a valid choice or end of input;
/// with a bound, running out of attempts is an error.
pub fn select_tag<R, W>(
    tags: &[String],
    input: &mut R,
    output: &mut W,
    max_attempts: Option<u32>,
) -> Result<String>
where
    R: BufRead + ?Sized,
    W: Write + ?Sized,
{
    if tags.is_empty() {
        bail!("no tags to choose from");
    }

    writeln!(output, "Please select a tag to build:")?;
    for (i, tag) in tags.iter().enumerate() {
        writeln!(output, "{}. {}", i + 1, tag)?;
    }

    let mut attempts: u32 = 0;
    loop {
        write!(output, "> ")?;
        output.flush()?;

        let mut line = String::new();
        let read = input
            .read_line(&mut line)
            .context("failed to read tag choice")?;
        if read == 0 {
            bail!("input closed before a tag was selected");
        }

        if let Some(index) = parse_choice(&line, tags.len()) {
            return Ok(tags[index].clone());
        }

        writeln!(
            output,
            "Invalid choice, please enter a number between 1 and {}.",
            tags.len()
        )?;

        attempts = attempts.saturating_add(1);
        if let Some(max) = max_attempts
            && attempts >= max
        {
            bail!("no valid tag selected after {attempts} attempts");
        }
    }
}

/// Map a 1-based menu entry to a 0-based index, if it is in range.
fn parse_choice(line: &str, len: usize) -> Option<usize> {
    let choice: usize = line.trim().parse().ok()?;
    if (1..=len).contains(&choice) {
        Some(choice - 1)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn tags() -> Vec<String> {
        vec!["v3.0.0".into(), "v2.1.0".into(), "v2.0.0".into()]
    }

    fn run(input: &str, max_attempts: Option<u32>) -> (Result<String>, String) {
        let mut reader = Cursor::new(input.as_bytes().to_vec());
        let mut out = Vec::new();
        let result = select_tag(&tags(), &mut reader, &mut out, max_attempts);
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_menu_is_one_based() {
        let (result, out) = run("1\n", None);
        assert_eq!(result.unwrap(), "v3.0.0");
        assert!(out.starts_with("Please select a tag to build:\n1. v3.0.0\n2. v2.1.0\n3. v2.0.0\n"));
    }

    #[test]
    fn test_rejects_garbage_then_out_of_range_then_accepts() {
        let (result, out) = run("abc\n99\n2\n", None);
        assert_eq!(result.unwrap(), "v2.1.0");
        assert_eq!(
            out.matches("Invalid choice, please enter a number between 1 and 3.")
                .count(),
            2
        );
        assert_eq!(out.matches("> ").count(), 3);
    }

    #[test]
    fn test_zero_and_negative_are_out_of_range() {
        let (result, out) = run("0\n-1\n3\n", None);
        assert_eq!(result.unwrap(), "v2.0.0");
        assert_eq!(out.matches("Invalid choice").count(), 2);
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        let (result, _) = run("  2 \r\n", None);
        assert_eq!(result.unwrap(), "v2.1.0");
    }

    #[test]
    fn test_eof_is_an_error() {
        let (result, _) = run("abc\n", None);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("input closed"));
    }

    #[test]
    fn test_bounded_attempts_give_up() {
        let (result, out) = run("x\ny\n1\n", Some(2));
        let err = result.unwrap_err().to_string();
        assert!(err.contains("after 2 attempts"));
        assert_eq!(out.matches("Invalid choice").count(), 2);
    }

    #[test]
    fn test_max_bound_keeps_prompting() {
        let (result, out) = run("x\ny\nz\n3\n", Some(u32::MAX));
        assert_eq!(result.unwrap(), "v2.0.0");
        assert_eq!(out.matches("Invalid choice").count(), 3);
    }

    #[test]
    fn test_empty_tag_list_is_rejected_without_reading() {
        let mut reader = Cursor::new(b"1\n".to_vec());
        let mut out = Vec::new();
        let result = select_tag(&[], &mut reader, &mut out, None);
        assert!(result.is_err());
        assert!(out.is_empty());
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn test_parse_choice_bounds() {
        assert_eq!(parse_choice("1", 3), Some(0));
        assert_eq!(parse_choice("3", 3), Some(2));
        assert_eq!(parse_choice("4", 3), None);
        assert_eq!(parse_choice("", 3), None);
        assert_eq!(parse_choice("1.5", 3), None);
    }
}
