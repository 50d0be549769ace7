//! The pretty-printer collaborator (§1, §9): invoked on a completed file's
//! text just before it's written. The core hands it a finished string and
//! never asks it to understand the target-surface grammar — it only
//! normalizes whitespace the way a real formatter's "idempotent on
//! already-formatted input" pass would.

/// Collapses runs of more than one blank line to exactly one, trims
/// trailing whitespace from every line, and ensures the file ends with
/// exactly one trailing newline. Idempotent: running it twice is a no-op.
pub fn format(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0usize;

    for line in text.lines() {
        let trimmed = line.trim_end();
        if trimmed.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(trimmed);
        out.push('\n');
    }

    while out.ends_with("\n\n") {
        out.pop();
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_multiple_blank_lines() {
        let input = "a\n\n\n\nb\n";
        assert_eq!(format(input), "a\n\nb\n");
    }

    #[test]
    fn trims_trailing_whitespace() {
        let input = "a   \nb\t\n";
        assert_eq!(format(input), "a\nb\n");
    }

    #[test]
    fn is_idempotent() {
        let input = "a\n\n\nb\n\n\n\nc\n";
        let once = format(input);
        let twice = format(&once);
        assert_eq!(once, twice);
    }
}
