//! Confirmation as an explicit suspend-point: the calling flow asks, gets a
//! bool back, and continues linearly. No fire-and-forget callbacks.

use std::io::{self, BufRead, Write};

pub trait Confirm {
    fn confirm(&self, prompt: &str) -> io::Result<bool>;
}

/// Interactive prompt on stdin/stderr.
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str) -> io::Result<bool> {
        eprint!("{} [y/N]: ", prompt);
        io::stderr().flush()?;
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(parse_answer(&line))
    }
}

/// Used for `--yes` runs and tests.
pub struct AlwaysYes;

impl Confirm for AlwaysYes {
    fn confirm(&self, _prompt: &str) -> io::Result<bool> {
        Ok(true)
    }
}

fn parse_answer(line: &str) -> bool {
    matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_explicit_yes_confirms() {
        assert!(parse_answer("y\n"));
        assert!(parse_answer("YES\n"));
        assert!(!parse_answer("\n"));
        assert!(!parse_answer("n\n"));
        assert!(!parse_answer("yep\n"));
    }

    #[test]
    fn always_yes_confirms() {
        assert!(AlwaysYes.confirm("destroy everything?").unwrap());
    }
}
