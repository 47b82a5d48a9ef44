//! Selection among several eligible candidates (workspace roots, versions, releases)

use std::io::{BufRead, Write};

#[cfg(test)]
use mockall::automock;

/// Picks one of `candidates`, or none
#[cfg_attr(test, automock)]
pub trait Chooser {
    /// Returns the index of the chosen candidate, `None` if the user declined
    fn choose(&self, prompt: &str, candidates: &[String]) -> Option<usize>;
}

/// Interactive chooser: numbered list on stderr, answer read from stdin
pub struct PromptChooser;

impl Chooser for PromptChooser {
    fn choose(&self, prompt: &str, candidates: &[String]) -> Option<usize> {
        let stdin = std::io::stdin();
        let stderr = std::io::stderr();
        ask(&mut stdin.lock(), &mut stderr.lock(), prompt, candidates)
    }
}

fn ask(
    input: &mut impl BufRead,
    output: &mut impl Write,
    prompt: &str,
    candidates: &[String],
) -> Option<usize> {
    if candidates.is_empty() {
        return None;
    }

    writeln!(output, "{prompt}").ok()?;
    for (i, candidate) in candidates.iter().enumerate() {
        writeln!(output, "  {}) {candidate}", i + 1).ok()?;
    }
    write!(output, "> ").ok()?;
    output.flush().ok()?;

    let mut line = String::new();
    input.read_line(&mut line).ok()?;
    parse_selection(&line, candidates.len())
}

/// Parse a 1-based selection; anything else (including empty input) means none
pub fn parse_selection(input: &str, count: usize) -> Option<usize> {
    let number: usize = input.trim().parse().ok()?;
    (1..=count).contains(&number).then(|| number - 1)
}
