//! Interactive questions on the terminal.

use std::io::{self, BufRead, Write};

use super::plan::Selection;

/// The question asked after a text report.
pub const KILL_PROMPT: &str = "Kill files? (all/empty/incompletes/duplicates) [a/e/i/d/N] ";

/// Ask which categories to kill.
///
/// End of input counts as "no".
///
/// # Errors
///
/// Returns an I/O error if writing the prompt or reading the answer fails.
pub fn ask_selection<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> io::Result<Selection> {
    write!(output, "{KILL_PROMPT}")?;
    output.flush()?;

    let mut answer = String::new();
    if input.read_line(&mut answer)? == 0 {
        writeln!(output)?;
        return Ok(Selection::NONE);
    }
    let selection = Selection::from_answer(&answer);
    log::debug!("Kill selection: {selection}");
    Ok(selection)
}

/// Ask before deleting `count` files permanently. Only `y`/`yes` agrees.
///
/// # Errors
///
/// Returns an I/O error if writing the prompt or reading the answer fails.
pub fn confirm_permanent<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    count: usize,
) -> io::Result<bool> {
    write!(output, "Permanently delete {count} file(s)? This cannot be undone. [y/N] ")?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
