//! Human-readable report.
//!
//! ```text
//! Empty files:
//!  X        0 B 19.10.2026 08:12:01 empty.log
//!
//! Incompletes:
//!  =    4.4 GiB 18.10.2026 22:40:13 debian.iso
//!  X    1.2 GiB 18.10.2026 21:02:55 debian.iso.part
//!
//! Duplicates:
//!  =     12.0 KiB 01.02.2026 10:00:00 notes.txt
//!  X     12.0 KiB 03.02.2026 09:30:00 notes (copy).txt
//! ```
//!
//! ` X ` marks a file the kill plan would remove, ` = ` one it keeps. Sizes
//! and modification times are read from disk while rendering.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use bytesize::ByteSize;
use chrono::{DateTime, Utc};
use yansi::Paint;

use crate::actions::KillPlan;
use crate::engine::{by_short_name, by_size_desc, Classification};

/// Modification time format, always in UTC.
pub const TIME_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

/// Text report formatter.
pub struct TextOutput<'a> {
    classification: &'a Classification,
    plan: &'a KillPlan,
    color: bool,
}

impl<'a> TextOutput<'a> {
    /// Create a new text formatter.
    #[must_use]
    pub fn new(classification: &'a Classification, plan: &'a KillPlan) -> Self {
        Self {
            classification,
            plan,
            color: false,
        }
    }

    /// Enable or disable ANSI colors.
    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Write the report.
    ///
    /// Sections with nothing in them are left out.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let c = self.classification;

        if !c.zero_length.is_empty() {
            self.heading(writer, "Empty files:")?;
            for path in &c.zero_length {
                self.line(writer, path)?;
            }
            writeln!(writer)?;
        }

        if !c.incomplete.is_empty() {
            self.heading(writer, "Incompletes:")?;
            for (superset, prefixes) in &c.incomplete {
                let mut group: Vec<(&Path, u64)> = std::iter::once(superset)
                    .chain(prefixes)
                    .map(|p| (p.as_path(), fs::metadata(p).map_or(0, |m| m.len())))
                    .collect();
                group.sort_by(|a, b| by_size_desc(*a, *b));
                for (path, _) in group {
                    self.line(writer, path)?;
                }
                writeln!(writer)?;
            }
        }

        if !c.duplicate.is_empty() {
            self.heading(writer, "Duplicates:")?;
            for (first, rest) in &c.duplicate {
                let mut group: Vec<&Path> = std::iter::once(first)
                    .chain(rest)
                    .map(|p| p.as_path())
                    .collect();
                group.sort_by(|a, b| by_short_name(a, b));
                for path in group {
                    self.line(writer, path)?;
                }
                writeln!(writer)?;
            }
        }

        Ok(())
    }

    /// Render the report into a string.
    #[must_use]
    pub fn render(&self) -> String {
        let mut buffer = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.write_to(&mut buffer);
        String::from_utf8_lossy(&buffer).into_owned()
    }

    fn heading<W: Write>(&self, writer: &mut W, title: &str) -> io::Result<()> {
        if self.color {
            writeln!(writer, "{}", title.bold())
        } else {
            writeln!(writer, "{title}")
        }
    }

    fn line<W: Write>(&self, writer: &mut W, path: &Path) -> io::Result<()> {
        let killed = self.plan.is_killed(path);
        let marker = if killed { " X " } else { " = " };
        let (size, modified) = describe(path);
        let details = format!("{size:>10} {modified}");

        if self.color {
            let marker = if killed { marker.red().bold() } else { marker.green().bold() };
            writeln!(writer, "{marker} {} {}", details.dim(), path.display())
        } else {
            writeln!(writer, "{marker} {details} {}", path.display())
        }
    }
}

/// Humanized size and modification time, or `?` where unavailable.
fn describe(path: &Path) -> (String, String) {
    match fs::metadata(path) {
        Ok(meta) => {
            let size = ByteSize::b(meta.len()).to_string();
            let modified = meta
                .modified()
                .map(|t| DateTime::<Utc>::from(t).format(TIME_FORMAT).to_string())
                .unwrap_or_else(|_| "?".to_string());
            (size, modified)
        }
        Err(_) => ("?".to_string(), "?".to_string()),
    }
}
