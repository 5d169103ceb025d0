//! Right-aligned status lines on stderr.

use std::io::Write;

use console::Style;

/// How a status line reads: the colour of its label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Work done or nothing wrong (green).
    Progress,
    Info,
    Warning,
    Error,
}

impl Tone {
    pub fn style(self) -> Style {
        let style = Style::new().bold();
        match self {
            Tone::Progress => style.green(),
            Tone::Info => style.cyan(),
            Tone::Warning => style.yellow(),
            Tone::Error => style.red(),
        }
    }
}

/// Format `     Missing author.mod v1.2.0`: the label right-aligned to 12
/// columns in the tone's style.
pub fn format_status(tone: Tone, label: &str, message: &str) -> String {
    format!("{:>12} {message}", tone.style().apply_to(label))
}

/// Print a status line to stderr.
pub fn status(tone: Tone, label: &str, message: &str) {
    let _ = writeln!(std::io::stderr(), "{}", format_status(tone, label, message));
}
