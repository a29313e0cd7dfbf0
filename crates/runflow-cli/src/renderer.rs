//! Terminal rendering of the Markdown produced by the display layer.
//!
//! Rich output goes through termimad, line by line, so headings keep their
//! `#` markers and status lines get their color. `--no-color` prints the
//! Markdown untouched.

use anyhow::Result;
use termimad::{crossterm::style::Color, MadSkin};

/// How a single line is styled in rich mode.
#[derive(Debug, PartialEq, Eq)]
enum LineStyle {
    Title,
    Heading,
    Success,
    Failure,
    Inline,
}

fn line_style(line: &str) -> LineStyle {
    if line.starts_with("# ") {
        LineStyle::Title
    } else if line.starts_with('#') {
        LineStyle::Heading
    } else if line.starts_with('✓') || line.starts_with('✅') {
        LineStyle::Success
    } else if line.starts_with('✗') {
        LineStyle::Failure
    } else {
        LineStyle::Inline
    }
}

/// Terminal renderer that can switch between rich and plain text output
pub struct TerminalRenderer {
    rich_enabled: bool,
    skin: MadSkin,
}

impl TerminalRenderer {
    pub fn new(rich_enabled: bool) -> Self {
        let mut skin = MadSkin::default();
        skin.set_headers_fg(Color::Blue);
        skin.bold.set_fg(Color::Yellow);
        skin.italic.set_fg(Color::Magenta);
        skin.inline_code.set_fg(Color::AnsiValue(245));

        Self { rich_enabled, skin }
    }

    /// Render markdown text to the terminal
    pub fn render(&self, markdown: &str) -> Result<()> {
        if !self.rich_enabled {
            print!("{markdown}");
            return Ok(());
        }

        for line in markdown.lines() {
            match line_style(line) {
                LineStyle::Title => println!("\x1b[1;34m{line}\x1b[0m"),
                LineStyle::Heading => println!("\x1b[36m{line}\x1b[0m"),
                LineStyle::Success => println!("\x1b[32m{line}\x1b[0m"),
                LineStyle::Failure => println!("\x1b[31m{line}\x1b[0m"),
                LineStyle::Inline => {
                    self.skin.print_inline(line);
                    println!();
                }
            }
        }
        Ok(())
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new(true)
    }
}
