//! Terminal output formatting.
//!
//! Every command prints through [`OutputHandler`] so colors and streams stay
//! consistent. Progress goes to stdout, problems to stderr, and
//! machine-readable output (`show`) goes through [`OutputHandler::raw`] so it
//! can be piped.

pub mod colors;
pub mod errors;

use colors::ColorSupport;

/// Prints command progress with consistent markers
pub struct OutputHandler {
    colors: ColorSupport,
}

impl OutputHandler {
    pub fn new() -> Self {
        Self {
            colors: ColorSupport::detect(),
        }
    }

    /// Handler that never emits escape codes
    #[cfg(test)]
    pub fn plain() -> Self {
        Self {
            colors: ColorSupport::disabled(),
        }
    }

    /// Secondary text, dimmed
    pub fn info(&self, message: &str) {
        println!("{}", self.colors.dim(message));
    }

    pub fn success(&self, message: &str) {
        println!("{} {}", self.colors.green("✓"), message);
    }

    /// Non-fatal problem; written to stderr
    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", self.colors.yellow("⚠"), message);
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", self.colors.red("✗"), message);
    }

    /// A line led by `marker` (usually an emoji or bullet)
    pub fn step(&self, marker: &str, message: &str) {
        println!("{} {}", marker, message);
    }

    /// Indented `label: value` line with the labels aligned
    pub fn field(&self, label: &str, value: &str) {
        let label = format!("{}:", label);
        println!("  {:<12} {}", self.colors.dim(&label), value);
    }

    /// Emphasize text inline
    pub fn bold(&self, text: &str) -> String {
        self.colors.bold(text)
    }

    /// Print text untouched, without a trailing newline
    pub fn raw(&self, text: &str) {
        print!("{}", text);
    }
}

impl Default for OutputHandler {
    fn default() -> Self {
        Self::new()
    }
}
