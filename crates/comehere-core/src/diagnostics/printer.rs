//! Plain-text rendering of a `Diagnostics` collection.

use std::fmt::Write;

use crate::colors::Colors;

use super::Diagnostics;

/// Renders a `Diagnostics` collection as human-readable text.
///
/// Source-aware snippet rendering is deliberately not attempted here: the
/// rewriter runs over files that may be arbitrarily large, and a one-line
/// `severity at span: message` report is enough for both the CLI and for
/// tests that assert against diagnostic text.
pub struct DiagnosticsPrinter<'d> {
    diagnostics: &'d Diagnostics,
    colors: Colors,
}

impl<'d> DiagnosticsPrinter<'d> {
    pub fn new(diagnostics: &'d Diagnostics) -> Self {
        Self {
            diagnostics,
            colors: Colors::OFF,
        }
    }

    pub fn colored(mut self, enabled: bool) -> Self {
        self.colors = Colors::new(enabled);
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    pub fn format(&self, w: &mut impl Write) -> std::fmt::Result {
        for (i, diag) in self.diagnostics.iter().enumerate() {
            if i > 0 {
                w.write_char('\n')?;
            }
            write!(
                w,
                "{}{}{}",
                self.colors.blue, diag, self.colors.reset
            )?;
        }
        Ok(())
    }
}

impl Diagnostics {
    pub fn printer(&self) -> DiagnosticsPrinter<'_> {
        DiagnosticsPrinter::new(self)
    }
}
