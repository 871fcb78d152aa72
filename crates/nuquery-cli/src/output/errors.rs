//! Error message formatting with actionable suggestions.

use super::colors::ColorSupport;
use nuquery_core::error::QueryError;
use std::error::Error;

/// Error formatter with suggestions
pub struct ErrorFormatter {
    colors: ColorSupport,
}

impl ErrorFormatter {
    pub fn with_colors(colors: ColorSupport) -> Self {
        Self { colors }
    }

    /// Format a query error with its code, a suggestion and the cause chain
    pub fn format_error(&self, error: &QueryError) -> String {
        let mut output = String::new();

        output.push_str(&self.colors.red("error"));
        output.push_str(&format!("[{}]: {}", error.code(), error));
        output.push('\n');

        if let Some(suggestion) = error.suggestion() {
            output.push('\n');
            output.push_str(&self.colors.dim("help"));
            output.push_str(": ");
            output.push_str(suggestion);
            output.push('\n');
        }

        self.push_causes(&mut output, error.source());
        output
    }

    /// Format any other failure that reached the binary edge
    pub fn format_report(&self, error: &anyhow::Error) -> String {
        let mut output = format!("{}: {}\n", self.colors.red("error"), error);
        self.push_causes(&mut output, error.source());
        output
    }

    fn push_causes(&self, output: &mut String, mut source: Option<&(dyn Error + 'static)>) {
        while let Some(err) = source {
            output.push('\n');
            output.push_str(&self.colors.dim("caused by"));
            output.push_str(": ");
            output.push_str(&err.to_string());
            source = err.source();
        }
    }
}
