//! Startup banner and error lines on stderr.

use console::{Style, Term};

/// Styled stderr writer for the CLI.
///
/// Write failures are ignored: losing a banner line must not stop the server.
pub(crate) struct Output {
    term: Term,
    label: Style,
    warning: Style,
    error: Style,
    address: Style,
}

impl Output {
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            label: Style::new().dim(),
            warning: Style::new().yellow(),
            error: Style::new().red().bold(),
            address: Style::new().cyan().bold(),
        }
    }

    /// The address the server listens on.
    pub(crate) fn serving(&self, host: &str, port: u16) {
        let url = format!("http://{host}:{port}");
        self.line(&format!("Serving on {}", self.address.apply_to(url)));
    }

    /// One `label: value` line of effective configuration.
    pub(crate) fn setting(&self, label: &str, value: impl std::fmt::Display) {
        self.line(&format!("  {} {value}", self.label.apply_to(format!("{label}:"))));
    }

    pub(crate) fn warning(&self, msg: &str) {
        self.line(&self.warning.apply_to(msg).to_string());
    }

    pub(crate) fn error(&self, msg: &str) {
        self.line(&self.error.apply_to(msg).to_string());
    }

    fn line(&self, text: &str) {
        let _ = self.term.write_line(text);
    }
}
