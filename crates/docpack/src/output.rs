//! Styled progress output on stderr.

use std::fmt::Display;

use console::{Style, Term};

pub(crate) struct Output {
    term: Term,
    plain: Style,
    dim: Style,
    ok: Style,
    warn: Style,
    fail: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            plain: Style::new(),
            dim: Style::new().dim(),
            ok: Style::new().green(),
            warn: Style::new().yellow(),
            fail: Style::new().red().bold(),
        }
    }

    pub(crate) fn info(&self, msg: &str) {
        self.line(&self.plain, msg);
    }

    /// Indented, dimmed detail under the previous line.
    pub(crate) fn detail(&self, msg: &str) {
        self.line(&self.dim, format_args!("  {msg}"));
    }

    pub(crate) fn success(&self, msg: &str) {
        self.line(&self.ok, msg);
    }

    pub(crate) fn warning(&self, msg: &str) {
        self.line(&self.warn, msg);
    }

    pub(crate) fn error(&self, msg: &str) {
        self.line(&self.fail, msg);
    }

    fn line(&self, style: &Style, msg: impl Display) {
        let _ = self.term.write_line(&style.apply_to(msg).to_string());
    }
}
