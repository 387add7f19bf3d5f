use std::fmt::Write as _;

/// Indentation-aware text builder for the generated Java sources.
#[derive(Debug, Default)]
pub(crate) struct SourceWriter {
    buf: String,
    depth: usize,
}

impl SourceWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes one indented line.
    pub fn line(&mut self, text: impl AsRef<str>) {
        for _ in 0..self.depth {
            self.buf.push_str("    ");
        }
        let _ = writeln!(self.buf, "{}", text.as_ref());
    }

    /// Writes every line of a multi-line snippet at the current depth.
    pub fn lines(&mut self, text: &str) {
        for line in text.lines() {
            if line.trim().is_empty() {
                self.blank();
            } else {
                self.line(line.trim_end());
            }
        }
    }

    pub fn blank(&mut self) {
        self.buf.push('\n');
    }

    /// Writes `text {` and indents.
    pub fn open(&mut self, text: impl AsRef<str>) {
        self.line(format!("{} {{", text.as_ref()));
        self.depth += 1;
    }

    /// Dedents and writes `}`.
    pub fn close(&mut self) {
        self.close_with("}");
    }

    /// Dedents and writes a custom closer (e.g. `});`).
    pub fn close_with(&mut self, closer: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.line(closer);
    }

    /// Raises the indent without opening a brace (builder chains).
    pub fn indent(&mut self) {
        self.depth += 1;
    }

    pub fn dedent(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub fn finish(self) -> String {
        self.buf
    }
}

/// Formats a Java double literal with stable precision.
pub(crate) fn num(value: f64) -> String {
    format!("{:.2}", value)
}

/// Turns a device name into a legal Java identifier, lowercasing the first
/// character and stripping anything that is not alphanumeric or underscore.
pub(crate) fn java_ident(name: &str) -> String {
    let mut ident: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    if ident.is_empty() {
        ident.push_str("device");
    }
    if ident.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    let mut chars = ident.chars();
    match chars.next() {
        Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
        None => ident,
    }
}
