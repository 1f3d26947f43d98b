/// Options for JSON output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonOptions {
    /// Whether to pretty-print with indentation (default: false)
    pub pretty: bool,
    /// Indentation string for pretty-printing (default: two spaces)
    pub indent: &'static str,
}

impl Default for JsonOptions {
    fn default() -> Self {
        Self {
            pretty: false,
            indent: "  ",
        }
    }
}

impl JsonOptions {
    /// Compact output.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables pretty-printing with the current indentation.
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    /// Sets the indentation string, which implies pretty-printing.
    pub fn indent(mut self, indent: &'static str) -> Self {
        self.indent = indent;
        self.pretty = true;
        self
    }
}
