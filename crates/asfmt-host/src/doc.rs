//! Printer document fragments
//!
//! Comment printers return a [`Doc`] instead of writing text directly so the
//! visitor stays in charge of indentation and line state.

/// A document fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Doc {
    /// Literal text, emitted verbatim
    Text(String),
    /// Line break, unless the current line holds only indentation
    Hardline,
    Concat(Vec<Doc>),
}

impl Doc {
    pub fn text(text: impl Into<String>) -> Self {
        Doc::Text(text.into())
    }

    /// Flat rendering, for measuring and tests
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out);
        out
    }

    fn render_into(&self, out: &mut String) {
        match self {
            Doc::Text(text) => out.push_str(text),
            Doc::Hardline => {
                if !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
            }
            Doc::Concat(parts) => {
                for part in parts {
                    part.render_into(out);
                }
            }
        }
    }
}

impl From<&str> for Doc {
    fn from(text: &str) -> Self {
        Doc::Text(text.to_string())
    }
}
