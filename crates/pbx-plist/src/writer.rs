//! Canonical text rendering.
//!
//! Layout rules follow what Xcode itself writes:
//!
//! - one tab per nesting level;
//! - every dictionary entry is `key = value;` on its own line;
//! - arrays and dictionaries always open a multi-line block, even when empty;
//! - inline mode (used for one-line objects) writes `{k = v; }` and `(a, b, )`;
//! - comments follow their value as ` /* text */`.

use std::borrow::Cow;

use pbx_types::{CommentedString, PlistDict, PlistValue};

/// First line of every project file.
pub const UTF8_HEADER: &str = "// !$*UTF8*$!";

/// Render `value` as a complete document: header line, value, newline.
pub fn render(value: &PlistValue) -> String {
    let mut writer = PlistWriter::new();
    writer.raw(UTF8_HEADER);
    writer.raw("\n");
    writer.value(value);
    writer.raw("\n");
    writer.finish()
}

/// Quote a string if the bare form would not survive a re-parse unchanged.
///
/// Bare strings are limited to `[A-Za-z0-9_$./]`. Strings containing `___`
/// are quoted as well, since Xcode treats those as template placeholders,
/// and so are strings starting with `//`, which would lex as a line comment.
pub fn quote(s: &str) -> Cow<'_, str> {
    let bare = !s.is_empty()
        && !s.contains("___")
        && !s.starts_with("//")
        && s
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'$' | b'.' | b'/'));
    if bare {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\U{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    Cow::Owned(out)
}

/// Incremental writer for the plist dialect.
///
/// The project serializer drives it entry by entry so it can interleave
/// section markers and switch single objects to inline mode.
#[derive(Debug, Default)]
pub struct PlistWriter {
    out: String,
    depth: usize,
}

impl PlistWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current nesting depth in tabs.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn indent(&mut self) {
        self.depth += 1;
    }

    pub fn dedent(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Append text verbatim.
    pub fn raw(&mut self, text: &str) {
        self.out.push_str(text);
    }

    /// Append a full line at column zero.
    pub fn line(&mut self, text: &str) {
        self.out.push_str(text);
        self.out.push('\n');
    }

    /// `key = value;` as one or more lines at the current depth.
    pub fn entry(&mut self, key: &CommentedString, value: &PlistValue) {
        self.tabs();
        self.commented(key);
        self.out.push_str(" = ");
        self.value(value);
        self.out.push_str(";\n");
    }

    /// `key = {...};` with the dictionary written on a single line.
    pub fn inline_entry(&mut self, key: &CommentedString, value: &PlistValue) {
        self.tabs();
        self.commented(key);
        self.out.push_str(" = ");
        self.inline_value(value);
        self.out.push_str(";\n");
    }

    /// `key = {` and a newline. Entries written until [`close`](Self::close)
    /// are nested one level deeper.
    pub fn open(&mut self, key: &CommentedString) {
        self.tabs();
        self.commented(key);
        self.out.push_str(" = {\n");
        self.depth += 1;
    }

    /// Close a dictionary started with [`open`](Self::open).
    pub fn close(&mut self) {
        self.dedent();
        self.tabs();
        self.out.push_str("};\n");
    }

    /// A value in multi-line mode, starting at the current cursor.
    pub fn value(&mut self, value: &PlistValue) {
        match value {
            PlistValue::String(s) => self.out.push_str(&quote(s)),
            PlistValue::Commented(s) => self.commented(s),
            PlistValue::Array(items) => {
                self.out.push_str("(\n");
                self.depth += 1;
                for item in items {
                    self.tabs();
                    self.value(item);
                    self.out.push_str(",\n");
                }
                self.depth -= 1;
                self.tabs();
                self.out.push(')');
            }
            PlistValue::Dictionary(dict) => {
                self.out.push_str("{\n");
                self.depth += 1;
                for (key, item) in dict.iter() {
                    self.entry(key, item);
                }
                self.depth -= 1;
                self.tabs();
                self.out.push('}');
            }
        }
    }

    /// A value in single-line mode.
    pub fn inline_value(&mut self, value: &PlistValue) {
        match value {
            PlistValue::String(s) => self.out.push_str(&quote(s)),
            PlistValue::Commented(s) => self.commented(s),
            PlistValue::Array(items) => {
                self.out.push('(');
                for item in items {
                    self.inline_value(item);
                    self.out.push_str(", ");
                }
                self.out.push(')');
            }
            PlistValue::Dictionary(dict) => self.inline_dict(dict),
        }
    }

    fn inline_dict(&mut self, dict: &PlistDict) {
        self.out.push('{');
        for (key, item) in dict.iter() {
            self.commented(key);
            self.out.push_str(" = ");
            self.inline_value(item);
            self.out.push_str("; ");
        }
        self.out.push('}');
    }

    fn commented(&mut self, s: &CommentedString) {
        self.out.push_str(&quote(s.value()));
        if let Some(comment) = s.comment() {
            self.out.push_str(" /* ");
            self.out.push_str(&comment.replace("*/", "* /"));
            self.out.push_str(" */");
        }
    }

    fn tabs(&mut self) {
        for _ in 0..self.depth {
            self.out.push('\t');
        }
    }

    /// Consume the writer and return the rendered text.
    pub fn finish(self) -> String {
        self.out
    }
}
