//! Recursive-descent parser building a [`PlistValue`] tree.
//!
//! The parser is purely syntactic. A block comment that immediately follows a
//! string token becomes that string's [`CommentedString`] annotation; every
//! other comment (section markers and the like) is dropped.

use pbx_types::{CommentedString, PlistDict, PlistValue};
use tracing::debug;

use crate::error::{PlistError, PlistResult};
use crate::lexer::{Lexer, Token, TokenKind};

/// Deepest container nesting accepted. Real project files stay below ten.
pub const MAX_DEPTH: usize = 512;

/// Parse raw bytes. The input must be UTF-8 (ASCII is a subset).
pub fn parse(bytes: &[u8]) -> PlistResult<PlistValue> {
    let text = std::str::from_utf8(bytes).map_err(|e| PlistError::Encoding {
        offset: e.valid_up_to(),
    })?;
    parse_str(text)
}

/// Parse a complete document into its root value.
pub fn parse_str(text: &str) -> PlistResult<PlistValue> {
    let tokens = Lexer::tokenize(text)?;
    debug!(tokens = tokens.len(), bytes = text.len(), "tokenized plist");
    let mut parser = Parser {
        tokens,
        pos: 0,
        len: text.len(),
        depth: 0,
    };
    let root = parser.value()?;
    // A trailing `;` after the root is tolerated.
    parser.skip_comments();
    if parser.peek_kind() == Some(&TokenKind::Semicolon) {
        parser.pos += 1;
    }
    parser.skip_comments();
    if let Some(token) = parser.tokens.get(parser.pos) {
        return Err(PlistError::syntax(
            token.offset,
            "unexpected content after root value",
        ));
    }
    Ok(root)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Input length, used as the offset of end-of-input errors.
    len: usize,
    /// Containers currently open.
    depth: usize,
}

impl Parser {
    fn peek_kind(&self) -> Option<&TokenKind> {
        self.tokens.get(self.pos).map(|t| &t.kind)
    }

    fn offset(&self) -> usize {
        self.tokens.get(self.pos).map_or(self.len, |t| t.offset)
    }

    fn skip_comments(&mut self) {
        while let Some(TokenKind::Comment(_)) = self.peek_kind() {
            self.pos += 1;
        }
    }

    fn next_significant(&mut self) -> PlistResult<Token> {
        self.skip_comments();
        let token = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or_else(|| PlistError::syntax(self.len, "unexpected end of input"))?;
        self.pos += 1;
        Ok(token)
    }

    fn expect(&mut self, want: TokenKind, what: &str) -> PlistResult<()> {
        let token = self.next_significant()?;
        if token.kind != want {
            return Err(PlistError::syntax(
                token.offset,
                format!("expected {what}, found {}", describe(&token.kind)),
            ));
        }
        Ok(())
    }

    /// A string token plus the comment that directly follows it, if any.
    fn commented_string(&mut self, value: String) -> CommentedString {
        if let Some(TokenKind::Comment(text)) = self.peek_kind() {
            let comment = text.clone();
            self.pos += 1;
            return CommentedString::with_comment(value, comment);
        }
        CommentedString::new(value)
    }

    fn value(&mut self) -> PlistResult<PlistValue> {
        let token = self.next_significant()?;
        match token.kind {
            TokenKind::LBrace => self
                .nested(token.offset, Self::dictionary)
                .map(PlistValue::Dictionary),
            TokenKind::LParen => self.nested(token.offset, Self::array).map(PlistValue::Array),
            TokenKind::String(value) => {
                let s = self.commented_string(value);
                Ok(match s.comment() {
                    Some(_) => PlistValue::Commented(s),
                    None => PlistValue::String(s.into_parts().0),
                })
            }
            other => Err(PlistError::syntax(
                token.offset,
                format!("expected a value, found {}", describe(&other)),
            )),
        }
    }

    /// Run `body` one container level deeper, failing past [`MAX_DEPTH`].
    fn nested<T>(
        &mut self,
        offset: usize,
        body: fn(&mut Self) -> PlistResult<T>,
    ) -> PlistResult<T> {
        if self.depth >= MAX_DEPTH {
            return Err(PlistError::syntax(offset, "nesting too deep"));
        }
        self.depth += 1;
        let result = body(self);
        self.depth -= 1;
        result
    }

    fn dictionary(&mut self) -> PlistResult<PlistDict> {
        let mut dict = PlistDict::new();
        loop {
            let token = self.next_significant()?;
            let key = match token.kind {
                TokenKind::RBrace => return Ok(dict),
                TokenKind::String(key) => self.commented_string(key),
                other => {
                    return Err(PlistError::syntax(
                        token.offset,
                        format!("expected a key or '}}', found {}", describe(&other)),
                    ))
                }
            };
            self.expect(TokenKind::Equals, "'='")?;
            let value = self.value()?;
            self.expect(TokenKind::Semicolon, "';'")?;
            if dict.contains_key(key.value()) {
                return Err(PlistError::syntax(
                    token.offset,
                    format!("duplicate key {:?}", key.value()),
                ));
            }
            dict.insert(key, value);
        }
    }

    fn array(&mut self) -> PlistResult<Vec<PlistValue>> {
        let mut items = Vec::new();
        loop {
            self.skip_comments();
            if self.peek_kind() == Some(&TokenKind::RParen) {
                self.pos += 1;
                return Ok(items);
            }
            items.push(self.value()?);
            self.skip_comments();
            match self.peek_kind() {
                Some(TokenKind::Comma) => self.pos += 1,
                Some(TokenKind::RParen) => {}
                Some(other) => {
                    let message = format!("expected ',' or ')', found {}", describe(other));
                    return Err(PlistError::syntax(self.offset(), message));
                }
                None => return Err(PlistError::syntax(self.len, "unterminated array")),
            }
        }
    }
}

fn describe(kind: &TokenKind) -> String {
    match kind {
        TokenKind::LBrace => "'{'".into(),
        TokenKind::RBrace => "'}'".into(),
        TokenKind::LParen => "'('".into(),
        TokenKind::RParen => "')'".into(),
        TokenKind::Equals => "'='".into(),
        TokenKind::Semicolon => "';'".into(),
        TokenKind::Comma => "','".into(),
        TokenKind::String(s) => format!("string {s:?}"),
        TokenKind::Comment(_) => "comment".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_structure() {
        let root = parse_str(
            "// !$*UTF8*$!\n{\n\tarchiveVersion = 1;\n\tclasses = {\n\t};\n\tlist = (a, \"b c\", );\n}\n",
        )
        .unwrap();
        let dict = root.as_dict().unwrap();
        assert_eq!(dict.get("archiveVersion").and_then(PlistValue::as_str), Some("1"));
        assert!(dict.get("classes").unwrap().as_dict().unwrap().is_empty());
        let list = dict.get("list").unwrap().as_array().unwrap();
        assert_eq!(list, &[PlistValue::from("a"), PlistValue::from("b c")]);
    }

    #[test]
    fn trailing_comment_attaches_to_value_and_key() {
        let root = parse_str(
            "{ 13B07F961A680F5B00A75B9A /* App */ = { target = 1D6058900D05DD3D006BFB54 /* App */; }; }",
        )
        .unwrap();
        let dict = root.as_dict().unwrap();
        let key = dict.get_key("13B07F961A680F5B00A75B9A").unwrap();
        assert_eq!(key.comment(), Some("App"));
        let inner = dict.get("13B07F961A680F5B00A75B9A").unwrap().as_dict().unwrap();
        let target = inner.get("target").unwrap();
        assert_eq!(target.as_str(), Some("1D6058900D05DD3D006BFB54"));
        assert_eq!(target.comment(), Some("App"));
    }

    #[test]
    fn array_items_keep_comments() {
        let root = parse_str("( A /* a.m in Sources */, B /* b.m in Sources */, )").unwrap();
        let items = root.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].comment(), Some("b.m in Sources"));
    }

    #[test]
    fn section_markers_are_ignored() {
        let root = parse_str(
            "{\n/* Begin PBXGroup section */\n\tG = {isa = PBXGroup; };\n/* End PBXGroup section */\n}",
        )
        .unwrap();
        let dict = root.as_dict().unwrap();
        assert_eq!(dict.len(), 1);
        assert!(dict.get_key("G").unwrap().comment().is_none());
    }

    #[test]
    fn array_without_trailing_comma() {
        let root = parse_str("(a, b)").unwrap();
        assert_eq!(root.as_array().unwrap().len(), 2);
    }

    #[test]
    fn missing_semicolon_is_a_syntax_error() {
        let err = parse_str("{ a = b }").unwrap_err();
        assert_eq!(
            err,
            PlistError::Syntax {
                offset: 8,
                message: "expected ';', found '}'".into(),
            }
        );
    }

    #[test]
    fn missing_separator_in_array() {
        let err = parse_str("(a b)").unwrap_err();
        assert!(matches!(err, PlistError::Syntax { offset: 3, .. }));
    }

    #[test]
    fn unexpected_end_of_input() {
        let err = parse_str("{ a = (").unwrap_err();
        assert!(matches!(err, PlistError::Syntax { offset: 7, .. }));
    }

    #[test]
    fn trailing_garbage_is_rejected() {
        let err = parse_str("{ } }").unwrap_err();
        assert!(matches!(err, PlistError::Syntax { offset: 4, .. }));
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let err = parse_str("{ a = 1; a = 2; }").unwrap_err();
        assert!(matches!(err, PlistError::Syntax { offset: 9, .. }));
    }

    #[test]
    fn invalid_utf8_is_an_encoding_error() {
        let err = parse(b"{ a = \xff; }").unwrap_err();
        assert_eq!(err, PlistError::Encoding { offset: 6 });
    }

    #[test]
    fn deep_nesting_is_a_syntax_error() {
        let text = "(".repeat(100_000) + &")".repeat(100_000);
        let err = parse_str(&text).unwrap_err();
        assert_eq!(err, PlistError::syntax(MAX_DEPTH, "nesting too deep"));

        let mut deep = "{a=".repeat(MAX_DEPTH - 1) + "()";
        deep.push_str(&";}".repeat(MAX_DEPTH - 1));
        assert!(parse_str(&deep).is_ok());
    }
}
