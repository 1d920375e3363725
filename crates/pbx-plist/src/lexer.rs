//! Tokenizer for ASCII plist text.
//!
//! Line comments (`// ...`) are discarded. Block comments are kept as tokens
//! so the parser can attach them to the string that precedes them.

use crate::error::{PlistError, PlistResult};

/// Kind of a lexed token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenKind {
    LBrace,
    RBrace,
    LParen,
    RParen,
    Equals,
    Semicolon,
    Comma,
    /// A bare or quoted string with escapes already resolved.
    String(String),
    /// Contents of a `/* ... */` comment, trimmed.
    Comment(String),
}

/// A token and the byte offset where it starts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub offset: usize,
}

/// Byte-offset tokenizer over a UTF-8 source.
pub struct Lexer<'src> {
    src: &'src str,
    pos: usize,
}

impl<'src> Lexer<'src> {
    pub fn new(src: &'src str) -> Self {
        Self { src, pos: 0 }
    }

    /// Tokenize the whole input.
    pub fn tokenize(src: &'src str) -> PlistResult<Vec<Token>> {
        let mut lexer = Self::new(src);
        let mut tokens = Vec::new();
        while let Some(token) = lexer.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    /// Produce the next token, or `None` at end of input.
    pub fn next_token(&mut self) -> PlistResult<Option<Token>> {
        loop {
            self.skip_whitespace();
            let rest = self.rest();
            if rest.is_empty() {
                return Ok(None);
            }
            if rest.starts_with("//") {
                self.skip_line();
                continue;
            }
            break;
        }

        let offset = self.pos;
        let rest = self.rest();
        if rest.starts_with("/*") {
            let Some(end) = rest[2..].find("*/") else {
                return Err(PlistError::syntax(offset, "unterminated comment"));
            };
            let text = rest[2..2 + end].trim().to_string();
            self.pos += 2 + end + 2;
            return Ok(Some(Token {
                kind: TokenKind::Comment(text),
                offset,
            }));
        }

        let Some(c) = rest.chars().next() else {
            return Ok(None);
        };
        let kind = match c {
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '=' => TokenKind::Equals,
            ';' => TokenKind::Semicolon,
            ',' => TokenKind::Comma,
            '"' | '\'' => {
                let value = self.quoted(c)?;
                return Ok(Some(Token {
                    kind: TokenKind::String(value),
                    offset,
                }));
            }
            _ => {
                let value = self.bare()?;
                return Ok(Some(Token {
                    kind: TokenKind::String(value),
                    offset,
                }));
            }
        };
        self.pos += 1;
        Ok(Some(Token { kind, offset }))
    }

    fn rest(&self) -> &'src str {
        &self.src[self.pos..]
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        let trimmed = rest.trim_start();
        self.pos += rest.len() - trimmed.len();
    }

    fn skip_line(&mut self) {
        let rest = self.rest();
        match rest.find('\n') {
            Some(nl) => self.pos += nl + 1,
            None => self.pos = self.src.len(),
        }
    }

    fn bare(&mut self) -> PlistResult<String> {
        let start = self.pos;
        let rest = self.rest();
        let mut end = rest.len();
        for (i, c) in rest.char_indices() {
            if c.is_whitespace() || is_delimiter(c) || rest[i..].starts_with("/*") {
                end = i;
                break;
            }
        }
        if end == 0 {
            return Err(PlistError::syntax(
                start,
                format!("unexpected character {:?}", rest.chars().next().unwrap_or('\0')),
            ));
        }
        self.pos += end;
        Ok(rest[..end].to_string())
    }

    fn quoted(&mut self, quote: char) -> PlistResult<String> {
        let start = self.pos;
        let rest = self.rest();
        let mut out = String::new();
        let mut chars = rest.char_indices().skip(1).peekable();
        while let Some((i, c)) = chars.next() {
            if c == quote {
                self.pos += i + c.len_utf8();
                return Ok(out);
            }
            if c != '\\' {
                out.push(c);
                continue;
            }
            let Some((esc_at, esc)) = chars.next() else {
                break;
            };
            match esc {
                'n' => out.push('\n'),
                't' => out.push('\t'),
                'r' => out.push('\r'),
                'a' => out.push('\u{07}'),
                'b' => out.push('\u{08}'),
                'f' => out.push('\u{0C}'),
                'v' => out.push('\u{0B}'),
                'U' | 'u' => {
                    let mut code = 0u32;
                    for _ in 0..4 {
                        let digit = chars
                            .next()
                            .and_then(|(_, d)| d.to_digit(16))
                            .ok_or_else(|| {
                                PlistError::syntax(start + esc_at, "invalid \\U escape")
                            })?;
                        code = code * 16 + digit;
                    }
                    let decoded = char::from_u32(code).ok_or_else(|| {
                        PlistError::syntax(start + esc_at, "invalid \\U code point")
                    })?;
                    out.push(decoded);
                }
                '0'..='7' => {
                    let mut code = esc.to_digit(8).unwrap_or(0);
                    for _ in 0..2 {
                        match chars.peek().and_then(|(_, d)| d.to_digit(8)) {
                            Some(digit) => {
                                code = code * 8 + digit;
                                chars.next();
                            }
                            None => break,
                        }
                    }
                    out.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
                }
                other => out.push(other),
            }
        }
        Err(PlistError::syntax(start, "unterminated string"))
    }
}

fn is_delimiter(c: char) -> bool {
    matches!(c, '{' | '}' | '(' | ')' | '=' | ';' | ',' | '"' | '\'')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::tokenize(src)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    fn s(value: &str) -> TokenKind {
        TokenKind::String(value.to_string())
    }

    #[test]
    fn punctuation_and_bare_strings() {
        assert_eq!(
            kinds("{ isa = PBXGroup; }"),
            vec![
                TokenKind::LBrace,
                s("isa"),
                TokenKind::Equals,
                s("PBXGroup"),
                TokenKind::Semicolon,
                TokenKind::RBrace,
            ]
        );
    }

    #[test]
    fn bare_paths_keep_slashes() {
        assert_eq!(kinds("path = App/main.swift;")[2], s("App/main.swift"));
    }

    #[test]
    fn block_comment_is_a_token() {
        assert_eq!(
            kinds("ABC /* main.m in Sources */,"),
            vec![
                s("ABC"),
                TokenKind::Comment("main.m in Sources".into()),
                TokenKind::Comma,
            ]
        );
    }

    #[test]
    fn comment_directly_after_bare_string() {
        assert_eq!(
            kinds("ABC/* x */"),
            vec![s("ABC"), TokenKind::Comment("x".into())]
        );
    }

    #[test]
    fn line_comments_are_skipped() {
        assert_eq!(kinds("// !$*UTF8*$!\n{\n}"), vec![TokenKind::LBrace, TokenKind::RBrace]);
    }

    #[test]
    fn quoted_escapes() {
        assert_eq!(
            kinds(r#""a\"b\\c\nd\te""#),
            vec![s("a\"b\\c\nd\te")]
        );
        assert_eq!(kinds(r#""\U00e9""#), vec![s("é")]);
        assert_eq!(kinds(r#""\101""#), vec![s("A")]);
        assert_eq!(kinds("'single'"), vec![s("single")]);
    }

    #[test]
    fn quoted_keeps_unicode() {
        assert_eq!(kinds("\"Grüße\""), vec![s("Grüße")]);
    }

    #[test]
    fn unterminated_string_reports_offset() {
        let err = Lexer::tokenize("a = \"open").unwrap_err();
        assert_eq!(
            err,
            PlistError::Syntax {
                offset: 4,
                message: "unterminated string".into(),
            }
        );
    }

    #[test]
    fn unterminated_comment() {
        let err = Lexer::tokenize("A /* open").unwrap_err();
        assert!(matches!(err, PlistError::Syntax { offset: 2, .. }));
    }

    #[test]
    fn offsets_are_byte_positions() {
        let tokens = Lexer::tokenize("{\n\tkey = v;\n}").unwrap();
        assert_eq!(tokens[1].offset, 3);
        assert_eq!(tokens[3].offset, 9);
    }
}
