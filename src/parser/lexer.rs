//! Lexer (tokenizer) for C header declarations
//!
//! Converts preprocessor-normalized header text into a flat [`Token`] stream
//! consumed by the tree builder. Preprocessor directives (and their
//! backslash continuations) are skipped rather than expanded, comments are
//! stripped, and whole declarations are re-chunked on `;` so that a
//! declaration split across physical lines arrives as one unit.
//!
//! Within a chunk the structural characters `, { } ( )` become individual
//! tokens and everything between them becomes a [`Token::Fragment`] of
//! whitespace-separated word pieces. Pointer stars are spaced out
//! (`int *x` → `int * x`) so that `*` is always its own piece.
//!
//! Lines that do not scan as expected degrade to plain fragments; the lexer
//! itself never fails.

use regex::Regex;

/// All token variants produced by the lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A run of word pieces between structural characters.
    Fragment(Vec<String>),
    LBrace,
    RBrace,
    LParen,
    RParen,
    Comma,
    Semicolon,
}

/// Tokenize one header. `ignore_tokens` is the optional
/// `ignore-tokens-regexp` from configuration; every match is deleted from
/// the declaration text before splitting.
pub fn tokenize(source: &str, ignore_tokens: Option<&Regex>) -> Vec<Token> {
    let mut in_comment = false;
    let mut in_directive = false;
    let mut buf: Vec<String> = Vec::new();

    for raw in source.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with('#') {
            in_directive = line.ends_with('\\');
            continue;
        }
        if in_directive {
            in_directive = line.ends_with('\\');
            continue;
        }

        let line = strip_comments(line, &mut in_comment);
        let line = line.replace('*', " * ");
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        buf.push(line.to_string());
    }

    let mut tokens = Vec::new();
    for chunk in buf.join(" ").split(';') {
        let chunk = chunk.trim();
        if chunk.is_empty() {
            continue;
        }
        let mut chunk = collapse_spaces(chunk);
        if let Some(re) = ignore_tokens {
            chunk = re.replace_all(&chunk, "").trim().to_string();
            if chunk.is_empty() {
                continue;
            }
        }
        if chunk.starts_with("static ") {
            continue;
        }
        let chunk = strip_attributes(&chunk);
        let chunk = chunk.trim();

        let mut start = 0;
        for (i, c) in chunk.char_indices() {
            if matches!(c, ',' | '{' | '}' | '(' | ')') {
                push_fragment(&mut tokens, &chunk[start..i]);
                tokens.push(match c {
                    ',' => Token::Comma,
                    '{' => Token::LBrace,
                    '}' => Token::RBrace,
                    '(' => Token::LParen,
                    _ => Token::RParen,
                });
                start = i + 1;
            }
        }
        push_fragment(&mut tokens, &chunk[start..]);
        tokens.push(Token::Semicolon);
    }

    tokens
}

fn push_fragment(tokens: &mut Vec<Token>, text: &str) {
    let pieces: Vec<String> = text.split_whitespace().map(str::to_string).collect();
    if !pieces.is_empty() {
        tokens.push(Token::Fragment(pieces));
    }
}

/// Remove comments from one line, carrying block-comment state across lines.
/// Text before an unterminated `/*` is preserved; a `//` truncates the rest
/// of the line.
fn strip_comments(line: &str, in_comment: &mut bool) -> String {
    let mut out = String::new();
    let mut rest = line;
    loop {
        if *in_comment {
            match rest.find("*/") {
                None => return out,
                Some(x) => {
                    rest = &rest[x + 2..];
                    *in_comment = false;
                }
            }
        }
        if let Some(x) = rest.find("//") {
            out.push_str(&rest[..x]);
            return out;
        }
        match rest.find("/*") {
            Some(x) => {
                out.push_str(&rest[..x]);
                rest = &rest[x + 2..];
                *in_comment = true;
            }
            None => {
                out.push_str(rest);
                return out;
            }
        }
    }
}

fn collapse_spaces(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut last_space = false;
    for c in s.chars() {
        if c.is_whitespace() {
            if !last_space {
                out.push(' ');
            }
            last_space = true;
        } else {
            out.push(c);
            last_space = false;
        }
    }
    out
}

/// Delete `__attribute__((...))` annotations. The argument list is consumed
/// up to the balanced closing `))`, which covers single arguments, comma
/// separated lists, and parenthesized argument payloads. A `__attribute__`
/// not followed by `((` is left untouched.
fn strip_attributes(line: &str) -> String {
    const KEYWORD: &str = "__attribute__";
    let mut out = String::with_capacity(line.len());
    let mut rest = line;
    while let Some(pos) = rest.find(KEYWORD) {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + KEYWORD.len()..];
        let body = after.trim_start();
        if let Some(body) = body.strip_prefix("((") {
            let mut depth = 2usize;
            let mut end = None;
            for (i, c) in body.char_indices() {
                match c {
                    '(' => depth += 1,
                    ')' => {
                        depth -= 1;
                        if depth == 0 {
                            end = Some(i + 1);
                            break;
                        }
                    }
                    _ => {}
                }
            }
            if let Some(e) = end {
                rest = &body[e..];
                continue;
            }
        }
        out.push_str(KEYWORD);
        rest = after;
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frag(pieces: &[&str]) -> Token {
        Token::Fragment(pieces.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_simple_prototype() {
        let tokens = tokenize("int add(int a, int b);", None);
        assert_eq!(
            tokens,
            vec![
                frag(&["int", "add"]),
                Token::LParen,
                frag(&["int", "a"]),
                Token::Comma,
                frag(&["int", "b"]),
                Token::RParen,
                Token::Semicolon,
            ]
        );
    }

    #[test]
    fn test_pointer_stars_are_separate_pieces() {
        let tokens = tokenize("char *strdup(const char *s);", None);
        assert_eq!(tokens[0], frag(&["char", "*", "strdup"]));
        assert_eq!(tokens[2], frag(&["const", "char", "*", "s"]));
    }

    #[test]
    fn test_comments_stripped() {
        let tokens = tokenize(
            "int x; // trailing\nint y; /* block\nstill block */ int z;",
            None,
        );
        let frags: Vec<&Token> = tokens
            .iter()
            .filter(|t| matches!(t, Token::Fragment(_)))
            .collect();
        assert_eq!(
            frags,
            vec![&frag(&["int", "x"]), &frag(&["int", "y"]), &frag(&["int", "z"])]
        );
    }

    #[test]
    fn test_text_before_unterminated_block_comment_survives() {
        let tokens = tokenize("int x; /* comment\nends here */ int y;", None);
        assert_eq!(tokens[0], frag(&["int", "x"]));
        assert_eq!(tokens[2], frag(&["int", "y"]));
    }

    #[test]
    fn test_directives_and_continuations_skipped() {
        let source =
            "#define LONG_MACRO(a) \\\n    do_something(a)\nint x;\n#include <stdio.h>\n";
        let tokens = tokenize(source, None);
        assert_eq!(tokens, vec![frag(&["int", "x"]), Token::Semicolon]);
    }

    #[test]
    fn test_static_declarations_dropped() {
        let tokens = tokenize("static int hidden(void);\nint shown(void);", None);
        assert_eq!(tokens[0], frag(&["int", "shown"]));
    }

    #[test]
    fn test_attribute_stripped() {
        let tokens = tokenize(
            "void die(void) __attribute__((noreturn));\n\
             int fmt(const char *f) __attribute__((format(printf, 1, 2)));",
            None,
        );
        let words: Vec<&Token> = tokens
            .iter()
            .filter(|t| matches!(t, Token::Fragment(_)))
            .collect();
        assert_eq!(
            words,
            vec![
                &frag(&["void", "die"]),
                &frag(&["void"]),
                &frag(&["int", "fmt"]),
                &frag(&["const", "char", "*", "f"]),
            ]
        );
    }

    #[test]
    fn test_multiline_declaration_is_one_chunk() {
        let tokens = tokenize("int\nadd(int a,\n    int b);", None);
        assert_eq!(tokens[0], frag(&["int", "add"]));
        assert_eq!(tokens.len(), 7);
    }

    #[test]
    fn test_declaration_count_preserved() {
        let source = "int a;\nint b;\n/* c */\nint c;\nchar *d;\n";
        let tokens = tokenize(source, None);
        let semis = tokens.iter().filter(|t| **t == Token::Semicolon).count();
        assert_eq!(semis, 4);
    }

    #[test]
    fn test_ignore_tokens_pattern() {
        let re = Regex::new(r"EXPORT_API\s*").unwrap();
        let tokens = tokenize("EXPORT_API int visible(void);", Some(&re));
        assert_eq!(tokens[0], frag(&["int", "visible"]));
    }
}
