//! Semicolon insertion tests following the Go scanner's own table.

use trygo_parser::lexer::{Lexer, Tok};

fn injected_semis(input: &str) -> Vec<usize> {
    let mut lx = Lexer::new(input);
    let toks: Vec<_> = lx.by_ref().collect();
    toks.into_iter()
        .filter_map(|(s, t, e)| {
            if matches!(t, Tok::Semi) && s == e {
                Some(s)
            } else {
                None
            }
        })
        .collect()
}

fn tok_name(t: &Tok<'_>) -> &'static str {
    match t {
        Tok::Ident(_) => "IDENT",
        Tok::IntLit(_) => "INT",
        Tok::FloatLit(_) => "FLOAT",
        Tok::ImagLit(_) => "IMAG",
        Tok::RuneLit(_) => "CHAR",
        Tok::StringLit(_) | Tok::RawStringLit(_) => "STRING",
        Tok::Semi => ";",
        Tok::KwBreak => "break",
        Tok::KwCase => "case",
        Tok::KwContinue => "continue",
        Tok::KwFallthrough => "fallthrough",
        Tok::KwFor => "for",
        Tok::KwFunc => "func",
        Tok::KwIf => "if",
        Tok::KwImport => "import",
        Tok::KwPackage => "package",
        Tok::KwReturn => "return",
        Tok::Inc => "++",
        Tok::Dec => "--",
        Tok::Define => ":=",
        Tok::Assign => "=",
        Tok::Plus => "+",
        Tok::Arrow => "<-",
        Tok::LParen => "(",
        Tok::RParen => ")",
        Tok::LBrace => "{",
        Tok::RBrace => "}",
        Tok::LBrack => "[",
        Tok::RBrack => "]",
        Tok::Comma => ",",
        Tok::Colon => ":",
        Tok::Dot => ".",
        Tok::Gt => ">",
        Tok::Lt => "<",
        _ => "OTHER",
    }
}

fn lex_names(input: &str) -> String {
    Lexer::new(input)
        .map(|(_s, t, _e)| tok_name(&t))
        .collect::<Vec<_>>()
        .join(" ")
}

struct SemiCase {
    input: &'static str,
    want: &'static str,
}

#[rustfmt::skip]
const SEMICOLON_TESTS: &[SemiCase] = &[
    SemiCase { input: "", want: "" },
    SemiCase { input: ";", want: ";" },

    SemiCase { input: "foo\n", want: "IDENT ;" },
    SemiCase { input: "123\n", want: "INT ;" },
    SemiCase { input: "1.2\n", want: "FLOAT ;" },
    SemiCase { input: "1i\n", want: "IMAG ;" },
    SemiCase { input: "'x'\n", want: "CHAR ;" },
    SemiCase { input: "\"x\"\n", want: "STRING ;" },
    SemiCase { input: "`x`\n", want: "STRING ;" },

    SemiCase { input: "+\n", want: "+" },
    SemiCase { input: "<-\n", want: "<-" },
    SemiCase { input: "++\n", want: "++ ;" },
    SemiCase { input: "--\n", want: "-- ;" },
    SemiCase { input: ":=\n", want: ":=" },
    SemiCase { input: "=\n", want: "=" },

    SemiCase { input: "(\n", want: "(" },
    SemiCase { input: "[\n", want: "[" },
    SemiCase { input: "{\n", want: "{" },
    SemiCase { input: ")\n", want: ") ;" },
    SemiCase { input: "]\n", want: "] ;" },
    SemiCase { input: "}\n", want: "} ;" },

    SemiCase { input: "break\n", want: "break ;" },
    SemiCase { input: "continue\n", want: "continue ;" },
    SemiCase { input: "fallthrough\n", want: "fallthrough ;" },
    SemiCase { input: "return\n", want: "return ;" },
    SemiCase { input: "if\n", want: "if" },
    SemiCase { input: "for\n", want: "for" },
    SemiCase { input: "func\n", want: "func" },
    SemiCase { input: "import\n", want: "import" },
    SemiCase { input: "case\n", want: "case" },

    SemiCase { input: "package main", want: "package IDENT ;" },
    SemiCase { input: "foo//comment\n", want: "IDENT ;" },
    SemiCase { input: "foo//comment", want: "IDENT ;" },
    SemiCase { input: "foo/*comment*/\n", want: "IDENT ;" },
    SemiCase { input: "foo/*\n*/", want: "IDENT ;" },
];

#[test]
fn semicolons_table_like_go() {
    for t in SEMICOLON_TESTS {
        let got = lex_names(t.input);
        assert_eq!(got, t.want, "input=<<{}>>", t.input.escape_debug());
    }
}

#[test]
fn many_semis_mixed() {
    let src = r#"
package p
func f() {
    x := 1
    x++
    if x > 0 {
        return
    } else {
        x--
    }
}
"#;
    assert!(!injected_semis(src).is_empty());
}

#[test]
fn comment_newline_equivalence() {
    let a = injected_semis("x/*\n*/y");
    let b = injected_semis("x\ny");
    assert_eq!(a.len(), b.len());
}

#[test]
fn crlf_newline_inserts() {
    assert_eq!(injected_semis("x\r\ny"), vec![1, 4]);
}

#[test]
fn bom_at_start_is_ignored() {
    assert_eq!(lex_names("\u{FEFF}foo\n"), "IDENT ;");
}

#[test]
fn line_comment_at_eof_still_inserts() {
    let src = "x//c";
    assert_eq!(injected_semis(src), vec![src.len()]);
}

#[test]
fn imag_lookahead_consumes_suffix() {
    let toks: Vec<_> = Lexer::new("3.5i").collect();
    assert!(matches!(toks[0], (_, Tok::ImagLit("3.5i"), _)));
}

#[test]
fn unterminated_block_comment_reports() {
    let mut lx = Lexer::new("/* nope");
    let toks: Vec<_> = lx.by_ref().collect();
    assert!(toks.iter().any(|(_, t, _)| matches!(t, Tok::Error)));
    assert!(!lx.take_diags().is_empty());
}
