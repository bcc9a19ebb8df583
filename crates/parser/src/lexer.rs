//! Go lexer: Logos token definitions plus a wrapper iterator implementing
//! the Go spec's automatic semicolon insertion and the imaginary-literal
//! lookahead.
//!
//! The raw Logos enum (`RawTok`) is DFA-friendly: numbers are matched from
//! their first digit and grown to the maximal token in a callback, strings
//! and runes are validated structurally in callbacks, and comments are
//! trivia the wrapper folds into semicolon decisions.

use logos::{Lexer as LogosLexer, Logos};
use std::ops::Range;

use crate::error::{Diag, LexError, LexErrorKind};

// =============================================================================
// Small helpers
// =============================================================================

#[inline]
const fn lower_ascii(b: u8) -> u8 {
    if b >= b'A' && b <= b'Z' {
        b + 32
    } else {
        b
    }
}

#[inline]
const fn is_dec_digit(b: u8) -> bool {
    b >= b'0' && b <= b'9'
}

#[inline]
const fn is_hex_digit(b: u8) -> bool {
    let c = lower_ascii(b);
    is_dec_digit(c) || (c >= b'a' && c <= b'f')
}

#[inline]
const fn hex_value(b: u8) -> u32 {
    let c = lower_ascii(b);
    if c >= b'a' {
        (c - b'a' + 10) as u32
    } else {
        (c - b'0') as u32
    }
}

#[inline]
const fn is_octal_digit(b: u8) -> bool {
    b >= b'0' && b <= b'7'
}

#[inline]
const fn is_valid_unicode_scalar(x: u32) -> bool {
    x <= 0x10_FFFF && !(x >= 0xD800 && x <= 0xDFFF)
}

#[inline]
fn first_newline_offset(s: &str) -> Option<usize> {
    s.bytes().position(|b| b == b'\n' || b == b'\r')
}

// =============================================================================
// Block comment scanner
// =============================================================================

#[inline]
fn lex_block_comment(lex: &mut LogosLexer<'_, RawTok>) -> Result<(), LexErrorKind> {
    let rem = lex.remainder().as_bytes();
    match rem.windows(2).position(|w| w == b"*/") {
        Some(pos) => {
            lex.bump(pos + 2);
            Ok(())
        }
        None => {
            lex.bump(rem.len());
            Err(LexErrorKind::UnterminatedComment)
        }
    }
}

// =============================================================================
// Escape validation (shared by string and rune literals)
// =============================================================================

/// Validates one escape sequence starting at `body[start]`, which is the
/// byte right after the backslash. Returns the number of bytes consumed
/// (backslash excluded).
fn validate_escape(body: &[u8], start: usize, quote: u8) -> Result<usize, LexErrorKind> {
    let esc = *body.get(start).ok_or(LexErrorKind::InvalidEscape)?;
    match esc {
        b'a' | b'b' | b'f' | b'n' | b'r' | b't' | b'v' | b'\\' => Ok(1),
        b'\'' | b'"' => {
            // \' is only legal in rune literals, \" only in strings.
            if esc == quote {
                Ok(1)
            } else {
                Err(LexErrorKind::InvalidEscape)
            }
        }
        b'x' => {
            let h1 = body.get(start + 1).copied().ok_or(LexErrorKind::InvalidEscape)?;
            let h2 = body.get(start + 2).copied().ok_or(LexErrorKind::InvalidEscape)?;
            if !is_hex_digit(h1) || !is_hex_digit(h2) {
                return Err(LexErrorKind::InvalidEscape);
            }
            Ok(3)
        }
        b'u' | b'U' => {
            let count = if esc == b'u' { 4 } else { 8 };
            let mut v = 0u32;
            for i in 0..count {
                let b = body
                    .get(start + 1 + i)
                    .copied()
                    .ok_or(LexErrorKind::InvalidEscape)?;
                if !is_hex_digit(b) {
                    return Err(LexErrorKind::InvalidEscape);
                }
                v = (v << 4) | hex_value(b);
            }
            if !is_valid_unicode_scalar(v) {
                return Err(LexErrorKind::InvalidEscape);
            }
            Ok(1 + count)
        }
        b'0'..=b'7' => {
            let o2 = body.get(start + 1).copied().ok_or(LexErrorKind::InvalidEscape)?;
            let o3 = body.get(start + 2).copied().ok_or(LexErrorKind::InvalidEscape)?;
            if !is_octal_digit(o2) || !is_octal_digit(o3) {
                return Err(LexErrorKind::InvalidEscape);
            }
            let val = ((esc - b'0') as u32) * 64 + ((o2 - b'0') as u32) * 8 + ((o3 - b'0') as u32);
            if val > 255 {
                return Err(LexErrorKind::InvalidEscape);
            }
            Ok(3)
        }
        _ => Err(LexErrorKind::InvalidEscape),
    }
}

#[inline]
fn validate_interpreted_string(lex: &mut LogosLexer<'_, RawTok>) -> Result<(), LexErrorKind> {
    let s = lex.slice().as_bytes();
    debug_assert!(s.len() >= 2 && s[0] == b'"' && s[s.len() - 1] == b'"');
    let body = &s[1..s.len() - 1];
    let mut i = 0;
    while i < body.len() {
        if body[i] == b'\\' {
            i += 1 + validate_escape(body, i + 1, b'"')?;
        } else {
            i += 1;
        }
    }
    Ok(())
}

#[inline]
fn validate_rune_lit(lex: &mut LogosLexer<'_, RawTok>) -> Result<(), LexErrorKind> {
    let s = lex.slice();
    debug_assert!(s.len() >= 3);
    let body = &s[1..s.len() - 1];
    let bytes = body.as_bytes();
    if bytes[0] == b'\\' {
        let consumed = 1 + validate_escape(bytes, 1, b'\'')?;
        if consumed != bytes.len() {
            return Err(LexErrorKind::InvalidToken);
        }
        return Ok(());
    }
    // Exactly one Unicode scalar; the source is &str, so UTF-8 validity is
    // already guaranteed.
    let mut chars = body.chars();
    let _ = chars.next();
    if chars.next().is_some() {
        return Err(LexErrorKind::InvalidToken);
    }
    Ok(())
}

// =============================================================================
// Number scanning and classification
// =============================================================================

/// Grows the matched token (one digit, or `.<digit>`) to the maximal Go
/// number literal. Validity is checked afterwards by `classify_number`.
#[inline]
fn lex_number(lex: &mut LogosLexer<'_, RawTok>) -> Result<(), LexErrorKind> {
    let src = lex.source().as_bytes();
    let start = lex.span().start;
    let n = src.len();
    let mut i = start;
    let mut base: u8 = 10;

    if src[i] != b'.' {
        if src[i] == b'0' {
            i += 1;
            if i < n {
                match lower_ascii(src[i]) {
                    b'x' => {
                        base = 16;
                        i += 1;
                    }
                    b'o' => {
                        base = 8;
                        i += 1;
                    }
                    b'b' => {
                        base = 2;
                        i += 1;
                    }
                    _ => {}
                }
            }
        } else {
            i += 1;
        }

        let digits = |b: u8| {
            if base == 16 {
                is_hex_digit(b)
            } else {
                is_dec_digit(b)
            }
        };
        while i < n && (digits(src[i]) || src[i] == b'_') {
            i += 1;
        }
    }

    // fraction (do not steal '.' from '...')
    if i < n && src[i] == b'.' && !(i + 1 < n && src[i + 1] == b'.') {
        i += 1;
        let digits = |b: u8| {
            if base == 16 {
                is_hex_digit(b)
            } else {
                is_dec_digit(b)
            }
        };
        while i < n && (digits(src[i]) || src[i] == b'_') {
            i += 1;
        }
    }

    // exponent: e/E for decimal, p/P for hex floats
    if i < n {
        let e = lower_ascii(src[i]);
        let expects = if base == 16 { b'p' } else { b'e' };
        if e == expects {
            i += 1;
            if i < n && (src[i] == b'+' || src[i] == b'-') {
                i += 1;
            }
            while i < n && (is_dec_digit(src[i]) || src[i] == b'_') {
                i += 1;
            }
        }
    }

    let already = lex.span().end;
    if i > already {
        lex.bump(i - already);
    }
    Ok(())
}

/// Validates a scanned number literal and reports whether it is a float.
///
/// Follows the Go spec: base prefixes, digit underscores only between
/// digits (or right after a prefix), legacy leading-zero octal rejecting
/// 8/9 unless the literal turns out to be a float, hex floats requiring a
/// `p` exponent.
pub fn classify_number(lit: &[u8]) -> Result<bool, LexErrorKind> {
    if lit.is_empty() {
        return Err(LexErrorKind::InvalidNumber);
    }

    let mut i = 0;
    let mut base: u32 = 10;
    let mut legacy_octal = false;

    if lit[0] == b'0' && lit.len() > 1 {
        match lower_ascii(lit[1]) {
            b'x' => {
                base = 16;
                i = 2;
            }
            b'o' => {
                base = 8;
                i = 2;
            }
            b'b' => {
                base = 2;
                i = 2;
            }
            _ => legacy_octal = true,
        }
    }

    let digit_ok = |b: u8, base: u32| match base {
        2 => b == b'0' || b == b'1',
        8 => is_octal_digit(b),
        16 => is_hex_digit(b),
        _ => is_dec_digit(b),
    };

    // Integer part. In the legacy-octal path decimal digits are scanned
    // and 8/9 remembered; they are only an error if no float part follows.
    let scan_base = if legacy_octal { 10 } else { base };
    let mut int_digits = 0usize;
    let mut saw_high_octal = false;
    let mut prev_digit = false;
    while i < lit.len() {
        let b = lit[i];
        if b == b'_' {
            // An underscore needs a digit (or the base prefix) on its left
            // and a digit on its right.
            let prefix_left = i == 2 && base != 10;
            if !(prev_digit || prefix_left) {
                return Err(LexErrorKind::InvalidNumber);
            }
            let next = lit.get(i + 1).copied();
            if !next.is_some_and(|n| digit_ok(n, scan_base)) {
                return Err(LexErrorKind::InvalidNumber);
            }
            prev_digit = false;
            i += 1;
            continue;
        }
        if !digit_ok(b, scan_base) {
            break;
        }
        if legacy_octal && (b == b'8' || b == b'9') {
            saw_high_octal = true;
        }
        int_digits += 1;
        prev_digit = true;
        i += 1;
    }

    let mut is_float = false;
    let mut frac_digits = 0usize;

    if i < lit.len() && lit[i] == b'.' {
        if base == 2 || base == 8 {
            return Err(LexErrorKind::InvalidNumber);
        }
        is_float = true;
        i += 1;
        prev_digit = false;
        while i < lit.len() {
            let b = lit[i];
            if b == b'_' {
                if !prev_digit || !lit.get(i + 1).copied().is_some_and(|n| digit_ok(n, base)) {
                    return Err(LexErrorKind::InvalidNumber);
                }
                prev_digit = false;
                i += 1;
                continue;
            }
            if !digit_ok(b, base) {
                break;
            }
            frac_digits += 1;
            prev_digit = true;
            i += 1;
        }
        if int_digits == 0 && frac_digits == 0 {
            return Err(LexErrorKind::InvalidNumber);
        }
    }

    let mut has_exp = false;
    if i < lit.len() {
        let e = lower_ascii(lit[i]);
        let expects = if base == 16 { b'p' } else { b'e' };
        if e == expects {
            has_exp = true;
            is_float = true;
            i += 1;
            if i < lit.len() && (lit[i] == b'+' || lit[i] == b'-') {
                i += 1;
            }
            let mut exp_digits = 0usize;
            prev_digit = false;
            while i < lit.len() {
                let b = lit[i];
                if b == b'_' {
                    if !prev_digit || !lit.get(i + 1).copied().is_some_and(is_dec_digit) {
                        return Err(LexErrorKind::InvalidNumber);
                    }
                    prev_digit = false;
                    i += 1;
                    continue;
                }
                if !is_dec_digit(b) {
                    break;
                }
                exp_digits += 1;
                prev_digit = true;
                i += 1;
            }
            if exp_digits == 0 {
                return Err(LexErrorKind::InvalidNumber);
            }
        }
    }

    if i != lit.len() {
        return Err(LexErrorKind::InvalidNumber);
    }
    if int_digits == 0 && !is_float {
        // bare prefix like "0x"
        return Err(LexErrorKind::InvalidNumber);
    }
    if base == 16 && is_float && !has_exp {
        // hex mantissa requires a p exponent
        return Err(LexErrorKind::InvalidNumber);
    }
    if legacy_octal && saw_high_octal && !is_float {
        return Err(LexErrorKind::InvalidNumber);
    }
    Ok(is_float)
}

// =============================================================================
// Raw token definition
// =============================================================================

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(error = LexErrorKind)]
#[logos(skip r"[\t\x0C\x0B ]+")]
#[rustfmt::skip]
enum RawTok {
    // BOM (the wrapper only allows it at file start)
    #[token("\u{FEFF}")] Bom,

    // Trivia
    #[regex(r"\r\n|\n|\r")] Newline,
    #[regex(r"//[^\n\r]*", logos::skip)] LineComment,
    #[token("/*", lex_block_comment)] BlockComment,

    // Keywords (before Ident)
    #[token("break")] KwBreak,
    #[token("case")] KwCase,
    #[token("chan")] KwChan,
    #[token("const")] KwConst,
    #[token("continue")] KwContinue,
    #[token("default")] KwDefault,
    #[token("defer")] KwDefer,
    #[token("else")] KwElse,
    #[token("fallthrough")] KwFallthrough,
    #[token("for")] KwFor,
    #[token("func")] KwFunc,
    #[token("go")] KwGo,
    #[token("goto")] KwGoto,
    #[token("if")] KwIf,
    #[token("import")] KwImport,
    #[token("interface")] KwInterface,
    #[token("map")] KwMap,
    #[token("package")] KwPackage,
    #[token("range")] KwRange,
    #[token("return")] KwReturn,
    #[token("select")] KwSelect,
    #[token("struct")] KwStruct,
    #[token("switch")] KwSwitch,
    #[token("type")] KwType,
    #[token("var")] KwVar,

    // Identifiers (Go spec: letter = '_' or Unicode letter; digit = Unicode Nd)
    #[regex(r"[_\p{L}][_\p{L}\p{Nd}]*")] Ident,

    // Numbers: start with a digit or ".<digit>", grown in the callback
    #[regex(r"[0-9]|\.[0-9]", lex_number)] Number,

    // Strings / runes
    #[regex(r"`[^`]*`")] RawString,
    #[regex(r#""([^"\\\n\r]|\\.)*""#, validate_interpreted_string)] String,
    #[regex(r"'([^'\\\n\r]|\\.)+'", validate_rune_lit)] Rune,

    // Operators (multi-char first)
    #[token("...")] Ellipsis,
    #[token("<<=")] ShlAssign,
    #[token(">>=")] ShrAssign,
    #[token("&^=")] AndNotAssign,
    #[token("+=")] AddAssign,
    #[token("-=")] SubAssign,
    #[token("*=")] MulAssign,
    #[token("/=")] DivAssign,
    #[token("%=")] ModAssign,
    #[token("&=")] AndAssign,
    #[token("|=")] OrAssign,
    #[token("^=")] XorAssign,
    #[token("<<")] Shl,
    #[token(">>")] Shr,
    #[token("&^")] AndNot,
    #[token("&&")] LAnd,
    #[token("||")] LOr,
    #[token("==")] EqEq,
    #[token("!=")] NotEq,
    #[token("<=")] Le,
    #[token(">=")] Ge,
    #[token("++")] Inc,
    #[token("--")] Dec,
    #[token(":=")] Define,
    #[token("<-")] Arrow,
    #[token("=")] Assign,
    #[token("+")] Plus,
    #[token("-")] Minus,
    #[token("*")] Star,
    #[token("/")] Slash,
    #[token("%")] Percent,
    #[token("&")] Amp,
    #[token("|")] Pipe,
    #[token("^")] Caret,
    #[token("~")] Tilde,
    #[token("!")] Bang,
    #[token("<")] Lt,
    #[token(">")] Gt,

    // Delimiters
    #[token("(")] LParen,
    #[token(")")] RParen,
    #[token("[")] LBrack,
    #[token("]")] RBrack,
    #[token("{")] LBrace,
    #[token("}")] RBrace,
    #[token(",")] Comma,
    #[token(";")] Semi,
    #[token(":")] Colon,
    #[token(".")] Dot,

    // Catch-all at lowest priority
    #[regex(r".", priority = 0)] Error,
}

impl RawTok {
    /// Go spec §Semicolons: tokens a line break may insert a `;` after.
    #[inline]
    const fn can_insert_semicolon(self) -> bool {
        matches!(
            self,
            RawTok::Ident
                | RawTok::Number
                | RawTok::Rune
                | RawTok::String
                | RawTok::RawString
                | RawTok::KwBreak
                | RawTok::KwContinue
                | RawTok::KwFallthrough
                | RawTok::KwReturn
                | RawTok::Inc
                | RawTok::Dec
                | RawTok::RParen
                | RawTok::RBrack
                | RawTok::RBrace
        )
    }
}

// =============================================================================
// Public token type (zero-copy)
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tok<'src> {
    Ident(&'src str),
    IntLit(&'src str),
    FloatLit(&'src str),
    ImagLit(&'src str),
    RuneLit(&'src str),
    StringLit(&'src str),
    RawStringLit(&'src str),

    // Keywords
    KwBreak,
    KwCase,
    KwChan,
    KwConst,
    KwContinue,
    KwDefault,
    KwDefer,
    KwElse,
    KwFallthrough,
    KwFor,
    KwFunc,
    KwGo,
    KwGoto,
    KwIf,
    KwImport,
    KwInterface,
    KwMap,
    KwPackage,
    KwRange,
    KwReturn,
    KwSelect,
    KwStruct,
    KwSwitch,
    KwType,
    KwVar,

    // Operators / delimiters
    Ellipsis,
    ShlAssign,
    ShrAssign,
    AndNotAssign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
    AndAssign,
    OrAssign,
    XorAssign,
    Shl,
    Shr,
    AndNot,
    LAnd,
    LOr,
    EqEq,
    NotEq,
    Le,
    Ge,
    Inc,
    Dec,
    Define,
    Arrow,
    Assign,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Amp,
    Pipe,
    Caret,
    Tilde,
    Bang,
    Lt,
    Gt,
    LParen,
    RParen,
    LBrack,
    RBrack,
    LBrace,
    RBrace,
    Comma,
    Semi,
    Colon,
    Dot,

    Error,
    /// Synthetic end-of-file marker; produced by the parser, never by the
    /// lexer itself.
    Eof,
}

impl<'src> Tok<'src> {
    /// Token text for diagnostics.
    pub fn describe(&self) -> String {
        match self {
            Tok::Ident(s) => format!("identifier {s}"),
            Tok::IntLit(s) | Tok::FloatLit(s) | Tok::ImagLit(s) => format!("literal {s}"),
            Tok::RuneLit(s) | Tok::StringLit(s) | Tok::RawStringLit(s) => format!("literal {s}"),
            Tok::Semi => "';'".to_string(),
            other => format!("'{}'", other.symbol_text()),
        }
    }

    fn symbol_text(&self) -> &'static str {
        use Tok::*;
        match self {
            KwBreak => "break",
            KwCase => "case",
            KwChan => "chan",
            KwConst => "const",
            KwContinue => "continue",
            KwDefault => "default",
            KwDefer => "defer",
            KwElse => "else",
            KwFallthrough => "fallthrough",
            KwFor => "for",
            KwFunc => "func",
            KwGo => "go",
            KwGoto => "goto",
            KwIf => "if",
            KwImport => "import",
            KwInterface => "interface",
            KwMap => "map",
            KwPackage => "package",
            KwRange => "range",
            KwReturn => "return",
            KwSelect => "select",
            KwStruct => "struct",
            KwSwitch => "switch",
            KwType => "type",
            KwVar => "var",
            Ellipsis => "...",
            ShlAssign => "<<=",
            ShrAssign => ">>=",
            AndNotAssign => "&^=",
            AddAssign => "+=",
            SubAssign => "-=",
            MulAssign => "*=",
            DivAssign => "/=",
            ModAssign => "%=",
            AndAssign => "&=",
            OrAssign => "|=",
            XorAssign => "^=",
            Shl => "<<",
            Shr => ">>",
            AndNot => "&^",
            LAnd => "&&",
            LOr => "||",
            EqEq => "==",
            NotEq => "!=",
            Le => "<=",
            Ge => ">=",
            Inc => "++",
            Dec => "--",
            Define => ":=",
            Arrow => "<-",
            Assign => "=",
            Plus => "+",
            Minus => "-",
            Star => "*",
            Slash => "/",
            Percent => "%",
            Amp => "&",
            Pipe => "|",
            Caret => "^",
            Tilde => "~",
            Bang => "!",
            Lt => "<",
            Gt => ">",
            LParen => "(",
            RParen => ")",
            LBrack => "[",
            RBrack => "]",
            LBrace => "{",
            RBrace => "}",
            Comma => ",",
            Semi => ";",
            Colon => ":",
            Dot => ".",
            Error => "<error>",
            Eof => "<eof>",
            _ => unreachable!("payload tokens handled by describe()"),
        }
    }
}

// =============================================================================
// Wrapper: semicolon insertion + imaginary lookahead
// =============================================================================

pub struct Lexer<'src> {
    logos: LogosLexer<'src, RawTok>,
    pending: Option<(usize, Tok<'src>, usize)>,
    diags: Vec<Diag>,
    last_can_insert_semi: bool,
    src_len: usize,
    eof_done: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(input: &'src str) -> Self {
        Self {
            logos: RawTok::lexer(input),
            pending: None,
            diags: Vec::with_capacity(4),
            last_can_insert_semi: false,
            src_len: input.len(),
            eof_done: false,
        }
    }

    pub fn take_diags(&mut self) -> Vec<Diag> {
        std::mem::take(&mut self.diags)
    }

    #[inline]
    fn push_lex_diag(&mut self, kind: LexErrorKind, span: Range<usize>) {
        let sp = crate::ast::Span::new(span.start, span.end);
        self.diags.push(LexError { kind, span: sp }.diag());
    }

    /// Inserted semicolons are zero-width tokens at `pos`.
    #[inline]
    fn emit_semi_at(&mut self, pos: usize) {
        self.pending = Some((pos, Tok::Semi, pos));
    }

    #[inline]
    fn handle_trivia(&mut self, raw: RawTok, span: &Range<usize>, slice: &str) -> bool {
        match raw {
            RawTok::Newline => {
                if self.last_can_insert_semi {
                    self.last_can_insert_semi = false;
                    self.emit_semi_at(span.start);
                }
                true
            }
            RawTok::BlockComment => {
                // A block comment containing a newline acts like a newline.
                if self.last_can_insert_semi {
                    if let Some(off) = first_newline_offset(slice) {
                        self.last_can_insert_semi = false;
                        self.emit_semi_at(span.start + off);
                    }
                }
                true
            }
            _ => false,
        }
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = (usize, Tok<'src>, usize);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(tok) = self.pending.take() {
                return Some(tok);
            }

            if self.eof_done {
                return None;
            }

            let Some(next) = self.logos.next() else {
                self.eof_done = true;
                if self.last_can_insert_semi {
                    self.last_can_insert_semi = false;
                    self.emit_semi_at(self.src_len);
                    continue;
                }
                return None;
            };

            let span = self.logos.span();
            let raw = match next {
                Ok(raw) => raw,
                Err(kind) => {
                    self.push_lex_diag(kind, span.clone());
                    self.last_can_insert_semi = false;
                    return Some((span.start, Tok::Error, span.end));
                }
            };
            let slice = self.logos.slice();

            if raw == RawTok::Bom {
                if span.start == 0 {
                    continue;
                }
                self.push_lex_diag(LexErrorKind::InvalidToken, span.clone());
                self.last_can_insert_semi = false;
                return Some((span.start, Tok::Error, span.end));
            }

            if self.handle_trivia(raw, &span, slice) {
                continue;
            }

            if raw == RawTok::Error {
                self.push_lex_diag(LexErrorKind::InvalidToken, span.clone());
                self.last_can_insert_semi = false;
                return Some((span.start, Tok::Error, span.end));
            }

            if raw == RawTok::Number {
                let src = self.logos.source();
                let mut end = span.end;

                let is_float = match classify_number(slice.as_bytes()) {
                    Ok(f) => f,
                    Err(kind) => {
                        self.push_lex_diag(kind, span.clone());
                        self.last_can_insert_semi = false;
                        return Some((span.start, Tok::Error, span.end));
                    }
                };

                // Imaginary literal: consume an immediately following 'i'.
                if end < self.src_len && src.as_bytes()[end] == b'i' {
                    self.logos.bump(1);
                    end += 1;
                    self.last_can_insert_semi = true;
                    return Some((span.start, Tok::ImagLit(&src[span.start..end]), end));
                }

                self.last_can_insert_semi = true;
                let tok = if is_float {
                    Tok::FloatLit(slice)
                } else {
                    Tok::IntLit(slice)
                };
                return Some((span.start, tok, end));
            }

            self.last_can_insert_semi = raw.can_insert_semicolon();

            let tok = match raw {
                RawTok::Ident => Tok::Ident(slice),
                RawTok::Rune => Tok::RuneLit(slice),
                RawTok::String => Tok::StringLit(slice),
                RawTok::RawString => Tok::RawStringLit(slice),
                RawTok::KwBreak => Tok::KwBreak,
                RawTok::KwCase => Tok::KwCase,
                RawTok::KwChan => Tok::KwChan,
                RawTok::KwConst => Tok::KwConst,
                RawTok::KwContinue => Tok::KwContinue,
                RawTok::KwDefault => Tok::KwDefault,
                RawTok::KwDefer => Tok::KwDefer,
                RawTok::KwElse => Tok::KwElse,
                RawTok::KwFallthrough => Tok::KwFallthrough,
                RawTok::KwFor => Tok::KwFor,
                RawTok::KwFunc => Tok::KwFunc,
                RawTok::KwGo => Tok::KwGo,
                RawTok::KwGoto => Tok::KwGoto,
                RawTok::KwIf => Tok::KwIf,
                RawTok::KwImport => Tok::KwImport,
                RawTok::KwInterface => Tok::KwInterface,
                RawTok::KwMap => Tok::KwMap,
                RawTok::KwPackage => Tok::KwPackage,
                RawTok::KwRange => Tok::KwRange,
                RawTok::KwReturn => Tok::KwReturn,
                RawTok::KwSelect => Tok::KwSelect,
                RawTok::KwStruct => Tok::KwStruct,
                RawTok::KwSwitch => Tok::KwSwitch,
                RawTok::KwType => Tok::KwType,
                RawTok::KwVar => Tok::KwVar,
                RawTok::Ellipsis => Tok::Ellipsis,
                RawTok::ShlAssign => Tok::ShlAssign,
                RawTok::ShrAssign => Tok::ShrAssign,
                RawTok::AndNotAssign => Tok::AndNotAssign,
                RawTok::AddAssign => Tok::AddAssign,
                RawTok::SubAssign => Tok::SubAssign,
                RawTok::MulAssign => Tok::MulAssign,
                RawTok::DivAssign => Tok::DivAssign,
                RawTok::ModAssign => Tok::ModAssign,
                RawTok::AndAssign => Tok::AndAssign,
                RawTok::OrAssign => Tok::OrAssign,
                RawTok::XorAssign => Tok::XorAssign,
                RawTok::Shl => Tok::Shl,
                RawTok::Shr => Tok::Shr,
                RawTok::AndNot => Tok::AndNot,
                RawTok::LAnd => Tok::LAnd,
                RawTok::LOr => Tok::LOr,
                RawTok::EqEq => Tok::EqEq,
                RawTok::NotEq => Tok::NotEq,
                RawTok::Le => Tok::Le,
                RawTok::Ge => Tok::Ge,
                RawTok::Inc => Tok::Inc,
                RawTok::Dec => Tok::Dec,
                RawTok::Define => Tok::Define,
                RawTok::Arrow => Tok::Arrow,
                RawTok::Assign => Tok::Assign,
                RawTok::Plus => Tok::Plus,
                RawTok::Minus => Tok::Minus,
                RawTok::Star => Tok::Star,
                RawTok::Slash => Tok::Slash,
                RawTok::Percent => Tok::Percent,
                RawTok::Amp => Tok::Amp,
                RawTok::Pipe => Tok::Pipe,
                RawTok::Caret => Tok::Caret,
                RawTok::Tilde => Tok::Tilde,
                RawTok::Bang => Tok::Bang,
                RawTok::Lt => Tok::Lt,
                RawTok::Gt => Tok::Gt,
                RawTok::LParen => Tok::LParen,
                RawTok::RParen => Tok::RParen,
                RawTok::LBrack => Tok::LBrack,
                RawTok::RBrack => Tok::RBrack,
                RawTok::LBrace => Tok::LBrace,
                RawTok::RBrace => Tok::RBrace,
                RawTok::Comma => Tok::Comma,
                RawTok::Semi => Tok::Semi,
                RawTok::Colon => Tok::Colon,
                RawTok::Dot => Tok::Dot,
                RawTok::Bom
                | RawTok::Newline
                | RawTok::LineComment
                | RawTok::BlockComment
                | RawTok::Number
                | RawTok::Error => unreachable!("handled above"),
            };

            return Some((span.start, tok, span.end));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_basic_numbers() {
        assert_eq!(classify_number(b"0"), Ok(false));
        assert_eq!(classify_number(b"42"), Ok(false));
        assert_eq!(classify_number(b"0x1F"), Ok(false));
        assert_eq!(classify_number(b"0o755"), Ok(false));
        assert_eq!(classify_number(b"0b101"), Ok(false));
        assert_eq!(classify_number(b"0755"), Ok(false));
        assert_eq!(classify_number(b"1_000"), Ok(false));
        assert_eq!(classify_number(b"1.5"), Ok(true));
        assert_eq!(classify_number(b"1."), Ok(true));
        assert_eq!(classify_number(b".5"), Ok(true));
        assert_eq!(classify_number(b"1e10"), Ok(true));
        assert_eq!(classify_number(b"1.5e-3"), Ok(true));
        assert_eq!(classify_number(b"0x1.8p3"), Ok(true));
    }

    #[test]
    fn classify_invalid_numbers() {
        assert!(classify_number(b"0x").is_err());
        assert!(classify_number(b"098").is_err());
        assert_eq!(classify_number(b"098.5"), Ok(true));
        assert!(classify_number(b"1__0").is_err());
        assert!(classify_number(b"1_").is_err());
        assert!(classify_number(b"0x1.8").is_err());
        assert!(classify_number(b"1e").is_err());
    }
}
