//! Hand-written recursive-descent parser for (pre-generics) Go.
//!
//! Tokens come from the semicolon-inserting lexer; nodes go straight into
//! the package-wide arena with file-set-wide spans (`base` is the file's
//! offset in the file set). The parser fails fast: the first syntax error
//! aborts the file with a positioned diagnostic.
//!
//! The two context-sensitive corners of the grammar are handled the way
//! go/parser does:
//!
//! - `expr_lev < 0` inside `if`/`for`/`switch` headers suppresses
//!   composite literals with plain type-name operands, so `{` starts the
//!   body (explicit composite types like `[]int{...}` stay legal);
//! - `x.(type)` parses as a type assertion with no type and is recognized
//!   as a type-switch guard by the `switch` statement parser.

use crate::ast::*;
use crate::error::{Diag, DiagKind};
use crate::lexer::{Lexer, Tok};

type PResult<T> = Result<T, Diag>;

/// Parses one Go source file into `arena`, returning its root node.
pub fn parse_file(
    src: &str,
    base: u32,
    arena: &mut AstArena,
    interner: &mut Interner,
) -> Result<SourceFile, Diag> {
    let mut lexer = Lexer::new(src);
    let toks: Vec<_> = lexer.by_ref().collect();
    let mut lex_diags = lexer.take_diags();
    if !lex_diags.is_empty() {
        let mut d = lex_diags.remove(0);
        d.span = Span::new(
            d.span.start as usize + base as usize,
            d.span.end as usize + base as usize,
        );
        return Err(d);
    }

    let mut p = Parser {
        toks,
        pos: 0,
        base,
        src_len: src.len(),
        expr_lev: 0,
        arena,
        interner,
    };
    p.source_file()
}

struct Parser<'src, 'a> {
    toks: Vec<(usize, Tok<'src>, usize)>,
    pos: usize,
    base: u32,
    src_len: usize,
    /// Negative inside control-flow headers; composite literals with bare
    /// type-name operands are disabled there.
    expr_lev: i32,
    arena: &'a mut AstArena,
    interner: &'a mut Interner,
}

impl<'src, 'a> Parser<'src, 'a> {
    // ---- token plumbing ----

    fn peek(&self) -> Tok<'src> {
        self.toks.get(self.pos).map(|t| t.1).unwrap_or(Tok::Eof)
    }

    fn peek2(&self) -> Tok<'src> {
        self.toks.get(self.pos + 1).map(|t| t.1).unwrap_or(Tok::Eof)
    }

    fn cur_span(&self) -> Span {
        match self.toks.get(self.pos) {
            Some(&(s, _, e)) => self.sp(s, e),
            None => Span::at(self.base + self.src_len as u32),
        }
    }

    fn sp(&self, s: usize, e: usize) -> Span {
        Span::new(s + self.base as usize, e + self.base as usize)
    }

    fn bump(&mut self) -> (Span, Tok<'src>) {
        let tok = self.peek();
        let span = self.cur_span();
        if self.pos < self.toks.len() {
            self.pos += 1;
        }
        (span, tok)
    }

    fn err<T>(&self, span: Span, msg: impl Into<String>) -> PResult<T> {
        Err(Diag {
            kind: DiagKind::Parse,
            span,
            message: msg.into(),
        })
    }

    fn unexpected<T>(&self, what: &str) -> PResult<T> {
        let tok = self.peek();
        self.err(
            self.cur_span(),
            format!("expected {what}, found {}", tok.describe()),
        )
    }

    fn expect(&mut self, tok: Tok<'static>, what: &str) -> PResult<Span> {
        if self.peek() == tok {
            Ok(self.bump().0)
        } else {
            self.unexpected(what)
        }
    }

    /// A statement terminator: an explicit or inserted `;`, or nothing at
    /// all right before a closing delimiter.
    fn expect_semi(&mut self) -> PResult<()> {
        match self.peek() {
            Tok::Semi => {
                self.bump();
                Ok(())
            }
            Tok::RParen | Tok::RBrace | Tok::Eof => Ok(()),
            _ => self.unexpected("';'"),
        }
    }

    fn intern(&mut self, s: &str) -> Symbol {
        self.interner.intern(s)
    }

    fn expect_ident(&mut self, what: &str) -> PResult<IdentName> {
        match self.peek() {
            Tok::Ident(name) => {
                let (span, _) = self.bump();
                Ok(IdentName {
                    sym: self.intern(name),
                    pos: span,
                })
            }
            _ => self.unexpected(what),
        }
    }

    fn with_expr_lev<T>(&mut self, lev: i32, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        let prev = self.expr_lev;
        self.expr_lev = lev;
        let out = f(self);
        self.expr_lev = prev;
        out
    }

    // ---- file ----

    fn source_file(&mut self) -> PResult<SourceFile> {
        let package_pos = self.expect(Tok::KwPackage, "'package'")?;
        let name = self.expect_ident("package name")?;
        self.expect_semi()?;

        let mut decls = Vec::new();
        while self.peek() != Tok::Eof {
            match self.peek() {
                Tok::KwImport | Tok::KwConst | Tok::KwType | Tok::KwVar => {
                    let d = self.gen_decl()?;
                    decls.push(TopLevelDecl::Decl(d));
                    self.expect_semi()?;
                }
                Tok::KwFunc => {
                    let f = self.func_decl()?;
                    decls.push(TopLevelDecl::Func(f));
                    self.expect_semi()?;
                }
                Tok::Semi => {
                    self.bump();
                }
                _ => return self.unexpected("declaration"),
            }
        }

        let decls = self.arena.list_top_decls(decls);
        Ok(SourceFile {
            package_pos,
            name,
            decls,
        })
    }

    // ---- declarations ----

    fn gen_decl(&mut self) -> PResult<DeclId> {
        let (kw_pos, kw) = self.bump();
        let kind = match kw {
            Tok::KwImport => GenDeclKind::Import,
            Tok::KwConst => GenDeclKind::Const,
            Tok::KwType => GenDeclKind::Type,
            Tok::KwVar => GenDeclKind::Var,
            _ => unreachable!("gen_decl called on non-declaration token"),
        };

        let mut l_paren = None;
        let mut r_paren = None;
        let mut specs = Vec::new();
        let mut end = kw_pos;

        if self.peek() == Tok::LParen {
            l_paren = Some(self.bump().0);
            while self.peek() != Tok::RParen && self.peek() != Tok::Eof {
                specs.push(self.spec(kind)?);
                self.expect_semi()?;
            }
            r_paren = Some(self.expect(Tok::RParen, "')'")?);
            end = r_paren.unwrap();
        } else {
            specs.push(self.spec(kind)?);
        }

        let specs = self.arena.list_specs(specs);
        let decl = Decl::Gen(GenDecl {
            kw_pos,
            kind,
            l_paren,
            specs,
            r_paren,
        });
        Ok(self
            .arena
            .decls
            .alloc(decl, Span::new(kw_pos.start as usize, end.end as usize)))
    }

    fn spec(&mut self, kind: GenDeclKind) -> PResult<Spec> {
        match kind {
            GenDeclKind::Import => self.import_spec(),
            GenDeclKind::Type => self.type_spec(),
            GenDeclKind::Const | GenDeclKind::Var => self.value_spec(),
        }
    }

    fn import_spec(&mut self) -> PResult<Spec> {
        let name = match self.peek() {
            Tok::Dot => Some(ImportName::Dot(self.bump().0)),
            Tok::Ident("_") => Some(ImportName::Blank(self.bump().0)),
            Tok::Ident(_) => Some(ImportName::Name(self.expect_ident("import alias")?)),
            _ => None,
        };
        let path = match self.peek() {
            Tok::StringLit(s) | Tok::RawStringLit(s) => {
                let (span, _) = self.bump();
                StringLit {
                    sym: self.intern(s),
                    pos: span,
                }
            }
            _ => return self.unexpected("import path"),
        };
        Ok(Spec::Import(ImportSpec { name, path }))
    }

    fn type_spec(&mut self) -> PResult<Spec> {
        let name = self.expect_ident("type name")?;
        let (assign_pos, alias) = if self.peek() == Tok::Assign {
            (Some(self.bump().0), true)
        } else {
            (None, false)
        };
        let typ = self.parse_type()?;
        Ok(Spec::Type(TypeSpec {
            name,
            assign_pos,
            typ,
            alias,
        }))
    }

    fn value_spec(&mut self) -> PResult<Spec> {
        let mut names = vec![self.expect_ident("name")?];
        while self.peek() == Tok::Comma {
            self.bump();
            names.push(self.expect_ident("name")?);
        }
        let typ = if self.starts_type() && self.peek() != Tok::Assign {
            Some(self.parse_type()?)
        } else {
            None
        };
        let mut values = Vec::new();
        if self.peek() == Tok::Assign {
            self.bump();
            values.push(self.expr()?);
            while self.peek() == Tok::Comma {
                self.bump();
                values.push(self.expr()?);
            }
        }
        let names = self.arena.list_ident_names(names);
        let values = self.arena.list_exprs(values);
        Ok(Spec::Value(ValueSpec { names, typ, values }))
    }

    fn func_decl(&mut self) -> PResult<FuncDeclId> {
        let func_pos = self.expect(Tok::KwFunc, "'func'")?;

        let recv = if self.peek() == Tok::LParen {
            Some(self.receiver()?)
        } else {
            None
        };

        let name = self.expect_ident("function name")?;
        let sig = self.signature()?;

        let body = if self.peek() == Tok::LBrace {
            Some(self.block()?)
        } else {
            None
        };

        let end = match body {
            Some(b) => self.arena.blocks[b].r_brace.end,
            None => name.pos.end,
        };
        let decl = FuncDecl {
            func_pos,
            recv,
            name,
            signature: sig,
            body,
        };
        Ok(self
            .arena
            .funcs
            .alloc(decl, Span::new(func_pos.start as usize, end as usize)))
    }

    fn receiver(&mut self) -> PResult<Receiver> {
        let l_paren = self.expect(Tok::LParen, "'('")?;
        // Either `(name Type)` or `(Type)`.
        let mut name = None;
        if let Tok::Ident(_) = self.peek() {
            if self.recv_second_starts_type() {
                name = Some(self.expect_ident("receiver name")?);
            }
        }
        let typ = self.parse_type()?;
        let r_paren = self.expect(Tok::RParen, "')'")?;
        Ok(Receiver {
            l_paren,
            name,
            typ,
            r_paren,
        })
    }

    fn recv_second_starts_type(&self) -> bool {
        matches!(
            self.peek2(),
            Tok::Ident(_) | Tok::Star | Tok::LBrack | Tok::KwMap | Tok::KwChan | Tok::KwFunc
        )
    }

    // ---- signatures ----

    fn signature(&mut self) -> PResult<SignatureId> {
        let start = self.cur_span();
        let params = self.field_list()?;
        let results = match self.peek() {
            Tok::LParen => Some(Results::Params(self.field_list()?)),
            _ if self.starts_type() => Some(Results::Type(self.parse_type()?)),
            _ => None,
        };
        let end = self.toks.get(self.pos.wrapping_sub(1)).map(|t| t.2).unwrap_or(0);
        Ok(self.arena.signatures.alloc(
            Signature { params, results },
            Span::new(start.start as usize, self.base as usize + end),
        ))
    }

    /// Parses a parenthesized parameter/result list, grouping
    /// `a, b int, c string` per the Go spec.
    fn field_list(&mut self) -> PResult<FieldList> {
        let l_paren = self.expect(Tok::LParen, "'('")?;

        // A parsed entry: either an anonymous type, or `names... type`.
        enum Entry {
            Anon {
                typ: TypeId,
                ellipsis_pos: Option<Span>,
            },
            Named {
                name: IdentName,
                ellipsis_pos: Option<Span>,
                typ: TypeId,
            },
        }

        let mut entries = Vec::new();
        while self.peek() != Tok::RParen && self.peek() != Tok::Eof {
            if self.peek() == Tok::Ellipsis {
                let ellipsis_pos = Some(self.bump().0);
                let typ = self.parse_type()?;
                entries.push(Entry::Anon { typ, ellipsis_pos });
            } else {
                let typ = self.parse_type()?;
                if self.starts_type() || self.peek() == Tok::Ellipsis {
                    // `typ` was really a parameter name.
                    let name = match self.arena.types[typ] {
                        Type::Named {
                            pkg: None, name, ..
                        } => name,
                        _ => return self.err(self.arena.types.span(typ), "expected parameter name"),
                    };
                    let ellipsis_pos = if self.peek() == Tok::Ellipsis {
                        Some(self.bump().0)
                    } else {
                        None
                    };
                    let real = self.parse_type()?;
                    entries.push(Entry::Named {
                        name,
                        ellipsis_pos,
                        typ: real,
                    });
                } else {
                    entries.push(Entry::Anon {
                        typ,
                        ellipsis_pos: None,
                    });
                }
            }
            if self.peek() == Tok::Comma {
                self.bump();
            } else {
                break;
            }
        }
        let r_paren = self.expect(Tok::RParen, "')'")?;

        let named = entries.iter().any(|e| matches!(e, Entry::Named { .. }));
        let mut fields = Vec::new();
        if !named {
            for e in entries {
                let Entry::Anon { typ, ellipsis_pos } = e else {
                    unreachable!()
                };
                let span = self.arena.types.span(typ);
                let field = Field {
                    names: ListRef::EMPTY,
                    ellipsis_pos,
                    typ,
                    tag: None,
                    is_embed: false,
                };
                fields.push(
                    self.arena
                        .fields
                        .alloc(field, Span::new(span.start as usize, span.end as usize)),
                );
            }
        } else {
            // Bare-identifier entries are additional names of the next
            // named group: `(a, b int)`.
            let mut pending: Vec<IdentName> = Vec::new();
            for e in entries {
                match e {
                    Entry::Anon { typ, ellipsis_pos } => {
                        if ellipsis_pos.is_some() {
                            return self.err(
                                self.arena.types.span(typ),
                                "mixed named and unnamed parameters",
                            );
                        }
                        let name = match self.arena.types[typ] {
                            Type::Named {
                                pkg: None, name, ..
                            } => name,
                            _ => {
                                return self.err(
                                    self.arena.types.span(typ),
                                    "mixed named and unnamed parameters",
                                )
                            }
                        };
                        pending.push(name);
                    }
                    Entry::Named {
                        name,
                        ellipsis_pos,
                        typ,
                    } => {
                        pending.push(name);
                        let start = pending[0].pos;
                        let names = self.arena.list_ident_names(pending.drain(..));
                        let end = self.arena.types.span(typ);
                        let field = Field {
                            names,
                            ellipsis_pos,
                            typ,
                            tag: None,
                            is_embed: false,
                        };
                        fields.push(self.arena.fields.alloc(
                            field,
                            Span::new(start.start as usize, end.end as usize),
                        ));
                    }
                }
            }
            if !pending.is_empty() {
                return self.err(pending[0].pos, "mixed named and unnamed parameters");
            }
        }

        let fields = self.arena.list_fields(fields);
        Ok(FieldList {
            l_paren,
            fields,
            r_paren,
        })
    }

    // ---- types ----

    fn starts_type(&self) -> bool {
        matches!(
            self.peek(),
            Tok::Ident(_)
                | Tok::Star
                | Tok::LBrack
                | Tok::KwMap
                | Tok::KwChan
                | Tok::KwStruct
                | Tok::KwInterface
                | Tok::KwFunc
                | Tok::LParen
                | Tok::Arrow
        )
    }

    fn parse_type(&mut self) -> PResult<TypeId> {
        match self.peek() {
            Tok::Ident(_) => {
                let first = self.expect_ident("type name")?;
                if self.peek() == Tok::Dot {
                    let dot_pos = self.bump().0;
                    let name = self.expect_ident("type name")?;
                    let span = Span::new(first.pos.start as usize, name.pos.end as usize);
                    Ok(self.arena.types.alloc(
                        Type::Named {
                            pkg: Some(first),
                            dot_pos: Some(dot_pos),
                            name,
                        },
                        span,
                    ))
                } else {
                    Ok(self.arena.types.alloc(
                        Type::Named {
                            pkg: None,
                            dot_pos: None,
                            name: first,
                        },
                        first.pos,
                    ))
                }
            }
            Tok::Star => {
                let star_pos = self.bump().0;
                let elem = self.parse_type()?;
                let end = self.arena.types.span(elem);
                Ok(self.arena.types.alloc(
                    Type::Pointer { star_pos, elem },
                    Span::new(star_pos.start as usize, end.end as usize),
                ))
            }
            Tok::LBrack => {
                let l_brack = self.bump().0;
                if self.peek() == Tok::RBrack {
                    let r_brack = self.bump().0;
                    let elem = self.parse_type()?;
                    let end = self.arena.types.span(elem);
                    Ok(self.arena.types.alloc(
                        Type::Slice {
                            l_brack,
                            r_brack,
                            elem,
                        },
                        Span::new(l_brack.start as usize, end.end as usize),
                    ))
                } else {
                    let len = if self.peek() == Tok::Ellipsis {
                        ArrayLen::Ellipsis(self.bump().0)
                    } else {
                        ArrayLen::Expr(self.with_expr_lev(1, |p| p.expr())?)
                    };
                    let r_brack = self.expect(Tok::RBrack, "']'")?;
                    let elem = self.parse_type()?;
                    let end = self.arena.types.span(elem);
                    Ok(self.arena.types.alloc(
                        Type::Array {
                            l_brack,
                            len,
                            r_brack,
                            elem,
                        },
                        Span::new(l_brack.start as usize, end.end as usize),
                    ))
                }
            }
            Tok::KwMap => {
                let map_pos = self.bump().0;
                let l_brack = self.expect(Tok::LBrack, "'['")?;
                let key = self.parse_type()?;
                let r_brack = self.expect(Tok::RBrack, "']'")?;
                let val = self.parse_type()?;
                let end = self.arena.types.span(val);
                Ok(self.arena.types.alloc(
                    Type::Map {
                        map_pos,
                        l_brack,
                        key,
                        r_brack,
                        val,
                    },
                    Span::new(map_pos.start as usize, end.end as usize),
                ))
            }
            Tok::KwChan => {
                let chan_pos = self.bump().0;
                let (dir, arrow_pos) = if self.peek() == Tok::Arrow {
                    (ChanDir::Send, Some(self.bump().0))
                } else {
                    (ChanDir::Both, None)
                };
                let elem = self.parse_type()?;
                let end = self.arena.types.span(elem);
                Ok(self.arena.types.alloc(
                    Type::Chan {
                        dir,
                        chan_pos,
                        arrow_pos,
                        elem,
                    },
                    Span::new(chan_pos.start as usize, end.end as usize),
                ))
            }
            Tok::Arrow => {
                let arrow_pos = self.bump().0;
                let chan_pos = self.expect(Tok::KwChan, "'chan'")?;
                let elem = self.parse_type()?;
                let end = self.arena.types.span(elem);
                Ok(self.arena.types.alloc(
                    Type::Chan {
                        dir: ChanDir::Recv,
                        chan_pos,
                        arrow_pos: Some(arrow_pos),
                        elem,
                    },
                    Span::new(arrow_pos.start as usize, end.end as usize),
                ))
            }
            Tok::KwStruct => self.struct_type(),
            Tok::KwInterface => self.interface_type(),
            Tok::KwFunc => {
                let func_pos = self.bump().0;
                let sig = self.signature()?;
                let end = self.arena.signatures.span(sig);
                Ok(self.arena.types.alloc(
                    Type::Func { func_pos, sig },
                    Span::new(func_pos.start as usize, end.end as usize),
                ))
            }
            Tok::LParen => {
                let l_paren = self.bump().0;
                let typ = self.parse_type()?;
                let r_paren = self.expect(Tok::RParen, "')'")?;
                Ok(self.arena.types.alloc(
                    Type::Paren {
                        l_paren,
                        typ,
                        r_paren,
                    },
                    Span::new(l_paren.start as usize, r_paren.end as usize),
                ))
            }
            _ => self.unexpected("type"),
        }
    }

    fn struct_type(&mut self) -> PResult<TypeId> {
        let struct_pos = self.expect(Tok::KwStruct, "'struct'")?;
        let l_brace = self.expect(Tok::LBrace, "'{'")?;
        let mut fields = Vec::new();
        while self.peek() != Tok::RBrace && self.peek() != Tok::Eof {
            fields.push(self.struct_field()?);
            self.expect_semi()?;
        }
        let r_brace = self.expect(Tok::RBrace, "'}'")?;
        let fields = self.arena.list_fields(fields);
        Ok(self.arena.types.alloc(
            Type::Struct {
                struct_pos,
                l_brace,
                fields,
                r_brace,
            },
            Span::new(struct_pos.start as usize, r_brace.end as usize),
        ))
    }

    fn struct_field(&mut self) -> PResult<FieldId> {
        let start = self.cur_span();

        // Embedded fields: `T`, `pkg.T`, `*T`, `*pkg.T` followed by a tag,
        // semicolon or the closing brace.
        let embedded = match self.peek() {
            Tok::Star => true,
            Tok::Ident(_) => matches!(
                self.peek2(),
                Tok::Dot
                    | Tok::Semi
                    | Tok::RBrace
                    | Tok::StringLit(_)
                    | Tok::RawStringLit(_)
            ),
            _ => false,
        };

        if embedded {
            let typ = self.parse_type()?;
            let tag = self.field_tag();
            let end = self.toks.get(self.pos - 1).map(|t| t.2).unwrap_or(0);
            let field = Field {
                names: ListRef::EMPTY,
                ellipsis_pos: None,
                typ,
                tag,
                is_embed: true,
            };
            return Ok(self
                .arena
                .fields
                .alloc(field, Span::new(start.start as usize, self.base as usize + end)));
        }

        let mut names = vec![self.expect_ident("field name")?];
        while self.peek() == Tok::Comma {
            self.bump();
            names.push(self.expect_ident("field name")?);
        }
        let typ = self.parse_type()?;
        let tag = self.field_tag();
        let names = self.arena.list_ident_names(names);
        let end = self.toks.get(self.pos - 1).map(|t| t.2).unwrap_or(0);
        let field = Field {
            names,
            ellipsis_pos: None,
            typ,
            tag,
            is_embed: false,
        };
        Ok(self
            .arena
            .fields
            .alloc(field, Span::new(start.start as usize, self.base as usize + end)))
    }

    fn field_tag(&mut self) -> Option<StringLit> {
        match self.peek() {
            Tok::StringLit(s) | Tok::RawStringLit(s) => {
                let sym = self.intern(s);
                let (span, _) = self.bump();
                Some(StringLit { sym, pos: span })
            }
            _ => None,
        }
    }

    fn interface_type(&mut self) -> PResult<TypeId> {
        let interface_pos = self.expect(Tok::KwInterface, "'interface'")?;
        let l_brace = self.expect(Tok::LBrace, "'{'")?;
        let mut elems = Vec::new();
        while self.peek() != Tok::RBrace && self.peek() != Tok::Eof {
            if let Tok::Ident(_) = self.peek() {
                if self.peek2() == Tok::LParen {
                    let name = self.expect_ident("method name")?;
                    let sig = self.signature()?;
                    elems.push(InterfaceElem::Method { name, sig });
                    self.expect_semi()?;
                    continue;
                }
            }
            let typ = self.parse_type()?;
            elems.push(InterfaceElem::Embedded(typ));
            self.expect_semi()?;
        }
        let r_brace = self.expect(Tok::RBrace, "'}'")?;
        let elems = self.arena.list_interface_elems(elems);
        Ok(self.arena.types.alloc(
            Type::Interface {
                interface_pos,
                l_brace,
                elems,
                r_brace,
            },
            Span::new(interface_pos.start as usize, r_brace.end as usize),
        ))
    }

    // ---- expressions ----

    fn expr(&mut self) -> PResult<ExprId> {
        self.binary_expr(1)
    }

    fn expr_list(&mut self) -> PResult<Vec<ExprId>> {
        let mut list = vec![self.expr()?];
        while self.peek() == Tok::Comma {
            self.bump();
            list.push(self.expr()?);
        }
        Ok(list)
    }

    fn binary_expr(&mut self, min_prec: u8) -> PResult<ExprId> {
        let mut left = self.unary_expr()?;
        loop {
            let Some(op) = self.binary_op() else { break };
            let prec = op.precedence();
            if prec < min_prec {
                break;
            }
            let op_pos = self.bump().0;
            let right = self.binary_expr(prec + 1)?;
            let span = Span::new(
                self.arena.exprs.span(left).start as usize,
                self.arena.exprs.span(right).end as usize,
            );
            left = self.arena.exprs.alloc(
                Expr::Binary {
                    left,
                    op,
                    op_pos,
                    right,
                },
                span,
            );
        }
        Ok(left)
    }

    fn binary_op(&self) -> Option<BinaryOp> {
        Some(match self.peek() {
            Tok::LOr => BinaryOp::LOr,
            Tok::LAnd => BinaryOp::LAnd,
            Tok::EqEq => BinaryOp::Eq,
            Tok::NotEq => BinaryOp::Ne,
            Tok::Lt => BinaryOp::Lt,
            Tok::Le => BinaryOp::Le,
            Tok::Gt => BinaryOp::Gt,
            Tok::Ge => BinaryOp::Ge,
            Tok::Plus => BinaryOp::Add,
            Tok::Minus => BinaryOp::Sub,
            Tok::Pipe => BinaryOp::Or,
            Tok::Caret => BinaryOp::Xor,
            Tok::Star => BinaryOp::Mul,
            Tok::Slash => BinaryOp::Div,
            Tok::Percent => BinaryOp::Mod,
            Tok::Shl => BinaryOp::Shl,
            Tok::Shr => BinaryOp::Shr,
            Tok::Amp => BinaryOp::And,
            Tok::AndNot => BinaryOp::AndNot,
            _ => return None,
        })
    }

    fn unary_expr(&mut self) -> PResult<ExprId> {
        let op = match self.peek() {
            Tok::Plus => Some(UnaryOp::Add),
            Tok::Minus => Some(UnaryOp::Sub),
            Tok::Bang => Some(UnaryOp::Not),
            Tok::Caret => Some(UnaryOp::Xor),
            Tok::Star => Some(UnaryOp::Deref),
            Tok::Amp => Some(UnaryOp::Addr),
            Tok::Arrow => Some(UnaryOp::Recv),
            _ => None,
        };
        if let Some(op) = op {
            let op_pos = self.bump().0;
            let expr = self.unary_expr()?;
            let span = Span::new(
                op_pos.start as usize,
                self.arena.exprs.span(expr).end as usize,
            );
            return Ok(self.arena.exprs.alloc(Expr::Unary { op, op_pos, expr }, span));
        }
        self.primary_expr()
    }

    fn primary_expr(&mut self) -> PResult<ExprId> {
        let mut x = self.operand()?;
        loop {
            match self.peek() {
                Tok::Dot => {
                    let dot_pos = self.bump().0;
                    match self.peek() {
                        Tok::Ident(_) => {
                            let sel = self.expect_ident("selector")?;
                            let span = Span::new(
                                self.arena.exprs.span(x).start as usize,
                                sel.pos.end as usize,
                            );
                            x = self.arena.exprs.alloc(
                                Expr::Selector {
                                    expr: x,
                                    dot_pos,
                                    sel,
                                },
                                span,
                            );
                        }
                        Tok::LParen => {
                            let l_paren = self.bump().0;
                            let typ = if self.peek() == Tok::KwType {
                                self.bump();
                                None
                            } else {
                                Some(self.with_expr_lev(1, |p| p.parse_type())?)
                            };
                            let r_paren = self.expect(Tok::RParen, "')'")?;
                            let span = Span::new(
                                self.arena.exprs.span(x).start as usize,
                                r_paren.end as usize,
                            );
                            x = self.arena.exprs.alloc(
                                Expr::TypeAssert {
                                    expr: x,
                                    dot_pos,
                                    l_paren,
                                    typ,
                                    r_paren,
                                },
                                span,
                            );
                        }
                        _ => return self.unexpected("selector or type assertion"),
                    }
                }
                Tok::LParen => {
                    x = self.call(CallCallee::Expr(x))?;
                }
                Tok::LBrack => {
                    x = self.index_or_slice(x)?;
                }
                Tok::LBrace => {
                    // A `{` continues the expression only when the operand
                    // is a type name and composite literals are allowed in
                    // this context.
                    if self.expr_lev < 0 || !self.is_type_name(x) {
                        break;
                    }
                    let typ = self.expr_as_named_type(x)?;
                    let lit = self.literal_value()?;
                    let span = Span::new(
                        self.arena.exprs.span(x).start as usize,
                        lit.r_brace.end as usize,
                    );
                    x = self.arena.exprs.alloc(Expr::CompositeLit { typ, lit }, span);
                }
                _ => break,
            }
        }
        Ok(x)
    }

    fn is_type_name(&self, x: ExprId) -> bool {
        match self.arena.exprs[x] {
            Expr::Ident(..) => true,
            Expr::Selector { expr, .. } => matches!(self.arena.exprs[expr], Expr::Ident(..)),
            _ => false,
        }
    }

    /// Rebuilds an `Ident`/`Selector` operand as the type node of a
    /// composite literal.
    fn expr_as_named_type(&mut self, x: ExprId) -> PResult<TypeId> {
        let span = self.arena.exprs.span(x);
        match self.arena.exprs[x] {
            Expr::Ident(sym, pos) => Ok(self.arena.types.alloc(
                Type::Named {
                    pkg: None,
                    dot_pos: None,
                    name: IdentName { sym, pos },
                },
                span,
            )),
            Expr::Selector { expr, dot_pos, sel } => match self.arena.exprs[expr] {
                Expr::Ident(sym, pos) => Ok(self.arena.types.alloc(
                    Type::Named {
                        pkg: Some(IdentName { sym, pos }),
                        dot_pos: Some(dot_pos),
                        name: sel,
                    },
                    span,
                )),
                _ => self.err(span, "invalid composite literal type"),
            },
            _ => self.err(span, "invalid composite literal type"),
        }
    }

    fn call(&mut self, callee: CallCallee) -> PResult<ExprId> {
        let l_paren = self.expect(Tok::LParen, "'('")?;
        let start = match callee {
            CallCallee::Expr(e) => self.arena.exprs.span(e).start,
            CallCallee::Type(t) => self.arena.types.span(t).start,
        };

        let mut type_arg = None;
        let mut args = Vec::new();
        let mut ellipsis = None;

        self.with_expr_lev(1, |p| {
            let mut first = true;
            while p.peek() != Tok::RParen && p.peek() != Tok::Eof {
                // `make([]T, n)` / `new(chan int)`: a leading argument that
                // can only be a type goes into `type_arg`.
                if first && p.starts_type_only() {
                    let t = p.parse_type()?;
                    match p.peek() {
                        Tok::LBrace => {
                            // `[3]int{...}` — a composite literal argument.
                            let lit = p.literal_value()?;
                            let span = Span::new(
                                p.arena.types.span(t).start as usize,
                                lit.r_brace.end as usize,
                            );
                            let e = p.arena.exprs.alloc(Expr::CompositeLit { typ: t, lit }, span);
                            let e = p.expr_suffix(e)?;
                            args.push(e);
                        }
                        Tok::LParen => {
                            // `[]byte("x")` — a conversion argument.
                            let e = p.call(CallCallee::Type(t))?;
                            let e = p.expr_suffix(e)?;
                            args.push(e);
                        }
                        _ => type_arg = Some(t),
                    }
                } else {
                    args.push(p.expr()?);
                }
                first = false;

                if p.peek() == Tok::Ellipsis {
                    ellipsis = Some(p.bump().0);
                }
                if p.peek() == Tok::Comma {
                    p.bump();
                } else {
                    break;
                }
            }
            Ok(())
        })?;

        let r_paren = self.expect(Tok::RParen, "')'")?;
        let args = self.arena.list_exprs(args);
        let span = Span::new(start as usize, r_paren.end as usize);
        Ok(self.arena.exprs.alloc(
            Expr::Call {
                callee,
                l_paren,
                type_arg,
                args,
                ellipsis,
                r_paren,
            },
            span,
        ))
    }

    /// Tokens that begin a type but never an expression.
    fn starts_type_only(&self) -> bool {
        match self.peek() {
            Tok::KwMap | Tok::KwChan | Tok::KwStruct | Tok::KwInterface => true,
            Tok::LBrack => true,
            Tok::KwFunc => {
                // A func type with no body is a type argument; a func
                // literal is an expression. Decided later by the caller
                // (literal parse continues through `{`), so treat `func`
                // as expression territory here.
                false
            }
            _ => false,
        }
    }

    /// Continues suffix parsing for an expression produced outside
    /// `primary_expr` (conversion / composite-literal call arguments).
    fn expr_suffix(&mut self, mut x: ExprId) -> PResult<ExprId> {
        loop {
            match self.peek() {
                Tok::Dot | Tok::LParen | Tok::LBrack => {
                    x = self.primary_suffix_once(x)?;
                }
                _ => return Ok(x),
            }
        }
    }

    fn primary_suffix_once(&mut self, x: ExprId) -> PResult<ExprId> {
        match self.peek() {
            Tok::LParen => self.call(CallCallee::Expr(x)),
            Tok::LBrack => self.index_or_slice(x),
            Tok::Dot => {
                let dot_pos = self.bump().0;
                let sel = self.expect_ident("selector")?;
                let span = Span::new(
                    self.arena.exprs.span(x).start as usize,
                    sel.pos.end as usize,
                );
                Ok(self.arena.exprs.alloc(
                    Expr::Selector {
                        expr: x,
                        dot_pos,
                        sel,
                    },
                    span,
                ))
            }
            _ => Ok(x),
        }
    }

    fn index_or_slice(&mut self, x: ExprId) -> PResult<ExprId> {
        let l_brack = self.expect(Tok::LBrack, "'['")?;
        self.with_expr_lev(1, |p| {
            let lo = if p.peek() == Tok::Colon {
                None
            } else {
                Some(p.expr()?)
            };

            if p.peek() == Tok::Colon {
                let colon1 = p.bump().0;
                let hi = if matches!(p.peek(), Tok::Colon | Tok::RBrack) {
                    None
                } else {
                    Some(p.expr()?)
                };
                let (colon2, max) = if p.peek() == Tok::Colon {
                    let c2 = p.bump().0;
                    (Some(c2), Some(p.expr()?))
                } else {
                    (None, None)
                };
                let r_brack = p.expect(Tok::RBrack, "']'")?;
                let span = Span::new(
                    p.arena.exprs.span(x).start as usize,
                    r_brack.end as usize,
                );
                return Ok(p.arena.exprs.alloc(
                    Expr::Slice {
                        expr: x,
                        l_brack,
                        lo,
                        colon1,
                        hi,
                        colon2,
                        max,
                        r_brack,
                    },
                    span,
                ));
            }

            let index = match lo {
                Some(e) => e,
                None => return p.unexpected("index expression"),
            };
            let r_brack = p.expect(Tok::RBrack, "']'")?;
            let span = Span::new(
                p.arena.exprs.span(x).start as usize,
                r_brack.end as usize,
            );
            Ok(p.arena.exprs.alloc(
                Expr::Index {
                    expr: x,
                    l_brack,
                    index,
                    r_brack,
                },
                span,
            ))
        })
    }

    fn operand(&mut self) -> PResult<ExprId> {
        match self.peek() {
            Tok::Ident(name) => {
                let (span, _) = self.bump();
                let sym = self.intern(name);
                Ok(self.arena.exprs.alloc(Expr::Ident(sym, span), span))
            }
            Tok::IntLit(_) | Tok::FloatLit(_) | Tok::ImagLit(_) | Tok::RuneLit(_)
            | Tok::StringLit(_) | Tok::RawStringLit(_) => {
                let (kind, text) = match self.peek() {
                    Tok::IntLit(t) => (BasicLitKind::Int, t),
                    Tok::FloatLit(t) => (BasicLitKind::Float, t),
                    Tok::ImagLit(t) => (BasicLitKind::Imag, t),
                    Tok::RuneLit(t) => (BasicLitKind::Rune, t),
                    Tok::StringLit(t) | Tok::RawStringLit(t) => (BasicLitKind::String, t),
                    _ => unreachable!(),
                };
                let sym = self.intern(text);
                let (span, _) = self.bump();
                Ok(self.arena.exprs.alloc(
                    Expr::BasicLit(BasicLit {
                        kind,
                        sym,
                        pos: span,
                    }),
                    span,
                ))
            }
            Tok::LParen => {
                let l_paren = self.bump().0;
                let expr = self.with_expr_lev(1, |p| p.expr())?;
                let r_paren = self.expect(Tok::RParen, "')'")?;
                let span = Span::new(l_paren.start as usize, r_paren.end as usize);
                Ok(self.arena.exprs.alloc(
                    Expr::Paren {
                        l_paren,
                        expr,
                        r_paren,
                    },
                    span,
                ))
            }
            Tok::KwFunc => {
                let func_pos = self.bump().0;
                let sig = self.signature()?;
                if self.peek() == Tok::LBrace {
                    let body = self.with_expr_lev(1, |p| p.block())?;
                    let span = Span::new(
                        func_pos.start as usize,
                        self.arena.blocks[body].r_brace.end as usize,
                    );
                    Ok(self
                        .arena
                        .exprs
                        .alloc(Expr::FuncLit { func_pos, sig, body }, span))
                } else {
                    // Bare func type in expression position: a conversion
                    // callee like `func(int) int(v)` is not expressible
                    // without parens in Go either.
                    self.unexpected("function literal body")
                }
            }
            Tok::LBrack | Tok::KwMap | Tok::KwChan | Tok::KwStruct | Tok::KwInterface => {
                // Composite literal with explicit type, or conversion.
                let typ = self.parse_type()?;
                match self.peek() {
                    Tok::LBrace => {
                        let lit = self.literal_value()?;
                        let span = Span::new(
                            self.arena.types.span(typ).start as usize,
                            lit.r_brace.end as usize,
                        );
                        Ok(self.arena.exprs.alloc(Expr::CompositeLit { typ, lit }, span))
                    }
                    Tok::LParen => self.call(CallCallee::Type(typ)),
                    _ => self.unexpected("composite literal or conversion"),
                }
            }
            _ => self.unexpected("expression"),
        }
    }

    fn literal_value(&mut self) -> PResult<LiteralValue> {
        let l_brace = self.expect(Tok::LBrace, "'{'")?;
        let mut elements = Vec::new();
        self.with_expr_lev(1, |p| {
            while p.peek() != Tok::RBrace && p.peek() != Tok::Eof {
                elements.push(p.keyed_element()?);
                if p.peek() == Tok::Comma {
                    p.bump();
                } else {
                    break;
                }
            }
            Ok(())
        })?;
        let r_brace = self.expect(Tok::RBrace, "'}'")?;
        let elements = self.arena.list_keyed_elems(elements);
        Ok(LiteralValue {
            l_brace,
            elements,
            r_brace,
        })
    }

    fn keyed_element(&mut self) -> PResult<KeyedElement> {
        // Either `key: value` or a bare element; both key and value may be
        // a nested brace literal with elided type.
        let first = if self.peek() == Tok::LBrace {
            ElementOrKey::Literal(self.literal_value()?)
        } else {
            ElementOrKey::Expr(self.expr()?)
        };

        if self.peek() == Tok::Colon {
            let colon_pos = self.bump().0;
            let key = match first {
                ElementOrKey::Expr(e) => Key::Expr(e),
                ElementOrKey::Literal(l) => Key::Literal(l),
            };
            let value = if self.peek() == Tok::LBrace {
                Element::Literal(self.literal_value()?)
            } else {
                Element::Expr(self.expr()?)
            };
            return Ok(KeyedElement {
                key: Some(key),
                colon_pos: Some(colon_pos),
                value,
            });
        }

        let value = match first {
            ElementOrKey::Expr(e) => Element::Expr(e),
            ElementOrKey::Literal(l) => Element::Literal(l),
        };
        Ok(KeyedElement {
            key: None,
            colon_pos: None,
            value,
        })
    }

    // ---- statements ----

    fn block(&mut self) -> PResult<BlockId> {
        let l_brace = self.expect(Tok::LBrace, "'{'")?;
        let stmts = self.stmt_list()?;
        let r_brace = self.expect(Tok::RBrace, "'}'")?;
        let stmts = self.arena.list_stmts(stmts);
        Ok(self.arena.blocks.alloc(
            Block {
                l_brace,
                stmts,
                r_brace,
            },
            Span::new(l_brace.start as usize, r_brace.end as usize),
        ))
    }

    /// Statements until a closing brace, `case` or `default`.
    fn stmt_list(&mut self) -> PResult<Vec<StmtId>> {
        let mut stmts = Vec::new();
        loop {
            let tok = self.peek();
            if matches!(tok, Tok::Eof | Tok::RBrace | Tok::KwCase | Tok::KwDefault) {
                break;
            }
            if tok == Tok::Semi {
                self.bump();
                continue;
            }
            let s = self.stmt()?;
            stmts.push(s);
            self.expect_stmt_end()?;
        }
        Ok(stmts)
    }

    /// Like `expect_semi`, but also tolerant right before `case`/`default`.
    fn expect_stmt_end(&mut self) -> PResult<()> {
        match self.peek() {
            Tok::Semi => {
                self.bump();
                Ok(())
            }
            Tok::RParen | Tok::RBrace | Tok::KwCase | Tok::KwDefault | Tok::Eof => Ok(()),
            _ => self.unexpected("';'"),
        }
    }

    fn stmt(&mut self) -> PResult<StmtId> {
        match self.peek() {
            Tok::KwConst | Tok::KwType | Tok::KwVar => {
                let d = self.gen_decl()?;
                let span = self.arena.decls.span(d);
                Ok(self.arena.stmts.alloc(
                    Stmt::Decl(d),
                    Span::new(span.start as usize, span.end as usize),
                ))
            }
            Tok::KwGo => {
                let go_pos = self.bump().0;
                let call = self.expr()?;
                let span = Span::new(
                    go_pos.start as usize,
                    self.arena.exprs.span(call).end as usize,
                );
                Ok(self.arena.stmts.alloc(Stmt::Go { go_pos, call }, span))
            }
            Tok::KwDefer => {
                let defer_pos = self.bump().0;
                let call = self.expr()?;
                let span = Span::new(
                    defer_pos.start as usize,
                    self.arena.exprs.span(call).end as usize,
                );
                Ok(self
                    .arena
                    .stmts
                    .alloc(Stmt::Defer { defer_pos, call }, span))
            }
            Tok::KwReturn => {
                let return_pos = self.bump().0;
                let mut results = Vec::new();
                if !matches!(
                    self.peek(),
                    Tok::Semi | Tok::RBrace | Tok::KwCase | Tok::KwDefault | Tok::Eof
                ) {
                    results = self.expr_list()?;
                }
                let end = results
                    .last()
                    .map(|&e| self.arena.exprs.span(e).end)
                    .unwrap_or(return_pos.end);
                let results = self.arena.list_exprs(results);
                Ok(self.arena.stmts.alloc(
                    Stmt::Return {
                        return_pos,
                        results,
                    },
                    Span::new(return_pos.start as usize, end as usize),
                ))
            }
            Tok::KwBreak => {
                let break_pos = self.bump().0;
                let label = self.opt_label();
                let span = Span::new(
                    break_pos.start as usize,
                    label.map(|l| l.pos.end).unwrap_or(break_pos.end) as usize,
                );
                Ok(self
                    .arena
                    .stmts
                    .alloc(Stmt::Branch(BranchStmt::Break { break_pos, label }), span))
            }
            Tok::KwContinue => {
                let cont_pos = self.bump().0;
                let label = self.opt_label();
                let span = Span::new(
                    cont_pos.start as usize,
                    label.map(|l| l.pos.end).unwrap_or(cont_pos.end) as usize,
                );
                Ok(self
                    .arena
                    .stmts
                    .alloc(Stmt::Branch(BranchStmt::Continue { cont_pos, label }), span))
            }
            Tok::KwGoto => {
                let goto_pos = self.bump().0;
                let label = self.expect_ident("label")?;
                let span = Span::new(goto_pos.start as usize, label.pos.end as usize);
                Ok(self
                    .arena
                    .stmts
                    .alloc(Stmt::Branch(BranchStmt::Goto { goto_pos, label }), span))
            }
            Tok::KwFallthrough => {
                let fall_pos = self.bump().0;
                Ok(self
                    .arena
                    .stmts
                    .alloc(Stmt::Branch(BranchStmt::Fallthrough { fall_pos }), fall_pos))
            }
            Tok::LBrace => {
                let b = self.block()?;
                let span = self.arena.blocks.span(b);
                Ok(self.arena.stmts.alloc(
                    Stmt::Block(b),
                    Span::new(span.start as usize, span.end as usize),
                ))
            }
            Tok::KwIf => self.if_stmt(),
            Tok::KwFor => self.for_stmt(),
            Tok::KwSwitch => self.switch_stmt(),
            Tok::KwSelect => self.select_stmt(),
            Tok::Ident(_) if self.peek2() == Tok::Colon => {
                let label = self.expect_ident("label")?;
                let colon_pos = self.bump().0;
                let stmt = self.stmt()?;
                let span = Span::new(
                    label.pos.start as usize,
                    self.arena.stmts.span(stmt).end as usize,
                );
                Ok(self.arena.stmts.alloc(
                    Stmt::Labeled {
                        label,
                        colon_pos,
                        stmt,
                    },
                    span,
                ))
            }
            Tok::Semi => {
                let (span, _) = self.bump();
                let s = self.arena.simple_stmts.alloc(SimpleStmt::Empty(span), span);
                Ok(self.arena.stmts.alloc(Stmt::Simple(s), span))
            }
            _ => {
                let s = self.simple_stmt(false)?.into_simple()?;
                let span = self.arena.simple_stmts.span(s);
                Ok(self.arena.stmts.alloc(
                    Stmt::Simple(s),
                    Span::new(span.start as usize, span.end as usize),
                ))
            }
        }
    }

    fn opt_label(&mut self) -> Option<IdentName> {
        if let Tok::Ident(name) = self.peek() {
            let sym = self.intern(name);
            let (span, _) = self.bump();
            Some(IdentName { sym, pos: span })
        } else {
            None
        }
    }

    fn if_stmt(&mut self) -> PResult<StmtId> {
        let if_pos = self.expect(Tok::KwIf, "'if'")?;

        let (init, cond) = self.with_expr_lev(-1, |p| {
            let first = p.simple_stmt(false)?.into_simple()?;
            if p.peek() == Tok::Semi {
                p.bump();
                let cond = p.expr()?;
                Ok((Some(first), cond))
            } else {
                let cond = match p.arena.simple_stmts[first] {
                    SimpleStmt::Expr(e) => e,
                    _ => {
                        return p.err(
                            p.arena.simple_stmts.span(first),
                            "expected condition expression",
                        )
                    }
                };
                Ok((None, cond))
            }
        })?;

        let then_block = self.block()?;

        let else_stmt = if self.peek() == Tok::KwElse {
            self.bump();
            match self.peek() {
                Tok::KwIf => Some(self.if_stmt()?),
                Tok::LBrace => {
                    let b = self.block()?;
                    let span = self.arena.blocks.span(b);
                    Some(self.arena.stmts.alloc(
                        Stmt::Block(b),
                        Span::new(span.start as usize, span.end as usize),
                    ))
                }
                _ => return self.unexpected("'if' or block after 'else'"),
            }
        } else {
            None
        };

        let end = match else_stmt {
            Some(s) => self.arena.stmts.span(s).end,
            None => self.arena.blocks[then_block].r_brace.end,
        };
        Ok(self.arena.stmts.alloc(
            Stmt::If {
                if_pos,
                init,
                cond,
                then_block,
                else_stmt,
            },
            Span::new(if_pos.start as usize, end as usize),
        ))
    }

    fn for_stmt(&mut self) -> PResult<StmtId> {
        let for_pos = self.expect(Tok::KwFor, "'for'")?;

        let kind = self.with_expr_lev(-1, |p| {
            if p.peek() == Tok::LBrace {
                return Ok(ForKind::Infinite);
            }

            if p.peek() == Tok::KwRange {
                let range_pos = p.bump().0;
                let expr = p.expr()?;
                return Ok(ForKind::Range {
                    lhs: None,
                    range_pos,
                    expr,
                });
            }

            if p.peek() == Tok::Semi {
                // `for ; cond ; post`
                p.bump();
                let cond = if p.peek() == Tok::Semi {
                    None
                } else {
                    Some(p.expr()?)
                };
                p.expect(Tok::Semi, "';'")?;
                let post = if p.peek() == Tok::LBrace {
                    None
                } else {
                    Some(p.simple_stmt(false)?.into_simple()?)
                };
                return Ok(ForKind::ForClause {
                    init: None,
                    cond,
                    post,
                });
            }

            let first = p.simple_stmt(true)?;
            match first {
                HeaderStmt::Range { lhs, range_pos, expr } => Ok(ForKind::Range {
                    lhs: Some(lhs),
                    range_pos,
                    expr,
                }),
                HeaderStmt::Simple(first) => {
                    if p.peek() == Tok::Semi {
                        p.bump();
                        let cond = if p.peek() == Tok::Semi {
                            None
                        } else {
                            Some(p.expr()?)
                        };
                        p.expect(Tok::Semi, "';'")?;
                        let post = if p.peek() == Tok::LBrace {
                            None
                        } else {
                            Some(p.simple_stmt(false)?.into_simple()?)
                        };
                        Ok(ForKind::ForClause {
                            init: Some(first),
                            cond,
                            post,
                        })
                    } else {
                        let cond = match p.arena.simple_stmts[first] {
                            SimpleStmt::Expr(e) => e,
                            _ => {
                                return p.err(
                                    p.arena.simple_stmts.span(first),
                                    "expected loop condition",
                                )
                            }
                        };
                        Ok(ForKind::Cond(cond))
                    }
                }
            }
        })?;

        let body = self.block()?;
        let end = self.arena.blocks[body].r_brace.end;
        Ok(self.arena.stmts.alloc(
            Stmt::For {
                for_pos,
                kind,
                body,
            },
            Span::new(for_pos.start as usize, end as usize),
        ))
    }

    fn switch_stmt(&mut self) -> PResult<StmtId> {
        let switch_pos = self.expect(Tok::KwSwitch, "'switch'")?;

        let mut init = None;
        let mut tag = None;
        let mut guard = None;

        if self.peek() != Tok::LBrace {
            self.with_expr_lev(-1, |p| {
                let first = p.simple_stmt(false)?.into_simple()?;
                if p.peek() == Tok::Semi {
                    p.bump();
                    init = Some(first);
                    if p.peek() != Tok::LBrace {
                        let second = p.simple_stmt(false)?.into_simple()?;
                        match p.guard_of(second) {
                            Some(g) => guard = Some(g),
                            None => match p.arena.simple_stmts[second] {
                                SimpleStmt::Expr(e) => tag = Some(e),
                                _ => {
                                    return p.err(
                                        p.arena.simple_stmts.span(second),
                                        "expected switch expression",
                                    )
                                }
                            },
                        }
                    }
                } else {
                    match p.guard_of(first) {
                        Some(g) => guard = Some(g),
                        None => match p.arena.simple_stmts[first] {
                            SimpleStmt::Expr(e) => tag = Some(e),
                            _ => {
                                return p.err(
                                    p.arena.simple_stmts.span(first),
                                    "expected switch expression",
                                )
                            }
                        },
                    }
                }
                Ok(())
            })?;
        }

        let l_brace = self.expect(Tok::LBrace, "'{'")?;

        let is_type_switch = guard.is_some();
        let mut clauses = Vec::new();
        while self.peek() != Tok::RBrace && self.peek() != Tok::Eof {
            clauses.push(self.switch_clause(is_type_switch)?);
        }
        let r_brace = self.expect(Tok::RBrace, "'}'")?;
        let clauses = self.arena.list_switch_clause_ids(clauses);
        let span = Span::new(switch_pos.start as usize, r_brace.end as usize);

        let stmt = match guard {
            Some(guard) => Stmt::TypeSwitch {
                switch_pos,
                init,
                guard,
                l_brace,
                clauses,
                r_brace,
            },
            None => Stmt::Switch {
                switch_pos,
                init,
                tag,
                l_brace,
                clauses,
                r_brace,
            },
        };
        Ok(self.arena.stmts.alloc(stmt, span))
    }

    /// Recognizes `x := y.(type)` / `y.(type)` parsed as a simple
    /// statement.
    fn guard_of(&self, s: SimpleStmtId) -> Option<TypeSwitchGuard> {
        let type_assert = |e: ExprId| match self.arena.exprs[e] {
            Expr::TypeAssert {
                expr,
                dot_pos,
                l_paren,
                typ: None,
                r_paren,
            } => Some(TypeSwitchGuard {
                bind: None,
                x: expr,
                dot_pos,
                l_paren,
                type_pos: Span::new(l_paren.end as usize, r_paren.start as usize),
                r_paren,
            }),
            _ => None,
        };

        match self.arena.simple_stmts[s] {
            SimpleStmt::Expr(e) => type_assert(e),
            SimpleStmt::ShortVarDecl {
                names,
                op_pos,
                values,
            } => {
                let names = self.arena.ident_names(names);
                let values = self.arena.exprs_list(values);
                if names.len() != 1 || values.len() != 1 {
                    return None;
                }
                let mut g = type_assert(values[0])?;
                g.bind = Some(TypeSwitchBind {
                    name: names[0],
                    op_pos,
                });
                Some(g)
            }
            _ => None,
        }
    }

    fn switch_clause(&mut self, type_switch: bool) -> PResult<SwitchClauseId> {
        let (case_pos, is_default) = match self.peek() {
            Tok::KwCase => (self.bump().0, false),
            Tok::KwDefault => (self.bump().0, true),
            _ => return self.unexpected("'case' or 'default'"),
        };

        let clause = if type_switch {
            let mut items = Vec::new();
            if !is_default {
                loop {
                    if self.peek() == Tok::Ident("nil") {
                        items.push(TypeCaseElem::Nil(self.bump().0));
                    } else {
                        items.push(TypeCaseElem::Type(self.parse_type()?));
                    }
                    if self.peek() == Tok::Comma {
                        self.bump();
                    } else {
                        break;
                    }
                }
            }
            let colon_pos = self.expect(Tok::Colon, "':'")?;
            let stmts = self.stmt_list()?;
            let items = self.arena.list_type_case_elems(items);
            let stmts = self.arena.list_stmts(stmts);
            SwitchClause::TypeCase {
                case_pos,
                items,
                colon_pos,
                stmts,
            }
        } else {
            let mut items = Vec::new();
            if !is_default {
                items = self.expr_list()?;
            }
            let colon_pos = self.expect(Tok::Colon, "':'")?;
            let stmts = self.stmt_list()?;
            let items = self.arena.list_exprs(items);
            let stmts = self.arena.list_stmts(stmts);
            SwitchClause::ExprCase {
                case_pos,
                items,
                colon_pos,
                stmts,
            }
        };

        Ok(self.arena.switch_clauses.alloc(clause, case_pos))
    }

    fn select_stmt(&mut self) -> PResult<StmtId> {
        let select_pos = self.expect(Tok::KwSelect, "'select'")?;
        let l_brace = self.expect(Tok::LBrace, "'{'")?;
        let mut clauses = Vec::new();
        while self.peek() != Tok::RBrace && self.peek() != Tok::Eof {
            clauses.push(self.comm_clause()?);
        }
        let r_brace = self.expect(Tok::RBrace, "'}'")?;
        let clauses = self.arena.list_comm_clause_ids(clauses);
        Ok(self.arena.stmts.alloc(
            Stmt::Select {
                select_pos,
                l_brace,
                clauses,
                r_brace,
            },
            Span::new(select_pos.start as usize, r_brace.end as usize),
        ))
    }

    fn comm_clause(&mut self) -> PResult<CommClauseId> {
        match self.peek() {
            Tok::KwDefault => {
                let default_pos = self.bump().0;
                let colon_pos = self.expect(Tok::Colon, "':'")?;
                let stmts = self.stmt_list()?;
                let stmts = self.arena.list_stmts(stmts);
                Ok(self.arena.comm_clauses.alloc(
                    CommClause::Default {
                        default_pos,
                        colon_pos,
                        stmts,
                    },
                    default_pos,
                ))
            }
            Tok::KwCase => {
                let case_pos = self.bump().0;
                let first = self.simple_stmt(false)?.into_simple()?;
                let comm = self.comm_of(first)?;
                let colon_pos = self.expect(Tok::Colon, "':'")?;
                let stmts = self.stmt_list()?;
                let stmts = self.arena.list_stmts(stmts);
                Ok(self.arena.comm_clauses.alloc(
                    CommClause::Case {
                        case_pos,
                        comm,
                        colon_pos,
                        stmts,
                    },
                    case_pos,
                ))
            }
            _ => self.unexpected("'case' or 'default'"),
        }
    }

    /// Reinterprets a parsed simple statement as a select communication.
    fn comm_of(&mut self, s: SimpleStmtId) -> PResult<CommStmt> {
        match self.arena.simple_stmts[s] {
            SimpleStmt::Send {
                chan,
                op_pos,
                value,
            } => Ok(CommStmt::Send {
                chan,
                op_pos,
                value,
            }),
            SimpleStmt::Expr(e) => Ok(CommStmt::Recv { lhs: None, expr: e }),
            SimpleStmt::ShortVarDecl {
                names,
                op_pos,
                values,
            } => {
                let values = self.arena.exprs_list(values);
                if values.len() != 1 {
                    return self.err(
                        self.arena.simple_stmts.span(s),
                        "expected receive expression",
                    );
                }
                Ok(CommStmt::Recv {
                    lhs: Some(RangeLhs::Def {
                        idents: names,
                        op_pos,
                    }),
                    expr: values[0],
                })
            }
            SimpleStmt::Assign {
                lhs,
                op: AssignOp::Assign,
                op_pos,
                rhs,
            } => {
                let rhs = self.arena.exprs_list(rhs);
                if rhs.len() != 1 {
                    return self.err(
                        self.arena.simple_stmts.span(s),
                        "expected receive expression",
                    );
                }
                Ok(CommStmt::Recv {
                    lhs: Some(RangeLhs::Assign {
                        exprs: lhs,
                        op_pos,
                    }),
                    expr: rhs[0],
                })
            }
            _ => self.err(
                self.arena.simple_stmts.span(s),
                "expected send or receive statement",
            ),
        }
    }

    // ---- simple statements ----

    fn simple_stmt(&mut self, range_ok: bool) -> PResult<HeaderStmt> {
        let lhs = self.expr_list()?;
        let start = self.arena.exprs.span(lhs[0]).start;

        match self.peek() {
            Tok::Define => {
                let op_pos = self.bump().0;

                if range_ok && self.peek() == Tok::KwRange {
                    let range_pos = self.bump().0;
                    let expr = self.expr()?;
                    let idents = self.idents_of(&lhs)?;
                    let idents = self.arena.list_ident_names(idents);
                    return Ok(HeaderStmt::Range {
                        lhs: RangeLhs::Def { idents, op_pos },
                        range_pos,
                        expr,
                    });
                }

                let values = self.expr_list()?;
                let idents = self.idents_of(&lhs)?;
                let end = self.arena.exprs.span(*values.last().unwrap()).end;
                let names = self.arena.list_ident_names(idents);
                let values = self.arena.list_exprs(values);
                let s = self.arena.simple_stmts.alloc(
                    SimpleStmt::ShortVarDecl {
                        names,
                        op_pos,
                        values,
                    },
                    Span::new(start as usize, end as usize),
                );
                Ok(HeaderStmt::Simple(s))
            }
            tok if assign_op(tok).is_some() => {
                let op = assign_op(tok).unwrap();
                let op_pos = self.bump().0;

                if range_ok && op == AssignOp::Assign && self.peek() == Tok::KwRange {
                    let range_pos = self.bump().0;
                    let expr = self.expr()?;
                    let exprs = self.arena.list_exprs(lhs);
                    return Ok(HeaderStmt::Range {
                        lhs: RangeLhs::Assign { exprs, op_pos },
                        range_pos,
                        expr,
                    });
                }

                let rhs = self.expr_list()?;
                let end = self.arena.exprs.span(*rhs.last().unwrap()).end;
                let lhs = self.arena.list_exprs(lhs);
                let rhs = self.arena.list_exprs(rhs);
                let s = self.arena.simple_stmts.alloc(
                    SimpleStmt::Assign {
                        lhs,
                        op,
                        op_pos,
                        rhs,
                    },
                    Span::new(start as usize, end as usize),
                );
                Ok(HeaderStmt::Simple(s))
            }
            Tok::Arrow => {
                if lhs.len() != 1 {
                    return self.unexpected("'=' or ':='");
                }
                let op_pos = self.bump().0;
                let value = self.expr()?;
                let end = self.arena.exprs.span(value).end;
                let s = self.arena.simple_stmts.alloc(
                    SimpleStmt::Send {
                        chan: lhs[0],
                        op_pos,
                        value,
                    },
                    Span::new(start as usize, end as usize),
                );
                Ok(HeaderStmt::Simple(s))
            }
            Tok::Inc | Tok::Dec => {
                if lhs.len() != 1 {
                    return self.unexpected("'=' or ':='");
                }
                let op = if self.peek() == Tok::Inc {
                    IncDecOp::Inc
                } else {
                    IncDecOp::Dec
                };
                let op_pos = self.bump().0;
                let s = self.arena.simple_stmts.alloc(
                    SimpleStmt::IncDec {
                        expr: lhs[0],
                        op,
                        op_pos,
                    },
                    Span::new(start as usize, op_pos.end as usize),
                );
                Ok(HeaderStmt::Simple(s))
            }
            _ => {
                if lhs.len() != 1 {
                    return self.unexpected("'=' or ':='");
                }
                let span = self.arena.exprs.span(lhs[0]);
                let s = self.arena.simple_stmts.alloc(
                    SimpleStmt::Expr(lhs[0]),
                    Span::new(span.start as usize, span.end as usize),
                );
                Ok(HeaderStmt::Simple(s))
            }
        }
    }

    fn idents_of(&mut self, exprs: &[ExprId]) -> PResult<Vec<IdentName>> {
        let mut out = Vec::with_capacity(exprs.len());
        for &e in exprs {
            match self.arena.exprs[e] {
                Expr::Ident(sym, pos) => out.push(IdentName { sym, pos }),
                _ => {
                    return self.err(
                        self.arena.exprs.span(e),
                        "non-name on left side of :=",
                    )
                }
            }
        }
        Ok(out)
    }
}

fn assign_op(tok: Tok<'_>) -> Option<AssignOp> {
    Some(match tok {
        Tok::Assign => AssignOp::Assign,
        Tok::AddAssign => AssignOp::AddAssign,
        Tok::SubAssign => AssignOp::SubAssign,
        Tok::MulAssign => AssignOp::MulAssign,
        Tok::DivAssign => AssignOp::DivAssign,
        Tok::ModAssign => AssignOp::ModAssign,
        Tok::AndAssign => AssignOp::AndAssign,
        Tok::OrAssign => AssignOp::OrAssign,
        Tok::XorAssign => AssignOp::XorAssign,
        Tok::ShlAssign => AssignOp::ShlAssign,
        Tok::ShrAssign => AssignOp::ShrAssign,
        Tok::AndNotAssign => AssignOp::AndNotAssign,
        _ => return None,
    })
}

/// A composite-literal element before the `:` decides whether it was a
/// key.
enum ElementOrKey {
    Expr(ExprId),
    Literal(LiteralValue),
}

/// Result of header-position simple-statement parsing: range clauses only
/// exist inside `for` headers.
enum HeaderStmt {
    Simple(SimpleStmtId),
    Range {
        lhs: RangeLhs,
        range_pos: Span,
        expr: ExprId,
    },
}

impl HeaderStmt {
    fn into_simple(self) -> PResult<SimpleStmtId> {
        match self {
            HeaderStmt::Simple(s) => Ok(s),
            HeaderStmt::Range { range_pos, .. } => Err(Diag {
                kind: DiagKind::Parse,
                span: range_pos,
                message: "range clause is only valid in a for statement".to_string(),
            }),
        }
    }
}
