//! Recursive-descent parser for BLK documents.
//!
//! A document is `{` followed by a block body. The parser drives the
//! [`Lexer`] token by token, consults the [`EnumRegistry`] for `e_*` values,
//! resolves `extends` targets against the in-progress document root, and
//! splices `#include`d documents through an [`IncludeResolver`].
//!
//! # Error tiers
//!
//! Most value-level anomalies are tolerated: they produce a [`Diagnostic`]
//! with a named fallback and parsing continues (see
//! [`FallbackPolicy`](crate::FallbackPolicy)). Structural errors — malformed
//! vector/matrix separators, unterminated strings and arrays, an unexpected
//! token where `:`/`{`/`extends` was expected, end of input before a closing
//! `}` — are fatal to the *enclosing block*: its remaining entries are not
//! parsed and the failure propagates to the top-level loader. Malformed
//! numeric literals belong to the fatal tier as well; they never panic.
//!
//! All parse state (cursor, line counter, comment flags, diagnostics,
//! include depth) lives on the [`Parser`] value, so any number of documents
//! can be parsed concurrently against a shared read-only registry.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::warn;

use crate::block::Block;
use crate::error::{BlkError, Diagnostic, FallbackPolicy, Result};
use crate::escape::scan_quoted;
use crate::math::Mat4;
use crate::registry::EnumRegistry;
use crate::token::{Lexer, Token};
use crate::value::{DataArray, EnumRef, Value, ValueKind};

/// `#include` chains deeper than this are cut off with a diagnostic, so a
/// self-including document terminates instead of recursing without bound.
pub const MAX_INCLUDE_DEPTH: usize = 64;

/// Loads the text of an `#include`d document. Path resolution conventions
/// (base directories, search paths) belong to the resolver, not the parser.
pub trait IncludeResolver {
    /// Returns the document text, or `None` when it cannot be loaded.
    /// A failed load is non-fatal: the include contributes zero entries.
    fn resolve(&self, path: &str) -> Option<String>;
}

/// Resolver that refuses every include. Used by [`parse_str`], where no
/// filesystem convention exists.
pub struct NoIncludes;

impl IncludeResolver for NoIncludes {
    fn resolve(&self, _path: &str) -> Option<String> {
        None
    }
}

/// Resolves include paths relative to a base directory.
pub struct FsResolver {
    base: PathBuf,
}

impl FsResolver {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        FsResolver { base: base.into() }
    }
}

impl IncludeResolver for FsResolver {
    fn resolve(&self, path: &str) -> Option<String> {
        std::fs::read_to_string(self.base.join(path)).ok()
    }
}

/// Everything a parse produced: the (possibly partial) tree, the fatal error
/// if one stopped the parse, and every non-fatal diagnostic in source order.
#[derive(Debug)]
pub struct ParseReport {
    /// The parsed tree. Partially populated when `error` is set.
    pub root: Block,
    /// The structural error that aborted the parse, if any.
    pub error: Option<BlkError>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseReport {
    pub fn ok(&self) -> bool {
        self.error.is_none()
    }
}

/// One parse of one document.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    registry: &'a EnumRegistry,
    resolver: &'a dyn IncludeResolver,
    diags: Vec<Diagnostic>,
    include_depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(src: &'a str, registry: &'a EnumRegistry) -> Self {
        Parser {
            lexer: Lexer::new(src),
            registry,
            resolver: &NoIncludes,
            diags: Vec::new(),
            include_depth: 0,
        }
    }

    /// Replaces the include resolver (defaults to [`NoIncludes`]).
    pub fn with_resolver(mut self, resolver: &'a dyn IncludeResolver) -> Self {
        self.resolver = resolver;
        self
    }

    fn at_depth(mut self, depth: usize) -> Self {
        self.include_depth = depth;
        self
    }

    /// Parses the whole document. Never panics; tolerated anomalies land in
    /// the report's diagnostics, structural errors in its `error`.
    pub fn parse_document(mut self) -> ParseReport {
        let mut root = Block::new();
        let first = self.next();
        let error = if first.is_punct(b'{') {
            self.parse_block(&mut root, &mut Vec::new()).err()
        } else {
            Some(BlkError::NotADocument)
        };
        ParseReport {
            root,
            error,
            diagnostics: self.diags,
        }
    }

    fn next(&mut self) -> Token<'a> {
        self.lexer.next_token(&mut self.diags)
    }

    fn diag(&mut self, policy: FallbackPolicy, message: String) {
        warn!(line = self.lexer.line, "{message}");
        self.diags
            .push(Diagnostic::new(self.lexer.line, policy, message));
    }

    fn fatal(&self, message: String) -> BlkError {
        BlkError::Parse {
            line: self.lexer.line,
            message,
        }
    }

    /// Parses entries into the block addressed by `path` until the closing
    /// `}`.
    ///
    /// Parsing works on the live tree hanging off `root`: a nested block is
    /// attached to its parent as soon as its opening brace is read, so
    /// `extends` lookups see every block opened so far, including the
    /// still-open ancestors of the lookup site. Any entry whose value parse
    /// fails aborts this block: the remaining siblings are not parsed.
    fn parse_block(&mut self, root: &mut Block, path: &mut Vec<usize>) -> Result<()> {
        loop {
            let tok = self.next();
            match tok {
                Token::Punct(b'}') => return Ok(()),
                Token::Eof => {
                    return Err(
                        self.fatal("block loader reached end of input, } expected".to_string())
                    );
                }
                Token::Word("#include") => {
                    let cur = self.open_block(root, path)?;
                    self.parse_include(cur)?;
                }
                _ => {
                    let name = tok.describe();
                    self.parse_entry(name, root, path)?;
                }
            }
        }
    }

    /// Re-derives the block `path` addresses from `root`. The path is built
    /// by `parse_child_block` and always points at blocks.
    fn open_block<'b>(&self, root: &'b mut Block, path: &[usize]) -> Result<&'b mut Block> {
        root.block_at_mut(path)
            .ok_or_else(|| self.fatal("open block chain is broken".to_string()))
    }

    /// Parses one entry after its name: `:<type> = <literal>`, `{ <block> }`,
    /// or `extends <name> { <block> }`.
    fn parse_entry(&mut self, name: String, root: &mut Block, path: &mut Vec<usize>) -> Result<()> {
        let tok = self.next();
        if tok.is_punct(b'{') || tok == Token::Word("extends") {
            return self.parse_child_block(tok, name, root, path);
        }
        if !tok.is_punct(b':') {
            return Err(self.fatal(format!(
                "expected : or {{ after value/block name, got {}",
                tok.describe()
            )));
        }
        let value = self.parse_typed_value()?;
        self.open_block(root, path)?.push_entry(name, value);
        Ok(())
    }

    /// Everything after the `:` of a typed entry.
    fn parse_typed_value(&mut self) -> Result<Value> {
        let type_tag = self.next().describe();
        if type_tag == "tag" {
            return Ok(Value::Empty);
        }
        let eq = self.next();
        if !eq.is_punct(b'=') {
            return Err(self.fatal("expected = after value type".to_string()));
        }

        match type_tag.as_str() {
            "b" => {
                let word = self.next().describe();
                let value = matches!(word.as_str(), "true" | "True" | "TRUE");
                if !value && !matches!(word.as_str(), "false" | "False" | "FALSE") {
                    self.diag(
                        FallbackPolicy::BoolFalse,
                        format!("unrecognized boolean literal {word}, reading as false"),
                    );
                }
                Ok(Value::Bool(value))
            }
            "i" => Ok(Value::Int(self.read_number("integer")?)),
            "u" | "u64" => Ok(Value::Uint64(self.read_number("unsigned integer")?)),
            "r" => Ok(Value::Double(self.read_number("number")?)),
            "p2" => {
                let v = self.read_csv::<f32>(2, "wrong description of vector")?;
                Ok(Value::Vec2(crate::math::Float2::new(v[0], v[1])))
            }
            "p3" => {
                let v = self.read_csv::<f32>(3, "wrong description of vector")?;
                Ok(Value::Vec3(crate::math::Float3::new(v[0], v[1], v[2])))
            }
            "p4" => {
                let v = self.read_csv::<f32>(4, "wrong description of vector")?;
                Ok(Value::Vec4(crate::math::Float4::new(v[0], v[1], v[2], v[3])))
            }
            "i2" => {
                let v = self.read_csv::<i32>(2, "wrong description of integer vector")?;
                Ok(Value::IVec2(crate::math::Int2::new(v[0], v[1])))
            }
            "i3" => {
                let v = self.read_csv::<i32>(3, "wrong description of integer vector")?;
                Ok(Value::IVec3(crate::math::Int3::new(v[0], v[1], v[2])))
            }
            "i4" => {
                let v = self.read_csv::<i32>(4, "wrong description of integer vector")?;
                Ok(Value::IVec4(crate::math::Int4::new(v[0], v[1], v[2], v[3])))
            }
            "m4" => {
                let v = self.read_csv::<f32>(16, "wrong description of matrix")?;
                // Text order is column-major: the first four numbers fill
                // column 0. Mat4 stores exactly that order.
                let mut m = [0.0f32; 16];
                m.copy_from_slice(&v);
                Ok(Value::Mat4(Mat4::from_cols(m)))
            }
            "s" => self.parse_string_value(),
            "arr" => self.parse_array(),
            t if t.starts_with("e_") => Ok(Value::Enum(self.parse_enum_value(&t[2..]))),
            other => Err(self.fatal(format!("unknown value type {other}"))),
        }
    }

    /// Reads one scalar token and parses it. A malformed literal is fatal to
    /// the enclosing block — never a panic.
    fn read_number<T: FromStr>(&mut self, what: &str) -> Result<T> {
        let word = self.next().describe();
        word.parse()
            .map_err(|_| self.fatal(format!("malformed {what} literal {word}")))
    }

    /// Reads `n` comma-separated scalars. A missing or mismatched comma is
    /// fatal with `err_msg` (the classic "wrong description of vector").
    fn read_csv<T: FromStr + Copy>(&mut self, n: usize, err_msg: &str) -> Result<Vec<T>> {
        let mut out = Vec::with_capacity(n);
        for i in 0..n {
            if i > 0 {
                let sep = self.next();
                if !sep.is_punct(b',') {
                    return Err(self.fatal(err_msg.to_string()));
                }
            }
            out.push(self.read_number("number")?);
        }
        Ok(out)
    }

    /// `{` or `extends <name> {`: attaches a nested block to the tree, parses
    /// its body in place, then applies the detalization merge when an
    /// `extends` base was found. The base is resolved against the document
    /// root before the body parses, so its snapshot reflects the document at
    /// the `extends` site.
    fn parse_child_block(
        &mut self,
        first: Token<'a>,
        name: String,
        root: &mut Block,
        path: &mut Vec<usize>,
    ) -> Result<()> {
        let mut base: Option<Block> = None;

        if first == Token::Word("extends") {
            let target = self.next().describe();
            let brace = self.next();
            if !brace.is_punct(b'{') {
                return Err(self.fatal("expected { after extends <parent_block_name>".to_string()));
            }
            match root.get_block_rec(&target) {
                Some(found) => base = Some(found.clone()),
                None => self.diag(
                    FallbackPolicy::BaseBlockMissing,
                    format!("block {target} is set to be parent for extension, but was not found"),
                ),
            }
        }

        let cur = self.open_block(root, path)?;
        let id = cur.len();
        cur.push_entry(name, Value::Block(Box::new(Block::new())));

        path.push(id);
        let parsed = self.parse_block(root, path);
        path.pop();
        parsed?;

        if let Some(mut merged) = base {
            if let Some(child) = self.open_block(root, path)?.child_block_mut(id) {
                merged.add_detalization(child);
                *child = merged;
            }
        }
        Ok(())
    }

    /// `s = "..."`. An unterminated string is fatal; a non-quote token after
    /// the `=` leaves the entry empty with a diagnostic.
    fn parse_string_value(&mut self) -> Result<Value> {
        let quote = self.next();
        if !quote.is_punct(b'"') {
            self.diag(
                FallbackPolicy::EntryLeftEmpty,
                format!("expected opening \" after s =, got {}", quote.describe()),
            );
            return Ok(Value::Empty);
        }
        let s = self.read_quoted("expected \" at the end of a string")?;
        Ok(Value::Str(s))
    }

    /// Scans a quoted payload starting at the current cursor (right after an
    /// opening `"` token) and leaves the cursor past the closing quote.
    fn read_quoted(&mut self, eof_msg: &str) -> Result<String> {
        let start = self.lexer.pos;
        let scan = scan_quoted(self.lexer.src, start, self.lexer.line, &mut self.diags);
        self.lexer.line += self.lexer.src[start..scan.end]
            .bytes()
            .filter(|&b| b == b'\n')
            .count();
        if !scan.terminated {
            self.lexer.pos = scan.end;
            return Err(self.fatal(eof_msg.to_string()));
        }
        self.lexer.pos = scan.end + 1;
        Ok(scan.text.into_owned())
    }

    /// `e_<Type> = <Member>`. Unknown type or member substitutes the
    /// placeholder `(0, 0)` and parsing continues.
    fn parse_enum_value(&mut self, type_name: &str) -> EnumRef {
        let member = self.next().describe();
        let Some(type_id) = self.registry.lookup_by_name(type_name) else {
            self.diag(
                FallbackPolicy::EnumPlaceholder,
                format!("enum {type_name} is not registered"),
            );
            return EnumRef::default();
        };
        let Some(val_id) = self.registry.value_id_by_name(type_id, &member) else {
            self.diag(
                FallbackPolicy::EnumPlaceholder,
                format!("enum {type_name} has no value {member}"),
            );
            return EnumRef::default();
        };
        EnumRef { type_id, val_id }
    }

    /// `arr = { <elem>, <elem>, ... }` where elements are numbers or quoted
    /// strings. The first element establishes the declared kind; a mismatch
    /// later is logged but the element is kept.
    fn parse_array(&mut self) -> Result<Value> {
        let open = self.next();
        if !open.is_punct(b'{') {
            return Err(self.fatal("expected { at the start of array".to_string()));
        }

        let mut values: Vec<Value> = Vec::new();
        let mut elem = ValueKind::Double;
        loop {
            let tok = self.next();
            let value = match tok {
                // Empty array, or a trailing comma: closes with the declared
                // kind reset to Double.
                Token::Punct(b'}') => {
                    return Ok(Value::Array(DataArray {
                        elem: ValueKind::Double,
                        values,
                    }));
                }
                Token::Eof => {
                    self.diag(
                        FallbackPolicy::EmptyArrayToken,
                        "empty token in array".to_string(),
                    );
                    return Err(self.fatal("expected } at the end of array".to_string()));
                }
                Token::Punct(b'"') => {
                    Value::Str(self.read_quoted("expected \" at the end of a string in array")?)
                }
                other => {
                    let word = other.describe();
                    let d: f64 = word
                        .parse()
                        .map_err(|_| self.fatal(format!("malformed number literal {word}")))?;
                    Value::Double(d)
                }
            };

            if values.is_empty() {
                elem = value.kind();
            } else if elem != value.kind() {
                self.diag(
                    FallbackPolicy::ArrayElementKept,
                    "array has values of different types".to_string(),
                );
            }
            values.push(value);

            let sep = self.next();
            if sep.is_punct(b'}') {
                return Ok(Value::Array(DataArray { elem, values }));
            }
            if !sep.is_punct(b',') {
                return Err(self.fatal("expected } at the end of array".to_string()));
            }
        }
    }

    /// `#include "<path>"`: parses the referenced document as its own tree
    /// and moves its top-level entries onto `block`. A path that cannot be
    /// loaded, or an include past [`MAX_INCLUDE_DEPTH`], contributes zero
    /// entries.
    fn parse_include(&mut self, block: &mut Block) -> Result<()> {
        let quote = self.next();
        if !quote.is_punct(b'"') {
            return Err(self.fatal("expected \" after #include".to_string()));
        }
        let path = self.read_quoted("expected \" at the end of a string in include path")?;

        if self.include_depth >= MAX_INCLUDE_DEPTH {
            self.diag(
                FallbackPolicy::IncludeSkipped,
                format!("include depth limit reached, skipping {path}"),
            );
            return Ok(());
        }

        let Some(text) = self.resolver.resolve(&path) else {
            self.diag(
                FallbackPolicy::IncludeSkipped,
                format!("failed to load block {path} required by #include"),
            );
            return Ok(());
        };

        // The included document gets its own root for `extends` lookups and
        // its own line numbering; its diagnostics are merged into ours.
        let mut report = Parser::new(&text, self.registry)
            .with_resolver(self.resolver)
            .at_depth(self.include_depth + 1)
            .parse_document();
        self.diags.append(&mut report.diagnostics);
        if let Some(err) = report.error {
            // Same tolerance as a failed load: keep whatever parsed.
            self.diag(
                FallbackPolicy::IncludeSkipped,
                format!("error in included block {path}: {err}"),
            );
        }
        block.append_from(&mut report.root);
        Ok(())
    }
}

/// Parses a document from an in-memory string. `#include` directives resolve
/// to nothing (with a warning); use [`load_file`] or a custom
/// [`IncludeResolver`] when includes matter.
pub fn parse_str(text: &str, registry: &EnumRegistry) -> Result<Block> {
    let report = Parser::new(text, registry).parse_document();
    match report.error {
        None => Ok(report.root),
        Some(err) => Err(err),
    }
}

/// Loads and parses a document from disk, resolving `#include` paths
/// relative to the file's directory.
pub fn load_file(path: impl AsRef<Path>, registry: &EnumRegistry) -> Result<Block> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| BlkError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let resolver = FsResolver::new(path.parent().unwrap_or(Path::new(".")));
    let report = Parser::new(&text, registry)
        .with_resolver(&resolver)
        .parse_document();
    match report.error {
        None => Ok(report.root),
        Some(err) => Err(err),
    }
}
