//! C header parser for the facade surface.
//!
//! Extracts public function declarations from the toolkit's header text and
//! decomposes them into [`Signature`]s. Declarations that cannot be wrapped
//! are collected as [`Skip`] records with a reason; a malformed declaration
//! never aborts the run.

pub mod types;

use std::path::Path;

use anyhow::{Context, Result};
use miette::Diagnostic;
use regex::Regex;
use thiserror::Error;

pub use types::{Param, ParsedSurface, Signature, Skip, SkipReason, TypeRef};

/// Words that cannot be a parameter name. Used to tell `widget_t w` apart
/// from an unnamed `unsigned int`.
const TYPE_WORDS: &[&str] = &[
    "void", "char", "short", "int", "long", "float", "double", "signed", "unsigned", "bool",
    "_Bool", "const", "volatile", "struct", "enum", "union",
];

/// Error for a single declaration that cannot be decomposed into
/// return type / name / parameter list.
#[derive(Debug, Error, Diagnostic)]
pub enum ParseError {
    #[error("declaration has an unbalanced parameter list")]
    #[diagnostic(code(safelvgl::parse::unbalanced))]
    UnbalancedParens,

    #[error("cannot split declaration into return type and name")]
    #[diagnostic(code(safelvgl::parse::head))]
    MalformedHead,

    #[error("missing return type")]
    #[diagnostic(code(safelvgl::parse::return_type))]
    MissingReturnType,

    #[error("function pointer return types are not rewritten")]
    #[diagnostic(
        code(safelvgl::parse::fn_ptr_return),
        help("declare the return type through a typedef so it can be reproduced verbatim")
    )]
    FunctionPointerReturn,

    #[error("cannot decompose parameter `{param}`")]
    #[diagnostic(code(safelvgl::parse::parameter))]
    MalformedParameter { param: String },
}

/// One top-level declaration parsed out of the header text.
struct Decl {
    signature: Signature,
    /// `static`/`inline` functions are not part of the exported surface.
    exported: bool,
}

/// Parser for the toolkit's public header surface.
///
/// Pure transform from text to an ordered [`ParsedSurface`]; ordering
/// follows the source so output is diff-stable across runs.
pub struct HeaderParser {
    /// Function names matching any of these are skipped.
    block_patterns: Vec<Regex>,
}

impl Default for HeaderParser {
    fn default() -> Self {
        HeaderParser {
            block_patterns: Vec::new(),
        }
    }
}

impl HeaderParser {
    /// Create a new parser with an empty blocklist.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set blocklist patterns from regex source strings.
    pub fn with_block_regexes(mut self, patterns: &[String]) -> Result<Self> {
        self.block_patterns = patterns
            .iter()
            .map(|p| Regex::new(p).with_context(|| format!("invalid blocklist pattern: {}", p)))
            .collect::<Result<_>>()?;
        Ok(self)
    }

    /// Parse a header file.
    pub fn parse_file(&self, path: &Path) -> Result<ParsedSurface> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read header: {}", path.display()))?;
        Ok(self.parse_content(&content, path))
    }

    /// Parse header content into an ordered surface.
    pub fn parse_content(&self, content: &str, path: &Path) -> ParsedSurface {
        let mut surface = ParsedSurface::new(path);
        let preprocessed = preprocess(content);

        let mut seen = std::collections::HashSet::new();

        for stmt in split_statements(&preprocessed) {
            let stmt = stmt.trim();
            if stmt.is_empty() || !stmt.contains('(') {
                continue;
            }
            // Function-pointer typedefs look like declarations but are not.
            if stmt.starts_with("typedef ") {
                continue;
            }

            match parse_declaration(stmt) {
                Ok(decl) => {
                    let name = decl.signature.name.clone();

                    if !decl.exported {
                        tracing::debug!("skipping non-exported function `{}`", name);
                        continue;
                    }
                    if let Some(pattern) = self.blocked_by(&name) {
                        tracing::debug!("function `{}` is blocklisted", name);
                        surface.skipped.push(Skip::new(
                            name,
                            SkipReason::Blocklisted {
                                pattern: pattern.to_string(),
                            },
                        ));
                        continue;
                    }
                    if !seen.insert(name.clone()) {
                        surface.skipped.push(Skip::new(name, SkipReason::Duplicate));
                        continue;
                    }

                    surface.functions.push(decl.signature);
                }
                Err(e) => {
                    tracing::debug!("cannot parse `{}`: {}", snippet(stmt), e);
                    surface.skipped.push(Skip::new(
                        snippet(stmt),
                        SkipReason::Malformed {
                            detail: e.to_string(),
                        },
                    ));
                }
            }
        }

        surface
    }

    /// Return the first blocklist pattern matching `name`, if any.
    fn blocked_by(&self, name: &str) -> Option<&str> {
        self.block_patterns
            .iter()
            .find(|p| p.is_match(name))
            .map(|p| p.as_str())
    }
}

/// Strip comments and preprocessor lines, normalize whitespace.
fn preprocess(content: &str) -> String {
    // Splice line continuations first so directives stay one line.
    let content = content.replace("\\\r\n", " ").replace("\\\n", " ");

    let re_block = Regex::new(r"/\*[\s\S]*?\*/").unwrap();
    let content = re_block.replace_all(&content, " ");

    let re_line = Regex::new(r"//[^\n]*").unwrap();
    let content = re_line.replace_all(&content, " ");

    // Function-like macros and every other directive drop out here.
    let re_directive = Regex::new(r"(?m)^[ \t]*#[^\n]*").unwrap();
    let content = re_directive.replace_all(&content, " ");

    // Unwrap `extern "C" {` linkage blocks; the stray closing brace is
    // harmless to the statement scanner.
    let re_linkage = Regex::new(r#"extern\s*"C"\s*\{"#).unwrap();
    let content = re_linkage.replace_all(&content, " ");

    let re_ws = Regex::new(r"\s+").unwrap();
    re_ws.replace_all(&content, " ").to_string()
}

/// Split preprocessed text into top-level statements.
///
/// A statement ends at `;` outside braces. A brace block directly after a
/// `)` is a function body: it is swallowed and the head becomes the
/// statement. Other brace blocks (struct/enum/union bodies) are dropped and
/// the statement continues to its terminating `;`.
fn split_statements(content: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut brace_depth = 0usize;
    let mut fn_body = false;

    for c in content.chars() {
        match c {
            '{' => {
                if brace_depth == 0 && current.trim_end().ends_with(')') {
                    fn_body = true;
                }
                brace_depth += 1;
            }
            '}' => {
                brace_depth = brace_depth.saturating_sub(1);
                if brace_depth == 0 && fn_body {
                    statements.push(std::mem::take(&mut current));
                    fn_body = false;
                }
            }
            ';' if brace_depth == 0 => {
                statements.push(std::mem::take(&mut current));
            }
            _ if brace_depth == 0 => current.push(c),
            _ => {}
        }
    }

    statements
}

/// Decompose one statement into a [`Signature`].
fn parse_declaration(stmt: &str) -> Result<Decl, ParseError> {
    let open = stmt.find('(').ok_or(ParseError::MalformedHead)?;
    let close = matching_paren(stmt, open).ok_or(ParseError::UnbalancedParens)?;

    let head = stmt[..open].trim();
    let params_text = &stmt[open + 1..close];

    // Trailing attribute macros after the parameter list are tolerated.

    let name_re = Regex::new(r"([A-Za-z_][A-Za-z0-9_]*)\s*$").unwrap();
    let name_match = name_re.captures(head).ok_or(ParseError::MalformedHead)?;
    let name = name_match.get(1).unwrap().as_str().to_string();
    let prefix = head[..name_match.get(1).unwrap().start()].trim();

    if prefix.contains('(') || prefix.contains(')') {
        return Err(ParseError::FunctionPointerReturn);
    }

    // Peel storage/function specifiers off the return type.
    let mut exported = true;
    let mut tokens: Vec<&str> = prefix.split_whitespace().collect();
    while let Some(first) = tokens.first() {
        match *first {
            "extern" => {
                tokens.remove(0);
            }
            "static" | "inline" | "__inline" => {
                exported = false;
                tokens.remove(0);
            }
            _ => break,
        }
    }
    let ret_text = tokens.join(" ");

    if ret_text.is_empty() {
        return Err(ParseError::MissingReturnType);
    }

    let return_type = TypeRef::parse(&ret_text);
    let (params, variadic) = parse_params(params_text)?;

    Ok(Decl {
        signature: Signature {
            name,
            return_type,
            params,
            variadic,
        },
        exported,
    })
}

/// Parse a parameter list, splitting on top-level commas only so
/// function-pointer parameters survive intact.
fn parse_params(params_text: &str) -> Result<(Vec<Param>, bool), ParseError> {
    let mut params = Vec::new();
    let mut variadic = false;

    let trimmed = params_text.trim();
    if trimmed.is_empty() || trimmed == "void" {
        return Ok((params, false));
    }

    for (i, piece) in split_top_level(trimmed).into_iter().enumerate() {
        let piece = piece.trim();
        if piece == "..." {
            variadic = true;
            continue;
        }
        params.push(parse_param(piece, i)?);
    }

    Ok((params, variadic))
}

/// Decompose a single parameter into name and type.
fn parse_param(piece: &str, index: usize) -> Result<Param, ParseError> {
    if piece.contains("(*") || piece.contains("( *") {
        return parse_fn_pointer_param(piece, index);
    }

    // Array parameters decay to pointers; rewrite so they forward cleanly.
    let array_re = Regex::new(r"^(.*?)([A-Za-z_][A-Za-z0-9_]*)\s*\[[^\]]*\]\s*$").unwrap();
    if let Some(caps) = array_re.captures(piece) {
        let name = caps.get(2).unwrap().as_str();
        let ty = TypeRef::parse(&format!("{} *", caps.get(1).unwrap().as_str().trim()));
        return Ok(Param::new(name, ty));
    }

    let name_re = Regex::new(r"([A-Za-z_][A-Za-z0-9_]*)\s*$").unwrap();
    if let Some(caps) = name_re.captures(piece) {
        let candidate = caps.get(1).unwrap().as_str();
        let prefix = piece[..caps.get(1).unwrap().start()].trim();
        // A trailing type word means the parameter is unnamed.
        if !prefix.is_empty() && !TYPE_WORDS.contains(&candidate) {
            return Ok(Param::new(candidate, TypeRef::parse(prefix)));
        }
    }

    // Unnamed parameter: the whole piece is the type, the wrapper supplies
    // a synthetic name so it can forward the argument.
    match TypeRef::parse(piece) {
        TypeRef::Named { base, .. } if base.is_empty() => Err(ParseError::MalformedParameter {
            param: piece.to_string(),
        }),
        ty => Ok(Param::new(format!("arg{}", index), ty)),
    }
}

/// Carry a function-pointer parameter verbatim, extracting (or inserting)
/// the embedded name so the argument can be forwarded.
fn parse_fn_pointer_param(piece: &str, index: usize) -> Result<Param, ParseError> {
    let name_re = Regex::new(r"\(\s*\*\s*(?:const\s+)?([A-Za-z_][A-Za-z0-9_]*)\s*\)").unwrap();

    if let Some(caps) = name_re.captures(piece) {
        let name = caps.get(1).unwrap().as_str().to_string();
        return Ok(Param::new(
            name,
            TypeRef::FunctionPointer {
                text: piece.to_string(),
            },
        ));
    }

    // Unnamed function pointer: insert a synthetic name into the declarator.
    let anon_re = Regex::new(r"\(\s*\*\s*\)").unwrap();
    if anon_re.is_match(piece) {
        let name = format!("arg{}", index);
        let text = anon_re.replace(piece, format!("(*{})", name)).to_string();
        return Ok(Param::new(name, TypeRef::FunctionPointer { text }));
    }

    Err(ParseError::MalformedParameter {
        param: piece.to_string(),
    })
}

/// Split on commas at parenthesis depth zero.
fn split_top_level(s: &str) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;

    for c in s.chars() {
        match c {
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if depth == 0 => pieces.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    if !current.trim().is_empty() {
        pieces.push(current);
    }

    pieces
}

/// Find the `)` matching the `(` at byte offset `open`.
fn matching_paren(s: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in s[open..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Truncate a statement for skip reports.
fn snippet(stmt: &str) -> String {
    const MAX: usize = 60;
    match stmt.char_indices().nth(MAX) {
        Some((end, _)) => format!("{}...", &stmt[..end]),
        None => stmt.to_string(),
    }
}
