//! Template sets and the expander that renders them into a tree.
//!
//! A [`TemplateSet`] is a flat list of files whose *paths* and *contents*
//! are both parameterized:
//!
//! | Syntax                               | Where   | Meaning                                   |
//! |--------------------------------------|---------|-------------------------------------------|
//! | `{{key}}`                            | content | value of `key`                            |
//! | `{{#if flag}}…{{else}}…{{/if}}`      | content | keep a fragment when `flag` is true       |
//! | `{{#unless flag}}…{{/unless}}`       | content | keep a fragment when `flag` is false      |
//! | `__key__`                            | path    | value of `key`                            |
//! | `__tmpl__`                           | path    | removed (lets sources carry any name)     |
//!
//! Rendering is strict: an unresolved placeholder, a flag that is missing
//! or not boolean, and an unbalanced block are all
//! [`DomainError::Template`]. Block tags that sit alone on a line take the
//! whole line with them.

use std::collections::BTreeMap;
use std::fmt;

use tracing::{debug, instrument};

use crate::domain::entities::path::WorkspacePath;
use crate::domain::entities::tree::WorkspaceTree;
use crate::domain::error::DomainError;
use crate::domain::names::Names;

// ============================================================================
// Identity and sources
// ============================================================================

/// Name of a template set (`library`, `component`, `storybook`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TemplateId(String);

impl TemplateId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TemplateId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for TemplateId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Source text: compiled into the binary or loaded at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    /// `include_str!` content.
    Static(&'static str),
    /// Loaded from disk.
    Owned(String),
}

impl TemplateSource {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Static(s) => s,
            Self::Owned(s) => s,
        }
    }

    /// Quick check used by loaders to pick Literal vs Parameterized.
    pub fn contains_placeholder(&self) -> bool {
        self.as_str().contains("{{")
    }
}

impl From<&'static str> for TemplateSource {
    fn from(s: &'static str) -> Self {
        Self::Static(s)
    }
}

impl From<String> for TemplateSource {
    fn from(s: String) -> Self {
        Self::Owned(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateContent {
    /// Copied verbatim.
    Literal(TemplateSource),
    /// Rendered against the [`TemplateContext`].
    Parameterized(TemplateSource),
}

/// One file of a template set. `path` is relative to the destination root
/// and may itself contain `__key__` substitutions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateFile {
    pub path: String,
    pub content: TemplateContent,
}

impl TemplateFile {
    pub fn literal(path: impl Into<String>, source: impl Into<TemplateSource>) -> Self {
        Self {
            path: path.into(),
            content: TemplateContent::Literal(source.into()),
        }
    }

    pub fn parameterized(path: impl Into<String>, source: impl Into<TemplateSource>) -> Self {
        Self {
            path: path.into(),
            content: TemplateContent::Parameterized(source.into()),
        }
    }
}

/// A named directory of template files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSet {
    id: TemplateId,
    files: Vec<TemplateFile>,
}

impl TemplateSet {
    pub fn new(id: impl Into<TemplateId>, files: Vec<TemplateFile>) -> Self {
        Self {
            id: id.into(),
            files,
        }
    }

    pub fn id(&self) -> &TemplateId {
        &self.id
    }

    pub fn files(&self) -> &[TemplateFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Keep only files whose source path satisfies `keep`.
    pub fn filter(mut self, keep: impl Fn(&TemplateFile) -> bool) -> Self {
        self.files.retain(|f| keep(f));
        self
    }

    /// Add or replace a file by source path.
    pub fn upsert(&mut self, file: TemplateFile) {
        match self.files.iter_mut().find(|f| f.path == file.path) {
            Some(existing) => *existing = file,
            None => self.files.push(file),
        }
    }

    /// Render every file for `destination`.
    ///
    /// Nothing is returned unless every path and every body rendered, and
    /// every path stayed inside `destination`.
    pub fn render(
        &self,
        destination: &WorkspacePath,
        context: &TemplateContext,
    ) -> Result<Vec<RenderedFile>, DomainError> {
        let template = self.id.as_str();
        self.files
            .iter()
            .map(|file| {
                let relative = render_path(template, &file.path, context)?;
                let path = destination.join_within(&relative)?;
                let content = match &file.content {
                    TemplateContent::Literal(source) => source.as_str().to_string(),
                    TemplateContent::Parameterized(source) => {
                        render_str(&format!("{template}/{}", file.path), source.as_str(), context)?
                    }
                };
                Ok(RenderedFile { path, content })
            })
            .collect()
    }
}

/// A fully rendered file, ready to be staged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    pub path: WorkspacePath,
    pub content: String,
}

/// Render `set` into `destination` and stage every file in `tree`.
///
/// All files are rendered before the first write, so a failing file leaves
/// the tree untouched.
#[instrument(skip_all, fields(template = %set.id(), destination = %destination))]
pub fn generate_files(
    tree: &mut WorkspaceTree,
    set: &TemplateSet,
    destination: &WorkspacePath,
    context: &TemplateContext,
) -> Result<Vec<WorkspacePath>, DomainError> {
    let rendered = set.render(destination, context)?;
    let mut written = Vec::with_capacity(rendered.len());
    for file in rendered {
        tree.write(file.path.as_str(), file.content)?;
        written.push(file.path);
    }
    debug!(files = written.len(), "template expanded");
    Ok(written)
}

// ============================================================================
// Context
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateValue {
    Text(String),
    Flag(bool),
}

impl From<&str> for TemplateValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for TemplateValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for TemplateValue {
    fn from(b: bool) -> Self {
        Self::Flag(b)
    }
}

/// Variables visible to one expansion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateContext {
    variables: BTreeMap<String, TemplateValue>,
}

impl TemplateContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context seeded with every casing variant of `names`.
    pub fn from_names(names: &Names) -> Self {
        let mut ctx = Self::new();
        for (key, value) in names.variables() {
            ctx.insert(key, value);
        }
        ctx
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<TemplateValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<TemplateValue>) {
        self.variables.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&TemplateValue> {
        self.variables.get(key)
    }
}

// ============================================================================
// Path rendering
// ============================================================================

/// Substitute `__key__` segments and drop `__tmpl__`.
pub fn render_path(template: &str, path: &str, context: &TemplateContext) -> Result<String, DomainError> {
    let mut out = String::with_capacity(path.len());
    let mut rest = path;

    while let Some(start) = rest.find("__") {
        let after = &rest[start + 2..];
        let Some(len) = after.find("__") else {
            break;
        };
        let key = &after[..len];
        if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric()) {
            out.push_str(&rest[..start + 2]);
            rest = after;
            continue;
        }

        out.push_str(&rest[..start]);
        if key != "tmpl" {
            match context.get(key) {
                Some(TemplateValue::Text(value)) => out.push_str(value),
                Some(TemplateValue::Flag(_)) => {
                    return Err(DomainError::template(
                        template,
                        path,
                        format!("path key '{key}' is a flag, not a string"),
                    ));
                }
                None => {
                    return Err(DomainError::template(
                        template,
                        path,
                        format!("unresolved path key '__{key}__'"),
                    ));
                }
            }
        }
        rest = &after[len + 2..];
    }

    out.push_str(rest);
    Ok(out)
}

// ============================================================================
// Content rendering
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    If,
    Unless,
}

impl BlockKind {
    fn keyword(self) -> &'static str {
        match self {
            Self::If => "if",
            Self::Unless => "unless",
        }
    }
}

#[derive(Debug)]
enum Token<'a> {
    Text(&'a str),
    Var { name: &'a str, at: usize },
    Open { kind: BlockKind, flag: &'a str, at: usize },
    Else { at: usize },
    Close { kind: BlockKind, at: usize },
}

#[derive(Debug)]
enum Node<'a> {
    Text(&'a str),
    Var {
        name: &'a str,
        at: usize,
    },
    Block {
        kind: BlockKind,
        flag: &'a str,
        at: usize,
        then: Vec<Node<'a>>,
        otherwise: Vec<Node<'a>>,
    },
}

/// Render one template body.
///
/// `template` names the source in error messages.
pub fn render_str(template: &str, source: &str, context: &TemplateContext) -> Result<String, DomainError> {
    let tokens = tokenize(template, source)?;
    let nodes = parse(template, source, tokens)?;
    let mut out = String::with_capacity(source.len());
    evaluate(template, source, &nodes, context, &mut out)?;
    Ok(out)
}

fn tokenize<'a>(template: &str, source: &'a str) -> Result<Vec<Token<'a>>, DomainError> {
    let mut tokens = Vec::new();
    let mut cursor = 0;

    while let Some(rel) = source[cursor..].find("{{") {
        let open = cursor + rel;
        let Some(close_rel) = source[open + 2..].find("}}") else {
            return Err(DomainError::template(template, location(source, open), "unclosed '{{'"));
        };
        let close = open + 2 + close_rel;
        let inner = source[open + 2..close].trim();
        let end = close + 2;

        let token = classify(template, source, inner, open)?;
        let is_block = !matches!(token, Token::Var { .. });

        let mut text_end = open;
        let mut next = end;
        if is_block {
            if let Some((line_start, line_end)) = standalone_span(source, open, end) {
                text_end = line_start.max(cursor);
                next = line_end;
            }
        }

        if text_end > cursor {
            tokens.push(Token::Text(&source[cursor..text_end]));
        }
        tokens.push(token);
        cursor = next;
    }

    if cursor < source.len() {
        tokens.push(Token::Text(&source[cursor..]));
    }
    Ok(tokens)
}

fn classify<'a>(template: &str, source: &str, inner: &'a str, at: usize) -> Result<Token<'a>, DomainError> {
    let flag_of = |rest: &'a str, kind: BlockKind| -> Result<&'a str, DomainError> {
        let flag = rest.trim();
        if is_identifier(flag) {
            Ok(flag)
        } else {
            Err(DomainError::template(
                template,
                location(source, at),
                format!("'#{}' needs a single flag name, got '{}'", kind.keyword(), flag),
            ))
        }
    };

    if let Some(rest) = inner.strip_prefix("#if") {
        return Ok(Token::Open {
            kind: BlockKind::If,
            flag: flag_of(rest, BlockKind::If)?,
            at,
        });
    }
    if let Some(rest) = inner.strip_prefix("#unless") {
        return Ok(Token::Open {
            kind: BlockKind::Unless,
            flag: flag_of(rest, BlockKind::Unless)?,
            at,
        });
    }
    match inner {
        "else" => Ok(Token::Else { at }),
        "/if" => Ok(Token::Close { kind: BlockKind::If, at }),
        "/unless" => Ok(Token::Close { kind: BlockKind::Unless, at }),
        name if is_identifier(name) => Ok(Token::Var { name, at }),
        other => Err(DomainError::template(
            template,
            location(source, at),
            format!("malformed tag '{{{{{other}}}}}'"),
        )),
    }
}

/// Byte span of the whole line around a tag at `open..end`, when the tag is
/// the only non-blank thing on it. The span includes the trailing newline.
fn standalone_span(source: &str, open: usize, end: usize) -> Option<(usize, usize)> {
    let line_start = source[..open].rfind('\n').map_or(0, |i| i + 1);
    if !source[line_start..open].chars().all(|c| c == ' ' || c == '\t') {
        return None;
    }
    let tail = &source[end..];
    let line_len = tail.find('\n').map_or(tail.len(), |i| i + 1);
    if !tail[..line_len].trim().is_empty() {
        return None;
    }
    Some((line_start, end + line_len))
}

fn parse<'a>(template: &str, source: &str, tokens: Vec<Token<'a>>) -> Result<Vec<Node<'a>>, DomainError> {
    struct Frame<'a> {
        kind: BlockKind,
        flag: &'a str,
        at: usize,
        then: Vec<Node<'a>>,
        otherwise: Vec<Node<'a>>,
        in_else: bool,
    }

    let mut root: Vec<Node<'a>> = Vec::new();
    let mut stack: Vec<Frame<'a>> = Vec::new();

    fn sink<'s, 'a>(root: &'s mut Vec<Node<'a>>, stack: &'s mut [Frame<'a>]) -> &'s mut Vec<Node<'a>> {
        match stack.last_mut() {
            Some(frame) if frame.in_else => &mut frame.otherwise,
            Some(frame) => &mut frame.then,
            None => root,
        }
    }

    for token in tokens {
        match token {
            Token::Text(text) => sink(&mut root, &mut stack).push(Node::Text(text)),
            Token::Var { name, at } => sink(&mut root, &mut stack).push(Node::Var { name, at }),
            Token::Open { kind, flag, at } => stack.push(Frame {
                kind,
                flag,
                at,
                then: Vec::new(),
                otherwise: Vec::new(),
                in_else: false,
            }),
            Token::Else { at } => match stack.last_mut() {
                Some(frame) if !frame.in_else => frame.in_else = true,
                Some(_) => {
                    return Err(DomainError::template(template, location(source, at), "duplicate '{{else}}'"));
                }
                None => {
                    return Err(DomainError::template(
                        template,
                        location(source, at),
                        "'{{else}}' outside of a block",
                    ));
                }
            },
            Token::Close { kind, at } => {
                let Some(frame) = stack.pop() else {
                    return Err(DomainError::template(
                        template,
                        location(source, at),
                        format!("'{{{{/{}}}}}' without a matching opening tag", kind.keyword()),
                    ));
                };
                if frame.kind != kind {
                    return Err(DomainError::template(
                        template,
                        location(source, at),
                        format!(
                            "'{{{{/{}}}}}' closes a '#{}' block opened at {}",
                            kind.keyword(),
                            frame.kind.keyword(),
                            location(source, frame.at)
                        ),
                    ));
                }
                sink(&mut root, &mut stack).push(Node::Block {
                    kind: frame.kind,
                    flag: frame.flag,
                    at: frame.at,
                    then: frame.then,
                    otherwise: frame.otherwise,
                });
            }
        }
    }

    if let Some(frame) = stack.pop() {
        return Err(DomainError::template(
            template,
            location(source, frame.at),
            format!("unclosed '#{} {}' block", frame.kind.keyword(), frame.flag),
        ));
    }
    Ok(root)
}

fn evaluate(
    template: &str,
    source: &str,
    nodes: &[Node<'_>],
    context: &TemplateContext,
    out: &mut String,
) -> Result<(), DomainError> {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Var { name, at } => match context.get(name) {
                Some(TemplateValue::Text(value)) => out.push_str(value),
                Some(TemplateValue::Flag(flag)) => out.push_str(if *flag { "true" } else { "false" }),
                None => {
                    return Err(DomainError::template(
                        template,
                        location(source, *at),
                        format!("unresolved placeholder '{{{{{name}}}}}'"),
                    ));
                }
            },
            Node::Block {
                kind,
                flag,
                at,
                then,
                otherwise,
            } => {
                let value = match context.get(flag) {
                    Some(TemplateValue::Flag(value)) => *value,
                    Some(TemplateValue::Text(_)) => {
                        return Err(DomainError::template(
                            template,
                            location(source, *at),
                            format!("'{flag}' is not a boolean flag"),
                        ));
                    }
                    None => {
                        return Err(DomainError::template(
                            template,
                            location(source, *at),
                            format!("unknown flag '{flag}'"),
                        ));
                    }
                };
                let keep = match kind {
                    BlockKind::If => value,
                    BlockKind::Unless => !value,
                };
                let branch = if keep { then } else { otherwise };
                evaluate(template, source, branch, context, out)?;
            }
        }
    }
    Ok(())
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-')
}

fn location(source: &str, offset: usize) -> String {
    let before = &source[..offset];
    let line = before.matches('\n').count() + 1;
    let column = before.rfind('\n').map_or(offset, |i| offset - i - 1) + 1;
    format!("line {line}, column {column}")
}
