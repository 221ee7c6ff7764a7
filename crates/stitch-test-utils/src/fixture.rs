//! Fixture parser for a C#-like subset
//!
//! Derives structural snapshots from hand-written test sources and from the
//! text the synthesizer produces. It understands `using` directives, block
//! and file-scoped namespaces, class/struct/interface/enum declarations,
//! fields, constructors, properties, events and methods with attributes and
//! `///` documentation. Member bodies are skipped, not parsed. Operators,
//! delegates, records and tuple types are not recognized.
//!
//! Spans follow one convention: a declaration that starts its line begins at
//! the line start (including leading docs and attributes), and a declaration
//! that ends its line ends after the newline.

use stitch_model::{
    Attribute, ContainerKind, DocumentBuilder, DocumentId, GenericParameter, MemberCategory, ModelError, Node, NodeId,
    NodeKind, Parameter, ParameterModifier, Signature, SourceDocument, Span, TypeKind, TypeRef,
};

/// Errors raised while scanning fixture text
#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    /// Opening delimiter without a match
    #[error("unbalanced '{open}' starting at byte {offset}")]
    Unbalanced {
        /// Delimiter
        open: char,
        /// Where it was opened
        offset: usize,
    },

    /// Closing brace outside any block
    #[error("unexpected '}}' at byte {0}")]
    UnexpectedClose(usize),

    /// Declaration runs into the end of the text
    #[error("unterminated declaration at byte {0}")]
    Unterminated(usize),

    /// Declaration not understood
    #[error("unrecognized declaration '{0}'")]
    Unrecognized(String),

    /// Snapshot construction failed
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Parse `text` into a snapshot identified by `id`
///
/// # Errors
/// Returns error if the text is not balanced or a declaration cannot be
/// classified
pub fn parse_document(id: impl Into<String>, text: &str) -> Result<SourceDocument, FixtureError> {
    let mut parser = Parser::new(DocumentId::new(id), text);
    parser.items(None, None, false)?;
    Ok(parser.builder.build()?)
}

const MODIFIERS: &[&str] = &[
    "public", "private", "protected", "internal", "static", "readonly", "const", "virtual", "override", "abstract",
    "sealed", "new", "extern", "unsafe", "async", "partial", "volatile", "required", "event",
];

#[derive(Debug, Default)]
struct Trivia {
    start: Option<usize>,
    attributes: Vec<Attribute>,
    docs: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Terminator {
    Semicolon,
    Brace,
    Arrow,
}

#[derive(Debug, Clone, Copy)]
struct Header {
    start: usize,
    decl_end: usize,
    end: usize,
    terminator: Terminator,
}

enum Step {
    Eof,
    Skipped,
    Byte(u8),
}

struct Parser<'t> {
    text: &'t str,
    bytes: &'t [u8],
    pos: usize,
    builder: DocumentBuilder,
}

impl<'t> Parser<'t> {
    fn new(id: DocumentId, text: &'t str) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos: 0,
            builder: DocumentBuilder::new(id, text),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn starts_with(&self, s: &str) -> bool {
        self.bytes[self.pos.min(self.bytes.len())..].starts_with(s.as_bytes())
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
            self.pos += 1;
        }
    }

    fn skip_line(&mut self) {
        while let Some(b) = self.peek() {
            self.pos += 1;
            if b == b'\n' {
                break;
            }
        }
    }

    fn skip_block_comment(&mut self) -> Result<(), FixtureError> {
        let start = self.pos;
        self.pos += 2;
        while self.pos < self.bytes.len() {
            if self.starts_with("*/") {
                self.pos += 2;
                return Ok(());
            }
            self.pos += 1;
        }
        Err(FixtureError::Unbalanced { open: '/', offset: start })
    }

    fn skip_string(&mut self) -> Result<(), FixtureError> {
        let start = self.pos;
        let mut verbatim = false;
        while let Some(b) = self.peek() {
            match b {
                b'@' => verbatim = true,
                b'$' => {}
                _ => break,
            }
            self.pos += 1;
        }
        self.pos += 1;
        while let Some(b) = self.peek() {
            self.pos += 1;
            match b {
                b'\\' if !verbatim => self.pos += 1,
                b'"' if verbatim && self.peek() == Some(b'"') => self.pos += 1,
                b'"' => return Ok(()),
                _ => {}
            }
        }
        Err(FixtureError::Unbalanced { open: '"', offset: start })
    }

    fn skip_char(&mut self) -> Result<(), FixtureError> {
        let start = self.pos;
        self.pos += 1;
        while let Some(b) = self.peek() {
            self.pos += 1;
            match b {
                b'\\' => self.pos += 1,
                b'\'' => return Ok(()),
                b'\n' => break,
                _ => {}
            }
        }
        Err(FixtureError::Unbalanced { open: '\'', offset: start })
    }

    /// Advance over one byte, or over a whole literal or comment
    fn step(&mut self) -> Result<Step, FixtureError> {
        let Some(b) = self.peek() else {
            return Ok(Step::Eof);
        };
        let next = self.bytes.get(self.pos + 1).copied();
        match (b, next) {
            (b'/', Some(b'/')) => {
                self.skip_line();
                Ok(Step::Skipped)
            }
            (b'/', Some(b'*')) => {
                self.skip_block_comment()?;
                Ok(Step::Skipped)
            }
            (b'"', _) | (b'@' | b'$', Some(b'"')) | (b'@', Some(b'$')) | (b'$', Some(b'@')) => {
                self.skip_string()?;
                Ok(Step::Skipped)
            }
            (b'\'', _) => {
                self.skip_char()?;
                Ok(Step::Skipped)
            }
            _ => {
                self.pos += 1;
                Ok(Step::Byte(b))
            }
        }
    }

    /// Skip to the delimiter matching the one at `open_at`; returns its offset
    fn close(&mut self, open_at: usize, open: u8, close: u8) -> Result<usize, FixtureError> {
        self.pos = open_at + 1;
        let mut depth = 1usize;
        loop {
            match self.step()? {
                Step::Eof => {
                    return Err(FixtureError::Unbalanced {
                        open: char::from(open),
                        offset: open_at,
                    })
                }
                Step::Skipped => {}
                Step::Byte(b) if b == open => depth += 1,
                Step::Byte(b) if b == close => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(self.pos - 1);
                    }
                }
                Step::Byte(_) => {}
            }
        }
    }

    fn skip_to_semicolon(&mut self) -> Result<(), FixtureError> {
        let start = self.pos;
        let mut depth = 0usize;
        loop {
            match self.step()? {
                Step::Eof => return Err(FixtureError::Unterminated(start)),
                Step::Byte(b'(' | b'[' | b'{') => depth += 1,
                Step::Byte(b')' | b']' | b'}') => depth = depth.saturating_sub(1),
                Step::Byte(b';') if depth == 0 => return Ok(()),
                Step::Skipped | Step::Byte(_) => {}
            }
        }
    }

    /// Start of the line holding `pos` if only indentation precedes it
    fn line_start(&self, pos: usize) -> usize {
        let mut i = pos;
        while i > 0 {
            match self.bytes[i - 1] {
                b' ' | b'\t' => i -= 1,
                b'\n' => return i,
                _ => return pos,
            }
        }
        0
    }

    /// Past the newline if only whitespace or a comment follows `pos`
    fn line_end(&self, pos: usize) -> usize {
        let mut i = pos;
        while matches!(self.bytes.get(i), Some(b' ' | b'\t' | b'\r')) {
            i += 1;
        }
        if self.bytes.get(i) == Some(&b'/') && self.bytes.get(i + 1) == Some(&b'/') {
            while !matches!(self.bytes.get(i), None | Some(b'\n')) {
                i += 1;
            }
        }
        match self.bytes.get(i) {
            None => i,
            Some(b'\n') => i + 1,
            Some(_) => pos,
        }
    }

    fn leading_trivia(&mut self) -> Result<Trivia, FixtureError> {
        let mut trivia = Trivia::default();
        loop {
            self.skip_ws();
            if self.starts_with("///") {
                trivia.start.get_or_insert(self.line_start(self.pos));
                trivia.docs = true;
                self.skip_line();
            } else if self.starts_with("//") || self.peek() == Some(b'#') {
                self.skip_line();
            } else if self.starts_with("/*") {
                self.skip_block_comment()?;
            } else if self.peek() == Some(b'[') {
                let open = self.pos;
                trivia.start.get_or_insert(self.line_start(open));
                let close = self.close(open, b'[', b']')?;
                self.pos = close + 1;
                trivia.attributes.extend(parse_attributes(&self.text[open + 1..close]));
            } else {
                return Ok(trivia);
            }
        }
    }

    /// Scan a declaration header up to its terminator
    fn header(&mut self) -> Result<Header, FixtureError> {
        let start = self.pos;
        let mut depth = 0usize;
        let mut decl_end: Option<usize> = None;
        loop {
            let at = self.pos;
            match self.step()? {
                Step::Eof => return Err(FixtureError::Unterminated(start)),
                Step::Skipped => {}
                Step::Byte(b'(' | b'[') => depth += 1,
                Step::Byte(b')' | b']') => depth = depth.saturating_sub(1),
                Step::Byte(b';') if depth == 0 => {
                    return Ok(Header {
                        start,
                        decl_end: decl_end.unwrap_or(at),
                        end: at,
                        terminator: Terminator::Semicolon,
                    })
                }
                Step::Byte(b'{') if depth == 0 => {
                    if decl_end.is_some() {
                        self.close(at, b'{', b'}')?;
                    } else {
                        return Ok(Header {
                            start,
                            decl_end: at,
                            end: at,
                            terminator: Terminator::Brace,
                        });
                    }
                }
                Step::Byte(b'}') if depth == 0 => return Err(FixtureError::UnexpectedClose(at)),
                Step::Byte(b'=') if depth == 0 => match self.peek() {
                    Some(b'>') => {
                        self.pos += 1;
                        if decl_end.is_none() {
                            return Ok(Header {
                                start,
                                decl_end: at,
                                end: at,
                                terminator: Terminator::Arrow,
                            });
                        }
                    }
                    Some(b'=') => self.pos += 1,
                    _ => {
                        let comparison = at > 0 && matches!(self.bytes[at - 1], b'!' | b'<' | b'>' | b'=');
                        if !comparison && decl_end.is_none() {
                            decl_end = Some(at);
                        }
                    }
                },
                Step::Byte(_) => {}
            }
        }
    }

    fn items(&mut self, parent: Option<NodeId>, namespace: Option<String>, braced: bool) -> Result<(), FixtureError> {
        let text = self.text;
        let mut namespace = namespace;
        loop {
            let trivia = self.leading_trivia()?;
            match self.peek() {
                None if braced => return Err(FixtureError::Unterminated(self.pos)),
                None => return Ok(()),
                Some(b'}') if braced => return Ok(()),
                Some(b'}') => return Err(FixtureError::UnexpectedClose(self.pos)),
                Some(_) => {}
            }

            let start = trivia.start.unwrap_or_else(|| self.line_start(self.pos));
            let header = self.header()?;
            let decl = text[header.start..header.decl_end].trim();
            let words: Vec<&str> = split_words(decl_head(decl))
                .into_iter()
                .skip_while(|w| *w == "global")
                .collect();

            if parent.is_none() && words.first() == Some(&"using") && header.terminator == Terminator::Semicolon {
                self.import(start, &text[header.start..header.end])?;
                continue;
            }

            if let Some(i) = words.iter().position(|w| *w == "namespace") {
                let name = words.get(i + 1).copied().unwrap_or_default();
                let full = match &namespace {
                    Some(outer) => format!("{outer}.{name}"),
                    None => name.to_string(),
                };
                if header.terminator == Terminator::Brace {
                    self.items(parent, Some(full), true)?;
                    self.pos += 1;
                } else {
                    namespace = Some(full);
                }
                continue;
            }

            let container = words
                .iter()
                .enumerate()
                .find_map(|(i, w)| container_keyword(w).map(|kind| (kind, words.get(i + 1).copied())));
            match (container, header.terminator) {
                (Some((kind, Some(name))), Terminator::Brace) => {
                    self.container(parent, namespace.as_deref(), start, trivia, kind, type_name(name))?;
                }
                _ => self.member(parent, start, trivia, decl, header)?,
            }
        }
    }

    fn import(&mut self, start: usize, statement: &str) -> Result<(), FixtureError> {
        let body = statement.trim();
        let body = body.strip_prefix("global").map_or(body, str::trim_start);
        let body = body.strip_prefix("using").map_or(body, str::trim_start);
        let body = body.strip_prefix("static ").map_or(body, str::trim_start);
        let (alias, namespace) = match body.split_once('=') {
            Some((alias, ns)) => (Some(alias.trim().to_string()), ns.trim()),
            None => (None, body.trim()),
        };
        let end = self.line_end(self.pos);
        self.pos = end;
        self.builder.add_import(namespace, alias, Span::new(start, end))?;
        Ok(())
    }

    fn container(
        &mut self,
        parent: Option<NodeId>,
        namespace: Option<&str>,
        start: usize,
        trivia: Trivia,
        kind: ContainerKind,
        name: &str,
    ) -> Result<(), FixtureError> {
        let body_start = self.pos;
        let mut node = Node::new(
            NodeKind::Container(kind),
            name,
            Span::new(start, body_start),
            self.builder.local_origin(),
        );
        node.namespace = namespace.map(str::to_string);
        node.attributes = trivia.attributes;
        node.has_documentation = trivia.docs;
        let id = self.builder.add_node(parent, node)?;

        let body_end = if kind == ContainerKind::Enum {
            self.close(body_start - 1, b'{', b'}')?
        } else {
            self.items(Some(id), namespace.map(str::to_string), true)?;
            self.pos
        };
        self.pos = body_end + 1;
        let end = self.line_end(self.pos);
        self.pos = end;

        if let Some(node) = self.builder.node_mut(id) {
            node.span = Span::new(start, end);
            node.body = Some(Span::new(body_start, body_end));
        }
        Ok(())
    }

    fn property_initializer(&mut self) -> Result<(), FixtureError> {
        let resume = self.pos;
        self.skip_ws();
        if self.peek() == Some(b'=') && self.bytes.get(self.pos + 1) != Some(&b'=') {
            self.pos += 1;
            self.skip_to_semicolon()
        } else {
            self.pos = resume;
            Ok(())
        }
    }

    fn member(
        &mut self,
        parent: Option<NodeId>,
        start: usize,
        trivia: Trivia,
        decl: &str,
        header: Header,
    ) -> Result<(), FixtureError> {
        let head = decl_head(decl);
        let callable = head.len() < decl.len();
        let all_words = split_words(head);
        let is_event = all_words.contains(&"event");
        let words: Vec<&str> = all_words.into_iter().filter(|w| !MODIFIERS.contains(w)).collect();

        match header.terminator {
            Terminator::Brace => {
                self.close(header.end, b'{', b'}')?;
                if !callable {
                    self.property_initializer()?;
                }
            }
            Terminator::Arrow => self.skip_to_semicolon()?,
            Terminator::Semicolon => {}
        }
        let end = self.line_end(self.pos);
        self.pos = end;

        let Some((last, rest)) = words.split_last() else {
            return Err(FixtureError::Unrecognized(decl.to_string()));
        };
        let origin = self.builder.local_origin();
        let span = Span::new(start, end);

        let mut node = if callable {
            let (name, generics) = split_generic_name(last);
            let generic_names: Vec<String> = generics.iter().map(|g| g.name.clone()).collect();
            let (category, return_type) = if rest.is_empty() {
                (MemberCategory::Constructors, TypeRef::void())
            } else {
                (MemberCategory::Methods, parse_type(&rest.join(" "), &generic_names))
            };
            let params = decl[head.len()..]
                .strip_prefix('(')
                .and_then(|p| matching_paren(p).map(|close| &p[..close]))
                .unwrap_or_default();
            let parameters = split_top_level(params, ',')
                .into_iter()
                .filter_map(|p| parse_parameter(p, &generic_names))
                .collect();

            let mut node = Node::new(NodeKind::Member(category), name, span, origin);
            node.signature = Some(Signature {
                generic_parameters: generics,
                parameters,
                return_type,
            });
            node
        } else {
            let category = if is_event {
                MemberCategory::Events
            } else if header.terminator == Terminator::Semicolon {
                MemberCategory::Fields
            } else {
                MemberCategory::Properties
            };
            let name = last.trim_end_matches([',', ';']);
            let mut node = Node::new(NodeKind::Member(category), name, span, origin);
            if !rest.is_empty() {
                node.type_ref = Some(parse_type(&rest.join(" "), &[]));
            }
            node
        };
        node.attributes = trivia.attributes;
        node.has_documentation = trivia.docs;
        self.builder.add_node(parent, node)?;
        Ok(())
    }
}

fn container_keyword(word: &str) -> Option<ContainerKind> {
    match word {
        "class" => Some(ContainerKind::Class),
        "interface" => Some(ContainerKind::Interface),
        "struct" => Some(ContainerKind::Structure),
        "enum" => Some(ContainerKind::Enum),
        _ => None,
    }
}

/// Declared type name without generic parameters or base list
fn type_name(word: &str) -> &str {
    word.find(['<', ':', '(']).map_or(word, |i| &word[..i])
}

/// Declaration text before its parameter list
fn decl_head(decl: &str) -> &str {
    decl.find('(').map_or(decl, |i| &decl[..i])
}

fn matching_paren(s: &str) -> Option<usize> {
    let mut depth = 1usize;
    let mut in_string = false;
    for (i, c) in s.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '(' if !in_string => depth += 1,
            ')' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Whitespace-separated words, keeping generic argument lists together
fn split_words(s: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0i32;
    let mut word_start: Option<usize> = None;
    for (i, c) in s.char_indices() {
        match c {
            '<' | '(' | '[' => depth += 1,
            '>' | ')' | ']' => depth -= 1,
            _ => {}
        }
        if c.is_whitespace() && depth <= 0 {
            if let Some(ws) = word_start.take() {
                out.push(&s[ws..i]);
            }
        } else if word_start.is_none() {
            word_start = Some(i);
        }
    }
    if let Some(ws) = word_start {
        out.push(&s[ws..]);
    }
    out
}

/// Split on `sep` outside brackets and string literals; parts are trimmed
fn split_top_level(s: &str, sep: char) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0i32;
    let mut in_string = false;
    let mut from = 0;
    for (i, c) in s.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '<' | '(' | '[' | '{' if !in_string => depth += 1,
            '>' | ')' | ']' | '}' if !in_string => depth -= 1,
            c if c == sep && depth == 0 && !in_string => {
                out.push(s[from..i].trim());
                from = i + c.len_utf8();
            }
            _ => {}
        }
    }
    let last = s[from..].trim();
    if !last.is_empty() || !out.is_empty() {
        out.push(last);
    }
    out
}

fn split_generic_name(word: &str) -> (&str, Vec<GenericParameter>) {
    match (word.find('<'), word.strip_suffix('>')) {
        (Some(i), Some(inner)) => (
            &word[..i],
            split_top_level(&inner[i + 1..], ',')
                .into_iter()
                .filter(|g| !g.is_empty())
                .map(GenericParameter::new)
                .collect(),
        ),
        _ => (word, Vec::new()),
    }
}

const KEYWORD_TYPES: &[&str] = &[
    "bool", "byte", "sbyte", "char", "decimal", "double", "float", "int", "uint", "nint", "nuint", "long", "ulong",
    "short", "ushort", "object", "string", "dynamic", "void",
];

/// Parse type text such as `Dictionary<string, List<Order>>?`
fn parse_type(text: &str, generics: &[String]) -> TypeRef {
    let mut s = text.trim();
    let mut array_rank = 0u8;
    while let Some(rest) = s.strip_suffix(']') {
        let Some(open) = rest.rfind('[') else { break };
        s = rest[..open].trim_end();
        array_rank = array_rank.saturating_add(1);
    }
    let nullable = match s.strip_suffix('?') {
        Some(rest) => {
            s = rest;
            true
        }
        None => false,
    };

    let (base, args) = match (s.find('<'), s.strip_suffix('>')) {
        (Some(i), Some(inner)) => (
            &s[..i],
            split_top_level(&inner[i + 1..], ',')
                .into_iter()
                .map(|a| parse_type(a, generics))
                .collect(),
        ),
        _ => (s, Vec::new()),
    };
    let base = base.trim();
    let base = base.strip_prefix("global::").unwrap_or(base);
    let (namespace, name) = match base.rfind('.') {
        Some(i) => (Some(base[..i].to_string()), &base[i + 1..]),
        None => (None, base),
    };

    let mut ty = if namespace.is_none() && generics.iter().any(|g| g == name) {
        TypeRef::generic_parameter(name)
    } else if namespace.is_none() && KEYWORD_TYPES.contains(&name) {
        TypeRef::keyword(name)
    } else {
        TypeRef {
            name: name.to_string(),
            namespace,
            args: Vec::new(),
            kind: TypeKind::Reference,
            nullable: false,
            array_rank: 0,
            awaitable: matches!(name, "Task" | "ValueTask"),
        }
    };
    ty.args = args;
    ty.nullable = nullable;
    ty.array_rank = array_rank;
    ty
}

fn parse_parameter(text: &str, generics: &[String]) -> Option<Parameter> {
    let mut s = text.trim();
    while s.starts_with('[') {
        let close = s.find(']')?;
        s = s[close + 1..].trim_start();
    }
    let (decl, default) = match s.split_once('=') {
        Some((decl, value)) => (decl.trim(), Some(value.trim().to_string())),
        None => (s, None),
    };

    let mut words = split_words(decl);
    let mut modifier = ParameterModifier::None;
    while let Some(first) = words.first() {
        match *first {
            "ref" => modifier = ParameterModifier::Ref,
            "out" => modifier = ParameterModifier::Out,
            "in" => modifier = ParameterModifier::In,
            "params" => modifier = ParameterModifier::Params,
            "this" | "scoped" => {}
            _ => break,
        }
        words.remove(0);
    }

    let (name, ty) = words.split_last()?;
    let mut parameter = Parameter::new(*name, parse_type(&ty.join(" "), generics)).with_modifier(modifier);
    parameter.default_value = default;
    Some(parameter)
}

fn parse_attributes(inner: &str) -> Vec<Attribute> {
    let inner = match inner.split_once(':') {
        Some((target, rest)) if target.trim().chars().all(char::is_alphanumeric) => rest,
        _ => inner,
    };
    split_top_level(inner, ',')
        .into_iter()
        .filter(|part| !part.is_empty())
        .map(|part| {
            let (name, arguments) = match part.find('(') {
                Some(i) => (
                    &part[..i],
                    part[i + 1..]
                        .strip_suffix(')')
                        .map(|args| split_top_level(args, ','))
                        .unwrap_or_default(),
                ),
                None => (part, Vec::new()),
            };
            Attribute {
                type_ref: parse_type(name, &[]),
                arguments: arguments
                    .into_iter()
                    .filter(|a| !a.is_empty())
                    .map(str::to_string)
                    .collect(),
            }
        })
        .collect()
}
