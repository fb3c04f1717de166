//! Rendering of raw API type strings as TypeScript type expressions.
//!
//! Raw strings use the documentation dialect of the API descriptions
//! (`int`, `object`, `function(...)`, `Array<T>`, `A|B`, dotted symbol names).
//! They are parsed into a small expression tree and mapped name by name.
//! Dotted names, and bare names of top-level aggregates, resolve through the
//! merged symbol table; anything that does not resolve is emitted as `any`
//! and reported.

use std::collections::HashSet;

use indexmap::IndexMap;

use super::{WarningKind, WarningSink};
use crate::ast::{ParamType, Parameter, SimpleType, Type};
use crate::directives::Directives;
use crate::symbols::{Symbol, SymbolKind, SymbolTable};
use crate::transform::library_fixes::MODULE_NAMES_INTERFACE;

/// Bare names that exist in the target environment without an import.
const KNOWN_GLOBALS: &[&str] = &[
    "ArrayBuffer",
    "Blob",
    "CSSStyleDeclaration",
    "DOMRect",
    "Date",
    "Document",
    "Element",
    "Error",
    "Event",
    "File",
    "HTMLElement",
    "HTMLInputElement",
    "Iterable",
    "KeyboardEvent",
    "Map",
    "MessageEvent",
    "MouseEvent",
    "Node",
    "Partial",
    "Record",
    "RegExp",
    "Request",
    "Response",
    "Set",
    "Storage",
    "TouchEvent",
    "Uint8Array",
    "WeakMap",
    "Window",
    "Worker",
    "XMLHttpRequest",
    MODULE_NAMES_INTERFACE,
];

/// How a resolved symbol is spelled at the point of use.
#[derive(Debug)]
pub(crate) enum RefScope {
    /// Fully-qualified dotted name, for the global-namespace flavor.
    Global,
    /// Inline `import("a/b").X` type, for script-level declarations.
    Inline,
    /// Inside a `declare module` block; records the imports it needs.
    Module(ModuleImports),
}

impl RefScope {
    pub(crate) fn reference(&mut self, symbol: &Symbol) -> String {
        let owner = symbol.owner();
        match self {
            RefScope::Global => symbol.fqn.clone(),
            RefScope::Inline if owner.is_empty() => symbol.name.clone(),
            RefScope::Inline => format!("import(\"{}\").{}", module_path(owner), symbol.name),
            RefScope::Module(imports) => imports.reference(owner, &symbol.name, &symbol.fqn),
        }
    }
}

/// Module path of a namespace FQN: `sap.ui.core` becomes `sap/ui/core`.
pub fn module_path(fqn: &str) -> String {
    fqn.replace('.', "/")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Import {
    pub path: String,
    pub name: String,
    pub local: String,
}

/// Imports needed by one `declare module` block.
#[derive(Debug, Default)]
pub(crate) struct ModuleImports {
    module: String,
    locals: HashSet<String>,
    imports: IndexMap<String, Import>,
}

impl ModuleImports {
    /// `module` is the namespace FQN of the block, `locals` the names it
    /// declares itself.
    pub(crate) fn new(module: &str, locals: impl IntoIterator<Item = String>) -> Self {
        Self {
            module: module.to_string(),
            locals: locals.into_iter().collect(),
            imports: IndexMap::new(),
        }
    }

    fn reference(&mut self, owner: &str, name: &str, fqn: &str) -> String {
        if owner.is_empty() || owner == self.module {
            return name.to_string();
        }
        if let Some(import) = self.imports.get(fqn) {
            return import.local.clone();
        }
        let taken = self.locals.contains(name) || self.imports.values().any(|i| i.local == name);
        let local = if taken {
            format!("{}_{}", owner.replace('.', "_"), name)
        } else {
            name.to_string()
        };
        self.imports.insert(
            fqn.to_string(),
            Import {
                path: module_path(owner),
                name: name.to_string(),
                local: local.clone(),
            },
        );
        local
    }

    pub(crate) fn imports(&self) -> impl Iterator<Item = &Import> {
        self.imports.values()
    }

    pub(crate) fn lines(&self) -> Vec<String> {
        self.imports()
            .map(|i| {
                if i.local == i.name {
                    format!("import {{ {} }} from \"{}\";", i.name, i.path)
                } else {
                    format!("import {{ {} as {} }} from \"{}\";", i.name, i.local, i.path)
                }
            })
            .collect()
    }
}

/// Renders types for one library against its merged symbol table.
pub(crate) struct TypeRenderer<'a> {
    pub library: &'a str,
    pub symbols: &'a SymbolTable,
    pub directives: &'a Directives,
    /// Aggregate FQNs of this library that are actually emitted.
    pub emitted: &'a HashSet<String>,
    /// Namespace FQNs of this library emitted as interfaces.
    pub interface_namespaces: &'a HashSet<String>,
}

impl<'a> TypeRenderer<'a> {
    /// Look up a symbol that may be referenced from the output.
    pub(crate) fn resolve(&self, fqn: &str) -> Result<&'a Symbol, &'static str> {
        let symbol = self.symbols.get(fqn).ok_or("is not defined")?;
        if self.directives.is_bad_symbol(fqn) {
            return Err("is excluded");
        }
        if symbol.library == self.library && !self.emitted.contains(fqn) {
            return Err("is not emitted");
        }
        if symbol.kind == SymbolKind::Namespace
            && !self.interface_namespaces.contains(fqn)
            && !self.directives.reclassifies_namespace(fqn)
        {
            return Err("is a namespace");
        }
        Ok(symbol)
    }

    /// `None` renders as `any`.
    pub(crate) fn render(
        &self,
        ty: Option<&Type>,
        refs: &mut RefScope,
        sink: &mut WarningSink,
    ) -> String {
        match ty {
            Some(ty) => self.render_type(ty, refs, sink),
            None => "any".to_string(),
        }
    }

    pub(crate) fn render_type(
        &self,
        ty: &Type,
        refs: &mut RefScope,
        sink: &mut WarningSink,
    ) -> String {
        match ty {
            Type::SimpleType(simple) => self.render_simple(simple, refs, sink),
            Type::UnionType(union) => {
                let mut members: Vec<String> = Vec::new();
                for member in &union.types {
                    let rendered = self.render_simple(member, refs, sink);
                    if !members.contains(&rendered) {
                        members.push(rendered);
                    }
                }
                if members.is_empty() {
                    "any".to_string()
                } else {
                    members.join(" | ")
                }
            }
        }
    }

    pub(crate) fn render_simple(
        &self,
        ty: &SimpleType,
        refs: &mut RefScope,
        sink: &mut WarningSink,
    ) -> String {
        let raw = self.directives.correct(ty);
        // Names inside the expression are corrected only when the whole
        // string was not.
        let per_name = !ty.skip_correction && raw == ty.name;
        self.render_raw(raw, per_name, refs, sink)
    }

    pub(crate) fn render_param(
        &self,
        ty: Option<&ParamType>,
        refs: &mut RefScope,
        sink: &mut WarningSink,
    ) -> String {
        match ty {
            None => "any".to_string(),
            Some(ParamType::Type(ty)) => self.render_type(ty, refs, sink),
            Some(ParamType::Shape(shape)) => self.render_shape(shape, refs, sink),
        }
    }

    fn render_shape(
        &self,
        shape: &IndexMap<String, Parameter>,
        refs: &mut RefScope,
        sink: &mut WarningSink,
    ) -> String {
        if shape.is_empty() {
            return "object".to_string();
        }
        let fields: Vec<String> = shape
            .iter()
            .map(|(key, param)| {
                let optional = if param.optional || param.default_value.is_some() {
                    "?"
                } else {
                    ""
                };
                let ty = self.render_param(param.ty.as_ref(), refs, sink);
                format!("{}{optional}: {ty};", property_name(key))
            })
            .collect();
        format!("{{ {} }}", fields.join(" "))
    }

    fn render_raw(
        &self,
        raw: &str,
        correct: bool,
        refs: &mut RefScope,
        sink: &mut WarningSink,
    ) -> String {
        match parse(raw) {
            Some(expr) => self.render_expr(&expr, correct, refs, sink),
            None => {
                sink.push(
                    WarningKind::Simplified,
                    format!("type `{raw}` could not be parsed; emitted as any"),
                );
                "any".to_string()
            }
        }
    }

    fn render_expr(
        &self,
        expr: &Expr,
        correct: bool,
        refs: &mut RefScope,
        sink: &mut WarningSink,
    ) -> String {
        match expr {
            Expr::Literal(lit) => lit.clone(),
            Expr::Function => "Function".to_string(),
            Expr::Keyof(inner) => format!("keyof {}", self.render_expr(inner, correct, refs, sink)),
            Expr::Array(inner) => array_of(&self.render_expr(inner, correct, refs, sink)),
            Expr::Union(members) => {
                let mut out: Vec<String> = Vec::new();
                for member in members {
                    let rendered = self.render_expr(member, correct, refs, sink);
                    if !out.contains(&rendered) {
                        out.push(rendered);
                    }
                }
                out.join(" | ")
            }
            Expr::Name { name, args } => self.render_name(name, args, correct, refs, sink),
        }
    }

    fn render_name(
        &self,
        name: &str,
        args: &[Expr],
        correct: bool,
        refs: &mut RefScope,
        sink: &mut WarningSink,
    ) -> String {
        if correct {
            if let Some(fixed) = self.directives.type_typos_map.get(name) {
                return if args.is_empty() {
                    self.render_raw(fixed, false, refs, sink)
                } else {
                    self.render_name(fixed, args, false, refs, sink)
                };
            }
        }

        let args: Vec<String> = args
            .iter()
            .map(|a| self.render_expr(a, correct, refs, sink))
            .collect();
        match name {
            "string" | "String" => "string".to_string(),
            "number" | "Number" | "int" | "integer" | "float" | "double" => "number".to_string(),
            "boolean" | "Boolean" | "bool" => "boolean".to_string(),
            "any" | "*" => "any".to_string(),
            "void" | "undefined" | "null" | "never" | "unknown" | "this" | "symbol" | "bigint"
            | "object" => name.to_string(),
            "function" | "Function" => "Function".to_string(),
            "map" => "Record<string, any>".to_string(),
            "Object" => match args.as_slice() {
                [] => "Record<string, any>".to_string(),
                [value] => format!("Record<string, {value}>"),
                [key, value, ..] => format!("Record<{key}, {value}>"),
            },
            "array" | "Array" => match args.first() {
                Some(inner) => array_of(inner),
                None => "any[]".to_string(),
            },
            "Promise" => format!(
                "Promise<{}>",
                args.first().map(String::as_str).unwrap_or("any")
            ),
            "DomRef" => "Element".to_string(),
            _ if name.contains('.') || self.symbols.contains(name) => match self.resolve(name) {
                Ok(symbol) => with_args(&refs.reference(symbol), &args),
                Err(reason) => {
                    sink.push(
                        WarningKind::UnresolvedType,
                        format!("type `{name}` {reason}; emitted as any"),
                    );
                    "any".to_string()
                }
            },
            _ if KNOWN_GLOBALS.contains(&name) => with_args(name, &args),
            _ => {
                sink.push(
                    WarningKind::UnresolvedType,
                    format!("type `{name}` is unknown; emitted as any"),
                );
                "any".to_string()
            }
        }
    }
}

fn array_of(inner: &str) -> String {
    if inner.contains(" | ") || inner.starts_with("keyof ") {
        format!("({inner})[]")
    } else {
        format!("{inner}[]")
    }
}

fn with_args(name: &str, args: &[String]) -> String {
    if args.is_empty() {
        name.to_string()
    } else {
        format!("{name}<{}>", args.join(", "))
    }
}

/// Whether `name` can be written without quotes as a property or member name.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' || first == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// A property name, quoted when it is not a plain identifier.
pub fn property_name(name: &str) -> String {
    if is_identifier(name) {
        name.to_string()
    } else {
        string_literal(name)
    }
}

/// A double-quoted string literal.
pub fn string_literal(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Name { name: String, args: Vec<Expr> },
    Array(Box<Expr>),
    Union(Vec<Expr>),
    Keyof(Box<Expr>),
    Literal(String),
    Function,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Name(String),
    Literal(String),
    Punct(char),
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '$' | '.' | '*')
}

fn tokenize(raw: &str) -> Option<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = raw.chars().peekable();
    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if is_name_char(c) {
            let mut name = String::new();
            while let Some(&c) = chars.peek() {
                if !is_name_char(c) {
                    break;
                }
                name.push(c);
                chars.next();
            }
            tokens.push(Token::Name(name));
        } else if c == '"' || c == '\'' {
            chars.next();
            let mut lit = String::new();
            loop {
                match chars.next() {
                    Some(q) if q == c => break,
                    Some(ch) => lit.push(ch),
                    None => return None,
                }
            }
            tokens.push(Token::Literal(format!("\"{lit}\"")));
        } else if "<>,|[]():".contains(c) {
            tokens.push(Token::Punct(c));
            chars.next();
        } else {
            return None;
        }
    }
    Some(tokens)
}

fn parse(raw: &str) -> Option<Expr> {
    let tokens = tokenize(raw)?;
    if tokens.is_empty() {
        return None;
    }
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.union()?;
    (parser.pos == parser.tokens.len()).then_some(expr)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(&Token::Punct(c)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn union(&mut self) -> Option<Expr> {
        let mut members = vec![self.postfix()?];
        while self.eat('|') {
            members.push(self.postfix()?);
        }
        if members.len() == 1 {
            members.pop()
        } else {
            Some(Expr::Union(members))
        }
    }

    fn postfix(&mut self) -> Option<Expr> {
        let mut expr = self.primary()?;
        while self.eat('[') {
            if !self.eat(']') {
                return None;
            }
            expr = Expr::Array(Box::new(expr));
        }
        Some(expr)
    }

    fn primary(&mut self) -> Option<Expr> {
        if self.eat('(') {
            let inner = self.union()?;
            return self.eat(')').then_some(inner);
        }
        let token = self.peek()?.clone();
        self.pos += 1;
        match token {
            Token::Literal(lit) => Some(Expr::Literal(lit)),
            Token::Punct(_) => None,
            Token::Name(name) if name == "keyof" => Some(Expr::Keyof(Box::new(self.primary()?))),
            Token::Name(name) if name == "function" && self.peek() == Some(&Token::Punct('(')) => {
                self.skip_group()?;
                if self.eat(':') {
                    self.postfix()?;
                }
                Some(Expr::Function)
            }
            Token::Name(name) => {
                let mut args = Vec::new();
                if self.eat('<') {
                    loop {
                        args.push(self.union()?);
                        if self.eat(',') {
                            continue;
                        }
                        if self.eat('>') {
                            break;
                        }
                        return None;
                    }
                }
                Some(Expr::Name { name, args })
            }
        }
    }

    /// Skip a balanced parenthesized group starting at the current `(`.
    fn skip_group(&mut self) -> Option<()> {
        let mut depth = 0usize;
        loop {
            match self.peek()? {
                Token::Punct('(') => depth += 1,
                Token::Punct(')') => depth -= 1,
                _ => {}
            }
            self.pos += 1;
            if depth == 0 {
                return Some(());
            }
        }
    }
}
