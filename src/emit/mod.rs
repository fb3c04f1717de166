//! Declaration emitter.
//!
//! Turns one library's transformed AST into TypeScript declaration text.
//! Exclusion directives, typo correction, namespace reclassification and
//! compiler-suppression comments are all applied here, at emission time; the
//! AST itself is never rewritten by them.
//!
//! Two flavors share the same structure and differ only in how declarations
//! are grouped and how cross-references are spelled:
//!
//! - [`Flavor::Modules`]: one `declare module "a/b"` block per namespace, with
//!   `import { X } from "c/d";` lines for references into other modules.
//! - [`Flavor::Globals`]: nested `declare namespace` blocks, references by
//!   fully-qualified name.

pub(crate) mod docs;
pub(crate) mod types;

use std::collections::HashSet;
use std::fmt;

use indexmap::IndexSet;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::ast::{
    Class, Enum, FunctionDesc, Interface, Link, Namespace, Parameter, Type, Variable,
};
use crate::directives::Directives;
use crate::error::EmitError;
use crate::fqn::ParentLinks;
use crate::symbols::SymbolTable;
use crate::transform::library_fixes::MODULE_NAMES_INTERFACE;
use crate::transform::TransformedAst;
use docs::DocBlock;
use types::{
    is_identifier, module_path, property_name, string_literal, ModuleImports, RefScope,
    TypeRenderer,
};

const INDENT: &str = "    ";

/// Output flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flavor {
    /// Import-based module declarations.
    Modules,
    /// A single global namespace tree, no imports.
    Globals,
}

impl Flavor {
    pub const ALL: [Flavor; 2] = [Flavor::Modules, Flavor::Globals];

    /// File name suffix of the declaration file for this flavor.
    pub fn file_suffix(self) -> &'static str {
        match self {
            Flavor::Modules => "d.ts",
            Flavor::Globals => "globals.d.ts",
        }
    }
}

impl fmt::Display for Flavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Flavor::Modules => write!(f, "modules"),
            Flavor::Globals => write!(f, "globals"),
        }
    }
}

/// Warnings generated during emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub message: String,
    pub kind: WarningKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarningKind {
    /// A type reference that does not resolve to an emitted symbol.
    UnresolvedType,
    /// A symbol or member left out by a directive.
    Excluded,
    /// A namespace emitted as an interface.
    Reclassified,
    /// A type expression that could not be mapped faithfully.
    Simplified,
}

/// Collects warnings, dropping exact repeats.
#[derive(Debug, Default)]
pub struct WarningSink {
    warnings: Vec<Warning>,
    seen: HashSet<(WarningKind, String)>,
}

impl WarningSink {
    pub fn push(&mut self, kind: WarningKind, message: impl Into<String>) {
        let message = message.into();
        if !self.seen.insert((kind, message.clone())) {
            return;
        }
        match kind {
            WarningKind::UnresolvedType | WarningKind::Simplified => warn!("{message}"),
            WarningKind::Excluded | WarningKind::Reclassified => debug!("{message}"),
        }
        self.warnings.push(Warning { message, kind });
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Warning> {
        self.warnings.iter()
    }

    pub fn into_vec(self) -> Vec<Warning> {
        self.warnings
    }
}

/// Declaration text for one library in one flavor.
#[derive(Debug, Clone)]
pub struct Declarations {
    pub library: String,
    pub flavor: Flavor,
    pub text: String,
    /// Module paths registered with the loader, e.g. `sap/m`.
    pub modules: Vec<String>,
    pub warnings: Vec<Warning>,
}

/// Emit declarations for a transformed library.
///
/// `symbols` is the primary table merged with the dependency tables, and
/// `directives` the merged directive set.
pub fn emit(
    ast: &TransformedAst,
    symbols: &SymbolTable,
    directives: &Directives,
    flavor: Flavor,
) -> Result<Declarations, EmitError> {
    let mut sink = WarningSink::default();
    let plan = Plan::build(ast, directives, &mut sink)?;
    let mut emitter = Emitter {
        ast,
        directives,
        plan: &plan,
        types: TypeRenderer {
            library: &ast.library,
            symbols,
            directives,
            emitted: &plan.emitted,
            interface_namespaces: &plan.interfaces,
        },
        out: String::new(),
        indent: 0,
        refs: RefScope::Global,
        sink,
    };

    match flavor {
        Flavor::Modules => emitter.emit_modules()?,
        Flavor::Globals => emitter.emit_globals()?,
    }
    emitter.emit_registry();

    let modules: Vec<String> = plan.modules.iter().map(|m| module_path(m)).collect();
    debug!(
        library = %ast.library,
        %flavor,
        modules = modules.len(),
        warnings = emitter.sink.len(),
        "emitted declarations"
    );
    Ok(Declarations {
        library: ast.library.clone(),
        flavor,
        text: emitter.out,
        modules,
        warnings: emitter.sink.into_vec(),
    })
}

fn fqn_of(links: &ParentLinks, link: Link, name: &str) -> Result<String, EmitError> {
    let id = link.id.ok_or_else(|| EmitError::Unlinked {
        name: if name.is_empty() {
            "<top-level namespace>".to_string()
        } else {
            name.to_string()
        },
    })?;
    links.fqn(id)
}

/// What gets emitted, decided before any text is written so that type
/// references can be checked against it.
#[derive(Debug, Default)]
struct Plan {
    /// Namespaces, classes, interfaces and enums that are emitted.
    emitted: HashSet<String>,
    /// Namespaces emitted as interfaces.
    interfaces: HashSet<String>,
    /// Namespaces that get their own module, in tree order.
    modules: IndexSet<String>,
}

impl Plan {
    fn build(
        ast: &TransformedAst,
        directives: &Directives,
        sink: &mut WarningSink,
    ) -> Result<Self, EmitError> {
        let mut plan = Plan::default();
        plan.visit(&ast.root.top_level_namespace, &ast.links, directives, sink)?;
        Ok(plan)
    }

    fn visit(
        &mut self,
        ns: &Namespace,
        links: &ParentLinks,
        directives: &Directives,
        sink: &mut WarningSink,
    ) -> Result<(), EmitError> {
        let fqn = fqn_of(links, ns.link, &ns.name)?;
        let top = fqn.is_empty();
        if !top && directives.is_bad_symbol(&fqn) {
            sink.push(WarningKind::Excluded, format!("namespace `{fqn}` excluded"));
            return Ok(());
        }
        self.emitted.insert(fqn.clone());

        let as_interface = !top && is_interface_namespace(ns, &fqn, directives);
        if as_interface {
            let why = if ns.is_empty() { "it is empty" } else { "configured" };
            sink.push(
                WarningKind::Reclassified,
                format!("namespace `{fqn}` emitted as an interface ({why})"),
            );
            self.interfaces.insert(fqn.clone());
        }

        let mut has_module =
            !as_interface && (!ns.variables.is_empty() || !ns.functions.is_empty());
        let aggregates = ns
            .classes
            .iter()
            .map(|c| (c.link, &c.name))
            .chain(ns.interfaces.iter().map(|i| (i.link, &i.name)))
            .chain(ns.enums.iter().map(|e| (e.link, &e.name)));
        for (link, name) in aggregates {
            let member = fqn_of(links, link, name)?;
            if directives.is_bad_symbol(&member) {
                sink.push(WarningKind::Excluded, format!("`{member}` excluded"));
            } else {
                self.emitted.insert(member);
                has_module = true;
            }
        }
        for child in &ns.namespaces {
            let child_fqn = fqn_of(links, child.link, &child.name)?;
            if !directives.is_bad_symbol(&child_fqn)
                && is_interface_namespace(child, &child_fqn, directives)
            {
                has_module = true;
            }
        }
        if has_module && !top {
            self.modules.insert(fqn);
        }

        for child in &ns.namespaces {
            self.visit(child, links, directives, sink)?;
        }
        Ok(())
    }
}

fn is_interface_namespace(ns: &Namespace, fqn: &str, directives: &Directives) -> bool {
    directives.reclassifies_namespace(fqn) || ns.is_empty()
}

struct Emitter<'a> {
    ast: &'a TransformedAst,
    directives: &'a Directives,
    plan: &'a Plan,
    types: TypeRenderer<'a>,
    out: String,
    indent: usize,
    refs: RefScope,
    sink: WarningSink,
}

impl<'a> Emitter<'a> {
    fn line(&mut self, text: &str) {
        if !text.is_empty() {
            for _ in 0..self.indent {
                self.out.push_str(INDENT);
            }
            self.out.push_str(text);
        }
        self.out.push('\n');
    }

    fn fqn(&self, link: Link, name: &str) -> Result<String, EmitError> {
        fqn_of(&self.ast.links, link, name)
    }

    /// JSDoc, then the suppression comment, directly above a declaration.
    fn preamble(&mut self, doc: DocBlock, fqn: &str) {
        for line in doc.lines() {
            self.line(&line);
        }
        let directives = self.directives;
        if let Some(reason) = directives.ignore_reason(fqn) {
            self.line(&format!("// @ts-ignore: {reason}"));
        }
    }

    fn render(&mut self, ty: Option<&Type>) -> String {
        self.types.render(ty, &mut self.refs, &mut self.sink)
    }

    fn raw_type_name(&self, ty: &Type) -> String {
        match ty {
            Type::SimpleType(t) => self.directives.correct(t).to_string(),
            Type::UnionType(u) => u
                .types
                .iter()
                .map(|t| self.directives.correct(t))
                .collect::<Vec<_>>()
                .join("|"),
        }
    }

    fn function_doc(&self, func: &FunctionDesc) -> DocBlock {
        DocBlock::for_function(func, |ty| self.raw_type_name(ty))
    }

    /// A reference to a supertype, or `None` when it cannot be emitted.
    fn supertype(&mut self, owner: &str, fqn: &str) -> Option<String> {
        let directives = self.directives;
        let fqn = directives
            .type_typos_map
            .get(fqn)
            .map(String::as_str)
            .unwrap_or(fqn);
        match self.types.resolve(fqn) {
            Ok(symbol) => Some(self.refs.reference(symbol)),
            Err(reason) => {
                self.sink.push(
                    WarningKind::UnresolvedType,
                    format!("supertype `{fqn}` of `{owner}` {reason}; dropped"),
                );
                None
            }
        }
    }

    /// Whether a member is left out by a directive.
    fn member_excluded(&mut self, fqn: &str, name: &str, is_method: bool) -> bool {
        if self.directives.is_bad_symbol(fqn) {
            self.sink.push(WarningKind::Excluded, format!("`{fqn}` excluded"));
            return true;
        }
        if is_method && self.directives.is_bad_method(name) {
            self.sink.push(
                WarningKind::Excluded,
                format!("method `{fqn}` excluded by name"),
            );
            return true;
        }
        false
    }

    fn signature(&mut self, func: &FunctionDesc, with_return: bool) -> String {
        let last_required = func.parameters.iter().rposition(|p| !is_optional(p));
        let mut params = Vec::with_capacity(func.parameters.len());
        for (i, param) in func.parameters.iter().enumerate() {
            let name = param_name(&param.name);
            let ty = self
                .types
                .render_param(param.ty.as_ref(), &mut self.refs, &mut self.sink);
            let rendered = match (is_optional(param), last_required) {
                (true, Some(last)) if i < last => format!("{name}: {ty} | undefined"),
                (true, _) => format!("{name}?: {ty}"),
                (false, _) => format!("{name}: {ty}"),
            };
            params.push(rendered);
        }
        let mut sig = format!("({})", params.join(", "));
        if with_return {
            let ret = match func.returns.as_ref().and_then(|r| r.ty.as_ref()) {
                Some(ty) => self.render(Some(ty)),
                None => "void".to_string(),
            };
            sig.push_str(": ");
            sig.push_str(&ret);
        }
        sig
    }

    fn emit_globals(&mut self) -> Result<(), EmitError> {
        let ast = self.ast;
        let top = &ast.root.top_level_namespace;
        self.refs = RefScope::Global;
        self.emit_values(top, "declare ")?;
        self.emit_aggregates(top, "declare ")?;
        for child in &top.namespaces {
            self.emit_global_namespace(child, true)?;
        }
        Ok(())
    }

    fn emit_global_namespace(&mut self, ns: &Namespace, top: bool) -> Result<(), EmitError> {
        let fqn = self.fqn(ns.link, &ns.name)?;
        if !self.plan.emitted.contains(&fqn) {
            return Ok(());
        }
        let prefix = if top { "declare " } else { "export " };
        let as_interface = self.plan.interfaces.contains(&fqn);
        if as_interface {
            self.emit_namespace_interface(ns, &fqn, prefix)?;
            if !ns.has_aggregates() {
                return Ok(());
            }
        } else {
            self.preamble(DocBlock::from_doc(&ns.doc), &fqn);
        }

        self.line(&format!("{prefix}namespace {} {{", ns.name));
        self.indent += 1;
        if !as_interface {
            self.emit_values(ns, "export ")?;
        }
        self.emit_aggregates(ns, "export ")?;
        for child in &ns.namespaces {
            self.emit_global_namespace(child, false)?;
        }
        self.indent -= 1;
        self.line("}");
        Ok(())
    }

    fn emit_modules(&mut self) -> Result<(), EmitError> {
        let ast = self.ast;
        let top = &ast.root.top_level_namespace;
        self.refs = RefScope::Inline;
        self.emit_values(top, "declare ")?;
        self.emit_aggregates(top, "declare ")?;
        self.emit_child_interfaces(top, "declare ")?;
        self.emit_module_tree(top)
    }

    fn emit_module_tree(&mut self, ns: &Namespace) -> Result<(), EmitError> {
        for child in &ns.namespaces {
            let fqn = self.fqn(child.link, &child.name)?;
            if !self.plan.emitted.contains(&fqn) {
                continue;
            }
            if self.plan.modules.contains(&fqn) {
                self.emit_module(child, &fqn)?;
            }
            self.emit_module_tree(child)?;
        }
        Ok(())
    }

    fn emit_module(&mut self, ns: &Namespace, fqn: &str) -> Result<(), EmitError> {
        let as_interface = self.plan.interfaces.contains(fqn);
        let locals = self.local_names(ns, as_interface)?;
        self.refs = RefScope::Module(ModuleImports::new(fqn, locals));

        let outer = std::mem::take(&mut self.out);
        let outer_indent = std::mem::replace(&mut self.indent, 1);
        if !as_interface {
            self.emit_values(ns, "export ")?;
        }
        self.emit_aggregates(ns, "export ")?;
        self.emit_child_interfaces(ns, "export ")?;
        let body = std::mem::replace(&mut self.out, outer);
        self.indent = outer_indent;

        let imports = match std::mem::replace(&mut self.refs, RefScope::Inline) {
            RefScope::Module(imports) => imports.lines(),
            _ => Vec::new(),
        };
        if !as_interface {
            self.preamble(DocBlock::from_doc(&ns.doc), fqn);
        }
        self.line(&format!("declare module \"{}\" {{", module_path(fqn)));
        self.indent += 1;
        for import in &imports {
            self.line(import);
        }
        if !imports.is_empty() {
            self.line("");
        }
        self.indent -= 1;
        self.out.push_str(&body);
        self.line("}");
        self.line("");
        Ok(())
    }

    /// Names a module block declares itself.
    fn local_names(&self, ns: &Namespace, as_interface: bool) -> Result<Vec<String>, EmitError> {
        let mut names = Vec::new();
        if !as_interface {
            names.extend(ns.variables.iter().map(|v| v.name.clone()));
            names.extend(ns.functions.iter().map(|f| f.name.clone()));
        }
        names.extend(ns.classes.iter().map(|c| c.name.clone()));
        names.extend(ns.interfaces.iter().map(|i| i.name.clone()));
        names.extend(ns.enums.iter().map(|e| e.name.clone()));
        for child in &ns.namespaces {
            if self.plan.interfaces.contains(&self.fqn(child.link, &child.name)?) {
                names.push(child.name.clone());
            }
        }
        Ok(names)
    }

    fn emit_child_interfaces(&mut self, ns: &Namespace, prefix: &str) -> Result<(), EmitError> {
        for child in &ns.namespaces {
            let fqn = self.fqn(child.link, &child.name)?;
            if self.plan.emitted.contains(&fqn) && self.plan.interfaces.contains(&fqn) {
                self.emit_namespace_interface(child, &fqn, prefix)?;
            }
        }
        Ok(())
    }

    /// A namespace written as an interface: variables become properties and
    /// functions become methods.
    fn emit_namespace_interface(
        &mut self,
        ns: &Namespace,
        fqn: &str,
        prefix: &str,
    ) -> Result<(), EmitError> {
        self.preamble(DocBlock::from_doc(&ns.doc), fqn);
        if ns.variables.is_empty() && ns.functions.is_empty() {
            self.line(&format!("{prefix}interface {} {{}}", ns.name));
            return Ok(());
        }
        self.line(&format!("{prefix}interface {} {{", ns.name));
        self.indent += 1;
        for var in &ns.variables {
            self.emit_property(var)?;
        }
        for func in &ns.functions {
            self.emit_method(func, false)?;
        }
        self.indent -= 1;
        self.line("}");
        Ok(())
    }

    fn emit_values(&mut self, ns: &Namespace, prefix: &str) -> Result<(), EmitError> {
        for var in &ns.variables {
            let fqn = self.fqn(var.link, &var.name)?;
            if self.member_excluded(&fqn, &var.name, false) || !self.declarable(&fqn, &var.name) {
                continue;
            }
            self.preamble(DocBlock::from_doc(&var.doc), &fqn);
            let ty = self.render(var.ty.as_ref());
            self.line(&format!("{prefix}const {}: {ty};", var.name));
        }
        for func in &ns.functions {
            let fqn = self.fqn(func.link, &func.name)?;
            if self.member_excluded(&fqn, &func.name, false) || !self.declarable(&fqn, &func.name) {
                continue;
            }
            self.preamble(self.function_doc(func), &fqn);
            let sig = self.signature(func, true);
            self.line(&format!("{prefix}function {}{sig};", func.name));
        }
        Ok(())
    }

    /// Whether `name` can be declared as a standalone binding.
    fn declarable(&mut self, fqn: &str, name: &str) -> bool {
        if is_identifier(name) && !is_reserved(name) {
            return true;
        }
        self.sink.push(
            WarningKind::Excluded,
            format!("`{fqn}` skipped: `{name}` is not a valid binding name"),
        );
        false
    }

    fn emit_aggregates(&mut self, ns: &Namespace, prefix: &str) -> Result<(), EmitError> {
        for class in &ns.classes {
            self.emit_class(class, prefix)?;
        }
        for iface in &ns.interfaces {
            self.emit_interface(iface, prefix)?;
        }
        for en in &ns.enums {
            self.emit_enum(en, prefix)?;
        }
        Ok(())
    }

    fn emit_class(&mut self, class: &Class, prefix: &str) -> Result<(), EmitError> {
        let fqn = self.fqn(class.link, &class.name)?;
        if !self.plan.emitted.contains(&fqn) {
            return Ok(());
        }
        self.preamble(DocBlock::from_doc(&class.doc), &fqn);

        let abstract_ = if class.is_abstract { "abstract " } else { "" };
        let mut header = format!("{prefix}{abstract_}class {}", class.name);
        if let Some(base) = &class.extends {
            if let Some(base) = self.supertype(&fqn, base) {
                header.push_str(&format!(" extends {base}"));
            }
        }
        let mut implements = Vec::new();
        for iface in &class.implements {
            if self.directives.is_bad_interface(iface) {
                self.sink.push(
                    WarningKind::Excluded,
                    format!("`{iface}` stripped from the implements list of `{fqn}`"),
                );
                continue;
            }
            if let Some(iface) = self.supertype(&fqn, iface) {
                implements.push(iface);
            }
        }
        if !implements.is_empty() {
            header.push_str(&format!(" implements {}", implements.join(", ")));
        }
        self.line(&format!("{header} {{"));
        self.indent += 1;

        for ctor in &class.constructors {
            let member = self.fqn(ctor.link, &ctor.name)?;
            if self.member_excluded(&member, &ctor.name, false) {
                continue;
            }
            self.preamble(self.function_doc(ctor), &member);
            let sig = self.signature(ctor, false);
            self.line(&format!("constructor{sig};"));
        }
        for field in &class.fields {
            self.emit_property(field)?;
        }
        for method in &class.methods {
            self.emit_method(method, true)?;
        }

        self.indent -= 1;
        self.line("}");
        Ok(())
    }

    fn emit_interface(&mut self, iface: &Interface, prefix: &str) -> Result<(), EmitError> {
        let fqn = self.fqn(iface.link, &iface.name)?;
        if !self.plan.emitted.contains(&fqn) {
            return Ok(());
        }
        self.preamble(DocBlock::from_doc(&iface.doc), &fqn);

        let mut header = format!("{prefix}interface {}", iface.name);
        let mut extends = Vec::new();
        for base in &iface.extends {
            if let Some(base) = self.supertype(&fqn, base) {
                extends.push(base);
            }
        }
        if !extends.is_empty() {
            header.push_str(&format!(" extends {}", extends.join(", ")));
        }
        self.line(&format!("{header} {{"));
        self.indent += 1;
        for prop in &iface.properties {
            self.emit_property(prop)?;
        }
        for method in &iface.methods {
            self.emit_method(method, true)?;
        }
        self.indent -= 1;
        self.line("}");
        Ok(())
    }

    fn emit_enum(&mut self, en: &Enum, prefix: &str) -> Result<(), EmitError> {
        let fqn = self.fqn(en.link, &en.name)?;
        if !self.plan.emitted.contains(&fqn) {
            return Ok(());
        }
        self.preamble(DocBlock::from_doc(&en.doc), &fqn);
        self.line(&format!("{prefix}enum {} {{", en.name));
        self.indent += 1;
        for value in &en.values {
            let member = self.fqn(value.link, &value.name)?;
            if self.member_excluded(&member, &value.name, false) {
                continue;
            }
            self.preamble(DocBlock::from_doc(&value.doc), &member);
            self.line(&format!(
                "{} = {},",
                property_name(&value.name),
                string_literal(&value.name)
            ));
        }
        self.indent -= 1;
        self.line("}");
        Ok(())
    }

    /// A field or property: `[static ]name: T;`.
    fn emit_property(&mut self, var: &Variable) -> Result<(), EmitError> {
        let fqn = self.fqn(var.link, &var.name)?;
        if self.member_excluded(&fqn, &var.name, false) {
            return Ok(());
        }
        self.preamble(DocBlock::from_doc(&var.doc), &fqn);
        let ty = self.render(var.ty.as_ref());
        let static_ = if var.is_static { "static " } else { "" };
        self.line(&format!("{static_}{}: {ty};", property_name(&var.name)));
        Ok(())
    }

    /// A method: `[static ]name(params): R;`. `by_name` enables the
    /// name-based method exclusion.
    fn emit_method(&mut self, func: &FunctionDesc, by_name: bool) -> Result<(), EmitError> {
        let fqn = self.fqn(func.link, &func.name)?;
        if self.member_excluded(&fqn, &func.name, by_name) {
            return Ok(());
        }
        self.preamble(self.function_doc(func), &fqn);
        let sig = self.signature(func, true);
        let static_ = if func.is_static { "static " } else { "" };
        self.line(&format!("{static_}{}{sig};", property_name(&func.name)));
        Ok(())
    }

    /// Every library registers its module names with the loader's
    /// dependency-name interface.
    fn emit_registry(&mut self) {
        if self.plan.modules.is_empty() {
            return;
        }
        let plan = self.plan;
        if !self.out.is_empty() && !self.out.ends_with("\n\n") {
            self.line("");
        }
        self.line(&format!("interface {MODULE_NAMES_INTERFACE} {{"));
        self.indent += 1;
        for module in &plan.modules {
            self.line(&format!("{}: true;", string_literal(&module_path(module))));
        }
        self.indent -= 1;
        self.line("}");
    }
}

fn is_optional(param: &Parameter) -> bool {
    param.optional || param.default_value.is_some()
}

/// Check if a name is a reserved word in the target language.
fn is_reserved(name: &str) -> bool {
    matches!(
        name,
        "break"
            | "case"
            | "catch"
            | "class"
            | "const"
            | "continue"
            | "debugger"
            | "default"
            | "delete"
            | "do"
            | "else"
            | "enum"
            | "export"
            | "extends"
            | "false"
            | "finally"
            | "for"
            | "function"
            | "if"
            | "import"
            | "in"
            | "instanceof"
            | "new"
            | "null"
            | "return"
            | "super"
            | "switch"
            | "this"
            | "throw"
            | "true"
            | "try"
            | "typeof"
            | "var"
            | "void"
            | "while"
            | "with"
            // strict mode
            | "implements"
            | "interface"
            | "let"
            | "package"
            | "private"
            | "protected"
            | "public"
            | "static"
            | "yield"
            | "await"
    )
}

/// A parameter name that is legal in a signature.
fn param_name(name: &str) -> String {
    if is_reserved(name) {
        return format!("{name}_");
    }
    if is_identifier(name) {
        return name.to_string();
    }
    let mut cleaned: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '$' { c } else { '_' })
        .collect();
    if cleaned.starts_with(|c: char| c.is_ascii_digit()) || cleaned.is_empty() {
        cleaned.insert(0, '_');
    }
    cleaned
}
