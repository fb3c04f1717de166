//! JSDoc blocks for emitted declarations.

use indexmap::IndexMap;

use crate::ast::{Doc, FunctionDesc, Notice, ParamType, Parameter, Type};

/// A JSDoc comment under construction: free text first, then block tags.
#[derive(Debug, Default)]
pub(crate) struct DocBlock {
    body: Vec<String>,
    tags: Vec<String>,
}

impl DocBlock {
    pub(crate) fn from_doc(doc: &Doc) -> Self {
        let mut block = DocBlock::default();
        if let Some(description) = &doc.description {
            block.text(description);
        }
        for note in &doc.additional_notes {
            if !block.body.is_empty() {
                block.body.push(String::new());
            }
            block.text(note);
        }
        if let Some(since) = &doc.since {
            block.tag(format!("@since {since}"));
        }
        if let Some(deprecation) = &doc.deprecation {
            block.tag(notice("@deprecated", deprecation));
        }
        if let Some(experimental) = &doc.experimental {
            block.tag(notice("@experimental", experimental));
        }
        block
    }

    /// Documentation of a function: its own metadata plus parameters,
    /// return value, thrown errors and the override marker.
    pub(crate) fn for_function(func: &FunctionDesc, type_name: impl Fn(&Type) -> String) -> Self {
        let mut block = DocBlock::from_doc(&func.doc);
        for param in &func.parameters {
            block.param(None, param);
        }
        if let Some(returns) = &func.returns {
            if let Some(description) = &returns.description {
                block.tag(format!("@returns {}", first_line(description)));
            }
        }
        for throws in &func.throws {
            let mut tag = String::from("@throws");
            if let Some(ty) = &throws.ty {
                tag.push_str(&format!(" {{{}}}", type_name(ty)));
            }
            if let Some(description) = &throws.description {
                tag.push(' ');
                tag.push_str(first_line(description));
            }
            block.tag(tag);
        }
        if func.overwrite {
            block.tag("@override");
        }
        block
    }

    fn text(&mut self, text: &str) {
        self.body.extend(text.lines().map(|l| l.trim_end().to_string()));
    }

    pub(crate) fn tag(&mut self, tag: impl Into<String>) {
        self.tags.push(tag.into());
    }

    fn param(&mut self, prefix: Option<&str>, param: &Parameter) {
        let path = match prefix {
            Some(prefix) => format!("{prefix}.{}", param.name),
            None => param.name.clone(),
        };
        let label = match (&param.default_value, param.optional) {
            (Some(default), _) => format!("[{path}={default}]"),
            (None, true) => format!("[{path}]"),
            (None, false) => path.clone(),
        };
        let tag = match &param.description {
            Some(description) => format!("@param {label} {}", first_line(description)),
            None => format!("@param {label}"),
        };
        self.tag(tag);
        if let Some(ParamType::Shape(shape)) = &param.ty {
            self.shape(&path, shape);
        }
    }

    fn shape(&mut self, path: &str, shape: &IndexMap<String, Parameter>) {
        for entry in shape.values() {
            self.param(Some(path), entry);
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.body.is_empty() && self.tags.is_empty()
    }

    /// The comment lines, without indentation.
    pub(crate) fn lines(&self) -> Vec<String> {
        if self.is_empty() {
            return Vec::new();
        }
        let mut lines = vec!["/**".to_string()];
        for line in &self.body {
            lines.push(comment_line(line));
        }
        if !self.body.is_empty() && !self.tags.is_empty() {
            lines.push(" *".to_string());
        }
        for tag in &self.tags {
            lines.push(comment_line(tag));
        }
        lines.push(" */".to_string());
        lines
    }
}

fn notice(tag: &str, notice: &Notice) -> String {
    let mut out = tag.to_string();
    if let Some(since) = &notice.since {
        out.push_str(&format!(" (since {since})"));
    }
    if let Some(text) = &notice.text {
        out.push(' ');
        out.push_str(first_line(text));
    }
    out
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("").trim()
}

fn comment_line(text: &str) -> String {
    let text = text.replace("*/", "*\\/");
    if text.is_empty() {
        " *".to_string()
    } else {
        format!(" * {text}")
    }
}
