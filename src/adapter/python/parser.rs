use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use streaming_iterator::StreamingIterator;
use tree_sitter::{Node, Query, QueryCursor, Tree};

use crate::models::Visibility;

// ── Class query ──

const CLASS_QUERY: &str = r#"
(class_definition
  name: (identifier) @name) @class
"#;

/// A class statement, with the members declared directly in its body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDef {
    /// Dotted through enclosing classes, e.g. `Outer.Inner`.
    pub qualified_name: String,
    /// Base expressions as written, keyword arguments dropped.
    pub bases: Vec<String>,
    pub line: u32,
    pub members: Vec<Member>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub name: String,
    pub visibility: Visibility,
    pub line: u32,
}

#[derive(Debug, Clone)]
pub struct ParsedFile {
    pub path: PathBuf,
    pub classes: Vec<ClassDef>,
}

pub fn create_parser() -> Result<tree_sitter::Parser> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .context("failed to set tree-sitter language")?;
    Ok(parser)
}

pub fn compile_class_query() -> Result<Query> {
    Query::new(&tree_sitter_python::LANGUAGE.into(), CLASS_QUERY)
        .context("failed to compile python class query")
}

pub fn parse_file(parser: &mut tree_sitter::Parser, query: &Query, path: &Path) -> Result<ParsedFile> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_source(parser, query, path, &source)
}

pub fn parse_source(
    parser: &mut tree_sitter::Parser,
    query: &Query,
    path: &Path,
    source: &str,
) -> Result<ParsedFile> {
    let tree = parser
        .parse(source, None)
        .with_context(|| format!("tree-sitter failed to parse {}", path.display()))?;
    Ok(ParsedFile {
        path: path.to_path_buf(),
        classes: extract_classes(&tree, source.as_bytes(), query),
    })
}

// ── Extraction ──

pub fn extract_classes(tree: &Tree, source: &[u8], query: &Query) -> Vec<ClassDef> {
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(query, tree.root_node(), source);

    let name_idx = query.capture_index_for_name("name");
    let class_idx = query.capture_index_for_name("class");

    let mut classes = Vec::new();
    while let Some(m) = matches.next() {
        let class_cap = class_idx.and_then(|idx| m.captures.iter().find(|c| c.index == idx));
        let name_cap = name_idx.and_then(|idx| m.captures.iter().find(|c| c.index == idx));
        let (Some(class_cap), Some(name_cap)) = (class_cap, name_cap) else {
            continue;
        };
        let class_node = class_cap.node;
        let Ok(name) = name_cap.node.utf8_text(source) else {
            continue;
        };

        let bases = class_node
            .child_by_field_name("superclasses")
            .map(|args| base_names(args, source))
            .unwrap_or_default();
        let members = class_node
            .child_by_field_name("body")
            .map(|body| class_members(body, source))
            .unwrap_or_default();

        classes.push(ClassDef {
            qualified_name: qualify(class_node, name, source),
            bases,
            line: line_of(class_node),
            members,
        });
    }
    classes
}

/// Visibility by naming convention: dunders are public, `__name` is private
/// (name-mangled), `_name` is protected.
pub fn visibility_of(name: &str) -> Visibility {
    let dunder = name.len() > 4 && name.starts_with("__") && name.ends_with("__");
    if dunder {
        Visibility::Public
    } else if name.starts_with("__") {
        Visibility::Private
    } else if name.starts_with('_') {
        Visibility::Protected
    } else {
        Visibility::Public
    }
}

fn qualify(class_node: Node, name: &str, source: &[u8]) -> String {
    let mut parts = vec![name];
    let mut current = class_node.parent();
    while let Some(parent) = current {
        if parent.kind() == "class_definition" {
            if let Some(outer) = parent
                .child_by_field_name("name")
                .and_then(|n| n.utf8_text(source).ok())
            {
                parts.push(outer);
            }
        }
        current = parent.parent();
    }
    parts.reverse();
    parts.join(".")
}

fn base_names(args: Node, source: &[u8]) -> Vec<String> {
    let mut cursor = args.walk();
    args.named_children(&mut cursor)
        .filter_map(|arg| {
            let expr = match arg.kind() {
                "identifier" | "attribute" => arg,
                // Generic[T] and friends
                "subscript" => arg.child_by_field_name("value")?,
                _ => return None,
            };
            expr.utf8_text(source).ok().map(str::to_string)
        })
        .collect()
}

fn class_members(body: Node, source: &[u8]) -> Vec<Member> {
    let mut members = Vec::new();
    let mut cursor = body.walk();
    for statement in body.named_children(&mut cursor) {
        match statement.kind() {
            "function_definition" => members.extend(method(statement, source)),
            "decorated_definition" => {
                if let Some(def) = statement
                    .child_by_field_name("definition")
                    .filter(|d| d.kind() == "function_definition")
                {
                    members.extend(method(def, source));
                }
            }
            "expression_statement" => {
                let mut inner = statement.walk();
                for expr in statement.named_children(&mut inner) {
                    if expr.kind() == "assignment" {
                        members.extend(undefinition(expr, source));
                    }
                }
            }
            _ => {}
        }
    }
    members
}

fn method(def: Node, source: &[u8]) -> Option<Member> {
    let name = def.child_by_field_name("name")?.utf8_text(source).ok()?;
    Some(Member {
        name: name.to_string(),
        visibility: visibility_of(name),
        line: line_of(def),
    })
}

// `__hash__ = None` blocks the inherited method. An annotated `x: T = None`
// declares a field instead.
fn undefinition(assignment: Node, source: &[u8]) -> Option<Member> {
    if assignment.child_by_field_name("type").is_some() {
        return None;
    }
    let left = assignment.child_by_field_name("left")?;
    let right = assignment.child_by_field_name("right")?;
    if left.kind() != "identifier" || right.kind() != "none" {
        return None;
    }
    Some(Member {
        name: left.utf8_text(source).ok()?.to_string(),
        visibility: Visibility::Undefined,
        line: line_of(assignment),
    })
}

fn line_of(node: Node) -> u32 {
    node.start_position().row as u32 + 1
}
