//! Python metrics using tree-sitter
//!
//! Computes logical lines, comment lines and per-block cyclomatic complexity
//! from Python source code. Any syntax error in the snippet makes the whole
//! analysis fail; partial trees are never measured. Python 2 statements and
//! trees nested deeper than [`MAX_TREE_DEPTH`] are rejected the same way.

use super::{AnalysisError, BlockKind, ComplexityBlock, MetricsBackend, RawMetrics};
use std::collections::BTreeSet;
use std::ops::ControlFlow;
use tree_sitter::{Node, Parser, Tree};

/// Deepest syntax tree accepted for analysis
pub const MAX_TREE_DEPTH: usize = 1000;

/// Python 2 statements the grammar still accepts but Python 3 rejects
const PYTHON2_KINDS: &[&str] = &["print_statement", "exec_statement"];

/// Node kinds that each start one logical line
const LOGICAL_LINE_KINDS: &[&str] = &[
    // Simple statements
    "expression_statement",
    "return_statement",
    "pass_statement",
    "break_statement",
    "continue_statement",
    "import_statement",
    "import_from_statement",
    "future_import_statement",
    "raise_statement",
    "global_statement",
    "nonlocal_statement",
    "delete_statement",
    "assert_statement",
    "type_alias_statement",
    // Compound statement headers
    "if_statement",
    "elif_clause",
    "else_clause",
    "for_statement",
    "while_statement",
    "try_statement",
    "except_clause",
    "except_group_clause",
    "finally_clause",
    "with_statement",
    "function_definition",
    "async_function_definition",
    "class_definition",
    "decorator",
    "match_statement",
    "case_clause",
];

const COMPREHENSION_KINDS: &[&str] = &[
    "list_comprehension",
    "set_comprehension",
    "dictionary_comprehension",
    "generator_expression",
];

/// Metrics backend for Python source
#[derive(Debug, Clone, Copy, Default)]
pub struct PythonMetrics;

impl PythonMetrics {
    pub fn new() -> Self {
        Self
    }
}

impl MetricsBackend for PythonMetrics {
    fn raw_metrics(&self, source: &str) -> Result<RawMetrics, AnalysisError> {
        let tree = parse_tree(source)?;
        let root = tree.root_node();

        let mut lloc = 0;
        let mut comment_rows = BTreeSet::new();
        walk_tree(&root, |node, _| {
            if LOGICAL_LINE_KINDS.contains(&node.kind()) {
                lloc += 1;
            } else if node.kind() == "comment" {
                comment_rows.insert(node.start_position().row);
            }
            ControlFlow::Continue(())
        });

        Ok(RawMetrics {
            lloc,
            comments: comment_rows.len() as u32,
        })
    }

    fn complexity(&self, source: &str) -> Result<Vec<ComplexityBlock>, AnalysisError> {
        let tree = parse_tree(source)?;
        let root = tree.root_node();
        let source = source.as_bytes();

        let mut blocks = Vec::new();
        collect_blocks(&root, source, &mut blocks);
        Ok(blocks)
    }
}

/// Parse Python source, rejecting empty input and trees that cannot be measured
fn parse_tree(source: &str) -> Result<Tree, AnalysisError> {
    if source.trim().is_empty() {
        return Err(AnalysisError::Empty);
    }

    let mut parser = Parser::new();
    let language = tree_sitter_python::LANGUAGE;
    parser
        .set_language(&language.into())
        .map_err(|e| AnalysisError::Parser(format!("failed to set Python language: {e}")))?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| AnalysisError::Parser("tree-sitter returned no tree".to_string()))?;

    // Bounds the recursion of the block and decision-point walks
    if let Some(node) = first_node(&tree.root_node(), |_, depth| depth > MAX_TREE_DEPTH) {
        let (line, column) = position(&node);
        return Err(AnalysisError::TooDeep { line, column });
    }

    let root = tree.root_node();
    if root.has_error() {
        let (line, column) = first_node(&root, |n, _| n.is_error() || n.is_missing())
            .map(|n| position(&n))
            .unwrap_or((1, 1));
        return Err(AnalysisError::Syntax { line, column });
    }

    if let Some(node) = first_node(&root, |n, _| PYTHON2_KINDS.contains(&n.kind())) {
        let (line, column) = position(&node);
        return Err(AnalysisError::Syntax { line, column });
    }

    Ok(tree)
}

/// 1-based line and column of a node
fn position(node: &Node) -> (usize, usize) {
    let pos = node.start_position();
    (pos.row + 1, pos.column + 1)
}

/// Visit `root` and its descendants in document order, with their depth below `root`.
///
/// Uses a tree cursor instead of recursion, so arbitrarily deep trees are safe.
fn walk_tree<'t>(root: &Node<'t>, mut visit: impl FnMut(&Node<'t>, usize) -> ControlFlow<()>) {
    let mut cursor = root.walk();
    let mut depth = 0usize;
    loop {
        if visit(&cursor.node(), depth).is_break() {
            return;
        }
        if cursor.goto_first_child() {
            depth += 1;
            continue;
        }
        loop {
            if depth == 0 {
                return;
            }
            if cursor.goto_next_sibling() {
                break;
            }
            cursor.goto_parent();
            depth -= 1;
        }
    }
}

/// First node in document order matching `pred`
fn first_node<'t>(root: &Node<'t>, pred: impl Fn(&Node<'t>, usize) -> bool) -> Option<Node<'t>> {
    let mut found = None;
    walk_tree(root, |node, depth| {
        if pred(node, depth) {
            found = Some(*node);
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    });
    found
}

fn is_function(node: &Node) -> bool {
    matches!(
        node.kind(),
        "function_definition" | "async_function_definition"
    )
}

/// The function definition wrapped by a node, looking through decorators
fn as_function<'t>(node: &Node<'t>) -> Option<Node<'t>> {
    if is_function(node) {
        return Some(*node);
    }
    if node.kind() == "decorated_definition" {
        return node
            .child_by_field_name("definition")
            .filter(is_function)
            .or_else(|| node.children(&mut node.walk()).find(is_function));
    }
    None
}

fn definition_name(node: &Node, source: &[u8]) -> String {
    node.child_by_field_name("name")
        .and_then(|n| n.utf8_text(source).ok())
        .unwrap_or("<anonymous>")
        .to_string()
}

/// Walk module-level code and record every function and class block.
///
/// Definitions nested in `if`/`try`/decorators at module level still count;
/// anything inside a function body is folded into that function instead.
fn collect_blocks(node: &Node, source: &[u8], blocks: &mut Vec<ComplexityBlock>) {
    for child in node.children(&mut node.walk()) {
        if is_function(&child) {
            blocks.push(ComplexityBlock {
                name: definition_name(&child, source),
                kind: BlockKind::Function,
                line: child.start_position().row as u32 + 1,
                complexity: function_complexity(&child, source),
            });
        } else if child.kind() == "class_definition" {
            collect_class_blocks(&child, source, blocks);
        } else {
            collect_blocks(&child, source, blocks);
        }
    }
}

/// Record a class block followed by its method blocks
fn collect_class_blocks(node: &Node, source: &[u8], blocks: &mut Vec<ComplexityBlock>) {
    let mut methods = Vec::new();
    let mut body_points = 0;

    if let Some(body) = node.child_by_field_name("body") {
        for child in body.children(&mut body.walk()) {
            if let Some(method) = as_function(&child) {
                methods.push(ComplexityBlock {
                    name: format!(
                        "{}.{}",
                        definition_name(node, source),
                        definition_name(&method, source)
                    ),
                    kind: BlockKind::Method,
                    line: method.start_position().row as u32 + 1,
                    complexity: function_complexity(&method, source),
                });
            } else {
                body_points += own_points(&child, source) + decision_points(&child, source);
            }
        }
    }

    let real = 1 + body_points + methods.iter().map(|m| m.complexity).sum::<u32>();
    let complexity = match methods.len() as u32 {
        0 => real,
        n => real / n + u32::from(n > 1),
    };

    blocks.push(ComplexityBlock {
        name: definition_name(node, source),
        kind: BlockKind::Class,
        line: node.start_position().row as u32 + 1,
        complexity,
    });
    blocks.extend(methods);
}

/// Cyclomatic complexity of a function: one plus its decision points
fn function_complexity(node: &Node, source: &[u8]) -> u32 {
    let body_points = node
        .child_by_field_name("body")
        .map(|body| own_points(&body, source) + decision_points(&body, source))
        .unwrap_or(0);
    1 + body_points
}

/// Sum the decision points of everything below `node`
fn decision_points(node: &Node, source: &[u8]) -> u32 {
    let mut total = 0;
    for child in node.children(&mut node.walk()) {
        total += if is_function(&child) {
            // Closures are folded into the enclosing function
            function_complexity(&child, source)
        } else if child.kind() == "class_definition" {
            0
        } else {
            own_points(&child, source) + decision_points(&child, source)
        };
    }
    total
}

/// Decision points contributed by a single node, excluding its descendants
fn own_points(node: &Node, source: &[u8]) -> u32 {
    match node.kind() {
        "if_statement" | "elif_clause" | "conditional_expression" | "boolean_operator"
        | "assert_statement" => 1,
        "for_statement" | "while_statement" => 1 + u32::from(has_child(node, "else_clause")),
        "try_statement" => {
            let handlers = count_children(node, |c| {
                matches!(c.kind(), "except_clause" | "except_group_clause")
            });
            handlers + u32::from(has_child(node, "else_clause"))
        }
        kind if COMPREHENSION_KINDS.contains(&kind) => {
            count_children(node, |c| matches!(c.kind(), "for_in_clause" | "if_clause"))
        }
        "match_statement" => match_points(node, source),
        _ => 0,
    }
}

/// Each case of a `match` adds a path, except an irrefutable catch-all
fn match_points(node: &Node, source: &[u8]) -> u32 {
    let mut cases = Vec::new();
    for child in node.children(&mut node.walk()) {
        match child.kind() {
            "case_clause" => cases.push(child),
            "block" => cases.extend(
                child
                    .children(&mut child.walk())
                    .filter(|c| c.kind() == "case_clause"),
            ),
            _ => {}
        }
    }

    let has_catch_all = cases.iter().any(|c| is_catch_all(c, source));
    (cases.len() as u32).saturating_sub(u32::from(has_catch_all))
}

fn is_catch_all(case: &Node, source: &[u8]) -> bool {
    if case.child_by_field_name("guard").is_some() {
        return false;
    }
    let patterns: Vec<Node> = case
        .children(&mut case.walk())
        .filter(|c| c.kind() == "case_pattern")
        .collect();
    let [pattern] = patterns.as_slice() else {
        return false;
    };
    let text = pattern.utf8_text(source).unwrap_or("").trim();
    is_capture_name(text)
}

/// `_` or a bare name, which match anything
fn is_capture_name(text: &str) -> bool {
    if matches!(text, "None" | "True" | "False") {
        return false;
    }
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if first == '_' || first.is_alphabetic() => {
            chars.all(|c| c == '_' || c.is_alphanumeric())
        }
        _ => false,
    }
}

fn has_child(node: &Node, kind: &str) -> bool {
    node.children(&mut node.walk()).any(|c| c.kind() == kind)
}

fn count_children(node: &Node, pred: impl Fn(&Node) -> bool) -> u32 {
    node.children(&mut node.walk()).filter(|c| pred(c)).count() as u32
}
