//! Java declaration parser using tree-sitter.

use std::collections::BTreeSet;
use std::path::Path;

use streaming_iterator::StreamingIterator;
use tree_sitter::{Language, Node, Parser, Query, QueryCursor};

use crate::analysis::{
    canonical_type, Annotation, ConstructorDeclaration, FieldDeclaration, LanguageAnalyzer,
    MethodDeclaration, Parameter, ParsedFile, SourceUnit, Span, TypeDeclaration, TypeKind,
    VariableBinding,
};
use crate::error::{InspectError, Result};

/// Top-level type declarations only; nested types never match.
const TYPE_DECLARATION_QUERY: &str = r#"
(program (class_declaration name: (identifier) @name) @type)
(program (interface_declaration name: (identifier) @name) @type)
(program (enum_declaration name: (identifier) @name) @type)
(program (record_declaration name: (identifier) @name) @type)
"#;

const IMPORT_QUERY: &str = r#"
(import_declaration) @import
"#;

const PACKAGE_QUERY: &str = r#"
(package_declaration [(scoped_identifier) (identifier)] @package_name)
"#;

fn grammar_error(e: impl std::fmt::Display) -> InspectError {
    InspectError::Grammar(e.to_string())
}

fn is_comment(kind: &str) -> bool {
    matches!(kind, "line_comment" | "block_comment")
}

pub struct JavaAnalyzer {
    language: Language,
}

impl JavaAnalyzer {
    pub fn new() -> Self {
        Self {
            language: tree_sitter_java::LANGUAGE.into(),
        }
    }

    fn create_parser(&self) -> Result<Parser> {
        let mut parser = Parser::new();
        parser.set_language(&self.language).map_err(grammar_error)?;
        Ok(parser)
    }

    fn parse_tree(&self, path: &Path, source: &str) -> Result<ParsedFile> {
        let mut parser = self.create_parser()?;
        let tree = parser.parse(source, None).ok_or_else(|| InspectError::Parse {
            line: 1,
            column: 1,
            message: "parser produced no tree".to_string(),
        })?;

        Ok(ParsedFile {
            tree,
            source: source.as_bytes().to_vec(),
            path: path.to_string_lossy().to_string(),
        })
    }

    /// Reject trees containing ERROR or MISSING nodes.
    fn check_syntax(&self, parsed: &ParsedFile) -> Result<()> {
        let root = parsed.tree.root_node();
        if !root.has_error() {
            return Ok(());
        }

        let node = first_error(root).unwrap_or(root);
        let message = if node.is_missing() {
            format!("missing `{}`", node.kind())
        } else {
            let text: String = parsed
                .node_text(node)
                .lines()
                .next()
                .unwrap_or("")
                .chars()
                .take(40)
                .collect();
            format!("unexpected `{}`", text.trim())
        };
        let span = Span::from_node(node);

        tracing::debug!(path = %parsed.path, at = %span, "syntax error");
        Err(InspectError::Parse {
            line: span.start_line,
            column: span.start_col,
            message,
        })
    }

    fn find_type<'t>(&self, parsed: &'t ParsedFile, expected: &str) -> Result<Node<'t>> {
        let query = Query::new(&self.language, TYPE_DECLARATION_QUERY).map_err(grammar_error)?;
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&query, parsed.tree.root_node(), &parsed.source[..]);

        while let Some(m) = matches.next() {
            let mut name = None;
            let mut decl_node = None;

            for capture in m.captures {
                match query.capture_names()[capture.index as usize] {
                    "name" => name = Some(parsed.node_text(capture.node)),
                    "type" => decl_node = Some(capture.node),
                    _ => {}
                }
            }

            if let (Some(found), Some(node)) = (name, decl_node) {
                if found == expected {
                    return Ok(node);
                }
            }
        }

        tracing::debug!(path = %parsed.path, expected, "type not declared at top level");
        Err(InspectError::TypeNotFound {
            name: expected.to_string(),
        })
    }

    fn extract_type(&self, parsed: &ParsedFile, node: Node) -> TypeDeclaration {
        let kind = TypeKind::from_node_kind(node.kind()).unwrap_or(TypeKind::Class);
        let name = node
            .child_by_field_name("name")
            .map(|n| parsed.node_text(n).to_string())
            .unwrap_or_default();

        let mut decl = TypeDeclaration {
            name,
            kind,
            annotations: self.modifier_annotations(parsed, node),
            fields: Vec::new(),
            constructors: Vec::new(),
            methods: Vec::new(),
            components: Vec::new(),
            span: Span::from_node(node),
        };

        if kind == TypeKind::Record {
            if let Some(params) = node.child_by_field_name("parameters") {
                decl.components = self.extract_parameters(parsed, params);
            }
        }

        if let Some(body) = node.child_by_field_name("body") {
            self.collect_members(parsed, body, &mut decl);
        }

        decl
    }

    fn collect_members(&self, parsed: &ParsedFile, body: Node, decl: &mut TypeDeclaration) {
        let mut cursor = body.walk();
        for member in body.named_children(&mut cursor) {
            match member.kind() {
                "field_declaration" | "constant_declaration" => {
                    decl.fields.push(self.extract_field(parsed, member));
                }
                "constructor_declaration" => {
                    decl.constructors.push(self.extract_constructor(parsed, member));
                }
                "method_declaration" => {
                    decl.methods.push(self.extract_method(parsed, member));
                }
                // Enum members follow the constant list.
                "enum_body_declarations" => self.collect_members(parsed, member, decl),
                _ => {}
            }
        }
    }

    fn extract_field(&self, parsed: &ParsedFile, node: Node) -> FieldDeclaration {
        let declared_type = node
            .child_by_field_name("type")
            .map(|t| parsed.node_text(t).to_string())
            .unwrap_or_default();

        let mut cursor = node.walk();
        let bindings = node
            .children_by_field_name("declarator", &mut cursor)
            .filter_map(|declarator| {
                let name = declarator.child_by_field_name("name")?;
                Some(VariableBinding {
                    name: parsed.node_text(name).to_string(),
                    declared_type: with_dimensions(parsed, &declared_type, declarator),
                })
            })
            .collect();

        FieldDeclaration {
            bindings,
            annotations: self.modifier_annotations(parsed, node),
            span: Span::from_node(node),
        }
    }

    fn extract_constructor(&self, parsed: &ParsedFile, node: Node) -> ConstructorDeclaration {
        ConstructorDeclaration {
            parameters: node
                .child_by_field_name("parameters")
                .map(|p| self.extract_parameters(parsed, p))
                .unwrap_or_default(),
            annotations: self.modifier_annotations(parsed, node),
            span: Span::from_node(node),
        }
    }

    fn extract_method(&self, parsed: &ParsedFile, node: Node) -> MethodDeclaration {
        let text_of = |field: &str| {
            node.child_by_field_name(field)
                .map(|n| parsed.node_text(n).to_string())
                .unwrap_or_default()
        };

        MethodDeclaration {
            name: text_of("name"),
            return_type: canonical_type(&text_of("type")),
            parameters: node
                .child_by_field_name("parameters")
                .map(|p| self.extract_parameters(parsed, p))
                .unwrap_or_default(),
            annotations: self.modifier_annotations(parsed, node),
            span: Span::from_node(node),
        }
    }

    fn extract_parameters(&self, parsed: &ParsedFile, params: Node) -> Vec<Parameter> {
        let mut cursor = params.walk();
        params
            .named_children(&mut cursor)
            .filter_map(|p| match p.kind() {
                "formal_parameter" => self.extract_formal_parameter(parsed, p),
                "spread_parameter" => self.extract_spread_parameter(parsed, p),
                // receiver_parameter and comments carry no binding
                _ => None,
            })
            .collect()
    }

    fn extract_formal_parameter(&self, parsed: &ParsedFile, node: Node) -> Option<Parameter> {
        let name = node.child_by_field_name("name")?;
        let declared_type = node
            .child_by_field_name("type")
            .map(|t| parsed.node_text(t).to_string())
            .unwrap_or_default();

        Some(Parameter {
            name: parsed.node_text(name).to_string(),
            declared_type: with_dimensions(parsed, &declared_type, node),
            annotations: self.modifier_annotations(parsed, node),
            span: Span::from_node(node),
        })
    }

    /// `Type... name` has no field names in the grammar, so walk children.
    fn extract_spread_parameter(&self, parsed: &ParsedFile, node: Node) -> Option<Parameter> {
        let mut annotations = Vec::new();
        let mut declared_type = None;
        let mut name = None;

        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "modifiers" => annotations = self.annotations_in(parsed, child),
                "variable_declarator" => {
                    name = child
                        .child_by_field_name("name")
                        .map(|n| parsed.node_text(n).to_string());
                }
                kind if is_comment(kind) => {}
                _ if declared_type.is_none() => {
                    declared_type = Some(canonical_type(&format!("{}...", parsed.node_text(child))));
                }
                _ => {}
            }
        }

        Some(Parameter {
            name: name?,
            declared_type: declared_type.unwrap_or_default(),
            annotations,
            span: Span::from_node(node),
        })
    }

    /// Annotations inside the `modifiers` child of a declaration.
    fn modifier_annotations(&self, parsed: &ParsedFile, node: Node) -> Vec<Annotation> {
        let mut cursor = node.walk();
        let modifiers = node.children(&mut cursor).find(|c| c.kind() == "modifiers");
        match modifiers {
            Some(m) => self.annotations_in(parsed, m),
            None => Vec::new(),
        }
    }

    fn annotations_in(&self, parsed: &ParsedFile, modifiers: Node) -> Vec<Annotation> {
        let mut cursor = modifiers.walk();
        modifiers
            .named_children(&mut cursor)
            .filter(|c| matches!(c.kind(), "marker_annotation" | "annotation"))
            .map(|c| self.extract_annotation(parsed, c))
            .collect()
    }

    fn extract_annotation(&self, parsed: &ParsedFile, node: Node) -> Annotation {
        let name = node
            .child_by_field_name("name")
            .map(|n| parsed.node_text(n).to_string())
            .unwrap_or_default();

        let arguments = match node.child_by_field_name("arguments") {
            Some(list) => {
                let mut cursor = list.walk();
                list.named_children(&mut cursor)
                    .filter(|arg| !is_comment(arg.kind()))
                    .map(|arg| parsed.node_text(arg).to_string())
                    .collect()
            }
            None => Vec::new(),
        };

        Annotation {
            name,
            arguments,
            span: Span::from_node(node),
        }
    }

    fn extract_package(&self, parsed: &ParsedFile) -> Option<String> {
        let query = Query::new(&self.language, PACKAGE_QUERY).ok()?;
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&query, parsed.tree.root_node(), &parsed.source[..]);

        if let Some(m) = matches.next() {
            for capture in m.captures {
                let name = query.capture_names()[capture.index as usize];
                if name == "package_name" {
                    return Some(parsed.node_text(capture.node).to_string());
                }
            }
        }
        None
    }

    fn extract_imports(&self, parsed: &ParsedFile) -> Result<Vec<String>> {
        let query = Query::new(&self.language, IMPORT_QUERY).map_err(grammar_error)?;
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&query, parsed.tree.root_node(), &parsed.source[..]);

        let mut imports = BTreeSet::new();

        while let Some(m) = matches.next() {
            for capture in m.captures {
                let node = capture.node;
                let mut is_static = false;
                let mut is_wildcard = false;
                let mut path = String::new();

                let mut walker = node.walk();
                for child in node.children(&mut walker) {
                    match child.kind() {
                        "static" => is_static = true,
                        "asterisk" => is_wildcard = true,
                        "scoped_identifier" | "identifier" => {
                            path = parsed.node_text(child).to_string();
                        }
                        _ => {}
                    }
                }

                if path.is_empty() {
                    continue;
                }
                if is_wildcard {
                    path.push_str(".*");
                }
                if is_static {
                    path.insert_str(0, "static ");
                }
                imports.insert(path);
            }
        }

        Ok(imports.into_iter().collect())
    }
}

impl Default for JavaAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageAnalyzer for JavaAnalyzer {
    fn language_id(&self) -> &'static str {
        "java"
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["java"]
    }

    fn parse_unit(&self, path: &Path, source: &str, expected_type: &str) -> Result<SourceUnit> {
        let parsed = self.parse_tree(path, source)?;
        self.check_syntax(&parsed)?;

        let node = self.find_type(&parsed, expected_type)?;
        let declaration = self.extract_type(&parsed, node);

        tracing::debug!(
            path = %parsed.path,
            name = %declaration.name,
            fields = declaration.fields.len(),
            constructors = declaration.constructors.len(),
            methods = declaration.methods.len(),
            "extracted declaration"
        );

        Ok(SourceUnit {
            path: parsed.path.clone(),
            package: self.extract_package(&parsed),
            imports: self.extract_imports(&parsed)?,
            declaration,
        })
    }
}

/// Depth-first search for the first ERROR or MISSING node.
fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }

    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}

/// Append C-style array dimensions (`int a[]`) to the declared type and
/// normalize the result.
fn with_dimensions(parsed: &ParsedFile, declared_type: &str, node: Node) -> String {
    match node.child_by_field_name("dimensions") {
        Some(dims) => canonical_type(&format!("{}{}", declared_type, parsed.node_text(dims))),
        None => canonical_type(declared_type),
    }
}
