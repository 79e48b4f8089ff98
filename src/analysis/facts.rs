//! Structural tree produced by the declaration parser.
//!
//! All entities are plain owned data: built once per parse and never
//! mutated afterwards.

use std::fmt;

use serde::Serialize;

/// Source location span with byte offsets and line/column positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Span {
    /// Start byte offset (0-indexed).
    pub start_byte: usize,
    /// End byte offset (0-indexed, exclusive).
    pub end_byte: usize,
    /// Start line (1-indexed).
    pub start_line: usize,
    /// Start column (1-indexed).
    pub start_col: usize,
    /// End line (1-indexed).
    pub end_line: usize,
    /// End column (1-indexed).
    pub end_col: usize,
}

impl Span {
    /// Create a span from a tree-sitter node.
    pub fn from_node(node: tree_sitter::Node) -> Self {
        let start = node.start_position();
        let end = node.end_position();
        Self {
            start_byte: node.start_byte(),
            end_byte: node.end_byte(),
            start_line: start.row + 1, // tree-sitter is 0-indexed
            start_col: start.column + 1,
            end_line: end.row + 1,
            end_col: end.column + 1,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start_line, self.start_col)
    }
}

/// An annotation (`@Name` or `@Name(args)`) attached to a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Annotation {
    /// Name as written, e.g. `GetMapping` or `org.example.Marker`.
    pub name: String,
    /// Literal text of each argument element, in source order.
    pub arguments: Vec<String>,
    pub span: Span,
}

impl Annotation {
    /// True if any argument's literal text contains `needle`.
    pub fn argument_contains(&self, needle: &str) -> bool {
        self.arguments.iter().any(|arg| arg.contains(needle))
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.arguments.is_empty() {
            write!(f, "@{}", self.name)
        } else {
            write!(f, "@{}({})", self.name, self.arguments.join(", "))
        }
    }
}

/// Kind of top-level type declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Record,
}

impl TypeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Interface => "interface",
            TypeKind::Enum => "enum",
            TypeKind::Record => "record",
        }
    }

    /// Map a tree-sitter node kind to a type kind.
    pub fn from_node_kind(kind: &str) -> Option<Self> {
        match kind {
            "class_declaration" => Some(TypeKind::Class),
            "interface_declaration" => Some(TypeKind::Interface),
            "enum_declaration" => Some(TypeKind::Enum),
            "record_declaration" => Some(TypeKind::Record),
            _ => None,
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One variable introduced by a field declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariableBinding {
    pub name: String,
    pub declared_type: String,
}

/// A field declaration statement.
///
/// `@A private T x, y;` is one declaration with two bindings; the
/// annotations belong to the statement and therefore apply to every binding.
#[derive(Debug, Clone, Serialize)]
pub struct FieldDeclaration {
    pub bindings: Vec<VariableBinding>,
    pub annotations: Vec<Annotation>,
    pub span: Span,
}

impl FieldDeclaration {
    /// Iterate bindings paired with the annotations each one carries.
    pub fn variables(&self) -> impl Iterator<Item = (&VariableBinding, &[Annotation])> {
        self.bindings
            .iter()
            .map(move |b| (b, self.annotations.as_slice()))
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Normalize the text of a declared type.
///
/// Comments are dropped, whitespace only survives between two words
/// (`? extends Foo`), and every comma is followed by one space, so
/// `Map< String,Integer >` and `Map<String, Integer>` compare equal.
pub fn canonical_type(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut gap = false;

    while let Some(c) = chars.next() {
        match c {
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if prev == '*' && next == '/' {
                        break;
                    }
                    prev = next;
                }
                gap = true;
            }
            '/' if chars.peek() == Some(&'/') => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        break;
                    }
                }
                gap = true;
            }
            c if c.is_whitespace() => gap = true,
            c => {
                let after_word = out.chars().last().map_or(false, |p| is_word_char(p) || p == '?');
                if gap && after_word && (is_word_char(c) || c == '@') {
                    out.push(' ');
                }
                out.push(c);
                if c == ',' {
                    out.push(' ');
                }
                gap = false;
            }
        }
    }

    out
}

/// A formal parameter of a method, constructor, or record header.
#[derive(Debug, Clone, Serialize)]
pub struct Parameter {
    pub name: String,
    /// Declared type text; varargs are recorded as `T...`.
    pub declared_type: String,
    pub annotations: Vec<Annotation>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConstructorDeclaration {
    pub parameters: Vec<Parameter>,
    pub annotations: Vec<Annotation>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize)]
pub struct MethodDeclaration {
    pub name: String,
    pub return_type: String,
    pub parameters: Vec<Parameter>,
    pub annotations: Vec<Annotation>,
    pub span: Span,
}

/// The top-level type a source unit is verified against.
#[derive(Debug, Clone, Serialize)]
pub struct TypeDeclaration {
    pub name: String,
    pub kind: TypeKind,
    pub annotations: Vec<Annotation>,
    pub fields: Vec<FieldDeclaration>,
    pub constructors: Vec<ConstructorDeclaration>,
    pub methods: Vec<MethodDeclaration>,
    /// Record header components (empty for other kinds).
    pub components: Vec<Parameter>,
    pub span: Span,
}

/// A parsed source file reduced to the declaration named after the file.
#[derive(Debug, Clone, Serialize)]
pub struct SourceUnit {
    pub path: String,
    pub package: Option<String>,
    pub imports: Vec<String>,
    pub declaration: TypeDeclaration,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span() -> Span {
        Span {
            start_byte: 0,
            end_byte: 0,
            start_line: 1,
            start_col: 1,
            end_line: 1,
            end_col: 1,
        }
    }

    #[test]
    fn test_annotation_display() {
        let marker = Annotation {
            name: "Service".to_string(),
            arguments: vec![],
            span: span(),
        };
        assert_eq!(marker.to_string(), "@Service");

        let mapping = Annotation {
            name: "RequestMapping".to_string(),
            arguments: vec!["value = \"/a\"".to_string(), "method = GET".to_string()],
            span: span(),
        };
        assert_eq!(mapping.to_string(), "@RequestMapping(value = \"/a\", method = GET)");
    }

    #[test]
    fn test_argument_contains_is_substring() {
        let qualifier = Annotation {
            name: "Qualifier".to_string(),
            arguments: vec!["\"paypalPaymentGatewayExtra\"".to_string()],
            span: span(),
        };
        assert!(qualifier.argument_contains("paypalPaymentGateway"));
        assert!(!qualifier.argument_contains("Qualifier"));
    }

    #[test]
    fn test_canonical_type() {
        assert_eq!(canonical_type("Map<String,Integer>"), "Map<String, Integer>");
        assert_eq!(canonical_type("Map< String ,\n  Integer >"), "Map<String, Integer>");
        assert_eq!(canonical_type("List<? extends  Number>"), "List<? extends Number>");
        assert_eq!(canonical_type("int [] []"), "int[][]");
        assert_eq!(canonical_type("String ..."), "String...");
        assert_eq!(canonical_type("Map<String, /* id */ Long>"), "Map<String, Long>");
        assert_eq!(canonical_type("java.util.List<@NonNull String>"), "java.util.List<@NonNull String>");
    }

    #[test]
    fn test_field_variables_share_annotations() {
        let field = FieldDeclaration {
            bindings: vec![
                VariableBinding {
                    name: "x".to_string(),
                    declared_type: "Order".to_string(),
                },
                VariableBinding {
                    name: "y".to_string(),
                    declared_type: "Order".to_string(),
                },
            ],
            annotations: vec![Annotation {
                name: "Autowired".to_string(),
                arguments: vec![],
                span: span(),
            }],
            span: span(),
        };

        let vars: Vec<_> = field.variables().collect();
        assert_eq!(vars.len(), 2);
        assert!(vars.iter().all(|(_, anns)| anns[0].name == "Autowired"));
    }
}
