//! Annotation queries over a parsed declaration.
//!
//! Every function here is pure: it reads the tree and answers a yes/no
//! question or selects a member. Name comparison is exact and
//! case-sensitive. Value comparison is substring containment against each
//! argument's literal text, so `"/greet"` also matches `"/greeting"`.

use crate::analysis::{
    canonical_type, Annotation, ConstructorDeclaration, FieldDeclaration, MethodDeclaration, Parameter,
    TypeDeclaration,
};
use crate::error::{InspectError, Result};

/// An entity that can carry annotations.
pub trait Annotated {
    fn annotations(&self) -> &[Annotation];
}

impl Annotated for TypeDeclaration {
    fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }
}

impl Annotated for FieldDeclaration {
    fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }
}

impl Annotated for MethodDeclaration {
    fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }
}

impl Annotated for ConstructorDeclaration {
    fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }
}

impl Annotated for Parameter {
    fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }
}

/// A method or constructor: something with a parameter list.
pub trait Callable: Annotated {
    fn parameters(&self) -> &[Parameter];

    fn parameter_types(&self) -> Vec<&str> {
        self.parameters()
            .iter()
            .map(|p| p.declared_type.as_str())
            .collect()
    }

    fn find_parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters().iter().find(|p| p.name == name)
    }
}

impl Callable for MethodDeclaration {
    fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }
}

impl Callable for ConstructorDeclaration {
    fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }
}

/// True iff any annotation on `entity` is named exactly `name`.
pub fn has_annotation<E: Annotated + ?Sized>(entity: &E, name: &str) -> bool {
    entity.annotations().iter().any(|a| a.name == name)
}

/// True iff some annotation named `name` has an argument containing `needle`.
pub fn has_annotation_with_value_contains<E: Annotated + ?Sized>(
    entity: &E,
    name: &str,
    needle: &str,
) -> bool {
    entity
        .annotations()
        .iter()
        .any(|a| a.name == name && a.argument_contains(needle))
}

pub fn any_method_has_annotation(ty: &TypeDeclaration, name: &str) -> bool {
    ty.methods.iter().any(|m| has_annotation(m, name))
}

pub fn any_method_has_annotation_with_value(ty: &TypeDeclaration, name: &str, needle: &str) -> bool {
    ty.methods
        .iter()
        .any(|m| has_annotation_with_value_contains(m, name, needle))
}

pub fn any_constructor_has_annotation(ty: &TypeDeclaration, name: &str) -> bool {
    ty.constructors.iter().any(|c| has_annotation(c, name))
}

/// Existential check over field bindings whose declared type equals
/// `declared_type` after normalization. Each binding inherits its
/// statement's annotations.
pub fn any_field_of_type_has_annotation(ty: &TypeDeclaration, declared_type: &str, name: &str) -> bool {
    let declared_type = canonical_type(declared_type);
    ty.fields.iter().any(|field| {
        field.variables().any(|(binding, annotations)| {
            binding.declared_type == declared_type && annotations.iter().any(|a| a.name == name)
        })
    })
}

/// Narrows overloads when selecting a method or constructor.
#[derive(Debug, Clone, Default)]
pub struct MemberSelector<'a> {
    /// Keep only members declaring a parameter with this name.
    pub parameter: Option<&'a str>,
    /// Keep only members whose declared parameter types equal this list.
    pub parameter_types: Option<&'a [String]>,
}

impl<'a> MemberSelector<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parameter(mut self, name: Option<&'a str>) -> Self {
        self.parameter = name;
        self
    }

    pub fn parameter_types(mut self, types: Option<&'a [String]>) -> Self {
        self.parameter_types = types;
        self
    }

    fn accepts<C: Callable>(&self, callable: &C) -> bool {
        if let Some(types) = self.parameter_types {
            let declared = callable.parameter_types();
            if declared.len() != types.len()
                || declared.iter().zip(types).any(|(d, t)| *d != canonical_type(t))
            {
                return false;
            }
        }
        if let Some(name) = self.parameter {
            if callable.find_parameter(name).is_none() {
                return false;
            }
        }
        true
    }

    fn describe(&self, head: &str) -> String {
        let params = match self.parameter_types {
            Some(types) => types.join(", "),
            None => "..".to_string(),
        };
        match self.parameter {
            Some(name) => format!("{}({}) with parameter `{}`", head, params, name),
            None => format!("{}({})", head, params),
        }
    }
}

fn select<'t, C: Callable>(
    candidates: impl Iterator<Item = &'t C>,
    selector: &MemberSelector,
    member: &'static str,
    head: &str,
) -> Result<&'t C> {
    let matched: Vec<&C> = candidates.filter(|c| selector.accepts(*c)).collect();
    match matched.as_slice() {
        [only] => Ok(*only),
        [] => Err(InspectError::MemberNotFound {
            member,
            signature: selector.describe(head),
        }),
        many => Err(InspectError::AmbiguousMatch {
            member,
            signature: selector.describe(head),
            count: many.len(),
        }),
    }
}

/// Select the single method named `name` that satisfies `selector`.
///
/// Overloads that the selector cannot tell apart are an `AmbiguousMatch`
/// rather than a silent first pick.
pub fn select_method<'t>(
    ty: &'t TypeDeclaration,
    name: &str,
    selector: &MemberSelector,
) -> Result<&'t MethodDeclaration> {
    let candidates = ty.methods.iter().filter(|m| m.name == name);
    select(candidates, selector, "method", name)
}

/// Select the single constructor that satisfies `selector`.
pub fn select_constructor<'t>(
    ty: &'t TypeDeclaration,
    selector: &MemberSelector,
) -> Result<&'t ConstructorDeclaration> {
    select(ty.constructors.iter(), selector, "constructor", &ty.name)
}

/// Parameter-level check on one callable.
///
/// With `parameter` set only that parameter is examined; otherwise any
/// parameter may carry the annotation. With `needle` set the annotation must
/// also carry an argument containing it.
pub fn parameter_has_annotation<C: Callable + ?Sized>(
    callable: &C,
    parameter: Option<&str>,
    name: &str,
    needle: Option<&str>,
) -> bool {
    let matches = |p: &Parameter| match needle {
        Some(needle) => has_annotation_with_value_contains(p, name, needle),
        None => has_annotation(p, name),
    };

    match parameter {
        Some(param_name) => callable.find_parameter(param_name).map_or(false, matches),
        None => callable.parameters().iter().any(matches),
    }
}
