//! Verification checks over parsed source units.

mod checks;
mod runner;
mod types;

pub use checks::{
    class_annotation, class_annotation_value, constructor_annotation,
    constructor_parameter_annotation, field_annotation, markup_contains, method_annotation,
    method_annotation_value, method_parameter_annotation, named_method_annotation_value,
    ParameterCheck,
};
pub use runner::Runner;
pub use types::{CheckRule, Verdict, VerificationReport};
