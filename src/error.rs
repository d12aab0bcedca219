//! Error types shared by the spec model, type mapper and default synthesizer.
//!
//! A `TypeError` means the style spec and the generator have drifted out of
//! sync. Generation aborts on the first one; any output produced past that
//! point would be unsound.

/// Spec/type mismatch detected while mapping a property.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TypeError {
    #[error("unknown type `{tag}` for {property}")]
    UnknownType { property: String, tag: String },

    #[error("unknown property-type `{tag}` for {property}")]
    UnknownPropertyType { property: String, tag: String },

    #[error("array property {0} has no element type")]
    MissingElementType(String),

    #[error("no evaluated type for {property} (type `{tag}`)")]
    NoEvaluatedType { property: String, tag: &'static str },

    #[error("invalid color default `{value}` for {property}")]
    InvalidColor { property: String, value: String },

    #[error("default `{value}` of {property} does not match type `{tag}`")]
    InvalidDefault {
        property: String,
        tag: &'static str,
        value: String,
    },
}

/// Failure to load a style spec document.
#[derive(Debug, thiserror::Error)]
pub enum SpecError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid style spec: {0}")]
    Invalid(String),
    #[error(transparent)]
    Type(#[from] TypeError),
}

/// Failure to parse or evaluate a style expression.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExpressionError {
    #[error("unknown expression operator `{0}`")]
    UnknownOperator(String),

    #[error("invalid `{op}` expression: {reason}")]
    Invalid { op: String, reason: String },

    #[error("expected {expected} but found {found}")]
    TypeMismatch { expected: &'static str, found: &'static str },

    #[error("`{0}` is not available in this evaluation context")]
    MissingInput(&'static str),

    #[error("unsupported property function: {0}")]
    UnsupportedFunction(String),
}

/// Shader pragma that does not line up with the generated bindings.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ShaderError {
    #[error("no layer type matches shader program `{0}`")]
    NoLayer(String),

    #[error("{program}: pragma `{name}` has no binding in the {layer} layer")]
    UnknownBinding {
        program: String,
        layer: String,
        name: String,
    },

    #[error("{program}: pragma `{name}` is declared `{declared}`, the binding needs `{expected}`")]
    TypeMismatch {
        program: String,
        name: String,
        declared: String,
        expected: &'static str,
    },
}
