//! C++ target.
//!
//! Renders `LayerIr`/`LightIr` into the mbgl source layout. Every file starts
//! with the generated banner and is wrapped in `// clang-format off/on`.

pub mod layer;
pub mod light;
pub mod properties;

use crate::codegen::ir::PropertyIr;
use crate::defaults::DefaultLiteral;
use crate::types::{ContainerKind, EvaluatedType, ExpressionType, ValueWrapper};

const BANNER: &str = "// This file is generated. Do not edit.";

/// Line-oriented source builder.
#[derive(Debug, Default)]
pub(crate) struct Source {
    out: String,
}

impl Source {
    /// Start a file with the clang-format guard and banner.
    pub(crate) fn generated() -> Self {
        let mut src = Self::default();
        src.line("// clang-format off");
        src.blank();
        src.line(BANNER);
        src.blank();
        src
    }

    pub(crate) fn line(&mut self, text: impl AsRef<str>) {
        self.out.push_str(text.as_ref());
        self.out.push('\n');
    }

    pub(crate) fn blank(&mut self) {
        self.out.push('\n');
    }

    pub(crate) fn open_namespaces(&mut self) {
        self.line("namespace mbgl {");
        self.line("namespace style {");
        self.blank();
    }

    pub(crate) fn close_namespaces(&mut self) {
        self.line("} // namespace style");
        self.line("} // namespace mbgl");
        self.blank();
    }

    pub(crate) fn finish(mut self) -> String {
        self.line("// clang-format on");
        self.out
    }
}

/// C++ spelling of an evaluated type.
pub fn evaluated_type(ty: &EvaluatedType) -> String {
    match ty {
        EvaluatedType::Bool => "bool".into(),
        EvaluatedType::Float => "float".into(),
        EvaluatedType::Double => "double".into(),
        EvaluatedType::Rotation => "Rotation".into(),
        EvaluatedType::String => "std::string".into(),
        EvaluatedType::Color => "Color".into(),
        EvaluatedType::Formatted => "expression::Formatted".into(),
        EvaluatedType::Image => "expression::Image".into(),
        EvaluatedType::TranslateAnchor => "TranslateAnchorType".into(),
        EvaluatedType::Alignment => "AlignmentType".into(),
        EvaluatedType::SymbolAnchor => "SymbolAnchorType".into(),
        EvaluatedType::Position => "Position".into(),
        EvaluatedType::Enum(name) => name.clone(),
        EvaluatedType::Array {
            element,
            length: Some(n),
        } => format!("std::array<{}, {n}>", evaluated_type(element)),
        EvaluatedType::Array {
            element,
            length: None,
        } => format!("std::vector<{}>", evaluated_type(element)),
    }
}

/// C++ expression type constant (`type::Color`, `type::Array(type::Number)`).
pub fn expression_type(ty: &ExpressionType) -> String {
    match ty {
        ExpressionType::Array(element) => format!("type::Array({})", expression_type(element)),
        other => format!("type::{other}"),
    }
}

/// Format a number the way a JSON/JS printer would (`1`, `0.5`, `-3`).
pub fn number_literal(n: f64) -> String {
    format!("{n}")
}

/// Single-precision literal with a fractional marker (`1.0f`, `0.5f`).
pub fn float_literal(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() {
        format!("{n}.0f")
    } else {
        format!("{n}f")
    }
}

pub fn default_literal(literal: &DefaultLiteral) -> String {
    match literal {
        DefaultLiteral::Empty => "{}".into(),
        DefaultLiteral::Float(n) => float_literal(*n),
        DefaultLiteral::Number(n) => number_literal(*n),
        DefaultLiteral::Str(s) => {
            let quoted = serde_json::to_string(s).unwrap_or_else(|_| format!("\"{s}\""));
            format!("{{{quoted}}}")
        }
        DefaultLiteral::Enum { ty, member } => format!("{}::{member}", evaluated_type(ty)),
        DefaultLiteral::ColorBlack => "Color::black()".into(),
        DefaultLiteral::ColorWhite => "Color::white()".into(),
        DefaultLiteral::Color(rgba) => {
            let parts: Vec<_> = rgba.iter().map(|c| number_literal(*c)).collect();
            format!("{{ {} }}", parts.join(", "))
        }
        DefaultLiteral::Array { elements, fixed } => {
            let parts: Vec<_> = elements.iter().map(default_literal).collect();
            if *fixed {
                format!("{{{{{}}}}}", parts.join(", "))
            } else {
                format!("{{{}}}", parts.join(", "))
            }
        }
        DefaultLiteral::Raw(value) => value.to_string(),
    }
}

/// Container base type of a property (`DataDrivenPaintProperty<Color, ...>`).
pub fn container_type(property: &PropertyIr) -> String {
    let ty = evaluated_type(&property.evaluated);
    match property.container {
        ContainerKind::LayoutProperty => format!("LayoutProperty<{ty}>"),
        ContainerKind::DataDrivenLayoutProperty => format!("DataDrivenLayoutProperty<{ty}>"),
        ContainerKind::PaintProperty => format!("PaintProperty<{ty}>"),
        ContainerKind::CrossFadedPaintProperty => format!("CrossFadedPaintProperty<{ty}>"),
        ContainerKind::LightProperty => format!("LightProperty<{ty}>"),
        ContainerKind::DataDrivenPaintProperty { overridable } => {
            let mut params = vec![ty];
            for binding in &property.bindings {
                params.push(format!("attributes::{}", binding.name));
                params.push(format!("uniforms::{}", binding.name));
            }
            if overridable {
                params.push("true".into());
            }
            format!("DataDrivenPaintProperty<{}>", params.join(", "))
        }
    }
}

/// Public value type of a property (`PropertyValue<float>`).
pub fn value_type(property: &PropertyIr) -> String {
    match property.wrapper {
        ValueWrapper::ColorRamp => "ColorRampPropertyValue".into(),
        ValueWrapper::PropertyValue => {
            format!("PropertyValue<{}>", evaluated_type(&property.evaluated))
        }
    }
}
