//! Type mapper: spec property -> expression type, evaluated type, container
//! kind, value wrapper and GPU binding names.
//!
//! All lookups are pure. Scope (layer vs. light) is carried by the
//! `TypeMapper` value instead of a global flag, so the same mapper can be
//! shared across threads and passed explicitly into the generator.

use std::fmt;

use crate::error::TypeError;
use crate::spec::{PropertyKind, PropertySpec, ValueType};

/// Paint properties whose data-driven container is parameterized as overridable.
pub const OVERRIDABLE_PROPERTIES: &[&str] = &["text-color"];

/// Properties whose GPU binding name diverges from the style name.
pub const BINDING_NAME_EXCEPTIONS: &[(&str, &[&str])] = &[
    ("text-opacity", &["opacity"]),
    ("icon-opacity", &["opacity"]),
    ("text-color", &["fill_color"]),
    ("icon-color", &["fill_color"]),
    ("text-halo-color", &["halo_color"]),
    ("icon-halo-color", &["halo_color"]),
    ("text-halo-blur", &["halo_blur"]),
    ("icon-halo-blur", &["halo_blur"]),
    ("text-halo-width", &["halo_width"]),
    ("icon-halo-width", &["halo_width"]),
    ("line-gap-width", &["gapwidth"]),
    ("line-pattern", &["pattern_to", "pattern_from"]),
    ("fill-pattern", &["pattern_to", "pattern_from"]),
    ("fill-extrusion-pattern", &["pattern_to", "pattern_from"]),
    ("line-floor-width", &["floorwidth"]),
];

// ============================================================================
// Expression types
// ============================================================================

/// Type of a property as seen by the expression engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExpressionType {
    Boolean,
    Number,
    Image,
    String,
    Color,
    Formatted,
    Array(Box<ExpressionType>),
}

impl fmt::Display for ExpressionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpressionType::Boolean => f.write_str("Boolean"),
            ExpressionType::Number => f.write_str("Number"),
            ExpressionType::Image => f.write_str("Image"),
            ExpressionType::String => f.write_str("String"),
            ExpressionType::Color => f.write_str("Color"),
            ExpressionType::Formatted => f.write_str("Formatted"),
            ExpressionType::Array(element) => write!(f, "Array<{element}>"),
        }
    }
}

// ============================================================================
// Evaluated types
// ============================================================================

/// Concrete runtime value representation of a property.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EvaluatedType {
    Bool,
    /// Single-precision float
    Float,
    /// Double-precision float (`*location` properties)
    Double,
    /// Bearing in degrees, periodic over 360
    Rotation,
    String,
    Color,
    Formatted,
    Image,
    TranslateAnchor,
    Alignment,
    SymbolAnchor,
    Position,
    /// Per-layer (or light) enum type, e.g. `LineCapType`
    Enum(String),
    Array {
        element: Box<EvaluatedType>,
        /// Fixed size when set, variable-length otherwise
        length: Option<usize>,
    },
}

impl EvaluatedType {
    pub fn is_float(&self) -> bool {
        matches!(self, EvaluatedType::Float)
    }
}

/// Which naming branch a property belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PropertyScope {
    #[default]
    Layer,
    Light,
}

// ============================================================================
// Containers
// ============================================================================

/// Property container template a generated property derives from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    LayoutProperty,
    DataDrivenLayoutProperty,
    PaintProperty,
    DataDrivenPaintProperty { overridable: bool },
    CrossFadedPaintProperty,
    LightProperty,
}

/// Wrapper type the public accessors traffic in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueWrapper {
    /// `PropertyValue<T>`
    PropertyValue,
    /// `ColorRampPropertyValue`
    ColorRamp,
}

/// One GPU attribute/uniform pair. Both sides share the same base name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Binding {
    pub name: String,
}

impl Binding {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// GLSL attribute name (`a_<name>`)
    pub fn attribute(&self) -> String {
        format!("a_{}", self.name)
    }

    /// GLSL uniform name (`u_<name>`)
    pub fn uniform(&self) -> String {
        format!("u_{}", self.name)
    }
}

// ============================================================================
// Mapper
// ============================================================================

/// Stateless lookup object, one per scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TypeMapper {
    scope: PropertyScope,
}

impl TypeMapper {
    pub const fn new(scope: PropertyScope) -> Self {
        Self { scope }
    }

    pub const fn layers() -> Self {
        Self::new(PropertyScope::Layer)
    }

    pub const fn light() -> Self {
        Self::new(PropertyScope::Light)
    }

    pub fn scope(&self) -> PropertyScope {
        self.scope
    }

    /// Map a property to its expression type.
    pub fn expression_type(&self, property: &PropertySpec) -> Result<ExpressionType, TypeError> {
        Ok(match property.value_type {
            ValueType::Boolean => ExpressionType::Boolean,
            ValueType::Number | ValueType::Enum => ExpressionType::Number,
            ValueType::Image | ValueType::ResolvedImage => ExpressionType::Image,
            ValueType::String => ExpressionType::String,
            ValueType::Color => ExpressionType::Color,
            ValueType::Formatted => ExpressionType::Formatted,
            ValueType::Array => {
                let element = property.element_spec()?;
                ExpressionType::Array(Box::new(self.expression_type(&element)?))
            }
        })
    }

    /// Map a property to its runtime value representation.
    ///
    /// Name-based overrides are checked before the declared type.
    pub fn evaluated_type(&self, property: &PropertySpec) -> Result<EvaluatedType, TypeError> {
        let name = property.name.as_str();

        if name.ends_with("-translate-anchor") {
            return Ok(EvaluatedType::TranslateAnchor);
        }
        if name.ends_with("-rotation-alignment")
            || name.ends_with("-pitch-alignment")
            || name.ends_with("-illumination-alignment")
        {
            return Ok(EvaluatedType::Alignment);
        }
        if name == "text-anchor" || name == "icon-anchor" {
            return Ok(EvaluatedType::SymbolAnchor);
        }
        if name.contains("position") {
            return Ok(EvaluatedType::Position);
        }

        Ok(match property.value_type {
            ValueType::Boolean => EvaluatedType::Bool,
            ValueType::Number => {
                if is_rotation(property) {
                    EvaluatedType::Rotation
                } else if name.ends_with("location") {
                    EvaluatedType::Double
                } else {
                    EvaluatedType::Float
                }
            }
            ValueType::ResolvedImage => EvaluatedType::Image,
            ValueType::Formatted => EvaluatedType::Formatted,
            ValueType::String => EvaluatedType::String,
            ValueType::Enum => EvaluatedType::Enum(self.enum_type_name(name)),
            ValueType::Color => EvaluatedType::Color,
            ValueType::Array => EvaluatedType::Array {
                element: Box::new(self.element_evaluated_type(property)?),
                length: property.length,
            },
            ValueType::Image => {
                return Err(TypeError::NoEvaluatedType {
                    property: property.name.clone(),
                    tag: ValueType::Image.tag(),
                })
            }
        })
    }

    /// Evaluated type of an array property's elements.
    ///
    /// Numeric elements are always `float`: the parent's name overrides
    /// (`position`, `*location`) describe the whole array, not its items.
    /// Other elements keep the parent name, so enum arrays resolve to the
    /// parent's enum type.
    pub fn element_evaluated_type(&self, array: &PropertySpec) -> Result<EvaluatedType, TypeError> {
        let element = array.element_spec()?;
        match element.value_type {
            ValueType::Number => Ok(EvaluatedType::Float),
            _ => self.evaluated_type(&element),
        }
    }

    /// Enum type name for a property (`line-cap` -> `LineCapType`, light `anchor` -> `LightAnchorType`).
    pub fn enum_type_name(&self, name: &str) -> String {
        let prefix = match self.scope {
            PropertyScope::Light => "Light",
            PropertyScope::Layer => "",
        };
        format!("{prefix}{}Type", camelize(name))
    }

    pub fn layout_container(&self, property: &PropertySpec) -> ContainerKind {
        if self.scope == PropertyScope::Light {
            return ContainerKind::LightProperty;
        }
        match property.kind {
            PropertyKind::DataDriven | PropertyKind::CrossFadedDataDriven => {
                ContainerKind::DataDrivenLayoutProperty
            }
            _ => ContainerKind::LayoutProperty,
        }
    }

    pub fn paint_container(&self, property: &PropertySpec) -> ContainerKind {
        if self.scope == PropertyScope::Light {
            return ContainerKind::LightProperty;
        }
        match property.kind {
            PropertyKind::DataDriven | PropertyKind::CrossFadedDataDriven => {
                ContainerKind::DataDrivenPaintProperty {
                    overridable: is_overridable(property),
                }
            }
            PropertyKind::CrossFaded => ContainerKind::CrossFadedPaintProperty,
            _ => ContainerKind::PaintProperty,
        }
    }

    pub fn value_wrapper(&self, property: &PropertySpec) -> ValueWrapper {
        match property.kind {
            PropertyKind::ColorRamp => ValueWrapper::ColorRamp,
            _ => ValueWrapper::PropertyValue,
        }
    }

    /// GPU binding names for a paint property of `layer_type`.
    ///
    /// The exception table wins; otherwise the first `<layer_type>-` is
    /// stripped and the remaining separators become underscores.
    pub fn bindings(&self, property: &PropertySpec, layer_type: &str) -> Vec<Binding> {
        if let Some((_, names)) = BINDING_NAME_EXCEPTIONS
            .iter()
            .find(|(name, _)| *name == property.name)
        {
            return names.iter().map(|n| Binding::new(*n)).collect();
        }
        let stripped = property.name.replacen(&format!("{layer_type}-"), "", 1);
        vec![Binding::new(stripped.replace('-', "_"))]
    }
}

fn is_rotation(property: &PropertySpec) -> bool {
    property.name.ends_with("bearing")
        && property.period == Some(360.0)
        && property.units.as_deref() == Some("degrees")
}

pub fn is_overridable(property: &PropertySpec) -> bool {
    OVERRIDABLE_PROPERTIES.contains(&property.name.as_str())
}

/// Upper-camel-case a kebab-case name (`fill-extrusion` -> `FillExtrusion`).
pub fn camelize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = true;
    for c in name.chars() {
        if c == '-' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Lower-camel-case a kebab-case name (`fill-color` -> `fillColor`).
pub fn camelize_lower(name: &str) -> String {
    let camel = camelize(name);
    let mut chars = camel.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => camel,
    }
}
