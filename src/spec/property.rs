//! Property spec entries.
//!
//! One `PropertySpec` per layout/paint/light property. Array properties carry
//! their element type in `element`; `element_spec()` rebuilds the element as a
//! property of the same shape so the type mapper and default synthesizer can
//! recurse over it.

use serde::Deserialize;
use serde_json::Value;

use crate::error::TypeError;

/// Declared value type of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Boolean,
    Number,
    Enum,
    String,
    Color,
    Formatted,
    ResolvedImage,
    Image,
    Array,
}

impl ValueType {
    /// Map a spec type tag to a value type.
    ///
    /// Unknown tags are a hard error: they mean the spec grew a type the
    /// generator does not know how to represent.
    pub fn from_tag(property: &str, tag: &str) -> Result<Self, TypeError> {
        Ok(match tag {
            "boolean" => ValueType::Boolean,
            "number" => ValueType::Number,
            "enum" => ValueType::Enum,
            "string" => ValueType::String,
            "color" => ValueType::Color,
            "formatted" => ValueType::Formatted,
            "resolvedImage" => ValueType::ResolvedImage,
            "image" => ValueType::Image,
            "array" => ValueType::Array,
            _ => {
                return Err(TypeError::UnknownType {
                    property: property.to_string(),
                    tag: tag.to_string(),
                })
            }
        })
    }

    /// Spec tag of this type (inverse of `from_tag`).
    pub fn tag(self) -> &'static str {
        match self {
            ValueType::Boolean => "boolean",
            ValueType::Number => "number",
            ValueType::Enum => "enum",
            ValueType::String => "string",
            ValueType::Color => "color",
            ValueType::Formatted => "formatted",
            ValueType::ResolvedImage => "resolvedImage",
            ValueType::Image => "image",
            ValueType::Array => "array",
        }
    }
}

/// Property-type classification (`property-type` in the spec).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PropertyKind {
    #[default]
    Constant,
    DataConstant,
    DataDriven,
    CrossFaded,
    CrossFadedDataDriven,
    ColorRamp,
}

impl PropertyKind {
    pub fn from_tag(property: &str, tag: &str) -> Result<Self, TypeError> {
        Ok(match tag {
            "constant" => PropertyKind::Constant,
            "data-constant" => PropertyKind::DataConstant,
            "data-driven" => PropertyKind::DataDriven,
            "cross-faded" => PropertyKind::CrossFaded,
            "cross-faded-data-driven" => PropertyKind::CrossFadedDataDriven,
            "color-ramp" => PropertyKind::ColorRamp,
            _ => {
                return Err(TypeError::UnknownPropertyType {
                    property: property.to_string(),
                    tag: tag.to_string(),
                })
            }
        })
    }

    /// Varies per feature and needs a GPU binding.
    pub fn is_data_driven(self) -> bool {
        matches!(self, PropertyKind::DataDriven | PropertyKind::CrossFadedDataDriven)
    }

    /// Blends between two pattern states during a zoom transition.
    pub fn is_cross_faded(self) -> bool {
        matches!(self, PropertyKind::CrossFaded | PropertyKind::CrossFadedDataDriven)
    }
}

/// A single property of a layer (or of the light).
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySpec {
    /// Kebab-case style name, e.g. `fill-color`
    pub name: String,
    pub value_type: ValueType,
    pub kind: PropertyKind,
    /// Raw JSON default, absent for properties without one
    pub default: Option<Value>,
    pub units: Option<String>,
    pub period: Option<f64>,
    /// Element type, array properties only
    pub element: Option<ValueType>,
    /// Fixed array length
    pub length: Option<usize>,
    /// Rendered as the accessor comment of the public layer class
    pub doc: Option<String>,
    /// Enum members; an enum default must be one of them
    pub values: Vec<String>,
}

impl PropertySpec {
    pub fn new(name: impl Into<String>, value_type: ValueType, kind: PropertyKind) -> Self {
        Self {
            name: name.into(),
            value_type,
            kind,
            default: None,
            units: None,
            period: None,
            element: None,
            length: None,
            doc: None,
            values: Vec::new(),
        }
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    pub fn with_period(mut self, period: f64) -> Self {
        self.period = Some(period);
        self
    }

    pub fn with_element(mut self, element: ValueType, length: Option<usize>) -> Self {
        self.element = Some(element);
        self.length = length;
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Element of an array property, as a property named after its parent.
    pub fn element_spec(&self) -> Result<PropertySpec, TypeError> {
        let element = self
            .element
            .ok_or_else(|| TypeError::MissingElementType(self.name.clone()))?;
        let mut spec = PropertySpec::new(self.name.clone(), element, self.kind);
        spec.values = self.values.clone();
        Ok(spec)
    }

    pub fn is_data_driven(&self) -> bool {
        self.kind.is_data_driven()
    }
}

// ============================================================================
// Raw JSON shape
// ============================================================================

/// Property entry exactly as it appears in the spec document.
#[derive(Debug, Deserialize)]
pub(crate) struct RawProperty {
    #[serde(rename = "type")]
    value_type: String,
    #[serde(rename = "property-type", default)]
    property_type: Option<String>,
    #[serde(default)]
    default: Option<Value>,
    #[serde(default)]
    units: Option<String>,
    #[serde(default)]
    period: Option<f64>,
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    length: Option<usize>,
    #[serde(default)]
    doc: Option<String>,
    #[serde(default)]
    values: Option<Value>,
}

impl RawProperty {
    pub(crate) fn into_spec(self, name: String) -> Result<PropertySpec, TypeError> {
        let value_type = ValueType::from_tag(&name, &self.value_type)?;
        let kind = match self.property_type.as_deref() {
            Some(tag) => PropertyKind::from_tag(&name, tag)?,
            None => PropertyKind::Constant,
        };
        let element = self
            .value
            .as_deref()
            .map(|tag| ValueType::from_tag(&name, tag))
            .transpose()?;

        // `values` is an object keyed by member in v8, a plain list in older specs
        let values = match self.values {
            Some(Value::Object(map)) => map.keys().cloned().collect(),
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        };

        Ok(PropertySpec {
            name,
            value_type,
            kind,
            default: self.default,
            units: self.units,
            period: self.period,
            element,
            length: self.length,
            doc: self.doc,
            values,
        })
    }
}
