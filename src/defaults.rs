//! Default-value synthesizer.
//!
//! Produces one `DefaultLiteral` per property. The literal is target-neutral;
//! `codegen::cpp` renders it into source text.

use serde_json::Value;

use crate::color::{parse_css_color, premultiplied};
use crate::error::TypeError;
use crate::spec::{PropertyKind, PropertySpec, ValueType};
use crate::types::{EvaluatedType, TypeMapper};

/// Properties whose default is pinned regardless of the spec document.
const FIXED_DEFAULTS: &[(&str, FixedDefault)] = &[
    // Runtime join code expects exactly 1
    ("line-round-limit", FixedDefault::One),
    // Absent outline color means "use fill-color"
    ("fill-outline-color", FixedDefault::Empty),
];

#[derive(Debug, Clone, Copy)]
enum FixedDefault {
    One,
    Empty,
}

/// Canonical default of one property.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultLiteral {
    /// Zero-value construction (`{}`)
    Empty,
    /// Single-precision literal, always with a fractional marker
    Float(f64),
    /// Any other numeric literal
    Number(f64),
    /// Wrapped string literal (`{"..."}`)
    Str(String),
    /// Enum member; `member` is `Undefined` when the spec has no default
    Enum { ty: EvaluatedType, member: String },
    ColorBlack,
    ColorWhite,
    /// Premultiplied RGBA
    Color([f64; 4]),
    Array {
        elements: Vec<DefaultLiteral>,
        fixed: bool,
    },
    /// Spec default passed through unmodified (boolean, image)
    Raw(Value),
}

impl DefaultLiteral {
    pub fn is_empty(&self) -> bool {
        matches!(self, DefaultLiteral::Empty)
    }
}

/// Synthesize the default literal of `property`.
pub fn default_value(mapper: &TypeMapper, property: &PropertySpec) -> Result<DefaultLiteral, TypeError> {
    if let Some((_, fixed)) = FIXED_DEFAULTS.iter().find(|(n, _)| *n == property.name) {
        return Ok(match fixed {
            FixedDefault::One => DefaultLiteral::Number(1.0),
            FixedDefault::Empty => DefaultLiteral::Empty,
        });
    }
    if property.kind == PropertyKind::ColorRamp {
        return Ok(DefaultLiteral::Empty);
    }

    let default = property.default.as_ref();
    match property.value_type {
        ValueType::Number => {
            let number = match default {
                None => 0.0,
                Some(v) => v.as_f64().ok_or_else(|| invalid_default(property, v))?,
            };
            if mapper.evaluated_type(property)?.is_float() {
                Ok(DefaultLiteral::Float(number))
            } else {
                Ok(DefaultLiteral::Number(number))
            }
        }
        // An empty string default is the same as no default
        ValueType::String | ValueType::Formatted | ValueType::ResolvedImage => match default {
            None => Ok(DefaultLiteral::Empty),
            Some(Value::String(s)) if s.is_empty() => Ok(DefaultLiteral::Empty),
            Some(Value::String(s)) => Ok(DefaultLiteral::Str(s.clone())),
            Some(v) => Err(invalid_default(property, v)),
        },
        ValueType::Enum => {
            let ty = mapper.evaluated_type(property)?;
            let member = match default {
                None => "Undefined".to_string(),
                Some(Value::String(s)) if property.values.is_empty() || property.values.contains(s) => {
                    crate::types::camelize(s)
                }
                Some(v) => return Err(invalid_default(property, v)),
            };
            Ok(DefaultLiteral::Enum { ty, member })
        }
        ValueType::Color => match default {
            None => Ok(DefaultLiteral::Empty),
            Some(v) => color_literal(property, v),
        },
        ValueType::Array => {
            let items = match default {
                None => &[][..],
                Some(Value::Array(items)) => items.as_slice(),
                Some(v) => return Err(invalid_default(property, v)),
            };
            let element = property.element_spec()?;
            let float_elements = mapper.element_evaluated_type(property)?.is_float();
            let elements = items
                .iter()
                .map(|item| match (element.value_type, item.as_f64()) {
                    (ValueType::Number, Some(n)) if float_elements => Ok(DefaultLiteral::Float(n)),
                    _ => default_value(mapper, &element.clone().with_default(item.clone())),
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(DefaultLiteral::Array {
                elements,
                fixed: property.length.is_some(),
            })
        }
        // Not special-cased: the spec default goes through as written
        ValueType::Boolean | ValueType::Image => Ok(match default {
            None => DefaultLiteral::Empty,
            Some(v) => DefaultLiteral::Raw(v.clone()),
        }),
    }
}

fn color_literal(property: &PropertySpec, value: &Value) -> Result<DefaultLiteral, TypeError> {
    let parsed = value.as_str().and_then(parse_css_color).ok_or_else(|| TypeError::InvalidColor {
        property: property.name.clone(),
        value: value.to_string(),
    })?;
    Ok(match premultiplied(parsed) {
        [r, g, b, a] if r == 0.0 && g == 0.0 && b == 0.0 && a == 0.0 => DefaultLiteral::Empty,
        [r, g, b, a] if r == 0.0 && g == 0.0 && b == 0.0 && a == 1.0 => DefaultLiteral::ColorBlack,
        [r, g, b, a] if r == 1.0 && g == 1.0 && b == 1.0 && a == 1.0 => DefaultLiteral::ColorWhite,
        rgba => DefaultLiteral::Color(rgba),
    })
}

fn invalid_default(property: &PropertySpec, value: &Value) -> TypeError {
    TypeError::InvalidDefault {
        property: property.name.clone(),
        tag: property.value_type.tag(),
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn prop(name: &str, ty: ValueType) -> PropertySpec {
        PropertySpec::new(name, ty, PropertyKind::DataDriven)
    }

    fn layer_default(property: &PropertySpec) -> DefaultLiteral {
        default_value(&TypeMapper::layers(), property).unwrap()
    }

    #[test]
    fn test_float_numbers_get_fractional_literal() {
        let opacity = prop("fill-opacity", ValueType::Number).with_default(json!(1));
        assert_eq!(layer_default(&opacity), DefaultLiteral::Float(1.0));
        let absent = prop("fill-sort-key", ValueType::Number);
        assert_eq!(layer_default(&absent), DefaultLiteral::Float(0.0));
    }

    #[test]
    fn test_non_float_numbers_stay_plain() {
        let bearing = prop("bearing", ValueType::Number)
            .with_period(360.0)
            .with_units("degrees")
            .with_default(json!(0));
        assert_eq!(layer_default(&bearing), DefaultLiteral::Number(0.0));
    }

    #[test]
    fn test_fixed_exceptions() {
        let round = prop("line-round-limit", ValueType::Number).with_default(json!(1.05));
        assert_eq!(layer_default(&round), DefaultLiteral::Number(1.0));
        let outline = prop("fill-outline-color", ValueType::Color).with_default(json!("#ff0000"));
        assert_eq!(layer_default(&outline), DefaultLiteral::Empty);
        let mut ramp = prop("heatmap-color", ValueType::Color).with_default(json!(["interpolate"]));
        ramp.kind = PropertyKind::ColorRamp;
        assert_eq!(layer_default(&ramp), DefaultLiteral::Empty);
    }

    #[test]
    fn test_color_defaults() {
        let color = |v: Value| layer_default(&prop("fill-color", ValueType::Color).with_default(v));
        assert_eq!(color(json!("rgba(0, 0, 0, 0)")), DefaultLiteral::Empty);
        assert_eq!(color(json!("hsla(0, 0%, 0%, 0)")), DefaultLiteral::Empty);
        assert_eq!(color(json!("#000000")), DefaultLiteral::ColorBlack);
        assert_eq!(color(json!("#FFFFFF")), DefaultLiteral::ColorWhite);
        assert_eq!(color(json!("rgba(255, 0, 0, 0.5)")), DefaultLiteral::Color([0.5, 0.0, 0.0, 0.5]));
        assert_eq!(layer_default(&prop("fill-color", ValueType::Color)), DefaultLiteral::Empty);
    }

    #[test]
    fn test_invalid_color_is_fatal() {
        let bad = prop("fill-color", ValueType::Color).with_default(json!("not-a-color"));
        let err = default_value(&TypeMapper::layers(), &bad).unwrap_err();
        assert!(matches!(err, TypeError::InvalidColor { .. }));
    }

    #[test]
    fn test_enum_defaults() {
        let cap = prop("line-cap", ValueType::Enum).with_default(json!("butt"));
        assert_eq!(
            layer_default(&cap),
            DefaultLiteral::Enum {
                ty: EvaluatedType::Enum("LineCapType".into()),
                member: "Butt".into()
            }
        );
        let undefined = prop("text-justify", ValueType::Enum);
        assert!(matches!(
            layer_default(&undefined),
            DefaultLiteral::Enum { member, .. } if member == "Undefined"
        ));
        let anchor = prop("fill-translate-anchor", ValueType::Enum).with_default(json!("map"));
        assert_eq!(
            layer_default(&anchor),
            DefaultLiteral::Enum {
                ty: EvaluatedType::TranslateAnchor,
                member: "Map".into()
            }
        );
    }

    #[test]
    fn test_string_defaults() {
        let field = prop("text-field", ValueType::Formatted).with_default(json!(""));
        assert_eq!(layer_default(&field), DefaultLiteral::Empty);
        let font = prop("text-font-name", ValueType::String).with_default(json!("Open Sans"));
        assert_eq!(layer_default(&font), DefaultLiteral::Str("Open Sans".into()));
        let image = prop("icon-image", ValueType::ResolvedImage);
        assert_eq!(layer_default(&image), DefaultLiteral::Empty);
    }

    #[test]
    fn test_array_defaults_recurse() {
        let translate = prop("fill-translate", ValueType::Array)
            .with_element(ValueType::Number, Some(2))
            .with_default(json!([0, 0]));
        assert_eq!(
            layer_default(&translate),
            DefaultLiteral::Array {
                elements: vec![DefaultLiteral::Float(0.0), DefaultLiteral::Float(0.0)],
                fixed: true
            }
        );
        let fonts = prop("text-font", ValueType::Array)
            .with_element(ValueType::String, None)
            .with_default(json!(["Open Sans Regular"]));
        assert_eq!(
            layer_default(&fonts),
            DefaultLiteral::Array {
                elements: vec![DefaultLiteral::Str("Open Sans Regular".into())],
                fixed: false
            }
        );
        let dashes = prop("line-dasharray", ValueType::Array).with_element(ValueType::Number, None);
        assert_eq!(
            layer_default(&dashes),
            DefaultLiteral::Array { elements: vec![], fixed: false }
        );
    }

    #[test]
    fn test_enum_default_must_be_a_member() {
        let mut cap = prop("line-cap", ValueType::Enum).with_default(json!("triangle"));
        cap.values = vec!["butt".into(), "round".into(), "square".into()];
        assert!(matches!(
            default_value(&TypeMapper::layers(), &cap),
            Err(TypeError::InvalidDefault { .. })
        ));
        cap.default = Some(json!("round"));
        assert!(matches!(layer_default(&cap), DefaultLiteral::Enum { member, .. } if member == "Round"));
    }

    #[test]
    fn test_light_position_elements_are_float() {
        let position = prop("position", ValueType::Array)
            .with_element(ValueType::Number, Some(3))
            .with_default(json!([1.15, 210, 30]));
        let literal = default_value(&TypeMapper::light(), &position).unwrap();
        assert_eq!(
            literal,
            DefaultLiteral::Array {
                elements: vec![
                    DefaultLiteral::Float(1.15),
                    DefaultLiteral::Float(210.0),
                    DefaultLiteral::Float(30.0)
                ],
                fixed: true
            }
        );
    }

    #[test]
    fn test_boolean_passes_through() {
        let antialias = prop("fill-antialias", ValueType::Boolean).with_default(json!(true));
        assert_eq!(layer_default(&antialias), DefaultLiteral::Raw(json!(true)));
    }

    #[test]
    fn test_light_enum_prefix() {
        let anchor = prop("anchor", ValueType::Enum).with_default(json!("viewport"));
        let literal = default_value(&TypeMapper::light(), &anchor).unwrap();
        assert_eq!(
            literal,
            DefaultLiteral::Enum {
                ty: EvaluatedType::Enum("LightAnchorType".into()),
                member: "Viewport".into()
            }
        );
    }
}
