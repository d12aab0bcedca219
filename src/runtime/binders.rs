//! Paint property binders: how an evaluated data-driven property reaches the GPU.
//!
//! - constant value -> uniform `u_<name>`
//! - feature-dependent, zoom-constant -> attribute `a_<name>` (source)
//! - feature- and zoom-dependent -> attribute holding the values at the tile
//!   zoom and the zoom above, blended by `u_<name>_t` (composite)

use serde_json::{Map, Value as Json};

use super::evaluate::PossiblyEvaluated;
use super::expression::EvaluationContext;
use super::value::{FromValue, PropertyExpression};
use crate::color::Color;
use crate::types::Binding;

/// Two 8-bit values packed into one float attribute component.
pub fn pack_uint8_pair(a: f32, b: f32) -> f32 {
    a.floor() * 256.0 + b.floor()
}

/// Vertex attribute encoding of a property type.
pub trait AttributeValue {
    /// Components for one value.
    const COMPONENTS: usize;

    fn push_components(&self, out: &mut Vec<f32>);
}

impl AttributeValue for f32 {
    const COMPONENTS: usize = 1;

    fn push_components(&self, out: &mut Vec<f32>) {
        out.push(*self);
    }
}

impl AttributeValue for Color {
    const COMPONENTS: usize = 2;

    fn push_components(&self, out: &mut Vec<f32>) {
        out.push(pack_uint8_pair(self.r * 255.0, self.g * 255.0));
        out.push(pack_uint8_pair(self.b * 255.0, self.a * 255.0));
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PaintPropertyBinder<T> {
    Constant(T),
    Source {
        expression: PropertyExpression<T>,
        default: T,
        vertices: Vec<f32>,
    },
    Composite {
        expression: PropertyExpression<T>,
        default: T,
        zoom_range: (f64, f64),
        vertices: Vec<f32>,
    },
}

impl<T: FromValue + AttributeValue + Clone> PaintPropertyBinder<T> {
    pub fn create(value: &PossiblyEvaluated<T>, default: T, tile_zoom: f64) -> Self {
        match value {
            PossiblyEvaluated::Constant(constant) => PaintPropertyBinder::Constant(constant.clone()),
            PossiblyEvaluated::Expression(expression) if expression.is_zoom_constant() => {
                PaintPropertyBinder::Source {
                    expression: expression.clone(),
                    default,
                    vertices: Vec::new(),
                }
            }
            PossiblyEvaluated::Expression(expression) => PaintPropertyBinder::Composite {
                expression: expression.clone(),
                default,
                zoom_range: (tile_zoom, tile_zoom + 1.0),
                vertices: Vec::new(),
            },
        }
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, PaintPropertyBinder::Constant(_))
    }

    /// Float components per vertex.
    pub fn components_per_vertex(&self) -> usize {
        match self {
            PaintPropertyBinder::Constant(_) => 0,
            PaintPropertyBinder::Source { .. } => T::COMPONENTS,
            PaintPropertyBinder::Composite { .. } => T::COMPONENTS * 2,
        }
    }

    /// Append `count` vertices for one feature.
    pub fn populate_vertices(&mut self, feature: &Map<String, Json>, count: usize) {
        match self {
            PaintPropertyBinder::Constant(_) => {}
            PaintPropertyBinder::Source {
                expression,
                default,
                vertices,
            } => {
                let ctx = EvaluationContext::default().with_feature(feature);
                let value = expression.evaluate(&ctx, default);
                let mut packed = Vec::with_capacity(T::COMPONENTS);
                value.push_components(&mut packed);
                for _ in 0..count {
                    vertices.extend_from_slice(&packed);
                }
            }
            PaintPropertyBinder::Composite {
                expression,
                default,
                zoom_range,
                vertices,
            } => {
                let at = |zoom: f64| {
                    let ctx = EvaluationContext::at_zoom(zoom).with_feature(feature);
                    expression.evaluate(&ctx, default)
                };
                let mut packed = Vec::with_capacity(T::COMPONENTS * 2);
                at(zoom_range.0).push_components(&mut packed);
                at(zoom_range.1).push_components(&mut packed);
                for _ in 0..count {
                    vertices.extend_from_slice(&packed);
                }
            }
        }
    }

    pub fn vertices(&self) -> &[f32] {
        match self {
            PaintPropertyBinder::Constant(_) => &[],
            PaintPropertyBinder::Source { vertices, .. } | PaintPropertyBinder::Composite { vertices, .. } => vertices,
        }
    }

    /// `u_<name>_t` for composite binders, clamped to `0..=1`.
    pub fn interpolation_factor(&self, current_zoom: f64) -> f32 {
        match self {
            PaintPropertyBinder::Composite {
                expression,
                zoom_range,
                ..
            } => expression
                .interpolation_factor(*zoom_range, current_zoom)
                .clamp(0.0, 1.0) as f32,
            _ => 0.0,
        }
    }

    /// Uniform value, for constant binders only.
    pub fn uniform_value(&self) -> Option<&T> {
        match self {
            PaintPropertyBinder::Constant(value) => Some(value),
            _ => None,
        }
    }

    /// Shader defines selecting the uniform branch of a binding.
    pub fn defines(&self, binding: &Binding) -> Vec<String> {
        if self.is_constant() {
            vec![format!("#define HAS_UNIFORM_{}", binding.uniform())]
        } else {
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::expression::Expression;
    use serde_json::json;

    fn expression<T: FromValue + Clone>(json: Json) -> PossiblyEvaluated<T> {
        PossiblyEvaluated::Expression(PropertyExpression::new(Expression::parse(&json).unwrap()))
    }

    fn feature(json: Json) -> Map<String, Json> {
        json.as_object().cloned().unwrap()
    }

    #[test]
    fn test_pack_uint8_pair() {
        assert_eq!(pack_uint8_pair(1.0, 2.0), 258.0);
        assert_eq!(pack_uint8_pair(255.9, 255.9), 65535.0);
    }

    #[test]
    fn test_constant_binder_is_uniform() {
        let binder = PaintPropertyBinder::create(&PossiblyEvaluated::Constant(2.0f32), 1.0, 10.0);
        assert!(binder.is_constant());
        assert_eq!(binder.uniform_value(), Some(&2.0));
        assert_eq!(binder.components_per_vertex(), 0);
        assert_eq!(binder.defines(&Binding::new("width")), vec!["#define HAS_UNIFORM_u_width".to_string()]);
    }

    #[test]
    fn test_source_binder_packs_colors() {
        let value = expression::<Color>(json!(["get", "color"]));
        let mut binder = PaintPropertyBinder::create(&value, Color::black(), 10.0);
        assert_eq!(binder.components_per_vertex(), 2);
        assert!(binder.defines(&Binding::new("color")).is_empty());

        binder.populate_vertices(&feature(json!({ "color": "#ff0000" })), 2);
        assert_eq!(binder.vertices(), &[65280.0, 255.0, 65280.0, 255.0]);
    }

    #[test]
    fn test_composite_binder() {
        let value = expression::<f32>(json!([
            "interpolate", ["linear"], ["zoom"], 10, ["get", "w"], 11, ["*", 2, ["get", "w"]]
        ]));
        let mut binder = PaintPropertyBinder::create(&value, 1.0, 10.0);
        assert_eq!(binder.components_per_vertex(), 2);

        binder.populate_vertices(&feature(json!({ "w": 3 })), 1);
        assert_eq!(binder.vertices(), &[3.0, 6.0]);
        assert_eq!(binder.interpolation_factor(10.5), 0.5);
        assert_eq!(binder.interpolation_factor(12.0), 1.0);
        assert_eq!(binder.interpolation_factor(9.0), 0.0);
    }

    #[test]
    fn test_composite_color_has_four_components() {
        let value = expression::<Color>(json!([
            "interpolate", ["linear"], ["zoom"], 0, ["get", "c"], 20, "#000000"
        ]));
        let binder = PaintPropertyBinder::create(&value, Color::black(), 4.0);
        assert_eq!(binder.components_per_vertex(), 4);
    }
}
