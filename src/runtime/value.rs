//! Runtime values and style property values.

use std::fmt;

use serde_json::Value as Json;

use super::expression::{EvaluationContext, Expression};
use super::interpolate::Interpolate;
use crate::color::Color;
use crate::error::ExpressionError;

/// Value produced by expression evaluation.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Color(Color),
    Array(Vec<Value>),
}

impl Value {
    /// Convert a JSON literal. Objects have no expression representation and become null.
    pub fn from_json(json: &Json) -> Self {
        match json {
            Json::Null | Json::Object(_) => Value::Null,
            Json::Bool(b) => Value::Bool(*b),
            Json::Number(n) => n.as_f64().map_or(Value::Null, Value::Number),
            Json::String(s) => Value::String(s.clone()),
            Json::Array(items) => Value::Array(items.iter().map(Value::from_json).collect()),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Color(_) => "color",
            Value::Array(_) => "array",
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Colors are accepted as color values or CSS strings.
    pub fn as_color(&self) -> Option<Color> {
        match self {
            Value::Color(c) => Some(*c),
            Value::String(s) => Color::parse(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => f.write_str(s),
            Value::Color(c) => {
                // Un-premultiply for display
                let [r, g, b, a] = c.to_array();
                let channel = |v: f32| if a == 0.0 { 0.0 } else { (v / a * 255.0).round() };
                write!(f, "rgba({},{},{},{})", channel(r), channel(g), channel(b), a)
            }
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    match item {
                        Value::String(s) => write!(f, "{s:?}")?,
                        other => write!(f, "{other}")?,
                    }
                }
                f.write_str("]")
            }
        }
    }
}

/// Conversion from an evaluated value to a concrete property type.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for f32 {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_f64().map(|n| n as f32)
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_f64()
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl FromValue for Color {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_color()
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Array(items) => items.iter().map(T::from_value).collect(),
            _ => None,
        }
    }
}

impl<const N: usize> FromValue for [f32; N] {
    fn from_value(value: &Value) -> Option<Self> {
        let items: Vec<f32> = Vec::from_value(value)?;
        items.try_into().ok()
    }
}

/// Expression bound to a property type, with an optional per-expression default.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyExpression<T> {
    expression: Expression,
    default: Option<T>,
}

impl<T: FromValue + Clone> PropertyExpression<T> {
    pub fn new(expression: Expression) -> Self {
        Self {
            expression,
            default: None,
        }
    }

    pub fn with_default(mut self, default: T) -> Self {
        self.default = Some(default);
        self
    }

    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    pub fn is_zoom_constant(&self) -> bool {
        self.expression.is_zoom_constant()
    }

    pub fn is_feature_constant(&self) -> bool {
        self.expression.is_feature_constant()
    }

    /// Evaluate, falling back to the expression default and then to `fallback`.
    pub fn evaluate(&self, ctx: &EvaluationContext, fallback: &T) -> T {
        self.expression
            .evaluate(ctx)
            .ok()
            .and_then(|v| T::from_value(&v))
            .or_else(|| self.default.clone())
            .unwrap_or_else(|| fallback.clone())
    }

    /// Curve interpolation factor for `zoom` within `range` (composite binders).
    pub fn interpolation_factor(&self, range: (f64, f64), zoom: f64) -> f64 {
        self.expression.interpolation_factor(range, zoom)
    }
}

/// Value a style assigns to a property.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PropertyValue<T> {
    #[default]
    Undefined,
    Constant(T),
    Expression(PropertyExpression<T>),
}

impl<T: FromValue + Interpolate> PropertyValue<T> {
    /// Parse a style JSON value.
    ///
    /// An array whose head names an operator, or a legacy function object
    /// with `stops`, is an expression. Anything else must convert to `T`.
    pub fn from_json(json: &Json) -> Result<Self, ExpressionError> {
        if json.is_null() {
            return Ok(PropertyValue::Undefined);
        }
        if Expression::is_expression(json) {
            return Ok(PropertyValue::Expression(PropertyExpression::new(Expression::parse(json)?)));
        }
        if let Json::Object(function) = json {
            if function.contains_key("stops") {
                let expression = Expression::from_function(function, T::INTERPOLATES)?;
                return Ok(PropertyValue::Expression(PropertyExpression::new(expression)));
            }
        }
        let value = Value::from_json(json);
        T::from_value(&value)
            .map(PropertyValue::Constant)
            .ok_or(ExpressionError::TypeMismatch {
                expected: std::any::type_name::<T>(),
                found: value.type_name(),
            })
    }
}

impl<T> PropertyValue<T> {
    pub fn is_undefined(&self) -> bool {
        matches!(self, PropertyValue::Undefined)
    }

    pub fn is_expression(&self) -> bool {
        matches!(self, PropertyValue::Expression(_))
    }

    /// Data-driven when the value is an expression reading feature data.
    pub fn is_data_driven(&self) -> bool
    where
        T: FromValue + Clone,
    {
        match self {
            PropertyValue::Expression(e) => !e.is_feature_constant(),
            _ => false,
        }
    }
}
