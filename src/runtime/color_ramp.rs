//! Color ramp properties (`heatmap-color`, `line-gradient`).

use serde_json::Value as Json;

use super::expression::{EvaluationContext, Expression};
use crate::color::Color;
use crate::error::ExpressionError;

/// Number of entries in an evaluated ramp texture.
pub const RAMP_SIZE: usize = 256;

/// Ramp expression over `heatmap-density` or `line-progress`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColorRampPropertyValue {
    expression: Option<Expression>,
}

impl ColorRampPropertyValue {
    pub fn from_json(json: &Json) -> Result<Self, ExpressionError> {
        if json.is_null() {
            return Ok(Self::default());
        }
        if !Expression::is_expression(json) {
            return Err(ExpressionError::Invalid {
                op: "color-ramp".into(),
                reason: "color ramps must be expressions".into(),
            });
        }
        Ok(Self {
            expression: Some(Expression::parse(json)?),
        })
    }

    pub fn is_undefined(&self) -> bool {
        self.expression.is_none()
    }

    pub fn expression(&self) -> Option<&Expression> {
        self.expression.as_ref()
    }

    /// RGBA8 ramp sampled at `i / RAMP_SIZE`. Entries that fail to evaluate are transparent.
    pub fn evaluate(&self) -> Vec<[u8; 4]> {
        let Some(expression) = &self.expression else {
            return vec![[0; 4]; RAMP_SIZE];
        };
        (0..RAMP_SIZE)
            .map(|i| {
                let ctx = EvaluationContext::default().with_ramp_input(i as f64 / RAMP_SIZE as f64);
                let color = expression
                    .evaluate(&ctx)
                    .ok()
                    .and_then(|v| v.as_color())
                    .unwrap_or(Color::transparent());
                color.to_array().map(|c| (c.clamp(0.0, 1.0) * 255.0).floor() as u8)
            })
            .collect()
    }
}
