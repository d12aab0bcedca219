//! Property evaluators.
//!
//! Plain properties evaluate to a value at the current zoom. Data-driven
//! properties evaluate to [`PossiblyEvaluated`], keeping feature-dependent
//! expressions for per-feature evaluation at bucket build time. Cross-faded
//! properties evaluate to a [`Faded`] pair chosen from the zoom history.

use serde_json::{Map, Value as Json};
use std::time::Duration;

use super::crossfade::{CrossfadeParameters, DEFAULT_FADE_DURATION, ZoomHistory};
use super::expression::EvaluationContext;
use super::value::{FromValue, PropertyExpression, PropertyValue};

#[derive(Debug, Clone, Copy)]
pub struct PropertyEvaluationParameters {
    pub z: f64,
    pub now: Duration,
    pub zoom_history: ZoomHistory,
    pub default_fade_duration: Duration,
}

impl PropertyEvaluationParameters {
    /// Parameters for a bare zoom, with no fade in progress.
    pub fn at_zoom(z: f64) -> Self {
        let mut zoom_history = ZoomHistory::new();
        zoom_history.update(z, Duration::ZERO);
        Self {
            z,
            now: Duration::ZERO,
            zoom_history,
            default_fade_duration: DEFAULT_FADE_DURATION,
        }
    }

    pub fn crossfade_parameters(&self) -> CrossfadeParameters {
        CrossfadeParameters::new(self.z, self.now, &self.zoom_history, self.default_fade_duration)
    }
}

/// Evaluated value of a data-driven property.
#[derive(Debug, Clone, PartialEq)]
pub enum PossiblyEvaluated<T> {
    Constant(T),
    Expression(PropertyExpression<T>),
}

impl<T: FromValue + Clone> PossiblyEvaluated<T> {
    pub fn constant(&self) -> Option<&T> {
        match self {
            PossiblyEvaluated::Constant(value) => Some(value),
            PossiblyEvaluated::Expression(_) => None,
        }
    }

    /// Value for one feature at `zoom`.
    pub fn evaluate(&self, feature: &Map<String, Json>, zoom: f64, default: &T) -> T {
        match self {
            PossiblyEvaluated::Constant(value) => value.clone(),
            PossiblyEvaluated::Expression(expression) => {
                let ctx = EvaluationContext::at_zoom(zoom).with_feature(feature);
                expression.evaluate(&ctx, default)
            }
        }
    }
}

pub struct PropertyEvaluator<'a, T> {
    parameters: &'a PropertyEvaluationParameters,
    default: T,
}

impl<'a, T: FromValue + Clone> PropertyEvaluator<'a, T> {
    pub fn new(parameters: &'a PropertyEvaluationParameters, default: T) -> Self {
        Self { parameters, default }
    }

    pub fn evaluate(&self, value: &PropertyValue<T>) -> T {
        match value {
            PropertyValue::Undefined => self.default.clone(),
            PropertyValue::Constant(constant) => constant.clone(),
            PropertyValue::Expression(expression) => {
                expression.evaluate(&EvaluationContext::at_zoom(self.parameters.z), &self.default)
            }
        }
    }
}

pub struct DataDrivenPropertyEvaluator<'a, T> {
    parameters: &'a PropertyEvaluationParameters,
    default: T,
}

impl<'a, T: FromValue + Clone> DataDrivenPropertyEvaluator<'a, T> {
    pub fn new(parameters: &'a PropertyEvaluationParameters, default: T) -> Self {
        Self { parameters, default }
    }

    /// Feature-constant expressions collapse to a constant here.
    pub fn evaluate(&self, value: &PropertyValue<T>) -> PossiblyEvaluated<T> {
        match value {
            PropertyValue::Undefined => PossiblyEvaluated::Constant(self.default.clone()),
            PropertyValue::Constant(constant) => PossiblyEvaluated::Constant(constant.clone()),
            PropertyValue::Expression(expression) if expression.is_feature_constant() => {
                let ctx = EvaluationContext::at_zoom(self.parameters.z);
                PossiblyEvaluated::Constant(expression.evaluate(&ctx, &self.default))
            }
            PropertyValue::Expression(expression) => PossiblyEvaluated::Expression(expression.clone()),
        }
    }
}

/// Pair of values a cross-faded property blends between.
#[derive(Debug, Clone, PartialEq)]
pub struct Faded<T> {
    pub from: T,
    pub to: T,
}

pub struct CrossFadedPropertyEvaluator<'a, T> {
    parameters: &'a PropertyEvaluationParameters,
    default: T,
}

impl<'a, T: FromValue + Clone> CrossFadedPropertyEvaluator<'a, T> {
    pub fn new(parameters: &'a PropertyEvaluationParameters, default: T) -> Self {
        Self { parameters, default }
    }

    pub fn evaluate(&self, value: &PropertyValue<T>) -> Faded<T> {
        match value {
            PropertyValue::Undefined => self.calculate(self.default.clone(), self.default.clone(), self.default.clone()),
            PropertyValue::Constant(constant) => {
                self.calculate(constant.clone(), constant.clone(), constant.clone())
            }
            PropertyValue::Expression(expression) => {
                let z = self.parameters.z;
                let at = |zoom: f64| expression.evaluate(&EvaluationContext::at_zoom(zoom), &self.default);
                self.calculate(at(z - 1.0), at(z), at(z + 1.0))
            }
        }
    }

    fn calculate(&self, min: T, mid: T, max: T) -> Faded<T> {
        let z = self.parameters.z;
        if z > self.parameters.zoom_history.last_integer_zoom {
            Faded { from: min, to: mid }
        } else {
            Faded { from: max, to: mid }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::expression::Expression;
    use serde_json::json;

    fn parse<T: FromValue + crate::runtime::Interpolate>(json: Json) -> PropertyValue<T> {
        PropertyValue::from_json(&json).unwrap()
    }

    #[test]
    fn test_constant_and_zoom_evaluation() {
        let params = PropertyEvaluationParameters::at_zoom(5.0);
        let evaluator = PropertyEvaluator::new(&params, 1.0f32);
        assert_eq!(evaluator.evaluate(&PropertyValue::Undefined), 1.0);
        assert_eq!(evaluator.evaluate(&PropertyValue::Constant(3.0)), 3.0);
        let curve = parse::<f32>(json!(["interpolate", ["linear"], ["zoom"], 0, 0, 10, 10]));
        assert_eq!(evaluator.evaluate(&curve), 5.0);

        // Evaluation failure falls back to the default
        let bad = parse::<f32>(json!(["get", "width"]));
        assert_eq!(evaluator.evaluate(&bad), 1.0);
    }

    #[test]
    fn test_data_driven_evaluation() {
        let params = PropertyEvaluationParameters::at_zoom(2.0);
        let evaluator = DataDrivenPropertyEvaluator::new(&params, 0.0f32);

        let zoom_only = parse::<f32>(json!(["*", 2, ["zoom"]]));
        assert_eq!(evaluator.evaluate(&zoom_only), PossiblyEvaluated::Constant(4.0));

        let feature_value = parse::<f32>(json!(["get", "width"]));
        let evaluated = evaluator.evaluate(&feature_value);
        assert!(evaluated.constant().is_none());

        let feature = json!({ "width": 7 }).as_object().cloned().unwrap();
        assert_eq!(evaluated.evaluate(&feature, 2.0, &0.0), 7.0);
        assert_eq!(evaluated.evaluate(&Map::new(), 2.0, &0.5), 0.5);
    }

    #[test]
    fn test_cross_faded_selection() {
        let step = PropertyValue::Expression(PropertyExpression::new(
            Expression::parse(&json!(["step", ["zoom"], "a", 5, "b", 6, "c"])).unwrap(),
        ));

        // Zoomed in past the last integer zoom: from z-1, to z
        let mut params = PropertyEvaluationParameters::at_zoom(5.0);
        params.z = 5.5;
        let evaluator = CrossFadedPropertyEvaluator::new(&params, String::new());
        assert_eq!(evaluator.evaluate(&step), Faded { from: "a".to_string(), to: "b".to_string() });

        // Zoomed out onto the last integer zoom: from z+1, to z
        let mut params = PropertyEvaluationParameters::at_zoom(6.0);
        params.z = 5.0;
        params.zoom_history.update(5.0, Duration::from_millis(10));
        let evaluator = CrossFadedPropertyEvaluator::new(&params, String::new());
        assert_eq!(params.zoom_history.last_integer_zoom, 6.0);
        assert_eq!(evaluator.evaluate(&step), Faded { from: "c".to_string(), to: "b".to_string() });
    }

    #[test]
    fn test_cross_faded_constant() {
        let params = PropertyEvaluationParameters::at_zoom(3.0);
        let evaluator = CrossFadedPropertyEvaluator::new(&params, String::new());
        let faded = evaluator.evaluate(&PropertyValue::Constant("dash".to_string()));
        assert_eq!(faded.from, faded.to);
        assert_eq!(params.crossfade_parameters().t, 1.0);
    }
}
