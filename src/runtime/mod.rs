//! Property evaluation runtime.
//!
//! The types the generated C++ property tables are written against:
//! property values, evaluators, cross-fading, GPU binders and color ramps.

pub mod binders;
pub mod color_ramp;
pub mod crossfade;
pub mod evaluate;
pub mod expression;
pub mod interpolate;
pub mod value;

pub use binders::{AttributeValue, PaintPropertyBinder, pack_uint8_pair};
pub use color_ramp::{ColorRampPropertyValue, RAMP_SIZE};
pub use crossfade::{CrossfadeParameters, DEFAULT_FADE_DURATION, ZoomHistory};
pub use evaluate::{
    CrossFadedPropertyEvaluator, DataDrivenPropertyEvaluator, Faded, PossiblyEvaluated,
    PropertyEvaluationParameters, PropertyEvaluator,
};
pub use expression::{EvaluationContext, Expression};
pub use interpolate::Interpolate;
pub use value::{FromValue, PropertyExpression, PropertyValue, Value};
