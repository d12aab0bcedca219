//! Style expressions.
//!
//! JSON expressions are parsed once into a typed tree and then evaluated per
//! zoom/feature. Supported operators:
//! - data: `literal`, `get`, `has`
//! - inputs: `zoom`, `heatmap-density`, `line-progress`
//! - curves: `interpolate` (linear, exponential), `step`
//! - decisions: `match`, `case`, `coalesce`, `==`, `!=`, `<`, `<=`, `>`, `>=`, `!`, `all`, `any`
//! - math: `+`, `-`, `*`, `/`
//! - types: `to-number`, `to-string`
//!
//! Legacy property functions (`{"stops": ...}`) are converted to the
//! equivalent curve or match expression.

use serde_json::{Map, Value as Json};

use super::interpolate::interpolate_values;
use super::value::Value;
use crate::error::ExpressionError;

const OPERATORS: &[&str] = &[
    "literal",
    "get",
    "has",
    "zoom",
    "heatmap-density",
    "line-progress",
    "interpolate",
    "step",
    "match",
    "case",
    "coalesce",
    "==",
    "!=",
    "<",
    "<=",
    ">",
    ">=",
    "!",
    "all",
    "any",
    "+",
    "-",
    "*",
    "/",
    "to-number",
    "to-string",
];

/// Inputs an expression may read.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvaluationContext<'a> {
    pub zoom: Option<f64>,
    pub feature: Option<&'a Map<String, Json>>,
    /// `heatmap-density` / `line-progress`
    pub ramp_input: Option<f64>,
}

impl<'a> EvaluationContext<'a> {
    pub fn at_zoom(zoom: f64) -> Self {
        Self {
            zoom: Some(zoom),
            ..Self::default()
        }
    }

    pub fn with_feature(mut self, feature: &'a Map<String, Json>) -> Self {
        self.feature = Some(feature);
        self
    }

    pub fn with_ramp_input(mut self, input: f64) -> Self {
        self.ramp_input = Some(input);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Interpolation {
    Linear,
    Exponential(f64),
}

impl Interpolation {
    /// Position of `input` between `lower` and `upper`, in `0..=1` for inputs inside the range.
    pub fn factor(&self, input: f64, lower: f64, upper: f64) -> f64 {
        let difference = upper - lower;
        let progress = input - lower;
        if difference == 0.0 {
            return 0.0;
        }
        match *self {
            Interpolation::Exponential(base) if base != 1.0 => {
                (base.powf(progress) - 1.0) / (base.powf(difference) - 1.0)
            }
            _ => progress / difference,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(Value),
    Get(String),
    Has(String),
    Zoom,
    HeatmapDensity,
    LineProgress,
    Interpolate {
        interpolation: Interpolation,
        input: Box<Expression>,
        stops: Vec<(f64, Expression)>,
    },
    Step {
        input: Box<Expression>,
        first: Box<Expression>,
        stops: Vec<(f64, Expression)>,
    },
    Match {
        input: Box<Expression>,
        branches: Vec<(Vec<Value>, Expression)>,
        fallback: Box<Expression>,
    },
    Case {
        branches: Vec<(Expression, Expression)>,
        fallback: Box<Expression>,
    },
    Coalesce(Vec<Expression>),
    Compare {
        op: CompareOp,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },
    Not(Box<Expression>),
    All(Vec<Expression>),
    Any(Vec<Expression>),
    Arithmetic {
        op: ArithmeticOp,
        args: Vec<Expression>,
    },
    ToNumber(Vec<Expression>),
    ToString(Box<Expression>),
}

fn invalid(op: &str, reason: impl Into<String>) -> ExpressionError {
    ExpressionError::Invalid {
        op: op.to_string(),
        reason: reason.into(),
    }
}

fn mismatch(expected: &'static str, found: &Value) -> ExpressionError {
    ExpressionError::TypeMismatch {
        expected,
        found: found.type_name(),
    }
}

impl Expression {
    pub fn is_operator(name: &str) -> bool {
        OPERATORS.contains(&name)
    }

    /// JSON array whose head is a known operator.
    pub fn is_expression(json: &Json) -> bool {
        json.as_array()
            .and_then(|items| items.first())
            .and_then(Json::as_str)
            .is_some_and(Self::is_operator)
    }

    pub fn parse(json: &Json) -> Result<Self, ExpressionError> {
        let items = match json {
            Json::Array(items) => items,
            Json::Object(_) => return Err(invalid("literal", "bare objects must be wrapped in `literal`")),
            other => return Ok(Expression::Literal(Value::from_json(other))),
        };
        let Some(op) = items.first().and_then(Json::as_str) else {
            // Array literal, e.g. a constant [0, 0] stop output
            return Ok(Expression::Literal(Value::from_json(json)));
        };
        let args = &items[1..];

        match op {
            "literal" => match args {
                [value] => Ok(Expression::Literal(Value::from_json(value))),
                _ => Err(invalid(op, "expects exactly one argument")),
            },
            "get" | "has" => match args {
                [Json::String(key)] if op == "get" => Ok(Expression::Get(key.clone())),
                [Json::String(key)] => Ok(Expression::Has(key.clone())),
                _ => Err(invalid(op, "expects a property name")),
            },
            "zoom" | "heatmap-density" | "line-progress" => {
                if !args.is_empty() {
                    return Err(invalid(op, "takes no arguments"));
                }
                Ok(match op {
                    "zoom" => Expression::Zoom,
                    "heatmap-density" => Expression::HeatmapDensity,
                    _ => Expression::LineProgress,
                })
            }
            "interpolate" => {
                if args.len() < 4 || args.len() % 2 != 0 {
                    return Err(invalid(op, "expects an interpolation, an input and stop pairs"));
                }
                let interpolation = parse_interpolation(&args[0])?;
                let input = Box::new(Self::parse(&args[1])?);
                let stops = parse_stops(op, &args[2..])?;
                Ok(Expression::Interpolate {
                    interpolation,
                    input,
                    stops,
                })
            }
            "step" => {
                if args.len() < 2 || args.len() % 2 != 0 {
                    return Err(invalid(op, "expects an input, a first output and stop pairs"));
                }
                Ok(Expression::Step {
                    input: Box::new(Self::parse(&args[0])?),
                    first: Box::new(Self::parse(&args[1])?),
                    stops: parse_stops(op, &args[2..])?,
                })
            }
            "match" => {
                if args.len() < 4 || args.len() % 2 != 0 {
                    return Err(invalid(op, "expects an input, label/output pairs and a fallback"));
                }
                let input = Box::new(Self::parse(&args[0])?);
                let pairs = &args[1..args.len() - 1];
                let mut branches = Vec::with_capacity(pairs.len() / 2);
                for pair in pairs.chunks(2) {
                    let labels = match &pair[0] {
                        Json::Array(labels) => labels.iter().map(Value::from_json).collect(),
                        label => vec![Value::from_json(label)],
                    };
                    branches.push((labels, Self::parse(&pair[1])?));
                }
                Ok(Expression::Match {
                    input,
                    branches,
                    fallback: Box::new(Self::parse(&args[args.len() - 1])?),
                })
            }
            "case" => {
                if args.len() < 3 || args.len() % 2 != 1 {
                    return Err(invalid(op, "expects condition/output pairs and a fallback"));
                }
                let mut branches = Vec::with_capacity(args.len() / 2);
                for pair in args[..args.len() - 1].chunks(2) {
                    branches.push((Self::parse(&pair[0])?, Self::parse(&pair[1])?));
                }
                Ok(Expression::Case {
                    branches,
                    fallback: Box::new(Self::parse(&args[args.len() - 1])?),
                })
            }
            "coalesce" | "all" | "any" | "to-number" => {
                let parsed = args.iter().map(Self::parse).collect::<Result<Vec<_>, _>>()?;
                if parsed.is_empty() && matches!(op, "coalesce" | "to-number") {
                    return Err(invalid(op, "expects at least one argument"));
                }
                Ok(match op {
                    "coalesce" => Expression::Coalesce(parsed),
                    "all" => Expression::All(parsed),
                    "any" => Expression::Any(parsed),
                    _ => Expression::ToNumber(parsed),
                })
            }
            "==" | "!=" | "<" | "<=" | ">" | ">=" => match args {
                [lhs, rhs] => Ok(Expression::Compare {
                    op: match op {
                        "==" => CompareOp::Eq,
                        "!=" => CompareOp::Ne,
                        "<" => CompareOp::Lt,
                        "<=" => CompareOp::Le,
                        ">" => CompareOp::Gt,
                        _ => CompareOp::Ge,
                    },
                    lhs: Box::new(Self::parse(lhs)?),
                    rhs: Box::new(Self::parse(rhs)?),
                }),
                _ => Err(invalid(op, "expects two arguments")),
            },
            "!" | "to-string" => match args {
                [arg] if op == "!" => Ok(Expression::Not(Box::new(Self::parse(arg)?))),
                [arg] => Ok(Expression::ToString(Box::new(Self::parse(arg)?))),
                _ => Err(invalid(op, "expects one argument")),
            },
            "+" | "-" | "*" | "/" => {
                let (arith, arity_ok) = match op {
                    "+" => (ArithmeticOp::Add, !args.is_empty()),
                    "*" => (ArithmeticOp::Mul, !args.is_empty()),
                    "-" => (ArithmeticOp::Sub, matches!(args.len(), 1 | 2)),
                    _ => (ArithmeticOp::Div, args.len() == 2),
                };
                if !arity_ok {
                    return Err(invalid(op, "wrong number of arguments"));
                }
                Ok(Expression::Arithmetic {
                    op: arith,
                    args: args.iter().map(Self::parse).collect::<Result<_, _>>()?,
                })
            }
            other => Err(ExpressionError::UnknownOperator(other.to_string())),
        }
    }

    /// Convert a legacy `{"stops": ...}` function.
    ///
    /// `interpolates` selects the default function type: exponential for
    /// interpolatable properties, interval otherwise.
    pub fn from_function(function: &Map<String, Json>, interpolates: bool) -> Result<Self, ExpressionError> {
        let stops = function
            .get("stops")
            .and_then(Json::as_array)
            .ok_or_else(|| ExpressionError::UnsupportedFunction("`stops` must be an array".into()))?;
        let input = match function.get("property").and_then(Json::as_str) {
            Some(property) => Expression::Get(property.to_string()),
            None => Expression::Zoom,
        };
        let kind = function
            .get("type")
            .and_then(Json::as_str)
            .unwrap_or(if interpolates { "exponential" } else { "interval" });

        let mut pairs = Vec::with_capacity(stops.len());
        for stop in stops {
            match stop.as_array().map(Vec::as_slice) {
                Some([Json::Object(_), _]) => {
                    return Err(ExpressionError::UnsupportedFunction(
                        "zoom-and-property stops".into(),
                    ));
                }
                Some([key, output]) => pairs.push((key, Expression::Literal(Value::from_json(output)))),
                _ => {
                    return Err(ExpressionError::UnsupportedFunction(
                        "each stop must be a [input, output] pair".into(),
                    ));
                }
            }
        }

        let numeric_stops = |pairs: Vec<(&Json, Expression)>| -> Result<Vec<(f64, Expression)>, ExpressionError> {
            let mut stops: Vec<(f64, Expression)> = Vec::with_capacity(pairs.len());
            for (key, out) in pairs {
                let input = key
                    .as_f64()
                    .ok_or_else(|| ExpressionError::UnsupportedFunction("non-numeric stop input".into()))?;
                if stops.last().is_some_and(|(previous, _)| *previous >= input) {
                    return Err(ExpressionError::UnsupportedFunction(
                        "stop inputs must be strictly ascending".into(),
                    ));
                }
                stops.push((input, out));
            }
            Ok(stops)
        };

        match kind {
            "exponential" => {
                let base = function.get("base").and_then(Json::as_f64).unwrap_or(1.0);
                let stops = numeric_stops(pairs)?;
                if stops.is_empty() {
                    return Err(ExpressionError::UnsupportedFunction("no stops".into()));
                }
                Ok(Expression::Interpolate {
                    interpolation: if base == 1.0 {
                        Interpolation::Linear
                    } else {
                        Interpolation::Exponential(base)
                    },
                    input: Box::new(input),
                    stops,
                })
            }
            "interval" => {
                let mut stops = numeric_stops(pairs)?.into_iter();
                let (_, first) = stops
                    .next()
                    .ok_or_else(|| ExpressionError::UnsupportedFunction("no stops".into()))?;
                Ok(Expression::Step {
                    input: Box::new(input),
                    first: Box::new(first),
                    stops: stops.collect(),
                })
            }
            "categorical" => {
                let fallback = function.get("default").map(Value::from_json).unwrap_or_default();
                Ok(Expression::Match {
                    input: Box::new(input),
                    branches: pairs
                        .into_iter()
                        .map(|(key, out)| (vec![Value::from_json(key)], out))
                        .collect(),
                    fallback: Box::new(Expression::Literal(fallback)),
                })
            }
            "identity" if matches!(input, Expression::Get(_)) => Ok(input),
            other => Err(ExpressionError::UnsupportedFunction(format!("`{other}` function"))),
        }
    }

    fn children(&self) -> Vec<&Expression> {
        match self {
            Expression::Literal(_)
            | Expression::Get(_)
            | Expression::Has(_)
            | Expression::Zoom
            | Expression::HeatmapDensity
            | Expression::LineProgress => Vec::new(),
            Expression::Interpolate { input, stops, .. } => {
                std::iter::once(input.as_ref()).chain(stops.iter().map(|(_, e)| e)).collect()
            }
            Expression::Step { input, first, stops } => [input.as_ref(), first.as_ref()]
                .into_iter()
                .chain(stops.iter().map(|(_, e)| e))
                .collect(),
            Expression::Match {
                input,
                branches,
                fallback,
            } => std::iter::once(input.as_ref())
                .chain(branches.iter().map(|(_, e)| e))
                .chain(std::iter::once(fallback.as_ref()))
                .collect(),
            Expression::Case { branches, fallback } => branches
                .iter()
                .flat_map(|(c, e)| [c, e])
                .chain(std::iter::once(fallback.as_ref()))
                .collect(),
            Expression::Coalesce(args)
            | Expression::All(args)
            | Expression::Any(args)
            | Expression::ToNumber(args)
            | Expression::Arithmetic { args, .. } => args.iter().collect(),
            Expression::Compare { lhs, rhs, .. } => vec![lhs.as_ref(), rhs.as_ref()],
            Expression::Not(arg) | Expression::ToString(arg) => vec![arg.as_ref()],
        }
    }

    /// Does not read `zoom` anywhere.
    pub fn is_zoom_constant(&self) -> bool {
        !matches!(self, Expression::Zoom) && self.children().iter().all(|c| c.is_zoom_constant())
    }

    /// Does not read feature data anywhere.
    pub fn is_feature_constant(&self) -> bool {
        !matches!(self, Expression::Get(_) | Expression::Has(_))
            && self.children().iter().all(|c| c.is_feature_constant())
    }

    /// For a top-level zoom curve, the interpolation factor of `zoom` within
    /// `range`. Zero for everything else.
    pub fn interpolation_factor(&self, range: (f64, f64), zoom: f64) -> f64 {
        match self {
            Expression::Interpolate {
                interpolation,
                input,
                ..
            } if matches!(input.as_ref(), Expression::Zoom) => {
                interpolation.factor(zoom, range.0, range.1)
            }
            _ => 0.0,
        }
    }

    pub fn evaluate(&self, ctx: &EvaluationContext) -> Result<Value, ExpressionError> {
        match self {
            Expression::Literal(value) => Ok(value.clone()),
            Expression::Get(key) => {
                let feature = ctx.feature.ok_or(ExpressionError::MissingInput("feature"))?;
                Ok(feature.get(key).map(Value::from_json).unwrap_or_default())
            }
            Expression::Has(key) => {
                let feature = ctx.feature.ok_or(ExpressionError::MissingInput("feature"))?;
                Ok(Value::Bool(feature.contains_key(key)))
            }
            Expression::Zoom => ctx
                .zoom
                .map(Value::Number)
                .ok_or(ExpressionError::MissingInput("zoom")),
            Expression::HeatmapDensity => ctx
                .ramp_input
                .map(Value::Number)
                .ok_or(ExpressionError::MissingInput("heatmap-density")),
            Expression::LineProgress => ctx
                .ramp_input
                .map(Value::Number)
                .ok_or(ExpressionError::MissingInput("line-progress")),
            Expression::Interpolate {
                interpolation,
                input,
                stops,
            } => {
                let x = number(input.evaluate(ctx)?)?;
                let index = stops.partition_point(|(stop, _)| *stop <= x);
                if index == 0 {
                    return stops[0].1.evaluate(ctx);
                }
                if index == stops.len() {
                    return stops[index - 1].1.evaluate(ctx);
                }
                let (lower, lower_out) = &stops[index - 1];
                let (upper, upper_out) = &stops[index];
                let t = interpolation.factor(x, *lower, *upper);
                let (a, b) = (lower_out.evaluate(ctx)?, upper_out.evaluate(ctx)?);
                interpolate_values(&a, &b, t).ok_or_else(|| mismatch("interpolatable output", &a))
            }
            Expression::Step { input, first, stops } => {
                let x = number(input.evaluate(ctx)?)?;
                let index = stops.partition_point(|(stop, _)| *stop <= x);
                match index {
                    0 => first.evaluate(ctx),
                    i => stops[i - 1].1.evaluate(ctx),
                }
            }
            Expression::Match {
                input,
                branches,
                fallback,
            } => {
                let value = input.evaluate(ctx)?;
                branches
                    .iter()
                    .find(|(labels, _)| labels.contains(&value))
                    .map_or_else(|| fallback.evaluate(ctx), |(_, out)| out.evaluate(ctx))
            }
            Expression::Case { branches, fallback } => {
                for (condition, output) in branches {
                    if boolean(condition.evaluate(ctx)?)? {
                        return output.evaluate(ctx);
                    }
                }
                fallback.evaluate(ctx)
            }
            Expression::Coalesce(args) => {
                for arg in args {
                    let value = arg.evaluate(ctx)?;
                    if value != Value::Null {
                        return Ok(value);
                    }
                }
                Ok(Value::Null)
            }
            Expression::Compare { op, lhs, rhs } => {
                let (a, b) = (lhs.evaluate(ctx)?, rhs.evaluate(ctx)?);
                compare(*op, &a, &b).map(Value::Bool)
            }
            Expression::Not(arg) => Ok(Value::Bool(!boolean(arg.evaluate(ctx)?)?)),
            Expression::All(args) => {
                for arg in args {
                    if !boolean(arg.evaluate(ctx)?)? {
                        return Ok(Value::Bool(false));
                    }
                }
                Ok(Value::Bool(true))
            }
            Expression::Any(args) => {
                for arg in args {
                    if boolean(arg.evaluate(ctx)?)? {
                        return Ok(Value::Bool(true));
                    }
                }
                Ok(Value::Bool(false))
            }
            Expression::Arithmetic { op, args } => {
                let values = args
                    .iter()
                    .map(|a| a.evaluate(ctx).and_then(number))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::Number(arithmetic(*op, &values)))
            }
            Expression::ToNumber(args) => {
                let mut last = Value::Null;
                for arg in args {
                    let value = arg.evaluate(ctx)?;
                    let converted = match &value {
                        Value::Null => Some(0.0),
                        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
                        Value::Number(n) => Some(*n),
                        Value::String(s) => s.trim().parse::<f64>().ok(),
                        _ => None,
                    };
                    if let Some(n) = converted {
                        return Ok(Value::Number(n));
                    }
                    last = value;
                }
                Err(mismatch("number", &last))
            }
            Expression::ToString(arg) => Ok(Value::String(arg.evaluate(ctx)?.to_string())),
        }
    }
}

fn parse_interpolation(json: &Json) -> Result<Interpolation, ExpressionError> {
    let items = json.as_array().map(Vec::as_slice).unwrap_or_default();
    match items {
        [kind] if kind == "linear" => Ok(Interpolation::Linear),
        [kind, base] if kind == "exponential" => base
            .as_f64()
            .map(Interpolation::Exponential)
            .ok_or_else(|| invalid("interpolate", "exponential base must be a number")),
        _ => Err(invalid("interpolate", format!("unsupported interpolation {json}"))),
    }
}

fn parse_stops(op: &str, pairs: &[Json]) -> Result<Vec<(f64, Expression)>, ExpressionError> {
    let mut stops: Vec<(f64, Expression)> = Vec::with_capacity(pairs.len() / 2);
    for pair in pairs.chunks(2) {
        let input = pair[0]
            .as_f64()
            .ok_or_else(|| invalid(op, "stop inputs must be numbers"))?;
        if stops.last().is_some_and(|(previous, _)| *previous >= input) {
            return Err(invalid(op, "stop inputs must be strictly ascending"));
        }
        stops.push((input, Expression::parse(&pair[1])?));
    }
    Ok(stops)
}

fn number(value: Value) -> Result<f64, ExpressionError> {
    value.as_f64().ok_or_else(|| mismatch("number", &value))
}

fn boolean(value: Value) -> Result<bool, ExpressionError> {
    value.as_bool().ok_or_else(|| mismatch("boolean", &value))
}

fn compare(op: CompareOp, a: &Value, b: &Value) -> Result<bool, ExpressionError> {
    match op {
        CompareOp::Eq => return Ok(a == b),
        CompareOp::Ne => return Ok(a != b),
        _ => {}
    }
    let ordering = match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.partial_cmp(y),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => return Err(mismatch("number or string", a)),
    };
    let Some(ordering) = ordering else {
        return Ok(false);
    };
    Ok(match op {
        CompareOp::Lt => ordering.is_lt(),
        CompareOp::Le => ordering.is_le(),
        CompareOp::Gt => ordering.is_gt(),
        _ => ordering.is_ge(),
    })
}

fn arithmetic(op: ArithmeticOp, values: &[f64]) -> f64 {
    match (op, values) {
        (ArithmeticOp::Add, _) => values.iter().sum(),
        (ArithmeticOp::Mul, _) => values.iter().product(),
        (ArithmeticOp::Sub, [x]) => -x,
        (ArithmeticOp::Sub, [x, y, ..]) => x - y,
        (ArithmeticOp::Div, [x, y, ..]) => x / y,
        _ => f64::NAN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use serde_json::json;

    fn props(value: Json) -> Map<String, Json> {
        value.as_object().cloned().unwrap()
    }

    fn eval(json: Json, ctx: &EvaluationContext) -> Value {
        Expression::parse(&json).unwrap().evaluate(ctx).unwrap()
    }

    #[test]
    fn test_get_and_has() {
        let feature = props(json!({ "height": 12, "name": "a" }));
        let ctx = EvaluationContext::default().with_feature(&feature);
        assert_eq!(eval(json!(["get", "height"]), &ctx), Value::Number(12.0));
        assert_eq!(eval(json!(["get", "missing"]), &ctx), Value::Null);
        assert_eq!(eval(json!(["has", "name"]), &ctx), Value::Bool(true));

        let no_feature = Expression::parse(&json!(["get", "height"])).unwrap();
        assert_eq!(
            no_feature.evaluate(&EvaluationContext::at_zoom(1.0)),
            Err(ExpressionError::MissingInput("feature"))
        );
    }

    #[test]
    fn test_linear_and_exponential_interpolation() {
        let ctx = EvaluationContext::at_zoom(5.0);
        let linear = json!(["interpolate", ["linear"], ["zoom"], 0, 0, 10, 100]);
        assert_eq!(eval(linear.clone(), &ctx), Value::Number(50.0));
        assert_eq!(eval(linear.clone(), &EvaluationContext::at_zoom(-1.0)), Value::Number(0.0));
        assert_eq!(eval(linear, &EvaluationContext::at_zoom(20.0)), Value::Number(100.0));

        let exponential = json!(["interpolate", ["exponential", 2], ["zoom"], 0, 0, 2, 3]);
        // (2^1 - 1) / (2^2 - 1) = 1/3
        let Value::Number(n) = eval(exponential, &EvaluationContext::at_zoom(1.0)) else {
            panic!("expected a number");
        };
        assert!((n - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_interpolate_colors() {
        let expr = json!(["interpolate", ["linear"], ["zoom"], 0, "#000000", 10, "#ffffff"]);
        assert_eq!(
            eval(expr, &EvaluationContext::at_zoom(5.0)),
            Value::Color(Color::new(0.5, 0.5, 0.5, 1.0))
        );
    }

    #[test]
    fn test_step() {
        let expr = json!(["step", ["zoom"], "small", 5, "medium", 10, "large"]);
        assert_eq!(eval(expr.clone(), &EvaluationContext::at_zoom(2.0)), Value::String("small".into()));
        assert_eq!(eval(expr.clone(), &EvaluationContext::at_zoom(5.0)), Value::String("medium".into()));
        assert_eq!(eval(expr, &EvaluationContext::at_zoom(11.0)), Value::String("large".into()));
    }

    #[test]
    fn test_match_case_coalesce() {
        let feature = props(json!({ "class": "motorway", "lanes": 4 }));
        let ctx = EvaluationContext::at_zoom(10.0).with_feature(&feature);

        let matched = json!(["match", ["get", "class"], ["motorway", "trunk"], 3, "primary", 2, 1]);
        assert_eq!(eval(matched, &ctx), Value::Number(3.0));

        let case = json!(["case", [">", ["get", "lanes"], 2], "wide", "narrow"]);
        assert_eq!(eval(case, &ctx), Value::String("wide".into()));

        let coalesce = json!(["coalesce", ["get", "ref"], ["get", "class"]]);
        assert_eq!(eval(coalesce, &ctx), Value::String("motorway".into()));
    }

    #[test]
    fn test_logic_and_math() {
        let feature = props(json!({ "a": 6, "b": "3" }));
        let ctx = EvaluationContext::default().with_feature(&feature);
        assert_eq!(eval(json!(["all", true, ["!", false]]), &ctx), Value::Bool(true));
        assert_eq!(eval(json!(["any", false, false]), &ctx), Value::Bool(false));
        assert_eq!(eval(json!(["/", ["get", "a"], ["to-number", ["get", "b"]]]), &ctx), Value::Number(2.0));
        assert_eq!(eval(json!(["-", 4]), &ctx), Value::Number(-4.0));
        assert_eq!(eval(json!(["to-string", ["+", 1, 2]]), &ctx), Value::String("3".into()));
    }

    #[test]
    fn test_constness_flags() {
        let zoom_curve = Expression::parse(&json!(["interpolate", ["linear"], ["zoom"], 0, 1, 10, 2])).unwrap();
        assert!(!zoom_curve.is_zoom_constant());
        assert!(zoom_curve.is_feature_constant());

        let composite = Expression::parse(&json!([
            "interpolate", ["linear"], ["zoom"], 0, ["get", "w"], 10, ["*", 2, ["get", "w"]]
        ]))
        .unwrap();
        assert!(!composite.is_zoom_constant());
        assert!(!composite.is_feature_constant());

        assert!(Expression::parse(&json!(["heatmap-density"])).unwrap().is_zoom_constant());
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            Expression::parse(&json!(["interpolate", ["cubic-bezier", 0, 0, 1, 1], ["zoom"], 0, 1, 1, 2])),
            Err(ExpressionError::Invalid { .. })
        ));
        assert!(matches!(
            Expression::parse(&json!(["step", ["zoom"], 0, 5, 1, 3, 2])),
            Err(ExpressionError::Invalid { .. })
        ));
        assert!(matches!(
            Expression::parse(&json!(["get"])),
            Err(ExpressionError::Invalid { .. })
        ));
    }

    #[test]
    fn test_legacy_functions() {
        let camera = props(json!({ "base": 2, "stops": [[0, 0], [2, 3]] }));
        let expr = Expression::from_function(&camera, true).unwrap();
        assert!(matches!(expr, Expression::Interpolate { interpolation: Interpolation::Exponential(b), .. } if b == 2.0));

        let interval = props(json!({ "stops": [[0, "a"], [10, "b"]] }));
        let expr = Expression::from_function(&interval, false).unwrap();
        assert_eq!(expr.evaluate(&EvaluationContext::at_zoom(12.0)).unwrap(), Value::String("b".into()));

        let categorical = props(json!({
            "property": "kind", "type": "categorical", "default": "x",
            "stops": [["park", "green"], ["water", "blue"]]
        }));
        let expr = Expression::from_function(&categorical, true).unwrap();
        let feature = props(json!({ "kind": "water" }));
        let ctx = EvaluationContext::default().with_feature(&feature);
        assert_eq!(expr.evaluate(&ctx).unwrap(), Value::String("blue".into()));
        assert!(!expr.is_feature_constant());

        let composite = props(json!({ "property": "h", "stops": [[{ "zoom": 0, "value": 0 }, 1]] }));
        assert!(matches!(
            Expression::from_function(&composite, true),
            Err(ExpressionError::UnsupportedFunction(_))
        ));
    }

    #[test]
    fn test_legacy_stops_must_ascend() {
        for kind in ["exponential", "interval"] {
            let descending = props(json!({ "type": kind, "stops": [[10, 1], [0, 2]] }));
            assert!(matches!(
                Expression::from_function(&descending, true),
                Err(ExpressionError::UnsupportedFunction(msg)) if msg.contains("ascending")
            ));
            let duplicate = props(json!({ "type": kind, "stops": [[5, 1], [5, 2]] }));
            assert!(Expression::from_function(&duplicate, true).is_err());
        }
        let categorical = props(json!({ "property": "k", "type": "categorical", "stops": [["b", 1], ["a", 2]] }));
        assert!(Expression::from_function(&categorical, true).is_ok());
    }

    #[test]
    fn test_interpolation_factor_of_zoom_curve() {
        let expr = Expression::parse(&json!(["interpolate", ["linear"], ["zoom"], 0, 0, 20, ["get", "w"]])).unwrap();
        assert_eq!(expr.interpolation_factor((10.0, 11.0), 10.25), 0.25);
        let step = Expression::parse(&json!(["step", ["zoom"], 0, 10, ["get", "w"]])).unwrap();
        assert_eq!(step.interpolation_factor((10.0, 11.0), 10.25), 0.0);
    }
}
