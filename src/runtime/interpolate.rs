//! Interpolation between two evaluated values.
//!
//! Numbers, colors and numeric arrays blend component-wise. Every other type
//! steps: the lower value is held until the next stop.

use super::value::Value;
use crate::color::Color;

pub trait Interpolate: Clone {
    /// `false` for stepped types.
    const INTERPOLATES: bool = true;

    fn interpolate(a: &Self, b: &Self, t: f64) -> Self;
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

impl Interpolate for f32 {
    fn interpolate(a: &Self, b: &Self, t: f64) -> Self {
        lerp(*a as f64, *b as f64, t) as f32
    }
}

impl Interpolate for f64 {
    fn interpolate(a: &Self, b: &Self, t: f64) -> Self {
        lerp(*a, *b, t)
    }
}

impl Interpolate for Color {
    fn interpolate(a: &Self, b: &Self, t: f64) -> Self {
        Color::new(
            f32::interpolate(&a.r, &b.r, t),
            f32::interpolate(&a.g, &b.g, t),
            f32::interpolate(&a.b, &b.b, t),
            f32::interpolate(&a.a, &b.a, t),
        )
    }
}

impl<const N: usize> Interpolate for [f32; N] {
    fn interpolate(a: &Self, b: &Self, t: f64) -> Self {
        let mut out = *a;
        for (o, (x, y)) in out.iter_mut().zip(a.iter().zip(b.iter())) {
            *o = f32::interpolate(x, y, t);
        }
        out
    }
}

impl Interpolate for Vec<f32> {
    fn interpolate(a: &Self, b: &Self, t: f64) -> Self {
        if a.len() != b.len() {
            return a.clone();
        }
        a.iter().zip(b).map(|(x, y)| f32::interpolate(x, y, t)).collect()
    }
}

macro_rules! stepped {
    ($($ty:ty),*) => {
        $(
            impl Interpolate for $ty {
                const INTERPOLATES: bool = false;

                fn interpolate(a: &Self, _b: &Self, _t: f64) -> Self {
                    a.clone()
                }
            }
        )*
    };
}

stepped!(bool, String, Vec<String>);

/// Interpolate two untyped values, if both sides are interpolatable.
///
/// CSS color strings are parsed so stop outputs can be written as literals.
pub fn interpolate_values(a: &Value, b: &Value, t: f64) -> Option<Value> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => Some(Value::Number(lerp(*x, *y, t))),
        (Value::Array(xs), Value::Array(ys)) if xs.len() == ys.len() => xs
            .iter()
            .zip(ys)
            .map(|(x, y)| interpolate_values(x, y, t))
            .collect::<Option<Vec<_>>>()
            .map(Value::Array),
        _ => {
            let (x, y) = (a.as_color()?, b.as_color()?);
            Some(Value::Color(Color::interpolate(&x, &y, t)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_interpolation() {
        assert_eq!(f32::interpolate(&0.0, &10.0, 0.25), 2.5);
        assert_eq!(<[f32; 2]>::interpolate(&[0.0, 2.0], &[2.0, 4.0], 0.5), [1.0, 3.0]);
        assert_eq!(Vec::<f32>::interpolate(&vec![1.0], &vec![1.0, 2.0], 0.5), vec![1.0]);
    }

    #[test]
    fn test_stepped_types_hold_lower_value() {
        assert!(!bool::INTERPOLATES);
        assert!(String::interpolate(&"a".into(), &"b".into(), 0.9) == "a");
        assert!(f32::INTERPOLATES);
    }

    #[test]
    fn test_color_strings_interpolate() {
        let mid = interpolate_values(
            &Value::String("#000000".into()),
            &Value::String("#ffffff".into()),
            0.5,
        )
        .unwrap();
        assert_eq!(mid, Value::Color(Color::new(0.5, 0.5, 0.5, 1.0)));
        assert_eq!(
            interpolate_values(&Value::String("left".into()), &Value::String("right".into()), 0.5),
            None
        );
    }
}
