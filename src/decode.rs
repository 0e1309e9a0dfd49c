//! Typed extraction of listener arguments from incoming messages.
//!
//! [`Decode`] is implemented for a closed set of target types: `bool`, `u8`,
//! `i32`, `f32`, `f64`, `String`, the aggregate types from [`crate::types`],
//! `Vec<T>` of any of those, and [`OscMessage`] itself (the whole-message
//! pass-through used by the default listener). The trait is sealed, so asking
//! for an unsupported type is a compile error rather than a silent default.
//!
//! Decoding never fails at runtime: an out-of-range index or an argument of
//! an incompatible wire kind yields the target type's zero-equivalent.

use rosc::{OscMessage, OscType};

use crate::types::{Mat3, Mat4, Vec2, Vec3, Vec4};

mod sealed {
    pub trait Sealed {}
}

/// A type that can be decoded from a message starting at an argument index.
pub trait Decode: sealed::Sealed + Sized {
    /// Number of consecutive wire arguments one value consumes.
    const FIELDS: usize = 1;

    fn decode(msg: &OscMessage, index: usize) -> Self;
}

/// Marker for types usable as `Vec<T>` sequence elements.
pub trait Element: Decode {}

/// Lenient numeric read: integer kinds verbatim, float kinds truncated
/// toward zero, bool as 0/1. Anything else is not a number.
fn as_i64(arg: &OscType) -> Option<i64> {
    match arg {
        OscType::Int(v) => Some(i64::from(*v)),
        OscType::Long(v) => Some(*v),
        OscType::Float(v) => Some(*v as i64),
        OscType::Double(v) => Some(*v as i64),
        OscType::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

fn as_f64(arg: &OscType) -> Option<f64> {
    match arg {
        OscType::Int(v) => Some(f64::from(*v)),
        OscType::Long(v) => Some(*v as f64),
        OscType::Float(v) => Some(f64::from(*v)),
        OscType::Double(v) => Some(*v),
        OscType::Bool(b) => Some(f64::from(u8::from(*b))),
        _ => None,
    }
}

impl sealed::Sealed for bool {}
impl Decode for bool {
    fn decode(msg: &OscMessage, index: usize) -> Self {
        msg.args
            .get(index)
            .and_then(as_f64)
            .map(|v| v != 0.0)
            .unwrap_or(false)
    }
}

impl sealed::Sealed for u8 {}
impl Decode for u8 {
    fn decode(msg: &OscMessage, index: usize) -> Self {
        let v = msg.args.get(index).and_then(as_i64).unwrap_or(0);
        v.clamp(0, 255) as u8
    }
}

impl sealed::Sealed for i32 {}
impl Decode for i32 {
    fn decode(msg: &OscMessage, index: usize) -> Self {
        msg.args.get(index).and_then(as_i64).unwrap_or(0) as i32
    }
}

impl sealed::Sealed for f32 {}
impl Decode for f32 {
    fn decode(msg: &OscMessage, index: usize) -> Self {
        msg.args.get(index).and_then(as_f64).unwrap_or(0.0) as f32
    }
}

impl sealed::Sealed for f64 {}
impl Decode for f64 {
    fn decode(msg: &OscMessage, index: usize) -> Self {
        msg.args.get(index).and_then(as_f64).unwrap_or(0.0)
    }
}

impl sealed::Sealed for String {}
impl Decode for String {
    fn decode(msg: &OscMessage, index: usize) -> Self {
        match msg.args.get(index) {
            Some(OscType::String(s)) => s.clone(),
            Some(OscType::Int(v)) => v.to_string(),
            Some(OscType::Long(v)) => v.to_string(),
            Some(OscType::Float(v)) => v.to_string(),
            Some(OscType::Double(v)) => v.to_string(),
            Some(OscType::Bool(b)) => i32::from(*b).to_string(),
            _ => String::new(),
        }
    }
}

// Whole-message pass-through for default listeners.
impl sealed::Sealed for OscMessage {}
impl Decode for OscMessage {
    fn decode(msg: &OscMessage, _index: usize) -> Self {
        msg.clone()
    }
}

impl sealed::Sealed for Vec2 {}
impl Decode for Vec2 {
    const FIELDS: usize = 2;

    fn decode(msg: &OscMessage, index: usize) -> Self {
        if msg.args.len() < index + Self::FIELDS {
            return Vec2::default();
        }
        Vec2 {
            x: f32::decode(msg, index),
            y: f32::decode(msg, index + 1),
        }
    }
}

impl sealed::Sealed for Vec3 {}
impl Decode for Vec3 {
    const FIELDS: usize = 3;

    fn decode(msg: &OscMessage, index: usize) -> Self {
        if msg.args.len() < index + Self::FIELDS {
            return Vec3::default();
        }
        Vec3 {
            x: f32::decode(msg, index),
            y: f32::decode(msg, index + 1),
            z: f32::decode(msg, index + 2),
        }
    }
}

impl sealed::Sealed for Vec4 {}
impl Decode for Vec4 {
    const FIELDS: usize = 4;

    fn decode(msg: &OscMessage, index: usize) -> Self {
        if msg.args.len() < index + Self::FIELDS {
            return Vec4::default();
        }
        Vec4 {
            x: f32::decode(msg, index),
            y: f32::decode(msg, index + 1),
            z: f32::decode(msg, index + 2),
            w: f32::decode(msg, index + 3),
        }
    }
}

impl sealed::Sealed for Mat3 {}
impl Decode for Mat3 {
    const FIELDS: usize = 9;

    fn decode(msg: &OscMessage, index: usize) -> Self {
        if msg.args.len() < index + Self::FIELDS {
            return Mat3::default();
        }
        let mut m = [0.0; 9];
        for (i, slot) in m.iter_mut().enumerate() {
            *slot = f32::decode(msg, index + i);
        }
        Mat3 { m }
    }
}

// The wire format carries the upper 3x4 affine block only, so a 4x4 matrix
// consumes 12 arguments and the bottom row is fixed to (0, 0, 0, 1).
impl sealed::Sealed for Mat4 {}
impl Decode for Mat4 {
    const FIELDS: usize = 12;

    fn decode(msg: &OscMessage, index: usize) -> Self {
        if msg.args.len() < index + Self::FIELDS {
            return Mat4::default();
        }
        let mut m = [0.0; 16];
        for (i, slot) in m.iter_mut().take(12).enumerate() {
            *slot = f32::decode(msg, index + i);
        }
        m[15] = 1.0;
        Mat4 { m }
    }
}

impl Element for bool {}
impl Element for u8 {}
impl Element for i32 {}
impl Element for f32 {}
impl Element for f64 {}
impl Element for String {}
impl Element for Vec2 {}
impl Element for Vec3 {}
impl Element for Vec4 {}
impl Element for Mat3 {}
impl Element for Mat4 {}

// A sequence consumes the whole message regardless of the start index:
// element count is total arguments over fields per element, and a partial
// trailing element is dropped.
impl<T: Element> sealed::Sealed for Vec<T> {}
impl<T: Element> Decode for Vec<T> {
    fn decode(msg: &OscMessage, _index: usize) -> Self {
        let count = msg.args.len() / T::FIELDS;
        (0..count).map(|i| T::decode(msg, i * T::FIELDS)).collect()
    }
}
