/* ---------------------------------------------------------------------------------------------- */
/*                                             TRAITS                                             */
/* ---------------------------------------------------------------------------------------------- */

use std::fmt;
use std::ops::{Add, Div, Index, IndexMut, Mul, Sub};

macro_rules! trait_alias {
	($vis:vis trait $name:ident {}, $($args:tt)*) => {
		$vis trait $name: $($args)+ {}
		impl<T> $name for T where T: $($args)+ {}
	};
}
trait_alias!(
    pub trait Number {},
    Copy
        + PartialOrd
        + Add<Output = Self>
        + Mul<Output = Self>
        + Sub<Output = Self>
        + Div<Output = Self>
        + NumberCommon
);

/// Lossy conversion through `f64`, which is what region volumes and normalized positions are
/// computed in.
pub trait NumberCommon {
    fn to_f64(&self) -> f64;
    fn from_f64(value: f64) -> Self;
}

/// Fixed-dimension coordinate container. Every axis index in `0..D` is valid for indexing.
pub trait Vector:
    Clone + Copy + Sized + Index<usize, Output = Self::Num> + IndexMut<usize, Output = Self::Num>
{
    type Num: Number;
    const D: AxisIndex;
}

pub type AxisIndex = usize;

/* -------------------------------------------- Exts -------------------------------------------- */

pub trait NumExt: Number {
    fn min_value(self, other: Self) -> Self {
        if self < other {
            self
        } else {
            other
        }
    }

    fn max_value(self, other: Self) -> Self {
        if self > other {
            self
        } else {
            other
        }
    }
}

impl<T: Number> NumExt for T {}

/* ------------------------------------------ Defaults ------------------------------------------ */

impl<T: Number, const D: usize> Vector for [T; D] {
    type Num = T;
    const D: AxisIndex = D;
}

#[doc(hidden)]
mod _impl_primitive {
    use super::NumberCommon;

    macro_rules! define_minmax {
        ($($ty:ty), *) => {
            $(impl NumberCommon for $ty {
                fn to_f64(&self) -> f64 {
                    *self as f64
                }

                fn from_f64(value: f64) -> Self {
                    value as Self
                }
            })*
        };
    }

    define_minmax!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);
}

#[cfg(feature = "fixed")]
#[doc(hidden)]
mod _impl_fixed {
    use super::NumberCommon;
    use fixed::*;

    macro_rules! define_minmax_fixed {
        ($ty:ident <$t:ident>, $tr:ident) => {
            impl<$t: fixed::types::extra::$tr> NumberCommon for $ty<$t> {
                fn to_f64(&self) -> f64 {
                    (*self).to_num()
                }

                fn from_f64(value: f64) -> Self {
                    Self::saturating_from_num(value)
                }
            }
        };
    }
    define_minmax_fixed!(FixedI8<T>, LeEqU8);
    define_minmax_fixed!(FixedU8<T>, LeEqU8);
    define_minmax_fixed!(FixedI16<T>, LeEqU16);
    define_minmax_fixed!(FixedU16<T>, LeEqU16);
    define_minmax_fixed!(FixedI32<T>, LeEqU32);
    define_minmax_fixed!(FixedU32<T>, LeEqU32);
    define_minmax_fixed!(FixedI64<T>, LeEqU64);
    define_minmax_fixed!(FixedU64<T>, LeEqU64);
    define_minmax_fixed!(FixedI128<T>, LeEqU128);
    define_minmax_fixed!(FixedU128<T>, LeEqU128);
}

#[cfg(feature = "glam")]
#[doc(hidden)]
mod _impl_glam {
    use super::{AxisIndex, Vector};

    macro_rules! define_glam_vector {
        ($($ty:ty => $num:ty, $d:literal);* $(;)?) => {
            $(impl Vector for $ty {
                type Num = $num;
                const D: AxisIndex = $d;
            })*
        };
    }

    define_glam_vector!(
        glam::Vec2 => f32, 2;
        glam::Vec3 => f32, 3;
        glam::Vec4 => f32, 4;
        glam::DVec2 => f64, 2;
        glam::DVec3 => f64, 3;
        glam::DVec4 => f64, 4;
    );
}

/* ---------------------------------------------------------------------------------------------- */
/*                                         AABB RECTANGLE                                         */
/* ---------------------------------------------------------------------------------------------- */

/// Axis-aligned rectangle in `V::D` dimensions.
///
/// Point containment is half-open on every axis (`min <= p < max`), so rectangles produced by
/// [`AabbRect::split_at`] tile their source without sharing any point. Rectangle intersection is
/// closed; touching rectangles intersect.
#[derive(Clone, Copy, Default, Debug, PartialEq)]
pub struct AabbRect<V: Vector> {
    min: V,
    max: V,
}

impl<V: Vector> AabbRect<V> {
    /// Creates a new `AabbRect` from two corners.
    ///
    /// The corners are reordered per axis, so the resulting minimum is always less than or
    /// equal to the maximum in each dimension.
    pub fn new(mut p1: V, mut p2: V) -> Self {
        for i in 0..V::D {
            let a = &mut p1[i];
            let b = &mut p2[i];

            if a > b {
                std::mem::swap(a, b);
            }
        }

        Self { min: p1, max: p2 }
    }

    pub fn min(&self) -> &V {
        &self.min
    }

    pub fn max(&self) -> &V {
        &self.max
    }

    /// Hyper-volume, evaluated in `f64` to stay meaningful for narrow integer types.
    pub fn area(&self) -> f64 {
        let mut area = 1.;
        for i in 0..V::D {
            area *= self.max[i].to_f64() - self.min[i].to_f64();
        }
        area
    }

    pub fn contains(&self, point: &V) -> bool {
        for i in 0..V::D {
            if point[i] < self.min[i] || self.max[i] <= point[i] {
                return false;
            }
        }
        true
    }

    pub fn contains_rect(&self, other: &Self) -> bool {
        for i in 0..V::D {
            if other.min[i] < self.min[i] || self.max[i] < other.max[i] {
                return false;
            }
        }
        true
    }

    pub fn intersects(&self, other: &Self) -> bool {
        for i in 0..V::D {
            if other.max[i] < self.min[i] || self.max[i] < other.min[i] {
                return false;
            }
        }
        true
    }

    /// Position of `value` along `axis`, where `0` is the minimum and `1` is the maximum edge.
    pub fn normalized(&self, axis: AxisIndex, value: V::Num) -> f64 {
        let min = self.min[axis].to_f64();
        (value.to_f64() - min) / (self.max[axis].to_f64() - min)
    }

    pub fn split_minus(&mut self, axis: AxisIndex, value: V::Num) {
        self.max[axis] = self.min[axis].max_value(value);
    }

    pub fn split_plus(&mut self, axis: AxisIndex, value: V::Num) {
        self.min[axis] = self.max[axis].min_value(value);
    }

    /// Cut the rectangle at `fraction` of its length along `axis`. Both halves share the same
    /// cut value, thus the pair always reconstructs `self`.
    pub fn split_at(&self, axis: AxisIndex, fraction: f64) -> [Self; 2] {
        let min = self.min[axis].to_f64();
        let max = self.max[axis].to_f64();
        let value = V::Num::from_f64((max - min) * fraction + min);

        let mut minus = *self;
        let mut plus = *self;
        minus.split_minus(axis, value);
        plus.split_plus(axis, value);

        [minus, plus]
    }
}

impl<V> fmt::Display for AabbRect<V>
where
    V: Vector,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[min: ")?;
        write_rounded(f, &self.min)?;
        f.write_str(", max: ")?;
        write_rounded(f, &self.max)?;
        f.write_str("]")
    }
}

/// Writes `(x, y, ..)` with every component rounded to 4 decimal places.
pub(crate) fn write_rounded<V: Vector>(f: &mut fmt::Formatter<'_>, v: &V) -> fmt::Result {
    f.write_str("(")?;
    for i in 0..V::D {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", (v[i].to_f64() * 1e4).round() / 1e4)?;
    }
    f.write_str(")")
}

/* ---------------------------------------------------------------------------------------------- */
/*                                              TESTS                                             */
/* ---------------------------------------------------------------------------------------------- */
