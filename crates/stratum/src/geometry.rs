use std::cmp::Ordering;
use std::fmt;

use derive_more::Deref;

use crate::primitive::{write_rounded, AabbRect, AxisIndex, Vector};

/* ---------------------------------------------------------------------------------------------- */
/*                                            PROTOCOL                                            */
/* ---------------------------------------------------------------------------------------------- */

/// A value stored in the tree.
///
/// Points are immutable once inserted. Two points are the same entry when their ids are equal,
/// regardless of their coordinates.
pub trait Point {
    type Id: Eq;

    /// Number of coordinate axes; every axis in `0..AXES` is valid for [`Point::cmp_axis`].
    const AXES: AxisIndex;

    fn id(&self) -> Self::Id;

    /// Orders two points by their coordinate on `axis`.
    fn cmp_axis(&self, other: &Self, axis: AxisIndex) -> Ordering;
}

/// An axis-aligned region over points of type `P`.
///
/// Implementors must keep [`Bounds::split`] an exact tiling: the two halves reconstruct the
/// source region and share only the cut plane, and [`Bounds::contains_point`] must assign a
/// point on that plane to exactly one of them. [`Bounds::normalize`] must be affine in the
/// coordinate, since split selection compares normalized medians across axes.
pub trait Bounds<P>: Sized {
    /// Hyper-volume.
    fn size(&self) -> f64;

    /// `true` if `other` lies entirely inside `self`. Edges may coincide.
    fn contains_bounds(&self, other: &Self) -> bool;

    /// Half-open point containment; `min <= coord < max` on every axis.
    fn contains_point(&self, point: &P) -> bool;

    /// Closed overlap test.
    fn intersects(&self, other: &Self) -> bool;

    /// Point's coordinate on `axis`, mapped to `[0, 1]` over this region's extent.
    fn normalize(&self, point: &P, axis: AxisIndex) -> f64;

    /// Divide this region at `fraction` of its extent along `axis`, returning `(lo, hi)`.
    fn split(&self, fraction: f64, axis: AxisIndex) -> (Self, Self);
}

/// A point type that carries a position vector. Every [`Located`] type can be indexed with
/// [`AabbRect`] regions.
pub trait Located {
    type Vector: Vector;

    fn pos(&self) -> &Self::Vector;
}

impl<P> Bounds<P> for AabbRect<P::Vector>
where
    P: Located,
{
    fn size(&self) -> f64 {
        self.area()
    }

    fn contains_bounds(&self, other: &Self) -> bool {
        self.contains_rect(other)
    }

    fn contains_point(&self, point: &P) -> bool {
        self.contains(point.pos())
    }

    fn intersects(&self, other: &Self) -> bool {
        AabbRect::intersects(self, other)
    }

    fn normalize(&self, point: &P, axis: AxisIndex) -> f64 {
        self.normalized(axis, point.pos()[axis])
    }

    fn split(&self, fraction: f64, axis: AxisIndex) -> (Self, Self) {
        let [lo, hi] = self.split_at(axis, fraction);
        (lo, hi)
    }
}

/* ---------------------------------------------------------------------------------------------- */
/*                                          STOCK POINTS                                          */
/* ---------------------------------------------------------------------------------------------- */

/// A position tagged with a numeric id.
#[derive(Debug, Clone, Copy, Deref)]
pub struct IdPoint<V: Vector> {
    pub id: u64,

    #[deref]
    pub pos: V,
}

impl<V: Vector> IdPoint<V> {
    pub fn new(id: u64, pos: V) -> Self {
        Self { id, pos }
    }
}

impl<V: Vector> Located for IdPoint<V> {
    type Vector = V;

    fn pos(&self) -> &V {
        &self.pos
    }
}

impl<V: Vector> Point for IdPoint<V> {
    type Id = u64;
    const AXES: AxisIndex = V::D;

    fn id(&self) -> u64 {
        self.id
    }

    fn cmp_axis(&self, other: &Self, axis: AxisIndex) -> Ordering {
        // NaN coordinates are not supported; they compare as equal here.
        self.pos[axis]
            .partial_cmp(&other.pos[axis])
            .unwrap_or(Ordering::Equal)
    }
}

impl<V: Vector> PartialEq for IdPoint<V> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<V: Vector> Eq for IdPoint<V> {}

impl<V: Vector> fmt::Display for IdPoint<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "point {}: ", self.id)?;
        write_rounded(f, &self.pos)
    }
}

pub type Point2 = IdPoint<[f64; 2]>;
pub type Rect2 = AabbRect<[f64; 2]>;

pub type Point4 = IdPoint<[f64; 4]>;
pub type Rect4 = AabbRect<[f64; 4]>;

/* ---------------------------------------------------------------------------------------------- */
/*                                              TESTS                                             */
/* ---------------------------------------------------------------------------------------------- */
