//! Domain metadata consumed by operations that need to know whether a value
//! type is enumerable.

use crate::{Datum, Point};

/// Looks up the next representable value of a domain.
///
/// This is passed explicitly to the operations that need it, so the same
/// bucket can be narrowed under different type metadata.
pub trait Domain<D: Datum> {
    /// Returns the value immediately after `point`, or `None` if the domain
    /// has no successor concept or `point` is its maximum.
    fn next_point(&self, point: &Point<D>) -> Option<Point<D>>;
}

/// A domain whose values can be enumerated, such as integers or dates.
#[derive(Copy, Clone, Debug, Default)]
pub struct Enumerable;

impl<D: Datum> Domain<D> for Enumerable {
    fn next_point(&self, point: &Point<D>) -> Option<Point<D>> {
        point.datum().successor().map(Point::new)
    }
}

/// A domain with no successor, such as floating point or text.
#[derive(Copy, Clone, Debug, Default)]
pub struct Dense;

impl<D: Datum> Domain<D> for Dense {
    fn next_point(&self, _point: &Point<D>) -> Option<Point<D>> {
        None
    }
}
