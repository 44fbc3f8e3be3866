//! Points are the ordered, non-null values that bound a bucket.

use core::cmp::Ordering;
use core::fmt;
use std::sync::Arc;

use crate::Error;

/// The capabilities a column value type exposes to the bucket algebra.
///
/// Only `compare` is required. A type that maps onto `i64` is treated as a
/// discrete domain, where widths count representable values. A type that
/// only maps onto `f64` is continuous. A type with neither mapping can be
/// ordered but not measured, so any operation that needs a distance returns
/// [`Error::Unsupported`].
pub trait Datum: fmt::Debug {
    /// Total order over the values of the domain.
    fn compare(&self, other: &Self) -> Ordering;

    fn as_lint(&self) -> Option<i64> {
        None
    }

    fn as_double(&self) -> Option<f64> {
        None
    }

    /// The next representable value, or `None` for continuous domains and at
    /// the domain maximum.
    fn successor(&self) -> Option<Self>
    where
        Self: Sized,
    {
        None
    }
}

macro_rules! integer_datum {
    ($($ty:ty),*) => {
        $(
            impl Datum for $ty {
                fn compare(&self, other: &Self) -> Ordering {
                    self.cmp(other)
                }

                fn as_lint(&self) -> Option<i64> {
                    Some(i64::from(*self))
                }

                fn as_double(&self) -> Option<f64> {
                    Some(f64::from(*self))
                }

                fn successor(&self) -> Option<Self> {
                    self.checked_add(1)
                }
            }
        )*
    };
}

integer_datum!(i16, i32);

impl Datum for i64 {
    fn compare(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    fn as_lint(&self) -> Option<i64> {
        Some(*self)
    }

    fn as_double(&self) -> Option<f64> {
        Some(*self as f64)
    }

    fn successor(&self) -> Option<Self> {
        self.checked_add(1)
    }
}

impl Datum for f64 {
    fn compare(&self, other: &Self) -> Ordering {
        self.total_cmp(other)
    }

    fn as_double(&self) -> Option<f64> {
        Some(*self)
    }
}

impl Datum for f32 {
    fn compare(&self, other: &Self) -> Ordering {
        self.total_cmp(other)
    }

    fn as_double(&self) -> Option<f64> {
        Some(f64::from(*self))
    }
}

impl Datum for String {
    fn compare(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }
}

/// A shared handle to an immutable value. Cloning a `Point` shares the value,
/// so many buckets can reference the same bound.
pub struct Point<D>(Arc<D>);

impl<D: Datum> Point<D> {
    pub fn new(datum: D) -> Self {
        Self(Arc::new(datum))
    }

    pub fn datum(&self) -> &D {
        &self.0
    }

    /// Returns true if both handles share the same value allocation.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Discrete domains map onto integers and have a successor.
    pub fn is_discrete(&self) -> bool {
        self.0.as_lint().is_some()
    }

    pub fn is_distance_computable(&self) -> bool {
        self.0.as_lint().is_some() || self.0.as_double().is_some()
    }

    pub fn is_sampling_mappable(&self) -> bool {
        self.0.as_double().is_some()
    }

    /// Distance from `other` to `self` in the mapped domain.
    pub fn distance(&self, other: &Self) -> Result<f64, Error> {
        if let (Some(hi), Some(lo)) = (self.0.as_lint(), other.0.as_lint()) {
            return Ok((i128::from(hi) - i128::from(lo)) as f64);
        }

        if let (Some(hi), Some(lo)) = (self.0.as_double(), other.0.as_double()) {
            return Ok(hi - lo);
        }

        Err(Error::Unsupported("distance"))
    }

    /// Width of the range from `lower` to `self`, respecting the openness of
    /// both ends. For discrete domains this is the number of representable
    /// values in the range.
    pub fn width(
        &self,
        lower: &Self,
        include_lower: bool,
        include_upper: bool,
    ) -> Result<f64, Error> {
        let distance = self.distance(lower)?;

        if !self.is_discrete() {
            return Ok(distance);
        }

        let adjust = match (include_lower, include_upper) {
            (true, true) => 1.0,
            (false, false) => -1.0,
            _ => 0.0,
        };

        Ok(distance + adjust)
    }
}

impl<D> Clone for Point<D> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<D: Datum> PartialEq for Point<D> {
    fn eq(&self, other: &Self) -> bool {
        self.0.compare(&other.0) == Ordering::Equal
    }
}

impl<D: Datum> Eq for Point<D> {}

impl<D: Datum> PartialOrd for Point<D> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<D: Datum> Ord for Point<D> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.compare(&other.0)
    }
}

impl<D: fmt::Debug> fmt::Debug for Point<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl<D: fmt::Display> fmt::Display for Point<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.0, f)
    }
}

impl<D: Datum> From<D> for Point<D> {
    fn from(datum: D) -> Self {
        Self::new(datum)
    }
}

#[cfg(feature = "serde")]
impl<D: serde::Serialize> serde::Serialize for Point<D> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serde::Serialize::serialize(&*self.0, serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering() {
        let a = Point::new(1_i64);
        let b = Point::new(2_i64);
        assert!(a < b);
        assert!(b > a);
        assert_eq!(a, Point::new(1));
        assert_eq!(std::cmp::max(&a, &b), &b);

        let nan = Point::new(f64::NAN);
        assert_eq!(nan, nan.clone());
    }

    #[test]
    fn sharing() {
        let a = Point::new(String::from("abc"));
        let b = a.clone();
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&Point::new(String::from("abc"))));
    }

    #[test]
    fn capabilities() {
        assert!(Point::new(1_i32).is_discrete());
        assert!(Point::new(1_i32).is_sampling_mappable());
        assert!(!Point::new(1.0_f64).is_discrete());
        assert!(Point::new(1.0_f64).is_distance_computable());

        let text = Point::new(String::from("a"));
        assert!(!text.is_distance_computable());
        assert!(!text.is_sampling_mappable());
        assert_eq!(
            text.distance(&Point::new(String::from("b"))),
            Err(Error::Unsupported("distance"))
        );
    }

    #[test]
    fn width() {
        let lower = Point::new(1_i64);
        let upper = Point::new(10_i64);
        assert_eq!(upper.width(&lower, true, true), Ok(10.0));
        assert_eq!(upper.width(&lower, true, false), Ok(9.0));
        assert_eq!(upper.width(&lower, false, true), Ok(9.0));
        assert_eq!(upper.width(&lower, false, false), Ok(8.0));

        let lower = Point::new(1.0_f64);
        let upper = Point::new(10.0_f64);
        assert_eq!(upper.width(&lower, true, true), Ok(9.0));
        assert_eq!(upper.width(&lower, false, false), Ok(9.0));
    }

    #[test]
    fn distance_does_not_overflow() {
        let lower = Point::new(i64::MIN);
        let upper = Point::new(i64::MAX);
        assert_eq!(upper.distance(&lower), Ok(u64::MAX as f64));
    }

    #[test]
    fn successor() {
        assert_eq!(5_i32.successor(), Some(6));
        assert_eq!(i16::MAX.successor(), None);
        assert_eq!(1.5_f64.successor(), None);
    }
}
