use core::cmp::Ordering;

use log::trace;

use crate::{Bucket, Datum, Error};

/// What remains of a bucket after removing another bucket's range from it.
#[derive(Clone, Debug, PartialEq)]
pub enum Difference<D: Datum> {
    /// The removed range covers the whole bucket.
    Empty,
    /// Only a part below the removed range remains.
    Below(Bucket<D>),
    /// Only a part above the removed range remains.
    Above(Bucket<D>),
    /// The removed range splits the bucket in two.
    Split { lower: Bucket<D>, upper: Bucket<D> },
}

impl<D: Datum> Difference<D> {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// The remaining part below the removed range, if any.
    pub fn lower(&self) -> Option<&Bucket<D>> {
        match self {
            Self::Below(lower) | Self::Split { lower, .. } => Some(lower),
            _ => None,
        }
    }

    /// The remaining part above the removed range, if any.
    pub fn upper(&self) -> Option<&Bucket<D>> {
        match self {
            Self::Above(upper) | Self::Split { upper, .. } => Some(upper),
            _ => None,
        }
    }

    pub fn into_parts(self) -> (Option<Bucket<D>>, Option<Bucket<D>>) {
        match self {
            Self::Empty => (None, None),
            Self::Below(lower) => (Some(lower), None),
            Self::Above(upper) => (None, Some(upper)),
            Self::Split { lower, upper } => (Some(lower), Some(upper)),
        }
    }

    fn from_parts(lower: Option<Bucket<D>>, upper: Option<Bucket<D>>) -> Self {
        match (lower, upper) {
            (None, None) => Self::Empty,
            (Some(lower), None) => Self::Below(lower),
            (None, Some(upper)) => Self::Above(upper),
            (Some(lower), Some(upper)) => Self::Split { lower, upper },
        }
    }
}

impl<D: Datum> Bucket<D> {
    /// Remove the range of `other` from this bucket. The parts that remain
    /// below and above `other` keep their share of the frequency and distinct
    /// count.
    pub fn difference(&self, other: &Self) -> Result<Difference<D>, Error> {
        if other.subsumes(self) {
            return Ok(Difference::Empty);
        }

        if self.precedes(other) {
            return Ok(Difference::Below(self.clone()));
        }

        if other.precedes(self) {
            return Ok(Difference::Above(self.clone()));
        }

        // a part remains below other if this bucket starts first, including
        // when it claims a shared lower point that other excludes
        let lower = if Self::compare_lower_bounds(self, other) == Ordering::Less {
            self.scale_upper(&other.lower, !other.lower_closed)?
        } else {
            None
        };

        let upper = if Self::compare_upper_bounds(self, other) == Ordering::Greater {
            self.scale_lower(&other.upper, !other.upper_closed)?
        } else {
            None
        };

        let difference = Difference::from_parts(lower, upper);
        trace!("{self:?} minus {other:?}: {difference:?}");

        Ok(difference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucket::tests::{approx, bucket, random_bucket};
    use crate::Point;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn split() {
        let a = bucket(1.0, 10.0, true, false, 0.5, 9.0);
        let b = bucket(3.0, 5.0, true, false, 0.1, 2.0);

        let (lower, upper) = a.difference(&b).unwrap().into_parts();
        let lower = lower.unwrap();
        let upper = upper.unwrap();

        assert_eq!(lower.lower(), &Point::new(1.0));
        assert_eq!(lower.upper(), &Point::new(3.0));
        assert!(!lower.is_upper_closed());
        assert!(approx(lower.frequency(), 0.5 * 2.0 / 9.0));
        assert!(approx(lower.distinct(), 2.0));

        assert_eq!(upper.lower(), &Point::new(5.0));
        assert_eq!(upper.upper(), &Point::new(10.0));
        assert!(upper.is_lower_closed());
        assert!(!upper.is_upper_closed());
        assert!(approx(upper.frequency(), 0.5 * 5.0 / 9.0));
    }

    #[test]
    fn subsumed() {
        let a = bucket(3_i64, 5, true, false, 0.1, 2.0);
        let b = bucket(1_i64, 10, true, false, 0.5, 9.0);
        assert!(a.difference(&b).unwrap().is_empty());
        assert!(a.difference(&a).unwrap().is_empty());
    }

    #[test]
    fn disjoint() {
        let a = bucket(1_i64, 5, true, false, 0.3, 4.0);
        let b = bucket(5_i64, 9, true, true, 0.4, 5.0);
        assert_eq!(a.difference(&b), Ok(Difference::Below(a.clone())));
        assert_eq!(b.difference(&a), Ok(Difference::Above(b.clone())));
    }

    #[test]
    fn one_side() {
        let a = bucket(1_i64, 10, true, true, 0.5, 10.0);
        let b = bucket(6_i64, 20, true, true, 0.5, 15.0);
        let difference = a.difference(&b).unwrap();
        assert!(difference.upper().is_none());
        let lower = difference.lower().unwrap();
        assert_eq!(lower.upper(), &Point::new(6));
        assert!(!lower.is_upper_closed());
        assert!(approx(lower.frequency(), 0.25));

        let difference = b.difference(&a).unwrap();
        assert!(difference.lower().is_none());
        let upper = difference.upper().unwrap();
        assert_eq!(upper.lower(), &Point::new(10));
        assert!(!upper.is_lower_closed());
        assert!(approx(upper.distinct(), 10.0));
    }

    #[test]
    // a closed bound keeps its value when other excludes the same point
    fn shared_point() {
        let a = bucket(5_i64, 10, true, true, 0.6, 6.0);
        let b = bucket(5_i64, 7, false, true, 0.2, 2.0);

        let (lower, upper) = a.difference(&b).unwrap().into_parts();
        let lower = lower.unwrap();
        assert!(lower.is_singleton());
        assert_eq!(lower.lower(), &Point::new(5));
        assert!(approx(lower.frequency(), 0.1));

        let upper = upper.unwrap();
        assert_eq!(upper.lower(), &Point::new(7));
        assert!(!upper.is_lower_closed());
        assert!(approx(upper.frequency(), 0.3));
        assert!(approx(upper.distinct(), 3.0));
    }

    #[test]
    // what remains lies within this bucket and outside of other
    fn residuals_are_disjoint() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..2000 {
            let a = random_bucket(&mut rng);
            let b = random_bucket(&mut rng);

            let (lower, upper) = a.difference(&b).unwrap().into_parts();
            for part in [lower, upper].into_iter().flatten() {
                assert!(a.subsumes(&part), "{a} - {b} = {part}");
                assert!(!part.intersects(&b) || !a.intersects(&b), "{a} - {b} = {part}");
                assert!(part.frequency() <= a.frequency() + 1e-12);
            }
        }
    }
}
