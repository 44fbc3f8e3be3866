//! Buckets represent a contiguous range of column values together with the
//! estimated fraction of rows and number of distinct values in that range.

mod difference;
mod intersect;
mod merge;

pub use difference::Difference;
pub use intersect::Intersection;
pub use merge::{Combine, Merge, Residual, Side};

use core::cmp::Ordering;
use core::fmt;

use log::{debug, trace};
use rand::Rng;

use crate::{BuildError, Datum, Domain, Error, Point};

/// Assembles a [`Bucket`] from its parts and validates it.
///
/// Both bounds default to closed, and frequency and distinct default to zero.
pub struct Builder<D> {
    lower: Point<D>,
    upper: Point<D>,
    lower_closed: bool,
    upper_closed: bool,
    frequency: f64,
    distinct: f64,
}

impl<D: Datum> Builder<D> {
    pub fn new(lower: Point<D>, upper: Point<D>) -> Self {
        Self {
            lower,
            upper,
            lower_closed: true,
            upper_closed: true,
            frequency: 0.0,
            distinct: 0.0,
        }
    }

    pub fn lower_closed(mut self, closed: bool) -> Self {
        self.lower_closed = closed;
        self
    }

    pub fn upper_closed(mut self, closed: bool) -> Self {
        self.upper_closed = closed;
        self
    }

    /// Sets the fraction of the histogram's rows that fall into the bucket.
    pub fn frequency(mut self, frequency: f64) -> Self {
        self.frequency = frequency;
        self
    }

    /// Sets the estimated number of distinct values in the bucket.
    pub fn distinct(mut self, distinct: f64) -> Self {
        self.distinct = distinct;
        self
    }

    pub fn build(self) -> Result<Bucket<D>, BuildError> {
        Bucket::new(
            self.lower,
            self.upper,
            self.lower_closed,
            self.upper_closed,
            self.frequency,
            self.distinct,
        )
    }
}

/// A histogram bucket. Buckets are immutable: every operation that narrows,
/// combines or rescales a bucket returns a new one, and the new bucket shares
/// the bound [`Point`]s of its inputs.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Bucket<D> {
    pub(crate) lower: Point<D>,
    pub(crate) upper: Point<D>,
    pub(crate) lower_closed: bool,
    pub(crate) upper_closed: bool,
    pub(crate) frequency: f64,
    pub(crate) distinct: f64,
}

impl<D: Datum> Bucket<D> {
    /// Construct a new bucket, validating that:
    /// * `frequency` is within `0.0..=1.0`
    /// * `distinct` is non-negative
    /// * `lower` is not greater than `upper`
    /// * a bucket with equal bounds has both bounds closed
    pub fn new(
        lower: Point<D>,
        upper: Point<D>,
        lower_closed: bool,
        upper_closed: bool,
        frequency: f64,
        distinct: f64,
    ) -> Result<Self, BuildError> {
        if !(0.0..=1.0).contains(&frequency) {
            return Err(BuildError::FrequencyOutOfRange(frequency));
        }

        if !(distinct >= 0.0) {
            return Err(BuildError::DistinctOutOfRange(distinct));
        }

        match lower.cmp(&upper) {
            Ordering::Greater => return Err(BuildError::InvertedBounds),
            Ordering::Equal if !(lower_closed && upper_closed) => {
                return Err(BuildError::OpenSingleton);
            }
            _ => {}
        }

        Ok(Self {
            lower,
            upper,
            lower_closed,
            upper_closed,
            frequency,
            distinct,
        })
    }

    pub fn builder(lower: Point<D>, upper: Point<D>) -> Builder<D> {
        Builder::new(lower, upper)
    }

    /// Build a singleton bucket holding exactly `value`, with a frequency and
    /// distinct count of one.
    pub fn singleton_from_value(value: D) -> Self {
        let point = Point::new(value);

        Self {
            lower: point.clone(),
            upper: point,
            lower_closed: true,
            upper_closed: true,
            frequency: 1.0,
            distinct: 1.0,
        }
    }

    pub fn lower(&self) -> &Point<D> {
        &self.lower
    }

    pub fn upper(&self) -> &Point<D> {
        &self.upper
    }

    pub fn is_lower_closed(&self) -> bool {
        self.lower_closed
    }

    pub fn is_upper_closed(&self) -> bool {
        self.upper_closed
    }

    /// Returns the fraction of rows in the bucket.
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Returns the estimated number of distinct values in the bucket.
    pub fn distinct(&self) -> f64 {
        self.distinct
    }

    pub fn is_singleton(&self) -> bool {
        self.lower == self.upper
    }

    /// Width of the bucket's range. A singleton has a width of one.
    pub fn width(&self) -> Result<f64, Error> {
        if self.is_singleton() {
            return Ok(1.0);
        }

        self.upper
            .width(&self.lower, self.lower_closed, self.upper_closed)
    }

    pub fn can_sample(&self) -> bool {
        self.lower.is_sampling_mappable() && self.upper.is_sampling_mappable()
    }

    /// Returns true if the point falls within the bucket's range.
    pub fn contains(&self, point: &Point<D>) -> bool {
        if self.is_singleton() {
            return self.lower == *point;
        }

        if self.lower_closed && self.lower == *point {
            return true;
        }

        if self.upper_closed && self.upper == *point {
            return true;
        }

        self.lower < *point && self.upper > *point
    }

    /// Returns true if the point lies below the lower bound.
    pub fn is_before(&self, point: &Point<D>) -> bool {
        if self.lower_closed {
            self.lower > *point
        } else {
            self.lower >= *point
        }
    }

    /// Returns true if the point lies above the upper bound.
    pub fn is_after(&self, point: &Point<D>) -> bool {
        if self.upper_closed {
            self.upper < *point
        } else {
            self.upper <= *point
        }
    }

    /// Fraction of the bucket covered by the range from the lower bound up to
    /// `point`. The point itself is part of that range if `include_point` is
    /// set.
    pub fn overlap_percentage(&self, point: &Point<D>, include_point: bool) -> Result<f64, Error> {
        // everything is at or below a point past the upper bound
        if self.upper < *point
            || (self.upper == *point && (include_point || !self.upper_closed))
        {
            return Ok(1.0);
        }

        if !self.contains(point) {
            return Ok(0.0);
        }

        if self.is_singleton() {
            return Ok(1.0);
        }

        let total = self
            .upper
            .width(&self.lower, self.lower_closed, self.upper_closed)?;
        if total <= 0.0 {
            return Ok(1.0);
        }

        let middle = point.width(&self.lower, self.lower_closed, include_point)?;
        if middle <= 0.0 {
            return Ok(0.0);
        }

        Ok((middle / total).min(1.0))
    }

    /// Narrow the bucket to end at `upper`. Frequency and distinct count are
    /// scaled by the fraction of the range that is kept.
    ///
    /// Returns `None` if the narrowed range is empty, which happens when
    /// `upper` is the lower bound and is excluded.
    pub fn scale_upper(
        &self,
        upper: &Point<D>,
        include_upper: bool,
    ) -> Result<Option<Self>, Error> {
        if !self.contains(upper) {
            return Err(Error::NotContained);
        }

        // scaling down to the lower bound leaves at most one value
        if self.lower == *upper {
            if !include_upper {
                return Ok(None);
            }
            return self.singleton(upper).map(Some);
        }

        let mut frequency = self.frequency;
        let mut distinct = self.distinct;

        if self.upper != *upper || self.upper_closed != include_upper {
            let overlap = self.overlap_percentage(upper, include_upper)?;
            frequency *= overlap;
            distinct *= overlap;
        }

        let bucket = Self::new(
            self.lower.clone(),
            upper.clone(),
            self.lower_closed,
            include_upper,
            frequency,
            distinct,
        )?;

        Ok(Some(bucket))
    }

    /// Narrow the bucket to start at `lower`. Frequency and distinct count are
    /// scaled by the fraction of the range that is kept.
    ///
    /// Returns `None` if the narrowed range is empty, which happens when
    /// `lower` is the upper bound and is excluded.
    pub fn scale_lower(
        &self,
        lower: &Point<D>,
        include_lower: bool,
    ) -> Result<Option<Self>, Error> {
        if !self.contains(lower) {
            return Err(Error::NotContained);
        }

        // scaling up to the upper bound leaves at most one value
        if self.upper == *lower {
            if !include_lower {
                return Ok(None);
            }
            return self.singleton(lower).map(Some);
        }

        let mut frequency = self.frequency;
        let mut distinct = self.distinct;

        if self.lower != *lower || self.lower_closed != include_lower {
            let overlap = 1.0 - self.overlap_percentage(lower, !include_lower)?;
            frequency *= overlap;
            distinct *= overlap;
        }

        let bucket = Self::new(
            lower.clone(),
            self.upper.clone(),
            include_lower,
            self.upper_closed,
            frequency,
            distinct,
        )?;

        Ok(Some(bucket))
    }

    /// The part of the bucket holding values strictly greater than `point`.
    ///
    /// For enumerable domains the bucket is narrowed to start at the successor
    /// of `point`. Otherwise it is narrowed to start just after `point`.
    /// Returns `None` if nothing remains.
    pub fn greater_than<M>(&self, point: &Point<D>, domain: &M) -> Result<Option<Self>, Error>
    where
        M: Domain<D> + ?Sized,
    {
        if !self.contains(point) {
            return Err(Error::NotContained);
        }

        if self.is_singleton() || self.upper == *point {
            return Ok(None);
        }

        match domain.next_point(point) {
            Some(next) if self.contains(&next) => self.scale_lower(&next, true),
            Some(_) => Ok(None),
            None => self.scale_lower(point, false),
        }
    }

    /// A bucket holding only `point`, assumed to be one of the bucket's
    /// distinct values, so it receives that value's share of the frequency.
    pub fn singleton(&self, point: &Point<D>) -> Result<Self, Error> {
        if !self.contains(point) {
            return Err(Error::NotContained);
        }

        let frequency = if self.distinct > 0.0 {
            self.frequency / self.distinct
        } else {
            self.frequency
        };
        if frequency > 1.0 {
            debug!("singleton of {self:?} at {point:?} clamped to a frequency of 1");
        }
        let frequency = frequency.min(1.0);

        let bucket = Self::new(point.clone(), point.clone(), true, true, frequency, 1.0)?;

        Ok(bucket)
    }

    /// A copy of the bucket with its frequency re-expressed against a new
    /// total row count.
    pub fn rescale_frequency(&self, rows_old: f64, rows_new: f64) -> Result<Self, Error> {
        if !(rows_old >= 0.0) {
            return Err(Error::InvalidArgument("old row count must be non-negative"));
        }

        if !(rows_new > 0.0) {
            return Err(Error::InvalidArgument("new row count must be positive"));
        }

        let frequency = (self.frequency * rows_old) / rows_new;

        let bucket = Self::new(
            self.lower.clone(),
            self.upper.clone(),
            self.lower_closed,
            self.upper_closed,
            frequency,
            self.distinct,
        )?;

        Ok(bucket)
    }

    /// Order two buckets by lower bound. At equal points a closed bound comes
    /// first, since it claims the boundary value itself.
    pub fn compare_lower_bounds(a: &Self, b: &Self) -> Ordering {
        match a.lower.cmp(&b.lower) {
            Ordering::Equal => match (a.lower_closed, b.lower_closed) {
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                _ => Ordering::Equal,
            },
            ordering => ordering,
        }
    }

    /// Order two buckets by upper bound. At equal points a closed bound comes
    /// last, since it claims the boundary value itself.
    pub fn compare_upper_bounds(a: &Self, b: &Self) -> Ordering {
        match a.upper.cmp(&b.upper) {
            Ordering::Equal => match (a.upper_closed, b.upper_closed) {
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                _ => Ordering::Equal,
            },
            ordering => ordering,
        }
    }

    /// Compare the lower bound of `a` to the upper bound of `b`. The bounds
    /// are only equal if they meet at a value both of them include.
    pub fn compare_lower_to_upper(a: &Self, b: &Self) -> Ordering {
        match a.lower.cmp(&b.upper) {
            Ordering::Equal if a.lower_closed && b.upper_closed => Ordering::Equal,
            Ordering::Equal => Ordering::Greater,
            ordering => ordering,
        }
    }

    /// Returns true if the other bucket's range lies entirely within this one.
    pub fn subsumes(&self, other: &Self) -> bool {
        if self.is_singleton() && other.is_singleton() {
            return self.lower == other.lower;
        }

        if other.is_singleton() {
            return self.contains(&other.lower);
        }

        Self::compare_lower_bounds(self, other) != Ordering::Greater
            && Self::compare_upper_bounds(self, other) != Ordering::Less
    }

    /// Returns true if the two buckets share at least one value.
    pub fn intersects(&self, other: &Self) -> bool {
        if self.is_singleton() && other.is_singleton() {
            return self.lower == other.lower;
        }

        if self.is_singleton() {
            return other.contains(&self.lower);
        }

        if other.is_singleton() {
            return self.contains(&other.lower);
        }

        if self.subsumes(other) || other.subsumes(self) {
            return true;
        }

        if Self::compare_lower_bounds(self, other) != Ordering::Greater {
            // this bucket starts first, so the other must start before it ends
            Self::compare_lower_to_upper(other, self) != Ordering::Greater
        } else {
            Self::compare_lower_to_upper(self, other) != Ordering::Greater
        }
    }

    /// Returns true if this bucket lies entirely below the other, e.g. `[1, 2)`
    /// precedes `[2, 4)`.
    pub fn precedes(&self, other: &Self) -> bool {
        !self.intersects(other) && self.upper <= other.lower
    }

    /// Returns true if this bucket lies entirely above the other.
    pub fn follows(&self, other: &Self) -> bool {
        !self.intersects(other) && self.lower >= other.upper
    }

    /// Draw a value uniformly from the bucket's range.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<f64, Error> {
        let (Some(lower), Some(upper)) = (
            self.lower.datum().as_double(),
            self.upper.datum().as_double(),
        ) else {
            return Err(Error::Unsupported("sample"));
        };

        if self.is_singleton() {
            return Ok(lower);
        }

        let value = lower + rng.gen::<f64>() * (upper - lower);
        trace!("sampled {value} from bucket {self:?}");

        Ok(value)
    }
}

impl<D> Clone for Bucket<D> {
    fn clone(&self) -> Self {
        Self {
            lower: self.lower.clone(),
            upper: self.upper.clone(),
            lower_closed: self.lower_closed,
            upper_closed: self.upper_closed,
            frequency: self.frequency,
            distinct: self.distinct,
        }
    }
}

impl<D: Datum> PartialEq for Bucket<D> {
    fn eq(&self, other: &Self) -> bool {
        self.lower == other.lower
            && self.lower_closed == other.lower_closed
            && self.upper == other.upper
            && self.upper_closed == other.upper_closed
            && self.frequency == other.frequency
            && self.distinct == other.distinct
    }
}

impl<D: fmt::Debug> fmt::Debug for Bucket<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bucket")
            .field("lower", &self.lower)
            .field("upper", &self.upper)
            .field("lower_closed", &self.lower_closed)
            .field("upper_closed", &self.upper_closed)
            .field("frequency", &self.frequency)
            .field("distinct", &self.distinct)
            .finish()
    }
}

impl<D: fmt::Display> fmt::Display for Bucket<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let open = if self.lower_closed { '[' } else { '(' };
        let close = if self.upper_closed { ']' } else { ')' };

        write!(
            f,
            "{open}{}, {}{close} {}, {}",
            self.lower, self.upper, self.frequency, self.distinct
        )
    }
}
