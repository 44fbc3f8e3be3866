use core::cmp::Ordering;

use log::{debug, trace};

use crate::{Bucket, Datum, Error, Point};

/// How the rows of two inputs combine when their buckets are merged.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Combine {
    /// Values present in both inputs are counted once, so the larger input
    /// bounds the row count.
    Union,
    /// Rows from both inputs are kept, so row counts add up.
    UnionAll,
}

impl Combine {
    fn total_rows(self, rows: f64, rows_other: f64) -> f64 {
        match self {
            Self::Union => rows.max(rows_other),
            Self::UnionAll => rows + rows_other,
        }
    }

    fn frequency(self, frequency: f64, frequency_other: f64) -> f64 {
        let frequency = match self {
            Self::Union => frequency.max(frequency_other),
            Self::UnionAll => frequency + frequency_other,
        };

        if frequency > 1.0 {
            debug!("merged frequency {frequency} clamped to 1");
        }

        frequency.min(1.0)
    }
}

/// Which input of a merge a residual bucket was cut from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Side {
    This,
    Other,
}

/// A zone covered by only one input of a merge.
#[derive(Clone, Debug, PartialEq)]
pub struct Residual<D: Datum> {
    pub bucket: Bucket<D>,
    pub side: Side,
}

/// The result of merging two buckets.
///
/// The union of the two ranges is split into up to three zones:
///
/// ```text
/// this     |-------------|
/// other             |-------------|
///
/// lower    |--------|
/// merged            |----|
/// upper                  |--------|
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Merge<D: Datum> {
    /// The zone covered by both inputs.
    pub merged: Bucket<D>,
    /// The zone below `merged`, covered by the input that starts first. Its
    /// frequency is expressed against `rows`, and no later bucket of either
    /// input can overlap it.
    pub lower: Option<Residual<D>>,
    /// The zone above `merged`, covered by the input that extends further.
    /// Its frequency keeps the row basis of the input it was cut from so that
    /// it can be merged again with the next bucket of the other input.
    pub upper: Option<Residual<D>>,
    /// The row count that `merged` and `lower` frequencies are relative to.
    pub rows: f64,
}

impl<D: Datum> Bucket<D> {
    /// Merge with an intersecting bucket of another histogram, as part of a
    /// union of the two histograms.
    ///
    /// `rows` and `rows_other` are the total row counts of the histograms the
    /// buckets belong to. In the zone covered by both buckets each side
    /// contributes `frequency * rows * fraction / total_rows`, where
    /// `fraction` is the share of the side's range inside the zone. The
    /// contributions are combined according to `combine`.
    pub fn merge(
        &self,
        other: &Self,
        rows: f64,
        rows_other: f64,
        combine: Combine,
    ) -> Result<Merge<D>, Error> {
        if !(rows >= 0.0 && rows_other >= 0.0) {
            return Err(Error::InvalidArgument("row counts must be non-negative"));
        }

        let total_rows = combine.total_rows(rows, rows_other);
        if !(total_rows > 0.0) {
            return Err(Error::InvalidArgument("total row count must be positive"));
        }

        if !self.intersects(other) {
            return Err(Error::Disjoint);
        }

        // the input that starts first covers the lower zone alone. at a
        // shared lower point either side claiming it closes the zone.
        let (lower, lower_closed, lower_zone) = match self.lower.cmp(&other.lower) {
            Ordering::Equal => (&self.lower, self.lower_closed || other.lower_closed, None),
            Ordering::Less => (
                &other.lower,
                other.lower_closed,
                self.lower_zone(other, rows, total_rows, Side::This)?,
            ),
            Ordering::Greater => (
                &self.lower,
                self.lower_closed,
                other.lower_zone(self, rows_other, total_rows, Side::Other)?,
            ),
        };

        // the input that extends further covers the upper zone alone
        let (upper, upper_closed, upper_zone) = match self.upper.cmp(&other.upper) {
            Ordering::Equal => (&self.upper, self.upper_closed || other.upper_closed, None),
            Ordering::Greater => (
                &other.upper,
                other.upper_closed,
                self.upper_zone(other, Side::This)?,
            ),
            Ordering::Less => (
                &self.upper,
                self.upper_closed,
                other.upper_zone(self, Side::Other)?,
            ),
        };

        debug_assert!(lower <= upper);

        let fraction = self.zone_fraction(lower, lower_closed, upper, upper_closed)?;
        let fraction_other = other.zone_fraction(lower, lower_closed, upper, upper_closed)?;

        let contribution = self.frequency * rows * fraction / total_rows;
        let contribution_other = other.frequency * rows_other * fraction_other / total_rows;
        let frequency = combine.frequency(contribution, contribution_other);

        let distinct = self.distinct * fraction + other.distinct * fraction_other;
        let capacity = zone_capacity(lower, lower_closed, upper, upper_closed)?;
        let distinct = if distinct > capacity {
            debug!("merged distinct count {distinct} capped at {capacity}");
            capacity
        } else {
            distinct
        };

        let merged = Bucket::new(
            lower.clone(),
            upper.clone(),
            lower_closed,
            upper_closed,
            frequency,
            distinct.max(0.0),
        )?;

        trace!(
            "merge {self:?} ({rows} rows) with {other:?} ({rows_other} rows): \
            {merged:?}, lower: {lower_zone:?}, upper: {upper_zone:?}"
        );

        Ok(Merge {
            merged,
            lower: lower_zone,
            upper: upper_zone,
            rows: total_rows,
        })
    }

    /// The part of this bucket below the start of `other`, re-expressed
    /// against the merged row count.
    fn lower_zone(
        &self,
        other: &Self,
        rows: f64,
        total_rows: f64,
        side: Side,
    ) -> Result<Option<Residual<D>>, Error> {
        let Some(bucket) = self.scale_upper(&other.lower, !other.lower_closed)? else {
            return Ok(None);
        };

        Ok(Some(Residual {
            bucket: bucket.rescale_frequency(rows, total_rows)?,
            side,
        }))
    }

    /// The part of this bucket above the end of `other`.
    fn upper_zone(&self, other: &Self, side: Side) -> Result<Option<Residual<D>>, Error> {
        let residual = self
            .scale_lower(&other.upper, !other.upper_closed)?
            .map(|bucket| Residual { bucket, side });

        Ok(residual)
    }

    /// Share of this bucket's range that lies between `lower` and `upper`.
    fn zone_fraction(
        &self,
        lower: &Point<D>,
        lower_closed: bool,
        upper: &Point<D>,
        upper_closed: bool,
    ) -> Result<f64, Error> {
        if self.is_singleton() {
            return Ok(1.0);
        }

        let below_upper = self.overlap_percentage(upper, upper_closed)?;
        let below_lower = self.overlap_percentage(lower, !lower_closed)?;

        Ok((below_upper - below_lower).clamp(0.0, 1.0))
    }
}

/// The width of a zone, which bounds its distinct count. A zone holding a
/// single point has room for one value.
fn zone_capacity<D: Datum>(
    lower: &Point<D>,
    lower_closed: bool,
    upper: &Point<D>,
    upper_closed: bool,
) -> Result<f64, Error> {
    if lower == upper {
        return Ok(1.0);
    }

    let width = upper.width(lower, lower_closed, upper_closed)?;

    Ok(width.max(0.0))
}
