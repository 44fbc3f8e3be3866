use log::{debug, trace};

use crate::{Bucket, Datum, Error, Point};

/// The result of intersecting two buckets for an equi-join.
#[derive(Clone, Debug, PartialEq)]
pub struct Intersection<D: Datum> {
    /// The join bucket covering the overlapping range.
    pub bucket: Bucket<D>,
    /// Frequency of the first bucket that falls in the overlap.
    pub share: f64,
    /// Frequency of the second bucket that falls in the overlap.
    pub share_other: f64,
}

impl<D: Datum> Bucket<D> {
    /// Intersect with another bucket, estimating the equi-join of the rows in
    /// both.
    ///
    /// Think of the two buckets as the sides of a rectangle in the cartesian
    /// product of two histograms. The join result lies on the diagonal, so the
    /// overlap becomes a square and its frequency follows the equi-join
    /// cardinality formula `|R| * |S| / max(NDV(R), NDV(S))`, with both sides
    /// scaled down to the overlapping range. Frequencies here are fractions of
    /// the cartesian product.
    pub fn intersect(&self, other: &Self) -> Result<Intersection<D>, Error> {
        if !self.intersects(other) {
            return Err(Error::Disjoint);
        }

        let lower = std::cmp::max(&self.lower, &other.lower);
        let upper = std::cmp::min(&self.upper, &other.upper);
        debug_assert!(lower <= upper);

        let mut lower_closed = true;
        let mut upper_closed = true;

        let (ratio, ratio_other) = if self.is_singleton() && other.is_singleton() {
            (1.0, 1.0)
        } else {
            let mut width = 1.0;

            if lower != upper {
                lower_closed = closed_at(
                    lower,
                    (&self.lower, self.lower_closed),
                    (&other.lower, other.lower_closed),
                );
                upper_closed = closed_at(
                    upper,
                    (&self.upper, self.upper_closed),
                    (&other.upper, other.upper_closed),
                );
                width = upper.width(lower, lower_closed, upper_closed)?;
            }

            // values are assumed uniform, so each side keeps the share of its
            // frequency and distinct count that lies in the overlap
            (fraction(width, self.width()?), fraction(width, other.width()?))
        };

        let distinct = ratio * self.distinct;
        let distinct_other = ratio_other * other.distinct;

        let share = ratio * self.frequency;
        let share_other = ratio_other * other.frequency;

        // the side with fewer distinct values bounds the matches
        let max_distinct = distinct.max(distinct_other);
        let frequency = if max_distinct > 0.0 {
            share * share_other / max_distinct
        } else {
            debug!("intersect {self:?} with {other:?}: no distinct values overlap");
            0.0
        };
        if frequency > 1.0 {
            debug!("intersect {self:?} with {other:?}: frequency {frequency} clamped to 1");
        }
        let frequency = frequency.min(1.0);

        let bucket = Bucket::new(
            lower.clone(),
            upper.clone(),
            lower_closed,
            upper_closed,
            frequency,
            distinct.min(distinct_other),
        )?;

        trace!("intersect {self:?} with {other:?}: {bucket:?} ({share}, {share_other})");

        Ok(Intersection {
            bucket,
            share,
            share_other,
        })
    }
}

/// Closedness of a bound taken from whichever side contributed its point.
/// When both sides contributed it, both must be closed.
fn closed_at<D: Datum>(
    point: &Point<D>,
    this: (&Point<D>, bool),
    other: (&Point<D>, bool),
) -> bool {
    match (point == this.0, point == other.0) {
        (true, true) => this.1 && other.1,
        (false, true) => other.1,
        _ => this.1,
    }
}

fn fraction(width: f64, total: f64) -> f64 {
    if total <= 0.0 {
        return 1.0;
    }

    (width / total).clamp(0.0, 1.0)
}
