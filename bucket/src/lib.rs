//! This crate contains the bucket algebra used by a cost-based query optimizer
//! to estimate cardinalities from column histograms.
//!
//! A [`Bucket`] covers a contiguous range of column values between two
//! [`Point`]s, each of which may be included or excluded, and records the
//! fraction of rows and the number of distinct values that fall into it.
//! Values inside a bucket are assumed to be uniformly distributed.
//!
//! Buckets are immutable. Every operation returns new buckets that share the
//! bound points of their inputs:
//!
//! * narrowing - `scale_upper`, `scale_lower`, `greater_than` and `singleton`
//!   produce a sub-range with proportionally scaled statistics
//! * `intersect` - estimates an equi-join of two buckets
//! * `merge` - combines buckets of two histograms for a union
//! * `difference` - removes the range of one bucket from another
//!
//! Operations that need distances between values are only available for
//! value domains that can map values onto numbers. For other domains they
//! return [`Error::Unsupported`] so that callers can fall back to a coarser
//! estimate.

mod bucket;
mod domain;
mod errors;
mod point;

pub use bucket::{Bucket, Builder, Combine, Difference, Intersection, Merge, Residual, Side};
pub use domain::{Dense, Domain, Enumerable};
pub use errors::{BuildError, Error};
pub use point::{Datum, Point};
