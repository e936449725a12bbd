//! Keyed, changelog-backed aggregation.

mod keyed;
mod stations;

pub use keyed::{Applied, Changelog, KeyedAggregator, SourcePosition, Summarize};
pub use stations::{decode_changelog_entry, StationAggregation, StationLines};
