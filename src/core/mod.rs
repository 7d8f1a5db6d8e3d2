/// Core matching and aggregation engine
///
/// This module contains keyword normalization, matching, corpus scanning and
/// the aggregation of match results into overlap statistics and yearly
/// buckets.

pub mod corpus;
pub mod counts;
pub mod directory;
pub mod keywords;
pub mod matcher;
pub mod overlap;
pub mod scanner;
pub mod temporal;
