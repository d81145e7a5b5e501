//! Parsing, layout, and tallying of ideas
//!
//! Everything in here is pure: no I/O, no clocks, deterministic output.

pub mod humanize;
pub mod idea_formatter;
pub mod parser;
pub mod vote_formatter;

pub use idea_formatter::{idea, FormatError, FormattedIdea};
pub use parser::{parse, ParseError, ParsedGroup, ParsedIdea};
pub use vote_formatter::{tally, RatingBand, VoteSummary};
