pub mod ranker;
pub mod scoring;
pub mod similarity;
pub mod skills;

pub use ranker::{rank_listings, KeywordMatchScorer, MatchScorer};
