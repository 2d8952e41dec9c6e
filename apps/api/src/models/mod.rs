pub mod listing;
pub mod profile;

pub use listing::{JobListing, Platform};
pub use profile::{MatchResult, ResumeProfile};
