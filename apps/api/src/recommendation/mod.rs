pub mod catalog;
pub mod engine;
pub mod fallback;

pub use catalog::{OpportunityCatalog, PgOpportunityCatalog, StaticCatalog};
pub use engine::{RecommendationEngine, RecommendationRequest, Recommender};
