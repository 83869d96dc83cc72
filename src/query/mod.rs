//! Query engine: option handling, scoring, top-k selection and execution.

pub mod engine;
pub mod options;
pub mod scorer;
pub mod topk;

pub use engine::{Match, QueryEngine};
pub use options::{MatchMode, SearchOptions};
pub use scorer::{MatchKind, Scorer, ScoringWeights};
pub use topk::TopKHeap;
