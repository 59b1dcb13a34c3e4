//! # nha-recommend
//!
//! The Recommender — third stage of the adaptive policy pipeline.
//!
//! Turns the Analyzer's prioritized gaps into concrete, per-agent registry
//! edit proposals: grant a scope, declare a secret, add a permission, or
//! flag an agent for human review. The current registry is ground truth —
//! a capability an agent already holds is never re-proposed, so running
//! the stage twice over unchanged inputs produces identical output.
//!
//! Scope→agent affinity is inherently fuzzy string matching, so it sits
//! behind the [`AgentMatcher`] trait where it can be swapped or tested
//! independently of the synthesis pipeline.

pub mod matcher;
pub mod model;
pub mod recommender;

pub use matcher::{AgentMatcher, DefaultMatcher};
pub use model::{
    AgentRecommendations, Recommendation, RecommendationAction, RecommendationsDocument,
    RecommendationsFile,
};
pub use recommender::{recommend, CANDIDATE_PERMISSIONS};
