//! Quest system module.
//!
//! JSON catalog schema, the resolved quest entity with its prerequisite
//! predicate, and the frozen registry the planner searches over.

pub mod definition;
pub mod registry;

pub use definition::{Difficulty, Quest, RawQuest, RawSkillRequirement};
pub use registry::QuestRegistry;
