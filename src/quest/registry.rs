//! Quest registry.
//!
//! Loads the quest catalog from a JSON file once at startup. The registry
//! is frozen after construction and safe to share behind an `Arc` across
//! concurrent planning requests.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::error::{PlanError, Result};
use crate::quest::definition::{Quest, RawQuest};

/// Registry of all quest definitions, keyed by id.
pub struct QuestRegistry {
    quests: HashMap<i64, Arc<Quest>>,
}

impl QuestRegistry {
    /// Load the catalog from a JSON file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let registry = Self::from_json(&content)?;
        info!("Loaded {} quest definitions from {:?}", registry.len(), path);
        Ok(registry)
    }

    /// Parse a catalog from a JSON array of quest entries.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw_quests: Vec<RawQuest> = serde_json::from_str(json)?;

        let mut quests = HashMap::with_capacity(raw_quests.len());
        for raw in &raw_quests {
            if quests.contains_key(&raw.id) {
                return Err(PlanError::DuplicateQuestId(raw.id));
            }
            quests.insert(raw.id, Arc::new(Quest::from_raw(raw)?));
        }
        Ok(Self { quests })
    }

    /// Get a quest by id.
    pub fn get(&self, quest_id: i64) -> Option<Arc<Quest>> {
        self.quests.get(&quest_id).cloned()
    }

    /// All quests, in hash order; callers that need determinism sort.
    pub fn all(&self) -> impl Iterator<Item = &Arc<Quest>> {
        self.quests.values()
    }

    pub fn len(&self) -> usize {
        self.quests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quests.is_empty()
    }
}
