use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use tracing::trace;

use crate::{
    GuideflowError, Result, ShareLock,
    dialog::DialogTree,
    model::DialogModel,
    store::{TreeRepository, configuration_err},
};

/// In-memory repository of built trees.
#[derive(Clone, Default)]
pub struct MemStore {
    trees: ShareLock<HashMap<String, Arc<DialogTree>>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self {
            trees: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn workflows(&self) -> Result<Vec<String>> {
        let trees = self.trees.read().map_err(|e| GuideflowError::Store(e.to_string()))?;
        let mut ids: Vec<String> = trees.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}

impl TreeRepository for MemStore {
    fn get_tree(
        &self,
        workflow_id: &str,
    ) -> Result<Arc<DialogTree>> {
        let trees = self.trees.read().map_err(|e| configuration_err(workflow_id, e))?;
        trees.get(workflow_id).cloned().ok_or_else(|| configuration_err(workflow_id, "workflow not found"))
    }

    fn deploy(
        &self,
        model: DialogModel,
    ) -> Result<bool> {
        trace!("mem_store::deploy({})", model.id);
        if model.id.is_empty() {
            return Err(GuideflowError::Store("missing id in dialog".into()));
        }

        let id = model.id.clone();
        let tree = DialogTree::try_from(model)?;
        let mut trees = self.trees.write().map_err(|e| GuideflowError::Store(e.to_string()))?;
        Ok(trees.insert(id, Arc::new(tree)).is_none())
    }
}
