use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};

use tracing::trace;

use crate::{
    GuideflowError, Result, ShareLock,
    common::MemCache,
    dialog::DialogTree,
    model::DialogModel,
    store::{TreeRepository, configuration_err},
};

/// Reads dialog definitions from `<dir>/<workflow_id>.json` or `<dir>/<workflow_id>.toml`.
///
/// Built trees are cached, a definition is parsed once until it is redeployed
/// or evicted.
#[derive(Clone)]
pub struct FileStore {
    dir: PathBuf,
    trees: MemCache<String, Arc<DialogTree>>,
    /// Held for writing while a definition is replaced, a tree read from the
    /// old file can never be cached after the deploy invalidated it.
    files: ShareLock<()>,
}

impl FileStore {
    pub fn new(
        dir: impl AsRef<Path>,
        cache_capacity: usize,
    ) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            trees: MemCache::new(cache_capacity),
            files: Arc::new(RwLock::new(())),
        }
    }

    fn load(
        &self,
        workflow_id: &str,
    ) -> Result<DialogModel> {
        let json = self.dir.join(format!("{workflow_id}.json"));
        if json.is_file() {
            return DialogModel::from_json(&fs::read_to_string(json)?);
        }

        let toml = self.dir.join(format!("{workflow_id}.toml"));
        if toml.is_file() {
            return DialogModel::from_toml(&fs::read_to_string(toml)?);
        }

        Err(GuideflowError::Store(format!("no dialog definition for '{}' in {}", workflow_id, self.dir.display())))
    }
}

impl TreeRepository for FileStore {
    fn get_tree(
        &self,
        workflow_id: &str,
    ) -> Result<Arc<DialogTree>> {
        let _files = self.files.read().map_err(|e| configuration_err(workflow_id, e))?;
        self.trees.try_get_with(workflow_id.to_string(), || -> Result<Arc<DialogTree>> {
            let model = self.load(workflow_id).map_err(|e| configuration_err(workflow_id, e))?;
            if model.id != workflow_id {
                return Err(configuration_err(workflow_id, format!("definition declares id '{}'", model.id)));
            }

            let tree = DialogTree::try_from(model).map_err(|e| configuration_err(workflow_id, e))?;
            trace!("file_store::get_tree({})\n{}", workflow_id, tree.outline());
            Ok(Arc::new(tree))
        })
    }

    fn deploy(
        &self,
        model: DialogModel,
    ) -> Result<bool> {
        trace!("file_store::deploy({})", model.id);
        if model.id.is_empty() {
            return Err(GuideflowError::Store("missing id in dialog".into()));
        }

        let text = model.to_json()?;
        let id = model.id.clone();
        // validate before touching the file
        DialogTree::try_from(model)?;

        let _files = self.files.write().map_err(|e| GuideflowError::Store(e.to_string()))?;
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(format!("{id}.json"));
        let created = !path.exists();
        fs::write(path, text)?;
        self.trees.remove(&id);

        Ok(created)
    }
}
