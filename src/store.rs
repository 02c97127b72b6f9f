//! Named dataset storage.
//!
//! [`MemoryStore`] lives and dies with the process. [`DirectoryStore`] keeps
//! persistent datasets as `<root>/<name>.json` documents and the
//! non-persistent ones in memory.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use anyhow::{Context, Result};
use regex::Regex;
use thiserror::Error;

use crate::{
    dataset::Dataset,
    file::{list_json_stems, write_json_atomically},
};

static DATASET_NAME: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9 _.-]*$"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("invalid dataset name {0:?}")]
    InvalidName(String),
    #[error("dataset {0:?} already exists")]
    AlreadyExists(String),
    #[error("dataset {0:?} not found")]
    NotFound(String),
}

/// Where datasets are created, saved and looked up.
pub trait CollectionStore {
    fn exists(&self, name: &str) -> bool;

    /// Registers a new empty dataset.
    ///
    /// Fails with [`StoreError::AlreadyExists`] when `name` is taken and
    /// `overwrite` is false; otherwise the previous dataset is deleted.
    fn create(&mut self, name: &str, persistent: bool, overwrite: bool) -> Result<Dataset>;

    /// Stores the current contents of `dataset` under its name.
    fn save(&mut self, dataset: &Dataset) -> Result<()>;

    fn load(&self, name: &str) -> Result<Dataset>;

    /// Returns whether anything was deleted.
    fn delete(&mut self, name: &str) -> Result<bool>;

    fn list_datasets(&self) -> Result<Vec<String>>;
}

pub fn validate_dataset_name(name: &str) -> Result<()> {
    let re = DATASET_NAME.as_ref().map_err(Clone::clone)?;
    if !re.is_match(name) || name.ends_with(".json") {
        return Err(StoreError::InvalidName(name.to_owned()).into());
    }
    Ok(())
}

fn prepare_create(
    store: &mut dyn CollectionStore,
    name: &str,
    overwrite: bool,
) -> Result<()> {
    validate_dataset_name(name)?;
    if store.exists(name) {
        if !overwrite {
            return Err(StoreError::AlreadyExists(name.to_owned()).into());
        }
        log::info!("Overwriting existing dataset '{name}'");
        store.delete(name)?;
    }
    Ok(())
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    datasets: BTreeMap<String, Dataset>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CollectionStore for MemoryStore {
    fn exists(&self, name: &str) -> bool {
        self.datasets.contains_key(name)
    }

    fn create(&mut self, name: &str, persistent: bool, overwrite: bool) -> Result<Dataset> {
        prepare_create(self, name, overwrite)?;
        let dataset = Dataset::new(name, persistent);
        self.datasets.insert(name.to_owned(), dataset.clone());
        Ok(dataset)
    }

    fn save(&mut self, dataset: &Dataset) -> Result<()> {
        validate_dataset_name(dataset.name())?;
        self.datasets
            .insert(dataset.name().to_owned(), dataset.clone());
        Ok(())
    }

    fn load(&self, name: &str) -> Result<Dataset> {
        self.datasets
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(name.to_owned()).into())
    }

    fn delete(&mut self, name: &str) -> Result<bool> {
        Ok(self.datasets.remove(name).is_some())
    }

    fn list_datasets(&self) -> Result<Vec<String>> {
        Ok(self.datasets.keys().cloned().collect())
    }
}

#[derive(Debug)]
pub struct DirectoryStore {
    root: PathBuf,
    ephemeral: MemoryStore,
}

impl DirectoryStore {
    /// Opens (and creates if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create store directory: {}", root.display()))?;
        Ok(DirectoryStore {
            root,
            ephemeral: MemoryStore::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn document_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.json"))
    }
}

impl CollectionStore for DirectoryStore {
    fn exists(&self, name: &str) -> bool {
        self.ephemeral.exists(name) || self.document_path(name).is_file()
    }

    fn create(&mut self, name: &str, persistent: bool, overwrite: bool) -> Result<Dataset> {
        prepare_create(self, name, overwrite)?;
        let dataset = Dataset::new(name, persistent);
        self.save(&dataset)?;
        Ok(dataset)
    }

    fn save(&mut self, dataset: &Dataset) -> Result<()> {
        let name = dataset.name();
        validate_dataset_name(name)?;
        if dataset.persistent() {
            let path = self.document_path(name);
            write_json_atomically(&path, dataset)?;
            self.ephemeral.delete(name)?;
            log::debug!("Saved dataset '{name}' to {}", path.display());
        } else {
            let path = self.document_path(name);
            if path.is_file() {
                fs::remove_file(&path)
                    .with_context(|| format!("Failed to remove {}", path.display()))?;
            }
            self.ephemeral.save(dataset)?;
            log::debug!("Kept non-persistent dataset '{name}' in memory");
        }
        Ok(())
    }

    fn load(&self, name: &str) -> Result<Dataset> {
        if self.ephemeral.exists(name) {
            return self.ephemeral.load(name);
        }
        let path = self.document_path(name);
        if !path.is_file() {
            return Err(StoreError::NotFound(name.to_owned()).into());
        }
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read dataset: {}", path.display()))?;
        let dataset: Dataset = serde_json::from_str(&json)
            .with_context(|| format!("Corrupt dataset document: {}", path.display()))?;
        Ok(dataset)
    }

    fn delete(&mut self, name: &str) -> Result<bool> {
        let mut deleted = self.ephemeral.delete(name)?;
        let path = self.document_path(name);
        if path.is_file() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
            deleted = true;
        }
        Ok(deleted)
    }

    fn list_datasets(&self) -> Result<Vec<String>> {
        let mut names = list_json_stems(&self.root)?;
        names.extend(self.ephemeral.list_datasets()?);
        names.sort();
        names.dedup();
        Ok(names)
    }
}
