//! Memo
//!
//! An explicit memo table owned by the caller, and a dataset catalog built on
//! it so repeated loads of the same dataset read the disk only once.
use crate::config::Settings;
use crate::data::DataFrame;
use crate::dataset::{load_data, load_train_test, DatasetName};
use crate::errors::EdaError;
use hashbrown::hash_map::Entry;
use hashbrown::HashMap;
use log::debug;
use std::borrow::Borrow;
use std::hash::Hash;
use std::sync::Arc;

/// Values computed once per key and shared afterwards.
#[derive(Debug)]
pub struct Memo<K, V> {
    entries: HashMap<K, Arc<V>>,
}

impl<K, V> Default for Memo<K, V> {
    fn default() -> Self {
        Memo {
            entries: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash, V> Memo<K, V> {
    pub fn new() -> Self {
        Memo::default()
    }

    /// The value stored for `key`, computing and storing it first if needed.
    /// A failed computation stores nothing.
    pub fn get_or_try_insert_with<E, F>(&mut self, key: K, f: F) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        match self.entries.entry(key) {
            Entry::Occupied(e) => Ok(Arc::clone(e.get())),
            Entry::Vacant(e) => {
                let value = Arc::new(f()?);
                Ok(Arc::clone(e.insert(value)))
            }
        }
    }

    pub fn get<Q>(&self, key: &Q) -> Option<Arc<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key).cloned()
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains_key(key)
    }

    /// Forget a single entry.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<Arc<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Datasets loaded through one set of [`Settings`], each loaded at most once.
pub struct DatasetCatalog {
    settings: Settings,
    frames: Memo<String, DataFrame>,
    splits: Memo<String, (DataFrame, DataFrame)>,
}

impl DatasetCatalog {
    pub fn new(settings: Settings) -> Self {
        DatasetCatalog {
            settings,
            frames: Memo::new(),
            splits: Memo::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// A dataset by name, or a table by `.csv` path.
    pub fn load(&mut self, source: &str) -> Result<Arc<DataFrame>, EdaError> {
        if self.frames.contains(source) {
            debug!("Serving {} from memory.", source);
        }
        let settings = &self.settings;
        self.frames
            .get_or_try_insert_with(source.to_string(), || load_data(settings, source))
    }

    /// The `(train, test)` split of a dataset.
    pub fn train_test(&mut self, name: DatasetName, test_ratio: f64) -> Result<Arc<(DataFrame, DataFrame)>, EdaError> {
        let key = format!("{}-{:.2}", name, test_ratio);
        let settings = &self.settings;
        self.splits
            .get_or_try_insert_with(key, || load_train_test(settings, name, test_ratio))
    }

    /// Drop every loaded table.
    pub fn clear(&mut self) {
        self.frames.clear();
        self.splits.clear();
    }
}
