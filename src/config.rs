//! Config
//!
//! Application settings: where datasets and trained models live, and the seed
//! used wherever randomness is involved. Every field has a default, can be
//! overridden from the environment, and round trips through JSON.
use crate::constants::GLOBAL_RANDOM_SEED;
use crate::errors::EdaError;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

fn default_title() -> String {
    "Explainable AI".to_string()
}
fn default_description() -> String {
    "A simple app to demonstrate how SHAP values work".to_string()
}
fn default_trained_model_directory() -> String {
    "trained_models".to_string()
}
fn default_dataset_directory() -> String {
    "datasets".to_string()
}
fn default_base_directory() -> String {
    ".".to_string()
}
fn default_global_random_seed() -> u64 {
    GLOBAL_RANDOM_SEED
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_description")]
    pub description: String,
    #[serde(default = "default_trained_model_directory")]
    pub trained_model_directory: String,
    /// Directory holding one sub directory per dataset, relative to `base_directory`.
    #[serde(default = "default_dataset_directory")]
    pub dataset_directory: String,
    #[serde(default = "default_base_directory")]
    pub base_directory: String,
    #[serde(default = "default_global_random_seed")]
    pub global_random_seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            title: default_title(),
            description: default_description(),
            trained_model_directory: default_trained_model_directory(),
            dataset_directory: default_dataset_directory(),
            base_directory: default_base_directory(),
            global_random_seed: default_global_random_seed(),
        }
    }
}

impl Settings {
    /// Defaults, overridden by the `TITLE`, `DESCRIPTION`, `TRAINED_MODEL_DIRECTORY`,
    /// `DATASET_DIRECTORY`, `BASE_DIRECTORY` and `GLOBAL_RANDOM_SEED` environment variables.
    pub fn from_env() -> Result<Self, EdaError> {
        Settings::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults, overridden by whatever `lookup` returns for the upper case field names.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, EdaError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Settings::default();
        let text_fields: [(&str, &mut String); 5] = [
            ("TITLE", &mut settings.title),
            ("DESCRIPTION", &mut settings.description),
            ("TRAINED_MODEL_DIRECTORY", &mut settings.trained_model_directory),
            ("DATASET_DIRECTORY", &mut settings.dataset_directory),
            ("BASE_DIRECTORY", &mut settings.base_directory),
        ];
        for (key, field) in text_fields {
            if let Some(value) = lookup(key) {
                debug!("Setting {} from the environment.", key);
                *field = value;
            }
        }
        if let Some(value) = lookup("GLOBAL_RANDOM_SEED") {
            settings.global_random_seed = value.trim().parse::<u64>().map_err(|_| {
                EdaError::InvalidParameter(
                    "GLOBAL_RANDOM_SEED".to_string(),
                    "an unsigned integer".to_string(),
                    value.clone(),
                )
            })?;
        }
        Ok(settings)
    }

    /// Dump the settings as a json object.
    pub fn json_dump(&self) -> Result<String, EdaError> {
        serde_json::to_string(self).map_err(|e| EdaError::UnableToWrite(e.to_string()))
    }

    /// Load settings from a json string, missing fields take their defaults.
    pub fn from_json(json_str: &str) -> Result<Self, EdaError> {
        serde_json::from_str::<Self>(json_str).map_err(|e| EdaError::UnableToRead(e.to_string()))
    }

    /// Load settings from a path to a json file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, EdaError> {
        let json_str = fs::read_to_string(path).map_err(|e| EdaError::UnableToRead(e.to_string()))?;
        Self::from_json(&json_str)
    }

    /// Save settings as a json file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), EdaError> {
        fs::write(path, self.json_dump()?).map_err(|e| EdaError::UnableToWrite(e.to_string()))
    }

    /// Set the base directory datasets and models are resolved against.
    pub fn set_base_directory(mut self, base_directory: &str) -> Self {
        self.base_directory = base_directory.to_string();
        self
    }

    /// Set the dataset directory.
    pub fn set_dataset_directory(mut self, dataset_directory: &str) -> Self {
        self.dataset_directory = dataset_directory.to_string();
        self
    }

    /// Set the trained model directory.
    pub fn set_trained_model_directory(mut self, trained_model_directory: &str) -> Self {
        self.trained_model_directory = trained_model_directory.to_string();
        self
    }

    /// Set the seed used by random splits.
    pub fn set_global_random_seed(mut self, global_random_seed: u64) -> Self {
        self.global_random_seed = global_random_seed;
        self
    }

    /// Directory of a named dataset.
    pub fn dataset_path(&self, dataset_name: &str) -> PathBuf {
        Path::new(&self.base_directory)
            .join(&self.dataset_directory)
            .join(dataset_name)
    }

    /// Directory of the models trained on a named dataset.
    pub fn trained_model_path(&self, dataset_name: &str) -> PathBuf {
        Path::new(&self.base_directory)
            .join(&self.trained_model_directory)
            .join(dataset_name)
    }
}
