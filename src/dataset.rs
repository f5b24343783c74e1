//! Dataset
//!
//! Loaders for the housing datasets. Each dataset lives in its own directory
//! under the configured dataset directory, is cached there as CSV, and can be
//! split into train and test files that are reused on later loads.
use crate::config::Settings;
use crate::constants::{BOSTON_DATA_URL, BOSTON_HEADER_LINES, TARGET_COLUMN};
use crate::data::DataFrame;
use crate::errors::EdaError;
use crate::split::{split_data_with_id_hash, IdColumn};
use crate::summary::{describe, ColumnSummary};
use crate::utils::{items_to_strings, validate_float_parameter};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Feature columns of the Boston housing data, in file order.
pub const BOSTON_COLUMNS: [&str; 13] = [
    "CRIM", "ZN", "INDUS", "CHAS", "NOX", "RM", "AGE", "DIS", "RAD", "TAX", "PTRATIO", "B", "LSTAT",
];

/// Datasets that can be loaded by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DatasetName {
    #[default]
    BostonHousing,
    CaliforniaHousing,
}

impl DatasetName {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetName::BostonHousing => "boston_housing",
            DatasetName::CaliforniaHousing => "california_housing",
        }
    }
}

impl FromStr for DatasetName {
    type Err = EdaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "boston_housing" => Ok(DatasetName::BostonHousing),
            "california_housing" => Ok(DatasetName::CaliforniaHousing),
            _ => Err(EdaError::ParseString(
                s.to_string(),
                "DatasetName".to_string(),
                items_to_strings(vec!["boston_housing", "california_housing"]),
            )),
        }
    }
}

impl fmt::Display for DatasetName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Description of a dataset's columns and the role each one plays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetCard {
    pub target: String,
    pub features: Vec<String>,
    #[serde(default)]
    pub features_to_rename: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub numerical_features: Option<Vec<String>>,
    #[serde(default)]
    pub binary_features: Option<Vec<String>>,
    #[serde(default)]
    pub categorical_features: Option<Vec<String>>,
    #[serde(default)]
    pub datetime_features: Option<Vec<String>>,
    #[serde(default)]
    pub geospatial_features: Option<Vec<String>>,
    #[serde(default)]
    pub text_features: Option<Vec<String>>,
    #[serde(default)]
    pub features_to_drop: Option<Vec<String>>,
    #[serde(default)]
    pub features_to_encode: Option<Vec<String>>,
}

impl DatasetCard {
    /// Load a card from a json string.
    pub fn from_json(json_str: &str) -> Result<Self, EdaError> {
        serde_json::from_str::<Self>(json_str).map_err(|e| EdaError::UnableToRead(e.to_string()))
    }

    /// Load a card from a path to a json file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, EdaError> {
        let path = path.as_ref();
        let json_str =
            fs::read_to_string(path).map_err(|e| EdaError::UnableToRead(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json_str)
    }

    /// Check that the target and every listed feature are columns of the table.
    pub fn validate(&self, df: &DataFrame) -> Result<(), EdaError> {
        for name in std::iter::once(&self.target).chain(&self.features) {
            df.column(name)?;
        }
        Ok(())
    }
}

/// Read the card stored next to a dataset as `datasetcard.json`.
pub fn fetch_dataset_card(settings: &Settings, name: DatasetName) -> Result<DatasetCard, EdaError> {
    DatasetCard::load(settings.dataset_path(name.as_str()).join("datasetcard.json"))
}

fn parse_line(line: &str) -> Result<Vec<f64>, EdaError> {
    line.split_whitespace()
        .map(|s| {
            s.parse::<f64>()
                .map_err(|e| EdaError::UnableToRead(format!("invalid value {}: {}", s, e)))
        })
        .collect()
}

/// Parse the raw Boston housing text.
///
/// After the header, every record spans two lines: eleven feature values,
/// then the last two features followed by the target.
pub fn parse_boston_raw(text: &str) -> Result<DataFrame, EdaError> {
    let lines: Vec<&str> = text
        .lines()
        .skip(BOSTON_HEADER_LINES)
        .filter(|l| !l.trim().is_empty())
        .collect();
    if lines.len() % 2 != 0 {
        return Err(EdaError::UnableToRead(format!(
            "expected records of two lines, found {} lines",
            lines.len()
        )));
    }

    let mut columns: Vec<Vec<f64>> = vec![Vec::with_capacity(lines.len() / 2); BOSTON_COLUMNS.len() + 1];
    for pair in lines.chunks(2) {
        let first = parse_line(pair[0])?;
        let second = parse_line(pair[1])?;
        if first.len() != 11 || second.len() != 3 {
            return Err(EdaError::UnableToRead(format!(
                "expected 11 and 3 values per record, found {} and {}",
                first.len(),
                second.len()
            )));
        }
        for (col, v) in columns.iter_mut().zip(first.iter().chain(&second)) {
            col.push(*v);
        }
    }

    let names = BOSTON_COLUMNS
        .iter()
        .map(|c| c.to_string())
        .chain(std::iter::once(TARGET_COLUMN.to_string()));
    DataFrame::from_columns(names.zip(columns).collect())
}

/// Fetch a text resource over HTTP.
pub fn download_text(url: &str) -> Result<String, EdaError> {
    reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .and_then(|r| r.text())
        .map_err(|e| EdaError::Download(format!("{}: {}", url, e)))
}

fn create_parent(path: &Path) -> Result<(), EdaError> {
    match path.parent() {
        Some(dir) => fs::create_dir_all(dir).map_err(|e| EdaError::UnableToWrite(format!("{}: {}", dir.display(), e))),
        None => Ok(()),
    }
}

fn csv_path(settings: &Settings, name: DatasetName) -> PathBuf {
    settings
        .dataset_path(name.as_str())
        .join(format!("{}.csv", name.as_str()))
}

fn save_boston_housing_locally(path: &Path) -> Result<(), EdaError> {
    info!("Downloading the Boston housing dataset from {}.", BOSTON_DATA_URL);
    let df = parse_boston_raw(&download_text(BOSTON_DATA_URL)?)?;
    create_parent(path)?;
    df.write_csv(path)?;
    info!("Saved {} rows to {}.", df.n_rows(), path.display());
    Ok(())
}

/// Load the Boston housing data, downloading it on first use.
pub fn load_boston_housing(settings: &Settings) -> Result<DataFrame, EdaError> {
    let path = csv_path(settings, DatasetName::BostonHousing);
    if !path.is_file() {
        save_boston_housing_locally(&path)?;
    }
    DataFrame::read_csv(&path)
}

/// Load the California housing data from its CSV file.
///
/// Text columns such as the ocean proximity are read as `NaN`.
pub fn load_california_housing(settings: &Settings) -> Result<DataFrame, EdaError> {
    DataFrame::read_csv(csv_path(settings, DatasetName::CaliforniaHousing))
}

pub fn load_full_dataset(settings: &Settings, name: DatasetName) -> Result<DataFrame, EdaError> {
    match name {
        DatasetName::BostonHousing => load_boston_housing(settings),
        DatasetName::CaliforniaHousing => load_california_housing(settings),
    }
}

/// Load a dataset by name, or any table from a path ending in `.csv`.
pub fn load_data(settings: &Settings, source: &str) -> Result<DataFrame, EdaError> {
    if source.ends_with(".csv") {
        DataFrame::read_csv(source)
    } else {
        load_full_dataset(settings, source.parse()?)
    }
}

/// Paths of the cached `(train, test)` files for a split ratio.
pub fn train_test_paths(settings: &Settings, name: DatasetName, test_ratio: f64) -> (PathBuf, PathBuf) {
    let dir = settings.dataset_path(name.as_str());
    let train_ratio = 1.0 - test_ratio;
    (
        dir.join(format!("{}_train-{:.2}.csv", name.as_str(), train_ratio)),
        dir.join(format!("{}_test-{:.2}.csv", name.as_str(), test_ratio)),
    )
}

/// Load the `(train, test)` split of a dataset.
///
/// The split is made by hashing the row positions and cached next to the
/// dataset, so later loads return the same rows.
pub fn load_train_test(
    settings: &Settings,
    name: DatasetName,
    test_ratio: f64,
) -> Result<(DataFrame, DataFrame), EdaError> {
    validate_float_parameter(test_ratio, 0.0, 1.0, "test_ratio")?;
    let (train_path, test_path) = train_test_paths(settings, name, test_ratio);
    if train_path.is_file() && test_path.is_file() {
        debug!("Reading cached split {} and {}.", train_path.display(), test_path.display());
    } else {
        let df = load_full_dataset(settings, name)?;
        let (train, test) = split_data_with_id_hash(&df, test_ratio, &IdColumn::Index)?;
        create_parent(&train_path)?;
        train.write_csv(&train_path)?;
        test.write_csv(&test_path)?;
        info!(
            "Cached {} split: {} train rows, {} test rows.",
            name,
            train.n_rows(),
            test.n_rows()
        );
    }
    Ok((DataFrame::read_csv(&train_path)?, DataFrame::read_csv(&test_path)?))
}

/// Per column summary of a full dataset.
pub fn summary_statistics(settings: &Settings, name: DatasetName) -> Result<Vec<ColumnSummary>, EdaError> {
    Ok(describe(&load_full_dataset(settings, name)?))
}
