// Modules
pub mod config;
pub mod constants;
pub mod correlation;
pub mod data;
pub mod dataset;
pub mod errors;
pub mod memo;
pub mod outlier;
pub mod selector;
pub mod split;
pub mod stats;
pub mod summary;
pub mod transform;
pub mod utils;

// Individual classes, and functions
pub use config::Settings;
pub use correlation::{correlation_matrix, generate_correlation, CorrelationMatrix, CorrelationMethod};
pub use data::{DataFrame, Matrix};
pub use dataset::{load_data, load_full_dataset, load_train_test, DatasetName};
pub use errors::EdaError;
pub use memo::{DatasetCatalog, Memo};
pub use outlier::{OutlierRule, RuleOutput, Side, Threshold};
pub use selector::{validate_column, ColumnSelector, Table};
pub use split::{split_data_with_id_hash, IdColumn};
