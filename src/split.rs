//! Split
//!
//! Train/test splits of a [`DataFrame`]. The hashed split assigns a row to the
//! test set from a checksum of its identifier, so a row stays on the same side
//! when the dataset is reloaded or grows.
use crate::data::DataFrame;
use crate::errors::EdaError;
use crate::utils::validate_float_parameter;
use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// CRC-32 checksum (IEEE polynomial, reflected), as computed by zlib.
pub fn crc32(data: &[u8]) -> u32 {
    const TABLE: [u32; 256] = {
        let mut table = [0u32; 256];
        let mut i = 0;
        while i < 256 {
            let mut crc = i as u32;
            let mut j = 0;
            while j < 8 {
                if crc & 1 != 0 {
                    crc = (crc >> 1) ^ 0xEDB8_8320;
                } else {
                    crc >>= 1;
                }
                j += 1;
            }
            table[i] = crc;
            i += 1;
        }
        table
    };

    let mut crc = 0xFFFF_FFFF_u32;
    for &byte in data {
        let idx = ((crc ^ u32::from(byte)) & 0xFF) as usize;
        crc = (crc >> 8) ^ TABLE[idx];
    }
    !crc
}

/// Whether the row with this identifier belongs to the test set.
///
/// The identifier is hashed as a little endian 64 bit integer.
pub fn is_id_in_test_set(identifier: i64, test_ratio: f64) -> bool {
    (crc32(&identifier.to_le_bytes()) as f64) < test_ratio * 2f64.powi(32)
}

/// Where the identifier of each row comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum IdColumn {
    /// The row position.
    #[default]
    Index,
    /// A column of the table, truncated to an integer.
    Named(String),
}

impl From<&str> for IdColumn {
    fn from(name: &str) -> Self {
        match name {
            "index" => IdColumn::Index,
            _ => IdColumn::Named(name.to_string()),
        }
    }
}

fn partition(df: &DataFrame, in_test: impl Iterator<Item = bool>) -> (DataFrame, DataFrame) {
    let (mut train, mut test) = (Vec::new(), Vec::new());
    for (i, t) in in_test.enumerate() {
        if t {
            test.push(i);
        } else {
            train.push(i);
        }
    }
    (df.take_rows(&train), df.take_rows(&test))
}

/// Split into `(train, test)` by hashing each row's identifier.
///
/// Row order is preserved on both sides.
pub fn split_data_with_id_hash(
    df: &DataFrame,
    test_ratio: f64,
    id_column: &IdColumn,
) -> Result<(DataFrame, DataFrame), EdaError> {
    let ids: Vec<i64> = match id_column {
        IdColumn::Index => (0..df.n_rows() as i64).collect(),
        IdColumn::Named(name) => df.column(name)?.iter().map(|v| *v as i64).collect(),
    };
    validate_float_parameter(test_ratio, 0.0, 1.0, "test_ratio")?;
    let (train, test) = partition(df, ids.iter().map(|id| is_id_in_test_set(*id, test_ratio)));
    debug!(
        "Hashed split with ratio {}: {} train rows, {} test rows.",
        test_ratio,
        train.n_rows(),
        test.n_rows()
    );
    Ok((train, test))
}

/// Split into `(train, test)` after a seeded shuffle of the rows.
///
/// The test set holds `round(test_ratio * n)` rows.
pub fn split_random(df: &DataFrame, test_ratio: f64, seed: u64) -> Result<(DataFrame, DataFrame), EdaError> {
    validate_float_parameter(test_ratio, 0.0, 1.0, "test_ratio")?;
    let mut rng = StdRng::seed_from_u64(seed);
    let mut index: Vec<usize> = (0..df.n_rows()).collect();
    index.shuffle(&mut rng);
    let n_test = (test_ratio * df.n_rows() as f64).round() as usize;
    let (test, train) = index.split_at(n_test);
    Ok((df.take_rows(train), df.take_rows(test)))
}
