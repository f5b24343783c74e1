pub const DEFAULT_Z_THRESHOLD: f64 = 3.0;
pub const DEFAULT_TUKEY_K: f64 = 1.5;
pub const DEFAULT_TAIL_PERCENTILE: f64 = 0.01;
pub const DEFAULT_TRUNCATION_PERCENTAGE: f64 = 10.0;
pub const DEFAULT_WINSOR_LIMITS: (f64, f64) = (0.05, 0.05);
pub const DEFAULT_BINARY_THRESHOLD: f64 = 0.5;
pub const DEFAULT_CORRELATION_THRESHOLD: f64 = 0.5;
pub const DEFAULT_SKEW_THRESHOLD: f64 = 0.3;
pub const DEFAULT_NORMALITY_ALPHA: f64 = 0.05;
pub const DEFAULT_TEST_RATIO: f64 = 0.2;
pub const GLOBAL_RANDOM_SEED: u64 = 1234;
pub const TARGET_COLUMN: &str = "TARGET";
pub const MIN_NORMAL_TEST_SIZE: usize = 8;
pub const BOSTON_HEADER_LINES: usize = 22;
pub const BOSTON_DATA_URL: &str = "http://lib.stat.cmu.edu/datasets/boston";
