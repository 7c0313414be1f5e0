use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use crate::a1_notation::{column_to_index, row_to_index};
use crate::error::{AccelError, Result};

/// Default location of the persisted variable store.
pub const DEFAULT_STORE_FILE: &str = ".accel-insights.json";

pub const KEY_DATA_SHEET: &str = "dataSheet";
pub const KEY_UNIX_TIME: &str = "unixTime";
pub const KEY_LOG_SAMPLE: &str = "logSample";
pub const KEY_ACC_X: &str = "accX";
pub const KEY_ACC_Y: &str = "accY";
pub const KEY_ACC_Z: &str = "accZ";
pub const KEY_SHIFT_FROM: &str = "shiftSampleFrom";
pub const KEY_SHIFT_TO: &str = "shiftSampleTo";

/// Every variable `process` needs, with the prompt shown when capturing it.
pub const VARIABLES: [(&str, &str); 8] = [
    (KEY_DATA_SHEET, "Enter path of the CSV file with logged data"),
    (KEY_UNIX_TIME, "Column letter of the log timestamp in UNIX time"),
    (KEY_LOG_SAMPLE, "Column letter of the log sample count"),
    (KEY_ACC_X, "Column letter of the X-axis acceleration"),
    (KEY_ACC_Y, "Column letter of the Y-axis acceleration"),
    (KEY_ACC_Z, "Column letter of the Z-axis acceleration"),
    (KEY_SHIFT_FROM, "First reading to sample for the baseline shift"),
    (KEY_SHIFT_TO, "Last reading to sample for the baseline shift"),
];

/// Persisted key/value variables, written once by `set-variables` and read
/// by every `process` run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableStore {
    values: BTreeMap<String, String>,
}

impl VariableStore {
    /// Load the store, or an empty one if the file does not exist yet.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("no variable store at {}", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        info!("variables saved to {}", path.as_ref().display());
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Store a value after checking it parses for its key.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        validate(key, value)?;
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    /// Required keys that have no value.
    pub fn missing(&self) -> Vec<&'static str> {
        VARIABLES
            .iter()
            .map(|(key, _)| *key)
            .filter(|key| self.get(key).is_none())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

fn validate(key: &str, value: &str) -> Result<()> {
    match key {
        KEY_UNIX_TIME | KEY_LOG_SAMPLE | KEY_ACC_X | KEY_ACC_Y | KEY_ACC_Z => {
            column_to_index(value)?;
        }
        KEY_SHIFT_FROM | KEY_SHIFT_TO => {
            row_to_index(value)?;
        }
        _ => {}
    }
    Ok(())
}

/// Source column positions (1-based) for the five copied fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub unix_time: usize,
    pub log_sample: usize,
    pub acc_x: usize,
    pub acc_y: usize,
    pub acc_z: usize,
}

impl ColumnMap {
    /// Columns in output order.
    pub fn in_order(&self) -> [usize; 5] {
        [
            self.unix_time,
            self.log_sample,
            self.acc_x,
            self.acc_y,
            self.acc_z,
        ]
    }
}

/// Everything one pipeline run needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingConfig {
    pub data_sheet: PathBuf,
    pub columns: ColumnMap,
    pub shift_sample_from: usize,
    pub shift_sample_to: usize,
}

impl ProcessingConfig {
    /// Resolve the typed configuration, failing with every missing key at once.
    pub fn from_store(store: &VariableStore) -> Result<Self> {
        let missing = store.missing();
        if !missing.is_empty() {
            return Err(AccelError::MissingConfiguration(missing));
        }

        // missing() was empty, so every lookup below succeeds
        let value = |key: &str| store.get(key).unwrap_or_default();
        let col = |key: &str| column_to_index(value(key));

        Ok(Self {
            data_sheet: PathBuf::from(value(KEY_DATA_SHEET)),
            columns: ColumnMap {
                unix_time: col(KEY_UNIX_TIME)?,
                log_sample: col(KEY_LOG_SAMPLE)?,
                acc_x: col(KEY_ACC_X)?,
                acc_y: col(KEY_ACC_Y)?,
                acc_z: col(KEY_ACC_Z)?,
            },
            shift_sample_from: row_to_index(value(KEY_SHIFT_FROM))?,
            shift_sample_to: row_to_index(value(KEY_SHIFT_TO))?,
        })
    }
}

/// Ask for one value. An empty answer or end of input cancels.
pub fn prompt_value<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    key: &'static str,
    instruction: &str,
) -> Result<String> {
    write!(output, "{instruction} [{key}]: ")?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    let answer = line.trim();
    if answer.is_empty() {
        return Err(AccelError::PromptCancelled(key));
    }
    Ok(answer.to_string())
}

/// Fill every variable not already in `preset`, prompting in the fixed order,
/// then merge the answers into `store`. Nothing is stored if any answer is
/// cancelled or invalid.
pub fn capture_variables<R: BufRead, W: Write>(
    store: &mut VariableStore,
    preset: &BTreeMap<&'static str, String>,
    input: &mut R,
    output: &mut W,
) -> Result<()> {
    let mut captured = store.clone();
    for (key, instruction) in VARIABLES {
        let value = match preset.get(key) {
            Some(v) => v.clone(),
            None => prompt_value(input, output, key, instruction)?,
        };
        captured.set(key, &value)?;
    }
    *store = captured;
    writeln!(output, "Variables set")?;
    Ok(())
}
