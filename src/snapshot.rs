use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::prelude::*;

/// Everything fetched during one successful refresh.
///
/// The trees are kept schema-less: the portal gives no guarantees about their shape, and
/// each sensor picks out only what it needs. Missing keys in a dumped snapshot read as `null`.
#[must_use]
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub balance: Value,

    #[serde(default)]
    pub usage: Value,

    #[serde(default)]
    pub user_data: Value,

    #[serde(default)]
    pub payments: Value,
}

impl Snapshot {
    pub fn read_from(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read the snapshot from `{}`", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("failed to parse the snapshot from `{}`", path.display()))
    }

    pub fn write_to(&self, path: &Path) -> Result {
        fs::write(path, serde_json::to_string_pretty(self)?)
            .with_context(|| format!("failed to write the snapshot to `{}`", path.display()))
    }
}
