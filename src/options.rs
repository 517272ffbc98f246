//! Options that may be changed while the coordinator is running.

use std::{path::Path, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, PickFirst, serde_as};

use crate::prelude::*;

/// Portal refresh interval in whole seconds.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize, derive_more::Display)]
#[serde(try_from = "u64", into = "u64")]
#[display("{_0}s")]
pub struct RefreshInterval(u64);

impl RefreshInterval {
    /// The portal is not meant to be polled more often than this.
    pub const MIN: Self = Self(300);

    pub const DEFAULT: Self = Self(3600);
}

impl Default for RefreshInterval {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u64> for RefreshInterval {
    type Error = Error;

    fn try_from(secs: u64) -> Result<Self> {
        ensure!(
            secs >= Self::MIN.0,
            "the refresh interval must be at least {} seconds, got {secs}",
            Self::MIN.0,
        );
        Ok(Self(secs))
    }
}

impl FromStr for RefreshInterval {
    type Err = Error;

    fn from_str(secs: &str) -> Result<Self> {
        let secs = secs
            .trim()
            .parse::<u64>()
            .with_context(|| format!("`{secs}` is not a number of seconds"))?;
        Self::try_from(secs)
    }
}

impl From<RefreshInterval> for u64 {
    fn from(interval: RefreshInterval) -> Self {
        interval.0
    }
}

impl From<RefreshInterval> for Duration {
    fn from(interval: RefreshInterval) -> Self {
        Self::from_secs(interval.0)
    }
}

/// Contents of the options file.
#[serde_as]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Deserialize)]
pub struct Options {
    /// Keeps the current interval when absent.
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub refresh_interval_secs: Option<RefreshInterval>,
}

impl Options {
    #[instrument(skip_all, fields(path = ?path))]
    pub fn read_from(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read the options from `{}`", path.display()))?;
        let options = toml::from_str(&text)
            .with_context(|| format!("failed to parse the options from `{}`", path.display()))?;
        debug!(?options, "Read the options");
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_parse_refresh_interval_ok() -> Result {
        assert_eq!(RefreshInterval::from_str("300")?, RefreshInterval::MIN);
        assert_eq!(Duration::from(RefreshInterval::from_str(" 900 ")?), Duration::from_secs(900));
        Ok(())
    }

    #[test]
    fn test_parse_refresh_interval_too_short() {
        let error = RefreshInterval::from_str("299").unwrap_err();
        assert_eq!(error.to_string(), "the refresh interval must be at least 300 seconds, got 299");
        assert!(RefreshInterval::from_str("soon").is_err());
    }

    #[test]
    fn test_deserialize_options_ok() -> Result {
        // language=TOML
        let options: Options = toml::from_str("refresh_interval_secs = 600")?;
        assert_eq!(options.refresh_interval_secs, Some(RefreshInterval::try_from(600)?));

        // language=TOML
        let options: Options = toml::from_str(r#"refresh_interval_secs = "1200""#)?;
        assert_eq!(options.refresh_interval_secs, Some(RefreshInterval::try_from(1200)?));

        let options: Options = toml::from_str("")?;
        assert_eq!(options.refresh_interval_secs, None);
        Ok(())
    }

    #[test]
    fn test_deserialize_options_too_short() {
        assert!(toml::from_str::<Options>("refresh_interval_secs = 60").is_err());
    }

    #[test]
    fn test_read_from_file_ok() -> Result {
        let path = std::env::temp_dir().join(format!("utilita-options-{}.toml", std::process::id()));
        fs::write(&path, "refresh_interval_secs = 900\n")?;
        let options = Options::read_from(&path);
        fs::remove_file(&path)?;
        assert_eq!(options?.refresh_interval_secs, Some(RefreshInterval::try_from(900)?));
        Ok(())
    }

    #[test]
    fn test_read_from_missing_file_fails() {
        assert!(Options::read_from(Path::new("/nonexistent/utilita.toml")).is_err());
    }
}
