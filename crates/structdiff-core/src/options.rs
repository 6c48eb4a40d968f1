use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::OptionsError;

/// Configuration applied while building document trees.
///
/// The only knob today is the list of identity keys stamped onto every
/// object so that collection-diff components can match elements by
/// business identity.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffOptions {
    id_keys: Vec<String>,
}

impl DiffOptions {
    /// Returns the configured identity keys in configured order.
    ///
    /// ```
    /// # use structdiff_core::DiffOptions;
    /// let opts = DiffOptions::default()
    ///     .with_id_keys(["name", "id"])
    ///     .expect("id keys");
    /// assert_eq!(opts.id_keys(), ["name", "id"]);
    /// ```
    #[must_use]
    pub fn id_keys(&self) -> &[String] {
        &self.id_keys
    }

    /// Sets the identity keys.
    ///
    /// Order is kept as given. Repeated keys after the first occurrence are
    /// dropped; blank keys or an empty list are rejected.
    ///
    /// ```
    /// # use structdiff_core::{DiffOptions, OptionsError};
    /// let opts = DiffOptions::default().with_id_keys(["id", "id"]).unwrap();
    /// assert_eq!(opts.id_keys(), ["id"]);
    /// let err = DiffOptions::default().with_id_keys(Vec::<String>::new()).unwrap_err();
    /// assert_eq!(err, OptionsError::EmptyIdKey);
    /// ```
    pub fn with_id_keys<I, S>(mut self, keys: I) -> Result<Self, OptionsError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut collected: Vec<String> = Vec::new();
        for key in keys {
            let key = key.into();
            if key.trim().is_empty() {
                return Err(OptionsError::EmptyIdKey);
            }
            if !collected.contains(&key) {
                collected.push(key);
            }
        }
        if collected.is_empty() {
            return Err(OptionsError::EmptyIdKey);
        }
        self.id_keys = collected;
        Ok(self)
    }

    /// Parses the `-opts` JSON array form, e.g. `[{"setkeys":["id"]}]`.
    ///
    /// ```
    /// # use structdiff_core::DiffOptions;
    /// let opts = DiffOptions::from_opts_json(r#"[{"setkeys":["id","rev"]}]"#)?;
    /// assert_eq!(opts.id_keys(), ["id", "rev"]);
    /// # Ok::<(), structdiff_core::OptionsError>(())
    /// ```
    pub fn from_opts_json(raw: &str) -> Result<Self, OptionsError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }
        let value: Value = serde_json::from_str(trimmed)
            .map_err(|err| OptionsError::InvalidJson { message: err.to_string() })?;
        let Value::Array(items) = value else {
            return Err(OptionsError::Unsupported { option: value.to_string() });
        };

        let mut options = Self::default();
        for item in &items {
            let keys = parse_setkeys(item)?;
            options = options.with_id_keys(keys)?;
        }
        Ok(options)
    }
}

fn parse_setkeys(item: &Value) -> Result<Vec<String>, OptionsError> {
    let unsupported = || OptionsError::Unsupported { option: item.to_string() };
    let Value::Object(map) = item else {
        return Err(unsupported());
    };
    if map.len() != 1 {
        return Err(unsupported());
    }
    let keys = map.get("setkeys").and_then(Value::as_array).ok_or_else(unsupported)?;
    keys.iter()
        .map(|key| key.as_str().map(str::to_owned).ok_or_else(unsupported))
        .collect()
}
