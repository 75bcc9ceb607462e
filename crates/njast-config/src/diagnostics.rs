use serde::de::DeserializeOwned;

/// Problems found while loading a config that did not stop it from loading.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigDiagnostics {
    /// Keys the schema does not know, as dotted TOML paths (`parse.levle`).
    pub unknown_keys: Vec<String>,
    pub warnings: Vec<ConfigWarning>,
    pub errors: Vec<ConfigValidationError>,
}

impl ConfigDiagnostics {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.unknown_keys.is_empty() && self.warnings.is_empty() && self.errors.is_empty()
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    LoggingLevelInvalid { value: String },
    ExtraSourceRootAbsolute { toml_path: String },
}

#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    UnsupportedLevel { level: u16 },
}

/// Deserializes `text`, collecting the dotted paths of keys `T` ignores.
pub(crate) fn from_toml_str<T: DeserializeOwned>(
    text: &str,
) -> Result<(T, Vec<String>), toml::de::Error> {
    let mut ignored = std::collections::BTreeSet::new();
    let value = serde_ignored::deserialize(toml::de::Deserializer::new(text), |path| {
        let path = path.to_string();
        ignored.insert(path.trim_start_matches('.').to_owned());
    })?;
    Ok((value, ignored.into_iter().collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn unknown_keys_are_dotted_paths() {
        #[derive(Debug, Deserialize)]
        struct Root {
            #[allow(dead_code)]
            section: Section,
        }

        #[derive(Debug, Deserialize)]
        struct Section {
            #[allow(dead_code)]
            known: bool,
        }

        let text = "[section]\nknown = true\ntypo = 1\n";
        let (_value, unknown) = from_toml_str::<Root>(text).expect("parse");
        assert_eq!(unknown, vec!["section.typo"]);
    }
}
