//! Java language level and feature availability.
//!
//! The grammar accepts the JDK7 superset and gates the JDK7-only constructs
//! on the configured level.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The JDK compatibility level a file is parsed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JavaLevel {
    pub major: u16,
}

impl JavaLevel {
    pub const JDK6: Self = Self { major: 6 };
    pub const JDK7: Self = Self { major: 7 };

    pub const fn new(major: u16) -> Self {
        Self { major }
    }

    #[inline]
    pub fn is_enabled(self, feature: JavaFeature) -> bool {
        self >= feature.since()
    }
}

impl Default for JavaLevel {
    fn default() -> Self {
        Self::JDK7
    }
}

impl fmt::Display for JavaLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JDK{}", self.major)
    }
}

/// Language features whose availability depends on [`JavaLevel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JavaFeature {
    Diamond,
    TryWithResources,
    MultiCatch,
    BinaryLiterals,
    UnderscoresInLiterals,
}

impl JavaFeature {
    pub fn since(self) -> JavaLevel {
        match self {
            JavaFeature::Diamond
            | JavaFeature::TryWithResources
            | JavaFeature::MultiCatch
            | JavaFeature::BinaryLiterals
            | JavaFeature::UnderscoresInLiterals => JavaLevel::JDK7,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            JavaFeature::Diamond => "diamond type arguments",
            JavaFeature::TryWithResources => "try-with-resources",
            JavaFeature::MultiCatch => "multi-catch",
            JavaFeature::BinaryLiterals => "binary literals",
            JavaFeature::UnderscoresInLiterals => "underscores in numeric literals",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jdk6_rejects_jdk7_features() {
        assert!(!JavaLevel::JDK6.is_enabled(JavaFeature::Diamond));
        assert!(!JavaLevel::JDK6.is_enabled(JavaFeature::MultiCatch));
        assert!(JavaLevel::JDK7.is_enabled(JavaFeature::TryWithResources));
        assert!(JavaLevel::new(8).is_enabled(JavaFeature::BinaryLiterals));
    }

    #[test]
    fn default_is_jdk7() {
        assert_eq!(JavaLevel::default(), JavaLevel::JDK7);
        assert_eq!(JavaLevel::default().to_string(), "JDK7");
    }
}
