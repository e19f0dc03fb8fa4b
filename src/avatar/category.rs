/// Avatar display categories
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of avatar categories a participant can display as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvatarCategory {
    Sloth,
    Lion,
    Alligator,
    Skunk,
    Wolf,
}

impl AvatarCategory {
    /// Category used when a name or key is not recognised
    pub const DEFAULT: AvatarCategory = AvatarCategory::Wolf;

    pub const ALL: [AvatarCategory; 5] = [
        AvatarCategory::Sloth,
        AvatarCategory::Lion,
        AvatarCategory::Alligator,
        AvatarCategory::Skunk,
        AvatarCategory::Wolf,
    ];

    /// Storage key, also used for the custom image map
    pub fn key(&self) -> &'static str {
        match self {
            AvatarCategory::Sloth => "sloth",
            AvatarCategory::Lion => "lion",
            AvatarCategory::Alligator => "alligator",
            AvatarCategory::Skunk => "skunk",
            AvatarCategory::Wolf => "wolf",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.key() == key)
    }

    /// Like `from_key`, falling back to the default category
    pub fn from_key_or_default(key: &str) -> Self {
        Self::from_key(key).unwrap_or(Self::DEFAULT)
    }

    /// Map a roster display name ("Smoking Wolf") onto its category
    pub fn from_display_name(name: &str) -> Self {
        match name {
            "Sloth" => AvatarCategory::Sloth,
            "Lion" => AvatarCategory::Lion,
            "Alligator" => AvatarCategory::Alligator,
            "Skunk" => AvatarCategory::Skunk,
            "Smoking Wolf" => AvatarCategory::Wolf,
            _ => Self::DEFAULT,
        }
    }

    /// Capitalised key, used as placeholder alt text
    pub fn label(&self) -> &'static str {
        match self {
            AvatarCategory::Sloth => "Sloth",
            AvatarCategory::Lion => "Lion",
            AvatarCategory::Alligator => "Alligator",
            AvatarCategory::Skunk => "Skunk",
            AvatarCategory::Wolf => "Wolf",
        }
    }
}

impl fmt::Display for AvatarCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_mapping() {
        assert_eq!(AvatarCategory::from_display_name("Sloth"), AvatarCategory::Sloth);
        assert_eq!(
            AvatarCategory::from_display_name("Smoking Wolf"),
            AvatarCategory::Wolf
        );
        assert_eq!(
            AvatarCategory::from_display_name("Penguin"),
            AvatarCategory::Wolf
        );
    }

    #[test]
    fn test_key_roundtrip() {
        for category in AvatarCategory::ALL {
            assert_eq!(AvatarCategory::from_key(category.key()), Some(category));
        }
        assert_eq!(AvatarCategory::from_key("Sloth"), None);
        assert_eq!(
            AvatarCategory::from_key_or_default("otter"),
            AvatarCategory::Wolf
        );
    }

    #[test]
    fn test_serde_uses_lowercase_key() {
        let json = serde_json::to_string(&AvatarCategory::Alligator).unwrap();
        assert_eq!(json, "\"alligator\"");
    }
}
