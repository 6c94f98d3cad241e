use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the two parallel page variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Desktop,
    Mobile,
}

impl Platform {
    pub fn other(self) -> Self {
        match self {
            Platform::Desktop => Platform::Mobile,
            Platform::Mobile => Platform::Desktop,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Desktop => "desktop",
            Platform::Mobile => "mobile",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "desktop" => Ok(Platform::Desktop),
            "mobile" => Ok(Platform::Mobile),
            other => Err(format!("unknown platform: {}", other)),
        }
    }
}

/// Serialized snapshot per platform; `None` means never authored
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformContent {
    pub desktop: Option<String>,
    pub mobile: Option<String>,
}

impl PlatformContent {
    pub fn new(desktop: Option<String>, mobile: Option<String>) -> Self {
        Self { desktop, mobile }
    }

    pub fn get(&self, platform: Platform) -> Option<&str> {
        match platform {
            Platform::Desktop => self.desktop.as_deref(),
            Platform::Mobile => self.mobile.as_deref(),
        }
    }

    pub fn set(&mut self, platform: Platform, snapshot: String) {
        *self.slot_mut(platform) = Some(snapshot);
    }

    pub fn has(&self, platform: Platform) -> bool {
        self.get(platform).is_some()
    }

    fn slot_mut(&mut self, platform: Platform) -> &mut Option<String> {
        match platform {
            Platform::Desktop => &mut self.desktop,
            Platform::Mobile => &mut self.mobile,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_round_trip_names() {
        assert_eq!("mobile".parse::<Platform>(), Ok(Platform::Mobile));
        assert_eq!(Platform::Desktop.other(), Platform::Mobile);
        assert!("tablet".parse::<Platform>().is_err());
    }

    #[test]
    fn test_content_slots() {
        let mut content = PlatformContent::new(Some("d".to_string()), None);
        assert!(!content.has(Platform::Mobile));

        content.set(Platform::Mobile, "m".to_string());
        assert_eq!(content.get(Platform::Mobile), Some("m"));
        assert_eq!(content.get(Platform::Desktop), Some("d"));
    }
}
