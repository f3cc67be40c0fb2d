use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Built-in chart platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformId {
    QqMusic,
    Kugou,
    Netease,
}

impl PlatformId {
    pub const ALL: [Self; 3] = [Self::QqMusic, Self::Kugou, Self::Netease];

    /// Registry key used for lookups and export file names.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::QqMusic => "qqmusic",
            Self::Kugou => "kugou",
            Self::Netease => "netease",
        }
    }

    /// Name shown to users of the platform itself.
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::QqMusic => "QQ音乐",
            Self::Kugou => "酷狗音乐",
            Self::Netease => "网易云音乐",
        }
    }
}

impl Display for PlatformId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlatformId {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "qq" | "qqmusic" | "qq_music" | "qq-music" | "qq音乐" => Ok(Self::QqMusic),
            "kugou" | "酷狗" | "酷狗音乐" => Ok(Self::Kugou),
            "netease" | "163" | "ncm" | "网易云" | "网易云音乐" => Ok(Self::Netease),
            _ => Err(ValidationError::InvalidPlatform {
                value: trimmed.to_owned(),
            }),
        }
    }
}
