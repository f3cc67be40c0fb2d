use serde::Serialize;

use crate::{ChartId, PlatformId, ValidationError};

/// One named chart on one platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChartEntry {
    pub platform: PlatformId,
    pub name: &'static str,
    pub id: &'static str,
}

const BUILTIN_CHARTS: [ChartEntry; 8] = [
    ChartEntry {
        platform: PlatformId::QqMusic,
        name: "热歌榜",
        id: "26",
    },
    ChartEntry {
        platform: PlatformId::QqMusic,
        name: "新歌榜",
        id: "27",
    },
    ChartEntry {
        platform: PlatformId::QqMusic,
        name: "飙升榜",
        id: "62",
    },
    ChartEntry {
        platform: PlatformId::Kugou,
        name: "TOP500榜",
        id: "8888",
    },
    ChartEntry {
        platform: PlatformId::Kugou,
        name: "飙升榜",
        id: "6666",
    },
    ChartEntry {
        platform: PlatformId::Netease,
        name: "热歌榜",
        id: "3778678",
    },
    ChartEntry {
        platform: PlatformId::Netease,
        name: "新歌榜",
        id: "3779629",
    },
    ChartEntry {
        platform: PlatformId::Netease,
        name: "飙升榜",
        id: "19723756",
    },
];

/// Known charts per platform, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartCatalog {
    entries: Vec<ChartEntry>,
}

impl Default for ChartCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ChartCatalog {
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN_CHARTS.to_vec(),
        }
    }

    pub fn entries(&self) -> &[ChartEntry] {
        &self.entries
    }

    pub fn charts(&self, platform: PlatformId) -> impl Iterator<Item = &ChartEntry> + '_ {
        self.entries
            .iter()
            .filter(move |entry| entry.platform == platform)
    }

    /// Finds a chart by display name or id.
    pub fn find(&self, platform: PlatformId, query: &str) -> Option<&ChartEntry> {
        let query = query.trim();
        self.charts(platform)
            .find(|entry| entry.name == query || entry.id == query)
    }

    /// Turns a chart name or id into a [`ChartId`].
    ///
    /// Unlisted all-digit ids pass through so charts missing from the table
    /// stay reachable.
    pub fn resolve(&self, platform: PlatformId, query: &str) -> Result<ChartId, ValidationError> {
        if let Some(entry) = self.find(platform, query) {
            return ChartId::parse(entry.id);
        }

        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyChartId);
        }
        if trimmed.bytes().all(|byte| byte.is_ascii_digit()) {
            return ChartId::parse(trimmed);
        }

        Err(ValidationError::UnknownChart {
            platform: platform.as_str().to_owned(),
            chart: trimmed.to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_platform_has_charts() {
        let catalog = ChartCatalog::builtin();
        assert_eq!(catalog.charts(PlatformId::QqMusic).count(), 3);
        assert_eq!(catalog.charts(PlatformId::Kugou).count(), 2);
        assert_eq!(catalog.charts(PlatformId::Netease).count(), 3);
    }

    #[test]
    fn resolves_by_name_or_id() {
        let catalog = ChartCatalog::builtin();
        assert_eq!(
            catalog.resolve(PlatformId::Netease, "飙升榜"),
            ChartId::parse("19723756")
        );
        assert_eq!(
            catalog.resolve(PlatformId::Kugou, " 8888 "),
            ChartId::parse("8888")
        );
        assert_eq!(
            catalog.resolve(PlatformId::QqMusic, "4"),
            ChartId::parse("4")
        );
    }

    #[test]
    fn names_are_scoped_to_their_platform() {
        let catalog = ChartCatalog::builtin();
        assert!(catalog.find(PlatformId::Kugou, "新歌榜").is_none());
        assert_eq!(
            catalog.resolve(PlatformId::Kugou, "新歌榜"),
            Err(ValidationError::UnknownChart {
                platform: String::from("kugou"),
                chart: String::from("新歌榜"),
            })
        );
    }
}
