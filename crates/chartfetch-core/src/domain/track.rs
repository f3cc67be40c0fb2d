use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Separator used when a track credits more than one artist.
pub const ARTIST_SEPARATOR: &str = " / ";

/// Placeholder artist for entries that carry no artist credit.
pub const UNKNOWN_ARTIST: &str = "未知歌手";

/// Normalized chart entry shared by every platform client.
///
/// Fields are private so a record cannot change after a client returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTrackRecord")]
pub struct TrackRecord {
    rank: u32,
    title: String,
    artist: String,
    album: String,
}

impl TrackRecord {
    pub fn new(
        rank: u32,
        title: impl Into<String>,
        artist: impl Into<String>,
        album: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        if rank == 0 {
            return Err(ValidationError::ZeroRank);
        }

        Ok(Self {
            rank,
            title: title.into(),
            artist: artist.into(),
            album: album.into(),
        })
    }

    pub const fn rank(&self) -> u32 {
        self.rank
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn artist(&self) -> &str {
        &self.artist
    }

    pub fn album(&self) -> &str {
        &self.album
    }
}

/// Unvalidated wire shape; deserialization goes through [`TrackRecord::new`].
#[derive(Deserialize)]
struct RawTrackRecord {
    rank: u32,
    title: String,
    artist: String,
    album: String,
}

impl TryFrom<RawTrackRecord> for TrackRecord {
    type Error = ValidationError;

    fn try_from(raw: RawTrackRecord) -> Result<Self, Self::Error> {
        Self::new(raw.rank, raw.title, raw.artist, raw.album)
    }
}

/// Unranked entry produced while mapping a raw platform payload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrackDraft {
    pub title: String,
    pub artist: String,
    pub album: String,
}

impl TrackDraft {
    pub fn new(
        title: impl Into<String>,
        artist: impl Into<String>,
        album: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            album: album.into(),
        }
    }
}

/// Assigns contiguous 1-based ranks in source order, keeping at most `limit`
/// entries and never pulling more than that from `drafts`.
pub fn rank_tracks<I>(drafts: I, limit: usize) -> Vec<TrackRecord>
where
    I: IntoIterator<Item = TrackDraft>,
{
    drafts
        .into_iter()
        .take(limit)
        .zip(1u32..)
        .map(|(draft, rank)| TrackRecord {
            rank,
            title: draft.title,
            artist: draft.artist,
            album: draft.album,
        })
        .collect()
}

/// Joins artist names with [`ARTIST_SEPARATOR`], skipping blanks.
pub fn join_artists<I, S>(names: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .filter_map(|name| {
            let trimmed = name.as_ref().trim();
            (!trimmed.is_empty()).then(|| trimmed.to_owned())
        })
        .collect::<Vec<_>>()
        .join(ARTIST_SEPARATOR)
}
