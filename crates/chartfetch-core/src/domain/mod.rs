//! # Domain Models
//!
//! Canonical chart types shared by every platform client.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`ChartId`] | Validated, platform-scoped chart identifier |
//! | [`TrackRecord`] | Ranked, immutable chart entry |
//! | [`TrackDraft`] | Unranked entry used while mapping raw payloads |
//!
//! Ranks are always assigned by position through [`rank_tracks`], never copied
//! from upstream data.

mod chart_id;
mod track;

pub use chart_id::ChartId;
pub use track::{
    join_artists, rank_tracks, TrackDraft, TrackRecord, ARTIST_SEPARATOR, UNKNOWN_ARTIST,
};
