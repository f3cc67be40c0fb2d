//! # Chartfetch Core
//!
//! Clients and orchestration for fetching music charts from QQ Music, Kugou
//! and NetEase Cloud Music into one normalized track shape.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Platform clients (QQ Music, Kugou, NetEase) |
//! | [`catalog`] | Built-in chart names and ids |
//! | [`chart_source`] | Chart source trait, request and error types |
//! | [`crypto`] | Weapi payload cipher |
//! | [`domain`] | Chart id and track record models |
//! | [`error`] | Validation errors |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`platform`] | Platform identifiers and aliases |
//! | [`registry`] | Platform name to client constructor registry |
//! | [`retry`] | Fixed-delay retry orchestration |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use chartfetch_core::{RetryConfig, SourceRegistryBuilder};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = SourceRegistryBuilder::new().with_env().build();
//!     let tracks = registry
//!         .fetch("netease", "3778678", 20, &RetryConfig::default())
//!         .await?;
//!
//!     for track in &tracks {
//!         println!("{:>3}. {} - {}", track.rank(), track.artist(), track.title());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │  CLI / caller    │
//! └────────┬─────────┘
//!          │ platform name, chart id, limit
//!          ▼
//! ┌──────────────────┐     ┌──────────────────┐
//! │ Source Registry  │────▶│ fetch_with_retry │
//! └──────────────────┘     └────────┬─────────┘
//!                                   │
//!                                   ▼
//! ┌──────────────────┐     ┌──────────────────┐
//! │ Weapi cipher     │◀────│ Chart Source     │
//! │ (NetEase only)   │     │ (adapter trait)  │
//! └──────────────────┘     └────────┬─────────┘
//!                                   │
//!                                   ▼
//!                          ┌──────────────────┐
//!                          │ HTTP Client      │
//!                          │ (reqwest)        │
//!                          └──────────────────┘
//! ```

pub mod adapters;
pub mod catalog;
pub mod chart_source;
pub mod crypto;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod platform;
pub mod registry;
pub mod retry;

pub use adapters::{
    split_file_name, KugouClient, KugouConfig, NeteaseClient, NeteaseConfig,
    PlaylistDetailPayload, QqMusicClient, QqMusicConfig, DESKTOP_USER_AGENT,
};
pub use catalog::{ChartCatalog, ChartEntry};
pub use chart_source::{ChartRequest, ChartSource, FetchFuture, SourceError, SourceErrorKind};
pub use crypto::{weapi, weapi_with_key, CryptoError, EncryptedEnvelope, SecretKey};
pub use domain::{
    join_artists, rank_tracks, ChartId, TrackDraft, TrackRecord, ARTIST_SEPARATOR,
    UNKNOWN_ARTIST,
};
pub use error::ValidationError;
pub use http_client::{
    HttpClient, HttpError, HttpFuture, HttpMethod, HttpRequest, HttpResponse, ReqwestHttpClient,
};
pub use platform::PlatformId;
pub use registry::{SourceContext, SourceFactory, SourceRegistry, SourceRegistryBuilder};
pub use retry::{fetch_with_retry, RetryConfig, RetryOutcome};
