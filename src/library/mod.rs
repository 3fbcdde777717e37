//! Playlist and track management.
//!
//! [`PlaylistManager`] is the only place business rules live:
//! - get-or-create keyed on title, for both tracks and playlists
//! - membership adds and removes are idempotent
//! - the "Liked Songs" playlist is created the first time anything refers to it
//! - `None` operands to the null-safe mutators are silent no-ops
//!
//! Every operation is one unit of work on the manager's session. It ends
//! before the call returns: committed on success, rolled back on failure.
//! No snapshot outlives a call, so each call sees everything other
//! managers on the same store have committed.

mod import;

use std::path::Path;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::db::{self, Session, Store, playlists, tracks};
use crate::error::Result;
use crate::metadata::{self, LocalTrackInfo};
use crate::model::{
    DEFAULT_PLAYLIST_TITLE, LIKED_SONGS, NewPlaylist, NewTrack, Playlist, PlaylistContents, Track,
};

pub use import::ImportReport;

/// Album recorded for imported files when the caller has none.
pub const UNKNOWN_ALBUM: &str = "Unknown Album";

/// Create/query/update/delete operations over playlists and tracks.
///
/// Owns exactly one [`Session`]. Managers built from clones of the same
/// [`Store`] share its connection pool but never each other's session.
#[derive(Debug)]
pub struct PlaylistManager {
    store: Store,
    session: Session,
}

impl PlaylistManager {
    /// Ensure the schema exists, then open a session on `store`.
    pub async fn new(store: Store) -> Result<Self> {
        db::ensure_schema(store.pool()).await?;
        let session = Session::open(&store);
        Ok(Self { store, session })
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    // ========================================================================
    // Session lifecycle
    // ========================================================================

    /// Open a new session unless the current one is still active.
    pub fn open_session(&mut self) {
        if self.session.is_active() {
            return;
        }
        self.session = Session::open(&self.store);
        debug!("Session reopened");
    }

    pub async fn commit_session(&mut self) -> Result<()> {
        self.session.commit().await
    }

    /// Close the session, discarding uncommitted work. Every operation
    /// after this fails with `Error::SessionClosed` until
    /// [`open_session`](Self::open_session) is called.
    pub async fn close_session(&mut self) -> Result<()> {
        self.session.close().await?;
        debug!("Session closed");
        Ok(())
    }

    pub fn session_is_active(&self) -> bool {
        self.session.is_active()
    }

    /// End the current unit of work: commit on success, roll back on error.
    /// The original error is returned even if the rollback fails too.
    async fn finish<T>(&mut self, result: Result<T>) -> Result<T> {
        match result {
            Ok(value) => {
                self.session.commit().await?;
                Ok(value)
            }
            Err(e) => {
                if !e.is_session_closed()
                    && let Err(rollback) = self.session.rollback().await
                {
                    warn!(error = %rollback, "Rollback failed");
                }
                Err(e)
            }
        }
    }

    // ========================================================================
    // Tracks
    // ========================================================================

    /// First track matching `title`, or else `id`.
    ///
    /// A non-empty title takes precedence when both are given. Returns
    /// `None` when neither is given or nothing matches.
    pub async fn get_track(&mut self, title: Option<&str>, id: Option<i64>) -> Result<Option<Track>> {
        let session = &mut self.session;
        let result: Result<Option<Track>> = async {
            let conn = session.conn().await?;
            let track = match (title.filter(|t| !t.is_empty()), id) {
                (Some(title), _) => tracks::find_by_title(conn, title).await?,
                (None, Some(id)) => tracks::find_by_id(conn, id).await?,
                (None, None) => None,
            };
            Ok(track)
        }
        .await;
        self.finish(result).await
    }

    /// Every track, in id order.
    pub async fn list_tracks(&mut self) -> Result<Vec<Track>> {
        let session = &mut self.session;
        let result: Result<Vec<Track>> = async {
            let conn = session.conn().await?;
            Ok(tracks::all(conn).await?)
        }
        .await;
        self.finish(result).await
    }

    /// Existing track titled `title`, or a new streamed track.
    ///
    /// On the existing-match path every other argument is ignored and the
    /// stored track is returned unchanged.
    pub async fn get_or_create_track(
        &mut self,
        title: &str,
        artist: &str,
        album: &str,
        duration: i64,
        stream_url: &str,
        cover_art_url: Option<&str>,
    ) -> Result<Track> {
        let new = NewTrack::streamed(title, artist, album, duration, stream_url, cover_art_url);
        self.get_or_create_track_from(new).await
    }

    /// Get-or-create keyed on `new.title`, for any track source.
    pub async fn get_or_create_track_from(&mut self, new: NewTrack) -> Result<Track> {
        let session = &mut self.session;
        let result: Result<(Track, bool)> = async {
            let conn = session.conn().await?;
            if let Some(track) = tracks::find_by_title(&mut *conn, &new.title).await? {
                return Ok((track, false));
            }
            Ok((tracks::insert(conn, &new).await?, true))
        }
        .await;
        let (track, created) = self.finish(result).await?;

        if created {
            info!(id = track.id, title = %track.title, "Created track");
        } else {
            debug!(id = track.id, title = %track.title, "Track exists");
        }
        Ok(track)
    }

    /// Get-or-create a track for a local file whose metadata is already read.
    pub async fn get_or_create_local_track(&mut self, info: &LocalTrackInfo) -> Result<Track> {
        self.get_or_create_track_from(info.to_new_track()).await
    }

    /// Read a local audio file and get-or-create its track.
    ///
    /// The title defaults to the file stem and the album to
    /// [`UNKNOWN_ALBUM`].
    pub async fn import_file(
        &mut self,
        path: &Path,
        title: Option<&str>,
        album: Option<&str>,
    ) -> Result<Track> {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let title = title.unwrap_or(&stem);
        let album = album.unwrap_or(UNKNOWN_ALBUM);

        let info = metadata::read(path, title, album)?;
        self.get_or_create_local_track(&info).await
    }

    /// Set a track's cover art URL. `None` is a no-op.
    ///
    /// # Returns
    ///
    /// The updated track, or `None` if no track was given or it no longer
    /// exists.
    pub async fn add_track_cover_art(
        &mut self,
        track: Option<&Track>,
        cover_art_url: &str,
    ) -> Result<Option<Track>> {
        let Some(track) = track else {
            return Ok(None);
        };

        let session = &mut self.session;
        let result: Result<Option<Track>> = async {
            let conn = session.conn().await?;
            tracks::set_cover_art(&mut *conn, track.id, cover_art_url).await?;
            Ok(tracks::find_by_id(conn, track.id).await?)
        }
        .await;
        let updated = self.finish(result).await?;

        info!(id = track.id, "Set cover art");
        Ok(updated)
    }

    /// Playlists containing `track`, in id order.
    pub async fn track_playlists(&mut self, track: &Track) -> Result<Vec<Playlist>> {
        let session = &mut self.session;
        let result: Result<Vec<Playlist>> = async {
            let conn = session.conn().await?;
            Ok(playlists::playlists_of(conn, track.id).await?)
        }
        .await;
        self.finish(result).await
    }

    // ========================================================================
    // Playlists
    // ========================================================================

    /// First playlist titled `title`.
    pub async fn get_playlist(&mut self, title: &str) -> Result<Option<Playlist>> {
        let session = &mut self.session;
        let result: Result<Option<Playlist>> = async {
            let conn = session.conn().await?;
            Ok(playlists::find_by_title(conn, title).await?)
        }
        .await;
        self.finish(result).await
    }

    /// Every playlist, in id order.
    pub async fn list_playlists(&mut self) -> Result<Vec<Playlist>> {
        let session = &mut self.session;
        let result: Result<Vec<Playlist>> = async {
            let conn = session.conn().await?;
            Ok(playlists::all(conn).await?)
        }
        .await;
        self.finish(result).await
    }

    /// Existing playlist titled `title`, or a new one created now.
    pub async fn get_or_create_playlist(&mut self, title: &str) -> Result<Playlist> {
        let session = &mut self.session;
        let result: Result<(Playlist, bool)> = async {
            let conn = session.conn().await?;
            if let Some(playlist) = playlists::find_by_title(&mut *conn, title).await? {
                return Ok((playlist, false));
            }
            let new = NewPlaylist::new(title, Utc::now());
            Ok((playlists::insert(conn, &new).await?, true))
        }
        .await;
        let (playlist, created) = self.finish(result).await?;

        if created {
            info!(id = playlist.id, title = %playlist.title, "Created playlist");
        }
        Ok(playlist)
    }

    /// [`get_or_create_playlist`](Self::get_or_create_playlist) with the
    /// default title, "New Playlist".
    pub async fn get_or_create_default_playlist(&mut self) -> Result<Playlist> {
        self.get_or_create_playlist(DEFAULT_PLAYLIST_TITLE).await
    }

    pub async fn playlist_exists(&mut self, title: &str) -> Result<bool> {
        Ok(self.get_playlist(title).await?.is_some())
    }

    /// Rename a playlist. `None` is a no-op.
    ///
    /// # Returns
    ///
    /// The renamed playlist, or `None` if none was given or it no longer
    /// exists.
    pub async fn rename_playlist(
        &mut self,
        playlist: Option<&Playlist>,
        new_title: &str,
    ) -> Result<Option<Playlist>> {
        let Some(playlist) = playlist else {
            return Ok(None);
        };

        let session = &mut self.session;
        let result: Result<Option<Playlist>> = async {
            let conn = session.conn().await?;
            playlists::set_title(&mut *conn, playlist.id, new_title).await?;
            Ok(playlists::find_by_id(conn, playlist.id).await?)
        }
        .await;
        let updated = self.finish(result).await?;

        info!(
            id = playlist.id,
            from = %playlist.title,
            to = %new_title,
            "Renamed playlist"
        );
        Ok(updated)
    }

    /// Replace a playlist's description. `None` is a no-op.
    pub async fn edit_playlist_description(
        &mut self,
        playlist: Option<&Playlist>,
        new_description: &str,
    ) -> Result<Option<Playlist>> {
        let Some(playlist) = playlist else {
            return Ok(None);
        };

        let session = &mut self.session;
        let result: Result<Option<Playlist>> = async {
            let conn = session.conn().await?;
            playlists::set_description(&mut *conn, playlist.id, new_description).await?;
            Ok(playlists::find_by_id(conn, playlist.id).await?)
        }
        .await;
        let updated = self.finish(result).await?;

        info!(id = playlist.id, "Edited playlist description");
        Ok(updated)
    }

    /// Delete a playlist and its memberships. Member tracks stay.
    /// `None` is a no-op.
    ///
    /// # Returns
    ///
    /// `true` if a playlist row was removed.
    pub async fn delete_playlist(&mut self, playlist: Option<&Playlist>) -> Result<bool> {
        let Some(playlist) = playlist else {
            return Ok(false);
        };

        let session = &mut self.session;
        let result: Result<bool> = async {
            let conn = session.conn().await?;
            Ok(playlists::delete(conn, playlist.id).await?)
        }
        .await;
        let deleted = self.finish(result).await?;

        info!(id = playlist.id, title = %playlist.title, deleted, "Deleted playlist");
        Ok(deleted)
    }

    /// Member tracks of `playlist`, in track id order.
    pub async fn playlist_tracks(&mut self, playlist: &Playlist) -> Result<Vec<Track>> {
        let session = &mut self.session;
        let result: Result<Vec<Track>> = async {
            let conn = session.conn().await?;
            Ok(playlists::tracks_of(conn, playlist.id).await?)
        }
        .await;
        self.finish(result).await
    }

    /// `playlist` with its membership set loaded.
    pub async fn playlist_contents(&mut self, playlist: &Playlist) -> Result<PlaylistContents> {
        let tracks = self.playlist_tracks(playlist).await?;
        Ok(PlaylistContents {
            playlist: playlist.clone(),
            tracks,
        })
    }

    /// Number of tracks in `playlist`.
    pub async fn playlist_length(&mut self, playlist: &Playlist) -> Result<i64> {
        let session = &mut self.session;
        let result: Result<i64> = async {
            let conn = session.conn().await?;
            Ok(playlists::count_members(conn, playlist.id).await?)
        }
        .await;
        self.finish(result).await
    }

    /// Sum of member durations in seconds; zero for an empty playlist.
    pub async fn playlist_total_duration(&mut self, playlist: &Playlist) -> Result<i64> {
        let session = &mut self.session;
        let result: Result<i64> = async {
            let conn = session.conn().await?;
            Ok(playlists::total_duration(conn, playlist.id).await?)
        }
        .await;
        self.finish(result).await
    }

    // ========================================================================
    // Membership
    // ========================================================================

    /// Add `track` to `playlist`.
    ///
    /// # Returns
    ///
    /// `true` if the track was added, `false` if it was already a member.
    ///
    /// # Errors
    ///
    /// Fails with a database error if either row no longer exists.
    pub async fn add_track_to_playlist(&mut self, track: &Track, playlist: &Playlist) -> Result<bool> {
        let session = &mut self.session;
        let result: Result<bool> = async {
            let conn = session.conn().await?;
            Ok(playlists::add_member(conn, playlist.id, track.id).await?)
        }
        .await;
        let added = self.finish(result).await?;

        if added {
            info!(track = track.id, playlist = playlist.id, "Added track to playlist");
        }
        Ok(added)
    }

    /// Get-or-create a track, then add it to `playlist`.
    pub async fn create_and_add_track_to_playlist(
        &mut self,
        new: NewTrack,
        playlist: &Playlist,
    ) -> Result<Track> {
        let track = self.get_or_create_track_from(new).await?;
        self.add_track_to_playlist(&track, playlist).await?;
        Ok(track)
    }

    /// Remove `track` from `playlist`.
    ///
    /// # Returns
    ///
    /// `true` if the track was a member.
    pub async fn remove_track_from_playlist(
        &mut self,
        track: &Track,
        playlist: &Playlist,
    ) -> Result<bool> {
        let session = &mut self.session;
        let result: Result<bool> = async {
            let conn = session.conn().await?;
            Ok(playlists::remove_member(conn, playlist.id, track.id).await?)
        }
        .await;
        let removed = self.finish(result).await?;

        if removed {
            info!(track = track.id, playlist = playlist.id, "Removed track from playlist");
        }
        Ok(removed)
    }

    // ========================================================================
    // Liked Songs
    // ========================================================================

    /// The "Liked Songs" playlist, created on first reference.
    pub async fn liked_songs(&mut self) -> Result<Playlist> {
        self.get_or_create_playlist(LIKED_SONGS).await
    }

    pub async fn add_track_to_liked_songs(&mut self, track: &Track) -> Result<()> {
        let liked = self.liked_songs().await?;
        self.add_track_to_playlist(track, &liked).await?;
        Ok(())
    }

    /// Get-or-create "Liked Songs" and the track, then like the track.
    pub async fn create_and_add_track_to_liked_songs(&mut self, new: NewTrack) -> Result<Track> {
        let liked = self.liked_songs().await?;
        self.create_and_add_track_to_playlist(new, &liked).await
    }

    pub async fn remove_track_from_liked_songs(&mut self, track: &Track) -> Result<()> {
        let liked = self.liked_songs().await?;
        self.remove_track_from_playlist(track, &liked).await?;
        Ok(())
    }

    /// Whether `track` is in "Liked Songs".
    pub async fn track_is_liked(&mut self, track: &Track) -> Result<bool> {
        let liked = self.liked_songs().await?;
        let session = &mut self.session;
        let result: Result<bool> = async {
            let conn = session.conn().await?;
            Ok(playlists::is_member(conn, liked.id, track.id).await?)
        }
        .await;
        self.finish(result).await
    }
}


/// Property-based tests using proptest
#[cfg(test)]
mod proptests {
    use super::*;
    use crate::test_utils::{create_track, mock_new_track, temp_manager};
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[derive(Debug, Clone)]
    enum Op {
        Add(usize),
        Remove(usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![(0usize..4).prop_map(Op::Add), (0usize..4).prop_map(Op::Remove)]
    }

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("Failed to build runtime")
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        /// Any sequence of adds and removes leaves exactly the set a
        /// HashSet would hold.
        #[test]
        fn membership_matches_set_model(ops in prop::collection::vec(op(), 0..20)) {
            let (stored, expected) = runtime().block_on(async {
                let (mut manager, _dir) = temp_manager().await;
                let playlist = manager.get_or_create_playlist("Model").await.unwrap();
                let mut tracks = Vec::new();
                for i in 0..4 {
                    tracks.push(create_track(&mut manager, mock_new_track(&format!("T{}", i), 60)).await);
                }

                let mut model = HashSet::new();
                for op in &ops {
                    match *op {
                        Op::Add(i) => {
                            let added = manager.add_track_to_playlist(&tracks[i], &playlist).await.unwrap();
                            assert_eq!(added, model.insert(tracks[i].id));
                        }
                        Op::Remove(i) => {
                            let removed = manager.remove_track_from_playlist(&tracks[i], &playlist).await.unwrap();
                            assert_eq!(removed, model.remove(&tracks[i].id));
                        }
                    }
                }

                let stored: HashSet<i64> = manager
                    .playlist_tracks(&playlist)
                    .await
                    .unwrap()
                    .into_iter()
                    .map(|t| t.id)
                    .collect();
                (stored, model)
            });
            prop_assert_eq!(stored, expected);
        }

        /// Total duration equals the sum of member durations.
        #[test]
        fn total_duration_is_sum(durations in prop::collection::vec(0i64..36_000, 0..10)) {
            let total = runtime().block_on(async {
                let (mut manager, _dir) = temp_manager().await;
                let playlist = manager.get_or_create_playlist("Sum").await.unwrap();
                for (i, duration) in durations.iter().enumerate() {
                    manager
                        .create_and_add_track_to_playlist(mock_new_track(&format!("T{}", i), *duration), &playlist)
                        .await
                        .unwrap();
                }
                manager.playlist_total_duration(&playlist).await.unwrap()
            });
            prop_assert_eq!(total, durations.iter().sum::<i64>());
        }
    }
}
