//! Track and stream rows.
//!
//! Every function takes the session's connection so reads see the
//! session's uncommitted writes. None of them commit.

use sqlx::sqlite::SqliteConnection;

use crate::model::{NewTrack, Track, TrackRow, TrackSource};

/// First track with the given title (lowest id wins on duplicates).
pub async fn find_by_title(conn: &mut SqliteConnection, title: &str) -> sqlx::Result<Option<Track>> {
    let row = sqlx::query_as::<_, TrackRow>(select_tracks!("WHERE t.title = ? ORDER BY t.id LIMIT 1"))
        .bind(title)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row.map(Track::from))
}

/// Get a track by its database ID.
pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> sqlx::Result<Option<Track>> {
    let row = sqlx::query_as::<_, TrackRow>(select_tracks!("WHERE t.id = ?"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row.map(Track::from))
}

/// Every track, in id order.
pub async fn all(conn: &mut SqliteConnection) -> sqlx::Result<Vec<Track>> {
    let rows = sqlx::query_as::<_, TrackRow>(select_tracks!("ORDER BY t.id"))
        .fetch_all(&mut *conn)
        .await?;
    Ok(rows.into_iter().map(Track::from).collect())
}

/// Insert a track, its stream (for [`TrackSource::Stream`]), and its
/// initial playlist memberships.
///
/// # Returns
///
/// The stored track as read back from the database.
pub async fn insert(conn: &mut SqliteConnection, new: &NewTrack) -> sqlx::Result<Track> {
    let (path, stream_id) = match &new.source {
        TrackSource::Local(path) => (Some(path.as_str()), None),
        TrackSource::Stream(url) => {
            let result = sqlx::query("INSERT INTO stream (url) VALUES (?)")
                .bind(url)
                .execute(&mut *conn)
                .await?;
            (None, Some(result.last_insert_rowid()))
        }
    };

    let result = sqlx::query(
        r#"
        INSERT INTO track (title, artist, album, duration, path, stream_id, liked, cover_art_url)
        VALUES (?, ?, ?, ?, ?, ?, 0, ?)
        "#,
    )
    .bind(&new.title)
    .bind(&new.artist)
    .bind(&new.album)
    .bind(new.duration)
    .bind(path)
    .bind(stream_id)
    .bind(&new.cover_art_url)
    .execute(&mut *conn)
    .await?;
    let track_id = result.last_insert_rowid();

    for playlist in &new.playlists {
        super::playlists::add_member(&mut *conn, playlist.id, track_id).await?;
    }

    find_by_id(&mut *conn, track_id)
        .await?
        .ok_or(sqlx::Error::RowNotFound)
}

/// Set a track's cover art URL.
///
/// # Returns
///
/// Number of rows changed (0 if the track no longer exists).
pub async fn set_cover_art(
    conn: &mut SqliteConnection,
    track_id: i64,
    cover_art_url: &str,
) -> sqlx::Result<u64> {
    let result = sqlx::query("UPDATE track SET cover_art_url = ? WHERE id = ?")
        .bind(cover_art_url)
        .bind(track_id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}
