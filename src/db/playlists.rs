//! Playlist rows and the `playlist_track` membership set.
//!
//! Membership is a set. Adds only insert a pair that is not already
//! present, so the set holds even on older stores whose `playlist_track`
//! has no primary key. Reads count each member once, and removes of absent
//! pairs change nothing.

use sqlx::sqlite::SqliteConnection;

use crate::model::{NewPlaylist, Playlist, PlaylistRow, Track, TrackRow};

/// First playlist with the given title (lowest id wins on duplicates).
pub async fn find_by_title(
    conn: &mut SqliteConnection,
    title: &str,
) -> sqlx::Result<Option<Playlist>> {
    let row = sqlx::query_as::<_, PlaylistRow>(select_playlists!(
        "WHERE p.title = ? ORDER BY p.id LIMIT 1"
    ))
    .bind(title)
    .fetch_optional(&mut *conn)
    .await?;
    row.map(Playlist::try_from).transpose()
}

pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> sqlx::Result<Option<Playlist>> {
    let row = sqlx::query_as::<_, PlaylistRow>(select_playlists!("WHERE p.id = ?"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    row.map(Playlist::try_from).transpose()
}

/// Every playlist, in id order.
pub async fn all(conn: &mut SqliteConnection) -> sqlx::Result<Vec<Playlist>> {
    let rows = sqlx::query_as::<_, PlaylistRow>(select_playlists!("ORDER BY p.id"))
        .fetch_all(&mut *conn)
        .await?;
    rows.into_iter().map(Playlist::try_from).collect()
}

/// Insert a playlist row and read it back.
pub async fn insert(conn: &mut SqliteConnection, new: &NewPlaylist) -> sqlx::Result<Playlist> {
    let result = sqlx::query(
        "INSERT INTO playlist (title, description, date_created, downloaded) VALUES (?, ?, ?, 0)",
    )
    .bind(&new.title)
    .bind(&new.description)
    .bind(new.date_created.to_rfc3339())
    .execute(&mut *conn)
    .await?;

    find_by_id(&mut *conn, result.last_insert_rowid())
        .await?
        .ok_or(sqlx::Error::RowNotFound)
}

/// Update the title. Returns the number of rows changed.
pub async fn set_title(conn: &mut SqliteConnection, id: i64, title: &str) -> sqlx::Result<u64> {
    let result = sqlx::query("UPDATE playlist SET title = ? WHERE id = ?")
        .bind(title)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}

/// Update the description. Returns the number of rows changed.
pub async fn set_description(
    conn: &mut SqliteConnection,
    id: i64,
    description: &str,
) -> sqlx::Result<u64> {
    let result = sqlx::query("UPDATE playlist SET description = ? WHERE id = ?")
        .bind(description)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}

/// Delete a playlist and its membership rows. Member tracks are untouched.
///
/// # Returns
///
/// `true` if a playlist row was removed.
pub async fn delete(conn: &mut SqliteConnection, id: i64) -> sqlx::Result<bool> {
    sqlx::query("DELETE FROM playlist_track WHERE playlist_id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    let result = sqlx::query("DELETE FROM playlist WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Add a track to a playlist.
///
/// # Returns
///
/// `true` if the pair was new, `false` if the track was already a member.
pub async fn add_member(
    conn: &mut SqliteConnection,
    playlist_id: i64,
    track_id: i64,
) -> sqlx::Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT OR IGNORE INTO playlist_track (playlist_id, track_id)
        SELECT ?1, ?2
        WHERE NOT EXISTS (
            SELECT 1 FROM playlist_track WHERE playlist_id = ?1 AND track_id = ?2
        )
        "#,
    )
    .bind(playlist_id)
    .bind(track_id)
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Remove a track from a playlist.
///
/// # Returns
///
/// `true` if the pair existed.
pub async fn remove_member(
    conn: &mut SqliteConnection,
    playlist_id: i64,
    track_id: i64,
) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM playlist_track WHERE playlist_id = ? AND track_id = ?")
        .bind(playlist_id)
        .bind(track_id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn is_member(
    conn: &mut SqliteConnection,
    playlist_id: i64,
    track_id: i64,
) -> sqlx::Result<bool> {
    let found: Option<i64> = sqlx::query_scalar(
        "SELECT 1 FROM playlist_track WHERE playlist_id = ? AND track_id = ? LIMIT 1",
    )
    .bind(playlist_id)
    .bind(track_id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(found.is_some())
}

/// Member tracks of a playlist, in track id order.
pub async fn tracks_of(conn: &mut SqliteConnection, playlist_id: i64) -> sqlx::Result<Vec<Track>> {
    let rows = sqlx::query_as::<_, TrackRow>(select_tracks!(
        "WHERE t.id IN (SELECT track_id FROM playlist_track WHERE playlist_id = ?) ORDER BY t.id"
    ))
    .bind(playlist_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows.into_iter().map(Track::from).collect())
}

/// Playlists a track belongs to, in playlist id order.
pub async fn playlists_of(
    conn: &mut SqliteConnection,
    track_id: i64,
) -> sqlx::Result<Vec<Playlist>> {
    let rows = sqlx::query_as::<_, PlaylistRow>(select_playlists!(
        "WHERE p.id IN (SELECT playlist_id FROM playlist_track WHERE track_id = ?) ORDER BY p.id"
    ))
    .bind(track_id)
    .fetch_all(&mut *conn)
    .await?;
    rows.into_iter().map(Playlist::try_from).collect()
}

/// Number of member tracks.
pub async fn count_members(conn: &mut SqliteConnection, playlist_id: i64) -> sqlx::Result<i64> {
    sqlx::query_scalar("SELECT COUNT(DISTINCT track_id) FROM playlist_track WHERE playlist_id = ?")
        .bind(playlist_id)
        .fetch_one(&mut *conn)
        .await
}

/// Sum of member durations in seconds; zero for an empty playlist.
pub async fn total_duration(conn: &mut SqliteConnection, playlist_id: i64) -> sqlx::Result<i64> {
    sqlx::query_scalar(
        r#"
        SELECT COALESCE(SUM(t.duration), 0)
        FROM track t
        WHERE t.id IN (SELECT track_id FROM playlist_track WHERE playlist_id = ?)
        "#,
    )
    .bind(playlist_id)
    .fetch_one(&mut *conn)
    .await
}
