use sqlx::PgConnection;
use streamtally_core::SongSummary;
use uuid::Uuid;

use crate::DbError;

/// A row from the `songs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SongRow {
    pub id: Uuid,
    pub artist: String,
    pub title: String,
    pub album: String,
    pub youtube_url: Option<String>,
    pub melon_song_id: Option<String>,
}

impl From<SongRow> for SongSummary {
    fn from(row: SongRow) -> Self {
        SongSummary {
            id: row.id,
            artist: row.artist,
            title: row.title,
            album: row.album,
            youtube_url: row.youtube_url,
            melon_song_id: row.melon_song_id,
        }
    }
}

/// Looks up a song by id. Returns `Ok(None)` if it does not exist.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_song(
    conn: &mut PgConnection,
    song_id: Uuid,
) -> Result<Option<SongSummary>, DbError> {
    let row = sqlx::query_as::<_, SongRow>(
        "SELECT id, artist, title, album, youtube_url, melon_song_id \
         FROM songs \
         WHERE id = $1",
    )
    .bind(song_id)
    .fetch_optional(conn)
    .await?;

    Ok(row.map(SongSummary::from))
}
