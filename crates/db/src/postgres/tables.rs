//! Table mappings for every catalog entity.

use std::collections::HashMap;

use async_trait::async_trait;
use mediashelf_core::entity::CatalogEntity;
use mediashelf_core::types::DbId;
use sqlx::PgConnection;

use super::{PgEntity, Value};
use crate::models::{
    Book, BookCategory, Episode, Game, Genre, Medium, Movie, Music, Program, Season, Show, Song,
};

fn persisted_ids<E: CatalogEntity>(rows: &[E]) -> Vec<DbId> {
    rows.iter().filter_map(|row| row.id()).collect()
}

/* --------------------------------------------------------------------------
Genre links
-------------------------------------------------------------------------- */

async fn load_genre_links(
    conn: &mut PgConnection,
    table: &str,
    owner_column: &str,
    owners: &[DbId],
) -> sqlx::Result<HashMap<DbId, Vec<DbId>>> {
    let query = format!(
        "SELECT {owner_column}, genre_id FROM {table} \
         WHERE {owner_column} = ANY($1) \
         ORDER BY {owner_column}, ordinal"
    );
    let links = sqlx::query_as::<_, (DbId, DbId)>(&query)
        .bind(owners)
        .fetch_all(&mut *conn)
        .await?;

    let mut by_owner: HashMap<DbId, Vec<DbId>> = HashMap::new();
    for (owner, genre) in links {
        by_owner.entry(owner).or_default().push(genre);
    }
    Ok(by_owner)
}

async fn save_genre_links(
    conn: &mut PgConnection,
    table: &str,
    owner_column: &str,
    owner: DbId,
    genres: &[DbId],
) -> sqlx::Result<()> {
    let delete = format!("DELETE FROM {table} WHERE {owner_column} = $1");
    sqlx::query(&delete).bind(owner).execute(&mut *conn).await?;

    if !genres.is_empty() {
        let insert = format!(
            "INSERT INTO {table} ({owner_column}, genre_id, ordinal) \
             SELECT $1, g.genre_id, g.ordinal \
             FROM UNNEST($2::BIGINT[]) WITH ORDINALITY AS g(genre_id, ordinal)"
        );
        sqlx::query(&insert)
            .bind(owner)
            .bind(genres)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

/* --------------------------------------------------------------------------
Global tables
-------------------------------------------------------------------------- */

#[async_trait]
impl PgEntity for Genre {
    const TABLE: &'static str = "genres";
    const COLUMNS: &'static [&'static str] = &["name"];

    fn values(&self) -> Vec<Value> {
        vec![Value::Text(self.name.clone())]
    }
}

#[async_trait]
impl PgEntity for Movie {
    const TABLE: &'static str = "movies";
    const COLUMNS: &'static [&'static str] = &[
        "czech_name",
        "original_name",
        "year",
        "languages",
        "subtitles",
        "csfd",
        "imdb_code",
        "wiki_en",
        "wiki_cz",
        "picture",
        "note",
    ];

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.czech_name.clone()),
            Value::Text(self.original_name.clone()),
            Value::Int(self.year),
            Value::TextList(self.languages.clone()),
            Value::TextList(self.subtitles.clone()),
            Value::OptText(self.csfd.clone()),
            Value::OptInt(self.imdb_code),
            Value::OptText(self.wiki_en.clone()),
            Value::OptText(self.wiki_cz.clone()),
            Value::OptText(self.picture.clone()),
            Value::OptText(self.note.clone()),
        ]
    }

    async fn load_children(conn: &mut PgConnection, rows: &mut [Self]) -> sqlx::Result<()> {
        let ids = persisted_ids(rows);
        if ids.is_empty() {
            return Ok(());
        }

        let media = sqlx::query_as::<_, (DbId, DbId, i32, i32)>(
            "SELECT movie_id, id, number, length FROM media \
             WHERE movie_id = ANY($1) \
             ORDER BY movie_id, number, id",
        )
        .bind(&ids)
        .fetch_all(&mut *conn)
        .await?;
        let mut media_by_movie: HashMap<DbId, Vec<Medium>> = HashMap::new();
        for (movie_id, id, number, length) in media {
            media_by_movie.entry(movie_id).or_default().push(Medium {
                id: Some(id),
                number,
                length,
            });
        }

        let mut genres = load_genre_links(conn, "movie_genres", "movie_id", &ids).await?;
        for row in rows.iter_mut() {
            let Some(id) = row.meta.id else { continue };
            row.media = media_by_movie.remove(&id).unwrap_or_default();
            row.genres = genres.remove(&id).unwrap_or_default();
        }
        Ok(())
    }

    async fn save_children(conn: &mut PgConnection, id: DbId, row: &Self) -> sqlx::Result<()> {
        sqlx::query("DELETE FROM media WHERE movie_id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        if !row.media.is_empty() {
            let numbers: Vec<i32> = row.media.iter().map(|m| m.number).collect();
            let lengths: Vec<i32> = row.media.iter().map(|m| m.length).collect();
            sqlx::query(
                "INSERT INTO media (movie_id, number, length) \
                 SELECT $1, m.number, m.length \
                 FROM UNNEST($2::INTEGER[], $3::INTEGER[]) AS m(number, length)",
            )
            .bind(id)
            .bind(&numbers)
            .bind(&lengths)
            .execute(&mut *conn)
            .await?;
        }
        save_genre_links(conn, "movie_genres", "movie_id", id, &row.genres).await
    }
}

#[async_trait]
impl PgEntity for Show {
    const TABLE: &'static str = "shows";
    const COLUMNS: &'static [&'static str] = &[
        "czech_name",
        "original_name",
        "csfd",
        "imdb_code",
        "wiki_en",
        "wiki_cz",
        "picture",
        "note",
    ];

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.czech_name.clone()),
            Value::Text(self.original_name.clone()),
            Value::OptText(self.csfd.clone()),
            Value::OptInt(self.imdb_code),
            Value::OptText(self.wiki_en.clone()),
            Value::OptText(self.wiki_cz.clone()),
            Value::OptText(self.picture.clone()),
            Value::OptText(self.note.clone()),
        ]
    }

    async fn load_children(conn: &mut PgConnection, rows: &mut [Self]) -> sqlx::Result<()> {
        let ids = persisted_ids(rows);
        if ids.is_empty() {
            return Ok(());
        }
        let mut genres = load_genre_links(conn, "show_genres", "show_id", &ids).await?;
        for row in rows.iter_mut() {
            let Some(id) = row.meta.id else { continue };
            row.genres = genres.remove(&id).unwrap_or_default();
        }
        Ok(())
    }

    async fn save_children(conn: &mut PgConnection, id: DbId, row: &Self) -> sqlx::Result<()> {
        save_genre_links(conn, "show_genres", "show_id", id, &row.genres).await
    }

    /// Seasons keep their positions; each copied season gets its episodes.
    async fn copy_children(conn: &mut PgConnection, from: DbId, to: DbId) -> sqlx::Result<()> {
        let seasons = sqlx::query_scalar::<_, DbId>(
            "SELECT id FROM seasons WHERE show_id = $1 ORDER BY position, id",
        )
        .bind(from)
        .fetch_all(&mut *conn)
        .await?;

        for season in seasons {
            let copy = sqlx::query_scalar::<_, DbId>(
                "INSERT INTO seasons \
                    (show_id, number, start_year, end_year, language, subtitles, note, position) \
                 SELECT $2, number, start_year, end_year, language, subtitles, note, position \
                 FROM seasons WHERE id = $1 \
                 RETURNING id",
            )
            .bind(season)
            .bind(to)
            .fetch_one(&mut *conn)
            .await?;
            Season::copy_children(conn, season, copy).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl PgEntity for Music {
    const TABLE: &'static str = "music";
    const COLUMNS: &'static [&'static str] = &["name", "wiki_en", "wiki_cz", "media_count", "note"];

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.name.clone()),
            Value::OptText(self.wiki_en.clone()),
            Value::OptText(self.wiki_cz.clone()),
            Value::Int(self.media_count),
            Value::OptText(self.note.clone()),
        ]
    }

    async fn copy_children(conn: &mut PgConnection, from: DbId, to: DbId) -> sqlx::Result<()> {
        sqlx::query(
            "INSERT INTO songs (music_id, name, length, note, position) \
             SELECT $2, name, length, note, position FROM songs WHERE music_id = $1",
        )
        .bind(from)
        .bind(to)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl PgEntity for BookCategory {
    const TABLE: &'static str = "book_categories";
    const COLUMNS: &'static [&'static str] = &["name", "note"];

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.name.clone()),
            Value::OptText(self.note.clone()),
        ]
    }

    async fn copy_children(conn: &mut PgConnection, from: DbId, to: DbId) -> sqlx::Result<()> {
        sqlx::query(
            "INSERT INTO books (category_id, author, title, languages, note, position) \
             SELECT $2, author, title, languages, note, position \
             FROM books WHERE category_id = $1",
        )
        .bind(from)
        .bind(to)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl PgEntity for Game {
    const TABLE: &'static str = "games";
    const COLUMNS: &'static [&'static str] = &[
        "name",
        "wiki_en",
        "wiki_cz",
        "media_count",
        "crack",
        "serial_key",
        "patch",
        "trainer",
        "trainer_data",
        "editor",
        "saves",
        "other_data",
        "note",
    ];

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.name.clone()),
            Value::OptText(self.wiki_en.clone()),
            Value::OptText(self.wiki_cz.clone()),
            Value::Int(self.media_count),
            Value::Bool(self.crack),
            Value::Bool(self.serial_key),
            Value::Bool(self.patch),
            Value::Bool(self.trainer),
            Value::Bool(self.trainer_data),
            Value::Bool(self.editor),
            Value::Bool(self.saves),
            Value::OptText(self.other_data.clone()),
            Value::OptText(self.note.clone()),
        ]
    }
}

#[async_trait]
impl PgEntity for Program {
    const TABLE: &'static str = "programs";
    const COLUMNS: &'static [&'static str] = &[
        "name",
        "wiki_en",
        "wiki_cz",
        "media_count",
        "crack",
        "serial_key",
        "other_data",
        "note",
    ];

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.name.clone()),
            Value::OptText(self.wiki_en.clone()),
            Value::OptText(self.wiki_cz.clone()),
            Value::Int(self.media_count),
            Value::Bool(self.crack),
            Value::Bool(self.serial_key),
            Value::OptText(self.other_data.clone()),
            Value::OptText(self.note.clone()),
        ]
    }
}

/* --------------------------------------------------------------------------
Scoped tables
-------------------------------------------------------------------------- */

#[async_trait]
impl PgEntity for Season {
    const TABLE: &'static str = "seasons";
    const COLUMNS: &'static [&'static str] = &[
        "number",
        "start_year",
        "end_year",
        "language",
        "subtitles",
        "note",
    ];
    const SCOPE_COLUMN: Option<&'static str> = Some("show_id");

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Int(self.number),
            Value::Int(self.start_year),
            Value::Int(self.end_year),
            Value::Text(self.language.clone()),
            Value::TextList(self.subtitles.clone()),
            Value::OptText(self.note.clone()),
        ]
    }

    async fn copy_children(conn: &mut PgConnection, from: DbId, to: DbId) -> sqlx::Result<()> {
        sqlx::query(
            "INSERT INTO episodes (season_id, number, name, length, note, position) \
             SELECT $2, number, name, length, note, position \
             FROM episodes WHERE season_id = $1",
        )
        .bind(from)
        .bind(to)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl PgEntity for Episode {
    const TABLE: &'static str = "episodes";
    const COLUMNS: &'static [&'static str] = &["number", "name", "length", "note"];
    const SCOPE_COLUMN: Option<&'static str> = Some("season_id");

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Int(self.number),
            Value::Text(self.name.clone()),
            Value::Int(self.length),
            Value::OptText(self.note.clone()),
        ]
    }
}

#[async_trait]
impl PgEntity for Song {
    const TABLE: &'static str = "songs";
    const COLUMNS: &'static [&'static str] = &["name", "length", "note"];
    const SCOPE_COLUMN: Option<&'static str> = Some("music_id");

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.name.clone()),
            Value::Int(self.length),
            Value::OptText(self.note.clone()),
        ]
    }
}

#[async_trait]
impl PgEntity for Book {
    const TABLE: &'static str = "books";
    const COLUMNS: &'static [&'static str] = &["author", "title", "languages", "note"];
    const SCOPE_COLUMN: Option<&'static str> = Some("category_id");

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.author.clone()),
            Value::Text(self.title.clone()),
            Value::TextList(self.languages.clone()),
            Value::OptText(self.note.clone()),
        ]
    }
}
