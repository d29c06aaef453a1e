//! Relational rules of every catalog table held in memory.

use mediashelf_core::entity::{CatalogEntity, Scope};
use mediashelf_core::store::StoreResult;
use mediashelf_core::types::DbId;

use super::{missing_reference, MemoryEntity, Table, Tables};
use crate::models::{
    Book, BookCategory, Episode, Game, Genre, Movie, Music, Program, Season, Show, Song,
};

/// Copy every row owned by `from` under `to`, keeping positions.
///
/// Returns `(source id, copy id)` pairs so grandchildren can follow.
fn copy_owned<C: MemoryEntity>(
    tables: &mut Tables,
    from: DbId,
    to: DbId,
    reparent: fn(&mut C, DbId),
) -> Vec<(DbId, DbId)> {
    let table = C::table_mut(tables);
    let sources = table.sorted(table.in_scope(Scope::Parent(from)));
    sources
        .into_iter()
        .filter_map(|source| {
            let source_id = source.id()?;
            let mut copy = source.duplicate();
            reparent(&mut copy, to);
            table.insert_new(copy).id().map(|id| (source_id, id))
        })
        .collect()
}

/// Delete every row owned by `parent`, returning the deleted ids.
fn remove_owned<C: MemoryEntity>(tables: &mut Tables, parent: DbId) -> Vec<DbId> {
    let table = C::table_mut(tables);
    let owned: Vec<DbId> = table
        .in_scope(Scope::Parent(parent))
        .filter_map(|row| row.id())
        .collect();
    for id in &owned {
        table.rows.remove(id);
    }
    owned
}

fn require<E: CatalogEntity>(table: &Table<E>, what: &str, id: DbId) -> StoreResult<()> {
    if table.contains(id) {
        Ok(())
    } else {
        Err(missing_reference(what, id))
    }
}

fn require_genres(tables: &Tables, genres: &[DbId]) -> StoreResult<()> {
    genres
        .iter()
        .try_for_each(|&id| require(&tables.genres, "genre", id))
}

/* --------------------------------------------------------------------------
Global tables
-------------------------------------------------------------------------- */

impl MemoryEntity for Genre {
    fn table(tables: &Tables) -> &Table<Self> {
        &tables.genres
    }

    fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.genres
    }

    /// Genre links cascade like the join-table foreign keys.
    fn remove_children(tables: &mut Tables, id: DbId) {
        for movie in tables.movies.rows.values_mut() {
            movie.genres.retain(|&genre| genre != id);
        }
        for show in tables.shows.rows.values_mut() {
            show.genres.retain(|&genre| genre != id);
        }
    }
}

impl MemoryEntity for Movie {
    fn table(tables: &Tables) -> &Table<Self> {
        &tables.movies
    }

    fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.movies
    }

    fn check_references(&self, tables: &Tables) -> StoreResult<()> {
        require_genres(tables, &self.genres)
    }

    fn assign_child_ids(&mut self, tables: &mut Tables) {
        for medium in &mut self.media {
            if medium.id.is_none() {
                medium.id = Some(tables.next_medium_id());
            }
        }
    }
}

impl MemoryEntity for Show {
    fn table(tables: &Tables) -> &Table<Self> {
        &tables.shows
    }

    fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.shows
    }

    fn check_references(&self, tables: &Tables) -> StoreResult<()> {
        require_genres(tables, &self.genres)
    }

    fn copy_children(tables: &mut Tables, from: DbId, to: DbId) {
        let seasons = copy_owned::<Season>(tables, from, to, |season: &mut Season, show| {
            season.show_id = show;
        });
        for (source, copy) in seasons {
            Season::copy_children(tables, source, copy);
        }
    }

    fn remove_children(tables: &mut Tables, id: DbId) {
        for season in remove_owned::<Season>(tables, id) {
            Season::remove_children(tables, season);
        }
    }
}

impl MemoryEntity for Music {
    fn table(tables: &Tables) -> &Table<Self> {
        &tables.music
    }

    fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.music
    }

    fn copy_children(tables: &mut Tables, from: DbId, to: DbId) {
        copy_owned::<Song>(tables, from, to, |song: &mut Song, music| {
            song.music_id = music;
        });
    }

    fn remove_children(tables: &mut Tables, id: DbId) {
        remove_owned::<Song>(tables, id);
    }
}

impl MemoryEntity for BookCategory {
    fn table(tables: &Tables) -> &Table<Self> {
        &tables.book_categories
    }

    fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.book_categories
    }

    fn copy_children(tables: &mut Tables, from: DbId, to: DbId) {
        copy_owned::<Book>(tables, from, to, |book: &mut Book, category| {
            book.category_id = category;
        });
    }

    fn remove_children(tables: &mut Tables, id: DbId) {
        remove_owned::<Book>(tables, id);
    }
}

impl MemoryEntity for Game {
    fn table(tables: &Tables) -> &Table<Self> {
        &tables.games
    }

    fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.games
    }
}

impl MemoryEntity for Program {
    fn table(tables: &Tables) -> &Table<Self> {
        &tables.programs
    }

    fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.programs
    }
}

/* --------------------------------------------------------------------------
Scoped tables
-------------------------------------------------------------------------- */

impl MemoryEntity for Season {
    fn table(tables: &Tables) -> &Table<Self> {
        &tables.seasons
    }

    fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.seasons
    }

    fn check_references(&self, tables: &Tables) -> StoreResult<()> {
        require(&tables.shows, "show", self.show_id)
    }

    fn keep_scope(&mut self, stored: &Self) {
        self.show_id = stored.show_id;
    }

    fn copy_children(tables: &mut Tables, from: DbId, to: DbId) {
        copy_owned::<Episode>(tables, from, to, |episode: &mut Episode, season| {
            episode.season_id = season;
        });
    }

    fn remove_children(tables: &mut Tables, id: DbId) {
        remove_owned::<Episode>(tables, id);
    }
}

impl MemoryEntity for Episode {
    fn table(tables: &Tables) -> &Table<Self> {
        &tables.episodes
    }

    fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.episodes
    }

    fn check_references(&self, tables: &Tables) -> StoreResult<()> {
        require(&tables.seasons, "season", self.season_id)
    }

    fn keep_scope(&mut self, stored: &Self) {
        self.season_id = stored.season_id;
    }
}

impl MemoryEntity for Song {
    fn table(tables: &Tables) -> &Table<Self> {
        &tables.songs
    }

    fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.songs
    }

    fn check_references(&self, tables: &Tables) -> StoreResult<()> {
        require(&tables.music, "music", self.music_id)
    }

    fn keep_scope(&mut self, stored: &Self) {
        self.music_id = stored.music_id;
    }
}

impl MemoryEntity for Book {
    fn table(tables: &Tables) -> &Table<Self> {
        &tables.books
    }

    fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.books
    }

    fn check_references(&self, tables: &Tables) -> StoreResult<()> {
        require(&tables.book_categories, "book category", self.category_id)
    }

    fn keep_scope(&mut self, stored: &Self) {
        self.category_id = stored.category_id;
    }
}
