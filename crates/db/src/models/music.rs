//! Music album entity models and DTOs. An album owns its songs.

use mediashelf_core::entity::{CatalogEntity, EntityKind, RowMeta, Scope};
use mediashelf_core::error::CoreError;
use mediashelf_core::types::DbId;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::{expect_global, expect_parent, FromInput};

/// A row from the `music` table.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Music {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub meta: RowMeta,
    pub name: String,
    pub wiki_en: Option<String>,
    pub wiki_cz: Option<String>,
    pub media_count: i32,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct MusicInput {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub name: String,
    #[validate(url)]
    pub wiki_en: Option<String>,
    #[validate(url)]
    pub wiki_cz: Option<String>,
    #[validate(range(min = 1, message = "must be positive"))]
    pub media_count: i32,
    pub note: Option<String>,
}

impl CatalogEntity for Music {
    const KIND: EntityKind = EntityKind::Music;

    fn meta(&self) -> &RowMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RowMeta {
        &mut self.meta
    }

    fn scope(&self) -> Scope {
        Scope::Global
    }
}

impl FromInput for Music {
    type Input = MusicInput;

    fn from_input(input: MusicInput, scope: Scope) -> Result<Self, CoreError> {
        expect_global::<Self>(scope)?;
        Ok(Self {
            meta: RowMeta::unsaved(),
            name: input.name,
            wiki_en: input.wiki_en,
            wiki_cz: input.wiki_cz,
            media_count: input.media_count,
            note: input.note,
        })
    }

    fn apply_input(&mut self, input: MusicInput) {
        self.name = input.name;
        self.wiki_en = input.wiki_en;
        self.wiki_cz = input.wiki_cz;
        self.media_count = input.media_count;
        self.note = input.note;
    }
}

/// A row from the `songs` table.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Song {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub meta: RowMeta,
    pub music_id: DbId,
    pub name: String,
    /// Seconds.
    pub length: i32,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SongInput {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub name: String,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub length: i32,
    pub note: Option<String>,
}

impl CatalogEntity for Song {
    const KIND: EntityKind = EntityKind::Song;

    fn meta(&self) -> &RowMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RowMeta {
        &mut self.meta
    }

    fn scope(&self) -> Scope {
        Scope::Parent(self.music_id)
    }
}

impl FromInput for Song {
    type Input = SongInput;

    fn from_input(input: SongInput, scope: Scope) -> Result<Self, CoreError> {
        let music_id = expect_parent::<Self>(scope)?;
        Ok(Self {
            meta: RowMeta::unsaved(),
            music_id,
            name: input.name,
            length: input.length,
            note: input.note,
        })
    }

    fn apply_input(&mut self, input: SongInput) {
        self.name = input.name;
        self.length = input.length;
        self.note = input.note;
    }
}
