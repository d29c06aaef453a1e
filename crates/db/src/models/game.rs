//! Game entity model and DTO.

use mediashelf_core::entity::{CatalogEntity, EntityKind, RowMeta, Scope};
use mediashelf_core::error::CoreError;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::{expect_global, FromInput};

/// A row from the `games` table.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Game {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub meta: RowMeta,
    pub name: String,
    pub wiki_en: Option<String>,
    pub wiki_cz: Option<String>,
    pub media_count: i32,
    pub crack: bool,
    pub serial_key: bool,
    pub patch: bool,
    pub trainer: bool,
    pub trainer_data: bool,
    pub editor: bool,
    pub saves: bool,
    pub other_data: Option<String>,
    pub note: Option<String>,
}

/// DTO for creating or replacing a game. Flags default to `false`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GameInput {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub name: String,
    #[validate(url)]
    pub wiki_en: Option<String>,
    #[validate(url)]
    pub wiki_cz: Option<String>,
    #[validate(range(min = 1, message = "must be positive"))]
    pub media_count: i32,
    #[serde(default)]
    pub crack: bool,
    #[serde(default)]
    pub serial_key: bool,
    #[serde(default)]
    pub patch: bool,
    #[serde(default)]
    pub trainer: bool,
    #[serde(default)]
    pub trainer_data: bool,
    #[serde(default)]
    pub editor: bool,
    #[serde(default)]
    pub saves: bool,
    pub other_data: Option<String>,
    pub note: Option<String>,
}

impl CatalogEntity for Game {
    const KIND: EntityKind = EntityKind::Game;

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

impl FromInput for Game {
    type Input = GameInput;

    fn from_input(input: GameInput, scope: Scope) -> Result<Self, CoreError> {
        expect_global::<Self>(scope)?;
        let mut game = Self {
            meta: RowMeta::unsaved(),
            name: String::new(),
            wiki_en: None,
            wiki_cz: None,
            media_count: 0,
            crack: false,
            serial_key: false,
            patch: false,
            trainer: false,
            trainer_data: false,
            editor: false,
            saves: false,
            other_data: None,
            note: None,
        };
        game.apply_input(input);
        Ok(game)
    }

    fn apply_input(&mut self, input: GameInput) {
        let GameInput {
            name,
            wiki_en,
            wiki_cz,
            media_count,
            crack,
            serial_key,
            patch,
            trainer,
            trainer_data,
            editor,
            saves,
            other_data,
            note,
        } = input;
        self.name = name;
        self.wiki_en = wiki_en;
        self.wiki_cz = wiki_cz;
        self.media_count = media_count;
        self.crack = crack;
        self.serial_key = serial_key;
        self.patch = patch;
        self.trainer = trainer;
        self.trainer_data = trainer_data;
        self.editor = editor;
        self.saves = saves;
        self.other_data = other_data;
        self.note = note;
    }
}
