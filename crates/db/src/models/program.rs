//! Program (software) entity model and DTO.

use mediashelf_core::entity::{CatalogEntity, EntityKind, RowMeta, Scope};
use mediashelf_core::error::CoreError;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::{expect_global, FromInput};

/// A row from the `programs` table.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Program {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub meta: RowMeta,
    pub name: String,
    pub wiki_en: Option<String>,
    pub wiki_cz: Option<String>,
    pub media_count: i32,
    pub crack: bool,
    pub serial_key: bool,
    pub other_data: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProgramInput {
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
    pub other_data: Option<String>,
    pub note: Option<String>,
}

impl CatalogEntity for Program {
    const KIND: EntityKind = EntityKind::Program;

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

impl FromInput for Program {
    type Input = ProgramInput;

    fn from_input(input: ProgramInput, scope: Scope) -> Result<Self, CoreError> {
        expect_global::<Self>(scope)?;
        Ok(Self {
            meta: RowMeta::unsaved(),
            name: input.name,
            wiki_en: input.wiki_en,
            wiki_cz: input.wiki_cz,
            media_count: input.media_count,
            crack: input.crack,
            serial_key: input.serial_key,
            other_data: input.other_data,
            note: input.note,
        })
    }

    fn apply_input(&mut self, input: ProgramInput) {
        self.name = input.name;
        self.wiki_en = input.wiki_en;
        self.wiki_cz = input.wiki_cz;
        self.media_count = input.media_count;
        self.crack = input.crack;
        self.serial_key = input.serial_key;
        self.other_data = input.other_data;
        self.note = input.note;
    }
}
