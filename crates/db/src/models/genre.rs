//! Genre entity model and DTO.

use mediashelf_core::entity::{CatalogEntity, EntityKind, RowMeta, Scope};
use mediashelf_core::error::CoreError;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::{expect_global, FromInput};

/// A row from the `genres` table.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Genre {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub meta: RowMeta,
    pub name: String,
}

/// DTO for creating or replacing a genre.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GenreInput {
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub name: String,
}

impl CatalogEntity for Genre {
    const KIND: EntityKind = EntityKind::Genre;

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

impl FromInput for Genre {
    type Input = GenreInput;

    fn from_input(input: GenreInput, scope: Scope) -> Result<Self, CoreError> {
        expect_global::<Self>(scope)?;
        Ok(Self {
            meta: RowMeta::unsaved(),
            name: input.name,
        })
    }

    fn apply_input(&mut self, input: GenreInput) {
        self.name = input.name;
    }
}
