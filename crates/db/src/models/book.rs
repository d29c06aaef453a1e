//! Book category and book entity models and DTOs.
//!
//! Books are ordered within their category.

use mediashelf_core::entity::{CatalogEntity, EntityKind, RowMeta, Scope};
use mediashelf_core::error::CoreError;
use mediashelf_core::types::DbId;
use mediashelf_core::validation::{validate_input, validate_languages};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::{expect_global, expect_parent, FromInput};

/// A row from the `book_categories` table.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct BookCategory {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub meta: RowMeta,
    pub name: String,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BookCategoryInput {
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub name: String,
    pub note: Option<String>,
}

impl CatalogEntity for BookCategory {
    const KIND: EntityKind = EntityKind::BookCategory;

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

impl FromInput for BookCategory {
    type Input = BookCategoryInput;

    fn from_input(input: BookCategoryInput, scope: Scope) -> Result<Self, CoreError> {
        expect_global::<Self>(scope)?;
        Ok(Self {
            meta: RowMeta::unsaved(),
            name: input.name,
            note: input.note,
        })
    }

    fn apply_input(&mut self, input: BookCategoryInput) {
        self.name = input.name;
        self.note = input.note;
    }
}

/// A row from the `books` table.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Book {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub meta: RowMeta,
    pub category_id: DbId,
    pub author: String,
    pub title: String,
    pub languages: Vec<String>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BookInput {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub author: String,
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub title: String,
    pub languages: Vec<String>,
    pub note: Option<String>,
}

impl CatalogEntity for Book {
    const KIND: EntityKind = EntityKind::Book;

    fn meta(&self) -> &RowMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RowMeta {
        &mut self.meta
    }

    fn scope(&self) -> Scope {
        Scope::Parent(self.category_id)
    }
}

impl FromInput for Book {
    type Input = BookInput;

    fn from_input(input: BookInput, scope: Scope) -> Result<Self, CoreError> {
        let category_id = expect_parent::<Self>(scope)?;
        Ok(Self {
            meta: RowMeta::unsaved(),
            category_id,
            author: input.author,
            title: input.title,
            languages: input.languages,
            note: input.note,
        })
    }

    fn apply_input(&mut self, input: BookInput) {
        self.author = input.author;
        self.title = input.title;
        self.languages = input.languages;
        self.note = input.note;
    }

    fn validate(input: &BookInput) -> Result<(), CoreError> {
        validate_input(input)?;
        validate_languages("languages", &input.languages, true)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn book_requires_a_language() {
        let input = BookInput {
            author: "Karel Čapek".into(),
            title: "R.U.R.".into(),
            languages: vec![],
            note: None,
        };
        assert_matches!(Book::validate(&input), Err(CoreError::Validation(ref msg))
            if msg == "languages: at least one language is required");
    }

    #[test]
    fn category_is_global() {
        let input = BookCategoryInput {
            name: "Sci-fi".into(),
            note: None,
        };
        assert_matches!(
            BookCategory::from_input(input, Scope::Parent(1)),
            Err(CoreError::InvalidArgument(_))
        );
    }
}
