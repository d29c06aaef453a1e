//! Movie entity model and DTOs.
//!
//! A movie owns its physical media (`media` table) and links to genres via
//! `movie_genres`. Both are embedded in the row type and travel with it.

use mediashelf_core::entity::{CatalogEntity, EntityKind, RowMeta, Scope};
use mediashelf_core::error::CoreError;
use mediashelf_core::types::DbId;
use mediashelf_core::validation::{
    validate_distinct_ids, validate_input, validate_languages, validate_year,
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::{expect_global, FromInput};

/// A row from the `movies` table with its media and genre ids.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Movie {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub meta: RowMeta,
    pub czech_name: String,
    pub original_name: String,
    pub year: i32,
    pub languages: Vec<String>,
    pub subtitles: Vec<String>,
    #[sqlx(skip)]
    pub media: Vec<Medium>,
    pub csfd: Option<String>,
    pub imdb_code: Option<i32>,
    pub wiki_en: Option<String>,
    pub wiki_cz: Option<String>,
    pub picture: Option<String>,
    pub note: Option<String>,
    #[sqlx(skip)]
    pub genres: Vec<DbId>,
}

/// One physical medium (disc) of a movie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medium {
    pub id: Option<DbId>,
    /// 1-based index within the movie.
    pub number: i32,
    /// Running time in minutes.
    pub length: i32,
}

impl Movie {
    /// Combined running time of every medium, in minutes.
    pub fn total_length(&self) -> i64 {
        self.media.iter().map(|m| i64::from(m.length)).sum()
    }
}

/// DTO for creating or replacing a movie.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct MovieInput {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub czech_name: String,
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub original_name: String,
    pub year: i32,
    pub languages: Vec<String>,
    #[serde(default)]
    pub subtitles: Vec<String>,
    #[validate(length(min = 1, message = "at least one medium is required"), nested)]
    pub media: Vec<MediumInput>,
    #[validate(url)]
    pub csfd: Option<String>,
    #[validate(range(min = 1, message = "must be positive"))]
    pub imdb_code: Option<i32>,
    #[validate(url)]
    pub wiki_en: Option<String>,
    #[validate(url)]
    pub wiki_cz: Option<String>,
    pub picture: Option<String>,
    pub note: Option<String>,
    #[serde(default)]
    pub genres: Vec<DbId>,
}

/// A medium as sent by the client; numbers follow list order.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MediumInput {
    #[validate(range(min = 1, message = "must be positive"))]
    pub length: i32,
}

fn number_media(media: Vec<MediumInput>) -> Vec<Medium> {
    (1..)
        .zip(media)
        .map(|(number, medium)| Medium {
            id: None,
            number,
            length: medium.length,
        })
        .collect()
}

impl CatalogEntity for Movie {
    const KIND: EntityKind = EntityKind::Movie;

    fn meta(&self) -> &RowMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RowMeta {
        &mut self.meta
    }

    fn scope(&self) -> Scope {
        Scope::Global
    }

    fn duplicate(&self) -> Self {
        let mut copy = self.clone();
        copy.meta.reset_identity();
        for medium in &mut copy.media {
            medium.id = None;
        }
        copy
    }
}

impl FromInput for Movie {
    type Input = MovieInput;

    fn from_input(input: MovieInput, scope: Scope) -> Result<Self, CoreError> {
        expect_global::<Self>(scope)?;
        Ok(Self {
            meta: RowMeta::unsaved(),
            czech_name: input.czech_name,
            original_name: input.original_name,
            year: input.year,
            languages: input.languages,
            subtitles: input.subtitles,
            media: number_media(input.media),
            csfd: input.csfd,
            imdb_code: input.imdb_code,
            wiki_en: input.wiki_en,
            wiki_cz: input.wiki_cz,
            picture: input.picture,
            note: input.note,
            genres: input.genres,
        })
    }

    fn apply_input(&mut self, input: MovieInput) {
        self.czech_name = input.czech_name;
        self.original_name = input.original_name;
        self.year = input.year;
        self.languages = input.languages;
        self.subtitles = input.subtitles;
        self.media = number_media(input.media);
        self.csfd = input.csfd;
        self.imdb_code = input.imdb_code;
        self.wiki_en = input.wiki_en;
        self.wiki_cz = input.wiki_cz;
        self.picture = input.picture;
        self.note = input.note;
        self.genres = input.genres;
    }

    fn validate(input: &MovieInput) -> Result<(), CoreError> {
        validate_input(input)?;
        validate_year("year", input.year)?;
        validate_languages("languages", &input.languages, true)?;
        validate_languages("subtitles", &input.subtitles, false)?;
        validate_distinct_ids("genres", &input.genres)
    }
}
