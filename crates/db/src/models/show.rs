//! TV show entity models and DTOs.
//!
//! Shows own seasons (`seasons.show_id`), seasons own episodes
//! (`episodes.season_id`). Seasons are ordered per show, episodes per
//! season.

use mediashelf_core::entity::{CatalogEntity, EntityKind, RowMeta, Scope};
use mediashelf_core::error::CoreError;
use mediashelf_core::types::DbId;
use mediashelf_core::validation::{
    validate_distinct_ids, validate_input, validate_language, validate_languages,
    validate_year_range,
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::{expect_global, expect_parent, FromInput};

/* --------------------------------------------------------------------------
Show
-------------------------------------------------------------------------- */

/// A row from the `shows` table with its genre ids.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Show {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub meta: RowMeta,
    pub czech_name: String,
    pub original_name: String,
    pub csfd: Option<String>,
    pub imdb_code: Option<i32>,
    pub wiki_en: Option<String>,
    pub wiki_cz: Option<String>,
    pub picture: Option<String>,
    pub note: Option<String>,
    #[sqlx(skip)]
    pub genres: Vec<DbId>,
}

/// DTO for creating or replacing a show.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ShowInput {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub czech_name: String,
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub original_name: String,
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

impl CatalogEntity for Show {
    const KIND: EntityKind = EntityKind::Show;

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

impl FromInput for Show {
    type Input = ShowInput;

    fn from_input(input: ShowInput, scope: Scope) -> Result<Self, CoreError> {
        expect_global::<Self>(scope)?;
        Ok(Self {
            meta: RowMeta::unsaved(),
            czech_name: input.czech_name,
            original_name: input.original_name,
            csfd: input.csfd,
            imdb_code: input.imdb_code,
            wiki_en: input.wiki_en,
            wiki_cz: input.wiki_cz,
            picture: input.picture,
            note: input.note,
            genres: input.genres,
        })
    }

    fn apply_input(&mut self, input: ShowInput) {
        self.czech_name = input.czech_name;
        self.original_name = input.original_name;
        self.csfd = input.csfd;
        self.imdb_code = input.imdb_code;
        self.wiki_en = input.wiki_en;
        self.wiki_cz = input.wiki_cz;
        self.picture = input.picture;
        self.note = input.note;
        self.genres = input.genres;
    }

    fn validate(input: &ShowInput) -> Result<(), CoreError> {
        validate_input(input)?;
        validate_distinct_ids("genres", &input.genres)
    }
}

/* --------------------------------------------------------------------------
Season
-------------------------------------------------------------------------- */

/// A row from the `seasons` table.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Season {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub meta: RowMeta,
    pub show_id: DbId,
    pub number: i32,
    pub start_year: i32,
    pub end_year: i32,
    pub language: String,
    pub subtitles: Vec<String>,
    pub note: Option<String>,
}

/// DTO for creating or replacing a season. The show comes from the path.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SeasonInput {
    #[validate(range(min = 1, message = "must be positive"))]
    pub number: i32,
    pub start_year: i32,
    pub end_year: i32,
    pub language: String,
    #[serde(default)]
    pub subtitles: Vec<String>,
    pub note: Option<String>,
}

impl CatalogEntity for Season {
    const KIND: EntityKind = EntityKind::Season;

    fn meta(&self) -> &RowMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RowMeta {
        &mut self.meta
    }

    fn scope(&self) -> Scope {
        Scope::Parent(self.show_id)
    }
}

impl FromInput for Season {
    type Input = SeasonInput;

    fn from_input(input: SeasonInput, scope: Scope) -> Result<Self, CoreError> {
        let show_id = expect_parent::<Self>(scope)?;
        Ok(Self {
            meta: RowMeta::unsaved(),
            show_id,
            number: input.number,
            start_year: input.start_year,
            end_year: input.end_year,
            language: input.language,
            subtitles: input.subtitles,
            note: input.note,
        })
    }

    fn apply_input(&mut self, input: SeasonInput) {
        self.number = input.number;
        self.start_year = input.start_year;
        self.end_year = input.end_year;
        self.language = input.language;
        self.subtitles = input.subtitles;
        self.note = input.note;
    }

    fn validate(input: &SeasonInput) -> Result<(), CoreError> {
        validate_input(input)?;
        validate_year_range(input.start_year, input.end_year)?;
        validate_language("language", &input.language)?;
        validate_languages("subtitles", &input.subtitles, false)
    }
}

/* --------------------------------------------------------------------------
Episode
-------------------------------------------------------------------------- */

/// A row from the `episodes` table.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Episode {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub meta: RowMeta,
    pub season_id: DbId,
    pub number: i32,
    pub name: String,
    /// Minutes.
    pub length: i32,
    pub note: Option<String>,
}

/// DTO for creating or replacing an episode. The season comes from the path.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EpisodeInput {
    #[validate(range(min = 1, message = "must be positive"))]
    pub number: i32,
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub name: String,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub length: i32,
    pub note: Option<String>,
}

impl CatalogEntity for Episode {
    const KIND: EntityKind = EntityKind::Episode;

    fn meta(&self) -> &RowMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RowMeta {
        &mut self.meta
    }

    fn scope(&self) -> Scope {
        Scope::Parent(self.season_id)
    }
}

impl FromInput for Episode {
    type Input = EpisodeInput;

    fn from_input(input: EpisodeInput, scope: Scope) -> Result<Self, CoreError> {
        let season_id = expect_parent::<Self>(scope)?;
        Ok(Self {
            meta: RowMeta::unsaved(),
            season_id,
            number: input.number,
            name: input.name,
            length: input.length,
            note: input.note,
        })
    }

    fn apply_input(&mut self, input: EpisodeInput) {
        self.number = input.number;
        self.name = input.name;
        self.length = input.length;
        self.note = input.note;
    }
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn season_input() -> SeasonInput {
        SeasonInput {
            number: 1,
            start_year: 2008,
            end_year: 2009,
            language: "en".into(),
            subtitles: vec!["cs".into()],
            note: None,
        }
    }

    // -- Season --

    #[test]
    fn season_takes_show_from_scope() {
        let season = Season::from_input(season_input(), Scope::Parent(5)).unwrap();
        assert_eq!(season.show_id, 5);
        assert_eq!(season.scope(), Scope::Parent(5));
    }

    #[test]
    fn season_requires_a_show() {
        assert_matches!(
            Season::from_input(season_input(), Scope::Global),
            Err(CoreError::InvalidArgument(ref msg)) if msg == "Season requires a Show"
        );
    }

    #[test]
    fn season_cannot_end_before_it_starts() {
        let mut input = season_input();
        input.end_year = 2007;
        assert_matches!(Season::validate(&input), Err(CoreError::Validation(_)));
    }

    #[test]
    fn season_language_must_be_known() {
        let mut input = season_input();
        input.language = "xx".into();
        assert_matches!(Season::validate(&input), Err(CoreError::Validation(_)));
    }

    #[test]
    fn apply_input_keeps_scope() {
        let mut season = Season::from_input(season_input(), Scope::Parent(5)).unwrap();
        let mut input = season_input();
        input.number = 2;
        season.apply_input(input);
        assert_eq!(season.number, 2);
        assert_eq!(season.show_id, 5);
    }

    // -- Episode --

    #[test]
    fn episode_number_must_be_positive() {
        let input = EpisodeInput {
            number: 0,
            name: "Pilot".into(),
            length: 58,
            note: None,
        };
        assert_matches!(Episode::validate(&input), Err(CoreError::Validation(ref msg))
            if msg == "number: must be positive");
    }
}
