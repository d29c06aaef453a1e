//! Catalog row types and their transfer objects.
//!
//! Each entity comes with an `*Input` DTO carrying the client-editable
//! fields. [`FromInput`] converts between the two and runs the entity's
//! validation rules.

pub mod book;
pub mod game;
pub mod genre;
pub mod movie;
pub mod music;
pub mod program;
pub mod show;
pub mod stats;

use mediashelf_core::entity::{CatalogEntity, Scope};
use mediashelf_core::error::CoreError;
use mediashelf_core::types::DbId;
use mediashelf_core::validation::validate_input;
use serde::de::DeserializeOwned;
use serde::Serialize;
use validator::Validate;

pub use book::{Book, BookCategory, BookCategoryInput, BookInput};
pub use game::{Game, GameInput};
pub use genre::{Genre, GenreInput};
pub use movie::{Medium, MediumInput, Movie, MovieInput};
pub use music::{Music, MusicInput, Song, SongInput};
pub use program::{Program, ProgramInput};
pub use show::{Episode, EpisodeInput, Season, SeasonInput, Show, ShowInput};
pub use stats::{MovieStats, MusicStats, ShowStats};

/// Conversion from a client transfer object into a catalog row.
pub trait FromInput: CatalogEntity + Serialize {
    type Input: Validate + DeserializeOwned + Send + Sync + 'static;

    /// Build an unsaved row in `scope` from a validated input.
    fn from_input(input: Self::Input, scope: Scope) -> Result<Self, CoreError>;

    /// Overwrite the editable fields of an existing row.
    ///
    /// Identity, position and scope are left alone.
    fn apply_input(&mut self, input: Self::Input);

    /// Derived rules plus anything that depends on the clock or spans fields.
    fn validate(input: &Self::Input) -> Result<(), CoreError> {
        validate_input(input)
    }
}

/// Reject a scope that does not fit the entity kind.
pub(crate) fn expect_global<E: CatalogEntity>(scope: Scope) -> Result<(), CoreError> {
    match scope {
        Scope::Global => Ok(()),
        Scope::Parent(_) => Err(CoreError::InvalidArgument(format!(
            "{} is not owned by a parent",
            E::KIND
        ))),
    }
}

/// Parent id of a scoped entity, or an invalid-argument error.
pub(crate) fn expect_parent<E: CatalogEntity>(scope: Scope) -> Result<DbId, CoreError> {
    scope.parent_id().ok_or_else(|| {
        let parent = E::KIND.parent().map_or("parent", |p| p.name());
        CoreError::InvalidArgument(format!("{} requires a {parent}", E::KIND))
    })
}
