//! Entity capabilities shared by every catalog type.
//!
//! The ordering mechanism only needs three things from an entity: its row
//! metadata (identity and position), the scope it is ordered in, and a way
//! to deep-copy it. [`CatalogEntity`] captures exactly that so the service is
//! written once and instantiated per type.

use std::fmt;

use serde::Serialize;

use crate::types::{DbId, Position, Timestamp};

/// The catalog entity types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Movie,
    Show,
    Season,
    Episode,
    Music,
    Song,
    BookCategory,
    Book,
    Game,
    Program,
    Genre,
}

impl EntityKind {
    /// Every kind, parents before children.
    pub const ALL: [EntityKind; 11] = [
        EntityKind::Genre,
        EntityKind::Movie,
        EntityKind::Show,
        EntityKind::Season,
        EntityKind::Episode,
        EntityKind::Music,
        EntityKind::Song,
        EntityKind::BookCategory,
        EntityKind::Book,
        EntityKind::Game,
        EntityKind::Program,
    ];

    /// Human-readable name used in errors and log fields.
    pub fn name(self) -> &'static str {
        match self {
            EntityKind::Movie => "Movie",
            EntityKind::Show => "Show",
            EntityKind::Season => "Season",
            EntityKind::Episode => "Episode",
            EntityKind::Music => "Music",
            EntityKind::Song => "Song",
            EntityKind::BookCategory => "BookCategory",
            EntityKind::Book => "Book",
            EntityKind::Game => "Game",
            EntityKind::Program => "Program",
            EntityKind::Genre => "Genre",
        }
    }

    /// The kind whose rows own (and scope) rows of this kind.
    pub fn parent(self) -> Option<EntityKind> {
        match self {
            EntityKind::Season => Some(EntityKind::Show),
            EntityKind::Episode => Some(EntityKind::Season),
            EntityKind::Song => Some(EntityKind::Music),
            EntityKind::Book => Some(EntityKind::BookCategory),
            _ => None,
        }
    }

    /// Cache region shared by the whole entity family.
    ///
    /// A write to any member of a family clears the region for all of them,
    /// so a season update never leaves a stale show listing behind.
    pub fn cache_region(self) -> &'static str {
        match self {
            EntityKind::Movie => "movieCache",
            EntityKind::Show | EntityKind::Season | EntityKind::Episode => "serieCache",
            EntityKind::Music | EntityKind::Song => "musicCache",
            EntityKind::BookCategory | EntityKind::Book => "bookCache",
            EntityKind::Game => "gameCache",
            EntityKind::Program => "programCache",
            EntityKind::Genre => "genreCache",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The sibling set an entity's `position` is ordered within.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scope {
    /// The whole table.
    Global,
    /// All rows sharing the same parent.
    Parent(DbId),
}

impl Scope {
    pub fn parent_id(self) -> Option<DbId> {
        match self {
            Scope::Global => None,
            Scope::Parent(id) => Some(id),
        }
    }
}

impl From<Option<DbId>> for Scope {
    fn from(parent: Option<DbId>) -> Self {
        parent.map_or(Scope::Global, Scope::Parent)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Global => f.write_str("global"),
            Scope::Parent(id) => write!(f, "parent {id}"),
        }
    }
}

/// Identity, ordering and audit columns present on every catalog row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct RowMeta {
    /// Storage-assigned identity; `None` until first persisted.
    pub id: Option<DbId>,
    pub position: Position,
    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
}

impl RowMeta {
    /// Metadata for a row that has not been persisted yet.
    pub fn unsaved() -> Self {
        Self::default()
    }

    /// Drop identity and timestamps so the row can be inserted as a new one.
    pub fn reset_identity(&mut self) {
        self.id = None;
        self.created_at = None;
        self.updated_at = None;
    }
}

/// Capabilities the generic catalog service needs from an entity type.
pub trait CatalogEntity: Clone + fmt::Debug + Send + Sync + 'static {
    const KIND: EntityKind;

    fn meta(&self) -> &RowMeta;

    fn meta_mut(&mut self) -> &mut RowMeta;

    /// The ordering scope this row belongs to.
    fn scope(&self) -> Scope;

    fn id(&self) -> Option<DbId> {
        self.meta().id
    }

    fn position(&self) -> Position {
        self.meta().position
    }

    fn set_position(&mut self, position: Position) {
        self.meta_mut().position = position;
    }

    /// Copy of every non-identity field, ready to be inserted as a new row.
    ///
    /// Types embedding child rows must override this to clear the children's
    /// identities as well.
    fn duplicate(&self) -> Self {
        let mut copy = self.clone();
        copy.meta_mut().reset_identity();
        copy
    }
}
