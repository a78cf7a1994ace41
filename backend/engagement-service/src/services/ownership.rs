//! Ownership guard for mutable entities.

use uuid::Uuid;

use crate::domain::models::{Comment, Playlist, Tweet, Video};
use crate::error::{AppError, Result};

/// Entities owned by a single user
pub trait Owned {
    fn owner_id(&self) -> Uuid;

    fn entity_name() -> &'static str;
}

impl Owned for Video {
    fn owner_id(&self) -> Uuid {
        self.owner_id
    }

    fn entity_name() -> &'static str {
        "video"
    }
}

impl Owned for Comment {
    fn owner_id(&self) -> Uuid {
        self.owner_id
    }

    fn entity_name() -> &'static str {
        "comment"
    }
}

impl Owned for Tweet {
    fn owner_id(&self) -> Uuid {
        self.owner_id
    }

    fn entity_name() -> &'static str {
        "tweet"
    }
}

impl Owned for Playlist {
    fn owner_id(&self) -> Uuid {
        self.owner_id
    }

    fn entity_name() -> &'static str {
        "playlist"
    }
}

/// Fails `Forbidden` unless `actor_id` owns the entity.
///
/// Must be called on the freshly loaded entity inside the mutating
/// operation, never on a caller-supplied copy.
pub fn assert_owner<E: Owned>(entity: &E, actor_id: Uuid) -> Result<()> {
    if entity.owner_id() != actor_id {
        return Err(AppError::Forbidden(format!(
            "only the owner may modify this {}",
            E::entity_name()
        )));
    }
    Ok(())
}
