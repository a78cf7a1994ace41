//! PostgreSQL store implementations.
//!
//! Relation uniqueness is enforced by the schema's unique indexes; inserts go
//! through `ON CONFLICT DO NOTHING ... RETURNING` so concurrent toggles on
//! the same key tuple serialize at the store.

mod comments;
mod likes;
mod playlists;
mod subscriptions;
mod tweets;
mod users;
mod videos;

pub use comments::PgCommentStore;
pub use likes::PgLikeStore;
pub use playlists::PgPlaylistStore;
pub use subscriptions::PgSubscriptionStore;
pub use tweets::PgTweetStore;
pub use users::PgUserStore;
pub use videos::PgVideoStore;
