pub mod channels;
pub mod comments;
pub mod engagement;
pub mod ownership;
pub mod pagination;
pub mod playlists;
pub mod tweets;
pub mod videos;

pub use channels::ChannelService;
pub use comments::CommentService;
pub use engagement::EngagementService;
pub use pagination::{Page, PageParams, PaginationPolicy};
pub use playlists::PlaylistService;
pub use tweets::TweetService;
pub use videos::VideoService;
