//! Page logic behind the client's screens, free of any rendering.

pub mod randomizer;
pub mod rating;
pub mod search;
pub mod shared;
pub mod watchlist;

pub use randomizer::{encode_options, parse_options, wheel_url, MovieOption, Wheel};
pub use rating::{format_score, rating_label, Category, CategoryRatings, RatingBand};
pub use search::DebouncedSearch;
pub use shared::{all_members_rated, average_rating, SharedItem, SharedWatchlistState};
pub use watchlist::{
    ListQuery, MembershipToggle, SortKey, SortOrder, WatchedFilter, WatchlistBackend,
    WatchlistItem, WatchlistState, WatchlistStats,
};
