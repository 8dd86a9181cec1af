//! Domain entities - the core business objects.

mod group;
mod post;
mod user;

pub use group::{GROUP_TITLE_MAX_LEN, Group, NewGroup};
pub use post::{EditAccess, NewPost, Post, PostListing};
pub use user::{STAFF_ROLE, User, UserSummary};
