//! Application services - the decision logic built on the ports.

mod posts;

pub use posts::{PostPage, PostService};
