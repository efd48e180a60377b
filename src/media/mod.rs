//! Media module for post representation, feed parsing and URL resolution.

pub mod item;
pub mod parser;
pub mod resolver;

pub use item::{MediumKind, Photo, Post, Task, VideoPost};
pub use parser::{clean_feed_text, parse_feed_page};
pub use resolver::{resolve, resolve_video_url};
