//! Post and task representation.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Kind of medium requested from the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediumKind {
    Photo,
    Video,
}

impl MediumKind {
    /// Kinds in the order they are scheduled for each account.
    pub const SCHEDULE_ORDER: [MediumKind; 2] = [MediumKind::Video, MediumKind::Photo];

    /// Value of the feed's `type` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            MediumKind::Photo => "photo",
            MediumKind::Video => "video",
        }
    }
}

impl fmt::Display for MediumKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediumKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "photo" => Ok(MediumKind::Photo),
            "video" => Ok(MediumKind::Video),
            _ => Err(format!("Unknown medium kind: {}", s)),
        }
    }
}

/// A single photo, either a whole photo post or one member of a photoset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Photo {
    /// ID of the post this photo belongs to.
    pub post_id: String,

    /// Photo URLs, largest resolution first.
    pub urls: Vec<String>,
}

/// A video post carrying embedded player markup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoPost {
    /// Post ID.
    pub post_id: String,

    /// Player HTML fragments in document order.
    pub players: Vec<String>,
}

/// A post as delivered by one feed page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Post {
    Photo(Photo),
    PhotoSet(Vec<Photo>),
    Video(VideoPost),
}

impl Post {
    /// ID of the post.
    pub fn id(&self) -> &str {
        match self {
            Post::Photo(photo) => &photo.post_id,
            Post::PhotoSet(photos) => photos.first().map(|p| p.post_id.as_str()).unwrap_or(""),
            Post::Video(video) => &video.post_id,
        }
    }

    /// Kind of medium this post downloads as.
    pub fn kind(&self) -> MediumKind {
        match self {
            Post::Photo(_) | Post::PhotoSet(_) => MediumKind::Photo,
            Post::Video(_) => MediumKind::Video,
        }
    }

    /// Split the post into one downloadable post per medium.
    ///
    /// Photosets yield one `Post::Photo` per member, in feed order.
    pub fn flatten(self) -> Vec<Post> {
        match self {
            Post::PhotoSet(photos) => photos.into_iter().map(Post::Photo).collect(),
            other => vec![other],
        }
    }
}

/// A unit of work for the download workers.
#[derive(Debug, Clone)]
pub struct Task {
    pub kind: MediumKind,
    pub post: Post,
    pub folder: PathBuf,
}

impl Task {
    pub fn new(kind: MediumKind, post: Post, folder: PathBuf) -> Self {
        Self { kind, post, folder }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo(id: &str, url: &str) -> Photo {
        Photo {
            post_id: id.to_string(),
            urls: vec![url.to_string()],
        }
    }

    #[test]
    fn test_kind_round_trips_through_str() {
        assert_eq!("photo".parse::<MediumKind>().unwrap(), MediumKind::Photo);
        assert_eq!("VIDEO".parse::<MediumKind>().unwrap(), MediumKind::Video);
        assert!("audio".parse::<MediumKind>().is_err());
        assert_eq!(MediumKind::Video.to_string(), "video");
    }

    #[test]
    fn test_videos_are_scheduled_first() {
        assert_eq!(
            MediumKind::SCHEDULE_ORDER,
            [MediumKind::Video, MediumKind::Photo]
        );
    }

    #[test]
    fn test_flatten_photoset_keeps_order() {
        let set = Post::PhotoSet(vec![
            photo("1", "https://a/1.jpg"),
            photo("1", "https://a/2.jpg"),
            photo("1", "https://a/3.jpg"),
        ]);

        let flat = set.flatten();
        assert_eq!(flat.len(), 3);
        assert_eq!(flat[0], Post::Photo(photo("1", "https://a/1.jpg")));
        assert_eq!(flat[2], Post::Photo(photo("1", "https://a/3.jpg")));
    }

    #[test]
    fn test_post_kind() {
        assert_eq!(Post::PhotoSet(Vec::new()).kind(), MediumKind::Photo);
        assert_eq!(Post::Video(VideoPost::default()).kind(), MediumKind::Video);
    }

    #[test]
    fn test_flatten_single_post() {
        let post = Post::Photo(photo("7", "https://a/7.jpg"));
        assert_eq!(post.clone().flatten(), vec![post]);
    }
}
