//! Feed page parsing.
//!
//! Turns the raw body of one `/api/read` page into typed [`Post`]s. All of
//! the probing for optional elements happens here so the rest of the crate
//! only ever sees well-formed posts.

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{Error, Result};
use crate::media::item::{MediumKind, Photo, Post, VideoPost};

/// Remove every character outside the printable ASCII range.
pub fn clean_feed_text(text: &str) -> String {
    text.chars().filter(|c| ('\x20'..='\x7f').contains(c)).collect()
}

/// Parse one feed page into posts of the given kind.
///
/// Errors:
/// - [`Error::FeedDecode`] when the body is not UTF-8
/// - [`Error::FeedExhausted`] when the page carries no post list
/// - [`Error::MalformedFeed`] when the XML cannot be read
pub fn parse_feed_page(body: &[u8], kind: MediumKind) -> Result<Vec<Post>> {
    let text = std::str::from_utf8(body).map_err(|e| Error::FeedDecode(e.to_string()))?;
    let cleaned = clean_feed_text(text);

    let mut reader = Reader::from_reader(cleaned.as_bytes());
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut path: Vec<String> = Vec::new();
    let mut in_posts = false;
    let mut current: Option<PostBuilder> = None;
    let mut posts = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = element_name(&e);
                match name.as_str() {
                    "posts" if path.last().map(String::as_str) == Some("tumblr") => {
                        in_posts = true;
                    }
                    "post" if in_posts && current.is_none() => {
                        current = Some(PostBuilder::new(attribute(&e, "id")));
                    }
                    "photo" => {
                        if let Some(post) = current.as_mut() {
                            if path.last().map(String::as_str) == Some("photoset") {
                                post.start_set_photo();
                            }
                        }
                    }
                    _ => {}
                }
                path.push(name);
            }
            Ok(Event::End(_)) => {
                let name = path.pop().unwrap_or_default();
                match name.as_str() {
                    "post" => {
                        if let Some(builder) = current.take() {
                            posts.push(builder.build(kind));
                        }
                    }
                    "photo-url" | "video-player" => {
                        if let Some(post) = current.as_mut() {
                            post.finish_text(&name, &path);
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Empty(e)) => {
                let name = element_name(&e);
                if name == "posts" && path.last().map(String::as_str) == Some("tumblr") {
                    in_posts = true;
                }
            }
            Ok(Event::Text(e)) => {
                if let Some(post) = current.as_mut() {
                    if is_captured(&path) {
                        let text = match e.unescape() {
                            Ok(text) => text.into_owned(),
                            Err(_) => String::from_utf8_lossy(&e).into_owned(),
                        };
                        post.text.push_str(&text);
                    }
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(post) = current.as_mut() {
                    if is_captured(&path) {
                        post.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::MalformedFeed(format!(
                    "XML parse error at position {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    if !in_posts || posts.is_empty() {
        return Err(Error::FeedExhausted);
    }

    Ok(posts)
}

fn element_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).to_string()
}

fn attribute(e: &BytesStart<'_>, key: &str) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key.as_bytes())
        .map(|attr| String::from_utf8_lossy(&attr.value).to_string())
}

fn is_captured(path: &[String]) -> bool {
    matches!(
        path.last().map(String::as_str),
        Some("photo-url") | Some("video-player")
    )
}

/// Collects the pieces of one `<post>` element.
#[derive(Debug, Default)]
struct PostBuilder {
    id: String,
    photo_urls: Vec<String>,
    photoset: Vec<Vec<String>>,
    players: Vec<String>,
    text: String,
}

impl PostBuilder {
    fn new(id: Option<String>) -> Self {
        Self {
            id: id.unwrap_or_default(),
            ..Default::default()
        }
    }

    fn start_set_photo(&mut self) {
        self.photoset.push(Vec::new());
    }

    /// Store the text collected for a just-closed leaf element.
    /// `parents` is the element path without the leaf itself.
    fn finish_text(&mut self, name: &str, parents: &[String]) {
        let text = std::mem::take(&mut self.text);
        if text.is_empty() {
            return;
        }

        let parent = parents.last().map(String::as_str);
        match (name, parent) {
            ("photo-url", Some("photo")) => {
                if let Some(urls) = self.photoset.last_mut() {
                    urls.push(text);
                }
            }
            ("photo-url", Some("post")) => self.photo_urls.push(text),
            ("video-player", Some("post")) => self.players.push(text),
            _ => {}
        }
    }

    fn build(self, kind: MediumKind) -> Post {
        if !self.photoset.is_empty() {
            let photos = self
                .photoset
                .into_iter()
                .map(|urls| Photo {
                    post_id: self.id.clone(),
                    urls,
                })
                .collect();
            return Post::PhotoSet(photos);
        }

        match kind {
            MediumKind::Photo => Post::Photo(Photo {
                post_id: self.id,
                urls: self.photo_urls,
            }),
            MediumKind::Video => Post::Video(VideoPost {
                post_id: self.id,
                players: self.players,
            }),
        }
    }
}
