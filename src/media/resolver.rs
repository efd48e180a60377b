//! Medium URL resolution.
//!
//! Photos carry their URL directly. Videos only carry the embedded player
//! markup, so the URL is extracted by an ordered list of rules where the
//! first rule that matches wins.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};
use crate::media::item::{MediumKind, Post, VideoPost};

/// A rule extracting a video URL from a player fragment.
pub type VideoRule = fn(&str) -> Option<String>;

/// Video rules, best quality first.
pub const VIDEO_RULES: &[VideoRule] = &[video_hd_url, video_default_src];

static HD_URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^.*"hdUrl":("([^\s,]*)"|false),"#).unwrap());

static DEFAULT_SRC_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)^.*src="(\S*)" "#).unwrap());

/// Resolve the downloadable URL of a post.
///
/// Fails with [`Error::UnresolvedMedium`] when the post does not match the
/// requested kind or no rule finds a URL.
pub fn resolve(kind: MediumKind, post: &Post) -> Result<String> {
    let url = match (kind, post) {
        (MediumKind::Photo, Post::Photo(photo)) => photo.urls.first().cloned(),
        (MediumKind::Video, Post::Video(video)) => {
            player_fragment(video).and_then(resolve_video_url)
        }
        _ => None,
    };

    url.filter(|u| !u.is_empty())
        .ok_or_else(|| Error::UnresolvedMedium {
            kind,
            post: format!("{:?}", post),
        })
}

/// Run the video rules in order against a player fragment.
pub fn resolve_video_url(fragment: &str) -> Option<String> {
    VIDEO_RULES.iter().find_map(|rule| rule(fragment))
}

/// The feed lists several player sizes; the second one is the embed the
/// rules are written against, with the first as a fallback.
fn player_fragment(video: &VideoPost) -> Option<&str> {
    video
        .players
        .get(1)
        .or_else(|| video.players.first())
        .map(String::as_str)
}

/// High definition URL from the player options, unless it is `false`.
pub fn video_hd_url(fragment: &str) -> Option<String> {
    let captures = HD_URL_PATTERN.captures(fragment)?;
    if captures.get(1)?.as_str() == "false" {
        return None;
    }
    let url = captures.get(2)?.as_str().replace('\\', "");
    Some(url)
}

/// The `src` attribute of the player's source element.
pub fn video_default_src(fragment: &str) -> Option<String> {
    DEFAULT_SRC_PATTERN
        .captures(fragment)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}
