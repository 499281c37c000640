//! YouTube link parsing

use url::Url;

/// Extract the video id from a YouTube link.
///
/// Understands `youtu.be/<id>`, `youtube.com/watch?v=<id>` and
/// `youtube.com/embed/<id>`. Returns `None` for anything else.
pub fn video_id(link: &str) -> Option<String> {
    let url = Url::parse(link.trim()).ok()?;
    let host = url.host_str()?;

    if host.contains("youtu.be") {
        return url
            .path_segments()?
            .next()
            .filter(|id| !id.is_empty())
            .map(str::to_string);
    }

    if let Some((_, v)) = url.query_pairs().find(|(key, _)| key == "v") {
        if !v.is_empty() {
            return Some(v.into_owned());
        }
    }

    let mut segments = url.path_segments()?.filter(|s| !s.is_empty());
    segments.find(|s| *s == "embed")?;
    segments.next().map(str::to_string)
}

/// High-quality thumbnail for a video id
pub fn thumbnail_url(video_id: &str) -> String {
    format!("https://img.youtube.com/vi/{}/hqdefault.jpg", video_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_links() {
        assert_eq!(
            video_id("https://youtu.be/dQw4w9WgXcQ").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            video_id("https://youtu.be/dQw4w9WgXcQ?t=42").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(video_id("https://youtu.be/"), None);
    }

    #[test]
    fn test_watch_links() {
        assert_eq!(
            video_id("https://www.youtube.com/watch?v=abc123&list=x").as_deref(),
            Some("abc123")
        );
    }

    #[test]
    fn test_embed_links() {
        assert_eq!(
            video_id("https://www.youtube.com/embed/xyz789").as_deref(),
            Some("xyz789")
        );
    }

    #[test]
    fn test_unrecognised() {
        assert_eq!(video_id("not a url"), None);
        assert_eq!(video_id("https://vimeo.com/12345"), None);
    }

    #[test]
    fn test_thumbnail() {
        assert_eq!(
            thumbnail_url("abc"),
            "https://img.youtube.com/vi/abc/hqdefault.jpg"
        );
    }
}
