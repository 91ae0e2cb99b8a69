//! Text rendering for match results and the gallery.
//!
//! Each call is a full render pass over a fresh buffer, so stale entries
//! from a previous pass can never survive. Image bytes are never embedded:
//! every item is shown by its per-id URL, probed for availability through an
//! injected closure so offline tests need no server.

use crate::api::{MatchResult, PhotoId, PhotoRef};

pub const NO_MATCHES: &str = "No matching photos found.";
pub const NO_IMAGES: &str = "No images found for this event.";
pub const IMAGE_UNAVAILABLE: &str = "Image not available";

pub fn render_matches(
    matches: &[MatchResult],
    image_url: impl Fn(PhotoId) -> String,
    available: impl Fn(PhotoId) -> bool,
) -> Vec<String> {
    let mut lines = Vec::new();
    if matches.is_empty() {
        lines.push(NO_MATCHES.to_string());
        return lines;
    }
    for m in matches {
        push_item(&mut lines, m.id, &image_url, &available);
        lines.push(format!("  Similarity: {:.1}%", m.similarity * 100.0));
    }
    lines
}

pub fn render_gallery(
    photos: &[PhotoRef],
    image_url: impl Fn(PhotoId) -> String,
    available: impl Fn(PhotoId) -> bool,
) -> Vec<String> {
    let mut lines = Vec::new();
    if photos.is_empty() {
        lines.push(NO_IMAGES.to_string());
        return lines;
    }
    for p in photos {
        push_item(&mut lines, p.id, &image_url, &available);
    }
    lines
}

fn push_item(
    lines: &mut Vec<String>,
    id: PhotoId,
    image_url: &impl Fn(PhotoId) -> String,
    available: &impl Fn(PhotoId) -> bool,
) {
    let url = image_url(id);
    if available(id) {
        lines.push(format!("photo {id}  {url}"));
    } else {
        lines.push(format!("photo {id}  [{IMAGE_UNAVAILABLE}]"));
    }
    lines.push(format!("  View: {url}"));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(id: PhotoId) -> String {
        format!("/download/image/{id}")
    }

    #[test]
    fn empty_matches_render_the_placeholder() {
        let lines = render_matches(&[], url, |_| true);
        assert_eq!(lines, vec![NO_MATCHES.to_string()]);
    }

    #[test]
    fn empty_gallery_renders_its_own_placeholder() {
        let lines = render_gallery(&[], url, |_| true);
        assert_eq!(lines, vec![NO_IMAGES.to_string()]);
    }

    #[test]
    fn similarity_is_a_percentage_with_one_decimal() {
        let matches = vec![MatchResult {
            id: 7,
            similarity: 0.853,
        }];
        let lines = render_matches(&matches, url, |_| true);
        assert!(lines.contains(&"  Similarity: 85.3%".to_string()));
        assert!(lines.contains(&"photo 7  /download/image/7".to_string()));
        assert!(lines.contains(&"  View: /download/image/7".to_string()));
    }

    #[test]
    fn server_order_is_preserved() {
        let matches = vec![
            MatchResult {
                id: 9,
                similarity: 0.2,
            },
            MatchResult {
                id: 1,
                similarity: 0.99,
            },
        ];
        let lines = render_matches(&matches, url, |_| true);
        let first = lines.iter().position(|l| l.starts_with("photo 9")).unwrap();
        let second = lines.iter().position(|l| l.starts_with("photo 1")).unwrap();
        assert!(first < second);
    }

    #[test]
    fn unavailable_images_fall_back_to_placeholder_text() {
        let photos = vec![PhotoRef { id: 3 }, PhotoRef { id: 4 }];
        let lines = render_gallery(&photos, url, |id| id != 3);
        assert!(lines.contains(&format!("photo 3  [{IMAGE_UNAVAILABLE}]")));
        assert!(lines.contains(&"photo 4  /download/image/4".to_string()));
        // The view link stays even when the thumbnail fails.
        assert!(lines.contains(&"  View: /download/image/3".to_string()));
    }
}
