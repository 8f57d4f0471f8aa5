//! Hero aggregator - the ordered media sequence for the home-page slider.
//!
//! A pure read-side merge over catalog query results: images and videos from
//! the hero section are combined into one sequence, the designated primary
//! video is pinned before everything else, and a static fallback slide keeps
//! the slider non-empty when no pinned video exists.

pub mod handlers;

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::asset::models::{Asset, MediaKind};

pub const HERO_SECTION: &str = "hero-home";

/// Effective sort key for the pinned primary video, conceptually "before
/// everything else" while leaving room below for arithmetic.
const PINNED_ORDER: i64 = i64::MIN / 2;

/// One slide of the hero slider.
///
/// `id` is `None` for the synthesized fallback slide, which is not backed by
/// a catalog record and must never be patched or deleted.
#[derive(Debug, Serialize, Clone, ToSchema)]
pub struct HeroSlide {
    pub id: Option<Uuid>,
    pub media_kind: MediaKind,
    pub url: String,
    pub content_type: String,
    pub slug: Option<String>,
    pub poster_asset_id: Option<Uuid>,
    pub pinned: bool,
}

impl HeroSlide {
    fn from_asset(asset: &Asset, pinned: bool) -> Self {
        HeroSlide {
            id: Some(asset.id),
            media_kind: asset.media_kind,
            url: asset.content_url(),
            content_type: asset.content_type.clone(),
            slug: asset.slug.clone(),
            poster_asset_id: asset.poster_asset_id,
            pinned,
        }
    }

    fn fallback(url: &str) -> Self {
        HeroSlide {
            id: None,
            media_kind: MediaKind::Video,
            url: url.to_string(),
            content_type: "video/mp4".to_string(),
            slug: None,
            poster_asset_id: None,
            pinned: true,
        }
    }
}

/// Merges hero images and videos into one ordered sequence.
///
/// A video whose slug equals `primary_slug` sorts first regardless of its
/// stored order. When no such video exists, the fallback slide (if
/// configured) is prepended so the slider is never empty; with no fallback
/// either, an empty sequence is returned and the caller renders its own
/// static placeholder.
pub fn aggregate(
    images: Vec<Asset>,
    videos: Vec<Asset>,
    primary_slug: &str,
    fallback_url: Option<&str>,
) -> Vec<HeroSlide> {
    let mut merged: Vec<(i64, chrono::DateTime<chrono::Utc>, HeroSlide)> = Vec::new();
    let mut has_pinned = false;

    for asset in images.iter().chain(videos.iter()) {
        let pinned = asset.media_kind == MediaKind::Video
            && asset.slug.as_deref() == Some(primary_slug);
        let effective_order = if pinned { PINNED_ORDER } else { asset.order };
        has_pinned = has_pinned || pinned;
        merged.push((
            effective_order,
            asset.uploaded_at,
            HeroSlide::from_asset(asset, pinned),
        ));
    }

    merged.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    let mut slides: Vec<HeroSlide> = merged.into_iter().map(|(_, _, slide)| slide).collect();

    if !has_pinned {
        if let Some(url) = fallback_url {
            slides.insert(0, HeroSlide::fallback(url));
        }
    }

    slides
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn asset(kind: MediaKind, order: i64, slug: Option<&str>, uploaded_secs: i64) -> Asset {
        Asset {
            id: Uuid::new_v4(),
            filename: "hero.bin".to_string(),
            content_type: match kind {
                MediaKind::Image => "image/jpeg".to_string(),
                MediaKind::Video => "video/mp4".to_string(),
            },
            media_kind: kind,
            uploaded_at: Utc.timestamp_opt(uploaded_secs, 0).unwrap(),
            category: "hero".to_string(),
            section: Some(HERO_SECTION.to_string()),
            slug: slug.map(|s| s.to_string()),
            order,
            poster_asset_id: None,
            seeded: false,
        }
    }

    #[test]
    fn primary_video_is_pinned_first_regardless_of_order() {
        let generic = asset(MediaKind::Video, 50, None, 0);
        let primary = asset(MediaKind::Video, 9000, Some("hero-lonier-video"), 0);

        let slides = aggregate(
            Vec::new(),
            vec![generic.clone(), primary.clone()],
            "hero-lonier-video",
            Some("/static/hero-fallback.mp4"),
        );

        assert_eq!(slides.len(), 2);
        assert_eq!(slides[0].id, Some(primary.id));
        assert!(slides[0].pinned);
        assert_eq!(slides[1].id, Some(generic.id));
    }

    #[test]
    fn image_with_primary_slug_is_not_pinned() {
        let image = asset(MediaKind::Image, 10, Some("hero-lonier-video"), 0);
        let slides = aggregate(vec![image], Vec::new(), "hero-lonier-video", None);
        // The pinning rule only applies to videos
        assert_eq!(slides.len(), 1);
        assert!(!slides[0].pinned);
    }

    #[test]
    fn fallback_is_prepended_when_nothing_is_pinned() {
        let image = asset(MediaKind::Image, 100, None, 0);
        let slides = aggregate(
            vec![image.clone()],
            Vec::new(),
            "hero-lonier-video",
            Some("/static/hero-fallback.mp4"),
        );

        assert_eq!(slides.len(), 2);
        assert_eq!(slides[0].id, None);
        assert!(slides[0].pinned);
        assert_eq!(slides[0].url, "/static/hero-fallback.mp4");
        assert_eq!(slides[1].id, Some(image.id));
    }

    #[test]
    fn empty_section_yields_exactly_the_fallback_slide() {
        let slides = aggregate(
            Vec::new(),
            Vec::new(),
            "hero-lonier-video",
            Some("/static/hero-fallback.mp4"),
        );
        assert_eq!(slides.len(), 1);
        assert_eq!(slides[0].id, None);
    }

    #[test]
    fn empty_section_without_fallback_yields_empty_sequence() {
        let slides = aggregate(Vec::new(), Vec::new(), "hero-lonier-video", None);
        assert!(slides.is_empty());
    }

    #[test]
    fn merge_sorts_by_order_with_uploaded_at_tie_break() {
        let early = asset(MediaKind::Image, 100, None, 1000);
        let late = asset(MediaKind::Image, 100, None, 2000);
        let video = asset(MediaKind::Video, 200, None, 0);

        let slides = aggregate(
            vec![late.clone(), early.clone()],
            vec![video.clone()],
            "hero-lonier-video",
            None,
        );
        assert_eq!(
            slides.iter().map(|s| s.id).collect::<Vec<_>>(),
            vec![Some(early.id), Some(late.id), Some(video.id)]
        );
    }
}
