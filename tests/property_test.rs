//! Property-based tests for the pure text and metadata helpers
//!
//! Invariants tested:
//! A - Sanitized names never contain path separators or reserved characters
//! B - Sanitizing and normalizing are idempotent
//! C - Offered qualities are a strictly descending subset of 1080/720/480
//! D - Composed titles are never empty

use mediafetch::extractor::models::{available_qualities, compose_title, FALLBACK_TITLE};
use mediafetch::extractor::EngineFormat;
use mediafetch::utils::{is_audio_only_host, normalize_url, sanitize_for_filename};
use proptest::prelude::*;

const RESERVED: [char; 10] = ['\\', '/', '*', '?', '<', '>', '|', '"', '\u{201C}', '\u{201D}'];

fn format_with_height(height: Option<u32>) -> EngineFormat {
    EngineFormat {
        height,
        ..Default::default()
    }
}

proptest! {
    // ========================================================================
    // INVARIANT A / B: filename sanitizing
    // ========================================================================

    #[test]
    fn sanitized_names_have_no_reserved_chars(title in "\\PC*") {
        let clean = sanitize_for_filename(&title);
        prop_assert!(!clean.contains(&RESERVED[..]));
        prop_assert_eq!(clean.chars().count(), title.chars().count());
    }

    #[test]
    fn sanitize_is_idempotent(title in "\\PC*") {
        let once = sanitize_for_filename(&title);
        prop_assert_eq!(sanitize_for_filename(&once), once);
    }

    // ========================================================================
    // INVARIANT B: URL normalization
    // ========================================================================

    #[test]
    fn normalized_urls_leave_the_music_host(path in "[a-zA-Z0-9/?=&_-]{0,40}") {
        let raw = format!("https://music.youtube.com/{}", path);
        let normalized = normalize_url(&raw);

        prop_assert!(!is_audio_only_host(&normalized));
        prop_assert_eq!(normalize_url(&normalized), normalized.clone());
        prop_assert!(normalized.ends_with(&path));
    }

    #[test]
    fn other_hosts_are_untouched(host in "[a-z]{1,12}\\.(com|org|tv)", path in "[a-z0-9/]{0,20}") {
        let raw = format!("https://{}/{}", host, path);
        prop_assert_eq!(normalize_url(&raw), raw);
    }

    // ========================================================================
    // INVARIANT C: offered qualities
    // ========================================================================

    #[test]
    fn qualities_are_descending_offered_heights(
        heights in proptest::collection::vec(proptest::option::of(0u32..2200), 0..40)
    ) {
        let formats: Vec<EngineFormat> = heights.iter().copied().map(format_with_height).collect();
        let offered = available_qualities(&formats);

        prop_assert!(offered.windows(2).all(|w| w[0] > w[1]));
        for q in &offered {
            prop_assert!([1080, 720, 480].contains(q));
            prop_assert!(heights.contains(&Some(*q)));
        }
        for h in [1080u32, 720, 480] {
            if heights.contains(&Some(h)) {
                prop_assert!(offered.contains(&h));
            }
        }
    }

    // ========================================================================
    // INVARIANT D: titles
    // ========================================================================

    #[test]
    fn composed_title_is_never_empty(
        author in proptest::option::of("\\PC{0,12}"),
        title in proptest::option::of("\\PC{0,24}")
    ) {
        let composed = compose_title(author.as_deref(), title.as_deref());
        prop_assert!(!composed.is_empty());

        let effective = title.as_deref().filter(|t| !t.is_empty()).unwrap_or(FALLBACK_TITLE);
        prop_assert!(composed.ends_with(effective));
        if author.as_deref().map_or(true, str::is_empty) {
            prop_assert_eq!(composed, effective);
        }
    }
}
