//! URL normalization and filename-safe text

/// Host serving music-only pages of the main video site.
pub const AUDIO_ONLY_HOST: &str = "music.youtube.com";

/// Canonical host the engine handles for both.
pub const CANONICAL_HOST: &str = "www.youtube.com";

const FORBIDDEN_FILENAME_CHARS: [char; 7] = ['\\', '/', '*', '?', '<', '>', '|'];
const DOUBLE_QUOTES: [char; 3] = ['"', '\u{201C}', '\u{201D}'];

/// Rewrite the music subdomain to the canonical site host.
pub fn normalize_url(url: &str) -> String {
    url.replace(AUDIO_ONLY_HOST, CANONICAL_HOST)
}

/// True if the raw (not yet normalized) URL is served by the audio-only host.
///
/// Only the parsed host counts; the name appearing in a path or query does not.
pub fn is_audio_only_host(raw_url: &str) -> bool {
    match reqwest::Url::parse(raw_url) {
        Ok(parsed) => parsed
            .host_str()
            .map(|host| host.eq_ignore_ascii_case(AUDIO_ONLY_HOST))
            .unwrap_or(false),
        Err(_) => false,
    }
}

/// True for search-results pages, which never identify a single video.
pub fn is_search_url(url: &str) -> bool {
    let lower = url.to_lowercase();
    if lower.contains("/search") || lower.contains("search_query=") {
        return true;
    }

    match reqwest::Url::parse(&lower) {
        Ok(parsed) => parsed.path().trim_end_matches('/') == "/results",
        Err(_) => false,
    }
}

/// Make `text` usable as a single filesystem entry name.
pub fn sanitize_for_filename(text: &str) -> String {
    text.chars()
        .map(|c| {
            if FORBIDDEN_FILENAME_CHARS.contains(&c) {
                '_'
            } else if DOUBLE_QUOTES.contains(&c) {
                '\''
            } else {
                c
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_music_host() {
        assert_eq!(
            normalize_url("https://music.youtube.com/watch?v=abc"),
            "https://www.youtube.com/watch?v=abc"
        );
        assert_eq!(
            normalize_url("https://vimeo.com/123"),
            "https://vimeo.com/123"
        );
    }

    #[test]
    fn test_audio_only_host() {
        assert!(is_audio_only_host("https://music.youtube.com/watch?v=abc"));
        assert!(is_audio_only_host("https://MUSIC.youtube.com/watch?v=abc"));
        assert!(!is_audio_only_host("https://www.youtube.com/watch?v=abc"));
        assert!(!is_audio_only_host("https://example.com/?next=music.youtube.com"));
        assert!(!is_audio_only_host("https://example.com/music.youtube.com/x"));
        assert!(!is_audio_only_host("not a url"));
    }

    #[test]
    fn test_search_urls() {
        assert!(is_search_url("https://www.youtube.com/results?search_query=x"));
        assert!(is_search_url("https://music.youtube.com/SEARCH?q=x"));
        assert!(is_search_url("https://www.youtube.com/results/"));
        assert!(!is_search_url("https://www.youtube.com/watch?v=abc"));
        assert!(!is_search_url("https://example.com/research-video"));
    }

    #[test]
    fn test_sanitize_replaces_reserved() {
        assert_eq!(
            sanitize_for_filename(r#"a\b/c*d?e<f>g|h"i"#),
            "a_b_c_d_e_f_g_h'i"
        );
        assert_eq!(sanitize_for_filename("\u{201C}Live\u{201D}"), "'Live'");
        assert_eq!(sanitize_for_filename("Ünïcödé – ok"), "Ünïcödé – ok");
    }
}
