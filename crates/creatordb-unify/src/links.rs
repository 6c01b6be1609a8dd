//! Social-link URL parsing: map a raw profile URL to (platform, username).

use std::sync::LazyLock;

use creatordb_core::Platform;
use regex::Regex;

static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?ix)^(?:https?://)?(?:www\.)?
          (?:
            (?P<twitch>twitch\.tv)/ |
            (?P<youtube>youtube\.com)/@ |
            (?P<kick>kick\.com)/ |
            (?P<trovo>trovo\.live)/ |
            (?P<twitter>twitter\.com|x\.com)/ |
            (?P<instagram>instagram\.com)/ |
            (?P<tiktok>tiktok\.com)/@ |
            (?P<linkedin>linkedin\.com)/(?:in|company)/
          )
          (?P<username>[A-Za-z0-9._-]+)",
    )
    .expect("valid regex")
});

/// Parse a raw social link into a platform and username.
///
/// Recognizes the canonical profile-URL shape of each supported platform,
/// with or without scheme and `www.`. Returns `None` for anything else —
/// unrecognized links are simply not usable as match keys.
#[must_use]
pub fn parse_social_link(url: &str) -> Option<(Platform, String)> {
    let caps = LINK_RE.captures(url.trim())?;
    let username = caps.name("username")?.as_str().to_string();

    let platform = if caps.name("twitch").is_some() {
        Platform::Twitch
    } else if caps.name("youtube").is_some() {
        Platform::YouTube
    } else if caps.name("kick").is_some() {
        Platform::Kick
    } else if caps.name("trovo").is_some() {
        Platform::Trovo
    } else if caps.name("twitter").is_some() {
        Platform::Twitter
    } else if caps.name("instagram").is_some() {
        Platform::Instagram
    } else if caps.name("tiktok").is_some() {
        Platform::TikTok
    } else if caps.name("linkedin").is_some() {
        Platform::LinkedIn
    } else {
        return None;
    };

    Some((platform, username))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_linkedin_profile_url() {
        let parsed = parse_social_link("https://www.linkedin.com/in/alice-biz");
        assert_eq!(parsed, Some((Platform::LinkedIn, "alice-biz".to_string())));
    }

    #[test]
    fn parses_linkedin_company_url() {
        let parsed = parse_social_link("https://linkedin.com/company/acme-media");
        assert_eq!(parsed, Some((Platform::LinkedIn, "acme-media".to_string())));
    }

    #[test]
    fn parses_x_dot_com_as_twitter() {
        let parsed = parse_social_link("https://x.com/alice_ttv");
        assert_eq!(parsed, Some((Platform::Twitter, "alice_ttv".to_string())));
    }

    #[test]
    fn parses_tiktok_handle_url() {
        let parsed = parse_social_link("https://www.tiktok.com/@alice.clips");
        assert_eq!(parsed, Some((Platform::TikTok, "alice.clips".to_string())));
    }

    #[test]
    fn parses_bare_host_without_scheme() {
        let parsed = parse_social_link("twitch.tv/alice");
        assert_eq!(parsed, Some((Platform::Twitch, "alice".to_string())));
    }

    #[test]
    fn youtube_requires_handle_form() {
        assert_eq!(
            parse_social_link("https://youtube.com/@alicegaming"),
            Some((Platform::YouTube, "alicegaming".to_string()))
        );
        // Channel-id URLs are not usable as username match keys.
        assert_eq!(
            parse_social_link("https://youtube.com/channel/UC123"),
            None
        );
    }

    #[test]
    fn unknown_host_is_ignored() {
        assert_eq!(parse_social_link("https://example.com/alice"), None);
        assert_eq!(parse_social_link("not a url"), None);
    }
}
