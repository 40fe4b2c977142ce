use std::sync::LazyLock;

use regex::Regex;

static DESKTOP_MAC: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"Macintosh|MacIntel|MacPPC|Mac68K").ok());
static IOS_DEVICE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"iPad|iPhone|iPod").ok());

/// What the resolver needs to know about the viewer's client
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientProfile {
    pub user_agent: String,
    pub platform: String,
    pub max_touch_points: u32,
}

impl ClientProfile {
    pub fn from_user_agent<S: Into<String>>(user_agent: S) -> Self {
        Self {
            user_agent: user_agent.into(),
            ..Default::default()
        }
    }

    /// The capability flag fed to the resolver.
    ///
    /// Despite the name this is `false` for Apple clients and `true` for
    /// everyone else. `true` selects FLV for Provider-C, while `false` is what
    /// triggers the `pull.niur.live` FLV rewrite.
    pub fn is_apple_like(&self) -> bool {
        detect_apple_like(&self.user_agent, &self.platform, self.max_touch_points)
    }
}

pub fn detect_apple_like(user_agent: &str, platform: &str, max_touch_points: u32) -> bool {
    let matches = |re: &LazyLock<Option<Regex>>| re.as_ref().is_some_and(|r| r.is_match(user_agent));
    if matches(&DESKTOP_MAC) {
        return false;
    }
    if matches(&IOS_DEVICE) || (platform == "MacIntel" && max_touch_points > 1) {
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Mozilla/5.0 (Macintosh; Intel Mac OS X 14_5) AppleWebKit/605.1.15", "", 0, false)]
    #[case("Mozilla/5.0 (iPhone; CPU iPhone OS 17_5 like Mac OS X)", "iPhone", 5, false)]
    #[case("Mozilla/5.0 (X11; Linux x86_64)", "MacIntel", 5, false)]
    #[case("Mozilla/5.0 (Windows NT 10.0; Win64; x64)", "Win32", 0, true)]
    #[case("Mozilla/5.0 (Linux; Android 14)", "Linux armv8l", 5, true)]
    #[case("", "", 0, true)]
    fn detects_client_flag(
        #[case] user_agent: &str,
        #[case] platform: &str,
        #[case] touch_points: u32,
        #[case] expected: bool,
    ) {
        assert_eq!(detect_apple_like(user_agent, platform, touch_points), expected);
    }

    #[test]
    fn profile_from_user_agent_only() {
        assert!(ClientProfile::from_user_agent("curl/8.0").is_apple_like());
        assert!(!ClientProfile::from_user_agent("iPad; CPU OS 17").is_apple_like());
    }
}
