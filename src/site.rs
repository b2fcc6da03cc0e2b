//! Bits of the static shell that come from the configuration.

use crate::{config::DisplayConfig, ethereum::Address};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Social {
    Twitter,
    Discord,
    OpenSea,
}

impl Social {
    pub fn name(self) -> &'static str {
        match self {
            Self::Twitter => "Twitter",
            Self::Discord => "Discord",
            Self::OpenSea => "OpenSea",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocialLink {
    pub social: Social,
    pub url: String,
    /// `"Crabs on Twitter"`
    pub label: String,
}

/// the configured social links, in header order
pub fn social_links(display: &DisplayConfig) -> Vec<SocialLink> {
    [
        (Social::Twitter, &display.twitter_url),
        (Social::Discord, &display.discord_url),
        (Social::OpenSea, &display.opensea_url),
    ]
    .into_iter()
    .filter_map(|(social, url)| {
        let url = url.as_ref()?;
        Some(SocialLink {
            social,
            url: url.clone(),
            label: format!("{} on {}", display.name, social.name()),
        })
    })
    .collect()
}

/// what the header shows in place of the connect button
pub fn account_badge(account: &Address) -> String {
    account.short()
}

/// `"© 2026 Crabs"`
pub fn copyright(display: &DisplayConfig, year: i32) -> String {
    format!("© {year} {}", display.name)
}
