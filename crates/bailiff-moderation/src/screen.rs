//! Punishment screens: the text a rejected or kicked player sees.
//!
//! The output is deterministic for a given punishment and issuer name (the
//! expiry is printed as an absolute UTC time, not a countdown), so two
//! resolutions of the same history produce the same screen.

use bailiff_types::Punishment;

use crate::ModerationConfig;

/// Renders the screen for `punishment`, crediting it to `issuer_name`.
///
/// ```text
/// You have been temporarily banned from Arena Network
///
/// Reason: griefing
/// Issued by: Moderator
/// Expires: 2026-10-20 14:00 UTC
/// Appeal at: https://appeal.example
/// ```
pub fn render_screen(
    punishment: &Punishment,
    issuer_name: &str,
    config: &ModerationConfig,
) -> String {
    let mut lines = vec![
        format!(
            "You have been {} from {}",
            punishment.kind.verb(),
            config.server_name
        ),
        String::new(),
        format!("Reason: {}", punishment.reason),
        format!("Issued by: {issuer_name}"),
    ];

    if let Some(expiry) = punishment.expires_at {
        lines.push(format!("Expires: {}", expiry.format("%Y-%m-%d %H:%M UTC")));
    }
    if let Some(link) = &config.appeal_link {
        lines.push(format!("Appeal at: {link}"));
    }

    lines.join("\n")
}
