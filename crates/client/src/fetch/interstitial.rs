//! Bot-challenge and consent page detection.
//!
//! A 200 response is not proof of usable content: video hosts in particular
//! answer datacenter IPs with consent walls and CAPTCHA pages.

/// Return the first marker found in `body`, compared case-insensitively.
pub fn detect_interstitial<'m>(body: &str, markers: &'m [String]) -> Option<&'m str> {
    if markers.is_empty() {
        return None;
    }
    let lower = body.to_lowercase();
    markers
        .iter()
        .map(String::as_str)
        .find(|m| !m.is_empty() && lower.contains(&m.to_lowercase()))
}
