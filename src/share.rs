//! Share/export boundary
//!
//! Composes the plain-text result string handed to the external sharing
//! mechanism; the core never opens anything itself.

/// Result string for the current run
pub fn share_message(score: u64, victory: bool) -> String {
    if victory {
        format!("I escaped the galaxy with {score} points in Galaxy Dash Challenge!")
    } else {
        format!("Scored {score} in Galaxy Dash Challenge!")
    }
}
