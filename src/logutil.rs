//! Helpers that keep player-supplied text on a single log line.

use std::fmt::Write;

use crate::roleplay::types::Actor;

const MAX_PREVIEW: usize = 300;

/// Escape a string for single-line logging.
///
/// Newlines, tabs, backslashes and other control characters are escaped; anything past
/// 300 characters is cut off with an ellipsis.
pub fn escape_log(s: &str) -> String {
    let mut out = String::with_capacity(s.len().min(MAX_PREVIEW) + 8);
    for (count, ch) in s.chars().enumerate() {
        if count >= MAX_PREVIEW {
            out.push('…');
            break;
        }
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(&mut out, "\\x{:02X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}

/// `name#id`, as used in audit lines for actions taken by a player.
pub fn actor_tag(actor: &Actor) -> String {
    format!("{}#{}", escape_log(&actor.name), actor.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_control_characters() {
        assert_eq!(escape_log("Line1\nLine2\r\tEnd"), "Line1\\nLine2\\r\\tEnd");
        assert_eq!(escape_log("a\u{7}b"), "a\\x07b");
    }

    #[test]
    fn truncates_long_input() {
        let long = "x".repeat(400);
        let escaped = escape_log(&long);
        assert_eq!(escaped.chars().count(), 301);
        assert!(escaped.ends_with('…'));
    }

    #[test]
    fn tags_actor_with_id() {
        assert_eq!(actor_tag(&Actor::new(7, "Jo\nhn")), "Jo\\nhn#7");
    }
}
