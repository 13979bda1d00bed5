use itertools::Itertools;
use serenity::{
    builder::CreateEmbed,
    model::{id::UserId, mention::Mention},
    utils::Colour,
};

use crate::{
    store::{Shift, ShiftStatus},
    utils::*,
};

const BOARD_COLOUR: Colour = Colour(0x2B2D31);
pub const BOARD_EMPTY_TEXT: &str = "*No active shifts*";

fn status_label(status: ShiftStatus) -> String {
    let emoji = match status {
        ShiftStatus::Planned => GREEN_CIRCLE_EMOJI,
        ShiftStatus::Canceled => CROSS_EMOJI,
        ShiftStatus::Completed => CHECK_EMOJI,
    };
    format!("{} **{}**", emoji, status)
}

/// Renders the full board body. Entries keep insertion order
pub fn board_description(shifts: &[Shift]) -> String {
    if shifts.is_empty() {
        return BOARD_EMPTY_TEXT.to_owned();
    }
    shifts
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let mut entry = format!(
                "**{}. {}**\n{} <t:{}:F> (<t:{}:R>)",
                i + 1,
                s.title,
                CLOCK_EMOJI,
                s.scheduled_at,
                s.scheduled_at,
            );
            if let Some(host) = s.host_id {
                entry.push_str(&format!(
                    "\n{} Host: {}",
                    BUST_EMOJI,
                    Mention::from(UserId(host))
                ));
            }
            entry.push_str(&format!(
                "\n{} Status: {}",
                MEMO_EMOJI,
                status_label(s.status)
            ));
            entry
        })
        .join("\n\n")
}

pub fn board_embed(shifts: &[Shift]) -> CreateEmbed {
    let mut e = CreateEmbed::default();
    e.title(format!("{} Shift Board", CLIPBOARD_EMOJI));
    e.colour(BOARD_COLOUR);
    e.description(board_description(shifts));
    e
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shift(title: &str, status: ShiftStatus) -> Shift {
        Shift {
            title: title.to_owned(),
            scheduled_at: 1736546400,
            host_id: None,
            status,
            auto_remove_at: None,
        }
    }

    #[test]
    fn empty_board_shows_placeholder() {
        assert_eq!(board_description(&[]), BOARD_EMPTY_TEXT);
    }

    #[test]
    fn entries_are_numbered_in_insertion_order() {
        let shifts = vec![
            shift("Evening", ShiftStatus::Planned),
            shift("Night", ShiftStatus::Canceled),
            shift("Morning", ShiftStatus::Completed),
        ];
        let body = board_description(&shifts);
        let one = body.find("**1. Evening**").expect("First entry missing");
        let two = body.find("**2. Night**").expect("Second entry missing");
        let three = body.find("**3. Morning**").expect("Third entry missing");
        assert!(one < two && two < three);
        assert_eq!(body.matches("<t:1736546400:F>").count(), 3);
    }

    #[test]
    fn status_labels_match_enum() {
        let body = board_description(&[shift("A", ShiftStatus::Planned)]);
        assert!(body.contains("🟢 **Planned**"));
        let body = board_description(&[shift("A", ShiftStatus::Canceled)]);
        assert!(body.contains("❌ **Canceled**"));
        let body = board_description(&[shift("A", ShiftStatus::Completed)]);
        assert!(body.contains("✅ **Completed**"));
    }

    #[test]
    fn host_line_only_when_present() {
        let mut with_host = shift("A", ShiftStatus::Planned);
        with_host.host_id = Some(42);
        let body = board_description(&[with_host]);
        assert!(body.contains("Host: <@42>"));

        let body = board_description(&[shift("A", ShiftStatus::Planned)]);
        assert!(!body.contains("Host:"));
    }
}
