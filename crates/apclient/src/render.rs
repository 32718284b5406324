//! Rendering of `PrintJSON` text nodes to plain or ANSI-colored text.
//!
//! Id-bearing nodes (`player_id`, `item_id`, `location_id`) are resolved
//! to names through a [`RenderSource`], which the client implements over
//! its catalog and player tables. Default colors come from the node
//! type: item colors follow the item's classification flags, hint
//! statuses follow their severity, and players are highlighted when they
//! are the connected slot.

use apclient_protocol::{HintStatus, TextNode};

use crate::ClientError;

const ANSI_RESET: &str = "\x1b[0m";

/// Output flavor for [`render`]. HTML is declared but unsupported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderFormat {
    Text,
    Html,
    Ansi,
}

/// Name and identity context needed to render id-bearing nodes.
pub trait RenderSource {
    /// The connected slot number, or -1 before a slot join.
    fn own_slot(&self) -> i32;
    /// Display alias for a slot; "Server" for slot 0, "Unknown" when the
    /// slot is not in the player table.
    fn player_alias(&self, slot: i32) -> String;
    /// The game a slot is playing, when known.
    fn player_game(&self, slot: i32) -> Option<String>;
    /// Item display name, resolved against the given game's catalog.
    fn item_name(&self, id: i64, game: Option<&str>) -> String;
    /// Location display name, resolved against the given game's catalog.
    fn location_name(&self, id: i64, game: Option<&str>) -> String;
}

/// Renders a node sequence.
///
/// # Errors
/// Returns [`ClientError::UnsupportedRenderFormat`] for
/// [`RenderFormat::Html`].
pub fn render(
    nodes: &[TextNode],
    format: RenderFormat,
    source: &dyn RenderSource,
) -> Result<String, ClientError> {
    if format == RenderFormat::Html {
        return Err(ClientError::UnsupportedRenderFormat(format));
    }

    let mut out = String::new();
    let mut color_open = false;
    for node in nodes {
        let mut color = if format == RenderFormat::Text {
            String::new()
        } else {
            node.color.clone()
        };
        let text = resolve_node(node, &mut color, source);

        if format == RenderFormat::Ansi {
            if color.is_empty() && color_open {
                out.push_str(ANSI_RESET);
                color_open = false;
            } else if !color.is_empty() {
                out.push_str(color_sequence(&color));
                color_open = true;
            }
            out.push_str(&strip_escapes(&text));
        } else {
            out.push_str(&text);
        }
    }
    if format == RenderFormat::Ansi && color_open {
        out.push_str(ANSI_RESET);
    }
    Ok(out)
}

/// Produces the node's display text and fills in the default color when
/// none was given.
fn resolve_node(node: &TextNode, color: &mut String, source: &dyn RenderSource) -> String {
    match node.kind.as_str() {
        "player_id" => {
            let slot: i32 = node.text.parse().unwrap_or_default();
            if color.is_empty() {
                *color = if slot == source.own_slot() {
                    "magenta".into()
                } else {
                    "yellow".into()
                };
            }
            source.player_alias(slot)
        }
        "item_id" => {
            let id: i64 = node.text.parse().unwrap_or_default();
            if color.is_empty() {
                *color = if node.flags.is_advancement() {
                    "plum".into()
                } else if node.flags.is_never_exclude() {
                    "slateblue".into()
                } else if node.flags.is_trap() {
                    "salmon".into()
                } else {
                    "cyan".into()
                };
            }
            let game = source.player_game(node.player);
            source.item_name(id, game.as_deref())
        }
        "location_id" => {
            let id: i64 = node.text.parse().unwrap_or_default();
            if color.is_empty() {
                *color = "blue".into();
            }
            let game = source.player_game(node.player);
            source.location_name(id, game.as_deref())
        }
        "hint_status" => {
            if color.is_empty() {
                *color = hint_status_color(node.hint_status).into();
            }
            node.text.clone()
        }
        _ => node.text.clone(),
    }
}

fn hint_status_color(status: Option<i32>) -> &'static str {
    match status.and_then(HintStatus::from_wire) {
        Some(HintStatus::Found) => "green",
        Some(HintStatus::Unspecified) => "grey",
        Some(HintStatus::NoPriority) => "slateblue",
        Some(HintStatus::Avoid) => "salmon",
        Some(HintStatus::Priority) => "plum",
        None => "red",
    }
}

fn color_sequence(color: &str) -> &'static str {
    match color {
        "red" => "\x1b[31m",
        "green" => "\x1b[32m",
        "yellow" => "\x1b[33m",
        "blue" => "\x1b[34m",
        "magenta" => "\x1b[35m",
        "cyan" => "\x1b[36m",
        "plum" => "\x1b[38:5:219m",
        "slateblue" => "\x1b[38:5:62m",
        "salmon" => "\x1b[38:5:210m",
        "grey" | "gray" => "\x1b[90m",
        _ => ANSI_RESET,
    }
}

/// Replaces ESC bytes with spaces so server-supplied text cannot inject
/// terminal control sequences.
fn strip_escapes(text: &str) -> String {
    text.replace('\x1b', " ")
}

// =========================================================================
// Tests
// =========================================================================
