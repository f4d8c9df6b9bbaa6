use super::client::{Board, Card, List, Member};
use crate::llm::tools::ToolDescriptor;
use schemars::JsonSchema;
use serde::Deserialize;
use std::fmt::Write;

pub const LIST_BOARDS: &str = "trello_list_boards";
pub const GET_BOARD: &str = "trello_get_board";
pub const GET_LISTS: &str = "trello_get_lists";
pub const CREATE_LIST: &str = "trello_create_list";
pub const CREATE_CARD: &str = "trello_create_card";
pub const GET_CARD: &str = "trello_get_card";
pub const GET_CARDS_ON_LIST: &str = "trello_get_cards_on_list";
pub const GET_CARDS_ON_BOARD: &str = "trello_get_cards_on_board";
pub const UPDATE_CARD: &str = "trello_update_card";
pub const ADD_COMMENT: &str = "trello_add_comment";
pub const GET_BOARD_MEMBERS: &str = "trello_get_board_members";

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct NoArgs {}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct BoardArgs {
    /// The board ID
    pub board_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListArgs {
    /// The list ID
    pub list_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CardArgs {
    /// The card ID
    pub card_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateListArgs {
    /// The board ID where the list will be created
    pub board_id: String,
    /// Name of the list
    pub name: String,
}

#[derive(Debug, Clone, Copy, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum CardPosition {
    Top,
    Bottom,
}

impl CardPosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardPosition::Top => "top",
            CardPosition::Bottom => "bottom",
        }
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateCardArgs {
    /// The list ID where the card will be created
    pub list_id: String,
    /// Title of the card
    pub name: String,
    /// Description of the card (Markdown supported)
    pub description: Option<String>,
    /// Position of the card: 'top' or 'bottom'
    pub position: Option<CardPosition>,
    /// Due date in ISO 8601 format (e.g., 2024-12-31T23:59:59Z)
    pub due_date: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateCardArgs {
    /// The card ID to update
    pub card_id: String,
    /// New title for the card
    pub name: Option<String>,
    /// New description for the card
    pub description: Option<String>,
    /// Whether the card is closed (archived)
    pub closed: Option<bool>,
    /// Move card to a different list
    pub list_id: Option<String>,
    /// Due date in ISO 8601 format
    pub due: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct AddCommentArgs {
    /// The card ID
    pub card_id: String,
    /// The comment text
    pub text: String,
}

pub fn descriptors() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor::for_args::<NoArgs>(
            LIST_BOARDS,
            "List all Trello boards accessible to the authenticated user",
        ),
        ToolDescriptor::for_args::<BoardArgs>(GET_BOARD, "Get details of a specific Trello board by ID"),
        ToolDescriptor::for_args::<BoardArgs>(GET_LISTS, "Get all lists from a Trello board"),
        ToolDescriptor::for_args::<CreateListArgs>(CREATE_LIST, "Create a new list on a Trello board"),
        ToolDescriptor::for_args::<CreateCardArgs>(CREATE_CARD, "Create a new card on a Trello list"),
        ToolDescriptor::for_args::<CardArgs>(GET_CARD, "Get details of a specific Trello card by ID"),
        ToolDescriptor::for_args::<ListArgs>(
            GET_CARDS_ON_LIST,
            "Get all cards from a specific Trello list",
        ),
        ToolDescriptor::for_args::<BoardArgs>(GET_CARDS_ON_BOARD, "Get all cards from a Trello board"),
        ToolDescriptor::for_args::<UpdateCardArgs>(UPDATE_CARD, "Update an existing Trello card"),
        ToolDescriptor::for_args::<AddCommentArgs>(ADD_COMMENT, "Add a comment to a Trello card"),
        ToolDescriptor::for_args::<BoardArgs>(GET_BOARD_MEMBERS, "Get all members of a Trello board"),
    ]
}

fn open_or(closed: bool, closed_label: &'static str) -> &'static str {
    if closed {
        closed_label
    } else {
        "Open"
    }
}

pub fn format_boards(boards: &[Board]) -> String {
    if boards.is_empty() {
        return "No boards found.".to_string();
    }

    let mut out = format!("Found {} boards:\n\n", boards.len());
    for board in boards {
        let _ = writeln!(
            out,
            "- [{}] {} (ID: {}, URL: {})",
            open_or(board.closed, "Closed"),
            board.name,
            board.id,
            board.short_url
        );
    }
    out
}

pub fn format_board(board: &Board) -> String {
    let mut out = format!("Board: {}\n", board.name);
    let _ = writeln!(out, "ID: {}", board.id);
    let _ = writeln!(out, "Status: {}", open_or(board.closed, "Closed"));
    let _ = writeln!(out, "URL: {}", board.short_url);
    if !board.desc.is_empty() {
        let _ = writeln!(out, "Description: {}", board.desc);
    }
    out
}

pub fn format_lists(lists: &[List]) -> String {
    if lists.is_empty() {
        return "No lists found.".to_string();
    }

    let mut out = format!("Found {} lists:\n\n", lists.len());
    for list in lists {
        let _ = writeln!(out, "- [{}] {} (ID: {})", open_or(list.closed, "Closed"), list.name, list.id);
    }
    out
}

pub fn format_cards(cards: &[Card]) -> String {
    if cards.is_empty() {
        return "No cards found.".to_string();
    }

    let mut out = format!("Found {} cards:\n\n", cards.len());
    for card in cards {
        let _ = writeln!(
            out,
            "- [{}] {} (ID: {}, URL: {})",
            open_or(card.closed, "Archived"),
            card.name,
            card.id,
            card.short_url
        );
        if !card.desc.is_empty() {
            let _ = writeln!(out, "  Description: {}", card.desc);
        }
        if let Some(due) = card.due.as_deref().filter(|d| !d.is_empty()) {
            let _ = writeln!(out, "  Due: {}", due);
        }
    }
    out
}

pub fn format_card(card: &Card) -> String {
    let mut out = format!("Card: {}\n", card.name);
    let _ = writeln!(out, "ID: {}", card.id);
    let _ = writeln!(out, "Status: {}", open_or(card.closed, "Archived"));
    let _ = writeln!(out, "URL: {}", card.short_url);
    if !card.desc.is_empty() {
        let _ = writeln!(out, "Description: {}", card.desc);
    }
    if let Some(due) = card.due.as_deref().filter(|d| !d.is_empty()) {
        let _ = writeln!(out, "Due: {}", due);
    }
    if !card.labels.is_empty() {
        let labels: Vec<String> = card
            .labels
            .iter()
            .map(|label| format!("{} ({})", label.name, label.color.as_deref().unwrap_or("none")))
            .collect();
        let _ = writeln!(out, "Labels: {}", labels.join(", "));
    }
    out
}

pub fn format_members(members: &[Member]) -> String {
    if members.is_empty() {
        return "No members found.".to_string();
    }

    let mut out = format!("Found {} members:\n\n", members.len());
    for member in members {
        let _ = writeln!(out, "- {} (@{}, ID: {})", member.full_name, member.username, member.id);
    }
    out
}
