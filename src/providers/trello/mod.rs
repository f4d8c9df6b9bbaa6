//! Trello provider: boards, lists, cards, comments and members.

pub mod client;
pub mod tools;

pub use client::TrelloClient;

use crate::error::{Result, SwitchyardError};
use crate::llm::tools::ToolDescriptor;
use crate::providers::{decode_args, Dispatch, ToolProvider};
use async_trait::async_trait;
use client::{CardUpdate, NewCard};
use serde_json::Value;
use tools::*;
use tracing::info;

pub struct TrelloProvider {
    client: TrelloClient,
}

fn require(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(SwitchyardError::ToolError(format!("{} is required", field)));
    }
    Ok(())
}

impl TrelloProvider {
    pub fn new(client: TrelloClient) -> Self {
        Self { client }
    }

    async fn run(&self, name: &str, arguments: &Value) -> Option<Result<String>> {
        let result = match name {
            LIST_BOARDS => self.list_boards(arguments).await,
            GET_BOARD => self.get_board(arguments).await,
            GET_LISTS => self.get_lists(arguments).await,
            CREATE_LIST => self.create_list(arguments).await,
            CREATE_CARD => self.create_card(arguments).await,
            GET_CARD => self.get_card(arguments).await,
            GET_CARDS_ON_LIST => self.get_cards_on_list(arguments).await,
            GET_CARDS_ON_BOARD => self.get_cards_on_board(arguments).await,
            UPDATE_CARD => self.update_card(arguments).await,
            ADD_COMMENT => self.add_comment(arguments).await,
            GET_BOARD_MEMBERS => self.get_board_members(arguments).await,
            _ => return None,
        };
        Some(result)
    }

    async fn list_boards(&self, arguments: &Value) -> Result<String> {
        let _: NoArgs = decode_args(LIST_BOARDS, arguments)?;
        Ok(format_boards(&self.client.list_boards().await?))
    }

    async fn get_board(&self, arguments: &Value) -> Result<String> {
        let args: BoardArgs = decode_args(GET_BOARD, arguments)?;
        require(&args.board_id, "board_id")?;
        Ok(format_board(&self.client.get_board(&args.board_id).await?))
    }

    async fn get_lists(&self, arguments: &Value) -> Result<String> {
        let args: BoardArgs = decode_args(GET_LISTS, arguments)?;
        require(&args.board_id, "board_id")?;
        Ok(format_lists(&self.client.get_lists(&args.board_id).await?))
    }

    async fn create_list(&self, arguments: &Value) -> Result<String> {
        let args: CreateListArgs = decode_args(CREATE_LIST, arguments)?;
        require(&args.board_id, "board_id")?;
        require(&args.name, "name")?;
        let list = self.client.create_list(&args.board_id, &args.name).await?;
        Ok(format!("Created list '{}' (ID: {})", list.name, list.id))
    }

    async fn create_card(&self, arguments: &Value) -> Result<String> {
        let args: CreateCardArgs = decode_args(CREATE_CARD, arguments)?;
        require(&args.list_id, "list_id")?;
        require(&args.name, "name")?;

        let card = self
            .client
            .create_card(&NewCard {
                list_id: args.list_id,
                name: args.name,
                desc: args.description,
                position: args.position.map(|p| p.as_str().to_string()),
                due: args.due_date,
            })
            .await?;

        Ok(format!("Created card '{}' (ID: {}, URL: {})", card.name, card.id, card.short_url))
    }

    async fn get_card(&self, arguments: &Value) -> Result<String> {
        let args: CardArgs = decode_args(GET_CARD, arguments)?;
        require(&args.card_id, "card_id")?;
        Ok(format_card(&self.client.get_card(&args.card_id).await?))
    }

    async fn get_cards_on_list(&self, arguments: &Value) -> Result<String> {
        let args: ListArgs = decode_args(GET_CARDS_ON_LIST, arguments)?;
        require(&args.list_id, "list_id")?;
        Ok(format_cards(&self.client.get_cards_on_list(&args.list_id).await?))
    }

    async fn get_cards_on_board(&self, arguments: &Value) -> Result<String> {
        let args: BoardArgs = decode_args(GET_CARDS_ON_BOARD, arguments)?;
        require(&args.board_id, "board_id")?;
        Ok(format_cards(&self.client.get_cards_on_board(&args.board_id).await?))
    }

    async fn update_card(&self, arguments: &Value) -> Result<String> {
        let args: UpdateCardArgs = decode_args(UPDATE_CARD, arguments)?;
        require(&args.card_id, "card_id")?;

        let update = CardUpdate {
            name: args.name,
            desc: args.description,
            closed: args.closed,
            list_id: args.list_id,
            due: args.due,
        };
        let card = self.client.update_card(&args.card_id, &update).await?;
        Ok(format!("Updated card '{}' (ID: {})", card.name, card.id))
    }

    async fn add_comment(&self, arguments: &Value) -> Result<String> {
        let args: AddCommentArgs = decode_args(ADD_COMMENT, arguments)?;
        require(&args.card_id, "card_id")?;
        require(&args.text, "text")?;
        let comment = self.client.add_comment(&args.card_id, &args.text).await?;
        Ok(format!("Added comment to card (comment ID: {})", comment.id))
    }

    async fn get_board_members(&self, arguments: &Value) -> Result<String> {
        let args: BoardArgs = decode_args(GET_BOARD_MEMBERS, arguments)?;
        require(&args.board_id, "board_id")?;
        Ok(format_members(&self.client.get_board_members(&args.board_id).await?))
    }
}

#[async_trait]
impl ToolProvider for TrelloProvider {
    fn key(&self) -> &str {
        "trello"
    }

    fn capability_summary(&self) -> String {
        "Organize work in Trello (boards, lists, cards, comments)".to_string()
    }

    fn prompt_section(&self) -> Option<String> {
        Some(format!(
            "## Trello\nCall {} first to discover board IDs, then {} to find list IDs before creating cards.\n",
            LIST_BOARDS, GET_LISTS
        ))
    }

    fn descriptors(&self) -> Vec<ToolDescriptor> {
        tools::descriptors()
    }

    async fn execute(&self, name: &str, arguments: &Value) -> Dispatch {
        match self.run(name, arguments).await {
            Some(result) => {
                info!(tool = name, succeeded = result.is_ok(), "Trello tool finished");
                result.into()
            }
            None => Dispatch::NotMine,
        }
    }
}
