//! Trello REST client. Authentication travels as `key`/`token` query parameters.

use crate::config::TrelloConfig;
use crate::error::{Result, SwitchyardError};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://api.trello.com/1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub short_url: String,
    #[serde(default)]
    pub closed: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct List {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub closed: bool,
    #[serde(default)]
    pub id_board: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Label {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub closed: bool,
    #[serde(default)]
    pub id_list: String,
    #[serde(default)]
    pub short_url: String,
    #[serde(default)]
    pub due: Option<String>,
    #[serde(default)]
    pub labels: Vec<Label>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub full_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Comment {
    pub id: String,
}

#[derive(Debug, Clone, Default)]
pub struct NewCard {
    pub list_id: String,
    pub name: String,
    pub desc: Option<String>,
    pub position: Option<String>,
    pub due: Option<String>,
}

/// Partial card update; `None` fields are left untouched
#[derive(Debug, Clone, Default)]
pub struct CardUpdate {
    pub name: Option<String>,
    pub desc: Option<String>,
    pub closed: Option<bool>,
    pub list_id: Option<String>,
    pub due: Option<String>,
}

pub struct TrelloClient {
    client: Client,
    base_url: String,
    api_key: String,
    token: String,
}

impl TrelloClient {
    pub fn new(config: &TrelloConfig) -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL, config)
    }

    pub fn with_base_url(base_url: impl Into<String>, config: &TrelloConfig) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            token: config.token.clone(),
        })
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .request(method, url)
            .query(params)
            .query(&[("key", &self.api_key), ("token", &self.token)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SwitchyardError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<T>().await?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request(Method::GET, path, &[]).await
    }

    pub async fn list_boards(&self) -> Result<Vec<Board>> {
        self.get("/members/me/boards").await
    }

    pub async fn get_board(&self, board_id: &str) -> Result<Board> {
        self.get(&format!("/boards/{}", urlencoding::encode(board_id))).await
    }

    pub async fn get_lists(&self, board_id: &str) -> Result<Vec<List>> {
        self.get(&format!("/boards/{}/lists", urlencoding::encode(board_id))).await
    }

    pub async fn create_list(&self, board_id: &str, name: &str) -> Result<List> {
        debug!(board_id = board_id, "Creating list");
        let params = [("name", name.to_string()), ("idBoard", board_id.to_string())];
        self.request(Method::POST, "/lists", &params).await
    }

    pub async fn create_card(&self, card: &NewCard) -> Result<Card> {
        debug!(list_id = %card.list_id, "Creating card");
        let mut params = vec![("name", card.name.clone()), ("idList", card.list_id.clone())];
        if let Some(desc) = card.desc.as_ref().filter(|d| !d.is_empty()) {
            params.push(("desc", desc.clone()));
        }
        if let Some(position) = &card.position {
            params.push(("pos", position.clone()));
        }
        if let Some(due) = card.due.as_ref().filter(|d| !d.is_empty()) {
            params.push(("due", due.clone()));
        }
        self.request(Method::POST, "/cards", &params).await
    }

    pub async fn get_card(&self, card_id: &str) -> Result<Card> {
        self.get(&format!("/cards/{}", urlencoding::encode(card_id))).await
    }

    pub async fn get_cards_on_list(&self, list_id: &str) -> Result<Vec<Card>> {
        self.get(&format!("/lists/{}/cards", urlencoding::encode(list_id))).await
    }

    pub async fn get_cards_on_board(&self, board_id: &str) -> Result<Vec<Card>> {
        self.get(&format!("/boards/{}/cards", urlencoding::encode(board_id))).await
    }

    pub async fn update_card(&self, card_id: &str, update: &CardUpdate) -> Result<Card> {
        debug!(card_id = card_id, "Updating card");
        let mut params = Vec::new();
        if let Some(name) = &update.name {
            params.push(("name", name.clone()));
        }
        if let Some(desc) = &update.desc {
            params.push(("desc", desc.clone()));
        }
        if let Some(closed) = update.closed {
            params.push(("closed", closed.to_string()));
        }
        if let Some(list_id) = &update.list_id {
            params.push(("idList", list_id.clone()));
        }
        if let Some(due) = &update.due {
            params.push(("due", due.clone()));
        }
        let path = format!("/cards/{}", urlencoding::encode(card_id));
        self.request(Method::PUT, &path, &params).await
    }

    pub async fn get_board_members(&self, board_id: &str) -> Result<Vec<Member>> {
        self.get(&format!("/boards/{}/members", urlencoding::encode(board_id))).await
    }

    pub async fn add_comment(&self, card_id: &str, text: &str) -> Result<Comment> {
        let path = format!("/cards/{}/actions/comments", urlencoding::encode(card_id));
        self.request(Method::POST, &path, &[("text", text.to_string())]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn config() -> TrelloConfig {
        TrelloConfig {
            enabled: true,
            api_key: "k".to_string(),
            token: "t".to_string(),
        }
    }

    fn auth() -> Vec<Matcher> {
        vec![
            Matcher::UrlEncoded("key".into(), "k".into()),
            Matcher::UrlEncoded("token".into(), "t".into()),
        ]
    }

    #[tokio::test]
    async fn test_list_boards_sends_credentials() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/members/me/boards")
            .match_query(Matcher::AllOf(auth()))
            .with_status(200)
            .with_body(r#"[{"id":"b1","name":"Roadmap","shortUrl":"https://trello.com/b/x","closed":false}]"#)
            .create();

        let client = TrelloClient::with_base_url(server.url(), &config()).unwrap();
        let boards = client.list_boards().await.unwrap();

        mock.assert();
        assert_eq!(boards.len(), 1);
        assert_eq!(boards[0].short_url, "https://trello.com/b/x");
    }

    #[tokio::test]
    async fn test_create_card_params() {
        let mut server = mockito::Server::new_async().await;
        let mut matchers = auth();
        matchers.extend([
            Matcher::UrlEncoded("name".into(), "Ship it".into()),
            Matcher::UrlEncoded("idList".into(), "l1".into()),
            Matcher::UrlEncoded("pos".into(), "top".into()),
        ]);
        let mock = server
            .mock("POST", "/cards")
            .match_query(Matcher::AllOf(matchers))
            .with_status(200)
            .with_body(r#"{"id":"c1","name":"Ship it","shortUrl":"https://trello.com/c/y"}"#)
            .create();

        let client = TrelloClient::with_base_url(server.url(), &config()).unwrap();
        let card = client
            .create_card(&NewCard {
                list_id: "l1".to_string(),
                name: "Ship it".to_string(),
                position: Some("top".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        mock.assert();
        assert_eq!(card.id, "c1");
    }

    #[tokio::test]
    async fn test_update_card_uses_put() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/cards/c9")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("closed".into(), "true".into()),
                Matcher::UrlEncoded("idList".into(), "done".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"id":"c9","name":"Old task","closed":true}"#)
            .create();

        let client = TrelloClient::with_base_url(server.url(), &config()).unwrap();
        let update = CardUpdate {
            closed: Some(true),
            list_id: Some("done".to_string()),
            ..Default::default()
        };
        let card = client.update_card("c9", &update).await.unwrap();

        mock.assert();
        assert!(card.closed);
    }

    #[tokio::test]
    async fn test_error_status_maps_to_api_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/cards/missing")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body("The requested resource was not found.")
            .create();

        let client = TrelloClient::with_base_url(server.url(), &config()).unwrap();
        let err = client.get_card("missing").await.unwrap_err();

        assert_eq!(err.to_string(), "API error (status 404): The requested resource was not found.");
    }
}
