//! Azure DevOps REST client.

use crate::config::DevOpsConfig;
use crate::error::{Result, SwitchyardError};
use base64::Engine;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use tracing::debug;

const DEFAULT_HOST: &str = "https://dev.azure.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Fields requested when expanding WIQL results
const BATCH_FIELDS: &[&str] = &[
    "System.Id",
    "System.Title",
    "System.State",
    "System.AssignedTo",
    "System.WorkItemType",
    "System.Description",
    "System.CreatedDate",
    "System.ChangedDate",
    "Microsoft.VSTS.Common.Priority",
    "System.Tags",
];

const MY_WORK_ITEMS_QUERY: &str = "SELECT [System.Id], [System.Title], [System.State], [System.AssignedTo], [System.WorkItemType] \
     FROM WorkItems \
     WHERE [System.AssignedTo] = @Me \
     AND [System.State] <> 'Closed' \
     AND [System.State] <> 'Done' \
     ORDER BY [System.ChangedDate] DESC";

#[derive(Debug, Clone, Deserialize)]
pub struct WorkItem {
    pub id: u32,
    #[serde(default)]
    pub rev: u32,
    #[serde(default)]
    pub fields: HashMap<String, Value>,
    #[serde(default)]
    pub url: String,
}

impl WorkItem {
    /// Text value of a field, empty when absent
    pub fn field_text(&self, name: &str) -> String {
        match self.fields.get(name) {
            Some(Value::String(text)) => text.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }

    /// Display name of the assignee, which the API returns as an identity object
    pub fn assigned_to(&self) -> Option<String> {
        match self.fields.get("System.AssignedTo")? {
            Value::Object(identity) => identity
                .get("displayName")
                .and_then(Value::as_str)
                .map(String::from),
            Value::String(name) if !name.is_empty() => Some(name.clone()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct WorkItemCreate {
    pub work_item_type: String,
    pub title: String,
    pub description: Option<String>,
    pub assigned_to: Option<String>,
    pub state: Option<String>,
    pub priority: Option<i64>,
    pub tags: Vec<String>,
    pub parent_id: Option<u32>,
}

/// Partial update; `None` fields are left untouched
#[derive(Debug, Clone, Default)]
pub struct WorkItemUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub state: Option<String>,
    pub assigned_to: Option<String>,
    pub priority: Option<i64>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Pipeline {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub folder: String,
    #[serde(default)]
    pub revision: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRun {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub created_date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub default_branch: Option<String>,
    #[serde(default)]
    pub web_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Board {
    pub id: String,
    pub name: String,
}

#[derive(Deserialize)]
struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    value: Vec<T>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WiqlResult {
    #[serde(default)]
    work_items: Vec<WorkItemRef>,
}

#[derive(Deserialize)]
struct WorkItemRef {
    id: u32,
}

pub struct DevOpsClient {
    client: Client,
    host: String,
    organization: String,
    project: String,
    pat: String,
    api_version: String,
}

impl DevOpsClient {
    pub fn new(config: &DevOpsConfig) -> Result<Self> {
        Self::with_host(DEFAULT_HOST, config)
    }

    /// Point the client at a different host, e.g. an on-premises server
    pub fn with_host(host: impl Into<String>, config: &DevOpsConfig) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            host: host.into().trim_end_matches('/').to_string(),
            organization: config.organization.clone(),
            project: config.project.clone(),
            pat: config.pat.clone(),
            api_version: config.api_version.clone(),
        })
    }

    pub fn organization(&self) -> &str {
        &self.organization
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    fn base_url(&self) -> String {
        format!("{}/{}/{}", self.host, self.organization, self.project)
    }

    fn basic_auth(&self) -> String {
        let token = base64::engine::general_purpose::STANDARD.encode(format!(":{}", self.pat));
        format!("Basic {}", token)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.header("Authorization", self.basic_auth()).send().await?;

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

    async fn send_patch(&self, request: RequestBuilder, ops: Vec<Value>) -> Result<WorkItem> {
        let request = request
            .header("Content-Type", "application/json-patch+json")
            .body(serde_json::to_string(&ops)?);
        self.send(request).await
    }

    pub async fn get_work_item(&self, id: u32) -> Result<WorkItem> {
        debug!(work_item_id = id, "Fetching work item");
        let url = format!(
            "{}/_apis/wit/workitems/{}?api-version={}&$expand=all",
            self.base_url(),
            id,
            self.api_version
        );
        self.send(self.client.get(url)).await
    }

    /// Run a WIQL query and expand the matching references into full work items
    pub async fn query_work_items(&self, query: &str) -> Result<Vec<WorkItem>> {
        debug!("Running WIQL query");
        let url = format!("{}/_apis/wit/wiql?api-version={}", self.base_url(), self.api_version);
        let result: WiqlResult = self
            .send(self.client.post(url).json(&json!({ "query": query })))
            .await?;

        if result.work_items.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<u32> = result.work_items.iter().map(|r| r.id).collect();
        self.get_work_items_batch(&ids).await
    }

    pub async fn get_work_items_batch(&self, ids: &[u32]) -> Result<Vec<WorkItem>> {
        let url = format!(
            "{}/_apis/wit/workitemsbatch?api-version={}",
            self.base_url(),
            self.api_version
        );
        let body = json!({ "ids": ids, "fields": BATCH_FIELDS });
        let response: ListResponse<WorkItem> = self.send(self.client.post(url).json(&body)).await?;
        Ok(response.value)
    }

    /// Open work items assigned to the authenticated user, most recently changed first
    pub async fn get_my_work_items(&self) -> Result<Vec<WorkItem>> {
        self.query_work_items(MY_WORK_ITEMS_QUERY).await
    }

    pub async fn create_work_item(&self, request: &WorkItemCreate) -> Result<WorkItem> {
        debug!(work_item_type = %request.work_item_type, "Creating work item");
        let url = format!(
            "{}/_apis/wit/workitems/${}?api-version={}",
            self.base_url(),
            urlencoding::encode(&request.work_item_type),
            self.api_version
        );

        let mut ops = vec![field_op("System.Title", json!(request.title))];
        if let Some(description) = request.description.as_deref().filter(|d| !d.is_empty()) {
            ops.push(field_op("System.Description", json!(description)));
        }
        if let Some(assigned_to) = request.assigned_to.as_deref().filter(|a| !a.is_empty()) {
            ops.push(field_op("System.AssignedTo", json!(assigned_to)));
        }
        if let Some(state) = request.state.as_deref().filter(|s| !s.is_empty()) {
            ops.push(field_op("System.State", json!(state)));
        }
        if let Some(priority) = request.priority {
            ops.push(field_op("Microsoft.VSTS.Common.Priority", json!(priority)));
        }
        if !request.tags.is_empty() {
            ops.push(field_op("System.Tags", json!(request.tags.join("; "))));
        }
        if let Some(parent_id) = request.parent_id {
            ops.push(json!({
                "op": "add",
                "path": "/relations/-",
                "value": {
                    "rel": "System.LinkTypes.Hierarchy-Reverse",
                    "url": format!("{}/_apis/wit/workitems/{}", self.base_url(), parent_id),
                }
            }));
        }

        self.send_patch(self.client.post(url), ops).await
    }

    pub async fn update_work_item(&self, id: u32, update: &WorkItemUpdate) -> Result<WorkItem> {
        debug!(work_item_id = id, "Updating work item");
        let url = format!(
            "{}/_apis/wit/workitems/{}?api-version={}",
            self.base_url(),
            id,
            self.api_version
        );

        let mut ops = Vec::new();
        if let Some(title) = &update.title {
            ops.push(field_op("System.Title", json!(title)));
        }
        if let Some(description) = &update.description {
            ops.push(field_op("System.Description", json!(description)));
        }
        if let Some(state) = &update.state {
            ops.push(field_op("System.State", json!(state)));
        }
        if let Some(assigned_to) = &update.assigned_to {
            ops.push(field_op("System.AssignedTo", json!(assigned_to)));
        }
        if let Some(priority) = update.priority {
            ops.push(field_op("Microsoft.VSTS.Common.Priority", json!(priority)));
        }
        if !update.tags.is_empty() {
            ops.push(field_op("System.Tags", json!(update.tags.join("; "))));
        }

        self.send_patch(self.client.patch(url), ops).await
    }

    pub async fn list_pipelines(&self) -> Result<Vec<Pipeline>> {
        let url = format!("{}/_apis/pipelines?api-version={}", self.base_url(), self.api_version);
        let response: ListResponse<Pipeline> = self.send(self.client.get(url)).await?;
        Ok(response.value)
    }

    pub async fn run_pipeline(
        &self,
        pipeline_id: u32,
        branch: &str,
        variables: &BTreeMap<String, String>,
    ) -> Result<PipelineRun> {
        debug!(pipeline_id = pipeline_id, branch = branch, "Queueing pipeline run");
        let url = format!(
            "{}/_apis/pipelines/{}/runs?api-version={}",
            self.base_url(),
            pipeline_id,
            self.api_version
        );

        let mut body = json!({
            "resources": {
                "repositories": {
                    "self": { "refName": branch }
                }
            }
        });
        if !variables.is_empty() {
            let vars: serde_json::Map<String, Value> = variables
                .iter()
                .map(|(name, value)| (name.clone(), json!({ "value": value })))
                .collect();
            body["variables"] = Value::Object(vars);
        }

        self.send(self.client.post(url).json(&body)).await
    }

    pub async fn list_repositories(&self) -> Result<Vec<Repository>> {
        let url = format!(
            "{}/_apis/git/repositories?api-version={}",
            self.base_url(),
            self.api_version
        );
        let response: ListResponse<Repository> = self.send(self.client.get(url)).await?;
        Ok(response.value)
    }

    /// Boards of a team; defaults to the project's default team
    pub async fn list_boards(&self, team: Option<&str>) -> Result<Vec<Board>> {
        let default_team = format!("{} Team", self.project);
        let team = team.filter(|t| !t.is_empty()).unwrap_or(&default_team);
        let url = format!(
            "{}/{}/_apis/work/boards?api-version={}",
            self.base_url(),
            urlencoding::encode(team),
            self.api_version
        );
        let response: ListResponse<Board> = self.send(self.client.get(url)).await?;
        Ok(response.value)
    }
}

fn field_op(field: &str, value: Value) -> Value {
    json!({ "op": "add", "path": format!("/fields/{}", field), "value": value })
}
