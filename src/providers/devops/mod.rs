//! Azure DevOps provider: work items, pipelines, repositories and boards.

pub mod client;
pub mod tools;

pub use client::DevOpsClient;

use crate::error::{Result, SwitchyardError};
use crate::llm::tools::ToolDescriptor;
use crate::providers::{decode_args, Dispatch, ToolProvider};
use crate::security::work_items;
use async_trait::async_trait;
use client::{WorkItemCreate, WorkItemUpdate};
use serde_json::Value;
use tools::*;
use tracing::info;

pub struct DevOpsProvider {
    client: DevOpsClient,
}

impl DevOpsProvider {
    pub fn new(client: DevOpsClient) -> Self {
        Self { client }
    }

    async fn list_my_work_items(&self, arguments: &Value) -> Result<String> {
        let _: NoArgs = decode_args(LIST_MY_WORK_ITEMS, arguments)?;
        let items = self.client.get_my_work_items().await?;
        Ok(format_work_items(&items))
    }

    async fn get_work_item(&self, arguments: &Value) -> Result<String> {
        let args: GetWorkItemArgs = decode_args(GET_WORK_ITEM, arguments)?;
        let item = self.client.get_work_item(args.id).await?;
        Ok(format_work_item(&item))
    }

    async fn create_work_item(&self, arguments: &Value) -> Result<String> {
        let args: CreateWorkItemArgs = decode_args(CREATE_WORK_ITEM, arguments)?;

        if !work_items::is_valid_type(&args.work_item_type) {
            return Err(SwitchyardError::ToolError(format!(
                "invalid work item type: {}",
                args.work_item_type
            )));
        }
        check_priority(args.priority)?;
        if args.title.trim().is_empty() {
            return Err(SwitchyardError::ToolError("title is required".to_string()));
        }

        let item = self
            .client
            .create_work_item(&WorkItemCreate {
                work_item_type: args.work_item_type,
                title: args.title,
                description: args.description,
                assigned_to: args.assigned_to,
                state: None,
                priority: args.priority,
                tags: args.tags,
                parent_id: args.parent_id,
            })
            .await?;

        Ok(format!("Created work item #{}: {}", item.id, item.field_text("System.Title")))
    }

    async fn update_work_item(&self, arguments: &Value) -> Result<String> {
        let args: UpdateWorkItemArgs = decode_args(UPDATE_WORK_ITEM, arguments)?;

        if let Some(state) = &args.state {
            if !work_items::is_valid_state(state) {
                return Err(SwitchyardError::ToolError(format!("invalid state: {}", state)));
            }
        }
        check_priority(args.priority)?;

        let item = self
            .client
            .update_work_item(
                args.id,
                &WorkItemUpdate {
                    title: args.title,
                    description: args.description,
                    state: args.state,
                    assigned_to: args.assigned_to,
                    priority: args.priority,
                    tags: args.tags,
                },
            )
            .await?;

        Ok(format!("Updated work item #{}: {}", item.id, item.field_text("System.Title")))
    }

    async fn query_work_items(&self, arguments: &Value) -> Result<String> {
        let args: QueryWorkItemsArgs = decode_args(QUERY_WORK_ITEMS, arguments)?;
        if args.query.trim().is_empty() {
            return Err(SwitchyardError::ToolError("query is required".to_string()));
        }
        let items = self.client.query_work_items(&args.query).await?;
        Ok(format_work_items(&items))
    }

    async fn list_pipelines(&self, arguments: &Value) -> Result<String> {
        let _: NoArgs = decode_args(LIST_PIPELINES, arguments)?;
        let pipelines = self.client.list_pipelines().await?;
        Ok(format_pipelines(&pipelines))
    }

    async fn run_pipeline(&self, arguments: &Value) -> Result<String> {
        let args: RunPipelineArgs = decode_args(RUN_PIPELINE, arguments)?;
        let branch = args.branch.as_deref().filter(|b| !b.is_empty()).unwrap_or(DEFAULT_BRANCH);
        let run = self.client.run_pipeline(args.pipeline_id, branch, &args.variables).await?;
        Ok(format_pipeline_run(&run))
    }

    async fn list_repos(&self, arguments: &Value) -> Result<String> {
        let _: NoArgs = decode_args(LIST_REPOS, arguments)?;
        let repos = self.client.list_repositories().await?;
        Ok(format_repos(&repos))
    }

    async fn list_boards(&self, arguments: &Value) -> Result<String> {
        let args: ListBoardsArgs = decode_args(LIST_BOARDS, arguments)?;
        let boards = self.client.list_boards(args.team.as_deref()).await?;
        Ok(format_boards(&boards))
    }
}

fn check_priority(priority: Option<i64>) -> Result<()> {
    match priority {
        Some(p) if !work_items::is_valid_priority(p) => Err(SwitchyardError::ToolError(format!(
            "invalid priority: {} (expected 1-4)",
            p
        ))),
        _ => Ok(()),
    }
}

#[async_trait]
impl ToolProvider for DevOpsProvider {
    fn key(&self) -> &str {
        "devops"
    }

    fn capability_summary(&self) -> String {
        "Manage Azure DevOps projects (work items, pipelines, repositories, boards)".to_string()
    }

    fn prompt_section(&self) -> Option<String> {
        Some(format!(
            "## Azure DevOps\nOrganization: {}\nDefault project: {}\n",
            self.client.organization(),
            self.client.project()
        ))
    }

    fn descriptors(&self) -> Vec<ToolDescriptor> {
        tools::descriptors()
    }

    async fn execute(&self, name: &str, arguments: &Value) -> Dispatch {
        let result = match name {
            LIST_MY_WORK_ITEMS => self.list_my_work_items(arguments).await,
            GET_WORK_ITEM => self.get_work_item(arguments).await,
            CREATE_WORK_ITEM => self.create_work_item(arguments).await,
            UPDATE_WORK_ITEM => self.update_work_item(arguments).await,
            QUERY_WORK_ITEMS => self.query_work_items(arguments).await,
            LIST_PIPELINES => self.list_pipelines(arguments).await,
            RUN_PIPELINE => self.run_pipeline(arguments).await,
            LIST_REPOS => self.list_repos(arguments).await,
            LIST_BOARDS => self.list_boards(arguments).await,
            _ => return Dispatch::NotMine,
        };

        info!(tool = name, succeeded = result.is_ok(), "Azure DevOps tool finished");
        result.into()
    }
}
