//! Argument types, catalog and result formatting for the `devops_*` tools.

use super::client::{Board, Pipeline, PipelineRun, Repository, WorkItem};
use crate::llm::tools::ToolDescriptor;
use schemars::JsonSchema;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt::Write;

pub const LIST_MY_WORK_ITEMS: &str = "devops_list_my_workitems";
pub const GET_WORK_ITEM: &str = "devops_get_workitem";
pub const CREATE_WORK_ITEM: &str = "devops_create_workitem";
pub const UPDATE_WORK_ITEM: &str = "devops_update_workitem";
pub const QUERY_WORK_ITEMS: &str = "devops_query_workitems";
pub const LIST_PIPELINES: &str = "devops_list_pipelines";
pub const RUN_PIPELINE: &str = "devops_run_pipeline";
pub const LIST_REPOS: &str = "devops_list_repos";
pub const LIST_BOARDS: &str = "devops_list_boards";

pub const DEFAULT_BRANCH: &str = "refs/heads/main";

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct NoArgs {}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GetWorkItemArgs {
    /// The work item ID
    pub id: u32,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateWorkItemArgs {
    /// Work item type: Task, Bug, User Story, Feature, Epic
    #[serde(rename = "type")]
    pub work_item_type: String,
    /// Title of the work item
    pub title: String,
    /// Description of the work item (HTML supported)
    pub description: Option<String>,
    /// Email or display name of the assignee
    pub assigned_to: Option<String>,
    /// Priority (1=highest, 4=lowest)
    pub priority: Option<i64>,
    /// Tags to add to the work item
    #[serde(default)]
    pub tags: Vec<String>,
    /// Parent work item ID (for hierarchy)
    pub parent_id: Option<u32>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateWorkItemArgs {
    /// The work item ID to update
    pub id: u32,
    /// New title
    pub title: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New state: New, Active, Resolved, Closed
    pub state: Option<String>,
    /// New assignee email or display name
    pub assigned_to: Option<String>,
    /// New priority (1-4)
    pub priority: Option<i64>,
    /// Replacement tags
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct QueryWorkItemsArgs {
    /// WIQL query string. Example: SELECT [System.Id], [System.Title] FROM WorkItems WHERE [System.State] = 'Active'
    pub query: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RunPipelineArgs {
    /// The pipeline ID to run
    pub pipeline_id: u32,
    /// Git branch to run the pipeline on (defaults to refs/heads/main)
    pub branch: Option<String>,
    /// Pipeline variables as key-value pairs
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListBoardsArgs {
    /// Team name (optional, defaults to the project's default team)
    pub team: Option<String>,
}

pub fn descriptors() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor::for_args::<NoArgs>(
            LIST_MY_WORK_ITEMS,
            "List Azure DevOps work items assigned to me (current user). Returns tasks, bugs, and stories that are not closed.",
        ),
        ToolDescriptor::for_args::<GetWorkItemArgs>(
            GET_WORK_ITEM,
            "Get details of a specific Azure DevOps work item by ID",
        ),
        ToolDescriptor::for_args::<CreateWorkItemArgs>(
            CREATE_WORK_ITEM,
            "Create a new Azure DevOps work item (Task, Bug, User Story, etc.)",
        ),
        ToolDescriptor::for_args::<UpdateWorkItemArgs>(
            UPDATE_WORK_ITEM,
            "Update an existing Azure DevOps work item",
        ),
        ToolDescriptor::for_args::<QueryWorkItemsArgs>(
            QUERY_WORK_ITEMS,
            "Query Azure DevOps work items using WIQL (Work Item Query Language)",
        ),
        ToolDescriptor::for_args::<NoArgs>(
            LIST_PIPELINES,
            "List all Azure DevOps pipelines in the project",
        ),
        ToolDescriptor::for_args::<RunPipelineArgs>(
            RUN_PIPELINE,
            "Trigger an Azure DevOps pipeline run",
        ),
        ToolDescriptor::for_args::<NoArgs>(
            LIST_REPOS,
            "List all Git repositories in the Azure DevOps project",
        ),
        ToolDescriptor::for_args::<ListBoardsArgs>(
            LIST_BOARDS,
            "List all boards (Kanban) in the Azure DevOps project",
        ),
    ]
}

pub fn format_work_items(items: &[WorkItem]) -> String {
    if items.is_empty() {
        return "No work items found.".to_string();
    }

    let mut out = format!("Found {} work items:\n\n", items.len());
    for item in items {
        let _ = writeln!(
            out,
            "- #{} [{}] {} (State: {})",
            item.id,
            item.field_text("System.WorkItemType"),
            item.field_text("System.Title"),
            item.field_text("System.State"),
        );
    }
    out
}

pub fn format_work_item(item: &WorkItem) -> String {
    let mut out = format!("Work Item #{}\n", item.id);
    let _ = writeln!(out, "Type: {}", item.field_text("System.WorkItemType"));
    let _ = writeln!(out, "Title: {}", item.field_text("System.Title"));
    let _ = writeln!(out, "State: {}", item.field_text("System.State"));

    if let Some(assignee) = item.assigned_to() {
        let _ = writeln!(out, "Assigned To: {}", assignee);
    }

    let description = item.field_text("System.Description");
    if !description.is_empty() {
        let _ = writeln!(out, "Description: {}", description);
    }

    let tags = item.field_text("System.Tags");
    if !tags.is_empty() {
        let _ = writeln!(out, "Tags: {}", tags);
    }

    out
}

pub fn format_pipelines(pipelines: &[Pipeline]) -> String {
    if pipelines.is_empty() {
        return "No pipelines found.".to_string();
    }

    let mut out = format!("Found {} pipelines:\n\n", pipelines.len());
    for pipeline in pipelines {
        let _ = writeln!(out, "- [{}] {} (folder: {})", pipeline.id, pipeline.name, pipeline.folder);
    }
    out
}

pub fn format_pipeline_run(run: &PipelineRun) -> String {
    format!("Started pipeline run #{}: {} (state: {})", run.id, run.name, run.state)
}

pub fn format_repos(repos: &[Repository]) -> String {
    if repos.is_empty() {
        return "No repositories found.".to_string();
    }

    let mut out = format!("Found {} repositories:\n\n", repos.len());
    for repo in repos {
        let _ = writeln!(
            out,
            "- {} (default branch: {})",
            repo.name,
            repo.default_branch.as_deref().unwrap_or("none")
        );
    }
    out
}

pub fn format_boards(boards: &[Board]) -> String {
    if boards.is_empty() {
        return "No boards found.".to_string();
    }

    let mut out = format!("Found {} boards:\n\n", boards.len());
    for board in boards {
        let _ = writeln!(out, "- {}", board.name);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn work_item(value: serde_json::Value) -> WorkItem {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_catalog_names_are_unique_and_prefixed() {
        let catalog = descriptors();
        let mut names: Vec<&str> = catalog.iter().map(|d| d.name()).collect();

        assert_eq!(names.len(), 9);
        assert!(names.iter().all(|n| n.starts_with("devops_")));
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 9);
    }

    #[test]
    fn test_create_schema_renames_type_and_requires_title() {
        let catalog = descriptors();
        let create = catalog.iter().find(|d| d.name() == CREATE_WORK_ITEM).unwrap();
        let params = &create.function.parameters;

        assert!(params["properties"]["type"].is_object());
        let required = params["required"].as_array().unwrap();
        assert!(required.contains(&json!("type")));
        assert!(required.contains(&json!("title")));
        assert!(!required.contains(&json!("tags")));
    }

    #[test]
    fn test_format_work_items() {
        let items = vec![work_item(json!({
            "id": 12,
            "fields": {"System.WorkItemType": "Bug", "System.Title": "Crash on save", "System.State": "Active"}
        }))];

        assert_eq!(
            format_work_items(&items),
            "Found 1 work items:\n\n- #12 [Bug] Crash on save (State: Active)\n"
        );
        assert_eq!(format_work_items(&[]), "No work items found.");
    }

    #[test]
    fn test_format_work_item_details() {
        let item = work_item(json!({
            "id": 3,
            "fields": {
                "System.WorkItemType": "Task",
                "System.Title": "Write docs",
                "System.State": "New",
                "System.AssignedTo": {"displayName": "Ana Silva"},
                "System.Tags": "docs; onboarding"
            }
        }));

        let text = format_work_item(&item);

        assert!(text.starts_with("Work Item #3\nType: Task\nTitle: Write docs\nState: New\n"));
        assert!(text.contains("Assigned To: Ana Silva\n"));
        assert!(text.contains("Tags: docs; onboarding\n"));
        assert!(!text.contains("Description:"));
    }

    #[test]
    fn test_format_pipelines_and_repos() {
        let pipelines = vec![Pipeline {
            id: 4,
            name: "ci".to_string(),
            folder: "\\".to_string(),
            revision: 1,
        }];
        assert_eq!(format_pipelines(&pipelines), "Found 1 pipelines:\n\n- [4] ci (folder: \\)\n");

        let repos = vec![Repository {
            id: "r1".to_string(),
            name: "web".to_string(),
            default_branch: Some("refs/heads/main".to_string()),
            web_url: None,
        }];
        assert_eq!(
            format_repos(&repos),
            "Found 1 repositories:\n\n- web (default branch: refs/heads/main)\n"
        );
    }
}
