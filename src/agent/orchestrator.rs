//! The bounded conversation loop that turns one user message into a reply.

use super::prompt::{build_system_prompt, DEFAULT_ASSISTANT_NAME};
use crate::audit::{AuditLog, Auditor, DispatchOutcome};
use crate::config::AppConfig;
use crate::error::{Result, SwitchyardError};
use crate::llm::gateways;
use crate::llm::{CompletionConfig, LlmGateway, ToolCallRequest, ToolCallResult, ToolDescriptor};
use crate::llm::{Transcript, Turn};
use crate::providers::devops::{DevOpsClient, DevOpsProvider};
use crate::providers::trello::{TrelloClient, TrelloProvider};
use crate::providers::{Dispatch, ToolProvider};
use crate::security::{injection, ToolRegistry};
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Upper bound on gateway calls for a single message
pub const MAX_ITERATIONS: usize = 10;

const NOT_PERMITTED: &str = "Error executing tool: operation not permitted";
const UNKNOWN_TOOL: &str = "Error executing tool: unknown tool";

/// Drives the model through tool-call rounds for one message at a time.
///
/// Holds only read-only state after [`OrchestratorBuilder::build`], so a single
/// instance can serve concurrent `process` calls behind an `Arc`.
pub struct Orchestrator {
    gateway: Arc<dyn LlmGateway>,
    model: String,
    completion: CompletionConfig,
    providers: Vec<Arc<dyn ToolProvider>>,
    registry: ToolRegistry,
    catalog: Vec<ToolDescriptor>,
    system_prompt: String,
    audit_log: Option<Arc<AuditLog>>,
}

pub struct OrchestratorBuilder {
    gateway: Arc<dyn LlmGateway>,
    model: String,
    completion: CompletionConfig,
    providers: Vec<Arc<dyn ToolProvider>>,
    assistant_name: String,
    audit_log: Option<Arc<AuditLog>>,
}

impl OrchestratorBuilder {
    pub fn provider(mut self, provider: Arc<dyn ToolProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn completion_config(mut self, completion: CompletionConfig) -> Self {
        self.completion = completion;
        self
    }

    pub fn assistant_name(mut self, name: impl Into<String>) -> Self {
        self.assistant_name = name.into();
        self
    }

    pub fn audit_log(mut self, log: Arc<AuditLog>) -> Self {
        self.audit_log = Some(log);
        self
    }

    pub fn build(self) -> Orchestrator {
        let mut registry = ToolRegistry::new();
        let mut catalog = Vec::new();

        for provider in &self.providers {
            registry.register(provider.allowed_operations());
            catalog.extend(provider.descriptors());
            debug!(provider = provider.key(), "Registered tool provider");
        }

        let system_prompt = build_system_prompt(&self.assistant_name, &self.providers);
        info!(
            model = %self.model,
            providers = self.providers.len(),
            tools = catalog.len(),
            "Orchestrator ready"
        );

        Orchestrator {
            gateway: self.gateway,
            model: self.model,
            completion: self.completion,
            providers: self.providers,
            registry,
            catalog,
            system_prompt,
            audit_log: self.audit_log,
        }
    }
}

impl Orchestrator {
    pub fn builder(gateway: Arc<dyn LlmGateway>, model: impl Into<String>) -> OrchestratorBuilder {
        OrchestratorBuilder {
            gateway,
            model: model.into(),
            completion: CompletionConfig::default(),
            providers: Vec::new(),
            assistant_name: DEFAULT_ASSISTANT_NAME.to_string(),
            audit_log: None,
        }
    }

    /// Wire the gateway and every provider that configuration marks active.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        config.validate()?;

        let mut builder = Self::builder(gateways::for_endpoint(&config.llm)?, &config.llm.model)
            .completion_config(CompletionConfig {
                temperature: config.llm.temperature,
                max_tokens: config.llm.max_tokens,
            });

        if config.devops.is_active() {
            let client = DevOpsClient::new(&config.devops)?;
            builder = builder.provider(Arc::new(DevOpsProvider::new(client)));
        }
        if config.trello.is_active() {
            let client = TrelloClient::new(&config.trello)?;
            builder = builder.provider(Arc::new(TrelloProvider::new(client)));
        }

        Ok(builder.build())
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn catalog(&self) -> &[ToolDescriptor] {
        &self.catalog
    }

    /// Turn one user message into the model's final reply.
    ///
    /// Gateway failures of any kind surface as [`SwitchyardError::ProcessingFailed`];
    /// tool failures are reported back to the model as tool turns instead.
    pub async fn process(
        &self,
        user_id: &str,
        channel: &str,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let auditor = Auditor::new(self.audit_log.clone());
        auditor.message_received(user_id, channel, text.chars().count());

        if injection::detect(text) {
            auditor.injection_detected(user_id, channel);
        }

        let mut transcript: Transcript = vec![
            Turn::system(self.system_prompt.as_str()),
            Turn::user(injection::sanitize(text)),
        ];

        for round in 1..=MAX_ITERATIONS {
            let response = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(SwitchyardError::Cancelled),
                response = self.gateway.chat(&self.model, &transcript, &self.catalog, &self.completion) => response,
            };

            let response = response.map_err(|e| {
                error!(correlation_id = %auditor.correlation_id(), round, error = %e, "LLM call failed");
                SwitchyardError::ProcessingFailed
            })?;

            let Some(choice) = response.choices.into_iter().next() else {
                error!(correlation_id = %auditor.correlation_id(), round, "LLM returned no choices");
                return Err(SwitchyardError::ProcessingFailed);
            };

            if !choice.has_tool_calls() {
                return Ok(choice.content);
            }

            if round == MAX_ITERATIONS {
                warn!(
                    correlation_id = %auditor.correlation_id(),
                    pending_calls = choice.tool_calls.len(),
                    "Round limit reached with tool calls outstanding"
                );
                return Ok(choice.content);
            }

            info!(round, calls = choice.tool_calls.len(), "Tool calls requested");

            let mut results = Vec::with_capacity(choice.tool_calls.len());
            for call in &choice.tool_calls {
                let result = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(SwitchyardError::Cancelled),
                    result = self.dispatch(call, &auditor) => result,
                };
                results.push(result);
            }

            transcript.push(Turn::assistant_with_tool_calls(choice.content, choice.tool_calls));
            transcript.extend(results.into_iter().map(ToolCallResult::into_turn));
        }

        Err(SwitchyardError::ProcessingFailed)
    }

    async fn dispatch(&self, call: &ToolCallRequest, auditor: &Auditor) -> ToolCallResult {
        let arguments = match parse_arguments(&call.raw_arguments) {
            Ok(arguments) => arguments,
            Err(detail) => {
                auditor.tool_dispatched(&call.name, None, DispatchOutcome::MalformedArguments);
                return ToolCallResult::failure(&call.id, format!("Failed to parse arguments: {}", detail));
            }
        };

        let validation = self.registry.validate(&call.name);
        if !validation.allowed {
            warn!(
                tool = %call.name,
                reason = validation.reason.as_deref().unwrap_or_default(),
                "Tool call rejected"
            );
            auditor.tool_dispatched(&call.name, None, DispatchOutcome::Rejected);
            return ToolCallResult::failure(&call.id, NOT_PERMITTED);
        }

        for provider in &self.providers {
            match provider.execute(&call.name, &arguments).await {
                Dispatch::NotMine => continue,
                Dispatch::Handled(text) => {
                    auditor.tool_dispatched(&call.name, Some(provider.key()), DispatchOutcome::Succeeded);
                    return ToolCallResult::success(&call.id, text);
                }
                Dispatch::HandledError(err) => {
                    warn!(tool = %call.name, error = %err, "Tool execution failed");
                    auditor.tool_dispatched(&call.name, Some(provider.key()), DispatchOutcome::Failed);
                    return ToolCallResult::failure(&call.id, format!("Error executing tool: {}", err));
                }
            }
        }

        auditor.tool_dispatched(&call.name, None, DispatchOutcome::Unclaimed);
        ToolCallResult::failure(&call.id, UNKNOWN_TOOL)
    }
}

/// Decode model-produced arguments; blank text means no arguments.
fn parse_arguments(raw: &str) -> std::result::Result<Value, String> {
    if raw.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }

    match serde_json::from_str::<Value>(raw) {
        Ok(value @ Value::Object(_)) => Ok(value),
        Ok(other) => Err(format!("expected a JSON object, got {}", json_kind(&other))),
        Err(e) => Err(e.to_string()),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
