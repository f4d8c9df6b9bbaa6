pub mod gateway;
pub mod gateways;
pub mod models;
pub mod tools;

pub use gateway::{CompletionConfig, LlmGateway};
pub use models::{
    ChatResponse, Choice, MessageRole, ToolCallRequest, ToolCallResult, Transcript, Turn, Usage,
};
pub use tools::{parameters_schema, FunctionDescriptor, ToolDescriptor};
