mod tool;

pub use tool::{parameters_schema, FunctionDescriptor, ToolDescriptor};
