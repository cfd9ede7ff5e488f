//! Tool system for assistant function calling.

pub mod arguments;
pub mod registry;
pub mod tool;
pub mod types;
pub mod validation;

pub use arguments::ToolArguments;
pub use registry::{FunctionDefinition, ToolDefinition, ToolRegistry};
pub use tool::{output_text, FunctionTool, Tool, ToolExecutionContext};
pub use types::ToolParameters;
pub use validation::validate_arguments;
