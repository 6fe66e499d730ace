//! MCP method types, one module per protocol area.

mod capabilities;
mod completion;
mod initialize;
mod logging;
mod progress;
mod prompts;
mod resources;
mod sampling;
mod tools;

pub use capabilities::{
    ClientCapabilities, ClientCapabilityStep, ExperimentalCapabilities, LoggingCapability,
    PromptsCapability, RawPayload, ResourcesCapability, RootsCapability, SamplingCapability,
    ServerCapabilities, ServerCapabilityStep, ToolsCapability,
};
pub use completion::{
    CompleteParams, CompleteRequest, CompleteResult, CompleteStep, CompletionArgument,
    CompletionValues, MAX_COMPLETION_VALUES, Reference, ReferenceKind,
};
pub use initialize::{
    Implementation, InitializeParams, InitializeRequest, InitializeResult, InitializeResultStep,
    InitializeStep, InitializedNotification, InitializedParams, LATEST_PROTOCOL_VERSION,
};
pub use logging::{
    LoggingLevel, LoggingMessageNotification, LoggingMessageParams, LoggingStep, SetLevelParams,
    SetLevelRequest,
};
pub use progress::{ProgressNotification, ProgressParams, ProgressStep, ProgressToken, RequestMeta};
pub use prompts::{
    GetPromptParams, GetPromptRequest, GetPromptResult, ListPromptsResult, Prompt, PromptArgument,
    PromptArgumentStep, PromptMessage, PromptStep,
};
pub use resources::{
    ListResourceTemplatesResult, ListResourcesResult, ReadResourceParams, ReadResourceRequest,
    ReadResourceResult, Resource, ResourceStep, ResourceTemplate,
};
pub use sampling::{
    CreateMessageParams, CreateMessageRequest, CreateMessageResult, CreateMessageStep,
    IncludeContext, ModelHint, ModelPreferences, ModelPreferencesStep, SamplingMessage,
    StopReason,
};
pub use tools::{
    CallToolParams, CallToolRequest, CallToolResult, CallToolStep, ListToolsResult, Tool, ToolStep,
};
