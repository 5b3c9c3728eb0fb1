//! Tool dispatch

use relay_core::FunctionCall;
use serde_json::Value;
use tracing::{info, instrument, warn};

use super::registry::ToolRegistry;
use super::{ToolContext, ToolDefinition, ToolError, ToolResult, WorkingRoot};

/// Argument name a model might use to pick its own root. Always discarded.
const ROOT_ARG: &str = "working_directory";

/// Routes model function calls to registered tools inside a fixed working root
pub struct Dispatcher {
    registry: ToolRegistry,
    ctx: ToolContext,
    verbose: bool,
}

impl Dispatcher {
    /// Create a dispatcher over `registry`; every call runs with `ctx`
    pub fn new(registry: ToolRegistry, ctx: ToolContext) -> Self {
        Self {
            registry,
            ctx,
            verbose: false,
        }
    }

    /// Print call arguments and result payloads
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn root(&self) -> &WorkingRoot {
        &self.ctx.root
    }

    /// Schemas advertised to the model
    pub fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.registry.tool_definitions()
    }

    /// Invoke one function call and trace it on the console.
    ///
    /// Never fails: unknown tools and tool errors come back as
    /// [`ToolResult::Failure`].
    pub async fn dispatch(&self, call: &FunctionCall) -> ToolResult {
        println!(" - Calling function: {}", call.name);
        if self.verbose {
            println!("   args: {}", Value::Object(call.args.clone()));
        }

        let result = self.invoke(call).await;

        if self.verbose {
            println!("-> {}", result.to_response());
        }
        result
    }

    #[instrument(skip(self, call), fields(tool = %call.name))]
    async fn invoke(&self, call: &FunctionCall) -> ToolResult {
        let Some(tool) = self.registry.get(&call.name) else {
            warn!("Tool not found");
            return ToolResult::Failure(ToolError::UnknownTool {
                name: call.name.clone(),
            });
        };

        let mut args = call.args.clone();
        if args.remove(ROOT_ARG).is_some() {
            warn!("Discarding model-supplied working directory");
        }

        let result = ToolResult::from(tool.execute(Value::Object(args), &self.ctx).await);
        match &result {
            ToolResult::Success(output) => {
                info!(output_len = output.len(), "Tool executed successfully");
            }
            ToolResult::Failure(err) => {
                warn!(kind = err.kind(), error = %err, "Tool execution failed");
            }
        }
        result
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("registry", &self.registry)
            .field("root", &self.ctx.root)
            .field("verbose", &self.verbose)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::builtin::create_default_registry;
    use crate::tools::{ParameterSchema, Tool};
    use async_trait::async_trait;
    use relay_core::config::ToolSettings;
    use serde_json::{json, Map};
    use std::fs;
    use tempfile::TempDir;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echoes its arguments"
        }

        fn parameters_schema(&self) -> ParameterSchema {
            ParameterSchema::new()
        }

        async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<String, ToolError> {
            Ok(format!("{} @ {}", args, ctx.root))
        }
    }

    fn args(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    fn echo_dispatcher(temp: &TempDir) -> Dispatcher {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);
        Dispatcher::new(registry, ToolContext::new(WorkingRoot::new(temp.path()).unwrap()))
    }

    #[tokio::test]
    async fn test_dispatch_success() {
        let temp = TempDir::new().unwrap();
        let dispatcher = echo_dispatcher(&temp);

        let result = dispatcher
            .dispatch(&FunctionCall::new("echo", args(json!({ "text": "hello" }))))
            .await;
        assert!(result.is_success());
        assert_eq!(
            result.to_response()["result"],
            format!("{{\"text\":\"hello\"}} @ {}", dispatcher.root())
        );
    }

    #[tokio::test]
    async fn test_dispatch_unknown_tool() {
        let temp = TempDir::new().unwrap();
        let dispatcher = echo_dispatcher(&temp);

        let result = dispatcher
            .dispatch(&FunctionCall::new("delete_everything", Map::new()))
            .await;
        assert_eq!(
            result,
            ToolResult::Failure(ToolError::UnknownTool {
                name: "delete_everything".to_string()
            })
        );
        assert_eq!(result.to_response(), json!({ "error": "Unknown function: delete_everything" }));
    }

    #[tokio::test]
    async fn test_dispatch_strips_model_supplied_root() {
        let temp = TempDir::new().unwrap();
        let dispatcher = echo_dispatcher(&temp);

        let result = dispatcher
            .dispatch(&FunctionCall::new(
                "echo",
                args(json!({ "working_directory": "/", "text": "x" })),
            ))
            .await;
        let ToolResult::Success(output) = result else {
            panic!("expected success");
        };
        assert!(!output.contains("working_directory"));
    }

    #[tokio::test]
    async fn test_model_root_cannot_widen_sandbox() {
        let temp = TempDir::new().unwrap();
        let work = temp.path().join("work");
        fs::create_dir(&work).unwrap();
        fs::write(temp.path().join("secret.txt"), "classified").unwrap();

        let dispatcher = Dispatcher::new(
            create_default_registry(&ToolSettings::default()),
            ToolContext::new(WorkingRoot::new(&work).unwrap()),
        );
        let call = FunctionCall::new(
            "get_file_content",
            args(json!({
                "working_directory": temp.path().to_str().unwrap(),
                "file_path": "secret.txt"
            })),
        );

        let result = dispatcher.dispatch(&call).await;
        assert!(matches!(result, ToolResult::Failure(ToolError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_dispatch_invalid_arguments() {
        let temp = TempDir::new().unwrap();
        let dispatcher = Dispatcher::new(
            create_default_registry(&ToolSettings::default()),
            ToolContext::new(WorkingRoot::new(temp.path()).unwrap()),
        )
        .with_verbose(true);

        let result = dispatcher
            .dispatch(&FunctionCall::new("write_file", args(json!({ "file_path": 42 }))))
            .await;
        match result {
            ToolResult::Failure(err) => assert_eq!(err.kind(), "invalid_arguments"),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
