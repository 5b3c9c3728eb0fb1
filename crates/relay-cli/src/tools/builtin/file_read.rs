//! File read tool

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::fs;

use crate::tools::{parse_args, ParamKind, ParameterSchema, Tool, ToolContext, ToolError};

#[derive(Debug, Deserialize)]
struct ReadArgs {
    file_path: String,
}

/// Tool for reading file contents
pub struct FileReadTool;

#[async_trait]
impl Tool for FileReadTool {
    fn name(&self) -> &str {
        "get_file_content"
    }

    fn description(&self) -> &str {
        "Reads the text content of a file, constrained to the working directory. Long files are truncated."
    }

    fn parameters_schema(&self) -> ParameterSchema {
        ParameterSchema::new().with_required(
            "file_path",
            ParamKind::String,
            "The path of the file to read, relative to the working directory.",
        )
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<String, ToolError> {
        let args: ReadArgs = parse_args(self.name(), args)?;
        let path = ctx.root.resolve(&args.file_path, "read")?;

        if !path.is_file() {
            return Err(ToolError::NotFound {
                path: args.file_path,
            });
        }

        let bytes = fs::read(&path)?;
        let content = String::from_utf8(bytes).map_err(|_| ToolError::NotText {
            path: args.file_path.clone(),
        })?;

        Ok(truncate(content, &args.file_path, ctx.max_chars))
    }
}

/// Keep the first `max_chars` characters and mark the cut
fn truncate(content: String, file_path: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((cut, _)) => format!(
            "{}[...File \"{}\" truncated at {} characters]",
            &content[..cut],
            file_path,
            max_chars
        ),
        None => content,
    }
}
