//! Script execution tool

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::tools::{parse_args, ParamKind, ParameterSchema, Tool, ToolContext, ToolError};

const NO_OUTPUT: &str = "No output produced.";

#[derive(Debug, Deserialize)]
struct RunArgs {
    file_path: String,
    #[serde(default)]
    args: Vec<String>,
}

/// Tool for running a script from the working root under an interpreter
pub struct RunScriptTool {
    interpreter: PathBuf,
    extension: String,
    description: String,
}

impl RunScriptTool {
    /// Build the tool for `interpreter`, accepting files ending in `.extension`
    pub fn new(interpreter: &str, extension: &str) -> Self {
        let resolved = match which::which(interpreter) {
            Ok(path) => {
                debug!(interpreter, path = %path.display(), "Resolved script interpreter");
                path
            }
            Err(e) => {
                warn!(interpreter, error = %e, "Script interpreter not found on PATH");
                PathBuf::from(interpreter)
            }
        };

        let extension = extension.trim_start_matches('.').to_string();
        let description = format!(
            "Executes a .{} file in the working directory with optional arguments and returns its output. Runs are limited to a fixed timeout.",
            extension
        );

        Self {
            interpreter: resolved,
            extension,
            description,
        }
    }

    fn has_script_extension(&self, file_path: &str) -> bool {
        Path::new(file_path)
            .extension()
            .is_some_and(|ext| ext == self.extension.as_str())
    }
}

#[async_trait]
impl Tool for RunScriptTool {
    fn name(&self) -> &str {
        "run_python_file"
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters_schema(&self) -> ParameterSchema {
        ParameterSchema::new()
            .with_required(
                "file_path",
                ParamKind::String,
                "The path of the script to execute, relative to the working directory.",
            )
            .with_optional(
                "args",
                ParamKind::StringArray,
                "Optional command-line arguments passed to the script.",
            )
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<String, ToolError> {
        let args: RunArgs = parse_args(self.name(), args)?;
        let script = ctx.root.resolve(&args.file_path, "execute")?;

        if !self.has_script_extension(&args.file_path) {
            return Err(ToolError::WrongFileType {
                path: args.file_path,
                extension: self.extension.clone(),
            });
        }

        if !script.is_file() {
            return Err(ToolError::NotFound {
                path: args.file_path,
            });
        }

        info!(
            script = %args.file_path,
            args = args.args.len(),
            timeout_secs = ctx.script_timeout.as_secs(),
            "Executing script"
        );

        // kill_on_drop: a timed-out run drops the wait future and with it the child
        let child = Command::new(&self.interpreter)
            .arg(&script)
            .args(&args.args)
            .current_dir(ctx.root.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ToolError::Unexpected(format!("Failed to execute \"{}\": {}", args.file_path, e)))?;

        match timeout(ctx.script_timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => {
                debug!(exit_code = ?output.status.code(), "Script completed");
                Ok(format_output(&output))
            }
            Ok(Err(e)) => Err(ToolError::Unexpected(format!(
                "Failed to execute \"{}\": {}",
                args.file_path, e
            ))),
            Err(_) => {
                warn!(script = %args.file_path, "Script timed out and was killed");
                Err(ToolError::Timeout {
                    path: args.file_path,
                    timeout: ctx.script_timeout,
                })
            }
        }
    }
}

fn format_output(output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let (stdout, stderr) = (stdout.trim(), stderr.trim());

    let mut parts = Vec::new();
    if !stdout.is_empty() {
        parts.push(format!("STDOUT:\n{}", stdout));
    }
    if !stderr.is_empty() {
        parts.push(format!("STDERR:\n{}", stderr));
    }
    match output.status.code() {
        Some(0) => {}
        Some(code) => parts.push(format!("Process exited with code {}", code)),
        None => parts.push("Process terminated by signal".to_string()),
    }

    if parts.is_empty() {
        NO_OUTPUT.to_string()
    } else {
        parts.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::WorkingRoot;
    use serde_json::json;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    fn shell_tool() -> RunScriptTool {
        RunScriptTool::new("sh", "sh")
    }

    fn context(temp: &TempDir) -> ToolContext {
        ToolContext::new(WorkingRoot::new(temp.path()).unwrap())
    }

    fn script(temp: &TempDir, name: &str, body: &str) {
        fs::write(temp.path().join(name), body).unwrap();
    }

    #[tokio::test]
    async fn test_run_no_output() {
        let temp = TempDir::new().unwrap();
        script(&temp, "quiet.sh", "exit 0\n");

        let output = shell_tool()
            .execute(json!({ "file_path": "quiet.sh" }), &context(&temp))
            .await
            .unwrap();
        assert_eq!(output, NO_OUTPUT);
    }

    #[tokio::test]
    async fn test_run_stdout_then_exit_code() {
        let temp = TempDir::new().unwrap();
        script(&temp, "fail.sh", "echo '  partial result  '\nexit 3\n");

        let output = shell_tool()
            .execute(json!({ "file_path": "fail.sh" }), &context(&temp))
            .await
            .unwrap();
        assert_eq!(output, "STDOUT:\npartial result\nProcess exited with code 3");
    }

    #[tokio::test]
    async fn test_run_captures_stderr_separately() {
        let temp = TempDir::new().unwrap();
        script(&temp, "both.sh", "echo out\necho err >&2\n");

        let output = shell_tool()
            .execute(json!({ "file_path": "both.sh" }), &context(&temp))
            .await
            .unwrap();
        assert_eq!(output, "STDOUT:\nout\nSTDERR:\nerr");
    }

    #[tokio::test]
    async fn test_run_passes_args_and_uses_root_as_cwd() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("pkg")).unwrap();
        script(&temp, "pkg/args.sh", "echo \"$1 $2\"\npwd\n");

        let ctx = context(&temp);
        let output = shell_tool()
            .execute(json!({ "file_path": "pkg/args.sh", "args": ["3", "+ 5"] }), &ctx)
            .await
            .unwrap();
        let expected = format!("STDOUT:\n3 + 5\n{}", ctx.root.path().display());
        assert_eq!(output, expected);
    }

    #[tokio::test]
    async fn test_run_timeout_kills_child() {
        let temp = TempDir::new().unwrap();
        script(&temp, "slow.sh", "sleep 2\ntouch late.txt\n");
        let ctx = context(&temp).with_script_timeout(Duration::from_millis(500));

        let err = shell_tool()
            .execute(json!({ "file_path": "slow.sh" }), &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Timeout { .. }));
        assert!(err.to_string().contains("slow.sh"));

        // A surviving child would create the marker after its sleep
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(!temp.path().join("late.txt").exists());
    }

    #[tokio::test]
    async fn test_run_wrong_extension() {
        let temp = TempDir::new().unwrap();
        script(&temp, "notes.txt", "echo hi\n");

        let err = shell_tool()
            .execute(json!({ "file_path": "notes.txt" }), &context(&temp))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "\"notes.txt\" is not a .sh file");
    }

    #[tokio::test]
    async fn test_run_missing_script() {
        let temp = TempDir::new().unwrap();
        let err = shell_tool()
            .execute(json!({ "file_path": "absent.sh" }), &context(&temp))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_run_outside_root_checked_first() {
        let temp = TempDir::new().unwrap();
        let err = shell_tool()
            .execute(json!({ "file_path": "../elsewhere.txt" }), &context(&temp))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "out_of_sandbox");
    }

    #[tokio::test]
    async fn test_run_missing_interpreter() {
        let temp = TempDir::new().unwrap();
        script(&temp, "ok.sh", "echo hi\n");
        let tool = RunScriptTool::new("relay-no-such-interpreter", "sh");

        let err = tool
            .execute(json!({ "file_path": "ok.sh" }), &context(&temp))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "unexpected");
        assert!(err.to_string().starts_with("Failed to execute \"ok.sh\""));
    }

    #[test]
    fn test_extension_check() {
        let tool = RunScriptTool::new("python3", ".py");
        assert!(tool.has_script_extension("main.py"));
        assert!(tool.has_script_extension("pkg/calc.py"));
        assert!(!tool.has_script_extension("main.pyc"));
        assert!(!tool.has_script_extension("py"));
    }
}
