//! Built-in tools for the agent framework

mod file_read;
mod file_write;
mod list_dir;
mod run_script;

pub use file_read::FileReadTool;
pub use file_write::FileWriteTool;
pub use list_dir::ListDirTool;
pub use run_script::RunScriptTool;

use relay_core::config::ToolSettings;

use super::registry::ToolRegistry;

/// Create a registry with all default tools
pub fn create_default_registry(settings: &ToolSettings) -> ToolRegistry {
    let mut registry = ToolRegistry::new();

    registry.register(ListDirTool);
    registry.register(FileReadTool);
    registry.register(FileWriteTool);
    registry.register(RunScriptTool::new(&settings.interpreter, &settings.script_extension));

    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_names() {
        let registry = create_default_registry(&ToolSettings::default());
        assert_eq!(
            registry.list_names(),
            ["get_file_content", "get_files_info", "run_python_file", "write_file"]
        );
    }
}
