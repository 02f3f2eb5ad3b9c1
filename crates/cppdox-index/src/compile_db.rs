//! JSON compilation database loading.
//!
//! The database is the authoritative list of translation units: one entry
//! per compiler invocation, with at least `directory`, `file`, and either
//! `command` or `arguments`.

use cppdox_core::CppdoxError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// One entry of compile_commands.json.
#[derive(Debug, Clone, Deserialize)]
pub struct CompileCommand {
    /// Working directory of the compiler invocation.
    pub directory: PathBuf,
    /// The translation unit's main file, possibly relative to `directory`.
    pub file: PathBuf,
    /// Shell-quoted command line (CMake style).
    #[serde(default)]
    pub command: Option<String>,
    /// Argument vector (Bazel/Ninja style).
    #[serde(default)]
    pub arguments: Option<Vec<String>>,
    #[serde(default)]
    pub output: Option<String>,
}

impl CompileCommand {
    /// Absolute path of the translation unit's main file.
    pub fn absolute_file(&self) -> PathBuf {
        if self.file.is_absolute() {
            self.file.clone()
        } else {
            self.directory.join(&self.file)
        }
    }
}

/// A loaded compilation database.
#[derive(Debug)]
pub struct CompilationDatabase {
    commands: Vec<CompileCommand>,
}

impl CompilationDatabase {
    /// Load a compile_commands.json file.
    ///
    /// A missing or unparsable database is fatal for the run; the caller is
    /// expected to report the error and bail.
    pub fn from_file(path: &Path) -> Result<Self, CppdoxError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CppdoxError::CompileDb(format!("{}: {e}", path.display())))?;
        let commands: Vec<CompileCommand> = serde_json::from_str(&content)
            .map_err(|e| CppdoxError::CompileDb(format!("{}: {e}", path.display())))?;
        Ok(Self { commands })
    }

    /// All entries, in the database's listing order.
    pub fn all_compile_commands(&self) -> &[CompileCommand] {
        &self.commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_command_style_entries() {
        let json = r#"[
            {"directory": "/build", "command": "clang++ -c ../src/a.cpp", "file": "../src/a.cpp"},
            {"directory": "/build", "command": "clang++ -c ../src/b.cpp", "file": "/abs/b.cpp"}
        ]"#;
        let commands: Vec<CompileCommand> = serde_json::from_str(json).unwrap();
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0].absolute_file(), PathBuf::from("/build/../src/a.cpp"));
        assert_eq!(commands[1].absolute_file(), PathBuf::from("/abs/b.cpp"));
    }

    #[test]
    fn parses_arguments_style_entries() {
        let json = r#"[
            {"directory": "/b", "arguments": ["clang++", "-c", "x.cpp"], "file": "x.cpp", "output": "x.o"}
        ]"#;
        let commands: Vec<CompileCommand> = serde_json::from_str(json).unwrap();
        assert_eq!(commands[0].arguments.as_ref().unwrap().len(), 3);
        assert!(commands[0].command.is_none());
    }

    #[test]
    fn missing_file_is_an_error() {
        let result = CompilationDatabase::from_file(Path::new("/tmp/no_such_compile_commands.json"));
        assert!(matches!(result, Err(CppdoxError::CompileDb(_))));
    }

    #[test]
    fn unparsable_file_is_an_error() {
        let dir = std::env::temp_dir().join("cppdox_compile_db_test");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("compile_commands.json");
        std::fs::write(&path, "not json at all").unwrap();

        let result = CompilationDatabase::from_file(&path);
        assert!(matches!(result, Err(CppdoxError::CompileDb(_))));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
