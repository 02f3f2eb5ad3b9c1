//! Translation-unit parsing.
//!
//! A translation unit is the compile command's main file plus its
//! transitively resolved `#include "..."` files. Headers are parsed before
//! their includers so declarations precede their uses, matching what the
//! preprocessor would produce. Includes that resolve under a configured
//! include path are system headers: nothing inside them is documented, so
//! they are not parsed at all.

use crate::compile_db::CompileCommand;
use cppdox_core::{Config, CppdoxError};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tree_sitter::{Node, Parser, Tree};

/// One parsed source file of a translation unit.
#[derive(Debug)]
pub struct ParsedFile {
    /// Absolute path on disk.
    pub path: PathBuf,
    /// Path relative to the configured project root, used for display and
    /// ignore matching.
    pub relative: String,
    pub source: Vec<u8>,
    pub tree: Tree,
}

enum IncludeDirective {
    Quoted(String),
    Angled(String),
}

enum IncludeResolution {
    Project(PathBuf),
    System,
    NotFound,
}

/// Parses one translation unit at a time; owns the tree-sitter parser and
/// the canonicalized project root.
pub struct TuParser<'c> {
    cfg: &'c Config,
    root: PathBuf,
    parser: Parser,
}

impl<'c> TuParser<'c> {
    pub fn new(cfg: &'c Config) -> Result<Self, CppdoxError> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_cpp::LANGUAGE.into())
            .map_err(|e| CppdoxError::Parse(e.to_string()))?;
        let root = cfg
            .root_dir
            .canonicalize()
            .unwrap_or_else(|_| cfg.root_dir.clone());
        Ok(Self { cfg, root, parser })
    }

    /// Parse a whole translation unit. Fails only when the main file itself
    /// cannot be read or parsed; include failures degrade to warnings so one
    /// bad header does not sink the TU.
    pub fn parse_tu(&mut self, cmd: &CompileCommand) -> Result<Vec<ParsedFile>, CppdoxError> {
        let main = cmd.absolute_file();
        let mut seen = HashSet::new();
        let mut files = Vec::new();
        self.parse_with_includes(&main, &mut seen, &mut files)?;
        Ok(files)
    }

    fn parse_with_includes(
        &mut self,
        path: &Path,
        seen: &mut HashSet<PathBuf>,
        out: &mut Vec<ParsedFile>,
    ) -> Result<(), CppdoxError> {
        let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if !seen.insert(canonical.clone()) {
            return Ok(());
        }

        let source = std::fs::read(&canonical)?;
        let tree = self
            .parser
            .parse(&source, None)
            .ok_or_else(|| CppdoxError::Parse(canonical.display().to_string()))?;

        for directive in collect_includes(tree.root_node(), &source) {
            match self.resolve_include(&directive, canonical.parent()) {
                IncludeResolution::Project(included) => {
                    if let Err(e) = self.parse_with_includes(&included, seen, out) {
                        tracing::warn!("Failed to parse include {}: {e}", included.display());
                    }
                }
                IncludeResolution::System => {}
                IncludeResolution::NotFound => {
                    let name = match &directive {
                        IncludeDirective::Quoted(n) | IncludeDirective::Angled(n) => n,
                    };
                    tracing::debug!("Include {name} not found from {}", canonical.display());
                }
            }
        }

        let relative = self.relative_name(&canonical);
        out.push(ParsedFile {
            path: canonical,
            relative,
            source,
            tree,
        });
        Ok(())
    }

    fn resolve_include(
        &self,
        directive: &IncludeDirective,
        including_dir: Option<&Path>,
    ) -> IncludeResolution {
        let name = match directive {
            IncludeDirective::Quoted(name) => {
                if let Some(dir) = including_dir {
                    let candidate = dir.join(name);
                    if candidate.is_file() {
                        return IncludeResolution::Project(candidate);
                    }
                }
                let candidate = self.root.join(name);
                if candidate.is_file() {
                    return IncludeResolution::Project(candidate);
                }
                name
            }
            IncludeDirective::Angled(name) => name,
        };

        for include_path in &self.cfg.include_paths {
            if include_path.join(name).is_file() {
                return IncludeResolution::System;
            }
        }
        IncludeResolution::NotFound
    }

    fn relative_name(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .display()
            .to_string()
    }
}

/// Find every include directive in a tree, wherever the preprocessor nested it.
fn collect_includes(root: Node, source: &[u8]) -> Vec<IncludeDirective> {
    let mut includes = Vec::new();
    collect_includes_recursive(root, source, &mut includes);
    includes
}

fn collect_includes_recursive(node: Node, source: &[u8], out: &mut Vec<IncludeDirective>) {
    if node.kind() == "preproc_include" {
        if let Some(path_node) = node.child_by_field_name("path") {
            let text = path_node.utf8_text(source).unwrap_or("").trim().to_string();
            if let Some(name) = text.strip_prefix('"').and_then(|t| t.strip_suffix('"')) {
                out.push(IncludeDirective::Quoted(name.to_string()));
            } else if let Some(name) = text.strip_prefix('<').and_then(|t| t.strip_suffix('>')) {
                out.push(IncludeDirective::Angled(name.to_string()));
            }
        }
        return;
    }
    for i in 0..node.child_count() {
        if let Some(child) = node.child(i) {
            collect_includes_recursive(child, source, out);
        }
    }
}
