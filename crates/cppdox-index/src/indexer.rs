//! Indexing orchestration.

use crate::compile_db::CompilationDatabase;
use crate::executor::ParallelExecutor;
use crate::passes;
use cppdox_core::{Config, Database, Index};

/// Drives the whole pipeline: compile-database loading, parallel per-TU
/// extraction, and the post-processing passes.
pub struct Indexer {
    cfg: Config,
    index: Index,
    num_workers: usize,
}

impl Indexer {
    pub fn new(cfg: Config, num_workers: usize) -> Self {
        Self {
            cfg,
            index: Index::default(),
            num_workers,
        }
    }

    /// Run the indexer. Setup failures are reported and absorbed: no error
    /// is propagated, and after `run` returns the index is internally
    /// consistent even if incomplete.
    pub fn run(&mut self) {
        tracing::info!("Starting indexing...");

        let db = match CompilationDatabase::from_file(&self.cfg.compile_commands_json) {
            Ok(db) => db,
            Err(e) => {
                tracing::error!("Unable to initialize compilation database ({e})");
                return;
            }
        };

        let mut cfg = self.cfg.clone();
        cfg.include_paths.retain(|path| {
            if path.is_dir() {
                tracing::info!("Appending {} to list of include paths.", path.display());
                true
            } else {
                tracing::warn!(
                    "Include path {} does not exist. Proceeding without it.",
                    path.display()
                );
                false
            }
        });

        let executor = ParallelExecutor::new(self.num_workers);
        executor.execute(db.all_compile_commands(), &self.index, &cfg);

        passes::prune_methods(&mut self.index);
        passes::resolve_namespaces(&mut self.index);
        passes::update_record_names(&mut self.index);
        passes::update_member_functions(&mut self.index);
        passes::prune_type_refs(&mut self.index);
        self.print_stats();
    }

    /// Borrow the finished index; valid until the indexer is dropped.
    pub fn index(&self) -> &Index {
        &self.index
    }

    /// One diagnostic line per database.
    pub fn print_stats(&self) {
        print_database_size("Functions", &self.index.functions);
        print_database_size("Records", &self.index.records);
        print_database_size("Enums", &self.index.enums);
        print_database_size("Namespaces", &self.index.namespaces);
        print_database_size("Usings", &self.index.aliases);
    }
}

fn print_database_size<T: Default>(name: &str, db: &Database<T>) {
    tracing::info!(
        "{:<12}: {:8} matches, {:6} indexed, {:6} KiB total size",
        name,
        db.num_matches(),
        db.len(),
        db.len() * std::mem::size_of::<T>() / 1024
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn missing_compile_db_yields_empty_index() {
        let cfg = Config {
            compile_commands_json: PathBuf::from("/tmp/definitely_missing_compile_commands.json"),
            ..Config::default()
        };
        let mut indexer = Indexer::new(cfg, 2);
        indexer.run();
        assert!(indexer.index().functions.is_empty());
        assert!(indexer.index().records.is_empty());
    }

    #[test]
    fn nonexistent_include_paths_are_skipped() {
        let dir = std::env::temp_dir().join("cppdox_indexer_include_test");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("a.cpp"), "class A { };\n").unwrap();
        std::fs::write(
            dir.join("compile_commands.json"),
            format!(
                r#"[{{"directory": {dir:?}, "command": "clang++ -c a.cpp", "file": "a.cpp"}}]"#,
                dir = dir.display().to_string()
            ),
        )
        .unwrap();

        let cfg = Config {
            compile_commands_json: dir.join("compile_commands.json"),
            root_dir: dir.clone(),
            include_paths: vec![dir.join("no_such_dir")],
            ..Config::default()
        };
        let mut indexer = Indexer::new(cfg, 1);
        indexer.run();
        assert_eq!(indexer.index().records.len(), 1);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
