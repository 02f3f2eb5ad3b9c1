//! Parallel fan-out across translation units.
//!
//! Each translation unit is one unit of work; a fixed pool of worker
//! threads drains a channel of compile commands into the shared index.
//! Translation units are independent and nothing inside a TU is
//! parallelized. A failing TU logs a warning and the pool moves on.

use crate::compile_db::CompileCommand;
use crate::parser::TuParser;
use crate::walker::Walker;
use cppdox_core::{Config, Index};

pub struct ParallelExecutor {
    num_workers: usize,
}

impl ParallelExecutor {
    pub fn new(num_workers: usize) -> Self {
        Self {
            num_workers: num_workers.max(1),
        }
    }

    /// Index every compile command into `index`. Blocks until all workers
    /// drain; afterwards the index is ready for the post-passes.
    pub fn execute(&self, commands: &[CompileCommand], index: &Index, cfg: &Config) {
        let limited: &[CompileCommand] = match cfg.debug_limit_num_indexed_files {
            Some(limit) => &commands[..limit.min(commands.len())],
            None => commands,
        };

        let (tx, rx) = crossbeam_channel::unbounded::<&CompileCommand>();
        for command in limited {
            let _ = tx.send(command);
        }
        drop(tx);

        let workers = self.num_workers.min(limited.len().max(1));
        std::thread::scope(|scope| {
            for worker in 0..workers {
                let rx = rx.clone();
                scope.spawn(move || {
                    let mut parser = match TuParser::new(cfg) {
                        Ok(parser) => parser,
                        Err(e) => {
                            tracing::error!("Worker {worker} failed to set up the front-end: {e}");
                            return;
                        }
                    };
                    while let Ok(command) = rx.recv() {
                        let files = match parser.parse_tu(command) {
                            Ok(files) => files,
                            Err(e) => {
                                tracing::warn!("Failed to index {}: {e}", command.file.display());
                                continue;
                            }
                        };
                        let mut walker = Walker::new(index, cfg);
                        for file in &files {
                            walker.walk_file(file);
                        }
                        tracing::debug!(
                            "Indexed {} ({} files)",
                            command.file.display(),
                            files.len()
                        );
                    }
                });
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn command_for(dir: &std::path::Path, file: &str) -> CompileCommand {
        CompileCommand {
            directory: dir.to_path_buf(),
            file: PathBuf::from(file),
            command: Some(format!("clang++ -c {file}")),
            arguments: None,
            output: None,
        }
    }

    #[test]
    fn executes_all_tus_into_one_index() {
        let dir = std::env::temp_dir().join("cppdox_executor_test");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("a.cpp"), "class A { };\n").unwrap();
        std::fs::write(dir.join("b.cpp"), "class B { };\n").unwrap();

        let cfg = Config {
            root_dir: dir.clone(),
            ..Config::default()
        };
        let index = Index::default();
        let commands = vec![command_for(&dir, "a.cpp"), command_for(&dir, "b.cpp")];

        ParallelExecutor::new(4).execute(&commands, &index, &cfg);
        assert_eq!(index.records.len(), 2);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn debug_limit_caps_in_listing_order() {
        let dir = std::env::temp_dir().join("cppdox_executor_limit_test");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("a.cpp"), "class A { };\n").unwrap();
        std::fs::write(dir.join("b.cpp"), "class B { };\n").unwrap();

        let cfg = Config {
            root_dir: dir.clone(),
            debug_limit_num_indexed_files: Some(1),
            ..Config::default()
        };
        let index = Index::default();
        let commands = vec![command_for(&dir, "a.cpp"), command_for(&dir, "b.cpp")];

        ParallelExecutor::new(4).execute(&commands, &index, &cfg);
        assert_eq!(index.records.len(), 1);
        let only = index.records.entries().values().next().unwrap().info.name.clone();
        assert_eq!(only, "A");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn failing_tu_does_not_sink_the_rest() {
        let dir = std::env::temp_dir().join("cppdox_executor_failure_test");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("good.cpp"), "class Good { };\n").unwrap();

        let cfg = Config {
            root_dir: dir.clone(),
            ..Config::default()
        };
        let index = Index::default();
        let commands = vec![command_for(&dir, "missing.cpp"), command_for(&dir, "good.cpp")];

        ParallelExecutor::new(2).execute(&commands, &index, &cfg);
        assert_eq!(index.records.len(), 1);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
