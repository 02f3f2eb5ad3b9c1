//! Decides which declarations are documented.
//!
//! Substring matches are literal and case-sensitive; no globbing.

use cppdox_core::{Access, Config};

/// Per-declaration documentation gate, evaluated against the configuration.
pub struct IgnoreFilter<'c> {
    cfg: &'c Config,
}

impl<'c> IgnoreFilter<'c> {
    pub fn new(cfg: &'c Config) -> Self {
        Self { cfg }
    }

    /// True when the repo-relative file name contains a configured
    /// ignore-path substring.
    pub fn ignores_file(&self, relative: &str) -> bool {
        self.cfg
            .ignore_paths
            .iter()
            .any(|substr| relative.contains(substr.as_str()))
    }

    /// True when any enclosing namespace name contains a configured
    /// ignore-namespace substring. Anonymous namespaces never appear in
    /// `namespaces`; the walker rejects their contents outright.
    pub fn ignores_namespaces(&self, namespaces: &[String]) -> bool {
        namespaces.iter().any(|name| {
            self.cfg
                .ignore_namespaces
                .iter()
                .any(|substr| name.contains(substr.as_str()))
        })
    }

    /// True when private members are configured away and this one is private.
    pub fn ignores_access(&self, access: Access) -> bool {
        self.cfg.ignore_private_members && access == Access::Private
    }

    /// The combined per-declaration decision used by every extractor.
    pub fn ignores_decl(
        &self,
        relative_file: &str,
        namespaces: &[String],
        in_anonymous_namespace: bool,
        access: Access,
    ) -> bool {
        in_anonymous_namespace
            || self.ignores_file(relative_file)
            || self.ignores_namespaces(namespaces)
            || self.ignores_access(access)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(paths: &[&str], namespaces: &[&str], no_private: bool) -> Config {
        Config {
            ignore_paths: paths.iter().map(|s| s.to_string()).collect(),
            ignore_namespaces: namespaces.iter().map(|s| s.to_string()).collect(),
            ignore_private_members: no_private,
            ..Config::default()
        }
    }

    #[test]
    fn path_substring_match_is_literal() {
        let cfg = config_with(&["third_party/"], &[], false);
        let filter = IgnoreFilter::new(&cfg);
        assert!(filter.ignores_file("third_party/foo.h"));
        assert!(filter.ignores_file("deps/third_party/bar.h"));
        assert!(!filter.ignores_file("src/third.h"));
        assert!(!filter.ignores_file("Third_Party/foo.h"), "case-sensitive");
    }

    #[test]
    fn namespace_substring_matches_any_enclosing_level() {
        let cfg = config_with(&[], &["detail"], false);
        let filter = IgnoreFilter::new(&cfg);
        let inside = vec!["ns".to_string(), "detail".to_string()];
        let outside = vec!["ns".to_string(), "api".to_string()];
        assert!(filter.ignores_namespaces(&inside));
        assert!(!filter.ignores_namespaces(&outside));
        // Substring, not whole-name: "details" also matches.
        let details = vec!["details".to_string()];
        assert!(filter.ignores_namespaces(&details));
    }

    #[test]
    fn private_members_filtered_only_when_configured() {
        let relaxed = config_with(&[], &[], false);
        let strict = config_with(&[], &[], true);
        assert!(!IgnoreFilter::new(&relaxed).ignores_access(Access::Private));
        assert!(IgnoreFilter::new(&strict).ignores_access(Access::Private));
        assert!(!IgnoreFilter::new(&strict).ignores_access(Access::Protected));
    }

    #[test]
    fn anonymous_namespace_always_ignored() {
        let cfg = config_with(&[], &[], false);
        let filter = IgnoreFilter::new(&cfg);
        assert!(filter.ignores_decl("src/a.h", &[], true, Access::None));
        assert!(!filter.ignores_decl("src/a.h", &[], false, Access::None));
    }
}
