//! Path prefix rewriting.
//!
//! # Design Decisions
//! - Prefix matching only, case-sensitive, first match wins
//! - A prefix matches on a segment boundary: `/api` matches `/api` and
//!   `/api/v1` but not `/apis`
//! - No rules means identity

use crate::config::PathRewriteConfig;

#[derive(Debug, Clone)]
struct Rule {
    from: String,
    to: String,
}

/// Ordered list of prefix rewrites, compiled at startup.
#[derive(Debug, Clone, Default)]
pub struct PathRewriter {
    rules: Vec<Rule>,
}

impl PathRewriter {
    pub fn new(config: &[PathRewriteConfig]) -> Self {
        let rules = config
            .iter()
            .map(|r| Rule {
                from: r.from.trim_end_matches('/').to_string(),
                to: r.to.trim_end_matches('/').to_string(),
            })
            .collect();
        Self { rules }
    }

    pub fn is_identity(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rewrite `path`, returning it unchanged when no rule applies.
    pub fn rewrite(&self, path: &str) -> String {
        for rule in &self.rules {
            if let Some(rest) = strip_segment_prefix(path, &rule.from) {
                let rewritten = format!("{}{}", rule.to, rest);
                return if rewritten.is_empty() {
                    "/".to_string()
                } else {
                    rewritten
                };
            }
        }
        path.to_string()
    }
}

/// `prefix` has its trailing slash removed, so "/" becomes "" and matches all.
fn strip_segment_prefix<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = path.strip_prefix(prefix)?;
    if rest.is_empty() || rest.starts_with('/') {
        Some(rest)
    } else {
        None
    }
}
