//! `path_match`: a small pattern grammar over graph paths —
//! `TOKEN ('->' TOKEN)*` where TOKEN is an exact name, a `prefix*`, a
//! single-node wildcard `*`, or a multi-node wildcard `**` matching
//! zero-or-more intermediate nodes. Matching is case-insensitive against
//! both the node id and an optional display name.

use std::collections::HashSet;
use std::fmt;

use super::DependencyGraph;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    Empty,
    EmptyToken,
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternError::Empty => write!(f, "pattern must contain at least one token"),
            PatternError::EmptyToken => write!(f, "pattern contains an empty token between '->'"),
        }
    }
}

impl std::error::Error for PatternError {}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Exact(String),
    Prefix(String),
    Wildcard,
    MultiWildcard,
}

fn parse_pattern(pattern: &str) -> Result<Vec<Token>, PatternError> {
    let raw: Vec<&str> = pattern.split("->").map(str::trim).collect();
    if raw.is_empty() || raw.iter().all(|t| t.is_empty()) {
        return Err(PatternError::Empty);
    }
    raw.into_iter()
        .map(|t| {
            if t.is_empty() {
                Err(PatternError::EmptyToken)
            } else if t == "**" {
                Ok(Token::MultiWildcard)
            } else if t == "*" {
                Ok(Token::Wildcard)
            } else if let Some(prefix) = t.strip_suffix('*') {
                Ok(Token::Prefix(prefix.to_lowercase()))
            } else {
                Ok(Token::Exact(t.to_lowercase()))
            }
        })
        .collect()
}

fn token_matches(token: &Token, id: &str, display_name: &str) -> bool {
    let id_lower = id.to_lowercase();
    let name_lower = display_name.to_lowercase();
    match token {
        Token::Exact(s) => &id_lower == s || &name_lower == s,
        Token::Prefix(s) => id_lower.starts_with(s.as_str()) || name_lower.starts_with(s.as_str()),
        Token::Wildcard => true,
        Token::MultiWildcard => unreachable!("MultiWildcard is handled by match_suffix directly"),
    }
}

impl DependencyGraph {
    /// Every simple path whose nodes satisfy `pattern`, searched from every
    /// node in the graph. `name_fn` maps an id to a display name used
    /// alongside the id for exact/prefix matching; omit it to match ids only.
    pub fn path_match(
        &self,
        pattern: &str,
        max_depth: usize,
        name_fn: Option<&dyn Fn(&str) -> String>,
    ) -> Result<Vec<Vec<String>>, PatternError> {
        let tokens = parse_pattern(pattern)?;
        let mut results = Vec::new();
        for start in self.nodes() {
            let mut path = vec![start.clone()];
            let mut visited: HashSet<String> = HashSet::from([start.clone()]);
            self.match_suffix(start, &tokens, 0, max_depth, &mut path, &mut visited, name_fn, &mut results);
        }
        Ok(results)
    }

    fn display_name(&self, id: &str, name_fn: Option<&dyn Fn(&str) -> String>) -> String {
        name_fn.map(|f| f(id)).unwrap_or_else(|| id.to_string())
    }

    #[allow(clippy::too_many_arguments)]
    fn match_suffix(
        &self,
        node: &str,
        tokens: &[Token],
        idx: usize,
        remaining_depth: usize,
        path: &mut Vec<String>,
        visited: &mut HashSet<String>,
        name_fn: Option<&dyn Fn(&str) -> String>,
        results: &mut Vec<Vec<String>>,
    ) {
        let is_last = idx == tokens.len() - 1;

        if tokens[idx] == Token::MultiWildcard {
            if is_last {
                results.push(path.clone());
            }
            if remaining_depth == 0 {
                return;
            }
            if !is_last {
                // Zero consumption: retry the remaining pattern against the current node.
                self.match_suffix(node, tokens, idx + 1, remaining_depth, path, visited, name_fn, results);
            }
            for next in self.successors(node) {
                if visited.contains(next) {
                    continue;
                }
                path.push(next.clone());
                visited.insert(next.clone());
                self.match_suffix(next, tokens, idx, remaining_depth - 1, path, visited, name_fn, results);
                path.pop();
                visited.remove(next);
            }
            return;
        }

        let name = self.display_name(node, name_fn);
        if !token_matches(&tokens[idx], node, &name) {
            return;
        }
        if is_last {
            results.push(path.clone());
            return;
        }
        if remaining_depth == 0 {
            return;
        }
        for next in self.successors(node) {
            if visited.contains(next) {
                continue;
            }
            path.push(next.clone());
            visited.insert(next.clone());
            self.match_suffix(next, tokens, idx + 1, remaining_depth - 1, path, visited, name_fn, results);
            path.pop();
            visited.remove(next);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cx_domain::{DepType, Dependency};

    fn graph(edges: &[(&str, &str)]) -> DependencyGraph {
        let deps = edges.iter().map(|(a, b)| Dependency::new(*a, *b, DepType::Calls)).collect::<Vec<_>>();
        DependencyGraph::build(&deps)
    }

    #[test]
    fn exact_token_chain_matches_case_insensitively() {
        let g = graph(&[("Handler", "Service"), ("Service", "Repo")]);
        let paths = g.path_match("handler->service->repo", 10, None).unwrap();
        assert_eq!(paths, vec![vec!["Handler".to_string(), "Service".to_string(), "Repo".to_string()]]);
    }

    #[test]
    fn prefix_token_matches_any_suffix() {
        let g = graph(&[("UserHandler", "UserService")]);
        let paths = g.path_match("user*->userservice", 10, None).unwrap();
        assert_eq!(paths.len(), 1);
    }

    #[test]
    fn single_wildcard_matches_exactly_one_node() {
        let g = graph(&[("a", "b"), ("b", "c")]);
        let paths = g.path_match("a->*->c", 10, None).unwrap();
        assert_eq!(paths, vec![vec!["a".to_string(), "b".to_string(), "c".to_string()]]);
    }

    #[test]
    fn multi_wildcard_matches_zero_or_more_intermediate_nodes() {
        let g = graph(&[("a", "b"), ("b", "c"), ("a", "c")]);
        let mut paths = g.path_match("a->**->c", 10, None).unwrap();
        paths.sort();
        assert!(paths.contains(&vec!["a".to_string(), "c".to_string()]));
        assert!(paths.contains(&vec!["a".to_string(), "b".to_string(), "c".to_string()]));
    }

    #[test]
    fn empty_pattern_is_rejected() {
        let g = graph(&[("a", "b")]);
        assert_eq!(g.path_match("", 10, None), Err(PatternError::Empty));
    }

    #[test]
    fn name_fn_participates_in_matching() {
        let g = graph(&[("e1", "e2")]);
        let names: std::collections::HashMap<&str, &str> = [("e1", "Parser"), ("e2", "Lexer")].into_iter().collect();
        let name_fn = move |id: &str| names.get(id).copied().unwrap_or(id).to_string();
        let paths = g.path_match("parser->lexer", 10, Some(&name_fn)).unwrap();
        assert_eq!(paths, vec![vec!["e1".to_string(), "e2".to_string()]]);
    }
}
