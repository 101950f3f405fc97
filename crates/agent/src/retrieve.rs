//! Knowledge-base retrieval: ranks the files of a directory by how many of
//! the query's identifiers they mention.

use std::collections::BTreeSet;
use std::path::Path;

use rulescribe_core::lexer::identifiers;
use rulescribe_core::ruleset::is_keyword;
use tracing::{debug, warn};

use crate::collaborators::ContextRetriever;
use crate::error::AgentError;

/// Terms shorter than this are ignored when scoring documents.
const MIN_TERM_LEN: usize = 3;

/// Directory-scan retriever.
#[derive(Debug, Clone)]
pub struct DirRetriever {
    top_k: usize,
    max_chars: usize,
}

impl DirRetriever {
    pub fn new(top_k: usize, max_chars: usize) -> Self {
        Self { top_k, max_chars }
    }
}

impl Default for DirRetriever {
    fn default() -> Self {
        Self::new(3, 1200)
    }
}

/// A knowledge-base document with its relevance score.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ScoredDoc {
    name: String,
    content: String,
    score: usize,
}

impl ContextRetriever for DirRetriever {
    fn retrieve(&self, query: &str, kb_dir: &Path) -> Result<String, AgentError> {
        if !kb_dir.is_dir() {
            warn!(kb_dir = %kb_dir.display(), "knowledge-base directory not found, no context retrieved");
            return Ok(String::new());
        }

        let terms = query_terms(query);
        if terms.is_empty() || self.top_k == 0 {
            return Ok(String::new());
        }

        let mut docs = Vec::new();
        for (name, content) in read_documents(kb_dir)? {
            let score = score_document(&content, &terms);
            if score > 0 {
                docs.push(ScoredDoc {
                    name,
                    content,
                    score,
                });
            }
        }
        docs.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.name.cmp(&b.name)));
        docs.truncate(self.top_k);
        debug!(
            matched = docs.len(),
            terms = terms.len(),
            "knowledge-base documents selected"
        );

        let blocks: Vec<String> = docs
            .iter()
            .map(|d| format!("[{}]\n{}", d.name, truncate_chars(d.content.trim(), self.max_chars)))
            .collect();
        Ok(blocks.join("\n\n"))
    }
}

/// Regular files of `dir`, sorted by name. Invalid UTF-8 is replaced.
fn read_documents(dir: &Path) -> Result<Vec<(String, String)>, AgentError> {
    let entries = std::fs::read_dir(dir).map_err(|e| AgentError::io(dir, e))?;
    let mut docs = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| AgentError::io(dir, e))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let bytes = std::fs::read(&path).map_err(|e| AgentError::io(&path, e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        docs.push((name, String::from_utf8_lossy(&bytes).into_owned()));
    }
    docs.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(docs)
}

/// Lowercased identifiers of the query plus their dotted segments.
fn query_terms(query: &str) -> BTreeSet<String> {
    let mut terms = BTreeSet::new();
    for ident in identifiers(query) {
        if is_keyword(&ident) {
            continue;
        }
        for segment in ident.split('.') {
            if segment.len() >= MIN_TERM_LEN {
                terms.insert(segment.to_lowercase());
            }
        }
        if ident.len() >= MIN_TERM_LEN {
            terms.insert(ident.to_lowercase());
        }
    }
    terms
}

fn score_document(content: &str, terms: &BTreeSet<String>) -> usize {
    let haystack = content.to_lowercase();
    terms.iter().filter(|t| haystack.contains(t.as_str())).count()
}

fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kb() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("credit.md"),
            "applicant.score is the bureau score. decision.tier is the offer.",
        )
        .unwrap();
        std::fs::write(dir.path().join("shipping.md"), "order.total drives shipping.").unwrap();
        std::fs::write(dir.path().join("unrelated.md"), "nothing to see").unwrap();
        dir
    }

    #[test]
    fn ranks_documents_by_matching_terms() {
        let dir = kb();
        let query = "if (applicant.score > 700) {\n decision.tier = \"A\";\n}";
        let context = DirRetriever::default().retrieve(query, dir.path()).unwrap();
        assert!(context.starts_with("[credit.md]\n"));
        assert!(!context.contains("[unrelated.md]"));
        assert!(!context.contains("[shipping.md]"));
    }

    #[test]
    fn top_k_and_max_chars_bound_the_context() {
        let dir = kb();
        let query = "score total";
        let context = DirRetriever::new(1, 10).retrieve(query, dir.path()).unwrap();
        assert_eq!(context.matches('[').count(), 1);
        assert!(context.ends_with("..."));
    }

    #[test]
    fn missing_directory_yields_empty_context() {
        let context = DirRetriever::default()
            .retrieve("x = 1", Path::new("/no/such/kb"))
            .unwrap();
        assert_eq!(context, "");
    }

    #[test]
    fn keywords_and_short_tokens_are_not_terms() {
        let terms = query_terms("if (a.bc == true) { return order.total; }");
        assert!(terms.contains("order"));
        assert!(terms.contains("total"));
        assert!(terms.contains("order.total"));
        assert!(!terms.contains("true"));
        assert!(!terms.contains("return"));
        assert!(!terms.contains("a"));
        // "a.bc" itself is long enough to count.
        assert!(terms.contains("a.bc"));
    }
}
