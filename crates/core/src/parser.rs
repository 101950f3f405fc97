//! Branch extraction for if / else-if / else rule scripts.
//!
//! This is a line scanner, not a grammar. Each line is normalized by
//! dropping one leading `}` so that `} else if (...) {` reads as a header.
//! After a header the scanner collects action lines up to the next line
//! containing `}` and then stops WITHOUT consuming it: the outer loop looks
//! at that same line again, which is how a chained `} else {` opens the
//! next branch in the same pass.
//!
//! Known limitation: a nested block inside a branch body ends the outer
//! branch's action scan at the nested block's closing brace.

use std::collections::BTreeSet;

use crate::lexer::{identifiers, strip_comments};
use crate::ruleset::{assignment_target, is_keyword, Branch, Condition, Ruleset};

/// Extract the branch structure of a rule script. Never fails.
pub fn parse(text: &str) -> Ruleset {
    let src = strip_comments(text);
    let lines: Vec<&str> = src.lines().collect();

    let mut scanner = Scanner {
        lines: &lines,
        pos: 0,
        variables: BTreeSet::new(),
        outputs: BTreeSet::new(),
    };
    let mut branches = Vec::new();

    while scanner.pos < lines.len() {
        let line = normalize(lines[scanner.pos]);
        scanner.collect_identifiers(line);

        match branch_header(line) {
            Some(condition) => {
                scanner.pos += 1;
                let actions = scanner.collect_actions();
                branches.push(Branch { condition, actions });
                // Cursor stays on the terminator so it can open the next branch.
            }
            None => scanner.pos += 1,
        }
    }

    Ruleset {
        branches,
        variables: scanner.variables,
        outputs: scanner.outputs,
    }
}

struct Scanner<'a> {
    lines: &'a [&'a str],
    pos: usize,
    variables: BTreeSet<String>,
    outputs: BTreeSet<String>,
}

impl Scanner<'_> {
    fn collect_identifiers(&mut self, line: &str) {
        for ident in identifiers(line) {
            if !is_keyword(&ident) {
                self.variables.insert(ident);
            }
        }
    }

    /// Advance over a branch body, stopping on (not past) the first line
    /// containing `}`. Runs to end of input if no terminator exists.
    fn collect_actions(&mut self) -> Vec<String> {
        let mut actions = Vec::new();

        while self.pos < self.lines.len() && !self.lines[self.pos].contains('}') {
            let line = self.lines[self.pos].trim();
            self.collect_identifiers(line);

            if line.contains('=') {
                if let Some(target) = assignment_target(line) {
                    self.outputs.insert(target.to_string());
                }
                actions.push(line.trim_end_matches(';').to_string());
            }
            self.pos += 1;
        }

        actions
    }
}

/// Trim a raw line and drop one leading closing brace.
fn normalize(raw: &str) -> &str {
    let line = raw.trim();
    line.strip_prefix('}').unwrap_or(line).trim()
}

/// Classify a normalized line as a branch header.
fn branch_header(line: &str) -> Option<Condition> {
    if line.starts_with("if") || line.starts_with("else if") {
        Some(Condition::Expr(condition_text(line)))
    } else if line.starts_with("else") {
        Some(Condition::Default)
    } else {
        None
    }
}

/// Text between the first `(` and the last `)`, trimmed; empty when the
/// parentheses are missing or out of order.
fn condition_text(line: &str) -> String {
    match (line.find('('), line.rfind(')')) {
        (Some(open), Some(close)) if close > open => line[open + 1..close].trim().to_string(),
        _ => String::new(),
    }
}
