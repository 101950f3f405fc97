//! rulescribe-core: branch extraction for MVEL-style rule scripts.
//!
//! Turns raw rule-script text into a [`Ruleset`]: the ordered branches of
//! an if / else-if / else chain, the identifiers the script mentions, and
//! the names it assigns to.
//!
//! # Public API
//!
//! - [`parse()`] -- extract a [`Ruleset`] from rule-script text
//! - [`diff_rulesets()`] -- structural comparison of two rulesets
//! - Model types: [`Ruleset`], [`Branch`], [`Condition`]
//!
//! Parsing is total: malformed or truncated input degrades to empty
//! conditions, partial action lists, or no branches at all.

pub mod diff;
pub mod lexer;
pub mod parser;
pub mod ruleset;

pub use diff::{diff_rulesets, BranchChange, RulesetDiff};
pub use parser::parse;
pub use ruleset::{Branch, Condition, Ruleset, DEFAULT_CONDITION, KEYWORDS};
