//! C4 -- Output coverage.
//!
//! For every output name, records which branches assign it. An output set
//! by only some branches keeps whatever value it had before the rule ran
//! when the other branches fire.

use std::collections::BTreeMap;

use rulescribe_core::Ruleset;
use serde::Serialize;

/// Where one output is and is not assigned.
#[derive(Debug, Clone, Serialize)]
pub struct OutputCoverage {
    pub assigned_in: Vec<usize>,
    pub missing_in: Vec<usize>,
}

/// Aggregated C4 result.
#[derive(Debug, Clone, Serialize)]
pub struct C4Result {
    pub outputs: BTreeMap<String, OutputCoverage>,
    pub fully_covered: bool,
}

/// C4 -- Compute per-output branch coverage.
pub fn analyze_coverage(ruleset: &Ruleset) -> C4Result {
    let mut outputs = BTreeMap::new();

    for output in &ruleset.outputs {
        let mut coverage = OutputCoverage {
            assigned_in: Vec::new(),
            missing_in: Vec::new(),
        };
        for (i, branch) in ruleset.branches.iter().enumerate() {
            if branch.assigned_names().contains(&output.as_str()) {
                coverage.assigned_in.push(i + 1);
            } else {
                coverage.missing_in.push(i + 1);
            }
        }
        outputs.insert(output.clone(), coverage);
    }

    let fully_covered = outputs.values().all(|c| c.missing_in.is_empty());
    C4Result {
        outputs,
        fully_covered,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rulescribe_core::parse;

    #[test]
    fn partially_assigned_output_is_reported() {
        let src = "if (a) {\n x = 1;\n y = 1;\n} else {\n x = 2;\n}";
        let c4 = analyze_coverage(&parse(src));
        assert!(!c4.fully_covered);
        assert_eq!(c4.outputs["x"].missing_in, Vec::<usize>::new());
        assert_eq!(c4.outputs["y"].assigned_in, vec![1]);
        assert_eq!(c4.outputs["y"].missing_in, vec![2]);
    }
}
