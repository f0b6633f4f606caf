use std::collections::BTreeSet;

/// Reconcile the per-config OCR candidates into one text document.
///
/// A single survivor is used verbatim. Several survivors are reduced to the
/// set of distinct trimmed lines (three characters or longer), which recovers
/// the union of what the configs individually captured while collapsing the
/// noise lines they repeat. Returns `None` when every candidate is blank;
/// the pipeline then falls back to one unrestricted re-run.
pub fn merge_candidates(candidates: &[String]) -> Option<String> {
    let non_empty: Vec<&str> = candidates
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();

    match non_empty.len() {
        0 => None,
        1 => Some(non_empty[0].to_string()),
        _ => {
            let mut distinct = BTreeSet::new();
            for text in non_empty {
                for line in text.lines() {
                    let line = line.trim();
                    if line.chars().count() >= 3 {
                        distinct.insert(line.to_string());
                    }
                }
            }
            let mut lines: Vec<String> = distinct.into_iter().collect();
            // Longer lines first: the more detailed reading of a row wins the
            // top spots; ties stay lexicographic for determinism.
            lines.sort_by(|a, b| {
                b.chars()
                    .count()
                    .cmp(&a.chars().count())
                    .then_with(|| a.cmp(b))
            });
            Some(lines.join("\n"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn all_blank_yields_none() {
        assert_eq!(merge_candidates(&strings(&["", "   ", "\n\n"])), None);
        assert_eq!(merge_candidates(&[]), None);
    }

    #[test]
    fn single_candidate_is_used_verbatim_trimmed() {
        let out = merge_candidates(&strings(&["  MILK 30.00\nBREAD 25.00  ", ""]));
        assert_eq!(out.unwrap(), "MILK 30.00\nBREAD 25.00");
    }

    #[test]
    fn duplicate_lines_across_candidates_collapse() {
        let out = merge_candidates(&strings(&[
            "MILK 30.00\nBREAD 25.00",
            "MILK 30.00\nEGGS 60.00",
        ]))
        .unwrap();
        assert_eq!(out.matches("MILK 30.00").count(), 1);
        assert!(out.contains("BREAD 25.00"));
        assert!(out.contains("EGGS 60.00"));
    }

    #[test]
    fn short_fragments_are_dropped_on_merge() {
        let out = merge_candidates(&strings(&["MILK 30.00\nab", "BREAD 25.00\n-|"])).unwrap();
        assert!(!out.contains("ab"));
        assert!(!out.contains("-|"));
    }

    #[test]
    fn merged_lines_sort_longest_first_then_lexicographic() {
        let out = merge_candidates(&strings(&["bb\u{20B9}9\nAAAAA 1", "ZZZZZ 2"])).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines, vec!["AAAAA 1", "ZZZZZ 2", "bb₹9"]);
    }
}
