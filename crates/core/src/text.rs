/// Share of alphabetic characters among the non-space characters of `s`.
/// Used to rank candidate item names by how word-like they are; 0.0 for
/// an empty or all-space string.
pub fn plausibility_score(s: &str) -> f32 {
    let letters = s.chars().filter(|c| c.is_alphabetic()).count();
    let total = s.chars().filter(|c| *c != ' ').count();
    if total == 0 {
        0.0
    } else {
        letters as f32 / total as f32
    }
}
