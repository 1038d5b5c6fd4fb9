/// Length in chars of the longest contiguous run shared by `a` and `b`.
///
/// Classic O(n·m) dynamic scan keeping a single row of the table. Inputs are short
/// annotation strings, so nothing fancier is needed.
pub fn longest_common_substring(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    // row[j + 1] = length of the common suffix ending at a[i], b[j]
    let mut row = vec![0usize; b.len() + 1];
    let mut best = 0;

    for &ca in &a {
        let mut diagonal = 0;
        for (j, &cb) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if ca == cb { diagonal + 1 } else { 0 };
            best = best.max(row[j + 1]);
            diagonal = above;
        }
    }

    best
}

/// True when either string contains the other
pub fn contains_either(a: &str, b: &str) -> bool {
    a.contains(b) || b.contains(a)
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// True when the longest shared run covers at least half of `reference`
pub fn mostly_overlaps(reference: &str, other: &str) -> bool {
    let reference_len = reference.chars().count();
    2 * longest_common_substring(reference, other) >= reference_len
}
