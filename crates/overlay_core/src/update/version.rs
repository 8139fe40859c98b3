//! Release version comparison.

use std::cmp::Ordering;

/// Strip whitespace and a leading `v` from a release tag.
pub fn normalize(tag: &str) -> &str {
    let tag = tag.trim();
    tag.strip_prefix(['v', 'V']).unwrap_or(tag)
}

/// Whether `latest` is a newer release than `current`.
///
/// Dotted numeric versions compare component-wise, missing components
/// counting as zero (`1.10.0 > 1.9.0`, `1.0 == 1.0.0`). Anything with a
/// non-numeric component falls back to plain string ordering.
pub fn is_newer(latest: &str, current: &str) -> bool {
    let (latest, current) = (normalize(latest), normalize(current));
    match (numeric_parts(latest), numeric_parts(current)) {
        (Some(l), Some(c)) => compare_parts(&l, &c) == Ordering::Greater,
        _ => latest > current,
    }
}

fn numeric_parts(version: &str) -> Option<Vec<u64>> {
    version.split('.').map(|part| part.parse().ok()).collect()
}

fn compare_parts(a: &[u64], b: &[u64]) -> Ordering {
    let len = a.len().max(b.len());
    (0..len)
        .map(|i| {
            let x = a.get(i).copied().unwrap_or(0);
            let y = b.get(i).copied().unwrap_or(0);
            x.cmp(&y)
        })
        .find(|ord| *ord != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_v_prefix() {
        assert_eq!(normalize("v1.1.0"), "1.1.0");
        assert_eq!(normalize(" V2.0 "), "2.0");
        assert_eq!(normalize("1.0.0"), "1.0.0");
    }

    #[test]
    fn numeric_comparison() {
        assert!(is_newer("v1.1.0", "1.0.0"));
        assert!(is_newer("1.10.0", "1.9.0"));
        assert!(!is_newer("1.9.0", "1.10.0"));
        assert!(!is_newer("v1.0.0", "1.0.0"));
        assert!(!is_newer("1.0", "1.0.0"));
        assert!(is_newer("2", "1.9.9"));
    }

    #[test]
    fn non_numeric_falls_back_to_lexical() {
        assert!(is_newer("1.1.0-beta", "1.0.0"));
        assert!(!is_newer("1.0.0-beta", "1.0.0-rc"));
    }
}
