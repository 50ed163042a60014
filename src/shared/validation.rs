use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Separators accepted between tags in a delimited tag string.
    /// - "seo, email" -> ["seo", "email"]
    /// - "seo email,,  blog" -> ["seo", "email", "blog"]
    pub static ref TAG_SEPARATOR_REGEX: Regex = Regex::new(r"[,\s]+").unwrap();
}

/// Split a comma/space separated tag string, keeping input order and duplicates.
pub fn split_tags(raw: &str) -> Vec<String> {
    TAG_SEPARATOR_REGEX
        .split(raw.trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Trim every tag and drop the empty ones. NUL characters are removed.
pub fn clean_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tags.into_iter()
        .map(|t| strip_nul(t.as_ref().to_string()).trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Remove every U+0000, which PostgreSQL text columns cannot store.
pub fn strip_nul(value: String) -> String {
    if value.contains('\0') {
        value.replace('\0', "")
    } else {
        value
    }
}

/// Cut `value` down to at most `max_chars` characters.
///
/// Returns whether anything was removed.
pub fn truncate_chars(value: &mut String, max_chars: usize) -> bool {
    match value.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => {
            value.truncate(byte_idx);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_tags_mixed_separators() {
        assert_eq!(
            split_tags("seo, email  blog,,writing"),
            vec!["seo", "email", "blog", "writing"]
        );
    }

    #[test]
    fn test_split_tags_keeps_duplicates_in_order() {
        assert_eq!(split_tags("b,a,b"), vec!["b", "a", "b"]);
    }

    #[test]
    fn test_split_tags_empty() {
        assert!(split_tags("").is_empty());
        assert!(split_tags(" , ,").is_empty());
    }

    #[test]
    fn test_clean_tags() {
        assert_eq!(clean_tags([" a ", "", "b"]), vec!["a", "b"]);
    }

    #[test]
    fn test_nul_is_stripped() {
        assert_eq!(strip_nul("a\0b\0".to_string()), "ab");
        assert_eq!(clean_tags(["\0", "x\0 "]), vec!["x"]);
    }

    #[test]
    fn test_truncate_chars_counts_characters_not_bytes() {
        let mut s = "héllo".to_string();
        assert!(truncate_chars(&mut s, 2));
        assert_eq!(s, "hé");

        let mut short = "abc".to_string();
        assert!(!truncate_chars(&mut short, 3));
        assert_eq!(short, "abc");
    }
}
