//! Query-string encoding for flat records.

use std::fmt::Display;

/// Joins `key=value` pairs with `&` in slice order.
///
/// No URL escaping is performed; callers pre-escape keys and values that
/// need it. An empty slice encodes to an empty string, and there is never a
/// trailing separator.
pub fn encode_query<K, V>(pairs: &[(K, V)]) -> String
where
    K: Display,
    V: Display,
{
    let mut out = String::new();
    for (index, (key, value)) in pairs.iter().enumerate() {
        if index > 0 {
            out.push('&');
        }
        out.push_str(&format!("{key}={value}"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_pairs_in_order() {
        assert_eq!(encode_query(&[("a", 1), ("b", 2)]), "a=1&b=2");
        assert_eq!(encode_query(&[("z", "last"), ("a", "first")]), "z=last&a=first");
    }

    #[test]
    fn single_pair_has_no_separator() {
        assert_eq!(encode_query(&[("only", "one")]), "only=one");
    }

    #[test]
    fn empty_record_is_empty_string() {
        assert_eq!(encode_query::<&str, &str>(&[]), "");
    }

    #[test]
    fn values_are_not_escaped() {
        assert_eq!(encode_query(&[("q", "a b&c")]), "q=a b&c");
    }
}
