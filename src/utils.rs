/// Replace the first run of `*` in an Ensight filename with `number`, zero padded to
/// the width of the run.
///
/// ```ignore
/// assert_eq!(expand_wildcards("flow.****", 12), "flow.0012");
/// ```
pub(crate) fn expand_wildcards(pattern: &str, number: u32) -> String {
    let start = match pattern.find('*') {
        Some(start) => start,
        None => return pattern.to_string(),
    };

    let width = pattern[start..].chars().take_while(|c| *c == '*').count();

    format!(
        "{}{:0width$}{}",
        &pattern[..start],
        number,
        &pattern[start + width..],
        width = width
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_to_wildcard_width() {
        assert_eq!(expand_wildcards("flow.****", 12), "flow.0012");
        assert_eq!(expand_wildcards("geo_**.geo", 3), "geo_03.geo");
    }

    #[test]
    fn wider_numbers_are_not_truncated() {
        assert_eq!(expand_wildcards("a*", 123), "a123");
    }

    #[test]
    fn only_first_run_is_replaced() {
        assert_eq!(expand_wildcards("a**_b**", 1), "a01_b**");
        assert_eq!(expand_wildcards("plain.geo", 7), "plain.geo");
    }
}
