/// Join `segment` onto `base` and normalize the result.
///
/// Follows POSIX path-join rules: empty and `.` components are dropped, `..`
/// removes the previous component (never climbing above the root of an
/// absolute path), and a trailing separator on the joined input is kept.
/// Components are not percent-encoded here.
///
/// # Examples
///
/// ```
/// use courier::core::join_path;
///
/// assert_eq!(join_path("/a", "b/c"), "/a/b/c");
/// assert_eq!(join_path("/a/b", "../c"), "/a/c");
/// assert_eq!(join_path("/", "x//y/"), "/x/y/");
/// ```
pub fn join_path(base: &str, segment: &str) -> String {
    let joined = match (base.is_empty(), segment.is_empty()) {
        (true, true) => return ".".to_string(),
        (true, false) => segment.to_string(),
        (false, true) => base.to_string(),
        (false, false) => format!("{base}/{segment}"),
    };
    normalize(&joined)
}

fn normalize(path: &str) -> String {
    let absolute = path.starts_with('/');
    let trailing = path.ends_with('/');

    let mut parts: Vec<&str> = Vec::new();
    for component in path.split('/') {
        match component {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if absolute => {}
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }

    let mut out = String::with_capacity(path.len());
    if absolute {
        out.push('/');
    }
    out.push_str(&parts.join("/"));

    if out.is_empty() {
        out.push('.');
    }
    if trailing && !out.ends_with('/') {
        out.push('/');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_simple() {
        assert_eq!(join_path("/a", "b/c"), "/a/b/c");
        assert_eq!(join_path("/", "b"), "/b");
        assert_eq!(join_path("/a/", "/b"), "/a/b");
    }

    #[test]
    fn test_join_normalizes_dots() {
        assert_eq!(join_path("/a/b", "./c"), "/a/b/c");
        assert_eq!(join_path("/a/b", "../c"), "/a/c");
        assert_eq!(join_path("/a", "../../.."), "/");
        assert_eq!(join_path("/a/b", ".."), "/a");
    }

    #[test]
    fn test_join_redundant_separators() {
        assert_eq!(join_path("/a//b", "c///d"), "/a/b/c/d");
    }

    #[test]
    fn test_join_trailing_separator() {
        assert_eq!(join_path("/a", "b/"), "/a/b/");
        assert_eq!(join_path("/a", "b/.."), "/a");
        assert_eq!(join_path("/a", "b/../"), "/a/");
    }

    #[test]
    fn test_join_empty_inputs() {
        assert_eq!(join_path("/a", ""), "/a");
        assert_eq!(join_path("", ""), ".");
        assert_eq!(join_path("", "x"), "x");
    }

    #[test]
    fn test_join_relative_keeps_parent_refs() {
        assert_eq!(join_path("a", "../../b"), "../b");
    }
}
