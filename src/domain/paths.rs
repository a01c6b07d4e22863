//! Virtual page paths and reference resolution.

use super::error::ComposeError;

const APP_ROOT_PREFIX: &str = "~/";

/// Normalise an absolute page path: single leading slash, no `.`/`..`
/// segments, no trailing slash.
pub fn normalize(path: &str) -> Result<String, ComposeError> {
    let trimmed = path.strip_prefix('~').unwrap_or(path);
    collapse(trimmed).ok_or_else(|| ComposeError::InvalidPath {
        base: "/".to_string(),
        reference: path.to_string(),
    })
}

/// Resolve `reference` as seen from the page at `base`.
///
/// `/x` and `~/x` are rooted at the application; anything else is relative to
/// the directory holding `base`.
pub fn resolve(base: &str, reference: &str) -> Result<String, ComposeError> {
    let invalid = || ComposeError::InvalidPath {
        base: base.to_string(),
        reference: reference.to_string(),
    };

    if reference.is_empty() {
        return Err(invalid());
    }

    let joined = if let Some(rooted) = reference.strip_prefix(APP_ROOT_PREFIX) {
        format!("/{rooted}")
    } else if reference.starts_with('/') {
        reference.to_string()
    } else {
        let directory = base.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");
        format!("{directory}/{reference}")
    };

    collapse(&joined).ok_or_else(invalid)
}

fn collapse(path: &str) -> Option<String> {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other),
        }
    }
    Some(format!("/{}", segments.join("/")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_reference_uses_base_directory() {
        let resolved = resolve("/blog/post", "_layout").expect("resolves");
        assert_eq!(resolved, "/blog/_layout");
    }

    #[test]
    fn parent_segments_are_collapsed() {
        let resolved = resolve("/blog/2024/post", "../../shared/_layout").expect("resolves");
        assert_eq!(resolved, "/shared/_layout");
    }

    #[test]
    fn app_root_and_absolute_references() {
        assert_eq!(
            resolve("/blog/post", "~/shared/_layout").expect("app root"),
            "/shared/_layout"
        );
        assert_eq!(
            resolve("/blog/post", "/shared/_layout").expect("absolute"),
            "/shared/_layout"
        );
    }

    #[test]
    fn escaping_the_root_is_rejected() {
        let err = resolve("/post", "../../_layout").expect_err("escapes root");
        assert!(matches!(err, ComposeError::InvalidPath { .. }));
    }

    #[test]
    fn empty_reference_is_rejected() {
        assert!(resolve("/post", "").is_err());
    }

    #[test]
    fn normalize_strips_redundant_segments() {
        assert_eq!(normalize("~/a/./b/").expect("normalizes"), "/a/b");
        assert_eq!(normalize("").expect("root"), "/");
    }
}
