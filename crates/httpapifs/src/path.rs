//! Path handling for remote paths.
//!
//! Every path is normalized to an absolute, slash-separated form: empty and `.`
//! components are dropped, `..` pops its parent (clamped at the root), and the
//! root itself is `/`.

pub const ROOT: &str = "/";

pub fn normalize(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    format!("/{}", parts.join("/"))
}

pub fn is_root(path: &str) -> bool {
    normalize(path) == ROOT
}

/// Splits a path into its normalized parent directory and final component.
/// Returns `None` for the root, which has no parent.
pub fn split(path: &str) -> Option<(String, String)> {
    let normalized = normalize(path);
    let (parent, name) = normalized.rsplit_once('/')?;
    if name.is_empty() {
        return None;
    }
    let parent = if parent.is_empty() { ROOT } else { parent };
    Some((parent.to_string(), name.to_string()))
}

pub fn parent(path: &str) -> Option<String> {
    split(path).map(|(parent, _)| parent)
}

pub fn join(dir: &str, name: &str) -> String {
    normalize(&format!("{}/{}", dir, name))
}

/// True if `path` is `dir` itself or lies anywhere below it.
pub fn is_within(dir: &str, path: &str) -> bool {
    let dir = normalize(dir);
    let path = normalize(path);
    if dir == ROOT {
        return true;
    }
    path == dir || path.starts_with(&format!("{}/", dir))
}
