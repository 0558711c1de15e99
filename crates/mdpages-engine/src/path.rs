//! Virtual path helpers.

/// Key under which a content page is stored.
///
/// Strips the page extension and any leading separator:
/// `docs/guide.md` → `docs/guide`.
pub(crate) fn content_key(virtual_path: &str, ext: &str) -> String {
    let trimmed = virtual_path.trim_start_matches('/');
    trimmed
        .strip_suffix(ext)
        .and_then(|rest| rest.strip_suffix('.'))
        .unwrap_or(trimmed)
        .to_owned()
}

/// Normalize a request path: leading separators removed, empty → default page.
pub(crate) fn normalize_path_info(path_info: &str, default_page: &str) -> String {
    let trimmed = path_info.trim_start_matches('/');
    if trimmed.is_empty() {
        default_page.to_owned()
    } else {
        trimmed.to_owned()
    }
}

/// Directory-index candidate for a normalized path (`docs/` → `docs/index`).
pub(crate) fn index_candidate(normalized: &str, default_page: &str) -> String {
    let dir = normalized.trim_end_matches('/');
    if dir.is_empty() {
        default_page.to_owned()
    } else {
        format!("{dir}/{default_page}")
    }
}

/// Bare name of a template reference (`views/shared/_wide.html` → `_wide`).
pub(crate) fn bare_name(reference: &str) -> &str {
    let name = reference.rsplit_once('/').map_or(reference, |(_, name)| name);
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    }
}

/// Join a directory and a file name (`""` is the storage root).
pub(crate) fn join(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_owned()
    } else {
        format!("{dir}/{name}")
    }
}

/// Parent directory (`a/b` → `a`, `a` → `""`), or `None` at the root.
pub(crate) fn parent_dir(dir: &str) -> Option<&str> {
    if dir.is_empty() {
        return None;
    }
    Some(dir.rsplit_once('/').map_or("", |(parent, _)| parent))
}

/// True if `path` lies below directory `dir`.
pub(crate) fn is_under(path: &str, dir: &str) -> bool {
    let dir = dir.trim_matches('/');
    path.strip_prefix(dir)
        .is_some_and(|rest| rest.starts_with('/'))
}

/// True if any segment of `path` starts with `.` (`.drafts/a.md`, `docs/.x.md`).
///
/// Listing never returns such files, so lazy discovery must not serve them.
pub(crate) fn is_hidden(path: &str) -> bool {
    path.split('/').any(|segment| segment.starts_with('.'))
}
