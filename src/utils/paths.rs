//! Lexical path helpers for template resolution and extraction.
//!
//! Templates and the paths they describe are handled as strings: a resolved
//! template may still contain `@token@` placeholders, so nothing here touches
//! the filesystem or goes through [`std::path::Path`] component parsing.

/// File extensions made of more than one dot-separated part.
///
/// [`split_extension`] recognizes these by suffix so that `cache.0001.bgeo.sc`
/// splits into `cache.0001` and `.bgeo.sc` rather than `.sc`.
pub const COMPOUND_EXTENSIONS: &[&str] = &[".bgeo.sc", ".bgeo.gz", ".geo.sc", ".tar.gz"];

fn is_separator(c: char) -> bool {
    c == '/' || (cfg!(windows) && c == '\\')
}

/// Normalizes a path string by collapsing separators and resolving `.` and `..`.
///
/// This is purely lexical: symbolic links are not resolved and the path does
/// not need to exist. Forward slashes are always used in the output.
///
/// - Repeated separators collapse (`a//b` → `a/b`), trailing ones are dropped
/// - `.` components are removed
/// - `..` removes the previous component; leading `..` of a relative path are kept,
///   leading `..` of an absolute path are dropped
/// - An empty result becomes `.` (or `/` for absolute paths)
/// - Exactly two leading slashes are preserved, as POSIX allows them to be special
///
/// # Examples
///
/// ```rust
/// use pipeline_structure::utils::normalize_path;
///
/// assert_eq!(normalize_path("/proj//Assets/./Char/../Hero/"), "/proj/Assets/Hero");
/// assert_eq!(normalize_path("../shots/./sq01"), "../shots/sq01");
/// assert_eq!(normalize_path(""), ".");
/// ```
#[must_use]
pub fn normalize_path(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }

    let leading = path.chars().take_while(|c| is_separator(*c)).count();
    let prefix = match leading {
        0 => "",
        2 => "//",
        _ => "/",
    };
    let absolute = leading > 0;

    let mut components: Vec<&str> = Vec::new();
    for component in path.split(is_separator) {
        match component {
            "" | "." => {}
            ".." => {
                if components.last().is_some_and(|last| *last != "..") {
                    components.pop();
                } else if !absolute {
                    components.push("..");
                }
            }
            c => components.push(c),
        }
    }

    let joined = components.join("/");
    if joined.is_empty() {
        if absolute {
            prefix.to_string()
        } else {
            ".".to_string()
        }
    } else {
        format!("{prefix}{joined}")
    }
}

/// Splits a path into its stem and file extension.
///
/// Compound extensions from [`COMPOUND_EXTENSIONS`] are matched
/// case-insensitively by suffix. Otherwise the extension starts at the last dot
/// of the final path component, provided that dot is preceded by at least one
/// non-dot character (so `.hidden` has no extension).
///
/// # Examples
///
/// ```rust
/// use pipeline_structure::utils::split_extension;
///
/// assert_eq!(split_extension("/out/hero_v0001.abc"), ("/out/hero_v0001", ".abc"));
/// assert_eq!(split_extension("/out/sim.1001.bgeo.sc"), ("/out/sim.1001", ".bgeo.sc"));
/// assert_eq!(split_extension("/out/.hidden"), ("/out/.hidden", ""));
/// assert_eq!(split_extension("/out.d/readme"), ("/out.d/readme", ""));
/// ```
#[must_use]
pub fn split_extension(path: &str) -> (&str, &str) {
    let name_start = path.rfind(is_separator).map_or(0, |i| i + 1);
    let name = &path[name_start..];
    let lower = name.to_ascii_lowercase();

    for ext in COMPOUND_EXTENSIONS {
        if lower.len() > ext.len() && lower.ends_with(ext) {
            let split = path.len() - ext.len();
            return (&path[..split], &path[split..]);
        }
    }

    match name.rfind('.') {
        Some(dot) if name[..dot].chars().any(|c| c != '.') => {
            let split = name_start + dot;
            (&path[..split], &path[split..])
        }
        _ => (path, ""),
    }
}
