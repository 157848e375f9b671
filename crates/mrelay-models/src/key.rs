//! Storage key sanitization.
//!
//! Keys end up both as object-store keys and as URL path segments, so the
//! characters that break either are stripped and separators are normalized
//! to single hyphens.

/// Characters that are unsafe in a storage key or URL path segment.
pub const RESERVED_KEY_CHARS: &[char] = &[
    '#', '%', '?', '&', '=', '+', '<', '>', '|', '\\', '/', ':', '*', '"',
];

/// Sanitize a name for use as a single storage key segment.
///
/// Reserved characters and control characters are removed, runs of
/// whitespace and hyphens collapse to one hyphen, and leading/trailing
/// hyphens are trimmed. The result is a fixed point:
/// `sanitize_key(&sanitize_key(x)) == sanitize_key(x)`.
pub fn sanitize_key(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_separator = false;

    for c in name.chars() {
        if RESERVED_KEY_CHARS.contains(&c) {
            continue;
        }
        if c.is_whitespace() || c == '-' {
            pending_separator = true;
            continue;
        }
        if c.is_control() {
            continue;
        }
        if pending_separator && !out.is_empty() {
            out.push('-');
        }
        pending_separator = false;
        out.push(c);
    }

    out
}

/// Split a file name into `(stem, extension)`.
///
/// The extension is returned without the dot. Dotfiles and names without a
/// dot have no extension.
pub fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rfind('.') {
        Some(idx) if idx > 0 && idx + 1 < name.len() => (&name[..idx], Some(&name[idx + 1..])),
        _ => (name, None),
    }
}

/// Sanitize a file name, keeping its extension attached to the stem.
///
/// Returns `None` when nothing usable is left of the stem.
pub fn sanitize_filename(name: &str) -> Option<String> {
    let (stem, ext) = split_extension(name.trim());
    let stem = sanitize_key(stem);
    if stem.is_empty() {
        return None;
    }

    let ext = ext
        .map(|e| {
            e.chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .collect::<String>()
                .to_ascii_lowercase()
        })
        .filter(|e| !e.is_empty());

    Some(match ext {
        Some(ext) => format!("{}.{}", stem, ext),
        None => stem,
    })
}

/// Sanitize a slash-delimited folder path segment by segment.
///
/// Empty segments (and `.`/`..`) are dropped, so the result never starts or
/// ends with a slash.
pub fn sanitize_folder(folder: &str) -> String {
    folder
        .split('/')
        .map(sanitize_key)
        .filter(|s| !s.is_empty() && s != "." && s != "..")
        .collect::<Vec<_>>()
        .join("/")
}

/// Join an already-sanitized folder and file name into a key.
pub fn join_key(folder: &str, name: &str) -> String {
    if folder.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", folder, name)
    }
}

/// Literal term replacements layered on top of [`sanitize_key`].
///
/// Every replacement is followed by another sanitize pass so a substitution
/// can never reintroduce reserved characters, doubled hyphens or edge
/// hyphens.
#[derive(Debug, Clone, Default)]
pub struct KeyRules {
    replacements: Vec<(String, String)>,
}

impl KeyRules {
    /// Create rules from `(from, to)` pairs. Empty `from` terms are ignored.
    pub fn new<I, S>(replacements: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        Self {
            replacements: replacements
                .into_iter()
                .map(|(from, to)| (from.into(), to.into()))
                .filter(|(from, _)| !from.is_empty())
                .collect(),
        }
    }

    /// Parse rules from `from=>to;from2=>to2`.
    ///
    /// Malformed entries are skipped.
    pub fn parse(raw: &str) -> Self {
        Self::new(raw.split(';').filter_map(|entry| {
            let (from, to) = entry.split_once("=>")?;
            Some((from.trim().to_string(), to.trim().to_string()))
        }))
    }

    /// Number of active replacements.
    pub fn len(&self) -> usize {
        self.replacements.len()
    }

    /// Whether no replacements are configured.
    pub fn is_empty(&self) -> bool {
        self.replacements.is_empty()
    }

    /// Sanitize `name`, apply replacements, then sanitize again.
    pub fn apply(&self, name: &str) -> String {
        let mut key = sanitize_key(name);
        for (from, to) in &self.replacements {
            if key.contains(from.as_str()) {
                key = key.replace(from.as_str(), to);
            }
        }
        sanitize_key(&key)
    }
}
