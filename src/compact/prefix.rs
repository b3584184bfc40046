// Namespace prefix table for path compaction.
//
// The table is an ordered list of (long, short) pairs. Lookup walks the list
// in order and rewrites at most one prefix, anchored at the start of the path.
// Substrings that merely look like a prefix further into the path are left
// alone, so `networking.navigation.foo` becomes `w.navigation.foo`.

/// Ordered (long-form prefix, short code) pairs. Earlier entries win.
pub const PREFIX_TABLE: &[(&str, &str)] = &[
    ("navigation.", "n."),
    ("environment.", "e."),
    ("electrical.", "l."),
    ("performance.", "f."),
    ("propulsion.", "r."),
    ("networking.", "w."),
];

/// Rewrite the leading long-form prefix of `path` to its short code.
///
/// Paths without a recognized prefix are returned unchanged.
pub fn shorten(path: &str) -> String {
    rewrite(path, PREFIX_TABLE.iter().map(|&(long, short)| (long, short)))
}

/// Rewrite the leading short code of `path` back to its long-form prefix.
pub fn lengthen(path: &str) -> String {
    rewrite(path, PREFIX_TABLE.iter().map(|&(long, short)| (short, long)))
}

fn rewrite<'a>(path: &str, pairs: impl Iterator<Item = (&'a str, &'a str)>) -> String {
    for (from, to) in pairs {
        if let Some(rest) = path.strip_prefix(from) {
            let mut out = String::with_capacity(to.len() + rest.len());
            out.push_str(to);
            out.push_str(rest);
            return out;
        }
    }
    path.to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
