//! European (DD/MM/YYYY) to ISO (YYYY-MM-DD) date rewriting.

use regex::{Regex, RegexBuilder};
use std::borrow::Cow;
use std::sync::OnceLock;

// Years outside 2020-2039 are left untouched. A date glued to a preceding digit or `-`
// is part of something longer, such as an already rewritten `2022-12-31/12/2022`.
const EU_DATE_PATTERN: &str = r"(^|[^\d-])(0[1-9]|[12]\d|3[01])/(0[1-9]|1[0-2])/(20[23]\d)";

fn eu_date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        RegexBuilder::new(EU_DATE_PATTERN)
            .case_insensitive(true)
            .multi_line(true)
            .dot_matches_new_line(true)
            .build()
            .expect("invalid date regex")
    })
}

/// Rewrite every DD/MM/YYYY date in `text` as YYYY-MM-DD, leaving everything else as is.
pub fn normalize_dates(text: &str) -> Cow<'_, str> {
    eu_date_re().replace_all(text, "${1}${4}-${3}-${2}")
}
