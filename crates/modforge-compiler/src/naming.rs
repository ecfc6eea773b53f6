//! Identifier derivation: mod ids, registry ids, Java class and constant
//! names.

/// Lowercase `name`, replace runs of non-`[a-z0-9_]` with a single `_`,
/// and strip leading/trailing underscores. Used both for `mod_id` and for
/// each element's `snake_case` registry-id segment.
#[must_use]
pub fn slugify(name: &str) -> String {
    let lower = name.to_lowercase();
    let mut out = String::with_capacity(lower.len());
    let mut last_was_sep = false;
    for ch in lower.chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_' {
            out.push(ch);
            last_was_sep = ch == '_';
        } else if !last_was_sep {
            out.push('_');
            last_was_sep = true;
        }
    }
    out.trim_matches('_').to_string()
}

/// `PascalCase` a slug or arbitrary name: split on non-alphanumeric
/// boundaries and capitalize each segment's first letter.
#[must_use]
pub fn pascal_case(name: &str) -> String {
    slugify(name)
        .split('_')
        .filter(|segment| !segment.is_empty())
        .map(capitalize)
        .collect()
}

/// `SCREAMING_SNAKE_CASE` a slug or arbitrary name.
#[must_use]
pub fn screaming_snake_case(name: &str) -> String {
    slugify(name).to_uppercase()
}

fn capitalize(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_punctuation_and_repeats() {
        assert_eq!(slugify("Ruby Sword!!"), "ruby_sword");
        assert_eq!(slugify("  leading and trailing  "), "leading_and_trailing");
        assert_eq!(slugify("Already_Snake_Case"), "already_snake_case");
    }

    #[test]
    fn pascal_case_capitalizes_each_segment() {
        assert_eq!(pascal_case("ruby_sword"), "RubySword");
        assert_eq!(pascal_case("Gemstone Tools"), "GemstoneTools");
    }

    #[test]
    fn screaming_snake_case_uppercases_the_slug() {
        assert_eq!(screaming_snake_case("Ruby Sword"), "RUBY_SWORD");
    }
}
