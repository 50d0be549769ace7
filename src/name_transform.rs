//! C1: pure functions mapping GIR raw identifiers to target-surface
//! identifiers (§4.1). Every transform here is deterministic and
//! idempotent — calling it twice on its own output is a no-op.

/// Reserved words on the target surface; a parameter/field/property whose
/// name collides with one of these is suffixed with an underscore.
const RESERVED_WORDS: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete", "do",
    "else", "enum", "export", "extends", "false", "finally", "for", "function", "if", "import",
    "in", "instanceof", "new", "null", "return", "super", "switch", "this", "throw", "true", "try",
    "typeof", "var", "void", "while", "with", "as", "implements", "interface", "let", "package",
    "private", "protected", "public", "static", "yield", "any", "boolean", "constructor",
    "declare", "get", "module", "require", "number", "set", "string", "symbol", "type", "from",
    "of",
];

/// Fixed token prepended to an identifier that would otherwise start with
/// a digit (scenario 2 in §8: `"2fast"` → commented-out placeholder, never
/// emitted as a bare numeric-leading identifier).
const NUMERIC_PREFIX: &str = "_";

/// Placeholder substituted for an identifier that is the empty string.
const EMPTY_PLACEHOLDER: &str = "-";

fn starts_with_digit(s: &str) -> bool {
    s.chars().next().map(|c| c.is_ascii_digit()).unwrap_or(false)
}

fn is_empty_or_placeholder(s: &str) -> bool {
    s.is_empty() || s == EMPTY_PLACEHOLDER
}

/// Rewrites dashes and other non-identifier characters to underscores,
/// leaving everything else untouched. Idempotent: running it on its own
/// output changes nothing, since the output contains no dashes left to
/// rewrite.
fn dashes_to_underscores(s: &str) -> String {
    s.chars()
        .map(|c| if c == '-' { '_' } else { c })
        .collect()
}

/// Converts `foo-bar-baz` to `fooBarBaz`.
fn camel_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut capitalize_next = false;
    for c in s.chars() {
        if c == '-' || c == '_' {
            capitalize_next = true;
            continue;
        }
        if capitalize_next {
            out.extend(c.to_uppercase());
            capitalize_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn suffix_if_reserved(name: &str) -> String {
    if RESERVED_WORDS.contains(&name) {
        format!("{name}_")
    } else {
        name.to_string()
    }
}

pub fn module_namespace(raw: &str) -> String {
    if is_empty_or_placeholder(raw) {
        return EMPTY_PLACEHOLDER.to_string();
    }
    dashes_to_underscores(raw)
}

pub fn type_name(raw: &str) -> String {
    if is_empty_or_placeholder(raw) {
        return EMPTY_PLACEHOLDER.to_string();
    }
    dashes_to_underscores(raw)
}

/// Transforms a raw GIR enum member name. The digit-leading case is
/// signaled, rather than silently renamed, so callers (MemberSynthesizer)
/// can emit the commented-out placeholder from §8 scenario 2 instead of a
/// real member.
pub enum EnumValueName {
    Valid(String),
    NumericLeading { original: String, transformed: String },
}

pub fn enum_value(raw: &str) -> EnumValueName {
    let cleaned = dashes_to_underscores(raw);
    if starts_with_digit(&cleaned) {
        EnumValueName::NumericLeading {
            original: raw.to_string(),
            transformed: format!("{NUMERIC_PREFIX}{cleaned}"),
        }
    } else if is_empty_or_placeholder(&cleaned) {
        EnumValueName::Valid(EMPTY_PLACEHOLDER.to_string())
    } else {
        EnumValueName::Valid(cleaned)
    }
}

pub fn constant_name(raw: &str) -> String {
    if is_empty_or_placeholder(raw) {
        return EMPTY_PLACEHOLDER.to_string();
    }
    raw.to_string()
}

pub fn function_name(raw: &str) -> String {
    if is_empty_or_placeholder(raw) {
        return EMPTY_PLACEHOLDER.to_string();
    }
    suffix_if_reserved(&dashes_to_underscores(raw))
}

pub fn parameter_name(raw: &str) -> String {
    if is_empty_or_placeholder(raw) {
        return EMPTY_PLACEHOLDER.to_string();
    }
    suffix_if_reserved(&dashes_to_underscores(raw))
}

/// A dashed property name is either camel-cased or quoted, depending on
/// `allow_quotes` (§4.1). Quoting is used when the caller needs the
/// property to appear as an object-literal key rather than an
/// identifier-shaped class member.
pub fn property_name(raw: &str, allow_quotes: bool) -> String {
    if is_empty_or_placeholder(raw) {
        return EMPTY_PLACEHOLDER.to_string();
    }
    if raw.contains('-') {
        if allow_quotes {
            format!("\"{raw}\"")
        } else {
            camel_case(raw)
        }
    } else {
        suffix_if_reserved(raw)
    }
}

pub fn field_name(raw: &str) -> String {
    if is_empty_or_placeholder(raw) {
        return EMPTY_PLACEHOLDER.to_string();
    }
    suffix_if_reserved(&dashes_to_underscores(raw))
}

pub fn signal_name(raw: &str) -> String {
    if is_empty_or_placeholder(raw) {
        return EMPTY_PLACEHOLDER.to_string();
    }
    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_member_with_dash_loses_it() {
        match enum_value("b-c") {
            EnumValueName::Valid(name) => assert_eq!(name, "b_c"),
            EnumValueName::NumericLeading { .. } => panic!("expected a valid name"),
        }
    }

    #[test]
    fn numeric_leading_enum_member_is_flagged() {
        match enum_value("2fast") {
            EnumValueName::NumericLeading { original, transformed } => {
                assert_eq!(original, "2fast");
                assert_eq!(transformed, "_2fast");
            }
            EnumValueName::Valid(_) => panic!("expected a numeric-leading name"),
        }
    }

    #[test]
    fn reserved_word_parameter_is_suffixed() {
        assert_eq!(parameter_name("class"), "class_");
        assert_eq!(parameter_name("value"), "value");
    }

    #[test]
    fn dashed_property_camel_cases_without_quotes() {
        assert_eq!(property_name("icon-name", false), "iconName");
        assert_eq!(property_name("icon-name", true), "\"icon-name\"");
    }

    #[test]
    fn empty_identifier_becomes_placeholder() {
        assert_eq!(field_name(""), "-");
        assert_eq!(field_name("-"), "-");
    }

    #[test]
    fn transforms_are_idempotent() {
        let once = parameter_name("foo-bar");
        let twice = parameter_name(&once);
        assert_eq!(once, twice);

        let once = field_name("class");
        let twice = field_name(&once);
        assert_eq!(once, twice);
    }
}
