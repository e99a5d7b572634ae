//! Name truncation and `.NNN` uniquification shared by Actions, slots,
//! layers and channel groups.
//!
//! Lengths are byte lengths; truncation never splits a UTF-8 sequence.

/// Maximum length of Action, layer and channel group names.
pub const NAME_MAX: usize = 63;

const NUMBER_DELIMITER: char = '.';

/// Longest prefix of `name` that fits in `max_bytes`.
pub fn truncate_utf8(name: &str, max_bytes: usize) -> &str {
    if name.len() <= max_bytes {
        return name;
    }
    let mut end = max_bytes;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    &name[..end]
}

/// Split `"Name.012"` into `("Name", 12)`. Names without a numeric suffix
/// return number 0.
pub fn split_name_number(name: &str) -> (&str, u32) {
    if let Some(pos) = name.rfind(NUMBER_DELIMITER) {
        let digits = &name[pos + 1..];
        if pos > 0 && !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(number) = digits.parse::<u32>() {
                return (&name[..pos], number);
            }
        }
    }
    (name, 0)
}

/// Truncate `name` to `max_bytes` and, if `is_taken` reports a collision,
/// append the next free `.NNN` suffix. The base is shortened further when
/// needed so the result still fits in `max_bytes`.
pub fn unique_name(name: &str, max_bytes: usize, is_taken: impl Fn(&str) -> bool) -> String {
    let name = truncate_utf8(name, max_bytes);
    if !is_taken(name) {
        return name.to_string();
    }

    let (base, mut number) = split_name_number(name);
    loop {
        number = number.saturating_add(1);
        let suffix = format!("{NUMBER_DELIMITER}{number:03}");
        let budget = max_bytes.saturating_sub(suffix.len());
        let candidate = format!("{}{}", truncate_utf8(base, budget), suffix);
        if !is_taken(&candidate) {
            return candidate;
        }
        if number == u32::MAX {
            // Every suffix is taken; hand back the colliding name rather than spin.
            return candidate;
        }
    }
}
