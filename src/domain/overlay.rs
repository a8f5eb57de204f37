//! Two-layer field resolution for compiler instructions.
//!
//! An instruction element stores only the fields that differ from its base.

/// Effective value: the instruction-side value when present, else the base value.
pub fn effective<T>(instruction: Option<T>, base: T) -> T {
    instruction.unwrap_or(base)
}

/// Text variant of [`effective`]: an empty instruction text counts as absent.
pub fn effective_text<'a>(instruction: &'a str, base: &'a str) -> &'a str {
    if instruction.is_empty() {
        base
    } else {
        instruction
    }
}

/// Instruction-side value to store for `new_value`.
///
/// `None` means "clear the instruction field": the value equals the base.
pub fn collapse<T: PartialEq>(new_value: T, base: &T) -> Option<T> {
    if &new_value == base {
        None
    } else {
        Some(new_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_no_instruction_value_when_resolving_then_base_wins() {
        assert_eq!(effective(None, 5), 5);
        assert_eq!(effective_text("", "base text"), "base text");
    }

    #[test]
    fn given_instruction_value_when_resolving_then_instruction_wins() {
        assert_eq!(effective(Some(7), 5), 7);
        assert_eq!(effective(Some(false), true), false);
        assert_eq!(effective_text("override", "base text"), "override");
    }

    #[test]
    fn given_value_equal_to_base_when_collapsing_then_cleared() {
        assert_eq!(collapse(5, &5), None);
        assert_eq!(collapse(String::from("SHALL"), &String::from("SHALL")), None);
    }

    #[test]
    fn given_value_different_from_base_when_collapsing_then_kept() {
        assert_eq!(collapse(7, &5), Some(7));
        assert_eq!(collapse(true, &false), Some(true));
    }
}
