//! Deterministic text cleanup applied before classification.
//!
//! `normalize` preserves case so entity extraction keeps proper-name and
//! URL casing; `fold` produces the lowercase comparison form used where a
//! rule only cares about wording.

/// Trims the text and collapses internal whitespace runs to single spaces.
///
/// Idempotent: `normalize(normalize(x)) == normalize(x)`.
pub fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The case-insensitive comparison form: `normalize` plus lowercasing.
pub fn fold(text: &str) -> String {
    normalize(text).to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trims_and_collapses_whitespace() {
        assert_eq!(normalize("  show   team\tApollo \n"), "show team Apollo");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "  assign   John as developer  ",
            "team Alpha members are Carol, David",
            "",
            "   ",
            "one",
        ];
        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "normalize not idempotent for '{input}'");
        }
    }

    #[test]
    fn test_preserves_case() {
        assert_eq!(
            normalize("Update Apollo's repo to https://github.com/Org/Repo"),
            "Update Apollo's repo to https://github.com/Org/Repo"
        );
    }

    #[test]
    fn test_fold_lowercases() {
        assert_eq!(fold("  Show Team Apollo "), "show team apollo");
    }
}
