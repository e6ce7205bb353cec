//! Anchor identifier flavors.
//!
//! A header is addressable under two identifier forms: the raw heading text as
//! written (including inline formatting sigils) and its URL-encoded twin. The
//! encoding preserves ASCII alphanumerics and `-_.~`, percent-encodes every
//! other byte, and turns spaces into `%20`.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Everything outside ASCII alphanumerics and `-_.~` gets percent-encoded.
const ANCHOR_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Compute the URL-encoded identifier for a raw header anchor id.
///
/// # Examples
///
/// ```rust
/// use mdcite_core::flavor::url_encoded_anchor;
///
/// assert_eq!(url_encoded_anchor("Section One"), "Section%20One");
/// assert_eq!(url_encoded_anchor("setup-2.1_x~y"), "setup-2.1_x~y");
/// ```
#[must_use]
pub fn url_encoded_anchor(id: &str) -> String {
    utf8_percent_encode(id, ANCHOR_ENCODE_SET).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spaces_become_percent_20() {
        assert_eq!(url_encoded_anchor("Test Anchor"), "Test%20Anchor");
    }

    #[test]
    fn test_unreserved_characters_pass_through() {
        // Alphanumerics plus -_.~ are preserved verbatim
        assert_eq!(
            url_encoded_anchor("abc-XYZ_0.9~ok"),
            "abc-XYZ_0.9~ok"
        );
    }

    #[test]
    fn test_punctuation_is_encoded() {
        assert_eq!(url_encoded_anchor("What's new?"), "What%27s%20new%3F");
        assert_eq!(url_encoded_anchor("a/b"), "a%2Fb");
    }

    #[test]
    fn test_formatting_sigils_are_encoded() {
        // Inline formatting is part of the raw id and gets encoded, not stripped
        assert_eq!(url_encoded_anchor("**Bold** Title"), "%2A%2ABold%2A%2A%20Title");
    }

    #[test]
    fn test_non_ascii_is_encoded_bytewise() {
        assert_eq!(url_encoded_anchor("é"), "%C3%A9");
    }

    #[test]
    fn test_empty_id() {
        assert_eq!(url_encoded_anchor(""), "");
    }
}
