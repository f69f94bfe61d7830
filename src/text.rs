//! Term and tag extraction from note bodies.
//!
//! Pure functions, no index knowledge. Terms are runs of letters
//! (ASCII plus the Latin-1 and Latin Extended accented ranges),
//! lower-cased; everything else separates. Tags are `#` followed by a
//! run of tag characters, which additionally allow digits, `_` and
//! `-`. Tag case is preserved.

/// Characters that may appear in an indexed term.
fn is_term_char(c: char) -> bool {
    matches!(c,
        'a'..='z' | 'A'..='Z' | 'À'..='Ö' | 'Ø'..='ö' | 'ø'..='ÿ' | 'Ā'..='ƿ')
}

/// Characters that may appear in a tag (after the `#`).
fn is_tag_char(c: char) -> bool {
    is_term_char(c) || c.is_ascii_digit() || c == '_' || c == '-'
}

/// Split text into normalized terms: every maximal run of term
/// characters, lower-cased. Duplicates are kept; callers indexing a
/// document deduplicate per document.
pub fn tokenize_text(text: &str) -> Vec<String> {
    let mut terms = Vec::new();
    let mut current = String::new();
    for c in text.chars() {
        if is_term_char(c) {
            current.extend(c.to_lowercase());
        } else if !current.is_empty() {
            terms.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        terms.push(current);
    }
    terms
}

/// Collect every `#tag` in the text, without the leading `#`.
pub fn extract_tags(text: &str) -> Vec<String> {
    let mut tags = Vec::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '#' {
            continue;
        }
        let mut tag = String::new();
        while let Some(&next) = chars.peek() {
            if !is_tag_char(next) {
                break;
            }
            tag.push(next);
            chars.next();
        }
        if !tag.is_empty() {
            tags.push(tag);
        }
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_splits_and_lowercases() {
        assert_eq!(
            tokenize_text("Alice met Bob."),
            vec!["alice", "met", "bob"]
        );
    }

    #[test]
    fn digits_and_punctuation_separate_terms() {
        assert_eq!(
            tokenize_text("meeting2024 notes, re:planning"),
            vec!["meeting", "notes", "re", "planning"]
        );
    }

    #[test]
    fn accented_letters_are_term_chars() {
        assert_eq!(tokenize_text("smörgåsbord på fredag"), vec!["smörgåsbord", "på", "fredag"]);
    }

    #[test]
    fn empty_and_blank_input() {
        assert!(tokenize_text("").is_empty());
        assert!(tokenize_text("  \n\t 123 !?").is_empty());
    }

    #[test]
    fn extracts_tags_with_digits_and_dashes() {
        assert_eq!(
            extract_tags("status #wip, see #q3-2026 and #dev_notes"),
            vec!["wip", "q3-2026", "dev_notes"]
        );
    }

    #[test]
    fn tag_case_is_preserved() {
        assert_eq!(extract_tags("#Work"), vec!["Work"]);
    }

    #[test]
    fn bare_and_doubled_hashes() {
        assert!(extract_tags("# nothing #").is_empty());
        assert_eq!(extract_tags("##double"), vec!["double"]);
    }
}
