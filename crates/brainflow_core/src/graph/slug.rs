//! Slug derivation for note titles and link terms.

use once_cell::sync::Lazy;
use regex::Regex;

static NON_SLUG_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid slug regex"));

const NOTE_FILE_EXTENSIONS: &[&str] = &[".md", ".markdown"];

/// Lowercases `text`, folds each run of non `[a-z0-9]` chars into one `-`,
/// and trims hyphens at both ends.
///
/// May return an empty string; that is a valid (degenerate) slug.
pub fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();
    NON_SLUG_RUN_RE
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

/// Derives the note title from a file name or plain title.
///
/// Keeps the last `/`-separated segment and strips one trailing markdown
/// extension (case-insensitive).
pub fn note_title_from_file_name(file_name: &str) -> String {
    let base = file_name.rsplit('/').next().unwrap_or(file_name);
    let lowered = base.to_ascii_lowercase();
    for extension in NOTE_FILE_EXTENSIONS {
        if lowered.ends_with(extension) && base.len() > extension.len() {
            return base[..base.len() - extension.len()].to_string();
        }
    }
    base.to_string()
}

#[cfg(test)]
mod tests {
    use super::{note_title_from_file_name, slugify};

    #[test]
    fn slugify_examples() {
        assert_eq!(slugify("My Topic"), "my-topic");
        assert_eq!(slugify("C++ Basics!!"), "c-basics");
        assert_eq!(slugify("  MY   topic "), "my-topic");
        assert_eq!(slugify("Breadth First Search"), "breadth-first-search");
    }

    #[test]
    fn slugify_is_idempotent() {
        for input in ["My Topic", "C++ Basics!!", "--a--b--", "Déjà vu", "", "!!!"] {
            let once = slugify(input);
            assert_eq!(slugify(&once), once, "input `{input}`");
        }
    }

    #[test]
    fn slugify_may_collapse_to_empty() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("???"), "");
    }

    #[test]
    fn non_ascii_letters_fold_to_hyphens() {
        assert_eq!(slugify("Déjà vu"), "d-j-vu");
    }

    #[test]
    fn title_strips_markdown_extension_and_directories() {
        assert_eq!(note_title_from_file_name("Intro to Graphs.md"), "Intro to Graphs");
        assert_eq!(
            note_title_from_file_name("notes/area/Intro to Graphs.MD"),
            "Intro to Graphs"
        );
        assert_eq!(note_title_from_file_name("Graphs.markdown"), "Graphs");
        assert_eq!(note_title_from_file_name("Plain Title"), "Plain Title");
        assert_eq!(note_title_from_file_name("archive.tar"), "archive.tar");
    }

    #[test]
    fn bare_extension_is_kept_as_title() {
        assert_eq!(note_title_from_file_name(".md"), ".md");
    }
}
