//! Release notes loading.

use crate::config::NotesSource;
use crate::error::NotesError;
use crate::play::LocalizedText;

/// Build the release notes list: zero or one `en-US` entries.
///
/// The text is sent exactly as supplied; only an empty text produces no entry.
/// A notes file that cannot be read is an error.
pub fn build_release_notes(source: &NotesSource) -> Result<Vec<LocalizedText>, NotesError> {
    let text = match source {
        NotesSource::None => return Ok(Vec::new()),
        NotesSource::Inline(text) => text.clone(),
        NotesSource::File(path) => {
            std::fs::read_to_string(path).map_err(|source| NotesError::Read {
                path: path.clone(),
                source,
            })?
        }
    };

    if text.is_empty() {
        return Ok(Vec::new());
    }
    Ok(vec![LocalizedText::en_us(text)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    #[test]
    fn no_source_means_no_notes() {
        assert!(build_release_notes(&NotesSource::None).expect("ok").is_empty());
    }

    #[test]
    fn inline_notes_become_one_entry() {
        let notes = build_release_notes(&NotesSource::Inline("fix bug".to_string())).expect("ok");
        assert_eq!(notes, vec![LocalizedText::en_us("fix bug")]);
        assert_eq!(notes[0].language, "en-US");
    }

    #[test]
    fn file_notes_are_sent_verbatim() {
        let mut file = tempfile::NamedTempFile::new().expect("temp");
        write!(file, "- faster sync\n- fewer crashes\n\n").expect("write");

        let notes = build_release_notes(&NotesSource::File(file.path().to_path_buf())).expect("ok");
        assert_eq!(notes, vec![LocalizedText::en_us("- faster sync\n- fewer crashes\n\n")]);
    }

    #[test]
    fn inline_whitespace_is_preserved() {
        let notes = build_release_notes(&NotesSource::Inline("fix bug ".to_string())).expect("ok");
        assert_eq!(notes[0].text, "fix bug ");

        let notes = build_release_notes(&NotesSource::Inline("  \n".to_string())).expect("ok");
        assert_eq!(notes, vec![LocalizedText::en_us("  \n")]);
    }

    #[test]
    fn unreadable_file_is_an_error() {
        let err = build_release_notes(&NotesSource::File(PathBuf::from("/nonexistent/notes.txt")))
            .expect_err("missing file");
        assert!(err.to_string().contains("/nonexistent/notes.txt"));
    }

    #[test]
    fn empty_notes_are_dropped() {
        let notes = build_release_notes(&NotesSource::Inline(String::new())).expect("ok");
        assert!(notes.is_empty());

        let file = tempfile::NamedTempFile::new().expect("temp");
        let notes = build_release_notes(&NotesSource::File(file.path().to_path_buf())).expect("ok");
        assert!(notes.is_empty());
    }
}
