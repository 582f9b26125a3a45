//! Reference-line parsing and ordering for the bibliography rebuild.

use once_cell::sync::Lazy;
use regex::Regex;

/// `Surname, I. (Year). Title` — surname is ASCII letters only, so accented
/// surnames fall through to the unparsed branch and keep their text.
static REFERENCE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z]+),\s([A-Za-z\.]+)\.\s\((\d{4})\)\.\s(.+)")
        .expect("reference pattern is valid")
});

/// Splits one reference line into its sort key (author surname) and the text
/// that replaces it. Lines that do not match the expected shape get an empty
/// key and keep their text unchanged.
pub fn format_reference(text: &str) -> (String, String) {
    match REFERENCE_PATTERN.captures(text) {
        Some(caps) => {
            let display = format!("{}, {}. ({}). *{}*", &caps[1], &caps[2], &caps[3], &caps[4]);
            (caps[1].to_string(), display)
        }
        None => (String::new(), text.to_string()),
    }
}

/// Orders the non-blank lines of a bibliography region by author surname.
/// The sort is stable: unparsed lines (empty key) come first, ties keep
/// their original order.
pub fn sort_references<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    let mut entries: Vec<(String, String)> = lines
        .iter()
        .map(AsRef::as_ref)
        .filter(|line| !line.trim().is_empty())
        .map(format_reference)
        .collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    entries.into_iter().map(|(_, display)| display).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_line_is_reformatted() {
        let (key, display) = format_reference("Smith, J. (2019). Memoria y aprendizaje");
        assert_eq!(key, "Smith");
        assert_eq!(display, "Smith, J. (2019). *Memoria y aprendizaje*");
    }

    #[test]
    fn multiple_initials_are_kept() {
        let (key, display) = format_reference("Gonzalez, M.A. (2005). Un estudio");
        assert_eq!(key, "Gonzalez");
        assert_eq!(display, "Gonzalez, M.A. (2005). *Un estudio*");
    }

    #[test]
    fn non_matching_line_is_untouched() {
        let (key, display) = format_reference("An anonymous pamphlet, undated");
        assert_eq!(key, "");
        assert_eq!(display, "An anonymous pamphlet, undated");
    }

    #[test]
    fn accented_surname_does_not_match() {
        // The original pattern is ASCII-only for the surname group.
        let (key, display) = format_reference("Gómez, P. (2010). Título");
        assert_eq!(key, "");
        assert_eq!(display, "Gómez, P. (2010). Título");
    }

    #[test]
    fn year_must_have_four_digits() {
        let (key, _) = format_reference("Smith, J. (19). Short year");
        assert_eq!(key, "");
    }

    #[test]
    fn batch_sorts_by_surname() {
        let lines = [
            "Zeta, A. (2001). Z title",
            "Alpha, B. (1999). A title",
            "Alpha, C. (2000). C title",
        ];
        let sorted = sort_references(&lines);
        assert_eq!(
            sorted,
            vec![
                "Alpha, B. (1999). *A title*",
                "Alpha, C. (2000). *C title*",
                "Zeta, A. (2001). *Z title*",
            ]
        );
    }

    #[test]
    fn unparsed_lines_sort_first_in_input_order() {
        let lines = [
            "Zeta, A. (2001). Z title",
            "segunda línea suelta",
            "primera línea suelta",
        ];
        let sorted = sort_references(&lines);
        assert_eq!(
            sorted,
            vec![
                "segunda línea suelta",
                "primera línea suelta",
                "Zeta, A. (2001). *Z title*",
            ]
        );
    }

    #[test]
    fn blank_lines_are_dropped() {
        let lines = ["", "   ", "Beta, D. (2020). B title"];
        let sorted = sort_references(&lines);
        assert_eq!(sorted, vec!["Beta, D. (2020). *B title*"]);
    }
}
