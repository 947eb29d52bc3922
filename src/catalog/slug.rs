//! Slug generation

/// Turn a display name into a URL-safe slug.
///
/// ASCII letters and digits are kept (lowercased), a few symbols that carry
/// meaning in product names are spelled out, and every other run of
/// characters collapses into a single `-`.
pub fn slugify(name: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            current.push(c.to_ascii_lowercase());
            continue;
        }

        if !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }

        match c {
            '+' => words.push("plus".to_string()),
            '#' => words.push("sharp".to_string()),
            '&' => words.push("and".to_string()),
            _ => {}
        }
    }

    if !current.is_empty() {
        words.push(current);
    }

    words.join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic() {
        assert_eq!(slugify("LibreOffice"), "libreoffice");
        assert_eq!(slugify("GNU Image Manipulation Program"), "gnu-image-manipulation-program");
        assert_eq!(slugify("  Visual   Studio Code  "), "visual-studio-code");
    }

    #[test]
    fn test_symbols() {
        assert_eq!(slugify("Notepad++"), "notepad-plus-plus");
        assert_eq!(slugify("C#"), "c-sharp");
        assert_eq!(slugify("Tom & Jerry"), "tom-and-jerry");
        assert_eq!(slugify("draw.io"), "draw-io");
    }

    #[test]
    fn test_non_ascii_collapses() {
        assert_eq!(slugify("Café Ölß"), "caf-l");
        assert_eq!(slugify("---"), "");
        assert_eq!(slugify(""), "");
    }
}
