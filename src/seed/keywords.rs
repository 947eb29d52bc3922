//! Category keywords used by the seed data
//!
//! Seed entries describe themselves with loose keywords ("photo editing",
//! "vector") rather than category slugs. This table maps each keyword to
//! the slug of the category it belongs to.

const KEYWORDS: &[(&str, &str)] = &[
    // Productivity
    ("office", "office-suites"),
    ("office suite", "office-suites"),
    ("documents", "office-suites"),
    ("word processing", "office-suites"),
    ("spreadsheet", "office-suites"),
    ("presentation", "office-suites"),
    ("notes", "note-taking"),
    ("note taking", "note-taking"),
    ("knowledge base", "note-taking"),
    ("wiki", "note-taking"),
    ("project management", "project-management"),
    ("kanban", "project-management"),
    ("tasks", "project-management"),
    ("issue tracking", "project-management"),
    // Communication
    ("chat", "team-chat"),
    ("team chat", "team-chat"),
    ("messaging", "team-chat"),
    ("video conferencing", "video-conferencing"),
    ("video calls", "video-conferencing"),
    ("meetings", "video-conferencing"),
    ("email", "email"),
    ("mail client", "email"),
    // Design
    ("graphics", "graphics-design"),
    ("photo editing", "image-editing"),
    ("image editing", "image-editing"),
    ("raster", "image-editing"),
    ("painting", "image-editing"),
    ("vector", "vector-graphics"),
    ("illustration", "vector-graphics"),
    ("ui design", "ui-design"),
    ("prototyping", "ui-design"),
    ("3d", "3d-modeling"),
    ("3d modeling", "3d-modeling"),
    ("animation", "3d-modeling"),
    // Media
    ("video editing", "video-editing"),
    ("audio editing", "audio-editing"),
    ("recording", "audio-editing"),
    ("streaming", "media-servers"),
    ("media server", "media-servers"),
    // Development
    ("code editor", "code-editors"),
    ("ide", "code-editors"),
    ("version control", "developer-tools"),
    ("git hosting", "developer-tools"),
    ("api testing", "developer-tools"),
    ("ci", "developer-tools"),
    // Infrastructure
    ("file sync", "cloud-storage"),
    ("cloud storage", "cloud-storage"),
    ("file sharing", "cloud-storage"),
    ("password manager", "security"),
    ("passwords", "security"),
    ("vpn", "security"),
    ("analytics", "analytics"),
    ("web analytics", "analytics"),
    ("dashboards", "analytics"),
    ("business intelligence", "analytics"),
    ("automation", "automation"),
    ("workflows", "automation"),
    ("integrations", "automation"),
    // Web
    ("cms", "web-publishing"),
    ("blogging", "web-publishing"),
    ("website builder", "web-publishing"),
    ("forms", "web-publishing"),
    ("surveys", "web-publishing"),
    ("browser", "web-browsers"),
];

/// Category slug for a keyword (case-insensitive)
pub fn category_for_keyword(keyword: &str) -> Option<&'static str> {
    let keyword = keyword.trim().to_lowercase();
    KEYWORDS
        .iter()
        .find(|(k, _)| *k == keyword)
        .map(|(_, slug)| *slug)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::data::CATEGORIES;

    #[test]
    fn test_lookup_ignores_case() {
        assert_eq!(category_for_keyword("Photo Editing"), Some("image-editing"));
        assert_eq!(category_for_keyword(" kanban "), Some("project-management"));
        assert_eq!(category_for_keyword("quantum"), None);
    }

    #[test]
    fn test_every_target_is_a_seeded_category() {
        for (keyword, slug) in KEYWORDS {
            assert!(
                CATEGORIES.iter().any(|c| c.slug == *slug),
                "keyword '{keyword}' points at unknown category '{slug}'"
            );
        }
    }
}
