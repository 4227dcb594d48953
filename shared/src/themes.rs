//! Registry of named visual themes.

/// A named visual style for rendered poems.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub name: &'static str,
    /// Photo search query in remote background mode
    pub search_query: &'static str,
    /// File under `{assets}/backgrounds/`
    pub background_file: &'static str,
    /// Solid fill when no background image is available
    pub fallback_color: [u8; 3],
    /// Title and decorative glyphs
    pub accent_color: [u8; 3],
    /// Body and footer text
    pub text_color: [u8; 3],
    /// File under `{assets}/fonts/`
    pub title_font: &'static str,
    /// File under `{assets}/fonts/`
    pub body_font: &'static str,
    pub footer: &'static str,
}

pub const DEFAULT_THEME: &str = "roses";

const THEMES: &[Theme] = &[
    Theme {
        name: "roses",
        search_query: "red roses",
        background_file: "roses.jpg",
        fallback_color: [250, 218, 221],
        accent_color: [200, 16, 46],
        text_color: [60, 20, 30],
        title_font: "GreatVibes-Regular.ttf",
        body_font: "Lora-Regular.ttf",
        footer: "With love, from AI",
    },
    Theme {
        name: "hearts",
        search_query: "pink hearts",
        background_file: "hearts.jpg",
        fallback_color: [255, 228, 236],
        accent_color: [233, 30, 99],
        text_color: [80, 20, 50],
        title_font: "Pacifico-Regular.ttf",
        body_font: "Lora-Regular.ttf",
        footer: "Sealed with a kiss, from AI",
    },
    Theme {
        name: "sunset",
        search_query: "romantic sunset",
        background_file: "sunset.jpg",
        fallback_color: [255, 204, 170],
        accent_color: [214, 84, 36],
        text_color: [70, 35, 20],
        title_font: "GreatVibes-Regular.ttf",
        body_font: "Merriweather-Regular.ttf",
        footer: "Until the sun sets, from AI",
    },
    Theme {
        name: "starlight",
        search_query: "starry night sky",
        background_file: "starlight.jpg",
        fallback_color: [214, 220, 245],
        accent_color: [63, 81, 181],
        text_color: [25, 30, 70],
        title_font: "Pacifico-Regular.ttf",
        body_font: "Merriweather-Regular.ttf",
        footer: "Written in the stars, from AI",
    },
    Theme {
        name: "vintage",
        search_query: "vintage love letter",
        background_file: "vintage.jpg",
        fallback_color: [240, 228, 205],
        accent_color: [128, 72, 40],
        text_color: [60, 45, 30],
        title_font: "GreatVibes-Regular.ttf",
        body_font: "Lora-Regular.ttf",
        footer: "Yours truly, from AI",
    },
];

/// Theme names in registry order.
pub fn names() -> Vec<&'static str> {
    THEMES.iter().map(|t| t.name).collect()
}

/// Look up a theme by exact name.
pub fn find(name: &str) -> Option<&'static Theme> {
    THEMES.iter().find(|t| t.name == name)
}

pub fn default_theme() -> &'static Theme {
    find(DEFAULT_THEME).unwrap_or(&THEMES[0])
}

/// Resolve a requested theme, falling back to the default for unknown names.
pub fn resolve(name: Option<&str>) -> &'static Theme {
    name.map(|n| n.trim().to_ascii_lowercase())
        .and_then(|n| find(&n))
        .unwrap_or_else(default_theme)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_order() {
        assert_eq!(names(), vec!["roses", "hearts", "sunset", "starlight", "vintage"]);
    }

    #[test]
    fn test_resolve() {
        assert_eq!(resolve(Some("sunset")).name, "sunset");
        assert_eq!(resolve(Some(" Hearts ")).name, "hearts");
        assert_eq!(resolve(Some("disco")).name, DEFAULT_THEME);
        assert_eq!(resolve(None).name, DEFAULT_THEME);
    }

    #[test]
    fn test_names_unique() {
        let mut names = names();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), THEMES.len());
    }
}
