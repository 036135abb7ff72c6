//! Catalog of named ad formats.
//!
//! The catalog is the single source of truth for output pixel dimensions; the
//! composer never hard-codes a width/height outside this table.

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FormatSpec {
    pub name: String,
    pub width: u32,
    pub height: u32,
}

impl FormatSpec {
    fn new(name: &str, width: u32, height: u32) -> Self {
        Self {
            name: name.to_string(),
            width,
            height,
        }
    }
}

/// Ordered, fixed set of target formats. No lifecycle beyond process start.
pub fn list_formats() -> Vec<FormatSpec> {
    vec![
        FormatSpec::new("Instagram", 1080, 1080),
        FormatSpec::new("Facebook", 1200, 628),
        FormatSpec::new("Retail", 300, 250),
    ]
}

/// The format a fresh document starts in (first catalog entry).
pub fn default_format() -> FormatSpec {
    list_formats().remove(0)
}

/// Case-sensitive catalog lookup by format name.
pub fn find_format(name: &str) -> Option<FormatSpec> {
    list_formats().into_iter().find(|f| f.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_ordered_and_nonzero() {
        let formats = list_formats();
        assert_eq!(
            formats.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(),
            ["Instagram", "Facebook", "Retail"]
        );
        for f in &formats {
            assert!(f.width > 0 && f.height > 0);
        }
    }

    #[test]
    fn default_format_is_instagram_square() {
        let f = default_format();
        assert_eq!(f.name, "Instagram");
        assert_eq!((f.width, f.height), (1080, 1080));
    }

    #[test]
    fn find_format_hits_and_misses() {
        assert_eq!(find_format("Facebook").unwrap().width, 1200);
        assert!(find_format("Billboard").is_none());
    }

    #[test]
    fn format_json_roundtrip() {
        let f = find_format("Retail").unwrap();
        let s = serde_json::to_string(&f).unwrap();
        let de: FormatSpec = serde_json::from_str(&s).unwrap();
        assert_eq!(de, f);
    }
}
