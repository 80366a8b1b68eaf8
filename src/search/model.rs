use serde::Deserialize;

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct PhotoUrls {
    /// Thumbnail shown in the result grid
    pub small: String,
    /// Display size handed to the editor
    pub regular: String,
    /// Original resolution used for downloads
    pub full: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Photo {
    pub id: String,
    pub urls: PhotoUrls,
    #[serde(default)]
    pub alt_description: Option<String>,
}

impl Photo {
    pub fn alt_text(&self) -> &str {
        self.alt_description.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub total: u64,
    pub results: Vec<Photo>,
}

pub fn parse_search_page(body: &[u8]) -> Result<SearchPage, serde_json::Error> {
    serde_json::from_slice(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "total": 2,
        "total_pages": 1,
        "results": [
            {
                "id": "eOLpJytrbsQ",
                "width": 4000,
                "alt_description": "a gray cat on a sofa",
                "urls": {
                    "raw": "https://images.unsplash.com/photo-1?ixid=1",
                    "full": "https://images.unsplash.com/photo-1?q=85",
                    "regular": "https://images.unsplash.com/photo-1?w=1080",
                    "small": "https://images.unsplash.com/photo-1?w=400",
                    "thumb": "https://images.unsplash.com/photo-1?w=200"
                }
            },
            {
                "id": "xyz",
                "alt_description": null,
                "urls": { "full": "f", "regular": "r", "small": "s" }
            }
        ]
    }"#;

    #[test]
    fn parses_results_in_order_and_ignores_unknown_fields() {
        let page = parse_search_page(SAMPLE.as_bytes()).unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.results.len(), 2);
        assert_eq!(page.results[0].id, "eOLpJytrbsQ");
        assert_eq!(page.results[0].urls.small, "https://images.unsplash.com/photo-1?w=400");
        assert_eq!(page.results[0].alt_text(), "a gray cat on a sofa");
        assert_eq!(page.results[1].alt_text(), "");
    }

    #[test]
    fn missing_results_is_an_error() {
        assert!(parse_search_page(br#"{ "errors": ["OAuth error"] }"#).is_err());
    }
}
