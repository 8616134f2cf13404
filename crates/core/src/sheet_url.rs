use regex::Regex;
use std::sync::OnceLock;

fn re_sheet_id() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"/spreadsheets/d/([a-zA-Z0-9-_]+)").expect("invalid regex"))
}

/// Pull the spreadsheet ID out of a Google Sheets URL. Bare IDs (no slashes)
/// are returned as-is so the caller can accept either form.
pub fn extract_spreadsheet_id(input: &str) -> Option<String> {
    let input = input.trim();
    if let Some(caps) = re_sheet_id().captures(input) {
        return Some(caps[1].to_string());
    }
    if !input.is_empty()
        && input
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Some(input.to_string());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_from_full_url() {
        let url = "https://docs.google.com/spreadsheets/d/1abc123DEF-456_ghi/edit#gid=0";
        assert_eq!(
            extract_spreadsheet_id(url).as_deref(),
            Some("1abc123DEF-456_ghi")
        );
    }

    #[test]
    fn accepts_bare_id() {
        assert_eq!(
            extract_spreadsheet_id("1abc123DEF-456_ghi").as_deref(),
            Some("1abc123DEF-456_ghi")
        );
    }

    #[test]
    fn rejects_unrelated_url() {
        assert_eq!(extract_spreadsheet_id("https://example.com/doc/1"), None);
        assert_eq!(extract_spreadsheet_id(""), None);
    }
}
