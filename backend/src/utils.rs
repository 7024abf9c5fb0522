const WATCH_URL: &str = "https://www.youtube.com/watch?v=";

pub fn video_url(video_id: &str) -> String {
    format!("{WATCH_URL}{video_id}")
}

/// Hashtag-like tokens of a description: whitespace separated words containing `#`.
pub fn extract_hashtags(description: &str) -> Vec<String> {
    description
        .split_whitespace()
        .filter(|token| token.contains('#'))
        .map(|token| token.trim().to_string())
        .collect()
}

/// Declared tags first, then the ones found in the description. Duplicates are kept.
pub fn merge_tags(declared: Option<&[String]>, description: &str) -> Vec<String> {
    let mut tags: Vec<String> = declared.map(<[String]>::to_vec).unwrap_or_default();
    tags.extend(extract_hashtags(description));
    tags
}

/// Parse a count the Data API delivers as a decimal string.
pub fn parse_count(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}
