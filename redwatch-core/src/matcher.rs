use regex::Regex;
use tracing::warn;

/// Returns the subset of `keywords` found in `text`, original casing
/// preserved, without duplicates. Matching is case-insensitive and
/// whole-word: `VA` hits "Need a VA" but not "trivial" or "IVA".
/// Keyword special characters are matched literally.
pub fn find_keywords(text: &str, keywords: &[String]) -> Vec<String> {
    let mut found = Vec::new();

    for keyword in keywords {
        let pattern = format!(r"(?i)\b{}\b", regex::escape(keyword));
        let re = match Regex::new(&pattern) {
            Ok(re) => re,
            Err(e) => {
                // A bad keyword never aborts the whole scan.
                warn!("Skipping keyword {:?}: pattern failed to compile: {}", keyword, e);
                continue;
            }
        };

        if re.is_match(text) && !found.contains(keyword) {
            found.push(keyword.clone());
        }
    }

    found
}
