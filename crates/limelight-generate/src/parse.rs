//! Extraction of JSON payloads from model output.
//!
//! The collaborator is asked for bare JSON but routinely wraps it in prose
//! or code fences. The outermost object/array slice is what we parse.

/// Slice out the outermost `{ … }` of `text`, if any.
pub fn extract_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// Slice out the outermost `[ … ]` of `text`, if any.
pub fn extract_array(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}
