//! XPath 1.0 string literal encoding.
//!
//! XPath 1.0 has no escape syntax inside string literals, so text holding
//! both quote characters has to be assembled with `concat()`.

/// Encode `text` as an XPath string-valued expression.
///
/// - No `"` in the text: `"text"`
/// - No `'` in the text: `'text'`
/// - Both quotes present: `concat("a",'"',"b")`, splitting on `"`
pub fn encode(text: &str) -> String {
    if !text.contains('"') {
        return format!("\"{}\"", text);
    }
    if !text.contains('\'') {
        return format!("'{}'", text);
    }

    let parts: Vec<String> = text.split('"').map(|part| format!("\"{}\"", part)).collect();
    format!("concat({})", parts.join(",'\"',"))
}
