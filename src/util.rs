//! Small utility helpers used across modules.

/// True if the string is empty or whitespace-only. Authoring treats such
/// fields as not filled in.
pub fn is_blank(s: &str) -> bool {
  s.trim().is_empty()
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge request/response payloads.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    s.to_string()
  } else {
    let cut = s.char_indices().take_while(|(i, _)| *i < max).map(|(i, c)| i + c.len_utf8()).last().unwrap_or(0);
    format!("{}… ({} bytes total)", &s[..cut], s.len())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn blank_detection() {
    assert!(is_blank(""));
    assert!(is_blank("   \t"));
    assert!(!is_blank(" a "));
  }

  #[test]
  fn truncation_keeps_short_strings_intact() {
    assert_eq!(trunc_for_log("abc", 10), "abc");
    assert!(trunc_for_log(&"x".repeat(100), 10).contains("100 bytes"));
  }
}
