//! Small utility helpers used across modules.

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values.
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = tpl.to_string();
  for (k, v) in pairs {
    let needle = format!("{{{}}}", k);
    out = out.replace(&needle, v);
  }
  out
}

/// Normalize a club or player name for loose comparison:
/// lowercase, common Latin accents folded, punctuation dropped, whitespace collapsed.
pub fn normalize_name(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  for ch in s.chars().flat_map(char::to_lowercase) {
    let folded = fold_accent(ch);
    if folded.is_alphanumeric() {
      out.push(folded);
    } else if (folded.is_whitespace() || folded == '-') && !out.ends_with(' ') && !out.is_empty() {
      out.push(' ');
    }
  }
  out.trim_end().to_string()
}

fn fold_accent(ch: char) -> char {
  match ch {
    'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' => 'a',
    'é' | 'è' | 'ê' | 'ë' => 'e',
    'í' | 'ì' | 'î' | 'ï' => 'i',
    'ó' | 'ò' | 'ô' | 'ö' | 'õ' | 'ø' => 'o',
    'ú' | 'ù' | 'û' | 'ü' => 'u',
    'ç' | 'č' | 'ć' => 'c',
    'ñ' | 'ń' => 'n',
    'š' | 'ś' => 's',
    'ž' | 'ź' | 'ż' => 'z',
    'ł' => 'l',
    'ý' | 'ÿ' => 'y',
    'ř' => 'r',
    other => other,
  }
}

/// Log-safe truncation for large strings (char boundary aware).
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.chars().count() <= max {
    s.to_string()
  } else {
    let head: String = s.chars().take(max).collect();
    format!("{}… ({} bytes total)", head, s.len())
  }
}
