//! Filename sanitization
//!
//! Selected files are renamed to a cleaned name before validation and
//! transfer, and renamed back afterwards unless the transfer consumed them.

/// Clean a filename for storage: whitespace becomes underscores, control
/// and path characters are dropped, and inner extension segments not on the
/// allow-list get an underscore appended so they cannot execute under a
/// double-extension disguise (`report.php.pdf` -> `report.php_.pdf`).
pub fn clean_filename(name: &str, allowed_extensions: &[String]) -> String {
    let mut cleaned = String::with_capacity(name.len());
    let mut last_was_underscore = false;
    let mut last_was_dot = false;

    for ch in name.trim().chars() {
        let mapped = if ch.is_whitespace() {
            Some('_')
        } else if ch.is_control() || matches!(ch, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') {
            None
        } else {
            Some(ch)
        };

        let Some(mapped) = mapped else { continue };

        if mapped == '_' {
            if last_was_underscore {
                continue;
            }
            last_was_underscore = true;
            last_was_dot = false;
        } else if mapped == '.' {
            if last_was_dot {
                continue;
            }
            last_was_dot = true;
            last_was_underscore = false;
        } else {
            last_was_underscore = false;
            last_was_dot = false;
        }

        cleaned.push(mapped);
    }

    let cleaned = cleaned.trim_matches(|c| c == '.' || c == '_').to_string();
    if cleaned.is_empty() {
        return "file".to_string();
    }

    munge_extensions(&cleaned, allowed_extensions)
}

/// Append an underscore to every inner extension segment that is not on the
/// allow-list. The final extension is left alone; the extension validator
/// decides its fate.
fn munge_extensions(name: &str, allowed_extensions: &[String]) -> String {
    if allowed_extensions.is_empty() {
        return name.to_string();
    }

    let parts: Vec<&str> = name.split('.').collect();
    if parts.len() <= 2 {
        return name.to_string();
    }

    let mut out = String::from(parts[0]);
    for segment in &parts[1..parts.len() - 1] {
        out.push('.');
        out.push_str(segment);
        if !allowed_extensions
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(segment))
        {
            out.push('_');
        }
    }
    out.push('.');
    out.push_str(parts[parts.len() - 1]);
    out
}
