use crate::error::{Result, ServerTimingError};

/// HTTP `tchar`: the characters a Server-Timing metric name may contain.
fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '!' | '#' | '$' | '%' | '&' | '\'' | '*' | '+' | '-' | '.' | '^' | '_' | '`' | '|' | '~'
        )
}

pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(is_token_char)
}

pub(crate) fn validate_name(name: &str) -> Result<()> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(ServerTimingError::InvalidName {
            name: name.to_owned(),
        })
    }
}
