//! Gate for inbound message bodies: reject anything the response processor should never see.

use crate::config::ValidationConfig;

/// Inbound body rejected by [`ResponseValidator::validate`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidPayload {
    #[error("message body missing")]
    Missing,
    #[error("message body empty")]
    Empty,
    #[error("message body too long: {len} chars (max {max})")]
    TooLong { len: usize, max: usize },
    #[error("message body contains control character U+{0:04X}")]
    ControlCharacter(u32),
}

/// Content rules for inbound bodies, built once from configuration.
#[derive(Debug, Clone)]
pub struct ResponseValidator {
    max_len: usize,
}

impl Default for ResponseValidator {
    fn default() -> Self {
        Self::new(&ValidationConfig::default())
    }
}

impl ResponseValidator {
    pub fn new(config: &ValidationConfig) -> Self {
        Self {
            max_len: config.max_body_length,
        }
    }

    pub fn validate(&self, body: Option<&str>) -> Result<(), InvalidPayload> {
        let body = body.ok_or(InvalidPayload::Missing)?;
        if body.trim().is_empty() {
            return Err(InvalidPayload::Empty);
        }
        let len = body.chars().count();
        if len > self.max_len {
            return Err(InvalidPayload::TooLong {
                len,
                max: self.max_len,
            });
        }
        if let Some(c) = body
            .chars()
            .find(|c| c.is_control() && !matches!(c, '\n' | '\r' | '\t'))
        {
            return Err(InvalidPayload::ControlCharacter(c as u32));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator(max: usize) -> ResponseValidator {
        ResponseValidator::new(&ValidationConfig {
            max_body_length: max,
        })
    }

    #[test]
    fn accepts_plain_text() {
        assert_eq!(ResponseValidator::default().validate(Some("YES")), Ok(()));
        assert_eq!(
            ResponseValidator::default().validate(Some("line one\nline two\t!")),
            Ok(())
        );
    }

    #[test]
    fn rejects_missing_and_blank() {
        let v = ResponseValidator::default();
        assert_eq!(v.validate(None), Err(InvalidPayload::Missing));
        assert_eq!(v.validate(Some("")), Err(InvalidPayload::Empty));
        assert_eq!(v.validate(Some("  \n ")), Err(InvalidPayload::Empty));
    }

    #[test]
    fn rejects_over_limit_by_chars() {
        let v = validator(4);
        assert_eq!(v.validate(Some("éééé")), Ok(()));
        assert_eq!(
            v.validate(Some("hello")),
            Err(InvalidPayload::TooLong { len: 5, max: 4 })
        );
    }

    #[test]
    fn rejects_control_characters() {
        assert_eq!(
            ResponseValidator::default().validate(Some("a\u{0}b")),
            Err(InvalidPayload::ControlCharacter(0))
        );
    }
}
