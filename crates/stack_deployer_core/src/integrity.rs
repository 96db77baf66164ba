use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IntegrityStatus {
    Authentic,
    Corrupted,
}

impl IntegrityStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Authentic => "AUTHENTIC",
            Self::Corrupted => "CORRUPTED",
        }
    }
}

/// Byte-for-byte comparison of the regenerated reference template against the
/// deployed one. A deployed template that is missing altogether is corrupted.
pub fn classify_templates(reference: &[u8], deployed: Option<&[u8]>) -> IntegrityStatus {
    match deployed {
        Some(deployed) if deployed == reference => IntegrityStatus::Authentic,
        _ => IntegrityStatus::Corrupted,
    }
}

pub fn template_digest(contents: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(contents);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &[u8] = b"AWSTemplateFormatVersion: '2010-09-09'\nResources: {}\n";

    #[test]
    fn identical_templates_are_authentic() {
        assert_eq!(
            classify_templates(TEMPLATE, Some(TEMPLATE)),
            IntegrityStatus::Authentic
        );
    }

    #[test]
    fn single_byte_difference_is_corrupted() {
        for index in [0, TEMPLATE.len() / 2, TEMPLATE.len() - 1] {
            let mut tampered = TEMPLATE.to_vec();
            tampered[index] ^= 0x01;
            assert_eq!(
                classify_templates(TEMPLATE, Some(&tampered)),
                IntegrityStatus::Corrupted,
                "byte {index} flipped"
            );
        }
    }

    #[test]
    fn truncated_or_missing_template_is_corrupted() {
        assert_eq!(
            classify_templates(TEMPLATE, Some(&TEMPLATE[..TEMPLATE.len() - 1])),
            IntegrityStatus::Corrupted
        );
        assert_eq!(classify_templates(TEMPLATE, None), IntegrityStatus::Corrupted);
    }

    #[test]
    fn status_serializes_uppercase() {
        assert_eq!(
            serde_json::to_string(&IntegrityStatus::Authentic).unwrap(),
            "\"AUTHENTIC\""
        );
        assert_eq!(IntegrityStatus::Corrupted.as_str(), "CORRUPTED");
    }

    #[test]
    fn digest_is_hex_sha256() {
        let digest = template_digest(b"");
        assert_eq!(
            digest,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
