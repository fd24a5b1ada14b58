//! KYC (know your customer) definitions.

use derive_more::Debug;
use strum::{AsRefStr, Display, EnumString};

use crate::infra::api::FormPart;

/// Kind of a KYC [`Document`].
///
/// Determines the form field name the [`Document`] is uploaded under.
#[derive(
    AsRefStr, Clone, Copy, Debug, Display, EnumString, Eq, Hash, PartialEq,
)]
#[strum(serialize_all = "snake_case")]
pub enum DocumentKind {
    /// Front side of an identity document.
    IdFront,

    /// Back side of an identity document.
    IdBack,

    /// Photo of the [`User`] holding the identity document.
    ///
    /// [`User`]: crate::domain::User
    Selfie,

    /// Utility bill, bank statement or similar document.
    ProofOfAddress,

    /// Certificate of a business registration.
    BusinessRegistration,
}

/// KYC document to be uploaded.
#[derive(Clone, Debug)]
pub struct Document {
    /// [`DocumentKind`] of this [`Document`].
    pub kind: DocumentKind,

    /// Original name of the file.
    pub file_name: String,

    /// MIME type of the file.
    pub content_type: Option<String>,

    /// Raw content of the file.
    #[debug("{} bytes", content.len())]
    pub content: Vec<u8>,
}

impl From<Document> for FormPart {
    fn from(doc: Document) -> Self {
        Self {
            name: doc.kind.to_string(),
            file_name: Some(doc.file_name),
            content_type: doc.content_type,
            content: doc.content,
        }
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use crate::infra::api::FormPart;

    use super::{Document, DocumentKind};

    #[test]
    fn kind_names_are_snake_case() {
        assert_eq!(DocumentKind::ProofOfAddress.as_ref(), "proof_of_address");
        assert_eq!(
            DocumentKind::from_str("id_front"),
            Ok(DocumentKind::IdFront),
        );
    }

    #[test]
    fn becomes_a_file_part() {
        let part = FormPart::from(Document {
            kind: DocumentKind::Selfie,
            file_name: "me.jpg".into(),
            content_type: Some("image/jpeg".into()),
            content: vec![1, 2, 3],
        });

        assert_eq!(part.name, "selfie");
        assert_eq!(part.file_name.as_deref(), Some("me.jpg"));
        assert!(format!("{part:?}").contains("3 bytes"));
    }
}
