use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Semantic type of a validated input.
///
/// The kind selects the validator rule, the verification record schema and
/// the fallback policy the gateway applies to well-formed unknown values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldKind {
    /// 12-digit national identity number.
    IdentityNumber,
    /// 10-character tax identifier (`AAAAA9999A`).
    TaxId,
    /// 9–18 digit bank account number.
    AccountNumber,
    /// 11-character bank routing code (`AAAA0XXXXXX`).
    RoutingCode,
    /// An uploaded document image or PDF.
    DocumentFile,
}

impl FieldKind {
    /// Every kind entered as text, in form order.
    pub const TEXT_KINDS: [FieldKind; 4] = [
        Self::IdentityNumber,
        Self::TaxId,
        Self::AccountNumber,
        Self::RoutingCode,
    ];

    /// Whether a format-valid value must also pass the verification gateway.
    pub fn requires_verification(&self) -> bool {
        !matches!(self, Self::DocumentFile)
    }

    /// Whether the kind is entered as text (as opposed to a file).
    pub fn is_text(&self) -> bool {
        !matches!(self, Self::DocumentFile)
    }

    /// Human-readable label, used as the subject of validation messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::IdentityNumber => "Identity number",
            Self::TaxId => "Tax ID",
            Self::AccountNumber => "Account number",
            Self::RoutingCode => "Routing code",
            Self::DocumentFile => "Document",
        }
    }

    /// Maximum number of characters an input control should accept.
    pub fn max_length(&self) -> Option<usize> {
        match self {
            Self::IdentityNumber => Some(12),
            Self::TaxId => Some(10),
            Self::AccountNumber => Some(18),
            Self::RoutingCode => Some(11),
            Self::DocumentFile => None,
        }
    }

    /// Stable kebab-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IdentityNumber => "identity-number",
            Self::TaxId => "tax-id",
            Self::AccountNumber => "account-number",
            Self::RoutingCode => "routing-code",
            Self::DocumentFile => "document-file",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldKind {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "identity-number" => Ok(Self::IdentityNumber),
            "tax-id" => Ok(Self::TaxId),
            "account-number" => Ok(Self::AccountNumber),
            "routing-code" => Ok(Self::RoutingCode),
            "document-file" => Ok(Self::DocumentFile),
            other => Err(TypeError::UnknownFieldKind(other.to_string())),
        }
    }
}

/// Attachment slot for an uploaded document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentSlot {
    /// Scan of the identity card.
    IdentityDocument,
    /// Scan of the tax card.
    TaxDocument,
}

impl DocumentSlot {
    pub const ALL: [DocumentSlot; 2] = [Self::IdentityDocument, Self::TaxDocument];

    pub fn label(&self) -> &'static str {
        match self {
            Self::IdentityDocument => "Identity document",
            Self::TaxDocument => "Tax document",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IdentityDocument => "identity-document",
            Self::TaxDocument => "tax-document",
        }
    }
}

impl fmt::Display for DocumentSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentSlot {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "identity-document" => Ok(Self::IdentityDocument),
            "tax-document" => Ok(Self::TaxDocument),
            other => Err(TypeError::UnknownDocumentSlot(other.to_string())),
        }
    }
}

/// Validation status of a single field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldStatus {
    /// No input.
    #[default]
    Idle,
    /// Format accepted; waiting on the verification gateway.
    Validating,
    /// Format accepted and verified.
    Valid,
    /// Rejected by the format rule or the gateway.
    Invalid,
}

impl FieldStatus {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Validating)
    }
}

impl fmt::Display for FieldStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Validating => write!(f, "validating"),
            Self::Valid => write!(f, "valid"),
            Self::Invalid => write!(f, "invalid"),
        }
    }
}
