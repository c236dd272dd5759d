use kyc_types::{DataRecord, FieldKind};
use serde::{Deserialize, Serialize};

/// What the gateway does with a well-formed value it has no record for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FallbackPolicy {
    /// Reject with a "not found" message.
    Strict,
    /// Accept and attach a placeholder record.
    Permissive,
}

/// Fallback policy per verified field kind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FallbackConfig {
    pub identity_number: FallbackPolicy,
    pub tax_id: FallbackPolicy,
    pub account_number: FallbackPolicy,
    pub routing_code: FallbackPolicy,
}

impl Default for FallbackConfig {
    /// Demo behaviour: numbers are accepted when unknown, routing codes
    /// must be in the directory.
    fn default() -> Self {
        Self {
            identity_number: FallbackPolicy::Permissive,
            tax_id: FallbackPolicy::Permissive,
            account_number: FallbackPolicy::Permissive,
            routing_code: FallbackPolicy::Strict,
        }
    }
}

impl FallbackConfig {
    pub fn strict() -> Self {
        Self::uniform(FallbackPolicy::Strict)
    }

    pub fn permissive() -> Self {
        Self::uniform(FallbackPolicy::Permissive)
    }

    fn uniform(policy: FallbackPolicy) -> Self {
        Self {
            identity_number: policy,
            tax_id: policy,
            account_number: policy,
            routing_code: policy,
        }
    }

    /// Documents are never looked up; they report `Strict`.
    pub fn policy_for(&self, kind: FieldKind) -> FallbackPolicy {
        match kind {
            FieldKind::IdentityNumber => self.identity_number,
            FieldKind::TaxId => self.tax_id,
            FieldKind::AccountNumber => self.account_number,
            FieldKind::RoutingCode => self.routing_code,
            FieldKind::DocumentFile => FallbackPolicy::Strict,
        }
    }

    pub fn set(&mut self, kind: FieldKind, policy: FallbackPolicy) {
        match kind {
            FieldKind::IdentityNumber => self.identity_number = policy,
            FieldKind::TaxId => self.tax_id = policy,
            FieldKind::AccountNumber => self.account_number = policy,
            FieldKind::RoutingCode => self.routing_code = policy,
            FieldKind::DocumentFile => {}
        }
    }
}

/// Generic record synthesized for an unknown value under `Permissive`.
pub(crate) fn placeholder_record(kind: FieldKind) -> DataRecord {
    let mut record = match kind {
        FieldKind::IdentityNumber => DataRecord::from_pairs([
            ("name", "Demo User"),
            ("date of birth", "1990-01-01"),
            ("address", "Address on file"),
        ]),
        FieldKind::TaxId => DataRecord::from_pairs([
            ("name", "Demo User"),
            ("status", "Active"),
        ]),
        FieldKind::AccountNumber => DataRecord::from_pairs([
            ("account holder", "Demo User"),
            ("account type", "Savings"),
        ]),
        FieldKind::RoutingCode => DataRecord::from_pairs([
            ("bank", "Demo Bank"),
            ("branch", "Main Branch"),
        ]),
        FieldKind::DocumentFile => DataRecord::new(),
    };
    record.insert("source", "placeholder");
    record
}

/// Message for a well-formed value that is not in the directory.
pub(crate) fn not_found_message(kind: FieldKind) -> String {
    match kind {
        FieldKind::RoutingCode => "Routing code not found in the bank directory".to_string(),
        other => format!("{} not found", other.label()),
    }
}
