//! Catalog of services offered at the front desk.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// One service a citizen can request at intake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    /// Single registry (CadÚnico) enrollment or update.
    SingleRegistry,
    /// Bolsa Família cash-transfer enquiries.
    BolsaFamilia,
    /// Continuous cash benefit (BPC) guidance.
    ContinuousBenefit,
    /// Referral to a social assistance reference centre.
    SocialAssistance,
    /// Housing programme enrollment.
    Housing,
    /// Identity documents.
    IdentityDocuments,
    /// Property tax (IPTU) matters.
    PropertyTax,
    /// Complaints and ombudsman.
    Ombudsman,
    /// Anything not listed above.
    Other,
}

impl ServiceType {
    /// Every offered service in catalog order. The first entry is the intake
    /// form default.
    pub const ALL: [ServiceType; 9] = [
        ServiceType::SingleRegistry,
        ServiceType::BolsaFamilia,
        ServiceType::ContinuousBenefit,
        ServiceType::SocialAssistance,
        ServiceType::Housing,
        ServiceType::IdentityDocuments,
        ServiceType::PropertyTax,
        ServiceType::Ombudsman,
        ServiceType::Other,
    ];

    /// Stable storage code.
    pub fn code(self) -> &'static str {
        match self {
            Self::SingleRegistry => "single_registry",
            Self::BolsaFamilia => "bolsa_familia",
            Self::ContinuousBenefit => "continuous_benefit",
            Self::SocialAssistance => "social_assistance",
            Self::Housing => "housing",
            Self::IdentityDocuments => "identity_documents",
            Self::PropertyTax => "property_tax",
            Self::Ombudsman => "ombudsman",
            Self::Other => "other",
        }
    }

    /// Human-readable label used on screen and in exports.
    pub fn label(self) -> &'static str {
        match self {
            Self::SingleRegistry => "Cadastro/Atualização CadÚnico",
            Self::BolsaFamilia => "Bolsa Família",
            Self::ContinuousBenefit => "BPC",
            Self::SocialAssistance => "Encaminhamento CRAS",
            Self::Housing => "Programa Habitacional",
            Self::IdentityDocuments => "Documentos de Identificação",
            Self::PropertyTax => "IPTU",
            Self::Ombudsman => "Ouvidoria",
            Self::Other => "Outros",
        }
    }

    /// Resolves a storage code.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|service| service.code() == code)
    }
}

impl Default for ServiceType {
    fn default() -> Self {
        Self::ALL[0]
    }
}

impl Display for ServiceType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownServiceError(pub String);

impl Display for UnknownServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let codes = ServiceType::ALL
            .iter()
            .map(|service| service.code())
            .collect::<Vec<_>>()
            .join("|");
        write!(f, "unknown service `{}`; expected {codes}", self.0)
    }
}

impl Error for UnknownServiceError {}

/// Accepts either the storage code or the label (case-insensitive).
impl FromStr for ServiceType {
    type Err = UnknownServiceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|service| {
                service.code() == normalized || service.label().to_lowercase() == normalized
            })
            .ok_or_else(|| UnknownServiceError(value.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::ServiceType;

    #[test]
    fn codes_round_trip_and_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for service in ServiceType::ALL {
            assert!(seen.insert(service.code()));
            assert_eq!(ServiceType::from_code(service.code()), Some(service));
        }
    }

    #[test]
    fn parses_code_or_label() {
        assert_eq!("iptu".parse::<ServiceType>().unwrap(), ServiceType::PropertyTax);
        assert_eq!(
            " HOUSING ".parse::<ServiceType>().unwrap(),
            ServiceType::Housing
        );
        assert!("parking".parse::<ServiceType>().is_err());
    }
}
