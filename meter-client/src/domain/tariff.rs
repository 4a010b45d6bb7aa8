use serde::{Deserialize, Serialize};
use std::fmt;

/// Tariff classes the billing system assigns to a meter.
///
/// Labels arrive from the stores as uppercase strings ("DOMESTICO A",
/// "COMERCIAL", ...). An unrecognized label is not an error anywhere in this
/// crate: the classifier falls back to the Domestic A breakpoints for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TariffClass {
    DomesticA,
    DomesticB,
    DomesticC,
    Commercial,
    Industrial,
    PublicMunicipal,
    PublicState,
    PublicFederal,
}

impl TariffClass {
    /// All classes, in tariff-schedule order.
    pub const ALL: [TariffClass; 8] = [
        TariffClass::DomesticA,
        TariffClass::DomesticB,
        TariffClass::DomesticC,
        TariffClass::Commercial,
        TariffClass::Industrial,
        TariffClass::PublicMunicipal,
        TariffClass::PublicState,
        TariffClass::PublicFederal,
    ];

    /// Parse a raw tariff label. Whitespace and case differences are
    /// tolerated; anything else yields `None`.
    pub fn parse(label: &str) -> Option<TariffClass> {
        match label.trim().to_uppercase().as_str() {
            "DOMESTICO A" => Some(TariffClass::DomesticA),
            "DOMESTICO B" => Some(TariffClass::DomesticB),
            "DOMESTICO C" => Some(TariffClass::DomesticC),
            "COMERCIAL" => Some(TariffClass::Commercial),
            "INDUSTRIAL" => Some(TariffClass::Industrial),
            "PUBLICO MUNICIPAL" => Some(TariffClass::PublicMunicipal),
            "PUBLICO ESTATAL" => Some(TariffClass::PublicState),
            "PUBLICO FEDERAL" => Some(TariffClass::PublicFederal),
            _ => None,
        }
    }

    /// Canonical label as the billing system writes it.
    pub fn label(self) -> &'static str {
        match self {
            TariffClass::DomesticA => "DOMESTICO A",
            TariffClass::DomesticB => "DOMESTICO B",
            TariffClass::DomesticC => "DOMESTICO C",
            TariffClass::Commercial => "COMERCIAL",
            TariffClass::Industrial => "INDUSTRIAL",
            TariffClass::PublicMunicipal => "PUBLICO MUNICIPAL",
            TariffClass::PublicState => "PUBLICO ESTATAL",
            TariffClass::PublicFederal => "PUBLICO FEDERAL",
        }
    }
}

impl fmt::Display for TariffClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
