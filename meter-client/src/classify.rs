use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::domain::TariffClass;

/// Consumption status band for one meter over a window.
///
/// Ordered from no consumption to excessive; `color_hex` carries the
/// presentation color the dashboards paint markers and widgets with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConsumptionTier {
    Zero,
    Low,
    Regular,
    Normal,
    High,
    VeryHigh,
}

impl ConsumptionTier {
    /// Display color for this tier.
    ///
    /// The historical dashboards disagreed on two of the hex values between
    /// versions; this is the single palette kept going forward.
    pub fn color_hex(self) -> &'static str {
        match self {
            ConsumptionTier::Zero => "#FFFFFF",
            ConsumptionTier::Low => "#FF8C00",
            ConsumptionTier::Regular => "#00FF00",
            ConsumptionTier::Normal => "#32CD32",
            ConsumptionTier::High => "#B22222",
            ConsumptionTier::VeryHigh => "#FF0000",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ConsumptionTier::Zero => "ZERO",
            ConsumptionTier::Low => "LOW",
            ConsumptionTier::Regular => "REGULAR",
            ConsumptionTier::Normal => "NORMAL",
            ConsumptionTier::High => "HIGH",
            ConsumptionTier::VeryHigh => "VERY_HIGH",
        }
    }
}

impl fmt::Display for ConsumptionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Four ascending breakpoints partitioning positive consumption into the
/// `Low..=VeryHigh` bands. A value equal to a breakpoint falls in the lower
/// band.
pub type Breakpoints = [f64; 4];

#[derive(thiserror::Error, Debug)]
pub enum ThresholdError {
    #[error("unknown tariff class '{0}' in threshold table")]
    UnknownClass(String),
    #[error("breakpoints for {class} must be four strictly ascending positive values, got {values:?}")]
    InvalidBreakpoints { class: String, values: Vec<f64> },
}

/// Per-class classification breakpoints.
///
/// `Default` is the canonical table used across all deployments; the service
/// config may override individual classes. Overrides are validated here,
/// once, so `classify` itself can stay total.
#[derive(Debug, Clone, PartialEq)]
pub struct TierThresholds {
    by_class: HashMap<TariffClass, Breakpoints>,
}

impl Default for TierThresholds {
    fn default() -> Self {
        let mut by_class = HashMap::new();
        by_class.insert(TariffClass::DomesticA, [5.0, 10.0, 15.0, 30.0]);
        by_class.insert(TariffClass::DomesticB, [10.0, 20.0, 30.0, 50.0]);
        by_class.insert(TariffClass::DomesticC, [15.0, 30.0, 45.0, 70.0]);
        by_class.insert(TariffClass::Commercial, [20.0, 40.0, 60.0, 100.0]);
        by_class.insert(TariffClass::Industrial, [50.0, 100.0, 150.0, 250.0]);
        by_class.insert(TariffClass::PublicMunicipal, [30.0, 60.0, 90.0, 150.0]);
        by_class.insert(TariffClass::PublicState, [30.0, 60.0, 90.0, 150.0]);
        by_class.insert(TariffClass::PublicFederal, [30.0, 60.0, 90.0, 150.0]);
        TierThresholds { by_class }
    }
}

impl TierThresholds {
    /// Canonical table plus per-class overrides keyed by raw tariff label,
    /// as they appear in the service config.
    pub fn from_overrides(overrides: &HashMap<String, Vec<f64>>) -> Result<Self, ThresholdError> {
        let mut table = TierThresholds::default();
        for (label, values) in overrides {
            let class = TariffClass::parse(label)
                .ok_or_else(|| ThresholdError::UnknownClass(label.clone()))?;
            let ascending = values.len() == 4
                && values[0] > 0.0
                && values.windows(2).all(|w| w[0] < w[1]);
            if !ascending {
                return Err(ThresholdError::InvalidBreakpoints {
                    class: class.label().to_string(),
                    values: values.clone(),
                });
            }
            table
                .by_class
                .insert(class, [values[0], values[1], values[2], values[3]]);
        }
        Ok(table)
    }

    /// Breakpoints for a class. Classes absent from the table use the
    /// Domestic A vector, which is also the fallback for unparsed labels.
    pub fn breakpoints(&self, class: Option<TariffClass>) -> Breakpoints {
        class
            .and_then(|c| self.by_class.get(&c))
            .copied()
            .unwrap_or(DOMESTIC_A_BREAKPOINTS)
    }

    /// Map a raw tariff label and a window consumption onto a tier.
    ///
    /// Total over all input:
    /// - missing or non-finite consumption counts as zero,
    /// - consumption <= 0 is `Zero` for every class,
    /// - an unrecognized or missing label classifies with the Domestic A
    ///   breakpoints,
    /// - a value equal to a breakpoint falls in the lower band.
    pub fn classify(&self, tariff_class: Option<&str>, consumption: Option<f64>) -> ConsumptionTier {
        let value = consumption.filter(|v| v.is_finite()).unwrap_or(0.0);
        if value <= 0.0 {
            return ConsumptionTier::Zero;
        }
        let class = tariff_class.and_then(TariffClass::parse);
        let bp = self.breakpoints(class);
        if value <= bp[0] {
            ConsumptionTier::Low
        } else if value <= bp[1] {
            ConsumptionTier::Regular
        } else if value <= bp[2] {
            ConsumptionTier::Normal
        } else if value <= bp[3] {
            ConsumptionTier::High
        } else {
            ConsumptionTier::VeryHigh
        }
    }
}

/// Fallback breakpoints, shared by Domestic A and every unrecognized class.
const DOMESTIC_A_BREAKPOINTS: Breakpoints = [5.0, 10.0, 15.0, 30.0];

static CANONICAL: Lazy<TierThresholds> = Lazy::new(TierThresholds::default);

/// Classify against the canonical threshold table.
pub fn classify(tariff_class: Option<&str>, consumption: Option<f64>) -> ConsumptionTier {
    CANONICAL.classify(tariff_class, consumption)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_and_negative_consumption_is_zero_for_every_class() {
        for class in TariffClass::ALL {
            assert_eq!(classify(Some(class.label()), Some(0.0)), ConsumptionTier::Zero);
            assert_eq!(classify(Some(class.label()), Some(-5.0)), ConsumptionTier::Zero);
        }
        assert_eq!(classify(None, Some(-1.0)), ConsumptionTier::Zero);
    }

    #[test]
    fn missing_and_non_finite_consumption_count_as_zero() {
        assert_eq!(classify(Some("DOMESTICO A"), None), ConsumptionTier::Zero);
        assert_eq!(classify(Some("DOMESTICO A"), Some(f64::NAN)), ConsumptionTier::Zero);
        assert_eq!(
            classify(Some("DOMESTICO A"), Some(f64::INFINITY)),
            ConsumptionTier::Zero
        );
    }

    #[test]
    fn boundary_values_fall_in_the_lower_band() {
        assert_eq!(classify(Some("DOMESTICO A"), Some(5.0)), ConsumptionTier::Low);
        assert_eq!(classify(Some("DOMESTICO A"), Some(5.0001)), ConsumptionTier::Regular);
        assert_eq!(classify(Some("DOMESTICO A"), Some(10.0)), ConsumptionTier::Regular);
        assert_eq!(classify(Some("DOMESTICO A"), Some(15.0)), ConsumptionTier::Normal);
        assert_eq!(classify(Some("DOMESTICO A"), Some(30.0)), ConsumptionTier::High);
        assert_eq!(classify(Some("DOMESTICO A"), Some(30.0001)), ConsumptionTier::VeryHigh);
    }

    #[test]
    fn unknown_class_uses_the_domestic_a_breakpoints() {
        for value in [0.5, 5.0, 7.0, 12.0, 20.0, 100.0] {
            assert_eq!(
                classify(Some("UNKNOWN_CLASS"), Some(value)),
                classify(Some("DOMESTICO A"), Some(value)),
            );
            assert_eq!(classify(None, Some(value)), classify(Some("DOMESTICO A"), Some(value)));
        }
    }

    #[test]
    fn commercial_bands_are_wider_than_domestic() {
        assert_eq!(classify(Some("COMERCIAL"), Some(20.0)), ConsumptionTier::Low);
        assert_eq!(classify(Some("DOMESTICO A"), Some(20.0)), ConsumptionTier::VeryHigh);
    }

    #[test]
    fn every_input_maps_to_one_of_the_six_tiers() {
        let labels = [None, Some("DOMESTICO B"), Some("PUBLICO FEDERAL"), Some("garbage")];
        let values = [None, Some(-3.0), Some(0.0), Some(1.0), Some(55.5), Some(1e12)];
        for label in labels {
            for value in values {
                // Totality: classification never panics, and every tier has
                // a color and a label.
                let tier = classify(label, value);
                assert!(!tier.color_hex().is_empty());
                assert!(!tier.label().is_empty());
            }
        }
    }

    #[test]
    fn overrides_replace_only_the_named_class() {
        let mut overrides = HashMap::new();
        overrides.insert("COMERCIAL".to_string(), vec![1.0, 2.0, 3.0, 4.0]);
        let table = TierThresholds::from_overrides(&overrides).unwrap();
        assert_eq!(table.classify(Some("COMERCIAL"), Some(3.5)), ConsumptionTier::High);
        // Other classes keep the canonical vectors.
        assert_eq!(table.classify(Some("DOMESTICO A"), Some(7.0)), ConsumptionTier::Regular);
    }

    #[test]
    fn overrides_reject_bad_vectors() {
        let mut short = HashMap::new();
        short.insert("COMERCIAL".to_string(), vec![1.0, 2.0, 3.0]);
        assert!(matches!(
            TierThresholds::from_overrides(&short),
            Err(ThresholdError::InvalidBreakpoints { .. })
        ));

        let mut descending = HashMap::new();
        descending.insert("COMERCIAL".to_string(), vec![4.0, 3.0, 2.0, 1.0]);
        assert!(matches!(
            TierThresholds::from_overrides(&descending),
            Err(ThresholdError::InvalidBreakpoints { .. })
        ));

        let mut unknown = HashMap::new();
        unknown.insert("DOMESTICO Z".to_string(), vec![1.0, 2.0, 3.0, 4.0]);
        assert!(matches!(
            TierThresholds::from_overrides(&unknown),
            Err(ThresholdError::UnknownClass(_))
        ));
    }
}
