//! Name → transform unit registry.
//!
//! The vocabulary is fixed. Its order is also the order in which selected
//! units enter the class catalog, no matter how the names were listed.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use auglabel_core::prelude::*;
use tracing::debug;

use crate::unit::TransformUnit;

/// The fixed transform vocabulary, in catalog order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TransformKind {
    Crop,
    HorizontalFlip,
    VerticalFlip,
    Rotate,
    Invert,
    Blur,
    Solarize,
    Grayscale,
    ColorJitter,
    /// Reserved name; no implementation exists.
    HalfSwap,
}

impl TransformKind {
    /// Every name in the vocabulary, including reserved ones.
    pub const ALL: [TransformKind; 10] = [
        TransformKind::Crop,
        TransformKind::HorizontalFlip,
        TransformKind::VerticalFlip,
        TransformKind::Rotate,
        TransformKind::Invert,
        TransformKind::Blur,
        TransformKind::Solarize,
        TransformKind::Grayscale,
        TransformKind::ColorJitter,
        TransformKind::HalfSwap,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TransformKind::Crop => "crop",
            TransformKind::HorizontalFlip => "hflip",
            TransformKind::VerticalFlip => "vflip",
            TransformKind::Rotate => "rotate",
            TransformKind::Invert => "invert",
            TransformKind::Blur => "blur",
            TransformKind::Solarize => "solarize",
            TransformKind::Grayscale => "grayscale",
            TransformKind::ColorJitter => "colorjitter",
            TransformKind::HalfSwap => "halfswap",
        }
    }

    pub fn is_reserved(&self) -> bool {
        matches!(self, TransformKind::HalfSwap)
    }

    /// The unit with the parameters of the standard CIFAR pipeline.
    pub fn default_unit(&self) -> Option<TransformUnit> {
        let unit = match self {
            TransformKind::Crop => TransformUnit::Crop { padding: 4 },
            TransformKind::HorizontalFlip => TransformUnit::HorizontalFlip,
            TransformKind::VerticalFlip => TransformUnit::VerticalFlip,
            TransformKind::Rotate => TransformUnit::Rotate { degrees: 90.0 },
            TransformKind::Invert => TransformUnit::Invert,
            TransformKind::Blur => TransformUnit::Blur {
                sigma_min: 0.1,
                sigma_max: 2.0,
            },
            TransformKind::Solarize => TransformUnit::Solarize {
                p: 1.0,
                threshold: 128,
            },
            TransformKind::Grayscale => TransformUnit::Grayscale,
            TransformKind::ColorJitter => TransformUnit::ColorJitter {
                brightness: 0.4,
                contrast: 0.4,
                saturation: 0.2,
                hue: 0.1,
            },
            TransformKind::HalfSwap => return None,
        };
        Some(unit)
    }
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TransformKind {
    type Err = AugError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s
            .trim()
            .to_ascii_lowercase()
            .replace(|c: char| c == '-' || c == '_', "");
        let kind = match normalized.as_str() {
            "crop" => TransformKind::Crop,
            "hflip" | "horizontalflip" => TransformKind::HorizontalFlip,
            "vflip" | "verticalflip" => TransformKind::VerticalFlip,
            "rotate" => TransformKind::Rotate,
            "invert" => TransformKind::Invert,
            "blur" => TransformKind::Blur,
            "solarize" => TransformKind::Solarize,
            "grayscale" => TransformKind::Grayscale,
            "colorjitter" => TransformKind::ColorJitter,
            "halfswap" => TransformKind::HalfSwap,
            _ => return Err(AugError::unknown_transform(s)),
        };
        Ok(kind)
    }
}

/// Resolves transform names to units.
///
/// Starts with the default parameters for every implemented name; individual
/// entries can be overridden with [`with_unit`](Self::with_unit).
#[derive(Debug, Clone)]
pub struct TransformRegistry {
    units: BTreeMap<TransformKind, TransformUnit>,
}

impl TransformRegistry {
    pub fn new() -> Self {
        let units = TransformKind::ALL
            .iter()
            .filter_map(|kind| kind.default_unit().map(|unit| (*kind, unit)))
            .collect();
        Self { units }
    }

    /// Replace the unit registered for `unit.kind()`.
    pub fn with_unit(mut self, unit: TransformUnit) -> Self {
        self.units.insert(unit.kind(), unit);
        self
    }

    /// Look up a single name.
    pub fn resolve(&self, name: &str) -> Result<TransformUnit> {
        let kind: TransformKind = name.parse()?;
        self.units
            .get(&kind)
            .copied()
            .ok_or_else(|| ConfigError::ReservedTransform(kind.name().to_string()).into())
    }

    /// Resolve a set of names into the flexible transform list.
    ///
    /// Output is in vocabulary order with duplicates removed. Unknown or
    /// reserved names fail the whole selection.
    pub fn select<I, S>(&self, names: I) -> Result<Vec<TransformUnit>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut chosen = BTreeMap::new();
        for name in names {
            let unit = self.resolve(name.as_ref())?;
            chosen.insert(unit.kind(), unit);
        }
        let units: Vec<TransformUnit> = chosen.into_values().collect();
        debug!(
            selected = ?units.iter().map(|u| u.name()).collect::<Vec<_>>(),
            "resolved flexible transform set"
        );
        Ok(units)
    }

    /// Names with an implementation, in vocabulary order.
    pub fn available(&self) -> Vec<&'static str> {
        self.units.keys().map(|k| k.name()).collect()
    }
}

impl Default for TransformRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases_parse() {
        assert_eq!("hflip".parse::<TransformKind>().unwrap(), TransformKind::HorizontalFlip);
        assert_eq!(
            "horizontal-flip".parse::<TransformKind>().unwrap(),
            TransformKind::HorizontalFlip
        );
        assert_eq!(
            "color-jitter".parse::<TransformKind>().unwrap(),
            TransformKind::ColorJitter
        );
        assert_eq!("Vertical_Flip".parse::<TransformKind>().unwrap(), TransformKind::VerticalFlip);
    }

    #[test]
    fn test_unknown_name_is_config_error() {
        let registry = TransformRegistry::new();
        let err = registry.resolve("sharpen").unwrap_err();
        assert_eq!(err, AugError::Config(ConfigError::UnknownTransform("sharpen".into())));
    }

    #[test]
    fn test_halfswap_is_reserved() {
        let registry = TransformRegistry::new();
        let err = registry.select(["hflip", "halfswap"]).unwrap_err();
        assert_eq!(err, AugError::Config(ConfigError::ReservedTransform("halfswap".into())));
    }

    #[test]
    fn test_select_uses_vocabulary_order_and_dedups() {
        let registry = TransformRegistry::new();
        let units = registry
            .select(["grayscale", "crop", "hflip", "grayscale"])
            .unwrap();
        let names: Vec<_> = units.iter().map(|u| u.name()).collect();
        assert_eq!(names, vec!["crop", "hflip", "grayscale"]);
    }

    #[test]
    fn test_override_parameters() {
        let registry = TransformRegistry::new().with_unit(TransformUnit::Crop { padding: 2 });
        assert_eq!(registry.resolve("crop").unwrap(), TransformUnit::Crop { padding: 2 });
    }

    #[test]
    fn test_available_excludes_reserved() {
        let registry = TransformRegistry::new();
        let names = registry.available();
        assert_eq!(names.len(), 9);
        assert!(!names.contains(&"halfswap"));
        assert_eq!(names[0], "crop");
        assert_eq!(names[8], "colorjitter");
    }
}
