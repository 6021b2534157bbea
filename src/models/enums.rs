use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid {field} value: {value}")]
pub struct ParseEnumError {
    pub field: String,
    pub value: String,
}

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// Variants serialize as their canonical string.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ParseEnumError {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(Route {
    Oral => "oral",
    ScIv => "sc/iv",
    Iv => "iv",
    OralMucosal => "oral/mucosal",
    Patch => "patch",
});

impl Route {
    /// Parenteral routes are dosed exactly, without tablet rounding.
    pub fn is_injectable(&self) -> bool {
        matches!(self, Self::ScIv | Self::Iv)
    }
}

// Declaration order is display priority: danger sorts first.
str_enum!(Severity {
    Danger => "danger",
    Caution => "caution",
    Preferred => "preferred",
    Info => "info",
});

str_enum!(BmiCategory {
    Low => "low",
    Normal => "normal",
    High => "high",
});

str_enum!(Gender {
    Male => "male",
    Female => "female",
});

str_enum!(GfrRisk {
    Avoid => "avoid",
    Contraindicated => "contraindicated",
    Caution => "caution",
    Preferred => "preferred",
    Normal => "normal",
});

str_enum!(DrugRole {
    Source => "source",
    Target => "target",
});

str_enum!(DoseUnit {
    Mg => "mg",
    McgPerHr => "mcg/hr",
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn route_round_trip() {
        for (variant, s) in [
            (Route::Oral, "oral"),
            (Route::ScIv, "sc/iv"),
            (Route::Iv, "iv"),
            (Route::OralMucosal, "oral/mucosal"),
            (Route::Patch, "patch"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(Route::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn route_serializes_as_protocol_string() {
        let json = serde_json::to_string(&Route::ScIv).unwrap();
        assert_eq!(json, "\"sc/iv\"");
        let back: Route = serde_json::from_str("\"oral/mucosal\"").unwrap();
        assert_eq!(back, Route::OralMucosal);
    }

    #[test]
    fn injectable_routes() {
        assert!(Route::ScIv.is_injectable());
        assert!(Route::Iv.is_injectable());
        assert!(!Route::Oral.is_injectable());
        assert!(!Route::Patch.is_injectable());
        assert!(!Route::OralMucosal.is_injectable());
    }

    #[test]
    fn severity_ordering() {
        assert!(Severity::Danger < Severity::Caution);
        assert!(Severity::Caution < Severity::Preferred);
        assert!(Severity::Preferred < Severity::Info);
    }

    #[test]
    fn unknown_value_rejected() {
        let err = Route::from_str("rectal").unwrap_err();
        assert_eq!(err.field, "Route");
        assert_eq!(err.value, "rectal");
        assert!(BmiCategory::from_str("obese").is_err());
    }

    #[test]
    fn display_uses_canonical_string() {
        assert_eq!(DoseUnit::McgPerHr.to_string(), "mcg/hr");
        assert_eq!(Gender::Female.to_string(), "female");
    }
}
