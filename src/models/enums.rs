use serde::{Deserialize, Serialize};

/// A string that does not name any variant of the target enum.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Invalid value for {field}: {value}")]
pub struct InvalidEnumValue {
    pub field: &'static str,
    pub value: String,
}

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
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
            type Err = InvalidEnumValue;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(InvalidEnumValue {
                        field: stringify!($name),
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

str_enum!(AppointmentStatus {
    Attended => "atendida",
    Cancelled => "cancelada",
    Pending => "pendiente",
});

str_enum!(SubjectKind {
    Patient => "paciente",
    Physician => "medico",
});

str_enum!(AveragePeriod {
    Monthly => "mensual",
    Yearly => "anual",
});

impl AveragePeriod {
    /// Lookback window in months; also the divisor that turns the window
    /// count into a per-month average.
    pub fn months(&self) -> u32 {
        match self {
            Self::Monthly => 1,
            Self::Yearly => 12,
        }
    }
}

impl Default for AveragePeriod {
    fn default() -> Self {
        Self::Monthly
    }
}
