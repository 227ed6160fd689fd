use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, AddAssign, Sub},
    str::FromStr,
};

use serde::{de::Error as DeError, Deserialize, Deserializer, Serialize, Serializer};
use sqlx::Type;
use thiserror::Error;

use crate::op;

const CENTAVOS_PER_PESO: i64 = 100;

//--------------------------------------       Pesos         ---------------------------------------------------------
/// An amount of Argentine pesos, held as a whole number of centavos.
///
/// Stored in the database as an integer. Over JSON it is written as a decimal peso amount (`1234.5`), which is what the
/// POS and the web front end speak.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, PartialEq, Eq, Hash)]
#[sqlx(transparent)]
pub struct Pesos(i64);

op!(binary Pesos, Add, add);
op!(binary Pesos, Sub, sub);
op!(inplace Pesos, AddAssign, add_assign);

impl Sum for Pesos {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Value cannot be represented in pesos: {0}")]
pub struct PesosConversionError(String);

impl Pesos {
    pub fn from_centavos(centavos: i64) -> Self {
        Self(centavos)
    }

    pub fn from_pesos(pesos: i64) -> Self {
        Self(pesos * CENTAVOS_PER_PESO)
    }

    pub fn centavos(&self) -> i64 {
        self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Converts a decimal peso amount, rounding to the nearest centavo.
    pub fn try_from_decimal(value: f64) -> Result<Self, PesosConversionError> {
        if !value.is_finite() {
            return Err(PesosConversionError(format!("{value} is not a finite amount")));
        }
        let centavos = (value * CENTAVOS_PER_PESO as f64).round();
        if centavos > i64::MAX as f64 || centavos < i64::MIN as f64 {
            return Err(PesosConversionError(format!("{value} is out of range")));
        }
        #[allow(clippy::cast_possible_truncation)]
        Ok(Self(centavos as i64))
    }

    pub fn as_decimal(&self) -> f64 {
        self.0 as f64 / CENTAVOS_PER_PESO as f64
    }
}

impl FromStr for Pesos {
    type Err = PesosConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('$');
        let value = trimmed.parse::<f64>().map_err(|e| PesosConversionError(format!("{s}: {e}")))?;
        Self::try_from_decimal(value)
    }
}

impl Display for Pesos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}${}.{:02}", abs / CENTAVOS_PER_PESO as u64, abs % CENTAVOS_PER_PESO as u64)
    }
}

impl Serialize for Pesos {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0 % CENTAVOS_PER_PESO == 0 {
            serializer.serialize_i64(self.0 / CENTAVOS_PER_PESO)
        } else {
            serializer.serialize_f64(self.as_decimal())
        }
    }
}

impl<'de> Deserialize<'de> for Pesos {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Self::try_from_decimal(value).map_err(D::Error::custom)
    }
}
