use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub const MIN_YEAR: i64 = 1;
pub const MAX_YEAR: i64 = 9999;

/// A coin in the collection, as stored in the `coins` table.
///
/// `quantity` is persisted (and serialized) as `exists_count`, the name the
/// column has carried since the first schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Coin {
    pub id: i64,
    pub country: String,
    pub denomination: String,
    pub year: i64,
    #[serde(rename = "exists_count")]
    #[sqlx(rename = "exists_count")]
    pub quantity: i64,
}

/// Validated identity of a coin: the unique (country, denomination, year) triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCoin {
    pub country: String,
    pub denomination: String,
    pub year: i64,
}

impl NewCoin {
    pub fn new(country: impl Into<String>, denomination: impl Into<String>, year: i64) -> Self {
        Self {
            country: country.into(),
            denomination: denomination.into(),
            year,
        }
    }
}

/// Raw `POST /coins` body. Fields stay untyped until [`AddCoinRequest::validate`]
/// so every kind of bad input gets a precise message instead of a generic
/// deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddCoinRequest {
    #[serde(default)]
    pub country: Option<Value>,
    #[serde(default)]
    pub denomination: Option<Value>,
    #[serde(default)]
    pub year: Option<Value>,
}

impl AddCoinRequest {
    /// Accepts any JSON document; anything but a non-empty object counts as no data.
    pub fn from_json(payload: Value) -> Result<Self, String> {
        match &payload {
            Value::Object(fields) if !fields.is_empty() => {}
            _ => return Err("No data provided".to_string()),
        }
        serde_json::from_value(payload).map_err(|err| err.to_string())
    }

    /// Checks run in a fixed order and the first failure wins: presence,
    /// non-blank text, integer year, year range.
    pub fn validate(self) -> Result<NewCoin, String> {
        let country = self.country.ok_or_else(|| missing("country"))?;
        let denomination = self.denomination.ok_or_else(|| missing("denomination"))?;
        let year = self.year.ok_or_else(|| missing("year"))?;

        let country = trimmed_text(&country, "country")?;
        let denomination = trimmed_text(&denomination, "denomination")?;
        if country.is_empty() || denomination.is_empty() {
            return Err("Country and denomination cannot be empty".to_string());
        }

        let year = parse_year(&year).ok_or_else(|| "Year must be a valid integer".to_string())?;
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(format!("Year must be between {MIN_YEAR} and {MAX_YEAR}"));
        }

        Ok(NewCoin {
            country,
            denomination,
            year,
        })
    }
}

fn missing(field: &str) -> String {
    format!("Missing required field: {field}")
}

fn trimmed_text(value: &Value, field: &str) -> Result<String, String> {
    value
        .as_str()
        .map(|text| text.trim().to_string())
        .ok_or_else(|| format!("Field '{field}' must be a string"))
}

/// Integer conversion of the raw year: JSON integers, finite numbers truncated
/// toward zero, booleans as 0/1 and strings holding an integer.
fn parse_year(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => {
            if let Some(year) = number.as_i64() {
                return Some(year);
            }
            let float = number.as_f64()?;
            // saturating; anything this large fails the range check
            float.is_finite().then(|| float.trunc() as i64)
        }
        Value::Bool(flag) => Some(i64::from(*flag)),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddOutcome {
    Added,
    Incremented,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoveOutcome {
    Decremented,
    Deleted,
}

impl fmt::Display for AddOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added => write!(f, "added"),
            Self::Incremented => write!(f, "incremented"),
        }
    }
}

impl fmt::Display for RemoveOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decremented => write!(f, "decremented"),
            Self::Deleted => write!(f, "deleted"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse<T> {
    pub status: T,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn validate(payload: Value) -> Result<NewCoin, String> {
        AddCoinRequest::from_json(payload)?.validate()
    }

    #[test]
    fn accepts_and_trims_valid_payload() {
        let coin = validate(json!({
            "country": "  USA ",
            "denomination": "Quarter\t",
            "year": 1999
        }))
        .expect("payload should validate");

        assert_eq!(coin, NewCoin::new("USA", "Quarter", 1999));
    }

    #[test]
    fn empty_or_non_object_body_is_no_data() {
        for payload in [json!({}), json!(null), json!([1, 2]), json!("coin")] {
            assert_eq!(validate(payload).unwrap_err(), "No data provided");
        }
    }

    #[test]
    fn missing_fields_are_reported_in_order() {
        assert_eq!(
            validate(json!({ "year": 2000 })).unwrap_err(),
            "Missing required field: country"
        );
        assert_eq!(
            validate(json!({ "country": "Chile", "year": 2000 })).unwrap_err(),
            "Missing required field: denomination"
        );
        assert_eq!(
            validate(json!({ "country": "Chile", "denomination": "Peso" })).unwrap_err(),
            "Missing required field: year"
        );
    }

    #[test]
    fn blank_text_wins_over_bad_year() {
        let err = validate(json!({
            "country": "   ",
            "denomination": "Peso",
            "year": "not a year"
        }))
        .unwrap_err();
        assert_eq!(err, "Country and denomination cannot be empty");
    }

    #[test]
    fn non_string_text_is_rejected() {
        let err = validate(json!({
            "country": 42,
            "denomination": "Peso",
            "year": 2000
        }))
        .unwrap_err();
        assert_eq!(err, "Field 'country' must be a string");
    }

    #[test]
    fn year_accepts_integer_like_values() {
        for (year, expected) in [
            (json!(1999), 1999),
            (json!("1999"), 1999),
            (json!(" 1999 "), 1999),
            (json!(1999.0), 1999),
            (json!(1999.5), 1999),
            (json!(1999.99), 1999),
            (json!(true), 1),
        ] {
            let coin = validate(json!({
                "country": "Peru",
                "denomination": "Sol",
                "year": year
            }))
            .expect("integer-like year should validate");
            assert_eq!(coin.year, expected);
        }
    }

    #[test]
    fn year_rejects_non_integers() {
        for year in [json!("MCMXCIX"), json!("1999.5"), json!([1999]), json!({ "y": 1 })] {
            let err = validate(json!({
                "country": "Peru",
                "denomination": "Sol",
                "year": year
            }))
            .unwrap_err();
            assert_eq!(err, "Year must be a valid integer");
        }
    }

    #[test]
    fn converted_years_still_face_the_range_check() {
        for year in [json!(false), json!(0.7), json!(-0.5), json!(10000.2)] {
            let err = validate(json!({
                "country": "Peru",
                "denomination": "Sol",
                "year": year
            }))
            .unwrap_err();
            assert_eq!(err, "Year must be between 1 and 9999");
        }
    }

    #[test]
    fn year_range_is_inclusive() {
        for (year, ok) in [(0, false), (1, true), (9999, true), (10000, false), (-5, false)] {
            let result = validate(json!({
                "country": "Peru",
                "denomination": "Sol",
                "year": year
            }));
            match result {
                Ok(coin) => assert!(ok, "year {year} should be rejected, got {coin:?}"),
                Err(err) => {
                    assert!(!ok, "year {year} should be accepted");
                    assert_eq!(err, "Year must be between 1 and 9999");
                }
            }
        }
    }

    #[test]
    fn coin_serializes_quantity_as_exists_count() {
        let coin = Coin {
            id: 7,
            country: "USA".to_string(),
            denomination: "Quarter".to_string(),
            year: 1999,
            quantity: 2,
        };
        let value = serde_json::to_value(&coin).expect("coin should serialize");
        assert_eq!(value["exists_count"], 2);
        assert!(value.get("quantity").is_none());
    }

    #[test]
    fn outcomes_serialize_as_lowercase_labels() {
        let body = serde_json::to_value(StatusResponse {
            status: AddOutcome::Incremented,
        })
        .expect("status should serialize");
        assert_eq!(body, json!({ "status": "incremented" }));
        assert_eq!(RemoveOutcome::Deleted.to_string(), "deleted");
    }
}
