//! Customer record submitted for an insurance charges prediction

use crate::error::RecordError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const AGE_RANGE: (u32, u32) = (18, 100);
pub const BMI_RANGE: (f64, f64) = (10.0, 60.0);
pub const CHILDREN_RANGE: (u32, u32) = (0, 10);

/// Biological sex as recorded in the training data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

/// Smoker status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Smoker {
    Yes,
    No,
}

/// Residential region in the US
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Southeast,
    Southwest,
    Northeast,
    Northwest,
}

// Ordinal codes follow the alphabetical order of the category labels.
impl Sex {
    pub const ALL: [Sex; 2] = [Sex::Male, Sex::Female];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }

    pub fn code(&self) -> f32 {
        match self {
            Sex::Female => 0.0,
            Sex::Male => 1.0,
        }
    }
}

impl Smoker {
    pub const ALL: [Smoker; 2] = [Smoker::Yes, Smoker::No];

    pub fn as_str(&self) -> &'static str {
        match self {
            Smoker::Yes => "yes",
            Smoker::No => "no",
        }
    }

    pub fn code(&self) -> f32 {
        match self {
            Smoker::No => 0.0,
            Smoker::Yes => 1.0,
        }
    }
}

impl Region {
    pub const ALL: [Region; 4] = [
        Region::Southeast,
        Region::Southwest,
        Region::Northeast,
        Region::Northwest,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Southeast => "southeast",
            Region::Southwest => "southwest",
            Region::Northeast => "northeast",
            Region::Northwest => "northwest",
        }
    }

    pub fn code(&self) -> f32 {
        match self {
            Region::Northeast => 0.0,
            Region::Northwest => 1.0,
            Region::Southeast => 2.0,
            Region::Southwest => 3.0,
        }
    }
}

macro_rules! label_impls {
    ($ty:ty, $field:literal, $expected:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = RecordError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let needle = s.trim();
                <$ty>::ALL
                    .into_iter()
                    .find(|v| v.as_str().eq_ignore_ascii_case(needle))
                    .ok_or_else(|| RecordError::UnknownVariant {
                        field: $field,
                        value: s.to_string(),
                        expected: $expected,
                    })
            }
        }
    };
}

label_impls!(Sex, "sex", "male, female");
label_impls!(Smoker, "smoker", "yes, no");
label_impls!(Region, "region", "southeast, southwest, northeast, northwest");

/// A single validated input instance.
///
/// Construct through [`CustomerRecord::new`] or deserialize; both check the
/// domain, and fields are private so a record in hand is always within it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCustomerRecord")]
pub struct CustomerRecord {
    age: u32,
    sex: Sex,
    bmi: f64,
    children: u32,
    smoker: Smoker,
    region: Region,
}

#[derive(Deserialize)]
struct RawCustomerRecord {
    age: u32,
    sex: Sex,
    bmi: f64,
    children: u32,
    smoker: Smoker,
    region: Region,
}

impl TryFrom<RawCustomerRecord> for CustomerRecord {
    type Error = RecordError;

    fn try_from(raw: RawCustomerRecord) -> Result<Self, Self::Error> {
        Self::new(raw.age, raw.sex, raw.bmi, raw.children, raw.smoker, raw.region)
    }
}

impl CustomerRecord {
    /// Create a record, checking every field against its domain
    pub fn new(
        age: u32,
        sex: Sex,
        bmi: f64,
        children: u32,
        smoker: Smoker,
        region: Region,
    ) -> Result<Self, RecordError> {
        let record = Self {
            age,
            sex,
            bmi,
            children,
            smoker,
            region,
        };
        record.validate()?;
        Ok(record)
    }

    fn validate(&self) -> Result<(), RecordError> {
        check_range("age", self.age as f64, AGE_RANGE.0 as f64, AGE_RANGE.1 as f64)?;
        if !self.bmi.is_finite() {
            return Err(RecordError::NotFinite { field: "bmi" });
        }
        check_range("bmi", self.bmi, BMI_RANGE.0, BMI_RANGE.1)?;
        check_range(
            "children",
            self.children as f64,
            CHILDREN_RANGE.0 as f64,
            CHILDREN_RANGE.1 as f64,
        )?;
        Ok(())
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn sex(&self) -> Sex {
        self.sex
    }

    pub fn bmi(&self) -> f64 {
        self.bmi
    }

    pub fn children(&self) -> u32 {
        self.children
    }

    pub fn smoker(&self) -> Smoker {
        self.smoker
    }

    pub fn region(&self) -> Region {
        self.region
    }
}

impl Default for CustomerRecord {
    fn default() -> Self {
        Self {
            age: 30,
            sex: Sex::Male,
            bmi: 25.0,
            children: 0,
            smoker: Smoker::Yes,
            region: Region::Southeast,
        }
    }
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), RecordError> {
    if value < min || value > max {
        return Err(RecordError::OutOfRange {
            field,
            min,
            max,
            value,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_within_domain() {
        let record =
            CustomerRecord::new(30, Sex::Male, 25.0, 0, Smoker::No, Region::Southeast).unwrap();
        assert_eq!(record.age(), 30);
        assert_eq!(record.region(), Region::Southeast);
    }

    #[test]
    fn test_record_bounds_are_inclusive() {
        assert!(CustomerRecord::new(18, Sex::Female, 10.0, 0, Smoker::No, Region::Northeast).is_ok());
        assert!(CustomerRecord::new(100, Sex::Female, 60.0, 10, Smoker::Yes, Region::Northwest).is_ok());
    }

    #[test]
    fn test_record_out_of_range() {
        let err = CustomerRecord::new(17, Sex::Male, 25.0, 0, Smoker::No, Region::Southeast)
            .unwrap_err();
        assert!(matches!(err, RecordError::OutOfRange { field: "age", .. }));

        let err = CustomerRecord::new(30, Sex::Male, 60.5, 0, Smoker::No, Region::Southeast)
            .unwrap_err();
        assert!(matches!(err, RecordError::OutOfRange { field: "bmi", .. }));

        let err = CustomerRecord::new(30, Sex::Male, 25.0, 11, Smoker::No, Region::Southeast)
            .unwrap_err();
        assert!(matches!(err, RecordError::OutOfRange { field: "children", .. }));

        let err = CustomerRecord::new(30, Sex::Male, f64::NAN, 0, Smoker::No, Region::Southeast)
            .unwrap_err();
        assert_eq!(err, RecordError::NotFinite { field: "bmi" });
    }

    #[test]
    fn test_default_record_is_within_domain() {
        let record = CustomerRecord::default();
        assert!(record.validate().is_ok());
        assert_eq!(record.smoker(), Smoker::Yes);
    }

    #[test]
    fn test_parse_labels() {
        assert_eq!("Female".parse::<Sex>().unwrap(), Sex::Female);
        assert_eq!(" yes ".parse::<Smoker>().unwrap(), Smoker::Yes);
        assert_eq!("northwest".parse::<Region>().unwrap(), Region::Northwest);
        assert!("north".parse::<Region>().is_err());
    }

    #[test]
    fn test_record_deserialization_checks_domain() {
        let json = r#"{"age":30,"sex":"male","bmi":25.0,"children":0,"smoker":"no","region":"southeast"}"#;
        let record: CustomerRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record, CustomerRecord::new(30, Sex::Male, 25.0, 0, Smoker::No, Region::Southeast).unwrap());

        let json = r#"{"age":5,"sex":"male","bmi":999.0,"children":50,"smoker":"no","region":"southeast"}"#;
        let err = serde_json::from_str::<CustomerRecord>(json).unwrap_err();
        assert!(err.to_string().contains("age must be between 18 and 100, got 5"));

        let json = r#"{"age":30,"sex":"male","bmi":25.0,"children":11,"smoker":"no","region":"southeast"}"#;
        assert!(serde_json::from_str::<CustomerRecord>(json).is_err());
    }
}
