use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use super::domain::{ApartmentDraft, ApartmentStatus, ApartmentType};

#[derive(Debug)]
pub enum FixtureError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidRow { line: usize, reason: String },
}

impl std::fmt::Display for FixtureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FixtureError::Io(err) => write!(f, "failed to read apartment fixture: {}", err),
            FixtureError::Csv(err) => write!(f, "invalid apartment fixture data: {}", err),
            FixtureError::InvalidRow { line, reason } => {
                write!(f, "apartment fixture line {}: {}", line, reason)
            }
        }
    }
}

impl std::error::Error for FixtureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FixtureError::Io(err) => Some(err),
            FixtureError::Csv(err) => Some(err),
            FixtureError::InvalidRow { .. } => None,
        }
    }
}

impl From<std::io::Error> for FixtureError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for FixtureError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Outcome of seeding apartments from a fixture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

/// Validated apartment rows read from a CSV export.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApartmentFixture {
    drafts: Vec<ApartmentDraft>,
}

impl ApartmentFixture {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, FixtureError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, FixtureError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut drafts = Vec::new();

        for (index, record) in csv_reader.deserialize::<FixtureRow>().enumerate() {
            // header occupies line 1
            let line = index + 2;
            let draft = record?
                .into_draft()
                .map_err(|reason| FixtureError::InvalidRow { line, reason })?;
            draft
                .validate_new()
                .map_err(|err| FixtureError::InvalidRow {
                    line,
                    reason: err.to_string(),
                })?;
            drafts.push(draft.normalized());
        }

        Ok(Self { drafts })
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }

    pub fn into_drafts(self) -> Vec<ApartmentDraft> {
        self.drafts
    }
}

#[derive(Debug, Deserialize)]
struct FixtureRow {
    name: String,
    apartment_type: String,
    floor: u8,
    unit_number: String,
    price_per_month: u32,
    size_sqm: f32,
    bedrooms: u8,
    bathrooms: u8,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    status: Option<String>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    amenities: String,
}

impl FixtureRow {
    fn into_draft(self) -> Result<ApartmentDraft, String> {
        let apartment_type = ApartmentType::parse(&self.apartment_type)
            .ok_or_else(|| format!("unknown apartment type '{}'", self.apartment_type))?;
        let status = match self.status.as_deref() {
            Some(raw) => {
                ApartmentStatus::parse(raw).ok_or_else(|| format!("unknown status '{raw}'"))?
            }
            None => ApartmentStatus::Available,
        };

        Ok(ApartmentDraft {
            name: self.name,
            apartment_type,
            floor: self.floor,
            unit_number: self.unit_number,
            price_per_month: self.price_per_month,
            size_sqm: self.size_sqm,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            status,
            description: self.description,
            amenities: self.amenities,
            image: None,
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
