use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApartmentId(pub u64);

impl fmt::Display for ApartmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApartmentType {
    #[serde(rename = "studio")]
    Studio,
    #[serde(rename = "1br")]
    OneBedroom,
    #[serde(rename = "2br")]
    TwoBedroom,
    #[serde(rename = "3br")]
    ThreeBedroom,
    #[serde(rename = "penthouse")]
    Penthouse,
}

impl ApartmentType {
    pub const fn code(self) -> &'static str {
        match self {
            ApartmentType::Studio => "studio",
            ApartmentType::OneBedroom => "1br",
            ApartmentType::TwoBedroom => "2br",
            ApartmentType::ThreeBedroom => "3br",
            ApartmentType::Penthouse => "penthouse",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            ApartmentType::Studio => "Studio",
            ApartmentType::OneBedroom => "1 Bedroom",
            ApartmentType::TwoBedroom => "2 Bedrooms",
            ApartmentType::ThreeBedroom => "3 Bedrooms",
            ApartmentType::Penthouse => "Penthouse",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "studio" => Some(Self::Studio),
            "1br" => Some(Self::OneBedroom),
            "2br" => Some(Self::TwoBedroom),
            "3br" => Some(Self::ThreeBedroom),
            "penthouse" => Some(Self::Penthouse),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApartmentStatus {
    Available,
    Occupied,
    Maintenance,
}

impl ApartmentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApartmentStatus::Available => "Available",
            ApartmentStatus::Occupied => "Occupied",
            ApartmentStatus::Maintenance => "Maintenance",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "available" => Some(Self::Available),
            "occupied" => Some(Self::Occupied),
            "maintenance" => Some(Self::Maintenance),
            _ => None,
        }
    }
}

/// A rentable unit. `status` only becomes `Occupied` through reservation approval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Apartment {
    pub id: ApartmentId,
    pub name: String,
    pub apartment_type: ApartmentType,
    pub floor: u8,
    pub unit_number: String,
    pub price_per_month: u32,
    pub size_sqm: f32,
    pub bedrooms: u8,
    pub bathrooms: u8,
    pub status: ApartmentStatus,
    pub description: String,
    pub amenities: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Apartment {
    pub fn is_available(&self) -> bool {
        self.status == ApartmentStatus::Available
    }

    pub fn amenities_list(&self) -> Vec<String> {
        self.amenities
            .split(',')
            .map(str::trim)
            .filter(|amenity| !amenity.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub(crate) fn apply(&mut self, draft: ApartmentDraft, now: DateTime<Utc>) {
        self.name = draft.name;
        self.apartment_type = draft.apartment_type;
        self.floor = draft.floor;
        self.unit_number = draft.unit_number;
        self.price_per_month = draft.price_per_month;
        self.size_sqm = draft.size_sqm;
        self.bedrooms = draft.bedrooms;
        self.bathrooms = draft.bathrooms;
        self.status = draft.status;
        self.description = draft.description;
        self.amenities = draft.amenities;
        self.image = draft.image;
        self.updated_at = now;
    }
}

impl fmt::Display for Apartment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - Unit {}", self.name, self.unit_number)
    }
}

pub const MIN_FLOOR: u8 = 1;
pub const MAX_FLOOR: u8 = 50;

/// Create/update form payload for an apartment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApartmentDraft {
    pub name: String,
    pub apartment_type: ApartmentType,
    pub floor: u8,
    pub unit_number: String,
    pub price_per_month: u32,
    pub size_sqm: f32,
    pub bedrooms: u8,
    pub bathrooms: u8,
    #[serde(default = "default_status")]
    pub status: ApartmentStatus,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub amenities: String,
    #[serde(default)]
    pub image: Option<String>,
}

fn default_status() -> ApartmentStatus {
    ApartmentStatus::Available
}

impl ApartmentDraft {
    /// Field-level rules shared by create, update and fixture import.
    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.name.trim().is_empty() {
            return Err(ServiceError::validation("compound name is required"));
        }
        if self.unit_number.trim().is_empty() {
            return Err(ServiceError::validation("unit number is required"));
        }
        if self.unit_number.trim().len() > 10 {
            return Err(ServiceError::validation(
                "unit number must be at most 10 characters",
            ));
        }
        if !(MIN_FLOOR..=MAX_FLOOR).contains(&self.floor) {
            return Err(ServiceError::validation(format!(
                "floor must be between {MIN_FLOOR} and {MAX_FLOOR}"
            )));
        }
        if self.bathrooms < 1 {
            return Err(ServiceError::validation(
                "an apartment needs at least one bathroom",
            ));
        }
        if self.price_per_month == 0 {
            return Err(ServiceError::validation("monthly price must be positive"));
        }
        if !self.size_sqm.is_finite() || self.size_sqm <= 0.0 {
            return Err(ServiceError::validation("size must be a positive area"));
        }
        Ok(())
    }

    /// New listings may never start out occupied.
    pub fn validate_new(&self) -> Result<(), ServiceError> {
        self.validate()?;
        if self.status == ApartmentStatus::Occupied {
            return Err(ServiceError::validation(
                "occupancy is recorded by approving a reservation",
            ));
        }
        Ok(())
    }

    pub(crate) fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.unit_number = self.unit_number.trim().to_string();
        self
    }
}

/// Listing filters accepted by the apartment search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApartmentFilter {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default, rename = "type")]
    pub apartment_type: Option<ApartmentType>,
    #[serde(default)]
    pub status: Option<ApartmentStatus>,
    #[serde(default)]
    pub min_price: Option<u32>,
    #[serde(default)]
    pub max_price: Option<u32>,
}

impl ApartmentFilter {
    pub fn matches(&self, apartment: &Apartment) -> bool {
        if let Some(search) = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
        {
            let needle = search.to_lowercase();
            let hit = [
                &apartment.name,
                &apartment.unit_number,
                &apartment.description,
            ]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }

        if self
            .apartment_type
            .is_some_and(|kind| kind != apartment.apartment_type)
        {
            return false;
        }
        if self.status.is_some_and(|status| status != apartment.status) {
            return false;
        }
        if self
            .min_price
            .is_some_and(|min| apartment.price_per_month < min)
        {
            return false;
        }
        if self
            .max_price
            .is_some_and(|max| apartment.price_per_month > max)
        {
            return false;
        }
        true
    }
}
