//! Character types - the merged entity view and the add/update payload

use crate::linker::RelationKind;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

/// Descriptive columns a caller may set on a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarField {
    Name,
    Height,
    Mass,
    HairColor,
    SkinColor,
    EyeColor,
    BirthYear,
    Gender,
    Homeworld,
}

impl ScalarField {
    /// Column name in the `people` table
    pub fn column(&self) -> &'static str {
        match self {
            ScalarField::Name => "name",
            ScalarField::Height => "height",
            ScalarField::Mass => "mass",
            ScalarField::HairColor => "hair_color",
            ScalarField::SkinColor => "skin_color",
            ScalarField::EyeColor => "eye_color",
            ScalarField::BirthYear => "birth_year",
            ScalarField::Gender => "gender",
            ScalarField::Homeworld => "homeworld",
        }
    }

    /// Get all scalar fields, in column order
    pub fn all() -> &'static [ScalarField] {
        &[
            ScalarField::Name,
            ScalarField::Height,
            ScalarField::Mass,
            ScalarField::HairColor,
            ScalarField::SkinColor,
            ScalarField::EyeColor,
            ScalarField::BirthYear,
            ScalarField::Gender,
            ScalarField::Homeworld,
        ]
    }
}

impl FromStr for ScalarField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScalarField::all()
            .iter()
            .copied()
            .find(|field| field.column() == s)
            .ok_or_else(|| format!("Unknown character field: {}", s))
    }
}

/// A character with its memberships flattened in.
///
/// The four membership sets are derived at read time from the junction
/// tables; they are never stored on the `people` row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: String,
    pub url: Option<String>,
    pub created: String,
    pub edited: Option<String>,
    pub name: Option<String>,
    pub height: Option<String>,
    pub mass: Option<String>,
    pub hair_color: Option<String>,
    pub skin_color: Option<String>,
    pub eye_color: Option<String>,
    pub birth_year: Option<String>,
    pub gender: Option<String>,
    pub homeworld: Option<String>,
    #[serde(rename = "vehicles_id")]
    pub vehicle_ids: BTreeSet<String>,
    #[serde(rename = "vehicles_name")]
    pub vehicle_names: BTreeSet<String>,
    #[serde(rename = "starships_id")]
    pub starship_ids: BTreeSet<String>,
    #[serde(rename = "starships_name")]
    pub starship_names: BTreeSet<String>,
}

impl Character {
    pub fn scalar(&self, field: ScalarField) -> Option<&str> {
        let value = match field {
            ScalarField::Name => &self.name,
            ScalarField::Height => &self.height,
            ScalarField::Mass => &self.mass,
            ScalarField::HairColor => &self.hair_color,
            ScalarField::SkinColor => &self.skin_color,
            ScalarField::EyeColor => &self.eye_color,
            ScalarField::BirthYear => &self.birth_year,
            ScalarField::Gender => &self.gender,
            ScalarField::Homeworld => &self.homeworld,
        };
        value.as_deref()
    }

    pub(crate) fn scalar_mut(&mut self, field: ScalarField) -> &mut Option<String> {
        match field {
            ScalarField::Name => &mut self.name,
            ScalarField::Height => &mut self.height,
            ScalarField::Mass => &mut self.mass,
            ScalarField::HairColor => &mut self.hair_color,
            ScalarField::SkinColor => &mut self.skin_color,
            ScalarField::EyeColor => &mut self.eye_color,
            ScalarField::BirthYear => &mut self.birth_year,
            ScalarField::Gender => &mut self.gender,
            ScalarField::Homeworld => &mut self.homeworld,
        }
    }

    /// Conveyance ids linked through the given relation
    pub fn relation_ids(&self, kind: RelationKind) -> &BTreeSet<String> {
        match kind {
            RelationKind::Vehicles => &self.vehicle_ids,
            RelationKind::Starships => &self.starship_ids,
        }
    }

    /// Conveyance names linked through the given relation
    pub fn relation_names(&self, kind: RelationKind) -> &BTreeSet<String> {
        match kind {
            RelationKind::Vehicles => &self.vehicle_names,
            RelationKind::Starships => &self.starship_names,
        }
    }
}

/// Input for `CharacterStore::add` and `CharacterStore::update`.
///
/// Scalars distinguish three states: key absent (`None`, column untouched on
/// update and NULL on add), explicit null (`Some(None)`, stored as NULL) and
/// a value. Membership lists distinguish absent or null (`None`, relation
/// untouched) from a supplied list, where `[]` means "no conveyances".
/// Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CharacterPayload {
    #[serde(default, deserialize_with = "present_scalar")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present_scalar")]
    pub height: Option<Option<String>>,
    #[serde(default, deserialize_with = "present_scalar")]
    pub mass: Option<Option<String>>,
    #[serde(default, deserialize_with = "present_scalar")]
    pub hair_color: Option<Option<String>>,
    #[serde(default, deserialize_with = "present_scalar")]
    pub skin_color: Option<Option<String>>,
    #[serde(default, deserialize_with = "present_scalar")]
    pub eye_color: Option<Option<String>>,
    #[serde(default, deserialize_with = "present_scalar")]
    pub birth_year: Option<Option<String>>,
    #[serde(default, deserialize_with = "present_scalar")]
    pub gender: Option<Option<String>>,
    #[serde(default, deserialize_with = "present_scalar")]
    pub homeworld: Option<Option<String>>,
    #[serde(default, deserialize_with = "id_list")]
    pub vehicles_id: Option<Vec<String>>,
    #[serde(default, deserialize_with = "id_list")]
    pub starships_id: Option<Vec<String>>,
}

impl CharacterPayload {
    /// Supplied value of a scalar: `None` when the key was absent
    pub fn scalar(&self, field: ScalarField) -> Option<Option<&str>> {
        let value = match field {
            ScalarField::Name => &self.name,
            ScalarField::Height => &self.height,
            ScalarField::Mass => &self.mass,
            ScalarField::HairColor => &self.hair_color,
            ScalarField::SkinColor => &self.skin_color,
            ScalarField::EyeColor => &self.eye_color,
            ScalarField::BirthYear => &self.birth_year,
            ScalarField::Gender => &self.gender,
            ScalarField::Homeworld => &self.homeworld,
        };
        value.as_ref().map(Option::as_deref)
    }

    /// Scalars whose keys were present, in column order
    pub fn supplied_scalars(&self) -> Vec<(ScalarField, Option<&str>)> {
        ScalarField::all()
            .iter()
            .filter_map(|&field| self.scalar(field).map(|value| (field, value)))
            .collect()
    }

    /// Desired membership for a relation, if a list was supplied
    pub fn relation_ids(&self, kind: RelationKind) -> Option<&[String]> {
        match kind {
            RelationKind::Vehicles => self.vehicles_id.as_deref(),
            RelationKind::Starships => self.starships_id.as_deref(),
        }
    }

    pub fn with_scalar(mut self, field: ScalarField, value: Option<&str>) -> Self {
        let value = Some(value.map(str::to_string));
        match field {
            ScalarField::Name => self.name = value,
            ScalarField::Height => self.height = value,
            ScalarField::Mass => self.mass = value,
            ScalarField::HairColor => self.hair_color = value,
            ScalarField::SkinColor => self.skin_color = value,
            ScalarField::EyeColor => self.eye_color = value,
            ScalarField::BirthYear => self.birth_year = value,
            ScalarField::Gender => self.gender = value,
            ScalarField::Homeworld => self.homeworld = value,
        }
        self
    }

    pub fn with_relation<I, S>(mut self, kind: RelationKind, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids = Some(ids.into_iter().map(Into::into).collect());
        match kind {
            RelationKind::Vehicles => self.vehicles_id = ids,
            RelationKind::Starships => self.starships_id = ids,
        }
        self
    }
}

/// JSON scalars and ids may arrive as strings or numbers
#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl From<Lenient> for String {
    fn from(value: Lenient) -> Self {
        match value {
            Lenient::Text(s) => s,
            Lenient::Integer(i) => i.to_string(),
            Lenient::Float(f) => f.to_string(),
        }
    }
}

// Only called when the key is present, so a null lands as `Some(None)`
fn present_scalar<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Lenient>::deserialize(deserializer)?;
    Ok(Some(value.map(String::from)))
}

fn id_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let ids = Option::<Vec<Lenient>>::deserialize(deserializer)?;
    Ok(ids.map(|ids| ids.into_iter().map(String::from).collect()))
}
