#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Business registry record types.
//!
//! [`BusinessDetails`] and [`BusinessSearchResult`] mirror the JSON returned
//! by the state corporations and charities filing API. [`PrincipalRow`] and
//! [`RelatedCompany`] are the flat tables derived from them, with column
//! names matching the ownership spreadsheets analysts already work with.

use serde::{Deserialize, Deserializer, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Whether a principal is a company or a person.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum EntityType {
    /// Another registered business.
    Entity,
    /// A natural person.
    #[default]
    Individual,
}

impl EntityType {
    /// Maps the registry's one-letter `TypeID`; only `E` is an entity.
    #[must_use]
    pub fn from_type_id(type_id: Option<&str>) -> Self {
        match type_id.map(str::trim) {
            Some("E") => Self::Entity,
            _ => Self::Individual,
        }
    }
}

/// Registered agent of a business.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Agent {
    /// Agent's registered name.
    #[serde(default)]
    pub entity_name: Option<String>,
}

/// A postal address as the registry formats it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Address {
    /// Single-line address.
    #[serde(default)]
    pub full_address: Option<String>,
}

/// Principal office of a business.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PrincipalOffice {
    /// Street address of the office.
    #[serde(default)]
    pub principal_street_address: Option<Address>,
}

/// One entry of a business's `PrincipalsList`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PrincipalEntry {
    /// `E` for an entity; anything else is an individual.
    #[serde(rename = "TypeID", default)]
    pub type_id: Option<String>,
    /// Registry identifier of the principal.
    #[serde(rename = "PrincipalID", default, deserialize_with = "id_string")]
    pub principal_id: String,
    /// Entity name, set for entity principals.
    #[serde(default)]
    pub name: Option<String>,
    /// Given name, set for individuals.
    #[serde(default)]
    pub first_name: Option<String>,
    /// Family name, set for individuals.
    #[serde(default)]
    pub last_name: Option<String>,
}

impl PrincipalEntry {
    /// Entity or individual, from [`Self::type_id`].
    #[must_use]
    pub fn entity_type(&self) -> EntityType {
        EntityType::from_type_id(self.type_id.as_deref())
    }

    /// The entity name for entities, otherwise "First Last".
    #[must_use]
    pub fn display_name(&self) -> String {
        match self.entity_type() {
            EntityType::Entity => self.name.as_deref().unwrap_or_default().trim().to_owned(),
            EntityType::Individual => [self.first_name.as_deref(), self.last_name.as_deref()]
                .into_iter()
                .flatten()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

/// Response of the business information endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BusinessDetails {
    /// Unified Business Identifier.
    #[serde(rename = "UBINumber", default)]
    pub ubi_number: Option<String>,
    /// Registry status, e.g. `ACTIVE`.
    #[serde(default)]
    pub business_status: Option<String>,
    #[serde(default)]
    pub agent: Option<Agent>,
    #[serde(default)]
    pub principal_office: Option<PrincipalOffice>,
    /// Governors and officers; `null` is read as empty.
    #[serde(default, deserialize_with = "null_as_default")]
    pub principals_list: Vec<PrincipalEntry>,
}

impl BusinessDetails {
    /// The registered agent's name, or an empty string.
    #[must_use]
    pub fn agent_name(&self) -> &str {
        self.agent
            .as_ref()
            .and_then(|a| a.entity_name.as_deref())
            .unwrap_or_default()
    }

    /// The principal office street address, or an empty string.
    #[must_use]
    pub fn office_address(&self) -> &str {
        self.principal_office
            .as_ref()
            .and_then(|o| o.principal_street_address.as_ref())
            .and_then(|a| a.full_address.as_deref())
            .unwrap_or_default()
    }
}

/// One hit from the principal search endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BusinessSearchResult {
    #[serde(rename = "BusinessID", deserialize_with = "id_string")]
    pub business_id: String,
    #[serde(default)]
    pub business_name: String,
    #[serde(rename = "UBINumber", default)]
    pub ubi_number: Option<String>,
}

/// A business to look up, as listed in a matches spreadsheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessRef {
    /// Registry business identifier.
    #[serde(rename = "BusinessId")]
    pub business_id: String,
    /// Registered business name.
    #[serde(rename = "BusinessName", default)]
    pub business_name: String,
    /// Owner name that was matched to this business.
    #[serde(rename = "SearchTerm", default)]
    pub search_term: String,
}

/// One principal of one business, flattened for CSV output.
///
/// A business with several principals appears on several rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PrincipalRow {
    /// Owner name that led to this business, if any.
    #[serde(default)]
    pub search_term: String,
    #[serde(rename = "UBINumber", default)]
    pub ubi_number: String,
    pub business_id: String,
    #[serde(default)]
    pub business_name: String,
    /// Registered agent name.
    #[serde(default)]
    pub agent: String,
    #[serde(default)]
    pub entity_type: EntityType,
    #[serde(rename = "PrincipalID", default)]
    pub principal_id: String,
    /// See [`PrincipalEntry::display_name`].
    #[serde(default)]
    pub principal_name: String,
    /// Principal office address of the business.
    #[serde(default)]
    pub address: String,
    /// Registry status of the business.
    #[serde(default)]
    pub status: String,
}

/// A company that shares a principal with a matched business.
///
/// `is_match` and `notes` are left blank for manual review.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RelatedCompany {
    pub search_term: String,
    /// The business the search term was matched to.
    pub business_name: String,
    /// A business sharing at least one principal with it.
    pub potential_related_company: String,
    #[serde(rename = "UBINumber")]
    pub ubi_number: String,
    pub business_id: String,
    pub address: String,
    pub status: String,
    pub agent: String,
    /// Sorted principal names of the related company, `; `-separated.
    pub principals: String,
    #[serde(rename = "isMatch")]
    pub is_match: String,
    #[serde(rename = "notes")]
    pub notes: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts an identifier written as either a JSON number or a string.
fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s.trim().to_owned()),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected an identifier, got {other}"
        ))),
    }
}
