//! Infrastructure category definitions and the immutable table that holds
//! them.
//!
//! A category maps one scored concern (for example "metro") to the provider
//! place-type tags searched for it, together with the radii that calibrate
//! its proximity score and its weight in the aggregate.

use std::collections::HashSet;

use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Errors returned when a category definition or table is invalid.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CategoryError {
    /// The category identifier was empty or whitespace.
    #[error("category identifier must not be blank")]
    BlankId,
    /// No place-type tags were supplied, or one of them was blank.
    #[error("category {id} must list at least one non-blank place type")]
    MissingPlaceTypes {
        /// Offending category.
        id: String,
    },
    /// Radii were not finite, negative, or not strictly increasing.
    #[error("category {id} requires 0 <= ideal radius ({ideal_m}) < max radius ({max_m})")]
    InvalidRadii {
        /// Offending category.
        id: String,
        /// Supplied ideal radius in meters.
        ideal_m: f64,
        /// Supplied maximum radius in meters.
        max_m: f64,
    },
    /// The weight was not a positive finite number.
    #[error("category {id} weight must be positive and finite, got {weight}")]
    InvalidWeight {
        /// Offending category.
        id: String,
        /// Supplied weight.
        weight: f64,
    },
    /// Two categories share the same identifier.
    #[error("category {id} is defined more than once")]
    DuplicateId {
        /// Repeated identifier.
        id: String,
    },
    /// A JSON table could not be decoded.
    #[cfg(feature = "serde")]
    #[error("failed to parse category table: {message}")]
    Parse {
        /// Decoder error message.
        message: String,
    },
}

/// Static configuration for one infrastructure category.
///
/// # Examples
/// ```
/// use locality_core::CategoryDefinition;
///
/// # fn main() -> Result<(), locality_core::CategoryError> {
/// let bank = CategoryDefinition::new("bank", ["bank", "atm"], 1_000.0, 3_000.0, 0.10)?;
/// assert_eq!(bank.place_types, vec!["bank".to_owned(), "atm".to_owned()]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CategoryDefinition {
    /// Category identifier, e.g. `"metro"`.
    pub id: String,
    /// Provider place-type tags searched for this category.
    pub place_types: Vec<String>,
    /// Distance in meters at or under which proximity is maximal.
    pub ideal_radius_m: f64,
    /// Distance in meters at or beyond which proximity contributes nothing.
    /// Also used as the search radius.
    pub max_radius_m: f64,
    /// Relative weight in the aggregate score.
    pub weight: f64,
}

impl CategoryDefinition {
    /// Validates and constructs a [`CategoryDefinition`].
    ///
    /// # Errors
    /// Returns [`CategoryError`] when the identifier or tags are blank, the
    /// radii are not `0 <= ideal < max`, or the weight is not positive.
    pub fn new<I, S>(
        id: impl Into<String>,
        place_types: I,
        ideal_radius_m: f64,
        max_radius_m: f64,
        weight: f64,
    ) -> Result<Self, CategoryError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let definition = Self {
            id: id.into(),
            place_types: place_types.into_iter().map(Into::into).collect(),
            ideal_radius_m,
            max_radius_m,
            weight,
        };
        definition.validate()?;
        Ok(definition)
    }

    /// Check the invariants documented on [`CategoryDefinition::new`].
    ///
    /// # Errors
    /// See [`CategoryDefinition::new`].
    pub fn validate(&self) -> Result<(), CategoryError> {
        if self.id.trim().is_empty() {
            return Err(CategoryError::BlankId);
        }
        if self.place_types.is_empty() || self.place_types.iter().any(|t| t.trim().is_empty()) {
            return Err(CategoryError::MissingPlaceTypes {
                id: self.id.clone(),
            });
        }
        let radii_valid = self.ideal_radius_m.is_finite()
            && self.max_radius_m.is_finite()
            && self.ideal_radius_m >= 0.0
            && self.ideal_radius_m < self.max_radius_m;
        if !radii_valid {
            return Err(CategoryError::InvalidRadii {
                id: self.id.clone(),
                ideal_m: self.ideal_radius_m,
                max_m: self.max_radius_m,
            });
        }
        if !(self.weight.is_finite() && self.weight > 0.0) {
            return Err(CategoryError::InvalidWeight {
                id: self.id.clone(),
                weight: self.weight,
            });
        }
        Ok(())
    }
}

/// Ordered, immutable set of category definitions.
///
/// The order is significant: discovery results are assembled and ties in the
/// insight ranking are broken in table order.
///
/// # Examples
/// ```
/// use locality_core::CategoryTable;
///
/// let table = CategoryTable::default();
/// let ids: Vec<_> = table.iter().map(|c| c.id.as_str()).collect();
/// assert_eq!(ids, ["metro", "hospital", "school", "supermarket", "bank", "bus_stop"]);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct CategoryTable {
    categories: Vec<CategoryDefinition>,
}

impl CategoryTable {
    /// Validates every definition and rejects duplicate identifiers.
    ///
    /// An empty table is accepted; aggregating it yields the neutral score.
    ///
    /// # Errors
    /// Returns the first [`CategoryError`] encountered.
    pub fn new(categories: Vec<CategoryDefinition>) -> Result<Self, CategoryError> {
        let mut seen = HashSet::new();
        for category in &categories {
            category.validate()?;
            if !seen.insert(category.id.as_str()) {
                return Err(CategoryError::DuplicateId {
                    id: category.id.clone(),
                });
            }
        }
        Ok(Self { categories })
    }

    /// A table with no categories.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            categories: Vec::new(),
        }
    }

    /// Decode a JSON array of definitions and validate it.
    ///
    /// # Errors
    /// Returns [`CategoryError::Parse`] for malformed JSON and any
    /// validation error from [`CategoryTable::new`].
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self, CategoryError> {
        let categories: Vec<CategoryDefinition> =
            serde_json::from_str(json).map_err(|err| CategoryError::Parse {
                message: err.to_string(),
            })?;
        Self::new(categories)
    }

    /// Iterate over definitions in table order.
    pub fn iter(&self) -> impl Iterator<Item = &CategoryDefinition> {
        self.categories.iter()
    }

    /// Look up a definition by identifier.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&CategoryDefinition> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// Number of categories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Report whether the table has no categories.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Total number of place-type queries one analysis issues.
    #[must_use]
    pub fn query_count(&self) -> usize {
        self.categories.iter().map(|c| c.place_types.len()).sum()
    }
}

impl Default for CategoryTable {
    /// The six standard infrastructure categories.
    fn default() -> Self {
        let categories = vec![
            standard("metro", &["subway_station", "train_station"], 1_000.0, 5_000.0, 0.25),
            standard("hospital", &["hospital"], 2_000.0, 8_000.0, 0.20),
            standard(
                "school",
                &["school", "primary_school", "secondary_school"],
                1_500.0,
                5_000.0,
                0.15,
            ),
            standard(
                "supermarket",
                &["supermarket", "grocery_or_supermarket"],
                1_000.0,
                3_000.0,
                0.15,
            ),
            standard("bank", &["bank", "atm"], 1_000.0, 3_000.0, 0.10),
            standard("bus_stop", &["bus_station", "transit_station"], 500.0, 2_000.0, 0.15),
        ];
        Self { categories }
    }
}

impl<'a> IntoIterator for &'a CategoryTable {
    type Item = &'a CategoryDefinition;
    type IntoIter = std::slice::Iter<'a, CategoryDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.categories.iter()
    }
}

fn standard(id: &str, place_types: &[&str], ideal: f64, max: f64, weight: f64) -> CategoryDefinition {
    CategoryDefinition {
        id: id.to_owned(),
        place_types: place_types.iter().map(|&t| t.to_owned()).collect(),
        ideal_radius_m: ideal,
        max_radius_m: max,
        weight,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn default_table_is_valid() {
        let table = CategoryTable::default();
        let rebuilt = CategoryTable::new(table.iter().cloned().collect()).expect("valid table");
        assert_eq!(rebuilt.len(), 6);
        assert_eq!(table.query_count(), 12);
    }

    #[rstest]
    fn default_weights_sum_to_one() {
        let total: f64 = CategoryTable::default().iter().map(|c| c.weight).sum();
        assert!((total - 1.0).abs() < 1e-9, "got {total}");
    }

    #[rstest]
    #[case(1_000.0, 1_000.0)]
    #[case(2_000.0, 1_000.0)]
    #[case(-1.0, 1_000.0)]
    #[case(0.0, f64::INFINITY)]
    fn rejects_invalid_radii(#[case] ideal: f64, #[case] max: f64) {
        let err = CategoryDefinition::new("metro", ["subway_station"], ideal, max, 0.25)
            .expect_err("radii must be rejected");
        assert!(matches!(err, CategoryError::InvalidRadii { .. }));
    }

    #[rstest]
    #[case(0.0)]
    #[case(-0.5)]
    #[case(f64::NAN)]
    fn rejects_non_positive_weight(#[case] weight: f64) {
        let err = CategoryDefinition::new("metro", ["subway_station"], 500.0, 1_000.0, weight)
            .expect_err("weight must be rejected");
        assert!(matches!(err, CategoryError::InvalidWeight { .. }));
    }

    #[rstest]
    fn rejects_blank_tags() {
        let err = CategoryDefinition::new("metro", ["subway_station", " "], 500.0, 1_000.0, 1.0)
            .expect_err("blank tag must be rejected");
        assert!(matches!(err, CategoryError::MissingPlaceTypes { .. }));

        let empty: [&str; 0] = [];
        let err = CategoryDefinition::new("metro", empty, 500.0, 1_000.0, 1.0)
            .expect_err("empty tags must be rejected");
        assert!(matches!(err, CategoryError::MissingPlaceTypes { .. }));
    }

    #[rstest]
    fn rejects_duplicate_ids() {
        let a = CategoryDefinition::new("bank", ["bank"], 500.0, 1_000.0, 1.0).expect("valid");
        let err = CategoryTable::new(vec![a.clone(), a]).expect_err("duplicate ids");
        assert_eq!(err, CategoryError::DuplicateId { id: "bank".into() });
    }

    #[rstest]
    fn empty_table_is_allowed() {
        let table = CategoryTable::new(Vec::new()).expect("empty table");
        assert!(table.is_empty());
        assert_eq!(table, CategoryTable::empty());
    }

    #[cfg(feature = "serde")]
    #[rstest]
    fn parses_json_table() {
        let json = r#"[
            {"id": "metro", "place_types": ["subway_station"], "ideal_radius_m": 800.0,
             "max_radius_m": 4000.0, "weight": 2.0}
        ]"#;
        let table = CategoryTable::from_json(json).expect("parse table");
        let metro = table.get("metro").expect("metro present");
        assert_eq!(metro.ideal_radius_m, 800.0);
        assert_eq!(metro.weight, 2.0);
    }

    #[cfg(feature = "serde")]
    #[rstest]
    fn json_tables_are_validated() {
        let json = r#"[
            {"id": "metro", "place_types": ["subway_station"], "ideal_radius_m": 5000.0,
             "max_radius_m": 4000.0, "weight": 2.0}
        ]"#;
        let err = CategoryTable::from_json(json).expect_err("invalid radii");
        assert!(matches!(err, CategoryError::InvalidRadii { .. }));
    }

    #[cfg(feature = "serde")]
    #[rstest]
    fn malformed_json_is_reported() {
        let err = CategoryTable::from_json("{").expect_err("malformed");
        assert!(matches!(err, CategoryError::Parse { .. }));
    }
}
