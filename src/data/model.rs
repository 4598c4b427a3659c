use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::DatasetError;

// ---------------------------------------------------------------------------
// Record – one row of the source table
// ---------------------------------------------------------------------------

/// One (entity, period) observation, e.g. a country in a given year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    /// Drill-down unit (country).
    pub entity: String,
    /// Higher-level category (continent).
    pub group: String,
    /// Observation year.
    pub period: i32,
    pub life_expectancy: f64,
    /// Source data stores this as an integer; kept as `f64` so float sources load too.
    pub population: f64,
    pub gdp_per_capita: f64,
    /// ISO alpha-3 code used as the map location key.
    pub geo_code: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full dataset with a pre-computed entity index.
///
/// Records keep their input order. Construction through
/// [`Dataset::from_records`] guarantees that `(entity, period)` pairs are
/// unique and that every entity belongs to exactly one group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<Record>,
    /// Distinct entities in first-appearance order.
    entities: Vec<String>,
    /// entity → group.
    groups: BTreeMap<String, String>,
    /// Sorted distinct periods.
    periods: BTreeSet<i32>,
}

impl Dataset {
    /// Validate the invariants and build the entity index.
    pub fn from_records(records: Vec<Record>) -> Result<Self, DatasetError> {
        Self::validate(&records)?;
        Ok(Self::from_trusted(records))
    }

    fn validate(records: &[Record]) -> Result<(), DatasetError> {
        let mut seen: HashSet<(&str, i32)> = HashSet::with_capacity(records.len());
        let mut groups: BTreeMap<&str, &str> = BTreeMap::new();

        for rec in records {
            if !seen.insert((rec.entity.as_str(), rec.period)) {
                return Err(DatasetError::DuplicateObservation {
                    entity: rec.entity.clone(),
                    period: rec.period,
                });
            }
            match groups.get(rec.entity.as_str()) {
                Some(&first) if first != rec.group => {
                    return Err(DatasetError::GroupConflict {
                        entity: rec.entity.clone(),
                        first: first.to_string(),
                        second: rec.group.clone(),
                    });
                }
                Some(_) => {}
                None => {
                    groups.insert(rec.entity.as_str(), rec.group.as_str());
                }
            }
        }
        Ok(())
    }

    /// Build the index for records already known to satisfy the invariants
    /// (any subset of a valid dataset does).
    pub(crate) fn from_trusted(records: Vec<Record>) -> Self {
        let mut entities = Vec::new();
        let mut groups = BTreeMap::new();
        let mut periods = BTreeSet::new();

        for rec in &records {
            if !groups.contains_key(&rec.entity) {
                groups.insert(rec.entity.clone(), rec.group.clone());
                entities.push(rec.entity.clone());
            }
            periods.insert(rec.period);
        }

        Dataset {
            records,
            entities,
            groups,
            periods,
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Distinct entity names in first-appearance order.
    pub fn entities(&self) -> &[String] {
        &self.entities
    }

    pub fn contains_entity(&self, entity: &str) -> bool {
        self.groups.contains_key(entity)
    }

    pub fn group_of(&self, entity: &str) -> Option<&str> {
        self.groups.get(entity).map(String::as_str)
    }

    /// First and last period present, if any.
    pub fn period_range(&self) -> Option<(i32, i32)> {
        let first = *self.periods.first()?;
        let last = *self.periods.last()?;
        Some((first, last))
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Selection – the drill-down control value
// ---------------------------------------------------------------------------

/// Current drill-down choice: everything, or a single entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Selection {
    #[default]
    All,
    Entity(String),
}

impl Selection {
    /// Label used by the selector for the unfiltered option.
    pub const ALL_LABEL: &'static str = "All";

    pub fn entity(name: impl Into<String>) -> Self {
        Selection::Entity(name.into())
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::All => write!(f, "{}", Selection::ALL_LABEL),
            Selection::Entity(name) => write!(f, "{name}"),
        }
    }
}

impl FromStr for Selection {
    type Err = Infallible;

    /// `"All"` selects everything; any other text names an entity. Whether
    /// the entity exists is checked against a dataset at aggregation time.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == Selection::ALL_LABEL {
            Ok(Selection::All)
        } else {
            Ok(Selection::Entity(s.to_string()))
        }
    }
}

impl Serialize for Selection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
