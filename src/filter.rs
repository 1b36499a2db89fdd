use serde::Deserialize;

use crate::data::MemberRecord;
use crate::error::{Error, Result};

/// Filter fields exactly as they arrive from a form or query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCriteria {
    #[serde(default)]
    pub age: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub workout_type: Option<String>,
}

/// Validated equality constraints. `None` means the field is unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub workout_type: Option<String>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn age(mut self, age: i64) -> Self {
        self.age = Some(age);
        self
    }

    pub fn gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = Some(gender.into());
        self
    }

    pub fn workout_type(mut self, workout_type: impl Into<String>) -> Self {
        self.workout_type = Some(workout_type.into());
        self
    }

    /// Validate raw form fields. Empty strings count as absent; a non-integer
    /// age is rejected.
    pub fn parse(raw: &RawCriteria) -> Result<Self> {
        let age = match non_empty(&raw.age) {
            Some(s) => Some(
                s.trim()
                    .parse::<i64>()
                    .map_err(|_| Error::invalid(format!("age must be an integer, got '{}'", s)))?,
            ),
            None => None,
        };

        Ok(Self {
            age,
            gender: non_empty(&raw.gender).map(str::to_string),
            workout_type: non_empty(&raw.workout_type).map(str::to_string),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.age.is_none() && self.gender.is_none() && self.workout_type.is_none()
    }

    pub fn matches(&self, record: &MemberRecord) -> bool {
        if let Some(age) = self.age {
            if i64::from(record.age) != age {
                return false;
            }
        }
        if let Some(gender) = &self.gender {
            if record.gender != *gender {
                return false;
            }
        }
        if let Some(workout_type) = &self.workout_type {
            if record.workout_type != *workout_type {
                return false;
            }
        }
        true
    }
}

impl TryFrom<RawCriteria> for FilterCriteria {
    type Error = Error;

    fn try_from(raw: RawCriteria) -> Result<Self> {
        FilterCriteria::parse(&raw)
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

/// Rows of the dataset that satisfy a [`FilterCriteria`], in dataset order.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    rows: Vec<&'a MemberRecord>,
}

impl<'a> FilteredView<'a> {
    pub fn rows(&self) -> &[&'a MemberRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a MemberRecord> + '_ {
        self.rows.iter().copied()
    }
}

/// Apply every supplied criterion as an independent equality test (AND).
pub fn filter<'a>(dataset: &'a [MemberRecord], criteria: &FilterCriteria) -> FilteredView<'a> {
    let rows: Vec<&MemberRecord> = dataset.iter().filter(|r| criteria.matches(r)).collect();
    log::debug!(
        "filter {:?} kept {} of {} rows",
        criteria,
        rows.len(),
        dataset.len()
    );
    FilteredView { rows }
}
