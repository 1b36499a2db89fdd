use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

/// One row of the gym members dataset.
///
/// The published dataset suffixes two headers with their unit, so both
/// spellings are accepted.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MemberRecord {
    #[serde(rename = "Age")]
    pub age: u32,
    #[serde(rename = "Gender")]
    pub gender: String,
    #[serde(rename = "Workout_Type")]
    pub workout_type: String,
    #[serde(rename = "Calories_Burned")]
    pub calories_burned: f64,
    #[serde(rename = "Session_Duration", alias = "Session_Duration (hours)")]
    pub session_duration: f64,
    #[serde(rename = "Avg_BPM")]
    pub avg_bpm: f64,
    #[serde(rename = "Workout_Frequency", alias = "Workout_Frequency (days/week)")]
    pub workout_frequency: f64,
    #[serde(rename = "BMI")]
    pub bmi: f64,
    #[serde(rename = "Fat_Percentage")]
    pub fat_percentage: f64,
}

/// One row of the exercise catalog. The unnamed leading index column is skipped.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExerciseRecord {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Desc", default)]
    pub desc: String,
    #[serde(rename = "Type")]
    pub kind: String,
    #[serde(rename = "BodyPart")]
    pub body_part: String,
    #[serde(rename = "Equipment")]
    pub equipment: String,
    #[serde(rename = "Level")]
    pub level: String,
    #[serde(rename = "Rating", default)]
    pub rating: Option<f64>,
    #[serde(rename = "RatingDesc", default)]
    pub rating_desc: Option<String>,
}

/// Immutable handle over both datasets, built once at startup.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    members: Vec<MemberRecord>,
    exercises: Vec<ExerciseRecord>,
}

impl Dataset {
    pub fn new(members: Vec<MemberRecord>, exercises: Vec<ExerciseRecord>) -> Self {
        Self { members, exercises }
    }

    /// Load the members CSV and, if given, the exercise catalog CSV.
    pub fn load(members_path: &Path, exercises_path: Option<&Path>) -> Result<Self> {
        let members = load_members(members_path)?;
        let exercises = match exercises_path {
            Some(path) => load_exercises(path)?,
            None => Vec::new(),
        };
        Ok(Self { members, exercises })
    }

    pub fn members(&self) -> &[MemberRecord] {
        &self.members
    }

    pub fn exercises(&self) -> &[ExerciseRecord] {
        &self.exercises
    }
}

pub fn load_members(path: &Path) -> Result<Vec<MemberRecord>> {
    let rows = read_path(path)?;
    log::info!("loaded {} member records from {}", rows.len(), path.display());
    Ok(rows)
}

pub fn load_exercises(path: &Path) -> Result<Vec<ExerciseRecord>> {
    let rows = read_path(path)?;
    log::info!("loaded {} exercise records from {}", rows.len(), path.display());
    Ok(rows)
}

fn read_path<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Vec<T>> {
    let startup = |source| Error::Startup {
        path: path.to_path_buf(),
        source,
    };
    let reader = csv::Reader::from_path(path).map_err(startup)?;
    collect_records(reader).map_err(startup)
}

/// Parse member rows from any reader, e.g. an in-memory CSV string.
pub fn members_from_reader<R: Read>(rdr: R) -> Result<Vec<MemberRecord>> {
    collect_records(csv::Reader::from_reader(rdr)).map_err(|source| Error::Startup {
        path: PathBuf::from("<reader>"),
        source,
    })
}

fn collect_records<R: Read, T: for<'de> Deserialize<'de>>(
    mut reader: csv::Reader<R>,
) -> std::result::Result<Vec<T>, csv::Error> {
    reader.deserialize().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MEMBERS: &str = "\
Age,Gender,Weight (kg),Workout_Type,Calories_Burned,Session_Duration (hours),Avg_BPM,Workout_Frequency (days/week),BMI,Fat_Percentage
56,Male,88.3,Yoga,1313.0,1.69,157,4,30.2,12.6
46,Female,74.9,HIIT,883.0,1.3,151,4,32.0,33.9
";

    #[test]
    fn test_parse_members_with_unit_headers() {
        let rows = members_from_reader(MEMBERS.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].age, 56);
        assert_eq!(rows[0].workout_type, "Yoga");
        assert_eq!(rows[1].session_duration, 1.3);
        assert_eq!(rows[1].workout_frequency, 4.0);
    }

    #[test]
    fn test_parse_members_plain_headers() {
        let text = "Age,Gender,Workout_Type,Calories_Burned,Session_Duration,Avg_BPM,Workout_Frequency,BMI,Fat_Percentage\n\
                   25,M,Cardio,300,1.0,140,3,22.5,18.0\n";
        let rows = members_from_reader(text.as_bytes()).unwrap();
        assert_eq!(rows[0].gender, "M");
        assert_eq!(rows[0].calories_burned, 300.0);
    }

    #[test]
    fn test_missing_column_is_startup_error() {
        let text = "Age,Gender\n25,M\n";
        let err = members_from_reader(text.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Startup { .. }));
    }

    #[test]
    fn test_missing_file_is_startup_error() {
        let err = Dataset::load(Path::new("does/not/exist.csv"), None).unwrap_err();
        match err {
            Error::Startup { path, .. } => assert_eq!(path, PathBuf::from("does/not/exist.csv")),
            other => panic!("Expected Startup error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_exercises_skips_index_column() {
        let text = ",Title,Desc,Type,BodyPart,Equipment,Level,Rating,RatingDesc\n\
                   0,Partner plank band row,,Strength,Abdominals,Bands,Intermediate,0.0,\n\
                   1,Banded crunch isometric hold,Some text,Strength,Abdominals,Bands,Intermediate,,\n";
        let rows: Vec<ExerciseRecord> = collect_records(csv::Reader::from_reader(text.as_bytes())).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].title, "Partner plank band row");
        assert_eq!(rows[0].rating, Some(0.0));
        assert_eq!(rows[1].rating, None);
        assert_eq!(rows[1].desc, "Some text");
    }
}
