use crate::data::MemberRecord;

pub fn member(age: u32, gender: &str, workout_type: &str, calories: f64) -> MemberRecord {
    MemberRecord {
        age,
        gender: gender.to_string(),
        workout_type: workout_type.to_string(),
        calories_burned: calories,
        session_duration: 1.0,
        avg_bpm: 140.0,
        workout_frequency: 3.0,
        bmi: 24.0,
        fat_percentage: 20.0,
    }
}

/// Three rows: (25, M, Cardio, 300), (25, F, Cardio, 250), (30, M, HIIT, 400).
pub fn sample_members() -> Vec<MemberRecord> {
    vec![
        MemberRecord {
            session_duration: 1.5,
            avg_bpm: 150.0,
            workout_frequency: 4.0,
            bmi: 22.0,
            fat_percentage: 15.0,
            ..member(25, "M", "Cardio", 300.0)
        },
        MemberRecord {
            session_duration: 1.0,
            avg_bpm: 135.0,
            workout_frequency: 3.0,
            bmi: 26.0,
            fat_percentage: 25.0,
            ..member(25, "F", "Cardio", 250.0)
        },
        MemberRecord {
            session_duration: 0.75,
            avg_bpm: 160.0,
            workout_frequency: 5.0,
            bmi: 30.0,
            fat_percentage: 18.0,
            ..member(30, "M", "HIIT", 400.0)
        },
    ]
}
