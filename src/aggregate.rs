// Aggregates over a filtered view.
//
// Empty views never fail: the mean becomes `None` and every collection comes
// back empty.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::filter::FilteredView;

pub const BMI_BINS: usize = 20;

/// Numbers shown on the analysis page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub average_calories: Option<f64>,
    pub total_sessions: usize,
}

pub fn summary(view: &FilteredView) -> Summary {
    Summary {
        average_calories: mean_calories(view),
        total_sessions: row_count(view),
    }
}

pub fn mean_calories(view: &FilteredView) -> Option<f64> {
    mean(view.iter().map(|r| r.calories_burned))
}

pub fn row_count(view: &FilteredView) -> usize {
    view.len()
}

/// (Session_Duration, Avg_BPM) in row order.
pub fn bpm_trend(view: &FilteredView) -> Vec<(f64, f64)> {
    view.iter().map(|r| (r.session_duration, r.avg_bpm)).collect()
}

/// (Fat_Percentage, Calories_Burned) in row order.
pub fn fat_vs_calories(view: &FilteredView) -> Vec<(f64, f64)> {
    view.iter().map(|r| (r.fat_percentage, r.calories_burned)).collect()
}

/// Mean calories per workout type, ascending by mean. Equal means stay in
/// name order.
pub fn calories_by_workout(view: &FilteredView) -> Vec<(String, f64)> {
    let mut groups: BTreeMap<&str, RunningMean> = BTreeMap::new();
    for r in view.iter() {
        groups.entry(r.workout_type.as_str()).or_default().push(r.calories_burned);
    }

    let mut out: Vec<(String, f64)> = groups
        .into_iter()
        .map(|(k, m)| (k.to_string(), m.value()))
        .collect();
    out.sort_by(|a, b| a.1.total_cmp(&b.1));
    out
}

/// Mean workout frequency (days/week) per age, ascending by age.
pub fn frequency_by_age(view: &FilteredView) -> Vec<(u32, f64)> {
    let mut groups: BTreeMap<u32, RunningMean> = BTreeMap::new();
    for r in view.iter() {
        groups.entry(r.age).or_default().push(r.workout_frequency);
    }
    groups.into_iter().map(|(age, m)| (age, m.value())).collect()
}

/// Occurrences of each workout type, most popular first. Ties keep the order
/// in which the types were first seen.
pub fn workout_popularity(view: &FilteredView) -> Vec<(String, usize)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();
    for r in view.iter() {
        match index.get(r.workout_type.as_str()) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(r.workout_type.as_str(), counts.len());
                counts.push((r.workout_type.clone(), 1));
            }
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Equal-width histogram. `edges` has one more entry than `counts`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

pub fn bmi_distribution(view: &FilteredView) -> Histogram {
    let values: Vec<f64> = view.iter().map(|r| r.bmi).collect();
    histogram(&values, BMI_BINS)
}

/// Bin `values` into `bins` equal-width buckets spanning min..max. The last
/// bucket is closed on the right; a zero-width range is widened by 0.5 each
/// side. NaN and infinite values are not counted.
pub fn histogram(values: &[f64], bins: usize) -> Histogram {
    let values: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if values.is_empty() || bins == 0 {
        return Histogram {
            edges: Vec::new(),
            counts: Vec::new(),
        };
    }

    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let (lo, hi) = if min == max { (min - 0.5, max + 0.5) } else { (min, max) };
    let width = (hi - lo) / bins as f64;

    let edges: Vec<f64> = (0..=bins).map(|i| lo + i as f64 * width).collect();
    let mut counts = vec![0usize; bins];
    for v in values {
        let idx = (((v - lo) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }

    Histogram { edges, counts }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let mut m = RunningMean::default();
    for v in values {
        m.push(v);
    }
    (m.count > 0).then(|| m.value())
}

#[derive(Debug, Default, Clone, Copy)]
struct RunningMean {
    sum: f64,
    count: usize,
}

impl RunningMean {
    fn push(&mut self, v: f64) {
        self.sum += v;
        self.count += 1;
    }

    fn value(&self) -> f64 {
        self.sum / self.count as f64
    }
}
