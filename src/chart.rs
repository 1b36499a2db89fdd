//! The six charts served by the application.
//!
//! [`ChartData::prepare`] turns a [`FilteredView`] into plain aggregate data.
//! [`render`] wraps that data in a [`Figure`] with the chart's title, labels
//! and colors and hands it to a [`Canvas`].

use std::fmt;
use std::str::FromStr;

use crate::aggregate::{self, Histogram};
use crate::error::{Error, Result};
use crate::filter::FilteredView;
use crate::graph::{BarStyle, Canvas, Figure, Layer, LineStyle, PieStyle, PointStyle};
use crate::{OutputFormat, RenderOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartKind {
    HeartRate,
    CaloriesByWorkout,
    FrequencyByAge,
    BmiDistribution,
    FatVsCalories,
    WorkoutPopularity,
}

impl ChartKind {
    pub const ALL: [ChartKind; 6] = [
        ChartKind::HeartRate,
        ChartKind::CaloriesByWorkout,
        ChartKind::FrequencyByAge,
        ChartKind::BmiDistribution,
        ChartKind::FatVsCalories,
        ChartKind::WorkoutPopularity,
    ];

    /// URL path segment and CLI name.
    pub fn slug(&self) -> &'static str {
        match self {
            ChartKind::HeartRate => "heart_rate_analysis",
            ChartKind::CaloriesByWorkout => "calories_by_workout",
            ChartKind::FrequencyByAge => "workout_frequency_by_age",
            ChartKind::BmiDistribution => "bmi_distribution",
            ChartKind::FatVsCalories => "fat_vs_calories",
            ChartKind::WorkoutPopularity => "workout_type_popularity",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ChartKind::HeartRate => "Average BPM Trend Over Sessions",
            ChartKind::CaloriesByWorkout => "Average Calories Burned per Workout Type",
            ChartKind::FrequencyByAge => "Workout Frequency by Age Group",
            ChartKind::BmiDistribution => "BMI Distribution",
            ChartKind::FatVsCalories => "Fat Percentage vs. Calories Burned",
            ChartKind::WorkoutPopularity => "Workout Type Popularity",
        }
    }

    fn axis_labels(&self) -> (&'static str, &'static str) {
        match self {
            ChartKind::HeartRate => ("Session Duration", "Average BPM"),
            ChartKind::CaloriesByWorkout => ("Workout Type", "Average Calories Burned"),
            ChartKind::FrequencyByAge => ("Age", "Workout Frequency (Days/Week)"),
            ChartKind::BmiDistribution => ("BMI", "Frequency"),
            ChartKind::FatVsCalories => ("Fat Percentage", "Calories Burned"),
            ChartKind::WorkoutPopularity => ("", ""),
        }
    }

    /// Pixel size used when the request does not specify one.
    pub fn default_size(&self) -> (u32, u32) {
        match self {
            ChartKind::HeartRate => (1200, 600),
            _ => (1000, 600),
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for ChartKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ChartKind::ALL
            .into_iter()
            .find(|k| k.slug() == s)
            .ok_or_else(|| Error::invalid(format!("unknown chart '{}'", s)))
    }
}

/// Aggregate data behind one chart.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartData {
    Trend(Vec<(f64, f64)>),
    Scatter(Vec<(f64, f64)>),
    Means(Vec<(String, f64)>),
    Counts(Vec<(String, usize)>),
    Bins(Histogram),
}

impl ChartData {
    pub fn prepare(kind: ChartKind, view: &FilteredView) -> Self {
        match kind {
            ChartKind::HeartRate => ChartData::Trend(aggregate::bpm_trend(view)),
            ChartKind::CaloriesByWorkout => ChartData::Means(aggregate::calories_by_workout(view)),
            ChartKind::FrequencyByAge => ChartData::Means(
                aggregate::frequency_by_age(view)
                    .into_iter()
                    .map(|(age, m)| (age.to_string(), m))
                    .collect(),
            ),
            ChartKind::BmiDistribution => ChartData::Bins(aggregate::bmi_distribution(view)),
            ChartKind::FatVsCalories => ChartData::Scatter(aggregate::fat_vs_calories(view)),
            ChartKind::WorkoutPopularity => ChartData::Counts(aggregate::workout_popularity(view)),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ChartData::Trend(p) | ChartData::Scatter(p) => p.is_empty(),
            ChartData::Means(m) => m.is_empty(),
            ChartData::Counts(c) => c.is_empty(),
            ChartData::Bins(h) => h.is_empty(),
        }
    }
}

/// Encoded chart image.
#[derive(Debug, Clone)]
pub struct RenderedChart {
    pub kind: ChartKind,
    pub format: OutputFormat,
    pub bytes: Vec<u8>,
}

impl RenderedChart {
    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }
}

/// Build the figure for `kind` from prepared data.
pub fn figure(kind: ChartKind, data: ChartData) -> Figure {
    let (x_label, y_label) = kind.axis_labels();

    let layer = match data {
        ChartData::Trend(points) => Layer::Line {
            points,
            style: LineStyle {
                color: Some("royalblue".to_string()),
                width: Some(2),
                legend: Some("Avg BPM".to_string()),
            },
        },
        ChartData::Scatter(points) => Layer::Points {
            points,
            style: PointStyle {
                color: Some("purple".to_string()),
                size: Some(3),
                alpha: Some(0.5),
            },
        },
        ChartData::Means(means) => {
            let color = match kind {
                ChartKind::FrequencyByAge => "lightgreen",
                _ => "salmon",
            };
            let (categories, values) = means.into_iter().unzip();
            Layer::Bars {
                categories,
                values,
                style: BarStyle {
                    color: Some(color.to_string()),
                    edge_color: None,
                    width: Some(0.8),
                },
            }
        }
        ChartData::Bins(Histogram { edges, counts }) => Layer::Histogram {
            edges,
            counts: counts.into_iter().map(|c| c as f64).collect(),
            style: BarStyle {
                color: Some("skyblue".to_string()),
                edge_color: Some("black".to_string()),
                width: None,
            },
        },
        ChartData::Counts(counts) => Layer::Pie {
            slices: counts.into_iter().map(|(k, c)| (k, c as f64)).collect(),
            style: PieStyle {
                colors: ["#ff9999", "#66b3ff", "#99ff99", "#ffcc99"]
                    .iter()
                    .map(|c| c.to_string())
                    .collect(),
                start_angle: 140.0,
            },
        },
    };

    Figure {
        title: kind.title().to_string(),
        x_label: x_label.to_string(),
        y_label: y_label.to_string(),
        grid: kind == ChartKind::HeartRate,
        layer,
    }
}

/// Aggregate the view for `kind` and draw it.
///
/// An empty view is reported as [`Error::NoData`] rather than drawn as a
/// blank frame.
pub fn render(kind: ChartKind, view: &FilteredView, options: &RenderOptions) -> Result<RenderedChart> {
    let (width, height) = options.dimensions(kind.default_size())?;

    let data = ChartData::prepare(kind, view);
    if data.is_empty() {
        return Err(Error::NoData(kind));
    }

    log::debug!(
        "rendering {} over {} rows as {}x{} {:?}",
        kind,
        view.len(),
        width,
        height,
        options.format
    );

    let bytes = Canvas::new(width, height, options.format).render(&figure(kind, data))?;

    Ok(RenderedChart {
        kind,
        format: options.format,
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{filter, FilterCriteria};
    use crate::test_support::sample_members;

    #[test]
    fn test_slug_round_trip() {
        for kind in ChartKind::ALL {
            assert_eq!(kind.slug().parse::<ChartKind>().unwrap(), kind);
        }
        assert!(matches!("pie".parse::<ChartKind>(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_prepare_frequency_by_age_uses_age_labels() {
        let data = sample_members();
        let view = filter(&data, &FilterCriteria::new());
        assert_eq!(
            ChartData::prepare(ChartKind::FrequencyByAge, &view),
            ChartData::Means(vec![("25".to_string(), 3.5), ("30".to_string(), 5.0)])
        );
    }

    #[test]
    fn test_figure_styles() {
        let data = sample_members();
        let view = filter(&data, &FilterCriteria::new());

        let fig = figure(
            ChartKind::WorkoutPopularity,
            ChartData::prepare(ChartKind::WorkoutPopularity, &view),
        );
        match fig.layer {
            Layer::Pie { slices, style } => {
                assert_eq!(slices, vec![("Cardio".to_string(), 2.0), ("HIIT".to_string(), 1.0)]);
                assert_eq!(style.start_angle, 140.0);
                assert_eq!(style.colors.len(), 4);
            }
            other => panic!("Expected pie layer, got {:?}", other),
        }

        let fig = figure(
            ChartKind::BmiDistribution,
            ChartData::prepare(ChartKind::BmiDistribution, &view),
        );
        assert_eq!(fig.title, "BMI Distribution");
        assert!(!fig.grid);
        match fig.layer {
            Layer::Histogram { edges, counts, .. } => {
                assert_eq!(edges.len(), 21);
                assert_eq!(counts.iter().sum::<f64>(), 3.0);
            }
            other => panic!("Expected histogram layer, got {:?}", other),
        }
    }

    #[test]
    fn test_render_empty_view_is_no_data() {
        let data = sample_members();
        let view = filter(&data, &FilterCriteria::new().age(99));
        for kind in ChartKind::ALL {
            let err = render(kind, &view, &RenderOptions::default()).unwrap_err();
            assert!(matches!(err, Error::NoData(k) if k == kind));
        }
    }

    #[test]
    fn test_render_rejects_bad_dimensions_before_drawing() {
        let data = sample_members();
        let view = filter(&data, &FilterCriteria::new());
        let options = RenderOptions { width: Some(0), ..Default::default() };
        assert!(matches!(
            render(ChartKind::HeartRate, &view, &options),
            Err(Error::InvalidInput(_))
        ));
    }
}
