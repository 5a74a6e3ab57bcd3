// Chart selection state machine and chart description models
use super::reading::TimeSeriesPoint;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ChartError {
    #[error("no temperature readings available to build the pie chart")]
    EmptySeries,
    #[error("failed to draw chart: {0}")]
    Draw(String),
}

/// The chart currently shown on the page. A new session starts on `Line`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartSelection {
    #[default]
    Line,
    Bar,
    Pie,
    Scatter,
}

impl ChartSelection {
    pub fn heading(&self) -> &'static str {
        match self {
            ChartSelection::Line => "Temperature Over Time",
            ChartSelection::Bar => "Temperature Distribution",
            ChartSelection::Pie => "Temperature Proportions",
            ChartSelection::Scatter => "Temperature Scatter Plot",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            ChartSelection::Line => "line",
            ChartSelection::Bar => "bar",
            ChartSelection::Pie => "pie",
            ChartSelection::Scatter => "scatter",
        }
    }

    /// Apply a trigger. Every trigger is accepted from every state.
    pub fn apply(self, trigger: Trigger) -> ChartSelection {
        transition(self, trigger)
    }
}

/// One user action on the page, carried by the selection form's `chart` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trigger {
    #[serde(rename = "line")]
    SelectLine,
    #[serde(rename = "bar")]
    SelectBar,
    #[serde(rename = "pie")]
    SelectPie,
    #[serde(rename = "scatter")]
    SelectScatter,
}

impl Trigger {
    pub const ALL: [Trigger; 4] = [
        Trigger::SelectLine,
        Trigger::SelectBar,
        Trigger::SelectPie,
        Trigger::SelectScatter,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Trigger::SelectLine => "Show Line Chart",
            Trigger::SelectBar => "Show Bar Chart",
            Trigger::SelectPie => "Show Pie Chart",
            Trigger::SelectScatter => "Show Scatter Plot",
        }
    }

    /// Form value sent by the trigger's button
    pub fn value(&self) -> &'static str {
        self.target().slug()
    }

    pub fn target(&self) -> ChartSelection {
        match self {
            Trigger::SelectLine => ChartSelection::Line,
            Trigger::SelectBar => ChartSelection::Bar,
            Trigger::SelectPie => ChartSelection::Pie,
            Trigger::SelectScatter => ChartSelection::Scatter,
        }
    }
}

pub fn transition(_current: ChartSelection, trigger: Trigger) -> ChartSelection {
    trigger.target()
}

/// Equal-width temperature interval. Half-open `[lower, upper)` unless
/// `closed` is set, which only the last bin of a partition is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemperatureBin {
    pub lower: f64,
    pub upper: f64,
    pub closed: bool,
    pub count: usize,
}

impl TemperatureBin {
    pub fn new(lower: f64, upper: f64, closed: bool) -> Self {
        Self {
            lower,
            upper,
            closed,
            count: 0,
        }
    }

    pub fn label(&self) -> String {
        let close = if self.closed { ']' } else { ')' };
        format!("[{:.2}, {:.2}{}", self.lower, self.upper, close)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieWedge {
    pub label: String,
    pub count: usize,
    pub percentage: f64,
}

impl PieWedge {
    pub fn new(label: String, count: usize, percentage: f64) -> Self {
        Self {
            label,
            count,
            percentage,
        }
    }

    pub fn percentage_label(&self) -> String {
        format!("{:.1}%", self.percentage)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum Plot {
    Line(Vec<TimeSeriesPoint>),
    Bar(Vec<TimeSeriesPoint>),
    Pie(Vec<PieWedge>),
    Scatter(Vec<TimeSeriesPoint>),
}

/// Renderer output: everything the display surface needs to draw one chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub title: String,
    pub color: String,
    pub plot: Plot,
}

impl ChartData {
    pub fn new(title: String, color: String, plot: Plot) -> Self {
        Self { title, color, plot }
    }

    pub fn selection(&self) -> ChartSelection {
        match self.plot {
            Plot::Line(_) => ChartSelection::Line,
            Plot::Bar(_) => ChartSelection::Bar,
            Plot::Pie(_) => ChartSelection::Pie,
            Plot::Scatter(_) => ChartSelection::Scatter,
        }
    }

    pub fn point_count(&self) -> usize {
        match &self.plot {
            Plot::Line(points) | Plot::Bar(points) | Plot::Scatter(points) => points.len(),
            Plot::Pie(wedges) => wedges.iter().map(|w| w.count).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATES: [ChartSelection; 4] = [
        ChartSelection::Line,
        ChartSelection::Bar,
        ChartSelection::Pie,
        ChartSelection::Scatter,
    ];

    #[test]
    fn test_initial_selection_is_line() {
        assert_eq!(ChartSelection::default(), ChartSelection::Line);
    }

    #[test]
    fn test_every_trigger_lands_on_its_target_from_every_state() {
        for state in STATES {
            for trigger in Trigger::ALL {
                assert_eq!(transition(state, trigger), trigger.target());
            }
        }
    }

    #[test]
    fn test_repeated_trigger_is_idempotent() {
        let once = ChartSelection::Scatter.apply(Trigger::SelectPie);
        let twice = once.apply(Trigger::SelectPie);
        assert_eq!(once, ChartSelection::Pie);
        assert_eq!(twice, once);
    }

    #[test]
    fn test_labels_and_headings() {
        let labels: Vec<_> = Trigger::ALL.iter().map(Trigger::label).collect();
        assert_eq!(
            labels,
            vec![
                "Show Line Chart",
                "Show Bar Chart",
                "Show Pie Chart",
                "Show Scatter Plot"
            ]
        );
        assert_eq!(ChartSelection::Bar.heading(), "Temperature Distribution");
        assert_eq!(ChartSelection::Pie.heading(), "Temperature Proportions");
    }

    #[test]
    fn test_trigger_form_values() {
        let trigger: Trigger = serde_json::from_str("\"scatter\"").unwrap();
        assert_eq!(trigger, Trigger::SelectScatter);
        assert!(serde_json::from_str::<Trigger>("\"area\"").is_err());
        for trigger in Trigger::ALL {
            assert_eq!(
                serde_json::to_string(&trigger).unwrap(),
                format!("\"{}\"", trigger.value())
            );
        }
    }

    #[test]
    fn test_bin_labels() {
        assert_eq!(TemperatureBin::new(10.0, 18.0, false).label(), "[10.00, 18.00)");
        assert_eq!(TemperatureBin::new(42.0, 50.0, true).label(), "[42.00, 50.00]");
    }
}
