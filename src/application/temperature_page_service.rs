// Temperature page service - Load, project and render for one page evaluation
use crate::application::chart_renderer::{render_chart, RenderOptions};
use crate::application::dataset_repository::DatasetRepository;
use crate::domain::chart::{ChartData, ChartError, ChartSelection};
use crate::domain::reading::{project_temperature_series, DataLoadError, TemperatureSeries};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ChartOutcome {
    Ready { chart: ChartData },
    Empty { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemperatureView {
    pub selection: ChartSelection,
    pub heading: &'static str,
    pub readings: usize,
    #[serde(flatten)]
    pub outcome: ChartOutcome,
}

#[derive(Clone)]
pub struct TemperaturePageService {
    repository: Arc<dyn DatasetRepository>,
    data_path: PathBuf,
    render_options: RenderOptions,
}

impl TemperaturePageService {
    pub fn new(
        repository: Arc<dyn DatasetRepository>,
        data_path: PathBuf,
        render_options: RenderOptions,
    ) -> Self {
        Self {
            repository,
            data_path,
            render_options,
        }
    }

    pub fn data_path(&self) -> &PathBuf {
        &self.data_path
    }

    pub async fn load_series(&self) -> Result<TemperatureSeries, DataLoadError> {
        let dataset = self.repository.load_dataset(&self.data_path).await?;
        Ok(project_temperature_series(&dataset))
    }

    /// Build the chart for `selection` from a fresh load of the dataset.
    /// A pie over no readings becomes an empty-state outcome; load failures
    /// are returned to the caller.
    pub async fn view(&self, selection: ChartSelection) -> Result<TemperatureView, DataLoadError> {
        let series = self.load_series().await?;

        let outcome = match render_chart(selection, &series, &self.render_options) {
            Ok(chart) => {
                tracing::debug!(
                    "Built {:?} chart over {} readings",
                    chart.selection(),
                    chart.point_count()
                );
                ChartOutcome::Ready { chart }
            }
            Err(e @ ChartError::EmptySeries) => {
                tracing::info!("Nothing to chart for {:?}: {}", selection, e);
                ChartOutcome::Empty {
                    message: e.to_string(),
                }
            }
            Err(e) => ChartOutcome::Empty {
                message: e.to_string(),
            },
        };

        Ok(TemperatureView {
            selection,
            heading: selection.heading(),
            readings: series.len(),
            outcome,
        })
    }
}
