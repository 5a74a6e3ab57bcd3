// Application state for HTTP handlers
use crate::application::chart_renderer::RenderOptions;
use crate::application::dataset_repository::DatasetRepository;
use crate::application::session_service::SessionService;
use crate::application::temperature_page_service::TemperaturePageService;
use crate::infrastructure::config::{DashboardConfig, PageSettings};
use crate::infrastructure::html_page::{load_stylesheet, PageChrome};
use crate::infrastructure::svg_chart::SvgChartRenderer;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub page_service: TemperaturePageService,
    pub session_service: SessionService,
    pub svg_renderer: SvgChartRenderer,
    pub page_settings: PageSettings,
}

impl AppState {
    pub fn new(config: &DashboardConfig, repository: Arc<dyn DatasetRepository>) -> Self {
        let render_options = RenderOptions {
            color: config.chart.color.clone(),
            pie_bins: config.chart.pie_bins,
        };

        Self {
            page_service: TemperaturePageService::new(
                repository,
                config.data.resolve_data_path(),
                render_options,
            ),
            session_service: SessionService::new(config.session.ttl()),
            svg_renderer: SvgChartRenderer::new(config.chart.width, config.chart.height),
            page_settings: config.page.clone(),
        }
    }

    /// Chrome for one page evaluation; the stylesheet is re-read every time
    pub async fn page_chrome(&self) -> PageChrome {
        PageChrome {
            title: self.page_settings.title.clone(),
            footer: self.page_settings.footer.clone(),
            stylesheet: load_stylesheet(&self.page_settings.stylesheet).await,
        }
    }
}
