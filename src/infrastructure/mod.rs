// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod csv_repository;
pub mod html_page;
pub mod svg_chart;
