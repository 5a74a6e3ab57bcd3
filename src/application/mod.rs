// Application layer - Use cases for the temperature page
pub mod chart_renderer;
pub mod dataset_repository;
pub mod session_service;
pub mod temperature_page_service;
