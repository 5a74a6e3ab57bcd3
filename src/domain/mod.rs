// Domain layer - Sensor readings, chart selection and chart descriptions
pub mod chart;
pub mod reading;
