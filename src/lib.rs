// Configuration loading (TOML file + environment overrides)
pub mod config;

// Power BI token provider
pub mod powerbi;

// HTTP routes and page rendering
pub mod api;
