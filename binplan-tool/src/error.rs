use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("API URL not configured. Pass --api-url, set BINPLAN_API_URL or configure ~/.config/binplan/config.toml")]
    ApiUrlNotConfigured,

    #[error("No storage unit given. Pass --unit or set default_unit in the config file")]
    UnitNotSpecified,

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Editor(#[from] binplan_client::EditorError),

    #[error("Cannot place bin: {0}")]
    Conflict(binplan_core::GridError),

    #[error("Item {0} could not be proposed")]
    NotProposed(String),
}
