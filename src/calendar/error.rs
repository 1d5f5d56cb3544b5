use thiserror::Error;

#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("calendar access denied by user")]
    PermissionDenied,

    #[error("calendar access is restricted on this device")]
    PermissionRestricted,

    #[error("calendar access request failed: {0}")]
    PermissionRequestFailed(String),

    #[error("no default calendar for new events")]
    NoDefaultCalendar,

    #[error("failed to query events: {0}")]
    QueryFailed(String),

    #[error("failed to save event: {0}")]
    SaveFailed(String),

    #[error("event creation is disabled until calendar access is granted")]
    CreationDisabled,

    #[error("{0} is not supported on this platform")]
    Unsupported(&'static str),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CalendarError {
    /// Permission problems get the warning dialog; everything else is a banner.
    pub fn is_permission(&self) -> bool {
        matches!(self, Self::PermissionDenied | Self::PermissionRestricted)
    }
}
