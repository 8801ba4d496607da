/// Error type for ClassicWorld load and save operations.
#[derive(Debug, thiserror::Error)]
pub enum ClassicWorldError {
    /// The document is not a structurally valid ClassicWorld map.
    #[error("Format error: {0}")]
    Format(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("NBT error: {0}")]
    Nbt(#[from] quartz_nbt::io::NbtIoError),
    #[error("Invalid options: {0}")]
    Options(#[from] serde_json::Error),
}

impl ClassicWorldError {
    pub(crate) fn format(message: impl Into<String>) -> Self {
        ClassicWorldError::Format(message.into())
    }

    pub fn is_format_error(&self) -> bool {
        matches!(self, ClassicWorldError::Format(_))
    }
}

pub type Result<T> = std::result::Result<T, ClassicWorldError>;
