/// Metadata of one persisted clip, without its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipSummary {
    /// Store-assigned identifier.
    pub id: i64,
    /// Label derived from the capture-completion time.
    pub name: String,
    /// Payload size in bytes.
    pub size: usize,
}
