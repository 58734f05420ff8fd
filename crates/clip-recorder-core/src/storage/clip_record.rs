/// One persisted clip.
///
/// Records are immutable once created; the identifier is assigned by the
/// store and never reused after deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipRecord {
    /// Store-assigned identifier.
    pub id: i64,
    /// Label derived from the capture-completion time.
    pub name: String,
    /// Encoded clip bytes, exactly as captured.
    pub data: Vec<u8>,
}

