/// A clip assembled at stop time, not yet (or not necessarily) stored.
///
/// Each finished clip owns its bytes, so an insert still in flight for one
/// recording can never observe data from a later one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishedClip {
    /// Name the clip is stored under.
    pub name: String,
    /// Concatenated fragments in emission order.
    pub data: Vec<u8>,
}
