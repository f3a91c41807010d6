/// A read model built from published events.
pub trait ReadModel: Send + Sync {
    fn name(&self) -> &'static str;

    /// Returns the number of entries in this read model.
    fn count(&self) -> usize;
}
