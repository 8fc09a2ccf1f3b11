use crate::DataManagerError;

mod file_store;
mod memory_store;

pub use file_store::FileSlotStore;
pub use memory_store::MemorySlotStore;

/// Named text slots that outlive the process, in the manner of browser local storage.
pub trait SlotStore {
    /// `None` when the slot was never written or has been removed.
    fn get(&self, key: &str) -> Result<Option<String>, DataManagerError>;

    /// Replaces the slot's whole content.
    fn set(&mut self, key: &str, value: &str) -> Result<(), DataManagerError>;

    /// Removing a missing slot is not an error.
    fn remove(&mut self, key: &str) -> Result<(), DataManagerError>;
}
