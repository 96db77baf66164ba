use crate::runtime::events::BusEntry;

pub trait EventPublisher {
    /// Publishes one entry and returns the bus-assigned event id.
    fn publish(&self, entry: &BusEntry) -> Result<String, String>;
}
