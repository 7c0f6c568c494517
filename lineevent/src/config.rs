use lineevent_common::v1::EventRequest;
use lineevent_common::{event_flags, handle_flags};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Edge {
    Rising,
    Falling,
    #[default]
    Both,
}

impl Edge {
    pub fn flags(self) -> u32 {
        match self {
            Edge::Rising => event_flags::RISING_EDGE,
            Edge::Falling => event_flags::FALLING_EDGE,
            Edge::Both => event_flags::BOTH_EDGES,
        }
    }
}

/// Configuration of an input line watched for events.
///
/// ```
/// use lineevent::{Edge, EventLineConfig};
///
/// let config = EventLineConfig::new(17)
///     .with_edge(Edge::Rising)
///     .with_active_low(true)
///     .with_consumer("door_sensor");
/// assert_eq!(config.offset, 17);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventLineConfig {
    pub offset: u32,
    pub edge: Edge,
    pub active_low: bool,
    /// Label shown by the kernel for the line owner, at most 32 bytes are kept.
    pub consumer: String,
}

impl EventLineConfig {
    pub fn new(offset: u32) -> Self {
        Self {
            offset,
            ..Default::default()
        }
    }

    pub fn with_edge(mut self, edge: Edge) -> Self {
        self.edge = edge;
        self
    }

    pub fn with_active_low(mut self, active_low: bool) -> Self {
        self.active_low = active_low;
        self
    }

    pub fn with_consumer(mut self, consumer: impl Into<String>) -> Self {
        self.consumer = consumer.into();
        self
    }

    // Event lines are always inputs.
    pub fn handle_flags(&self) -> u32 {
        let mut flags = handle_flags::REQUEST_INPUT;
        if self.active_low {
            flags |= handle_flags::REQUEST_ACTIVE_LOW;
        }
        flags
    }

    pub fn event_flags(&self) -> u32 {
        self.edge.flags()
    }

    pub fn to_request(&self) -> EventRequest {
        EventRequest::new(
            self.offset,
            self.handle_flags(),
            self.event_flags(),
            &self.consumer,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_watch_both_edges_of_an_input() {
        let config = EventLineConfig::new(4);
        assert_eq!(config.edge, Edge::Both);
        assert_eq!(config.handle_flags(), handle_flags::REQUEST_INPUT);
        assert_eq!(config.event_flags(), event_flags::BOTH_EDGES);
    }

    #[test]
    fn request_carries_configuration() {
        let request = EventLineConfig::new(23)
            .with_edge(Edge::Falling)
            .with_active_low(true)
            .with_consumer("button")
            .to_request();
        assert_eq!(request.line_offset, 23);
        assert_eq!(
            request.handle_flags,
            handle_flags::REQUEST_INPUT | handle_flags::REQUEST_ACTIVE_LOW
        );
        assert_eq!(request.event_flags, event_flags::FALLING_EDGE);
        assert_eq!(request.consumer(), b"button");
    }
}
