use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FetchEvent {
    Hit(PageHitEvent),
    Stored(PageStoredEvent),
    Failed(FetchFailedEvent),
}

impl FetchEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            FetchEvent::Hit(_) => "hit",
            FetchEvent::Stored(_) => "stored",
            FetchEvent::Failed(_) => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageHitEvent {
    pub url: String,
    pub count: i64,
    pub value_size: usize,
    pub timestamp: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageStoredEvent {
    pub url: String,
    pub count: i64,
    pub value_size: usize,
    pub ttl_ms: u64,
    pub timestamp: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchFailedEvent {
    pub url: String,
    pub count: i64,
    pub reason: String,
    pub timestamp: u64,
}

/// Helper to get current timestamp in seconds since UNIX epoch
pub fn now_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serializes_with_type_tag() {
        let event = FetchEvent::Failed(FetchFailedEvent {
            url: "http://y".to_string(),
            count: 1,
            reason: "connection refused".to_string(),
            timestamp: 0,
        });

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "failed");
        assert_eq!(json["url"], "http://y");

        let back: FetchEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
        assert_eq!(back.kind(), "failed");
    }
}
