use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_repr::{Deserialize_repr, Serialize_repr};

/// Image status as the engine encodes it on the wire: a signed code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize_repr, Deserialize_repr)]
#[repr(i8)]
pub enum WireStatus {
    #[default]
    New = 0,
    Success = 1,
    Warning = 2,
    Error = 3,
    Compressing = -1,
}

/// One image as the engine describes it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CImage {
    pub id: String,
    pub name: String,
    pub path: String,
    pub directory: String,
    pub mime_type: String,
    pub size: u64,
    pub width: u32,
    pub height: u32,
    pub compressed_width: u32,
    pub compressed_height: u32,
    pub compressed_size: u64,
    pub compressed_file_path: String,
    pub info: String,
    pub status: WireStatus,
}

/// Page of the engine's list, returned by every structural command.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FileList {
    pub files: Vec<CImage>,
    pub base_folder: String,
    pub total_files: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListColumn {
    Filename,
    Size,
    Resolution,
    Saved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostCompressionAction {
    Sleep,
    Shutdown,
    OpenOutputFolder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompressionStatus {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemUpdate {
    pub status: CompressionStatus,
    pub cimage: CImage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CompressionSummary {
    pub total_images: u64,
    pub total_success: u64,
    pub total_skipped: u64,
    pub total_errors: u64,
    pub original_size: u64,
    pub compressed_size: u64,
    /// Milliseconds.
    pub total_time: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportProgress {
    pub progress: u64,
    pub total: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportFinished {
    pub added_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressionProgress {
    pub count: u64,
}

/// Event pushed by the engine, tagged by its kind name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload")]
pub enum EngineEvent {
    #[serde(rename = "import:started")]
    ImportStarted,
    #[serde(rename = "import:progress")]
    ImportProgress(ImportProgress),
    #[serde(rename = "import:finished")]
    ImportFinished(ImportFinished),
    #[serde(rename = "list:changed")]
    ListChanged(FileList),
    #[serde(rename = "item:updated")]
    ItemUpdated(ItemUpdate),
    #[serde(rename = "compression:progress")]
    CompressionProgress(CompressionProgress),
    #[serde(rename = "compression:finished")]
    CompressionFinished(CompressionSummary),
    #[serde(rename = "compression:paused")]
    CompressionPaused,
}

impl EngineEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            EngineEvent::ImportStarted => EventKind::ImportStarted,
            EngineEvent::ImportProgress(_) => EventKind::ImportProgress,
            EngineEvent::ImportFinished(_) => EventKind::ImportFinished,
            EngineEvent::ListChanged(_) => EventKind::ListChanged,
            EngineEvent::ItemUpdated(_) => EventKind::ItemUpdated,
            EngineEvent::CompressionProgress(_) => EventKind::CompressionProgress,
            EngineEvent::CompressionFinished(_) => EventKind::CompressionFinished,
            EngineEvent::CompressionPaused => EventKind::CompressionPaused,
        }
    }

    /// Decodes an event from its kind name and raw payload.
    pub fn from_parts(event: String, payload: Value) -> Result<Self, serde_json::Error> {
        let mut frame = serde_json::Map::new();
        frame.insert("event".to_string(), Value::String(event));
        if !payload.is_null() {
            frame.insert("payload".to_string(), payload);
        }
        serde_json::from_value(Value::Object(frame))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventKind {
    ImportStarted,
    ImportProgress,
    ImportFinished,
    ListChanged,
    ItemUpdated,
    CompressionProgress,
    CompressionFinished,
    CompressionPaused,
}

impl EventKind {
    pub const ALL: [EventKind; 8] = [
        EventKind::ImportStarted,
        EventKind::ImportProgress,
        EventKind::ImportFinished,
        EventKind::ListChanged,
        EventKind::ItemUpdated,
        EventKind::CompressionProgress,
        EventKind::CompressionFinished,
        EventKind::CompressionPaused,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EventKind::ImportStarted => "import:started",
            EventKind::ImportProgress => "import:progress",
            EventKind::ImportFinished => "import:finished",
            EventKind::ListChanged => "list:changed",
            EventKind::ItemUpdated => "item:updated",
            EventKind::CompressionProgress => "compression:progress",
            EventKind::CompressionFinished => "compression:finished",
            EventKind::CompressionPaused => "compression:paused",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_travels_as_signed_code() {
        assert_eq!(serde_json::to_value(WireStatus::Compressing).unwrap(), json!(-1));
        assert_eq!(
            serde_json::from_value::<WireStatus>(json!(2)).unwrap(),
            WireStatus::Warning
        );
        assert_eq!(
            serde_json::from_value::<WireStatus>(json!(3)).unwrap(),
            WireStatus::Error
        );
        assert!(serde_json::from_value::<WireStatus>(json!(7)).is_err());
        assert!(serde_json::from_value::<WireStatus>(json!("1")).is_err());
    }

    #[test]
    fn cimage_tolerates_missing_fields() {
        let image: CImage =
            serde_json::from_value(json!({"id": "k1", "name": "a.png", "status": 1})).unwrap();
        assert_eq!(image.id, "k1");
        assert_eq!(image.status, WireStatus::Success);
        assert_eq!(image.compressed_size, 0);
    }

    #[test]
    fn events_decode_from_kind_and_payload() {
        let event =
            EngineEvent::from_parts("compression:progress".into(), json!({"count": 3})).unwrap();
        assert_eq!(
            event,
            EngineEvent::CompressionProgress(CompressionProgress { count: 3 })
        );
        assert_eq!(event.kind(), EventKind::CompressionProgress);

        let paused = EngineEvent::from_parts("compression:paused".into(), Value::Null).unwrap();
        assert_eq!(paused, EngineEvent::CompressionPaused);

        assert!(EngineEvent::from_parts("list:exploded".into(), Value::Null).is_err());
    }

    #[test]
    fn kind_names_match_serialized_tags() {
        let event = EngineEvent::ImportFinished(ImportFinished { added_count: 2 });
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event"], json!(event.kind().name()));
    }
}
