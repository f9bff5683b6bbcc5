use std::fmt;
use std::path::Path;

/// Stable identifier the engine assigns to each image.
pub type ImageId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageStatus {
    #[default]
    New,
    Compressing,
    Success,
    Warning,
    Error,
}

impl fmt::Display for ImageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageStatus::New => write!(f, "new"),
            ImageStatus::Compressing => write!(f, "compressing"),
            ImageStatus::Success => write!(f, "success"),
            ImageStatus::Warning => write!(f, "warning"),
            ImageStatus::Error => write!(f, "error"),
        }
    }
}

/// Output of a compression run. All fields stay zero/empty until produced.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompressedVariant {
    pub size: u64,
    pub width: u32,
    pub height: u32,
    pub path: String,
}

impl CompressedVariant {
    pub fn is_produced(&self) -> bool {
        self.size > 0
    }

    pub fn has_dimensions(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImageRecord {
    pub id: ImageId,
    pub name: String,
    pub path: String,
    pub directory: String,
    pub mime_type: String,
    pub size: u64,
    pub width: u32,
    pub height: u32,
    pub compressed: CompressedVariant,
    pub info: String,
    pub status: ImageStatus,
}

impl ImageRecord {
    /// Percentage of bytes saved by compression, negative when the output grew.
    pub fn saved_percentage(&self) -> Option<i64> {
        if !self.compressed.is_produced() {
            return None;
        }
        if self.size == 0 {
            return Some(0);
        }
        let original = self.size as f64;
        let saved = (original - self.compressed.size as f64) / original * 100.0;
        Some(saved.round() as i64)
    }

    /// Directory of the image relative to `base_folder`, empty when it sits
    /// directly inside it or outside of it.
    pub fn relative_directory(&self, base_folder: &str) -> String {
        if base_folder.is_empty() {
            return String::new();
        }
        Path::new(&self.path)
            .strip_prefix(base_folder)
            .ok()
            .and_then(Path::parent)
            .map(|dir| dir.display().to_string())
            .unwrap_or_default()
    }
}

/// One authoritative page of the engine's list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListSnapshot {
    pub items: Vec<ImageRecord>,
    pub base_folder: String,
    pub total_count: u64,
}

impl ListSnapshot {
    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|item| item.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&ImageRecord> {
        self.items.iter().find(|item| item.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut ImageRecord> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortColumn {
    #[default]
    Filename,
    Size,
    Resolution,
    Saved,
}

impl SortColumn {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "filename" | "name" => Some(SortColumn::Filename),
            "size" => Some(SortColumn::Size),
            "resolution" => Some(SortColumn::Resolution),
            "saved" => Some(SortColumn::Saved),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortSpec {
    pub column: SortColumn,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterQuery {
    pub text: String,
}

impl FilterQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}
