use crate::job::{JobPhase, JobSummary};
use crate::list::PAGE_SIZE;
use crate::record::{FilterQuery, ImageId, ImageRecord, ImageStatus, SortSpec};
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub rows: Vec<ImageRowView>,
    pub base_folder: String,
    pub total_count: u64,
    pub current_page: u64,
    pub total_pages: u64,
    pub page_size: u64,
    pub list_busy: bool,
    pub filter: FilterQuery,
    pub sort: Option<SortSpec>,
    pub selected_count: usize,
    pub import: Option<ImportView>,
    pub job: JobView,
    pub inspected: Option<ImageRowView>,
    pub preview_loading: bool,
    pub auto_preview: bool,
    pub exit_prompt_open: bool,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRowView {
    pub id: ImageId,
    pub name: String,
    pub subfolder: String,
    pub size: u64,
    pub compressed_size: Option<u64>,
    pub dimensions: (u32, u32),
    /// Present only when compression changed the dimensions.
    pub compressed_dimensions: Option<(u32, u32)>,
    pub saved_percentage: Option<i64>,
    pub info: String,
    pub status: ImageStatus,
    pub selected: bool,
    pub inspected: bool,
    /// Row actions (preview, remove) are disabled while compressing.
    pub actions_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportView {
    pub progress: u64,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobView {
    pub phase: JobPhase,
    pub progress: u64,
    pub total: u64,
    /// Waiting for the engine to confirm a pause or a cancel.
    pub indeterminate: bool,
    pub label: String,
    pub can_start: bool,
    pub can_pause: bool,
    pub can_resume: bool,
    pub can_cancel: bool,
    pub last_summary: Option<JobSummary>,
}

impl AppViewModel {
    pub(crate) fn build(state: &AppState) -> Self {
        let snapshot = state.list.snapshot();
        let inspected_id = state.preview.inspected_id();
        let rows = snapshot
            .items
            .iter()
            .map(|record| {
                let mut row = ImageRowView::from_record(record, &snapshot.base_folder);
                row.selected = state.selection.contains(&record.id);
                row.inspected = inspected_id == Some(record.id.as_str());
                row
            })
            .collect();

        let inspected = state.preview.inspected().map(|record| {
            let mut row = ImageRowView::from_record(record, &snapshot.base_folder);
            row.selected = state.selection.contains(&record.id);
            row.inspected = true;
            row
        });

        Self {
            rows,
            base_folder: snapshot.base_folder.clone(),
            total_count: snapshot.total_count,
            current_page: state.list.current_page(),
            total_pages: state.list.total_pages(),
            page_size: PAGE_SIZE,
            list_busy: state.list.is_busy(),
            filter: state.list.filter().clone(),
            sort: state.list.sort(),
            selected_count: state.selection.len(),
            import: state.import.active.then(|| ImportView {
                progress: state.import.progress,
                total: state.import.total,
            }),
            job: JobView::build(state),
            inspected,
            preview_loading: state.preview.is_loading(),
            auto_preview: state.preview.auto_preview(),
            exit_prompt_open: state.exit_prompt_open,
            dirty: state.is_dirty(),
        }
    }
}

impl ImageRowView {
    fn from_record(record: &ImageRecord, base_folder: &str) -> Self {
        let compressed = &record.compressed;
        let compressed_dimensions = (compressed.has_dimensions()
            && (compressed.width, compressed.height) != (record.width, record.height))
            .then_some((compressed.width, compressed.height));
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            subfolder: record.relative_directory(base_folder),
            size: record.size,
            compressed_size: compressed.is_produced().then_some(compressed.size),
            dimensions: (record.width, record.height),
            compressed_dimensions,
            saved_percentage: record.saved_percentage(),
            info: record.info.clone(),
            status: record.status,
            selected: false,
            inspected: false,
            actions_enabled: record.status != ImageStatus::Compressing,
        }
    }
}

impl JobView {
    fn build(state: &AppState) -> Self {
        let job = &state.job;
        let phase = job.phase();
        let has_items = state.list.snapshot().total_count > 0;
        Self {
            phase,
            progress: job.progress(),
            total: job.total(),
            indeterminate: phase.is_indeterminate(),
            label: phase.to_string(),
            can_start: phase == JobPhase::Idle && has_items,
            can_pause: phase == JobPhase::Running,
            can_resume: matches!(phase, JobPhase::Paused | JobPhase::PauseRequested),
            can_cancel: matches!(
                phase,
                JobPhase::Running | JobPhase::PauseRequested | JobPhase::Paused
            ),
            last_summary: job.last_summary().cloned(),
        }
    }
}
