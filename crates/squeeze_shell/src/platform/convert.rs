//! Wire types to core types and back.

use squeeze_core::{
    CompressedVariant, ImageRecord, ImageStatus, JobSummary, ListSnapshot, Msg, PostJobAction,
    SortColumn, SortDirection,
};
use squeeze_engine::{
    CImage, CompressionStatus, CompressionSummary, EngineEvent, FileList, ListColumn,
    PostCompressionAction, SortOrder, WireStatus,
};

pub(crate) fn status_from(status: WireStatus) -> ImageStatus {
    match status {
        WireStatus::New => ImageStatus::New,
        WireStatus::Success => ImageStatus::Success,
        WireStatus::Warning => ImageStatus::Warning,
        WireStatus::Error => ImageStatus::Error,
        WireStatus::Compressing => ImageStatus::Compressing,
    }
}

pub(crate) fn record_from(image: CImage) -> ImageRecord {
    ImageRecord {
        id: image.id,
        name: image.name,
        path: image.path,
        directory: image.directory,
        mime_type: image.mime_type,
        size: image.size,
        width: image.width,
        height: image.height,
        compressed: CompressedVariant {
            size: image.compressed_size,
            width: image.compressed_width,
            height: image.compressed_height,
            path: image.compressed_file_path,
        },
        info: image.info,
        status: status_from(image.status),
    }
}

pub(crate) fn snapshot_from(list: FileList) -> ListSnapshot {
    ListSnapshot {
        items: list.files.into_iter().map(record_from).collect(),
        base_folder: list.base_folder,
        total_count: list.total_files,
    }
}

pub(crate) fn summary_from(summary: CompressionSummary) -> JobSummary {
    JobSummary {
        total_images: summary.total_images,
        success: summary.total_success,
        skipped: summary.total_skipped,
        errors: summary.total_errors,
        original_bytes: summary.original_size,
        compressed_bytes: summary.compressed_size,
        elapsed_ms: summary.total_time,
    }
}

pub(crate) fn column_to_wire(column: SortColumn) -> ListColumn {
    match column {
        SortColumn::Filename => ListColumn::Filename,
        SortColumn::Size => ListColumn::Size,
        SortColumn::Resolution => ListColumn::Resolution,
        SortColumn::Saved => ListColumn::Saved,
    }
}

pub(crate) fn direction_to_wire(direction: SortDirection) -> SortOrder {
    match direction {
        SortDirection::Ascending => SortOrder::Ascending,
        SortDirection::Descending => SortOrder::Descending,
    }
}

/// Engine-side counterpart of a post-job action; `None` for the actions the
/// shell handles itself.
pub(crate) fn post_action_to_wire(action: PostJobAction) -> Option<PostCompressionAction> {
    match action {
        PostJobAction::Sleep => Some(PostCompressionAction::Sleep),
        PostJobAction::Shutdown => Some(PostCompressionAction::Shutdown),
        PostJobAction::OpenOutputFolder => Some(PostCompressionAction::OpenOutputFolder),
        PostJobAction::None | PostJobAction::CloseApp => None,
    }
}

pub(crate) fn event_to_msg(event: &EngineEvent) -> Msg {
    match event {
        EngineEvent::ImportStarted => Msg::ImportStarted,
        EngineEvent::ImportProgress(progress) => Msg::ImportProgress {
            progress: progress.progress,
            total: progress.total,
        },
        EngineEvent::ImportFinished(finished) => Msg::ImportFinished {
            added: finished.added_count,
        },
        EngineEvent::ListChanged(list) => Msg::ListChanged(snapshot_from(list.clone())),
        EngineEvent::ItemUpdated(update) => {
            let mut record = record_from(update.cimage.clone());
            // The outer status is the verdict for this run.
            record.status = match update.status {
                CompressionStatus::Success => ImageStatus::Success,
                CompressionStatus::Warning => ImageStatus::Warning,
                CompressionStatus::Error => ImageStatus::Error,
            };
            Msg::ItemUpdated(record)
        }
        EngineEvent::CompressionProgress(progress) => Msg::CompressionProgress(progress.count),
        EngineEvent::CompressionFinished(summary) => {
            Msg::CompressionFinished(summary_from(*summary))
        }
        EngineEvent::CompressionPaused => Msg::CompressionPaused,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use squeeze_engine::{ImportFinished, ItemUpdate};

    fn image(id: &str) -> CImage {
        CImage {
            id: id.into(),
            name: format!("{id}.jpg"),
            path: format!("/photos/{id}.jpg"),
            size: 4_000,
            width: 1024,
            height: 768,
            compressed_size: 1_000,
            compressed_width: 512,
            compressed_height: 384,
            compressed_file_path: format!("/out/{id}.jpg"),
            status: WireStatus::Success,
            ..CImage::default()
        }
    }

    #[test]
    fn file_list_becomes_snapshot() {
        let snapshot = snapshot_from(FileList {
            files: vec![image("a")],
            base_folder: "/photos".into(),
            total_files: 77,
        });
        assert_eq!(snapshot.total_count, 77);
        assert_eq!(snapshot.base_folder, "/photos");

        let record = &snapshot.items[0];
        assert_eq!(record.status, ImageStatus::Success);
        assert_eq!(record.compressed.size, 1_000);
        assert_eq!((record.compressed.width, record.compressed.height), (512, 384));
        assert_eq!(record.compressed.path, "/out/a.jpg");
        assert_eq!(record.saved_percentage(), Some(75));
    }

    #[test]
    fn item_update_takes_outer_status() {
        let event = EngineEvent::ItemUpdated(ItemUpdate {
            status: CompressionStatus::Error,
            cimage: CImage {
                info: "decode failed".into(),
                ..image("b")
            },
        });
        let Msg::ItemUpdated(record) = event_to_msg(&event) else {
            panic!("expected an item update");
        };
        assert_eq!(record.id, "b");
        assert_eq!(record.status, ImageStatus::Error);
        assert_eq!(record.info, "decode failed");
    }

    #[test]
    fn summary_fields_map_across() {
        let msg = event_to_msg(&EngineEvent::CompressionFinished(CompressionSummary {
            total_images: 10,
            total_success: 8,
            total_skipped: 0,
            total_errors: 2,
            original_size: 9_000,
            compressed_size: 3_000,
            total_time: 1_500,
        }));
        assert_eq!(
            msg,
            Msg::CompressionFinished(JobSummary {
                total_images: 10,
                success: 8,
                skipped: 0,
                errors: 2,
                original_bytes: 9_000,
                compressed_bytes: 3_000,
                elapsed_ms: 1_500,
            })
        );
    }

    #[test]
    fn simple_events_map_directly() {
        assert_eq!(
            event_to_msg(&EngineEvent::ImportFinished(ImportFinished { added_count: 4 })),
            Msg::ImportFinished { added: 4 }
        );
        assert_eq!(
            event_to_msg(&EngineEvent::CompressionPaused),
            Msg::CompressionPaused
        );
    }

    #[test]
    fn local_post_actions_have_no_wire_form() {
        assert_eq!(post_action_to_wire(PostJobAction::CloseApp), None);
        assert_eq!(post_action_to_wire(PostJobAction::None), None);
        assert_eq!(
            post_action_to_wire(PostJobAction::OpenOutputFolder),
            Some(PostCompressionAction::OpenOutputFolder)
        );
    }
}
