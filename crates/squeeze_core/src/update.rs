use shell_logging::{shell_debug, shell_info};

use crate::job::{JobPhase, JobSummary, ProgressUpdate};
use crate::list::{
    ListMutation, MutationOutcome, RecordPatch, RequestId, SnapshotOrigin, StructuralRequest,
};
use crate::preferences::PostJobAction;
use crate::record::{FilterQuery, ImageId, ImageRecord, ImageStatus, ListSnapshot};
use crate::state::NotificationLevel;
use crate::{AppState, Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::PageRequested(page) => {
            state.begin_list_request(StructuralRequest::ChangePage { page })
        }
        Msg::FilterChanged(text) => {
            state.begin_list_request(StructuralRequest::Filter(FilterQuery::new(text)))
        }
        Msg::SortChanged(spec) => state.begin_list_request(StructuralRequest::Sort(spec)),
        Msg::RemoveRequested(ids) => state.begin_list_request(StructuralRequest::Remove { ids }),
        Msg::RemoveSelectedClicked => {
            let ids = state.selection.ids();
            state.begin_list_request(StructuralRequest::Remove { ids })
        }
        Msg::ClearClicked => state.begin_list_request(StructuralRequest::Clear),
        Msg::ImportRequested { paths, recursive } => {
            if paths.is_empty() {
                Vec::new()
            } else {
                vec![Effect::ImportPaths { paths, recursive }]
            }
        }
        Msg::SelectionToggled(id) => {
            if state.selection.toggle(&id, state.list.snapshot()) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::SelectAllClicked => {
            state.selection.select_all(state.list.snapshot());
            state.mark_dirty();
            Vec::new()
        }
        Msg::SelectNoneClicked => {
            state.selection.clear();
            state.mark_dirty();
            Vec::new()
        }
        Msg::ItemInspected(id) => inspect(&mut state, id),
        Msg::PreviewRequested(ids) => request_preview(&mut state, &ids),
        Msg::AutoPreviewToggled(enabled) => {
            state.preview.set_auto_preview(enabled);
            state.preferences.auto_preview = enabled;
            state.mark_dirty();
            vec![Effect::SavePreferences(state.preferences.clone())]
        }
        Msg::PostJobActionChanged(action) => {
            state.preferences.post_job_action = action;
            state.mark_dirty();
            vec![Effect::SavePreferences(state.preferences.clone())]
        }
        Msg::CompressClicked => start_job(&mut state),
        Msg::PauseClicked => {
            if state.job.request_pause() {
                state.mark_dirty();
                vec![Effect::PauseCompression]
            } else {
                Vec::new()
            }
        }
        Msg::ResumeClicked => {
            if state.job.resume() {
                state.mark_dirty();
                vec![Effect::ResumeCompression]
            } else {
                Vec::new()
            }
        }
        Msg::CancelClicked => {
            if state.job.request_cancel() {
                state.mark_dirty();
                vec![Effect::CancelCompression]
            } else {
                Vec::new()
            }
        }
        Msg::CloseRequested => request_close(&mut state),
        Msg::ExitConfirmed => {
            if !state.exit_prompt_open {
                shell_debug!("Exit confirmation without an open prompt");
                return (state, Vec::new());
            }
            state.exit_prompt_open = false;
            state.mark_dirty();
            exit_effects(&state)
        }
        Msg::ExitDismissed => {
            if state.exit_prompt_open {
                state.exit_prompt_open = false;
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::ListResponse { request, result } => settle_list(&mut state, request, result),
        Msg::JobCommandFailed { command, message } => {
            state.job.command_failed(command);
            state.notify(
                NotificationLevel::Error,
                format!("Could not {command}"),
                message,
            );
            Vec::new()
        }
        Msg::PreviewFailed { ids, message } => {
            for id in &ids {
                state.preview.resolve(id);
                state.patch_status(id, ImageStatus::Error, Some(message.clone()));
            }
            Vec::new()
        }
        Msg::CommandFailed { command, message } => {
            state.notify(NotificationLevel::Error, format!("{command} failed"), message);
            Vec::new()
        }
        Msg::ImportStarted => {
            state.import.active = true;
            state.import.progress = 0;
            state.import.total = 0;
            state.mark_dirty();
            Vec::new()
        }
        Msg::ImportProgress { progress, total } => {
            state.import.progress = progress;
            state.import.total = total;
            state.mark_dirty();
            Vec::new()
        }
        Msg::ImportFinished { added } => {
            state.import.active = false;
            state.notify(
                NotificationLevel::Success,
                "Import finished",
                format!("Imported {added} files"),
            );
            Vec::new()
        }
        Msg::ListChanged(snapshot) => {
            state.import.active = false;
            let outcome = state.apply_list_mutation(ListMutation::Replace {
                snapshot,
                origin: SnapshotOrigin::Push,
            });
            refetch_if_clamped(&mut state, outcome)
        }
        Msg::ItemUpdated(record) => {
            apply_item_update(&mut state, record);
            Vec::new()
        }
        Msg::CompressionProgress(count) => {
            match state.job.record_progress(count) {
                ProgressUpdate::Applied | ProgressUpdate::Clamped => state.mark_dirty(),
                ProgressUpdate::Regressed | ProgressUpdate::Ignored => {}
            }
            Vec::new()
        }
        Msg::CompressionFinished(summary) => finish_job(&mut state, summary),
        Msg::CompressionPaused => {
            if state.job.confirm_paused() {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::Tick => Vec::new(),
    };

    (state, effects)
}

fn settle_list(
    state: &mut AppState,
    request: RequestId,
    result: Result<ListSnapshot, String>,
) -> Vec<Effect> {
    match result {
        Ok(snapshot) => {
            let outcome = state.settle_list_request(request, snapshot);
            refetch_if_clamped(state, outcome)
        }
        Err(message) => {
            if state.list.fail(request) {
                state.notify(NotificationLevel::Error, "List update failed", message);
            }
            Vec::new()
        }
    }
}

fn refetch_if_clamped(state: &mut AppState, outcome: MutationOutcome) -> Vec<Effect> {
    match state.list.refetch_after_clamp(outcome) {
        Some(page) => state.begin_list_request(StructuralRequest::ChangePage { page }),
        None => Vec::new(),
    }
}

fn inspect(state: &mut AppState, id: Option<ImageId>) -> Vec<Effect> {
    let Some(id) = id else {
        state.preview.inspect(None);
        state.mark_dirty();
        return Vec::new();
    };
    let Some(record) = state.list.snapshot().get(&id).cloned() else {
        shell_debug!("Cannot inspect {}: not on the current page", id);
        return Vec::new();
    };

    let wants_preview = state.preview.auto_preview();
    state.preview.inspect(Some(record));
    state.mark_dirty();
    if wants_preview {
        request_preview(state, &[id])
    } else {
        Vec::new()
    }
}

fn request_preview(state: &mut AppState, ids: &[ImageId]) -> Vec<Effect> {
    if state.job.phase().is_active() {
        shell_debug!("Preview unavailable while a job is active");
        return Vec::new();
    }
    // An empty request previews the current selection.
    let ids = if ids.is_empty() {
        state.selection.ids()
    } else {
        ids.to_vec()
    };
    let planned = state.preview.plan(&ids, state.list.snapshot());
    if planned.is_empty() {
        return Vec::new();
    }
    for id in &planned {
        state.patch_status(id, ImageStatus::Compressing, None);
    }
    vec![Effect::Preview {
        ids: planned,
        threads: state.preferences.threads,
    }]
}

fn apply_item_update(state: &mut AppState, record: ImageRecord) {
    state.preview.resolve(&record.id);
    state.preview.refresh_record(&record);
    state.apply_list_mutation(ListMutation::Patch(RecordPatch::Authoritative(record)));
    // The inspected copy may have changed even when the record is off the page.
    state.mark_dirty();
}

fn start_job(state: &mut AppState) -> Vec<Effect> {
    let total = state.list.snapshot().total_count;
    match state.job.start(total) {
        Ok(()) => {
            shell_info!("Starting compression of {} images", total);
            state.mark_dirty();
            vec![Effect::Compress {
                threads: state.preferences.threads,
                base_folder: state.list.snapshot().base_folder.clone(),
            }]
        }
        Err(rejection) => {
            shell_debug!("Compression start rejected: {:?}", rejection);
            Vec::new()
        }
    }
}

fn finish_job(state: &mut AppState, summary: JobSummary) -> Vec<Effect> {
    if !state.job.finish(summary.clone()) {
        return Vec::new();
    }
    let level = if summary.errors == 0 {
        NotificationLevel::Success
    } else {
        NotificationLevel::Warning
    };
    state.notify(
        level,
        "Compression finished",
        format!(
            "{} of {} compressed, {} skipped, {} errors, {} bytes saved in {} ms",
            summary.success,
            summary.total_images,
            summary.skipped,
            summary.errors,
            summary.saved_bytes(),
            summary.elapsed_ms
        ),
    );
    match state.preferences.post_job_action {
        PostJobAction::None => Vec::new(),
        action => vec![Effect::RunPostJobAction(action)],
    }
}

fn request_close(state: &mut AppState) -> Vec<Effect> {
    if state.preferences.skip_confirmations {
        return exit_effects(state);
    }
    if state.job.phase().is_active() || state.preferences.prompt_before_exit {
        if !state.exit_prompt_open {
            state.exit_prompt_open = true;
            state.mark_dirty();
        }
        return Vec::new();
    }
    exit_effects(state)
}

fn exit_effects(state: &AppState) -> Vec<Effect> {
    if matches!(
        state.job.phase(),
        JobPhase::Running | JobPhase::PauseRequested | JobPhase::Paused
    ) {
        vec![Effect::CancelCompression, Effect::Exit]
    } else {
        vec![Effect::Exit]
    }
}
