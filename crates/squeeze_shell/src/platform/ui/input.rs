//! Console line commands.

use squeeze_core::{Msg, PostJobAction, SortColumn, SortDirection, SortSpec};

pub(crate) const HELP: &str = "\
commands:
  page N                     show page N
  filter [TEXT]              filter by name, empty clears
  sort COLUMN [asc|desc]     filename, size, resolution or saved
  select ID | select-all | select-none
  remove [ID...]             remove ids, or the selection
  clear                      empty the list
  import [-r] PATH...        add files or folders
  inspect [ID]               show one image, empty clears
  preview [ID...]            preview ids, or the selection
  compress | pause | resume | cancel
  set auto-preview on|off
  set post-action none|close_app|sleep|shutdown|open_output_folder
  yes | no                   answer the exit prompt
  quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Input {
    Message(Msg),
    Help,
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub(crate) enum InputError {
    #[error("unknown command `{0}`, try `help`")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
}

pub(crate) fn parse_line(line: &str) -> Result<Input, InputError> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(Input::Empty);
    };
    let args: Vec<&str> = words.collect();
    let owned = || args.iter().map(|arg| arg.to_string()).collect::<Vec<_>>();

    let msg = match command {
        "help" | "?" => return Ok(Input::Help),
        "page" => match args.as_slice() {
            [page] => Msg::PageRequested(page.parse().map_err(|_| InputError::Usage("page N"))?),
            _ => return Err(InputError::Usage("page N")),
        },
        "filter" => Msg::FilterChanged(rest_of_line(line, command).to_string()),
        "sort" => Msg::SortChanged(parse_sort(&args)?),
        "select" => match args.as_slice() {
            [id] => Msg::SelectionToggled(id.to_string()),
            _ => return Err(InputError::Usage("select ID")),
        },
        "select-all" => Msg::SelectAllClicked,
        "select-none" => Msg::SelectNoneClicked,
        "remove" if args.is_empty() => Msg::RemoveSelectedClicked,
        "remove" => Msg::RemoveRequested(owned()),
        "clear" => Msg::ClearClicked,
        "import" => {
            let recursive = args.first() == Some(&"-r");
            let paths: Vec<String> = args
                .iter()
                .skip(usize::from(recursive))
                .map(|path| path.to_string())
                .collect();
            if paths.is_empty() {
                return Err(InputError::Usage("import [-r] PATH..."));
            }
            Msg::ImportRequested { paths, recursive }
        }
        "inspect" => match args.as_slice() {
            [] => Msg::ItemInspected(None),
            [id] => Msg::ItemInspected(Some(id.to_string())),
            _ => return Err(InputError::Usage("inspect [ID]")),
        },
        "preview" => Msg::PreviewRequested(owned()),
        "compress" => Msg::CompressClicked,
        "pause" => Msg::PauseClicked,
        "resume" => Msg::ResumeClicked,
        "cancel" => Msg::CancelClicked,
        "set" => parse_set(&args)?,
        "yes" | "y" => Msg::ExitConfirmed,
        "no" | "n" => Msg::ExitDismissed,
        "quit" | "exit" | "q" => Msg::CloseRequested,
        other => return Err(InputError::Unknown(other.to_string())),
    };
    Ok(Input::Message(msg))
}

/// Text after `command` and the single separator that follows it, untouched.
fn rest_of_line<'a>(line: &'a str, command: &str) -> &'a str {
    let mut rest = line.trim_start()[command.len()..].chars();
    rest.next();
    rest.as_str()
}

fn parse_sort(args: &[&str]) -> Result<SortSpec, InputError> {
    const USAGE: &str = "sort filename|size|resolution|saved [asc|desc]";
    let (column, direction) = match args {
        [column] => (column, None),
        [column, direction] => (column, Some(*direction)),
        _ => return Err(InputError::Usage(USAGE)),
    };
    let column = SortColumn::parse(column).ok_or(InputError::Usage(USAGE))?;
    let direction = match direction {
        None | Some("asc") => SortDirection::Ascending,
        Some("desc") => SortDirection::Descending,
        Some(_) => return Err(InputError::Usage(USAGE)),
    };
    Ok(SortSpec { column, direction })
}

fn parse_set(args: &[&str]) -> Result<Msg, InputError> {
    match args {
        ["auto-preview", "on"] => Ok(Msg::AutoPreviewToggled(true)),
        ["auto-preview", "off"] => Ok(Msg::AutoPreviewToggled(false)),
        ["auto-preview", ..] => Err(InputError::Usage("set auto-preview on|off")),
        ["post-action", action] => PostJobAction::parse(action)
            .map(Msg::PostJobActionChanged)
            .ok_or(InputError::Usage(
                "set post-action none|close_app|sleep|shutdown|open_output_folder",
            )),
        _ => Err(InputError::Usage("set auto-preview|post-action VALUE")),
    }
}
