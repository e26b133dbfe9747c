//! Line-oriented command input.
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Result};
use photodump_core::{upload_url, CandidateFile, Direction, Msg};
use photodump_logging::pd_warn;

pub const HELP: &str = "\
commands:
  add <path>...          stage image files
  rm <filename>          remove a staged file
  categories <a, b, ..>  set category labels (comma separated)
  start                  start categorization
  reload                 re-read staged files from the server
  clear                  clear everything on the server
  clear-selection        clear staged files only
  download               save the result archive
  open <image>           open an image in the viewer
  next | prev | close    navigate or close the viewer
  status                 print the full view
  quit                   leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add(Vec<PathBuf>),
    Remove(String),
    Categories(String),
    Start,
    Reload,
    ClearAll,
    ClearSelection,
    Download,
    Open(String),
    Next,
    Previous,
    Close,
    Status,
    Help,
    Quit,
}

impl Command {
    /// Parse one input line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_ascii_lowercase().as_str() {
            "add" => {
                let paths: Vec<PathBuf> = rest.split_whitespace().map(PathBuf::from).collect();
                if paths.is_empty() {
                    bail!("add needs at least one path");
                }
                Command::Add(paths)
            }
            "rm" | "remove" => Command::Remove(required(rest, "rm needs a filename")?),
            "categories" | "cat" => Command::Categories(category_lines(rest)),
            "start" => Command::Start,
            "reload" => Command::Reload,
            "clear" => Command::ClearAll,
            "clear-selection" => Command::ClearSelection,
            "download" => Command::Download,
            "open" => Command::Open(required(rest, "open needs an image")?),
            "next" | "n" => Command::Next,
            "prev" | "p" => Command::Previous,
            "close" => Command::Close,
            "status" | "s" => Command::Status,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => bail!("unknown command '{other}', type help"),
        };
        Ok(Some(command))
    }

    /// Message for the state machine, or `None` for commands handled locally.
    pub fn into_msg(self) -> Option<Msg> {
        let msg = match self {
            Command::Add(paths) => Msg::FilesAdded(load_candidates(&paths)),
            Command::Remove(filename) => Msg::RemoveClicked { filename },
            Command::Categories(input) => Msg::CategoriesChanged(input),
            Command::Start => Msg::StartClicked,
            Command::Reload => Msg::ReloadRequested,
            Command::ClearAll => Msg::ClearAllClicked,
            Command::ClearSelection => Msg::ClearSelectionClicked,
            Command::Download => Msg::DownloadClicked,
            Command::Open(image) => Msg::ImageOpened {
                src: image_src(&image),
            },
            Command::Next => Msg::ModalNavigated(Direction::Next),
            Command::Previous => Msg::ModalNavigated(Direction::Previous),
            Command::Close => Msg::ModalClosed,
            Command::Quit => Msg::QuitRequested,
            Command::Status | Command::Help => return None,
        };
        Some(msg)
    }
}

fn required(rest: &str, message: &str) -> Result<String> {
    if rest.is_empty() {
        Err(anyhow!("{message}"))
    } else {
        Ok(rest.to_string())
    }
}

/// The category box holds one label per line; the terminal takes a comma list.
fn category_lines(rest: &str) -> String {
    rest.split(',')
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Accepts a served URL or a bare filename.
fn image_src(image: &str) -> String {
    if image.starts_with("/uploads/") {
        image.to_string()
    } else {
        upload_url(image)
    }
}

/// Read files from disk. Unreadable paths are logged and skipped; non-images
/// get a non-image content type so staging drops them.
pub fn load_candidates(paths: &[PathBuf]) -> Vec<CandidateFile> {
    paths
        .iter()
        .filter_map(|path| {
            let name = path.file_name()?.to_string_lossy().into_owned();
            match fs::read(path) {
                Ok(data) => Some(CandidateFile::new(name, content_type_for(path), data)),
                Err(err) => {
                    pd_warn!("Skipping {:?}: {}", path, err);
                    None
                }
            }
        })
        .collect()
}

pub fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "heic" => "image/heic",
        _ => "application/octet-stream",
    }
}
