use std::{
    fs,
    path::{Path, PathBuf},
};

use walkdir::WalkDir;

use crate::utils;

use super::{TagFields, TagStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameOutcome {
    Renamed { from: PathBuf, to: PathBuf },
    Skipped { path: PathBuf, reason: String },
}

/// `"<artist> - <title>.mp3"` with unsafe characters removed, if both fields are set.
pub fn target_file_name(fields: &TagFields) -> Option<String> {
    let artist = fields.artist.as_deref().filter(|a| !a.is_empty())?;
    let title = fields.title.as_deref().filter(|t| !t.is_empty())?;
    Some(utils::sanitize_file_name(&format!("{artist} - {title}.mp3")))
}

/// Renames every mp3 directly inside `dir` after its artist and title tags.
///
/// With `dry_run` the outcomes are computed but nothing is renamed.
pub fn rename_mp3_files<S: TagStore>(store: &S, dir: &Path, dry_run: bool) -> Vec<RenameOutcome> {
    let mut outcomes = Vec::new();

    let entries = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".mp3"));

    for entry in entries {
        let path = entry.path().to_path_buf();

        let name = match store.read(&path) {
            Ok(fields) => target_file_name(&fields),
            Err(e) => {
                outcomes.push(RenameOutcome::Skipped {
                    path,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let Some(name) = name else {
            outcomes.push(RenameOutcome::Skipped {
                path,
                reason: "missing artist or title".to_string(),
            });
            continue;
        };

        let target = dir.join(name);
        if target != path && target.exists() {
            outcomes.push(RenameOutcome::Skipped {
                path,
                reason: "target exists".to_string(),
            });
            continue;
        }

        if !dry_run && target != path {
            if let Err(e) = fs::rename(&path, &target) {
                outcomes.push(RenameOutcome::Skipped {
                    path,
                    reason: e.to_string(),
                });
                continue;
            }
        }

        outcomes.push(RenameOutcome::Renamed {
            from: path,
            to: target,
        });
    }

    outcomes
}
