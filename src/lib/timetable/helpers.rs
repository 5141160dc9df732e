use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use log::{debug, info, warn};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::ser::PrettyFormatter;
use similar::TextDiff;
use tempfile::NamedTempFile;

use super::{
    errors::TimetableError,
    models::lesson_model::{FailureReport, WeeklySchedule},
};

fn display_path(path: &Path) -> String {
    std::path::absolute(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}

/* pretty JSON with a 4-space indent; serde_json never escapes non-ASCII */
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, TimetableError> {
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut serializer)?;
    Ok(buf)
}

/// Writes `value` next to `path` and renames it over `path`, so readers never see half a file.
pub fn write_json_atomic<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
) -> Result<(), TimetableError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let json = to_pretty_json(value)?;
    let tmp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(tmp.as_file());
        writer.write_all(&json)?;
        writer.flush()?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, TimetableError> {
    let file = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(file)?)
}

pub fn write_groups(path: &Path, groups: &[String]) -> Result<(), TimetableError> {
    info!("Writing {} groups to {}", groups.len(), display_path(path));
    write_json_atomic(path, groups)
}

pub fn read_groups(path: &Path) -> Result<Vec<String>, TimetableError> {
    info!("Reading groups from {}", display_path(path));
    read_json(path)
}

/// Persists the user's choice as a one-element array.
pub fn write_selected_group(path: &Path, group: &str) -> Result<(), TimetableError> {
    info!("Selecting group {} in {}", group, display_path(path));
    write_json_atomic(path, &[group])
}

/// The selected group, or `None` if the file is missing or holds nothing usable.
pub fn read_selected_group(path: &Path) -> Result<Option<String>, TimetableError> {
    if !path.exists() {
        debug!("No selected group at {}", display_path(path));
        return Ok(None);
    }
    let selected: Vec<String> = read_json(path)?;
    Ok(selected
        .into_iter()
        .next()
        .filter(|group| !group.trim().is_empty()))
}

pub fn write_schedule(path: &Path, schedule: &WeeklySchedule) -> Result<(), TimetableError> {
    info!(
        "Writing {} days of schedule to {}",
        schedule.len(),
        display_path(path)
    );
    write_json_atomic(path, schedule)
}

pub fn read_schedule(path: &Path) -> Result<WeeklySchedule, TimetableError> {
    info!("Reading schedule from {}", display_path(path));
    read_json(path)
}

/// Previously persisted schedule, empty if there is none yet or it cannot be read.
pub fn read_previous_schedule(path: &Path) -> WeeklySchedule {
    if !path.exists() {
        return WeeklySchedule::new();
    }
    read_schedule(path).unwrap_or_else(|e| {
        warn!("Ignoring unreadable previous schedule: {}", e);
        WeeklySchedule::new()
    })
}

pub fn write_failures(path: &Path, failures: &FailureReport) -> Result<(), TimetableError> {
    info!(
        "Writing {} failed days to {}",
        failures.len(),
        display_path(path)
    );
    write_json_atomic(path, failures)
}

pub fn read_failures(path: &Path) -> Result<FailureReport, TimetableError> {
    read_json(path)
}

/// Unified diff of the two schedules' JSON, or `None` if they are identical.
pub fn schedule_diff(
    old: &WeeklySchedule,
    new: &WeeklySchedule,
) -> Result<Option<String>, TimetableError> {
    let old_json = serde_json::to_string_pretty(old)?;
    let new_json = serde_json::to_string_pretty(new)?;
    let diff = TextDiff::from_lines(&old_json, &new_json);
    if diff.ratio() == 1.0 {
        return Ok(None);
    }
    Ok(Some(diff.unified_diff().header("previous", "current").to_string()))
}

#[cfg(test)]
#[path = "tests/tests.rs"]
mod tests;
