//! CSV file and directory loading.

use std::io::Read;
use std::path::{Path, PathBuf};

use st_common::{Error, Result};
use tracing::{debug, info, warn};

use super::RawTable;

/// Read one CSV file. The first record is the header row.
pub fn read_csv(path: &Path) -> Result<RawTable> {
    if !path.exists() {
        return Err(Error::NoInput(path.display().to_string()));
    }
    let file = std::fs::File::open(path)?;
    let table = read_csv_from_reader(file, &path.display().to_string())?;
    info!(
        path = %path.display(),
        rows = table.len(),
        columns = table.headers.len(),
        "loaded telemetry file"
    );
    Ok(table)
}

/// Read CSV text from any reader; `source` labels errors and reports.
pub fn read_csv_from_reader<R: Read>(reader: R, source: &str) -> Result<RawTable> {
    let mut rdr = ::csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| Error::Input(format!("{source}: {e}")))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(|e| Error::Input(format!("{source}: {e}")))?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(RawTable::new(headers, rows).with_source(source))
}

/// Expand input paths: files are kept as given, directories contribute their
/// `*.csv` entries in file-name order.
pub fn collect_inputs(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut found: Vec<PathBuf> = std::fs::read_dir(path)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| {
                    p.is_file()
                        && p.extension()
                            .and_then(|e| e.to_str())
                            .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
                })
                .collect();
            found.sort();
            if found.is_empty() {
                warn!(dir = %path.display(), "no CSV files in directory");
            }
            debug!(dir = %path.display(), files = found.len(), "expanded input directory");
            files.extend(found);
        } else if path.exists() {
            files.push(path.clone());
        } else {
            return Err(Error::NoInput(path.display().to_string()));
        }
    }
    if files.is_empty() {
        let joined = paths
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(Error::NoInput(joined));
    }
    Ok(files)
}

/// Load every CSV named by `paths` (directories expanded).
pub fn load_inputs(paths: &[PathBuf]) -> Result<Vec<RawTable>> {
    collect_inputs(paths)?
        .iter()
        .map(|p| read_csv(p))
        .collect()
}
