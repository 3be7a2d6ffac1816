use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    path::Path,
};

use anyhow::Context as _;
use serde::{Serialize, de::DeserializeOwned};

/// Writes `value` as pretty-printed JSON to `path`, or to stdout if no path is given.
pub(crate) fn write_json<T>(value: &T, path: Option<&Path>) -> anyhow::Result<()>
where
    T: Serialize,
{
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            write_pretty(BufWriter::new(file), value)
                .with_context(|| format!("Failed to write JSON to {}", path.display()))
        }
        None => write_pretty(io::stdout().lock(), value).context("Failed to write JSON to stdout"),
    }
}

fn write_pretty<W, T>(mut writer: W, value: &T) -> anyhow::Result<()>
where
    W: Write,
    T: Serialize,
{
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

pub(crate) fn read_json<T>(file_kind: &str, path: &Path) -> anyhow::Result<T>
where
    T: DeserializeOwned,
{
    let file = File::open(path)
        .with_context(|| format!("Failed to open {file_kind} file: {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse {file_kind} JSON file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use std::{collections::BTreeMap, fs, process};

    use super::*;

    #[test]
    fn test_json_file_round_trip() {
        let path = std::env::temp_dir().join(format!("gatetris-cli-{}.json", process::id()));
        let value = BTreeMap::from([("holes".to_owned(), -3.5), ("wells".to_owned(), 1.0)]);
        write_json(&value, Some(path.as_path())).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        let loaded: BTreeMap<String, f64> = read_json("test", &path).unwrap();
        fs::remove_file(&path).unwrap();
        assert!(text.ends_with("}\n"));
        assert_eq!(loaded, value);
    }

    #[test]
    fn test_read_error_names_file_kind() {
        let path = std::env::temp_dir().join("gatetris-cli-missing.json");
        let err = read_json::<BTreeMap<String, f64>>("AI model", &path).unwrap_err();
        assert!(err.to_string().starts_with("Failed to open AI model file"));
    }
}
