//! JSON persistence of decoded endpoints.
//!
//! Output is a pretty-printed array (2-space indent) followed by a newline.

use crate::model::{DecodeError, VmessEndpoint};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

pub fn write_json<W: Write>(mut writer: W, endpoints: &[VmessEndpoint]) -> Result<(), DecodeError> {
    serde_json::to_writer_pretty(&mut writer, endpoints)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Write to `path`, creating or truncating it.
pub fn save(path: &Path, endpoints: &[VmessEndpoint]) -> Result<(), DecodeError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_json(&mut writer, endpoints)?;
    writer.get_ref().sync_all()?;
    Ok(())
}

pub fn load(path: &Path) -> Result<Vec<VmessEndpoint>, DecodeError> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pretty_output_uses_two_spaces() {
        let mut buf = Vec::new();
        let v = VmessEndpoint {
            ps: "a".into(),
            port: 80,
            ..Default::default()
        };
        write_json(&mut buf, &[v]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("[\n  {\n    \"v\": \"\""), "{text}");
        assert!(text.ends_with("]\n"));
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vmess.txt");
        let list = vec![
            VmessEndpoint {
                ps: "one".into(),
                ..Default::default()
            },
            VmessEndpoint {
                ps: "two".into(),
                ..Default::default()
            },
        ];
        save(&path, &list).unwrap();
        assert_eq!(load(&path).unwrap(), list);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, DecodeError::Io(_)));
    }
}
