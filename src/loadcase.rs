use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::network::NetworkModel;
use crate::three_phase::ResultSet;

/// Reads a JSON network case. Bus references have any phase suffixes
/// removed and the case is validated before it is returned.
pub fn load_case(case_path: &Path) -> Result<NetworkModel> {
    let file = File::open(case_path)
        .with_context(|| format!("failed to open case file {}", case_path.display()))?;
    let mut model: NetworkModel = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse case file {}", case_path.display()))?;

    model.normalize_names();
    model.validate()?;

    Ok(model)
}

/// Reads a JSON result set, e.g. bus voltages exported from a reference
/// power flow engine.
pub fn load_results(path: &Path) -> Result<ResultSet> {
    let file = File::open(path)
        .with_context(|| format!("failed to open result file {}", path.display()))?;
    let results = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse result file {}", path.display()))?;
    Ok(results)
}

pub fn save_results(path: &Path, results: &ResultSet) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create result file {}", path.display()))?;
    let mut w = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut w, results)?;
    w.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use std::env;
    use std::path::{Path, PathBuf};

    use super::*;
    use crate::error::PfError;

    fn casedata_dir() -> Result<PathBuf> {
        let manifest_dir = env::var("CARGO_MANIFEST_DIR")?;
        Ok(Path::new(&manifest_dir).join("casedata"))
    }

    #[test]
    fn test_load_case() -> Result<()> {
        let model = load_case(&casedata_dir()?.join("radial4.json"))?;

        assert_eq!(model.nb(), 4);
        assert_eq!(model.bus[0].id, "sourcebus");
        assert_eq!(model.bus[0].v0, Some((1.0, 0.0)));
        assert_eq!(model.bus[1].v0, None);
        assert_eq!(model.line.len(), 3);
        assert_eq!(model.line[0].from, "sourcebus");
        assert_eq!(model.load[0].bus, "b2");
        assert_eq!(model.gen.len(), 1);
        assert_eq!(model.slack_bus, Some(0));
        Ok(())
    }

    #[test]
    fn test_load_case_rejects_duplicate_bus() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("dup.json");
        std::fs::write(
            &path,
            r#"{"bus": [{"id": "a.1"}, {"id": "a.2"}], "line": [], "load": []}"#,
        )?;

        let err = load_case(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PfError>(),
            Some(PfError::DuplicateBus { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_results_file() -> Result<()> {
        let reference = load_results(&casedata_dir()?.join("radial4_reference.json"))?;
        assert_eq!(reference.len(), 4);
        assert_eq!(reference.get("sourcebus").map(|bv| bv.vm_a()), Some(1.0));

        let dir = tempfile::tempdir()?;
        let path = dir.path().join("out.json");
        save_results(&path, &reference)?;
        assert_eq!(load_results(&path)?, reference);
        Ok(())
    }
}
