use std::{fs, path::Path};

use crate::{
    config::{tmp_path, write_atomic},
    errors::SnapshotError,
    installment::Installment,
};

/// Writes installments to disk atomically by staging to a temporary file.
pub fn save_installments(installments: &[Installment], path: &Path) -> Result<(), SnapshotError> {
    let tmp = tmp_path(path);
    let json = serde_json::to_string_pretty(installments)?;
    write_atomic(&tmp, &json)?;
    fs::rename(tmp, path)?;
    Ok(())
}

/// Loads an installment list and validates every record.
pub fn load_installments(path: &Path) -> Result<Vec<Installment>, SnapshotError> {
    let data = fs::read_to_string(path)?;
    let installments: Vec<Installment> = serde_json::from_str(&data)?;
    for installment in &installments {
        installment.validate()?;
    }
    tracing::info!(count = installments.len(), path = %path.display(), "installments loaded");
    Ok(installments)
}
