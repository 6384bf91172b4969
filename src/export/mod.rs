pub mod json;
pub mod xlsx;

use std::path::{Path, PathBuf};

pub fn default_file_name(payout_id: &str) -> String {
    format!("Report_{payout_id}.xlsx")
}

/// Spreadsheet destination: the user's name (with `.xlsx` added when it has
/// no extension) or the default derived from the payout id.
pub fn output_path(name: Option<&str>, payout_id: &str) -> PathBuf {
    match name {
        Some(name) => {
            let path = PathBuf::from(name);
            if Path::new(name).extension().is_some() {
                path
            } else {
                path.with_extension("xlsx")
            }
        }
        None => PathBuf::from(default_file_name(payout_id)),
    }
}
