use std::fs;
use std::path::Path;

use hackerthink_admin::application::error::AppError;
use serde::de::DeserializeOwned;

pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, AppError> {
    let data = fs::read_to_string(path).map_err(|err| {
        AppError::validation(format!("failed to read `{}`: {err}", path.display()))
    })?;
    serde_json::from_str(&data).map_err(|err| {
        AppError::validation(format!("`{}` is not a valid record: {err}", path.display()))
    })
}
