use crate::errors::StoreError;
use serde::{Serialize, de::DeserializeOwned};
use std::path::Path;
use tokio::fs;
use tracing::error;

/// Reads a JSON document. A missing file gives the default value so a
/// fresh install starts empty; a file that exists but cannot be read or
/// parsed is an error, since the next persist would overwrite it.
pub async fn load_json<T>(path: &Path) -> Result<T, StoreError>
where
    T: DeserializeOwned + Default,
{
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
        Err(err) => {
            error!(path = %path.display(), "failed to read data file: {err}");
            return Err(err.into());
        }
    };
    serde_json::from_slice(&bytes).map_err(|err| {
        error!(path = %path.display(), "failed to parse data file: {err}");
        StoreError::from(err)
    })
}

pub async fn persist_json<T: Serialize>(path: &Path, data: &T) -> Result<(), StoreError> {
    let payload = serde_json::to_vec_pretty(data)?;
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, payload).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn scratch_path(name: &str) -> std::path::PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("moodflow_storage_{}_{name}", std::process::id()));
        path
    }

    #[tokio::test]
    async fn missing_file_loads_default() {
        let data: BTreeMap<String, u32> = load_json(&scratch_path("missing.json")).await.unwrap();
        assert!(data.is_empty());
    }

    #[tokio::test]
    async fn persisted_data_loads_back() {
        let path = scratch_path("persisted.json");
        let mut data = BTreeMap::new();
        data.insert("2024-01-01".to_string(), 5u32);

        persist_json(&path, &data).await.unwrap();
        let loaded: BTreeMap<String, u32> = load_json(&path).await.unwrap();
        assert_eq!(loaded, data);

        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let path = scratch_path("corrupt.json");
        std::fs::write(&path, b"{not json").unwrap();
        let loaded = load_json::<BTreeMap<String, u32>>(&path).await;
        assert!(matches!(loaded, Err(StoreError::Json(_))));
        assert_eq!(std::fs::read(&path).unwrap(), b"{not json");
        let _ = std::fs::remove_file(path);
    }
}
