//! JSON file backed [`MonitorStateStore`].
//!
//! Each chain gets `{storage_path}/{chain}_state.json`. Writes go to a sibling `.tmp` file which
//! is fsync'd and then renamed over the target, so a crash leaves either the old or the new
//! checkpoint but never a torn one.

use async_trait::async_trait;
use glob::glob;
use std::{
	collections::HashMap,
	path::{Path, PathBuf},
};
use tokio::io::AsyncWriteExt;

use crate::{
	models::{MonitorState, TransactionLocation},
	services::state::{error::StateStoreError, MonitorStateStore},
};

const STATE_SUFFIX: &str = "_state.json";
const TMP_SUFFIX: &str = ".tmp";

#[derive(Debug, Clone)]
pub struct FileMonitorStateStore {
	storage_path: PathBuf,
}

impl FileMonitorStateStore {
	pub fn new(storage_path: impl Into<PathBuf>) -> Self {
		Self {
			storage_path: storage_path.into(),
		}
	}

	pub fn storage_path(&self) -> &Path {
		&self.storage_path
	}

	fn state_path(&self, chain_name: &str) -> PathBuf {
		self.storage_path
			.join(format!("{}{}", chain_name, STATE_SUFFIX))
	}

	/// Removes `.tmp` files left behind by a crash in the middle of a write.
	pub async fn remove_stale_temp_files(&self) -> Result<usize, StateStoreError> {
		let mut removed = 0;
		for path in self.glob_paths(&format!("*{}{}", STATE_SUFFIX, TMP_SUFFIX))? {
			tokio::fs::remove_file(&path).await.map_err(|e| {
				StateStoreError::storage_error(
					"Failed to remove stale temp file",
					Some(Box::new(e)),
					path_metadata(&path),
				)
			})?;
			tracing::debug!(path = %path.display(), "Removed stale temp file");
			removed += 1;
		}
		Ok(removed)
	}

	/// All checkpoints in the storage directory, sorted by chain name.
	pub async fn list(&self) -> Result<Vec<MonitorState>, StateStoreError> {
		let mut states = Vec::new();
		for path in self.glob_paths(&format!("*{}", STATE_SUFFIX))? {
			let Some(chain_name) = path
				.file_name()
				.and_then(|name| name.to_str())
				.and_then(|name| name.strip_suffix(STATE_SUFFIX))
			else {
				continue;
			};
			if let Some(location) = self.load(chain_name).await? {
				states.push(MonitorState {
					chain_name: chain_name.to_string(),
					location,
				});
			}
		}
		states.sort_by(|a, b| a.chain_name.cmp(&b.chain_name));
		Ok(states)
	}

	fn glob_paths(&self, file_pattern: &str) -> Result<Vec<PathBuf>, StateStoreError> {
		let pattern = self.storage_path.join(file_pattern);
		let pattern = pattern.to_string_lossy();
		let entries = glob(&pattern).map_err(|e| {
			StateStoreError::storage_error(
				"Invalid storage path pattern",
				Some(Box::new(e)),
				Some(HashMap::from([("pattern".to_string(), pattern.to_string())])),
			)
		})?;
		Ok(entries.filter_map(Result::ok).collect())
	}
}

impl Default for FileMonitorStateStore {
	fn default() -> Self {
		Self::new("data")
	}
}

fn path_metadata(path: &Path) -> Option<HashMap<String, String>> {
	Some(HashMap::from([(
		"path".to_string(),
		path.display().to_string(),
	)]))
}

#[async_trait]
impl MonitorStateStore for FileMonitorStateStore {
	async fn load(&self, chain_name: &str) -> Result<Option<TransactionLocation>, StateStoreError> {
		let path = self.state_path(chain_name);

		let content = match tokio::fs::read_to_string(&path).await {
			Ok(content) => content,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
			Err(e) => {
				return Err(StateStoreError::storage_error(
					"Failed to read state",
					Some(Box::new(e)),
					path_metadata(&path),
				))
			}
		};

		let state: MonitorState = serde_json::from_str(&content).map_err(|e| {
			StateStoreError::corrupted_state(
				"Failed to parse state",
				Some(Box::new(e)),
				path_metadata(&path),
			)
		})?;
		Ok(Some(state.location))
	}

	async fn store(
		&self,
		chain_name: &str,
		location: &TransactionLocation,
	) -> Result<(), StateStoreError> {
		let path = self.state_path(chain_name);
		let tmp_path = path.with_extension(format!("json{}", TMP_SUFFIX));
		let state = MonitorState {
			chain_name: chain_name.to_string(),
			location: location.clone(),
		};
		let content = serde_json::to_vec_pretty(&state).map_err(|e| {
			StateStoreError::storage_error(
				"Failed to serialize state",
				Some(Box::new(e)),
				path_metadata(&path),
			)
		})?;

		let write = async {
			tokio::fs::create_dir_all(&self.storage_path).await?;
			let mut file = tokio::fs::File::create(&tmp_path).await?;
			file.write_all(&content).await?;
			file.sync_all().await?;
			drop(file);
			tokio::fs::rename(&tmp_path, &path).await
		};

		write.await.map_err(|e| {
			StateStoreError::storage_error(
				"Failed to write state",
				Some(Box::new(e)),
				path_metadata(&path),
			)
		})?;

		tracing::debug!(
			chain = chain_name,
			block_hash = %location.block_hash,
			tx_id = ?location.tx_id,
			"Stored checkpoint"
		);
		Ok(())
	}
}
