//! 缩略图保存。
//!
//! 先写入保存目录下的临时文件，写完再改名为建议文件名，
//! 中途失败不会留下半截文件。

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::info;

use crate::base_system::context::Config;
use crate::third_party::media_fetch::MediaFetcher;
use crate::thumbnail::ThumbnailRecord;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("create directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("write temporary file in {dir}: {source}")]
    Write { dir: PathBuf, source: io::Error },
    #[error("persist {path}: {source}")]
    Persist { path: PathBuf, source: io::Error },
}

/// 拉取图片并保存，返回最终路径。
pub fn download_thumbnail(
    fetcher: &MediaFetcher,
    record: &ThumbnailRecord,
    config: &Config,
) -> Result<PathBuf> {
    let bytes = fetcher
        .fetch_bytes(&record.url)
        .with_context(|| format!("fetch {}", record.url))?;
    let path = save_bytes(
        &config.default_save_dir(),
        &record.filename,
        &bytes,
        config.allow_overwrite_files,
    )?;
    info!(target: "download", path = %path.display(), len = bytes.len(), "thumbnail saved");
    Ok(path)
}

pub fn save_bytes(
    dir: &Path,
    filename: &str,
    bytes: &[u8],
    overwrite: bool,
) -> Result<PathBuf, SaveError> {
    fs::create_dir_all(dir).map_err(|source| SaveError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let write_err = |source| SaveError::Write {
        dir: dir.to_path_buf(),
        source,
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(bytes).map_err(write_err)?;
    tmp.flush().map_err(write_err)?;

    if overwrite {
        let target = dir.join(filename);
        tmp.persist(&target).map_err(|e| SaveError::Persist {
            path: target.clone(),
            source: e.error,
        })?;
        return Ok(target);
    }

    // 不覆盖：按 name (1).jpg、name (2).jpg … 依次尝试
    let mut n = 0u32;
    loop {
        let target = dir.join(numbered_name(filename, n));
        match tmp.persist_noclobber(&target) {
            Ok(_) => return Ok(target),
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
                tmp = e.file;
                n += 1;
            }
            Err(e) => {
                return Err(SaveError::Persist {
                    path: target,
                    source: e.error,
                });
            }
        }
    }
}

fn numbered_name(filename: &str, n: u32) -> String {
    if n == 0 {
        return filename.to_string();
    }
    match filename.rsplit_once('.') {
        Some((stem, ext)) => format!("{stem} ({n}).{ext}"),
        None => format!("{filename} ({n})"),
    }
}
