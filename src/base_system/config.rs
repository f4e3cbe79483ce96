//! 配置文件读写：缺失时生成带注释的默认配置，读取时与默认值合并。

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_yaml::{Mapping, Value};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error at {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("invalid yaml at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Copy)]
pub struct FieldMeta {
    pub name: &'static str,
    pub description: &'static str,
}

pub trait ConfigSpec: Serialize + DeserializeOwned + Default {
    const FILE_NAME: &'static str;
    fn fields() -> &'static [FieldMeta];
}

/// 配置文件位置：`base_dir/FILE_NAME`，未指定目录时落在当前目录。
pub fn config_path<T: ConfigSpec>(base_dir: Option<&Path>) -> PathBuf {
    match base_dir {
        Some(base) => base.join(T::FILE_NAME),
        None => PathBuf::from(T::FILE_NAME),
    }
}

pub fn load_or_create<T: ConfigSpec>(base_dir: Option<&Path>) -> Result<T, ConfigError> {
    load_or_create_at::<T>(&config_path::<T>(base_dir))
}

pub fn load_or_create_at<T: ConfigSpec>(path: &Path) -> Result<T, ConfigError> {
    if !path.exists() {
        let config = T::default();
        write_with_comments(&config, path)?;
        info!(target: "config", "created default config at {}", path.display());
        return Ok(config);
    }

    let user = read_yaml(path)?;
    let incomplete = has_missing_fields::<T>(&user);

    let mut merged = to_value(&T::default())?;
    merge_values(&mut merged, user);
    let config: T =
        serde_yaml::from_value(merged).map_err(|err| ConfigError::Validation(err.to_string()))?;

    if incomplete {
        debug!(target: "config", "filling missing fields in {}", path.display());
        write_with_comments(&config, path)?;
    }
    Ok(config)
}

pub fn write_with_comments<T: ConfigSpec>(config: &T, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let yaml = render_with_comments(config)?;
    fs::write(path, yaml).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// 按 `fields()` 的顺序逐项输出，每项上方带一行注释。
pub fn render_with_comments<T: ConfigSpec>(config: &T) -> Result<String, ConfigError> {
    let Value::Mapping(values) = to_value(config)? else {
        return Err(ConfigError::Validation(
            "config must serialize to a mapping".to_string(),
        ));
    };

    let mut out = String::new();
    for field in T::fields() {
        for line in field.description.lines().filter(|l| !l.is_empty()) {
            out.push_str("# ");
            out.push_str(line);
            out.push('\n');
        }
        let key = Value::String(field.name.to_string());
        let value = values.get(&key).cloned().unwrap_or(Value::Null);
        let mut single = Mapping::new();
        single.insert(key, value);
        let entry = serde_yaml::to_string(&single)
            .map_err(|err| ConfigError::Validation(err.to_string()))?;
        out.push_str(entry.trim_end());
        out.push('\n');
    }
    Ok(out)
}

fn read_yaml(path: &Path) -> Result<Value, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn to_value<T: Serialize>(config: &T) -> Result<Value, ConfigError> {
    serde_yaml::to_value(config).map_err(|err| ConfigError::Validation(err.to_string()))
}

fn has_missing_fields<T: ConfigSpec>(user: &Value) -> bool {
    match user {
        Value::Mapping(map) => T::fields()
            .iter()
            .any(|f| !map.contains_key(Value::String(f.name.to_string()))),
        _ => true,
    }
}

// 用户值覆盖默认值；映射逐键递归，其余整体替换。Null（空文件或空字段）保持默认。
fn merge_values(dest: &mut Value, user: Value) {
    match (dest, user) {
        (_, Value::Null) => {}
        (Value::Mapping(dest), Value::Mapping(src)) => {
            for (key, user_val) in src {
                match dest.get_mut(&key) {
                    Some(dest_val) => merge_values(dest_val, user_val),
                    None => {
                        dest.insert(key, user_val);
                    }
                }
            }
        }
        (dest, other) => *dest = other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        retries: u32,
        mode: Option<String>,
    }

    impl Default for Sample {
        fn default() -> Self {
            Self {
                name: "demo".to_string(),
                retries: 3,
                mode: None,
            }
        }
    }

    impl ConfigSpec for Sample {
        const FILE_NAME: &'static str = "sample.yml";

        fn fields() -> &'static [FieldMeta] {
            static FIELDS: [FieldMeta; 3] = [
                FieldMeta {
                    name: "name",
                    description: "display name",
                },
                FieldMeta {
                    name: "retries",
                    description: "retry count\nsecond line",
                },
                FieldMeta {
                    name: "mode",
                    description: "",
                },
            ];
            &FIELDS
        }
    }

    #[test]
    fn creates_default_file_with_comments() {
        let dir = tempfile::tempdir().unwrap();
        let cfg: Sample = load_or_create(Some(dir.path())).unwrap();
        assert_eq!(cfg, Sample::default());

        let text = fs::read_to_string(dir.path().join("sample.yml")).unwrap();
        assert!(text.contains("# display name\nname: demo"));
        assert!(text.contains("# retry count\n# second line\nretries: 3"));
        assert!(text.contains("mode: null"));
    }

    #[test]
    fn merges_partial_user_file_and_fills_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.yml");
        fs::write(&path, "retries: 9\n").unwrap();

        let cfg: Sample = load_or_create_at(&path).unwrap();
        assert_eq!(cfg.retries, 9);
        assert_eq!(cfg.name, "demo");

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("name: demo"));
        assert!(text.contains("retries: 9"));
    }

    #[test]
    fn written_values_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("sample.yml");
        let cfg = Sample {
            name: "x".to_string(),
            retries: 1,
            mode: Some("fast".to_string()),
        };
        write_with_comments(&cfg, &path).unwrap();
        let loaded: Sample = load_or_create_at(&path).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn invalid_yaml_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.yml");
        fs::write(&path, "name: [unclosed\n").unwrap();
        let err = load_or_create_at::<Sample>(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
