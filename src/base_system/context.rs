//! 全局配置结构（Config）与默认值。
//!
//! 该模块同时提供生成 `config.yml` 的字段元信息。

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::config::{ConfigError, ConfigSpec, FieldMeta, config_path, write_with_comments};
use super::theme::Theme;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    // 程序配置
    #[serde(default = "default_false")]
    pub old_cli: bool,
    #[serde(default)]
    pub theme: Option<Theme>,

    // 网络配置
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
    #[serde(default = "default_submit_delay_ms")]
    pub submit_delay_ms: u64,

    // 保存配置
    #[serde(default)]
    pub save_path: String,
    #[serde(default = "default_true")]
    pub allow_overwrite_files: bool,

    // 显示配置
    #[serde(default = "default_true")]
    pub image_preview: bool,

    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            old_cli: default_false(),
            theme: None,
            request_timeout: default_request_timeout(),
            submit_delay_ms: default_submit_delay_ms(),
            save_path: String::new(),
            allow_overwrite_files: default_true(),
            image_preview: default_true(),
            base_dir: None,
        }
    }
}

impl ConfigSpec for Config {
    const FILE_NAME: &'static str = "config.yml";

    fn fields() -> &'static [FieldMeta] {
        static FIELDS: [FieldMeta; 7] = [
            FieldMeta {
                name: "old_cli",
                description: "是否使用老版本命令行界面",
            },
            FieldMeta {
                name: "theme",
                description: "界面主题 light/dark，留空(null)则跟随终端背景",
            },
            FieldMeta {
                name: "request_timeout",
                description: "请求超时时间（秒）",
            },
            FieldMeta {
                name: "submit_delay_ms",
                description: "提交后展示结果前的停顿（毫秒），0 表示不停顿",
            },
            FieldMeta {
                name: "save_path",
                description: "缩略图保存路径，留空则保存到当前目录",
            },
            FieldMeta {
                name: "allow_overwrite_files",
                description: "同名文件是否直接覆盖；关闭时自动改名为 name (n).jpg",
            },
            FieldMeta {
                name: "image_preview",
                description: "是否在卡片中显示字符画预览",
            },
        ];
        &FIELDS
    }
}

impl Config {
    /// 加载后记录所在目录，之后的保存写回同一位置。
    pub fn with_base_dir(mut self, base_dir: Option<&Path>) -> Self {
        self.base_dir = base_dir.map(Path::to_path_buf);
        self
    }

    pub fn config_file(&self) -> PathBuf {
        config_path::<Config>(self.base_dir.as_deref())
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        write_with_comments(self, &self.config_file())
    }

    pub fn default_save_dir(&self) -> PathBuf {
        if self.save_path.trim().is_empty() {
            std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
        } else {
            PathBuf::from(self.save_path.trim())
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout.max(1))
    }

    pub fn submit_delay(&self) -> Duration {
        Duration::from_millis(self.submit_delay_ms)
    }

    pub fn resolved_theme(&self) -> Theme {
        super::theme::resolve(self.theme)
    }
}

fn default_false() -> bool {
    false
}

fn default_true() -> bool {
    true
}

fn default_request_timeout() -> u64 {
    15
}

fn default_submit_delay_ms() -> u64 {
    500
}
