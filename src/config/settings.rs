// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use validator::{Validate, ValidationError, ValidationErrors};

/// 默认抓取的RSS地址
pub const DEFAULT_FEED_URL: &str = "https://cacm.acm.org/issue/latest/feed";

/// 默认浏览器 User-Agent
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// 默认浏览器启动参数
pub const DEFAULT_BROWSER_ARGS: [&str; 4] = [
    "--no-sandbox",
    "--disable-setuid-sandbox",
    "--disable-dev-shm-usage",
    "--disable-gpu",
];

/// 配置加载错误
#[derive(Error, Debug)]
pub enum SettingsError {
    /// 配置源读取或反序列化失败
    #[error("Failed to load configuration: {0}")]
    Config(#[from] ConfigError),
    /// 配置值校验失败
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] ValidationErrors),
}

/// 应用程序配置设置
///
/// 进程启动时加载一次，之后只读
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Settings {
    /// 抓取目标与输出配置
    #[validate(nested)]
    pub fetch: FetchSettings,
    /// 重试配置
    #[validate(nested)]
    pub retry: RetrySettings,
    /// 页面加载配置
    #[validate(nested)]
    pub page: PageSettings,
    /// 浏览器配置
    #[validate(nested)]
    pub browser: BrowserSettings,
}

/// 抓取目标配置
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct FetchSettings {
    /// RSS源地址
    #[validate(url)]
    pub target_url: String,
    /// 输出文件路径
    #[validate(length(min = 1))]
    pub output_path: String,
}

/// 重试配置
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_delay_bounds"))]
pub struct RetrySettings {
    /// 每个引擎的最大尝试次数
    #[validate(range(min = 1, max = 100))]
    pub max_retries: u32,
    /// 初始退避时间（毫秒）
    pub initial_delay_ms: u64,
    /// 退避乘数
    #[validate(range(min = 1.0))]
    pub multiplier: f64,
    /// 最大退避时间（毫秒）
    pub max_delay_ms: u64,
    /// 抖动因子
    #[validate(range(min = 0.0, max = 1.0))]
    pub jitter_factor: f64,
}

fn validate_delay_bounds(retry: &RetrySettings) -> Result<(), ValidationError> {
    if retry.initial_delay_ms > retry.max_delay_ms {
        return Err(ValidationError::new("initial_delay_exceeds_max_delay"));
    }
    Ok(())
}

/// 页面加载配置
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PageSettings {
    /// 导航超时（毫秒）
    #[validate(range(min = 1))]
    pub load_timeout_ms: u64,
    /// 网络空闲后的额外等待（毫秒）
    pub post_load_wait_ms: u64,
}

impl PageSettings {
    pub fn load_timeout(&self) -> Duration {
        Duration::from_millis(self.load_timeout_ms)
    }

    pub fn post_load_wait(&self) -> Duration {
        Duration::from_millis(self.post_load_wait_ms)
    }
}

/// 浏览器配置
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BrowserSettings {
    /// 是否无头模式
    pub headless: bool,
    /// 启动参数
    pub args: Vec<String>,
    /// User-Agent
    #[validate(length(min = 1))]
    pub user_agent: String,
    /// 浏览器可执行文件路径（为空时自动查找）
    pub chrome_executable: Option<String>,
    /// 远程调试地址（设置后主引擎连接已有浏览器而不是启动新进程）
    pub remote_debugging_url: Option<String>,
    /// CDP 请求超时（毫秒）
    #[validate(range(min = 1))]
    pub request_timeout_ms: u64,
    /// 备用引擎连接空闲超时（毫秒）
    #[validate(range(min = 1))]
    pub idle_timeout_ms: u64,
}

impl BrowserSettings {
    pub fn chrome_executable_path(&self) -> Option<PathBuf> {
        self.chrome_executable
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次叠加内置默认值、`config/default`、`config/{APP_ENVIRONMENT}` 以及
    /// `RSSGRAB__` 前缀的环境变量
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载并校验的配置
    /// * `Err(SettingsError)` - 配置加载或校验失败
    pub fn new() -> Result<Self, SettingsError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Self::builder()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("RSSGRAB")
                    .separator("__")
                    .list_separator(" ")
                    .with_list_parse_key("browser.args")
                    .try_parsing(true),
            );

        Self::from_builder(builder)
    }

    /// 只包含内置默认值的配置构建器
    pub fn builder() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            // Default fetch settings
            .set_default("fetch.target_url", DEFAULT_FEED_URL)?
            .set_default("fetch.output_path", "feed.xml")?
            // Default retry settings
            .set_default("retry.max_retries", 5)?
            .set_default("retry.initial_delay_ms", 5000)?
            .set_default("retry.multiplier", 2.0)?
            .set_default("retry.max_delay_ms", 60000)?
            .set_default("retry.jitter_factor", 0.2)?
            // Default page settings
            .set_default("page.load_timeout_ms", 60000)?
            .set_default("page.post_load_wait_ms", 5000)?
            // Default browser settings
            .set_default("browser.headless", true)?
            .set_default("browser.args", DEFAULT_BROWSER_ARGS.to_vec())?
            .set_default("browser.user_agent", DEFAULT_USER_AGENT)?
            .set_default("browser.request_timeout_ms", 60000)?
            .set_default("browser.idle_timeout_ms", 300000)
    }

    /// 从构建器生成并校验配置
    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, SettingsError> {
        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }
}
