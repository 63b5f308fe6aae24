use rust_decimal::Decimal;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use super::ServerError;
use crate::hub::DEFAULT_SUBSCRIBER_BUFFER;
use crate::orders::TransitionPolicy;

/// 存储后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageKind {
    /// `WORK_DIR/orders.redb`
    #[default]
    Redb,
    /// 进程内，重启即丢失
    Memory,
}

impl FromStr for StorageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redb" | "file" => Ok(StorageKind::Redb),
            "memory" | "mem" => Ok(StorageKind::Memory),
            other => Err(format!("unknown storage kind: {other}")),
        }
    }
}

/// 服务器配置 - 点餐服务的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 (数据库、日志) |
/// | HTTP_PORT | 5000 | HTTP + WebSocket 端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | STORAGE | redb | redb / memory |
/// | TAX_RATE | 0.08 | 税率 |
/// | ORDER_TRANSITION_POLICY | strict | strict / lenient |
/// | GATEWAY_TIMEOUT_MS | 5000 | 支付校验超时(毫秒) |
/// | MERCHANT_ID | MOCK_MERCHANT_123 | 商户号 |
/// | UPI_ID | tableorder@mockupi | 收款 UPI ID |
/// | SUBSCRIBER_BUFFER | 256 | 每个推送连接的队列容量 |
/// | SEED_DEMO_DATA | 开发环境为 true | 空库时写入演示数据 |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_DIR | (未设置) | 滚动日志目录 |
///
/// # 示例
///
/// ```ignore
/// HTTP_PORT=8080 TAX_RATE=0.18 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    pub storage: StorageKind,
    /// 税率 (小数，例如 0.08)
    pub tax_rate: Decimal,
    pub transition_policy: TransitionPolicy,
    /// 支付网关校验超时 (毫秒)
    pub gateway_timeout_ms: u64,
    pub merchant_id: String,
    pub upi_id: String,
    /// 每个推送连接的出站队列容量
    pub subscriber_buffer: usize,
    pub seed_demo_data: bool,
    pub log_level: String,
    pub log_dir: Option<String>,
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置或无法解析，使用默认值
    pub fn from_env() -> Self {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let is_development = environment == "development";

        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into()),
            http_port: env_parse("HTTP_PORT").unwrap_or(5000),
            storage: env_parse("STORAGE").unwrap_or_default(),
            tax_rate: env_parse("TAX_RATE").unwrap_or(Decimal::new(8, 2)),
            transition_policy: env_parse("ORDER_TRANSITION_POLICY").unwrap_or_default(),
            gateway_timeout_ms: env_parse("GATEWAY_TIMEOUT_MS").unwrap_or(5000),
            merchant_id: std::env::var("MERCHANT_ID")
                .unwrap_or_else(|_| "MOCK_MERCHANT_123".into()),
            upi_id: std::env::var("UPI_ID").unwrap_or_else(|_| "tableorder@mockupi".into()),
            subscriber_buffer: env_parse("SUBSCRIBER_BUFFER").unwrap_or(DEFAULT_SUBSCRIBER_BUFFER),
            seed_demo_data: env_parse("SEED_DEMO_DATA").unwrap_or(is_development),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok(),
            environment,
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景：内存存储，不写演示数据
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config.storage = StorageKind::Memory;
        config.seed_demo_data = false;
        config
    }

    /// 数据库文件路径
    pub fn db_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("orders.redb")
    }

    pub fn gateway_timeout(&self) -> Duration {
        Duration::from_millis(self.gateway_timeout_ms)
    }

    /// 启动前检查取值范围
    pub fn validate(&self) -> Result<(), ServerError> {
        if self.tax_rate < Decimal::ZERO || self.tax_rate >= Decimal::ONE {
            return Err(ServerError::Config(format!(
                "TAX_RATE must be in [0, 1), got {}",
                self.tax_rate
            )));
        }
        if self.subscriber_buffer == 0 {
            return Err(ServerError::Config("SUBSCRIBER_BUFFER must be > 0".into()));
        }
        if self.gateway_timeout_ms == 0 {
            return Err(ServerError::Config("GATEWAY_TIMEOUT_MS must be > 0".into()));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
