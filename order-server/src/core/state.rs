use std::sync::Arc;

use crate::core::{Config, Result, config::StorageKind};
use crate::hub::{EventBroadcaster, TopicRegistry};
use crate::menu::MenuService;
use crate::orders::{OrderLedger, OrderService};
use crate::payments::{
    MockGatewayState, MockPaymentGateway, PaymentGateway, PaymentService, PaymentSettings,
};
use crate::storage::{OrderStore, RedbStore, seed::seed_demo_data};

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc 包装实现浅拷贝，所有克隆共享同一底层数据。
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 服务器配置 |
/// | store | 存储端口 (redb) |
/// | registry | 推送主题表 |
/// | orders | 订单服务 |
/// | payments | 支付服务 |
/// | menu | 菜单管理 |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub store: Arc<dyn OrderStore>,
    pub registry: Arc<TopicRegistry>,
    pub orders: OrderService,
    pub payments: PaymentService,
    pub menu: MenuService,
}

impl ServerState {
    /// 按配置打开存储并组装服务
    ///
    /// 1. 检查配置取值
    /// 2. 打开 redb (文件或内存)
    /// 3. 空库且开启 `seed_demo_data` 时写入演示数据
    /// 4. 使用 mock 支付网关组装服务
    pub async fn initialize(config: &Config) -> Result<Self> {
        config.validate()?;

        let store: Arc<dyn OrderStore> = match config.storage {
            StorageKind::Redb => {
                std::fs::create_dir_all(&config.work_dir)?;
                let path = config.db_path();
                tracing::info!(path = %path.display(), "Opening redb storage");
                Arc::new(RedbStore::open(path)?)
            }
            StorageKind::Memory => {
                tracing::info!("Using in-memory storage");
                Arc::new(RedbStore::open_in_memory()?)
            }
        };

        if config.seed_demo_data {
            seed_demo_data(store.as_ref()).await?;
        }

        let gateway = Arc::new(MockPaymentGateway::new(
            MockGatewayState::new(),
            config.merchant_id.clone(),
            config.upi_id.clone(),
        ));

        Ok(Self::build(config.clone(), store, gateway))
    }

    /// 使用给定的存储和网关组装 (测试中注入)
    pub fn build(
        config: Config,
        store: Arc<dyn OrderStore>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        let registry = Arc::new(TopicRegistry::new(config.subscriber_buffer));
        let broadcaster = EventBroadcaster::new(registry.clone());
        let ledger = OrderLedger::new(config.tax_rate, config.transition_policy);

        tracing::info!(
            tax_rate = %config.tax_rate,
            policy = %config.transition_policy,
            gateway = gateway.name(),
            "Services assembled"
        );

        let orders = OrderService::new(store.clone(), ledger.clone(), broadcaster.clone());
        let payments = PaymentService::new(
            store.clone(),
            gateway,
            ledger,
            broadcaster,
            PaymentSettings {
                merchant_id: config.merchant_id.clone(),
                upi_id: config.upi_id.clone(),
                verify_timeout: config.gateway_timeout(),
            },
        );
        let menu = MenuService::new(store.clone());

        Self {
            config,
            store,
            registry,
            orders,
            payments,
            menu,
        }
    }
}
