#![deny(unsafe_code)]
#![doc = "lodge-router: 酒店运营前端的路由注册表、参数契约、角色守卫与导航状态机。"]
#![doc = ""]
#![doc = "数据模型来自 `lodge-core`；本 Crate 负责把它们组合成可运行的导航核心。"]

//! # 模块结构（How）
//! - `registry`：注册期冲突检查与冻结后的只读匹配；
//! - `contract`：路径参数提取校验与工作流链路；
//! - `guard`：角色范围守卫与主页重定向；
//! - `history`：宿主历史端口与会话内有界历史；
//! - `navigator`：`Idle → Resolving → Committed` 状态机；
//! - `config`（feature `config`）：TOML 路由表与导航器参数；
//! - `hotel`（feature `config`）：随 crate 发布的规范酒店路由表。
//!
//! # 使用契约（What）
//! ```ignore
//! let registry = std::sync::Arc::new(lodge_router::hotel::registry()?);
//! let config = NavigatorConfig::default();
//! let mut navigator = Navigator::new(registry, config, Session::anonymous(), ());
//! let committed = navigator.navigate(NavigationEvent::push("/Home"));
//! ```

pub mod contract;
pub mod guard;
pub mod history;
pub mod navigator;
pub mod registry;

#[cfg(feature = "config")]
pub mod config;
#[cfg(feature = "config")]
pub mod hotel;

pub use contract::{Carry, ChainLink, LinkSpec, extract};
pub use guard::RoleScopeGuard;
pub use history::{HistoryEntry, HistoryOp, HistoryPort, RecordingHistory};
pub use navigator::{
    Committed, Disposition, Location, NavigationEvent, Navigator, NavigatorConfig, NavigatorState,
    PendingNavigation, ResolvedNavigation,
};
pub use registry::{RouteRegistry, RouteRegistryBuilder};
