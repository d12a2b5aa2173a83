#![deny(unsafe_code)]
#![doc = "lodge-core: 酒店运营前端导航核心的契约层。"]
#![doc = ""]
#![doc = "本 Crate 只定义数据模型：路由模式、角色、位置参数、导航上下文与错误语义。"]
#![doc = "匹配、守卫与状态机实现位于 `lodge-router`。"]

//! # 模块结构（How）
//! - `role`：四类角色（public/customer/employee/owner）及其文本形式；
//! - `route`：路由段、路由模式与路径切分规则；
//! - `param`：参数类型声明、校验后的参数值与有序参数表；
//! - `context`：会话身份与导航上下文；
//! - `error`：配置期与导航期的错误枚举。
//!
//! # 使用契约（What）
//! - 所有结构均为不可变值类型，变更通过构造新实例完成；
//! - 错误均派生 `thiserror::Error`，并提供稳定的点分错误码 `code()`。

pub mod context;
pub mod error;
pub mod param;
pub mod role;
pub mod route;

pub use context::{NavigationContext, Session};
pub use error::{ConfigError, RouteError};
pub use param::{ParamFault, ParamKind, ParamMap, ParamSpec, ParamValue};
pub use role::Role;
pub use route::{RoutePattern, RouteSegment, ScreenId, split_path};
