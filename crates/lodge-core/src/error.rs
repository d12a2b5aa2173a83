//! # error 模块说明
//!
//! ## 角色定位（Why）
//! - 集中定义导航核心的两类错误：装载期的 [`ConfigError`] 与导航期的 [`RouteError`]；
//! - 每个变体带稳定的点分错误码，便于日志检索与告警聚合。
//!
//! ## 处置约定（What）
//! - `ConfigError`：启动即失败，带着它的路由表不得发布；
//! - `RouteError::NotFound`：渲染 NotFound 屏幕，上下文不变；
//! - `RouteError::InvalidParameter`：与 NotFound 相同处置，并记录参数名与位置；
//! - `RouteError::Forbidden`：重定向到当前角色主页，不向用户展示；
//! - `RouteError::Superseded`：被更新的导航事件取代，丢弃即可。

use thiserror::Error;

use crate::param::ParamFault;
use crate::role::Role;
use crate::route::ScreenId;

/// 路由表装载期错误。
///
/// # 教案式说明
/// - **意图 (Why)**：旧路由表里重复的 `OwnerRepair`、冲突的 `/` 都被“表顺序”悄悄消化，
///   这里把它们全部变成显式错误；
/// - **契约 (What)**：所有变体携带足以定位配置行的上下文（模板文本、屏幕、角色）；
/// - **风险 (Trade-offs)**：`Parse` 仅保留文本描述，不保留底层解析器错误类型，避免契约层依赖 `toml`。
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    /// 模板语法错误。
    #[error("route template `{template}` is malformed: {reason}")]
    MalformedTemplate {
        template: String,
        reason: &'static str,
    },

    /// 同一模板内参数名重复。
    #[error("parameter `{name}` is declared twice in `{template}`")]
    DuplicateParameter { template: String, name: String },

    /// 为模板中不存在的占位符声明形态。
    #[error("parameter `{name}` is not a placeholder of `{template}`")]
    UnknownParameter { template: String, name: String },

    /// 同一角色范围内两条模板可能匹配同一路径。
    #[error("route `{incoming}` is ambiguous with `{existing}` in the {role} scope")]
    AmbiguousRoute {
        role: Role,
        existing: String,
        incoming: String,
    },

    /// 引用了未注册的屏幕。
    #[error("screen `{screen}` is not registered")]
    UnknownScreen { screen: ScreenId },

    /// 某角色缺少主页路由。
    #[error("the {role} scope has no home route")]
    MissingHome { role: Role },

    /// 某角色声明了多个主页。
    #[error("the {role} scope already has home route `{existing}`")]
    DuplicateHome { role: Role, existing: String },

    /// 主页模板不满足“至多一个身份参数”的约束。
    #[error("home route `{template}` for the {role} scope may only declare the identity parameter")]
    InvalidHome { role: Role, template: String },

    /// 工作流链路与两端模板的参数声明不一致。
    #[error("chain link `{from}` -> `{to}` is invalid: {reason}")]
    InvalidLink {
        from: ScreenId,
        to: ScreenId,
        reason: String,
    },

    /// 配置文本无法解析或取值越界。
    #[error("navigation configuration is invalid: {detail}")]
    Parse { detail: String },
}

impl ConfigError {
    /// 稳定错误码。
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::MalformedTemplate { .. } => "nav.config.template",
            ConfigError::DuplicateParameter { .. } => "nav.config.param_duplicate",
            ConfigError::UnknownParameter { .. } => "nav.config.param_unknown",
            ConfigError::AmbiguousRoute { .. } => "nav.config.ambiguous",
            ConfigError::UnknownScreen { .. } => "nav.config.screen_unknown",
            ConfigError::MissingHome { .. } => "nav.config.home_missing",
            ConfigError::DuplicateHome { .. } => "nav.config.home_duplicate",
            ConfigError::InvalidHome { .. } => "nav.config.home_invalid",
            ConfigError::InvalidLink { .. } => "nav.config.link",
            ConfigError::Parse { .. } => "nav.config.parse",
        }
    }
}

/// 单次导航事件的失败语义。
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum RouteError {
    /// 没有模板匹配该路径。
    #[error("no route matches `{path}`")]
    NotFound { path: String },

    /// 位置参数未通过校验。
    ///
    /// - `index` 为参数在模板声明序列中的下标（从 0 开始）。
    #[error("parameter `{name}` at position {index} is invalid: {fault}")]
    InvalidParameter {
        name: String,
        index: usize,
        fault: ParamFault,
    },

    /// 当前角色无权进入目标路由。
    #[error("the {role} role may not enter `{template}`")]
    Forbidden { role: Role, template: String },

    /// 解析尚未提交即被更新的导航事件取代。
    #[error("navigation #{generation} was superseded by #{latest}")]
    Superseded { generation: u64, latest: u64 },
}

impl RouteError {
    /// 稳定错误码。
    pub fn code(&self) -> &'static str {
        match self {
            RouteError::NotFound { .. } => "nav.route.not_found",
            RouteError::InvalidParameter { .. } => "nav.param.invalid",
            RouteError::Forbidden { .. } => "nav.guard.forbidden",
            RouteError::Superseded { .. } => "nav.resolve.superseded",
        }
    }
}
