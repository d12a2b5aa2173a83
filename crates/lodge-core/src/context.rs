//! # 导航上下文（NavigationContext）
//!
//! ## 核心意图（Why）
//! - 把身份协作方提供的角色/身份与工作流沿途携带的链路参数放在同一个值里，
//!   让回退/前进可以按历史条目确定性地恢复；
//! - 上下文只会被整体替换，不提供任何原地修改的入口。
//!
//! ## 行为契约（What）
//! - [`Session`] 由外部身份协作方在会话开始、登录或登出时提供，核心只读不校验；
//! - [`NavigationContext::with_chain`] 返回新实例，原实例保持不变。

use std::sync::Arc;

use crate::param::ParamMap;
use crate::role::Role;

/// 已认证的会话身份。
///
/// - `identity` 为账户邮箱等稳定标识；`Public` 会话不携带身份；
/// - 使用 `Arc<str>` 共享，避免每次上下文替换都复制字符串。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    role: Role,
    identity: Option<Arc<str>>,
}

impl Session {
    /// 未登录访客。
    pub fn anonymous() -> Self {
        Self {
            role: Role::Public,
            identity: None,
        }
    }

    /// 已登录的会话；传入 `Role::Public` 或空身份时不携带身份。
    pub fn signed_in(role: Role, identity: impl Into<Arc<str>>) -> Self {
        let identity: Arc<str> = identity.into();
        let identity = (role != Role::Public && !identity.is_empty()).then_some(identity);
        Self { role, identity }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::anonymous()
    }
}

/// 导航解析器持有的会话级上下文。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NavigationContext {
    session: Session,
    chain: ParamMap,
}

impl NavigationContext {
    /// 以空链路参数开始一个会话。
    pub fn new(session: Session) -> Self {
        Self {
            session,
            chain: ParamMap::new(),
        }
    }

    /// 替换链路参数，返回新的上下文。
    pub fn with_chain(&self, chain: ParamMap) -> Self {
        Self {
            session: self.session.clone(),
            chain,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn role(&self) -> Role {
        self.session.role
    }

    pub fn identity(&self) -> Option<&str> {
        self.session.identity()
    }

    /// 工作流沿途携带的参数，按最近一次命中路由的声明顺序排列。
    pub fn chain(&self) -> &ParamMap {
        &self.chain
    }
}
