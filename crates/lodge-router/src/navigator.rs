//! # 导航解析器（Navigator）
//!
//! ## 核心意图（Why）
//! - 把“解析路径 → 校验参数 → 角色守卫 → 链路校验 → 提交”串成一个显式状态机，
//!   替代旧前端散落在各屏幕里的跳转逻辑；
//! - 每个导航事件获得单调递增的代次，代次落后的解析结果提交时以
//!   [`RouteError::Superseded`] 丢弃，保证上下文只反映最后一个事件。
//!
//! ## 状态机（What）
//! - `Idle → Resolving{g}`：[`Navigator::begin`] 接收事件；
//! - `Resolving{g} → Resolving{g+1}`：新事件到达，旧代次作废；
//! - `Resolving{g} → Committed{g}`：[`Navigator::commit`] 写入上下文与历史；
//! - `Committed{g} → Resolving{g+1}`：下一个事件。
//!
//! ## 结果处置（How）
//! - 渲染：上下文链路参数替换为新路由的参数；
//! - 未找到 / 参数非法 / 链路不一致：渲染 NotFound 屏幕，上下文不变；
//! - 越权：重定向到当前角色主页，主页路径按原事件的历史模式写入；
//! - 历史边界上的回退/前进：保持原状。

use std::sync::Arc;

use lodge_core::{NavigationContext, ParamMap, Role, RouteError, RoutePattern, ScreenId, Session};
use tracing::{debug, info, info_span, warn};

use crate::contract;
use crate::history::{HistoryEntry, HistoryPort, SessionHistory};
use crate::registry::RouteRegistry;

/// 导航器运行参数。
///
/// - `not_found_screen`：未命中时渲染的屏幕标识；
/// - `history_limit`：会话历史最多保留的条目数，至少为 1。
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "config",
    derive(serde::Deserialize),
    serde(default, deny_unknown_fields)
)]
pub struct NavigatorConfig {
    pub not_found_screen: String,
    pub history_limit: usize,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            not_found_screen: String::from("NotFound"),
            history_limit: 64,
        }
    }
}

/// 驱动导航的外部事件。
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NavigationEvent {
    /// 新增历史条目。
    Push(String),
    /// 覆盖当前历史条目。
    Replace(String),
    Back,
    Forward,
}

impl NavigationEvent {
    pub fn push(path: impl Into<String>) -> Self {
        NavigationEvent::Push(path.into())
    }

    pub fn replace(path: impl Into<String>) -> Self {
        NavigationEvent::Replace(path.into())
    }
}

/// 导航器所处的状态。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavigatorState {
    Idle,
    Resolving { generation: u64 },
    Committed { generation: u64 },
}

/// 成功进入某条路由的结果，交给渲染层。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedNavigation {
    pattern: Arc<RoutePattern>,
    params: ParamMap,
    context: Arc<NavigationContext>,
}

impl ResolvedNavigation {
    pub fn pattern(&self) -> &Arc<RoutePattern> {
        &self.pattern
    }

    pub fn target(&self) -> &ScreenId {
        self.pattern.target()
    }

    pub fn params(&self) -> &ParamMap {
        &self.params
    }

    pub fn context(&self) -> &Arc<NavigationContext> {
        &self.context
    }
}

/// 当前显示的位置。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Location {
    path: String,
    screen: ScreenId,
}

impl Location {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn screen(&self) -> &ScreenId {
        &self.screen
    }
}

/// 一次提交的处置方式。
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Disposition {
    /// 渲染了请求的路由。
    Rendered,
    /// 渲染 NotFound 屏幕；携带未命中、参数非法或链路不一致的原因。
    NotFound(RouteError),
    /// 越权后重定向到主页；携带被拒绝的原因。
    Redirected(RouteError),
    /// 历史边界上的回退/前进，没有任何变化。
    Unchanged,
}

/// 已提交的导航结果。
#[derive(Clone, Debug)]
pub struct Committed {
    generation: u64,
    disposition: Disposition,
    location: Option<Location>,
    navigation: Option<ResolvedNavigation>,
    context: Arc<NavigationContext>,
}

impl Committed {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn disposition(&self) -> &Disposition {
        &self.disposition
    }

    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    pub fn screen(&self) -> Option<&ScreenId> {
        self.location.as_ref().map(Location::screen)
    }

    pub fn path(&self) -> Option<&str> {
        self.location.as_ref().map(Location::path)
    }

    /// 进入的路由；NotFound 与保持原状时为 `None`。
    pub fn navigation(&self) -> Option<&ResolvedNavigation> {
        self.navigation.as_ref()
    }

    /// 提交后的上下文。
    pub fn context(&self) -> &Arc<NavigationContext> {
        &self.context
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum HistoryMode {
    Push,
    Replace,
    Traverse(usize),
}

#[derive(Debug)]
enum Outcome {
    Render {
        path: String,
        resolved: ResolvedNavigation,
    },
    Redirect {
        path: String,
        resolved: ResolvedNavigation,
        cause: RouteError,
    },
    NotFound {
        path: String,
        error: RouteError,
    },
    Stay,
}

/// 已解析、尚未提交的导航。
///
/// 由 [`Navigator::begin`] 产生，交回 [`Navigator::commit`] 提交；期间若有新事件开始，提交将失败。
#[derive(Debug)]
#[must_use = "未提交的导航不会改变任何状态"]
pub struct PendingNavigation {
    generation: u64,
    mode: HistoryMode,
    outcome: Outcome,
}

impl PendingNavigation {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// 会话级导航状态机。
///
/// # 教案式说明
/// - **意图 (Why)**：一处持有上下文、当前路由与历史，屏幕只读取提交结果；
/// - **契约 (What)**：
///   - 上下文只在提交时整体替换，解析过程不修改任何状态；
///   - 角色与身份始终取自当前会话，回退/前进按条目路径重新解析出链路参数；
///   - 链路校验只对从链路起点出发的 `Push`/`Replace` 生效，历史遍历不校验；
///   - 链路起点是最近一次进入的路由，NotFound 不改变它，与上下文中的链路参数始终对应；
/// - **风险 (Trade-offs)**：`begin` 与 `commit` 之间只允许调用 `begin` 开始新事件，
///   即“最后一个事件获胜”；调用方负责串行驱动。
#[derive(Debug)]
pub struct Navigator<H = ()> {
    registry: Arc<RouteRegistry>,
    config: NavigatorConfig,
    context: Arc<NavigationContext>,
    current: Option<Arc<RoutePattern>>,
    link_source: Option<Arc<RoutePattern>>,
    location: Option<Location>,
    state: NavigatorState,
    generation: u64,
    history: SessionHistory,
    port: H,
}

impl<H: HistoryPort> Navigator<H> {
    pub fn new(
        registry: Arc<RouteRegistry>,
        config: NavigatorConfig,
        session: Session,
        port: H,
    ) -> Self {
        let history = SessionHistory::new(config.history_limit);
        Self {
            registry,
            config,
            context: Arc::new(NavigationContext::new(session)),
            current: None,
            link_source: None,
            location: None,
            state: NavigatorState::Idle,
            generation: 0,
            history,
            port,
        }
    }

    pub fn registry(&self) -> &Arc<RouteRegistry> {
        &self.registry
    }

    pub fn context(&self) -> &Arc<NavigationContext> {
        &self.context
    }

    pub fn state(&self) -> NavigatorState {
        self.state
    }

    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    /// 当前渲染的路由模式；NotFound 或尚未导航时为 `None`。
    pub fn current(&self) -> Option<&Arc<RoutePattern>> {
        self.current.as_ref()
    }

    pub fn history(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.history.entries()
    }

    pub fn history_cursor(&self) -> usize {
        self.history.cursor()
    }

    pub fn history_port(&self) -> &H {
        &self.port
    }

    pub fn into_port(self) -> H {
        self.port
    }

    /// 开始处理一个事件，返回待提交的解析结果。
    ///
    /// - 代次加一；若上一代次仍在解析中，它在此刻作废；
    /// - 解析只读当前状态，结果在 [`Self::commit`] 时才生效。
    pub fn begin(&mut self, event: NavigationEvent) -> PendingNavigation {
        let generation = self.generation.wrapping_add(1);
        if let NavigatorState::Resolving { generation: stale } = self.state {
            debug!(stale, superseded_by = generation, "abandoning unfinished navigation");
        }
        self.generation = generation;
        self.state = NavigatorState::Resolving { generation };

        let (mode, outcome) = match event {
            NavigationEvent::Push(path) => (HistoryMode::Push, self.resolve_path(path, true)),
            NavigationEvent::Replace(path) => (HistoryMode::Replace, self.resolve_path(path, true)),
            NavigationEvent::Back => self.traverse(-1),
            NavigationEvent::Forward => self.traverse(1),
        };
        PendingNavigation {
            generation,
            mode,
            outcome,
        }
    }

    /// 提交解析结果。
    ///
    /// # 错误
    /// - 期间已有更新的事件开始时返回 [`RouteError::Superseded`]，状态保持不变。
    pub fn commit(&mut self, pending: PendingNavigation) -> Result<Committed, RouteError> {
        if pending.generation != self.generation {
            debug!(
                generation = pending.generation,
                latest = self.generation,
                "discarding superseded navigation"
            );
            return Err(RouteError::Superseded {
                generation: pending.generation,
                latest: self.generation,
            });
        }
        Ok(self.apply(pending))
    }

    /// 解析并立即提交。
    pub fn navigate(&mut self, event: NavigationEvent) -> Committed {
        let pending = self.begin(event);
        self.apply(pending)
    }

    /// 替换会话身份（登录、登出、切换账户），清空链路参数并进入新角色的主页。
    pub fn switch_session(&mut self, session: Session) -> Committed {
        info!(role = %session.role(), "session switched");
        self.context = Arc::new(NavigationContext::new(session));
        self.current = None;
        self.link_source = None;
        let path = match self.registry.guard().home_path(&self.context) {
            Ok((_, path)) => path,
            Err(error) => {
                warn!(code = error.code(), %error, "home route rejected the session identity");
                self.registry.home(Role::Public).template().to_owned()
            }
        };
        self.navigate(NavigationEvent::Push(path))
    }

    fn traverse(&self, step: isize) -> (HistoryMode, Outcome) {
        match self.history.neighbour(step) {
            Some((index, entry)) => (
                HistoryMode::Traverse(index),
                self.resolve_path(entry.path().to_owned(), false),
            ),
            None => (HistoryMode::Replace, Outcome::Stay),
        }
    }

    fn resolve_path(&self, path: String, enforce_links: bool) -> Outcome {
        let span = info_span!("navigate", path = %path, generation = self.generation);
        let _entered = span.enter();

        let pattern = match self.registry.resolve(&path, Some(self.context.role())) {
            Ok(pattern) => Arc::clone(pattern),
            Err(error) => {
                debug!(code = error.code(), "no route matched");
                return Outcome::NotFound { path, error };
            }
        };
        let params = match contract::extract(&pattern, &path) {
            Ok(params) => params,
            Err(error) => {
                log_rejected(&error);
                return Outcome::NotFound { path, error };
            }
        };
        if let Err(cause) = self.registry.guard().check(&pattern, &self.context) {
            debug!(code = cause.code(), %cause, "redirecting to role home");
            return self.redirect_home(path, cause);
        }
        if enforce_links && let Some(error) = self.verify_link(&pattern, &params) {
            log_rejected(&error);
            return Outcome::NotFound { path, error };
        }

        let context = Arc::new(self.context.with_chain(params.clone()));
        Outcome::Render {
            path,
            resolved: ResolvedNavigation {
                pattern,
                params,
                context,
            },
        }
    }

    fn verify_link(&self, pattern: &RoutePattern, params: &ParamMap) -> Option<RouteError> {
        let from = self.link_source.as_ref()?;
        let link = self.registry.link_between(from, pattern)?;
        link.verify(self.context.chain(), params).err()
    }

    fn redirect_home(&self, requested: String, cause: RouteError) -> Outcome {
        let home = self
            .registry
            .guard()
            .home_path(&self.context)
            .and_then(|(home, path)| {
                let params = contract::extract(home, &path)?;
                Ok((Arc::clone(home), path, params))
            });
        match home {
            Ok((pattern, path, params)) => {
                let context = Arc::new(self.context.with_chain(params.clone()));
                Outcome::Redirect {
                    path,
                    resolved: ResolvedNavigation {
                        pattern,
                        params,
                        context,
                    },
                    cause,
                }
            }
            Err(error) => {
                log_rejected(&error);
                Outcome::NotFound {
                    path: requested,
                    error,
                }
            }
        }
    }

    fn apply(&mut self, pending: PendingNavigation) -> Committed {
        let PendingNavigation {
            generation,
            mode,
            outcome,
        } = pending;

        let committed = match outcome {
            Outcome::Render { path, resolved } => {
                self.enter(generation, mode, path, resolved, Disposition::Rendered)
            }
            Outcome::Redirect {
                path,
                resolved,
                cause,
            } => self.enter(generation, mode, path, resolved, Disposition::Redirected(cause)),
            Outcome::NotFound { path, error } => {
                let location = Location {
                    path,
                    screen: ScreenId::new(self.config.not_found_screen.clone()),
                };
                self.record(mode, &location);
                self.current = None;
                self.location = Some(location.clone());
                Committed {
                    generation,
                    disposition: Disposition::NotFound(error),
                    location: Some(location),
                    navigation: None,
                    context: Arc::clone(&self.context),
                }
            }
            Outcome::Stay => Committed {
                generation,
                disposition: Disposition::Unchanged,
                location: self.location.clone(),
                navigation: None,
                context: Arc::clone(&self.context),
            },
        };

        self.state = NavigatorState::Committed { generation };
        info!(
            generation,
            screen = committed.screen().map(ScreenId::as_str),
            path = committed.path(),
            "navigation committed"
        );
        committed
    }

    fn enter(
        &mut self,
        generation: u64,
        mode: HistoryMode,
        path: String,
        resolved: ResolvedNavigation,
        disposition: Disposition,
    ) -> Committed {
        let location = Location {
            path,
            screen: resolved.pattern.target().clone(),
        };
        self.record(mode, &location);
        self.context = Arc::clone(&resolved.context);
        self.current = Some(Arc::clone(&resolved.pattern));
        self.link_source = Some(Arc::clone(&resolved.pattern));
        self.location = Some(location.clone());
        Committed {
            generation,
            disposition,
            location: Some(location),
            navigation: Some(resolved),
            context: Arc::clone(&self.context),
        }
    }

    fn record(&mut self, mode: HistoryMode, location: &Location) {
        let entry = HistoryEntry::new(location.path.clone(), location.screen.clone());
        match mode {
            HistoryMode::Push => {
                self.history.push(entry);
                self.port.push(&location.path);
            }
            HistoryMode::Replace => {
                self.history.replace(entry);
                self.port.replace(&location.path);
            }
            HistoryMode::Traverse(index) => {
                self.history.restore(index, entry);
                self.port.replace(&location.path);
            }
        }
    }
}

fn log_rejected(error: &RouteError) {
    match error {
        RouteError::InvalidParameter { name, index, fault } => {
            warn!(
                param = %name,
                index,
                %fault,
                code = error.code(),
                "rejected positional parameter"
            );
        }
        other => debug!(code = other.code(), %other, "navigation rejected"),
    }
}
