//! # 路由注册表（RouteRegistry）
//!
//! ## 核心意图（Why）
//! - 用一张唯一的、装载后冻结的注册表取代旧前端三份互相矛盾的路由表；
//! - 歧义在注册期即以 [`ConfigError`] 暴露，匹配结果与注册顺序无关。
//!
//! ## 使用方式（How）
//! 1. 通过 [`RouteRegistry::builder`] 逐条 `register` / `register_home`，再以 `link` 声明工作流链路；
//! 2. 调用 [`RouteRegistryBuilder::build`] 完成主页与链路校验，得到只读的 [`RouteRegistry`]；
//! 3. 运行期只调用 [`RouteRegistry::resolve`] 等只读接口，无需任何读写协调。
//!
//! ## 平局规则（What）
//! - 同一角色范围内至多一条模板能匹配（注册期保证），因此 (角色, 模板) 唯一标识一条路由；
//! - 屏幕标识不要求唯一，多条路径可以通往同一屏幕（例如 `/` 与 `/Home`）；
//! - 跨角色同时命中时：调用方角色优先；调用方角色未知时 `public` 优先；
//!   其余按 [`Role`] 的排序，只作为守卫重定向前的确定性候选。

use std::collections::BTreeMap;
use std::sync::Arc;

use lodge_core::{ConfigError, Role, RouteError, RoutePattern, ScreenId, split_path};
use tracing::debug;

use crate::contract::{ChainLink, LinkSpec};
use crate::guard::RoleScopeGuard;

/// 可变的注册期构造器。
///
/// # 教案式说明
/// - **意图 (Why)**：把“逐条注册 + 即时冲突检查”与“运行期只读”拆成两个类型，
///   冻结后的注册表不再暴露任何写接口；
/// - **契约 (What)**：`register` 在同一角色范围内发现重叠模板时立即失败，
///   构造器保持失败前的状态；链路与主页完整性在 `build` 时统一校验。
#[derive(Debug, Default)]
pub struct RouteRegistryBuilder {
    patterns: Vec<Arc<RoutePattern>>,
    homes: BTreeMap<Role, usize>,
    links: Vec<LinkSpec>,
}

impl RouteRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册一条普通路由。
    pub fn register(&mut self, pattern: RoutePattern) -> Result<&mut Self, ConfigError> {
        self.insert(pattern)?;
        Ok(self)
    }

    /// 注册一条路由并将其设为所属角色的主页。
    ///
    /// - `public` 主页不得声明参数；其余角色的主页至多声明一个参数，由会话身份填充；
    /// - 同一角色重复声明主页返回 [`ConfigError::DuplicateHome`]。
    pub fn register_home(&mut self, pattern: RoutePattern) -> Result<&mut Self, ConfigError> {
        let role = pattern.role();
        let allowed = match role {
            Role::Public => 0,
            _ => 1,
        };
        if pattern.params().len() > allowed {
            return Err(ConfigError::InvalidHome {
                role,
                template: pattern.template().to_owned(),
            });
        }
        if let Some(&existing) = self.homes.get(&role) {
            return Err(ConfigError::DuplicateHome {
                role,
                existing: self.patterns[existing].template().to_owned(),
            });
        }
        let index = self.insert(pattern)?;
        self.homes.insert(role, index);
        Ok(self)
    }

    /// 声明一条工作流链路，校验推迟到 [`Self::build`]。
    pub fn link(&mut self, spec: LinkSpec) -> &mut Self {
        self.links.push(spec);
        self
    }

    fn insert(&mut self, pattern: RoutePattern) -> Result<usize, ConfigError> {
        if let Some(existing) = self
            .patterns
            .iter()
            .find(|existing| existing.role() == pattern.role() && existing.overlaps(&pattern))
        {
            return Err(ConfigError::AmbiguousRoute {
                role: pattern.role(),
                existing: existing.template().to_owned(),
                incoming: pattern.template().to_owned(),
            });
        }
        self.patterns.push(Arc::new(pattern));
        Ok(self.patterns.len() - 1)
    }

    /// 冻结注册表。
    ///
    /// # 教案式注释
    /// - **前置条件**：四个角色各有一个主页；
    /// - **执行 (How)**：建立按段数与屏幕的索引，
    ///   再把每条 [`LinkSpec`] 绑定到两端屏幕的每一对路由；
    /// - **错误**：缺少主页、链路引用未知屏幕、链路参数与模板不符、同一对屏幕重复声明链路。
    pub fn build(self) -> Result<RouteRegistry, ConfigError> {
        let mut homes = [0usize; 4];
        for role in Role::ALL {
            homes[role.index()] = *self
                .homes
                .get(&role)
                .ok_or(ConfigError::MissingHome { role })?;
        }

        let mut by_arity: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        let mut by_screen: BTreeMap<ScreenId, Vec<usize>> = BTreeMap::new();
        for (index, pattern) in self.patterns.iter().enumerate() {
            by_arity.entry(pattern.arity()).or_default().push(index);
            by_screen
                .entry(pattern.target().clone())
                .or_default()
                .push(index);
        }

        let patterns = &self.patterns;
        let lookup = |screen: &ScreenId| {
            by_screen
                .get(screen)
                .map(|indices| indices.iter().map(|&index| &patterns[index]).collect::<Vec<_>>())
                .ok_or_else(|| ConfigError::UnknownScreen {
                    screen: screen.clone(),
                })
        };

        let mut links = Vec::new();
        for (position, spec) in self.links.iter().enumerate() {
            let declared_twice = self.links[..position]
                .iter()
                .any(|earlier| (earlier.from(), earlier.to()) == (spec.from(), spec.to()));
            if declared_twice {
                return Err(ConfigError::InvalidLink {
                    from: spec.from().clone(),
                    to: spec.to().clone(),
                    reason: String::from("declared more than once"),
                });
            }
            let sources = lookup(spec.from())?;
            let targets = lookup(spec.to())?;
            for source in &sources {
                for target in &targets {
                    links.push(ChainLink::bind(spec, source, target)?);
                }
            }
        }

        debug!(
            routes = self.patterns.len(),
            links = links.len(),
            "route registry frozen"
        );

        Ok(RouteRegistry {
            patterns: self.patterns,
            by_arity,
            by_screen,
            homes,
            links,
        })
    }
}

/// 冻结后的只读路由注册表。
#[derive(Debug)]
pub struct RouteRegistry {
    patterns: Vec<Arc<RoutePattern>>,
    by_arity: BTreeMap<usize, Vec<usize>>,
    by_screen: BTreeMap<ScreenId, Vec<usize>>,
    homes: [usize; 4],
    links: Vec<ChainLink>,
}

impl RouteRegistry {
    pub fn builder() -> RouteRegistryBuilder {
        RouteRegistryBuilder::new()
    }

    /// 将字面路径解析为唯一的路由模式。
    ///
    /// # 教案式注释
    /// - **契约 (What)**：`role` 为调用方当前角色，`None` 表示未知；
    ///   返回的模式不一定可被该角色进入，可达性由 [`RoleScopeGuard`] 判定；
    /// - **执行 (How)**：按段数取候选，逐条匹配，以 [`precedence`] 排名取最小者；
    /// - **错误**：路径非法或无模板匹配时返回 [`RouteError::NotFound`]。
    pub fn resolve(
        &self,
        path: &str,
        role: Option<Role>,
    ) -> Result<&Arc<RoutePattern>, RouteError> {
        let not_found = || RouteError::NotFound {
            path: path.to_owned(),
        };
        let segments = split_path(path).ok_or_else(not_found)?;
        let candidates = self.by_arity.get(&segments.len()).ok_or_else(not_found)?;

        let mut best: Option<(usize, &Arc<RoutePattern>)> = None;
        for &index in candidates {
            let pattern = &self.patterns[index];
            if !pattern.matches(&segments) {
                continue;
            }
            let rank = precedence(pattern.role(), role);
            if best.is_none_or(|(current, _)| rank < current) {
                best = Some((rank, pattern));
            }
        }
        best.map(|(_, pattern)| pattern).ok_or_else(not_found)
    }

    /// 通往该屏幕的第一条已注册路由。
    pub fn pattern(&self, screen: &ScreenId) -> Option<&Arc<RoutePattern>> {
        self.patterns_for(screen).next()
    }

    /// 通往该屏幕的全部路由，按注册顺序。
    pub fn patterns_for<'a>(
        &'a self,
        screen: &ScreenId,
    ) -> impl Iterator<Item = &'a Arc<RoutePattern>> + use<'a> {
        self.by_screen
            .get(screen)
            .into_iter()
            .flatten()
            .map(|&index| &self.patterns[index])
    }

    /// 角色主页，构造时已保证存在。
    pub fn home(&self, role: Role) -> &Arc<RoutePattern> {
        &self.patterns[self.homes[role.index()]]
    }

    /// 两个屏幕之间声明的链路；屏幕有多条路由时取第一条路由上的绑定。
    pub fn link(&self, from: &ScreenId, to: &ScreenId) -> Option<&ChainLink> {
        self.links
            .iter()
            .find(|link| link.from() == from && link.to() == to)
    }

    /// 连接两条具体路由的链路。
    pub fn link_between(&self, from: &RoutePattern, to: &RoutePattern) -> Option<&ChainLink> {
        self.links
            .iter()
            .find(|link| same_route(link.source(), from) && same_route(link.target(), to))
    }

    /// 全部链路，按声明顺序。
    pub fn links(&self) -> impl Iterator<Item = &ChainLink> {
        self.links.iter()
    }

    /// 按注册顺序遍历全部模式。
    pub fn iter(&self) -> core::slice::Iter<'_, Arc<RoutePattern>> {
        self.patterns.iter()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// 绑定到本注册表的角色守卫。
    pub fn guard(&self) -> RoleScopeGuard<'_> {
        RoleScopeGuard::new(self)
    }
}

fn same_route(a: &RoutePattern, b: &RoutePattern) -> bool {
    a.role() == b.role() && a.template() == b.template()
}

/// 跨角色命中时的排名，越小越优先。
fn precedence(pattern_role: Role, caller: Option<Role>) -> usize {
    if caller == Some(pattern_role) {
        0
    } else if pattern_role == Role::Public {
        1
    } else {
        2 + pattern_role.index()
    }
}
