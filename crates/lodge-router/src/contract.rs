//! # 路径参数契约与链路传播
//!
//! ## 核心意图（Why）
//! - [`extract`] 把命中路径的各段按模板声明校验成类型化参数，任何一个参数失败都以
//!   [`RouteError::InvalidParameter`] 报告名称与位置；
//! - [`ChainLink`] 描述多步工作流中相邻两屏的参数交接：上一屏的参数（可改名、可丢弃）
//!   必须原样出现在下一屏模板的前缀位置。
//!
//! ## 行为契约（What）
//! - 链路在注册表冻结时绑定，声明与模板不符即为 [`ConfigError::InvalidLink`]；
//! - 运行期 [`ChainLink::verify`] 只比较携带的值，新引入的参数只经过类型校验。

use std::borrow::Cow;
use std::sync::Arc;

use lodge_core::{
    ConfigError, ParamFault, ParamMap, ParamSpec, RouteError, RoutePattern, RouteSegment,
    ScreenId, split_path,
};

/// 按模板声明提取并校验路径参数。
///
/// - `path` 不匹配 `pattern` 时返回 [`RouteError::NotFound`]；
/// - 返回的参数表顺序与 [`RoutePattern::params`] 一致。
pub fn extract(pattern: &RoutePattern, path: &str) -> Result<ParamMap, RouteError> {
    let segments = split_path(path)
        .filter(|segments| pattern.matches(segments))
        .ok_or_else(|| RouteError::NotFound {
            path: path.to_owned(),
        })?;

    let mut specs = pattern.params().iter().enumerate();
    let mut params = ParamMap::new();
    for (segment, raw) in pattern.segments().zip(&segments) {
        if !matches!(segment, RouteSegment::Placeholder(_)) {
            continue;
        }
        let Some((index, spec)) = specs.next() else {
            break;
        };
        let value = spec
            .kind()
            .parse(raw)
            .map_err(|fault| RouteError::InvalidParameter {
                name: spec.name().to_owned(),
                index,
                fault,
            })?;
        params.insert(spec.name().to_owned(), value);
    }
    Ok(params)
}

/// 工作流链路的声明形式，由配置或调用方构造。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkSpec {
    workflow: String,
    from: ScreenId,
    to: ScreenId,
    rename: Vec<(String, String)>,
    consume: Vec<String>,
}

impl LinkSpec {
    /// 声明 `from` 屏到 `to` 屏的链路，默认携带 `from` 的全部参数且不改名。
    pub fn new<F, T>(workflow: impl Into<String>, from: F, to: T) -> Self
    where
        F: Into<Cow<'static, str>>,
        T: Into<Cow<'static, str>>,
    {
        Self {
            workflow: workflow.into(),
            from: ScreenId::new(from),
            to: ScreenId::new(to),
            rename: Vec::new(),
            consume: Vec::new(),
        }
    }

    /// 携带时把参数 `from` 改名为 `to`。
    pub fn rename(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.rename.push((from.into(), to.into()));
        self
    }

    /// 在本跳丢弃参数 `name`。
    pub fn consume(mut self, name: impl Into<String>) -> Self {
        self.consume.push(name.into());
        self
    }

    pub fn workflow(&self) -> &str {
        &self.workflow
    }

    pub fn from(&self) -> &ScreenId {
        &self.from
    }

    pub fn to(&self) -> &ScreenId {
        &self.to
    }
}

/// 一项携带关系：来源参数名与目标参数名。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Carry {
    source: String,
    target: String,
}

impl Carry {
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn target(&self) -> &str {
        &self.target
    }
}

/// 已绑定到两端路由的链路。一条 [`LinkSpec`] 对两端屏幕的每一对路由各绑定一次。
///
/// # 教案式说明
/// - **意图 (Why)**：旧前端在每个屏幕里手工拼接下一跳 URL，邮箱在第二步被改写后仍能进入第五步；
///   这里把“哪些值必须原样向下传”固化为数据；
/// - **契约 (What)**：`carried()[i]` 对应目标模板第 `i` 个参数，两侧参数形态一致；
///   目标模板其余参数为本跳新引入的参数；
/// - **风险 (Trade-offs)**：只约束相邻两跳，工作流的完整性通过逐跳传递得到。
#[derive(Clone, Debug)]
pub struct ChainLink {
    workflow: String,
    source: Arc<RoutePattern>,
    target: Arc<RoutePattern>,
    carried: Vec<Carry>,
}

impl ChainLink {
    pub(crate) fn bind(
        spec: &LinkSpec,
        source: &Arc<RoutePattern>,
        target: &Arc<RoutePattern>,
    ) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidLink {
            from: spec.from.clone(),
            to: spec.to.clone(),
            reason,
        };

        for name in &spec.consume {
            if source.param_index(name).is_none() {
                return Err(invalid(format!(
                    "consumed parameter `{name}` is not declared by `{}`",
                    source.template()
                )));
            }
        }
        for (name, _) in &spec.rename {
            if source.param_index(name).is_none() || spec.consume.contains(name) {
                return Err(invalid(format!(
                    "renamed parameter `{name}` is not carried from `{}`",
                    source.template()
                )));
            }
        }

        let carried_specs: Vec<&ParamSpec> = source
            .params()
            .iter()
            .filter(|param| !spec.consume.iter().any(|name| name == param.name()))
            .collect();
        if carried_specs.len() > target.params().len() {
            return Err(invalid(format!(
                "{} carried parameters do not fit the {} declared by `{}`",
                carried_specs.len(),
                target.params().len(),
                target.template()
            )));
        }

        let mut carried = Vec::with_capacity(carried_specs.len());
        for (index, (from, to)) in carried_specs.into_iter().zip(target.params()).enumerate() {
            let renamed = spec
                .rename
                .iter()
                .find(|(name, _)| name == from.name())
                .map_or(from.name(), |(_, renamed)| renamed.as_str());
            if renamed != to.name() {
                return Err(invalid(format!(
                    "position {index} of `{}` is `{}`, expected carried `{renamed}`",
                    target.template(),
                    to.name()
                )));
            }
            if from.kind() != to.kind() {
                return Err(invalid(format!(
                    "carried parameter `{renamed}` changes kind"
                )));
            }
            carried.push(Carry {
                source: from.name().to_owned(),
                target: renamed.to_owned(),
            });
        }

        Ok(Self {
            workflow: spec.workflow.clone(),
            source: Arc::clone(source),
            target: Arc::clone(target),
            carried,
        })
    }

    pub fn workflow(&self) -> &str {
        &self.workflow
    }

    pub fn from(&self) -> &ScreenId {
        self.source.target()
    }

    pub fn to(&self) -> &ScreenId {
        self.target.target()
    }

    /// 上一屏的路由模式。
    pub fn source(&self) -> &Arc<RoutePattern> {
        &self.source
    }

    /// 下一屏的路由模式。
    pub fn target(&self) -> &Arc<RoutePattern> {
        &self.target
    }

    pub fn carried(&self) -> &[Carry] {
        &self.carried
    }

    /// 本跳新引入的参数声明。
    pub fn introduced(&self) -> &[ParamSpec] {
        &self.target.params()[self.carried.len()..]
    }

    /// 校验下一屏参数是否原样携带了上一屏的值。
    ///
    /// - `previous` 为当前上下文中的链路参数，`next` 为下一屏刚提取的参数；
    /// - 不一致时以目标参数名与下标报告 [`ParamFault::ChainMismatch`]。
    pub fn verify(&self, previous: &ParamMap, next: &ParamMap) -> Result<(), RouteError> {
        for (index, carry) in self.carried.iter().enumerate() {
            let missing = |name: &str| RouteError::InvalidParameter {
                name: name.to_owned(),
                index,
                fault: ParamFault::Missing,
            };
            let expected = previous
                .get(&carry.source)
                .ok_or_else(|| missing(&carry.source))?;
            let actual = next
                .get(&carry.target)
                .ok_or_else(|| missing(&carry.target))?;
            if expected != actual {
                return Err(RouteError::InvalidParameter {
                    name: carry.target.clone(),
                    index,
                    fault: ParamFault::ChainMismatch {
                        expected: expected.to_string(),
                        actual: actual.to_string(),
                    },
                });
            }
        }
        Ok(())
    }

    /// 由当前链路参数与本跳新引入的值拼出下一屏路径。
    ///
    /// `introduced` 以 `(参数名, 原始值)` 给出，
    /// 只查找 [`Self::introduced`] 声明的名称。
    pub fn next_path(
        &self,
        current: &ParamMap,
        introduced: &[(&str, &str)],
    ) -> Result<String, RouteError> {
        let mut values = Vec::with_capacity(self.target.params().len());
        for (index, carry) in self.carried.iter().enumerate() {
            let value = current
                .get(&carry.source)
                .ok_or_else(|| RouteError::InvalidParameter {
                    name: carry.source.clone(),
                    index,
                    fault: ParamFault::Missing,
                })?;
            values.push(value.to_string());
        }
        for (offset, spec) in self.introduced().iter().enumerate() {
            let raw = introduced
                .iter()
                .find(|(name, _)| *name == spec.name())
                .map(|(_, raw)| *raw)
                .ok_or_else(|| RouteError::InvalidParameter {
                    name: spec.name().to_owned(),
                    index: self.carried.len() + offset,
                    fault: ParamFault::Missing,
                })?;
            values.push(raw.to_owned());
        }
        self.target.instantiate(&values)
    }
}
