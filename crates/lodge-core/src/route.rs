use std::borrow::Cow;
use std::fmt;

use crate::error::{ConfigError, RouteError};
use crate::param::{ParamFault, ParamKind, ParamSpec};
use crate::role::Role;

/// 渲染层的屏幕标识，对核心而言是不透明字符串。
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScreenId(Cow<'static, str>);

impl ScreenId {
    pub fn new<S>(id: S) -> Self
    where
        S: Into<Cow<'static, str>>,
    {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_ref()
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 路由模板的组成单元。
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[non_exhaustive]
pub enum RouteSegment {
    /// 字面量段，要求目标逐字节一致（区分大小写）。
    Literal(Cow<'static, str>),
    /// 位置占位符，匹配任意非空单段，携带参数名。
    Placeholder(Cow<'static, str>),
}

/// 将路径切分为段序列。
///
/// # 教案式说明
/// - **意图 (Why)**：旧路由表混用 `/Home/` 与 `/Home`，切分时统一去掉一个前导 `/` 与末尾的 `/`，
///   让两种写法落在同一骨架上；
/// - **契约 (What)**：
///   - 路径必须是 ASCII 且以 `/` 开头，否则返回 `None`；
///   - `/` 切分为零段；
///   - 中间的空段（`//`）原样保留为 `""`，任何字面量或占位符都不会匹配它。
pub fn split_path(path: &str) -> Option<Vec<&str>> {
    if !path.is_ascii() {
        return None;
    }
    let rest = path.strip_prefix('/')?;
    let rest = rest.strip_suffix('/').unwrap_or(rest);
    if rest.is_empty() {
        return Some(Vec::new());
    }
    Some(rest.split('/').collect())
}

/// 一条可导航路径模板的不可变描述。
///
/// # 教案式说明
/// - **意图 (Why)**：把模板段、目标屏幕、所属角色与参数声明聚合在一起，注册后不再变化；
/// - **契约 (What)**：
///   - `params` 与模板中的占位符一一对应且顺序一致；
///   - `template` 为规范化后的文本（无末尾 `/`），用于日志与错误信息；
/// - **执行逻辑 (How)**：通过 [`RoutePattern::parse`] 解析模板，再以
///   [`RoutePattern::with_kind`] 逐个声明整数参数，默认形态为 [`ParamKind::Text`]。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoutePattern {
    template: String,
    segments: Vec<RouteSegment>,
    target: ScreenId,
    role: Role,
    params: Vec<ParamSpec>,
}

impl RoutePattern {
    /// 解析 `/literal/:name/...` 形式的模板。
    ///
    /// - 占位符名只允许 ASCII 字母、数字与 `_`，且同一模板内不可重复；
    /// - 字面量段不可为空，也不可包含 `:`。
    pub fn parse<S>(template: &str, target: S, role: Role) -> Result<Self, ConfigError>
    where
        S: Into<Cow<'static, str>>,
    {
        let malformed = |reason: &'static str| ConfigError::MalformedTemplate {
            template: template.to_owned(),
            reason,
        };

        let raw_segments =
            split_path(template).ok_or_else(|| malformed("must be ASCII and start with `/`"))?;

        let mut segments = Vec::with_capacity(raw_segments.len());
        let mut params: Vec<ParamSpec> = Vec::new();
        for raw in raw_segments {
            if let Some(name) = raw.strip_prefix(':') {
                let well_formed = !name.is_empty()
                    && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
                if !well_formed {
                    return Err(malformed("placeholder names are ASCII letters, digits or `_`"));
                }
                if params.iter().any(|spec| spec.name() == name) {
                    return Err(ConfigError::DuplicateParameter {
                        template: template.to_owned(),
                        name: name.to_owned(),
                    });
                }
                params.push(ParamSpec::new(name.to_owned(), ParamKind::Text));
                segments.push(RouteSegment::Placeholder(Cow::Owned(name.to_owned())));
            } else {
                if raw.is_empty() {
                    return Err(malformed("empty interior segment"));
                }
                if raw.contains(':') {
                    return Err(malformed("`:` is only allowed at the start of a placeholder"));
                }
                segments.push(RouteSegment::Literal(Cow::Owned(raw.to_owned())));
            }
        }

        Ok(Self {
            template: render_template(&segments),
            segments,
            target: ScreenId::new(target),
            role,
            params,
        })
    }

    /// 为已有占位符声明形态。
    pub fn with_kind(mut self, name: &str, kind: ParamKind) -> Result<Self, ConfigError> {
        match self.params.iter_mut().find(|spec| spec.name() == name) {
            Some(spec) => {
                spec.set_kind(kind);
                Ok(self)
            }
            None => Err(ConfigError::UnknownParameter {
                template: self.template.clone(),
                name: name.to_owned(),
            }),
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn segments(&self) -> core::slice::Iter<'_, RouteSegment> {
        self.segments.iter()
    }

    /// 段数。
    pub fn arity(&self) -> usize {
        self.segments.len()
    }

    pub fn target(&self) -> &ScreenId {
        &self.target
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// 按模板顺序排列的参数声明。
    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    /// 参数名在声明序列中的下标。
    pub fn param_index(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|spec| spec.name() == name)
    }

    /// 判断已切分的路径是否匹配本模板。
    pub fn matches(&self, segments: &[&str]) -> bool {
        segments.len() == self.segments.len()
            && self
                .segments
                .iter()
                .zip(segments)
                .all(|(expected, actual)| match expected {
                    RouteSegment::Literal(literal) => literal.as_ref() == *actual,
                    RouteSegment::Placeholder(_) => !actual.is_empty(),
                })
    }

    /// 判断两个模板是否存在同时匹配的路径。
    ///
    /// # 教案式说明
    /// - **意图 (Why)**：同一角色范围内的歧义必须在注册期暴露，而不是依赖表顺序“后者胜出”；
    /// - **契约 (What)**：段数相同且每个位置上至少一侧为占位符或两侧字面量相同即视为重叠；
    ///   “骨架相同”是其特例；
    /// - **风险 (Trade-offs)**：`/owner/:id/shifts/new` 与 `/owner/:id/shifts/:shiftId` 也会被判定为重叠，
    ///   此类表需要改用不同的字面量。
    pub fn overlaps(&self, other: &RoutePattern) -> bool {
        self.segments.len() == other.segments.len()
            && self
                .segments
                .iter()
                .zip(&other.segments)
                .all(|pair| match pair {
                    (RouteSegment::Literal(a), RouteSegment::Literal(b)) => a == b,
                    _ => true,
                })
    }

    /// 以声明顺序的原始值实例化模板。
    ///
    /// - `values` 按 [`Self::params`] 顺序给出，缺失的尾部参数以 [`ParamFault::Missing`] 报告，多余的值被忽略；
    /// - 每个值须为非空 ASCII 且不含 `/`，否则以 [`ParamFault::Malformed`] 报告；
    /// - 此处不做类型校验，类型由解析侧的参数契约负责。
    pub fn instantiate<S>(&self, values: &[S]) -> Result<String, RouteError>
    where
        S: AsRef<str>,
    {
        let mut path = String::new();
        let mut index = 0;
        for segment in &self.segments {
            path.push('/');
            match segment {
                RouteSegment::Literal(literal) => path.push_str(literal),
                RouteSegment::Placeholder(name) => {
                    let value: &str = values.get(index).map(|value| value.as_ref()).ok_or_else(|| {
                        RouteError::InvalidParameter {
                            name: name.to_string(),
                            index,
                            fault: ParamFault::Missing,
                        }
                    })?;
                    if value.is_empty() {
                        return Err(RouteError::InvalidParameter {
                            name: name.to_string(),
                            index,
                            fault: ParamFault::Empty,
                        });
                    }
                    if !value.is_ascii() || value.contains('/') {
                        return Err(RouteError::InvalidParameter {
                            name: name.to_string(),
                            index,
                            fault: ParamFault::Malformed {
                                raw: value.to_owned(),
                            },
                        });
                    }
                    path.push_str(value);
                    index += 1;
                }
            }
        }
        if path.is_empty() {
            path.push('/');
        }
        Ok(path)
    }
}

fn render_template(segments: &[RouteSegment]) -> String {
    if segments.is_empty() {
        return String::from("/");
    }
    let mut out = String::new();
    for segment in segments {
        out.push('/');
        match segment {
            RouteSegment::Literal(literal) => out.push_str(literal),
            RouteSegment::Placeholder(name) => {
                out.push(':');
                out.push_str(name);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(template: &str, role: Role) -> RoutePattern {
        RoutePattern::parse(template, "Screen", role).expect("模板应可解析")
    }

    #[test]
    fn split_path_normalises_outer_slashes() {
        assert_eq!(split_path("/Home/"), Some(vec!["Home"]));
        assert_eq!(split_path("/Home"), Some(vec!["Home"]));
        assert_eq!(split_path("/"), Some(vec![]));
        assert_eq!(split_path("/a//b"), Some(vec!["a", "", "b"]));
        assert_eq!(split_path("Home"), None);
        assert_eq!(split_path("/Hôme"), None);
    }

    #[test]
    fn parse_collects_named_params_in_template_order() {
        let route = pattern(
            "/customer/:customerEmail/reservation/:reservationId/make_request/",
            Role::Customer,
        )
        .with_kind("reservationId", ParamKind::Integer)
        .expect("参数已声明");

        assert_eq!(
            route.template(),
            "/customer/:customerEmail/reservation/:reservationId/make_request"
        );
        let names: Vec<_> = route.params().iter().map(ParamSpec::name).collect();
        assert_eq!(names, ["customerEmail", "reservationId"]);
        assert_eq!(route.params()[1].kind(), ParamKind::Integer);
        assert_eq!(route.arity(), 5);
    }

    #[test]
    fn parse_rejects_malformed_templates() {
        assert!(matches!(
            RoutePattern::parse("/OwnerRepair/:a/:a", "OwnerRepair", Role::Owner),
            Err(ConfigError::DuplicateParameter { .. })
        ));
        assert!(matches!(
            RoutePattern::parse("/a//b", "A", Role::Public),
            Err(ConfigError::MalformedTemplate { .. })
        ));
        assert!(matches!(
            RoutePattern::parse("/a/:", "A", Role::Public),
            Err(ConfigError::MalformedTemplate { .. })
        ));
        assert!(matches!(
            pattern("/a/:b", Role::Public).with_kind("c", ParamKind::Integer),
            Err(ConfigError::UnknownParameter { .. })
        ));
    }

    #[test]
    fn placeholders_never_match_empty_segments() {
        let route = pattern("/OwnerHome/:ownerEmail", Role::Owner);
        assert!(route.matches(&["OwnerHome", "o@lodge.example"]));
        assert!(!route.matches(&["OwnerHome", ""]));
        assert!(!route.matches(&["ownerhome", "o@lodge.example"]));
        assert!(!route.matches(&["OwnerHome"]));
    }

    #[test]
    fn overlap_covers_identical_skeletons_and_literal_shadowing() {
        let first = pattern("/OwnerRepair/:param1", Role::Owner);
        let second = pattern("/OwnerRepair/:ownerEmail", Role::Owner);
        assert!(first.overlaps(&second));

        let literal = pattern("/owner/:ownerEmail/shifts/new", Role::Owner);
        let param = pattern("/owner/:ownerEmail/shifts/:shiftId", Role::Owner);
        assert!(literal.overlaps(&param));

        let other = pattern("/owner/:ownerEmail/manage_rooms", Role::Owner);
        assert!(!other.overlaps(&first));
        assert!(!literal.overlaps(&pattern("/owner/:ownerEmail/shift/:shiftId", Role::Owner)));
    }

    #[test]
    fn instantiate_rejects_values_that_would_split_segments() {
        let route = pattern("/BookedConfirmationCustomer/:customerEmail", Role::Public);
        assert_eq!(
            route.instantiate(&["ada@lodge.example"]).as_deref(),
            Ok("/BookedConfirmationCustomer/ada@lodge.example")
        );
        assert!(matches!(
            route.instantiate(&["a/b"]),
            Err(RouteError::InvalidParameter {
                fault: ParamFault::Malformed { .. },
                ..
            })
        ));
        assert!(matches!(
            route.instantiate::<&str>(&[]),
            Err(RouteError::InvalidParameter {
                fault: ParamFault::Missing,
                ..
            })
        ));
        assert_eq!(pattern("/", Role::Public).instantiate::<&str>(&[]).as_deref(), Ok("/"));
    }

    mod properties {
        use super::*;
        use proptest::collection::vec;
        use proptest::prelude::*;

        fn segment() -> impl Strategy<Value = String> {
            prop_oneof![
                "[A-Za-z_]{1,8}",
                "[a-z]{1,6}".prop_map(|name| format!(":{name}")),
            ]
        }

        proptest! {
            #[test]
            fn instantiated_paths_match_their_template(
                segments in vec(segment(), 0..6),
                values in vec("[A-Za-z0-9@._-]{1,12}", 6),
            ) {
                let template = format!("/{}", segments.join("/"));
                // 重名占位符由 parse 拒绝，跳过该类输入。
                let Ok(route) = RoutePattern::parse(&template, "Screen", Role::Public) else {
                    return Ok(());
                };
                let path = route.instantiate(&values).expect("值均为合法单段");
                let split = split_path(&path).expect("实例化路径以 / 开头");
                prop_assert!(route.matches(&split));
            }

            #[test]
            fn overlap_is_symmetric(
                left in vec(segment(), 1..4),
                right in vec(segment(), 1..4),
            ) {
                let parse = |segments: &[String]| {
                    RoutePattern::parse(&format!("/{}", segments.join("/")), "Screen", Role::Owner)
                };
                if let (Ok(a), Ok(b)) = (parse(&left), parse(&right)) {
                    prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
                }
            }
        }
    }
}
