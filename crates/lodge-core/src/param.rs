use std::borrow::Cow;
use std::fmt;

use serde::Deserialize;

/// 位置参数的期望形态。
///
/// # 教案式说明
/// - **意图 (Why)**：以命名 + 类型声明取代 `:param1`、`:param2` 这类纯位置占位符，
///   让屏幕拿到的参数顺序与类型都可在装载期确定；
/// - **契约 (What)**：`Text` 只要求非空；`Integer` 要求整个段可解析为 `i64`
///   （预订号、房间号、班次号、申请号均属此类）。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    /// 非空文本，例如账户邮箱、日期、房型。
    #[default]
    Text,
    /// 十进制整数标识。
    Integer,
}

impl ParamKind {
    /// 按声明的形态校验原始段。
    pub fn parse(self, raw: &str) -> Result<ParamValue, ParamFault> {
        if raw.is_empty() {
            return Err(ParamFault::Empty);
        }
        match self {
            ParamKind::Text => Ok(ParamValue::Text(raw.to_owned())),
            ParamKind::Integer => raw
                .parse::<i64>()
                .map(ParamValue::Integer)
                .map_err(|_| ParamFault::NotInteger {
                    raw: raw.to_owned(),
                }),
        }
    }
}

/// 参数校验失败的具体原因。
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ParamFault {
    /// 段为空。
    #[error("value is empty")]
    Empty,
    /// 期望整数但无法解析。
    #[error("`{raw}` is not an integer")]
    NotInteger { raw: String },
    /// 值含有 `/` 或非 ASCII 字符，无法放入单个路径段。
    #[error("`{raw}` cannot be placed in a single path segment")]
    Malformed { raw: String },
    /// 构造下一跳路径时缺少该参数。
    #[error("value was not supplied")]
    Missing,
    /// 工作流链路要求原样携带的值被改写。
    #[error("expected carried value `{expected}`, got `{actual}`")]
    ChainMismatch { expected: String, actual: String },
}

/// 路由模式声明的单个参数。
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParamSpec {
    name: Cow<'static, str>,
    kind: ParamKind,
}

impl ParamSpec {
    /// 构造参数声明。
    pub fn new<N>(name: N, kind: ParamKind) -> Self
    where
        N: Into<Cow<'static, str>>,
    {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// 参数名。
    pub fn name(&self) -> &str {
        self.name.as_ref()
    }

    /// 参数形态。
    pub fn kind(&self) -> ParamKind {
        self.kind
    }

    pub(crate) fn set_kind(&mut self, kind: ParamKind) {
        self.kind = kind;
    }
}

/// 校验通过的参数值。
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ParamValue {
    Text(String),
    Integer(i64),
}

impl ParamValue {
    /// 文本视图；整数返回 `None`。
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParamValue::Text(text) => Some(text),
            ParamValue::Integer(_) => None,
        }
    }

    /// 整数视图；文本返回 `None`。
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            ParamValue::Integer(value) => Some(*value),
            ParamValue::Text(_) => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Text(text) => f.write_str(text),
            ParamValue::Integer(value) => write!(f, "{value}"),
        }
    }
}

/// 保持声明顺序的参数表。
///
/// # 教案式说明
/// - **意图 (Why)**：工作流链路要求“前缀携带”，因此参数表必须记住模板中的先后顺序，
///   `BTreeMap` 的字典序会破坏这一点；
/// - **契约 (What)**：同名键重复插入时原位覆盖，不改变顺序；
/// - **风险 (Trade-offs)**：查找为线性扫描，单条路由的参数通常不超过五个，可以接受。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParamMap(Vec<(Cow<'static, str>, ParamValue)>);

impl ParamMap {
    /// 创建空表。
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// 插入或原位覆盖。
    pub fn insert<N>(&mut self, name: N, value: ParamValue)
    where
        N: Into<Cow<'static, str>>,
    {
        let name = name.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.0.push((name, value)),
        }
    }

    /// 按名称读取。
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0
            .iter()
            .find(|(existing, _)| existing.as_ref() == name)
            .map(|(_, value)| value)
    }

    /// 按声明顺序遍历。
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(name, value)| (name.as_ref(), value))
    }

    /// 参数名序列。
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(name, _)| name.as_ref())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
