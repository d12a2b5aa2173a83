use core::fmt;
use core::str::FromStr;

use serde::Deserialize;

/// 参与导航的角色。
///
/// # 教案式说明
/// - **意图 (Why)**：路由的可达性只由角色决定，`Public` 表示任何人（包括未登录访客）均可进入；
/// - **契约 (What)**：排序固定为 `Public < Customer < Employee < Owner`，注册表在跨角色平局时依赖该顺序
///   获得确定性结果；
/// - **风险 (Trade-offs)**：新增角色需同步更新 [`Role::ALL`] 与注册表的主页校验。
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// 未登录访客或公共页面。
    Public,
    /// 已登录的顾客。
    Customer,
    /// 酒店员工。
    Employee,
    /// 酒店业主。
    Owner,
}

impl Role {
    /// 全部角色，按排序顺序排列。
    pub const ALL: [Role; 4] = [Role::Public, Role::Customer, Role::Employee, Role::Owner];

    /// 文本形式，与路由表配置中的取值一致。
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Public => "public",
            Role::Customer => "customer",
            Role::Employee => "employee",
            Role::Owner => "owner",
        }
    }

    /// 在 [`Role::ALL`] 中的下标。
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 无法识别的角色文本。
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown role `{0}`")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == raw)
            .ok_or_else(|| UnknownRole(raw.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_form_round_trips_through_from_str() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
        }
        assert!("Owner".parse::<Role>().is_err(), "角色文本区分大小写");
    }

    #[test]
    fn index_follows_declaration_order() {
        assert_eq!(Role::Public.index(), 0);
        assert_eq!(Role::Owner.index(), 3);
        assert!(Role::Public < Role::Customer);
    }
}
