//! # 路由表配置
//!
//! ## 核心意图（Why）
//! - 路由表以 TOML 声明，装载即校验，失败以 [`ConfigError`] 报告；
//! - 声明格式与运行期类型解耦：反序列化只产出中间结构，随后逐条交给
//!   [`RouteRegistryBuilder`](crate::registry::RouteRegistryBuilder) 完成冲突检查。
//!
//! ## 文件格式（What）
//! ```toml
//! [[route]]
//! path = "/CustomerHome/:customerEmail"
//! screen = "CustomerHome"
//! role = "customer"
//! home = true
//!
//! [[route]]
//! path = "/customer/:customerEmail/reservation/:reservationId/make_request"
//! screen = "CustomerMakeRequest"
//! role = "customer"
//! params = { reservationId = "integer" }
//!
//! [[link]]
//! workflow = "repair-request"
//! from = "ReservationCustomer"
//! to = "CustomerMakeRequest"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use lodge_core::{ConfigError, ParamKind, Role, RoutePattern};
use serde::Deserialize;

use crate::contract::LinkSpec;
use crate::navigator::NavigatorConfig;
use crate::registry::RouteRegistry;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RouteTableFile {
    #[serde(default)]
    route: Vec<RouteEntry>,
    #[serde(default)]
    link: Vec<LinkEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RouteEntry {
    path: String,
    screen: String,
    role: Role,
    #[serde(default)]
    params: BTreeMap<String, ParamKind>,
    #[serde(default)]
    home: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LinkEntry {
    workflow: String,
    from: String,
    to: String,
    #[serde(default)]
    rename: BTreeMap<String, String>,
    #[serde(default)]
    consume: Vec<String>,
}

fn parse_error(err: toml::de::Error) -> ConfigError {
    ConfigError::Parse {
        detail: err.to_string(),
    }
}

/// 从 TOML 文本装载并冻结路由注册表。
pub fn load_route_table(source: &str) -> Result<RouteRegistry, ConfigError> {
    let file: RouteTableFile = toml::from_str(source).map_err(parse_error)?;

    let mut builder = RouteRegistry::builder();
    for entry in file.route {
        let mut pattern = RoutePattern::parse(&entry.path, entry.screen, entry.role)?;
        for (name, kind) in &entry.params {
            pattern = pattern.with_kind(name, *kind)?;
        }
        if entry.home {
            builder.register_home(pattern)?;
        } else {
            builder.register(pattern)?;
        }
    }

    for entry in file.link {
        let mut spec = LinkSpec::new(entry.workflow, entry.from, entry.to);
        for (from, to) in entry.rename {
            spec = spec.rename(from, to);
        }
        for name in entry.consume {
            spec = spec.consume(name);
        }
        builder.link(spec);
    }

    builder.build()
}

/// 读取文件并装载路由表。
pub fn read_route_table(path: &Path) -> Result<RouteRegistry, ConfigError> {
    let source = fs::read_to_string(path).map_err(|err| ConfigError::Parse {
        detail: format!("{}: {err}", path.display()),
    })?;
    load_route_table(&source)
}

impl NavigatorConfig {
    /// 从 TOML 文本解析导航器参数，缺省字段取默认值。
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        let config: NavigatorConfig = toml::from_str(source).map_err(parse_error)?;
        if config.history_limit == 0 {
            return Err(ConfigError::Parse {
                detail: String::from("history_limit must be at least 1"),
            });
        }
        if config.not_found_screen.is_empty() {
            return Err(ConfigError::Parse {
                detail: String::from("not_found_screen must not be empty"),
            });
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [[route]]
        path = "/Home/"
        screen = "Home"
        role = "public"
        home = true

        [[route]]
        path = "/CustomerHome/:customerEmail"
        screen = "CustomerHome"
        role = "customer"
        home = true

        [[route]]
        path = "/EmployeeHome/:employeeEmail"
        screen = "EmployeeHome"
        role = "employee"
        home = true

        [[route]]
        path = "/OwnerHome/:ownerEmail"
        screen = "OwnerHome"
        role = "owner"
        home = true
    "#;

    #[test]
    fn minimal_table_loads() {
        let registry = load_route_table(MINIMAL).expect("最小路由表可装载");
        assert_eq!(registry.len(), 4);
        assert_eq!(registry.home(Role::Owner).template(), "/OwnerHome/:ownerEmail");
    }

    #[test]
    fn duplicate_owner_repair_fails_to_load() {
        let table = format!(
            "{MINIMAL}\n{}",
            r#"
            [[route]]
            path = "/OwnerRepair/:param1"
            screen = "OwnerRepair"
            role = "owner"

            [[route]]
            path = "/OwnerRepair/:param1"
            screen = "OwnerRepairDuplicate"
            role = "owner"
            "#
        );
        assert!(matches!(
            load_route_table(&table),
            Err(ConfigError::AmbiguousRoute { role: Role::Owner, .. })
        ));
    }

    #[test]
    fn unknown_fields_and_kinds_are_parse_errors() {
        let typo = format!(
            "{MINIMAL}\n{}",
            r#"
            [[route]]
            path = "/Login"
            screen = "Login"
            role = "public"
            hidden = true
            "#
        );
        assert_eq!(
            load_route_table(&typo).map(|r| r.len()).map_err(|e| e.code()),
            Err("nav.config.parse")
        );

        let kind = format!(
            "{MINIMAL}\n{}",
            r#"
            [[route]]
            path = "/Room/:roomNumber"
            screen = "Room"
            role = "public"
            params = { roomNumber = "float" }
            "#
        );
        assert!(matches!(load_route_table(&kind), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn navigator_config_defaults_and_bounds() {
        assert_eq!(NavigatorConfig::from_toml(""), Ok(NavigatorConfig::default()));

        let config = NavigatorConfig::from_toml("history_limit = 8").expect("合法配置");
        assert_eq!(config.history_limit, 8);
        assert_eq!(config.not_found_screen, "NotFound");

        assert!(NavigatorConfig::from_toml("history_limit = 0").is_err());
        assert!(NavigatorConfig::from_toml("history = 3").is_err());
    }
}
