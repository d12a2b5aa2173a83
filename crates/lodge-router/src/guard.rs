//! 角色范围守卫：决定会话能否进入某条路由，以及被拒绝时回到哪里。

use std::sync::Arc;

use lodge_core::{NavigationContext, Role, RouteError, RoutePattern};

use crate::registry::RouteRegistry;

/// 绑定到某个注册表的只读守卫。
///
/// # 教案式说明
/// - **意图 (Why)**：旧前端完全没有守卫，访客可以直接打开 `/OwnerHome/...`；
/// - **契约 (What)**：
///   - `public` 路由对任何角色开放，其余路由只对同名角色开放；
///   - 被拒绝的导航按当前角色的主页重定向，主页路径由会话身份实例化；
///   - 非公共角色缺少身份时退回 `public` 主页。
#[derive(Clone, Copy, Debug)]
pub struct RoleScopeGuard<'r> {
    registry: &'r RouteRegistry,
}

impl<'r> RoleScopeGuard<'r> {
    pub(crate) fn new(registry: &'r RouteRegistry) -> Self {
        Self { registry }
    }

    pub fn can_enter(&self, pattern: &RoutePattern, context: &NavigationContext) -> bool {
        pattern.role() == Role::Public || pattern.role() == context.role()
    }

    /// 与 [`Self::can_enter`] 相同，但以 [`RouteError::Forbidden`] 报告拒绝。
    pub fn check(
        &self,
        pattern: &RoutePattern,
        context: &NavigationContext,
    ) -> Result<(), RouteError> {
        if self.can_enter(pattern, context) {
            Ok(())
        } else {
            Err(RouteError::Forbidden {
                role: context.role(),
                template: pattern.template().to_owned(),
            })
        }
    }

    pub fn home_route(&self, role: Role) -> &'r Arc<RoutePattern> {
        self.registry.home(role)
    }

    /// 当前会话的主页及其字面路径。
    pub fn home_path(
        &self,
        context: &NavigationContext,
    ) -> Result<(&'r Arc<RoutePattern>, String), RouteError> {
        let home = self.home_route(context.role());
        if home.params().is_empty() {
            return Ok((home, home.instantiate::<&str>(&[])?));
        }
        match context.identity() {
            Some(identity) => Ok((home, home.instantiate(&[identity])?)),
            None => {
                let public = self.home_route(Role::Public);
                Ok((public, public.instantiate::<&str>(&[])?))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lodge_core::Session;

    fn customer(identity: &str) -> NavigationContext {
        NavigationContext::new(Session::signed_in(Role::Customer, identity))
    }

    fn registry() -> RouteRegistry {
        let route = |template: &str, screen: &'static str, role| {
            RoutePattern::parse(template, screen, role).expect("模板应可解析")
        };
        let homes = [
            ("/Home/", "Home", Role::Public),
            ("/CustomerHome/:customerEmail", "CustomerHome", Role::Customer),
            ("/EmployeeHome/:employeeEmail", "EmployeeHome", Role::Employee),
            ("/OwnerHome/:ownerEmail", "OwnerHome", Role::Owner),
        ];
        let mut builder = RouteRegistry::builder();
        for (template, screen, role) in homes {
            builder
                .register_home(route(template, screen, role))
                .expect("主页注册不应冲突");
        }
        builder
            .register(route("/OwnerRepair/:ownerEmail", "OwnerRepair", Role::Owner))
            .expect("注册不应冲突");
        builder.build().expect("注册表应可冻结")
    }

    #[test]
    fn only_the_owning_role_enters_scoped_routes() {
        let registry = registry();
        let guard = registry.guard();
        let owner_repair = registry.resolve("/OwnerRepair/o@lodge.example", None).expect("存在");
        let home = registry.home(Role::Public);

        for role in Role::ALL {
            let context = NavigationContext::new(Session::signed_in(role, "someone@lodge.example"));
            assert_eq!(guard.can_enter(owner_repair, &context), role == Role::Owner);
            assert!(guard.can_enter(home, &context));
        }

        let customer = customer("c@lodge.example");
        assert_eq!(
            guard.check(owner_repair, &customer).map_err(|err| err.code()),
            Err("nav.guard.forbidden")
        );
    }

    #[test]
    fn home_path_is_built_from_the_session_identity() {
        let registry = registry();
        let guard = registry.guard();

        let (home, path) = guard.home_path(&customer("c@lodge.example")).expect("主页可实例化");
        assert_eq!(home.target().as_str(), "CustomerHome");
        assert_eq!(path, "/CustomerHome/c@lodge.example");

        let visitor = NavigationContext::default();
        let (home, path) = guard.home_path(&visitor).expect("公共主页");
        assert_eq!(home.target().as_str(), "Home");
        assert_eq!(path, "/Home");
    }

    #[test]
    fn an_empty_identity_falls_back_to_the_public_home() {
        let registry = registry();
        let (home, path) = registry
            .guard()
            .home_path(&customer(""))
            .expect("退回公共主页");
        assert_eq!(home.target().as_str(), "Home");
        assert_eq!(path, "/Home");
    }
}
