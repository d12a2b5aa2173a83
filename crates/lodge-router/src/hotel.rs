//! 随 crate 发布的酒店路由表。
//!
//! 表文本位于 `routes/hotel.toml`，编译期嵌入；屏幕与工作流名称以常量导出，供渲染层引用。

use lodge_core::ConfigError;

use crate::config::load_route_table;
use crate::registry::RouteRegistry;

/// 规范路由表的 TOML 文本。
pub const HOTEL_ROUTES: &str = include_str!("../routes/hotel.toml");

/// 装载规范路由表。
///
/// 表随源码一同受测试覆盖，正常情况下不会失败；返回 `Result` 以便调用方在启动期统一处置。
pub fn registry() -> Result<RouteRegistry, ConfigError> {
    load_route_table(HOTEL_ROUTES)
}

/// 屏幕标识。
pub mod screens {
    pub const HOME: &str = "Home";
    pub const SIGN_UP: &str = "SignUp";
    pub const LOGIN: &str = "Login";

    pub const RESERVATION_GUEST: &str = "ReservationGuest";
    pub const SUGGEST_ROOMS: &str = "SuggestRooms";
    pub const CREATE_CUSTOMER_PAGE: &str = "CreateCustomerPage";
    pub const CONFIRM_RESERVATION: &str = "ConfirmReservation";
    pub const BOOKED_CONFIRMATION_CUSTOMER: &str = "BookedConfirmationCustomer";

    pub const CUSTOMER_HOME: &str = "CustomerHome";
    pub const CUSTOMER_ACCOUNT: &str = "CustomerAccount";
    pub const RESERVATION_CUSTOMER: &str = "ReservationCustomer";
    pub const CUSTOMER_MAKE_REQUEST: &str = "CustomerMakeRequest";
    pub const CUSTOMER_REQUEST_CONFIRMATION: &str = "CustomerRequestConfirmation";

    pub const EMPLOYEE_HOME: &str = "EmployeeHome";
    pub const EMPLOYEE_ACCOUNT: &str = "EmployeeAccount";
    pub const EMPLOYEE_REPAIR: &str = "EmployeeRepair";
    pub const EMPLOYEE_RESERVATION: &str = "EmployeeReservation";
    pub const EMPLOYEE_VIEW_SCHEDULE: &str = "EmployeeViewSchedule";

    pub const OWNER_HOME: &str = "OwnerHome";
    pub const OWNER_ACCOUNT: &str = "OwnerAccount";
    pub const OWNER_MANAGE_EMPLOYEES: &str = "OwnerManageEmployees";
    pub const OWNER_REPAIR: &str = "OwnerRepair";
    pub const OWNER_ADD_SHIFT: &str = "OwnerAddShift";
    pub const OWNER_EDIT_SHIFT: &str = "OwnerEditShift";
    pub const OWNER_MANAGE_ROOMS: &str = "OwnerManageRooms";
    pub const OWNER_VIEW_SCHEDULE: &str = "OwnerViewSchedule";
}

/// 工作流名称。
pub mod workflows {
    pub const GUEST_RESERVATION: &str = "guest-reservation";
    pub const REPAIR_REQUEST: &str = "repair-request";
}

#[cfg(test)]
mod tests {
    use super::*;
    use lodge_core::{Role, ScreenId};

    #[test]
    fn every_screen_constant_is_registered() {
        let registry = registry().expect("规范路由表可装载");
        let all = [
            screens::HOME,
            screens::SIGN_UP,
            screens::LOGIN,
            screens::RESERVATION_GUEST,
            screens::SUGGEST_ROOMS,
            screens::CREATE_CUSTOMER_PAGE,
            screens::CONFIRM_RESERVATION,
            screens::BOOKED_CONFIRMATION_CUSTOMER,
            screens::CUSTOMER_HOME,
            screens::CUSTOMER_ACCOUNT,
            screens::RESERVATION_CUSTOMER,
            screens::CUSTOMER_MAKE_REQUEST,
            screens::CUSTOMER_REQUEST_CONFIRMATION,
            screens::EMPLOYEE_HOME,
            screens::EMPLOYEE_ACCOUNT,
            screens::EMPLOYEE_REPAIR,
            screens::EMPLOYEE_RESERVATION,
            screens::EMPLOYEE_VIEW_SCHEDULE,
            screens::OWNER_HOME,
            screens::OWNER_ACCOUNT,
            screens::OWNER_MANAGE_EMPLOYEES,
            screens::OWNER_REPAIR,
            screens::OWNER_ADD_SHIFT,
            screens::OWNER_EDIT_SHIFT,
            screens::OWNER_MANAGE_ROOMS,
            screens::OWNER_VIEW_SCHEDULE,
        ];
        for screen in all {
            assert!(registry.pattern(&ScreenId::new(screen)).is_some(), "{screen} 未注册");
        }
        // `/` 是 Home 的第二条路由。
        assert_eq!(registry.len(), all.len() + 1);
        assert_eq!(registry.home(Role::Employee).target().as_str(), screens::EMPLOYEE_HOME);
    }

    #[test]
    fn the_site_root_renders_home() {
        let registry = registry().expect("规范路由表可装载");
        for path in ["/", "/Home", "/Home/"] {
            let pattern = registry.resolve(path, None).expect("根路径已注册");
            assert_eq!(pattern.target().as_str(), screens::HOME, "`{path}`");
        }
        let home = ScreenId::new(screens::HOME);
        assert_eq!(registry.patterns_for(&home).count(), 2);
        assert_eq!(registry.home(Role::Public).template(), "/Home");
    }

    #[test]
    fn workflows_cover_both_chains() {
        let registry = registry().expect("规范路由表可装载");
        let count = |name: &str| registry.links().filter(|link| link.workflow() == name).count();
        assert_eq!(count(workflows::GUEST_RESERVATION), 4);
        assert_eq!(count(workflows::REPAIR_REQUEST), 3);
    }
}
