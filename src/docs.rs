use utoipa::OpenApi;

use crate::api;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "LeaveDesk API",
        description = "Leave balance & request lifecycle service"
    ),
    paths(
        api::employee::create_employee,
        api::employee::list_employees,
        api::employee::get_employee,
        api::employee::update_employee,
        api::employee::deactivate_employee,
        api::employee::get_balance,
        api::leave_request::create_leave,
        api::leave_request::approve_leave,
        api::leave_request::reject_leave,
        api::leave_request::cancel_leave,
        api::leave_request::get_leave,
        api::leave_request::leave_history,
        api::leave_request::leave_list,
    ),
    components(schemas(
        crate::model::employee::Employee,
        crate::model::role::Role,
        crate::model::leave_request::LeaveRequest,
        crate::model::leave_request::LeaveCategory,
        crate::model::leave_request::LeaveStatus,
        crate::model::leave_history::LeaveHistory,
        crate::model::leave_history::LeaveAction,
        crate::model::notification::Notification,
        crate::model::notification::NotificationKind,
        api::employee::CreateEmployee,
        api::employee::UpdateEmployee,
        api::employee::EmployeeListResponse,
        api::employee::BalanceResponse,
        api::leave_request::CreateLeave,
        api::leave_request::ReviewLeave,
        api::leave_request::CancelLeave,
        api::leave_request::LeaveListResponse,
    )),
    tags(
        (name = "Employee", description = "Employee management"),
        (name = "Leave", description = "Leave request lifecycle")
    )
)]
pub struct ApiDoc;
