use crate::api::attendance::{MarkAttendance, TodayResponse, YearQuery};
use crate::api::leave_request::{ApprovedCountResponse, CreateLeave, LeaveListResponse};
use crate::engine::leave::LeaveSubmission;
use crate::engine::marker::MarkOutcome;
use crate::model::attendance::{AttendanceRecord, AttendanceStats, AttendanceStatus};
use crate::model::holiday::HolidayEntry;
use crate::model::leave_request::{LeaveRequest, LeaveStatus};
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Staffdesk API",
        version = "1.0.0",
        description = r#"
## Staffdesk — attendance & leave service

Backend for the internal staff portal: daily attendance marking with
trailing-week reconciliation, leave requests over date ranges, the shared
holiday catalog, and yearly attendance statistics.

### 🔹 Key behavior
- **Attendance**
  - One record per calendar day, keyed `D-M-YYYY` without zero padding
  - A present-mark backfills unmarked holidays in the past week and
    surfaces at most one missed day as absent
- **Leave**
  - A date range expands into one pending record per day
  - Approval/rejection is restricted to HR and Admin roles
- **Statistics**
  - `total_working_days = present + absent`; leave and holiday excluded

### 🔐 Security
All endpoints require a **JWT Bearer token** minted by the identity
provider; this service only verifies.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::mark_attendance,
        crate::api::attendance::today,
        crate::api::attendance::attendance_stats,
        crate::api::attendance::stream,

        crate::api::leave_request::create_leave,
        crate::api::leave_request::leave_list,
        crate::api::leave_request::approved_count,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave,

        crate::api::holiday::list_holidays
    ),
    components(
        schemas(
            MarkAttendance,
            MarkOutcome,
            TodayResponse,
            YearQuery,
            AttendanceRecord,
            AttendanceStats,
            AttendanceStatus,
            CreateLeave,
            LeaveSubmission,
            LeaveListResponse,
            ApprovedCountResponse,
            LeaveRequest,
            LeaveStatus,
            HolidayEntry
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Attendance", description = "Attendance marking, stats and live stream"),
        (name = "Leave", description = "Leave requests and approval workflow"),
        (name = "Holidays", description = "Shared holiday catalog"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
