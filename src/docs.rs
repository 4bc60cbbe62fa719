use crate::api::ledger::{AdjustmentResponse, PostAdjustment, SetTargetBalance};
use crate::api::leave_type::CreateLeaveType;
use crate::api::time_off::{
    CreateTimeOff, DecisionResponse, DenyBody, TimeOffFilter, TimeOffListResponse,
};
use crate::model::balance::{Balance, BalanceView};
use crate::model::ledger_entry::{LedgerEntry, LedgerSource};
use crate::model::leave_type::LeaveType;
use crate::model::time_off_request::{RequestStatus, TimeOffRequest};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Leave Ledger API",
        version = "1.0.0",
        description = r#"
## Leave-Balance Ledger & Time-Off Service

Manages staff leave balances as an append-only ledger with a materialized
current balance per employee and leave type, plus the time-off request
workflow that drives it.

### Key Features
- **Time-Off Requests**
  - Submit, list, approve, deny, and cancel requests
  - Approval debits the balance atomically and never overdraws it
  - Cancelling an approved request credits the hours back as a visible
    reversal entry
- **Balance Ledger**
  - Every balance change is one immutable ledger entry
  - Direct HR adjustments: manual corrections, accrual, banked holiday,
    overtime bank
  - Set-to-target convenience that writes nothing when already on target
- **Leave Types**
  - Administered reference list of leave categories

### Security
Endpoints are protected using **JWT Bearer authentication**. Approvals,
denials, administrative cancels, and adjustments require the **Admin** or
**HR** role.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::time_off::create_request,
        crate::api::time_off::list_requests,
        crate::api::time_off::get_request,
        crate::api::time_off::approve_request,
        crate::api::time_off::deny_request,
        crate::api::time_off::cancel_request,

        crate::api::ledger::get_balances,
        crate::api::ledger::list_ledger,
        crate::api::ledger::post_adjustment,
        crate::api::ledger::set_target_balance,

        crate::api::leave_type::list_leave_types,
        crate::api::leave_type::create_leave_type,
        crate::api::leave_type::retire_leave_type
    ),
    components(
        schemas(
            CreateTimeOff,
            TimeOffFilter,
            TimeOffListResponse,
            DenyBody,
            DecisionResponse,
            TimeOffRequest,
            RequestStatus,
            PostAdjustment,
            SetTargetBalance,
            AdjustmentResponse,
            LedgerEntry,
            LedgerSource,
            Balance,
            BalanceView,
            LeaveType,
            CreateLeaveType
        )
    ),
    tags(
        (name = "TimeOff", description = "Time-off request workflow APIs"),
        (name = "Ledger", description = "Balance and ledger APIs"),
        (name = "LeaveType", description = "Leave type registry APIs"),
    )
)]
pub struct ApiDoc;
