use crate::auth::auth::AuthUser;
use crate::leave::error::LeaveError;

/// Explicit caller identity handed into every core operation. The ledger and
/// workflow never read ambient session state; whoever fronts the core builds
/// one of these first.
#[derive(Debug, Clone)]
pub struct CallerContext {
    pub user_id: u64,
    /// Present only if the caller is linked to an employee record.
    pub employee_id: Option<u64>,
    pub is_hr: bool,
}

impl CallerContext {
    pub fn require_hr(&self) -> Result<(), LeaveError> {
        if self.is_hr {
            Ok(())
        } else {
            Err(LeaveError::Forbidden)
        }
    }

    pub fn require_employee(&self) -> Result<u64, LeaveError> {
        self.employee_id.ok_or(LeaveError::MissingEmployeeProfile)
    }

    /// HR may act on any employee; everyone else only on their own record.
    pub fn resolve_target_employee(&self, requested: Option<u64>) -> Result<u64, LeaveError> {
        match requested {
            Some(id) if self.is_hr => Ok(id),
            Some(id) => {
                if self.employee_id == Some(id) {
                    Ok(id)
                } else {
                    Err(LeaveError::Forbidden)
                }
            }
            None => self.require_employee(),
        }
    }
}

impl From<&AuthUser> for CallerContext {
    fn from(auth: &AuthUser) -> Self {
        CallerContext {
            user_id: auth.user_id,
            employee_id: auth.employee_id,
            is_hr: auth.role.is_hr_privileged(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hr() -> CallerContext {
        CallerContext {
            user_id: 1,
            employee_id: None,
            is_hr: true,
        }
    }

    fn staff(employee_id: u64) -> CallerContext {
        CallerContext {
            user_id: 2,
            employee_id: Some(employee_id),
            is_hr: false,
        }
    }

    #[test]
    fn test_require_hr() {
        assert!(hr().require_hr().is_ok());
        assert!(matches!(
            staff(10).require_hr(),
            Err(LeaveError::Forbidden)
        ));
    }

    #[test]
    fn test_hr_may_target_any_employee() {
        assert_eq!(hr().resolve_target_employee(Some(99)).unwrap(), 99);
    }

    #[test]
    fn test_staff_may_only_target_self() {
        assert_eq!(staff(10).resolve_target_employee(Some(10)).unwrap(), 10);
        assert!(matches!(
            staff(10).resolve_target_employee(Some(11)),
            Err(LeaveError::Forbidden)
        ));
    }

    #[test]
    fn test_default_target_is_own_employee() {
        assert_eq!(staff(10).resolve_target_employee(None).unwrap(), 10);
        assert!(matches!(
            hr().resolve_target_employee(None),
            Err(LeaveError::MissingEmployeeProfile)
        ));
    }
}
