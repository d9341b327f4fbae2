use rust_decimal::Decimal;

use crate::config::ValidationRules;
use crate::model::RawImportRow;
use crate::report::IssueReason;

/// First rule the row breaks, if any. Rules not enabled are not checked.
pub fn check_row(rules: &ValidationRules, row: &RawImportRow, email: &str) -> Option<IssueReason> {
    if rules.require_name && row.name.trim().is_empty() {
        return Some(IssueReason::MissingName);
    }
    if rules.require_valid_email && !is_plausible_email(email) {
        return Some(IssueReason::InvalidEmail);
    }
    if rules.require_positive_salary && row.salary <= Decimal::ZERO {
        return Some(IssueReason::NonPositiveSalary);
    }
    None
}

/// `local@domain.tld` shape check: one `@`, both sides non-empty, a dot in
/// the domain that is neither first nor last, no whitespace.
pub fn is_plausible_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.find('.') {
        Some(_) => !domain.starts_with('.') && !domain.ends_with('.'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EmployeeStatus;
    use chrono::NaiveDate;

    fn row(name: &str, salary: Decimal) -> RawImportRow {
        RawImportRow {
            row_number: 2,
            name: name.into(),
            email: "a@x.com".into(),
            job_title: "Clerk".into(),
            salary,
            hiring_date: NaiveDate::from_ymd_opt(2022, 1, 10).unwrap(),
            department_name: "Sales".into(),
            status: EmployeeStatus::Active,
        }
    }

    #[test]
    fn plausible_emails() {
        assert!(is_plausible_email("ana.perez@empresa.com.co"));
        assert!(is_plausible_email("a@x.io"));
        assert!(!is_plausible_email("ana.perez"));
        assert!(!is_plausible_email("@x.com"));
        assert!(!is_plausible_email("a@x"));
        assert!(!is_plausible_email("a@@x.com"));
        assert!(!is_plausible_email("a@.com"));
        assert!(!is_plausible_email("a b@x.com"));
    }

    #[test]
    fn disabled_rules_accept_anything() {
        let rules = ValidationRules::default();
        assert_eq!(check_row(&rules, &row("", Decimal::ZERO), "nope"), None);
    }

    #[test]
    fn enabled_rules_report_first_failure() {
        let rules = ValidationRules {
            require_name: true,
            require_valid_email: true,
            require_positive_salary: true,
        };
        assert_eq!(check_row(&rules, &row(" ", Decimal::ZERO), "nope"), Some(IssueReason::MissingName));
        assert_eq!(check_row(&rules, &row("Ana", Decimal::ZERO), "nope"), Some(IssueReason::InvalidEmail));
        assert_eq!(
            check_row(&rules, &row("Ana", Decimal::ZERO), "a@x.com"),
            Some(IssueReason::NonPositiveSalary)
        );
        assert_eq!(check_row(&rules, &row("Ana", Decimal::new(1, 0)), "a@x.com"), None);
    }
}
