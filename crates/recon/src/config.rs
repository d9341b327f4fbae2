use serde::Deserialize;

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImportConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub rows: RowPolicy,
    #[serde(default)]
    pub departments: DepartmentPolicy,
    #[serde(default)]
    pub validation: ValidationRules,
    #[serde(default)]
    pub sheet: SheetLayout,
}

fn default_name() -> String {
    "employee import".into()
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            rows: RowPolicy::default(),
            departments: DepartmentPolicy::default(),
            validation: ValidationRules::default(),
            sheet: SheetLayout::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RowPolicy {
    #[serde(default)]
    pub blank_email: BlankEmailMode,
}

/// What a blank-email row turns into. Either way it never reaches the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlankEmailMode {
    #[default]
    Skip,
    Reject,
}

// ---------------------------------------------------------------------------
// Departments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DepartmentPolicy {
    #[serde(default)]
    pub unresolved: UnresolvedDepartmentMode,
    /// Preferred fallback department name. When absent from the snapshot the
    /// lowest department id is used instead.
    #[serde(default = "default_department_name")]
    pub default: String,
}

fn default_department_name() -> String {
    "General".into()
}

impl Default for DepartmentPolicy {
    fn default() -> Self {
        Self {
            unresolved: UnresolvedDepartmentMode::default(),
            default: default_department_name(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedDepartmentMode {
    #[default]
    Strict,
    FallbackToDefault,
}

impl std::fmt::Display for UnresolvedDepartmentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Strict => write!(f, "strict"),
            Self::FallbackToDefault => write!(f, "fallback_to_default"),
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValidationRules {
    #[serde(default)]
    pub require_name: bool,
    #[serde(default)]
    pub require_valid_email: bool,
    #[serde(default)]
    pub require_positive_salary: bool,
}

// ---------------------------------------------------------------------------
// Sheet layout (consumed by the parsers in hhrr-io)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SheetLayout {
    /// Rows skipped at the top of the sheet.
    #[serde(default = "default_header_rows")]
    pub header_rows: usize,
    /// Zero-based worksheet index.
    #[serde(default)]
    pub worksheet: usize,
    /// Text salaries use `.` for thousands and `,` for decimals.
    #[serde(default = "default_true")]
    pub decimal_comma: bool,
    #[serde(default)]
    pub columns: ColumnLayout,
}

fn default_header_rows() -> usize {
    1
}

fn default_true() -> bool {
    true
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            header_rows: default_header_rows(),
            worksheet: 0,
            decimal_comma: true,
            columns: ColumnLayout::default(),
        }
    }
}

/// 1-based column numbers (A = 1). Omitted columns keep their default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnLayout {
    pub first_name: usize,
    pub last_name: usize,
    pub email: usize,
    pub job_title: usize,
    pub salary: usize,
    pub hiring_date: usize,
    pub status: usize,
    pub department: usize,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            first_name: 2,
            last_name: 3,
            email: 7,
            job_title: 8,
            salary: 9,
            hiring_date: 10,
            status: 11,
            department: 14,
        }
    }
}

impl ColumnLayout {
    fn named(&self) -> [(&'static str, usize); 8] {
        [
            ("first_name", self.first_name),
            ("last_name", self.last_name),
            ("email", self.email),
            ("job_title", self.job_title),
            ("salary", self.salary),
            ("hiring_date", self.hiring_date),
            ("status", self.status),
            ("department", self.department),
        ]
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ImportConfig {
    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let config: ImportConfig =
            toml::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, col) in self.sheet.columns.named() {
            if col == 0 {
                return Err(ConfigError::Validation(format!(
                    "sheet.columns.{field} must be >= 1 (columns are 1-based)"
                )));
            }
        }

        let cols = &self.sheet.columns;
        let keys = [
            ("first_name", cols.first_name),
            ("email", cols.email),
            ("department", cols.department),
        ];
        for (i, (a, col_a)) in keys.iter().enumerate() {
            for (b, col_b) in &keys[i + 1..] {
                if col_a == col_b {
                    return Err(ConfigError::Validation(format!(
                        "sheet.columns.{a} and sheet.columns.{b} both use column {col_a}"
                    )));
                }
            }
        }

        if self.departments.unresolved == UnresolvedDepartmentMode::FallbackToDefault
            && self.departments.default.trim().is_empty()
        {
            return Err(ConfigError::Validation(
                "departments.default must name a department when unresolved = \"fallback_to_default\"".into(),
            ));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
name = "Monthly HR import"

[rows]
blank_email = "reject"

[departments]
unresolved = "fallback_to_default"
default = "Operations"

[validation]
require_name = true
require_valid_email = true

[sheet]
header_rows = 2
worksheet = 1
decimal_comma = false

[sheet.columns]
first_name = 1
last_name = 2
email = 3
job_title = 4
salary = 5
hiring_date = 6
status = 7
department = 8
"#;

    #[test]
    fn parse_full_config() {
        let config = ImportConfig::from_toml(FULL).unwrap();
        assert_eq!(config.name, "Monthly HR import");
        assert_eq!(config.rows.blank_email, BlankEmailMode::Reject);
        assert_eq!(config.departments.unresolved, UnresolvedDepartmentMode::FallbackToDefault);
        assert_eq!(config.departments.default, "Operations");
        assert!(config.validation.require_name);
        assert!(config.validation.require_valid_email);
        assert!(!config.validation.require_positive_salary);
        assert_eq!(config.sheet.header_rows, 2);
        assert_eq!(config.sheet.worksheet, 1);
        assert!(!config.sheet.decimal_comma);
        assert_eq!(config.sheet.columns.department, 8);
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = ImportConfig::from_toml("").unwrap();
        assert_eq!(config.name, "employee import");
        assert_eq!(config.rows.blank_email, BlankEmailMode::Skip);
        assert_eq!(config.departments.unresolved, UnresolvedDepartmentMode::Strict);
        assert_eq!(config.departments.default, "General");
        assert_eq!(config.sheet.header_rows, 1);
        assert!(config.sheet.decimal_comma);
        assert_eq!(config.sheet.columns, ColumnLayout::default());
        assert_eq!(config.sheet.columns.email, 7);
    }

    #[test]
    fn reject_unknown_mode() {
        let err = ImportConfig::from_toml("[departments]\nunresolved = \"fallback\"\n");
        assert!(matches!(err, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn reject_unknown_field() {
        let err = ImportConfig::from_toml("[rows]\nskip_blank = true\n");
        assert!(matches!(err, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn reject_zero_column() {
        let input = FULL.replace("salary = 5", "salary = 0");
        let err = ImportConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("sheet.columns.salary"));
    }

    #[test]
    fn partial_columns_keep_defaults() {
        let config = ImportConfig::from_toml("[sheet.columns]\nemail = 5\n").unwrap();
        assert_eq!(config.sheet.columns.email, 5);
        assert_eq!(config.sheet.columns.department, 14);
    }

    #[test]
    fn reject_shared_key_columns() {
        let input = FULL.replace("email = 3", "email = 8");
        let err = ImportConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("email"), "{err}");
        assert!(err.to_string().contains("department"), "{err}");
    }

    #[test]
    fn reject_blank_default_in_fallback_mode() {
        let input = FULL.replace("default = \"Operations\"", "default = \"  \"");
        let err = ImportConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("departments.default"));
    }

    #[test]
    fn blank_default_allowed_in_strict_mode() {
        let input = "[departments]\nunresolved = \"strict\"\ndefault = \"\"\n";
        assert!(ImportConfig::from_toml(input).is_ok());
    }
}
