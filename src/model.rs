//! Domain records, one struct per table.
//!
//! Reference tables (`currencies`, `loan_types`) are keyed by natural key and
//! populated only by the startup definition sync. All other tables use a
//! store-generated surrogate id; an absent `id` marks a record not yet
//! persisted.

use crate::entity::{ColumnDef, Entity, TableMeta};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A currency accepted by the service. Rows mirror [`crate::defs::ACCEPTED_CURRENCIES`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Currency {
    pub code: String,
    pub symbol: String,
}

impl Entity for Currency {
    type Key = String;

    const META: TableMeta = TableMeta {
        table: "currencies",
        key: "code",
        columns: &[
            ColumnDef { name: "code", sql_type: "text" },
            ColumnDef { name: "symbol", sql_type: "text" },
        ],
    };

    fn key(&self) -> Option<String> {
        Some(self.code.clone())
    }
}

/// A loan product. Rows mirror [`crate::defs::ACCEPTED_LOAN_TYPES`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoanType {
    pub loan_name: String,
    pub loan_purchase: String,
}

impl Entity for LoanType {
    type Key = String;

    const META: TableMeta = TableMeta {
        table: "loan_types",
        key: "loan_name",
        columns: &[
            ColumnDef { name: "loan_name", sql_type: "text" },
            ColumnDef { name: "loan_purchase", sql_type: "text" },
        ],
    };

    fn key(&self) -> Option<String> {
        Some(self.loan_name.clone())
    }
}

/// Personal identifiable information of an applicant requesting a loan.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoanApplicant {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub mobile_number: String,
    pub email_address: String,
}

impl Entity for LoanApplicant {
    type Key = i64;

    const META: TableMeta = TableMeta {
        table: "loan_applicants",
        key: "id",
        columns: &[
            ColumnDef { name: "id", sql_type: "bigint" },
            ColumnDef { name: "first_name", sql_type: "text" },
            ColumnDef { name: "last_name", sql_type: "text" },
            ColumnDef { name: "date_of_birth", sql_type: "date" },
            ColumnDef { name: "mobile_number", sql_type: "text" },
            ColumnDef { name: "email_address", sql_type: "text" },
        ],
    };

    fn key(&self) -> Option<i64> {
        self.id
    }
}

/// A loan requested by an applicant. Foreign keys are stored by value:
/// applicant id, loan-type name, currency code.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub applicant_id: i64,
    pub loan_type: String,
    pub value_of_purchase: f64,
    pub currency: String,
}

impl Entity for Loan {
    type Key = i64;

    const META: TableMeta = TableMeta {
        table: "loans",
        key: "id",
        columns: &[
            ColumnDef { name: "id", sql_type: "bigint" },
            ColumnDef { name: "applicant_id", sql_type: "bigint" },
            ColumnDef { name: "loan_type", sql_type: "text" },
            ColumnDef { name: "value_of_purchase", sql_type: "double precision" },
            ColumnDef { name: "currency", sql_type: "text" },
        ],
    };

    fn key(&self) -> Option<i64> {
        self.id
    }
}

/// An income source declared by an applicant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IncomeSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub applicant_id: i64,
    pub income_type: String,
    pub monthly_income: f64,
}

impl Entity for IncomeSource {
    type Key = i64;

    const META: TableMeta = TableMeta {
        table: "income_sources",
        key: "id",
        columns: &[
            ColumnDef { name: "id", sql_type: "bigint" },
            ColumnDef { name: "applicant_id", sql_type: "bigint" },
            ColumnDef { name: "income_type", sql_type: "text" },
            ColumnDef { name: "monthly_income", sql_type: "double precision" },
        ],
    };

    fn key(&self) -> Option<i64> {
        self.id
    }
}

/// A recurring expense declared by an applicant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecurringExpense {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub applicant_id: i64,
    pub expense_type: String,
    pub monthly_expense: f64,
    pub currency: String,
}

impl Entity for RecurringExpense {
    type Key = i64;

    const META: TableMeta = TableMeta {
        table: "recurring_expenses",
        key: "id",
        columns: &[
            ColumnDef { name: "id", sql_type: "bigint" },
            ColumnDef { name: "applicant_id", sql_type: "bigint" },
            ColumnDef { name: "expense_type", sql_type: "text" },
            ColumnDef { name: "monthly_expense", sql_type: "double precision" },
            ColumnDef { name: "currency", sql_type: "text" },
        ],
    };

    fn key(&self) -> Option<i64> {
        self.id
    }
}
