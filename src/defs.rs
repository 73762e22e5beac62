//! Canonical reference definitions. These lists are the single source of
//! truth for the rows allowed to exist in the reference tables; the startup
//! sync makes each table mirror its list exactly.

use crate::entity::Entity;
use crate::model::{Currency, LoanType};

/// A code-declared reference value that must be reflected as a row in its
/// entity's table.
pub trait Definition<E: Entity>: Send + Sync {
    /// Materialize a new entity carrying this definition's natural key.
    fn materialize(&self) -> E;

    /// Overwrite the mutable, non-key fields of an existing row.
    fn overwrite(&self, existing: &mut E);
}

pub struct CurrencyDef {
    pub code: &'static str,
    pub symbol: &'static str,
}

/// All currencies accepted by the service.
pub const ACCEPTED_CURRENCIES: &[CurrencyDef] = &[
    CurrencyDef { code: "EUR", symbol: "€" },
    CurrencyDef { code: "USD", symbol: "$" },
    CurrencyDef { code: "GBP", symbol: "£" },
];

impl Definition<Currency> for CurrencyDef {
    fn materialize(&self) -> Currency {
        Currency {
            code: self.code.to_string(),
            symbol: self.symbol.to_string(),
        }
    }

    fn overwrite(&self, existing: &mut Currency) {
        existing.symbol = self.symbol.to_string();
    }
}

pub struct LoanTypeDef {
    pub loan_name: &'static str,
    pub loan_purchase: &'static str,
}

/// All loan types accepted by the service.
pub const ACCEPTED_LOAN_TYPES: &[LoanTypeDef] = &[
    LoanTypeDef { loan_name: "Home Loan", loan_purchase: "Property" },
    LoanTypeDef { loan_name: "Student Loan", loan_purchase: "Course" },
    LoanTypeDef { loan_name: "Vehicle Loan", loan_purchase: "Vehicle" },
];

impl Definition<LoanType> for LoanTypeDef {
    fn materialize(&self) -> LoanType {
        LoanType {
            loan_name: self.loan_name.to_string(),
            loan_purchase: self.loan_purchase.to_string(),
        }
    }

    fn overwrite(&self, existing: &mut LoanType) {
        existing.loan_purchase = self.loan_purchase.to_string();
    }
}
