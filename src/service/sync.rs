//! Reference-table reconciliation.
//!
//! Makes a table of reference entities exactly match a code-declared
//! definition list, atomically: load the current rows, diff by natural key,
//! then apply inserts, in-place updates, and deletes in one transaction.
//! Runs once per reference dataset at startup, before any traffic.

use crate::db::Database;
use crate::defs::Definition;
use crate::entity::Entity;
use crate::error::AppError;
use crate::service::crud;

/// Counts of rows written by one reconciliation run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub inserted: usize,
    pub updated: usize,
    pub deleted: usize,
}

/// Staged row operations computed by [`plan`]. Applying the whole plan inside
/// one transaction converges the table onto the definition list.
pub struct SyncPlan<E: Entity> {
    pub insert: Vec<E>,
    pub update: Vec<E>,
    pub delete: Vec<E::Key>,
}

impl<E: Entity> SyncPlan<E> {
    pub fn report(&self) -> SyncReport {
        SyncReport {
            inserted: self.insert.len(),
            updated: self.update.len(),
            deleted: self.delete.len(),
        }
    }
}

/// Diff the definition list against the rows currently in the table.
///
/// Two rows are the same reference value if and only if their natural keys
/// are equal; field contents never enter the comparison. A matched row has
/// its mutable fields overwritten and is staged for update (so foreign keys
/// referencing it stay valid); an unmatched definition is staged for insert;
/// an unmatched row is staged for delete.
pub fn plan<E, D>(definitions: &[D], existing: Vec<E>) -> SyncPlan<E>
where
    E: Entity,
    D: Definition<E>,
{
    let mut rows = existing;
    let mut matched = vec![false; rows.len()];
    let mut insert = Vec::new();

    for def in definitions {
        let candidate = def.materialize();
        // Reference definitions always carry their natural key.
        let Some(key) = candidate.key() else { continue };
        match rows.iter().position(|r| r.key() == Some(key.clone())) {
            Some(pos) => {
                matched[pos] = true;
                def.overwrite(&mut rows[pos]);
            }
            None => insert.push(candidate),
        }
    }

    let mut update = Vec::new();
    let mut delete = Vec::new();
    for (row, was_matched) in rows.into_iter().zip(matched) {
        if was_matched {
            update.push(row);
        } else if let Some(key) = row.key() {
            delete.push(key);
        }
    }

    SyncPlan { insert, update, delete }
}

/// Synchronise one reference table with its definition list, in a single
/// transaction. The current rows are read inside the same transaction as the
/// writes, so the whole reconciliation is atomic.
pub async fn synchronise<E, D>(db: &Database, definitions: &'static [D]) -> Result<SyncReport, AppError>
where
    E: Entity,
    D: Definition<E>,
{
    let report = db
        .execute(true, move |conn| {
            Box::pin(async move {
                let existing = crud::fetch_all::<E>(conn).await?;
                let plan = plan(definitions, existing);
                let report = plan.report();
                for entity in &plan.insert {
                    crud::insert_row(conn, entity, true).await?;
                }
                for entity in &plan.update {
                    crud::update_row(conn, entity).await?;
                }
                for key in &plan.delete {
                    crud::delete_row::<E>(conn, key).await?;
                }
                Ok(report)
            })
        })
        .await?;
    tracing::info!(
        table = E::META.table,
        inserted = report.inserted,
        updated = report.updated,
        deleted = report.deleted,
        "synchronised reference definitions"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defs::CurrencyDef;
    use crate::model::Currency;

    const EUR_USD: &[CurrencyDef] = &[
        CurrencyDef { code: "EUR", symbol: "€" },
        CurrencyDef { code: "USD", symbol: "$" },
    ];

    fn currency(code: &str, symbol: &str) -> Currency {
        Currency {
            code: code.into(),
            symbol: symbol.into(),
        }
    }

    fn key_set(plan: &SyncPlan<Currency>) -> (Vec<String>, Vec<String>, Vec<String>) {
        (
            plan.insert.iter().map(|c| c.code.clone()).collect(),
            plan.update.iter().map(|c| c.code.clone()).collect(),
            plan.delete.clone(),
        )
    }

    #[test]
    fn empty_table_inserts_every_definition() {
        let plan = plan(EUR_USD, Vec::new());
        let (insert, update, delete) = key_set(&plan);
        assert_eq!(insert, ["EUR", "USD"]);
        assert!(update.is_empty());
        assert!(delete.is_empty());
    }

    #[test]
    fn stale_rows_are_deleted_and_missing_ones_inserted() {
        let existing = vec![currency("EUR", "€"), currency("GBP", "£")];
        let plan = plan(EUR_USD, existing);
        let (insert, update, delete) = key_set(&plan);
        assert_eq!(insert, ["USD"]);
        assert_eq!(update, ["EUR"]);
        assert_eq!(delete, ["GBP"]);
    }

    #[test]
    fn attribute_change_updates_in_place() {
        let existing = vec![currency("EUR", "EUR"), currency("USD", "$")];
        let plan = plan(EUR_USD, existing);
        assert!(plan.insert.is_empty());
        assert!(plan.delete.is_empty());
        assert_eq!(plan.update, [currency("EUR", "€"), currency("USD", "$")]);
    }

    #[test]
    fn empty_definition_list_empties_the_table() {
        let defs: &[CurrencyDef] = &[];
        let existing = vec![currency("EUR", "€"), currency("USD", "$")];
        let plan = plan(defs, existing);
        assert!(plan.insert.is_empty());
        assert!(plan.update.is_empty());
        assert_eq!(plan.delete, ["EUR", "USD"]);
    }

    #[test]
    fn converged_table_plans_no_inserts_or_deletes() {
        let existing: Vec<Currency> = EUR_USD.iter().map(|d| d.materialize()).collect();
        let plan = plan(EUR_USD, existing);
        let report = plan.report();
        assert_eq!(report.inserted, 0);
        assert_eq!(report.deleted, 0);
        assert_eq!(report.updated, 2);
    }

    #[test]
    fn identity_is_natural_key_not_field_equality() {
        // Same key, different symbol: must match and update, never delete+insert.
        let existing = vec![currency("EUR", "outdated")];
        let defs: &[CurrencyDef] = &[CurrencyDef { code: "EUR", symbol: "€" }];
        let plan = plan(defs, existing);
        assert!(plan.insert.is_empty());
        assert!(plan.delete.is_empty());
        assert_eq!(plan.update[0].symbol, "€");
    }
}
