//! Accepted-table conformance tests.

use super::{clean_outcome, messy_outcome, write_outcome, TestResult};
use crate::csv::Table;
use crate::traits::RunStore;

pub(super) fn run_table_tests<S, F>(factory: &F) -> Vec<TestResult>
where
    S: RunStore,
    F: Fn() -> S,
{
    vec![
        TestResult::from_result(
            "tables",
            "headers_written_for_empty_tables",
            headers_written_for_empty_tables(factory),
        ),
        TestResult::from_result(
            "tables",
            "one_line_per_accepted_row",
            one_line_per_accepted_row(factory),
        ),
    ]
}

fn headers_written_for_empty_tables<S, F>(factory: &F) -> Result<(), String>
where
    S: RunStore,
    F: Fn() -> S,
{
    let mut s = factory();
    write_outcome(&mut s, &clean_outcome()?)?;

    for table in Table::ALL {
        let csv = s
            .read_table(table)
            .map_err(|e| e.to_string())?
            .ok_or_else(|| format!("{} was not written", table))?;
        let expected = format!("{}\n", table.header().join(","));
        if csv != expected {
            return Err(format!("{}: expected {:?}, got {:?}", table, expected, csv));
        }
    }
    Ok(())
}

fn one_line_per_accepted_row<S, F>(factory: &F) -> Result<(), String>
where
    S: RunStore,
    F: Fn() -> S,
{
    let mut s = factory();
    let outcome = messy_outcome()?;
    write_outcome(&mut s, &outcome)?;

    let accepted = &outcome.accepted;
    let expected = [
        (Table::Recipes, accepted.recipes.len()),
        (Table::Ingredients, accepted.ingredients.len()),
        (Table::Steps, accepted.steps.len()),
        (Table::Interactions, accepted.interactions.len()),
    ];
    for (table, rows) in expected {
        let csv = s
            .read_table(table)
            .map_err(|e| e.to_string())?
            .ok_or_else(|| format!("{} was not written", table))?;
        // Step text in the fixture contains a comma but no newline.
        let lines = csv.lines().count();
        if lines != rows + 1 {
            return Err(format!(
                "{}: expected {} data lines, got {}",
                table,
                rows,
                lines.saturating_sub(1)
            ));
        }
    }
    Ok(())
}
